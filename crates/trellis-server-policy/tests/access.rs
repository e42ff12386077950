// Copyright (c) 2026 Trellis Platform Authors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end access decisions across the standard tier layout.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use trellis_server_auth::authority::{encode, AuthorityPrefix};
use trellis_server_auth::claims::{
	ClaimMap, CLAIM_OBJECT_IDENTIFIER, CLAIM_ORGANIZATION_ID, CLAIM_ROLES, CLAIM_SUBJECT,
};
use trellis_server_auth::permission::{InMemoryPermissionCache, PermissionCache, UserPermission};
use trellis_server_auth::remote::{
	AuthorizationRequestService, ChannelTransport, SourceApplicationAuthorization,
};
use trellis_server_auth::role::UserRole;
use trellis_server_policy::config::{
	standard_registry, ExternalApiConfig, InternalClientApiConfig, SecurityConfig, UserApiConfig,
};
use trellis_server_policy::registry::ChainRegistry;

const ORG: &str = "acme.example";

fn security_config() -> SecurityConfig {
	SecurityConfig::default()
		.with_internal(
			UserApiConfig::default()
				.with_enabled(true)
				.with_org_roles(ORG, &[UserRole::User, UserRole::Admin]),
		)
		.with_internal_client(
			InternalClientApiConfig::default()
				.with_enabled(true)
				.with_client_id("reporting-service"),
		)
		.with_external(
			ExternalApiConfig::default()
				.with_enabled(true)
				.with_source_application_id(7),
		)
}

/// Builds the registry plus a responder task that grants each entry of
/// `grants` its mapped source-application id and denies everyone else.
fn registry_with_responder(
	config: &SecurityConfig,
	cache: Arc<dyn PermissionCache>,
	grants: HashMap<String, i64>,
) -> ChainRegistry {
	let (transport, mut requests) = ChannelTransport::new(8);
	tokio::spawn(async move {
		while let Some(request) = requests.recv().await {
			let reply = match grants.get(&request.client_id) {
				Some(&id) => SourceApplicationAuthorization::granted(&request.client_id, id),
				None => SourceApplicationAuthorization::denied(&request.client_id),
			};
			let _ = request.reply.send(Some(reply));
		}
	});
	standard_registry(
		config,
		cache,
		AuthorizationRequestService::new(Arc::new(transport)),
	)
}

fn end_user_claims(object_identifier: Uuid, roles: &[UserRole]) -> ClaimMap {
	let role_values: Vec<&str> = roles.iter().map(|role| role.claim_value()).collect();
	ClaimMap::new()
		.with_claim(CLAIM_ORGANIZATION_ID, json!(ORG))
		.with_claim(CLAIM_OBJECT_IDENTIFIER, json!(object_identifier.to_string()))
		.with_claim(CLAIM_ROLES, json!(role_values))
}

fn client_claims(client_id: &str) -> ClaimMap {
	ClaimMap::new().with_claim(CLAIM_SUBJECT, json!(client_id))
}

#[tokio::test]
async fn status_is_open_without_claims() {
	let registry =
		registry_with_responder(&security_config(), Arc::new(InMemoryPermissionCache::new()), HashMap::new());

	let decision = registry.decide("/status/health", None).await;
	assert!(decision.is_permitted());
	assert!(decision.authorities().unwrap().is_empty());
}

#[tokio::test]
async fn admin_tier_requires_the_admin_role() {
	let registry =
		registry_with_responder(&security_config(), Arc::new(InMemoryPermissionCache::new()), HashMap::new());

	let admin = end_user_claims(Uuid::new_v4(), &[UserRole::Admin]);
	let decision = registry.decide("/api/internal/admin/users", Some(&admin)).await;
	assert!(decision.is_permitted());
	assert!(decision
		.authorities()
		.unwrap()
		.contains(&encode(AuthorityPrefix::Role, UserRole::Admin.as_str())));

	let user = end_user_claims(Uuid::new_v4(), &[UserRole::User]);
	let decision = registry.decide("/api/internal/admin/users", Some(&user)).await;
	assert!(!decision.is_permitted());
}

#[tokio::test]
async fn admin_role_implies_user_tier_access() {
	let registry =
		registry_with_responder(&security_config(), Arc::new(InMemoryPermissionCache::new()), HashMap::new());

	let admin = end_user_claims(Uuid::new_v4(), &[UserRole::Admin]);
	let decision = registry.decide("/api/internal/instances", Some(&admin)).await;
	assert!(decision.is_permitted());
	assert!(decision
		.authorities()
		.unwrap()
		.contains(&encode(AuthorityPrefix::Role, UserRole::User.as_str())));
}

#[tokio::test]
async fn user_outside_the_org_allow_list_is_forbidden() {
	let config = security_config().with_internal(
		UserApiConfig::default()
			.with_enabled(true)
			.with_org_roles(ORG, &[UserRole::Admin]),
	);
	let registry =
		registry_with_responder(&config, Arc::new(InMemoryPermissionCache::new()), HashMap::new());

	// The org only allows ADMIN, so a claimed USER role is filtered away.
	let user = end_user_claims(Uuid::new_v4(), &[UserRole::User]);
	let decision = registry.decide("/api/internal/instances", Some(&user)).await;
	assert!(!decision.is_permitted());
}

#[tokio::test]
async fn user_tier_without_identity_claims_is_unauthenticated() {
	use trellis_server_policy::chain::AccessDecision;

	let registry =
		registry_with_responder(&security_config(), Arc::new(InMemoryPermissionCache::new()), HashMap::new());

	let missing_org = ClaimMap::new()
		.with_claim(CLAIM_OBJECT_IDENTIFIER, json!(Uuid::new_v4().to_string()))
		.with_claim(CLAIM_ROLES, json!([UserRole::User.claim_value()]));
	let decision = registry.decide("/api/internal/instances", Some(&missing_org)).await;
	assert_eq!(decision, AccessDecision::Unauthenticated);

	let decision = registry.decide("/api/internal/instances", None).await;
	assert_eq!(decision, AccessDecision::Unauthenticated);
}

#[tokio::test]
async fn end_user_authorities_include_cached_source_applications() {
	let object_identifier = Uuid::new_v4();
	let cache = Arc::new(InMemoryPermissionCache::new());
	cache.put(
		object_identifier,
		UserPermission {
			object_identifier,
			source_application_ids: [3].into_iter().collect(),
		},
	);
	let registry = registry_with_responder(&security_config(), cache, HashMap::new());

	let user = end_user_claims(object_identifier, &[UserRole::User]);
	let decision = registry.decide("/api/internal/instances", Some(&user)).await;
	assert!(decision
		.authorities()
		.unwrap()
		.contains(&encode(AuthorityPrefix::SourceApplicationId, "3")));
}

#[tokio::test]
async fn internal_client_tier_checks_the_allow_list() {
	let registry =
		registry_with_responder(&security_config(), Arc::new(InMemoryPermissionCache::new()), HashMap::new());

	let listed = client_claims("reporting-service");
	let decision = registry.decide("/api/client/events", Some(&listed)).await;
	assert!(decision.is_permitted());
	assert!(decision
		.authorities()
		.unwrap()
		.contains(&encode(AuthorityPrefix::ClientId, "reporting-service")));

	let unlisted = client_claims("rogue-service");
	let decision = registry.decide("/api/client/events", Some(&unlisted)).await;
	assert!(!decision.is_permitted());
}

#[tokio::test]
async fn external_tier_grants_only_allow_listed_source_applications() {
	let grants = HashMap::from([
		("partner-seven".to_string(), 7),
		("partner-nine".to_string(), 9),
	]);
	let registry = registry_with_responder(
		&security_config(),
		Arc::new(InMemoryPermissionCache::new()),
		grants,
	);

	let decision = registry.decide("/api/resources", Some(&client_claims("partner-seven"))).await;
	assert!(decision.is_permitted());
	assert!(decision
		.authorities()
		.unwrap()
		.contains(&encode(AuthorityPrefix::SourceApplicationId, "7")));

	// Authorized remotely, but for an id outside the configured allow-list.
	let decision = registry.decide("/api/resources", Some(&client_claims("partner-nine"))).await;
	assert!(!decision.is_permitted());

	// Denied remotely.
	let decision = registry.decide("/api/resources", Some(&client_claims("stranger"))).await;
	assert!(!decision.is_permitted());
}

#[tokio::test]
async fn disabled_tier_denies_even_valid_principals() {
	use trellis_server_policy::chain::AccessDecision;

	let config = security_config().with_internal(
		UserApiConfig::default()
			.with_enabled(false)
			.with_org_roles(ORG, &[UserRole::User, UserRole::Admin]),
	);
	let registry =
		registry_with_responder(&config, Arc::new(InMemoryPermissionCache::new()), HashMap::new());

	let admin = end_user_claims(Uuid::new_v4(), &[UserRole::Admin]);
	let decision = registry.decide("/api/internal/admin/users", Some(&admin)).await;
	assert_eq!(decision, AccessDecision::Forbidden);

	let decision = registry.decide("/api/internal/admin/users", None).await;
	assert_eq!(decision, AccessDecision::Unauthenticated);
}

#[tokio::test]
async fn unmatched_paths_fall_through_to_the_catch_all_deny() {
	use trellis_server_policy::chain::AccessDecision;

	let registry =
		registry_with_responder(&security_config(), Arc::new(InMemoryPermissionCache::new()), HashMap::new());

	let decision = registry.decide("/metrics", None).await;
	assert_eq!(decision, AccessDecision::Unauthenticated);

	let admin = end_user_claims(Uuid::new_v4(), &[UserRole::Admin]);
	let decision = registry.decide("/metrics", Some(&admin)).await;
	assert_eq!(decision, AccessDecision::Forbidden);
}
