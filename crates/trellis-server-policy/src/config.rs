// Copyright (c) 2026 Trellis Platform Authors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Security configuration and the standard registry.
//!
//! Each API tier carries an `enabled`/`permit_all` pair plus its
//! allow-list: the user tier a per-organization role allow-list, the client
//! tiers their authorized ids. [`standard_registry`] assembles the typical
//! six-chain registry from a [`SecurityConfig`] and the engine
//! collaborators, deriving each tier's required-authority predicate through
//! the authority codec.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Deserialize;

use trellis_server_auth::authority::{encode, AuthorityPrefix};
use trellis_server_auth::convert::{
	EndUserConverter, InternalClientConverter, PrincipalConverter, SourceApplicationConverter,
};
use trellis_server_auth::filter::UserRoleFilter;
use trellis_server_auth::permission::PermissionCache;
use trellis_server_auth::remote::AuthorizationRequestService;
use trellis_server_auth::role::UserRole;

use crate::chain::{PolicyChain, RequiredAuthorities};
use crate::registry::ChainRegistry;

/// Unauthenticated diagnostics tier (health, readiness).
pub const STATUS_PATH: &str = "/status";

/// Admin-tier user API.
pub const INTERNAL_ADMIN_API_PATH: &str = "/api/internal/admin";

/// General user-tier API.
pub const INTERNAL_API_PATH: &str = "/api/internal";

/// Internal trusted service-client API.
pub const INTERNAL_CLIENT_API_PATH: &str = "/api/client";

/// External partner-client API.
pub const EXTERNAL_API_PATH: &str = "/api";

/// User-tier configuration: which roles each organization's users may
/// exercise.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserApiConfig {
	pub enabled: bool,
	pub permit_all: bool,
	pub role_filter_per_org: HashMap<String, HashSet<UserRole>>,
}

impl UserApiConfig {
	pub fn with_enabled(mut self, enabled: bool) -> Self {
		self.enabled = enabled;
		self
	}

	pub fn with_permit_all(mut self, permit_all: bool) -> Self {
		self.permit_all = permit_all;
		self
	}

	pub fn with_org_roles(mut self, org: impl Into<String>, roles: &[UserRole]) -> Self {
		self.role_filter_per_org
			.insert(org.into(), roles.iter().copied().collect());
		self
	}
}

/// Internal-client-tier configuration: the allow-listed client ids.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InternalClientApiConfig {
	pub enabled: bool,
	pub permit_all: bool,
	pub authorized_client_ids: HashSet<String>,
}

impl InternalClientApiConfig {
	pub fn with_enabled(mut self, enabled: bool) -> Self {
		self.enabled = enabled;
		self
	}

	pub fn with_permit_all(mut self, permit_all: bool) -> Self {
		self.permit_all = permit_all;
		self
	}

	pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
		self.authorized_client_ids.insert(client_id.into());
		self
	}
}

/// External-tier configuration: the allow-listed source-application ids.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExternalApiConfig {
	pub enabled: bool,
	pub permit_all: bool,
	pub authorized_source_application_ids: HashSet<i64>,
}

impl ExternalApiConfig {
	pub fn with_enabled(mut self, enabled: bool) -> Self {
		self.enabled = enabled;
		self
	}

	pub fn with_permit_all(mut self, permit_all: bool) -> Self {
		self.permit_all = permit_all;
		self
	}

	pub fn with_source_application_id(mut self, id: i64) -> Self {
		self.authorized_source_application_ids.insert(id);
		self
	}
}

/// Aggregate security configuration for a resource server.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
	pub internal: UserApiConfig,
	pub internal_client: InternalClientApiConfig,
	pub external: ExternalApiConfig,
}

impl SecurityConfig {
	pub fn with_internal(mut self, internal: UserApiConfig) -> Self {
		self.internal = internal;
		self
	}

	pub fn with_internal_client(mut self, internal_client: InternalClientApiConfig) -> Self {
		self.internal_client = internal_client;
		self
	}

	pub fn with_external(mut self, external: ExternalApiConfig) -> Self {
		self.external = external;
		self
	}
}

fn tier_chain(
	priority: i32,
	path_prefix: &str,
	enabled: bool,
	permit_all: bool,
	converter: PrincipalConverter,
	required: RequiredAuthorities,
) -> PolicyChain {
	let chain = if permit_all {
		PolicyChain::permit_all(priority, path_prefix)
	} else {
		PolicyChain::authorize(priority, path_prefix, converter, required)
	};
	chain.with_enabled(enabled)
}

/// Builds the standard registry: diagnostics (permit-all), admin tier
/// (`ROLE_ADMIN`), user tier (`ROLE_USER`), internal-client tier (any
/// allow-listed `CLIENT_ID_*`), external tier (any allow-listed
/// `SOURCE_APPLICATION_ID_*`), and the implicit catch-all deny.
pub fn standard_registry(
	config: &SecurityConfig,
	permission_cache: Arc<dyn PermissionCache>,
	authorization: AuthorizationRequestService,
) -> ChainRegistry {
	let role_filter = UserRoleFilter::new(config.internal.role_filter_per_org.clone());

	let admin_converter = PrincipalConverter::EndUser(EndUserConverter::new(
		permission_cache.clone(),
		role_filter.clone(),
	));
	let user_converter =
		PrincipalConverter::EndUser(EndUserConverter::new(permission_cache, role_filter));
	let client_converter = PrincipalConverter::InternalClient(InternalClientConverter::new());
	let external_converter = PrincipalConverter::ExternalSourceApplication(
		SourceApplicationConverter::new(authorization),
	);

	let authorized_client_ids: HashSet<String> = config
		.internal_client
		.authorized_client_ids
		.iter()
		.map(|client_id| encode(AuthorityPrefix::ClientId, client_id))
		.collect();
	let authorized_source_application_ids: HashSet<String> = config
		.external
		.authorized_source_application_ids
		.iter()
		.map(|id| encode(AuthorityPrefix::SourceApplicationId, &id.to_string()))
		.collect();

	ChainRegistry::builder()
		.chain(PolicyChain::permit_all(0, STATUS_PATH))
		.chain(tier_chain(
			1,
			INTERNAL_ADMIN_API_PATH,
			config.internal.enabled,
			config.internal.permit_all,
			admin_converter,
			RequiredAuthorities::HasAuthority(encode(
				AuthorityPrefix::Role,
				UserRole::Admin.as_str(),
			)),
		))
		.chain(tier_chain(
			2,
			INTERNAL_API_PATH,
			config.internal.enabled,
			config.internal.permit_all,
			user_converter,
			RequiredAuthorities::HasAuthority(encode(
				AuthorityPrefix::Role,
				UserRole::User.as_str(),
			)),
		))
		.chain(tier_chain(
			3,
			INTERNAL_CLIENT_API_PATH,
			config.internal_client.enabled,
			config.internal_client.permit_all,
			client_converter,
			RequiredAuthorities::HasAnyAuthority(authorized_client_ids),
		))
		.chain(tier_chain(
			4,
			EXTERNAL_API_PATH,
			config.external.enabled,
			config.external.permit_all,
			external_converter,
			RequiredAuthorities::HasAnyAuthority(authorized_source_application_ids),
		))
		.build()
}
