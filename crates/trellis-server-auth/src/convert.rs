// Copyright (c) 2026 Trellis Platform Authors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Principal conversion: validated claims to authority grants.
//!
//! One converter per caller class: end user, internal service client,
//! external source-application client. Converters never reject a request:
//! "no extractable identity" and "valid identity with zero grants" are both
//! legal results, differing only in the `authenticated` flag and the
//! authority set. The allow/deny decision belongs to the policy chain that
//! ran the converter.
//!
//! The set of principal types is fixed, so dispatch is a closed enum rather
//! than an open trait: a new caller class is a compile-time event.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::authority::{encode, AuthorityPrefix};
use crate::claims::{
	ClaimMap, CLAIM_OBJECT_IDENTIFIER, CLAIM_ORGANIZATION_ID, CLAIM_ROLES, CLAIM_SUBJECT,
};
use crate::filter::UserRoleFilter;
use crate::permission::PermissionCache;
use crate::remote::AuthorizationRequestService;
use crate::role::implied_closure;

/// Outcome of principal conversion.
///
/// `authenticated` says whether an identity could be extracted at all;
/// `authorities` carries the derived grants. An authenticated result with an
/// empty authority set is valid and is denied downstream as forbidden, not
/// as unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthenticationResult {
	pub authorities: HashSet<String>,
	pub authenticated: bool,
}

impl AuthenticationResult {
	/// No extractable identity; no grants.
	pub fn unauthenticated() -> Self {
		Self::default()
	}

	/// An established identity carrying the given grants (possibly none).
	pub fn authenticated(authorities: HashSet<String>) -> Self {
		Self {
			authorities,
			authenticated: true,
		}
	}

	pub fn has_authority(&self, authority: &str) -> bool {
		self.authorities.contains(authority)
	}
}

/// Converts end-user tokens: organization + object identifier + roles.
pub struct EndUserConverter {
	permission_cache: Arc<dyn PermissionCache>,
	role_filter: UserRoleFilter,
}

impl EndUserConverter {
	pub fn new(permission_cache: Arc<dyn PermissionCache>, role_filter: UserRoleFilter) -> Self {
		Self {
			permission_cache,
			role_filter,
		}
	}

	#[instrument(level = "debug", skip_all)]
	pub fn convert(&self, claims: &ClaimMap) -> AuthenticationResult {
		let claims = claims.normalized();

		let Some(organization_id) = claims.get_str(CLAIM_ORGANIZATION_ID) else {
			debug!("missing organization id claim");
			return AuthenticationResult::unauthenticated();
		};
		let Some(object_identifier) = claims.get_uuid(CLAIM_OBJECT_IDENTIFIER) else {
			debug!("missing or malformed object identifier claim");
			return AuthenticationResult::unauthenticated();
		};
		debug!(organization_id, %object_identifier, "extracted user identity claims");

		let role_values = claims.get_str_list(CLAIM_ROLES);
		let filtered_roles = self.role_filter.filter(&role_values, organization_id);
		let roles = implied_closure(&filtered_roles);

		let mut authorities: HashSet<String> = roles
			.iter()
			.map(|role| encode(AuthorityPrefix::Role, role.as_str()))
			.collect();

		if let Some(permission) = self.permission_cache.get(&object_identifier) {
			authorities.extend(permission.source_application_ids.iter().map(|id| {
				encode(AuthorityPrefix::SourceApplicationId, &id.to_string())
			}));
		}

		debug!(?authorities, "derived end-user authorities");
		AuthenticationResult::authenticated(authorities)
	}
}

/// Converts internal service-client tokens: the subject is the client id.
#[derive(Debug, Clone, Copy, Default)]
pub struct InternalClientConverter;

impl InternalClientConverter {
	pub fn new() -> Self {
		Self
	}

	#[instrument(level = "debug", skip_all)]
	pub fn convert(&self, claims: &ClaimMap) -> AuthenticationResult {
		let claims = claims.normalized();
		match claims.get_str(CLAIM_SUBJECT) {
			Some(subject) => {
				debug!(client_id = subject, "extracted internal client identity");
				AuthenticationResult::authenticated(
					[encode(AuthorityPrefix::ClientId, subject)].into_iter().collect(),
				)
			}
			None => {
				debug!("missing subject claim");
				AuthenticationResult::unauthenticated()
			}
		}
	}
}

/// Converts external partner-client tokens: the subject is resolved through
/// the remote source-application authorizer.
pub struct SourceApplicationConverter {
	authorization: AuthorizationRequestService,
}

impl SourceApplicationConverter {
	pub fn new(authorization: AuthorizationRequestService) -> Self {
		Self { authorization }
	}

	#[instrument(level = "debug", skip_all)]
	pub async fn convert(&self, claims: &ClaimMap) -> AuthenticationResult {
		let claims = claims.normalized();
		// Without a subject there is no client id to resolve; the remote
		// authorizer must not be called.
		let Some(subject) = claims.get_str(CLAIM_SUBJECT) else {
			debug!("missing subject claim");
			return AuthenticationResult::unauthenticated();
		};

		match self.authorization.authorize(subject).await {
			Some(authorization) if authorization.authorized => {
				match authorization.source_application_id {
					Some(id) => AuthenticationResult::authenticated(
						[encode(AuthorityPrefix::SourceApplicationId, &id.to_string())]
							.into_iter()
							.collect(),
					),
					None => {
						warn!(
							client_id = subject,
							"authorized reply carries no source application id"
						);
						AuthenticationResult::authenticated(HashSet::new())
					}
				}
			}
			Some(_) => {
				debug!(client_id = subject, "client is not authorized for any source application");
				AuthenticationResult::authenticated(HashSet::new())
			}
			// Timeout and no-reply grant nothing, but the identity stands:
			// the downstream denial is forbidden, not unauthenticated.
			None => AuthenticationResult::authenticated(HashSet::new()),
		}
	}
}

/// The closed set of principal converters, dispatched by the policy chain
/// that owns them.
pub enum PrincipalConverter {
	EndUser(EndUserConverter),
	InternalClient(InternalClientConverter),
	ExternalSourceApplication(SourceApplicationConverter),
}

impl PrincipalConverter {
	pub async fn convert(&self, claims: &ClaimMap) -> AuthenticationResult {
		match self {
			PrincipalConverter::EndUser(converter) => converter.convert(claims),
			PrincipalConverter::InternalClient(converter) => converter.convert(claims),
			PrincipalConverter::ExternalSourceApplication(converter) => {
				converter.convert(claims).await
			}
		}
	}
}

impl std::fmt::Debug for PrincipalConverter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			PrincipalConverter::EndUser(_) => "EndUser",
			PrincipalConverter::InternalClient(_) => "InternalClient",
			PrincipalConverter::ExternalSourceApplication(_) => "ExternalSourceApplication",
		};
		f.write_str(name)
	}
}
