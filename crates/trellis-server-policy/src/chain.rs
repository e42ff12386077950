// Copyright (c) 2026 Trellis Platform Authors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy chains and access decisions.
//!
//! A chain binds a path prefix to what should happen for requests under it:
//! permit everyone, deny everyone, or convert the principal and test the
//! resulting authorities against a required-authority predicate. Chains are
//! ordered by explicit priority; selection is first-match-wins.

use std::collections::HashSet;
use std::fmt;

use trellis_server_auth::convert::PrincipalConverter;

/// The required-authority predicate a chain applies to a converted
/// principal's grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredAuthorities {
	/// The principal must hold exactly this authority.
	HasAuthority(String),
	/// The principal must hold at least one of these authorities.
	HasAnyAuthority(HashSet<String>),
}

impl RequiredAuthorities {
	pub fn satisfied_by(&self, authorities: &HashSet<String>) -> bool {
		match self {
			RequiredAuthorities::HasAuthority(required) => authorities.contains(required),
			RequiredAuthorities::HasAnyAuthority(required) => {
				!required.is_disjoint(authorities)
			}
		}
	}
}

/// What a chain does with the requests it matches.
pub enum ChainPolicy {
	/// Allow unconditionally; no converter runs, no authorities attach.
	PermitAll,
	/// Deny unconditionally.
	DenyAll,
	/// Convert the principal and require the predicate to hold.
	Authorize {
		converter: PrincipalConverter,
		required: RequiredAuthorities,
	},
}

impl fmt::Debug for ChainPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ChainPolicy::PermitAll => f.write_str("PermitAll"),
			ChainPolicy::DenyAll => f.write_str("DenyAll"),
			ChainPolicy::Authorize { converter, required } => f
				.debug_struct("Authorize")
				.field("converter", converter)
				.field("required", required)
				.finish(),
		}
	}
}

/// One ordered policy unit: a path prefix and the policy applied under it.
///
/// A disabled chain still matches its paths and denies them unconditionally
/// (fail closed); it does not fall through to later chains.
#[derive(Debug)]
pub struct PolicyChain {
	pub priority: i32,
	pub path_prefix: String,
	pub enabled: bool,
	pub policy: ChainPolicy,
}

impl PolicyChain {
	pub fn permit_all(priority: i32, path_prefix: impl Into<String>) -> Self {
		Self {
			priority,
			path_prefix: path_prefix.into(),
			enabled: true,
			policy: ChainPolicy::PermitAll,
		}
	}

	pub fn deny_all(priority: i32, path_prefix: impl Into<String>) -> Self {
		Self {
			priority,
			path_prefix: path_prefix.into(),
			enabled: true,
			policy: ChainPolicy::DenyAll,
		}
	}

	pub fn authorize(
		priority: i32,
		path_prefix: impl Into<String>,
		converter: PrincipalConverter,
		required: RequiredAuthorities,
	) -> Self {
		Self {
			priority,
			path_prefix: path_prefix.into(),
			enabled: true,
			policy: ChainPolicy::Authorize { converter, required },
		}
	}

	/// Sets whether the chain is enabled. A disabled chain denies everything
	/// it matches.
	pub fn with_enabled(mut self, enabled: bool) -> Self {
		self.enabled = enabled;
		self
	}

	/// Prefix match against a request path.
	pub fn matches(&self, path: &str) -> bool {
		path.starts_with(&self.path_prefix)
	}
}

/// The outcome of chain selection and policy evaluation for one request.
///
/// Maps conventionally at the HTTP layer: `Permitted` continues,
/// `Forbidden` is the 403-equivalent, `Unauthenticated` the 401-equivalent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
	/// Allowed; the granted authorities attach to the request context.
	Permitted { authorities: HashSet<String> },
	/// An identity was established but does not satisfy the chain.
	Forbidden,
	/// No identity could be established and the chain requires one.
	Unauthenticated,
}

impl AccessDecision {
	pub fn is_permitted(&self) -> bool {
		matches!(self, AccessDecision::Permitted { .. })
	}

	/// The authorities attached by a permitted decision.
	pub fn authorities(&self) -> Option<&HashSet<String>> {
		match self {
			AccessDecision::Permitted { authorities } => Some(authorities),
			_ => None,
		}
	}
}
