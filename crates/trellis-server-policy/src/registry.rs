// Copyright (c) 2026 Trellis Platform Authors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ordered chain selection.
//!
//! The registry holds chains sorted by ascending priority and selects the
//! first whose path prefix matches the request; later chains are never
//! evaluated. A catch-all deny chain is always appended at build time, so no
//! path is left unclassified. Selection is deterministic and unaffected by
//! concurrent requests.

use tracing::{debug, instrument};

use trellis_server_auth::claims::ClaimMap;

use crate::chain::{AccessDecision, ChainPolicy, PolicyChain};

/// The ordered policy-chain registry.
#[derive(Debug)]
pub struct ChainRegistry {
	chains: Vec<PolicyChain>,
}

impl ChainRegistry {
	pub fn builder() -> ChainRegistryBuilder {
		ChainRegistryBuilder { chains: Vec::new() }
	}

	/// The chains in evaluation order, catch-all last.
	pub fn chains(&self) -> &[PolicyChain] {
		&self.chains
	}

	/// Decides access for a request path and its validated claims (`None`
	/// when the request carried no token).
	#[instrument(level = "debug", skip(self, claims), fields(has_claims = claims.is_some()))]
	pub async fn decide(&self, path: &str, claims: Option<&ClaimMap>) -> AccessDecision {
		// The builder appends a catch-all with an empty prefix, so a match
		// always exists.
		let Some(chain) = self.chains.iter().find(|chain| chain.matches(path)) else {
			debug!("no chain matched; denying");
			return deny(claims);
		};
		debug!(
			priority = chain.priority,
			path_prefix = %chain.path_prefix,
			enabled = chain.enabled,
			"selected policy chain"
		);

		if !chain.enabled {
			debug!("chain is disabled; denying");
			return deny(claims);
		}

		match &chain.policy {
			ChainPolicy::PermitAll => AccessDecision::Permitted {
				authorities: Default::default(),
			},
			ChainPolicy::DenyAll => deny(claims),
			ChainPolicy::Authorize { converter, required } => {
				let Some(claims) = claims else {
					return AccessDecision::Unauthenticated;
				};
				let result = converter.convert(claims).await;
				if !result.authenticated {
					debug!("no extractable identity");
					return AccessDecision::Unauthenticated;
				}
				if required.satisfied_by(&result.authorities) {
					debug!(authorities = ?result.authorities, "granting access");
					AccessDecision::Permitted {
						authorities: result.authorities,
					}
				} else {
					debug!("required authorities not satisfied");
					AccessDecision::Forbidden
				}
			}
		}
	}
}

/// An unconditional denial: the 401-equivalent without claims, the
/// 403-equivalent with them.
fn deny(claims: Option<&ClaimMap>) -> AccessDecision {
	if claims.is_some() {
		AccessDecision::Forbidden
	} else {
		AccessDecision::Unauthenticated
	}
}

/// Builds a [`ChainRegistry`].
pub struct ChainRegistryBuilder {
	chains: Vec<PolicyChain>,
}

impl ChainRegistryBuilder {
	pub fn chain(mut self, chain: PolicyChain) -> Self {
		self.chains.push(chain);
		self
	}

	/// Sorts chains by ascending priority and appends the catch-all deny
	/// chain. Chains sharing a priority keep their insertion order.
	pub fn build(mut self) -> ChainRegistry {
		self.chains.sort_by_key(|chain| chain.priority);
		self.chains.push(PolicyChain::deny_all(i32::MAX, ""));
		ChainRegistry { chains: self.chains }
	}
}
