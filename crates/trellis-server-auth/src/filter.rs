// Copyright (c) 2026 Trellis Platform Authors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-organization role filtering.
//!
//! A caller's claimed roles are only honored if the allow-list configured
//! for their organization grants them. Unknown claim values and roles not on
//! the allow-list are silently dropped; there are no error conditions here.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::role::UserRole;

/// Restricts claimed roles to the subset allow-listed for an organization.
///
/// The allow-list is injected at construction so each instance is
/// independently testable; there is no ambient configuration.
#[derive(Debug, Clone, Default)]
pub struct UserRoleFilter {
	allow_list_per_org: HashMap<String, HashSet<UserRole>>,
}

impl UserRoleFilter {
	pub fn new(allow_list_per_org: HashMap<String, HashSet<UserRole>>) -> Self {
		Self { allow_list_per_org }
	}

	/// Maps claimed role values to roles and intersects with the
	/// organization's allow-list.
	///
	/// Unknown claim values are dropped. If nothing maps, the allow-list is
	/// not consulted at all. An organization without an allow-list entry
	/// yields no roles.
	pub fn filter(&self, claimed_values: &[String], organization_id: &str) -> HashSet<UserRole> {
		debug!(?claimed_values, "filtering claimed role values");

		if claimed_values.is_empty() {
			return HashSet::new();
		}

		let claimed: HashSet<UserRole> = claimed_values
			.iter()
			.filter_map(|value| UserRole::from_claim_value(value))
			.collect();
		debug!(?claimed, "recognized roles before organization filter");

		if claimed.is_empty() {
			return HashSet::new();
		}

		let allowed = self.allow_list_per_org.get(organization_id);
		debug!(?allowed, organization_id, "organization role allow-list");

		let filtered: HashSet<UserRole> = match allowed {
			Some(allowed) => claimed.intersection(allowed).copied().collect(),
			None => HashSet::new(),
		};
		debug!(?filtered, "roles after organization filter");

		filtered
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn filter_for(org: &str, allowed: &[UserRole]) -> UserRoleFilter {
		UserRoleFilter::new(HashMap::from([(
			org.to_string(),
			allowed.iter().copied().collect(),
		)]))
	}

	fn claim_values(roles: &[UserRole]) -> Vec<String> {
		roles.iter().map(|r| r.claim_value().to_string()).collect()
	}

	#[test]
	fn empty_claimed_values_yield_empty_without_allow_list_lookup() {
		let filter = UserRoleFilter::default();
		assert!(filter.filter(&[], "org1").is_empty());
	}

	#[test]
	fn unknown_claim_values_are_dropped() {
		let filter = filter_for("org1", &[UserRole::User]);
		let claimed = vec!["https://other.example/role".to_string()];
		assert!(filter.filter(&claimed, "org1").is_empty());
	}

	#[test]
	fn intersects_with_the_organization_allow_list() {
		let filter = filter_for("orgA", &[UserRole::Admin]);
		let claimed = claim_values(&[UserRole::Admin, UserRole::User]);
		assert_eq!(
			filter.filter(&claimed, "orgA"),
			[UserRole::Admin].into_iter().collect()
		);
	}

	#[test]
	fn organization_without_entry_yields_no_roles() {
		let filter = filter_for("orgA", &[UserRole::Admin]);
		let claimed = claim_values(&[UserRole::Admin]);
		assert!(filter.filter(&claimed, "orgB").is_empty());
	}

	#[test]
	fn keeps_all_claimed_roles_when_all_are_allowed() {
		let filter = filter_for("orgA", &[UserRole::User, UserRole::Admin, UserRole::Developer]);
		let claimed = claim_values(&[UserRole::User, UserRole::Developer]);
		assert_eq!(
			filter.filter(&claimed, "orgA"),
			[UserRole::User, UserRole::Developer].into_iter().collect()
		);
	}
}
