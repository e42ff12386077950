// Copyright (c) 2026 Trellis Platform Authors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User roles and the static role hierarchy.
//!
//! Roles arrive in tokens as external claim-value strings (role-catalog
//! URLs) distinct from their internal names. The implication table is pure
//! data: `Developer` implies `Admin` implies `User`, transitively.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// The closed set of end-user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
	User,
	Admin,
	Developer,
}

/// External claim value per role, as issued by the role catalog.
const ROLE_CLAIM_VALUES: [(UserRole, &str); 3] = [
	(UserRole::User, "https://roles.trellis.example/platform/user"),
	(UserRole::Admin, "https://roles.trellis.example/platform/admin"),
	(
		UserRole::Developer,
		"https://roles.trellis.example/platform/developer",
	),
];

/// Directly implied roles per role. Transitive closure is computed by
/// [`implied_closure`].
const IMPLIED_ROLES: [(UserRole, &[UserRole]); 3] = [
	(UserRole::User, &[]),
	(UserRole::Admin, &[UserRole::User]),
	(UserRole::Developer, &[UserRole::Admin]),
];

impl UserRole {
	/// Internal name, used as the authority value (`ROLE_<name>`).
	pub fn as_str(&self) -> &'static str {
		match self {
			UserRole::User => "USER",
			UserRole::Admin => "ADMIN",
			UserRole::Developer => "DEVELOPER",
		}
	}

	/// The external claim value carried in tokens for this role.
	pub fn claim_value(&self) -> &'static str {
		ROLE_CLAIM_VALUES
			.iter()
			.find(|(role, _)| role == self)
			.map(|(_, value)| *value)
			.unwrap_or_default()
	}

	/// Maps an external claim value to a role. Unknown values map to `None`
	/// and are dropped by callers, never reported.
	pub fn from_claim_value(value: &str) -> Option<UserRole> {
		ROLE_CLAIM_VALUES
			.iter()
			.find(|(_, claim_value)| *claim_value == value)
			.map(|(role, _)| *role)
	}

	fn implied(&self) -> &'static [UserRole] {
		IMPLIED_ROLES
			.iter()
			.find(|(role, _)| role == self)
			.map(|(_, implied)| *implied)
			.unwrap_or(&[])
	}
}

/// Computes the closure of the given roles under the static implication
/// table: each granted role plus everything it transitively implies.
///
/// Pure function, no I/O. The worklist tracks visited roles, so the
/// computation terminates even if a regression introduces a cycle into the
/// implication table.
pub fn implied_closure(roles: &HashSet<UserRole>) -> HashSet<UserRole> {
	let mut closure = HashSet::new();
	let mut pending: Vec<UserRole> = roles.iter().copied().collect();
	while let Some(role) = pending.pop() {
		if closure.insert(role) {
			pending.extend_from_slice(role.implied());
		}
	}
	closure
}

#[cfg(test)]
mod tests {
	use super::*;

	fn roles(values: &[UserRole]) -> HashSet<UserRole> {
		values.iter().copied().collect()
	}

	mod claim_values {
		use super::*;

		#[test]
		fn maps_known_claim_values_to_roles() {
			for (role, value) in ROLE_CLAIM_VALUES {
				assert_eq!(UserRole::from_claim_value(value), Some(role));
			}
		}

		#[test]
		fn unknown_claim_values_map_to_none() {
			assert_eq!(UserRole::from_claim_value("https://other.example/role"), None);
			assert_eq!(UserRole::from_claim_value(""), None);
		}

		#[test]
		fn internal_names_are_distinct_from_claim_values() {
			for (role, value) in ROLE_CLAIM_VALUES {
				assert_ne!(role.as_str(), value);
				assert_eq!(role.claim_value(), value);
			}
		}

		#[test]
		fn serializes_as_internal_name() {
			assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"ADMIN\"");
			assert_eq!(
				serde_json::from_str::<UserRole>("\"DEVELOPER\"").unwrap(),
				UserRole::Developer
			);
		}
	}

	mod hierarchy {
		use super::*;

		#[test]
		fn user_implies_only_itself() {
			assert_eq!(implied_closure(&roles(&[UserRole::User])), roles(&[UserRole::User]));
		}

		#[test]
		fn admin_implies_user() {
			assert_eq!(
				implied_closure(&roles(&[UserRole::Admin])),
				roles(&[UserRole::Admin, UserRole::User])
			);
		}

		#[test]
		fn developer_implies_admin_and_user() {
			assert_eq!(
				implied_closure(&roles(&[UserRole::Developer])),
				roles(&[UserRole::Developer, UserRole::Admin, UserRole::User])
			);
		}

		#[test]
		fn empty_set_yields_empty_closure() {
			assert!(implied_closure(&HashSet::new()).is_empty());
		}

		#[test]
		fn closure_of_multiple_roles_is_the_union() {
			assert_eq!(
				implied_closure(&roles(&[UserRole::User, UserRole::Admin])),
				roles(&[UserRole::Admin, UserRole::User])
			);
		}
	}

	mod properties {
		use super::*;
		use proptest::prelude::*;

		fn arb_roles() -> impl Strategy<Value = HashSet<UserRole>> {
			proptest::collection::hash_set(
				prop_oneof![
					Just(UserRole::User),
					Just(UserRole::Admin),
					Just(UserRole::Developer),
				],
				0..=3,
			)
		}

		proptest! {
			#[test]
			fn closure_is_idempotent(roles in arb_roles()) {
				let once = implied_closure(&roles);
				let twice = implied_closure(&once);
				prop_assert_eq!(once, twice);
			}

			#[test]
			fn closure_contains_the_input(roles in arb_roles()) {
				let closure = implied_closure(&roles);
				prop_assert!(roles.is_subset(&closure));
			}
		}
	}
}
