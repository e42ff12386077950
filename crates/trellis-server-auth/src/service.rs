// Copyright (c) 2026 Trellis Platform Authors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Decode-side authorization services.
//!
//! Business logic downstream of the policy chains works against the granted
//! authority set attached to the request context. These helpers decode that
//! set back into ids and roles, with the fault contract of the engine:
//! numeric parse failures propagate, and "no source application" versus
//! "multiple source applications" are distinct faults, never collapsed.

use std::collections::{BTreeSet, HashSet};

use thiserror::Error;

use crate::authority::{decode_long_values, decode_values, AuthorityParseError, AuthorityPrefix};
use crate::role::UserRole;

/// Faults when resolving the single source application an external-client
/// principal acts for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceApplicationIdError {
	#[error("no source application associated with the authenticated principal")]
	NoSourceApplicationId,
	#[error("multiple source applications associated with the authenticated principal: {0:?}")]
	MultipleSourceApplicationIds(BTreeSet<i64>),
	#[error(transparent)]
	Parse(#[from] AuthorityParseError),
}

/// Fault when a user touches data belonging to a source application they
/// hold no grant for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceApplicationAccessError {
	#[error("no permission to access or modify data related to source application with id={0}")]
	Forbidden(i64),
	#[error(transparent)]
	Parse(#[from] AuthorityParseError),
}

/// The source-application ids a user principal is granted.
pub fn authorized_source_application_ids(
	authorities: &HashSet<String>,
) -> Result<HashSet<i64>, AuthorityParseError> {
	decode_long_values(AuthorityPrefix::SourceApplicationId, authorities)
}

/// Checks that the principal holds a grant for the given source application.
pub fn check_source_application_access(
	authorities: &HashSet<String>,
	source_application_id: i64,
) -> Result<(), SourceApplicationAccessError> {
	let granted = authorized_source_application_ids(authorities)?;
	if granted.contains(&source_application_id) {
		Ok(())
	} else {
		Err(SourceApplicationAccessError::Forbidden(source_application_id))
	}
}

/// Whether the principal holds the given role authority.
pub fn has_role(authorities: &HashSet<String>, role: UserRole) -> bool {
	decode_values(AuthorityPrefix::Role, authorities).contains(role.as_str())
}

/// The single source application an external-client principal acts for.
///
/// Exactly one `SOURCE_APPLICATION_ID` authority must be present. Zero and
/// more-than-one are distinct faults for the caller to report.
pub fn source_application_id(
	authorities: &HashSet<String>,
) -> Result<i64, SourceApplicationIdError> {
	let ids = decode_long_values(AuthorityPrefix::SourceApplicationId, authorities)?;
	if ids.len() > 1 {
		return Err(SourceApplicationIdError::MultipleSourceApplicationIds(
			ids.into_iter().collect(),
		));
	}
	ids.into_iter()
		.next()
		.ok_or(SourceApplicationIdError::NoSourceApplicationId)
}
