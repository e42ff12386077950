// Copyright (c) 2026 Trellis Platform Authors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authority encoding and decoding.
//!
//! Every grant attached to an authenticated caller is an opaque string of the
//! canonical form `PREFIX_value`, e.g. `ROLE_ADMIN` or
//! `SOURCE_APPLICATION_ID_7`. This module owns the prefix enumeration and the
//! paired encode/decode operations; everything else in the engine goes
//! through it rather than assembling authority strings by hand.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

/// Delimiter between an authority prefix and its value.
pub const AUTHORITY_DELIMITER: &str = "_";

/// The closed set of authority prefixes. Never extended at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorityPrefix {
	OrgId,
	Role,
	SourceApplicationId,
	ClientId,
}

impl AuthorityPrefix {
	/// Canonical string form of the prefix, as it appears in encoded
	/// authorities.
	pub fn as_str(&self) -> &'static str {
		match self {
			AuthorityPrefix::OrgId => "ORG_ID",
			AuthorityPrefix::Role => "ROLE",
			AuthorityPrefix::SourceApplicationId => "SOURCE_APPLICATION_ID",
			AuthorityPrefix::ClientId => "CLIENT_ID",
		}
	}
}

impl fmt::Display for AuthorityPrefix {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A decoded authority value failed numeric parsing.
///
/// Authorities under a numeric prefix are produced exclusively by
/// [`encode`] from numeric ids, so a non-numeric remainder indicates a
/// data-integrity bug upstream and is surfaced as a hard error rather than
/// silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("non-numeric {prefix} authority value: {value:?}")]
pub struct AuthorityParseError {
	pub prefix: AuthorityPrefix,
	pub value: String,
}

/// Encodes a value under the given prefix into the canonical authority
/// string. Accepts any value; there is no failure mode.
pub fn encode(prefix: AuthorityPrefix, value: &str) -> String {
	format!("{}{}{}", prefix.as_str(), AUTHORITY_DELIMITER, value)
}

/// Decodes the values carried by authorities under the given prefix.
///
/// Authorities that do not start with `PREFIX_` are silently dropped; the
/// remainder after the prefix and delimiter is returned verbatim.
pub fn decode_values(prefix: AuthorityPrefix, authorities: &HashSet<String>) -> HashSet<String> {
	let tag = format!("{}{}", prefix.as_str(), AUTHORITY_DELIMITER);
	authorities
		.iter()
		.filter_map(|authority| authority.strip_prefix(tag.as_str()))
		.map(str::to_string)
		.collect()
}

/// Decodes the numeric values carried by authorities under the given prefix.
///
/// Non-matching authorities are dropped as in [`decode_values`]; a matching
/// authority whose remainder is not a 64-bit integer is a hard fault.
pub fn decode_long_values(
	prefix: AuthorityPrefix,
	authorities: &HashSet<String>,
) -> Result<HashSet<i64>, AuthorityParseError> {
	decode_values(prefix, authorities)
		.into_iter()
		.map(|value| {
			value.parse::<i64>().map_err(|_| AuthorityParseError {
				prefix,
				value,
			})
		})
		.collect()
}
