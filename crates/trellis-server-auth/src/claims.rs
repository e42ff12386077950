// Copyright (c) 2026 Trellis Platform Authors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Validated bearer-token claims.
//!
//! The engine never parses or verifies the wire token; an external decoding
//! library hands it an already-validated map of claim name to value. This
//! module wraps that map with typed accessors and the pure normalization
//! transform applied before authority derivation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Claim carrying the end user's organization id.
pub const CLAIM_ORGANIZATION_ID: &str = "organizationid";

/// Claim carrying the end user's personal object identifier (UUID-formatted).
pub const CLAIM_OBJECT_IDENTIFIER: &str = "objectidentifier";

/// Claim carrying the end user's granted role values.
pub const CLAIM_ROLES: &str = "roles";

/// Token subject claim; carries the client id for service principals.
pub const CLAIM_SUBJECT: &str = "sub";

/// A validated map of bearer-token claims.
///
/// Accessors are shape-tolerant: an absent claim or one with an unexpected
/// JSON shape reads as absent rather than erroring. Conversion-time faults
/// never originate here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimMap(Map<String, Value>);

impl ClaimMap {
	/// Creates an empty claim map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces a claim, builder-style.
	pub fn with_claim(mut self, name: impl Into<String>, value: Value) -> Self {
		self.0.insert(name.into(), value);
		self
	}

	/// Reads a string claim.
	pub fn get_str(&self, name: &str) -> Option<&str> {
		self.0.get(name).and_then(Value::as_str)
	}

	/// Reads a list-of-strings claim. Absent claims and non-list shapes read
	/// as empty; non-string elements are skipped.
	pub fn get_str_list(&self, name: &str) -> Vec<String> {
		self.0
			.get(name)
			.and_then(Value::as_array)
			.map(|values| {
				values
					.iter()
					.filter_map(Value::as_str)
					.map(str::to_string)
					.collect()
			})
			.unwrap_or_default()
	}

	/// Reads a UUID-formatted string claim. A malformed value reads as
	/// absent.
	pub fn get_uuid(&self, name: &str) -> Option<Uuid> {
		self.get_str(name).and_then(|s| Uuid::parse_str(s).ok())
	}

	/// Returns a new claim map with stray escape characters (`\`) and double
	/// quotes stripped from top-level string values.
	///
	/// Some upstream token issuers double-encode string claims; conversion
	/// runs on the normalized copy. The inbound map is never mutated, so
	/// converters stay referentially transparent.
	pub fn normalized(&self) -> ClaimMap {
		let normalized = self
			.0
			.iter()
			.map(|(name, value)| {
				let value = match value {
					Value::String(s) => Value::String(s.replace(['\\', '"'], "")),
					other => other.clone(),
				};
				(name.clone(), value)
			})
			.collect();
		ClaimMap(normalized)
	}
}

impl From<Map<String, Value>> for ClaimMap {
	fn from(map: Map<String, Value>) -> Self {
		ClaimMap(map)
	}
}
