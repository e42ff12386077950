// Copyright (c) 2026 Trellis Platform Authors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User permissions and the permission cache read side.
//!
//! Permissions map a user's personal object identifier to the set of
//! source-application ids they are granted. The cache is populated
//! out-of-band by a streaming feed and only read at conversion time; absence
//! of an entry is a valid state meaning "no source-application grants".

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// A user's granted source-application ids, keyed by their personal object
/// identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermission {
	pub object_identifier: Uuid,
	pub source_application_ids: HashSet<i64>,
}

/// Keyed permission store consulted during end-user conversion.
///
/// `get` must answer from memory without blocking; `put` is upsert with
/// last-write-wins per key. Storage and eviction belong to the
/// implementation.
pub trait PermissionCache: Send + Sync {
	fn get(&self, object_identifier: &Uuid) -> Option<UserPermission>;
	fn put(&self, object_identifier: Uuid, permission: UserPermission);
}

/// In-process permission cache backed by a `RwLock<HashMap>`.
#[derive(Debug, Default)]
pub struct InMemoryPermissionCache {
	entries: RwLock<HashMap<Uuid, UserPermission>>,
}

impl InMemoryPermissionCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries
			.read()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl PermissionCache for InMemoryPermissionCache {
	fn get(&self, object_identifier: &Uuid) -> Option<UserPermission> {
		self.entries
			.read()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.get(object_identifier)
			.cloned()
	}

	fn put(&self, object_identifier: Uuid, permission: UserPermission) {
		self.entries
			.write()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.insert(object_identifier, permission);
	}
}

/// A record delivered by the permission feed. The key is the string form of
/// the user's object identifier, as produced by the upstream publisher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionRecord {
	pub key: String,
	pub permission: UserPermission,
}

/// Spawns the feed task that upserts delivered permission records into the
/// cache.
///
/// Records with a malformed key are logged and skipped; the feed never
/// retries a record. The task ends when the sending side is dropped.
pub fn spawn_permission_feed(
	cache: Arc<dyn PermissionCache>,
	mut records: mpsc::Receiver<PermissionRecord>,
) -> JoinHandle<()> {
	tokio::spawn(async move {
		while let Some(record) = records.recv().await {
			match Uuid::parse_str(&record.key) {
				Ok(key) => {
					debug!(
						%key,
						source_application_ids = ?record.permission.source_application_ids,
						"consuming user permission"
					);
					cache.put(key, record.permission);
				}
				Err(error) => {
					warn!(key = %record.key, %error, "skipping permission record with malformed key");
				}
			}
		}
		debug!("permission feed channel closed");
	})
}
