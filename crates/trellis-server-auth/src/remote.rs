// Copyright (c) 2026 Trellis Platform Authors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Remote source-application authorization.
//!
//! External partner clients are authorized by a remote service reached over
//! a request/reply messaging channel: a request carrying the client id is
//! published, and the caller suspends until a correlated reply arrives or
//! the engine-owned timeout elapses. Timeout and "no reply" are deliberately
//! indistinguishable to callers: both resolve to `None`.
//!
//! The transport itself (delivery, acks, retries) is an external
//! collaborator behind [`AuthorizationTransport`]; this module owns only the
//! timeout and the result contract. Results are never cached: every request
//! re-resolves the client's authorization.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, warn};

/// Engine-owned bound on a single authorization request.
pub const DEFAULT_AUTHORIZATION_TIMEOUT: Duration = Duration::from_secs(5);

/// The remote service's answer for one client id.
///
/// If `authorized` is true the source-application id must be present; a
/// reply violating that is treated as carrying no grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceApplicationAuthorization {
	pub authorized: bool,
	pub client_id: String,
	pub source_application_id: Option<i64>,
}

impl SourceApplicationAuthorization {
	/// A reply granting access on behalf of the given source application.
	pub fn granted(client_id: impl Into<String>, source_application_id: i64) -> Self {
		Self {
			authorized: true,
			client_id: client_id.into(),
			source_application_id: Some(source_application_id),
		}
	}

	/// A reply explicitly denying authorization. A real result, distinct
	/// from "no reply" for diagnostics, identical for authority granting.
	pub fn denied(client_id: impl Into<String>) -> Self {
		Self {
			authorized: false,
			client_id: client_id.into(),
			source_application_id: None,
		}
	}
}

/// Request/reply messaging collaborator.
///
/// `request` publishes one authorization request and resolves with the
/// correlated reply, or `None` if the channel produced no reply. Retry and
/// acknowledgement semantics belong to the implementation, never to the
/// engine.
#[async_trait]
pub trait AuthorizationTransport: Send + Sync {
	async fn request(&self, client_id: &str) -> Option<SourceApplicationAuthorization>;
}

/// Issues bounded authorization requests over a transport.
#[derive(Clone)]
pub struct AuthorizationRequestService {
	transport: Arc<dyn AuthorizationTransport>,
	timeout: Duration,
}

impl AuthorizationRequestService {
	pub fn new(transport: Arc<dyn AuthorizationTransport>) -> Self {
		Self {
			transport,
			timeout: DEFAULT_AUTHORIZATION_TIMEOUT,
		}
	}

	/// Overrides the request timeout.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// Resolves whether the given client id is authorized, and for which
	/// source application.
	///
	/// Exactly one request is outstanding per invocation; concurrent calls
	/// for the same client id are not coalesced. Timeout resolves to `None`
	/// rather than an error; callers must not distinguish it from a reply
	/// that never came.
	#[instrument(level = "debug", skip(self))]
	pub async fn authorize(&self, client_id: &str) -> Option<SourceApplicationAuthorization> {
		match tokio::time::timeout(self.timeout, self.transport.request(client_id)).await {
			Ok(Some(authorization)) => {
				debug!(authorized = authorization.authorized, "received authorization reply");
				Some(authorization)
			}
			Ok(None) => {
				debug!("no authorization reply for client");
				None
			}
			Err(_) => {
				warn!(timeout = ?self.timeout, "authorization request timed out");
				None
			}
		}
	}
}

impl std::fmt::Debug for AuthorizationRequestService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AuthorizationRequestService")
			.field("timeout", &self.timeout)
			.finish_non_exhaustive()
	}
}

/// One in-flight request on a [`ChannelTransport`]: the client id and the
/// sender for the correlated reply.
#[derive(Debug)]
pub struct AuthorizationRequest {
	pub client_id: String,
	pub reply: oneshot::Sender<Option<SourceApplicationAuthorization>>,
}

/// In-process transport over tokio channels.
///
/// Requests are delivered to the paired receiver; each carries its own
/// oneshot reply sender for correlation. Suitable for tests and
/// single-process deployments where the authorizer runs as a local task.
#[derive(Clone)]
pub struct ChannelTransport {
	requests: mpsc::Sender<AuthorizationRequest>,
}

impl ChannelTransport {
	/// Creates the transport and the receiving end the responder consumes.
	pub fn new(capacity: usize) -> (Self, mpsc::Receiver<AuthorizationRequest>) {
		let (requests, receiver) = mpsc::channel(capacity);
		(Self { requests }, receiver)
	}
}

#[async_trait]
impl AuthorizationTransport for ChannelTransport {
	async fn request(&self, client_id: &str) -> Option<SourceApplicationAuthorization> {
		let (reply, receiver) = oneshot::channel();
		let request = AuthorizationRequest {
			client_id: client_id.to_string(),
			reply,
		};
		if self.requests.send(request).await.is_err() {
			warn!("authorization responder is gone");
			return None;
		}
		receiver.await.ok().flatten()
	}
}
