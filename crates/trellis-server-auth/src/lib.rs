// Copyright (c) 2026 Trellis Platform Authors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Claims-to-authority mapping engine for Trellis resource servers.
//!
//! This crate turns an incoming bearer token's validated claims into a set
//! of internal authority grants. It owns:
//!
//! - The authority encoding scheme (`PREFIX_value` strings) and its paired
//!   decode operations
//! - The end-user role model: external claim values, the static role
//!   hierarchy, and per-organization role filtering
//! - The permission cache read side and the feed that populates it
//! - The bounded request/reply client for remote source-application
//!   authorization
//! - The three principal converters (end user, internal client, external
//!   source-application client)
//! - Decode-side services business logic uses against a granted authority
//!   set
//!
//! What it deliberately does not own: token signature verification, the
//! HTTP boundary, the messaging transport, and the cache's storage are all
//! external collaborators. Policy-chain selection lives in
//! `trellis-server-policy`.

pub mod authority;
pub mod claims;
pub mod convert;
pub mod filter;
pub mod permission;
pub mod remote;
pub mod role;
pub mod service;

pub use authority::{
	decode_long_values, decode_values, encode, AuthorityParseError, AuthorityPrefix,
	AUTHORITY_DELIMITER,
};
pub use claims::{
	ClaimMap, CLAIM_OBJECT_IDENTIFIER, CLAIM_ORGANIZATION_ID, CLAIM_ROLES, CLAIM_SUBJECT,
};
pub use convert::{
	AuthenticationResult, EndUserConverter, InternalClientConverter, PrincipalConverter,
	SourceApplicationConverter,
};
pub use filter::UserRoleFilter;
pub use permission::{
	spawn_permission_feed, InMemoryPermissionCache, PermissionCache, PermissionRecord,
	UserPermission,
};
pub use remote::{
	AuthorizationRequest, AuthorizationRequestService, AuthorizationTransport, ChannelTransport,
	SourceApplicationAuthorization, DEFAULT_AUTHORIZATION_TIMEOUT,
};
pub use role::{implied_closure, UserRole};
pub use service::{SourceApplicationAccessError, SourceApplicationIdError};
