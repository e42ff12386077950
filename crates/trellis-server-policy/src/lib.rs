// Copyright (c) 2026 Trellis Platform Authors. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ordered path-based access policies for Trellis resource servers.
//!
//! A [`ChainRegistry`] holds [`PolicyChain`]s sorted by priority; for each
//! request the first chain whose path prefix matches decides access, either
//! unconditionally (permit-all, deny-all) or by running a principal
//! converter and checking the produced authorities against the chain's
//! requirement. [`standard_registry`] assembles the conventional tier
//! layout from a [`SecurityConfig`].

pub mod chain;
pub mod config;
pub mod registry;

pub use chain::{AccessDecision, ChainPolicy, PolicyChain, RequiredAuthorities};
pub use config::{
	standard_registry, ExternalApiConfig, InternalClientApiConfig, SecurityConfig, UserApiConfig,
	EXTERNAL_API_PATH, INTERNAL_ADMIN_API_PATH, INTERNAL_API_PATH, INTERNAL_CLIENT_API_PATH,
	STATUS_PATH,
};
pub use registry::{ChainRegistry, ChainRegistryBuilder};
