//! Merchant App Core - Shared types library.
//!
//! This crate provides common types used by the merchant app components:
//! - `web` - Embedded app backend (OAuth, webhooks, Admin API proxy)
//! - `integration-tests` - In-process HTTP tests for `web`
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! session storage. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Shop domains, access scopes, sessions and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
