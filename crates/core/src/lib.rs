//! Pagewright Core - Shared types library.
//!
//! This crate provides common types used across all Pagewright components:
//! - `server` - Public API serving the generation and deployment endpoints
//! - `cli` - Command-line tools for domain and DNS debugging
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated domains, session identifiers, generated pages,
//!   deployment targets, and the deployment phase state machine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
