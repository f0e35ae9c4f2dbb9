//! Integration tests for Pagewright.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the server with real provider credentials in the environment
//! cargo run -p pagewright-server
//!
//! # Run integration tests
//! cargo test -p pagewright-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `generate` - Generation endpoint against the live text provider
//! - `domain` - Availability and purchase against the live registrar
//! - `pipeline` - Deploy and status polling against live hosting
//!
//! Every test here costs real provider calls (and `domain` can cost real
//! money), which is why the whole suite is `#[ignore]`d by default.
