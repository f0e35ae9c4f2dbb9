//! Page generation via the Anthropic Messages API.
//!
//! # Architecture
//!
//! - One non-streaming request per generation call; the reply is a single
//!   text blob carrying one HTML document per requested page
//! - [`pages`] splits the blob on document boundaries and gap-fills with a
//!   placeholder so the endpoint always returns exactly the requested count
//!
//! # Example
//!
//! ```rust,ignore
//! use pagewright_server::services::generation::{GenerationClient, build_pages};
//!
//! let client = GenerationClient::new(&config.generation);
//! let blob = client.generate(&prompt).await?;
//! let pages = build_pages(&blob, &structure)?;
//! ```

mod client;
mod error;
mod pages;
mod types;

pub use client::GenerationClient;
pub use error::GenerationError;
pub use pages::{build_pages, compose_prompt, split_documents};
