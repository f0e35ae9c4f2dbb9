//! HTTP middleware stack for the API server.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS (the browser client lives on another origin)
//! 4. Rate limiting (governor, generation endpoint only)

pub mod rate_limit;

pub use rate_limit::generation_rate_limiter;
