//! HTTP route handlers.
//!
//! Every endpoint is a JSON request/response pair consumed by the browser
//! client; successes carry `"success": true` and failures come back through
//! [`crate::error::AppError`] as `{"success": false, "error": "..."}`.

pub mod checkout;
pub mod deploy;
pub mod dns;
pub mod domain;
pub mod generate;
pub mod status;
pub mod steps;

use axum::{
    Router,
    routing::{get, post},
};

use pagewright_core::{DomainName, SessionId};

use crate::error::AppError;
use crate::middleware::generation_rate_limiter;
use crate::state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let generate = Router::new()
        .route("/generate", post(generate::generate))
        .route_layer(generation_rate_limiter());

    let api = Router::new()
        .route("/steps", post(steps::store_step))
        .route("/steps/{session_id}", get(steps::get_steps))
        .merge(generate)
        .route("/domain/availability", get(domain::availability))
        .route("/domain/purchase", post(domain::purchase))
        .route("/dns/status", get(dns::status))
        .route("/checkout", post(checkout::create))
        .route("/deploy/zip", post(deploy::zip))
        .route("/deploy/github", post(deploy::github))
        .route("/deploy/netlify", post(deploy::netlify))
        .route("/deploy/full", post(deploy::full))
        .route("/status/{session_id}", get(status::poll));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health))
        .with_state(state)
}

/// Liveness probe.
async fn health() -> &'static str {
    "ok"
}

/// Parse a client-supplied session identifier or reject the request.
pub(crate) fn parse_session_id(raw: &str) -> Result<SessionId, AppError> {
    SessionId::parse(raw).map_err(|e| AppError::BadRequest(format!("invalid session id: {e}")))
}

/// Parse a domain or reject the request before any network call.
pub(crate) fn parse_domain(raw: &str) -> Result<DomainName, AppError> {
    DomainName::parse(raw).map_err(|e| AppError::BadRequest(format!("invalid domain: {e}")))
}
