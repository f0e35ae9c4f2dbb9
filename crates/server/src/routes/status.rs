//! Status polling endpoint.
//!
//! Client-driven: the browser polls until `httpsReady` or `failed`. Each
//! poll re-evaluates every signal from scratch and merges the observation
//! into the session through the forward-only phase advance, so a signal
//! that transiently disappears never walks the reported state backwards.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use pagewright_core::DeploymentPhase;

use crate::error::{AppError, Result};
use crate::pipeline::evaluate_status;
use crate::routes::parse_session_id;
use crate::state::AppState;

/// Status response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    pub session_id: String,
    pub phase: DeploymentPhase,
    pub domain: Option<String>,
    pub url: Option<String>,
    pub domain_purchased: bool,
    pub deployed: bool,
    pub dns_configured: bool,
    pub https_ready: bool,
    /// Terminal failure flag; when set the client should stop polling.
    pub failed: bool,
    pub error: Option<String>,
}

/// Poll deployment status for a session.
#[instrument(skip(state))]
pub async fn poll(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<StatusResponse>> {
    let session_id = parse_session_id(&session_id)?;
    let mut session = state
        .sessions()
        .get(&session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {session_id}")))?;

    // A failed session is terminal: report it without re-probing providers.
    if !session.failed() {
        let (observed, signals) = evaluate_status(&state, &session).await;
        tracing::debug!(
            session = %session.id,
            ?observed,
            provider_verified = signals.provider_verified,
            dns_resolves = signals.dns_resolves,
            build_complete = signals.build_complete,
            "Status signals evaluated"
        );
        session.advance_phase(observed);
        state.sessions().put(session.clone()).await;
    }

    Ok(Json(StatusResponse {
        success: true,
        session_id: session.id.to_string(),
        phase: session.phase,
        domain: session.domain.as_ref().map(ToString::to_string),
        url: session.hosting.as_ref().map(|h| h.url.clone()),
        domain_purchased: session.purchase.is_some(),
        deployed: session.hosting.is_some(),
        dns_configured: session.phase.dns_configured(),
        https_ready: session.phase.https_ready(),
        failed: session.failed(),
        error: session.failure.clone(),
    }))
}
