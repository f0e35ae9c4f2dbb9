//! Multi-step form state accumulation.
//!
//! The browser stores each completed form step server-side so later
//! endpoints (generate, checkout, deploy) can work from one accumulated
//! session instead of re-sending everything.

use axum::{Json, extract::Path, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pagewright_core::{DeployTarget, PageStub};

use crate::error::Result;
use crate::routes::{parse_domain, parse_session_id};
use crate::state::AppState;

/// Store-step request: any subset of fields may arrive per step.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStepRequest {
    pub session_id: String,
    pub business_name: Option<String>,
    pub domain: Option<String>,
    pub deploy_target: Option<DeployTarget>,
    pub structure: Option<Vec<PageStub>>,
}

/// Store-step response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStepResponse {
    pub success: bool,
    pub session_id: String,
}

/// Accumulated session state returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetStepsResponse {
    pub success: bool,
    pub session_id: String,
    pub business_name: Option<String>,
    pub domain: Option<String>,
    pub deploy_target: Option<DeployTarget>,
    pub structure: Vec<PageStub>,
    pub page_count: usize,
}

/// Store one step's worth of form state.
///
/// Creates the session on first call; later calls merge into it. Absent
/// fields leave existing values untouched.
#[instrument(skip(state, request), fields(session = %request.session_id))]
pub async fn store_step(
    State(state): State<AppState>,
    Json(request): Json<StoreStepRequest>,
) -> Result<Json<StoreStepResponse>> {
    let session_id = parse_session_id(&request.session_id)?;

    // Validate the domain before touching the session, so a bad value
    // never sticks.
    let domain = request.domain.as_deref().map(parse_domain).transpose()?;

    let mut session = state.sessions().get_or_create(&session_id).await;
    if let Some(business_name) = request.business_name {
        session.business_name = Some(business_name);
    }
    if let Some(domain) = domain {
        session.domain = Some(domain);
    }
    if let Some(target) = request.deploy_target {
        session.deploy_target = Some(target);
    }
    if let Some(structure) = request.structure {
        session.structure = structure;
    }
    session.updated_at = chrono::Utc::now();
    state.sessions().put(session).await;

    Ok(Json(StoreStepResponse {
        success: true,
        session_id: session_id.to_string(),
    }))
}

/// Return the accumulated state for a session.
#[instrument(skip(state))]
pub async fn get_steps(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<GetStepsResponse>> {
    let session_id = parse_session_id(&session_id)?;
    let session = state
        .sessions()
        .get(&session_id)
        .await
        .ok_or_else(|| crate::error::AppError::NotFound(format!("session {session_id}")))?;

    Ok(Json(GetStepsResponse {
        success: true,
        session_id: session.id.to_string(),
        business_name: session.business_name,
        domain: session.domain.map(|d| d.to_string()),
        deploy_target: session.deploy_target,
        structure: session.structure,
        page_count: session.pages.len(),
    }))
}
