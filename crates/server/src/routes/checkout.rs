//! Checkout endpoint.
//!
//! Creates a Stripe Checkout session describing the requested deployment;
//! the browser is redirected to the returned URL and payment completion is
//! handled by Stripe's own flow.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pagewright_core::DeployTarget;

use crate::error::{AppError, Result};
use crate::routes::{parse_domain, parse_session_id};
use crate::state::AppState;

/// Checkout request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub session_id: String,
    pub deploy_target: DeployTarget,
    pub domain: Option<String>,
    pub years: Option<u32>,
}

/// Checkout response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,
    pub checkout_id: String,
    pub url: String,
}

/// Create a payment session for the requested deployment.
#[instrument(skip(state, request), fields(session = %request.session_id, target = %request.deploy_target))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let Some(stripe) = state.stripe() else {
        return Err(AppError::NotConfigured(
            "checkout is not configured on this server".to_string(),
        ));
    };

    let session_id = parse_session_id(&request.session_id)?;
    let domain = request.domain.as_deref().map(parse_domain).transpose()?;

    if request.deploy_target.requires_domain() && domain.is_none() {
        return Err(AppError::BadRequest(
            "full hosting checkout requires a domain".to_string(),
        ));
    }

    // Record the requested target on the session before redirecting out.
    let mut session = state.sessions().get_or_create(&session_id).await;
    session.deploy_target = Some(request.deploy_target);
    if let Some(domain) = domain.clone() {
        session.domain = Some(domain);
    }
    session.updated_at = chrono::Utc::now();
    state.sessions().put(session).await;

    let checkout = stripe
        .create_checkout(
            &session_id,
            request.deploy_target,
            domain.as_ref(),
            request.years,
        )
        .await?;

    Ok(Json(CheckoutResponse {
        success: true,
        checkout_id: checkout.id,
        url: checkout.url,
    }))
}
