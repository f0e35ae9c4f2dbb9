//! Domain availability and purchase endpoints.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::pipeline::purchase_step;
use crate::retry::{Backoff, retry};
use crate::routes::{parse_domain, parse_session_id};
use crate::state::AppState;

/// Registration period bounds, in years.
const MIN_YEARS: u32 = 1;
const MAX_YEARS: u32 = 5;

/// Availability query parameters.
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub domain: String,
}

/// Availability response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub success: bool,
    pub domain: String,
    pub available: bool,
}

/// Purchase request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub session_id: String,
    pub domain: String,
    #[serde(default = "default_years")]
    pub years: u32,
}

const fn default_years() -> u32 {
    1
}

/// Purchase response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub success: bool,
    pub domain: String,
    pub years: u32,
    pub status: String,
}

/// Check whether a domain can be registered.
///
/// Syntactic validation happens before any network call; registrar lookups
/// are read-only, so they retry with backoff and cache for a short TTL.
#[instrument(skip(state))]
pub async fn availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>> {
    let domain = parse_domain(&query.domain)?;

    let available = match state.availability_cache().get(domain.as_str()).await {
        Some(cached) => cached,
        None => {
            let registrar = state.registrar().clone();
            let domain_for_check = domain.clone();
            let available = retry(Backoff::default(), "domain availability", || {
                let registrar = registrar.clone();
                let domain = domain_for_check.clone();
                async move { registrar.check_availability(&domain).await }
            })
            .await?;
            state
                .availability_cache()
                .insert(domain.as_str().to_string(), available)
                .await;
            available
        }
    };

    Ok(Json(AvailabilityResponse {
        success: true,
        domain: domain.to_string(),
        available,
    }))
}

/// Purchase (ensure ownership of) a domain for a session.
///
/// Idempotent-ensure semantics: repeating the call for an already-owned
/// domain succeeds without a second charge. The purchase call itself is
/// never retried.
#[instrument(skip(state, request), fields(session = %request.session_id, domain = %request.domain))]
pub async fn purchase(
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>> {
    let session_id = parse_session_id(&request.session_id)?;
    let domain = parse_domain(&request.domain)?;

    if !(MIN_YEARS..=MAX_YEARS).contains(&request.years) {
        return Err(crate::error::AppError::BadRequest(format!(
            "years must be between {MIN_YEARS} and {MAX_YEARS}"
        )));
    }

    let mut session = state.sessions().get_or_create(&session_id).await;
    session.domain = Some(domain.clone());

    let result = purchase_step(&state, &mut session, &domain, request.years).await;
    // Persist even on failure so the recorded domain survives for a retry.
    let status = session
        .purchase
        .as_ref()
        .map(|p| p.status.clone())
        .unwrap_or_default();
    state.sessions().put(session).await;
    result?;

    Ok(Json(PurchaseResponse {
        success: true,
        domain: domain.to_string(),
        years: request.years,
        status,
    }))
}
