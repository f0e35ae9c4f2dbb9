//! DNS status endpoint.
//!
//! Reports what the world currently resolves for a domain, independent of
//! what the registrar or hosting provider claim. Used by the client while
//! waiting for propagation.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::routes::parse_domain;
use crate::services::hosting::{PAGES_IPV4, PAGES_IPV6};
use crate::state::AppState;

/// DNS status query parameters.
#[derive(Debug, Deserialize)]
pub struct DnsStatusQuery {
    pub domain: String,
}

/// DNS status response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsStatusResponse {
    pub success: bool,
    pub domain: String,
    pub apex_configured: bool,
    pub www_configured: bool,
    pub dns_configured: bool,
    pub provider: &'static str,
}

/// Check live DNS resolution for a domain against the Pages address set.
#[instrument(skip(state))]
pub async fn status(
    State(state): State<AppState>,
    Query(query): Query<DnsStatusQuery>,
) -> Result<Json<DnsStatusResponse>> {
    let domain = parse_domain(&query.domain)?;

    let apex_configured = state
        .dns()
        .apex_points_at(&domain, &PAGES_IPV4, &PAGES_IPV6)
        .await?;
    let www_configured = state
        .dns()
        .www_cname_matches(&domain, &state.github().pages_host())
        .await?;

    Ok(Json(DnsStatusResponse {
        success: true,
        domain: domain.to_string(),
        apex_configured,
        www_configured,
        dns_configured: apex_configured && www_configured,
        provider: state.registrar().provider(),
    }))
}
