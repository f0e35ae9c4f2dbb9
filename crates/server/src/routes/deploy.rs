//! Deployment endpoints, one per target.
//!
//! The hosted targets share the parameterized pipeline in
//! [`crate::pipeline`]; these handlers only pick options, persist the
//! session (also after failures, so recorded `failed` state survives), and
//! shape the JSON response.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pagewright_core::DeploymentPhase;

use crate::error::{AppError, Result};
use crate::pipeline::{PipelineOptions, run_pipeline};
use crate::routes::{parse_domain, parse_session_id};
use crate::services::archive::build_site_zip;
use crate::services::hosting::derive_site_name;
use crate::state::AppState;

/// Deploy request shared by the hosted targets.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    pub session_id: String,
    /// Full hosting only: domain override recorded on the session.
    pub domain: Option<String>,
    /// Full hosting only: registration period for the purchase.
    pub years: Option<u32>,
}

/// Deploy response for the hosted targets.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResponse {
    pub success: bool,
    pub session_id: String,
    pub repo: String,
    pub url: String,
    pub phase: DeploymentPhase,
}

/// Download the generated site as a zip archive.
#[instrument(skip(state, request), fields(session = %request.session_id))]
pub async fn zip(
    State(state): State<AppState>,
    Json(request): Json<DeployRequest>,
) -> Result<impl IntoResponse> {
    let session_id = parse_session_id(&request.session_id)?;
    let session = state
        .sessions()
        .get(&session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {session_id}")))?;

    if session.pages.is_empty() {
        return Err(AppError::BadRequest(
            "no generated pages in session; call generate first".to_string(),
        ));
    }

    let bytes = build_site_zip(&session.pages)?;
    let filename = format!(
        "{}.zip",
        derive_site_name(session.business_name.as_deref().unwrap_or("site"))
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/zip"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
            .map_err(|e| AppError::Internal(e.to_string()))?,
    );
    Ok((headers, bytes))
}

/// Deploy to GitHub Pages on the provider's default URL.
#[instrument(skip(state, request), fields(session = %request.session_id))]
pub async fn github(
    State(state): State<AppState>,
    Json(request): Json<DeployRequest>,
) -> Result<Json<DeployResponse>> {
    let session_id = parse_session_id(&request.session_id)?;
    let mut session = state
        .sessions()
        .get(&session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {session_id}")))?;

    // GitHub-only deploys ignore any domain on the session.
    session.domain = None;

    let result = run_pipeline(&state, &mut session, PipelineOptions::github_only()).await;
    let phase = session.phase;
    state.sessions().put(session).await;
    let outcome = result?;

    Ok(Json(DeployResponse {
        success: true,
        session_id: session_id.to_string(),
        repo: outcome.repo,
        url: outcome.url,
        phase,
    }))
}

/// Netlify deploy response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetlifyDeployResponse {
    pub success: bool,
    pub session_id: String,
    pub site_id: String,
    pub url: String,
    pub deploy_state: String,
}

/// Deploy to Netlify as a zip upload.
#[instrument(skip(state, request), fields(session = %request.session_id))]
pub async fn netlify(
    State(state): State<AppState>,
    Json(request): Json<DeployRequest>,
) -> Result<Json<NetlifyDeployResponse>> {
    let Some(netlify) = state.netlify() else {
        return Err(AppError::NotConfigured(
            "the Netlify target is not configured on this server".to_string(),
        ));
    };

    let session_id = parse_session_id(&request.session_id)?;
    let mut session = state
        .sessions()
        .get(&session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {session_id}")))?;

    if session.pages.is_empty() {
        return Err(AppError::BadRequest(
            "no generated pages in session; call generate first".to_string(),
        ));
    }

    let seed = session
        .business_name
        .clone()
        .unwrap_or_else(|| session.id.to_string());
    let name = derive_site_name(&seed);

    let site = match netlify.ensure_site(&name).await {
        Ok(site) => site,
        Err(e) => {
            session.fail("deploy", e.to_string());
            state.sessions().put(session).await;
            return Err(e.into());
        }
    };

    let bytes = build_site_zip(&session.pages)?;
    let deploy = match netlify.deploy_zip(&site.id, bytes).await {
        Ok(deploy) => deploy,
        Err(e) => {
            session.fail("deploy", e.to_string());
            state.sessions().put(session).await;
            return Err(e.into());
        }
    };

    let url = site.public_url();
    session.hosting = Some(crate::session::HostingUnit {
        name: site.name.clone(),
        url: url.clone(),
    });
    session.advance_phase(DeploymentPhase::Deployed);
    state.sessions().put(session).await;

    Ok(Json(NetlifyDeployResponse {
        success: true,
        session_id: session_id.to_string(),
        site_id: site.id,
        url,
        deploy_state: deploy.state,
    }))
}

/// Full hosting: purchase the domain, wire DNS, deploy, enable serving.
#[instrument(skip(state, request), fields(session = %request.session_id))]
pub async fn full(
    State(state): State<AppState>,
    Json(request): Json<DeployRequest>,
) -> Result<Json<DeployResponse>> {
    let session_id = parse_session_id(&request.session_id)?;
    let mut session = state
        .sessions()
        .get(&session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {session_id}")))?;

    if let Some(domain) = request.domain.as_deref() {
        session.domain = Some(parse_domain(domain)?);
    }
    if session.domain.is_none() {
        return Err(AppError::BadRequest(
            "full hosting requires a domain on the session".to_string(),
        ));
    }

    let years = request
        .years
        .or_else(|| session.purchase.as_ref().map(|p| p.years))
        .unwrap_or(1);

    let result = run_pipeline(&state, &mut session, PipelineOptions::full_hosting(years)).await;
    let phase = session.phase;
    state.sessions().put(session).await;
    let outcome = result?;

    Ok(Json(DeployResponse {
        success: true,
        session_id: session_id.to_string(),
        repo: outcome.repo,
        url: outcome.url,
        phase,
    }))
}
