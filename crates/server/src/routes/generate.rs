//! Page generation endpoint.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pagewright_core::{GeneratedPage, PageStub};

use crate::error::{AppError, Result};
use crate::routes::parse_session_id;
use crate::services::generation::{build_pages, compose_prompt};
use crate::state::AppState;

/// Upper bound on pages per site.
const MAX_PAGE_COUNT: usize = 10;

/// Generation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub session_id: String,
    pub prompt: String,
    pub page_count: usize,
}

/// Generation response: always exactly `page_count` pages.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub session_id: String,
    pub pages: Vec<GeneratedPage>,
}

/// Generate the site's pages from a free-text prompt.
///
/// One provider call; the reply is split into documents and gap-filled
/// with placeholders so the response always carries exactly the requested
/// number of pages.
#[instrument(skip(state, request), fields(session = %request.session_id, page_count = request.page_count))]
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    let session_id = parse_session_id(&request.session_id)?;

    let prompt_text = request.prompt.trim();
    if prompt_text.is_empty() {
        return Err(AppError::BadRequest("prompt cannot be empty".to_string()));
    }
    if request.page_count == 0 || request.page_count > MAX_PAGE_COUNT {
        return Err(AppError::BadRequest(format!(
            "pageCount must be between 1 and {MAX_PAGE_COUNT}"
        )));
    }

    let mut session = state.sessions().get_or_create(&session_id).await;
    let structure = planned_structure(&session.structure, request.page_count);

    let prompt = compose_prompt(prompt_text, &structure);
    let blob = state.generator().generate(&prompt, None).await?;
    let pages = build_pages(&blob, &structure)?;

    session.structure = structure;
    session.pages = pages.clone();
    session.updated_at = chrono::Utc::now();
    state.sessions().put(session).await;

    Ok(Json(GenerateResponse {
        success: true,
        session_id: session_id.to_string(),
        pages,
    }))
}

/// The page plan for this generation run.
///
/// Uses the structure collected by the form when it matches the requested
/// count; otherwise synthesizes a default plan so the splitter always has
/// one filename per page.
fn planned_structure(stored: &[PageStub], page_count: usize) -> Vec<PageStub> {
    if stored.len() == page_count {
        return stored.to_vec();
    }

    (0..page_count)
        .map(|index| {
            if index == 0 {
                PageStub {
                    title: "Home".to_string(),
                    filename: "index.html".to_string(),
                }
            } else {
                PageStub {
                    title: format!("Page {}", index + 1),
                    filename: format!("page-{}.html", index + 1),
                }
            }
        })
        .collect()
}
