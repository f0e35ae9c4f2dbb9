//! Anthropic Messages API client.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::GenerationConfig;

use super::error::{ApiErrorResponse, GenerationError};
use super::types::{ChatRequest, ChatResponse, Message};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Generating several full HTML documents in one reply needs headroom.
const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Messages API client used for page generation.
#[derive(Clone)]
pub struct GenerationClient {
    inner: Arc<GenerationClientInner>,
}

struct GenerationClientInner {
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl GenerationClient {
    /// Create a new generation client.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &GenerationConfig) -> Self {
        Self::with_base_url(config, ANTHROPIC_API_URL)
    }

    /// Create a client pointed at a non-default endpoint (tests).
    #[must_use]
    pub fn with_base_url(config: &GenerationConfig, base_url: impl Into<String>) -> Self {
        let api_key = config.api_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).expect("Invalid API key for header"),
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(GenerationClientInner {
                client,
                model: config.model.clone(),
                base_url: base_url.into(),
            }),
        }
    }

    /// Generate text for a composed prompt.
    ///
    /// One request, one reply; the caller splits the returned blob into
    /// per-page documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error
    /// response.
    #[instrument(skip(self, prompt, system), fields(model = %self.inner.model))]
    pub async fn generate(
        &self,
        prompt: &str,
        system: Option<String>,
    ) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: self.inner.model.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
            messages: vec![Message::user(prompt)],
            system,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.base_url)
            .json(&request)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        if response.stop_reason.as_deref() == Some("max_tokens") {
            tracing::warn!("Generation truncated at max_tokens; trailing page may be incomplete");
        }
        if let Some(usage) = &response.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Generation complete"
            );
        }
        Ok(response.text())
    }

    /// Handle a successful response.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<ChatResponse, GenerationError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| GenerationError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(self.handle_error_status(status, response).await)
        }
    }

    /// Handle an error status code.
    async fn handle_error_status(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> GenerationError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return GenerationError::RateLimited(retry_after);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return GenerationError::Unauthorized("Invalid API key".to_string());
        }

        match response.text().await {
            Ok(body) => {
                if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                    GenerationError::Api {
                        error_type: api_error.error.error_type,
                        message: api_error.error.message,
                    }
                } else {
                    GenerationError::Api {
                        error_type: "unknown".to_string(),
                        message: body,
                    }
                }
            }
            Err(e) => GenerationError::Http(e),
        }
    }
}
