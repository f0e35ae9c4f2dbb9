//! Netlify hosting client.
//!
//! Sites are created once per hosting unit name and redeployed by zip
//! upload, the simplest Netlify deploy mode: one request, no per-file
//! digest negotiation.

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::config::NetlifyConfig;

const BASE_URL: &str = "https://api.netlify.com";

/// Errors that can occur when interacting with the Netlify API.
#[derive(Debug, Error)]
pub enum NetlifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or message.
        message: String,
    },

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// A Netlify site.
#[derive(Debug, Clone, Deserialize)]
pub struct Site {
    /// Site ID.
    pub id: String,
    /// Site name (subdomain on netlify.app).
    pub name: String,
    /// HTTPS URL when available.
    pub ssl_url: Option<String>,
    /// Plain URL.
    pub url: Option<String>,
}

impl Site {
    /// Best public URL for the site.
    #[must_use]
    pub fn public_url(&self) -> String {
        self.ssl_url
            .clone()
            .or_else(|| self.url.clone())
            .unwrap_or_else(|| format!("https://{}.netlify.app", self.name))
    }
}

/// A deploy of a site.
#[derive(Debug, Clone, Deserialize)]
pub struct Deploy {
    /// Deploy ID.
    pub id: String,
    /// Deploy state, e.g. "uploading", "processing", "ready".
    pub state: String,
}

impl Deploy {
    /// Whether the deploy has finished processing.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == "ready"
    }
}

/// Netlify API client.
#[derive(Clone)]
pub struct NetlifyClient {
    client: reqwest::Client,
    base_url: String,
}

impl NetlifyClient {
    /// Create a new Netlify client.
    ///
    /// # Panics
    ///
    /// Panics if the token contains invalid header characters.
    #[must_use]
    pub fn new(config: &NetlifyConfig) -> Self {
        Self::with_base_url(config, BASE_URL)
    }

    /// Create a client pointed at a non-default endpoint (tests).
    #[must_use]
    pub fn with_base_url(config: &NetlifyConfig, base_url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", config.token.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth).expect("Invalid Netlify token for header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Ensure a site with (approximately) this name exists.
    ///
    /// Reuses an existing site; creates one otherwise, retrying once with a
    /// short random suffix on a naming collision.
    ///
    /// # Errors
    ///
    /// Returns an error if lookup or creation fails.
    #[instrument(skip(self))]
    pub async fn ensure_site(&self, name: &str) -> Result<Site, NetlifyError> {
        let url = format!(
            "{}/api/v1/sites?name={}",
            self.base_url,
            urlencoding::encode(name)
        );
        let response = self.client.get(&url).send().await?;
        if response.status().is_success() {
            let sites: Vec<Site> = response
                .json()
                .await
                .map_err(|e| NetlifyError::Parse(e.to_string()))?;
            if let Some(site) = sites.into_iter().find(|s| s.name == name) {
                tracing::info!(site = name, "Reusing existing site");
                return Ok(site);
            }
        }

        match self.create_site(name).await {
            Ok(site) => Ok(site),
            Err(NetlifyError::Api { status: 422, .. }) => {
                let suffixed = format!("{name}-{:04x}", rand::rng().random_range(0u16..=0xffff));
                tracing::warn!(
                    site = name,
                    retry = %suffixed,
                    "Site name collision; retrying with suffix"
                );
                self.create_site(&suffixed).await
            }
            Err(e) => Err(e),
        }
    }

    async fn create_site(&self, name: &str) -> Result<Site, NetlifyError> {
        let url = format!("{}/api/v1/sites", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({"name": name}))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        let site: Site = response
            .json()
            .await
            .map_err(|e| NetlifyError::Parse(e.to_string()))?;
        tracing::info!(site = name, id = %site.id, "Site created");
        Ok(site)
    }

    /// Deploy a zipped site build.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload is rejected.
    #[instrument(skip(self, zip_bytes), fields(bytes = zip_bytes.len()))]
    pub async fn deploy_zip(&self, site_id: &str, zip_bytes: Vec<u8>) -> Result<Deploy, NetlifyError> {
        let url = format!("{}/api/v1/sites/{site_id}/deploys", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/zip")
            .body(zip_bytes)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        let deploy: Deploy = response
            .json()
            .await
            .map_err(|e| NetlifyError::Parse(e.to_string()))?;
        tracing::info!(site_id, deploy_id = %deploy.id, state = %deploy.state, "Zip deploy accepted");
        Ok(deploy)
    }

    /// Fetch the state of a deploy.
    ///
    /// Read-only; callers may retry with backoff while polling.
    ///
    /// # Errors
    ///
    /// Returns an error if the deploy cannot be fetched.
    #[instrument(skip(self))]
    pub async fn get_deploy(&self, deploy_id: &str) -> Result<Deploy, NetlifyError> {
        let url = format!("{}/api/v1/deploys/{deploy_id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| NetlifyError::Parse(e.to_string()))
    }

    async fn api_error(response: reqwest::Response) -> NetlifyError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        NetlifyError::Api { status, message }
    }
}
