//! GitHub hosting client: repositories, content pushes, and Pages.
//!
//! Content is pushed through the git data API as a single logical update -
//! one tree, one commit, one ref move - rather than per-file contents
//! calls, so a deploy is atomic from the Pages builder's point of view.

use std::net::{Ipv4Addr, Ipv6Addr};

use rand::Rng;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use pagewright_core::{DomainName, GeneratedPage};

use crate::config::GitHubConfig;

const BASE_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const DEFAULT_BRANCH: &str = "main";

/// Fixed IPv4 address set GitHub Pages serves apex domains from.
pub const PAGES_IPV4: [Ipv4Addr; 4] = [
    Ipv4Addr::new(185, 199, 108, 153),
    Ipv4Addr::new(185, 199, 109, 153),
    Ipv4Addr::new(185, 199, 110, 153),
    Ipv4Addr::new(185, 199, 111, 153),
];

/// Fixed IPv6 address set GitHub Pages serves apex domains from.
pub const PAGES_IPV6: [Ipv6Addr; 4] = [
    Ipv6Addr::new(0x2606, 0x50c0, 0x8000, 0, 0, 0, 0, 0x153),
    Ipv6Addr::new(0x2606, 0x50c0, 0x8001, 0, 0, 0, 0, 0x153),
    Ipv6Addr::new(0x2606, 0x50c0, 0x8002, 0, 0, 0, 0, 0x153),
    Ipv6Addr::new(0x2606, 0x50c0, 0x8003, 0, 0, 0, 0, 0x153),
];

/// Errors that can occur when interacting with the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
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

/// Pages configuration state for a repository.
#[derive(Debug, Clone, Default)]
pub struct PagesStatus {
    /// Whether the latest Pages build completed.
    pub built: bool,
    /// Custom domain bound to the site, if any.
    pub cname: Option<String>,
    /// Whether GitHub has verified the custom domain.
    pub domain_verified: bool,
    /// Whether HTTPS is enforced on the custom domain.
    pub https_enforced: bool,
}

/// GitHub API client for hosting generated sites.
#[derive(Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    owner: String,
}

#[derive(Debug, Deserialize)]
struct ShaObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: ShaObject,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    tree: ShaObject,
}

#[derive(Debug, Deserialize)]
struct PagesResponse {
    status: Option<String>,
    cname: Option<String>,
    protected_domain_state: Option<String>,
    https_enforced: Option<bool>,
}

impl GitHubClient {
    /// Create a new GitHub client.
    ///
    /// # Panics
    ///
    /// Panics if the token contains invalid header characters.
    #[must_use]
    pub fn new(config: &GitHubConfig) -> Self {
        Self::with_base_url(config, BASE_URL)
    }

    /// Create a client pointed at a non-default endpoint (tests).
    #[must_use]
    pub fn with_base_url(config: &GitHubConfig, base_url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", config.token.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth).expect("Invalid GitHub token for header"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("pagewright"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            owner: config.owner.clone(),
        }
    }

    /// Account that owns the hosting repositories.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The `owner.github.io` host `www` CNAMEs point at.
    #[must_use]
    pub fn pages_host(&self) -> String {
        format!("{}.github.io", self.owner)
    }

    /// Default Pages URL for a repository.
    #[must_use]
    pub fn default_url(&self, repo: &str) -> String {
        format!("https://{}.github.io/{repo}/", self.owner)
    }

    /// Ensure a repository with (approximately) this name exists.
    ///
    /// Reuses an existing repository; creates one otherwise. On a naming
    /// collision the create is retried once with a short random suffix.
    /// Returns the final repository name.
    ///
    /// # Errors
    ///
    /// Returns an error if creation fails for any reason other than a
    /// one-time naming collision.
    #[instrument(skip(self))]
    pub async fn ensure_repo(&self, name: &str) -> Result<String, GitHubError> {
        let url = format!("{}/repos/{}/{}", self.base_url, self.owner, name);
        let response = self.client.get(&url).send().await?;
        if response.status().is_success() {
            tracing::info!(repo = name, "Reusing existing repository");
            return Ok(name.to_string());
        }

        match self.create_repo(name).await {
            Ok(()) => Ok(name.to_string()),
            Err(GitHubError::Api { status: 422, .. }) => {
                let suffixed = format!("{name}-{:04x}", rand::rng().random_range(0u16..=0xffff));
                tracing::warn!(
                    repo = name,
                    retry = %suffixed,
                    "Repository name collision; retrying with suffix"
                );
                self.create_repo(&suffixed).await?;
                Ok(suffixed)
            }
            Err(e) => Err(e),
        }
    }

    async fn create_repo(&self, name: &str) -> Result<(), GitHubError> {
        let url = format!("{}/user/repos", self.base_url);
        let body = serde_json::json!({
            "name": name,
            "private": false,
            "auto_init": true,
            "has_issues": false,
            "has_wiki": false,
            "description": "Generated with Pagewright",
        });
        let response = self.client.post(&url).json(&body).send().await?;
        if response.status().is_success() {
            tracing::info!(repo = name, "Repository created");
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }

    /// Push the generated site as one commit on the default branch.
    ///
    /// Writes every page, the `.nojekyll` marker, and a `CNAME` binding
    /// file when a custom domain is set.
    ///
    /// # Errors
    ///
    /// Returns an error if any git data call fails; nothing is partially
    /// visible in that case since the branch ref only moves at the end.
    #[instrument(skip(self, pages, domain), fields(pages = pages.len()))]
    pub async fn push_site(
        &self,
        repo: &str,
        pages: &[GeneratedPage],
        domain: Option<&DomainName>,
        message: &str,
    ) -> Result<(), GitHubError> {
        let mut files: Vec<(String, String)> = pages
            .iter()
            .map(|page| (page.filename.clone(), page.html.clone()))
            .collect();
        // Disables Jekyll so files beginning with underscores still serve.
        files.push((".nojekyll".to_string(), String::new()));
        if let Some(domain) = domain {
            files.push(("CNAME".to_string(), domain.to_string()));
        }
        self.commit_files(repo, &files, message).await
    }

    /// Re-commit the `CNAME` binding file.
    ///
    /// Pages occasionally misses a domain bound at enable time; a delayed
    /// touch of `CNAME` forces it to re-check the binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    #[instrument(skip(self))]
    pub async fn nudge_domain(&self, repo: &str, domain: &DomainName) -> Result<(), GitHubError> {
        let files = vec![("CNAME".to_string(), domain.to_string())];
        self.commit_files(repo, &files, "Refresh domain binding").await
    }

    /// One tree, one commit, one ref move.
    async fn commit_files(
        &self,
        repo: &str,
        files: &[(String, String)],
        message: &str,
    ) -> Result<(), GitHubError> {
        let prefix = format!("{}/repos/{}/{repo}/git", self.base_url, self.owner);

        let head: RefResponse = self
            .get_json(&format!("{prefix}/ref/heads/{DEFAULT_BRANCH}"))
            .await?;
        let head_sha = head.object.sha;

        let head_commit: CommitResponse = self
            .get_json(&format!("{prefix}/commits/{head_sha}"))
            .await?;

        let entries: Vec<_> = files
            .iter()
            .map(|(path, content)| {
                serde_json::json!({
                    "path": path,
                    "mode": "100644",
                    "type": "blob",
                    "content": content,
                })
            })
            .collect();
        let tree: ShaObject = self
            .post_json(
                &format!("{prefix}/trees"),
                &serde_json::json!({"base_tree": head_commit.tree.sha, "tree": entries}),
            )
            .await?;

        let commit: ShaObject = self
            .post_json(
                &format!("{prefix}/commits"),
                &serde_json::json!({
                    "message": message,
                    "tree": tree.sha,
                    "parents": [head_sha],
                }),
            )
            .await?;

        let url = format!("{prefix}/refs/heads/{DEFAULT_BRANCH}");
        let response = self
            .client
            .patch(&url)
            .json(&serde_json::json!({"sha": commit.sha, "force": false}))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        tracing::info!(repo, files = files.len(), "Site pushed");
        Ok(())
    }

    /// Enable Pages serving and bind the custom domain.
    ///
    /// Serving is not implied by a content push; this call turns it on.
    /// Already-enabled (409) counts as success. Returns the public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if enabling fails; callers treat that as
    /// best-effort and fall back to [`Self::default_url`].
    #[instrument(skip(self, domain))]
    pub async fn enable_pages(
        &self,
        repo: &str,
        domain: Option<&DomainName>,
    ) -> Result<String, GitHubError> {
        let url = format!("{}/repos/{}/{repo}/pages", self.base_url, self.owner);
        let body = serde_json::json!({
            "source": {"branch": DEFAULT_BRANCH, "path": "/"},
        });
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        // 409: Pages already enabled for this repository.
        if !status.is_success() && status.as_u16() != 409 {
            return Err(Self::api_error(response).await);
        }

        if let Some(domain) = domain {
            let response = self
                .client
                .put(&url)
                .json(&serde_json::json!({"cname": domain.as_str()}))
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(Self::api_error(response).await);
            }
            tracing::info!(repo, domain = %domain, "Pages enabled with custom domain");
            return Ok(format!("https://{domain}/"));
        }

        tracing::info!(repo, "Pages enabled");
        Ok(self.default_url(repo))
    }

    /// Current Pages state, or `None` when Pages is not enabled.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures or unexpected statuses.
    #[instrument(skip(self))]
    pub async fn pages_status(&self, repo: &str) -> Result<Option<PagesStatus>, GitHubError> {
        let url = format!("{}/repos/{}/{repo}/pages", self.base_url, self.owner);
        let response = self.client.get(&url).send().await?;
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        let pages: PagesResponse = response
            .json()
            .await
            .map_err(|e| GitHubError::Parse(e.to_string()))?;
        Ok(Some(PagesStatus {
            built: pages.status.as_deref() == Some("built"),
            cname: pages.cname,
            domain_verified: pages.protected_domain_state.as_deref() == Some("verified"),
            https_enforced: pages.https_enforced.unwrap_or(false),
        }))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, GitHubError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| GitHubError::Parse(e.to_string()))
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, GitHubError> {
        let response = self.client.post(url).json(body).send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| GitHubError::Parse(e.to_string()))
    }

    async fn api_error(response: reqwest::Response) -> GitHubError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        GitHubError::Api { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GitHubClient {
        let config = GitHubConfig {
            token: SecretString::from("ghp_test"),
            owner: "pagewright-sites".to_string(),
        };
        GitHubClient::with_base_url(&config, server.uri())
    }

    #[tokio::test]
    async fn test_ensure_repo_reuses_existing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/pagewright-sites/bakery-abc123"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"name": "bakery-abc123"})),
            )
            .mount(&server)
            .await;

        let name = client(&server).ensure_repo("bakery-abc123").await.expect("ok");
        assert_eq!(name, "bakery-abc123");
    }

    #[tokio::test]
    async fn test_ensure_repo_creates_when_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/pagewright-sites/bakery-abc123"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .and(body_partial_json(serde_json::json!({"name": "bakery-abc123"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let name = client(&server).ensure_repo("bakery-abc123").await.expect("ok");
        assert_eq!(name, "bakery-abc123");
    }

    #[tokio::test]
    async fn test_ensure_repo_retries_collision_with_suffix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .and(body_partial_json(serde_json::json!({"name": "bakery-abc123"})))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(serde_json::json!({"message": "name already exists"})),
            )
            .mount(&server)
            .await;
        // The suffixed retry has a different name, so it misses the matcher
        // above and hits this catch-all.
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let name = client(&server).ensure_repo("bakery-abc123").await.expect("ok");
        assert!(name.starts_with("bakery-abc123-"));
        assert_ne!(name, "bakery-abc123");
    }

    #[tokio::test]
    async fn test_push_site_single_logical_update() {
        let server = MockServer::start().await;
        let prefix = "/repos/pagewright-sites/bakery-abc123/git";
        Mock::given(method("GET"))
            .and(path(format!("{prefix}/ref/heads/main")))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"object": {"sha": "headsha", "type": "commit"}}),
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{prefix}/commits/headsha")))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"sha": "headsha", "tree": {"sha": "treesha"}}),
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{prefix}/trees")))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"sha": "newtree"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{prefix}/commits")))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"sha": "newcommit"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path(format!("{prefix}/refs/heads/main")))
            .and(body_partial_json(serde_json::json!({"sha": "newcommit"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let pages = vec![GeneratedPage::new(
            "index.html",
            "<!DOCTYPE html><html><body>hi</body></html>",
        )];
        let domain = DomainName::parse("mybakery.co.uk").expect("valid");
        client(&server)
            .push_site("bakery-abc123", &pages, Some(&domain), "Deploy site")
            .await
            .expect("ok");
    }

    #[tokio::test]
    async fn test_enable_pages_conflict_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/pagewright-sites/bakery-abc123/pages"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let url = client(&server)
            .enable_pages("bakery-abc123", None)
            .await
            .expect("ok");
        assert_eq!(url, "https://pagewright-sites.github.io/bakery-abc123/");
    }

    #[tokio::test]
    async fn test_pages_status_not_enabled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/pagewright-sites/bakery-abc123/pages"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let status = client(&server).pages_status("bakery-abc123").await.expect("ok");
        assert!(status.is_none());
    }

    #[tokio::test]
    async fn test_pages_status_built_and_verified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/pagewright-sites/bakery-abc123/pages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "built",
                "cname": "mybakery.co.uk",
                "protected_domain_state": "verified",
                "https_enforced": true,
            })))
            .mount(&server)
            .await;

        let status = client(&server)
            .pages_status("bakery-abc123")
            .await
            .expect("ok")
            .expect("enabled");
        assert!(status.built);
        assert!(status.domain_verified);
        assert!(status.https_enforced);
        assert_eq!(status.cname.as_deref(), Some("mybakery.co.uk"));
    }

    #[test]
    fn test_pages_ip_constants() {
        assert_eq!(PAGES_IPV4.len(), 4);
        assert_eq!(PAGES_IPV6.len(), 4);
        assert_eq!(PAGES_IPV4[0].to_string(), "185.199.108.153");
        assert_eq!(PAGES_IPV6[0].to_string(), "2606:50c0:8000::153");
    }
}
