//! Integration tests for the deploy pipeline and status polling.
//!
//! These tests require:
//! - A running server (cargo run -p pagewright-server)
//! - Valid GitHub credentials in the server environment
//! - For the full-hosting test: sandbox registrar credentials
//!
//! Run with: cargo test -p pagewright-integration-tests -- --ignored

use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
fn base_url() -> String {
    std::env::var("PAGEWRIGHT_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

fn fresh_session() -> String {
    format!("it-{}", Uuid::new_v4())
}

/// Generate a one-page site into a fresh session.
async fn seed_generated_session(client: &Client) -> String {
    let session = fresh_session();

    let resp = client
        .post(format!("{}/api/steps", base_url()))
        .json(&json!({"sessionId": session, "businessName": "Leeds Bakery"}))
        .send()
        .await
        .expect("Failed to store step");
    assert!(resp.status().is_success());

    let resp = client
        .post(format!("{}/api/generate", base_url()))
        .json(&json!({
            "sessionId": session,
            "prompt": "bakery in Leeds",
            "pageCount": 1
        }))
        .send()
        .await
        .expect("Failed to generate");
    assert!(resp.status().is_success());

    session
}

#[tokio::test]
#[ignore = "Requires running server and GitHub credentials"]
async fn test_zip_download_is_a_zip() {
    let client = Client::new();
    let session = seed_generated_session(&client).await;

    let resp = client
        .post(format!("{}/api/deploy/zip", base_url()))
        .json(&json!({"sessionId": session}))
        .send()
        .await
        .expect("Failed to download zip");

    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/zip")
    );
    let bytes = resp.bytes().await.expect("Failed to read body");
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
#[ignore = "Requires running server and GitHub credentials"]
async fn test_github_deploy_then_status_progresses() {
    let client = Client::new();
    let session = seed_generated_session(&client).await;

    let resp = client
        .post(format!("{}/api/deploy/github", base_url()))
        .json(&json!({"sessionId": session}))
        .send()
        .await
        .expect("Failed to deploy");
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(body["success"], true);
    assert!(
        body["url"]
            .as_str()
            .expect("url string")
            .contains("github.io")
    );

    // First poll: deployed, and the phase may still be pre-DNS.
    let resp = client
        .get(format!("{}/api/status/{session}", base_url()))
        .send()
        .await
        .expect("Failed to poll status");
    let body: Value = resp.json().await.expect("Failed to read response");
    assert_eq!(body["deployed"], true);
    assert_eq!(body["failed"], false);

    // Poll until the Pages build completes; state must never regress.
    let mut best_dns_configured = false;
    for _ in 0..20 {
        tokio::time::sleep(Duration::from_secs(15)).await;
        let resp = client
            .get(format!("{}/api/status/{session}", base_url()))
            .send()
            .await
            .expect("Failed to poll status");
        let body: Value = resp.json().await.expect("Failed to read response");

        let dns_configured = body["dnsConfigured"].as_bool().expect("bool");
        assert!(
            dns_configured >= best_dns_configured,
            "dnsConfigured regressed from {best_dns_configured} to {dns_configured}"
        );
        best_dns_configured = dns_configured;

        if body["httpsReady"] == true {
            return;
        }
    }
    panic!("Pages build never completed");
}
