//! Stripe Checkout client.
//!
//! One operation: create a Checkout session carrying the deployment request
//! as metadata, so the fulfillment webhook (outside this service) can tie
//! the payment back to the session that triggered it.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use pagewright_core::{DeployTarget, DomainName, SessionId};

use crate::config::StripeConfig;

const BASE_URL: &str = "https://api.stripe.com";

/// Checkout price in minor units (pence) per deployment target.
const fn price_pence(target: DeployTarget) -> u32 {
    match target {
        DeployTarget::Zip => 900,
        DeployTarget::GithubPages | DeployTarget::Netlify => 1900,
        DeployTarget::FullHosting => 4900,
    }
}

/// Errors that can occur when creating a checkout session.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Stripe error message.
        message: String,
    },

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// A created Checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Stripe session ID.
    pub id: String,
    /// Hosted checkout page the browser is redirected to.
    pub url: String,
}

/// Error envelope returned by Stripe.
#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    base_url: String,
    success_url: String,
    cancel_url: String,
}

impl StripeClient {
    /// Create a new Stripe client.
    ///
    /// # Panics
    ///
    /// Panics if the secret key contains invalid header characters.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self::with_base_url(config, BASE_URL)
    }

    /// Create a client pointed at a non-default endpoint (tests).
    #[must_use]
    pub fn with_base_url(config: &StripeConfig, base_url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", config.secret_key.expose_secret());
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth).expect("Invalid Stripe key for header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        }
    }

    /// Create a Checkout session for a deployment request.
    ///
    /// # Errors
    ///
    /// Returns an error if Stripe rejects the request.
    #[instrument(skip(self), fields(session = %session_id, target = %target))]
    pub async fn create_checkout(
        &self,
        session_id: &SessionId,
        target: DeployTarget,
        domain: Option<&DomainName>,
        years: Option<u32>,
    ) -> Result<CheckoutSession, StripeError> {
        let amount = price_pence(target).to_string();
        let years_str = years.unwrap_or(0).to_string();
        let product_name = match domain {
            Some(domain) => format!("Website deployment ({domain})"),
            None => "Website deployment".to_string(),
        };

        let mut form: Vec<(&str, &str)> = vec![
            ("mode", "payment"),
            ("success_url", &self.success_url),
            ("cancel_url", &self.cancel_url),
            ("line_items[0][quantity]", "1"),
            ("line_items[0][price_data][currency]", "gbp"),
            ("line_items[0][price_data][unit_amount]", &amount),
            ("line_items[0][price_data][product_data][name]", &product_name),
            ("metadata[session_id]", session_id.as_str()),
            ("metadata[deploy_target]", target.as_str()),
        ];
        if let Some(domain) = domain {
            form.push(("metadata[domain]", domain.as_str()));
            form.push(("metadata[years]", &years_str));
        }

        let url = format!("{}/v1/checkout/sessions", self.base_url);
        let response = self.client.post(&url).form(&form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = match response.text().await {
                Ok(body) => serde_json::from_str::<StripeErrorBody>(&body)
                    .ok()
                    .and_then(|e| e.error.message)
                    .unwrap_or(body),
                Err(e) => e.to_string(),
            };
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSession = response
            .json()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))?;
        tracing::info!(checkout = %session.id, "Checkout session created");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> StripeClient {
        let config = StripeConfig {
            secret_key: SecretString::from("sk_test_key"),
            success_url: "https://pagewright.io/done".to_string(),
            cancel_url: "https://pagewright.io/cancel".to_string(),
        };
        StripeClient::with_base_url(&config, server.uri())
    }

    #[test]
    fn test_price_table() {
        assert_eq!(price_pence(DeployTarget::Zip), 900);
        assert_eq!(price_pence(DeployTarget::FullHosting), 4900);
    }

    #[tokio::test]
    async fn test_create_checkout_carries_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(body_string_contains("metadata%5Bsession_id%5D=sess-1"))
            .and(body_string_contains("metadata%5Bdeploy_target%5D=full_hosting"))
            .and(body_string_contains("metadata%5Bdomain%5D=mybakery.co.uk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_1",
                "url": "https://checkout.stripe.com/c/pay/cs_test_1"
            })))
            .mount(&server)
            .await;

        let session_id = SessionId::parse("sess-1").expect("valid");
        let domain = DomainName::parse("mybakery.co.uk").expect("valid");
        let checkout = client(&server)
            .create_checkout(&session_id, DeployTarget::FullHosting, Some(&domain), Some(2))
            .await
            .expect("ok");
        assert_eq!(checkout.id, "cs_test_1");
        assert!(checkout.url.contains("checkout.stripe.com"));
    }

    #[tokio::test]
    async fn test_create_checkout_surfaces_stripe_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(402).set_body_json(serde_json::json!({
                "error": {"message": "Your card was declined."}
            })))
            .mount(&server)
            .await;

        let session_id = SessionId::parse("sess-1").expect("valid");
        let err = client(&server)
            .create_checkout(&session_id, DeployTarget::Zip, None, None)
            .await
            .expect_err("should fail");
        assert!(err.to_string().contains("declined"));
    }
}
