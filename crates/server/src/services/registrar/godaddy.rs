//! GoDaddy registrar client.
//!
//! Uses the v1 Domains API: availability query, purchase with the fixed
//! placeholder contact payload, and per-record-set replacement for DNS.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use pagewright_core::DomainName;

use crate::config::GoDaddyConfig;

use super::{
    PLACEHOLDER_CONTACT, PagesRecordSet, PurchaseOutcome, Registrar, RegistrantContact,
    RegistrarError,
};

const BASE_URL: &str = "https://api.godaddy.com";

/// Apex record TTL installed on replace.
const APEX_TTL: u32 = 600;

/// GoDaddy API client.
#[derive(Clone)]
pub struct GoDaddyClient {
    client: reqwest::Client,
    base_url: String,
}

/// Availability query response.
#[derive(Debug, Deserialize)]
struct AvailableResponse {
    available: bool,
}

/// Error body returned by the v1 API.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    code: Option<String>,
    message: Option<String>,
}

/// Owned-domain record, used for the idempotency probe after a rejected
/// purchase.
#[derive(Debug, Deserialize)]
struct DomainDetail {
    status: Option<String>,
}

impl GoDaddyClient {
    /// Create a new GoDaddy client.
    ///
    /// # Panics
    ///
    /// Panics if the credentials contain invalid header characters.
    #[must_use]
    pub fn new(config: &GoDaddyConfig) -> Self {
        Self::with_base_url(config, BASE_URL)
    }

    /// Create a client pointed at a non-default endpoint (tests).
    #[must_use]
    pub fn with_base_url(config: &GoDaddyConfig, base_url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        let auth = format!(
            "sso-key {}:{}",
            config.api_key.expose_secret(),
            config.api_secret.expose_secret()
        );
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&auth).expect("Invalid GoDaddy credentials for header"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Whether the account already owns `domain` in an active state.
    async fn owns_domain(&self, domain: &DomainName) -> Result<bool, RegistrarError> {
        let url = format!("{}/v1/domains/{}", self.base_url, domain);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let detail: DomainDetail = response
            .json()
            .await
            .map_err(|e| RegistrarError::Parse(e.to_string()))?;
        Ok(matches!(detail.status.as_deref(), Some("ACTIVE")))
    }

    async fn api_error(response: reqwest::Response) -> RegistrarError {
        let status = response.status().as_u16();
        let message = match response.text().await {
            Ok(body) => serde_json::from_str::<ErrorResponse>(&body).map_or(body.clone(), |e| {
                format!(
                    "{}: {}",
                    e.code.unwrap_or_else(|| "UNKNOWN".to_string()),
                    e.message.unwrap_or_default()
                )
            }),
            Err(e) => e.to_string(),
        };
        RegistrarError::Api { status, message }
    }

    fn contact_json(contact: &RegistrantContact) -> serde_json::Value {
        serde_json::json!({
            "nameFirst": contact.first_name,
            "nameLast": contact.last_name,
            "email": contact.email,
            "phone": contact.phone,
            "addressMailing": {
                "address1": contact.address,
                "city": contact.city,
                "state": contact.state,
                "postalCode": contact.postal_code,
                "country": contact.country,
            }
        })
    }

    /// Delete a record set, tolerating absence.
    async fn delete_records(&self, domain: &DomainName, record_type: &str, name: &str) {
        let url = format!(
            "{}/v1/domains/{}/records/{}/{}",
            self.base_url,
            domain,
            record_type,
            urlencoding::encode(name)
        );
        match self.client.delete(&url).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                // Nothing to delete (404) or provider quirk; the replace
                // that follows is the call that matters.
                tracing::warn!(
                    domain = %domain,
                    record_type,
                    name,
                    status = response.status().as_u16(),
                    "Ignoring failed DNS record delete"
                );
            }
            Err(e) => {
                tracing::warn!(
                    domain = %domain,
                    record_type,
                    name,
                    error = %e,
                    "Ignoring failed DNS record delete"
                );
            }
        }
    }

    /// Replace a record set; this must succeed.
    async fn put_records(
        &self,
        domain: &DomainName,
        record_type: &str,
        name: &str,
        records: Vec<serde_json::Value>,
    ) -> Result<(), RegistrarError> {
        let url = format!(
            "{}/v1/domains/{}/records/{}/{}",
            self.base_url,
            domain,
            record_type,
            urlencoding::encode(name)
        );
        let response = self.client.put(&url).json(&records).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }
}

#[async_trait]
impl Registrar for GoDaddyClient {
    fn provider(&self) -> &'static str {
        "godaddy"
    }

    #[instrument(skip(self), fields(domain = %domain))]
    async fn check_availability(&self, domain: &DomainName) -> Result<bool, RegistrarError> {
        let url = format!(
            "{}/v1/domains/available?domain={}&checkType=FAST",
            self.base_url,
            urlencoding::encode(domain.as_str())
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        let body: AvailableResponse = response
            .json()
            .await
            .map_err(|e| RegistrarError::Parse(e.to_string()))?;
        Ok(body.available)
    }

    #[instrument(skip(self), fields(domain = %domain, years))]
    async fn purchase(
        &self,
        domain: &DomainName,
        years: u32,
    ) -> Result<PurchaseOutcome, RegistrarError> {
        let contact = Self::contact_json(&PLACEHOLDER_CONTACT);
        let body = serde_json::json!({
            "domain": domain.as_str(),
            "period": years,
            "renewAuto": false,
            "privacy": false,
            "consent": {
                "agreedAt": chrono::Utc::now().to_rfc3339(),
                "agreedBy": PLACEHOLDER_CONTACT.email,
                "agreementKeys": ["DNRA"],
            },
            "contactAdmin": contact.clone(),
            "contactBilling": contact.clone(),
            "contactRegistrant": contact.clone(),
            "contactTech": contact,
        });

        let url = format!("{}/v1/domains/purchase", self.base_url);
        let response = self.client.post(&url).json(&body).send().await?;

        if response.status().is_success() {
            tracing::info!(domain = %domain, years, "Domain purchased");
            return Ok(PurchaseOutcome::Purchased);
        }

        // Rejected purchase: if the account already owns the domain this is
        // the idempotent re-invocation case, not a failure.
        let err = Self::api_error(response).await;
        if self.owns_domain(domain).await.unwrap_or(false) {
            tracing::info!(domain = %domain, "Domain already owned; treating purchase as success");
            return Ok(PurchaseOutcome::AlreadyOwned);
        }
        Err(err)
    }

    #[instrument(skip(self, records), fields(domain = %domain))]
    async fn configure_pages_dns(
        &self,
        domain: &DomainName,
        records: &PagesRecordSet,
    ) -> Result<(), RegistrarError> {
        self.delete_records(domain, "A", "@").await;
        self.delete_records(domain, "AAAA", "@").await;
        self.delete_records(domain, "CNAME", "www").await;

        let a_records: Vec<_> = records
            .apex_a
            .iter()
            .map(|ip| serde_json::json!({"data": ip.to_string(), "ttl": APEX_TTL}))
            .collect();
        self.put_records(domain, "A", "@", a_records).await?;

        let aaaa_records: Vec<_> = records
            .apex_aaaa
            .iter()
            .map(|ip| serde_json::json!({"data": ip.to_string(), "ttl": APEX_TTL}))
            .collect();
        self.put_records(domain, "AAAA", "@", aaaa_records).await?;

        let cname = vec![serde_json::json!({"data": records.www_cname, "ttl": APEX_TTL})];
        self.put_records(domain, "CNAME", "www", cname).await?;

        tracing::info!(domain = %domain, "DNS records replaced for Pages hosting");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use std::net::{Ipv4Addr, Ipv6Addr};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GoDaddyClient {
        let config = GoDaddyConfig {
            api_key: SecretString::from("key"),
            api_secret: SecretString::from("secret"),
        };
        GoDaddyClient::with_base_url(&config, server.uri())
    }

    fn domain(s: &str) -> DomainName {
        DomainName::parse(s).expect("valid domain")
    }

    #[tokio::test]
    async fn test_availability_true() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/domains/available"))
            .and(query_param("domain", "example-test-123.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"available": true, "domain": "example-test-123.com"}),
            ))
            .mount(&server)
            .await;

        let available = client(&server)
            .check_availability(&domain("example-test-123.com"))
            .await
            .expect("ok");
        assert!(available);
    }

    #[tokio::test]
    async fn test_availability_false() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/domains/available"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"available": false})),
            )
            .mount(&server)
            .await;

        let available = client(&server)
            .check_availability(&domain("example-test-123.com"))
            .await
            .expect("ok");
        assert!(!available);
    }

    #[tokio::test]
    async fn test_purchase_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/domains/purchase"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"orderId": 1, "total": 1999})),
            )
            .mount(&server)
            .await;

        let outcome = client(&server)
            .purchase(&domain("mybakery.co.uk"), 2)
            .await
            .expect("ok");
        assert_eq!(outcome, PurchaseOutcome::Purchased);
    }

    #[tokio::test]
    async fn test_purchase_already_owned_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/domains/purchase"))
            .respond_with(ResponseTemplate::new(422).set_body_json(
                serde_json::json!({"code": "UNAVAILABLE_DOMAIN", "message": "not available"}),
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/domains/mybakery.co.uk"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "ACTIVE"})),
            )
            .mount(&server)
            .await;

        let c = client(&server);
        // Re-invocation converges to success both times.
        for _ in 0..2 {
            let outcome = c.purchase(&domain("mybakery.co.uk"), 2).await.expect("ok");
            assert_eq!(outcome, PurchaseOutcome::AlreadyOwned);
        }
    }

    #[tokio::test]
    async fn test_purchase_rejection_without_ownership_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/domains/purchase"))
            .respond_with(ResponseTemplate::new(422).set_body_json(
                serde_json::json!({"code": "UNAVAILABLE_DOMAIN", "message": "not available"}),
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/domains/mybakery.co.uk"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server)
            .purchase(&domain("mybakery.co.uk"), 1)
            .await
            .expect_err("should fail");
        assert!(matches!(err, RegistrarError::Api { status: 422, .. }));
    }

    #[tokio::test]
    async fn test_configure_pages_dns_tolerates_delete_failure() {
        let server = MockServer::start().await;
        // Deletes 404 (nothing to delete) - must not abort.
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let records = PagesRecordSet {
            apex_a: vec![Ipv4Addr::new(185, 199, 108, 153)],
            apex_aaaa: vec!["2606:50c0:8000::153".parse::<Ipv6Addr>().expect("ipv6")],
            www_cname: "pagewright-sites.github.io".to_string(),
        };
        client(&server)
            .configure_pages_dns(&domain("mybakery.co.uk"), &records)
            .await
            .expect("ok");
    }

    #[tokio::test]
    async fn test_configure_pages_dns_add_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(422).set_body_json(
                serde_json::json!({"code": "INVALID_BODY", "message": "bad records"}),
            ))
            .mount(&server)
            .await;

        let records = PagesRecordSet {
            apex_a: vec![Ipv4Addr::new(185, 199, 108, 153)],
            apex_aaaa: vec![],
            www_cname: "pagewright-sites.github.io".to_string(),
        };
        let err = client(&server)
            .configure_pages_dns(&domain("mybakery.co.uk"), &records)
            .await
            .expect_err("should fail");
        assert!(matches!(err, RegistrarError::Api { status: 422, .. }));
    }
}
