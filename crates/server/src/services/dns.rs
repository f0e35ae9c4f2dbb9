//! DNS resolution checks over DNS-over-HTTPS.
//!
//! Status polling needs to see what the world resolves, not what the
//! registrar's control panel claims. Queries go through Google's
//! `dns.google/resolve` JSON API so this stays an outbound-HTTPS glue
//! layer like every other provider call.

use std::net::{Ipv4Addr, Ipv6Addr};

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use pagewright_core::DomainName;

const BASE_URL: &str = "https://dns.google/resolve";

/// Record type codes used in queries and answers.
const TYPE_A: u16 = 1;
const TYPE_CNAME: u16 = 5;
const TYPE_AAAA: u16 = 28;

/// Errors that can occur during DNS lookups.
#[derive(Debug, Error)]
pub enum DnsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resolver returned an error response.
    #[error("resolver error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// DoH JSON response envelope.
#[derive(Debug, Deserialize)]
struct DohResponse {
    /// DNS RCODE; 0 is NOERROR.
    #[serde(rename = "Status")]
    status: u32,
    #[serde(rename = "Answer")]
    answer: Option<Vec<DohAnswer>>,
}

/// One answer record.
#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(rename = "type")]
    record_type: u16,
    data: String,
}

/// DNS-over-HTTPS client.
#[derive(Clone)]
pub struct DnsClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for DnsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsClient {
    /// Create a client against the default public resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Create a client pointed at a non-default resolver (tests).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Resolve `name` and return the answer data for `record_type`.
    ///
    /// NXDOMAIN and empty answers come back as an empty vec; only
    /// transport or resolver failures are errors.
    async fn resolve(&self, name: &str, record_type: u16) -> Result<Vec<String>, DnsError> {
        let url = format!(
            "{}?name={}&type={record_type}",
            self.base_url,
            urlencoding::encode(name)
        );
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DnsError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: DohResponse = response
            .json()
            .await
            .map_err(|e| DnsError::Parse(e.to_string()))?;

        if body.status != 0 {
            // NXDOMAIN and friends: the name simply does not resolve yet.
            return Ok(Vec::new());
        }

        Ok(body
            .answer
            .unwrap_or_default()
            .into_iter()
            .filter(|a| a.record_type == record_type)
            .map(|a| a.data)
            .collect())
    }

    /// Whether the apex resolves into the expected hosting address set.
    ///
    /// True when at least one A record exists and every A/AAAA answer is a
    /// member of the expected set; a partial cutover (stale records still
    /// present) does not count as configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolver cannot be reached.
    #[instrument(skip(self, ipv4, ipv6), fields(domain = %domain))]
    pub async fn apex_points_at(
        &self,
        domain: &DomainName,
        ipv4: &[Ipv4Addr],
        ipv6: &[Ipv6Addr],
    ) -> Result<bool, DnsError> {
        let a_records = self.resolve(domain.as_str(), TYPE_A).await?;
        if a_records.is_empty() {
            return Ok(false);
        }
        let all_a_match = a_records
            .iter()
            .all(|data| data.parse::<Ipv4Addr>().is_ok_and(|ip| ipv4.contains(&ip)));
        if !all_a_match {
            return Ok(false);
        }

        // AAAA is optional at the apex, but present records must match.
        let aaaa_records = self.resolve(domain.as_str(), TYPE_AAAA).await?;
        let all_aaaa_match = aaaa_records
            .iter()
            .all(|data| data.parse::<Ipv6Addr>().is_ok_and(|ip| ipv6.contains(&ip)));
        Ok(all_aaaa_match)
    }

    /// Whether `www.<domain>` CNAMEs to the expected target.
    ///
    /// Trailing dots and case are normalized before comparison.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolver cannot be reached.
    #[instrument(skip(self, target), fields(domain = %domain))]
    pub async fn www_cname_matches(
        &self,
        domain: &DomainName,
        target: &str,
    ) -> Result<bool, DnsError> {
        let answers = self.resolve(&domain.www(), TYPE_CNAME).await?;
        let expected = target.trim_end_matches('.').to_ascii_lowercase();
        Ok(answers
            .iter()
            .any(|data| data.trim_end_matches('.').to_ascii_lowercase() == expected))
    }
}
