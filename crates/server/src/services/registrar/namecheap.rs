//! Namecheap registrar client.
//!
//! Namecheap's API speaks XML over GET. The responses used here are flat
//! single-element envelopes, so values are pulled out by attribute rather
//! than through a full XML tree.
//!
//! DNS for Namecheap is one `setHosts` call that replaces the entire host
//! record list, which collapses the delete-then-add sequence other
//! registrars need into a single atomic replace.

use async_trait::async_trait;
use regex::Regex;
use secrecy::ExposeSecret;
use tracing::instrument;

use pagewright_core::DomainName;

use crate::config::NamecheapConfig;

use super::{PLACEHOLDER_CONTACT, PagesRecordSet, PurchaseOutcome, Registrar, RegistrarError};

const BASE_URL: &str = "https://api.namecheap.com/xml.response";

/// TTL installed on replaced host records.
const HOST_TTL: &str = "600";

/// Namecheap API client.
#[derive(Clone)]
pub struct NamecheapClient {
    client: reqwest::Client,
    base_url: String,
    api_user: String,
    api_key: String,
    client_ip: String,
}

impl NamecheapClient {
    /// Create a new Namecheap client.
    #[must_use]
    pub fn new(config: &NamecheapConfig) -> Self {
        Self::with_base_url(config, BASE_URL)
    }

    /// Create a client pointed at a non-default endpoint (tests).
    #[must_use]
    pub fn with_base_url(config: &NamecheapConfig, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_user: config.api_user.clone(),
            api_key: config.api_key.expose_secret().to_string(),
            client_ip: config.client_ip.clone(),
        }
    }

    /// Issue a command with the common auth parameters plus `params`.
    async fn command(
        &self,
        command: &str,
        params: &[(&str, &str)],
    ) -> Result<String, RegistrarError> {
        let mut query: Vec<(&str, &str)> = vec![
            ("ApiUser", self.api_user.as_str()),
            ("ApiKey", self.api_key.as_str()),
            ("UserName", self.api_user.as_str()),
            ("ClientIp", self.client_ip.as_str()),
            ("Command", command),
        ];
        query.extend_from_slice(params);

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(RegistrarError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(body)
    }

    /// Whether the account owns `domain` (the idempotency probe).
    async fn owns_domain(&self, domain: &DomainName) -> bool {
        let Ok(body) = self
            .command("namecheap.domains.getinfo", &[("DomainName", domain.as_str())])
            .await
        else {
            return false;
        };
        matches!(xml_attr(&body, "ApiResponse", "Status").as_deref(), Some("OK"))
    }

    /// Split a domain into Namecheap's SLD/TLD pair.
    fn split_sld_tld(domain: &DomainName) -> (String, String) {
        let s = domain.as_str();
        match s.split_once('.') {
            Some((sld, tld)) => (sld.to_string(), tld.to_string()),
            None => (s.to_string(), String::new()),
        }
    }

    fn contact_params(years: &str, domain: &str) -> Vec<(String, String)> {
        let c = PLACEHOLDER_CONTACT;
        let mut params = vec![
            ("DomainName".to_string(), domain.to_string()),
            ("Years".to_string(), years.to_string()),
        ];
        for role in ["Registrant", "Tech", "Admin", "AuxBilling"] {
            params.push((format!("{role}FirstName"), c.first_name.to_string()));
            params.push((format!("{role}LastName"), c.last_name.to_string()));
            params.push((format!("{role}Address1"), c.address.to_string()));
            params.push((format!("{role}City"), c.city.to_string()));
            params.push((format!("{role}StateProvince"), c.state.to_string()));
            params.push((format!("{role}PostalCode"), c.postal_code.to_string()));
            params.push((format!("{role}Country"), c.country.to_string()));
            params.push((format!("{role}Phone"), c.phone.to_string()));
            params.push((format!("{role}EmailAddress"), c.email.to_string()));
        }
        params
    }
}

#[async_trait]
impl Registrar for NamecheapClient {
    fn provider(&self) -> &'static str {
        "namecheap"
    }

    #[instrument(skip(self), fields(domain = %domain))]
    async fn check_availability(&self, domain: &DomainName) -> Result<bool, RegistrarError> {
        let body = self
            .command("namecheap.domains.check", &[("DomainList", domain.as_str())])
            .await?;

        if let Some(message) = xml_error(&body) {
            return Err(RegistrarError::Api {
                status: 0,
                message,
            });
        }

        xml_attr(&body, "DomainCheckResult", "Available")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .ok_or_else(|| RegistrarError::Parse("missing DomainCheckResult".to_string()))
    }

    #[instrument(skip(self), fields(domain = %domain, years))]
    async fn purchase(
        &self,
        domain: &DomainName,
        years: u32,
    ) -> Result<PurchaseOutcome, RegistrarError> {
        let years_str = years.to_string();
        let params = Self::contact_params(&years_str, domain.as_str());
        let params_ref: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let body = self.command("namecheap.domains.create", &params_ref).await?;

        if let Some(message) = xml_error(&body) {
            // Rejected: if the account already owns the domain this is the
            // idempotent re-invocation case.
            if self.owns_domain(domain).await {
                tracing::info!(
                    domain = %domain,
                    "Domain already owned; treating purchase as success"
                );
                return Ok(PurchaseOutcome::AlreadyOwned);
            }
            return Err(RegistrarError::Api { status: 0, message });
        }

        let registered = xml_attr(&body, "DomainCreateResult", "Registered")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .ok_or_else(|| RegistrarError::Parse("missing DomainCreateResult".to_string()))?;

        if registered {
            tracing::info!(domain = %domain, years, "Domain purchased");
            Ok(PurchaseOutcome::Purchased)
        } else {
            Err(RegistrarError::Api {
                status: 0,
                message: "registrar reported Registered=false".to_string(),
            })
        }
    }

    #[instrument(skip(self, records), fields(domain = %domain))]
    async fn configure_pages_dns(
        &self,
        domain: &DomainName,
        records: &PagesRecordSet,
    ) -> Result<(), RegistrarError> {
        let (sld, tld) = Self::split_sld_tld(domain);

        // setHosts replaces the full record list in one call; building the
        // desired end state is the delete-and-add in one step.
        let mut params: Vec<(String, String)> =
            vec![("SLD".to_string(), sld), ("TLD".to_string(), tld)];
        let mut n = 0;
        for ip in &records.apex_a {
            n += 1;
            params.push((format!("HostName{n}"), "@".to_string()));
            params.push((format!("RecordType{n}"), "A".to_string()));
            params.push((format!("Address{n}"), ip.to_string()));
            params.push((format!("TTL{n}"), HOST_TTL.to_string()));
        }
        for ip in &records.apex_aaaa {
            n += 1;
            params.push((format!("HostName{n}"), "@".to_string()));
            params.push((format!("RecordType{n}"), "AAAA".to_string()));
            params.push((format!("Address{n}"), ip.to_string()));
            params.push((format!("TTL{n}"), HOST_TTL.to_string()));
        }
        n += 1;
        params.push((format!("HostName{n}"), "www".to_string()));
        params.push((format!("RecordType{n}"), "CNAME".to_string()));
        params.push((format!("Address{n}"), records.www_cname.clone()));
        params.push((format!("TTL{n}"), HOST_TTL.to_string()));

        let params_ref: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let body = self
            .command("namecheap.domains.dns.setHosts", &params_ref)
            .await?;

        if let Some(message) = xml_error(&body) {
            return Err(RegistrarError::Api { status: 0, message });
        }

        let ok = xml_attr(&body, "DomainDNSSetHostsResult", "IsSuccess")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .ok_or_else(|| RegistrarError::Parse("missing DomainDNSSetHostsResult".to_string()))?;

        if ok {
            tracing::info!(domain = %domain, "DNS records replaced for Pages hosting");
            Ok(())
        } else {
            Err(RegistrarError::Api {
                status: 0,
                message: "registrar reported IsSuccess=false".to_string(),
            })
        }
    }
}

/// Pull one attribute value off the first occurrence of `element`.
fn xml_attr(xml: &str, element: &str, attr: &str) -> Option<String> {
    let pattern = format!(r#"<{element}\b[^>]*\b{attr}="([^"]*)""#);
    let re = Regex::new(&pattern).ok()?;
    re.captures(xml)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the first `<Error>` message, if the envelope carries one.
fn xml_error(xml: &str) -> Option<String> {
    let re = Regex::new(r"<Error\b[^>]*>([^<]*)</Error>").ok()?;
    re.captures(xml)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
