//! DNS commands.

use thiserror::Error;

use pagewright_core::DomainName;
use pagewright_server::config::ServerConfig;
use pagewright_server::services::dns::{DnsClient, DnsError};
use pagewright_server::services::hosting::{PAGES_IPV4, PAGES_IPV6};

/// Errors from the DNS commands.
#[derive(Debug, Error)]
pub enum DnsCommandError {
    #[error("invalid domain: {0}")]
    Invalid(#[from] pagewright_core::DomainError),
    #[error("configuration error: {0}")]
    Config(#[from] pagewright_server::config::ConfigError),
    #[error(transparent)]
    Dns(#[from] DnsError),
}

/// Resolve apex and www for a domain and compare against the Pages set.
pub async fn status(name: &str) -> Result<(), DnsCommandError> {
    let domain = DomainName::parse(name)?;
    let config = ServerConfig::from_env()?;
    let client = DnsClient::new();

    let apex = client
        .apex_points_at(&domain, &PAGES_IPV4, &PAGES_IPV6)
        .await?;
    let www_target = format!("{}.github.io", config.github.owner);
    let www = client.www_cname_matches(&domain, &www_target).await?;

    tracing::info!(
        domain = %domain,
        apex_configured = apex,
        www_configured = www,
        dns_configured = apex && www,
        "DNS status"
    );
    Ok(())
}
