//! Domain commands.

use thiserror::Error;

use pagewright_core::DomainName;
use pagewright_server::config::{RegistrarConfig, ServerConfig};
use pagewright_server::services::registrar::{
    GoDaddyClient, NamecheapClient, Registrar, RegistrarError,
};

/// Errors from the domain commands.
#[derive(Debug, Error)]
pub enum DomainCommandError {
    #[error("invalid domain: {0}")]
    Invalid(#[from] pagewright_core::DomainError),
    #[error("configuration error: {0}")]
    Config(#[from] pagewright_server::config::ConfigError),
    #[error(transparent)]
    Registrar(#[from] RegistrarError),
}

/// Validate a domain offline.
pub fn validate(name: &str) -> Result<(), DomainCommandError> {
    let domain = DomainName::parse(name)?;
    tracing::info!(domain = %domain, "Domain is syntactically valid");
    Ok(())
}

/// Query the configured registrar for availability.
pub async fn check(name: &str) -> Result<(), DomainCommandError> {
    let domain = DomainName::parse(name)?;
    let config = ServerConfig::from_env()?;

    let registrar: Box<dyn Registrar> = match &config.registrar {
        RegistrarConfig::GoDaddy(gd) => Box::new(GoDaddyClient::new(gd)),
        RegistrarConfig::Namecheap(nc) => Box::new(NamecheapClient::new(nc)),
    };

    let available = registrar.check_availability(&domain).await?;
    tracing::info!(
        domain = %domain,
        provider = registrar.provider(),
        available,
        "Availability checked"
    );
    Ok(())
}
