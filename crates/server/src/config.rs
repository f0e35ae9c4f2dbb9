//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GENERATION_API_KEY` - Anthropic API key for page generation
//! - `GITHUB_TOKEN` - GitHub token with `repo` scope (contents + pages)
//! - `GITHUB_OWNER` - Account that owns the hosting repositories
//! - Registrar credentials for the configured provider:
//!   - GoDaddy: `GODADDY_API_KEY`, `GODADDY_API_SECRET`
//!   - Namecheap: `NAMECHEAP_API_USER`, `NAMECHEAP_API_KEY`,
//!     `NAMECHEAP_CLIENT_IP`
//!
//! ## Optional
//! - `PAGEWRIGHT_HOST` - Bind address (default: 127.0.0.1)
//! - `PAGEWRIGHT_PORT` - Listen port (default: 8080)
//! - `PAGEWRIGHT_BASE_URL` - Public URL (default: http://localhost:8080)
//! - `REGISTRAR_PROVIDER` - `godaddy` (default) or `namecheap`
//! - `GENERATION_MODEL` - Model ID (default: claude-sonnet-4-20250514)
//! - `NETLIFY_TOKEN` - Enables the Netlify deployment target
//! - `STRIPE_SECRET_KEY` - Enables checkout; with it:
//!   - `CHECKOUT_SUCCESS_URL`, `CHECKOUT_CANCEL_URL`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the API
    pub base_url: String,
    /// Page generation (Anthropic) configuration
    pub generation: GenerationConfig,
    /// Registrar provider configuration
    pub registrar: RegistrarConfig,
    /// GitHub hosting configuration
    pub github: GitHubConfig,
    /// Netlify hosting configuration (optional target)
    pub netlify: Option<NetlifyConfig>,
    /// Stripe checkout configuration (optional - disables checkout if unset)
    pub stripe: Option<StripeConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
}

/// Anthropic Messages API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GenerationConfig {
    /// Anthropic API key
    pub api_key: SecretString,
    /// Model ID (e.g., claude-sonnet-4-20250514)
    pub model: String,
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

/// Which registrar handles availability, purchase, and DNS.
#[derive(Debug, Clone)]
pub enum RegistrarConfig {
    /// GoDaddy registrar API.
    GoDaddy(GoDaddyConfig),
    /// Namecheap registrar API.
    Namecheap(NamecheapConfig),
}

/// GoDaddy API credentials.
#[derive(Clone)]
pub struct GoDaddyConfig {
    /// API key
    pub api_key: SecretString,
    /// API secret
    pub api_secret: SecretString,
}

impl std::fmt::Debug for GoDaddyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoDaddyConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Namecheap API credentials.
///
/// Namecheap authenticates requests by API user + key and additionally
/// requires the caller's allow-listed IP on every call.
#[derive(Clone)]
pub struct NamecheapConfig {
    /// API user (account name)
    pub api_user: String,
    /// API key
    pub api_key: SecretString,
    /// Allow-listed client IP sent with every request
    pub client_ip: String,
}

impl std::fmt::Debug for NamecheapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamecheapConfig")
            .field("api_user", &self.api_user)
            .field("api_key", &"[REDACTED]")
            .field("client_ip", &self.client_ip)
            .finish()
    }
}

/// GitHub hosting configuration.
#[derive(Clone)]
pub struct GitHubConfig {
    /// Token with `repo` scope
    pub token: SecretString,
    /// Account owning the hosting repositories
    pub owner: String,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &"[REDACTED]")
            .field("owner", &self.owner)
            .finish()
    }
}

/// Netlify hosting configuration.
#[derive(Clone)]
pub struct NetlifyConfig {
    /// Personal access token
    pub token: SecretString,
}

impl std::fmt::Debug for NetlifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetlifyConfig")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Stripe checkout configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key
    pub secret_key: SecretString,
    /// Redirect URL after successful payment
    pub success_url: String,
    /// Redirect URL after cancelled payment
    pub cancel_url: String,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field("success_url", &self.success_url)
            .field("cancel_url", &self.cancel_url)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    /// Missing registrar or generation credentials fail here, before any
    /// request is served, rather than on first use.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("PAGEWRIGHT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PAGEWRIGHT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("PAGEWRIGHT_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PAGEWRIGHT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_env_or_default("PAGEWRIGHT_BASE_URL", "http://localhost:8080");

        let generation = GenerationConfig::from_env()?;
        let registrar = RegistrarConfig::from_env()?;
        let github = GitHubConfig::from_env()?;
        let netlify = NetlifyConfig::from_env();
        let stripe = StripeConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            base_url,
            generation,
            registrar,
            github,
            netlify,
            stripe,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl GenerationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_required_secret("GENERATION_API_KEY")?,
            model: get_env_or_default("GENERATION_MODEL", "claude-sonnet-4-20250514"),
        })
    }
}

impl RegistrarConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let provider = get_env_or_default("REGISTRAR_PROVIDER", "godaddy");
        match provider.as_str() {
            "godaddy" => Ok(Self::GoDaddy(GoDaddyConfig {
                api_key: get_required_secret("GODADDY_API_KEY")?,
                api_secret: get_required_secret("GODADDY_API_SECRET")?,
            })),
            "namecheap" => Ok(Self::Namecheap(NamecheapConfig {
                api_user: get_required_env("NAMECHEAP_API_USER")?,
                api_key: get_required_secret("NAMECHEAP_API_KEY")?,
                client_ip: get_required_env("NAMECHEAP_CLIENT_IP")?,
            })),
            other => Err(ConfigError::InvalidEnvVar(
                "REGISTRAR_PROVIDER".to_string(),
                format!("unknown provider '{other}' (expected godaddy or namecheap)"),
            )),
        }
    }
}

impl GitHubConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            token: get_required_secret("GITHUB_TOKEN")?,
            owner: get_required_env("GITHUB_OWNER")?,
        })
    }
}

impl NetlifyConfig {
    fn from_env() -> Option<Self> {
        let token = get_optional_env("NETLIFY_TOKEN")?;
        Some(Self {
            token: SecretString::from(token),
        })
    }
}

impl StripeConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(secret_key) = get_optional_env("STRIPE_SECRET_KEY") else {
            return Ok(None);
        };
        Ok(Some(Self {
            secret_key: SecretString::from(secret_key),
            success_url: get_required_env("CHECKOUT_SUCCESS_URL")?,
            cancel_url: get_required_env("CHECKOUT_CANCEL_URL")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 8080,
            base_url: "http://localhost:8080".to_string(),
            generation: GenerationConfig {
                api_key: SecretString::from("sk-ant-test"),
                model: "claude-sonnet-4-20250514".to_string(),
            },
            registrar: RegistrarConfig::GoDaddy(GoDaddyConfig {
                api_key: SecretString::from("gd_key"),
                api_secret: SecretString::from("gd_secret"),
            }),
            github: GitHubConfig {
                token: SecretString::from("ghp_token_value"),
                owner: "pagewright-sites".to_string(),
            },
            netlify: None,
            stripe: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = test_config();
        let debug_output = format!("{config:?}");

        // Public fields should be visible
        assert!(debug_output.contains("pagewright-sites"));
        assert!(debug_output.contains("claude-sonnet-4-20250514"));

        // Secret fields should be redacted
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("ghp_token_value"));
        assert!(!debug_output.contains("gd_secret"));
        assert!(!debug_output.contains("sk-ant-test"));
    }

    #[test]
    fn test_namecheap_debug_redacts_key() {
        let config = NamecheapConfig {
            api_user: "pwuser".to_string(),
            api_key: SecretString::from("nc_key_value"),
            client_ip: "203.0.113.7".to_string(),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("pwuser"));
        assert!(debug_output.contains("203.0.113.7"));
        assert!(!debug_output.contains("nc_key_value"));
    }
}
