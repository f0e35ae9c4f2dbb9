//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::config::{RegistrarConfig, ServerConfig};
use crate::services::dns::DnsClient;
use crate::services::generation::GenerationClient;
use crate::services::hosting::{GitHubClient, NetlifyClient};
use crate::services::payment::StripeClient;
use crate::services::registrar::{GoDaddyClient, NamecheapClient, Registrar};
use crate::session::{InMemorySessionStore, SessionStore};

/// TTL for cached domain availability lookups.
const AVAILABILITY_TTL: Duration = Duration::from_secs(300);

/// Upper bound on cached availability entries.
const AVAILABILITY_CAPACITY: u64 = 10_000;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// session store, provider clients, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    sessions: Arc<dyn SessionStore>,
    registrar: Arc<dyn Registrar>,
    github: GitHubClient,
    netlify: Option<NetlifyClient>,
    stripe: Option<StripeClient>,
    generator: GenerationClient,
    dns: DnsClient,
    availability_cache: Cache<String, bool>,
}

impl AppState {
    /// Create application state with the default in-memory session store
    /// and clients built from configuration.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        Self::with_sessions(config, sessions)
    }

    /// Create application state with an injected session store.
    ///
    /// The store is the one dependency tests routinely substitute.
    #[must_use]
    pub fn with_sessions(config: ServerConfig, sessions: Arc<dyn SessionStore>) -> Self {
        let registrar: Arc<dyn Registrar> = match &config.registrar {
            RegistrarConfig::GoDaddy(gd) => Arc::new(GoDaddyClient::new(gd)),
            RegistrarConfig::Namecheap(nc) => Arc::new(NamecheapClient::new(nc)),
        };
        let github = GitHubClient::new(&config.github);
        let netlify = config.netlify.as_ref().map(NetlifyClient::new);
        let stripe = config.stripe.as_ref().map(StripeClient::new);
        let generator = GenerationClient::new(&config.generation);
        let dns = DnsClient::new();

        let availability_cache = Cache::builder()
            .time_to_live(AVAILABILITY_TTL)
            .max_capacity(AVAILABILITY_CAPACITY)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                sessions,
                registrar,
                github,
                netlify,
                stripe,
                generator,
                dns,
                availability_cache,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get the session store.
    #[must_use]
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.inner.sessions
    }

    /// Get the active registrar client.
    #[must_use]
    pub fn registrar(&self) -> &Arc<dyn Registrar> {
        &self.inner.registrar
    }

    /// Get the GitHub hosting client.
    #[must_use]
    pub fn github(&self) -> &GitHubClient {
        &self.inner.github
    }

    /// Get the Netlify client, if the target is configured.
    #[must_use]
    pub fn netlify(&self) -> Option<&NetlifyClient> {
        self.inner.netlify.as_ref()
    }

    /// Get the Stripe client, if checkout is configured.
    #[must_use]
    pub fn stripe(&self) -> Option<&StripeClient> {
        self.inner.stripe.as_ref()
    }

    /// Get the page generation client.
    #[must_use]
    pub fn generator(&self) -> &GenerationClient {
        &self.inner.generator
    }

    /// Get the DNS-over-HTTPS client.
    #[must_use]
    pub fn dns(&self) -> &DnsClient {
        &self.inner.dns
    }

    /// Get the availability lookup cache.
    #[must_use]
    pub fn availability_cache(&self) -> &Cache<String, bool> {
        &self.inner.availability_cache
    }
}
