//! Session model and store.
//!
//! A session accumulates one user's in-progress state across the multi-step
//! flow: form answers, generated pages, purchased domain, deployment
//! progress. Sessions are created on first write and live for the process
//! lifetime; a client that stops polling simply abandons its session.
//!
//! The store is a trait injected through [`crate::state::AppState`] so
//! handlers never touch a global map and tests can substitute doubles. The
//! shipped implementation is in-memory; anything key-value shaped (Redis,
//! sqlite) could back the same interface.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use pagewright_core::{
    DeployTarget, DeploymentPhase, DomainName, GeneratedPage, PageStub, SessionId,
};

/// Domain purchase record held in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainPurchase {
    /// The purchased domain.
    pub domain: DomainName,
    /// Registration period in years.
    pub years: u32,
    /// Registrar-assigned status string, e.g. "purchased" or "already_owned".
    pub status: String,
}

/// Hosting unit record: where the generated site lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostingUnit {
    /// Repository or site name at the hosting provider.
    pub name: String,
    /// Public URL the site serves from.
    pub url: String,
}

/// One user's accumulated generation/deployment state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Client-supplied identifier.
    pub id: SessionId,
    /// Business name collected by the form.
    pub business_name: Option<String>,
    /// Planned page structure (title/filename pairs).
    pub structure: Vec<PageStub>,
    /// Generated pages, in order.
    pub pages: Vec<GeneratedPage>,
    /// Requested custom domain, if any.
    pub domain: Option<DomainName>,
    /// Selected deployment target.
    pub deploy_target: Option<DeployTarget>,
    /// Domain purchase record, once the registrar confirms.
    pub purchase: Option<DomainPurchase>,
    /// Hosting unit, once deploy creates or reuses one.
    pub hosting: Option<HostingUnit>,
    /// Deployment phase; only ever moves forward.
    pub phase: DeploymentPhase,
    /// Human-readable failure message; set exactly when `phase` is `Failed`.
    pub failure: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session.
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            business_name: None,
            structure: Vec::new(),
            pages: Vec::new(),
            domain: None,
            deploy_target: None,
            purchase: None,
            hosting: None,
            phase: DeploymentPhase::default(),
            failure: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a freshly observed phase; state never regresses.
    pub fn advance_phase(&mut self, observed: DeploymentPhase) {
        self.phase = self.phase.advance(observed);
        self.updated_at = Utc::now();
    }

    /// Record an unrecoverable failure at `step`.
    ///
    /// The domain and purchase record are preserved so a human or retry job
    /// can resume without re-purchasing.
    pub fn fail(&mut self, step: &str, message: impl Into<String>) {
        self.phase = self.phase.advance(DeploymentPhase::Failed);
        self.failure = Some(format!("{step}: {}", message.into()));
        self.updated_at = Utc::now();
    }

    /// Whether the session has terminally failed.
    #[must_use]
    pub const fn failed(&self) -> bool {
        matches!(self.phase, DeploymentPhase::Failed)
    }
}

/// Key-value session store interface.
///
/// Get/put/delete over whole sessions; handlers read-modify-write. There is
/// no cross-request locking: last write wins, which is acceptable for a
/// low-traffic glue layer where one browser drives one session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a session by identifier.
    async fn get(&self, id: &SessionId) -> Option<Session>;

    /// Insert or replace a session.
    async fn put(&self, session: Session);

    /// Remove a session.
    async fn delete(&self, id: &SessionId);

    /// Fetch a session, creating an empty one if absent.
    async fn get_or_create(&self, id: &SessionId) -> Session {
        match self.get(id).await {
            Some(session) => session,
            None => {
                let session = Session::new(id.clone());
                self.put(session.clone()).await;
                session
            }
        }
    }
}

/// In-memory session store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &SessionId) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn put(&self, session: Session) {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
    }

    async fn delete(&self, id: &SessionId) {
        self.sessions.write().await.remove(id);
    }
}
