//! Domain registrar clients.
//!
//! # Architecture
//!
//! Two registrar backends exist behind one [`Registrar`] trait: GoDaddy
//! (JSON API) and Namecheap (XML API). The live provider is selected by
//! `REGISTRAR_PROVIDER` at startup; handlers only ever see the trait
//! object, so swapping providers touches nothing but configuration.
//!
//! Purchase is "ensure owned": if the registrar rejects a purchase because
//! the account already holds the domain, that is reported as
//! [`PurchaseOutcome::AlreadyOwned`], not an error. Purchase calls are
//! never retried automatically.

mod godaddy;
mod namecheap;

use std::net::{Ipv4Addr, Ipv6Addr};

use async_trait::async_trait;
use thiserror::Error;

use pagewright_core::DomainName;

pub use godaddy::GoDaddyClient;
pub use namecheap::NamecheapClient;

/// Errors that can occur when talking to a registrar.
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Registrar returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status (or provider error number for XML APIs).
        status: u16,
        /// Provider message.
        message: String,
    },

    /// Failed to parse a registrar response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Outcome of an idempotent-ensure purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// The registrar registered the domain on this call.
    Purchased,
    /// The account already owned the domain; treated as success.
    AlreadyOwned,
}

impl PurchaseOutcome {
    /// Status string recorded in the session.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Purchased => "purchased",
            Self::AlreadyOwned => "already_owned",
        }
    }
}

/// The record set that points a domain at GitHub Pages: A/AAAA at the apex
/// plus a `www` CNAME at the owner's Pages subdomain.
#[derive(Debug, Clone)]
pub struct PagesRecordSet {
    /// Apex A records.
    pub apex_a: Vec<Ipv4Addr>,
    /// Apex AAAA records.
    pub apex_aaaa: Vec<Ipv6Addr>,
    /// Target of the `www` CNAME, e.g. `owner.github.io`.
    pub www_cname: String,
}

/// Registrar operations used by the deployment pipeline.
#[async_trait]
pub trait Registrar: Send + Sync {
    /// Provider name for logs and the DNS status endpoint.
    fn provider(&self) -> &'static str;

    /// Whether `domain` is available for registration.
    ///
    /// Read-only; callers may retry with backoff.
    async fn check_availability(&self, domain: &DomainName) -> Result<bool, RegistrarError>;

    /// Ensure the account owns `domain`, registering it for `years` if
    /// necessary. Never retried: this moves money.
    async fn purchase(
        &self,
        domain: &DomainName,
        years: u32,
    ) -> Result<PurchaseOutcome, RegistrarError>;

    /// Replace the domain's records with the given Pages set.
    ///
    /// Removal of pre-existing apex A/AAAA and `www` CNAME records is
    /// best-effort; installing the new set is the call that must succeed.
    async fn configure_pages_dns(
        &self,
        domain: &DomainName,
        records: &PagesRecordSet,
    ) -> Result<(), RegistrarError>;
}

/// Fixed placeholder registrant used for purchase requests.
///
/// Real contact data never flows through this service; the registrar
/// account's own details are what matter for ownership.
#[derive(Debug, Clone, Copy)]
pub struct RegistrantContact {
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub address: &'static str,
    pub city: &'static str,
    pub state: &'static str,
    pub postal_code: &'static str,
    pub country: &'static str,
}

/// The placeholder contact submitted with every purchase.
pub const PLACEHOLDER_CONTACT: RegistrantContact = RegistrantContact {
    first_name: "Site",
    last_name: "Admin",
    email: "admin@pagewright.io",
    phone: "+44.2030000000",
    address: "1 Placeholder Street",
    city: "London",
    state: "LND",
    postal_code: "EC1A 1AA",
    country: "GB",
};
