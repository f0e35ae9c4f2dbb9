//! Deployment pipeline orchestration.
//!
//! One parameterized pipeline covers every hosted target instead of a
//! handler per variant: optional domain purchase, optional DNS wiring,
//! content push, serving enablement. Each step has the same contract -
//! record progress in the session on success, record a `failed` phase with
//! the step name on a fatal error - so partial failures (DNS rejected after
//! a successful purchase) leave enough state behind to resume without
//! re-purchasing.
//!
//! Status evaluation lives here too: each poll re-derives the observed
//! phase from provider and DNS signals, and the caller merges it into the
//! session through the forward-only [`DeploymentPhase::advance`].

use std::time::Duration;

use pagewright_core::{DeploymentPhase, DomainName};

use crate::error::{AppError, Result};
use crate::services::hosting::{PAGES_IPV4, PAGES_IPV6, derive_site_name};
use crate::services::registrar::{PagesRecordSet, PurchaseOutcome};
use crate::session::{DomainPurchase, HostingUnit, Session};
use crate::state::AppState;

/// Delay before the post-deploy domain-binding nudge commit.
const NUDGE_DELAY: Duration = Duration::from_secs(30);

/// Which optional steps the pipeline runs.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Ensure the session's domain is owned before deploying.
    pub purchase_domain: bool,
    /// Replace registrar DNS records to point at Pages.
    pub configure_dns: bool,
    /// Registration period for a purchase, in years.
    pub years: u32,
}

impl PipelineOptions {
    /// GitHub Pages on the default URL: no domain, no DNS.
    #[must_use]
    pub const fn github_only() -> Self {
        Self {
            purchase_domain: false,
            configure_dns: false,
            years: 0,
        }
    }

    /// Full hosting: purchase, DNS, deploy, serve.
    #[must_use]
    pub const fn full_hosting(years: u32) -> Self {
        Self {
            purchase_domain: true,
            configure_dns: true,
            years,
        }
    }
}

/// What the pipeline produced.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    /// Final repository name.
    pub repo: String,
    /// Public URL the site serves (or will serve) from.
    pub url: String,
}

/// Run the GitHub-backed deployment pipeline for a session.
///
/// The session is mutated in place as steps complete; the caller persists
/// it afterwards - including after an error, so the recorded `failed`
/// state survives.
///
/// # Errors
///
/// Returns the first fatal step error. Enabling serving is best-effort and
/// never fails the pipeline.
pub async fn run_pipeline(
    state: &AppState,
    session: &mut Session,
    opts: PipelineOptions,
) -> Result<DeployOutcome> {
    if session.pages.is_empty() {
        return Err(AppError::BadRequest(
            "no generated pages in session; call generate first".to_string(),
        ));
    }

    let domain = session.domain.clone();

    if opts.purchase_domain {
        let Some(domain) = domain.as_ref() else {
            return Err(AppError::BadRequest(
                "full hosting requires a domain on the session".to_string(),
            ));
        };
        purchase_step(state, session, domain, opts.years).await?;
    }

    if opts.configure_dns {
        let Some(domain) = domain.as_ref() else {
            return Err(AppError::BadRequest(
                "DNS configuration requires a domain on the session".to_string(),
            ));
        };
        dns_step(state, session, domain).await?;
    }

    let outcome = deploy_step(state, session, domain.as_ref()).await?;

    session.advance_phase(DeploymentPhase::Deployed);
    Ok(outcome)
}

/// Ensure the domain is owned. Idempotent: an already-purchased session or
/// an "already owned" registrar reply both count as success.
///
/// A rejected purchase does not mark the session failed - nothing has been
/// provisioned yet and the user can retry with a different domain.
pub(crate) async fn purchase_step(
    state: &AppState,
    session: &mut Session,
    domain: &DomainName,
    years: u32,
) -> Result<()> {
    if session
        .purchase
        .as_ref()
        .is_some_and(|p| &p.domain == domain)
    {
        tracing::info!(domain = %domain, "Domain already purchased in this session");
        return Ok(());
    }

    // Financial operation: exactly one attempt.
    let outcome = state.registrar().purchase(domain, years).await?;
    session.purchase = Some(DomainPurchase {
        domain: domain.clone(),
        years,
        status: outcome.as_str().to_string(),
    });
    session.advance_phase(DeploymentPhase::Purchased);
    if matches!(outcome, PurchaseOutcome::AlreadyOwned) {
        tracing::info!(domain = %domain, "Registrar reports domain already owned");
    }
    Ok(())
}

/// Point the domain at GitHub Pages. Fatal on failure: without the record
/// replace the domain never resolves.
async fn dns_step(state: &AppState, session: &mut Session, domain: &DomainName) -> Result<()> {
    let records = PagesRecordSet {
        apex_a: PAGES_IPV4.to_vec(),
        apex_aaaa: PAGES_IPV6.to_vec(),
        www_cname: state.github().pages_host(),
    };

    match state
        .registrar()
        .configure_pages_dns(domain, &records)
        .await
    {
        Ok(()) => Ok(()),
        Err(e) => {
            session.fail("dns", e.to_string());
            Err(e.into())
        }
    }
}

/// Create or reuse the repository, push content, enable serving.
async fn deploy_step(
    state: &AppState,
    session: &mut Session,
    domain: Option<&DomainName>,
) -> Result<DeployOutcome> {
    let seed = domain.map_or_else(
        || {
            session
                .business_name
                .clone()
                .unwrap_or_else(|| session.id.to_string())
        },
        ToString::to_string,
    );
    let name = derive_site_name(&seed);

    let repo = match state.github().ensure_repo(&name).await {
        Ok(repo) => repo,
        Err(e) => {
            session.fail("deploy", e.to_string());
            return Err(e.into());
        }
    };

    if let Err(e) = state
        .github()
        .push_site(&repo, &session.pages, domain, "Deploy generated site")
        .await
    {
        session.fail("deploy", e.to_string());
        return Err(e.into());
    }

    // Serving is not implied by the push; enable it explicitly. Best-effort:
    // a failure here still leaves a working default URL once Pages builds.
    let url = match state.github().enable_pages(&repo, domain).await {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(
                repo = %repo,
                error = %e,
                "Enabling Pages failed; falling back to default URL"
            );
            state.github().default_url(&repo)
        }
    };

    if let Some(domain) = domain {
        spawn_nudge(state.clone(), repo.clone(), domain.clone());
    }

    session.hosting = Some(HostingUnit {
        name: repo.clone(),
        url: url.clone(),
    });

    Ok(DeployOutcome { repo, url })
}

/// Issue the delayed domain-binding nudge commit in the background.
///
/// Pages sometimes ignores a CNAME bound while the first build is in
/// flight; touching the file after a delay makes it re-check. Failures are
/// logged and dropped - the poll loop's signals are the source of truth.
fn spawn_nudge(state: AppState, repo: String, domain: DomainName) {
    tokio::spawn(async move {
        tokio::time::sleep(NUDGE_DELAY).await;
        if let Err(e) = state.github().nudge_domain(&repo, &domain).await {
            tracing::warn!(repo = %repo, error = %e, "Domain-binding nudge failed");
        }
    });
}

/// Signals observed by one status poll.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusSignals {
    /// Hosting provider reports the domain bound and verified.
    pub provider_verified: bool,
    /// Direct resolution shows apex + `www` pointing at Pages.
    pub dns_resolves: bool,
    /// Hosting provider reports the content build complete.
    pub build_complete: bool,
}

/// Re-evaluate every deployment signal for a session, from scratch.
///
/// Never fails: an unreachable provider just means the corresponding
/// signal stays off for this poll, and the forward-only phase merge keeps
/// previously confirmed progress.
pub async fn evaluate_status(state: &AppState, session: &Session) -> (DeploymentPhase, StatusSignals) {
    let mut signals = StatusSignals::default();
    let mut observed = DeploymentPhase::Unconfigured;

    if session.purchase.is_some() {
        observed = observed.advance(DeploymentPhase::Purchased);
    }

    let Some(hosting) = session.hosting.as_ref() else {
        return (observed, signals);
    };
    observed = observed.advance(DeploymentPhase::Deployed);

    let pages = match state.github().pages_status(&hosting.name).await {
        Ok(pages) => pages,
        Err(e) => {
            tracing::warn!(repo = %hosting.name, error = %e, "Pages status probe failed");
            None
        }
    };
    if let Some(pages) = &pages {
        signals.provider_verified = pages.domain_verified;
        signals.build_complete = pages.built;
    }

    if let Some(domain) = session.domain.as_ref() {
        signals.dns_resolves = dns_resolves(state, domain).await;

        // Two independent confirmations; either alone advances the phase.
        if signals.provider_verified || signals.dns_resolves {
            observed = observed.advance(DeploymentPhase::DnsConfigured);
        }
        if signals.build_complete && observed.dns_configured() {
            observed = observed.advance(DeploymentPhase::HttpsReady);
        }
    } else if signals.build_complete {
        // No custom domain: a completed build already serves over HTTPS on
        // the provider URL.
        observed = observed.advance(DeploymentPhase::DnsConfigured);
        observed = observed.advance(DeploymentPhase::HttpsReady);
    }

    (observed, signals)
}

/// Direct-resolution signal: apex on the Pages address set and `www`
/// CNAMEd at the owner's Pages host.
async fn dns_resolves(state: &AppState, domain: &DomainName) -> bool {
    let apex = match state
        .dns()
        .apex_points_at(domain, &PAGES_IPV4, &PAGES_IPV6)
        .await
    {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!(domain = %domain, error = %e, "Apex resolution probe failed");
            false
        }
    };
    if !apex {
        return false;
    }

    match state
        .dns()
        .www_cname_matches(domain, &state.github().pages_host())
        .await
    {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!(domain = %domain, error = %e, "www CNAME probe failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_options_presets() {
        let github = PipelineOptions::github_only();
        assert!(!github.purchase_domain);
        assert!(!github.configure_dns);

        let full = PipelineOptions::full_hosting(2);
        assert!(full.purchase_domain);
        assert!(full.configure_dns);
        assert_eq!(full.years, 2);
    }
}
