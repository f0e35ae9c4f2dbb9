//! Static-site hosting clients.
//!
//! GitHub Pages is the primary hosting target (and the one full hosting
//! wires DNS to); Netlify is the alternative. Both get their hosting unit
//! names from [`derive_site_name`] so repeated deploys of the same site
//! land on the same unit.

mod github;
mod netlify;

pub use github::{
    GitHubClient, GitHubError, PAGES_IPV4, PAGES_IPV6, PagesStatus,
};
pub use netlify::{Deploy, NetlifyClient, NetlifyError, Site};

use sha2::{Digest, Sha256};

/// Maximum slug length before the hash suffix.
const MAX_SLUG_LEN: usize = 40;

/// Derive a deterministic, collision-resistant hosting unit name.
///
/// Slugifies the seed (domain, or business name when there is no domain)
/// and appends a short content hash, so distinct seeds that slugify alike
/// still get distinct names while the same seed always maps to the same
/// unit.
#[must_use]
pub fn derive_site_name(seed: &str) -> String {
    let slug: String = seed
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug.trim_matches('-');
    let slug: String = {
        let mut collapsed = String::with_capacity(slug.len());
        let mut last_dash = false;
        for c in slug.chars() {
            if c == '-' {
                if !last_dash {
                    collapsed.push(c);
                }
                last_dash = true;
            } else {
                collapsed.push(c);
                last_dash = false;
            }
        }
        collapsed.chars().take(MAX_SLUG_LEN).collect()
    };

    let digest = Sha256::digest(seed.trim().to_ascii_lowercase().as_bytes());
    let suffix = hex::encode(&digest.as_slice()[..3]);

    if slug.is_empty() {
        format!("site-{suffix}")
    } else {
        format!("{slug}-{suffix}")
    }
}
