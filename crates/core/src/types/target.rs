//! Deployment target selection.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Where a generated site gets deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployTarget {
    /// Archive download; nothing is hosted.
    Zip,
    /// GitHub Pages on the provider's default URL.
    GithubPages,
    /// Netlify site on the provider's default URL.
    Netlify,
    /// Purchased custom domain, DNS wired to GitHub Pages.
    FullHosting,
}

impl DeployTarget {
    /// Stable identifier used in checkout metadata and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::GithubPages => "github_pages",
            Self::Netlify => "netlify",
            Self::FullHosting => "full_hosting",
        }
    }

    /// Whether this target requires a purchased custom domain.
    #[must_use]
    pub const fn requires_domain(self) -> bool {
        matches!(self, Self::FullHosting)
    }
}

impl fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
