//! Pagewright CLI - domain and DNS debugging tools.
//!
//! # Usage
//!
//! ```bash
//! # Validate a domain offline (no network)
//! pw-cli domain validate mybakery.co.uk
//!
//! # Check availability against the configured registrar
//! pw-cli domain check mybakery.co.uk
//!
//! # Check live DNS resolution against the Pages address set
//! pw-cli dns status mybakery.co.uk
//! ```
//!
//! # Commands
//!
//! - `domain validate` - Syntactic validation only
//! - `domain check` - Registrar availability query
//! - `dns status` - DoH resolution of apex + www

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pw-cli")]
#[command(author, version, about = "Pagewright CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect domains
    Domain {
        #[command(subcommand)]
        action: DomainAction,
    },
    /// Inspect DNS state
    Dns {
        #[command(subcommand)]
        action: DnsAction,
    },
}

#[derive(Subcommand)]
enum DomainAction {
    /// Validate a domain name offline
    Validate {
        /// Domain to validate
        name: String,
    },
    /// Query the configured registrar for availability
    Check {
        /// Domain to check
        name: String,
    },
}

#[derive(Subcommand)]
enum DnsAction {
    /// Resolve apex and www records and compare against Pages
    Status {
        /// Domain to resolve
        domain: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Domain { action } => match action {
            DomainAction::Validate { name } => commands::domain::validate(&name)?,
            DomainAction::Check { name } => commands::domain::check(&name).await?,
        },
        Commands::Dns { action } => match action {
            DnsAction::Status { domain } => commands::dns::status(&domain).await?,
        },
    }
    Ok(())
}
