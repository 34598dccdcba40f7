//! # Verisift - Credibility Server
//!
//! The main binary for Verisift.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for one-off analyses and verifications
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     apps/verisift (THE BINARY)                  │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐    │
//! │  │   CLI       │    │   HTTP API  │    │     Adapters     │    │
//! │  │  (clap)     │    │   (axum)    │    │ (reqwest, pdf)   │    │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘    │
//! │         └──────────────────┼────────────────────┘              │
//! │                            ▼                                   │
//! │                    ┌───────────────┐                           │
//! │                    │    engine     │                           │
//! │                    └───────┬───────┘                           │
//! │                            ▼                                   │
//! │                    ┌───────────────┐                           │
//! │                    │ verisift-core │                           │
//! │                    │  (THE LOGIC)  │                           │
//! │                    └───────────────┘                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! verisift server --host 0.0.0.0 --port 8000
//!
//! # CLI operations
//! verisift analyze --text "Free laptops for every student announced"
//! verisift verify --query "Is the free laptop scheme real"
//! verisift catalog --json-mode
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verisift::cli;

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    init_tracing(cli.verbose);

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise info (debug with `--verbose`).
/// `VERISIFT_LOG_FORMAT=json` enables machine-parseable output.
fn init_tracing(verbose: bool) {
    let log_format = std::env::var("VERISIFT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if verbose {
        "verisift=debug,tower_http=debug"
    } else {
        "verisift=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so `--json-mode` output stays parseable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn print_banner() {
    println!(
        r#"
  __   __  ___  ___  ___  ___  ___  ___  _____
  \ \ / / | __|| _ \|_ _|/ __||_ _|| __||_   _|
   \ V /  | _| |   / | | \__ \ | | | _|   | |
    \_/   |___||_|_\|___||___/|___||_|    |_|

  Credibility Server v{}

  Classify • Corroborate • Cite
"#,
        env!("CARGO_PKG_VERSION")
    );
}
