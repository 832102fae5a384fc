//! # Vitrina - Spreadsheet Storefront
//!
//! The main binary for the Vitrina storefront.
//!
//! This application provides:
//! - HTTP JSON API with per-customer sessions (axum-based)
//! - CLI interface to list the catalog and compose orders
//! - Remote spreadsheet download
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     apps/vitrina (THE BINARY)                   │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐   │
//! │  │   CLI       │    │   HTTP API  │    │  Remote Fetch    │   │
//! │  │  (clap)     │    │   (axum)    │    │  (reqwest)       │   │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘   │
//! │         │                  │                    │              │
//! │         └──────────────────┼────────────────────┘              │
//! │                            ▼                                   │
//! │                    ┌───────────────┐                           │
//! │                    │ vitrina-core  │                           │
//! │                    │ (THE LOGIC)   │                           │
//! │                    └───────────────┘                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! vitrina server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! vitrina catalog
//! vitrina order -s 0=2 -s 3=1 -f nombre=Ana -f email=ana@example.com
//! vitrina fetch -o productos.xlsx
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrina::cli;

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // VITRINA_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("VITRINA_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vitrina=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    // The banner would corrupt JSON output.
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Vitrina startup banner.
fn print_banner() {
    println!(
        r#"
  ██╗   ██╗██╗████████╗██████╗ ██╗███╗   ██╗ █████╗
  ██║   ██║██║╚══██╔══╝██╔══██╗██║████╗  ██║██╔══██╗
  ██║   ██║██║   ██║   ██████╔╝██║██╔██╗ ██║███████║
  ╚██╗ ██╔╝██║   ██║   ██╔══██╗██║██║╚██╗██║██╔══██║
   ╚████╔╝ ██║   ██║   ██║  ██║██║██║ ╚████║██║  ██║
    ╚═══╝  ╚═╝   ╚═╝   ╚═╝  ╚═╝╚═╝╚═╝  ╚═══╝╚═╝  ╚═╝

  Spreadsheet Storefront v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
