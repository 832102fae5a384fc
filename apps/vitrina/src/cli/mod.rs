//! # Vitrina CLI Module
//!
//! This module implements the CLI interface for Vitrina.
//!
//! ## Available Commands
//!
//! - `catalog` - List products (default)
//! - `order` - Compose an order message and deep link
//! - `fetch` - Download the configured remote spreadsheet
//! - `server` - Start the HTTP server

mod commands;

use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vitrina_core::VitrinaError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Vitrina - spreadsheet storefront
///
/// Shows a product catalog read from a spreadsheet and turns a selection
/// into a ready-to-send order message.
#[derive(Parser, Debug)]
#[command(name = "vitrina")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration file (default: vitrina.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the products in the catalog
    Catalog,

    /// Compose an order from a selection and customer details
    Order {
        /// Product selection as INDEX=QUANTITY (repeatable)
        #[arg(short, long = "select", value_parser = parse_selection)]
        select: Vec<(usize, u32)>,

        /// Customer field as KEY=VALUE (repeatable)
        #[arg(short, long = "field", value_parser = parse_field)]
        field: Vec<(String, String)>,
    },

    /// Download the configured remote spreadsheet
    Fetch {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

/// Parse `INDEX=QUANTITY`.
fn parse_selection(raw: &str) -> Result<(usize, u32), String> {
    let (index, quantity) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=QUANTITY, got '{}'", raw))?;
    let index = index
        .trim()
        .parse()
        .map_err(|e| format!("invalid index '{}': {}", index, e))?;
    let quantity = quantity
        .trim()
        .parse()
        .map_err(|e| format!("invalid quantity '{}': {}", quantity, e))?;
    Ok((index, quantity))
}

/// Parse `KEY=VALUE`. The value may contain `=`.
fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty field key in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), VitrinaError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    if cli.verbose {
        tracing::info!(source = %config.source, "Configuration loaded");
    }

    match cli.command {
        Some(Commands::Order { select, field }) => {
            cmd_order(&config, json_mode, &select, &field).await
        }
        Some(Commands::Fetch { output }) => cmd_fetch(&config, json_mode, &output).await,
        Some(Commands::Server { host, port }) => cmd_server(&config, &host, port).await,
        // No subcommand - list the catalog by default
        Some(Commands::Catalog) | None => cmd_catalog(&config, json_mode).await,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_parses() {
        assert_eq!(parse_selection("0=2"), Ok((0, 2)));
        assert_eq!(parse_selection(" 3 = 10 "), Ok((3, 10)));
        assert!(parse_selection("3").is_err());
        assert!(parse_selection("a=1").is_err());
        assert!(parse_selection("1=-1").is_err());
    }

    #[test]
    fn field_value_keeps_equals_signs() {
        assert_eq!(
            parse_field("email=a=b@x.com"),
            Ok(("email".to_string(), "a=b@x.com".to_string()))
        );
        assert!(parse_field("=x").is_err());
        assert!(parse_field("nombre").is_err());
    }

    #[test]
    fn order_command_parses_repeated_flags() {
        let cli = Cli::try_parse_from([
            "vitrina", "order", "-s", "0=2", "-s", "1=1", "-f", "nombre=Ana", "--json-mode",
        ])
        .expect("parse");
        assert!(cli.json_mode);
        assert!(matches!(
            cli.command,
            Some(Commands::Order { ref select, ref field })
                if select == &[(0, 2), (1, 1)]
                    && field == &[("nombre".to_string(), "Ana".to_string())]
        ));
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["vitrina", "-q"]).expect("parse");
        assert!(cli.quiet);
        assert!(cli.command.is_none());
    }
}
