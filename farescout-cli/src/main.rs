// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! FareScout CLI - find the cheapest flight across Indian booking sites.
//!
//! # Examples
//!
//! ```bash
//! # Free-text search across every enabled site
//! farescout "cheapest flight from delhi to mumbai on 12 march"
//!
//! # Structured search, skipping the interpreter
//! farescout search --from DEL --to BOM --date 2026-11-02
//!
//! # Only some sites, JSON output saved to a file
//! farescout "blr to goa tomorrow" --sources mmt,cleartrip --format json --output results.json
//!
//! # List sites
//! farescout sources
//!
//! # Write a default settings file
//! farescout config init
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config, search, sources};
use farescout_store::{LogLevel, Settings, default_settings_path, load_json_or_default};

// ============================================================================
// CLI Definition
// ============================================================================

/// FareScout CLI - cheapest-fare comparison.
#[derive(Parser)]
#[command(name = "farescout")]
#[command(about = "Find the cheapest flight across Indian booking sites")]
#[command(long_about = r#"
FareScout asks several booking sites for the same one-way trip and reports
the cheapest fare it found.

Supported sites:
  • MakeMyTrip (makemytrip, mmt)
  • Cleartrip (cleartrip, ct)
  • EaseMyTrip (easemytrip, emt)

Examples:
  farescout "delhi to mumbai tomorrow"          # Free-text search
  farescout search --from DEL --to BOM --date 2026-11-02
  farescout "pune to goa on 5 dec" --sources emt
  farescout sources                             # List sites
  farescout config show                         # Current settings
"#)]
#[command(version)]
#[command(author = "FareScout Contributors")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Subcommand to run. If none, searches with the arguments given.
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub search: search::SearchArgs,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Sites to ask, comma-separated: "mmt,cleartrip". "all" asks every site.
    #[arg(long, short, global = true)]
    pub sources: Option<String>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logs, no error text).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Search for the cheapest flight (default if no command specified).
    #[command(visible_alias = "s")]
    Search(search::SearchArgs),

    /// List supported booking sites.
    #[command(visible_alias = "ls")]
    Sources,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// The search finished but produced no usable fare.
    NoResult = 2,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn log_filter(verbose: bool, level: LogLevel) -> EnvFilter {
    if verbose {
        return EnvFilter::new("farescout=debug,warn");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("farescout={level}")))
}

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(log_filter(verbose, level))
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Only the log level is needed here; commands load and validate settings
    // themselves.
    let settings: Settings = load_json_or_default(&default_settings_path()).await;
    setup_logging(cli.verbose, cli.quiet, settings.log_level);

    let result = match &cli.command {
        Some(Commands::Search(args)) => search::run(args, &cli).await,
        Some(Commands::Sources) => sources::run(&cli),
        Some(Commands::Config(args)) => config::run(args, &cli).await,
        None => search::run(&cli.search, &cli).await,
    };

    match result {
        Ok(code) => {
            if !matches!(code, ExitCode::Success) {
                std::process::exit(code as i32);
            }
        }
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            std::process::exit(ExitCode::Error as i32);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_query_is_a_search() {
        let cli = Cli::try_parse_from(["farescout", "delhi", "to", "mumbai", "tomorrow"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.search.query_text(), "delhi to mumbai tomorrow");
    }

    #[test]
    fn test_search_subcommand_with_global_flags() {
        let cli = Cli::try_parse_from([
            "farescout",
            "search",
            "--from",
            "DEL",
            "--to",
            "BOM",
            "--date",
            "2026-11-02",
            "--sources",
            "emt",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.sources.as_deref(), Some("emt"));
        let Some(Commands::Search(args)) = &cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.from.as_deref(), Some("DEL"));
        assert!(args.date.is_some());
    }

    #[test]
    fn test_structured_flags_go_together() {
        assert!(Cli::try_parse_from(["farescout", "search", "--from", "DEL"]).is_err());
    }

    #[test]
    fn test_config_subcommand() {
        let cli = Cli::try_parse_from(["farescout", "config", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config(_))));
    }
}
