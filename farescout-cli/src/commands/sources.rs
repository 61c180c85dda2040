//! Sources command - list supported booking sites.

use anyhow::Result;
use tracing::info;

use farescout_sources::SourceRegistry;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Runs the sources command.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    info!("Listing sources");

    let sources = SourceRegistry::all();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            println!("{}", formatter.format_sources_header());
            println!("{}", "─".repeat(70));
            for desc in sources {
                println!("{}", formatter.format_source_line(desc));
            }
            println!();
            println!("Total: {} sources, asked in the order shown", sources.len());
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_sources(sources)?);
        }
    }

    Ok(ExitCode::Success)
}
