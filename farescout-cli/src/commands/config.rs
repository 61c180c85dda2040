//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::info;

use farescout_sources::SourceRegistry;
use farescout_store::{
    InterpreterKind, RendererKind, Settings, SettingsStore, default_artifact_dir,
    default_browser_profile_dir, default_config_dir, default_settings_path,
};

use crate::output::JsonFormatter;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Write a settings file with every default spelled out.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<ExitCode> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await?,
        ConfigAction::Path => show_paths(cli)?,
        ConfigAction::Init { force } => init_config(*force).await?,
    }
    Ok(ExitCode::Success)
}

async fn show_config(cli: &Cli) -> Result<()> {
    let store = SettingsStore::load_default().await?;
    let settings = store.get().await;

    match cli.format {
        OutputFormat::Text => print_settings(&settings),
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

fn print_settings(settings: &Settings) {
    let secs = |v: Option<u64>| v.map_or_else(|| "site default".to_string(), |s| format!("{s}s"));

    println!("FareScout Configuration");
    println!("{}", "─".repeat(40));
    println!();
    println!("Enabled sources:");
    for id in &settings.enabled_sources {
        if let Some(desc) = SourceRegistry::get(*id) {
            println!("  • {}", desc.display_name());
        }
    }
    println!();
    println!("Navigation timeout: {}", secs(settings.navigation_timeout_secs));
    println!("Results timeout:    {}", secs(settings.ready_timeout_secs));
    println!("Release timeout:    {}s", settings.release_timeout_secs);
    println!(
        "Settle delay:       {}",
        settings
            .settle_delay_ms
            .map_or_else(|| "site default".to_string(), |ms| format!("{ms}ms"))
    );
    for (id, max) in &settings.max_candidates {
        println!("Max candidates ({id}): {max}");
    }
    println!("Debug artifacts:    {}", settings.debug_artifacts);
    println!("Artifact dir:       {}", settings.artifact_dir().display());
    println!("Renderer:           {}", settings.renderer);
    if settings.renderer == RendererKind::Browser {
        println!("Browser profiles:   {}", settings.browser_profile_dir().display());
        println!("Browser window:     {}", if settings.browser_headed { "shown" } else { "headless" });
    }
    println!("Interpreter:        {}", settings.interpreter);
    if settings.interpreter == InterpreterKind::Ollama {
        println!("Ollama:             {} ({})", settings.ollama_url, settings.ollama_model);
    }
    if let Some(csv) = &settings.airport_csv {
        println!("Airport CSV:        {}", csv.display());
    }
    if !settings.extra_airports.is_empty() {
        println!("Extra airports:");
        for (city, code) in &settings.extra_airports {
            println!("  • {city} → {code}");
        }
    }
    println!("Log level:          {}", settings.log_level);
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = default_settings_path();
    let artifact_dir = default_artifact_dir();
    let profile_dir = default_browser_profile_dir();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", settings_path.display());
            println!("Artifacts:     {}", artifact_dir.display());
            println!("Browser:       {}", profile_dir.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
                "artifact_dir": artifact_dir.display().to_string(),
                "browser_profile_dir": profile_dir.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn init_config(force: bool) -> Result<()> {
    let path = default_settings_path();
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite",
            path.display()
        );
    }

    SettingsStore::new(path.clone()).save().await?;
    info!(path = %path.display(), "Settings initialised");
    println!("Wrote default settings to {}", path.display());
    Ok(())
}
