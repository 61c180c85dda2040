//! Search command - ask every selected site and report the cheapest fare.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use tracing::{debug, info};

use farescout_core::{
    ComparisonReport, FlightQuery, PatternInterpreter, QueryInterpreter, SourceId,
};
use farescout_fetch::{
    BrowserRenderer, DocumentRenderer, FetchContext, FlightSearch, HttpRenderer,
    OllamaInterpreter,
};
use farescout_sources::SourceRegistry;
use farescout_store::{
    DebugArtifactWriter, InterpreterKind, RendererKind, Settings, SettingsStore, save_json,
};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Records listed under the cheapest flight in text output.
const DEFAULT_TOP: usize = 10;

/// Arguments for the search command.
#[derive(Args, Default)]
pub struct SearchArgs {
    /// Free-text query, e.g. "delhi to mumbai on 12 march".
    pub query: Vec<String>,

    /// Origin city or code; bypasses the interpreter.
    #[arg(long, requires_all = ["to", "date"])]
    pub from: Option<String>,

    /// Destination city or code.
    #[arg(long, requires_all = ["from", "date"])]
    pub to: Option<String>,

    /// Travel date (YYYY-MM-DD).
    #[arg(long, requires_all = ["from", "to"])]
    pub date: Option<NaiveDate>,

    /// Page load timeout for every site, in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Save page snapshots and record dumps.
    #[arg(long)]
    pub debug_artifacts: bool,

    /// Directory for debug artifacts.
    #[arg(long)]
    pub artifact_dir: Option<PathBuf>,

    /// Also write the JSON report to this file.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Number of flights listed in text output.
    #[arg(long, default_value_t = DEFAULT_TOP)]
    pub top: usize,

    /// How pages are loaded: `browser` (headless Chromium) or `http`.
    #[arg(long, value_name = "KIND")]
    pub renderer: Option<RendererKind>,

    /// Show the browser window.
    #[arg(long)]
    pub headed: bool,

    /// How the query is read: `pattern` or `ollama`.
    #[arg(long, value_name = "KIND")]
    pub interpreter: Option<InterpreterKind>,

    /// CSV with city and code columns, read on top of the built-in airports.
    #[arg(long, value_name = "FILE")]
    pub airports: Option<PathBuf>,
}

impl SearchArgs {
    /// The positional words joined back into one query.
    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }

    fn is_structured(&self) -> bool {
        self.from.is_some()
    }
}

/// Runs the search command.
pub async fn run(args: &SearchArgs, cli: &Cli) -> Result<ExitCode> {
    let settings = apply_overrides(args, SettingsStore::load_default().await?.get().await);
    settings.validate()?;
    let selected = parse_source_selection(cli.sources.as_deref(), &settings)?;
    info!(sources = ?selected, renderer = %settings.renderer, "Searching");

    let ctx = build_context(args, &settings)?;
    let orchestrator = SourceRegistry::build_orchestrator(&selected);
    let airports = Arc::clone(&ctx.airports);
    let report = match settings.interpreter {
        InterpreterKind::Pattern => {
            let search = FlightSearch::new(PatternInterpreter::new(airports), orchestrator);
            run_search(&search, args, &ctx).await?
        }
        InterpreterKind::Ollama => {
            let interpreter = OllamaInterpreter::new(airports)
                .with_base_url(settings.ollama_url.as_str())
                .with_model(settings.ollama_model.as_str());
            run_search(&FlightSearch::new(interpreter, orchestrator), args, &ctx).await?
        }
    };

    if let Some(path) = &args.output {
        save_json(path, &report)
            .await
            .with_context(|| format!("Writing report to {}", path.display()))?;
        info!(path = %path.display(), "Report written");
    }

    output_report(&report, args, cli)?;

    Ok(if report.has_result() {
        ExitCode::Success
    } else {
        ExitCode::NoResult
    })
}

async fn run_search<I: QueryInterpreter>(
    search: &FlightSearch<I>,
    args: &SearchArgs,
    ctx: &FetchContext,
) -> Result<ComparisonReport> {
    if args.is_structured() {
        let query = structured_query(args, ctx)?;
        return Ok(search.run_query(&query, ctx).await);
    }

    let text = args.query_text();
    if text.trim().is_empty() {
        anyhow::bail!("No query given. Try: farescout \"delhi to mumbai tomorrow\"");
    }
    Ok(search.run(&text, ctx).await)
}

/// Settings with this run's command-line choices applied.
fn apply_overrides(args: &SearchArgs, mut settings: Settings) -> Settings {
    if let Some(renderer) = args.renderer {
        settings.renderer = renderer;
    }
    if args.headed {
        settings.browser_headed = true;
    }
    if let Some(interpreter) = args.interpreter {
        settings.interpreter = interpreter;
    }
    if let Some(path) = &args.airports {
        settings.airport_csv = Some(path.clone());
    }
    settings
}

fn build_renderer(settings: &Settings) -> Arc<dyn DocumentRenderer> {
    match settings.renderer {
        RendererKind::Browser => {
            let mut browser = BrowserRenderer::for_booking_sites()
                .with_profile_root(settings.browser_profile_dir());
            if let Some(node) = &settings.node_path {
                browser = browser.with_node(node);
            }
            if settings.browser_headed {
                browser = browser.headed();
            }
            Arc::new(browser)
        }
        RendererKind::Http => Arc::new(HttpRenderer::for_booking_sites()),
    }
}

fn build_context(args: &SearchArgs, settings: &Settings) -> Result<FetchContext> {
    let mut fetch_settings = settings.fetch_settings();
    if let Some(secs) = args.timeout {
        fetch_settings.navigation_timeout = Some(Duration::from_secs(secs));
    }
    if args.debug_artifacts {
        fetch_settings.debug_artifacts = true;
    }

    let airports = settings
        .airport_table()
        .context("Invalid extra_airports in settings")?;

    let mut builder = FetchContext::builder()
        .renderer(build_renderer(settings))
        .airports(Arc::new(airports))
        .settings(fetch_settings.clone());
    if fetch_settings.debug_artifacts {
        let dir = args
            .artifact_dir
            .clone()
            .unwrap_or_else(|| settings.artifact_dir());
        debug!(dir = %dir.display(), "Writing debug artifacts");
        builder = builder.artifacts(Arc::new(DebugArtifactWriter::new(dir)));
    }
    Ok(builder.build())
}

fn structured_query(args: &SearchArgs, ctx: &FetchContext) -> Result<FlightQuery> {
    let (Some(from), Some(to), Some(date)) = (&args.from, &args.to, args.date) else {
        anyhow::bail!("--from, --to and --date must be given together");
    };
    let origin = ctx.airports.resolve_code(from)?;
    let destination = ctx.airports.resolve_code(to)?;
    if origin == destination {
        anyhow::bail!("Origin and destination are both {origin}");
    }
    let raw = format!("{from} to {to} on {date}");
    Ok(FlightQuery::new(origin, destination, date, raw))
}

/// Parses the `--sources` value.
///
/// Absent means the sites enabled in settings; `all` means every site.
fn parse_source_selection(arg: Option<&str>, settings: &Settings) -> Result<Vec<SourceId>> {
    match arg.map(str::to_lowercase).as_deref() {
        None | Some("default") => {
            if settings.enabled_sources.is_empty() {
                anyhow::bail!("No sources enabled in settings");
            }
            Ok(settings.enabled_sources.clone())
        }
        Some("all") => Ok(SourceRegistry::kinds()),
        Some(names) => {
            let mut sources = Vec::new();
            for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                let Some(desc) = SourceRegistry::get_by_cli_name(name) else {
                    anyhow::bail!("Unknown source: {name}. Run `farescout sources` for the list");
                };
                if !sources.contains(&desc.id) {
                    sources.push(desc.id);
                }
            }
            if sources.is_empty() {
                anyhow::bail!("No valid sources specified");
            }
            Ok(sources)
        }
    }
}

fn output_report(report: &ComparisonReport, args: &SearchArgs, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_report(report, args.top));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(report)?);
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_defaults_to_settings() {
        let mut settings = Settings::default();
        assert_eq!(
            parse_source_selection(None, &settings).unwrap(),
            SourceId::all().to_vec()
        );

        settings.enabled_sources = vec![SourceId::Cleartrip];
        assert_eq!(
            parse_source_selection(None, &settings).unwrap(),
            vec![SourceId::Cleartrip]
        );
        assert_eq!(parse_source_selection(Some("all"), &settings).unwrap().len(), 3);

        settings.enabled_sources.clear();
        assert!(parse_source_selection(None, &settings).is_err());
    }

    #[test]
    fn test_selection_names_and_aliases() {
        let settings = Settings::default();
        assert_eq!(
            parse_source_selection(Some("EMT, mmt,emt"), &settings).unwrap(),
            vec![SourceId::EaseMyTrip, SourceId::MakeMyTrip]
        );
        assert!(parse_source_selection(Some("yatra"), &settings).is_err());
        assert!(parse_source_selection(Some(" , "), &settings).is_err());
    }

    #[test]
    fn test_structured_query_resolves_cities() {
        let args = SearchArgs {
            from: Some("bengaluru".to_string()),
            to: Some("GOI".to_string()),
            date: NaiveDate::from_ymd_opt(2027, 1, 9),
            ..SearchArgs::default()
        };
        let ctx = FetchContext::new();
        let query = structured_query(&args, &ctx).unwrap();
        assert_eq!(query.origin.as_str(), "BLR");
        assert_eq!(query.destination.as_str(), "GOI");

        let same = SearchArgs {
            to: Some("BLR".to_string()),
            ..args
        };
        assert!(structured_query(&same, &ctx).is_err());
    }

    #[test]
    fn test_context_applies_overrides() {
        let args = SearchArgs {
            timeout: Some(20),
            debug_artifacts: true,
            artifact_dir: Some(PathBuf::from("/tmp/farescout-test")),
            ..SearchArgs::default()
        };
        let ctx = build_context(&args, &Settings::default()).unwrap();
        assert_eq!(ctx.settings.navigation_timeout, Some(Duration::from_secs(20)));
        assert!(ctx.artifact_sink().is_some());

        let plain = build_context(&SearchArgs::default(), &Settings::default()).unwrap();
        assert!(plain.artifact_sink().is_none());
    }

    #[test]
    fn test_browser_renderer_is_default() {
        let ctx = build_context(&SearchArgs::default(), &Settings::default()).unwrap();
        assert_eq!(ctx.renderer.name(), "browser");

        let http_flag = SearchArgs {
            renderer: Some(RendererKind::Http),
            ..SearchArgs::default()
        };
        let settings = apply_overrides(&http_flag, Settings::default());
        let ctx = build_context(&http_flag, &settings).unwrap();
        assert_eq!(ctx.renderer.name(), "http");

        let http_settings = Settings {
            renderer: RendererKind::Http,
            ..Settings::default()
        };
        let ctx = build_context(&SearchArgs::default(), &http_settings).unwrap();
        assert_eq!(ctx.renderer.name(), "http");

        // The flag beats the file.
        let browser_flag = SearchArgs {
            renderer: Some(RendererKind::Browser),
            ..SearchArgs::default()
        };
        let settings = apply_overrides(&browser_flag, http_settings);
        assert_eq!(build_context(&browser_flag, &settings).unwrap().renderer.name(), "browser");
    }

    #[test]
    fn test_overrides_for_interpreter_and_airports() {
        let args = SearchArgs {
            interpreter: Some(InterpreterKind::Ollama),
            airports: Some(PathBuf::from("/tmp/airports.csv")),
            headed: true,
            ..SearchArgs::default()
        };
        let settings = apply_overrides(&args, Settings::default());
        assert_eq!(settings.interpreter, InterpreterKind::Ollama);
        assert_eq!(settings.airport_csv, Some(PathBuf::from("/tmp/airports.csv")));
        assert!(settings.browser_headed);
        assert_eq!(settings.renderer, RendererKind::Browser);

        let untouched = apply_overrides(&SearchArgs::default(), Settings::default());
        assert_eq!(untouched, Settings::default());
    }

    #[test]
    fn test_airport_csv_reaches_context() {
        let dir = std::env::temp_dir().join(format!("farescout-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let csv = dir.join("airports.csv");
        std::fs::write(&csv, "name,iata_code\nDehradun,DED\n").unwrap();

        let args = SearchArgs {
            airports: Some(csv),
            ..SearchArgs::default()
        };
        let settings = apply_overrides(&args, Settings::default());
        let ctx = build_context(&args, &settings).unwrap();
        assert_eq!(ctx.airports.lookup("dehradun").unwrap().as_str(), "DED");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
