//! PrepCast - prep notifications and traffic outlooks for the kitchen
//!
//! A CLI tool that fetches forecasts and stock levels from the restaurant
//! management service, keeps the upcoming forecasts, and renders what to
//! prepare and when to expect a rush.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, fetch, write, etc.)

mod analysis;
mod cli;
mod config;
mod dismissal;
mod format;
mod forecast;
mod models;
mod report;
mod source;

use analysis::SourceJoin;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use dismissal::DismissalState;
use forecast::PrepRules;
use indicatif::{ProgressBar, ProgressStyle};
use models::{Dashboard, Report, ReportMetadata};
use report::{generate_json_report, generate_markdown_report, MarkdownOptions};
use source::{FileSource, ForecastSource, HttpSource};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("PrepCast v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .prepcast.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to point at your management service and tune prep filtering.");
    Ok(())
}

/// Initialize logging based on verbosity settings. Logs go to stderr so the
/// report can be piped from stdout.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Everything needed to turn a dashboard into output.
struct RenderContext {
    source: String,
    format: OutputFormat,
    markdown: MarkdownOptions,
    dismissals: DismissalState,
    output: Option<std::path::PathBuf>,
}

/// Run a one-shot or watch session. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().context("Invalid configuration")?;

    let source = build_source(&args, &config)?;
    let rules = PrepRules::from(&config.prep);

    let render = RenderContext {
        source: source.describe(),
        format: config.report.format,
        markdown: MarkdownOptions {
            include_top_ingredients: config.report.include_top_ingredients,
        },
        dismissals: DismissalState::with_ids(&args.dismiss_prep, &args.dismiss_traffic),
        output: args.output.clone(),
    };

    if args.watch {
        let period = Duration::from_secs(config.watch.interval_seconds);
        run_watch(source, period, rules, args.today, &render).await
    } else {
        run_once(&source, rules, args.today, &render, !args.quiet).await
    }
}

/// Fetch both sources once, aggregate and render.
async fn run_once(
    source: &ForecastSource,
    rules: PrepRules,
    pinned_today: Option<NaiveDate>,
    render: &RenderContext,
    show_progress: bool,
) -> Result<i32> {
    let spinner = show_progress.then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Fetching forecasts and stock from {}", render.source));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let (forecasts, stock) = source.fetch_both().await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let today = pinned_today.unwrap_or_else(local_today);
    let dashboard = analysis::aggregate_fetched(forecasts, stock, today, &rules)
        .context("Not all sources could be fetched, nothing computed")?;

    render_dashboard(&dashboard, today, render)?;
    Ok(0)
}

/// Poll both sources until interrupted, re-rendering whenever the
/// dashboard changes.
async fn run_watch(
    source: ForecastSource,
    period: Duration,
    rules: PrepRules,
    pinned_today: Option<NaiveDate>,
    render: &RenderContext,
) -> Result<i32> {
    info!("Watching {} every {}s (Ctrl-C to stop)", render.source, period.as_secs());

    let (tx, mut rx) = mpsc::channel(8);
    let pollers = source::spawn_pollers(Arc::new(source), period, tx);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut join = SourceJoin::new();
    let mut last: Option<Dashboard> = None;

    loop {
        tokio::select! {
            update = rx.recv() => {
                let Some(update) = update else {
                    for poller in &pollers {
                        poller.abort();
                    }
                    anyhow::bail!("Pollers stopped unexpectedly, watch cannot continue");
                };

                if let Err(e) = join.apply(update) {
                    warn!("Fetch failed, holding results until it recovers: {}", e);
                    continue;
                }

                if !join.is_ready() {
                    debug!("Waiting for the other source");
                    continue;
                }

                let today = pinned_today.unwrap_or_else(local_today);
                let Some(dashboard) =
                    join.compute(|raw, stock| analysis::aggregate(raw, stock, today, &rules))
                else {
                    continue;
                };

                if last.as_ref() == Some(&dashboard) {
                    debug!("Dashboard unchanged");
                    continue;
                }

                render_dashboard(&dashboard, today, render)?;
                last = Some(dashboard);
            }
            _ = &mut shutdown => {
                info!("Stopping watch");
                break;
            }
        }
    }

    for poller in pollers {
        poller.abort();
    }

    Ok(0)
}

/// Apply dismissals, build the report and write it out.
fn render_dashboard(dashboard: &Dashboard, today: NaiveDate, render: &RenderContext) -> Result<()> {
    let metadata = ReportMetadata {
        source: render.source.clone(),
        generated_at: Utc::now(),
        today,
        dismissed_prep: render.dismissals.dismissed_prep_count(),
        dismissed_traffic: render.dismissals.dismissed_traffic_count(),
    };

    let report = Report {
        metadata,
        dashboard: render.dismissals.visible(dashboard),
    };

    if report.dashboard.is_empty() {
        info!("Nothing upcoming to show");
    }

    let output = match render.format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Markdown => generate_markdown_report(&report, &render.markdown),
    };

    match render.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .and_then(|_| stdout.flush())
                .context("Failed to write report to stdout")?;
        }
    }

    Ok(())
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Pick the data source: local files when both are given, HTTP otherwise.
fn build_source(args: &Args, config: &Config) -> Result<ForecastSource> {
    match (&args.forecast_file, &args.stock_file) {
        (Some(forecasts), Some(stock)) => {
            info!("Reading forecasts and stock from local files");
            Ok(ForecastSource::Files(FileSource::new(
                forecasts.clone(),
                stock.clone(),
            )))
        }
        _ => {
            let http = HttpSource::new(&config.source).context("Failed to set up HTTP client")?;
            Ok(ForecastSource::Http(http))
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
