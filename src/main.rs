//! AutoSiteFix main entry point
//!
//! This is the command-line interface for the AutoSiteFix multi-page auditor.

use anyhow::Context;
use autositefix::audit::{
    channel_sink, discover_only, run_audit, AuditOptions, AuditProgressEvent, InjectedRuleEngine,
    RuleEngine,
};
use autositefix::browser::cdp::CdpLauncher;
use autositefix::config::{load_config_with_hash, validate, Config};
use autositefix::output::{
    generate_markdown_summary, print_summary, write_json_report, RunReport, MARKDOWN_SUMMARY_FILE,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

/// AutoSiteFix: audit a website's performance, accessibility, and SEO
///
/// AutoSiteFix discovers same-origin pages starting from one URL, audits each
/// of them in a headless browser, and writes a JSON report and a markdown
/// summary of the results.
#[derive(Parser, Debug)]
#[command(name = "autositefix")]
#[command(version)]
#[command(about = "Multi-page website auditor", long_about = None)]
struct Cli {
    /// Entry URL to start auditing from
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Maximum number of pages to discover and audit
    #[arg(short, long)]
    pages: Option<usize>,

    /// Per-page timeout in milliseconds
    #[arg(short, long, value_name = "MS")]
    timeout: Option<u64>,

    /// Number of pages audited at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Accessibility rule engine script (e.g. axe.min.js)
    #[arg(long, value_name = "PATH")]
    axe_script: Option<String>,

    /// Browser executable to launch
    #[arg(long, value_name = "PATH", conflicts_with = "endpoint")]
    chrome: Option<String>,

    /// DevTools endpoint of an already running browser (e.g. http://127.0.0.1:9222)
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Directory for report.json and summary.md
    #[arg(short, long, value_name = "DIR")]
    output: Option<String>,

    /// Validate options and show the pages that would be audited, without launching a browser
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_configuration(&cli)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let printer = spawn_progress_printer(rx, cli.quiet);
    let options =
        AuditOptions::from_config(cli.url.clone(), &config).with_progress(Arc::new(channel_sink(tx)));

    if cli.dry_run {
        let urls = discover_only(&options).await?;
        drop(options);
        printer.await.context("progress printer failed")?;

        println!("\n✓ Options are valid");
        println!("✓ Would audit {} pages:", urls.len());
        for url in &urls {
            println!("  - {}", url);
        }
        return Ok(());
    }

    let engine = load_rule_engine(&config)?;
    let launcher = CdpLauncher::new(
        config.browser.clone(),
        Duration::from_millis(config.audit.timeout_ms),
    );

    let run = match run_audit(&options, &launcher, engine).await {
        Ok(run) => run,
        Err(e) => {
            tracing::error!("Audit failed: {}", e);
            return Err(e.into());
        }
    };

    // Close the progress channel so the printer drains and returns
    drop(options);
    let events = printer.await.context("progress printer failed")?;

    let mut report = RunReport::new(cli.url.clone(), run).with_events(&events);
    if let Some(hash) = config_hash {
        report = report.with_config_hash(hash);
    }

    let report_dir = Path::new(&config.output.report_dir);
    let json_path = write_json_report(&report, report_dir)
        .with_context(|| format!("failed to write report to {}", report_dir.display()))?;
    let summary_path = report_dir.join(MARKDOWN_SUMMARY_FILE);
    generate_markdown_summary(&report, &summary_path)
        .with_context(|| format!("failed to write {}", summary_path.display()))?;

    if !cli.quiet {
        println!();
        print_summary(&report);
        println!("\n✓ Report written to: {}", json_path.display());
        println!("✓ Summary written to: {}", summary_path.display());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("autositefix=info,warn"),
            1 => EnvFilter::new("autositefix=debug,info"),
            2 => EnvFilter::new("autositefix=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the optional config file and layers command-line overrides on top
fn load_configuration(cli: &Cli) -> anyhow::Result<(Config, Option<String>)> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    if let Some(pages) = cli.pages {
        config.audit.pages = pages;
    }
    if let Some(timeout) = cli.timeout {
        config.audit.timeout_ms = timeout;
    }
    if let Some(concurrency) = cli.concurrency {
        config.audit.concurrency = concurrency;
    }
    if let Some(script) = &cli.axe_script {
        config.accessibility.engine_script = Some(script.clone());
    }
    if let Some(chrome) = &cli.chrome {
        config.browser.executable = Some(chrome.clone());
    }
    if let Some(endpoint) = &cli.endpoint {
        config.browser.endpoint = Some(endpoint.clone());
    }
    if let Some(output) = &cli.output {
        config.output.report_dir = output.clone();
    }

    validate(&config).context("invalid configuration")?;
    Ok((config, hash))
}

fn load_rule_engine(config: &Config) -> anyhow::Result<Arc<dyn RuleEngine>> {
    match &config.accessibility.engine_script {
        Some(path) => {
            let engine = InjectedRuleEngine::from_file(path)
                .with_context(|| format!("failed to read accessibility engine script {}", path))?;
            tracing::info!("Using accessibility engine from {}", path);
            Ok(Arc::new(engine))
        }
        None => {
            tracing::warn!("No accessibility engine script configured, using built-in rules");
            Ok(Arc::new(InjectedRuleEngine::builtin()))
        }
    }
}

/// Prints progress events as they arrive and returns all of them once the channel closes
fn spawn_progress_printer(
    mut rx: mpsc::UnboundedReceiver<AuditProgressEvent>,
    quiet: bool,
) -> JoinHandle<Vec<AuditProgressEvent>> {
    tokio::spawn(async move {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            if !quiet {
                print_event(&event);
            }
            events.push(event);
        }
        events
    })
}

fn print_event(event: &AuditProgressEvent) {
    match event {
        AuditProgressEvent::DiscoverStart { url } => {
            println!("Discovering pages from {}", url);
        }
        AuditProgressEvent::DiscoverComplete { urls } => {
            println!("Found {} pages", urls.len());
        }
        AuditProgressEvent::PageStart { url, index, total } => {
            println!("[{}/{}] Auditing {}", index + 1, total, url);
        }
        AuditProgressEvent::PageComplete {
            url,
            index,
            total,
            performance,
            accessibility,
            seo,
        } => {
            println!(
                "[{}/{}] ✓ {} (performance {}, accessibility {}, SEO {})",
                index + 1,
                total,
                url,
                performance,
                accessibility,
                seo
            );
        }
        AuditProgressEvent::Error { url, message } => {
            println!("✗ {}: {}", url, message);
        }
    }
}
