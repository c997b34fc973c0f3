//! Audit coordinator - end-to-end run orchestration
//!
//! A run moves through fixed phases:
//! 1. Validate options (fatal on failure, nothing has been fetched yet)
//! 2. Discover same-origin pages under the page budget
//! 3. Launch one browser session for the whole run
//! 4. Audit discovered pages with bounded concurrency
//! 5. Close the session once every audit has settled
//! 6. Aggregate successful page results

use crate::audit::accessibility::RuleEngine;
use crate::audit::aggregate::aggregate;
use crate::audit::auditor::BrowserPageAuditor;
use crate::audit::progress::AuditProgressEvent;
use crate::audit::scheduler::{emit, run_all};
use crate::audit::types::{AuditOptions, AuditRunResult};
use crate::browser::BrowserLauncher;
use crate::crawler::{build_http_client, discover, DiscoveredUrlSet};
use crate::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// Runs a complete audit
///
/// Per-page failures never surface here; they are reported as `error` progress events and
/// the page is left out of the result. A run in which every page fails still returns a
/// valid, empty result.
///
/// # Errors
///
/// * `AuditError::Config` - invalid options; raised before any fetch
/// * `AuditError::HttpClient` - the discovery HTTP client could not be built
/// * `AuditError::Browser` - the browser session could not be launched
pub async fn run_audit(
    options: &AuditOptions,
    launcher: &dyn BrowserLauncher,
    engine: Arc<dyn RuleEngine>,
) -> Result<AuditRunResult> {
    let entry = options.validate()?;
    let started_at = Utc::now();
    info!(
        "Starting audit of {} (budget {} pages, concurrency {})",
        entry, options.pages, options.concurrency
    );

    let urls = discover_phase(options, &entry).await?;

    let session = launcher.launch().await?;
    let auditor = Arc::new(BrowserPageAuditor::new(
        session.clone(),
        engine,
        options.timeout,
    ));

    let results = run_all(
        &urls,
        auditor,
        options.concurrency,
        options.on_progress.clone(),
    )
    .await;

    if let Err(e) = session.close().await {
        warn!("Failed to close browser session: {}", e);
    }

    let run = aggregate(results, started_at);
    info!(
        "Audit complete: {}/{} pages audited in {}ms",
        run.pages().len(),
        urls.len(),
        run.duration().num_milliseconds()
    );

    Ok(run)
}

/// Validates options and runs discovery only, without launching a browser
pub async fn discover_only(options: &AuditOptions) -> Result<DiscoveredUrlSet> {
    let entry = options.validate()?;
    discover_phase(options, &entry).await
}

async fn discover_phase(options: &AuditOptions, entry: &Url) -> Result<DiscoveredUrlSet> {
    emit(
        &options.on_progress,
        AuditProgressEvent::DiscoverStart {
            url: entry.to_string(),
        },
    );

    let client = build_http_client(&options.user_agent)?;
    let urls = discover(&client, entry, options.pages, options.timeout).await;
    info!("Discovered {} pages", urls.len());

    emit(
        &options.on_progress,
        AuditProgressEvent::DiscoverComplete { urls: urls.clone() },
    );

    Ok(urls)
}
