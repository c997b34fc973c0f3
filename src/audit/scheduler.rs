//! Bounded-concurrency scheduler for page audits
//!
//! Every URL gets its own task; a semaphore caps how many audits hold a page at once.
//! Results are collected by discovery index, so output order never depends on which
//! audit finished first. A failed audit is reported once through the progress sink and
//! left out of the output; there are no retries.

use crate::audit::auditor::PageAuditor;
use crate::audit::progress::{AuditProgressEvent, ProgressSink};
use crate::audit::types::PageAuditResult;
use crate::PageAuditError;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Settled audit of one discovered URL
#[derive(Debug)]
pub struct PageOutcome {
    /// Position in the discovered URL set
    pub index: usize,
    pub url: String,
    pub result: Result<PageAuditResult, PageAuditError>,
}

/// Audits every URL and returns the successful results in input order
pub async fn run_all(
    urls: &[String],
    auditor: Arc<dyn PageAuditor>,
    concurrency: usize,
    progress: Option<Arc<dyn ProgressSink>>,
) -> Vec<PageAuditResult> {
    run_all_settled(urls, auditor, concurrency, progress)
        .await
        .into_iter()
        .filter_map(|outcome| outcome.result.ok())
        .collect()
}

/// Audits every URL and returns one outcome per URL, in input order
///
/// Emits `page-start` when an audit acquires a slot, then exactly one of `page-complete`
/// or `error` when it settles.
pub async fn run_all_settled(
    urls: &[String],
    auditor: Arc<dyn PageAuditor>,
    concurrency: usize,
    progress: Option<Arc<dyn ProgressSink>>,
) -> Vec<PageOutcome> {
    let total = urls.len();
    let concurrency = concurrency.max(1);
    info!("Auditing {} pages ({} at a time)", total, concurrency);

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut handles = Vec::with_capacity(total);

    for (index, url) in urls.iter().enumerate() {
        let semaphore = semaphore.clone();
        let auditor = auditor.clone();
        let progress = progress.clone();
        let url = url.clone();

        handles.push(tokio::spawn(async move {
            // Never closed
            let _permit = semaphore.acquire_owned().await.ok();

            emit(
                &progress,
                AuditProgressEvent::PageStart {
                    url: url.clone(),
                    index,
                    total,
                },
            );
            debug!("Starting audit {}/{}: {}", index + 1, total, url);

            let result = auditor.audit(&url).await;
            report(&progress, &url, index, total, &result);
            result
        }));
    }

    let mut outcomes = Vec::with_capacity(total);
    for (index, (url, handle)) in urls.iter().zip(handles).enumerate() {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                let error = PageAuditError::Panicked { url: url.clone() };
                warn!("Audit task for {} did not complete: {}", url, e);
                emit(
                    &progress,
                    AuditProgressEvent::Error {
                        url: url.clone(),
                        message: error.to_string(),
                    },
                );
                Err(error)
            }
        };

        outcomes.push(PageOutcome {
            index,
            url: url.clone(),
            result,
        });
    }

    let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();
    info!("Audits settled: {} succeeded, {} failed", succeeded, total - succeeded);

    outcomes
}

fn report(
    progress: &Option<Arc<dyn ProgressSink>>,
    url: &str,
    index: usize,
    total: usize,
    result: &Result<PageAuditResult, PageAuditError>,
) {
    match result {
        Ok(page) => {
            debug!(
                "Audited {}: performance {}, accessibility {}, SEO {}",
                url, page.performance.score, page.accessibility.score, page.seo.score
            );
            emit(
                progress,
                AuditProgressEvent::PageComplete {
                    url: url.to_string(),
                    index,
                    total,
                    performance: page.performance.score,
                    accessibility: page.accessibility.score,
                    seo: page.seo.score,
                },
            );
        }
        Err(e) => {
            warn!("Audit failed for {}: {}", url, e);
            emit(
                progress,
                AuditProgressEvent::Error {
                    url: url.to_string(),
                    message: e.to_string(),
                },
            );
        }
    }
}

pub(crate) fn emit(progress: &Option<Arc<dyn ProgressSink>>, event: AuditProgressEvent) {
    if let Some(sink) = progress {
        sink.emit(event);
    }
}
