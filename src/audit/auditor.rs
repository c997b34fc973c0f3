//! Page auditor: one URL, one page handle, three measurements
//!
//! Each audit opens its own page from the shared browser session, navigates under the
//! configured timeout, and takes the performance, accessibility, and SEO measurements
//! against the same loaded document. The page is closed on every exit path.

use crate::audit::accessibility::{measure_accessibility, RuleEngine};
use crate::audit::performance::measure_performance;
use crate::audit::seo::measure_seo;
use crate::audit::types::PageAuditResult;
use crate::browser::{BrowserError, BrowserSession, NavigationOptions, PageHandle};
use crate::PageAuditError;
use async_trait::async_trait;
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Audits a single URL
///
/// Implementations return an error for anything that prevents a complete measurement;
/// isolating that failure from the rest of the run is the scheduler's job.
#[async_trait]
pub trait PageAuditor: Send + Sync {
    async fn audit(&self, url: &str) -> Result<PageAuditResult, PageAuditError>;
}

/// Page auditor backed by a shared browser session
pub struct BrowserPageAuditor {
    session: Arc<dyn BrowserSession>,
    engine: Arc<dyn RuleEngine>,
    timeout: Duration,
}

impl BrowserPageAuditor {
    pub fn new(
        session: Arc<dyn BrowserSession>,
        engine: Arc<dyn RuleEngine>,
        timeout: Duration,
    ) -> Self {
        Self {
            session,
            engine,
            timeout,
        }
    }
}

#[async_trait]
impl PageAuditor for BrowserPageAuditor {
    async fn audit(&self, url: &str) -> Result<PageAuditResult, PageAuditError> {
        audit_page(url, self.session.as_ref(), self.engine.as_ref(), self.timeout).await
    }
}

/// Audits `url` in a fresh page of `session`
///
/// # Errors
///
/// * `PageAuditError::Timeout` - navigation or measurement exceeded `timeout`
/// * `PageAuditError::Navigation` - the browser could not load the URL
/// * `PageAuditError::HttpStatus` / `NotHtml` - the loaded response is not an HTML 2xx document
/// * `PageAuditError::InvalidMeasurement` - a measurement script returned unusable data
/// * `PageAuditError::Browser` - any other driver failure
pub async fn audit_page(
    url: &str,
    session: &dyn BrowserSession,
    engine: &dyn RuleEngine,
    timeout: Duration,
) -> Result<PageAuditResult, PageAuditError> {
    let page = session
        .new_page()
        .await
        .map_err(|source| PageAuditError::Browser {
            url: url.to_string(),
            source,
        })?;

    let outcome = AssertUnwindSafe(measure_page(url, page.as_ref(), engine, timeout))
        .catch_unwind()
        .await;

    if let Err(e) = page.close().await {
        warn!("Failed to close page for {}: {}", url, e);
    }

    match outcome {
        Ok(outcome) => outcome,
        // Re-raised so the scheduler still reports the panic for this URL
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

async fn measure_page(
    url: &str,
    page: &dyn PageHandle,
    engine: &dyn RuleEngine,
    timeout: Duration,
) -> Result<PageAuditResult, PageAuditError> {
    let timeout_ms = timeout.as_millis() as u64;

    let response = page
        .goto(url, NavigationOptions { timeout })
        .await
        .map_err(|e| match e {
            BrowserError::Timeout(_) => PageAuditError::Timeout {
                url: url.to_string(),
                stage: "navigating to",
                timeout_ms,
            },
            BrowserError::NavigationFailed(message) => PageAuditError::Navigation {
                url: url.to_string(),
                message,
            },
            source => PageAuditError::Browser {
                url: url.to_string(),
                source,
            },
        })?;

    if !response.is_success() {
        return Err(PageAuditError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    if !response.is_html() {
        return Err(PageAuditError::NotHtml {
            url: url.to_string(),
            content_type: response.content_type.unwrap_or_default(),
        });
    }

    let fetched_at = Utc::now();
    debug!("Loaded {} (HTTP {}), measuring", url, response.status);

    let measurements = async {
        let performance = measure_performance(page)
            .await
            .map_err(|e| measurement_error(url, "performance", e))?;
        let accessibility = measure_accessibility(page, engine)
            .await
            .map_err(|e| measurement_error(url, "accessibility", e))?;
        let seo = measure_seo(page)
            .await
            .map_err(|e| measurement_error(url, "SEO", e))?;
        Ok::<_, PageAuditError>((performance, accessibility, seo))
    };

    let (performance, accessibility, seo) = tokio::time::timeout(timeout, measurements)
        .await
        .map_err(|_| PageAuditError::Timeout {
            url: url.to_string(),
            stage: "measuring",
            timeout_ms,
        })??;

    Ok(PageAuditResult {
        url: url.to_string(),
        performance,
        accessibility,
        seo,
        fetched_at,
    })
}

fn measurement_error(url: &str, measurement: &'static str, error: BrowserError) -> PageAuditError {
    match error {
        BrowserError::Serialization(e) => PageAuditError::InvalidMeasurement {
            url: url.to_string(),
            measurement,
            message: e.to_string(),
        },
        BrowserError::InvalidResponse(message) => PageAuditError::InvalidMeasurement {
            url: url.to_string(),
            measurement,
            message,
        },
        source => PageAuditError::Browser {
            url: url.to_string(),
            source,
        },
    }
}
