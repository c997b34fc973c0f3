//! Report data handed to the writers
//!
//! A [`RunReport`] wraps the run result with the context the writers need: the entry URL,
//! the pages that failed (which the run result itself omits), the configuration hash, and
//! the precomputed summary.

use crate::audit::{summarize, AuditProgressEvent, AuditRunResult, SummaryMetrics};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while writing reports
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A page that was discovered but could not be audited
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub url: String,
    pub message: String,
}

/// Everything a report writer renders for one run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub entry_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,

    /// Number of URLs discovery returned
    pub pages_discovered: usize,

    #[serde(flatten)]
    pub run: AuditRunResult,

    pub summary: SummaryMetrics,

    pub failures: Vec<PageFailure>,
}

impl RunReport {
    /// Builds a report for `run`, computing its summary
    pub fn new(entry_url: impl Into<String>, run: AuditRunResult) -> Self {
        let summary = summarize(run.pages());
        Self {
            entry_url: entry_url.into(),
            config_hash: None,
            pages_discovered: run.pages().len(),
            run,
            summary,
            failures: Vec::new(),
        }
    }

    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Records discovery size and per-page failures observed on the progress stream
    pub fn with_events<'a>(mut self, events: impl IntoIterator<Item = &'a AuditProgressEvent>) -> Self {
        for event in events {
            match event {
                AuditProgressEvent::DiscoverComplete { urls } => {
                    self.pages_discovered = urls.len();
                }
                AuditProgressEvent::Error { url, message } => self.failures.push(PageFailure {
                    url: url.clone(),
                    message: message.clone(),
                }),
                _ => {}
            }
        }
        self
    }
}
