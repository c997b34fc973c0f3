//! Data model shared by the audit pipeline

use crate::audit::progress::ProgressSink;
use crate::config::{Config, UserAgentConfig, DEFAULT_CONCURRENCY, DEFAULT_PAGES, DEFAULT_TIMEOUT_MS};
use crate::url::parse_entry_url;
use crate::ConfigError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Immutable input to one audit run
#[derive(Clone)]
pub struct AuditOptions {
    /// Entry URL the run starts from
    pub url: String,

    /// Page budget: maximum number of pages discovered (and therefore audited)
    pub pages: usize,

    /// Per-fetch and per-navigation timeout
    pub timeout: Duration,

    /// Maximum number of page audits running at once
    pub concurrency: usize,

    /// User agent for discovery fetches
    pub user_agent: UserAgentConfig,

    /// Optional receiver for progress events
    pub on_progress: Option<Arc<dyn ProgressSink>>,
}

impl AuditOptions {
    /// Creates options for `url` with default budget, timeout, and concurrency
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pages: DEFAULT_PAGES,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            concurrency: DEFAULT_CONCURRENCY,
            user_agent: UserAgentConfig::default(),
            on_progress: None,
        }
    }

    /// Creates options for `url` from the `[audit]` and `[user-agent]` config sections
    pub fn from_config(url: impl Into<String>, config: &Config) -> Self {
        Self {
            url: url.into(),
            pages: config.audit.pages,
            timeout: Duration::from_millis(config.audit.timeout_ms),
            concurrency: config.audit.concurrency,
            user_agent: config.user_agent.clone(),
            on_progress: None,
        }
    }

    pub fn with_pages(mut self, pages: usize) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.on_progress = Some(sink);
        self
    }

    /// Checks the options before anything is crawled and returns the parsed entry URL
    ///
    /// # Errors
    ///
    /// * `ConfigError::Validation` - zero page budget, zero concurrency, or zero timeout
    /// * `ConfigError::InvalidUrl` - entry URL is not absolute HTTP(S) with a host
    pub fn validate(&self) -> Result<Url, ConfigError> {
        if self.pages == 0 {
            return Err(ConfigError::Validation(
                "page budget must be a positive integer".to_string(),
            ));
        }

        if self.concurrency == 0 {
            return Err(ConfigError::Validation(
                "concurrency must be a positive integer".to_string(),
            ));
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "timeout must be greater than zero".to_string(),
            ));
        }

        parse_entry_url(&self.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.url, e)))
    }
}

impl fmt::Debug for AuditOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditOptions")
            .field("url", &self.url)
            .field("pages", &self.pages)
            .field("timeout", &self.timeout)
            .field("concurrency", &self.concurrency)
            .field("user_agent", &self.user_agent)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

/// Navigation and paint timings in milliseconds; `None` when the browser did not report one
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    #[serde(default)]
    pub first_contentful_paint: Option<f64>,
    #[serde(default)]
    pub largest_contentful_paint: Option<f64>,
    #[serde(default)]
    pub dom_content_loaded: Option<f64>,
    #[serde(default)]
    pub dom_interactive: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceResult {
    pub metrics: PerformanceMetrics,
    /// 0..=100
    pub score: u32,
}

/// Severity reported by the accessibility rule engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Minor,
    Moderate,
    Serious,
    Critical,
    Unknown,
}

impl Impact {
    /// Maps the engine's impact string; anything unrecognized is `Unknown`
    pub fn from_engine(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("minor") => Self::Minor,
            Some("moderate") => Self::Moderate,
            Some("serious") => Self::Serious,
            Some("critical") => Self::Critical,
            _ => Self::Unknown,
        }
    }

    /// Penalty weight per affected node
    pub fn weight(self) -> u32 {
        match self {
            Self::Minor => 1,
            Self::Moderate | Self::Unknown => 2,
            Self::Serious => 3,
            Self::Critical => 4,
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Serious => "serious",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// One DOM node affected by a violation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationNode {
    pub html: String,
    pub target: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_summary: Option<String>,
}

/// One accessibility rule failure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: String,
    pub impact: Impact,
    pub description: String,
    pub help_url: String,
    pub nodes: Vec<ViolationNode>,
}

impl Violation {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityResult {
    /// 0..=100
    pub score: u32,
    pub violations: Vec<Violation>,
    pub pass_count: usize,
}

/// Outcome of one SEO checklist item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeoCheck {
    pub id: String,
    pub label: String,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoResult {
    /// 0..=100
    pub score: u32,
    pub checks: Vec<SeoCheck>,
    /// Labels of failed checks, in checklist order
    pub issues: Vec<String>,
}

/// Measurements for one successfully audited page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAuditResult {
    pub url: String,
    pub performance: PerformanceResult,
    pub accessibility: AccessibilityResult,
    pub seo: SeoResult,
    pub fetched_at: DateTime<Utc>,
}

/// The artifact of one run, handed to report writers
///
/// Only successfully audited pages are included, in discovery order. The struct exposes
/// no mutators; it is built once by [`crate::audit::aggregate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRunResult {
    pages: Vec<PageAuditResult>,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl AuditRunResult {
    pub(crate) fn new(
        pages: Vec<PageAuditResult>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pages,
            started_at,
            completed_at,
        }
    }

    pub fn pages(&self) -> &[PageAuditResult] {
        &self.pages
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    pub fn duration(&self) -> chrono::Duration {
        self.completed_at - self.started_at
    }
}

/// Cross-page statistics derived from a run's pages
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub pages_audited: usize,
    pub average_performance: u32,
    pub average_accessibility: u32,
    pub average_seo: u32,
    /// Over pages that reported the signal
    pub average_first_contentful_paint_ms: u32,
    /// Over pages that reported the signal
    pub average_largest_contentful_paint_ms: u32,
    pub total_violations: usize,
    /// Unrounded mean violation count per page
    pub average_violations: f64,
    pub critical_violations: usize,
    pub serious_violations: usize,
    pub total_seo_issues: usize,
}
