//! AutoSiteFix: a multi-page website auditor
//!
//! This crate discovers a bounded set of same-origin pages starting from one entry URL,
//! audits each of them for performance, accessibility, and SEO inside a shared browser
//! session, and aggregates the per-page measurements into a single run report.

pub mod audit;
pub mod browser;
pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for AutoSiteFix operations
///
/// Everything in here is fatal to a run. Per-page failures are reported through
/// [`PageAuditError`] and never abort the pipeline.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Error raised while auditing a single page
///
/// The scheduler converts each of these into one `error` progress event and drops the
/// page from the run result.
#[derive(Debug, Error)]
pub enum PageAuditError {
    #[error("Timed out after {timeout_ms}ms while {stage} {url}")]
    Timeout {
        url: String,
        stage: &'static str,
        timeout_ms: u64,
    },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Expected HTML at {url}, got {content_type}")]
    NotHtml { url: String, content_type: String },

    #[error("Browser error for {url}: {source}")]
    Browser {
        url: String,
        source: browser::BrowserError,
    },

    #[error("Invalid {measurement} data for {url}: {message}")]
    InvalidMeasurement {
        url: String,
        measurement: &'static str,
        message: String,
    },

    #[error("Audit task for {url} panicked")]
    Panicked { url: String },
}

impl PageAuditError {
    /// Returns the URL of the page that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url, .. }
            | Self::Navigation { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::NotHtml { url, .. }
            | Self::Browser { url, .. }
            | Self::InvalidMeasurement { url, .. }
            | Self::Panicked { url } => url,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for AutoSiteFix operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use audit::{
    aggregate, run_audit, summarize, AuditOptions, AuditProgressEvent, AuditRunResult,
    PageAuditResult, SummaryMetrics,
};
pub use config::Config;
pub use url::{is_same_origin, normalize_url, parse_entry_url};
