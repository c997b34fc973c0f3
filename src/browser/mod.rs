//! Browser automation capability
//!
//! The page auditor talks to a browser only through the traits in this module:
//! a [`BrowserLauncher`] produces one shared [`BrowserSession`] per run, and each page
//! audit opens its own [`PageHandle`] from it. The [`cdp`] submodule implements them
//! over the Chrome DevTools Protocol.

pub mod cdp;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Browser automation errors
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Protocol error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Options for a single navigation
#[derive(Debug, Clone, Copy)]
pub struct NavigationOptions {
    /// Upper bound for the navigation, including waiting for the load to settle
    pub timeout: Duration,
}

/// Main-document response observed by a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationResponse {
    /// HTTP status of the main document
    pub status: u16,

    /// MIME type of the loaded document, if the browser reported one
    pub content_type: Option<String>,

    /// URL after redirects
    pub url: String,
}

impl NavigationResponse {
    /// Returns true for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true if the document is HTML (an unreported type counts as HTML)
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map_or(true, crate::crawler::is_html_content_type)
    }
}

/// Starts the one browser instance shared by a run
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>, BrowserError>;
}

/// A running browser, shared read-mostly across concurrent page audits
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Opens a new page owned by the caller
    async fn new_page(&self) -> Result<Box<dyn PageHandle>, BrowserError>;

    /// Releases the browser, shutting it down if this session launched it; called exactly once
    /// after every page audit settled
    async fn close(&self) -> Result<(), BrowserError>;
}

/// A single page (tab) owned by one page audit
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Navigates to `url` and waits for the document to finish loading
    async fn goto(
        &self,
        url: &str,
        options: NavigationOptions,
    ) -> Result<NavigationResponse, BrowserError>;

    /// Evaluates a JavaScript expression, awaiting promises, and returns its JSON value
    async fn evaluate(&self, expression: &str) -> Result<Value, BrowserError>;

    /// Closes the page
    async fn close(&self) -> Result<(), BrowserError>;
}
