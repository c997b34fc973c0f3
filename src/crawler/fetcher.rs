//! HTTP fetcher used during discovery
//!
//! This module handles all HTTP requests made while discovering pages:
//! - Building the HTTP client with a proper user agent string
//! - GET requests bounded by a per-fetch timeout
//! - Classifying responses into success or a locally recovered failure

use crate::config::UserAgentConfig;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Content types whose bodies are parsed for links
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Result of a fetch operation
///
/// Every variant other than `Success` is a discovery fetch failure: the discoverer keeps
/// the page but does not expand its links.
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Page body content
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-2xx HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure)
    NetworkError {
        /// Error description
        error: String,
        /// Whether the per-fetch timeout fired
        timed_out: bool,
    },
}

/// Builds the HTTP client used for discovery
///
/// # Example
///
/// ```no_run
/// use autositefix::config::UserAgentConfig;
/// use autositefix::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if a Content-Type header names an HTML document
pub fn is_html_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    HTML_CONTENT_TYPES.contains(&essence.as_str())
}

/// Fetches a URL's HTML body under a per-fetch timeout
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with HTML body | `Success` |
/// | 2xx with other Content-Type | `ContentMismatch` |
/// | Non-2xx status | `HttpError` |
/// | Timeout / connect / body error | `NetworkError` |
///
/// This function never returns an error; discovery treats every failure as "do not
/// expand this page".
pub async fn fetch_html(client: &Client, url: &str, timeout: Duration) -> FetchResult {
    let response = match client.get(url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html_content_type(&content_type) {
        return FetchResult::ContentMismatch { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success { body },
        Err(e) => classify_error(e),
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            timed_out: true,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: "Connection refused".to_string(),
            timed_out: false,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            timed_out: false,
        }
    }
}
