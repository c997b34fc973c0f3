//! Crawler module for same-origin page discovery
//!
//! This module contains the discovery half of the pipeline, including:
//! - HTTP fetching with a per-fetch timeout
//! - HTML parsing and link extraction
//! - Breadth-first, budget-bounded discovery

mod discoverer;
mod fetcher;
mod parser;

pub use discoverer::{discover, DiscoveredUrlSet};
pub use fetcher::{build_http_client, fetch_html, is_html_content_type, FetchResult};
pub use parser::{parse_html, ParsedPage};
