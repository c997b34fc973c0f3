//! Configuration module for AutoSiteFix
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Command-line flags are layered on top by the binary.
//!
//! # Example
//!
//! ```no_run
//! use autositefix::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("autositefix.toml")).unwrap();
//! println!("Auditing up to {} pages", config.audit.pages);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    AccessibilityConfig, AuditConfig, BrowserConfig, Config, OutputConfig, UserAgentConfig,
    DEFAULT_CONCURRENCY, DEFAULT_PAGES, DEFAULT_TIMEOUT_MS,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_audit_config, MAX_CONCURRENCY, MIN_TIMEOUT_MS};
