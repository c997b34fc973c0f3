//! Output module for run reports
//!
//! This module handles:
//! - Writing the JSON run report
//! - Generating a markdown summary
//! - Printing a console summary

mod json;
mod markdown;
mod report;
pub mod stats;

pub use json::{write_json_report, JSON_REPORT_FILE};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use report::{OutputError, OutputResult, PageFailure, RunReport};
pub use stats::{format_console_summary, print_summary};

/// File name of the markdown summary inside the report directory
pub const MARKDOWN_SUMMARY_FILE: &str = "summary.md";
