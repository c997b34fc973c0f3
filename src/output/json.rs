//! JSON run report

use crate::output::report::{OutputResult, RunReport};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the JSON report inside the report directory
pub const JSON_REPORT_FILE: &str = "report.json";

/// Writes `report.json` into `dir`, creating the directory if needed
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written report
/// * `Err(OutputError)` - The directory or file could not be written
pub fn write_json_report(report: &RunReport, dir: &Path) -> OutputResult<PathBuf> {
    fs::create_dir_all(dir)?;

    let path = dir.join(JSON_REPORT_FILE);
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&path, json)?;

    info!("Wrote JSON report to {}", path.display());
    Ok(path)
}
