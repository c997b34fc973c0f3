//! Run aggregation and cross-page statistics

use crate::audit::types::{AuditRunResult, Impact, PageAuditResult, SummaryMetrics};
use chrono::{DateTime, Utc};

/// Assembles the final run result, stamping `completed_at` now
///
/// `completed_at` never precedes `started_at`, even if the wall clock stepped backwards
/// during the run.
pub fn aggregate(results: Vec<PageAuditResult>, started_at: DateTime<Utc>) -> AuditRunResult {
    let completed_at = Utc::now().max(started_at);
    AuditRunResult::new(results, started_at, completed_at)
}

/// Computes cross-page statistics
///
/// Pure and independent of page order. Every field is zero for an empty slice.
pub fn summarize(pages: &[PageAuditResult]) -> SummaryMetrics {
    if pages.is_empty() {
        return SummaryMetrics::default();
    }

    let count = pages.len() as u64;
    let performance: u64 = pages.iter().map(|p| u64::from(p.performance.score)).sum();
    let accessibility: u64 = pages.iter().map(|p| u64::from(p.accessibility.score)).sum();
    let seo: u64 = pages.iter().map(|p| u64::from(p.seo.score)).sum();

    let violations = pages.iter().flat_map(|p| p.accessibility.violations.iter());
    let total_violations: usize = pages.iter().map(|p| p.accessibility.violations.len()).sum();
    let critical_violations = violations
        .clone()
        .filter(|v| v.impact == Impact::Critical)
        .count();
    let serious_violations = violations.filter(|v| v.impact == Impact::Serious).count();

    SummaryMetrics {
        pages_audited: pages.len(),
        average_performance: rounded_mean(performance, count),
        average_accessibility: rounded_mean(accessibility, count),
        average_seo: rounded_mean(seo, count),
        average_first_contentful_paint_ms: timing_mean(
            pages.iter().map(|p| p.performance.metrics.first_contentful_paint),
        ),
        average_largest_contentful_paint_ms: timing_mean(
            pages.iter().map(|p| p.performance.metrics.largest_contentful_paint),
        ),
        total_violations,
        average_violations: total_violations as f64 / pages.len() as f64,
        critical_violations,
        serious_violations,
        total_seo_issues: pages.iter().map(|p| p.seo.issues.len()).sum(),
    }
}

/// Integer mean rounded half up
fn rounded_mean(sum: u64, count: u64) -> u32 {
    ((sum * 2 + count) / (count * 2)) as u32
}

/// Mean over the readings that are present, rounded to whole milliseconds
///
/// Readings are summed in ascending order so the float result does not depend on page order.
fn timing_mean(readings: impl Iterator<Item = Option<f64>>) -> u32 {
    let mut values: Vec<f64> = readings
        .flatten()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .collect();
    if values.is_empty() {
        return 0;
    }

    values.sort_by(f64::total_cmp);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    mean.round() as u32
}
