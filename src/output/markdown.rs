//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of an audit run,
//! including averages, a per-page score table, and the most common issues.

use crate::audit::{Impact, PageAuditResult};
use crate::output::report::{OutputResult, RunReport};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Rows shown in each "top issues" table
const TOP_ISSUES: usize = 10;

/// Generates a markdown summary and writes it to `output_path`
///
/// # Arguments
///
/// * `report` - The run report
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_summary(report: &RunReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run report as markdown
pub fn format_markdown_summary(report: &RunReport) -> String {
    let summary = &report.summary;
    let run = &report.run;
    let mut md = String::new();

    md.push_str("# AutoSiteFix Audit Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Entry URL**: {}\n", report.entry_url));
    md.push_str(&format!("- **Started**: {}\n", run.started_at().to_rfc3339()));
    md.push_str(&format!("- **Completed**: {}\n", run.completed_at().to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        run.duration().num_milliseconds() as f64 / 1000.0
    ));
    if let Some(hash) = &report.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Scores\n\n");
    md.push_str(&format!(
        "- **Pages Audited**: {} of {} discovered\n",
        summary.pages_audited, report.pages_discovered
    ));
    md.push_str(&format!("- **Performance**: {}\n", summary.average_performance));
    md.push_str(&format!("- **Accessibility**: {}\n", summary.average_accessibility));
    md.push_str(&format!("- **SEO**: {}\n", summary.average_seo));
    if summary.average_first_contentful_paint_ms > 0 {
        md.push_str(&format!(
            "- **Average First Contentful Paint**: {} ms\n",
            summary.average_first_contentful_paint_ms
        ));
    }
    if summary.average_largest_contentful_paint_ms > 0 {
        md.push_str(&format!(
            "- **Average Largest Contentful Paint**: {} ms\n",
            summary.average_largest_contentful_paint_ms
        ));
    }
    md.push_str(&format!(
        "- **Accessibility Violations**: {} ({:.1} per page; {} critical, {} serious)\n",
        summary.total_violations,
        summary.average_violations,
        summary.critical_violations,
        summary.serious_violations
    ));
    md.push_str(&format!("- **SEO Issues**: {}\n\n", summary.total_seo_issues));

    if run.pages().is_empty() {
        md.push_str("No pages were audited successfully.\n\n");
    } else {
        md.push_str("## Page Scores\n\n");
        md.push_str("| URL | Performance | Accessibility | SEO | Violations |\n");
        md.push_str("|-----|-------------|---------------|-----|------------|\n");
        for page in run.pages() {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                page.url,
                page.performance.score,
                page.accessibility.score,
                page.seo.score,
                page.accessibility.violations.len()
            ));
        }
        md.push('\n');
    }

    // Top accessibility issues
    let violations = top_violations(run.pages());
    if !violations.is_empty() {
        md.push_str("## Top Accessibility Issues\n\n");
        md.push_str("| Rule | Impact | Pages | Nodes |\n");
        md.push_str("|------|--------|-------|-------|\n");
        for row in violations.iter().take(TOP_ISSUES) {
            md.push_str(&format!(
                "| [{}]({}) | {} | {} | {} |\n",
                row.id, row.help_url, row.impact, row.pages, row.nodes
            ));
        }
        md.push('\n');
    }

    // Top SEO issues
    let seo_issues = top_seo_issues(run.pages());
    if !seo_issues.is_empty() {
        md.push_str("## Top SEO Issues\n\n");
        md.push_str("| Issue | Pages |\n");
        md.push_str("|-------|-------|\n");
        for (label, count) in seo_issues.iter().take(TOP_ISSUES) {
            md.push_str(&format!("| {} | {} |\n", label, count));
        }
        md.push('\n');
    }

    // Failures
    if !report.failures.is_empty() {
        md.push_str("## Failed Pages\n\n");
        md.push_str("| URL | Error |\n");
        md.push_str("|-----|-------|\n");
        for failure in &report.failures {
            md.push_str(&format!(
                "| {} | {} |\n",
                failure.url,
                failure.message.replace('|', "\\|")
            ));
        }
        md.push('\n');
    }

    md
}

struct ViolationRow {
    id: String,
    help_url: String,
    impact: Impact,
    pages: usize,
    nodes: usize,
}

/// Violations grouped by rule, most severe and widespread first
fn top_violations(pages: &[PageAuditResult]) -> Vec<ViolationRow> {
    let mut rows: HashMap<&str, ViolationRow> = HashMap::new();

    for page in pages {
        for violation in &page.accessibility.violations {
            let row = rows.entry(violation.id.as_str()).or_insert_with(|| ViolationRow {
                id: violation.id.clone(),
                help_url: violation.help_url.clone(),
                impact: violation.impact,
                pages: 0,
                nodes: 0,
            });
            row.pages += 1;
            row.nodes += violation.node_count();
        }
    }

    let mut rows: Vec<ViolationRow> = rows.into_values().collect();
    rows.sort_by(|a, b| {
        b.impact
            .weight()
            .cmp(&a.impact.weight())
            .then_with(|| b.nodes.cmp(&a.nodes))
            .then_with(|| a.id.cmp(&b.id))
    });
    rows
}

/// Failed SEO checks with the number of pages failing each, most common first
fn top_seo_issues(pages: &[PageAuditResult]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for page in pages {
        for issue in &page.seo.issues {
            *counts.entry(issue.as_str()).or_insert(0) += 1;
        }
    }

    let mut issues: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    issues.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    issues
}
