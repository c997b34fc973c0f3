//! Console summary of a finished run

use crate::output::report::RunReport;
use std::fmt::Write;

/// Prints the run summary to stdout
pub fn print_summary(report: &RunReport) {
    print!("{}", format_console_summary(report));
}

/// Renders the run summary as plain text
pub fn format_console_summary(report: &RunReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "=== Audit Summary ===\n");
    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Entry URL: {}", report.entry_url);
    let _ = writeln!(
        out,
        "  Pages audited: {} / {} discovered",
        summary.pages_audited, report.pages_discovered
    );
    let _ = writeln!(
        out,
        "  Duration: {:.1}s",
        report.run.duration().num_milliseconds() as f64 / 1000.0
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Average Scores:");
    let _ = writeln!(out, "  Performance:   {:>3}", summary.average_performance);
    let _ = writeln!(out, "  Accessibility: {:>3}", summary.average_accessibility);
    let _ = writeln!(out, "  SEO:           {:>3}", summary.average_seo);
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Accessibility: {} violations ({} critical, {} serious)",
        summary.total_violations, summary.critical_violations, summary.serious_violations
    );
    let _ = writeln!(out, "SEO: {} issues", summary.total_seo_issues);

    if !report.failures.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Failed Pages ({}):", report.failures.len());
        for failure in &report.failures {
            let _ = writeln!(out, "  - {}: {}", failure.url, failure.message);
        }
    }

    out
}
