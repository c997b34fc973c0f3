//! Multi-page audit pipeline
//!
//! This module contains everything after the entry URL has been accepted:
//! - Data model for options, per-page results, and the run result
//! - Per-page performance, accessibility, and SEO measurement
//! - The bounded-concurrency scheduler and the run coordinator
//! - Aggregation into summary statistics

pub mod accessibility;
pub mod aggregate;
mod auditor;
mod coordinator;
pub mod performance;
mod progress;
mod scheduler;
pub mod seo;
mod types;

pub use accessibility::{InjectedRuleEngine, RuleEngine, RuleEngineReport};
pub use aggregate::{aggregate, summarize};
pub use auditor::{audit_page, BrowserPageAuditor, PageAuditor};
pub use coordinator::{discover_only, run_audit};
pub use progress::{channel_sink, AuditProgressEvent, ProgressSink};
pub use scheduler::{run_all, run_all_settled, PageOutcome};
pub use types::{
    AccessibilityResult, AuditOptions, AuditRunResult, Impact, PageAuditResult,
    PerformanceMetrics, PerformanceResult, SeoCheck, SeoResult, SummaryMetrics, Violation,
    ViolationNode,
};
