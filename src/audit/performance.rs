//! Performance measurement and scoring
//!
//! Navigation and paint timings are read from the loaded page and each is scored on a
//! two-threshold curve. The page score is the mean over the signals the browser could
//! provide.

use crate::audit::types::{PerformanceMetrics, PerformanceResult};
use crate::browser::{BrowserError, PageHandle};

/// Collects FCP, LCP, DOM-content-loaded, and DOM-interactive in milliseconds.
///
/// Resolves to `null` for any signal the browser does not expose.
pub const PERFORMANCE_SCRIPT: &str = r#"(async () => {
  const nav = performance.getEntriesByType('navigation')[0];
  const fcp = performance.getEntriesByName('first-contentful-paint')[0];
  const lcp = await new Promise((resolve) => {
    try {
      let last = null;
      const observer = new PerformanceObserver((list) => {
        const entries = list.getEntries();
        if (entries.length) last = entries[entries.length - 1].startTime;
      });
      observer.observe({ type: 'largest-contentful-paint', buffered: true });
      setTimeout(() => { observer.disconnect(); resolve(last); }, 0);
    } catch (e) {
      resolve(null);
    }
  });
  return {
    firstContentfulPaint: fcp ? fcp.startTime : null,
    largestContentfulPaint: lcp,
    domContentLoaded: nav ? nav.domContentLoadedEventEnd : null,
    domInteractive: nav ? nav.domInteractive : null
  };
})()"#;

/// Good / poor thresholds for one timing signal, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub good: f64,
    pub poor: f64,
}

pub const FIRST_CONTENTFUL_PAINT: Thresholds = Thresholds {
    good: 1800.0,
    poor: 3000.0,
};

pub const LARGEST_CONTENTFUL_PAINT: Thresholds = Thresholds {
    good: 2500.0,
    poor: 4000.0,
};

pub const DOM_CONTENT_LOADED: Thresholds = Thresholds {
    good: 2000.0,
    poor: 4000.0,
};

pub const DOM_INTERACTIVE: Thresholds = Thresholds {
    good: 1500.0,
    poor: 3500.0,
};

/// Scores one signal: 100 at or below `good`, 0 at or above `poor`, linear between
pub fn score_signal(value: f64, thresholds: Thresholds) -> f64 {
    if value <= thresholds.good {
        100.0
    } else if value >= thresholds.poor {
        0.0
    } else {
        100.0 * (thresholds.poor - value) / (thresholds.poor - thresholds.good)
    }
}

/// Mean signal score over the signals that were obtainable, rounded
///
/// A signal the browser could not provide (or a non-finite/negative reading) is left out
/// of the mean. With no signals at all the page scores 100.
pub fn score_metrics(metrics: &PerformanceMetrics) -> u32 {
    let signals = [
        (metrics.first_contentful_paint, FIRST_CONTENTFUL_PAINT),
        (metrics.largest_contentful_paint, LARGEST_CONTENTFUL_PAINT),
        (metrics.dom_content_loaded, DOM_CONTENT_LOADED),
        (metrics.dom_interactive, DOM_INTERACTIVE),
    ];

    let scores: Vec<f64> = signals
        .iter()
        .filter_map(|(value, thresholds)| {
            value
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| score_signal(v, *thresholds))
        })
        .collect();

    if scores.is_empty() {
        return 100;
    }

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.round().clamp(0.0, 100.0) as u32
}

/// Reads the timing signals from a loaded page and scores them
pub async fn measure_performance(page: &dyn PageHandle) -> Result<PerformanceResult, BrowserError> {
    let value = page.evaluate(PERFORMANCE_SCRIPT).await?;
    let metrics: PerformanceMetrics = if value.is_null() {
        PerformanceMetrics::default()
    } else {
        serde_json::from_value(value)?
    };

    Ok(PerformanceResult {
        score: score_metrics(&metrics),
        metrics,
    })
}
