//! Accessibility rule engine binding and scoring
//!
//! The rule engine is an external script exposing `axe.run(document, options)`. It is
//! injected into each page, run against the loaded document, and its violations are mapped
//! into [`Violation`] values. Scoring weights every affected node by severity.

use crate::audit::types::{AccessibilityResult, Impact, Violation, ViolationNode};
use crate::browser::{BrowserError, PageHandle};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Runs the injected engine and reduces its result to violations plus a pass count
pub const RUN_ENGINE_SCRIPT: &str = r#"(async () => {
  if (typeof axe === 'undefined' || typeof axe.run !== 'function') {
    throw new Error('accessibility rule engine is not loaded');
  }
  const result = await axe.run(document, { resultTypes: ['violations'] });
  return {
    violations: (result.violations || []).map((v) => ({
      id: v.id,
      impact: v.impact || null,
      description: v.description || '',
      helpUrl: v.helpUrl || '',
      nodes: (v.nodes || []).map((n) => ({
        html: n.html || '',
        target: n.target || [],
        failureSummary: n.failureSummary || null
      }))
    })),
    passes: (result.passes || []).length
  };
})()"#;

/// Small rule set with the same `axe.run` contract, used when no engine script is configured
pub const BUILTIN_ENGINE_SCRIPT: &str = r#"(() => {
  if (typeof window.axe !== 'undefined') return;
  const selector = (el) => {
    if (el.id) return '#' + el.id;
    const parts = [];
    let node = el;
    while (node && node.nodeType === 1 && node !== document.documentElement) {
      const parent = node.parentElement;
      const index = parent ? Array.prototype.indexOf.call(parent.children, node) + 1 : 1;
      parts.unshift(node.tagName.toLowerCase() + ':nth-child(' + index + ')');
      node = parent;
    }
    return 'html > ' + parts.join(' > ');
  };
  const text = (el) => (el.textContent || '').trim();
  const labelled = (el) =>
    (el.getAttribute('aria-label') || '').trim() !== '' ||
    (el.getAttribute('aria-labelledby') || '').trim() !== '' ||
    (el.getAttribute('title') || '').trim() !== '';
  const rules = [
    {
      id: 'document-title', impact: 'serious',
      description: 'Ensures each HTML document contains a non-empty <title> element',
      check: (doc) => (doc.title || '').trim() === '' ? [doc.documentElement] : []
    },
    {
      id: 'html-has-lang', impact: 'serious',
      description: 'Ensures every HTML document has a lang attribute',
      check: (doc) => (doc.documentElement.getAttribute('lang') || '').trim() === '' ? [doc.documentElement] : []
    },
    {
      id: 'image-alt', impact: 'critical',
      description: 'Ensures <img> elements have alternate text or a role of none or presentation',
      check: (doc) => Array.from(doc.querySelectorAll('img')).filter((img) =>
        !img.hasAttribute('alt') && !labelled(img) &&
        !['none', 'presentation'].includes(img.getAttribute('role')))
    },
    {
      id: 'link-name', impact: 'serious',
      description: 'Ensures links have discernible text',
      check: (doc) => Array.from(doc.querySelectorAll('a[href]')).filter((a) =>
        text(a) === '' && !labelled(a) && !a.querySelector('img[alt]:not([alt=""])'))
    },
    {
      id: 'button-name', impact: 'critical',
      description: 'Ensures buttons have discernible text',
      check: (doc) => Array.from(doc.querySelectorAll('button')).filter((b) => text(b) === '' && !labelled(b))
    },
    {
      id: 'label', impact: 'critical',
      description: 'Ensures every form element has a label',
      check: (doc) => Array.from(doc.querySelectorAll('input:not([type=hidden]):not([type=submit]):not([type=button]), select, textarea'))
        .filter((input) => !labelled(input) &&
          !(input.id && doc.querySelector('label[for="' + CSS.escape(input.id) + '"]')) &&
          !input.closest('label'))
    }
  ];
  window.axe = {
    run: async (doc) => {
      const violations = [];
      const passes = [];
      for (const rule of rules) {
        const nodes = rule.check(doc);
        const entry = {
          id: rule.id,
          impact: rule.impact,
          description: rule.description,
          helpUrl: 'https://dequeuniversity.com/rules/axe/4.8/' + rule.id,
          nodes: nodes.map((el) => ({
            html: el.outerHTML.slice(0, 250),
            target: [selector(el)],
            failureSummary: 'Fix the following: ' + rule.description
          }))
        };
        (nodes.length ? violations : passes).push(entry);
      }
      return { violations, passes };
    }
  };
})()"#;

/// Raw output of one rule-engine run
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEngineReport {
    pub violations: Vec<Violation>,
    pub passes: usize,
}

/// An accessibility rule engine that can be run against a loaded page
#[async_trait]
pub trait RuleEngine: Send + Sync {
    async fn run(&self, page: &dyn PageHandle) -> Result<RuleEngineReport, BrowserError>;
}

/// Rule engine whose source is evaluated inside every audited page before it runs
#[derive(Debug, Clone)]
pub struct InjectedRuleEngine {
    source: String,
}

impl InjectedRuleEngine {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Loads the engine source (e.g. `axe.min.js`) from disk
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self::new(source))
    }

    /// Engine backed by the bundled rule set
    pub fn builtin() -> Self {
        Self::new(BUILTIN_ENGINE_SCRIPT)
    }
}

#[async_trait]
impl RuleEngine for InjectedRuleEngine {
    async fn run(&self, page: &dyn PageHandle) -> Result<RuleEngineReport, BrowserError> {
        page.evaluate(&self.source).await?;
        let value = page.evaluate(RUN_ENGINE_SCRIPT).await?;
        if value.is_null() {
            return Err(BrowserError::InvalidResponse(
                "rule engine returned no result".to_string(),
            ));
        }

        let raw: RawReport = serde_json::from_value(value)?;
        let report = raw.into_report();
        debug!(
            "Rule engine reported {} violations and {} passes",
            report.violations.len(),
            report.passes
        );
        Ok(report)
    }
}

#[derive(Debug, Deserialize)]
struct RawReport {
    #[serde(default)]
    violations: Vec<RawViolation>,
    #[serde(default)]
    passes: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawViolation {
    id: String,
    #[serde(default)]
    impact: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    help_url: String,
    #[serde(default)]
    nodes: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(default)]
    html: String,
    #[serde(default)]
    target: Vec<RawTarget>,
    #[serde(default)]
    failure_summary: Option<String>,
}

/// A node selector; nested arrays address elements inside shadow roots
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTarget {
    Selector(String),
    Nested(Vec<RawTarget>),
}

impl RawTarget {
    fn flatten(self) -> String {
        match self {
            Self::Selector(selector) => selector,
            Self::Nested(parts) => parts
                .into_iter()
                .map(RawTarget::flatten)
                .collect::<Vec<_>>()
                .join(" >>> "),
        }
    }
}

impl RawReport {
    fn into_report(self) -> RuleEngineReport {
        let violations = self
            .violations
            .into_iter()
            .map(|v| Violation {
                impact: Impact::from_engine(v.impact.as_deref()),
                id: v.id,
                description: v.description,
                help_url: v.help_url,
                nodes: v
                    .nodes
                    .into_iter()
                    .map(|n| ViolationNode {
                        html: n.html,
                        target: n.target.into_iter().map(RawTarget::flatten).collect(),
                        failure_summary: n.failure_summary,
                    })
                    .collect(),
            })
            .collect();

        RuleEngineReport {
            violations,
            passes: self.passes,
        }
    }
}

/// `max(0, 100 - min(100, penalty) * 4)` where penalty sums node count times severity weight
pub fn score_violations(violations: &[Violation]) -> u32 {
    let penalty: u64 = violations
        .iter()
        .map(|v| v.node_count() as u64 * u64::from(v.impact.weight()))
        .sum();

    let capped = penalty.min(100) as u32;
    100u32.saturating_sub(capped * 4)
}

/// Runs the rule engine against a loaded page and scores the result
pub async fn measure_accessibility(
    page: &dyn PageHandle,
    engine: &dyn RuleEngine,
) -> Result<AccessibilityResult, BrowserError> {
    let report = engine.run(page).await?;
    Ok(AccessibilityResult {
        score: score_violations(&report.violations),
        violations: report.violations,
        pass_count: report.passes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{NavigationOptions, NavigationResponse};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    fn violation(impact: Impact, nodes: usize) -> Violation {
        Violation {
            id: "rule".to_string(),
            impact,
            description: String::new(),
            help_url: String::new(),
            nodes: (0..nodes)
                .map(|i| ViolationNode {
                    html: format!("<div id=\"n{}\"></div>", i),
                    target: vec![format!("#n{}", i)],
                    failure_summary: None,
                })
                .collect(),
        }
    }

    struct ScriptedPage {
        result: Value,
        evaluated: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PageHandle for ScriptedPage {
        async fn goto(
            &self,
            url: &str,
            _options: NavigationOptions,
        ) -> Result<NavigationResponse, BrowserError> {
            Ok(NavigationResponse {
                status: 200,
                content_type: Some("text/html".to_string()),
                url: url.to_string(),
            })
        }

        async fn evaluate(&self, expression: &str) -> Result<Value, BrowserError> {
            self.evaluated.lock().unwrap().push(expression.to_string());
            if expression == RUN_ENGINE_SCRIPT {
                Ok(self.result.clone())
            } else {
                Ok(Value::Null)
            }
        }

        async fn close(&self) -> Result<(), BrowserError> {
            Ok(())
        }
    }

    #[test]
    fn test_no_violations_scores_100() {
        assert_eq!(score_violations(&[]), 100);
    }

    #[test]
    fn test_single_minor_barely_moves_score() {
        assert_eq!(score_violations(&[violation(Impact::Minor, 1)]), 96);
    }

    #[test]
    fn test_weights_and_clamp() {
        // 2 critical nodes (8) + 1 serious (3) = 11 -> 100 - 44
        let violations = vec![violation(Impact::Critical, 2), violation(Impact::Serious, 1)];
        assert_eq!(score_violations(&violations), 56);

        // 25 penalty points reach zero; anything beyond stays at zero
        assert_eq!(score_violations(&[violation(Impact::Moderate, 13)]), 0);
        assert_eq!(score_violations(&[violation(Impact::Critical, 500)]), 0);
    }

    #[test]
    fn test_unknown_impact_weighs_like_moderate() {
        assert_eq!(
            score_violations(&[violation(Impact::Unknown, 3)]),
            score_violations(&[violation(Impact::Moderate, 3)])
        );
    }

    #[test]
    fn test_score_is_monotonic() {
        let impacts = [
            Impact::Minor,
            Impact::Moderate,
            Impact::Serious,
            Impact::Critical,
        ];

        for impact in impacts {
            let mut previous = 100;
            for nodes in 0..40 {
                let score = score_violations(&[violation(impact, nodes)]);
                assert!(score <= previous);
                assert!(score <= 100);
                previous = score;
            }
        }

        for nodes in 1..10 {
            let scores: Vec<u32> = impacts
                .iter()
                .map(|impact| score_violations(&[violation(*impact, nodes)]))
                .collect();
            assert!(scores.windows(2).all(|w| w[1] <= w[0]));
        }
    }

    #[test]
    fn test_nested_targets_are_joined() {
        let raw: RawReport = serde_json::from_value(json!({
            "violations": [{
                "id": "color-contrast",
                "impact": "serious",
                "description": "Elements must meet minimum color contrast",
                "helpUrl": "https://dequeuniversity.com/rules/axe/4.8/color-contrast",
                "nodes": [
                    { "html": "<span>a</span>", "target": ["#main span"] },
                    { "html": "<b>b</b>", "target": [["my-widget", "b.label"]], "failureSummary": "Fix" }
                ]
            }],
            "passes": 12
        }))
        .unwrap();

        let report = raw.into_report();
        assert_eq!(report.passes, 12);
        let v = &report.violations[0];
        assert_eq!(v.impact, Impact::Serious);
        assert_eq!(v.nodes[0].target, vec!["#main span"]);
        assert_eq!(v.nodes[1].target, vec!["my-widget >>> b.label"]);
        assert_eq!(v.nodes[1].failure_summary.as_deref(), Some("Fix"));
    }

    #[tokio::test]
    async fn test_injected_engine_evaluates_source_first() {
        let page = ScriptedPage {
            result: json!({
                "violations": [{ "id": "image-alt", "impact": null, "nodes": [{ "html": "<img>", "target": ["img"] }] }],
                "passes": 3
            }),
            evaluated: Mutex::new(Vec::new()),
        };
        let engine = InjectedRuleEngine::new("window.axe = {};");

        let result = measure_accessibility(&page, &engine).await.unwrap();
        assert_eq!(result.pass_count, 3);
        assert_eq!(result.violations[0].impact, Impact::Unknown);
        assert_eq!(result.score, 92);

        let evaluated = page.evaluated.lock().unwrap();
        assert_eq!(evaluated[0], "window.axe = {};");
        assert_eq!(evaluated[1], RUN_ENGINE_SCRIPT);
    }

    #[tokio::test]
    async fn test_null_engine_result_is_an_error() {
        let page = ScriptedPage {
            result: Value::Null,
            evaluated: Mutex::new(Vec::new()),
        };
        let err = InjectedRuleEngine::builtin().run(&page).await.unwrap_err();
        assert!(matches!(err, BrowserError::InvalidResponse(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("axe.min.js");
        std::fs::write(&path, "window.axe = { run: async () => ({ violations: [], passes: [] }) };")
            .unwrap();

        let engine = InjectedRuleEngine::from_file(&path).unwrap();
        assert!(engine.source.starts_with("window.axe"));
        assert!(InjectedRuleEngine::from_file(dir.path().join("missing.js")).is_err());
    }
}
