//! SEO checklist over the rendered document
//!
//! The document is serialized from the live page (so client-side rendering is reflected)
//! and evaluated against a fixed checklist. Check order is part of the output contract:
//! `issues` lists failed labels in this order.

use crate::audit::types::{SeoCheck, SeoResult};
use crate::browser::{BrowserError, PageHandle};
use scraper::{ElementRef, Html, Selector};

/// Serializes the rendered DOM
pub const SEO_DOCUMENT_SCRIPT: &str = "document.documentElement.outerHTML";

/// Meta description length bounds, in characters, inclusive
pub const META_DESCRIPTION_MIN: usize = 50;
pub const META_DESCRIPTION_MAX: usize = 160;

/// Checklist entries as `(id, label)`, in evaluation order
pub const SEO_CHECKS: [(&str, &str); 8] = [
    ("title", "Document has a title"),
    ("meta-description", "Meta description is 50–160 characters"),
    ("canonical", "Canonical link present"),
    ("lang", "HTML lang attribute present"),
    ("single-h1", "Exactly one h1 heading"),
    ("indexable", "Page is indexable (no noindex)"),
    ("image-alt", "At least 80% of images have alt text"),
    ("structured-data", "Structured data present"),
];

/// Runs the checklist against an HTML document
pub fn run_seo_checks(html: &str) -> SeoResult {
    let document = Html::parse_document(html);

    let outcomes = [
        has_title(&document),
        has_valid_meta_description(&document),
        has_canonical(&document),
        has_lang(&document),
        has_single_h1(&document),
        is_indexable(&document),
        images_have_alt(&document),
        has_structured_data(&document),
    ];

    let checks: Vec<SeoCheck> = SEO_CHECKS
        .iter()
        .zip(outcomes)
        .map(|((id, label), passed)| SeoCheck {
            id: (*id).to_string(),
            label: (*label).to_string(),
            passed,
        })
        .collect();

    let passed = checks.iter().filter(|c| c.passed).count();
    let score = (passed as f64 / checks.len() as f64 * 100.0).round() as u32;
    let issues = checks
        .iter()
        .filter(|c| !c.passed)
        .map(|c| c.label.clone())
        .collect();

    SeoResult {
        score,
        checks,
        issues,
    }
}

/// Serializes the loaded page and runs the checklist on it
pub async fn measure_seo(page: &dyn PageHandle) -> Result<SeoResult, BrowserError> {
    let value = page.evaluate(SEO_DOCUMENT_SCRIPT).await?;
    let html = value.as_str().ok_or_else(|| {
        BrowserError::InvalidResponse("document serialization did not return a string".to_string())
    })?;
    Ok(run_seo_checks(html))
}

fn select<'a>(document: &'a Html, selector: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn attr_non_empty(element: &ElementRef<'_>, name: &str) -> bool {
    element
        .value()
        .attr(name)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}

/// `content` of every `<meta name=...>` whose name matches case-insensitively
fn meta_content<'a>(document: &'a Html, name: &str) -> Vec<&'a str> {
    select(document, "meta[name]")
        .into_iter()
        .filter(|meta| {
            meta.value()
                .attr("name")
                .map(|n| n.trim().eq_ignore_ascii_case(name))
                .unwrap_or(false)
        })
        .filter_map(|meta| meta.value().attr("content"))
        .collect()
}

fn has_title(document: &Html) -> bool {
    select(document, "title")
        .first()
        .map(|title| !title.text().collect::<String>().trim().is_empty())
        .unwrap_or(false)
}

fn has_valid_meta_description(document: &Html) -> bool {
    meta_content(document, "description")
        .first()
        .map(|content| {
            let length = content.trim().chars().count();
            (META_DESCRIPTION_MIN..=META_DESCRIPTION_MAX).contains(&length)
        })
        .unwrap_or(false)
}

fn has_canonical(document: &Html) -> bool {
    select(document, "link[rel][href]").iter().any(|link| {
        let is_canonical = link
            .value()
            .attr("rel")
            .map(|rel| {
                rel.split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("canonical"))
            })
            .unwrap_or(false);
        is_canonical && attr_non_empty(link, "href")
    })
}

fn has_lang(document: &Html) -> bool {
    select(document, "html")
        .first()
        .map(|html| attr_non_empty(html, "lang"))
        .unwrap_or(false)
}

fn has_single_h1(document: &Html) -> bool {
    select(document, "h1").len() == 1
}

fn is_indexable(document: &Html) -> bool {
    !meta_content(document, "robots")
        .iter()
        .any(|content| content.to_ascii_lowercase().contains("noindex"))
}

fn images_have_alt(document: &Html) -> bool {
    let images = select(document, "img");
    if images.is_empty() {
        return true;
    }

    let with_alt = images.iter().filter(|img| attr_non_empty(img, "alt")).count();
    with_alt * 5 >= images.len() * 4
}

fn has_structured_data(document: &Html) -> bool {
    let json_ld = select(document, "script[type]").into_iter().any(|script| {
        let is_json_ld = script
            .value()
            .attr("type")
            .map(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
            .unwrap_or(false);
        is_json_ld && !script.text().collect::<String>().trim().is_empty()
    });

    json_ld || !select(document, "[itemscope]").is_empty()
}
