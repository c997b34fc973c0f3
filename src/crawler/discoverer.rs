//! Same-origin page discovery
//!
//! Breadth-first traversal from a single entry URL, bounded by a page budget. Discovery
//! is strictly sequential: one fetch completes before the next candidate is dequeued,
//! because the links queued from later pages depend on what has already been seen.

use crate::crawler::fetcher::{fetch_html, FetchResult};
use crate::crawler::parser::parse_html;
use crate::url::{is_same_origin, normalize_url};
use reqwest::Client;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use url::Url;

/// Multiplier applied to the page budget to cap the work queue
const QUEUE_CAP_FACTOR: usize = 3;

/// Ordered, deduplicated list of normalized same-origin URLs
///
/// Order is breadth-first discovery order and the length never exceeds the page budget.
pub type DiscoveredUrlSet = Vec<String>;

/// Discovers up to `page_budget` same-origin pages starting at `entry_url`
///
/// # Algorithm
///
/// 1. Dequeue the next candidate; skip it if already seen
/// 2. Mark it seen and append it to the result
/// 3. Stop once the result holds `page_budget` URLs
/// 4. Fetch the candidate; on any failure keep it in the result but do not expand it
/// 5. Resolve its links, keep same-origin ones, normalize, and enqueue unseen ones
///    while the queue holds fewer than `page_budget * 3` URLs
///
/// Discovery never fails. The normalized entry URL is always the first element, even if
/// it is unreachable; its audit will fail later instead.
///
/// # Example
///
/// ```no_run
/// use autositefix::config::UserAgentConfig;
/// use autositefix::crawler::{build_http_client, discover};
/// use std::time::Duration;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = build_http_client(&UserAgentConfig::default())?;
/// let entry = Url::parse("https://example.com/")?;
/// let pages = discover(&client, &entry, 5, Duration::from_secs(10)).await;
/// assert!(pages.len() <= 5);
/// # Ok(())
/// # }
/// ```
pub async fn discover(
    client: &Client,
    entry_url: &Url,
    page_budget: usize,
    timeout: Duration,
) -> DiscoveredUrlSet {
    if page_budget == 0 {
        return Vec::new();
    }

    let entry = normalize_url(entry_url);
    let queue_cap = page_budget.saturating_mul(QUEUE_CAP_FACTOR);

    let mut queue: VecDeque<String> = VecDeque::from([entry.clone()]);
    let mut queued: HashSet<String> = HashSet::from([entry]);
    let mut seen: HashSet<String> = HashSet::new();
    let mut result: DiscoveredUrlSet = Vec::new();

    while let Some(candidate) = queue.pop_front() {
        if !seen.insert(candidate.clone()) {
            continue;
        }

        result.push(candidate.clone());
        if result.len() >= page_budget {
            break;
        }

        let base = match Url::parse(&candidate) {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!("Skipping link expansion for {}: {}", candidate, e);
                continue;
            }
        };

        let body = match fetch_html(client, &candidate, timeout).await {
            FetchResult::Success { body } => body,
            FetchResult::ContentMismatch { content_type } => {
                tracing::debug!("Not expanding {}: content type {}", candidate, content_type);
                continue;
            }
            FetchResult::HttpError { status_code } => {
                tracing::debug!("Not expanding {}: HTTP {}", candidate, status_code);
                continue;
            }
            FetchResult::NetworkError { error, timed_out } => {
                tracing::warn!(
                    "Not expanding {}: {} (timed out: {})",
                    candidate,
                    error,
                    timed_out
                );
                continue;
            }
        };

        let parsed = parse_html(&body, &base);
        let mut added = 0usize;

        for link in parsed.links {
            if queue.len() >= queue_cap {
                tracing::debug!("Queue cap of {} reached while expanding {}", queue_cap, candidate);
                break;
            }

            if !is_same_origin(entry_url, &link) {
                continue;
            }

            let normalized = normalize_url(&link);
            if seen.contains(&normalized) || queued.contains(&normalized) {
                continue;
            }

            queued.insert(normalized.clone());
            queue.push_back(normalized);
            added += 1;
        }

        tracing::debug!(
            "Expanded {} ({}): {} new links, {} queued",
            candidate,
            parsed.title.as_deref().unwrap_or("untitled"),
            added,
            queue.len()
        );
    }

    tracing::info!(
        "Discovered {} page(s) from {} (budget {})",
        result.len(),
        entry_url,
        page_budget
    );

    result
}
