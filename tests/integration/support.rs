//! Test doubles and helpers shared by the integration tests

use async_trait::async_trait;
use autositefix::audit::accessibility::RUN_ENGINE_SCRIPT;
use autositefix::audit::performance::PERFORMANCE_SCRIPT;
use autositefix::audit::seo::SEO_DOCUMENT_SCRIPT;
use autositefix::audit::{AuditProgressEvent, ProgressSink};
use autositefix::browser::{
    BrowserError, BrowserLauncher, BrowserSession, NavigationOptions, NavigationResponse,
    PageHandle,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wiremock::ResponseTemplate;

/// 200 response with an HTML body
pub fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html")
}

/// A minimal page linking to each of `links`
pub fn page_with_links(title: &str, links: &[String]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        r#"<html lang="en"><head><title>{}</title></head><body><h1>{}</h1>{}</body></html>"#,
        title, title, anchors
    )
}

/// Counters observed by the tests
#[derive(Debug, Default)]
pub struct BrowserStats {
    pub launches: AtomicUsize,
    pub session_closes: AtomicUsize,
    pub pages_opened: AtomicUsize,
    pub pages_closed: AtomicUsize,
}

/// Launcher for a browser that loads documents with a plain HTTP client
#[derive(Clone, Default)]
pub struct HttpBrowserLauncher {
    pub stats: Arc<BrowserStats>,
}

#[async_trait]
impl BrowserLauncher for HttpBrowserLauncher {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>, BrowserError> {
        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(HttpBrowserSession {
            client: reqwest::Client::new(),
            stats: self.stats.clone(),
        }))
    }
}

struct HttpBrowserSession {
    client: reqwest::Client,
    stats: Arc<BrowserStats>,
}

#[async_trait]
impl BrowserSession for HttpBrowserSession {
    async fn new_page(&self) -> Result<Box<dyn PageHandle>, BrowserError> {
        self.stats.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(HttpPage {
            client: self.client.clone(),
            document: Mutex::new(None),
            stats: self.stats.clone(),
        }))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.stats.session_closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct HttpPage {
    client: reqwest::Client,
    document: Mutex<Option<String>>,
    stats: Arc<BrowserStats>,
}

#[async_trait]
impl PageHandle for HttpPage {
    async fn goto(
        &self,
        url: &str,
        options: NavigationOptions,
    ) -> Result<NavigationResponse, BrowserError> {
        let response = self
            .client
            .get(url)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BrowserError::Timeout(format!("navigation to {}", url))
                } else {
                    BrowserError::NavigationFailed(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;

        *self.document.lock().unwrap() = Some(body);

        Ok(NavigationResponse {
            status,
            content_type,
            url: final_url,
        })
    }

    async fn evaluate(&self, expression: &str) -> Result<Value, BrowserError> {
        if expression == PERFORMANCE_SCRIPT {
            return Ok(json!({
                "firstContentfulPaint": 800.0,
                "largestContentfulPaint": 1200.0,
                "domContentLoaded": 500.0,
                "domInteractive": 450.0
            }));
        }

        if expression == SEO_DOCUMENT_SCRIPT {
            let document = self.document.lock().unwrap().clone();
            return Ok(document.map(Value::String).unwrap_or(Value::Null));
        }

        if expression == RUN_ENGINE_SCRIPT {
            return Ok(json!({ "violations": [], "passes": 6 }));
        }

        // Engine source injection
        Ok(Value::Null)
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.stats.pages_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Progress sink that records every event
pub fn recording_sink() -> (Arc<Mutex<Vec<AuditProgressEvent>>>, Arc<dyn ProgressSink>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let events = events.clone();
        move |event: AuditProgressEvent| events.lock().unwrap().push(event)
    };
    (events, Arc::new(sink))
}
