//! End-to-end audit runs against a mock site

use crate::support::{html, page_with_links, recording_sink, HttpBrowserLauncher};
use autositefix::audit::{
    run_audit, summarize, AuditOptions, AuditProgressEvent, InjectedRuleEngine, RuleEngine,
};
use autositefix::output::{write_json_report, RunReport};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine() -> Arc<dyn RuleEngine> {
    Arc::new(InjectedRuleEngine::builtin())
}

const GOOD_HEAD: &str = r#"<title>Widgets</title>
<meta name="description" content="Hand-made widgets in every colour, shipped worldwide within three days.">
<link rel="canonical" href="/">
<script type="application/ld+json">{"@type":"Organization"}</script>"#;

/// Mounts an entry page linking to `/one`, `/two`, `/three`
async fn mount_site(server: &MockServer) {
    let links = vec!["/one".to_string(), "/two".to_string(), "/three".to_string()];
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html lang="en"><head>{}</head><body><h1>Home</h1>{}</body></html>"#,
            GOOD_HEAD,
            links
                .iter()
                .map(|l| format!(r#"<a href="{}">{}</a>"#, l, l))
                .collect::<String>()
        )))
        .mount(server)
        .await;

    for route in ["/one", "/two", "/three"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(html(page_with_links(route, &[])))
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_full_audit_of_small_site() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let launcher = HttpBrowserLauncher::default();
    let (events, sink) = recording_sink();
    let options = AuditOptions::new(format!("{}/", server.uri()))
        .with_pages(4)
        .with_concurrency(2)
        .with_timeout(Duration::from_secs(5))
        .with_progress(sink);

    let run = run_audit(&options, &launcher, engine())
        .await
        .expect("Audit failed");

    let urls: Vec<String> = run.pages().iter().map(|p| p.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/", server.uri()),
            format!("{}/one", server.uri()),
            format!("{}/two", server.uri()),
            format!("{}/three", server.uri()),
        ]
    );

    let home = &run.pages()[0];
    assert_eq!(home.performance.score, 100);
    assert_eq!(home.accessibility.score, 100);
    assert_eq!(home.accessibility.pass_count, 6);
    assert_eq!(home.seo.score, 100);

    // Child pages lack description, canonical, and structured data
    let one = &run.pages()[1];
    assert_eq!(one.seo.score, 63);
    assert_eq!(one.seo.issues.len(), 3);

    let summary = summarize(run.pages());
    assert_eq!(summary.pages_audited, 4);
    assert_eq!(summary.total_seo_issues, 9);
    assert_eq!(summary.average_first_contentful_paint_ms, 800);

    // One browser for the run, one page per audit, everything released
    let stats = &launcher.stats;
    assert_eq!(stats.launches.load(Ordering::SeqCst), 1);
    assert_eq!(stats.session_closes.load(Ordering::SeqCst), 1);
    assert_eq!(stats.pages_opened.load(Ordering::SeqCst), 4);
    assert_eq!(stats.pages_closed.load(Ordering::SeqCst), 4);

    let events = events.lock().unwrap();
    assert!(matches!(events[0], AuditProgressEvent::DiscoverStart { .. }));
    assert!(matches!(events[1], AuditProgressEvent::DiscoverComplete { ref urls } if urls.len() == 4));
    assert!(!events.iter().any(|e| matches!(e, AuditProgressEvent::Error { .. })));
}

#[tokio::test]
async fn test_one_page_timing_out_still_completes_run() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(page_with_links(
            "Home",
            &["/slow".to_string(), "/fast".to_string()],
        )))
        .mount(&server)
        .await;
    // Discovery also fetches /slow (2 of 3 found when it is dequeued); that fetch times out and
    // /slow is kept unexpanded, so the audit still visits it
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html(page_with_links("Slow", &[])).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(html(page_with_links("Fast", &[])))
        .mount(&server)
        .await;

    let launcher = HttpBrowserLauncher::default();
    let (events, sink) = recording_sink();
    let options = AuditOptions::new(format!("{}/", base))
        .with_pages(3)
        .with_timeout(Duration::from_millis(500))
        .with_progress(sink);

    let run = run_audit(&options, &launcher, engine())
        .await
        .expect("Audit failed");

    // N - 1 pages, in discovery order
    let urls: Vec<&str> = run.pages().iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls, vec![format!("{}/", base), format!("{}/fast", base)]);
    assert!(run.completed_at() >= run.started_at());

    let events = events.lock().unwrap();
    let errors: Vec<&AuditProgressEvent> = events
        .iter()
        .filter(|e| matches!(e, AuditProgressEvent::Error { .. }))
        .collect();
    assert_eq!(errors.len(), 1);
    match errors[0] {
        AuditProgressEvent::Error { url, message } => {
            assert_eq!(url, &format!("{}/slow", base));
            assert!(message.contains("Timed out"));
        }
        _ => unreachable!(),
    }

    assert_eq!(launcher.stats.session_closes.load(Ordering::SeqCst), 1);
    assert_eq!(
        launcher.stats.pages_opened.load(Ordering::SeqCst),
        launcher.stats.pages_closed.load(Ordering::SeqCst)
    );
}

#[tokio::test]
async fn test_failing_pages_are_omitted_and_reported() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(page_with_links(
            "Home",
            &["/broken".to_string(), "/report.pdf".to_string(), "/fine".to_string()],
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_raw("oops", "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fine"))
        .respond_with(html(page_with_links("Fine", &[])))
        .mount(&server)
        .await;

    let launcher = HttpBrowserLauncher::default();
    let (events, sink) = recording_sink();
    let options = AuditOptions::new(format!("{}/", base))
        .with_pages(10)
        .with_concurrency(3)
        .with_progress(sink);

    let run = run_audit(&options, &launcher, engine())
        .await
        .expect("Audit failed");

    let urls: Vec<&str> = run.pages().iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls, vec![format!("{}/", base), format!("{}/fine", base)]);

    let events = events.lock().unwrap();
    let mut failed: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            AuditProgressEvent::Error { url, .. } => Some(url.as_str()),
            _ => None,
        })
        .collect();
    failed.sort();
    assert_eq!(
        failed,
        vec![format!("{}/broken", base), format!("{}/report.pdf", base)]
    );

    // The report carries both the successes and the failures
    let temp = TempDir::new().unwrap();
    let report = RunReport::new(options.url.clone(), run).with_events(events.iter());
    assert_eq!(report.pages_discovered, 4);
    assert_eq!(report.failures.len(), 2);

    let path = write_json_report(&report, temp.path()).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(value["pages"].as_array().unwrap().len(), 2);
    assert_eq!(value["failures"].as_array().unwrap().len(), 2);
    assert_eq!(value["summary"]["pagesAudited"], 2);
}

#[tokio::test]
async fn test_unreachable_entry_yields_valid_empty_run() {
    let launcher = HttpBrowserLauncher::default();
    let (events, sink) = recording_sink();
    let options = AuditOptions::new("http://127.0.0.1:1/")
        .with_timeout(Duration::from_secs(2))
        .with_progress(sink);

    let run = run_audit(&options, &launcher, engine())
        .await
        .expect("Audit failed");

    assert!(run.pages().is_empty());
    assert!(run.completed_at() >= run.started_at());
    assert_eq!(summarize(run.pages()).pages_audited, 0);

    let events = events.lock().unwrap();
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, AuditProgressEvent::Error { .. }))
            .count(),
        1
    );
}
