//! Discovery against a mock site

use crate::support::{html, page_with_links};
use autositefix::config::UserAgentConfig;
use autositefix::crawler::{build_http_client, discover};
use autositefix::url::normalize_url;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn client() -> reqwest::Client {
    build_http_client(&UserAgentConfig::default()).expect("Failed to build client")
}

async fn mount_page(server: &MockServer, route: &str, links: &[String]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(page_with_links(route, links)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_budget_two_reaches_entry_and_first_internal_page() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        &[
            format!("{}/page1", base),
            "/page2".to_string(),
            "https://external.example/".to_string(),
        ],
    )
    .await;
    mount_page(&server, "/page1", &[]).await;
    mount_page(&server, "/page2", &[]).await;

    let entry = Url::parse(&format!("{}/", base)).unwrap();
    let urls = discover(&client(), &entry, 2, TIMEOUT).await;

    assert_eq!(urls, vec![format!("{}/", base), format!("{}/page1", base)]);
}

#[tokio::test]
async fn test_breadth_first_order_and_deduplication() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Variants of the same pages that normalize identically
    mount_page(
        &server,
        "/",
        &[
            "/a".to_string(),
            "/b/".to_string(),
            "/a#section".to_string(),
            "/b".to_string(),
            "#top".to_string(),
            "/".to_string(),
        ],
    )
    .await;
    mount_page(&server, "/a", &["/c".to_string(), "/b#x".to_string()]).await;
    mount_page(&server, "/b", &["/d/".to_string(), "/a/".to_string()]).await;
    mount_page(&server, "/c", &[]).await;
    mount_page(&server, "/d", &[]).await;

    let entry = Url::parse(&format!("{}/", base)).unwrap();
    let urls = discover(&client(), &entry, 10, TIMEOUT).await;

    assert_eq!(
        urls,
        vec![
            format!("{}/", base),
            format!("{}/a", base),
            format!("{}/b", base),
            format!("{}/c", base),
            format!("{}/d", base),
        ]
    );

    let unique: HashSet<&String> = urls.iter().collect();
    assert_eq!(unique.len(), urls.len());
}

#[tokio::test]
async fn test_budget_is_never_exceeded_on_dense_pages() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links: Vec<String> = (0..100).map(|i| format!("/p{}", i)).collect();
    Mock::given(method("GET"))
        .respond_with(html(page_with_links("dense", &links)))
        .mount(&server)
        .await;

    let entry = Url::parse(&format!("{}/", base)).unwrap();
    for budget in [1, 3, 7, 25] {
        let urls = discover(&client(), &entry, budget, TIMEOUT).await;
        assert_eq!(urls.len(), budget);

        let unique: HashSet<&String> = urls.iter().collect();
        assert_eq!(unique.len(), urls.len());
    }
}

#[tokio::test]
async fn test_budget_one_returns_only_the_entry() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links: Vec<String> = (0..20).map(|i| format!("/p{}", i)).collect();
    mount_page(&server, "/start/", &links).await;

    let entry = Url::parse(&format!("{}/start/#intro", base)).unwrap();
    let urls = discover(&client(), &entry, 1, TIMEOUT).await;

    assert_eq!(urls, vec![normalize_url(&entry)]);
    assert_eq!(urls[0], format!("{}/start", base));
}

#[tokio::test]
async fn test_only_same_origin_urls_are_returned() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let base = server.uri();

    // Same host, different port: a different origin
    mount_page(
        &server,
        "/",
        &[
            format!("{}/elsewhere", other.uri()),
            "/inside".to_string(),
            "mailto:team@example.com".to_string(),
            "javascript:void(0)".to_string(),
        ],
    )
    .await;
    mount_page(&server, "/inside", &[]).await;
    mount_page(&other, "/elsewhere", &[]).await;

    let entry = Url::parse(&format!("{}/", base)).unwrap();
    let urls = discover(&client(), &entry, 10, TIMEOUT).await;

    assert_eq!(urls, vec![format!("{}/", base), format!("{}/inside", base)]);
    for url in &urls {
        let parsed = Url::parse(url).unwrap();
        assert_eq!(parsed.origin(), entry.origin());
    }
}

#[tokio::test]
async fn test_failed_fetches_are_kept_but_not_expanded() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        &["/missing".to_string(), "/feed".to_string(), "/ok".to_string()],
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_raw(
            page_with_links("missing", &["/behind-404".to_string()]),
            "text/html",
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/behind-feed">x</a>"#, "application/rss+xml"),
        )
        .mount(&server)
        .await;

    mount_page(&server, "/ok", &["/child".to_string()]).await;
    mount_page(&server, "/child", &[]).await;

    let entry = Url::parse(&format!("{}/", base)).unwrap();
    let urls = discover(&client(), &entry, 10, TIMEOUT).await;

    assert_eq!(
        urls,
        vec![
            format!("{}/", base),
            format!("{}/missing", base),
            format!("{}/feed", base),
            format!("{}/ok", base),
            format!("{}/child", base),
        ]
    );
}

#[tokio::test]
async fn test_slow_page_times_out_without_aborting_discovery() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", &["/slow".to_string(), "/fast".to_string()]).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            html(page_with_links("slow", &["/never".to_string()]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/fast", &[]).await;

    let entry = Url::parse(&format!("{}/", base)).unwrap();
    let urls = discover(&client(), &entry, 10, Duration::from_millis(300)).await;

    assert_eq!(
        urls,
        vec![
            format!("{}/", base),
            format!("{}/slow", base),
            format!("{}/fast", base),
        ]
    );
}
