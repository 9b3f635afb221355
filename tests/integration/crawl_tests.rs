//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end. Every mock server is its own domain.

use async_trait::async_trait;
use burrow::config::{CrawlCommand, CrawlConfiguration, Settings};
use burrow::crawler::{CrawlResult, Crawler, FetchError, RichFetcher, Termination};
use burrow::notify::{NullNotifier, RecordingNotifier};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, page: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_never_requested(server: &MockServer, page: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html("<p>should not be fetched</p>"))
        .expect(0)
        .mount(server)
        .await;
}

fn host_of(server: &MockServer) -> String {
    server.address().to_string()
}

fn crawler_for(settings: &Settings, seeds: &[String], allowed: &[String]) -> (Crawler, Vec<String>) {
    let command = CrawlCommand::new(seeds.to_vec(), allowed.to_vec());
    let config = CrawlConfiguration::from_command(settings, &command);
    let crawler = Crawler::new(config).with_notifier(Arc::new(NullNotifier));
    (crawler, command.seeds)
}

async fn crawl(settings: Settings, seeds: &[String], allowed: &[String]) -> CrawlResult {
    let (crawler, seeds) = crawler_for(&settings, seeds, allowed);
    crawler.run(&seeds).await.expect("crawl should run")
}

fn as_set(pages: &[String]) -> HashSet<String> {
    pages.iter().cloned().collect()
}

fn urls(base: &str, paths: &[&str]) -> HashSet<String> {
    paths.iter().map(|p| format!("{}{}", base, p)).collect()
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="{base}/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            </body></html>"#
        ),
    )
    .await;
    mount_page(&server, "/page1", r#"<a href="page3">3</a><a href="/">home</a>"#).await;
    mount_page(
        &server,
        "/page2",
        r#"<a href="https://out-of-scope.test/">out</a>"#,
    )
    .await;
    mount_page(&server, "/page3", "<p>leaf</p>").await;

    let settings = Settings {
        max_workers: 3,
        ..Settings::default()
    };
    let result = crawl(settings, &[base.clone()], &[]).await;

    assert_eq!(result.termination, Termination::Exhausted);
    assert_eq!(
        as_set(&result.scraped_pages),
        urls(&base, &["/", "/page1", "/page2", "/page3"])
    );
    assert!(result.failed_pages.is_empty());
    assert_eq!(result.scraped_pages[0], format!("{}/", base));
}

#[tokio::test]
async fn test_allowed_domain_is_fetch_only_and_others_rejected() {
    let root = MockServer::start().await;
    let allowed = MockServer::start().await;
    let unlisted = MockServer::start().await;

    mount_page(
        &root,
        "/",
        format!(
            r#"<a href="{}/article">allowed</a><a href="{}/other">unlisted</a>"#,
            allowed.uri(),
            unlisted.uri()
        ),
    )
    .await;
    mount_never_requested(&allowed, "/article").await;
    mount_never_requested(&unlisted, "/other").await;

    let result = crawl(Settings::default(), &[root.uri()], &[host_of(&allowed)]).await;

    let scraped = as_set(&result.scraped_pages);
    assert!(scraped.contains(&format!("{}/", root.uri())));
    assert!(scraped.contains(&format!("{}/article", allowed.uri())));
    assert!(!scraped.contains(&format!("{}/other", unlisted.uri())));
    assert_eq!(scraped.len(), 2);
}

#[tokio::test]
async fn test_extra_root_is_crawled_recursively() {
    let root = MockServer::start().await;
    let extra = MockServer::start().await;

    mount_page(&root, "/", format!(r#"<a href="{}/">extra</a>"#, extra.uri())).await;
    mount_page(&extra, "/", r#"<a href="/deeper">d</a>"#).await;
    mount_page(&extra, "/deeper", "<p>leaf</p>").await;

    let settings = Settings {
        allowed_extra_roots: extra.uri(),
        ..Settings::default()
    };
    let result = crawl(settings, &[root.uri()], &[]).await;

    assert!(result
        .scraped_pages
        .contains(&format!("{}/deeper", extra.uri())));
}

#[tokio::test]
async fn test_path_prefix_limits_recursion() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/docs", r#"<a href="/docs/intro">in</a><a href="/blog">out</a>"#).await;
    mount_page(&server, "/docs/intro", "<p>intro</p>").await;
    mount_never_requested(&server, "/blog").await;

    let result = crawl(Settings::default(), &[format!("{}/docs", base)], &[]).await;

    assert_eq!(
        as_set(&result.scraped_pages),
        urls(&base, &["/docs", "/docs/intro"])
    );
}

#[tokio::test]
async fn test_max_pages_one_with_two_seeds() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/one", r#"<a href="/one/child">c</a>"#).await;
    mount_page(&server, "/two", r#"<a href="/two/child">c</a>"#).await;

    let settings = Settings {
        max_pages: 1,
        ..Settings::default()
    };
    let seeds = [format!("{}/one", base), format!("{}/two", base)];
    let result = crawl(settings, &seeds, &[]).await;

    assert_eq!(result.termination, Termination::PageLimit);
    assert_eq!(result.scraped_pages.len(), 1);
    assert_eq!(result.failed_pages.len(), 1);

    let mut all = as_set(&result.scraped_pages);
    all.extend(result.failed_pages.iter().cloned());
    assert_eq!(all, urls(&base, &["/one", "/two"]));
}

#[tokio::test]
async fn test_max_pages_caps_visits_with_many_workers() {
    let server = MockServer::start().await;

    let links: String = (0..20)
        .map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", links).await;
    for i in 0..20 {
        mount_page(&server, &format!("/p{}", i), "<p>leaf</p>").await;
    }

    let settings = Settings {
        max_pages: 5,
        max_workers: 4,
        ..Settings::default()
    };
    let result = crawl(settings, &[server.uri()], &[]).await;

    assert_eq!(result.termination, Termination::PageLimit);
    assert_eq!(result.scraped_pages.len(), 5);
    assert_eq!(result.failed_pages.len(), 16);

    let scraped = as_set(&result.scraped_pages);
    let failed = as_set(&result.failed_pages);
    assert!(scraped.is_disjoint(&failed));

    let mut expected: HashSet<String> = (0..20).map(|i| format!("{}/p{}", server.uri(), i)).collect();
    expected.insert(format!("{}/", server.uri()));
    assert_eq!(&scraped | &failed, expected);
}

#[tokio::test]
async fn test_max_pages_lets_claimed_visit_finish() {
    let server = MockServer::start().await;
    let base = server.uri();

    for page in ["/", "/y", "/z"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html("<p>slow</p>").set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;
    }

    let settings = Settings {
        max_pages: 1,
        max_workers: 2,
        ..Settings::default()
    };
    let seeds = [base.clone(), format!("{}/y", base), format!("{}/z", base)];
    let result = crawl(settings, &seeds, &[]).await;

    assert_eq!(result.termination, Termination::PageLimit);
    assert_eq!(result.scraped_pages.len(), 1);
    assert_eq!(result.failed_pages.len(), 2);

    let mut all = as_set(&result.scraped_pages);
    all.extend(result.failed_pages.iter().cloned());
    assert_eq!(all, urls(&base, &["/", "/y", "/z"]));
}

#[tokio::test]
async fn test_robots_txt_is_respected() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private/\n"),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        r#"<a href="/private/secret">secret</a><a href="/public">public</a>"#,
    )
    .await;
    mount_page(&server, "/public", "<p>hello</p>").await;
    mount_never_requested(&server, "/private/secret").await;

    let settings = Settings {
        follow_robots_txt: true,
        ..Settings::default()
    };
    let result = crawl(settings, &[base.clone()], &[]).await;

    assert_eq!(as_set(&result.scraped_pages), urls(&base, &["/", "/public"]));
}

#[tokio::test]
async fn test_robots_txt_ignored_when_disabled() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "/", r#"<a href="/next">n</a>"#).await;
    mount_page(&server, "/next", "<p>n</p>").await;

    let result = crawl(Settings::default(), &[base.clone()], &[]).await;

    assert_eq!(as_set(&result.scraped_pages), urls(&base, &["/", "/next"]));
}

#[tokio::test]
async fn test_missing_robots_txt_allows_everything() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/next">n</a>"#).await;
    mount_page(&server, "/next", "<p>n</p>").await;

    let settings = Settings {
        follow_robots_txt: true,
        ..Settings::default()
    };
    let result = crawl(settings, &[base.clone()], &[]).await;

    assert_eq!(as_set(&result.scraped_pages), urls(&base, &["/", "/next"]));
}

#[tokio::test]
async fn test_depth_limit() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/d1">1</a>"#).await;
    mount_page(&server, "/d1", r#"<a href="/d2">2</a>"#).await;
    mount_never_requested(&server, "/d2").await;

    let settings = Settings {
        max_depth: 1,
        ..Settings::default()
    };
    let result = crawl(settings, &[base.clone()], &[]).await;

    assert_eq!(as_set(&result.scraped_pages), urls(&base, &["/", "/d1"]));
}

#[tokio::test]
async fn test_non_html_pages_are_recorded_but_not_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/data">data</a><a href="/download">dl</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/from-text">x</a>"#, "text/plain"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(
            html(r#"<a href="/from-attachment">x</a>"#)
                .insert_header("content-disposition", "attachment; filename=page.html"),
        )
        .mount(&server)
        .await;
    mount_never_requested(&server, "/from-text").await;
    mount_never_requested(&server, "/from-attachment").await;

    let result = crawl(Settings::default(), &[base.clone()], &[]).await;

    assert_eq!(
        as_set(&result.scraped_pages),
        urls(&base, &["/", "/data", "/download"])
    );
}

#[tokio::test]
async fn test_pdf_links_follow_ingest_setting() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/manual.pdf">manual</a>"#).await;
    mount_never_requested(&server, "/manual.pdf").await;

    let with_pdf = Settings {
        ingest_pdf: true,
        ..Settings::default()
    };
    let result = crawl(with_pdf, &[base.clone()], &[]).await;
    assert_eq!(
        as_set(&result.scraped_pages),
        urls(&base, &["/", "/manual.pdf"])
    );

    let result = crawl(Settings::default(), &[base.clone()], &[]).await;
    assert_eq!(as_set(&result.scraped_pages), urls(&base, &["/"]));
}

#[tokio::test]
async fn test_skip_rules() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r##"<a href="/search?q=rust">query</a>
           <a href="/photo.JPG">image</a>
           <a href="/page#section">anchor</a>
           <a href="/kept">kept</a>"##,
    )
    .await;
    mount_page(&server, "/kept", "<p>kept</p>").await;
    mount_never_requested(&server, "/search").await;
    mount_never_requested(&server, "/photo.JPG").await;
    mount_never_requested(&server, "/page").await;

    let settings = Settings {
        skip_get_params: true,
        ..Settings::default()
    };
    let result = crawl(settings, &[base.clone()], &[]).await;

    assert_eq!(as_set(&result.scraped_pages), urls(&base, &["/", "/kept"]));
}

#[tokio::test]
async fn test_failed_pages_do_not_abort_the_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/broken">b</a><a href="/fine">f</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/fine", "<p>fine</p>").await;

    let result = crawl(Settings::default(), &[base.clone()], &[]).await;

    assert_eq!(result.termination, Termination::Exhausted);
    assert_eq!(as_set(&result.scraped_pages), urls(&base, &["/", "/fine"]));
    assert_eq!(result.failed_pages, vec![format!("{}/broken", base)]);
}

#[tokio::test]
async fn test_stalled_page_is_cancelled_and_failed() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>slow</p>").set_delay(Duration::from_secs(4)))
        .mount(&server)
        .await;

    let settings = Settings {
        stall_timeout: 1,
        ..Settings::default()
    };
    let started = Instant::now();
    let result = crawl(settings, &[base.clone()], &[]).await;

    assert_eq!(result.termination, Termination::Stalled);
    assert!(result.scraped_pages.is_empty());
    assert_eq!(result.failed_pages, vec![format!("{}/", base)]);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_no_duplicates_with_cyclic_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    let all_links: String = (0..6)
        .map(|i| format!(r#"<a href="/n{}">{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", all_links.clone()).await;
    for i in 0..6 {
        mount_page(&server, &format!("/n{}", i), all_links.clone()).await;
    }

    let settings = Settings {
        max_workers: 4,
        ..Settings::default()
    };
    let result = crawl(settings, &[base.clone()], &[]).await;

    let unique = as_set(&result.scraped_pages);
    assert_eq!(unique.len(), result.scraped_pages.len());
    assert_eq!(unique.len(), 7);
}

#[tokio::test]
async fn test_absolute_link_to_seed_is_not_revisited() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(r#"<a href="{0}">home</a><a href="/a">a</a>"#, base)))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/a", format!(r#"<a href="{0}">home</a>"#, base)).await;

    let result = crawl(Settings::default(), &[base.clone()], &[]).await;

    assert_eq!(result.scraped_pages.len(), 2);
    assert_eq!(as_set(&result.scraped_pages), urls(&base, &["/", "/a"]));
}

/// Fills in links only when given time to run scripts
#[derive(Default)]
struct ScriptedRenderer {
    calls: AtomicUsize,
}

#[async_trait]
impl RichFetcher for ScriptedRenderer {
    async fn render(&self, url: &str, wait: Option<Duration>) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match wait {
            Some(_) if !url.ends_with("/late") => Ok(r#"<a href="/late">late</a>"#.to_string()),
            _ => Ok(String::new()),
        }
    }
}

#[tokio::test]
async fn test_rendering_fallback_finds_script_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", "<div id=app></div>").await;
    mount_page(&server, "/late", "<p>late</p>").await;

    let settings = Settings {
        rich_fetch_fallback: true,
        ..Settings::default()
    };
    let command = CrawlCommand::new(vec![base.clone()], vec![]);
    let config = CrawlConfiguration::from_command(&settings, &command);
    let renderer = Arc::new(ScriptedRenderer::default());
    let crawler = Crawler::new(config)
        .with_notifier(Arc::new(NullNotifier))
        .with_rich_fetcher(renderer.clone());

    let result = crawler.run(&command.seeds).await.unwrap();

    assert_eq!(as_set(&result.scraped_pages), urls(&base, &["/", "/late"]));
    assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_rerun_yields_same_pages() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/a">a</a><a href="/b">b</a>"#).await;
    mount_page(&server, "/a", r#"<a href="/b">b</a><a href="/c">c</a>"#).await;
    mount_page(&server, "/b", "<p>b</p>").await;
    mount_page(&server, "/c", "<p>c</p>").await;

    let settings = Settings {
        max_workers: 2,
        ..Settings::default()
    };
    let (crawler, seeds) = crawler_for(&settings, &[server.uri()], &[]);

    let first = crawler.run(&seeds).await.unwrap();
    let second = crawler.run(&seeds).await.unwrap();

    assert_eq!(first.scraped_pages.len(), 4);
    assert_eq!(as_set(&first.scraped_pages), as_set(&second.scraped_pages));
}

#[tokio::test]
async fn test_progress_notifications() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/a">a</a>"#).await;
    mount_page(&server, "/a", "<p>a</p>").await;

    let settings = Settings {
        notify_interval_ms: 0,
        ..Settings::default()
    };
    let command = CrawlCommand::new(vec![server.uri()], vec![]);
    let config = CrawlConfiguration::from_command(&settings, &command);
    let notifier = Arc::new(RecordingNotifier::new());
    let crawler = Crawler::new(config).with_notifier(notifier.clone());

    crawler.run(&command.seeds).await.unwrap();

    let messages = notifier.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages[1],
        format!("Scraped 2 pages - Currently scraping: {}/a", server.uri())
    );
}
