//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, including resumption from a checkpoint.

use reel_harvester::config::Config;
use reel_harvester::crawler::run_crawl;
use reel_harvester::storage::{DocumentStore, JsonCheckpointStore};
use reel_harvester::Document;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Review slugs on the first and second listing page
const PAGE_ONE: [&str; 3] = [
    "past-lives-movie-review-2023",
    "oppenheimer-movie-review-2023",
    "the-holdovers-movie-review-2023",
];
const PAGE_TWO: [&str; 2] = ["heat-movie-review-1995", "the-insider-movie-review-1999"];

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, output: &Path, limit: usize) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.site.seeds = vec!["/reviews".to_string()];
    config.crawler.limit = limit;
    config.crawler.listing_delay_secs = 0.0; // No pacing in tests
    config.crawler.detail_delay_secs = 0.0;
    config.output.path = output.to_path_buf();
    config
}

fn listing_page(slugs: &[&str], next: Option<&str>) -> String {
    let head = next
        .map(|href| format!(r#"<link rel="next" href="{}">"#, href))
        .unwrap_or_default();
    let cards: String = slugs
        .iter()
        .map(|slug| {
            format!(
                r#"<article class="review-stack">
                    <a href="/reviews/{slug}">{slug}</a>
                    <p class="review-stack__tease">Teaser for {slug}.</p>
                </article>"#,
                slug = slug
            )
        })
        .collect();

    format!(
        "<html><head>{}</head><body><a href=\"/reviews/great-movies\">Great Movies</a>{}</body></html>",
        head, cards
    )
}

fn review_page(title: &str, rating: Option<&str>) -> String {
    let rating_meta = rating
        .map(|value| format!(r#"<meta itemprop="ratingValue" content="{}">"#, value))
        .unwrap_or_default();

    format!(
        r#"<html>
        <head>
            {rating_meta}
            <meta itemprop="datePublished" content="2023-06-02">
            <meta name="author" content="Test Critic">
        </head>
        <body>
            <h1 class="page-title">{title}</h1>
            <div class="review__body"><p>Full review of {title}.</p></div>
            <div id="content-lower">
                <div class="credit-col">
                    <h4 class="page-title">{title}</h4>
                    <a href="/genre/drama">Drama</a>
                </div>
                <div class="credit-col">
                    <h4>Cast</h4>
                    <ul><li><a href="/cast/someone">Someone Famous</a></li></ul>
                </div>
                <div class="credit-col">
                    <h4>Director</h4>
                    <ul><li><a href="/director/somebody">Somebody Else</a></li></ul>
                </div>
            </div>
        </body>
        </html>"#,
        rating_meta = rating_meta,
        title = title
    )
}

/// Mounts both listing pages and every review page
///
/// Each review page is expected to be requested `detail_hits` times.
async fn mount_site(server: &MockServer, detail_hits: u64) {
    Mock::given(method("GET"))
        .and(path("/reviews"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing_page(&PAGE_ONE, Some("/reviews/page/2"))),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/reviews/page/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&PAGE_TWO, None)))
        .mount(server)
        .await;

    for slug in PAGE_ONE.iter().chain(PAGE_TWO.iter()) {
        Mock::given(method("GET"))
            .and(path(format!("/reviews/{}", slug)))
            .respond_with(ResponseTemplate::new(200).set_body_string(review_page(slug, Some("3"))))
            .expect(detail_hits)
            .mount(server)
            .await;
    }
}

fn load_output(path: &Path) -> Vec<Document> {
    JsonCheckpointStore::new(path)
        .load()
        .expect("Failed to read checkpoint")
        .expect("Checkpoint was not written")
}

fn output_path(dir: &TempDir) -> PathBuf {
    dir.path().join("data").join("raw").join("rogerebert_reviews.json")
}

#[tokio::test]
async fn test_full_crawl_exhausts_queue() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server, 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = output_path(&dir);
    let config = create_test_config(&mock_server.uri(), &output, 10);

    let report = run_crawl(config, false).await.expect("Crawl failed");

    assert_eq!(report.collected, 5);
    assert_eq!(report.total, 5);
    assert_eq!(report.listing_pages_visited, 2);
    assert_eq!(report.frontier_remaining, 0);

    let documents = load_output(&output);
    assert_eq!(documents.len(), 5);

    // Listing order is preserved: page one first, then page two
    let urls: Vec<String> = documents.iter().map(|d| d.url.clone()).collect();
    let expected: Vec<String> = PAGE_ONE
        .iter()
        .chain(PAGE_TWO.iter())
        .map(|slug| format!("{}/reviews/{}", mock_server.uri(), slug))
        .collect();
    assert_eq!(urls, expected);

    let first = &documents[0];
    assert_eq!(first.title, PAGE_ONE[0]);
    assert_eq!(first.rating, Some(7.5));
    assert_eq!(first.rating_value, Some(3.0));
    assert_eq!(first.plot, format!("Teaser for {}.", PAGE_ONE[0]));
    assert_eq!(first.reviews, format!("Full review of {}.", PAGE_ONE[0]));
    assert_eq!(first.genres, vec!["Drama"]);
    assert_eq!(first.cast, vec!["Someone Famous"]);
    assert_eq!(first.directors, vec!["Somebody Else"]);
    assert_eq!(first.critic.as_deref(), Some("Test Critic"));
    assert_eq!(first.review_date.as_deref(), Some("2023-06-02"));
    assert_eq!(first.site, "rogerebert");
    assert!(first.id.starts_with("rogerebert_"));
}

#[tokio::test]
async fn test_limit_stops_before_queue_is_drained() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reviews"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing_page(&PAGE_ONE, Some("/reviews/page/2"))),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reviews/page/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&PAGE_TWO, None)))
        .expect(0)
        .mount(&mock_server)
        .await;
    for (slug, hits) in PAGE_ONE.iter().zip([1u64, 1, 0]) {
        Mock::given(method("GET"))
            .and(path(format!("/reviews/{}", slug)))
            .respond_with(ResponseTemplate::new(200).set_body_string(review_page(slug, Some("3"))))
            .expect(hits)
            .mount(&mock_server)
            .await;
    }

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = output_path(&dir);
    let config = create_test_config(&mock_server.uri(), &output, 2);

    let report = run_crawl(config, false).await.expect("Crawl failed");

    assert_eq!(report.collected, 2);
    assert_eq!(report.frontier_remaining, 1);
    assert_eq!(load_output(&output).len(), 2);
}

#[tokio::test]
async fn test_resume_skips_checkpointed_reviews() {
    let mock_server = MockServer::start().await;
    // Every review page is fetched exactly once across both runs
    mount_site(&mock_server, 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = output_path(&dir);

    let first = run_crawl(create_test_config(&mock_server.uri(), &output, 2), false)
        .await
        .expect("First crawl failed");
    assert_eq!(first.collected, 2);

    let second = run_crawl(create_test_config(&mock_server.uri(), &output, 10), false)
        .await
        .expect("Second crawl failed");
    assert_eq!(second.collected, 3);
    assert_eq!(second.total, 5);
    assert_eq!(second.skipped_duplicates, 2);

    let documents = load_output(&output);
    assert_eq!(documents.len(), 5);

    let mut urls: Vec<&str> = documents.iter().map(|d| d.url.as_str()).collect();
    urls.sort_unstable();
    urls.dedup();
    assert_eq!(urls.len(), 5, "Checkpoint contains duplicate URLs");
}

#[tokio::test]
async fn test_fresh_ignores_checkpoint() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server, 2).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = output_path(&dir);

    run_crawl(create_test_config(&mock_server.uri(), &output, 10), false)
        .await
        .expect("First crawl failed");
    let report = run_crawl(create_test_config(&mock_server.uri(), &output, 10), true)
        .await
        .expect("Fresh crawl failed");

    assert_eq!(report.collected, 5);
    assert_eq!(report.total, 5);
    assert_eq!(load_output(&output).len(), 5);
}

#[tokio::test]
async fn test_blocked_review_is_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&PAGE_ONE, None)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/reviews/{}", PAGE_ONE[0])))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/reviews/{}", PAGE_ONE[1])))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/reviews/{}", PAGE_ONE[2])))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(review_page(PAGE_ONE[2], Some("4"))),
        )
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = output_path(&dir);

    let report = run_crawl(create_test_config(&mock_server.uri(), &output, 10), false)
        .await
        .expect("Crawl failed");

    assert_eq!(report.blocked, 1);
    assert_eq!(report.fetch_failures, 1);
    assert_eq!(report.collected, 1);

    let documents = load_output(&output);
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].rating, Some(10.0));
}

#[tokio::test]
async fn test_corrupt_checkpoint_starts_empty() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server, 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = output_path(&dir);
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();
    std::fs::write(&output, "[{\"id\": \"truncated").unwrap();

    let report = run_crawl(create_test_config(&mock_server.uri(), &output, 10), false)
        .await
        .expect("Crawl failed");

    assert_eq!(report.collected, 5);
    assert_eq!(load_output(&output).len(), 5);
}

#[tokio::test]
async fn test_missing_rating_keeps_other_fields() {
    let mock_server = MockServer::start().await;
    let slug = "a-film-without-stars";

    Mock::given(method("GET"))
        .and(path("/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[slug], None)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/reviews/{}", slug)))
        .respond_with(ResponseTemplate::new(200).set_body_string(review_page(slug, None)))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = output_path(&dir);

    run_crawl(create_test_config(&mock_server.uri(), &output, 10), false)
        .await
        .expect("Crawl failed");

    let documents = load_output(&output);
    assert_eq!(documents.len(), 1);

    let document = &documents[0];
    assert_eq!(document.rating, None);
    assert_eq!(document.rating_value, None);
    assert_eq!(document.title, slug);
    assert_eq!(document.genres, vec!["Drama"]);
    assert_eq!(document.critic.as_deref(), Some("Test Critic"));
    assert!(!document.reviews.is_empty());
}

#[tokio::test]
async fn test_empty_listing_collects_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reviews"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>No reviews today</body></html>"),
        )
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = output_path(&dir);

    let report = run_crawl(create_test_config(&mock_server.uri(), &output, 10), false)
        .await
        .expect("Crawl failed");

    assert_eq!(report.collected, 0);
    assert_eq!(report.empty_listing_pages, 1);
    // Nothing collected, nothing written
    assert!(!output.exists());
}
