//! Integration tests for the scraper
//!
//! These tests use wiremock to serve listing and detail pages and run the
//! full scrape cycle end-to-end over `HttpSession`.

use std::path::Path;
use tempfile::TempDir;
use trust_scout::config::{Config, OutputConfig, ScraperConfig, SelectorConfig, UserAgentConfig};
use trust_scout::output::load_report;
use trust_scout::scrape::{build_http_client, run_scrape, Coordinator, RunOutcome, RATING_SENTINEL};
use trust_scout::session::HttpSession;
use trust_scout::storage::{read_records, RunLog, RunStatus};
use trust_scout::{ConfigError, ScoutError, UNKNOWN};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LANDING_PATH: &str = "/categories/animals_pets";

/// Creates a test configuration pointing at `base_url`
fn create_test_config(base_url: &str, csv_path: &Path) -> Config {
    Config {
        scraper: ScraperConfig {
            base_url: base_url.to_string(),
            category: "animals_pets".to_string(),
            page_size: 20,
            wait_timeout: 1000,
            detail_delay: 1, // Very short for testing
            page_delay: 1,
            max_pages: None,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestScout".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            csv_path: csv_path.display().to_string(),
            summary_path: "./test_summary.md".to_string(),
            run_log_path: None,
        },
        selectors: SelectorConfig::default(),
    }
}

/// Markup of one business card
fn card(name: &str, rating: &str, location: &str, href: Option<&str>) -> String {
    let href = href
        .map(|h| format!(r#" href="{}""#, h))
        .unwrap_or_default();
    format!(
        r#"<a name="business-unit-card"{}>
            <p class="CDS_Typography_appearance-default__bedfe1">{}</p>
            <p class="styles_ratingText__A2dmB">{}</p>
            <span class="styles_location__wea8G">{}</span>
        </a>"#,
        href, name, rating, location
    )
}

/// Markup of a listing page
fn listing(cards: &[String], last_page: Option<u32>, next_href: Option<&str>) -> String {
    let mut html = String::from(
        r#"<html><body><div id="onetrust-banner"><button class="onetrust-close-btn-handler">Close</button></div>"#,
    );
    for card in cards {
        html.push_str(card);
    }
    html.push_str("<nav>");
    if let Some(last) = last_page {
        html.push_str(&format!(
            r#"<a data-pagination-button-last-link="true" href="?page={}">{}</a>"#,
            last, last
        ));
    }
    if let Some(next) = next_href {
        html.push_str(&format!(
            r#"<a data-pagination-button-next-link="true" href="{}">Next page</a>"#,
            next
        ));
    }
    html.push_str("</nav></body></html>");
    html
}

/// Markup of a detail page with the given contact lines
fn detail_page(items: &[&str]) -> String {
    let items: String = items
        .iter()
        .map(|item| format!(r#"<li class="styles_itemRow__0RLiS">{}</li>"#, item))
        .collect();
    format!(
        r#"<html><body><ul class="styles_itemsColumn__qKHcq">{}</ul></body></html>"#,
        items
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn run_with_http(config: Config) -> Result<trust_scout::RunSummary, ScoutError> {
    let client = build_http_client(&config.user_agent).expect("Failed to build client");
    let session = HttpSession::new(client.clone());
    Coordinator::with_client(config, client, session)
        .expect("Failed to create coordinator")
        .run()
        .await
}

#[tokio::test]
async fn test_single_page_with_two_businesses() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("company.csv");

    mount_page(
        &mock_server,
        LANDING_PATH,
        listing(
            &[
                card("Acme Pets", "TrustScore 4.5|1,234 reviews", "United States", Some("/review/acmepets.com")),
                card("Bark Ltd", "TrustScore 3.1|56 reviews", "Denmark", Some("/review/bark.dk")),
            ],
            None,
            None,
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/review/acmepets.com",
        detail_page(&[
            "<p>1 Pet Lane, Springfield</p>",
            r#"<a href="tel:+15550100">+1 555 0100</a>"#,
            r#"<a href="mailto:hello@acmepets.com">hello@acmepets.com</a>"#,
            r#"<a href="https://acmepets.com">acmepets.com</a>"#,
        ]),
    )
    .await;
    mount_page(
        &mock_server,
        "/review/bark.dk",
        detail_page(&[r#"<a href="https://bark.dk">bark.dk</a>"#]),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &csv_path);
    let summary = run_with_http(config).await.expect("Scrape failed");

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.total_pages, 1);
    assert_eq!(summary.rows_written, 2);

    let contents = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("ID,Company Name,Domain,Score,Location,Address,Phone,Email,Website")
    );
    assert_eq!(lines.count(), 2);

    let records = read_records(&csv_path).unwrap();
    assert_eq!(records[0].sequence_id, 0);
    assert_eq!(records[0].name, "Acme Pets");
    assert_eq!(records[0].domain_slug, "acmepets.com");
    assert_eq!(records[0].rating_summary, "TrustScore 4.5|1,234 reviews");
    assert_eq!(records[0].location, "United States");
    assert_eq!(records[0].address, "1 Pet Lane, Springfield");
    assert_eq!(records[0].phone, "+1 555 0100");
    assert_eq!(records[0].email, "hello@acmepets.com");
    assert_eq!(records[0].website, "acmepets.com");

    assert_eq!(records[1].sequence_id, 1);
    assert_eq!(records[1].domain_slug, "bark.dk");
    assert_eq!(records[1].website, "bark.dk");
    assert_eq!(records[1].address, UNKNOWN);
    assert_eq!(records[1].phone, UNKNOWN);
    assert_eq!(records[1].email, UNKNOWN);
}

#[tokio::test]
async fn test_report_parses_scraped_scores() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("company.csv");

    mount_page(
        &mock_server,
        LANDING_PATH,
        listing(
            &[
                card("Acme Pets", "TrustScore 4.5|1,234 reviews", "United States", None),
                // No rating element at all
                r#"<a name="business-unit-card"><p class="CDS_Typography_appearance-default__bedfe1">Quiet Co</p></a>"#.to_string(),
            ],
            None,
            None,
        ),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &csv_path);
    run_with_http(config).await.expect("Scrape failed");

    let records = read_records(&csv_path).unwrap();
    assert_eq!(records[1].rating_summary, RATING_SENTINEL);
    assert_eq!(records[1].location, UNKNOWN);

    let report = load_report(&csv_path, 10).unwrap();
    assert_eq!(report.total_records, 2);
    assert_eq!(report.top_trust_scores[0], ("Acme Pets".to_string(), 4.5));
    assert_eq!(report.top_reviews[0], ("Acme Pets".to_string(), 1234.0));
    assert_eq!(report.top_trust_scores[1], ("Quiet Co".to_string(), 0.0));
    assert_eq!(report.top_locations, vec![("United States".to_string(), 1)]);
}

#[tokio::test]
async fn test_card_without_link_makes_no_detail_request() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("company.csv");

    mount_page(
        &mock_server,
        LANDING_PATH,
        listing(
            &[card("Linkless Ltd", "TrustScore 4.0|10 reviews", "Norway", None)],
            None,
            None,
        ),
    )
    .await;

    Mock::given(path_regex(r"^/review/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &csv_path);
    run_with_http(config).await.expect("Scrape failed");

    let records = read_records(&csv_path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Linkless Ltd");
    assert_eq!(records[0].domain_slug, "");
    assert_eq!(records[0].address, UNKNOWN);
    assert_eq!(records[0].phone, UNKNOWN);
    assert_eq!(records[0].email, UNKNOWN);
    assert_eq!(records[0].website, UNKNOWN);
}

#[tokio::test]
async fn test_missing_pagination_means_one_page() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("company.csv");

    mount_page(
        &mock_server,
        LANDING_PATH,
        listing(
            &[card("Solo", "TrustScore 5|1 reviews", "Iceland", None)],
            None,
            None,
        ),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &csv_path);
    let summary = run_with_http(config).await.expect("Scrape failed");

    assert_eq!(summary.total_pages, 1);
    assert_eq!(summary.pages_scraped, 1);
    assert_eq!(summary.outcome, RunOutcome::Completed);
}

#[tokio::test]
async fn test_multi_page_run_assigns_page_offsets() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("company.csv");

    mount_page(
        &mock_server,
        LANDING_PATH,
        listing(
            &[
                card("First", "TrustScore 4.1|10 reviews", "Sweden", None),
                card("Second", "TrustScore 4.2|20 reviews", "Sweden", None),
            ],
            Some(2),
            Some("/categories/animals_pets/page-2"),
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/categories/animals_pets/page-2",
        listing(
            &[card("Third", "TrustScore 4.3|30 reviews", "Finland", None)],
            Some(2),
            None,
        ),
    )
    .await;

    let mut config = create_test_config(&mock_server.uri(), &csv_path);
    config.scraper.page_size = 2;
    let summary = run_with_http(config).await.expect("Scrape failed");

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.pages_scraped, 2);

    let ids: Vec<u64> = read_records(&csv_path)
        .unwrap()
        .iter()
        .map(|r| r.sequence_id)
        .collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_early_pagination_exhaustion() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("company.csv");

    // Declares 3 pages but page two has no next control
    mount_page(
        &mock_server,
        LANDING_PATH,
        listing(
            &[card("Page One", "TrustScore 4.0|1 reviews", "Spain", None)],
            Some(3),
            Some("/categories/animals_pets/page-2"),
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/categories/animals_pets/page-2",
        listing(
            &[card("Page Two", "TrustScore 4.0|1 reviews", "Spain", None)],
            Some(3),
            None,
        ),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &csv_path);
    let summary = run_with_http(config).await.expect("Exhaustion is not an error");

    assert_eq!(summary.outcome, RunOutcome::Exhausted);
    assert_eq!(summary.total_pages, 3);
    assert_eq!(summary.pages_scraped, 2);

    let records = read_records(&csv_path).unwrap();
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Page One", "Page Two"]);
    assert_eq!(records[1].sequence_id, 20);
}

#[tokio::test]
async fn test_failed_detail_request_yields_unknown_contacts() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("company.csv");

    mount_page(
        &mock_server,
        LANDING_PATH,
        listing(
            &[card("Blocked Inc", "TrustScore 2.0|3 reviews", "France", Some("/review/blocked.fr"))],
            None,
            None,
        ),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/review/blocked.fr"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_string(detail_page(&[r#"<a href="tel:123">123</a>"#])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &csv_path);
    let summary = run_with_http(config).await.expect("Scrape failed");
    assert_eq!(summary.rows_written, 1);

    let records = read_records(&csv_path).unwrap();
    assert_eq!(records[0].name, "Blocked Inc");
    assert_eq!(records[0].domain_slug, "blocked.fr");
    assert_eq!(records[0].address, UNKNOWN);
    assert_eq!(records[0].phone, UNKNOWN);
    assert_eq!(records[0].email, UNKNOWN);
    assert_eq!(records[0].website, UNKNOWN);
}

#[tokio::test]
async fn test_unreachable_site_leaves_header_only_file() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("company.csv");

    // Nothing listens on the discard port
    let config = create_test_config("http://127.0.0.1:9", &csv_path);
    let result = run_with_http(config).await;

    assert!(matches!(result, Err(ScoutError::Session(_))));
    let contents = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(contents.lines().count(), 1);
    assert!(read_records(&csv_path).unwrap().is_empty());
}

#[tokio::test]
async fn test_unopenable_output_is_config_error() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("no-such-dir").join("company.csv");

    let config = create_test_config(&mock_server.uri(), &csv_path);
    let result = run_with_http(config).await;

    assert!(matches!(
        result,
        Err(ScoutError::Config(ConfigError::OutputPath { .. }))
    ));
}

#[tokio::test]
async fn test_second_run_appends_to_existing_file() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("company.csv");

    mount_page(
        &mock_server,
        LANDING_PATH,
        listing(
            &[card("Repeat", "TrustScore 3.3|33 reviews", "Italy", None)],
            None,
            None,
        ),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &csv_path);
    run_scrape(config.clone()).await.expect("First run failed");
    run_scrape(config).await.expect("Second run failed");

    let contents = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(contents.matches("Company Name").count(), 1);

    let records = read_records(&csv_path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], records[1]);
}

#[tokio::test]
async fn test_cancelled_run_keeps_rows_written() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("company.csv");

    mount_page(
        &mock_server,
        LANDING_PATH,
        listing(
            &[card("Never Written", "TrustScore 1.0|1 reviews", "Malta", None)],
            None,
            None,
        ),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &csv_path);
    let client = build_http_client(&config.user_agent).unwrap();
    let session = HttpSession::new(client.clone());
    let coordinator = Coordinator::with_client(config, client, session).unwrap();
    coordinator.cancel_handle().cancel();

    let summary = coordinator.run().await.expect("Cancellation is not an error");

    assert_eq!(summary.outcome, RunOutcome::Cancelled);
    assert_eq!(summary.rows_written, 0);
    assert!(read_records(&csv_path).unwrap().is_empty());
}

#[tokio::test]
async fn test_run_log_records_outcome() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("company.csv");
    let log_path = temp_dir.path().join("runs.db");

    mount_page(
        &mock_server,
        LANDING_PATH,
        listing(
            &[card("Logged", "TrustScore 4.4|44 reviews", "Austria", None)],
            None,
            None,
        ),
    )
    .await;

    let mut run_log = RunLog::open(&log_path).unwrap();
    let run_id = run_log
        .create_run("animals_pets", &csv_path.display().to_string(), "hash")
        .unwrap();

    let config = create_test_config(&mock_server.uri(), &csv_path);
    let summary = run_scrape(config).await.unwrap();
    run_log
        .finish_run(run_id, summary.outcome.into(), summary.rows_written)
        .unwrap();

    let latest = run_log.latest_run().unwrap().unwrap();
    assert_eq!(latest.id, run_id);
    assert_eq!(latest.status, RunStatus::Completed);
    assert_eq!(latest.rows_written, 1);
}
