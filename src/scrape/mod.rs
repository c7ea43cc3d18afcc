//! Scrape module for category listings and business detail pages
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching of detail pages
//! - Card field extraction with per-field sentinels
//! - Contact resolution from detail pages
//! - Pagination over listing pages
//! - Overall run coordination

mod contacts;
mod coordinator;
mod extract;
mod fetcher;
mod pagination;
mod record;

pub use contacts::{
    classify_contacts, classify_link, ContactInfo, ContactKind, ContactResolver, ContactSelectors,
};
pub use coordinator::{Coordinator, RunOutcome, RunSummary};
pub use extract::{
    collapse_text, extract_card, parse_cards, CardFields, CardLink, CardSelectors, Field,
    RATING_SENTINEL,
};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use pagination::Paginator;
pub use record::BusinessRecord;

use crate::config::Config;
use crate::session::HttpSession;
use crate::ScoutError;

/// Runs a complete scrape over plain HTTP
///
/// Listing pages and detail pages share one client.
///
/// # Example
///
/// ```no_run
/// use trust_scout::config::load_config;
/// use trust_scout::scrape::run_scrape;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = run_scrape(config).await?;
/// println!("{} rows", summary.rows_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape(config: Config) -> Result<RunSummary, ScoutError> {
    let client = build_http_client(&config.user_agent)?;
    let session = HttpSession::new(client.clone());
    Coordinator::with_client(config, client, session)?
        .run()
        .await
}
