use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Main configuration structure for Trust-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scraper: ScraperConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Scraper behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Root of the review site (e.g. "https://www.trustpilot.com")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Category slug to scrape
    pub category: String,

    /// Assumed number of cards per listing page, used for row IDs
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// Bounded wait for page elements (milliseconds)
    #[serde(rename = "wait-timeout", default = "default_wait_timeout")]
    pub wait_timeout: u64,

    /// Pause before each detail-page request (milliseconds)
    #[serde(rename = "detail-delay", default = "default_detail_delay")]
    pub detail_delay: u64,

    /// Pause after each page advance (milliseconds)
    #[serde(rename = "page-delay", default = "default_page_delay")]
    pub page_delay: u64,

    /// Optional cap on the number of listing pages to visit
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,
}

fn default_page_size() -> u32 {
    20
}

fn default_wait_timeout() -> u64 {
    5000
}

fn default_detail_delay() -> u64 {
    2000
}

fn default_page_delay() -> u64 {
    3000
}

impl ScraperConfig {
    /// URL of the first listing page for the configured category
    pub fn landing_url(&self) -> Result<Url, url::ParseError> {
        let base = Url::parse(&self.base_url)?;
        base.join(&format!("/categories/{}", self.category.trim()))
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout)
    }

    pub fn detail_delay(&self) -> Duration {
        Duration::from_millis(self.detail_delay)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV file records are appended to
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Path to the markdown report
    #[serde(rename = "summary-path", default = "default_summary_path")]
    pub summary_path: String,

    /// Path to the SQLite run log; no run history is kept when absent
    #[serde(rename = "run-log-path", default)]
    pub run_log_path: Option<String>,
}

fn default_summary_path() -> String {
    "summary.md".to_string()
}

/// CSS selectors describing the remote page structure
///
/// The defaults match the review site's current markup. Its class names
/// are generated and change between deployments, so every one of them can
/// be overridden from the `[selectors]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    #[serde(rename = "consent-button")]
    pub consent_button: String,

    #[serde(rename = "last-page")]
    pub last_page: String,

    #[serde(rename = "next-page")]
    pub next_page: String,

    pub card: String,

    #[serde(rename = "card-name")]
    pub card_name: String,

    #[serde(rename = "card-rating")]
    pub card_rating: String,

    #[serde(rename = "card-location")]
    pub card_location: String,

    #[serde(rename = "contact-list")]
    pub contact_list: String,

    #[serde(rename = "contact-item")]
    pub contact_item: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            consent_button: ".onetrust-close-btn-handler".to_string(),
            last_page: "a[data-pagination-button-last-link='true']".to_string(),
            next_page: "a[data-pagination-button-next-link='true']".to_string(),
            card: "a[name='business-unit-card']".to_string(),
            card_name: "p.CDS_Typography_appearance-default__bedfe1".to_string(),
            card_rating: "p.styles_ratingText__A2dmB".to_string(),
            card_location: "span.styles_location__wea8G".to_string(),
            contact_list: "ul.styles_itemsColumn__qKHcq".to_string(),
            contact_item: "li.styles_itemRow__0RLiS".to_string(),
        }
    }
}

impl SelectorConfig {
    /// All selectors paired with their config key, for validation
    pub fn entries(&self) -> [(&'static str, &str); 9] {
        [
            ("consent-button", &self.consent_button),
            ("last-page", &self.last_page),
            ("next-page", &self.next_page),
            ("card", &self.card),
            ("card-name", &self.card_name),
            ("card-rating", &self.card_rating),
            ("card-location", &self.card_location),
            ("contact-list", &self.contact_list),
            ("contact-item", &self.contact_item),
        ]
    }
}
