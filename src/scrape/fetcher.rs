//! HTTP fetcher implementation
//!
//! This module handles the plain HTTP requests made outside the session:
//! - Building the HTTP client with the configured user agent
//! - GET requests for business detail pages
//! - Classifying failures so callers can fall back instead of aborting

use crate::config::UserAgentConfig;
use reqwest::Client;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Example
///
/// ```no_run
/// use trust_scout::config::UserAgentConfig;
/// use trust_scout::scrape::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "TrustScout".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// Never fails: every problem is reported as a `FetchResult` variant so the
/// caller decides whether it matters.
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            if !status.is_success() {
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchResult::Success {
                    final_url,
                    status_code: status.as_u16(),
                    body,
                },
                Err(e) => FetchResult::NetworkError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.to_string()
            };
            FetchResult::NetworkError { error }
        }
    }
}
