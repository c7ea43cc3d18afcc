//! Contact resolution from business detail pages
//!
//! Detail pages list a business's contact lines. Rather than relying on
//! per-field class names, each line is classified by the link it carries:
//! `tel:` is a phone number, `mailto:` an email address, an http(s) link the
//! website, and a line with no link at all the postal address.

use crate::config::{compile_selector, SelectorConfig};
use crate::scrape::extract::collapse_text;
use crate::scrape::fetcher::{fetch_url, FetchResult};
use crate::{ConfigError, UNKNOWN};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// Contact details of one business
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInfo {
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
}

impl ContactInfo {
    /// All four fields set to the `Unknown` sentinel
    pub fn unknown() -> Self {
        Self {
            address: UNKNOWN.to_string(),
            phone: UNKNOWN.to_string(),
            email: UNKNOWN.to_string(),
            website: UNKNOWN.to_string(),
        }
    }

    fn set(&mut self, kind: ContactKind, value: String) {
        match kind {
            ContactKind::Address => self.address = value,
            ContactKind::Phone => self.phone = value,
            ContactKind::Email => self.email = value,
            ContactKind::Website => self.website = value,
        }
    }
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Kind of a contact line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Address,
    Phone,
    Email,
    Website,
}

/// Classifies a contact link by its scheme
///
/// Returns None for links that are none of phone, email or website.
pub fn classify_link(href: &str) -> Option<ContactKind> {
    let href = href.trim().to_ascii_lowercase();

    if href.starts_with("tel:") {
        Some(ContactKind::Phone)
    } else if href.starts_with("mailto:") {
        Some(ContactKind::Email)
    } else if href.starts_with("http:") || href.starts_with("https:") {
        Some(ContactKind::Website)
    } else {
        None
    }
}

/// Compiled selectors for detail pages
#[derive(Debug, Clone)]
pub struct ContactSelectors {
    list: Selector,
    item: Selector,
    link: Selector,
}

impl ContactSelectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            list: compile_selector(&config.contact_list)?,
            item: compile_selector(&config.contact_item)?,
            link: compile_selector("a[href]")?,
        })
    }
}

/// Extracts contact details from detail-page markup
///
/// Lines are read in order and a later line of the same kind replaces an
/// earlier one. Without a contact list every field stays `Unknown`.
pub fn classify_contacts(html: &str, selectors: &ContactSelectors) -> ContactInfo {
    let document = Html::parse_document(html);
    let mut contacts = ContactInfo::unknown();

    let Some(list) = document.select(&selectors.list).next() else {
        tracing::debug!("No contact list on detail page");
        return contacts;
    };

    for item in list.select(&selectors.item) {
        match item.select(&selectors.link).next() {
            Some(link) => {
                let href = link.value().attr("href").unwrap_or_default();
                let text = collapse_text(link.text());
                match classify_link(href) {
                    Some(kind) if !text.is_empty() => contacts.set(kind, text),
                    _ => tracing::trace!("Skipping contact link '{}'", href),
                }
            }
            None => {
                let text = collapse_text(item.text());
                if !text.is_empty() {
                    contacts.set(ContactKind::Address, text);
                }
            }
        }
    }

    contacts
}

/// Fetches detail pages and resolves their contact details
pub struct ContactResolver {
    client: Client,
    selectors: ContactSelectors,
    delay: Duration,
}

impl ContactResolver {
    /// Creates a resolver that waits `delay` before every request
    pub fn new(client: Client, selectors: ContactSelectors, delay: Duration) -> Self {
        Self {
            client,
            selectors,
            delay,
        }
    }

    /// Resolves the contact details behind `detail_url`
    ///
    /// Failed requests are routine on third-party pages; they are logged and
    /// produce `ContactInfo::unknown()`.
    pub async fn resolve(&self, detail_url: &Url) -> ContactInfo {
        tokio::time::sleep(self.delay).await;
        tracing::debug!("Processing {}", detail_url);

        match fetch_url(&self.client, detail_url.as_str()).await {
            FetchResult::Success { body, .. } => classify_contacts(&body, &self.selectors),
            FetchResult::HttpError { status_code } => {
                tracing::warn!("Failed request for {}: HTTP {}", detail_url, status_code);
                ContactInfo::unknown()
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!("Failed request for {}: {}", detail_url, error);
                ContactInfo::unknown()
            }
        }
    }
}
