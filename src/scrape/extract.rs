//! Field extraction from business cards
//!
//! Each card on a listing page yields a fixed set of fields. Every field is
//! looked up on its own and reported as a `Field`; a card missing its rating
//! still yields its name and location. Sentinels are substituted only when a
//! record is assembled, through `Field::or_sentinel`.

use crate::config::{compile_selector, SelectorConfig};
use crate::{ConfigError, UNKNOWN};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Sentinel for a missing rating; keeps the shape of a real rating summary
pub const RATING_SENTINEL: &str = "TrustScore 0 | 0 reviews";

/// Path prefix of business review pages
const REVIEW_PREFIX: &str = "/review/";

/// Outcome of looking up a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// The field was found and has non-blank text
    Value(String),
    /// The element was absent or empty
    Missing,
}

impl Field {
    /// Builds a field from optional text; blank text counts as missing
    pub fn from_text(text: Option<String>) -> Self {
        match text {
            Some(text) if !text.trim().is_empty() => Self::Value(text.trim().to_string()),
            _ => Self::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Value(v) => Some(v),
            Self::Missing => None,
        }
    }

    /// The extracted value, or `sentinel` if the field is missing
    pub fn or_sentinel(&self, sentinel: &str) -> String {
        self.value().unwrap_or(sentinel).to_string()
    }
}

/// Where a card links to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLink {
    /// Review-page path without the `/review/` prefix
    pub domain_slug: String,
    /// Absolute URL of the business detail page
    pub detail_url: Url,
}

/// Fields extracted from one business card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFields {
    pub name: Field,
    pub rating_summary: Field,
    pub location: Field,
    pub link: Option<CardLink>,
}

impl CardFields {
    pub fn name(&self) -> String {
        self.name.or_sentinel(UNKNOWN)
    }

    pub fn rating_summary(&self) -> String {
        self.rating_summary.or_sentinel(RATING_SENTINEL)
    }

    pub fn location(&self) -> String {
        self.location.or_sentinel(UNKNOWN)
    }

    /// Empty when the card has no link
    pub fn domain_slug(&self) -> &str {
        self.link.as_ref().map_or("", |l| l.domain_slug.as_str())
    }

    pub fn detail_url(&self) -> Option<&Url> {
        self.link.as_ref().map(|l| &l.detail_url)
    }
}

/// Compiled selectors for listing pages
#[derive(Debug, Clone)]
pub struct CardSelectors {
    card: Selector,
    name: Selector,
    rating: Selector,
    location: Selector,
    link: Selector,
}

impl CardSelectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            card: compile_selector(&config.card)?,
            name: compile_selector(&config.card_name)?,
            rating: compile_selector(&config.card_rating)?,
            location: compile_selector(&config.card_location)?,
            link: compile_selector("a[href]")?,
        })
    }
}

/// Concatenates text nodes and collapses runs of whitespace into single spaces
pub fn collapse_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a listing page into its cards, in source order
pub fn parse_cards(html: &str, selectors: &CardSelectors, base_url: &Url) -> Vec<CardFields> {
    let document = Html::parse_document(html);

    document
        .select(&selectors.card)
        .map(|card| extract_card(card, selectors, base_url))
        .collect()
}

/// Extracts the fields of a single card
pub fn extract_card(card: ElementRef<'_>, selectors: &CardSelectors, base_url: &Url) -> CardFields {
    CardFields {
        name: text_of(card, &selectors.name),
        rating_summary: text_of(card, &selectors.rating),
        location: text_of(card, &selectors.location),
        link: card_href(card, &selectors.link).and_then(|href| card_link(href, base_url)),
    }
}

/// Text of the first descendant matching `selector`
fn text_of(card: ElementRef<'_>, selector: &Selector) -> Field {
    Field::from_text(
        card.select(selector)
            .next()
            .map(|element| collapse_text(element.text())),
    )
}

/// The card's own href, or that of its first link
fn card_href<'a>(card: ElementRef<'a>, link: &Selector) -> Option<&'a str> {
    card.value()
        .attr("href")
        .or_else(|| card.select(link).next().and_then(|a| a.value().attr("href")))
        .map(str::trim)
        .filter(|href| !href.is_empty())
}

/// Resolves a card href into its detail URL and domain slug
fn card_link(href: &str, base_url: &Url) -> Option<CardLink> {
    let detail_url = match base_url.join(href) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Ignoring unparseable card link '{}': {}", href, e);
            return None;
        }
    };

    let path = detail_url.path();
    let domain_slug = path
        .strip_prefix(REVIEW_PREFIX)
        .unwrap_or_else(|| path.trim_start_matches('/'))
        .to_string();

    Some(CardLink {
        domain_slug,
        detail_url,
    })
}
