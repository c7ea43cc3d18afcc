//! Session backed by a plain HTTP client
//!
//! Listing pages on the review site are server-rendered, so a browser is not
//! required to read them: loading is a GET, clicking a link is a GET of its
//! resolved target, and clicking anything else (the consent overlay's close
//! button) has no effect on a static document.

use crate::scrape::collapse_text;
use crate::session::{Element, Session, SessionError, SessionResult};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

/// The page currently held by the session
#[derive(Debug, Clone)]
struct LoadedPage {
    url: Url,
    status_code: u16,
    body: String,
}

/// What a click on the matched element amounts to
#[derive(Debug, PartialEq, Eq)]
enum ClickTarget {
    Missing,
    Disabled,
    Inert,
    Navigate(String),
}

/// HTTP implementation of `Session`
pub struct HttpSession {
    client: Client,
    page: Option<LoadedPage>,
    closed: bool,
}

impl HttpSession {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            page: None,
            closed: false,
        }
    }

    /// HTTP status of the current page, if one is loaded
    pub fn status_code(&self) -> Option<u16> {
        self.page.as_ref().map(|p| p.status_code)
    }

    fn ensure_open(&self) -> SessionResult<()> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        Ok(())
    }

    fn current_page(&self) -> SessionResult<&LoadedPage> {
        self.ensure_open()?;
        self.page.as_ref().ok_or(SessionError::NoPage)
    }
}

#[async_trait]
impl Session for HttpSession {
    async fn load(&mut self, url: &str) -> SessionResult<()> {
        self.ensure_open()?;

        let navigation_error = |message: String| SessionError::Navigation {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| navigation_error(e.to_string()))?;

        let status = response.status();
        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| navigation_error(e.to_string()))?;

        // A browser shows error pages too; the caller finds no elements on them.
        if !status.is_success() {
            tracing::debug!("Loaded {} with HTTP {}", final_url, status.as_u16());
        }

        self.page = Some(LoadedPage {
            url: final_url,
            status_code: status.as_u16(),
            body,
        });
        Ok(())
    }

    async fn wait_for(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> SessionResult<Option<Element>> {
        // A fetched document does not change after load, so the lookup
        // settles immediately.
        let page = self.current_page()?;
        find_first(&page.body, selector)
    }

    async fn click(&mut self, selector: &str, timeout: Duration) -> SessionResult<bool> {
        let page = self.current_page()?;
        let target = click_target(&page.body, selector, &page.url)?;

        match target {
            ClickTarget::Missing | ClickTarget::Disabled => Ok(false),
            ClickTarget::Inert => {
                // Script-driven controls have no effect on a fetched document
                tracing::trace!("Control '{}' is inert, page unchanged", selector);
                Ok(true)
            }
            ClickTarget::Navigate(url) => {
                match tokio::time::timeout(timeout, self.load(&url)).await {
                    Ok(result) => result.map(|_| true),
                    Err(_) => Err(SessionError::Navigation {
                        url,
                        message: format!("no response within {:?}", timeout),
                    }),
                }
            }
        }
    }

    fn page_source(&self) -> SessionResult<String> {
        Ok(self.current_page()?.body.clone())
    }

    fn current_url(&self) -> Option<String> {
        self.page.as_ref().map(|p| p.url.to_string())
    }

    async fn close(&mut self) -> SessionResult<()> {
        self.closed = true;
        self.page = None;
        Ok(())
    }
}

fn parse_selector(selector: &str) -> SessionResult<Selector> {
    Selector::parse(selector).map_err(|_| SessionError::InvalidSelector(selector.to_string()))
}

fn to_element(element: ElementRef<'_>) -> Element {
    Element {
        text: collapse_text(element.text()),
        href: element.value().attr("href").map(str::to_string),
    }
}

/// Finds the first element matching `selector` in `html`
fn find_first(html: &str, selector: &str) -> SessionResult<Option<Element>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    let found = document.select(&selector).next().map(to_element);
    Ok(found)
}

/// Decides what clicking the first match of `selector` would do
fn click_target(html: &str, selector: &str, base: &Url) -> SessionResult<ClickTarget> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);

    let Some(element) = document.select(&selector).next() else {
        return Ok(ClickTarget::Missing);
    };

    let value = element.value();
    if value.attr("disabled").is_some() || value.attr("aria-disabled") == Some("true") {
        return Ok(ClickTarget::Disabled);
    }

    if value.name() != "a" {
        return Ok(ClickTarget::Inert);
    }

    let href = match value.attr("href").map(str::trim) {
        Some(href) if !href.is_empty() => href,
        // An anchor without a target is not clickable
        _ => return Ok(ClickTarget::Disabled),
    };

    if href.starts_with('#') || href.starts_with("javascript:") {
        return Ok(ClickTarget::Inert);
    }

    match base.join(href) {
        Ok(url) => Ok(ClickTarget::Navigate(url.to_string())),
        Err(_) => Ok(ClickTarget::Disabled),
    }
}
