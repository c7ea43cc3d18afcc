//! Pagination over category listing pages
//!
//! Pagination controls belong to a third-party page and come and go. Every
//! lookup here is bounded by the configured wait, and a missing control is
//! an answer ("one page", "no next page"), not an error. Only a session that
//! can no longer be used is reported as a failure.

use crate::config::SelectorConfig;
use crate::session::{Session, SessionError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use url::Url;

/// A whole page number, optionally grouped in thousands (`1,204`, `1.204`)
static PAGE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[0-9]+|[0-9]{1,3}(?:[,. ][0-9]{3})+)$")
        .expect("Page number regex is hardcoded and valid")
});

/// Drives navigation across the listing pages of one category
#[derive(Debug, Clone)]
pub struct Paginator {
    consent_button: String,
    last_page: String,
    next_page: String,
    wait: Duration,
}

impl Paginator {
    pub fn new(selectors: &SelectorConfig, wait: Duration) -> Self {
        Self {
            consent_button: selectors.consent_button.clone(),
            last_page: selectors.last_page.clone(),
            next_page: selectors.next_page.clone(),
            wait,
        }
    }

    /// Loads the landing page and reads the number of listing pages
    ///
    /// Dismisses the consent overlay if one shows up, then reads the "last
    /// page" control. Returns 1 when the control is absent or unreadable.
    pub async fn determine_page_count<S>(
        &self,
        session: &mut S,
        landing_url: &Url,
    ) -> Result<u32, SessionError>
    where
        S: Session + ?Sized,
    {
        session.load(landing_url.as_str()).await?;
        self.dismiss_consent(session).await?;

        let count = match session.wait_for(&self.last_page, self.wait).await? {
            Some(element) => parse_page_number(&element.text).unwrap_or_else(|| {
                tracing::debug!(
                    "Unreadable last-page control '{}', assuming one page",
                    element.text
                );
                1
            }),
            None => {
                tracing::debug!("No pagination on {}, assuming one page", landing_url);
                1
            }
        };

        tracing::info!("Category has {} page(s)", count);
        Ok(count)
    }

    /// Navigates to the next listing page
    ///
    /// Returns `Ok(false)` and leaves the session where it is when there is
    /// no next-page control or following it fails.
    pub async fn advance_page<S>(&self, session: &mut S) -> Result<bool, SessionError>
    where
        S: Session + ?Sized,
    {
        match session.click(&self.next_page, self.wait).await {
            Ok(true) => Ok(true),
            Ok(false) => {
                tracing::debug!("No clickable next-page control");
                Ok(false)
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::warn!("Next page could not be loaded: {}", e);
                Ok(false)
            }
        }
    }

    async fn dismiss_consent<S>(&self, session: &mut S) -> Result<(), SessionError>
    where
        S: Session + ?Sized,
    {
        match session.click(&self.consent_button, self.wait).await {
            Ok(true) => tracing::trace!("Clicked consent control"),
            Ok(false) => tracing::debug!("No consent overlay"),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => tracing::debug!("Consent overlay could not be dismissed: {}", e),
        }
        Ok(())
    }
}

/// Parses the integer shown on a pagination control
fn parse_page_number(text: &str) -> Option<u32> {
    let text = text.trim();
    if !PAGE_NUMBER.is_match(text) {
        return None;
    }
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::scripted::ScriptedSession;

    const LANDING: &str = "https://site.test/categories/sports";

    fn paginator() -> Paginator {
        Paginator::new(&SelectorConfig::default(), Duration::from_millis(50))
    }

    fn landing() -> Url {
        Url::parse(LANDING).unwrap()
    }

    #[test]
    fn test_parse_page_number() {
        assert_eq!(parse_page_number("7"), Some(7));
        assert_eq!(parse_page_number(" 1,204 "), Some(1204));
        assert_eq!(parse_page_number("Last"), None);
        assert_eq!(parse_page_number(""), None);
    }

    #[test]
    fn test_parse_page_number_rejects_fractions() {
        assert_eq!(parse_page_number("1.204"), Some(1204));
        assert_eq!(parse_page_number("1 204"), Some(1204));
        assert_eq!(parse_page_number("1.5"), None);
        assert_eq!(parse_page_number("12,34"), None);
        assert_eq!(parse_page_number("3 pages"), None);
    }

    #[tokio::test]
    async fn test_page_count_from_last_page_control() {
        let html = r#"<button class="onetrust-close-btn-handler">x</button>
            <a data-pagination-button-last-link="true" href="?page=12">12</a>"#;
        let mut session = ScriptedSession::new(&[(LANDING, html)]);

        let count = paginator()
            .determine_page_count(&mut session, &landing())
            .await
            .unwrap();
        assert_eq!(count, 12);
    }

    #[tokio::test]
    async fn test_page_count_defaults_to_one_without_pagination() {
        let mut session = ScriptedSession::new(&[(LANDING, "<html><body>cards</body></html>")]);

        let count = paginator()
            .determine_page_count(&mut session, &landing())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_page_count_defaults_to_one_for_unreadable_control() {
        let html = r#"<a data-pagination-button-last-link="true">Last</a>"#;
        let mut session = ScriptedSession::new(&[(LANDING, html)]);

        let count = paginator()
            .determine_page_count(&mut session, &landing())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_page_count_fails_when_landing_unreachable() {
        let mut session = ScriptedSession::new(&[]);
        let result = paginator()
            .determine_page_count(&mut session, &landing())
            .await;
        assert!(matches!(result, Err(SessionError::Navigation { .. })));
    }

    #[tokio::test]
    async fn test_advance_page() {
        let page2 = "https://site.test/categories/sports?page=2";
        let mut session = ScriptedSession::new(&[
            (
                LANDING,
                r#"<a data-pagination-button-next-link="true" href="https://site.test/categories/sports?page=2">Next</a>"#,
            ),
            (page2, "<p>page two</p>"),
        ]);
        session.load(LANDING).await.unwrap();

        assert!(paginator().advance_page(&mut session).await.unwrap());
        assert_eq!(session.current_url().as_deref(), Some(page2));

        // No next control on page two
        assert!(!paginator().advance_page(&mut session).await.unwrap());
        assert_eq!(session.current_url().as_deref(), Some(page2));
    }

    #[tokio::test]
    async fn test_advance_page_swallows_navigation_failure() {
        let mut session = ScriptedSession::new(&[(
            LANDING,
            r#"<a data-pagination-button-next-link="true" href="?page=2">Next</a>"#,
        )]);
        session.load(LANDING).await.unwrap();
        session.fail_clicks = true;

        assert!(!paginator().advance_page(&mut session).await.unwrap());
        assert_eq!(session.current_url().as_deref(), Some(LANDING));
    }

    #[tokio::test]
    async fn test_advance_page_reports_lost_session() {
        let mut session = ScriptedSession::new(&[(LANDING, "<p></p>")]);
        session.load(LANDING).await.unwrap();
        session.lost = true;

        let result = paginator().advance_page(&mut session).await;
        assert!(matches!(result, Err(SessionError::Closed)));
    }
}
