//! In-memory session for unit tests: pages keyed by URL, links followed by href

use crate::scrape::collapse_text;
use crate::session::{Element, Session, SessionError, SessionResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

pub(crate) struct ScriptedSession {
    pages: HashMap<String, String>,
    current: Option<String>,
    pub(crate) fail_clicks: bool,
    pub(crate) lost: bool,
    pub(crate) closed: bool,
}

impl ScriptedSession {
    pub(crate) fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, html)| (url.to_string(), html.to_string()))
                .collect(),
            current: None,
            fail_clicks: false,
            lost: false,
            closed: false,
        }
    }

    fn find(&self, selector: &str) -> Option<Element> {
        let html = self.pages.get(self.current.as_ref()?)?;
        let selector = scraper::Selector::parse(selector).ok()?;
        let document = scraper::Html::parse_document(html);
        let found = document.select(&selector).next().map(|e| Element {
            text: collapse_text(e.text()),
            href: e.value().attr("href").map(str::to_string),
        });
        found
    }
}

#[async_trait]
impl Session for ScriptedSession {
    async fn load(&mut self, url: &str) -> SessionResult<()> {
        if self.lost || self.closed {
            return Err(SessionError::Closed);
        }
        if !self.pages.contains_key(url) {
            return Err(SessionError::Navigation {
                url: url.to_string(),
                message: "not scripted".to_string(),
            });
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn wait_for(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> SessionResult<Option<Element>> {
        if self.lost || self.closed {
            return Err(SessionError::Closed);
        }
        Ok(self.find(selector))
    }

    async fn click(&mut self, selector: &str, _timeout: Duration) -> SessionResult<bool> {
        if self.lost || self.closed {
            return Err(SessionError::Closed);
        }
        match self.find(selector) {
            None => Ok(false),
            Some(_) if self.fail_clicks => Err(SessionError::Navigation {
                url: selector.to_string(),
                message: "detached".to_string(),
            }),
            Some(Element { href: Some(href), .. }) => self.load(&href).await.map(|_| true),
            Some(_) => Ok(true),
        }
    }

    fn page_source(&self) -> SessionResult<String> {
        if self.lost || self.closed {
            return Err(SessionError::Closed);
        }
        let url = self.current.as_ref().ok_or(SessionError::NoPage)?;
        self.pages.get(url).cloned().ok_or(SessionError::NoPage)
    }

    fn current_url(&self) -> Option<String> {
        self.current.clone()
    }

    async fn close(&mut self) -> SessionResult<()> {
        self.closed = true;
        Ok(())
    }
}
