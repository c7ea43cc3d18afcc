//! Navigable session over the remote site
//!
//! The scraper only needs four things from a page-rendering engine: load a
//! URL, wait (bounded) for an element, click an element, and hand back the
//! current markup. `Session` captures exactly that, so the pipeline does not
//! care whether a headless browser or a plain HTTP client sits underneath.

mod http;
#[cfg(test)]
pub(crate) mod scripted;

pub use http::HttpSession;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("No page has been loaded")]
    NoPage,

    #[error("Session is closed")]
    Closed,

    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),
}

impl SessionError {
    /// Returns true if the session can no longer be used
    ///
    /// A failed navigation leaves the previous page in place and the session
    /// usable; everything else means the handle is gone.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Navigation { .. })
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// An element located on the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Visible text, whitespace-collapsed
    pub text: String,

    /// Link target, if the element carries one
    pub href: Option<String>,
}

/// A single navigable browsing context
#[async_trait]
pub trait Session: Send {
    /// Navigates to `url`, replacing the current page
    async fn load(&mut self, url: &str) -> SessionResult<()>;

    /// Waits up to `timeout` for an element matching `selector`
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Element))` - The element appeared
    /// * `Ok(None)` - The element did not appear within the wait
    /// * `Err(SessionError)` - The session itself failed
    async fn wait_for(&mut self, selector: &str, timeout: Duration)
        -> SessionResult<Option<Element>>;

    /// Waits up to `timeout` for a clickable element and clicks it
    ///
    /// Returns `Ok(false)` if nothing clickable matched within the wait.
    async fn click(&mut self, selector: &str, timeout: Duration) -> SessionResult<bool>;

    /// Markup of the current page
    fn page_source(&self) -> SessionResult<String>;

    /// URL of the current page
    fn current_url(&self) -> Option<String>;

    /// Releases the session; further calls fail with `SessionError::Closed`
    async fn close(&mut self) -> SessionResult<()>;
}
