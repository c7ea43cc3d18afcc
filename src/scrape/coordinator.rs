//! Scrape coordinator - drives one run through its state machine
//!
//! A run walks the listing pages of a single category in order:
//! - Opens the sink and determines how many pages there are
//! - Extracts every card on the current page and resolves its contacts
//! - Appends one record per card, flushing as it goes
//! - Advances until the last page, or until pagination runs out
//!
//! Session loss and sink failures end the run in `Failed`, after a
//! best-effort close of everything it holds. Cancellation is checked before
//! each card and always finalizes the sink.

use crate::config::{validate_category, Config};
use crate::scrape::contacts::{ContactInfo, ContactResolver, ContactSelectors};
use crate::scrape::extract::{parse_cards, CardSelectors};
use crate::scrape::fetcher::build_http_client;
use crate::scrape::pagination::Paginator;
use crate::scrape::record::BusinessRecord;
use crate::session::{Session, SessionError};
use crate::state::{CancelHandle, PageCursor, Progress, RunState};
use crate::storage::{CsvSink, RecordSink, SinkError};
use crate::{ConfigError, ScoutError};
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use url::Url;

/// How a run that did not fail came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every declared page was scraped
    Completed,
    /// Pagination ran out before the declared last page
    Exhausted,
    /// Stopped at a card boundary on request
    Cancelled,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Exhausted => "exhausted",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Totals reported at the end of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub total_pages: u32,
    pub pages_scraped: u32,
    pub rows_written: u64,
}

/// Main scrape coordinator structure
///
/// Owns the session and the sink exclusively for the duration of the run.
pub struct Coordinator<S: Session> {
    config: Arc<Config>,
    session: Option<S>,
    sink: Option<Box<dyn RecordSink + Send>>,
    resolver: ContactResolver,
    paginator: Paginator,
    card_selectors: CardSelectors,
    base_url: Url,
    state: RunState,
    cursor: PageCursor,
    rows_written: u64,
    pages_scraped: u32,
    cancel: CancelHandle,
    progress: watch::Sender<Progress>,
}

impl<S: Session> Coordinator<S> {
    /// Creates a coordinator with its own HTTP client for detail pages
    pub fn new(config: Config, session: S) -> Result<Self, ScoutError> {
        let client = build_http_client(&config.user_agent)?;
        Self::with_client(config, client, session)
    }

    /// Creates a coordinator that fetches detail pages through `client`
    pub fn with_client(config: Config, client: Client, session: S) -> Result<Self, ScoutError> {
        let base_url = Url::parse(&config.scraper.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

        let card_selectors = CardSelectors::compile(&config.selectors)?;
        let contact_selectors = ContactSelectors::compile(&config.selectors)?;
        let resolver = ContactResolver::new(
            client,
            contact_selectors,
            config.scraper.detail_delay(),
        );
        let paginator = Paginator::new(&config.selectors, config.scraper.wait_timeout());
        let (progress, _) = watch::channel(Progress::new());

        Ok(Self {
            config: Arc::new(config),
            session: Some(session),
            sink: None,
            resolver,
            paginator,
            card_selectors,
            base_url,
            state: RunState::Initializing,
            cursor: PageCursor::new(0),
            rows_written: 0,
            pages_scraped: 0,
            cancel: CancelHandle::new(),
            progress,
        })
    }

    /// Writes records to `sink` instead of the configured CSV file
    pub fn with_sink(mut self, sink: Box<dyn RecordSink + Send>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Handle that stops the run before the next card
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Receiver for progress updates; keeps the last value after the run ends
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Runs the scrape to completion
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The run completed, exhausted pagination, or was cancelled
    /// * `Err(ScoutError)` - The run failed; rows appended so far stay on disk
    pub async fn run(mut self) -> Result<RunSummary, ScoutError> {
        let outcome = match self.drive().await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.abort(&e).await;
                return Err(e);
            }
        };

        if let Err(e) = self.finalize().await {
            self.abort(&e).await;
            return Err(e);
        }

        let summary = RunSummary {
            outcome,
            total_pages: self.cursor.total_pages,
            pages_scraped: self.pages_scraped,
            rows_written: self.rows_written,
        };

        tracing::info!(
            "Run {}: {} row(s) from {} of {} page(s)",
            outcome.as_str(),
            summary.rows_written,
            summary.pages_scraped,
            summary.total_pages
        );

        Ok(summary)
    }

    async fn drive(&mut self) -> Result<RunOutcome, ScoutError> {
        let category = self.config.scraper.category.trim().to_string();
        validate_category(&category)?;

        if self.sink.is_none() {
            let sink = open_sink(&self.config.output.csv_path)?;
            self.sink = Some(Box::new(sink));
        }

        let landing_url = self
            .config
            .scraper
            .landing_url()
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid landing page: {}", e)))?;
        tracing::info!("Scraping category '{}' from {}", category, landing_url);

        let declared = {
            let session = self.session.as_mut().ok_or(SessionError::Closed)?;
            self.paginator
                .determine_page_count(session, &landing_url)
                .await?
        };

        let total_pages = match self.config.scraper.max_pages {
            Some(max) if max < declared => {
                tracing::info!("Limiting run to {} of {} page(s)", max, declared);
                max
            }
            _ => declared,
        };

        self.cursor = PageCursor::new(total_pages);
        self.transition(RunState::Paging)?;

        if total_pages == 0 {
            return Err(ConfigError::ZeroPages(category).into());
        }

        self.transition(RunState::Extracting(0))?;

        loop {
            if !self.extract_page().await? {
                return Ok(RunOutcome::Cancelled);
            }
            self.pages_scraped += 1;

            if self.cursor.is_last() {
                return Ok(RunOutcome::Completed);
            }

            let advanced = {
                let session = self.session.as_mut().ok_or(SessionError::Closed)?;
                self.paginator.advance_page(session).await?
            };

            if !advanced {
                tracing::warn!(
                    "Pagination ended after page {} of {}",
                    self.cursor.current_index + 1,
                    self.cursor.total_pages
                );
                return Ok(RunOutcome::Exhausted);
            }

            tokio::time::sleep(self.config.scraper.page_delay()).await;
            self.cursor.advance();
            self.transition(RunState::Extracting(self.cursor.current_index))?;
        }
    }

    /// Extracts and persists every card on the current page
    ///
    /// Returns false if the run was cancelled part way through.
    async fn extract_page(&mut self) -> Result<bool, ScoutError> {
        let page = self.cursor.current_index;
        let page_size = self.config.scraper.page_size;

        let html = self
            .session
            .as_ref()
            .ok_or(SessionError::Closed)?
            .page_source()?;
        let cards = parse_cards(&html, &self.card_selectors, &self.base_url);

        tracing::info!(
            "Page {}/{}: {} card(s)",
            page + 1,
            self.cursor.total_pages,
            cards.len()
        );
        if cards.len() > page_size as usize {
            tracing::warn!(
                "Page {} has {} cards but page-size is {}; IDs will overlap the next page",
                page + 1,
                cards.len(),
                page_size
            );
        }

        for (local_index, card) in cards.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!(
                    "Cancelled before card {} of page {}",
                    local_index + 1,
                    page + 1
                );
                return Ok(false);
            }

            let contacts = match card.detail_url() {
                Some(url) => self.resolver.resolve(url).await,
                None => {
                    tracing::debug!("Card '{}' has no detail link", card.name());
                    ContactInfo::unknown()
                }
            };

            let record = BusinessRecord::from_parts(
                self.cursor.sequence_id(page_size, local_index),
                card,
                contacts,
            );

            let sink = self
                .sink
                .as_mut()
                .ok_or_else(|| SinkError::Closed(self.config.output.csv_path.clone()))?;
            sink.append(&record)?;

            self.rows_written += 1;
            tracing::debug!("Wrote #{} {}", record.sequence_id, record.name);
            self.publish();
        }

        Ok(true)
    }

    async fn finalize(&mut self) -> Result<(), ScoutError> {
        self.transition(RunState::Finalizing)?;

        if let Some(mut sink) = self.sink.take() {
            sink.close()?;
        }
        if let Some(mut session) = self.session.take() {
            session.close().await?;
        }

        self.transition(RunState::Closed)
    }

    /// Moves to `Failed`, releasing whatever is still held
    async fn abort(&mut self, error: &ScoutError) {
        tracing::error!("Run failed while {}: {}", self.state, error);

        if let Some(mut sink) = self.sink.take() {
            if let Err(e) = sink.close() {
                tracing::warn!("Failed to close sink: {}", e);
            }
        }
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.close().await {
                tracing::warn!("Failed to close session: {}", e);
            }
        }

        if !self.state.is_terminal() {
            self.state = RunState::Failed;
        }
        self.publish();
    }

    fn transition(&mut self, next: RunState) -> Result<(), ScoutError> {
        if !self.state.can_transition_to(next) {
            return Err(ScoutError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::debug!("State: {} -> {}", self.state, next);
        self.state = next;
        self.publish();
        Ok(())
    }

    fn publish(&self) {
        self.progress.send_replace(Progress {
            state: self.state,
            total_pages: self.cursor.total_pages,
            rows_written: self.rows_written,
        });
    }
}

/// Opens the CSV sink, reporting failure as a configuration problem
fn open_sink(csv_path: &str) -> Result<CsvSink, ConfigError> {
    CsvSink::open(Path::new(csv_path)).map_err(|e| ConfigError::OutputPath {
        path: csv_path.to_string(),
        message: e.to_string(),
    })
}
