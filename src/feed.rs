//! Cursor-chained feed fetching.
//!
//! [`Fetcher::fetch`] walks a [`PageSource`] page by page until it has
//! collected the requested number of items or the attempt budget is spent.
//! When a page carries no usable cursor the next request starts over from the
//! first page. Page failures end the walk early; whatever was already
//! collected is returned.
//!
//! The loop state lives in an explicit [`FetchState`] value that each step
//! takes and hands back, so the paging rules can be tested on their own.

use crate::models::{ContentKind, Item};
use crate::scrapers::PageSource;
use crate::scrapers::inshorts::{extract_cursor, extract_items};
use std::collections::HashSet;
use std::ops::ControlFlow;
use tracing::{info, instrument, warn};

/// Transient state of one [`Fetcher::fetch`] call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchState {
    /// Items collected so far, in source order.
    pub accumulated: Vec<Item>,
    /// Cursor for the next request; `None` before the first page.
    pub cursor: Option<String>,
    /// Page requests that completed.
    pub attempts: u32,
    consumed: HashSet<String>,
}

impl FetchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether another page request is allowed.
    ///
    /// The target and the attempt budget are the only stops; an empty page or
    /// a dead cursor never ends the walk on its own.
    pub fn wants_more(&self, target: usize, max_attempts: u32) -> bool {
        self.accumulated.len() < target && self.attempts < max_attempts
    }

    /// Fold one page of HTML into the state.
    ///
    /// Appends the page's items, counts the attempt, and advances the cursor.
    /// A missing cursor, or one that was already requested, clears it so the
    /// next request goes to the first page. A consumed cursor is never sent
    /// again.
    pub fn absorb_page(mut self, html: &str, kind: ContentKind) -> (Self, usize) {
        let items = extract_items(html, kind);
        let found = items.len();
        self.accumulated.extend(items);
        self.attempts += 1;

        match extract_cursor(html) {
            Some(next) if !self.consumed.contains(&next) => self.cursor = Some(next),
            Some(next) => {
                warn!(
                    cursor = %next,
                    "Source repeated an already-used cursor; restarting from the first page"
                );
                self.cursor = None;
            }
            None => {
                info!("No min_news_id on page; next request goes to the first page");
                self.cursor = None;
            }
        }
        (self, found)
    }

    /// Finish the walk, dropping anything past `target`.
    pub fn into_items(mut self, target: usize) -> Vec<Item> {
        self.accumulated.truncate(target);
        self.accumulated
    }
}

/// Drives a [`PageSource`] through its cursor protocol.
#[derive(Debug)]
pub struct Fetcher<S> {
    source: S,
    kind: ContentKind,
}

impl<S: PageSource> Fetcher<S> {
    pub fn new(source: S, kind: ContentKind) -> Self {
        Self { source, kind }
    }

    /// Collect up to `target` items using at most `max_attempts` page requests.
    ///
    /// Never fails: a page error stops the walk and the items gathered so far
    /// are returned. Fewer than `target` items is a normal result.
    ///
    /// # Arguments
    ///
    /// * `target` - Maximum number of items to return
    /// * `max_attempts` - Maximum number of page requests, successful or not
    ///
    /// # Returns
    ///
    /// Items in source order, truncated to `target`. Duplicates across pages
    /// are kept.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let fetcher = Fetcher::new(source, ContentKind::Headline);
    /// let items = fetcher.fetch(20, 3).await;
    /// assert!(items.len() <= 20);
    /// ```
    #[instrument(level = "info", skip(self), fields(kind = ?self.kind))]
    pub async fn fetch(&self, target: usize, max_attempts: u32) -> Vec<Item> {
        let mut state = FetchState::new();
        while state.wants_more(target, max_attempts) {
            match self.step(state).await {
                ControlFlow::Continue(next) => state = next,
                ControlFlow::Break(last) => {
                    state = last;
                    break;
                }
            }
        }

        let attempts = state.attempts;
        let items = state.into_items(target);
        info!(count = items.len(), target, attempts, "Fetch finished");
        items
    }

    /// Request one page and fold it into `state`. `Break` means a page failed.
    async fn step(&self, mut state: FetchState) -> ControlFlow<FetchState, FetchState> {
        let page = match state.cursor.take() {
            None => self.source.first_page().await,
            Some(cursor) => {
                let page = self.source.next_page(&cursor).await;
                state.consumed.insert(cursor);
                page
            }
        };

        match page {
            Ok(html) => {
                let (state, found) = state.absorb_page(&html, self.kind);
                info!(
                    attempt = state.attempts,
                    found,
                    total = state.accumulated.len(),
                    cursor = state.cursor.as_deref().unwrap_or("-"),
                    "Fetched page"
                );
                ControlFlow::Continue(state)
            }
            Err(e) => {
                warn!(
                    attempt = state.attempts + 1,
                    error = %e,
                    kept = state.accumulated.len(),
                    "Page request failed; keeping what was collected"
                );
                ControlFlow::Break(state)
            }
        }
    }
}
