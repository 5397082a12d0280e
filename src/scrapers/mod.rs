//! Content sources for the feed fetcher.
//!
//! A source only knows how to hand back raw page HTML; turning that HTML into
//! [`Item`](crate::models::Item)s and finding the next cursor is done by the
//! pure extraction helpers in each source module, so the pagination loop in
//! [`crate::feed`] can be tested without any network.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Inshorts | [`inshorts`] | HTML scraping + AJAX paging | Cursor is `min_news_id` from an inline script |

use thiserror::Error;

pub mod inshorts;

/// Errors raised while requesting a page.
///
/// The fetcher treats every variant the same way (stop paging, keep what was
/// collected) but they are kept apart for the logs.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, body read).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Non-2xx response.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// The paging endpoint answered with something other than a `{ "html": .. }` envelope.
    #[error("malformed page envelope: {0}")]
    Envelope(String),
}

/// A paginated source of HTML pages.
///
/// Implementations issue exactly one request per call and never retry.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// Fetch the landing page (no cursor).
    async fn first_page(&self) -> Result<String, FetchError>;

    /// Fetch the page that starts at `cursor`.
    async fn next_page(&self, cursor: &str) -> Result<String, FetchError>;
}
