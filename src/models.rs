//! Data models shared by the fetcher and the publisher.
//!
//! - [`Item`]: one headline + summary pair scraped from a page
//! - [`ContentKind`]: which half of an item gets posted
//! - [`PostOutcome`]: the terminal classification of one posting attempt

use chrono::{DateTime, Utc};
use std::fmt;

/// A single news short as extracted from the content source.
///
/// Items carry no identity beyond their position in the fetched sequence;
/// two pages may well yield the same story twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// The card headline.
    pub headline: String,
    /// The card summary. Empty when the card had none.
    pub body: String,
}

impl Item {
    pub fn new(headline: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            body: body.into(),
        }
    }

    /// The text that gets posted for this item in the given mode.
    pub fn text(&self, kind: ContentKind) -> &str {
        match kind {
            ContentKind::Headline => &self.headline,
            ContentKind::Summary => &self.body,
        }
    }

    /// Whether the item can be posted in the given mode.
    ///
    /// The headline is always required; summary mode also needs a body.
    pub fn is_postable(&self, kind: ContentKind) -> bool {
        let filled = |s: &str| !s.trim().is_empty();
        filled(&self.headline) && (kind == ContentKind::Headline || filled(&self.body))
    }
}

/// Which half of an [`Item`] is the postable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Headline,
    Summary,
}

impl ContentKind {
    /// Formatting budget. Headlines leave 30 characters spare for thread-style presentation.
    pub fn budget(self) -> usize {
        match self {
            ContentKind::Headline => 270 - 30,
            ContentKind::Summary => 270,
        }
    }

    /// Plural label used in user-facing output ("headlines", "summaries").
    pub fn label(self) -> &'static str {
        match self {
            ContentKind::Headline => "headlines",
            ContentKind::Summary => "summaries",
        }
    }
}

/// Terminal state of one posting attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Success,
    Blocked,
    RateLimited,
    Failed,
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PostStatus::Success => "SENT",
            PostStatus::Blocked => "BLOCKED",
            PostStatus::RateLimited => "RATE_LIMITED",
            PostStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Record of one posting attempt.
///
/// `index` is the outcome's sequence number within the run and is never
/// shared. `item_index` points back at the item; a rate-limited attempt and
/// its eventual success carry the same `item_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostOutcome {
    pub index: usize,
    pub item_index: usize,
    pub status: PostStatus,
    pub detail: String,
    pub external_id: Option<String>,
    pub at: DateTime<Utc>,
}

impl fmt::Display for PostOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} #{} item={} {}",
            self.at.to_rfc3339(),
            self.index,
            self.item_index,
            self.status
        )?;
        if let Some(id) = &self.external_id {
            write!(f, " id={}", id)?;
        }
        if !self.detail.is_empty() {
            write!(f, " detail={}", self.detail.replace('\n', " "))?;
        }
        Ok(())
    }
}
