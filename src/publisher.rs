//! Rate-limited publishing of fetched items.
//!
//! [`Publisher::publish`] posts items strictly one at a time:
//!
//! - success: record the external id, then wait the inter-delay (not after the last item)
//! - forbidden: record and move on, no delay and no retry
//! - rate limited: record, sleep the cool-down, retry the same item (bounded)
//! - anything else: record and abort the run
//!
//! Time is read through a [`Clock`] and waits go through a [`Sleeper`], so
//! the loop can be exercised without real sleeping.

use crate::activity::ActivityLog;
use crate::api::{PostError, PostingApi};
use crate::formatting::format_content;
use crate::models::{ContentKind, Item, PostOutcome, PostStatus};
use crate::utils::{clip_with_ellipsis, truncate_for_log};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Hard cap on outbound text, in characters.
pub const MAX_POST_CHARS: usize = 280;

/// Assumed wait when a rate-limit signal carries no reset time (the API's window).
pub const DEFAULT_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Cooperative wait.
#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How long to back off after a rate-limit signal.
///
/// # Arguments
///
/// * `now` - Current time, as read from the [`Clock`]
/// * `reset_at` - When the API says the limit resets, if it said
/// * `buffer` - Safety margin added on top
///
/// # Returns
///
/// `reset_at - now`, floored at zero, plus `buffer`. Without a reset time the
/// whole [`DEFAULT_LIMIT_WINDOW`] is assumed.
///
/// # Examples
///
/// ```ignore
/// let now = Utc::now();
/// let wait = cool_down(now, Some(now + TimeDelta::seconds(5)), Duration::from_secs(5));
/// assert_eq!(wait, Duration::from_secs(10));
/// ```
pub fn cool_down(
    now: DateTime<Utc>,
    reset_at: Option<DateTime<Utc>>,
    buffer: Duration,
) -> Duration {
    let remaining = match reset_at {
        Some(reset) => (reset - now).to_std().unwrap_or(Duration::ZERO),
        None => DEFAULT_LIMIT_WINDOW,
    };
    remaining + buffer
}

/// Publisher tuning.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Which half of each item is posted.
    pub kind: ContentKind,
    /// Apply [`format_content`] (budget + hashtags) before posting.
    pub hashtags: bool,
    /// Added on top of every computed cool-down.
    pub cool_down_buffer: Duration,
    /// Rate-limited retries allowed per item before it is given up.
    pub max_rate_limit_retries: u32,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            kind: ContentKind::Headline,
            hashtags: true,
            cool_down_buffer: Duration::from_secs(5),
            max_rate_limit_retries: 3,
        }
    }
}

/// Transient state of one publish run.
#[derive(Debug)]
struct PublishState<'a> {
    /// `(item_index, item)` still to post; `item_index` is 1-based.
    remaining: VecDeque<(usize, &'a Item)>,
    cool_down_until: Option<DateTime<Utc>>,
    outcomes: Vec<PostOutcome>,
}

/// What the loop does after an attempt.
enum Next {
    /// Posted; pace before the next item.
    Sent,
    /// Given up on this item; go straight to the next one.
    Skip,
    Retry(Duration),
    Abort,
}

pub struct Publisher<A, C = SystemClock, S = TokioSleeper> {
    api: A,
    clock: C,
    sleeper: S,
    log: ActivityLog,
    config: PublishConfig,
}

impl<A: PostingApi> Publisher<A> {
    pub fn new(api: A, log: ActivityLog, config: PublishConfig) -> Self {
        Self::with_capabilities(api, SystemClock, TokioSleeper, log, config)
    }
}

impl<A, C, S> Publisher<A, C, S>
where
    A: PostingApi,
    C: Clock,
    S: Sleeper,
{
    pub fn with_capabilities(
        api: A,
        clock: C,
        sleeper: S,
        log: ActivityLog,
        config: PublishConfig,
    ) -> Self {
        Self {
            api,
            clock,
            sleeper,
            log,
            config,
        }
    }

    /// The exact text that would be posted for `item`.
    ///
    /// Anything longer than `MAX_POST_CHARS - 3` keeps that many characters
    /// and gets `"..."`.
    pub fn render(&self, item: &Item) -> String {
        let raw = item.text(self.config.kind);
        let text = if self.config.hashtags {
            format_content(raw, self.config.kind.budget())
        } else {
            raw.to_string()
        };
        clip_with_ellipsis(&text, MAX_POST_CHARS - 3)
    }

    /// Post `items` in order, returning one outcome per attempt.
    ///
    /// Items after an unclassified failure are never attempted and have no
    /// outcome.
    ///
    /// # Arguments
    ///
    /// * `items` - Items to post, in order
    /// * `inter_delay` - Pause after each successful post, skipped after the last item
    ///
    /// # Returns
    ///
    /// Every attempt's [`PostOutcome`] in the order it happened. A rate-limited
    /// item contributes one outcome per try.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let publisher = Publisher::new(client, ActivityLog::disabled(), PublishConfig::default());
    /// let outcomes = publisher.publish(&items, Duration::from_secs(2)).await;
    /// ```
    #[instrument(level = "info", skip_all, fields(items = items.len(), ?inter_delay))]
    pub async fn publish(&self, items: &[Item], inter_delay: Duration) -> Vec<PostOutcome> {
        let total = items.len();
        let mut state = PublishState {
            remaining: items.iter().enumerate().map(|(i, item)| (i + 1, item)).collect(),
            cool_down_until: None,
            outcomes: Vec::with_capacity(total),
        };

        'items: while let Some((item_index, item)) = state.remaining.pop_front() {
            let text = self.render(item);
            let mut rate_limited = 0u32;

            loop {
                let result = self.api.create_post(&text).await;
                let next = self
                    .settle(&mut state, item_index, total, &text, result, &mut rate_limited)
                    .await;
                match next {
                    Next::Sent => {
                        if !state.remaining.is_empty() {
                            self.sleeper.sleep(inter_delay).await;
                        }
                        break;
                    }
                    Next::Skip => break,
                    Next::Retry(wait) => {
                        state.cool_down_until = TimeDelta::from_std(wait)
                            .ok()
                            .map(|d| self.clock.now() + d);
                        info!(
                            item = item_index,
                            wait_secs = wait.as_secs(),
                            until = ?state.cool_down_until,
                            "Cooling down before retrying"
                        );
                        self.sleeper.sleep(wait).await;
                        state.cool_down_until = None;
                    }
                    Next::Abort => break 'items,
                }
            }
        }

        let skipped = state.remaining.len();
        if skipped > 0 {
            warn!(skipped, "Run aborted; remaining items were not attempted");
        }
        info!(
            outcomes = state.outcomes.len(),
            sent = state
                .outcomes
                .iter()
                .filter(|o| o.status == PostStatus::Success)
                .count(),
            "Publish finished"
        );
        state.outcomes
    }

    /// Record the outcome of one attempt and decide what happens next.
    async fn settle(
        &self,
        state: &mut PublishState<'_>,
        item_index: usize,
        total: usize,
        text: &str,
        result: Result<String, PostError>,
        rate_limited: &mut u32,
    ) -> Next {
        match result {
            Ok(id) => {
                info!(
                    item = item_index,
                    total,
                    %id,
                    preview = %truncate_for_log(text, 50),
                    "Posted"
                );
                self.record(state, item_index, PostStatus::Success, String::new(), Some(id))
                    .await;
                Next::Sent
            }
            Err(PostError::Forbidden(detail)) => {
                warn!(item = item_index, total, %detail, "Skipping post (blocked by the API)");
                self.record(state, item_index, PostStatus::Blocked, detail, None)
                    .await;
                Next::Skip
            }
            Err(PostError::RateLimited { reset_at, detail }) => {
                *rate_limited += 1;
                warn!(
                    item = item_index,
                    attempt = *rate_limited,
                    reset_at = ?reset_at,
                    %detail,
                    "Rate limited"
                );
                self.record(state, item_index, PostStatus::RateLimited, detail, None)
                    .await;
                if *rate_limited > self.config.max_rate_limit_retries {
                    warn!(
                        item = item_index,
                        retries = self.config.max_rate_limit_retries,
                        "Giving up on item after repeated rate limiting"
                    );
                    return Next::Skip;
                }
                Next::Retry(cool_down(
                    self.clock.now(),
                    reset_at,
                    self.config.cool_down_buffer,
                ))
            }
            Err(PostError::Other(detail)) => {
                error!(item = item_index, total, %detail, "Failed to post; aborting run");
                self.record(state, item_index, PostStatus::Failed, detail, None)
                    .await;
                Next::Abort
            }
        }
    }

    async fn record(
        &self,
        state: &mut PublishState<'_>,
        item_index: usize,
        status: PostStatus,
        detail: String,
        external_id: Option<String>,
    ) {
        let outcome = PostOutcome {
            index: state.outcomes.len() + 1,
            item_index,
            status,
            detail,
            external_id,
            at: self.clock.now(),
        };
        self.log.record(&outcome).await;
        state.outcomes.push(outcome);
    }
}
