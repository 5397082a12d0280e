//! # Shorts Tweeter
//!
//! Fetches startup news shorts from Inshorts and republishes them to X,
//! one post at a time, within the API's rate limits.
//!
//! ## Usage
//!
//! ```sh
//! shorts_tweeter fetch --only-head     # print formatted headlines
//! shorts_tweeter tweet                 # post headlines
//! ```
//!
//! ## Architecture
//!
//! The two stages run strictly one after the other, with one request in
//! flight at a time:
//! 1. **Fetching**: walk the Inshorts cursor protocol until enough items are
//!    collected ([`feed`], [`scrapers`])
//! 2. **Publishing**: post each item, pacing successes and backing off on
//!    rate limits ([`publisher`], [`api`]); every outcome is appended to the
//!    activity log ([`activity`])

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod activity;
mod api;
mod cli;
mod credentials;
mod feed;
mod formatting;
mod models;
mod oauth;
mod publisher;
mod scrapers;
mod settings;
mod utils;

use activity::ActivityLog;
use api::XClient;
use cli::{Cli, Command};
use credentials::Credentials;
use feed::Fetcher;
use formatting::format_content;
use models::{ContentKind, PostStatus};
use publisher::Publisher;
use scrapers::inshorts::InshortsSource;
use settings::Settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let settings = Settings::load(args.config.as_deref()).await?.with_cli(&args);
    debug!(?settings, "Effective settings");

    let result = match args.command {
        Command::Fetch { only_head } => {
            let kind = if only_head {
                ContentKind::Headline
            } else {
                ContentKind::Summary
            };
            run_fetch(&settings, kind).await
        }
        Command::Tweet { summary } => {
            let kind = if summary {
                ContentKind::Summary
            } else {
                ContentKind::Headline
            };
            run_tweet(&settings, kind).await
        }
    };

    let elapsed = start_time.elapsed();
    match &result {
        Ok(()) => info!(?elapsed, "Execution complete"),
        Err(e) => error!(?elapsed, error = %e, "Run failed"),
    }
    result
}

fn fetcher(
    settings: &Settings,
    kind: ContentKind,
) -> Result<Fetcher<InshortsSource>, Box<dyn Error>> {
    let source = InshortsSource::new(
        &settings.landing_url,
        &settings.more_url,
        &settings.category,
    )?;
    Ok(Fetcher::new(source, kind))
}

/// Fetch and print items formatted for posting.
async fn run_fetch(settings: &Settings, kind: ContentKind) -> Result<(), Box<dyn Error>> {
    let label = kind.label();
    println!("Fetching latest {} {}...", settings.category, label);

    let items = fetcher(settings, kind)?
        .fetch(settings.max_news, settings.max_attempts)
        .await;

    println!("\nFinal Results ({} {}):", items.len(), label);
    for (idx, item) in items.iter().enumerate() {
        let raw = item.text(kind);
        let text = if settings.hashtags {
            format_content(raw, kind.budget())
        } else {
            raw.to_string()
        };
        println!("\n{} {}:", utils::singular_title(label), idx + 1);
        println!("{}", text);
        println!("Length: {} chars", text.chars().count());
        println!("{}", "-".repeat(50));
    }

    if items.len() < settings.max_news {
        println!("\nNote: Only {} {} were available", items.len(), label);
    }
    Ok(())
}

/// Validate credentials, fetch, and publish.
async fn run_tweet(settings: &Settings, kind: ContentKind) -> Result<(), Box<dyn Error>> {
    // Credentials are checked before any network activity.
    let credentials = Credentials::from_env()?;
    let api = XClient::new(&settings.post_endpoint, credentials)?;

    let items = fetcher(settings, kind)?
        .fetch(settings.max_news, settings.max_attempts)
        .await;
    if items.is_empty() {
        error!("No {} fetched. Exiting.", kind.label());
        return Ok(());
    }
    if items.len() < settings.max_news {
        warn!(
            fetched = items.len(),
            requested = settings.max_news,
            "Fewer items available than requested"
        );
    }

    let log = settings
        .activity_log
        .as_ref()
        .map(ActivityLog::new)
        .unwrap_or_else(ActivityLog::disabled);
    info!(
        count = items.len(),
        activity_log = ?log.path(),
        "Starting to post"
    );

    let publisher = Publisher::new(api, log, settings.publish_config(kind));
    let outcomes = publisher.publish(&items, settings.inter_delay()).await;

    let count = |status| outcomes.iter().filter(|o| o.status == status).count();
    info!(
        attempted = outcomes.len(),
        sent = count(PostStatus::Success),
        blocked = count(PostStatus::Blocked),
        rate_limited = count(PostStatus::RateLimited),
        failed = count(PostStatus::Failed),
        "Posting summary"
    );
    Ok(())
}
