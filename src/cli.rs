//! Command-line interface definitions.
//!
//! Every tunable can also be supplied through an environment variable; those
//! values override the optional `config.yaml` (see [`crate::settings`]).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Print the latest startup summaries
/// shorts_tweeter fetch
///
/// # Print headlines only
/// shorts_tweeter fetch --only-head
///
/// # Post headlines, 5 seconds apart
/// shorts_tweeter --inter-delay-secs 5 tweet
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short, long, env = "SHORTS_CONFIG")]
    pub config: Option<String>,

    /// Number of items to fetch
    #[arg(long, env = "SHORTS_MAX_NEWS")]
    pub max_news: Option<usize>,

    /// Maximum page requests per fetch
    #[arg(long, env = "SHORTS_MAX_ATTEMPTS")]
    pub max_attempts: Option<u32>,

    /// Inshorts category to read
    #[arg(long, env = "SHORTS_CATEGORY")]
    pub category: Option<String>,

    /// Seconds to wait between successful posts
    #[arg(long, env = "SHORTS_INTER_DELAY_SECS")]
    pub inter_delay_secs: Option<u64>,

    /// Append-only activity log written by `tweet`
    #[arg(long, env = "SHORTS_ACTIVITY_LOG")]
    pub activity_log: Option<PathBuf>,

    /// Do not append hashtags to formatted text
    #[arg(long)]
    pub no_hashtags: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Fetch items and print them formatted for posting
    Fetch {
        /// Fetch headlines instead of summaries
        #[arg(long)]
        only_head: bool,
    },
    /// Fetch items and post them one by one
    Tweet {
        /// Post summaries instead of headlines
        #[arg(long)]
        summary: bool,
    },
}
