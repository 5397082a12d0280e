//! Runtime settings.
//!
//! Values come from three layers, lowest priority first: built-in defaults,
//! an optional `config.yaml`, then command-line flags / environment
//! variables (see [`crate::cli`]).
//!
//! ```yaml
//! category: startup
//! max_news: 20
//! max_attempts: 3
//! inter_delay_secs: 2
//! cool_down_buffer_secs: 5
//! max_rate_limit_retries: 3
//! activity_log: activity.log
//! ```

use crate::api::DEFAULT_POST_ENDPOINT;
use crate::cli::Cli;
use crate::publisher::PublishConfig;
use crate::models::ContentKind;
use crate::scrapers::inshorts::{DEFAULT_CATEGORY, DEFAULT_LANDING_URL, DEFAULT_MORE_URL};
use serde::Deserialize;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub landing_url: String,
    pub more_url: String,
    pub category: String,
    pub post_endpoint: String,
    pub max_news: usize,
    pub max_attempts: u32,
    pub inter_delay_secs: u64,
    pub cool_down_buffer_secs: u64,
    pub max_rate_limit_retries: u32,
    pub hashtags: bool,
    /// `None` (`activity_log: null` in YAML) disables the record.
    pub activity_log: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            landing_url: DEFAULT_LANDING_URL.to_string(),
            more_url: DEFAULT_MORE_URL.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            post_endpoint: DEFAULT_POST_ENDPOINT.to_string(),
            max_news: 20,
            max_attempts: 3,
            inter_delay_secs: 2,
            cool_down_buffer_secs: 5,
            max_rate_limit_retries: 3,
            hashtags: true,
            activity_log: Some(PathBuf::from("activity.log")),
        }
    }
}

impl Settings {
    /// Parse settings from YAML. Missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, Box<dyn Error>> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Defaults, overlaid with the YAML file at `path` when one is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        match path {
            None => Ok(Self::default()),
            Some(path) => {
                let yaml = tokio::fs::read_to_string(path).await?;
                let settings = Self::from_yaml(&yaml)?;
                info!(path, "Loaded settings file");
                Ok(settings)
            }
        }
    }

    /// Apply command-line / environment overrides.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(n) = cli.max_news {
            self.max_news = n;
        }
        if let Some(n) = cli.max_attempts {
            self.max_attempts = n;
        }
        if let Some(category) = &cli.category {
            self.category = category.clone();
        }
        if let Some(secs) = cli.inter_delay_secs {
            self.inter_delay_secs = secs;
        }
        if let Some(path) = &cli.activity_log {
            self.activity_log = Some(path.clone());
        }
        if cli.no_hashtags {
            self.hashtags = false;
        }
        self
    }

    pub fn inter_delay(&self) -> Duration {
        Duration::from_secs(self.inter_delay_secs)
    }

    pub fn publish_config(&self, kind: ContentKind) -> PublishConfig {
        PublishConfig {
            kind,
            hashtags: self.hashtags,
            cool_down_buffer: Duration::from_secs(self.cool_down_buffer_secs),
            max_rate_limit_retries: self.max_rate_limit_retries,
        }
    }
}
