//! Append-only activity record.
//!
//! One human-readable line per post outcome. The file is only ever appended
//! to; nothing in the crate reads it back.

use crate::models::PostOutcome;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    path: Option<PathBuf>,
}

impl ActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A log that drops everything.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one outcome.
    pub async fn append(&self, outcome: &PostOutcome) -> std::io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(format!("{}\n", outcome).as_bytes()).await?;
        file.flush().await
    }

    /// Append one outcome; a write failure is logged, never raised.
    pub async fn record(&self, outcome: &PostOutcome) {
        if let Err(e) = self.append(outcome).await {
            warn!(path = ?self.path, error = %e, "Failed to append to activity log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostStatus;
    use chrono::{TimeZone, Utc};

    fn outcome(index: usize, status: PostStatus) -> PostOutcome {
        PostOutcome {
            index,
            item_index: index,
            status,
            detail: String::new(),
            external_id: None,
            at: Utc.with_ymd_and_hms(2025, 5, 6, 9, 30, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_append_keeps_existing_lines() {
        let path = std::env::temp_dir().join(format!(
            "shorts_tweeter_activity_{}_{}.log",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let log = ActivityLog::new(&path);

        log.append(&outcome(1, PostStatus::Success)).await.unwrap();
        log.append(&outcome(2, PostStatus::Blocked)).await.unwrap();

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("#1 item=1 SENT"));
        assert!(lines[1].contains("#2 item=2 BLOCKED"));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_disabled_log_is_a_no_op() {
        let log = ActivityLog::disabled();
        assert!(log.path().is_none());
        log.append(&outcome(1, PostStatus::Failed)).await.unwrap();
    }
}
