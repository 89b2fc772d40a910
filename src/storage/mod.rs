//! Snapshot persistence for completed crawls.
//!
//! One JSON document per facility per day:
//!
//! ```text
//! {root}/
//! ├── blount-county-jail-2026-10-18.json
//! └── sevier-county-jail-2026-10-18.json
//! ```
//!
//! A snapshot for today's date is the cache: if it exists, the facility is
//! not crawled again unless forced.

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{InmateRecord, JailConfig, SessionState};
use crate::pipeline::{CrawlOutcome, SkippedInmate};

pub use local::LocalStorage;
#[cfg(feature = "s3")]
pub use s3::S3Storage;

/// Persisted result of one facility crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JailSnapshot {
    pub facility: String,
    pub title: String,
    pub date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub state: SessionState,
    /// Records that received detail.
    pub enriched: usize,
    #[serde(default)]
    pub skipped: Vec<SkippedInmate>,
    pub inmates: Vec<InmateRecord>,
}

impl JailSnapshot {
    /// Capture a finished crawl, dated by its start time.
    pub fn from_outcome(jail: &JailConfig, outcome: CrawlOutcome) -> Self {
        Self {
            facility: jail.slug.clone(),
            title: jail.display_name().to_string(),
            date: outcome.started_at.date_naive(),
            started_at: outcome.started_at,
            finished_at: outcome.finished_at,
            state: outcome.session.state(),
            enriched: outcome.session.enriched_count(),
            skipped: outcome.skipped,
            inmates: outcome.session.inmates,
        }
    }

    /// Storage key for this snapshot.
    pub fn name(&self) -> String {
        snapshot_name(&self.facility, self.date)
    }
}

/// `{slug}-{YYYY-MM-DD}.json`
pub fn snapshot_name(facility: &str, date: NaiveDate) -> String {
    format!("{facility}-{}.json", date.format("%Y-%m-%d"))
}

/// Backend for daily snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the snapshot for `facility` on `date`, if one was saved.
    async fn load_snapshot(&self, facility: &str, date: NaiveDate)
    -> Result<Option<JailSnapshot>>;

    /// Persist `snapshot`, replacing any earlier one for the same day.
    /// Returns where it was written.
    async fn save_snapshot(&self, snapshot: &JailSnapshot) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_name() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(
            snapshot_name("blount-county-jail", date),
            "blount-county-jail-2026-03-07.json"
        );
    }
}
