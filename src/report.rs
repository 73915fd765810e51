//! Per-run result report.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::Result;
use crate::space_key::SpaceKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Downloaded,
    Skipped,
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Downloaded => "downloaded",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of processing one discovered space.
#[derive(Debug, Clone, Serialize)]
pub struct SpaceRecord {
    pub url: String,
    pub key: Option<String>,
    pub status: Status,
    /// Written file for downloads, reason for skips and failures.
    pub detail: String,
    pub finished_at: DateTime<Local>,
}

impl SpaceRecord {
    pub fn new(url: &str, key: Option<&SpaceKey>, status: Status, detail: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            key: key.map(|k| k.to_string()),
            status,
            detail: detail.into(),
            finished_at: Local::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub records: Vec<SpaceRecord>,
}

impl RunReport {
    pub fn push(&mut self, record: SpaceRecord) {
        self.records.push(record);
    }

    pub fn count(&self, status: Status) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(Status::Failed) > 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} spaces: {} downloaded, {} skipped, {} failed",
            self.records.len(),
            self.count(Status::Downloaded),
            self.count(Status::Skipped),
            self.count(Status::Failed)
        )
    }

    /// Writes one CSV row per space, header included.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(path)?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
