//! Per-file record threaded through the pipeline
//!
//! Each stage writes only its own fields: the scan fills the source facts,
//! the extractor the timestamp and canonical name, the resolver the
//! destination, and the executor the outcome. No stage touches a field
//! owned by an earlier stage.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::PathBuf;

/// Terminal outcome of processing one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "kebab-case")]
pub enum Outcome {
    /// Not yet executed
    Pending,
    /// The requested operation was performed (or would be, in a dry run)
    Done,
    /// Destination already holds the file; nothing was copied or moved
    AlreadyExists,
    /// Move with an existing destination: the source was deleted
    Deleted,
    /// The filesystem operation failed; the batch continued
    Failed(String),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// One candidate file, annotated as it flows through the pipeline
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    /// Absolute path to the source file
    pub source_path: PathBuf,

    /// Byte length, read once at discovery
    pub size: u64,

    /// Filesystem creation timestamp, read once at discovery
    pub created: NaiveDateTime,

    /// Derived timestamp (embedded date, or creation time, plus offset)
    pub effective_timestamp: Option<NaiveDateTime>,

    /// Timestamp-prefixed filename
    pub canonical_name: Option<String>,

    /// Resolved absolute target path
    pub destination: Option<PathBuf>,

    /// Terminal outcome, set by the executor
    pub outcome: Outcome,

    /// Human-readable description of the outcome
    pub message: String,

    /// 1-based index in the batch
    pub position: usize,

    /// Cumulative bytes up to and including this record
    pub total_bytes: u64,
}

impl FileRecord {
    /// Create a record for a freshly discovered file
    pub fn new(source_path: PathBuf, size: u64, created: NaiveDateTime) -> Self {
        Self {
            source_path,
            size,
            created,
            effective_timestamp: None,
            canonical_name: None,
            destination: None,
            outcome: Outcome::Pending,
            message: String::new(),
            position: 0,
            total_bytes: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_new_record_is_pending() {
        let created = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        let record = FileRecord::new(PathBuf::from("/card/IMG_0001.jpg"), 1024, created);
        assert_eq!(record.outcome, Outcome::Pending);
        assert!(record.effective_timestamp.is_none());
        assert!(record.destination.is_none());
    }

    #[test]
    fn test_outcome_is_failed() {
        assert!(Outcome::Failed("disk full".into()).is_failed());
        assert!(!Outcome::Done.is_failed());
        assert!(!Outcome::AlreadyExists.is_failed());
    }
}
