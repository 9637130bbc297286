//! Pipeline driver
//!
//! Runs each discovered file through the three stages in order: timestamp
//! extraction, destination resolution, action execution. Processing is
//! strictly sequential; one record reaches a terminal outcome before the
//! next begins. Running totals live in an explicit accumulator passed
//! along the batch, not in ambient state, so the stages stay reentrant.

use crate::config::{Command, Config};
use crate::error::{Error, Result};
use crate::record::{FileRecord, Outcome};
use crate::{execute, resolve, scan, time};
use std::fs::File;
use std::io::BufWriter;
use tracing::{Level, info, span};

/// Running batch totals, folded over the record stream
#[derive(Debug, Default)]
pub struct BatchTotals {
    position: usize,
    bytes: u64,
}

impl BatchTotals {
    /// Account for one record, returning its 1-based position and the
    /// cumulative byte count including it
    pub fn account(&mut self, size: u64) -> (usize, u64) {
        self.position += 1;
        self.bytes += size;
        (self.position, self.bytes)
    }
}

/// Outcome counts for one run
#[derive(Debug, Default, Clone)]
pub struct RunStats {
    pub done: usize,
    pub already_exists: usize,
    pub deleted: usize,
    pub failed: usize,
}

impl RunStats {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Done => self.done += 1,
            Outcome::AlreadyExists => self.already_exists += 1,
            Outcome::Deleted => self.deleted += 1,
            Outcome::Failed(_) => self.failed += 1,
            Outcome::Pending => {}
        }
    }

    pub fn total(&self) -> usize {
        self.done + self.already_exists + self.deleted + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn summary(&self) -> String {
        format!(
            "Total: {}, Done: {}, Already exists: {}, Deleted: {}, Failed: {}",
            self.total(),
            self.done,
            self.already_exists,
            self.deleted,
            self.failed
        )
    }
}

/// Main processor for one archiving run
pub struct Processor {
    config: Config,
    stats: RunStats,
}

impl Processor {
    /// Create a new processor, rejecting configurations that cannot work
    /// before any file is touched
    pub fn new(config: Config) -> Result<Self> {
        if config.target_root.exists() && !config.target_root.is_dir() {
            return Err(Error::TargetUnreadable(config.target_root.clone()));
        }
        if config.command != Command::OffsetRename && config.target_root.as_os_str().is_empty() {
            return Err(Error::Config("target root is not set".into()));
        }

        Ok(Self {
            config,
            stats: RunStats::default(),
        })
    }

    /// Run the full pipeline over the source directory
    pub fn run(&mut self) -> Result<Vec<FileRecord>> {
        let _span = span!(Level::INFO, "archive_run", command = ?self.config.command).entered();

        let mut records = scan::collect_files(&self.config)?;
        let mut totals = BatchTotals::default();

        for record in &mut records {
            self.process_record(record);

            let (position, total_bytes) = totals.account(record.size);
            record.position = position;
            record.total_bytes = total_bytes;
            self.stats.record(&record.outcome);

            info!(
                position,
                total_bytes,
                source = %record.source_path.display(),
                outcome = ?record.outcome,
                "{}",
                record.message
            );
        }

        info!("{}", self.stats.summary());

        if let Some(ref report_file) = self.config.report_file {
            write_report(report_file, &records)?;
        }

        Ok(records)
    }

    /// Run one record through extractor, resolver and executor
    fn process_record(&self, record: &mut FileRecord) {
        let Some(file_name) = record.source_path.file_name().and_then(|n| n.to_str()) else {
            let err = Error::InvalidFilename(record.source_path.clone());
            record.outcome = Outcome::Failed(err.to_string());
            record.message = format!("failed: {}", err);
            return;
        };

        let extracted = time::extract(
            file_name,
            record.created,
            self.config.hour_offset,
            self.config.file_suffix.as_deref(),
        );
        record.effective_timestamp = Some(extracted.timestamp);
        record.canonical_name = Some(extracted.canonical_name.clone());

        // OffsetRename corrects the name where the file sits; the archive
        // tree is only consulted for Copy and Move.
        let destination = match self.config.command {
            Command::OffsetRename => record
                .source_path
                .parent()
                .map(|parent| parent.join(&extracted.canonical_name))
                .unwrap_or_else(|| extracted.canonical_name.clone().into()),
            Command::Copy | Command::Move => {
                resolve::resolve_destination(&extracted.timestamp, &extracted.canonical_name, &self.config)
            }
        };
        record.destination = Some(destination);

        execute::execute(record, &self.config);
    }

    /// Outcome counts for the finished run
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }
}

/// Write the per-file outcome report as JSON
fn write_report(path: &std::path::Path, records: &[FileRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)?;
    info!(report = %path.display(), "Wrote outcome report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(source: &std::path::Path, target: &std::path::Path) -> Config {
        Config {
            source_dir: source.to_path_buf(),
            target_root: target.to_path_buf(),
            ..Config::default()
        }
    }

    #[test]
    fn test_batch_totals_fold() {
        let mut totals = BatchTotals::default();
        assert_eq!(totals.account(100), (1, 100));
        assert_eq!(totals.account(50), (2, 150));
        assert_eq!(totals.account(0), (3, 150));
    }

    #[test]
    fn test_run_stats_summary() {
        let mut stats = RunStats::default();
        stats.record(&Outcome::Done);
        stats.record(&Outcome::Done);
        stats.record(&Outcome::AlreadyExists);
        stats.record(&Outcome::Failed("disk full".into()));

        assert_eq!(stats.total(), 4);
        assert!(stats.has_failures());
        let summary = stats.summary();
        assert!(summary.contains("Done: 2"));
        assert!(summary.contains("Already exists: 1"));
        assert!(summary.contains("Failed: 1"));
    }

    #[test]
    fn test_copy_run_places_stamped_files() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        fs::write(source.path().join("20240305_143000_IMG_0002.jpg"), b"a").unwrap();

        let mut processor = Processor::new(config(source.path(), target.path())).unwrap();
        let records = processor.run().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, Outcome::Done);
        assert!(
            target
                .path()
                .join("2024/202403/20240305/20240305_143000_IMG_0002.jpg")
                .exists()
        );
        assert_eq!(records[0].position, 1);
        assert_eq!(records[0].total_bytes, 1);
    }

    #[test]
    fn test_positions_and_bytes_accumulate() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        fs::write(source.path().join("20240305_143000_a.jpg"), b"aa").unwrap();
        fs::write(source.path().join("20240306_143000_b.jpg"), b"bbb").unwrap();

        let mut processor = Processor::new(config(source.path(), target.path())).unwrap();
        let records = processor.run().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].position, 1);
        assert_eq!(records[1].position, 2);
        assert_eq!(records[1].total_bytes, 5);
    }

    #[test]
    fn test_offset_rename_stays_in_source_directory() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        fs::write(source.path().join("20240305_143000_IMG.jpg"), b"a").unwrap();

        let mut cfg = config(source.path(), target.path());
        cfg.command = Command::OffsetRename;
        cfg.hour_offset = 2;

        let mut processor = Processor::new(cfg).unwrap();
        let records = processor.run().unwrap();

        assert_eq!(records[0].outcome, Outcome::Done);
        assert!(source.path().join("20240305_163000_IMG.jpg").exists());
        assert!(!source.path().join("20240305_143000_IMG.jpg").exists());
        // Nothing lands in the archive
        assert_eq!(fs::read_dir(target.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_report_file_is_written() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        fs::write(source.path().join("20240305_143000_IMG.jpg"), b"a").unwrap();

        let report = target.path().join("report.json");
        let mut cfg = config(source.path(), target.path());
        cfg.report_file = Some(report.clone());

        Processor::new(cfg).unwrap().run().unwrap();

        let json = fs::read_to_string(&report).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert_eq!(parsed[0]["outcome"]["kind"], "done");
    }

    #[test]
    fn test_target_root_must_be_a_directory() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let file_target = target.path().join("not_a_dir");
        fs::write(&file_target, b"x").unwrap();

        let result = Processor::new(config(source.path(), &file_target));
        assert!(matches!(result, Err(Error::TargetUnreadable(_))));
    }
}
