//! Candidate file discovery
//!
//! Recursively scans the source directory for media files matching the
//! configured glob filters and creation-date bounds, capturing size and
//! creation time once per file. Results are sorted by path so a batch is
//! processed in the same order on every run.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::record::FileRecord;
use chrono::{DateTime, Local, NaiveDateTime};
use glob::{MatchOptions, Pattern};
use std::fs::Metadata;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Discover all candidate files under the configured source directory
pub fn collect_files(config: &Config) -> Result<Vec<FileRecord>> {
    if !config.source_dir.is_dir() {
        return Err(Error::SourceMissing(config.source_dir.clone()));
    }

    let patterns = compile_patterns(&config.patterns)?;

    let mut records = Vec::new();
    for entry in WalkDir::new(&config.source_dir).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() || !matches_filters(path, &patterns) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read metadata, skipping");
                continue;
            }
        };

        let created = creation_time(&metadata);
        if !within_bounds(&created, config) {
            debug!(path = %path.display(), %created, "Outside creation-date bounds, skipping");
            continue;
        }

        records.push(FileRecord::new(path.to_path_buf(), metadata.len(), created));
    }

    records.sort_by(|a, b| a.source_path.cmp(&b.source_path));

    info!(count = records.len(), source = %config.source_dir.display(), "Found candidate files");
    Ok(records)
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| Error::GlobPattern {
                pattern: p.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Match the base filename against the configured globs, or the built-in
/// extension set when no globs are configured. Matching is
/// case-insensitive; memory cards love uppercase names.
fn matches_filters(path: &Path, patterns: &[Pattern]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    if patterns.is_empty() {
        return path
            .extension()
            .and_then(|e| e.to_str())
            .map(Config::is_default_extension)
            .unwrap_or(false);
    }

    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::default()
    };
    patterns.iter().any(|p| p.matches_with(name, options))
}

/// Filesystem creation time as local wall-clock time.
///
/// Falls back to the modification time on filesystems that do not report
/// a birth time.
pub fn creation_time(metadata: &Metadata) -> NaiveDateTime {
    let system_time = metadata
        .created()
        .or_else(|_| metadata.modified())
        .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
    DateTime::<Local>::from(system_time).naive_local()
}

fn within_bounds(created: &NaiveDateTime, config: &Config) -> bool {
    let date = created.date();
    if let Some(min) = config.min_date
        && date < min
    {
        return false;
    }
    if let Some(max) = config.max_date
        && date > max
    {
        return false;
    }
    true
}
