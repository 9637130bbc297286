//! CLI argument parsing with clap

use crate::config::{Command, Config};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Media Archiver - files photos and videos into a date-structured archive
///
/// Scans a source directory (typically a mounted memory card), renames
/// each media file with a timestamp prefix derived from its name or
/// creation time, and copies or moves it into
/// <root>/<yyyy>/[subfolder/]<yyyyMM>/<yyyyMMdd>/, reusing an existing
/// day folder when one is present.
#[derive(Parser, Debug)]
#[command(name = "media-archiver")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Command to perform
    #[arg(value_enum)]
    pub command: Option<Command>,

    /// Source directory to scan for media files
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Root of the archive tree
    #[arg(short, long)]
    pub target: Option<PathBuf>,

    /// Extra path segment under the year folder
    #[arg(long)]
    pub subfolder: Option<String>,

    /// Suffix appended to the renamed file stem, before the extension
    #[arg(long)]
    pub suffix: Option<String>,

    /// Folder names excluded from the existing-day-folder probe
    #[arg(short = 'x', long = "exclude", num_args = 1..)]
    pub exclude: Option<Vec<String>>,

    /// Signed hour offset added to every derived timestamp
    #[arg(short = 'H', long, allow_negative_numbers = true)]
    pub hour_offset: Option<i64>,

    /// Only consider files created on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub min_date: Option<NaiveDate>,

    /// Only consider files created on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub max_date: Option<NaiveDate>,

    /// Filename glob filters (e.g. "*.jpg"); default is the built-in
    /// media extension set
    #[arg(short, long, num_args = 1..)]
    pub pattern: Option<Vec<String>>,

    /// Write a JSON per-file outcome report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Dry run mode - show what would be done without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Overwrite existing destination files
    #[arg(short, long)]
    pub force: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,

    /// Print a sample configuration file and exit
    #[arg(long)]
    pub sample_config: bool,
}

impl Cli {
    /// Get config file name (without extension) for log naming
    pub fn config_name(&self) -> Option<String> {
        self.config.as_ref().and_then(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(command) = self.command {
            config.command = command;
        }
        if let Some(ref source) = self.source {
            config.source_dir = source.clone();
        }
        if let Some(ref target) = self.target {
            config.target_root = target.clone();
        }
        if let Some(ref subfolder) = self.subfolder {
            config.subfolder = Some(subfolder.clone());
        }
        if let Some(ref suffix) = self.suffix {
            config.file_suffix = Some(suffix.clone());
        }
        if let Some(ref exclude) = self.exclude {
            config.exclude_dirs = exclude.clone();
        }
        if let Some(hour_offset) = self.hour_offset {
            config.hour_offset = hour_offset;
        }
        if let Some(min_date) = self.min_date {
            config.min_date = Some(min_date);
        }
        if let Some(max_date) = self.max_date {
            config.max_date = Some(max_date);
        }
        if let Some(ref pattern) = self.pattern {
            config.patterns = pattern.clone();
        }
        if let Some(ref report) = self.report {
            config.report_file = Some(report.clone());
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if self.force {
            config.force = true;
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config_file_values() {
        let cli = Cli::parse_from([
            "media-archiver",
            "move",
            "--source",
            "/card",
            "--hour-offset",
            "-3",
            "--dry-run",
        ]);

        let mut base = Config::default();
        base.command = Command::Copy;
        base.target_root = PathBuf::from("/archive");
        base.hour_offset = 5;

        let merged = cli.merge_with_config(base);
        assert_eq!(merged.command, Command::Move);
        assert_eq!(merged.source_dir, PathBuf::from("/card"));
        // Untouched file setting survives
        assert_eq!(merged.target_root, PathBuf::from("/archive"));
        assert_eq!(merged.hour_offset, -3);
        assert!(merged.dry_run);
    }

    #[test]
    fn test_exclude_and_patterns() {
        let cli = Cli::parse_from([
            "media-archiver",
            "copy",
            "-x",
            "Reviewed",
            "@eaDir",
            "-p",
            "*.jpg",
            "*.mp4",
        ]);
        let config = cli.to_config();
        assert_eq!(config.exclude_dirs, vec!["Reviewed", "@eaDir"]);
        assert_eq!(config.patterns, vec!["*.jpg", "*.mp4"]);
    }
}
