//! Configuration types for the media archiver

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Archiving command to perform on each candidate file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    /// Copy files into the archive tree, leaving the source untouched
    #[default]
    Copy,
    /// Move files into the archive tree; if the destination already exists
    /// the source is deleted (it is a duplicate of archived content)
    Move,
    /// Rename files in place to their canonical timestamped name,
    /// without moving them into the archive tree
    OffsetRename,
}

/// Configuration for one archiving run
///
/// Constructed once per invocation and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Command to perform
    pub command: Command,

    /// Source directory to scan for media files (e.g. a mounted memory card)
    pub source_dir: PathBuf,

    /// Root of the archive tree
    pub target_root: PathBuf,

    /// Optional path segment inserted under the year folder
    /// (e.g. "Camera" gives <root>/<yyyy>/Camera/...)
    #[serde(default)]
    pub subfolder: Option<String>,

    /// Optional suffix appended to the renamed file stem, before the extension
    #[serde(default)]
    pub file_suffix: Option<String>,

    /// Path fragments excluded from the existing-day-folder probe.
    /// A fragment matches when it equals any single path component.
    #[serde(default)]
    pub exclude_dirs: Vec<String>,

    /// Signed hour offset added to every derived timestamp
    #[serde(default)]
    pub hour_offset: i64,

    /// Only consider files created on or after this date
    #[serde(default)]
    pub min_date: Option<NaiveDate>,

    /// Only consider files created on or before this date
    #[serde(default)]
    pub max_date: Option<NaiveDate>,

    /// Filename glob filters (e.g. "*.jpg"). Empty means the built-in
    /// media extension set.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Dry run mode - report what would happen without touching the filesystem
    #[serde(default)]
    pub dry_run: bool,

    /// Overwrite existing destination files
    #[serde(default)]
    pub force: bool,

    /// Verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Optional path for a JSON per-file outcome report
    #[serde(default)]
    pub report_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command: Command::default(),
            source_dir: PathBuf::new(),
            target_root: PathBuf::new(),
            subfolder: None,
            file_suffix: None,
            exclude_dirs: vec![],
            hour_offset: 0,
            min_date: None,
            max_date: None,
            patterns: vec![],
            dry_run: false,
            force: false,
            verbose: false,
            report_file: None,
        }
    }
}

/// Built-in media extensions used when no glob patterns are configured
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "heic", "heif", "avif", "tiff", "tif", "mp4",
    "mov", "avi", "mkv", "wmv", "m4v", "3gp", "raw", "arw", "cr2", "cr3", "nef", "orf", "rw2",
    "dng", "raf",
];

impl Config {
    /// Check if a file extension belongs to the built-in media set
    pub fn is_default_extension(ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        DEFAULT_EXTENSIONS.iter().any(|e| *e == ext_lower)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError { source: e })?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Media Archiver Configuration File
# This file uses TOML format (https://toml.io)

# Command: "copy", "move", or "offset-rename"
# - copy: copy files into the archive, source untouched
# - move: move files into the archive; deletes the source when the
#   destination already holds the file
# - offset-rename: rename files in place to their canonical name
command = "copy"

# Source directory to scan (e.g. a mounted memory card)
source_dir = "/media/card/DCIM"

# Root of the archive tree
target_root = "/archive"

# Optional path segment under the year folder
# subfolder = "Camera"

# Optional suffix appended to the renamed file stem
# file_suffix = "-holiday"

# Folder names excluded from the existing-day-folder probe
exclude_dirs = [
    "Reviewed",
    "@eaDir",
]

# Signed hour offset added to every derived timestamp
hour_offset = 0

# Inclusive creation-date bounds for the scan (YYYY-MM-DD)
# min_date = "2024-01-01"
# max_date = "2024-12-31"

# Filename glob filters; empty means the built-in media extension set
patterns = ["*.jpg", "*.mp4"]

# Dry run mode - show what would be done without doing it
dry_run = false

# Overwrite existing destination files
force = false

# Verbose output
verbose = false

# Optional JSON per-file outcome report
# report_file = "/archive/last_run.json"
"#
        .to_string()
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to serialize configuration
    SerializeError { source: toml::ser::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
            ConfigError::SerializeError { source } => {
                write!(f, "Failed to serialize config: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::SerializeError { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(&Config::sample_config()).unwrap();
        assert_eq!(config.command, Command::Copy);
        assert_eq!(config.source_dir, PathBuf::from("/media/card/DCIM"));
        assert_eq!(config.exclude_dirs, vec!["Reviewed", "@eaDir"]);
        assert!(!config.force);
    }

    #[test]
    fn test_default_extensions() {
        assert!(Config::is_default_extension("JPG"));
        assert!(Config::is_default_extension("mov"));
        assert!(!Config::is_default_extension("txt"));
    }
}
