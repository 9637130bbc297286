//! Media Archiver - files photos and videos into a date-structured archive
//!
//! This library organizes media files copied from a removable source into
//! a `<root>/<yyyy>/<yyyyMM>/<yyyyMMdd>/` archive tree:
//! - Timestamp extraction from embedded filename stamps with a
//!   creation-time fallback and configurable hour offset
//! - Destination resolution that reuses existing, possibly human-renamed,
//!   day folders before creating new ones
//! - Copy / Move / in-place rename execution with dry-run support and
//!   per-file failure isolation

pub mod cli;
pub mod config;
pub mod error;
pub mod execute;
pub mod process;
pub mod record;
pub mod resolve;
pub mod scan;
pub mod time;

pub use cli::Cli;
pub use config::{Command, Config, ConfigError};
pub use error::{Error, Result};
pub use process::{BatchTotals, Processor, RunStats};
pub use record::{FileRecord, Outcome};
