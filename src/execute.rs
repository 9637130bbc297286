//! Action execution
//!
//! Performs (or simulates) Copy / Move / OffsetRename against the resolved
//! destination. Failures from the underlying filesystem never escape: they
//! are recorded as `Outcome::Failed` on the record and the batch continues
//! with the next file.

use crate::config::{Command, Config};
use crate::error::{Error, Result};
use crate::record::{FileRecord, Outcome};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Execute the configured command for one record, populating its outcome
/// and message.
pub fn execute(record: &mut FileRecord, config: &Config) {
    let (outcome, message) = match run_command(record, config) {
        Ok(result) => result,
        Err(e) => {
            warn!(source = %record.source_path.display(), error = %e, "File operation failed");
            (
                Outcome::Failed(e.to_string()),
                format!("failed: {}", e),
            )
        }
    };

    record.outcome = outcome;
    record.message = message;
}

/// Verb for outcome messages: live runs state what happened, dry runs what
/// would happen.
fn verb(dry_run: bool) -> &'static str {
    if dry_run { "would be" } else { "is" }
}

fn run_command(record: &FileRecord, config: &Config) -> Result<(Outcome, String)> {
    let destination = record
        .destination
        .as_ref()
        .ok_or_else(|| Error::Config("record has no resolved destination".into()))?;

    match config.command {
        Command::Copy => copy(record, destination, config),
        Command::Move => do_move(record, destination, config),
        Command::OffsetRename => offset_rename(record, destination, config),
    }
}

fn copy(record: &FileRecord, destination: &Path, config: &Config) -> Result<(Outcome, String)> {
    if destination.exists() && !config.force {
        return Ok((
            Outcome::AlreadyExists,
            format!("already exists at {}", destination.display()),
        ));
    }

    if !config.dry_run {
        create_parent(destination)?;
        copy_file(&record.source_path, destination)?;
        preserve_mtime(&record.source_path, destination);
    }

    Ok((
        Outcome::Done,
        format!("{} copied to {}", verb(config.dry_run), destination.display()),
    ))
}

fn do_move(record: &FileRecord, destination: &Path, config: &Config) -> Result<(Outcome, String)> {
    if destination.exists() && !config.force {
        // The archive already holds this file, so the source is a
        // duplicate. Deleting it is the documented de-duplication policy,
        // not a silent no-op.
        if !config.dry_run {
            fs::remove_file(&record.source_path)?;
        }
        return Ok((
            Outcome::Deleted,
            format!(
                "source {} deleted, destination {} already exists",
                verb(config.dry_run),
                destination.display()
            ),
        ));
    }

    if !config.dry_run {
        create_parent(destination)?;
        move_file(&record.source_path, destination)?;
    }

    Ok((
        Outcome::Done,
        format!("{} moved to {}", verb(config.dry_run), destination.display()),
    ))
}

fn offset_rename(
    record: &FileRecord,
    destination: &Path,
    config: &Config,
) -> Result<(Outcome, String)> {
    if destination == record.source_path {
        return Ok((
            Outcome::AlreadyExists,
            "already has its canonical name".to_string(),
        ));
    }

    if destination.exists() && !config.force {
        return Ok((
            Outcome::AlreadyExists,
            format!("already exists at {}", destination.display()),
        ));
    }

    if !config.dry_run {
        fs::rename(&record.source_path, destination)?;
    }

    Ok((
        Outcome::Done,
        format!("{} renamed to {}", verb(config.dry_run), destination.display()),
    ))
}

fn create_parent(destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        // create_dir_all is idempotent, an existing tree is fine
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Move with a rename-first strategy, falling back to copy + delete for
/// cross-filesystem moves.
fn move_file(source: &Path, dest: &Path) -> Result<()> {
    if fs::rename(source, dest).is_err() {
        copy_file(source, dest)?;
        preserve_mtime(source, dest);
        fs::remove_file(source)?;
    }
    Ok(())
}

/// Copy file with buffered I/O
fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    let src_file = File::open(source)?;
    let dest_file = File::create(dest)?;

    let mut reader = BufReader::with_capacity(256 * 1024, src_file);
    let mut writer = BufWriter::with_capacity(256 * 1024, dest_file);

    let mut buffer = vec![0u8; 256 * 1024];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
    }

    writer.flush()?;
    Ok(())
}

/// Carry the source's modification time over to the destination
fn preserve_mtime(source: &Path, dest: &Path) {
    if let Ok(metadata) = fs::metadata(source)
        && let Ok(mtime) = metadata.modified()
    {
        if let Err(e) =
            filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(mtime))
        {
            debug!(dest = %dest.display(), error = %e, "Could not preserve mtime");
        }
    }
}
