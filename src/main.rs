//! Media Archiver - CLI entry point
//!
//! Thin shell around the library: argument parsing, logging setup,
//! configuration loading, and a styled summary of the per-file outcomes.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use media_archiver::{Cli, Config, Outcome, Processor};
use std::path::{Path, PathBuf};
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// CLI Output Module
mod cli_output {
    //! Styled terminal output for the run summary

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    /// CLI theme colors
    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// Print a statistic line
    pub fn print_stat(key: &str, value: &str, color: Color) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = style(value).with(color).bold();
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    /// Print one per-file result line
    pub fn print_result(status_icon: &str, status_color: Color, source: &str, msg: &str) {
        let icon_styled = style(status_icon).with(status_color).bold();
        let source_styled = style(source).italic();
        let msg_styled = style(msg).with(CliTheme::HINT);

        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(icon_styled));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(source_styled));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(msg_styled));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.sample_config {
        print!("{}", Config::sample_config());
        return Ok(());
    }

    // Get the executable directory for Config and Log directories
    let exe_dir = get_executable_dir()?;

    // Determine log file path based on config file or timestamp
    let log_path = get_log_path(&exe_dir, &cli);

    let _guard = setup_logging(&cli, &log_path)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Media Archiver starting"
    );

    let config = load_config(&cli, &exe_dir)?;

    if cli.verbose {
        info!(?config, "Configuration loaded");
    }

    validate_config(&config)?;

    let mut processor = Processor::new(config)?;

    match processor.run() {
        Ok(records) => {
            use cli_output::*;

            print_separator();
            print_blank();

            let stats = processor.stats();
            print_stat("Done", &stats.done.to_string(), CliTheme::SUCCESS);
            print_stat(
                "Already exists",
                &stats.already_exists.to_string(),
                CliTheme::WARNING,
            );
            print_stat("Deleted", &stats.deleted.to_string(), CliTheme::ACCENT);
            print_stat("Failed", &stats.failed.to_string(), CliTheme::ERROR);
            print_blank();

            if cli.verbose {
                print_separator();
                for record in &records {
                    let (icon, color) = match record.outcome {
                        Outcome::Done => ("✓", CliTheme::SUCCESS),
                        Outcome::AlreadyExists => ("⊘", CliTheme::WARNING),
                        Outcome::Deleted => ("≡", CliTheme::ACCENT),
                        Outcome::Failed(_) => ("✗", CliTheme::ERROR),
                        Outcome::Pending => ("?", CliTheme::HINT),
                    };
                    print_result(
                        icon,
                        color,
                        &record.source_path.display().to_string(),
                        &record.message,
                    );
                }
            }

            let failed: Vec<_> = records
                .iter()
                .filter(|r| r.outcome.is_failed())
                .collect();

            if !failed.is_empty() {
                print_separator();
                print_error(&format!("{} file(s) failed:", failed.len()));
                for record in &failed {
                    print_result(
                        "✗",
                        CliTheme::ERROR,
                        &record.source_path.display().to_string(),
                        &record.message,
                    );
                }
            }

            if cli.dry_run {
                print_separator();
                print_warning("Dry run - no files were touched");
            }

            info!(log_file = %log_path.display(), "Processing complete. Log saved to");

            if processor.stats().has_failures() {
                std::process::exit(1);
            }

            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Processing failed");
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Determine the log file path based on config file or timestamp
fn get_log_path(exe_dir: &Path, cli: &Cli) -> PathBuf {
    let log_dir = exe_dir.join("Log");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    if let Some(config_name) = cli.config_name() {
        let log_filename = format!("{}_{}.log", config_name, timestamp);
        log_dir.join(config_name).join(log_filename)
    } else {
        log_dir.join(format!("Run_{}.log", timestamp))
    }
}

/// Resolve config path - supports shorthand syntax
fn resolve_config_path(exe_dir: &Path, config_path: &Path) -> PathBuf {
    if config_path.exists() {
        return config_path.to_path_buf();
    }

    let with_extension = if config_path.extension().is_none() {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };

    if with_extension.exists() {
        return with_extension;
    }

    let config_dir = exe_dir.join("Config");
    let filename = config_path.file_name().unwrap_or(config_path.as_os_str());

    let mut in_config_dir = config_dir.join(filename);
    if in_config_dir.extension().is_none() {
        in_config_dir = in_config_dir.with_extension("toml");
    }

    if in_config_dir.exists() {
        return in_config_dir;
    }

    config_path.to_path_buf()
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli, exe_dir: &Path) -> Result<Config> {
    let config = if let Some(ref config_path) = cli.config {
        let resolved_path = resolve_config_path(exe_dir, config_path);
        info!(config_file = %resolved_path.display(), "Loading configuration from file");
        let file_config = Config::load_from_file(&resolved_path)?;
        cli.merge_with_config(file_config)
    } else {
        cli.to_config()
    };

    if config.source_dir.as_os_str().is_empty() {
        anyhow::bail!("No source directory given (use --source or a config file)");
    }

    Ok(config)
}

/// Setup logging (file + console)
fn setup_logging(cli: &Cli, log_path: &Path) -> Result<Option<WorkerGuard>> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if cli.json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(Some(guard))
}

/// Validate configuration before processing
fn validate_config(config: &Config) -> Result<()> {
    if !config.source_dir.exists() {
        anyhow::bail!(
            "Source directory does not exist: {}",
            config.source_dir.display()
        );
    }

    if config.target_root.starts_with(&config.source_dir) {
        anyhow::bail!(
            "Target root {} is inside source directory {}",
            config.target_root.display(),
            config.source_dir.display()
        );
    }

    Ok(())
}
