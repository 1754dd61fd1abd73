//! Command-line interface definition for bkcfg.
//!
//! This module defines the CLI commands and their arguments, and turns them
//! into an explicit [`BackupRun`] for the library to execute.

use std::path::PathBuf;

use anyhow::Result;
use bkcfg::config::{self, ConfigSource};
use bkcfg::constants::{BASE_DIR_ENV, CONFIG_ENV};
use bkcfg::{BackupDirective, BackupRun};
use clap::{Parser, Subcommand};
use tracing::info;

/// Command-line interface definition for bkcfg.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Configuration file (YAML, or TOML with a .toml extension).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Inline YAML configuration.
    #[arg(long, env = CONFIG_ENV, hide_env_values = true, global = true)]
    pub config_yaml: Option<String>,
    /// Base destination directory.
    #[arg(short, long, env = BASE_DIR_ENV, global = true)]
    pub base_dir: Option<PathBuf>,
    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
    /// Subcommand to execute. Defaults to `run`.
    #[command(subcommand)]
    pub commands: Option<Commands>,
}

/// Supported bkcfg commands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Validate the configuration, then copy every enabled directive.
    Run {
        /// Resolve and check every source without creating or copying anything.
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Validate the configuration without touching the filesystem.
    Check {
        /// Print the validated directives with defaults filled in.
        #[arg(short, long)]
        print: bool,
    },
}

/// Loads and validates the directives named by the command line.
fn load(config_file: Option<PathBuf>, config_yaml: Option<String>) -> Result<Vec<BackupDirective>> {
    let source = ConfigSource::resolve(config_file, config_yaml)?;
    let directives = config::load(&source)?;
    info!("loaded backup config from {}", source.describe());
    Ok(directives)
}

/// Runs every enabled directive against the base directory.
///
/// # Errors
/// Returns an error if the configuration is missing or invalid, or if any copy fails.
pub(crate) fn run(
    config_file: Option<PathBuf>,
    config_yaml: Option<String>,
    base_dir: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    info!("start backup");
    let base_dir = config::base_dir(base_dir)?;
    let directives = load(config_file, config_yaml)?;

    let run = BackupRun::new(base_dir, directives).dry_run(dry_run);
    let summary = run.execute().map_err(bkcfg::Error::from)?;
    if dry_run {
        info!("dry run finished: {summary}");
    } else {
        info!("backup finished: {summary}");
    }
    Ok(())
}

/// Validates the configuration and reports the result on stdout.
///
/// # Errors
/// Returns an error if the configuration is missing or invalid.
pub(crate) fn check(
    config_file: Option<PathBuf>,
    config_yaml: Option<String>,
    print: bool,
) -> Result<()> {
    let directives = load(config_file, config_yaml)?;
    if print {
        print!("{}", config::to_document(&directives)?);
    } else {
        println!("{}", display_check(&directives));
    }
    Ok(())
}

fn display_check(directives: &[BackupDirective]) -> String {
    let enabled = directives.iter().filter(|d| d.enabled).count();
    format!(
        "config is valid: {} directives ({} enabled, {} disabled)",
        directives.len(),
        enabled,
        directives.len() - enabled
    )
}
