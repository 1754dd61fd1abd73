//! Error types for bkcfg.
//!
//! Each failure kind of a run has its own enum; [`Error`] wraps them for the
//! command-line front end and maps them onto exit status codes.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::sysexits;

/// Unified result type for fallible operations in bkcfg.
pub type Result<T> = std::result::Result<T, Error>;

/// Any error that terminates a run.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl Error {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(ConfigError::Missing(_)) => sysexits::EX_CONFIG,
            Error::Config(ConfigError::Read { .. }) => sysexits::EX_NOINPUT,
            Error::Config(ConfigError::Parse(_)) | Error::Schema(_) => sysexits::EX_DATAERR,
            Error::Execution(ExecutionError::CreateDir { .. }) => sysexits::EX_CANTCREAT,
            Error::Execution(_) => sysexits::EX_IOERR,
        }
    }
}

/// Errors raised while locating and reading the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required external input is not set.
    #[error("{0} is not set")]
    Missing(String),

    #[error("Error reading config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error parsing config: {0}")]
    Parse(String),
}

/// Structural errors in the directive list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("backups is missing")]
    Missing,

    #[error("backups must be a sequence, found {found}")]
    NotSequence { found: &'static str },

    #[error("backups[{index}] must be a mapping, found {found}")]
    NotMapping { index: usize, found: &'static str },

    #[error(
        "backups[{index}] has unknown field `{field}`, expected one of: {}",
        crate::schema::FIELDS.join(", ")
    )]
    UnknownField { index: usize, field: String },

    #[error("backups[{index}] must declare `files` or `dirs`")]
    NoEntries { index: usize },

    #[error("backups[{index}].{field} must contain at least one entry")]
    EmptyList { index: usize, field: &'static str },

    #[error("backups[{index}].{field} must be {expected}, found {found}")]
    TypeMismatch {
        index: usize,
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Filesystem failures during a run. Any of them aborts the remaining directives.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("mkdir -p {path:?} failed: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("backup file {entry} failed: {path:?}: {message}")]
    CopyFile {
        entry: String,
        path: PathBuf,
        message: String,
    },

    #[error("backup dir {entry} failed: {path:?}: {message}")]
    CopyDir {
        entry: String,
        path: PathBuf,
        message: String,
    },

    #[error("invalid wildcard pattern {pattern:?}: {message}")]
    Pattern { pattern: String, message: String },

    #[error("backup {entry} failed: no match for {pattern:?}")]
    NoMatch { entry: String, pattern: String },
}
