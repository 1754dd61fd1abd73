//! bkcfg: copies declared files and directories into a backup directory.
//!
//! A run takes a list of [`BackupDirective`]s, checks the whole list against a
//! fixed schema with [`schema::validate`], then copies each enabled directive
//! in order with [`BackupRun::execute`], stopping at the first failure.

pub mod config;
pub mod constants;
pub mod directive;
pub mod error;
pub mod executor;
pub mod file_util;
pub mod logger;
pub mod path_util;
pub mod schema;
pub mod sysexits;

pub use directive::BackupDirective;
pub use error::{ConfigError, Error, ExecutionError, Result, SchemaError};
pub use executor::{BackupRun, Summary, execute};
pub use schema::validate;
