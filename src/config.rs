//! Configuration sources for a backup run.
//!
//! The configuration document comes from a file given on the command line,
//! from inline YAML (usually the `backup_cfg` environment variable), or from
//! the default file under the platform config directory. Whatever the source,
//! it is parsed into a YAML value and handed to the schema validator; the core
//! never reads the environment itself.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::Value;

use crate::constants::{BACKUPS_KEY, BASE_DIR_ENV, CONFIG_ENV, CONFIG_NAME, PKG_NAME};
use crate::directive::BackupDirective;
use crate::error::{ConfigError, Result};
use crate::schema;

/// Serialization format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
}

impl Format {
    /// TOML for files with a `.toml` extension, YAML for everything else.
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => Format::Yaml,
        }
    }
}

/// Where the configuration document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Inline(String),
}

impl ConfigSource {
    /// Picks the configuration source: an explicit file first, then inline
    /// YAML, then the default config file if it exists.
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] if no source is available.
    pub fn resolve(file: Option<PathBuf>, inline: Option<String>) -> Result<Self> {
        Self::resolve_with(file, inline, config_file())
    }

    fn resolve_with(
        file: Option<PathBuf>,
        inline: Option<String>,
        default_file: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(path) = file {
            return Ok(ConfigSource::File(path));
        }
        if let Some(text) = inline.filter(|text| !text.trim().is_empty()) {
            return Ok(ConfigSource::Inline(text));
        }
        match default_file.filter(|path| path.is_file()) {
            Some(path) => Ok(ConfigSource::File(path)),
            None => Err(ConfigError::Missing(CONFIG_ENV.to_string()).into()),
        }
    }

    pub fn format(&self) -> Format {
        match self {
            ConfigSource::File(path) => Format::from_path(path),
            ConfigSource::Inline(_) => Format::Yaml,
        }
    }

    /// Reads the raw document text.
    pub fn read(&self) -> Result<String> {
        match self {
            ConfigSource::File(path) => {
                fs::read_to_string(path).map_err(|source| {
                    ConfigError::Read {
                        path: path.clone(),
                        source,
                    }
                    .into()
                })
            }
            ConfigSource::Inline(text) => Ok(text.clone()),
        }
    }

    /// Human-readable description for progress output.
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::File(path) => path.display().to_string(),
            ConfigSource::Inline(_) => format!("${CONFIG_ENV}"),
        }
    }
}

/// Parses a configuration document into a YAML value.
pub fn parse_document(text: &str, format: Format) -> Result<Value> {
    let value: Value = match format {
        Format::Yaml => serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?,
        Format::Toml => toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?,
    };
    Ok(value)
}

/// Validates the `backups` list of a parsed document.
pub fn directives_of(document: &Value) -> Result<Vec<BackupDirective>> {
    Ok(schema::validate(document.get(BACKUPS_KEY))?)
}

/// Reads, parses and validates the configuration from `source`.
pub fn load(source: &ConfigSource) -> Result<Vec<BackupDirective>> {
    let text = source.read()?;
    let document = parse_document(&text, source.format())?;
    directives_of(&document)
}

/// Resolves the base destination directory.
///
/// # Errors
/// Returns [`ConfigError::Missing`] if it is not set or empty.
pub fn base_dir(value: Option<PathBuf>) -> Result<PathBuf> {
    value
        .filter(|path| !path.as_os_str().is_empty())
        .ok_or_else(|| ConfigError::Missing(BASE_DIR_ENV.to_string()).into())
}

/// Renders directives as a configuration document, with defaults filled in.
pub fn to_document(directives: &[BackupDirective]) -> Result<String> {
    #[derive(Serialize)]
    struct Document<'a> {
        backups: &'a [BackupDirective],
    }

    serde_yaml::to_string(&Document {
        backups: directives,
    })
    .map_err(|e| ConfigError::Parse(e.to_string()).into())
}

/// Returns the absolute path to the default configuration file.
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_NAME))
}

/// Returns the configuration directory for the application, platform-specific.
#[cfg(not(target_os = "macos"))]
fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(PKG_NAME))
}

/// Returns the configuration directory for the application, platform-specific.
#[cfg(target_os = "macos")]
fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join(PKG_NAME))
}
