//! Structural validation of the directive list.
//!
//! The raw configuration value is checked against a fixed schema and turned
//! into typed [`BackupDirective`]s in one pass. Nothing here touches the
//! filesystem, and the whole list is checked before any directive can run.

use serde_yaml::{Mapping, Value};

use crate::directive::BackupDirective;
use crate::error::SchemaError;

/// Properties a directive may declare.
pub const FIELDS: [&str; 6] = ["enabled", "skip_non_exist", "src_dir", "dst_dir", "files", "dirs"];

/// Validates the directive list and returns the typed directives in declaration order.
///
/// `backups` is `None` when the configuration document has no directive list at all.
///
/// # Errors
/// Returns the first [`SchemaError`] found, naming the offending directive index and field.
pub fn validate(backups: Option<&Value>) -> Result<Vec<BackupDirective>, SchemaError> {
    let backups = backups.ok_or(SchemaError::Missing)?;
    let items = match backups {
        Value::Sequence(items) => items,
        other => {
            return Err(SchemaError::NotSequence {
                found: type_name(other),
            });
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Mapping(map) => validate_directive(index, map),
            other => Err(SchemaError::NotMapping {
                index,
                found: type_name(other),
            }),
        })
        .collect()
}

fn validate_directive(index: usize, map: &Mapping) -> Result<BackupDirective, SchemaError> {
    let mut directive = BackupDirective::default();
    let mut declares_entries = false;

    for (key, value) in map {
        let Some(field) = key.as_str() else {
            return Err(SchemaError::UnknownField {
                index,
                field: describe_key(key),
            });
        };
        match field {
            "enabled" => directive.enabled = expect_bool(index, field, value)?,
            "skip_non_exist" => directive.skip_non_exist = expect_bool(index, field, value)?,
            "src_dir" => directive.src_dir = Some(expect_string(index, field, value)?),
            "dst_dir" => directive.dst_dir = Some(expect_string(index, field, value)?),
            "files" => {
                directive.files = expect_entries(index, "files", value)?;
                declares_entries = true;
            }
            "dirs" => {
                directive.dirs = expect_entries(index, "dirs", value)?;
                declares_entries = true;
            }
            _ => {
                return Err(SchemaError::UnknownField {
                    index,
                    field: field.to_string(),
                });
            }
        }
    }

    if !declares_entries {
        return Err(SchemaError::NoEntries { index });
    }
    Ok(directive)
}

fn expect_bool(index: usize, field: &str, value: &Value) -> Result<bool, SchemaError> {
    value.as_bool().ok_or_else(|| SchemaError::TypeMismatch {
        index,
        field: field.to_string(),
        expected: "a boolean",
        found: type_name(value),
    })
}

fn expect_string(index: usize, field: &str, value: &Value) -> Result<String, SchemaError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SchemaError::TypeMismatch {
            index,
            field: field.to_string(),
            expected: "a string",
            found: type_name(value),
        })
}

fn expect_entries(
    index: usize,
    field: &'static str,
    value: &Value,
) -> Result<Vec<String>, SchemaError> {
    let Value::Sequence(items) = value else {
        return Err(SchemaError::TypeMismatch {
            index,
            field: field.to_string(),
            expected: "a sequence of strings",
            found: type_name(value),
        });
    };
    if items.is_empty() {
        return Err(SchemaError::EmptyList { index, field });
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| expect_string(index, &format!("{field}[{i}]"), item))
        .collect()
}

fn describe_key(key: &Value) -> String {
    serde_yaml::to_string(key)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| type_name(key).to_string())
}

/// Short name of a YAML value's type, for error messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
