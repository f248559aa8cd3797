//! Argument constraints shared by the tool catalog.
//!
//! Every check runs before any upstream call is issued.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::websets::PathError;

/// Largest page size the upstream API accepts.
pub const MAX_LIMIT: i64 = 100;
/// Upstream cap on search criteria per search.
pub const MAX_CRITERIA: usize = 5;
/// Upstream cap on enrichment options.
pub const MAX_OPTIONS: usize = 150;
/// Upstream cap on a single metadata value.
pub const MAX_METADATA_VALUE_LEN: usize = 1000;

/// Free-form key/value annotations attached to upstream resources.
pub type Metadata = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Arguments did not match the declared shape (wrong type, unknown variant, missing field).
    #[error("{0}")]
    Malformed(String),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{field} must be at least {min}, got {value}")]
    TooSmall { field: String, value: i64, min: i64 },

    #[error("{field} accepts at most {max} entries, got {len}")]
    TooMany {
        field: String,
        len: usize,
        max: usize,
    },

    #[error("{0} must not be empty")]
    Empty(String),

    #[error("{field} exceeds {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} is required when {when}")]
    MissingCompanion { field: String, when: String },

    #[error("{field} is not allowed when {when}")]
    NotAllowed { field: String, when: String },

    #[error("{0}")]
    Invalid(String),
}

impl From<PathError> for ValidationError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::EmptyParam(name) => ValidationError::Empty(name),
            other => ValidationError::Invalid(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Malformed(err.to_string())
    }
}

pub fn check_limit(limit: Option<i64>) -> Result<(), ValidationError> {
    match limit {
        Some(value) if !(1..=MAX_LIMIT).contains(&value) => Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            value,
            min: 1,
            max: MAX_LIMIT,
        }),
        _ => Ok(()),
    }
}

pub fn check_min(field: &str, value: Option<i64>, min: i64) -> Result<(), ValidationError> {
    match value {
        Some(value) if value < min => Err(ValidationError::TooSmall {
            field: field.to_string(),
            value,
            min,
        }),
        _ => Ok(()),
    }
}

pub fn check_not_blank(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }
    Ok(())
}

pub fn check_max_len<T>(field: &str, items: &[T], max: usize) -> Result<(), ValidationError> {
    if items.len() > max {
        return Err(ValidationError::TooMany {
            field: field.to_string(),
            len: items.len(),
            max,
        });
    }
    Ok(())
}

pub fn check_non_empty_list<T>(field: &str, items: &[T]) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }
    Ok(())
}

pub fn check_metadata(metadata: Option<&Metadata>) -> Result<(), ValidationError> {
    let Some(metadata) = metadata else {
        return Ok(());
    };
    for (key, value) in metadata {
        check_not_blank("metadata key", key)?;
        if value.chars().count() > MAX_METADATA_VALUE_LEN {
            return Err(ValidationError::TooLong {
                field: format!("metadata.{}", key),
                max: MAX_METADATA_VALUE_LEN,
            });
        }
    }
    Ok(())
}

/// Standard five-field cron expression: minute hour day-of-month month day-of-week.
pub fn check_cron(cron: &str) -> Result<(), ValidationError> {
    let fields = cron.split_whitespace().count();
    if fields != 5 {
        return Err(ValidationError::Invalid(format!(
            "cron must have 5 fields (minute hour day month weekday), got {}",
            fields
        )));
    }
    Ok(())
}

pub fn check_http_url(field: &str, url: &str) -> Result<(), ValidationError> {
    match reqwest::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(()),
        _ => Err(ValidationError::Invalid(format!(
            "{} must be an http(s) URL, got {:?}",
            field, url
        ))),
    }
}

/// Update operations must change something.
pub fn check_any_field(present: &[bool], fields: &str) -> Result<(), ValidationError> {
    if present.iter().any(|p| *p) {
        return Ok(());
    }
    Err(ValidationError::Invalid(format!(
        "at least one of {} must be provided",
        fields
    )))
}
