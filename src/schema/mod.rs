//! Input schemas for the store and survey forms.
//!
//! Deserialisation normalises the loose parts of browser form input (blank
//! strings in optional fields, numbers sent as strings) and `garde` enforces
//! the field rules.

pub mod store;
pub mod survey;

pub use store::{BusinessHours, StoreInput};
pub use survey::{SurveyDraftInput, SurveyInput, WorkType};

use garde::Validate;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;

use crate::query_params::coerce_number;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation failed:\n{0}")]
    Invalid(#[from] garde::Report),
}

/// Which form a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SchemaKind {
    /// Admin store registration
    Store,
    /// Public survey submission (no store link yet)
    Draft,
    /// Confirmed survey linked to a store
    Survey,
}

/// Deserialize `raw` as `T` and run its validation rules.
pub fn parse_and_validate<T>(raw: &str) -> Result<T, SchemaError>
where
    T: DeserializeOwned + Validate<Context = ()>,
{
    let value: T = serde_json::from_str(raw)?;
    value.validate()?;
    Ok(value)
}

/// Validate `raw` against the schema for `kind`, discarding the parsed value.
pub fn validate_document(kind: SchemaKind, raw: &str) -> Result<(), SchemaError> {
    match kind {
        SchemaKind::Store => parse_and_validate::<StoreInput>(raw).map(|_| ()),
        SchemaKind::Draft => parse_and_validate::<SurveyDraftInput>(raw).map(|_| ()),
        SchemaKind::Survey => parse_and_validate::<SurveyInput>(raw).map(|_| ()),
    }
}

// ── Field deserialisers ─────────────────────────────────────────────────────

/// Optional text where a blank string means "not provided".
pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

/// Optional number that may arrive as a numeric string.
pub(crate) fn coerced_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => coerce_number(&v)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("expected a number, got {v}"))),
    }
}
