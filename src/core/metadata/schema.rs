//! core::metadata::schema
//!
//! Shared pieces of the persisted metadata schema.
//!
//! # Tolerance
//!
//! Unlike most schemas, this one is lenient by necessity: files written by
//! older clients lack newer keys, and a corrupt timestamp must never make a
//! cache entry unreadable. The field helpers here encode those rules:
//!
//! - [`last_used`] - any unreadable `last_used_utc` loads as `None`
//! - [`null_as_empty`] - a `null` map loads as an empty map
//! - [`revision_or_default`] - an absent or `null` binary revision loads as
//!   [`DEFAULT_REVISION`](crate::core::types::DEFAULT_REVISION)
//!
//! Unknown keys are ignored.
//!
//! # Ordering
//!
//! Maps keep insertion order and objects keep field order, so the
//! serialized text follows the order in which entries were added.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::core::types::{Revision, UtcTimestamp};

/// Key under which `last_used` is persisted.
pub const LAST_USED_KEY: &str = "last_used_utc";

/// Free-form properties attached to a recipe or package.
pub type Properties = IndexMap<String, Value>;

/// Per-file checksums: file name to (algorithm name to hex digest).
pub type Checksums = IndexMap<String, IndexMap<String, String>>;

/// Errors from metadata operations.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to parse package metadata: {0}")]
    ParseError(String),

    #[error("failed to serialize package metadata: {0}")]
    SerializeError(String),
}

/// Deserialize `last_used_utc`, absorbing every failure into `None`.
pub(crate) fn last_used<'de, D>(deserializer: D) -> Result<Option<UtcTimestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(UtcTimestamp::parse_lenient(&value))
}

/// Deserialize a map that may have been persisted as `null`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a binary package revision, substituting the default for `null`.
pub(crate) fn revision_or_default<'de, D>(deserializer: D) -> Result<Option<Revision>, D::Error>
where
    D: Deserializer<'de>,
{
    let revision = Option::<Revision>::deserialize(deserializer)?;
    Ok(Some(revision.unwrap_or_else(Revision::default_revision)))
}

/// Value used when a binary package revision key is absent.
pub(crate) fn default_revision() -> Option<Revision> {
    Some(Revision::default_revision())
}
