//! core::metadata::recipe
//!
//! Metadata for a single recipe revision.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::{self, Checksums, MetadataError, Properties};
use crate::core::types::{Revision, UtcTimestamp};

/// Metadata for one recipe revision in the cache.
///
/// `revision` and `properties` are required when loading; everything else
/// may be absent in older files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeMetadata {
    #[serde(deserialize_with = "Option::deserialize")]
    revision: Option<Revision>,

    /// Remote the recipe was retrieved from
    #[serde(default)]
    pub remote: Option<String>,

    /// Free-form properties
    #[serde(deserialize_with = "schema::null_as_empty")]
    pub properties: Properties,

    /// Checksums of the exported files
    #[serde(default, deserialize_with = "schema::null_as_empty")]
    pub checksums: Checksums,

    #[serde(
        rename = "last_used_utc",
        default,
        deserialize_with = "schema::last_used"
    )]
    last_used: Option<UtcTimestamp>,
}

impl RecipeMetadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recipe revision, if known.
    pub fn revision(&self) -> Option<&Revision> {
        self.revision.as_ref()
    }

    /// Set the revision. `None` is stored as-is.
    pub fn set_revision(&mut self, revision: Option<Revision>) {
        self.revision = revision;
    }

    /// When the recipe was last used, if ever recorded.
    pub fn last_used(&self) -> Option<UtcTimestamp> {
        self.last_used
    }

    /// Set or clear the last-used timestamp.
    pub fn set_last_used(&mut self, last_used: Option<UtcTimestamp>) {
        self.last_used = last_used;
    }

    /// Mark the recipe as used now.
    pub fn touch(&mut self) {
        self.last_used = Some(UtcTimestamp::now());
    }

    /// Convert to the persisted JSON object.
    pub fn to_dict(&self) -> Result<Value, MetadataError> {
        serde_json::to_value(self).map_err(|e| MetadataError::SerializeError(e.to_string()))
    }

    /// Rebuild from a persisted JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::ParseError`] if `revision` or `properties`
    /// is missing, or if a field holds the wrong JSON type. A bad
    /// `last_used_utc` is never an error.
    pub fn loads(data: &Value) -> Result<Self, MetadataError> {
        Self::deserialize(data).map_err(|e| MetadataError::ParseError(format!("recipe: {}", e)))
    }
}
