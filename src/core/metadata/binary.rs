//! core::metadata::binary
//!
//! Metadata for a single binary package built from a recipe revision.
//!
//! # Revisions
//!
//! A binary package never reports a missing revision once one has been
//! assigned: setting `None` stores
//! [`DEFAULT_REVISION`](crate::core::types::DEFAULT_REVISION) instead. The
//! same holds for `recipe_revision`. Only a freshly created entry, whose
//! setters have not run yet, has no revision.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::{self, Checksums, MetadataError, Properties};
use crate::core::types::{Revision, UtcTimestamp};

/// Metadata for one binary package in the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinaryPackageMetadata {
    #[serde(
        default = "schema::default_revision",
        deserialize_with = "schema::revision_or_default"
    )]
    revision: Option<Revision>,

    #[serde(
        default = "schema::default_revision",
        deserialize_with = "schema::revision_or_default"
    )]
    recipe_revision: Option<Revision>,

    /// Remote the package was retrieved from
    #[serde(default)]
    pub remote: Option<String>,

    /// Free-form properties
    #[serde(default, deserialize_with = "schema::null_as_empty")]
    pub properties: Properties,

    /// Checksums of the package files
    #[serde(default, deserialize_with = "schema::null_as_empty")]
    pub checksums: Checksums,

    #[serde(
        rename = "last_used_utc",
        default,
        deserialize_with = "schema::last_used"
    )]
    last_used: Option<UtcTimestamp>,
}

/// Apply the `None` to default substitution shared by both revision setters.
fn or_default(revision: Option<Revision>) -> Revision {
    match revision {
        Some(rev) if !rev.is_null() => rev,
        _ => Revision::default_revision(),
    }
}

impl BinaryPackageMetadata {
    /// Create empty metadata with neither revision set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Package revision. `None` only if never assigned.
    pub fn revision(&self) -> Option<&Revision> {
        self.revision.as_ref()
    }

    /// Set the package revision; `None` stores the default revision.
    pub fn set_revision(&mut self, revision: Option<Revision>) {
        self.revision = Some(or_default(revision));
    }

    /// Revision of the recipe this package was built from.
    pub fn recipe_revision(&self) -> Option<&Revision> {
        self.recipe_revision.as_ref()
    }

    /// Set the recipe revision; `None` stores the default revision.
    pub fn set_recipe_revision(&mut self, revision: Option<Revision>) {
        self.recipe_revision = Some(or_default(revision));
    }

    /// When the package was last used, if ever recorded.
    pub fn last_used(&self) -> Option<UtcTimestamp> {
        self.last_used
    }

    /// Set or clear the last-used timestamp.
    pub fn set_last_used(&mut self, last_used: Option<UtcTimestamp>) {
        self.last_used = last_used;
    }

    /// Mark the package as used now.
    pub fn touch(&mut self) {
        self.last_used = Some(UtcTimestamp::now());
    }

    /// Convert to the persisted JSON object.
    pub fn to_dict(&self) -> Result<Value, MetadataError> {
        serde_json::to_value(self).map_err(|e| MetadataError::SerializeError(e.to_string()))
    }

    /// Rebuild from a persisted JSON object.
    ///
    /// Every key is optional. Absent revisions load as the default revision.
    pub fn loads(data: &Value) -> Result<Self, MetadataError> {
        Self::deserialize(data).map_err(|e| MetadataError::ParseError(format!("package: {}", e)))
    }
}
