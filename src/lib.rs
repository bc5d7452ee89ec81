//! pkgmeta - Cache metadata for a package manager
//!
//! Each recipe reference in the local cache carries a small JSON document
//! describing the recipe revision and every binary package built from it:
//! revisions, free-form properties, per-file checksums, the remote it came
//! from, and when it was last used.
//!
//! # Architecture
//!
//! - [`core`] - Domain types and the metadata schema
//!
//! # Guarantees
//!
//! 1. A document survives `dumps` then `loads` unchanged
//! 2. Equality ignores usage timestamps
//! 3. A malformed timestamp never makes a document unreadable

pub mod core;

pub use crate::core::metadata::{
    BinaryPackageMetadata, MetadataError, PackageMetadata, RecipeMetadata,
};
pub use crate::core::types::{Revision, UtcTimestamp, DEFAULT_REVISION};
