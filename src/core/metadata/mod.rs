//! core::metadata
//!
//! Cache metadata for a recipe revision and its binary packages.
//!
//! # Modules
//!
//! - [`schema`] - Shared schema pieces and errors
//! - [`recipe`] - Recipe entry
//! - [`binary`] - Binary package entry
//! - [`package`] - The document holding both, with (de)serialization
//!
//! # Architecture
//!
//! This module only converts between in-memory metadata and its JSON text.
//! Reading and writing the text, and locking around it, belong to the
//! cache layout that owns the files.
//!
//! # Example
//!
//! ```
//! use pkgmeta::core::metadata::PackageMetadata;
//!
//! let mut meta = PackageMetadata::new();
//! meta.recipe.set_revision(Some("rev".into()));
//! meta.package_mut("ID").set_recipe_revision(Some("rev".into()));
//!
//! let text = meta.dumps(false).unwrap();
//! let parsed = PackageMetadata::loads(&text).unwrap();
//! assert_eq!(meta, parsed);
//! ```

pub mod binary;
pub mod package;
pub mod recipe;
pub mod schema;

// Re-export commonly used types
pub use binary::BinaryPackageMetadata;
pub use package::PackageMetadata;
pub use recipe::RecipeMetadata;
pub use schema::{Checksums, MetadataError, Properties, LAST_USED_KEY};
