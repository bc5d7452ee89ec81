//! core::metadata::package
//!
//! The per-reference metadata document: one recipe plus its binary packages.
//!
//! # Serialized Form
//!
//! ```json
//! {
//!   "recipe": { "revision": ..., "remote": ..., "properties": {...},
//!               "checksums": {...}, "last_used_utc": "..." },
//!   "packages": { "<package-id>": { "revision": ..., "recipe_revision": ...,
//!                                   ... } }
//! }
//! ```
//!
//! # Equality
//!
//! Two documents are equal when their comparison forms match. The comparison
//! form is the serialized document with every `last_used_utc` removed, so
//! merely using a package never makes its metadata "change".
//!
//! # Example
//!
//! ```
//! use pkgmeta::core::metadata::PackageMetadata;
//!
//! let mut meta = PackageMetadata::new();
//! meta.recipe.set_revision(Some("rev".into()));
//! meta.package_mut("ID").set_revision(Some("revp".into()));
//! meta.package_mut("ID").touch();
//!
//! let text = meta.dumps(false).unwrap();
//! let loaded = PackageMetadata::loads(&text).unwrap();
//! assert_eq!(meta, loaded);
//! assert_eq!(meta.last_used(), loaded.last_used());
//! ```

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde_json::Value;

use super::binary::BinaryPackageMetadata;
use super::recipe::RecipeMetadata;
use super::schema::{MetadataError, LAST_USED_KEY};
use crate::core::types::UtcTimestamp;

/// Metadata for a recipe revision and every binary package built from it.
#[derive(Debug, Clone, Default)]
pub struct PackageMetadata {
    /// The recipe entry
    pub recipe: RecipeMetadata,

    packages: IndexMap<String, BinaryPackageMetadata>,
}

impl PackageMetadata {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a serialized document.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::ParseError`] if the text is not JSON, if
    /// `recipe` or `packages` is missing, or if the recipe lacks `revision`
    /// or `properties`. Unreadable timestamps load as `None`.
    pub fn loads(content: &str) -> Result<Self, MetadataError> {
        let data: Value =
            serde_json::from_str(content).map_err(|e| MetadataError::ParseError(e.to_string()))?;

        let recipe = RecipeMetadata::loads(section(&data, "recipe")?)?;

        let entries = section(&data, "packages")?.as_object().ok_or_else(|| {
            MetadataError::ParseError("packages: expected a JSON object".to_string())
        })?;
        let mut packages = IndexMap::new();
        for (package_id, entry) in entries {
            packages.insert(package_id.clone(), BinaryPackageMetadata::loads(entry)?);
        }

        log::trace!("loaded metadata with {} package(s)", packages.len());
        Ok(Self { recipe, packages })
    }

    /// Serialize the document.
    ///
    /// With `for_comparison` set, every `last_used_utc` key is omitted; the
    /// result is the canonical form used by `==`.
    pub fn dumps(&self, for_comparison: bool) -> Result<String, MetadataError> {
        let mut recipe = self.recipe.to_dict()?;
        let mut packages = serde_json::Map::new();
        for (package_id, package) in &self.packages {
            packages.insert(package_id.clone(), package.to_dict()?);
        }

        if for_comparison {
            strip_last_used(&mut recipe);
            packages.values_mut().for_each(strip_last_used);
        }

        let mut doc = serde_json::Map::new();
        doc.insert("recipe".to_string(), recipe);
        doc.insert("packages".to_string(), Value::Object(packages));

        log::trace!(
            "serializing metadata with {} package(s), for_comparison={}",
            self.packages.len(),
            for_comparison
        );
        serde_json::to_string(&doc).map_err(|e| MetadataError::SerializeError(e.to_string()))
    }

    /// Shorthand for `dumps(true)`.
    pub fn dumps_for_comparison(&self) -> Result<String, MetadataError> {
        self.dumps(true)
    }

    /// Most recent use of the recipe or any of its packages.
    ///
    /// Returns `None` if *any* entry has never been used, even when others
    /// have timestamps. Eviction code treats such a document as having no
    /// usage record at all.
    pub fn last_used(&self) -> Option<UtcTimestamp> {
        std::iter::once(self.recipe.last_used())
            .chain(self.packages.values().map(BinaryPackageMetadata::last_used))
            .collect::<Option<Vec<_>>>()?
            .into_iter()
            .max()
    }

    /// Get the entry for a package, creating an empty one if absent.
    pub fn package_mut(&mut self, package_id: &str) -> &mut BinaryPackageMetadata {
        self.packages.entry(package_id.to_string()).or_default()
    }

    /// Get the entry for a package without creating it.
    pub fn package(&self, package_id: &str) -> Option<&BinaryPackageMetadata> {
        self.packages.get(package_id)
    }

    /// All package entries, keyed by package id.
    pub fn packages(&self) -> &IndexMap<String, BinaryPackageMetadata> {
        &self.packages
    }

    /// Package ids in insertion order, which is also serialization order.
    pub fn package_ids(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Reset to an empty document.
    pub fn clear(&mut self) {
        self.recipe = RecipeMetadata::new();
        self.packages.clear();
    }

    /// Remove a package entry. Absent ids are ignored.
    ///
    /// The remaining entries keep their order.
    pub fn clear_package(&mut self, package_id: &str) {
        if self.packages.shift_remove(package_id).is_some() {
            log::trace!("removed metadata for package {}", package_id);
        }
    }
}

fn section<'a>(data: &'a Value, key: &str) -> Result<&'a Value, MetadataError> {
    data.get(key)
        .ok_or_else(|| MetadataError::ParseError(format!("missing field `{}`", key)))
}

fn strip_last_used(entry: &mut Value) {
    if let Some(obj) = entry.as_object_mut() {
        obj.shift_remove(LAST_USED_KEY);
    }
}

impl PartialEq for PackageMetadata {
    fn eq(&self, other: &Self) -> bool {
        match (self.dumps_for_comparison(), other.dumps_for_comparison()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for PackageMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.dumps(false).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for PackageMetadata {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::loads(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Revision;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn ts(year: i32) -> UtcTimestamp {
        UtcTimestamp::from_datetime(
            Utc.with_ymd_and_hms(year, 1, 1, 0, 10, 23).unwrap()
                + chrono::Duration::microseconds(283_000),
        )
    }

    mod loads {
        use super::*;

        #[test]
        fn invalid_json() {
            let result = PackageMetadata::loads("{not json");
            assert!(matches!(result, Err(MetadataError::ParseError(_))));
        }

        #[test]
        fn missing_recipe() {
            let result = PackageMetadata::loads(r#"{"packages": {}}"#);
            assert!(matches!(result, Err(MetadataError::ParseError(msg)) if msg.contains("recipe")));
        }

        #[test]
        fn missing_packages() {
            let result =
                PackageMetadata::loads(r#"{"recipe": {"revision": "r", "properties": {}}}"#);
            assert!(
                matches!(result, Err(MetadataError::ParseError(msg)) if msg.contains("packages"))
            );
        }

        #[test]
        fn legacy_package_without_revisions() {
            let text = r#"{
                "recipe": {"revision": "rev", "properties": {}},
                "packages": {"ID": {"properties": {}}}
            }"#;
            let meta = PackageMetadata::loads(text).unwrap();
            let pkg = meta.package("ID").unwrap();
            assert!(pkg.revision().unwrap().is_default());
            assert!(pkg.recipe_revision().unwrap().is_default());
        }

        #[test]
        fn from_str() {
            let meta: PackageMetadata = r#"{"recipe": {"revision": null, "properties": {}}, "packages": {}}"#
                .parse()
                .unwrap();
            assert_eq!(meta.recipe.revision(), None);
            assert_eq!(meta.packages().len(), 0);
        }
    }

    mod dumps {
        use super::*;

        #[test]
        fn empty_document() {
            let text = PackageMetadata::new().dumps(false).unwrap();
            let value: Value = serde_json::from_str(&text).unwrap();
            assert_eq!(
                value,
                json!({
                    "recipe": {
                        "revision": null,
                        "remote": null,
                        "properties": {},
                        "checksums": {},
                        "last_used_utc": null
                    },
                    "packages": {}
                })
            );
        }

        #[test]
        fn timestamps_use_wire_format() {
            let mut meta = PackageMetadata::new();
            meta.recipe.set_last_used(Some(ts(2000)));
            let text = meta.dumps(false).unwrap();
            assert!(text.contains(r#""last_used_utc":"2000-01-01T00:10:23.283000""#));
        }

        #[test]
        fn comparison_form_has_no_last_used() {
            let mut meta = PackageMetadata::new();
            meta.recipe.set_last_used(Some(ts(2000)));
            meta.package_mut("ID").set_last_used(Some(ts(2020)));
            let text = meta.dumps_for_comparison().unwrap();
            assert!(!text.contains(LAST_USED_KEY));
            assert!(text.contains(r#""ID""#));
        }

        #[test]
        fn key_order_follows_fields_and_insertion() {
            let mut meta = PackageMetadata::new();
            meta.package_mut("b");
            meta.package_mut("a");
            let entry = r#"{"revision":null,"recipe_revision":null,"remote":null,"properties":{},"checksums":{},"last_used_utc":null}"#;
            let expected = format!(
                r#"{{"recipe":{{"revision":null,"remote":null,"properties":{{}},"checksums":{{}},"last_used_utc":null}},"packages":{{"b":{},"a":{}}}}}"#,
                entry, entry
            );
            assert_eq!(meta.dumps(false).unwrap(), expected);
        }

        #[test]
        fn comparison_form_key_order() {
            let mut meta = PackageMetadata::new();
            meta.recipe.set_revision(Some("rev".into()));
            meta.package_mut("ID").set_revision(Some("revp".into()));
            assert_eq!(
                meta.dumps_for_comparison().unwrap(),
                r#"{"recipe":{"revision":"rev","remote":null,"properties":{},"checksums":{}},"packages":{"ID":{"revision":"revp","recipe_revision":null,"remote":null,"properties":{},"checksums":{}}}}"#
            );
        }

        #[test]
        fn display_matches_dumps() {
            let mut meta = PackageMetadata::new();
            meta.package_mut("ID").touch();
            assert_eq!(meta.to_string(), meta.dumps(false).unwrap());
        }
    }

    mod last_used {
        use super::*;

        #[test]
        fn empty_document_is_none() {
            assert_eq!(PackageMetadata::new().last_used(), None);
        }

        #[test]
        fn recipe_only() {
            let mut meta = PackageMetadata::new();
            meta.recipe.set_last_used(Some(ts(2000)));
            assert_eq!(meta.last_used(), Some(ts(2000)));
        }

        #[test]
        fn max_of_all() {
            let mut meta = PackageMetadata::new();
            meta.recipe.set_last_used(Some(ts(2000)));
            meta.package_mut("A").set_last_used(Some(ts(2020)));
            meta.package_mut("B").set_last_used(Some(ts(2010)));
            assert_eq!(meta.last_used(), Some(ts(2020)));
        }

        #[test]
        fn any_unset_is_none() {
            let mut meta = PackageMetadata::new();
            meta.recipe.set_last_used(Some(ts(2000)));
            meta.package_mut("A").set_last_used(Some(ts(2020)));
            meta.package_mut("B");
            assert_eq!(meta.last_used(), None);
        }

        #[test]
        fn unset_recipe_is_none() {
            let mut meta = PackageMetadata::new();
            meta.package_mut("A").set_last_used(Some(ts(2020)));
            assert_eq!(meta.last_used(), None);
        }
    }

    mod packages {
        use super::*;

        #[test]
        fn package_mut_creates_entry() {
            let mut meta = PackageMetadata::new();
            assert!(meta.package("ID").is_none());
            meta.package_mut("ID").properties.insert("k".into(), json!("v"));
            assert_eq!(meta.package("ID").unwrap().properties["k"], json!("v"));
        }

        #[test]
        fn package_mut_reuses_entry() {
            let mut meta = PackageMetadata::new();
            meta.package_mut("ID").set_revision(Some("revp".into()));
            meta.package_mut("ID").remote = Some("remote1".into());
            let pkg = meta.package("ID").unwrap();
            assert_eq!(pkg.revision(), Some(&Revision::from("revp")));
            assert_eq!(pkg.remote.as_deref(), Some("remote1"));
            assert_eq!(meta.packages().len(), 1);
        }

        #[test]
        fn package_ids_keep_insertion_order() {
            let mut meta = PackageMetadata::new();
            meta.package_mut("b");
            meta.package_mut("a");
            assert_eq!(meta.package_ids().collect::<Vec<_>>(), ["b", "a"]);
        }

        #[test]
        fn clear_package_keeps_order_of_rest() {
            let mut meta = PackageMetadata::new();
            meta.package_mut("c");
            meta.package_mut("a");
            meta.package_mut("b");
            meta.clear_package("c");
            assert_eq!(meta.package_ids().collect::<Vec<_>>(), ["a", "b"]);
        }

        #[test]
        fn loads_keeps_document_order() {
            let text = r#"{
                "recipe": {"revision": "rev", "properties": {"z": 1, "a": 2}},
                "packages": {"zz": {}, "aa": {}, "mm": {}}
            }"#;
            let meta = PackageMetadata::loads(text).unwrap();
            assert_eq!(meta.package_ids().collect::<Vec<_>>(), ["zz", "aa", "mm"]);
            assert_eq!(
                meta.recipe.properties.keys().map(String::as_str).collect::<Vec<_>>(),
                ["z", "a"]
            );
        }

        #[test]
        fn clear_package_removes() {
            let mut meta = PackageMetadata::new();
            meta.package_mut("ID");
            meta.clear_package("ID");
            assert!(meta.package("ID").is_none());
        }

        #[test]
        fn clear_package_absent_is_noop() {
            let mut meta = PackageMetadata::new();
            meta.package_mut("ID");
            meta.clear_package("other");
            assert_eq!(meta.packages().len(), 1);
        }

        #[test]
        fn clear_resets_everything() {
            let mut meta = PackageMetadata::new();
            meta.recipe.set_revision(Some("rev".into()));
            meta.recipe.remote = Some("remote1".into());
            meta.package_mut("ID");
            meta.clear();
            assert_eq!(meta, PackageMetadata::new());
            assert_eq!(meta.recipe.remote, None);
            assert!(meta.packages().is_empty());
        }
    }

    mod equality {
        use super::*;

        #[test]
        fn ignores_last_used() {
            let mut a = PackageMetadata::new();
            a.recipe.set_revision(Some("rev".into()));
            a.package_mut("ID").set_last_used(Some(ts(2000)));
            let mut b = a.clone();
            b.recipe.set_last_used(Some(ts(2020)));
            b.package_mut("ID").set_last_used(None);
            assert_eq!(a, b);
        }

        #[test]
        fn insertion_order_matters() {
            let mut a = PackageMetadata::new();
            a.package_mut("x");
            a.package_mut("y");
            let mut b = PackageMetadata::new();
            b.package_mut("y");
            b.package_mut("x");
            assert_ne!(a, b);
        }

        #[test]
        fn same_insertion_order_is_equal() {
            let mut a = PackageMetadata::new();
            a.package_mut("x");
            a.package_mut("y");
            let mut b = PackageMetadata::new();
            b.package_mut("x");
            b.package_mut("y");
            assert_eq!(a, b);
        }

        #[test]
        fn detects_checksum_change() {
            let mut a = PackageMetadata::new();
            a.recipe
                .checksums
                .entry("conanfile.py".into())
                .or_default()
                .insert("md5".into(), "aa".into());
            let mut b = a.clone();
            b.recipe.checksums.get_mut("conanfile.py").unwrap().insert("md5".into(), "bb".into());
            assert_ne!(a, b);
        }
    }
}
