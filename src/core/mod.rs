//! core
//!
//! Domain types and the metadata schema.
//!
//! # Modules
//!
//! - [`types`] - Strong types: UtcTimestamp, Revision
//! - [`metadata`] - Recipe and binary package metadata
//!
//! # Design Principles
//!
//! - Loading tolerates what older writers left behind
//! - Serialization is deterministic

pub mod metadata;
pub mod types;
