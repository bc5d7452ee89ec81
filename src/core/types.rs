//! core::types
//!
//! Strong types for cache metadata values.
//!
//! # Types
//!
//! - [`UtcTimestamp`] - UTC instant with microsecond precision
//! - [`Revision`] - Opaque revision identifier
//!
//! # Wire Format
//!
//! Timestamps are persisted as naive UTC strings in the fixed
//! [`TIMESTAMP_FORMAT`] (`YYYY-MM-DDTHH:MM:SS.ffffff`), with no offset suffix.
//!
//! # Examples
//!
//! ```
//! use pkgmeta::core::types::{Revision, UtcTimestamp, DEFAULT_REVISION};
//!
//! let ts = UtcTimestamp::parse("2020-01-01T00:10:23.283000").unwrap();
//! assert_eq!(ts.to_string(), "2020-01-01T00:10:23.283000");
//!
//! let rev = Revision::from(DEFAULT_REVISION);
//! assert!(rev.is_default());
//! ```

use std::fmt;

use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Revision stored when a binary package revision is unknown.
///
/// Metadata written before revisions existed carries no revision at all;
/// such entries load with this value.
pub const DEFAULT_REVISION: &str = "0";

/// strftime pattern used when writing timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

// Stored timestamps always carry a fraction of 1 to 6 digits.
const MAX_FRACTION_DIGITS: usize = 6;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

/// A UTC timestamp truncated to microsecond precision.
///
/// Truncation happens on construction, so a timestamp compares equal to
/// itself after a trip through the wire format.
///
/// # Example
///
/// ```
/// use pkgmeta::core::types::UtcTimestamp;
///
/// let now = UtcTimestamp::now();
/// let parsed = UtcTimestamp::parse(&now.to_string()).unwrap();
/// assert_eq!(now, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcTimestamp(DateTime<Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Create a timestamp from a chrono DateTime.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(6))
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse a timestamp in the wire format.
    ///
    /// The fractional seconds are mandatory and may have 1 to 6 digits.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let invalid = |reason: String| TypeError::InvalidTimestamp {
            value: s.to_string(),
            reason,
        };

        let fraction = s
            .rsplit_once('.')
            .map(|(_, fraction)| fraction)
            .ok_or_else(|| invalid("missing fractional seconds".to_string()))?;
        if fraction.is_empty()
            || fraction.len() > MAX_FRACTION_DIGITS
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid(format!(
                "expected 1 to {} fractional digits, found '{}'",
                MAX_FRACTION_DIGITS, fraction
            )));
        }

        NaiveDateTime::parse_from_str(s, TIMESTAMP_PARSE_FORMAT)
            .map(|naive| Self::from_datetime(Utc.from_utc_datetime(&naive)))
            .map_err(|e| invalid(e.to_string()))
    }

    /// Interpret an arbitrary JSON value as a timestamp.
    ///
    /// Anything other than a well-formed timestamp string yields `None`.
    pub fn parse_lenient(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => match Self::parse(s) {
                Ok(ts) => Some(ts),
                Err(e) => {
                    log::debug!("dropping unreadable timestamp: {}", e);
                    None
                }
            },
            other => {
                log::debug!("dropping non-string timestamp: {}", other);
                None
            }
        }
    }

    /// Format in the wire format.
    pub fn format(&self) -> String {
        self.0.format(TIMESTAMP_FORMAT).to_string()
    }
}

impl From<DateTime<Utc>> for UtcTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

impl fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

impl Serialize for UtcTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format())
    }
}

impl<'de> Deserialize<'de> for UtcTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// An opaque revision identifier.
///
/// Revisions are usually hash strings, but persisted metadata may hold any
/// JSON value here and it must survive a round trip untouched.
///
/// # Example
///
/// ```
/// use pkgmeta::core::types::Revision;
/// use serde_json::json;
///
/// let rev = Revision::from("f3a1c9");
/// assert_eq!(rev.as_str(), Some("f3a1c9"));
///
/// let odd = Revision::from(json!({"23": 45}));
/// assert_eq!(odd.as_str(), None);
/// assert_eq!(odd.to_string(), r#"{"23":45}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(Value);

impl Revision {
    /// The placeholder revision, see [`DEFAULT_REVISION`].
    pub fn default_revision() -> Self {
        Self::from(DEFAULT_REVISION)
    }

    /// Get the revision as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    /// Get the raw JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Check whether this is the placeholder revision.
    pub fn is_default(&self) -> bool {
        self.as_str() == Some(DEFAULT_REVISION)
    }

    pub(crate) fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl From<&str> for Revision {
    fn from(s: &str) -> Self {
        Self(Value::String(s.to_string()))
    }
}

impl From<String> for Revision {
    fn from(s: String) -> Self {
        Self(Value::String(s))
    }
}

impl From<i64> for Revision {
    fn from(n: i64) -> Self {
        Self(Value::from(n))
    }
}

impl From<Value> for Revision {
    fn from(v: Value) -> Self {
        Self(v)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}
