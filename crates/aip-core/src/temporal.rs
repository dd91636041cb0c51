//! # Temporal Types — UTC Millisecond Timestamps
//!
//! Defines `Timestamp`, a UTC-only timestamp truncated to millisecond
//! precision, rendered as ISO-8601 with a trailing `Z`
//! (`YYYY-MM-DDTHH:MM:SS.mmmZ`).
//!
//! ## Invariant
//!
//! The chain hash, signed payload, and Merkle leaf all bind the *rendered*
//! timestamp string. `Timestamp` exists only at the clock boundary: once a
//! checkpoint is issued, its timestamp travels as the exact string that was
//! signed and is never re-rendered (a foreign certificate may legitimately
//! carry a different precision).

use chrono::{DateTime, Timelike, Utc};

use crate::error::EncodingError;

/// A UTC timestamp truncated to millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to milliseconds.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Wrap a `chrono::DateTime<Utc>`, truncating sub-millisecond precision.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        let nanos = dt.nanosecond() / 1_000_000 * 1_000_000;
        Self(dt.with_nanosecond(nanos).unwrap_or(dt))
    }

    /// Parse an ISO-8601 timestamp, converting any offset to UTC.
    pub fn parse(s: &str) -> Result<Self, EncodingError> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| EncodingError::InvalidTimestamp(format!("{s}: {e}")))?;
        Ok(Self::from_utc(dt.with_timezone(&Utc)))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as ISO-8601 UTC with millisecond precision and trailing `Z`,
    /// e.g. `2025-01-15T10:00:00.000Z`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl serde::Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> serde::Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
