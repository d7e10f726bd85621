//! # Temporal Values — ISO-8601 Canonical Strings
//!
//! Timestamp-like values have no JSON representation of their own. The
//! canonical form is an ISO-8601 string:
//!
//! - timezone-aware instants keep their offset: `2024-01-02T03:04:05+00:00`
//! - naive date-times carry no offset: `2024-01-02T03:04:05`
//! - dates are promoted to midnight: `2024-01-02T00:00:00`
//!
//! Sub-second digits are printed only when non-zero.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::error::CoreError;

/// A timestamp-like value awaiting canonicalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Temporal {
    /// An instant in UTC.
    Utc(DateTime<Utc>),
    /// An instant with an explicit offset.
    Offset(DateTime<FixedOffset>),
    /// A wall-clock date-time with no zone.
    Naive(NaiveDateTime),
    /// A calendar date.
    Date(NaiveDate),
}

impl Temporal {
    /// Render the canonical ISO-8601 string.
    pub fn to_iso8601(&self) -> String {
        match self {
            Temporal::Utc(dt) => dt
                .fixed_offset()
                .to_rfc3339_opts(SecondsFormat::AutoSi, false),
            Temporal::Offset(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            Temporal::Naive(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Temporal::Date(d) => d.format("%Y-%m-%dT00:00:00").to_string(),
        }
    }

    /// Parse an RFC 3339 string, keeping its offset.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        DateTime::parse_from_rfc3339(s)
            .map(Temporal::Offset)
            .map_err(|e| CoreError::Timestamp {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl From<DateTime<Utc>> for Temporal {
    fn from(dt: DateTime<Utc>) -> Self {
        Temporal::Utc(dt)
    }
}

impl From<DateTime<FixedOffset>> for Temporal {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Temporal::Offset(dt)
    }
}

impl From<NaiveDateTime> for Temporal {
    fn from(dt: NaiveDateTime) -> Self {
        Temporal::Naive(dt)
    }
}

impl From<NaiveDate> for Temporal {
    fn from(d: NaiveDate) -> Self {
        Temporal::Date(d)
    }
}
