// src/core/time.rs
//! Wall-clock stamps as the persisted documents carry them.
//!
//! A [`Stamp`] is the literal `YYYY-MM-DD HH:MM:SS` text at a fixed UTC-3
//! offset. It is kept as text and parsed on demand so that one malformed
//! record costs only its own duration contribution, not the whole document.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::consts::{DISPLAY_FORMAT, STAMP_FORMAT, UTC_OFFSET_HOURS};
use crate::error::RecordError;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stamp(String);

impl Stamp {
    /// Current time in the fixed local offset.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    pub fn from_utc(t: DateTime<Utc>) -> Self {
        Self::from_local(t.naive_utc() + Duration::hours(UTC_OFFSET_HOURS))
    }

    /// `t` is already local (UTC-3) wall-clock time.
    pub fn from_local(t: NaiveDateTime) -> Self {
        Self(t.format(STAMP_FORMAT).to_string())
    }

    pub fn parse(&self) -> Result<NaiveDateTime, RecordError> {
        NaiveDateTime::parse_from_str(&self.0, STAMP_FORMAT)
            .map_err(|_| RecordError::MalformedTimestamp(self.0.clone()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `dd/mm/YYYY HH:MM:SS` for chat messages; raw text if unparseable.
    pub fn display_br(&self) -> String {
        match self.parse() {
            Ok(t) => t.format(DISPLAY_FORMAT).to_string(),
            Err(_) => self.0.clone(),
        }
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Stamp {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Stamp {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Signed hours from `a` to `b`.
pub fn hours_between(a: NaiveDateTime, b: NaiveDateTime) -> f64 {
    (b - a).num_milliseconds() as f64 / 3_600_000.0
}
