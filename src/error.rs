// src/error.rs
//! Error types, one per boundary.
//!
//! `RecordError` is never propagated out of the core: whoever meets one skips
//! the offending record and logs it. The others surface to the runner, which
//! decides whether the run degrades or fails.

use std::io;

use thiserror::Error;

/// A single bad record: raw observation or persisted history entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("unrecognized status `{0}`")]
    BadStatus(String),

    #[error("malformed timestamp `{0}`")]
    MalformedTimestamp(String),

    /// A stored entry or history item that does not decode.
    #[error("malformed stored record: {0}")]
    Malformed(String),
}

/// The extraction collaborator could not produce an authoritative listing.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not read scrape output {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("scrape output is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("scrape output must be a JSON array of records, got {0}")]
    NotAnArray(&'static str),

    #[error("scrape produced no usable items")]
    Empty,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O on `{key}`: {source}")]
    Io { key: String, source: io::Error },

    #[error("remote store request for `{key}` failed: {message}")]
    Http { key: String, message: String },

    /// The stored document exists but has the wrong top-level shape.
    #[error("stored `{key}` could not be decoded: {source}")]
    Decode { key: String, source: serde_json::Error },

    #[error("could not encode `{key}`: {source}")]
    Encode { key: String, source: serde_json::Error },
}

impl StoreError {
    /// Transient failures degrade to defaults; decode failures do not.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Io { .. } | StoreError::Http { .. })
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Http(String),

    #[error("could not read attachment {path}: {source}")]
    Attachment { path: String, source: io::Error },
}

#[derive(Debug, Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open { path: String, source: io::Error },

    #[error("another run holds {path}; runs must not overlap")]
    Busy { path: String },
}
