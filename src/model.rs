// src/model.rs
//! Catalog identity and availability.
//!
//! An item is identified by `(section, name)`. On disk the key is the single
//! string `"<section>|<name>"`; everywhere else it is an [`ItemKey`].

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RecordError;

pub const KEY_SEP: char = '|';

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ItemKey {
    pub section: String,
    pub name: String,
}

impl ItemKey {
    pub fn new(section: impl Into<String>, name: impl Into<String>) -> Self {
        Self { section: section.into(), name: name.into() }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.section, KEY_SEP, self.name)
    }
}

/// Splits on the first separator; a key without one is a bare name.
impl From<String> for ItemKey {
    fn from(s: String) -> Self {
        match s.split_once(KEY_SEP) {
            Some((section, name)) => Self::new(section, name),
            None => Self::new(s!(), s),
        }
    }
}

impl From<ItemKey> for String {
    fn from(k: ItemKey) -> Self {
        k.to_string()
    }
}

/// What the scraper can observe for an item that is listed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
}

/// Ledger status. `Disappeared` counts as OFF in every aggregate but keeps its
/// own identity for transitions and display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
    #[serde(rename = "OFF (Desapareceu)", alias = "OFF_DISAPPEARED")]
    Disappeared,
}

impl Status {
    pub fn is_on(self) -> bool {
        self == Status::On
    }

    /// Both plain OFF and disappeared.
    pub fn is_off(self) -> bool {
        !self.is_on()
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::On => "ON",
            Status::Off => "OFF",
            Status::Disappeared => "OFF (Desapareceu)",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Availability> for Status {
    fn from(a: Availability) -> Self {
        match a {
            Availability::On => Status::On,
            Availability::Off => Status::Off,
        }
    }
}

/// One normalized scrape result. Never persisted directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Observation {
    pub key: ItemKey,
    pub price: String,
    pub description: String,
    pub status: Availability,
}

impl Observation {
    pub fn new(
        section: &str,
        name: &str,
        price: &str,
        description: &str,
        status: Availability,
    ) -> Self {
        Self {
            key: ItemKey::new(section, name),
            price: s!(price),
            description: s!(description),
            status,
        }
    }
}

/// Decode one stored record. A record that does not fit is logged with `what`
/// and dropped; the rest of the document still loads.
pub(crate) fn decode_or_skip<T: DeserializeOwned>(value: Value, what: &str) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            logw!("{what} skipped: {}", RecordError::Malformed(e.to_string()));
            None
        }
    }
}
