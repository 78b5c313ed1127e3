// src/normalize.rs
//! Raw scrape records → [`Observation`]s.
//!
//! The extraction layer hands over loosely shaped records. Anything without a
//! section and a name cannot be keyed, so it is dropped here with a warning;
//! the run carries on with the rest.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::core::sanitize::clean_text;
use crate::error::RecordError;
use crate::model::{Availability, ItemKey, KEY_SEP, Observation};

/// One record as the extraction layer produced it. Every field is optional
/// and may be a string, a number or (for the status) a boolean.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(default, alias = "secao", alias = "Seção")]
    pub section: Option<Value>,
    #[serde(default, alias = "nome", alias = "Produto")]
    pub name: Option<Value>,
    #[serde(default, alias = "preco", alias = "Preço")]
    pub price: Option<Value>,
    #[serde(default, alias = "descricao", alias = "Descrição")]
    pub description: Option<Value>,
    #[serde(default, alias = "Status")]
    pub status: Option<Value>,
}

impl RawRecord {
    pub fn new(section: &str, name: &str, price: &str, description: &str, status: &str) -> Self {
        Self {
            section: Some(Value::from(section)),
            name: Some(Value::from(name)),
            price: Some(Value::from(price)),
            description: Some(Value::from(description)),
            status: Some(Value::from(status)),
        }
    }
}

/// Normalize a batch. Skipped records are logged; duplicate keys keep the
/// position of their first occurrence and the content of the last.
pub fn normalize(records: impl IntoIterator<Item = RawRecord>) -> Vec<Observation> {
    let mut out: Vec<Observation> = Vec::new();
    let mut seen: HashMap<ItemKey, usize> = HashMap::new();

    for (i, rec) in records.into_iter().enumerate() {
        let obs = match observe(&rec) {
            Ok(obs) => obs,
            Err(e) => {
                logw!("scrape record #{i} skipped: {e}");
                continue;
            }
        };
        match seen.get(&obs.key) {
            Some(&at) => {
                logw!("scrape record #{i}: duplicate item `{}`, keeping the later one", obs.key);
                out[at] = obs;
            }
            None => {
                seen.insert(obs.key.clone(), out.len());
                out.push(obs);
            }
        }
    }
    out
}

/// Normalize one record.
pub fn observe(rec: &RawRecord) -> Result<Observation, RecordError> {
    let section = required(&rec.section, "section")?;
    let name = required(&rec.name, "name")?;
    let status = parse_status(rec.status.as_ref().ok_or(RecordError::MissingField("status"))?)?;

    // the key separator may not appear in the section part
    let section = section.replace(KEY_SEP, "/");

    Ok(Observation {
        key: ItemKey::new(section, name),
        price: text(&rec.price).unwrap_or_default(),
        description: text(&rec.description).unwrap_or_default(),
        status,
    })
}

fn required(v: &Option<Value>, field: &'static str) -> Result<String, RecordError> {
    text(v).filter(|s| !s.is_empty()).ok_or(RecordError::MissingField(field))
}

fn text(v: &Option<Value>) -> Option<String> {
    match v.as_ref()? {
        Value::String(s) => Some(clean_text(s)),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_status(v: &Value) -> Result<Availability, RecordError> {
    match v {
        Value::Bool(true) => Ok(Availability::On),
        Value::Bool(false) => Ok(Availability::Off),
        Value::String(s) => match s.trim().to_ascii_uppercase().as_str() {
            "ON" => Ok(Availability::On),
            "OFF" => Ok(Availability::Off),
            _ => Err(RecordError::BadStatus(s.clone())),
        },
        other => Err(RecordError::BadStatus(other.to_string())),
    }
}
