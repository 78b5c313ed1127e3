// src/snapshot.rs
//! "The world as last scraped". Replaced wholesale at the end of every run.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::Stamp;
use crate::model::{ItemKey, Observation, Status, decode_or_skip};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    #[serde(rename = "Preço", default)]
    pub price: String,
    #[serde(rename = "Descrição", default)]
    pub description: String,
    #[serde(rename = "Status")]
    pub status: Status,
    #[serde(rename = "Última verificação")]
    pub checked_at: Stamp,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<ItemKey, SnapshotRecord>);

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<ItemKey, Value>::deserialize(d)?;
        let records = raw
            .into_iter()
            .filter_map(|(key, v)| {
                let rec = decode_or_skip(v, &format!("snapshot record `{key}`"))?;
                Some((key, rec))
            })
            .collect();
        Ok(Snapshot(records))
    }
}

impl Snapshot {
    /// The replacement snapshot for this run. Later duplicates overwrite
    /// earlier ones.
    pub fn from_observations(current: &[Observation], now: &Stamp) -> Self {
        let map = current
            .iter()
            .map(|o| {
                let rec = SnapshotRecord {
                    price: o.price.clone(),
                    description: o.description.clone(),
                    status: o.status.into(),
                    checked_at: now.clone(),
                };
                (o.key.clone(), rec)
            })
            .collect();
        Self(map)
    }

    pub fn get(&self, key: &ItemKey) -> Option<&SnapshotRecord> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemKey, &SnapshotRecord)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
