// src/ledger.rs
//! Durable per-item status history.
//!
//! A transition is appended only when an item's status is about to change,
//! and it records the state being superseded (status, price and the time it
//! was last confirmed). The entry's current fields then roll forward to the
//! new observation. Reading `transitions` followed by the current status as
//! an open trailing segment gives the full timeline.
//!
//! Entries are never removed. Price changes alone are not transitions.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::options::RetentionPolicy;
use crate::core::Stamp;
use crate::delta::Disappeared;
use crate::model::{ItemKey, Observation, Status, decode_or_skip};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub status: Status,
    #[serde(rename = "preco", default)]
    pub price: String,
    pub timestamp: Stamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EntryDoc")]
pub struct LedgerEntry {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "secao")]
    pub section: String,
    #[serde(rename = "status_atual")]
    pub current_status: Status,
    #[serde(rename = "preco_atual", default)]
    pub current_price: String,
    #[serde(rename = "ultima_verificacao")]
    pub last_checked_at: Stamp,
    /// Append-only, chronological.
    #[serde(rename = "historico", default)]
    pub transitions: Vec<Transition>,
}

/// Stored entry as read back. History items are decoded one by one so a
/// bad item costs only itself.
#[derive(Deserialize)]
struct EntryDoc {
    #[serde(rename = "nome")]
    name: String,
    #[serde(rename = "secao")]
    section: String,
    #[serde(rename = "status_atual")]
    current_status: Status,
    #[serde(rename = "preco_atual", default)]
    current_price: String,
    #[serde(rename = "ultima_verificacao")]
    last_checked_at: Stamp,
    #[serde(rename = "historico", default)]
    transitions: Vec<Value>,
}

impl From<EntryDoc> for LedgerEntry {
    fn from(doc: EntryDoc) -> Self {
        let transitions = doc
            .transitions
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| {
                decode_or_skip(item, &format!("{} / {}: history item #{i}", doc.section, doc.name))
            })
            .collect();
        Self {
            name: doc.name,
            section: doc.section,
            current_status: doc.current_status,
            current_price: doc.current_price,
            last_checked_at: doc.last_checked_at,
            transitions,
        }
    }
}

impl LedgerEntry {
    fn fresh(key: &ItemKey, status: Status, price: &str, now: &Stamp) -> Self {
        Self {
            name: key.name.clone(),
            section: key.section.clone(),
            current_status: status,
            current_price: s!(price),
            last_checked_at: now.clone(),
            transitions: Vec::new(),
        }
    }

    /// Push the superseded state, then switch. No-op if `next` is current.
    fn roll_to(&mut self, next: Status) -> bool {
        if self.current_status == next {
            return false;
        }
        self.transitions.push(Transition {
            status: self.current_status,
            price: self.current_price.clone(),
            timestamp: self.last_checked_at.clone(),
        });
        self.current_status = next;
        true
    }
}

/// One status change applied by a merge. `from == None` is a new item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    pub key: ItemKey,
    pub from: Option<Status>,
    pub to: Status,
    pub price: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ledger(BTreeMap<ItemKey, LedgerEntry>);

/// The document must be an object; entries that do not decode are logged
/// and dropped.
impl<'de> Deserialize<'de> for Ledger {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<ItemKey, Value>::deserialize(d)?;
        let entries = raw
            .into_iter()
            .filter_map(|(key, v)| {
                let entry = decode_or_skip(v, &format!("ledger entry `{key}`"))?;
                Some((key, entry))
            })
            .collect();
        Ok(Ledger(entries))
    }
}

impl Ledger {
    pub fn get(&self, key: &ItemKey) -> Option<&LedgerEntry> {
        self.0.get(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ItemKey, LedgerEntry> {
        self.0.iter()
    }

    pub fn entries(&self) -> btree_map::Values<'_, ItemKey, LedgerEntry> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total transitions across all entries.
    pub fn transition_count(&self) -> usize {
        self.0.values().map(|e| e.transitions.len()).sum()
    }
}

/// Fold this run's observations and disappearances into the ledger.
///
/// Items in neither list are left untouched. Calling it again with the same
/// arguments changes nothing and returns no changes.
pub fn merge(
    ledger: &mut Ledger,
    current: &[Observation],
    disappeared: &[Disappeared],
    now: &Stamp,
) -> Vec<Change> {
    let mut changes = Vec::new();

    for o in current {
        let next = Status::from(o.status);
        match ledger.0.get_mut(&o.key) {
            None => {
                ledger.0.insert(o.key.clone(), LedgerEntry::fresh(&o.key, next, &o.price, now));
                changes.push(Change { key: o.key.clone(), from: None, to: next, price: o.price.clone() });
            }
            Some(entry) => {
                let prev = entry.current_status;
                if entry.roll_to(next) {
                    changes.push(Change { key: o.key.clone(), from: Some(prev), to: next, price: o.price.clone() });
                }
                entry.current_price = o.price.clone();
                entry.last_checked_at = now.clone();
            }
        }
    }

    for d in disappeared {
        match ledger.0.get_mut(&d.key) {
            None => {
                let entry = LedgerEntry::fresh(&d.key, Status::Disappeared, &d.last_price, now);
                ledger.0.insert(d.key.clone(), entry);
                changes.push(Change {
                    key: d.key.clone(),
                    from: None,
                    to: Status::Disappeared,
                    price: d.last_price.clone(),
                });
            }
            Some(entry) => {
                let prev = entry.current_status;
                if entry.roll_to(Status::Disappeared) {
                    changes.push(Change {
                        key: d.key.clone(),
                        from: Some(prev),
                        to: Status::Disappeared,
                        price: entry.current_price.clone(),
                    });
                }
                entry.last_checked_at = now.clone();
            }
        }
    }

    logd!("merged {} observations, {} disappeared, {} changes", current.len(), disappeared.len(), changes.len());
    changes
}

/// Drop the oldest transitions beyond the policy. Returns how many went.
pub fn apply_retention(ledger: &mut Ledger, policy: RetentionPolicy) -> usize {
    let keep = match policy {
        RetentionPolicy::Unbounded => return 0,
        RetentionPolicy::KeepLast(n) => n,
    };
    let mut dropped = 0;
    for entry in ledger.0.values_mut() {
        let excess = entry.transitions.len().saturating_sub(keep);
        if excess > 0 {
            entry.transitions.drain(..excess);
            dropped += excess;
        }
    }
    if dropped > 0 {
        logf!("retention: dropped {dropped} old transitions (keeping last {keep} per item)");
    }
    dropped
}
