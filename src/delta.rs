// src/delta.rs
//! Current scrape vs. previous snapshot.
//!
//! Disappearance means "absent from the current scrape" and nothing else: an
//! item still listed as OFF is present, not disappeared.

use std::collections::HashSet;

use crate::core::Stamp;
use crate::model::{ItemKey, Observation};
use crate::snapshot::Snapshot;

/// Last known facts of an item that is no longer listed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disappeared {
    pub key: ItemKey,
    pub last_price: String,
    pub last_description: String,
    pub last_seen_at: Stamp,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Delta {
    pub current: Vec<Observation>,
    /// Listed now, not in the previous snapshot. On the first run, everything.
    pub appeared: Vec<ItemKey>,
    /// In the previous snapshot, not listed now. Order follows `previous`
    /// and carries no meaning.
    pub disappeared: Vec<Disappeared>,
}

pub fn detect(current: Vec<Observation>, previous: &Snapshot) -> Delta {
    let present: HashSet<&ItemKey> = current.iter().map(|o| &o.key).collect();

    let disappeared = previous
        .iter()
        .filter(|(key, _)| !present.contains(key))
        .map(|(key, rec)| Disappeared {
            key: key.clone(),
            last_price: rec.price.clone(),
            last_description: rec.description.clone(),
            last_seen_at: rec.checked_at.clone(),
        })
        .collect();

    let appeared = current
        .iter()
        .filter(|o| !previous.contains(&o.key))
        .map(|o| o.key.clone())
        .collect();

    Delta { current, appeared, disappeared }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Availability::*;

    fn snap(items: &[(&str, &str, &str)]) -> Snapshot {
        let obs: Vec<Observation> = items
            .iter()
            .map(|(sec, name, price)| Observation::new(sec, name, price, "desc", On))
            .collect();
        Snapshot::from_observations(&obs, &Stamp::from("2024-05-01 10:00:00"))
    }

    fn keys(d: &[Disappeared]) -> HashSet<String> {
        d.iter().map(|x| x.key.to_string()).collect()
    }

    #[test]
    fn bootstrap_has_no_disappeared() {
        let current = vec![
            Observation::new("Pratos", "Moqueca", "R$ 10", "", On),
            Observation::new("Pratos", "Bobó", "R$ 10", "", Off),
        ];
        let d = detect(current, &Snapshot::default());
        assert!(d.disappeared.is_empty());
        assert_eq!(d.appeared.len(), 2);
        assert_eq!(d.current.len(), 2);
    }

    #[test]
    fn absent_items_carry_previous_facts() {
        let previous = snap(&[("Pratos", "Moqueca", "R$ 10"), ("Pratos", "Bobó", "R$ 20"), ("Doces", "Pudim", "R$ 5")]);
        let current = vec![Observation::new("Pratos", "Moqueca", "R$ 11", "", On)];

        let d = detect(current, &previous);
        let expected: HashSet<String> = ["Pratos|Bobó", "Doces|Pudim"].iter().map(|s| s.to_string()).collect();
        assert_eq!(keys(&d.disappeared), expected);

        let bobo = d.disappeared.iter().find(|x| x.key.name == "Bobó").unwrap();
        assert_eq!(bobo.last_price, "R$ 20");
        assert_eq!(bobo.last_description, "desc");
        assert_eq!(bobo.last_seen_at.as_str(), "2024-05-01 10:00:00");
        assert!(d.appeared.is_empty());
    }

    #[test]
    fn off_but_listed_is_not_disappeared() {
        let previous = snap(&[("Pratos", "Moqueca", "R$ 10")]);
        let current = vec![Observation::new("Pratos", "Moqueca", "R$ 10", "", Off)];
        let d = detect(current, &previous);
        assert!(d.disappeared.is_empty());
    }

    #[test]
    fn new_items_are_appeared() {
        let previous = snap(&[("Pratos", "Moqueca", "R$ 10")]);
        let current = vec![
            Observation::new("Pratos", "Moqueca", "R$ 10", "", On),
            Observation::new("Doces", "Pudim", "R$ 5", "", On),
        ];
        let d = detect(current, &previous);
        assert_eq!(d.appeared, vec![ItemKey::new("Doces", "Pudim")]);
    }
}
