// src/summary.rs
//! Run summary handed to the report and notification consumers.

use std::collections::BTreeMap;

use crate::ledger::{Change, Ledger};
use crate::model::Status;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemLine {
    pub section: String,
    pub name: String,
    pub price: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectionCounts {
    pub total: usize,
    pub on: usize,
    /// Includes disappeared.
    pub off: usize,
    pub disappeared: usize,
}

impl SectionCounts {
    fn count(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::On => self.on += 1,
            Status::Off => self.off += 1,
            Status::Disappeared => {
                self.off += 1;
                self.disappeared += 1;
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub totals: SectionCounts,
    /// Sorted by section name.
    pub sections: BTreeMap<String, SectionCounts>,
    /// Listed but marked OFF.
    pub off_items: Vec<ItemLine>,
    /// No longer listed at all.
    pub disappeared_items: Vec<ItemLine>,
    /// Status changes applied this run.
    pub changes: Vec<Change>,
}

impl Summary {
    /// Current state of every ledger entry plus this run's changes.
    pub fn build(ledger: &Ledger, changes: Vec<Change>) -> Self {
        let mut out = Summary { changes, ..Summary::default() };

        for entry in ledger.entries() {
            out.totals.count(entry.current_status);
            out.sections.entry(entry.section.clone()).or_default().count(entry.current_status);

            let line = || ItemLine {
                section: entry.section.clone(),
                name: entry.name.clone(),
                price: entry.current_price.clone(),
            };
            match entry.current_status {
                Status::On => {}
                Status::Off => out.off_items.push(line()),
                Status::Disappeared => out.disappeared_items.push(line()),
            }
        }
        out
    }

    /// Items currently listed and available.
    pub fn active(&self) -> usize {
        self.totals.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Stamp;
    use crate::delta::Disappeared;
    use crate::ledger::merge;
    use crate::model::Availability::*;
    use crate::model::{ItemKey, Observation};

    #[test]
    fn counts_by_status_and_section() {
        let mut ledger = Ledger::default();
        let now = Stamp::from("2024-05-01 10:00:00");
        let changes = merge(
            &mut ledger,
            &[
                Observation::new("Pratos", "Moqueca", "R$ 50", "", On),
                Observation::new("Pratos", "Bobó", "R$ 40", "", Off),
                Observation::new("Doces", "Pudim", "R$ 9", "", On),
            ],
            &[Disappeared {
                key: ItemKey::new("Pratos", "Acarajé"),
                last_price: s!("R$ 15"),
                last_description: s!(),
                last_seen_at: now.clone(),
            }],
            &now,
        );
        let sum = Summary::build(&ledger, changes);

        assert_eq!(sum.totals, SectionCounts { total: 4, on: 2, off: 2, disappeared: 1 });
        assert_eq!(sum.active(), 2);
        assert_eq!(sum.sections["Pratos"], SectionCounts { total: 3, on: 1, off: 2, disappeared: 1 });
        assert_eq!(sum.sections["Doces"], SectionCounts { total: 1, on: 1, off: 0, disappeared: 0 });
        assert_eq!(sum.sections.keys().collect::<Vec<_>>(), vec!["Doces", "Pratos"]);
        assert_eq!(sum.off_items.len(), 1);
        assert_eq!(sum.off_items[0].name, "Bobó");
        assert_eq!(sum.disappeared_items[0].name, "Acarajé");
        assert_eq!(sum.changes.len(), 4);
    }
}
