// src/stats.rs
//! Derived availability statistics. A pure function of one [`LedgerEntry`];
//! nothing here is persisted.
//!
//! The timeline is `transitions` followed by the current status at
//! `last_checked_at`. Each adjacent pair is a closed segment whose duration is
//! credited to the earlier point's status. The trailing current status is an
//! open segment and contributes nothing.

use chrono::NaiveDateTime;

use crate::config::consts::{NEVER, NO_SAMPLE};
use crate::core::Stamp;
use crate::core::time::hours_between;
use crate::ledger::LedgerEntry;
use crate::model::Status;

#[derive(Clone, Debug, PartialEq)]
pub struct Statistics {
    pub transition_count: usize,
    /// `None` when no closed ON segment exists.
    pub mean_on_hours: Option<f64>,
    /// `None` when no closed OFF segment exists. Disappeared counts as OFF.
    pub mean_off_hours: Option<f64>,
    pub pct_time_on: f64,
    pub last_transition_at: Option<Stamp>,
}

impl Statistics {
    pub fn mean_on_label(&self) -> String {
        hours_label(self.mean_on_hours)
    }

    pub fn mean_off_label(&self) -> String {
        hours_label(self.mean_off_hours)
    }

    pub fn pct_label(&self) -> String {
        format!("{:.2}", self.pct_time_on)
    }

    pub fn last_transition_label(&self) -> String {
        self.last_transition_at
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| s!(NEVER))
    }
}

fn hours_label(h: Option<f64>) -> String {
    match h {
        Some(h) => format!("{h:.2}"),
        None => s!(NO_SAMPLE),
    }
}

#[derive(Default)]
struct Bucket {
    total: f64,
    count: usize,
}

impl Bucket {
    fn add(&mut self, hours: f64) {
        self.total += hours;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total / self.count as f64)
    }
}

pub fn stats(entry: &LedgerEntry) -> Statistics {
    let fallback_pct = if entry.current_status.is_on() { 100.0 } else { 0.0 };

    if entry.transitions.is_empty() {
        return Statistics {
            transition_count: 0,
            mean_on_hours: None,
            mean_off_hours: None,
            pct_time_on: fallback_pct,
            last_transition_at: None,
        };
    }

    let points = timeline(entry);

    let mut on = Bucket::default();
    let mut off = Bucket::default();
    for pair in points.windows(2) {
        let (start, status) = pair[0];
        let (end, _) = pair[1];
        let hours = hours_between(start, end);
        if status.is_on() { on.add(hours) } else { off.add(hours) }
    }

    let total = on.total + off.total;
    let pct_time_on = if total > 0.0 { on.total / total * 100.0 } else { fallback_pct };

    Statistics {
        transition_count: entry.transitions.len(),
        mean_on_hours: on.mean(),
        mean_off_hours: off.mean(),
        pct_time_on,
        last_transition_at: entry.transitions.last().map(|t| t.timestamp.clone()),
    }
}

/// Parsed, chronologically sorted timeline. Points with a malformed stamp are
/// skipped and logged; they drop out of the duration sums.
fn timeline(entry: &LedgerEntry) -> Vec<(NaiveDateTime, Status)> {
    let trailing = (entry.current_status, &entry.last_checked_at);
    let mut points: Vec<(NaiveDateTime, Status)> = entry
        .transitions
        .iter()
        .map(|t| (t.status, &t.timestamp))
        .chain(std::iter::once(trailing))
        .filter_map(|(status, stamp)| match stamp.parse() {
            Ok(at) => Some((at, status)),
            Err(e) => {
                logw!("{} / {}: {e}; segment left out of statistics", entry.section, entry.name);
                None
            }
        })
        .collect();
    // stable: equal stamps keep append order
    points.sort_by_key(|(at, _)| *at);
    points
}
