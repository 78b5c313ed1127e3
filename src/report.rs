// src/report.rs
//! Tabular views of the ledger for the spreadsheet-style report.
//!
//! Rows come out in key order (section, then name). Numbers are rounded to
//! two places here and nowhere else.

use crate::ledger::Ledger;
use crate::stats::stats;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|h| s!(*h)).collect()
}

/// Current state of every known item.
pub fn status_table(ledger: &Ledger) -> Table {
    let rows = ledger
        .entries()
        .map(|e| {
            vec![
                e.section.clone(),
                e.name.clone(),
                e.current_status.label().to_string(),
                e.current_price.clone(),
                e.last_checked_at.to_string(),
            ]
        })
        .collect();

    Table {
        headers: headers(&["Seção", "Produto", "Status", "Preço", "Última verificação"]),
        rows,
    }
}

/// Per-item history statistics.
pub fn history_table(ledger: &Ledger) -> Table {
    let rows = ledger
        .entries()
        .map(|e| {
            let st = stats(e);
            vec![
                e.section.clone(),
                e.name.clone(),
                e.current_status.label().to_string(),
                e.current_price.clone(),
                st.transition_count.to_string(),
                st.mean_on_label(),
                st.mean_off_label(),
                st.pct_label(),
                st.last_transition_label(),
            ]
        })
        .collect();

    Table {
        headers: headers(&[
            "Seção",
            "Produto",
            "Status atual",
            "Preço atual",
            "Mudanças de status",
            "Tempo médio ON (h)",
            "Tempo médio OFF (h)",
            "% do tempo ON",
            "Última mudança",
        ]),
        rows,
    }
}

/// Lines for the `stats` command: one per item, optionally one section only.
pub fn stats_lines(ledger: &Ledger, section: Option<&str>) -> Vec<String> {
    ledger
        .entries()
        .filter(|e| section.is_none_or(|s| e.section == s))
        .map(|e| {
            let st = stats(e);
            format!(
                "{} / {} [{}] mudanças={} ON={}h OFF={}h %ON={} última={}",
                e.section,
                e.name,
                e.current_status,
                st.transition_count,
                st.mean_on_label(),
                st.mean_off_label(),
                st.pct_label(),
                st.last_transition_label(),
            )
        })
        .collect()
}
