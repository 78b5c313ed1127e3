// benches/ledger.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};

use menu_watch::{
    core::Stamp,
    delta::detect,
    ledger::{Ledger, merge},
    model::{Availability, Observation},
    report::history_table,
    snapshot::Snapshot,
    stats::stats,
};

const SECTIONS: usize = 12;
const ITEMS_PER_SECTION: usize = 40;
const RUNS: usize = 96;

/// One scrape: every item listed, status flipping on a per-item rhythm.
fn scrape(run: usize) -> Vec<Observation> {
    let mut out = Vec::with_capacity(SECTIONS * ITEMS_PER_SECTION);
    for s in 0..SECTIONS {
        for i in 0..ITEMS_PER_SECTION {
            let on = (run / (i % 7 + 1)) % 2 == 0;
            let status = if on { Availability::On } else { Availability::Off };
            out.push(Observation::new(&format!("Seção {s}"), &format!("Item {i}"), "R$ 10", "", status));
        }
    }
    // a few items drop off the listing every other run
    if run % 2 == 1 {
        out.retain(|o| !o.key.name.ends_with('3'));
    }
    out
}

fn stamp(run: usize) -> Stamp {
    Stamp::from(format!("2024-05-{:02} {:02}:00:00", run / 24 + 1, run % 24))
}

/// Ledger after `RUNS` quarter-daily runs.
fn synthetic_ledger() -> Ledger {
    let mut ledger = Ledger::default();
    let mut snapshot = Snapshot::default();
    for run in 0..RUNS {
        let now = stamp(run);
        let delta = detect(scrape(run), &snapshot);
        merge(&mut ledger, &delta.current, &delta.disappeared, &now);
        snapshot = Snapshot::from_observations(&delta.current, &now);
    }
    ledger
}

fn bench_ledger(c: &mut Criterion) {
    let ledger = synthetic_ledger();
    let next = scrape(RUNS);
    let now = stamp(RUNS);

    c.bench_function("merge_one_run", |b| {
        b.iter(|| {
            let mut l = ledger.clone();
            let changes = merge(&mut l, black_box(&next), &[], &now);
            black_box(changes.len())
        })
    });

    c.bench_function("stats_all_items", |b| {
        b.iter(|| {
            let total: f64 = ledger.entries().map(|e| stats(black_box(e)).pct_time_on).sum();
            black_box(total)
        })
    });

    c.bench_function("history_table", |b| {
        b.iter(|| black_box(history_table(black_box(&ledger)).rows.len()))
    });
}

criterion_group!(benches, bench_ledger);
criterion_main!(benches);
