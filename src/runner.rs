// src/runner.rs
use std::path::PathBuf;

use crate::config::consts::{LEDGER_KEY, SNAPSHOT_KEY};
use crate::config::options::AppOptions;
use crate::core::Stamp;
use crate::delta::detect;
use crate::error::{SourceError, StoreError};
use crate::file::write_export;
use crate::ledger::{Ledger, apply_retention, merge};
use crate::normalize::normalize;
use crate::notify::{Notifier, format_alert, format_failure};
use crate::progress::Progress;
use crate::report::history_table;
use crate::snapshot::Snapshot;
use crate::source::ObservationSource;
use crate::store::{self, Loaded, Store};
use crate::summary::Summary;

const STAGES: usize = 6;

/// What a completed run produced and which side effects landed.
#[derive(Debug)]
pub struct RunReport {
    pub summary: Summary,
    /// Keys listed for the first time against the previous snapshot.
    pub appeared: usize,
    pub report: Option<PathBuf>,
    pub ledger_saved: bool,
    pub snapshot_saved: bool,
    pub message_sent: bool,
    pub document_sent: bool,
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunReport),
    /// Nothing was loaded, merged or saved; a failure notice was attempted.
    Failed { reason: String },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }
}

fn stage(progress: &mut Option<&mut dyn Progress>, name: &str) {
    logd!("stage: {name}");
    if let Some(p) = progress.as_deref_mut() {
        p.stage(name);
    }
}

fn note(progress: &mut Option<&mut dyn Progress>, msg: &str) {
    if let Some(p) = progress.as_deref_mut() {
        p.log(msg);
    }
}

/// One monitoring run: collect, diff, fold into history, persist, report.
///
/// Every run ends in either a summary notification or a failure
/// notification. Persistence and delivery problems are logged and reflected
/// in the [`RunReport`] flags; only an unusable scrape or an unreadable stored
/// document fails the run.
pub fn run(
    opts: &AppOptions,
    source: &mut dyn ObservationSource,
    store: &dyn Store,
    notifier: &dyn Notifier,
    now: Stamp,
    mut progress: Option<&mut dyn Progress>,
) -> RunOutcome {
    if let Some(p) = progress.as_deref_mut() {
        p.begin(STAGES);
    }
    let outcome = run_stages(opts, source, store, notifier, &now, &mut progress);
    if let RunOutcome::Failed { reason } = &outcome {
        loge!("run failed: {reason}");
        send_logged("failure notice", notifier.send_message(&format_failure(reason, &now)));
    }
    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    outcome
}

fn run_stages(
    opts: &AppOptions,
    source: &mut dyn ObservationSource,
    store: &dyn Store,
    notifier: &dyn Notifier,
    now: &Stamp,
    progress: &mut Option<&mut dyn Progress>,
) -> RunOutcome {
    // ---------- collect ----------
    stage(progress, "collect");
    let raw = match source.collect() {
        Ok(raw) => raw,
        Err(e) => return RunOutcome::Failed { reason: format!("{}: {e}", source.describe()) },
    };
    let current = normalize(raw);
    if current.is_empty() {
        return RunOutcome::Failed { reason: format!("{}: {}", source.describe(), SourceError::Empty) };
    }
    logf!("collected {} items from {}", current.len(), source.describe());
    note(progress, &format!("{} items", current.len()));

    // ---------- load ----------
    stage(progress, "load");
    let previous: Loaded<Snapshot> = match store::load(store, SNAPSHOT_KEY) {
        Ok(l) => l,
        Err(e) => return stored_unreadable(e),
    };
    let loaded_ledger: Loaded<Ledger> = match store::load(store, LEDGER_KEY) {
        Ok(l) => l,
        Err(e) => return stored_unreadable(e),
    };
    let mut ledger = loaded_ledger.value;

    // ---------- merge ----------
    stage(progress, "merge");
    let snapshot = Snapshot::from_observations(&current, now);
    let delta = detect(current, &previous.value);
    logf!(
        "{} listed, {} appeared, {} disappeared",
        delta.current.len(),
        delta.appeared.len(),
        delta.disappeared.len()
    );
    let changes = merge(&mut ledger, &delta.current, &delta.disappeared, now);
    apply_retention(&mut ledger, opts.retention);

    // ---------- save ----------
    stage(progress, "save");
    let ledger_saved = if loaded_ledger.degraded {
        logw!("ledger was not readable this run; leaving the stored copy untouched");
        false
    } else {
        store::save_logged(store, LEDGER_KEY, &ledger)
    };
    // the stored snapshot stays the diff baseline until it can be read
    let snapshot_saved = if previous.degraded {
        logw!("snapshot was not readable this run; keeping the stored copy for the next diff");
        false
    } else {
        store::save_logged(store, SNAPSHOT_KEY, &snapshot)
    };

    // ---------- report ----------
    stage(progress, "report");
    let summary = Summary::build(&ledger, changes);
    let report = match write_export(&opts.export, &history_table(&ledger)) {
        Ok(path) => {
            logf!("history report written to {}", path.display());
            Some(path)
        }
        Err(e) => {
            loge!("history report could not be written: {e}");
            None
        }
    };

    // ---------- notify ----------
    stage(progress, "notify");
    let text = format_alert(&summary, now, opts.notify.dashboard_url.as_deref());
    let message_sent = send_logged("alert", notifier.send_message(&text));
    let document_sent = match &report {
        Some(path) => {
            let caption = format!("Histórico de produtos - {}", now.display_br());
            send_logged("history report", notifier.send_document(path, &caption))
        }
        None => false,
    };

    RunOutcome::Completed(RunReport {
        summary,
        appeared: delta.appeared.len(),
        report,
        ledger_saved,
        snapshot_saved,
        message_sent,
        document_sent,
    })
}

fn stored_unreadable(e: StoreError) -> RunOutcome {
    RunOutcome::Failed { reason: e.to_string() }
}

fn send_logged<E: std::fmt::Display>(what: &str, res: Result<(), E>) -> bool {
    match res {
        Ok(()) => true,
        Err(e) => {
            logw!("{what} not delivered: {e}");
            false
        }
    }
}

/// Persisted ledger for the read-only commands. A stand-in empty ledger is
/// returned (and logged) when the store cannot be reached.
pub fn load_ledger(store: &dyn Store) -> Result<Ledger, StoreError> {
    let loaded: Loaded<Ledger> = store::load(store, LEDGER_KEY)?;
    if loaded.degraded {
        logw!("showing an empty ledger: {} could not be reached", store.describe());
    }
    Ok(loaded.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::path::Path;

    use crate::error::NotifyError;
    use crate::model::{ItemKey, Status};
    use crate::normalize::RawRecord;

    struct VecSource(Result<Vec<RawRecord>, ()>);

    impl ObservationSource for VecSource {
        fn describe(&self) -> String {
            s!("test")
        }
        fn collect(&mut self) -> Result<Vec<RawRecord>, SourceError> {
            self.0.clone().map_err(|_| SourceError::Empty)
        }
    }

    /// In-memory store; `snapshot_outages` makes that many snapshot reads
    /// fail with a transient error.
    #[derive(Default)]
    struct MemStore {
        docs: RefCell<HashMap<String, String>>,
        snapshot_outages: Cell<usize>,
    }

    impl Store for MemStore {
        fn describe(&self) -> String {
            s!("memory")
        }
        fn load_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
            if key == SNAPSHOT_KEY && self.snapshot_outages.get() > 0 {
                self.snapshot_outages.set(self.snapshot_outages.get() - 1);
                return Err(StoreError::Http { key: key.into(), message: s!("503 Service Unavailable") });
            }
            Ok(self.docs.borrow().get(key).cloned())
        }
        fn save_raw(&self, key: &str, text: &str) -> Result<(), StoreError> {
            self.docs.borrow_mut().insert(key.into(), text.into());
            Ok(())
        }
    }

    #[derive(Default)]
    struct Inbox(RefCell<Vec<String>>);

    impl Notifier for Inbox {
        fn send_message(&self, text: &str) -> Result<(), NotifyError> {
            self.0.borrow_mut().push(text.to_string());
            Ok(())
        }
        fn send_document(&self, _path: &Path, _caption: &str) -> Result<(), NotifyError> {
            Err(NotifyError::Http(s!("413")))
        }
    }

    #[derive(Default)]
    struct Stages(Vec<String>, bool);

    impl Progress for Stages {
        fn stage(&mut self, name: &str) {
            self.0.push(name.to_string());
        }
        fn finish(&mut self) {
            self.1 = true;
        }
    }

    fn opts(dir: &Path) -> AppOptions {
        let mut o = AppOptions::default();
        o.export.set_dir(dir);
        o
    }

    #[test]
    fn completed_run_walks_every_stage() {
        let dir = tempfile::tempdir().unwrap();
        let mut src = VecSource(Ok(vec![RawRecord::new("Pratos", "Moqueca", "R$ 50", "", "ON")]));
        let store = MemStore::default();
        let inbox = Inbox::default();
        let mut stages = Stages::default();

        let out = run(&opts(dir.path()), &mut src, &store, &inbox, Stamp::from("2024-05-01 10:00:00"), Some(&mut stages as &mut dyn Progress));

        let RunOutcome::Completed(rep) = out else { panic!("run failed") };
        assert_eq!(rep.appeared, 1);
        assert!(rep.ledger_saved && rep.snapshot_saved && rep.message_sent);
        // document delivery failed, which only clears its own flag
        assert!(!rep.document_sent);
        assert!(rep.report.unwrap().exists());
        assert_eq!(stages.0, ["collect", "load", "merge", "save", "report", "notify"]);
        assert!(stages.1);
        assert_eq!(inbox.0.borrow().len(), 1);
    }

    #[test]
    fn failed_collect_sends_failure_and_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut src = VecSource(Err(()));
        let store = MemStore::default();
        let inbox = Inbox::default();

        let out = run(&opts(dir.path()), &mut src, &store, &inbox, Stamp::from("2024-05-01 10:00:00"), None);

        assert!(!out.is_completed());
        assert!(store.docs.borrow().is_empty());
        assert!(inbox.0.borrow()[0].contains("FALHA"));
    }

    #[test]
    fn unreadable_ledger_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut src = VecSource(Ok(vec![RawRecord::new("Pratos", "Moqueca", "R$ 50", "", "ON")]));
        let store = MemStore::default();
        store.docs.borrow_mut().insert(s!(LEDGER_KEY), s!("[\"not\", \"a\", \"map\"]"));
        let inbox = Inbox::default();

        let out = run(&opts(dir.path()), &mut src, &store, &inbox, Stamp::from("2024-05-01 10:00:00"), None);

        assert!(matches!(out, RunOutcome::Failed { .. }));
        assert_eq!(store.docs.borrow()[LEDGER_KEY], "[\"not\", \"a\", \"map\"]");
        assert!(!store.docs.borrow().contains_key(SNAPSHOT_KEY));
    }

    #[test]
    fn blind_snapshot_read_keeps_the_stored_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemStore::default();
        let inbox = Inbox::default();
        let moqueca = RawRecord::new("Pratos", "Moqueca", "R$ 50", "", "ON");
        let bobo = RawRecord::new("Pratos", "Bobó", "R$ 40", "", "ON");

        let mut src = VecSource(Ok(vec![moqueca.clone(), bobo]));
        let out = run(&opts(dir.path()), &mut src, &store, &inbox, Stamp::from("2024-05-01 10:00:00"), None);
        assert!(out.is_completed());

        // the snapshot read fails while Bobó is already gone
        store.snapshot_outages.set(1);
        let mut src = VecSource(Ok(vec![moqueca.clone()]));
        let out = run(&opts(dir.path()), &mut src, &store, &inbox, Stamp::from("2024-05-01 11:00:00"), None);
        let RunOutcome::Completed(rep) = out else { panic!("run failed") };
        assert!(rep.ledger_saved);
        assert!(!rep.snapshot_saved);

        let mut src = VecSource(Ok(vec![moqueca]));
        let out = run(&opts(dir.path()), &mut src, &store, &inbox, Stamp::from("2024-05-01 12:00:00"), None);
        assert!(out.is_completed());

        let ledger = load_ledger(&store).unwrap();
        let bobo = ledger.get(&ItemKey::new("Pratos", "Bobó")).unwrap();
        assert_eq!(bobo.current_status, Status::Disappeared);
        assert_eq!(bobo.last_checked_at, Stamp::from("2024-05-01 12:00:00"));
    }
}
