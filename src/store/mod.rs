// src/store/mod.rs
//! Persistence of the snapshot and the ledger.
//!
//! The core only needs load-by-key and save-by-key on JSON text. The rules
//! that make a run best-effort live in [`load`] and [`save_logged`]:
//! - absent key ⇒ empty default,
//! - transient failure (I/O, network) ⇒ empty default, flagged as degraded,
//! - a stored document with the wrong shape ⇒ error (the run must not
//!   silently replace durable history it could not read),
//! - save failure ⇒ logged, reported as `false`, never fatal.

use serde::{Serialize, de::DeserializeOwned};

use crate::config::options::StoreOptions;
use crate::error::StoreError;

mod fs;
mod github;
mod lock;

pub use fs::FsStore;
pub use github::GithubStore;
pub use lock::RunLock;

pub trait Store {
    /// Human-readable location for logs.
    fn describe(&self) -> String;

    /// `Ok(None)` when nothing is stored under `key`.
    fn load_raw(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn save_raw(&self, key: &str, text: &str) -> Result<(), StoreError>;
}

/// A loaded value and whether it is a stand-in for data that could not be read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Loaded<T> {
    pub value: T,
    pub degraded: bool,
}

pub fn open(opts: &StoreOptions) -> Box<dyn Store> {
    match opts {
        StoreOptions::Local { dir } => Box::new(FsStore::new(dir)),
        StoreOptions::Github(gh) => Box::new(GithubStore::new(gh.clone())),
    }
}

pub fn load<T>(store: &dyn Store, key: &str) -> Result<Loaded<T>, StoreError>
where
    T: DeserializeOwned + Default,
{
    match store.load_raw(key) {
        Ok(None) => {
            logf!("{key}: nothing stored in {}, starting empty", store.describe());
            Ok(Loaded { value: T::default(), degraded: false })
        }
        Ok(Some(text)) if text.trim().is_empty() => {
            logw!("{key}: stored document is empty, starting empty");
            Ok(Loaded { value: T::default(), degraded: false })
        }
        Ok(Some(text)) => {
            let value = serde_json::from_str(&text)
                .map_err(|source| StoreError::Decode { key: key.to_string(), source })?;
            Ok(Loaded { value, degraded: false })
        }
        Err(e) if e.is_transient() => {
            loge!("{key}: load failed, continuing with empty data: {e}");
            Ok(Loaded { value: T::default(), degraded: true })
        }
        Err(e) => Err(e),
    }
}

/// Serialize and save. Failures are logged; returns whether the save landed.
pub fn save_logged<T: Serialize>(store: &dyn Store, key: &str, value: &T) -> bool {
    let text = match serde_json::to_string_pretty(value) {
        Ok(t) => t,
        Err(source) => {
            loge!("{}", StoreError::Encode { key: key.to_string(), source });
            return false;
        }
    };
    match store.save_raw(key, &text) {
        Ok(()) => {
            logd!("{key}: saved to {}", store.describe());
            true
        }
        Err(e) => {
            loge!("{key}: save failed, keeping in-memory state for this run: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    use crate::ledger::Ledger;

    /// In-memory store with switchable failures.
    #[derive(Default)]
    struct MemStore {
        docs: RefCell<HashMap<String, String>>,
        fail_io: bool,
    }

    impl Store for MemStore {
        fn describe(&self) -> String {
            s!("memory")
        }
        fn load_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
            if self.fail_io {
                return Err(StoreError::Http { key: key.into(), message: "503".into() });
            }
            Ok(self.docs.borrow().get(key).cloned())
        }
        fn save_raw(&self, key: &str, text: &str) -> Result<(), StoreError> {
            if self.fail_io {
                return Err(StoreError::Http { key: key.into(), message: "503".into() });
            }
            self.docs.borrow_mut().insert(key.into(), text.into());
            Ok(())
        }
    }

    #[test]
    fn absent_is_empty_and_not_degraded() {
        let store = MemStore::default();
        let got: Loaded<Ledger> = load(&store, "k").unwrap();
        assert!(got.value.is_empty());
        assert!(!got.degraded);
    }

    #[test]
    fn transient_failure_degrades_to_default() {
        let store = MemStore { fail_io: true, ..MemStore::default() };
        let got: Loaded<Ledger> = load(&store, "k").unwrap();
        assert!(got.value.is_empty());
        assert!(got.degraded);
        assert!(!save_logged(&store, "k", &got.value));
    }

    #[test]
    fn wrong_shape_is_an_error() {
        let store = MemStore::default();
        store.docs.borrow_mut().insert("k".into(), "[1, 2, 3]".into());
        let got: Result<Loaded<Ledger>, _> = load(&store, "k");
        assert!(matches!(got, Err(StoreError::Decode { .. })));
    }

    #[test]
    fn save_then_load() {
        let store = MemStore::default();
        let mut m: HashMap<String, u32> = HashMap::new();
        m.insert("a".into(), 1);
        assert!(save_logged(&store, "k", &m));
        let got: Loaded<HashMap<String, u32>> = load(&store, "k").unwrap();
        assert_eq!(got.value, m);
    }
}
