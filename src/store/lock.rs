// src/store/lock.rs
//! Runs must not overlap: the merge has no protection against two writers.
//! An exclusive advisory lock on a file in the work directory enforces that
//! for every run started from the same machine and directory.

use std::fs::File;
use std::path::{Path, PathBuf};

use fd_lock::{RwLock, RwLockWriteGuard};

use crate::config::consts::LOCK_FILE;
use crate::error::LockError;
use crate::file::ensure_directory;

pub struct RunLock {
    lock_file: RwLock<File>,
    lock_path: PathBuf,
}

impl RunLock {
    pub fn new(work_dir: &Path) -> Result<Self, LockError> {
        let lock_path = work_dir.join(LOCK_FILE);
        let open_err = |source| LockError::Open { path: lock_path.display().to_string(), source };
        ensure_directory(work_dir).map_err(open_err)?;
        let file = File::create(&lock_path).map_err(open_err)?;
        Ok(Self { lock_file: RwLock::new(file), lock_path })
    }

    /// Non-blocking: fails immediately while another run holds the lock.
    pub fn acquire(&mut self) -> Result<RwLockWriteGuard<'_, File>, LockError> {
        let path = self.lock_path.display().to_string();
        self.lock_file.try_write().map_err(|_| LockError::Busy { path })
    }

    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_holder_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = RunLock::new(dir.path()).unwrap();
        let mut second = RunLock::new(dir.path()).unwrap();

        let guard = first.acquire().unwrap();
        assert!(matches!(second.acquire(), Err(LockError::Busy { .. })));
        drop(guard);
        assert!(second.acquire().is_ok());
        assert!(first.path().ends_with(LOCK_FILE));
    }
}
