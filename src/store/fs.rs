// src/store/fs.rs
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use super::Store;
use crate::error::StoreError;
use crate::file::replace_file;

/// JSON documents as plain files under one directory.
#[derive(Clone, Debug)]
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl Store for FsStore {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    fn load_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { key: key.to_string(), source }),
        }
    }

    fn save_raw(&self, key: &str, text: &str) -> Result<(), StoreError> {
        replace_file(&self.path(key), text)
            .map_err(|source| StoreError::Io { key: key.to_string(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        assert_eq!(store.load_raw("nada.json").unwrap(), None);
    }

    #[test]
    fn creates_directory_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path().join("deep").join("store"));
        store.save_raw("a.json", "{}").unwrap();
        assert_eq!(store.load_raw("a.json").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn unreadable_path_is_transient() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where a file is expected
        fs::create_dir(dir.path().join("k.json")).unwrap();
        let err = FsStore::new(dir.path()).load_raw("k.json").unwrap_err();
        assert!(err.is_transient());
    }
}
