// src/file.rs

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::config::options::ExportOptions;
use crate::csv::write_table;
use crate::report::Table;

/// Write one table to the path implied by `export`. Returns the final path.
pub fn write_export(export: &ExportOptions, table: &Table) -> io::Result<PathBuf> {
    let path = export.out_path();
    write_table_to_path(&path, table, export.format.delim())?;
    Ok(path)
}

/// Create parent directories, truncate, write.
pub fn write_table_to_path(path: &Path, table: &Table, sep: char) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    let mut out = BufWriter::new(fs::File::create(path)?);
    write_table(&mut out, table, sep)?;
    out.flush()
}

pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", dir.display()),
        ));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

/// Write `text` next to `path` and rename over it, so readers never see a
/// half-written document.
pub fn replace_file(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_directory_refuses_files() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("plain");
        fs::write(&f, "x").unwrap();
        assert!(ensure_directory(&f).is_err());
        assert!(ensure_directory(&dir.path().join("a/b")).is_ok());
        assert!(dir.path().join("a/b").is_dir());
    }

    #[test]
    fn replace_file_overwrites_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("nested").join("doc.json");
        replace_file(&p, "{}").unwrap();
        replace_file(&p, "{\"a\":1}").unwrap();
        assert_eq!(fs::read_to_string(&p).unwrap(), "{\"a\":1}");
        assert!(!dir.path().join("nested").join("doc.json.tmp").exists());
    }
}
