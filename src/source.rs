// src/source.rs
//! Boundary with the extraction layer.
//!
//! The page itself is rendered by a browser driver outside this crate; what
//! reaches us is its output: a JSON array of raw item records. Anything that
//! is not such an array means the extraction failed and the run has no
//! authoritative listing.

use std::io::Read;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::SourceError;
use crate::normalize::RawRecord;

pub trait ObservationSource {
    /// Short name for logs and failure messages.
    fn describe(&self) -> String;

    fn collect(&mut self) -> Result<Vec<RawRecord>, SourceError>;
}

/// Reads the driver's output from a file, or stdin when the path is `-`.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_stdin(&self) -> bool {
        self.path.as_os_str() == "-"
    }
}

impl ObservationSource for JsonFileSource {
    fn describe(&self) -> String {
        if self.is_stdin() { s!("stdin") } else { self.path.display().to_string() }
    }

    fn collect(&mut self) -> Result<Vec<RawRecord>, SourceError> {
        let read_err = |source| SourceError::Read { path: self.describe(), source };
        let text = if self.is_stdin() {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).map_err(read_err)?;
            buf
        } else {
            std::fs::read_to_string(&self.path).map_err(read_err)?
        };
        parse_records(&text)
    }
}

/// Parse the driver's JSON. Array elements that are not objects are skipped
/// and logged; an empty array is a failed extraction.
pub fn parse_records(text: &str) -> Result<Vec<RawRecord>, SourceError> {
    let items = match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => items,
        Value::Object(_) => return Err(SourceError::NotAnArray("an object")),
        Value::Null => return Err(SourceError::NotAnArray("null")),
        _ => return Err(SourceError::NotAnArray("a scalar")),
    };
    if items.is_empty() {
        return Err(SourceError::Empty);
    }

    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            logw!("scrape record #{i} skipped: not an object");
            continue;
        }
        match serde_json::from_value::<RawRecord>(item) {
            Ok(rec) => out.push(rec),
            Err(e) => logw!("scrape record #{i} skipped: {e}"),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_of_records() {
        let recs = parse_records(
            r#"[{"section":"Pratos","name":"Moqueca","price":"R$ 10","status":"ON"}, 7]"#,
        )
        .unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].name, Some(Value::from("Moqueca")));
        assert_eq!(recs[0].description, None);
    }

    #[test]
    fn structural_failures() {
        assert!(matches!(parse_records("{}"), Err(SourceError::NotAnArray(_))));
        assert!(matches!(parse_records("[]"), Err(SourceError::Empty)));
        assert!(matches!(parse_records("<html>"), Err(SourceError::Json(_))));
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("scrape.json");
        std::fs::write(&p, r#"[{"secao":"Doces","nome":"Pudim","status":true}]"#).unwrap();
        let mut src = JsonFileSource::new(&p);
        assert_eq!(src.collect().unwrap().len(), 1);

        let mut missing = JsonFileSource::new(dir.path().join("nope.json"));
        assert!(matches!(missing.collect(), Err(SourceError::Read { .. })));
    }
}
