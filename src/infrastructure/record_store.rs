use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::domain::error::{AppError, Result};
use crate::domain::submission::Submission;
use crate::infrastructure::storage::{read_if_exists, write_file};

/// Whole-document JSON persistence of the submission log.
///
/// Every mutation is a full read followed by a full rewrite. The internal lock
/// only serializes writers inside this process; another process writing the
/// same file still races (last writer wins).
pub struct JsonRecordStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<Submission>> {
        let Some(content) = read_if_exists(&self.path).map_err(|err| {
            AppError::IoError(format!(
                "Failed to read {}: {}",
                self.path.display(),
                err
            ))
        })?
        else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&content).map_err(|err| {
            AppError::ParseError(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                err
            ))
        })
    }

    pub fn save(&self, records: &[Submission]) -> Result<()> {
        let serialized = to_pretty_json(records)?;
        write_file(&self.path, &serialized).map_err(|err| {
            AppError::IoError(format!(
                "Failed to save {}: {}",
                self.path.display(),
                err
            ))
        })
    }

    pub fn append(&self, name: String, manitto: String) -> Result<Submission> {
        let _guard = self.lock();
        let mut records = self.load()?;
        let record = Submission::new(name, manitto);
        records.push(record.clone());
        self.save(&records)?;

        info!(total = records.len(), "Submission appended");
        Ok(record)
    }

    /// Overwrites the `name` of the record at `idx`. `manitto` and `time` are left alone.
    pub fn update_name(&self, idx: usize, new_name: String) -> Result<Submission> {
        let _guard = self.lock();
        let mut records = self.load()?;
        let record = records.get_mut(idx).ok_or_else(|| not_found(idx))?;
        record.name = new_name;
        let updated = record.clone();
        self.save(&records)?;
        Ok(updated)
    }

    pub fn remove(&self, idx: usize) -> Result<Submission> {
        let _guard = self.lock();
        let mut records = self.load()?;
        if idx >= records.len() {
            return Err(not_found(idx));
        }
        let removed = records.remove(idx);
        self.save(&records)?;
        Ok(removed)
    }

    pub fn get(&self, idx: usize) -> Result<Submission> {
        self.load()?.into_iter().nth(idx).ok_or_else(|| not_found(idx))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // A poisoned guard protects no data, so recover it.
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn not_found(idx: usize) -> AppError {
    AppError::NotFound(format!("No submission at index {}", idx))
}

/// Four-space indented JSON with non-ASCII text written as-is.
fn to_pretty_json(records: &[Submission]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    records.serialize(&mut serializer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::submission::TIME_FORMAT;
    use chrono::NaiveDateTime;
    use std::fs;

    fn store_in(dir: &tempfile::TempDir) -> JsonRecordStore {
        JsonRecordStore::new(dir.path().join("result.json"))
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().unwrap().is_empty());
    }

    #[test]
    fn test_appends_keep_submission_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append("Alice".into(), "Bob".into()).unwrap();
        store.append("Carol".into(), "Dave".into()).unwrap();
        store.append("A".into(), "Eve".into()).unwrap();

        let records = store.load().unwrap();
        let pairs: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.name.as_str(), r.manitto.as_str()))
            .collect();
        assert_eq!(pairs, vec![("Alice", "Bob"), ("Carol", "Dave"), ("A", "Eve")]);
        for record in &records {
            assert!(NaiveDateTime::parse_from_str(&record.time, TIME_FORMAT).is_ok());
        }
    }

    #[test]
    fn test_document_is_indented_utf8_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append("철수".into(), "영희".into()).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("[\n    {\n        \"name\": \"철수\""));
        assert!(raw.contains("\"manitto\": \"영희\""));
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(AppError::ParseError(_))));
        assert!(store.append("Alice".into(), "Bob".into()).is_err());
    }

    #[test]
    fn test_update_name_touches_only_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append("Alice".into(), "Bob".into()).unwrap();
        store.append("Carol".into(), "Dave".into()).unwrap();
        let before = store.load().unwrap();

        store.update_name(1, "Caroline".into()).unwrap();

        let after = store.load().unwrap();
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1].name, "Caroline");
        assert_eq!(after[1].manitto, before[1].manitto);
        assert_eq!(after[1].time, before[1].time);
    }

    #[test]
    fn test_remove_shifts_later_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        for name in ["a", "b", "c", "d"] {
            store.append(name.into(), "x".into()).unwrap();
        }

        let removed = store.remove(1).unwrap();
        assert_eq!(removed.name, "b");

        let names: Vec<String> = store.load().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_out_of_range_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.append("Alice".into(), "Bob".into()).unwrap();
        let before = fs::read(store.path()).unwrap();

        assert!(store.update_name(1, "Zed".into()).unwrap_err().is_not_found());
        assert!(store.remove(5).unwrap_err().is_not_found());
        assert!(store.get(1).unwrap_err().is_not_found());

        assert_eq!(fs::read(store.path()).unwrap(), before);
    }
}
