//! Durable key-value storage for board records.
//!
//! The board lives under a single well-known key. `put` is an upsert.

use crate::error::StorageError;
use board_core::document::BoardRecord;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

pub trait RecordStore {
    fn get(&self, key: &str) -> Result<Option<BoardRecord>, StorageError>;
    fn put(&mut self, key: &str, record: &BoardRecord) -> Result<(), StorageError>;
}

// ─── In-memory ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MemoryInner {
    records: HashMap<String, String>,
    writes: usize,
}

/// Records kept as JSON text in memory. Clones share the same storage, so a
/// test can keep a handle after moving one into the synchronizer.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed raw JSON, bypassing serialization.
    pub fn insert_raw(&self, key: &str, json: impl Into<String>) {
        self.inner
            .borrow_mut()
            .records
            .insert(key.to_string(), json.into());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().records.get(key).cloned()
    }

    /// Number of successful `put` calls.
    pub fn writes(&self) -> usize {
        self.inner.borrow().writes
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, key: &str) -> Result<Option<BoardRecord>, StorageError> {
        let inner = self.inner.borrow();
        match inner.records.get(key) {
            Some(text) => Ok(Some(serde_json::from_str(text)?)),
            None => Ok(None),
        }
    }

    fn put(&mut self, key: &str, record: &BoardRecord) -> Result<(), StorageError> {
        let text = serde_json::to_string(record)?;
        let mut inner = self.inner.borrow_mut();
        inner.records.insert(key.to_string(), text);
        inner.writes += 1;
        Ok(())
    }
}

// ─── File system ─────────────────────────────────────────────────────────

/// One `<key>.json` file per record inside `dir`.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl RecordStore for FileRecordStore {
    fn get(&self, key: &str) -> Result<Option<BoardRecord>, StorageError> {
        let text = match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn put(&mut self, key: &str, record: &BoardRecord) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        let text = serde_json::to_string_pretty(record)?;
        // Write-then-rename: readers never observe a partial record.
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, self.path_for(key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn memory_store_upserts() {
        let mut store = MemoryRecordStore::new();
        assert!(store.get("default").unwrap().is_none());
        let mut rec = BoardRecord::default();
        store.put("default", &rec).unwrap();
        rec.title = "Second".into();
        store.put("default", &rec).unwrap();
        assert_eq!(store.get("default").unwrap().unwrap().title, "Second");
        assert_eq!(store.writes(), 2);
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("board-records-{}", std::process::id()));
        let mut store = FileRecordStore::new(&dir);
        assert!(store.get("missing").unwrap().is_none());
        let rec = BoardRecord {
            title: "On disk".into(),
            ..Default::default()
        };
        store.put("default", &rec).unwrap();
        assert_eq!(store.get("default").unwrap(), Some(rec));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_record_is_an_error() {
        let store = MemoryRecordStore::new();
        store.insert_raw("default", "{not json");
        assert!(matches!(store.get("default"), Err(StorageError::Serde(_))));
    }
}
