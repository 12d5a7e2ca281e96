//! Key/value persistence over `localStorage`, plus the dream journal kept in it.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{QuestError, QuestResult, describe_js};
use crate::recorder::RecordingRecord;

/// Local storage key holding the JSON array of recordings.
pub const RECORDINGS_KEY: &str = "dreamRecordings";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> QuestResult<()>;
    fn remove(&self, key: &str) -> QuestResult<()>;
}

/// Browser `window.localStorage`.
pub struct LocalStore {
    storage: web_sys::Storage,
}

impl LocalStore {
    pub fn open() -> QuestResult<Self> {
        let win = web_sys::window().ok_or(QuestError::NoWindow)?;
        let storage = win
            .local_storage()
            .map_err(|e| QuestError::Storage(describe_js(&e)))?
            .ok_or_else(|| QuestError::Storage("localStorage unavailable".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> QuestResult<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| QuestError::Storage(describe_js(&e)))
    }

    fn remove(&self, key: &str) -> QuestResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| QuestError::Storage(describe_js(&e)))
    }
}

/// In-memory store used by native tests.
#[derive(Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> QuestResult<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> QuestResult<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Saved recordings, mirrored to the store on every change.
pub struct JournalStore<S: KeyValueStore> {
    store: S,
    records: Vec<RecordingRecord>,
}

impl<S: KeyValueStore> JournalStore<S> {
    /// Load whatever is persisted. A missing key is an empty journal; a
    /// malformed one is logged and treated as empty.
    pub fn load(store: S) -> Self {
        let records = match store.get(RECORDINGS_KEY) {
            None => Vec::new(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                log::warn!("discarding unreadable {RECORDINGS_KEY}: {err}");
                Vec::new()
            }),
        };
        log::info!("journal loaded with {} recordings", records.len());
        Self { store, records }
    }

    pub fn records(&self) -> &[RecordingRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&RecordingRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn append(&mut self, record: RecordingRecord) -> QuestResult<()> {
        self.records.push(record);
        self.flush()
    }

    /// Remove by id; returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> QuestResult<bool> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return Ok(false);
        }
        self.flush()?;
        Ok(true)
    }

    fn flush(&self) -> QuestResult<()> {
        let raw = serde_json::to_string(&self.records)?;
        self.store.set(RECORDINGS_KEY, &raw)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{DreamType, RecordingRecord};

    fn record(id: &str) -> RecordingRecord {
        RecordingRecord::empty(id.to_string(), "2026-10-15T22:10:00.000Z".to_string())
    }

    #[test]
    fn missing_key_loads_empty() {
        let journal = JournalStore::load(MemoryStore::new());
        assert!(journal.records().is_empty());
    }

    #[test]
    fn malformed_json_loads_empty() {
        let store = MemoryStore::new();
        store.set(RECORDINGS_KEY, "[{\"id\":").unwrap();
        let journal = JournalStore::load(store);
        assert!(journal.records().is_empty());
    }

    #[test]
    fn append_persists_whole_list() {
        let mut journal = JournalStore::load(MemoryStore::new());
        journal.append(record("1")).unwrap();
        let mut second = record("2");
        second.dream_type = DreamType::Lucid;
        journal.append(second).unwrap();

        let raw = journal.store().get(RECORDINGS_KEY).unwrap();
        let back: Vec<RecordingRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[1].dream_type, DreamType::Lucid);
    }

    #[test]
    fn delete_removes_by_id() {
        let mut journal = JournalStore::load(MemoryStore::new());
        journal.append(record("a")).unwrap();
        journal.append(record("b")).unwrap();
        assert!(journal.delete("a").unwrap());
        assert!(!journal.delete("zzz").unwrap());
        assert_eq!(journal.records().len(), 1);
        assert!(journal.get("b").is_some());
    }
}
