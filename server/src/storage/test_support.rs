//! In-memory remote backend for tests: records writes and targeted deletes,
//! and can be told to fail writes or hide rows from selects.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::backend::{Backend, BackendKind, Collection};
use super::error::StorageError;

#[derive(Default)]
pub struct RecordingBackend {
    tables: Mutex<HashMap<&'static str, Vec<Value>>>,
    deleted: Mutex<Vec<(Collection, i64)>>,
    writes: Mutex<Vec<Collection>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    hide_rows: AtomicBool,
}

impl RecordingBackend {
    pub fn with_rows(collection: Collection, rows: Vec<Value>) -> Self {
        let backend = Self::default();
        backend.set_rows(collection, rows);
        backend
    }

    pub fn set_rows(&self, collection: Collection, rows: Vec<Value>) {
        self.tables.lock().unwrap().insert(collection.key(), rows);
    }

    pub fn rows(&self, collection: Collection) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(collection.key())
            .cloned()
            .unwrap_or_default()
    }

    pub fn deleted(&self) -> Vec<(Collection, i64)> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<Collection> {
        self.writes.lock().unwrap().clone()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Selects come back empty while the rows stay stored, as with a
    /// row-level security policy that filters everything out.
    pub fn hide_rows(&self, hide: bool) {
        self.hide_rows.store(hide, Ordering::SeqCst);
    }

    fn unavailable() -> StorageError {
        StorageError::Status {
            status: 503,
            body: "unavailable".to_string(),
        }
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn read(&self, collection: Collection) -> Result<Option<Vec<Value>>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        if self.hide_rows.load(Ordering::SeqCst) {
            return Ok(Some(Vec::new()));
        }
        Ok(Some(self.rows(collection)))
    }

    async fn write(&self, collection: Collection, records: Vec<Value>) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.writes.lock().unwrap().push(collection);
        self.set_rows(collection, records);
        Ok(())
    }

    async fn delete_by_id(&self, collection: Collection, id: i64) -> Result<(), StorageError> {
        self.deleted.lock().unwrap().push((collection, id));
        Ok(())
    }
}
