use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, error};

use super::backend::{Backend, BackendKind, Collection};
use super::error::StorageError;

/// Key-value store keeping one JSON document per collection key inside a
/// data directory.
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.key()))
    }
}

#[async_trait]
impl Backend for LocalStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn read(&self, collection: Collection) -> Result<Option<Vec<Value>>, StorageError> {
        let path = self.entry_path(collection);
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(%collection, path = %path.display(), "No local entry stored");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        // An unreadable entry counts as nothing stored, so defaults apply.
        match serde_json::from_str::<Vec<Value>>(&text) {
            Ok(records) => Ok(Some(records)),
            Err(e) => {
                error!(%collection, path = %path.display(), error = %e, "Failed to parse stored entry");
                Ok(None)
            }
        }
    }

    async fn write(&self, collection: Collection, records: Vec<Value>) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).await?;

        let text = serde_json::to_string(&records)
            .map_err(|e| StorageError::Encode(e.to_string()))?;
        let path = self.entry_path(collection);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, text).await?;
        fs::rename(&tmp, &path).await?;

        debug!(%collection, count = records.len(), "Local entry written");
        Ok(())
    }

    async fn delete_by_id(&self, collection: Collection, id: i64) -> Result<(), StorageError> {
        // Deletion happens by omission on the next full write.
        debug!(%collection, id, "Targeted delete skipped for local store");
        Ok(())
    }
}
