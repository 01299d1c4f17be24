use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use super::error::StorageError;

/// The two record collections the service persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Lots,
    Participants,
}

impl Collection {
    /// Local entry key and remote table name.
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Lots => "lots",
            Collection::Participants => "participants",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Remote,
}

/// Raw persistence capability. Records cross this boundary as JSON values;
/// typing, seeding and error degradation live in [`super::Storage`].
#[async_trait]
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Reads every record of a collection. `Ok(None)` means nothing is stored
    /// yet and defaults may be seeded; an empty list is a real, empty table.
    async fn read(&self, collection: Collection) -> Result<Option<Vec<Value>>, StorageError>;

    /// Persists the full record set of a collection.
    async fn write(&self, collection: Collection, records: Vec<Value>) -> Result<(), StorageError>;

    /// Removes one record by id where the backend supports targeted deletes.
    async fn delete_by_id(&self, collection: Collection, id: i64) -> Result<(), StorageError>;
}
