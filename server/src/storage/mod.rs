//! Storage adapter: the only component that talks to the backing store.
//!
//! Loads degrade to an empty collection on backend failure; saves report
//! failure to the caller so it can be logged, while in-memory state stays
//! authoritative until the next successful save. Backend differences
//! (ordering, what counts as "nothing stored") live in the backends.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::models::{Lot, Participant};

pub mod backend;
pub mod error;
pub mod local;
pub mod remote;
#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{Backend, BackendKind, Collection};
pub use error::StorageError;
pub use local::LocalStore;
pub use remote::RemoteStore;

/// A record type stored in one of the collections.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;

    fn id(&self) -> i64;
}

impl Record for Lot {
    const COLLECTION: Collection = Collection::Lots;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for Participant {
    const COLLECTION: Collection = Collection::Participants;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Outcome of reading a collection before defaults are applied.
enum Fetched<T> {
    Stored(Vec<T>),
    Missing,
    Failed,
}

#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn Backend>,
}

impl Storage {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        info!(backend = ?backend.kind(), "Storage adapter ready");
        Self { backend }
    }

    /// Loads lots, seeding and persisting the defaults when the backend
    /// reports nothing stored.
    pub async fn load_lots(&self) -> Vec<Lot> {
        match self.fetch::<Lot>().await {
            Fetched::Stored(lots) => lots,
            Fetched::Missing => {
                let lots = Lot::defaults();
                info!(count = lots.len(), "Seeding default lots");
                if let Err(e) = self.save(&lots).await {
                    error!(error = %e, "Failed to persist default lots");
                }
                lots
            }
            Fetched::Failed => Vec::new(),
        }
    }

    pub async fn load_participants(&self) -> Vec<Participant> {
        match self.fetch::<Participant>().await {
            Fetched::Stored(participants) => participants,
            Fetched::Missing | Fetched::Failed => Vec::new(),
        }
    }

    /// Persists the full record set of a collection.
    pub async fn save<T: Record>(&self, records: &[T]) -> Result<(), StorageError> {
        let collection = T::COLLECTION;
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()
            .map_err(|e| StorageError::Encode(e.to_string()))?;

        self.backend
            .write(collection, values)
            .await
            .inspect_err(|e| error!(%collection, error = %e, "Failed to save collection"))
    }

    /// Removes one record through the backend's targeted delete.
    pub async fn delete<T: Record>(&self, record: &T) -> Result<(), StorageError> {
        self.delete_by_id(T::COLLECTION, record.id()).await
    }

    /// Targeted delete; a no-op for backends that delete by omission.
    pub async fn delete_by_id(&self, collection: Collection, id: i64) -> Result<(), StorageError> {
        self.backend
            .delete_by_id(collection, id)
            .await
            .inspect_err(|e| error!(%collection, id, error = %e, "Failed to delete record"))
    }

    async fn fetch<T: Record>(&self) -> Fetched<T> {
        let collection = T::COLLECTION;
        let values = match self.backend.read(collection).await {
            Ok(Some(values)) => values,
            Ok(None) => return Fetched::Missing,
            Err(e) => {
                error!(%collection, error = %e, "Failed to load collection");
                return Fetched::Failed;
            }
        };

        match values
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
        {
            Ok(records) => Fetched::Stored(records),
            Err(e) => {
                error!(%collection, error = %e, "Stored records do not match the record shape");
                Fetched::Failed
            }
        }
    }
}
