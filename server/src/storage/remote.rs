//! Reqwest-backed adapter for a PostgREST-style table API (Supabase).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use super::backend::{Backend, BackendKind, Collection};
use super::error::StorageError;

const REST_PATH: &str = "rest/v1";
const UPSERT_PREFERENCE: &str = "resolution=merge-duplicates,return=minimal";

/// Remote tables reached over HTTP with an anonymous access key.
pub struct RemoteStore {
    client: Client,
    base_url: String,
    access_key: String,
}

impl RemoteStore {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: &str,
        access_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
            access_key: access_key.into(),
        })
    }

    fn table_url(&self, collection: Collection) -> String {
        format!("{}/{}/{}", self.base_url, REST_PATH, collection.key())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", self.access_key.as_str())
            .header(header::AUTHORIZATION, format!("Bearer {}", self.access_key))
            .header(header::ACCEPT, "application/json")
    }

    fn select_request(&self, collection: Collection) -> RequestBuilder {
        self.authorized(self.client.get(self.table_url(collection)))
            .query(&[("select", "*")])
    }

    fn upsert_request(&self, collection: Collection, records: &[Value]) -> RequestBuilder {
        self.authorized(self.client.post(self.table_url(collection)))
            .header("Prefer", UPSERT_PREFERENCE)
            .json(records)
    }

    fn delete_request(&self, collection: Collection, id: i64) -> RequestBuilder {
        self.authorized(self.client.delete(self.table_url(collection)))
            .query(&[("id", format!("eq.{}", id))])
    }
}

/// Lots are ordered by id; participants keep the table's order.
fn order_rows(collection: Collection, rows: &mut [Value]) {
    if collection == Collection::Lots {
        rows.sort_by_key(|row| row.get("id").and_then(Value::as_i64));
    }
}

async fn ensure_success(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl Backend for RemoteStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn read(&self, collection: Collection) -> Result<Option<Vec<Value>>, StorageError> {
        let response = ensure_success(self.select_request(collection).send().await?).await?;
        let mut rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| StorageError::Decode(e.to_string()))?;
        order_rows(collection, &mut rows);

        // An empty select is returned as is: rows may be hidden by policy,
        // and seeding would upsert over them.
        debug!(%collection, count = rows.len(), "Remote table fetched");
        Ok(Some(rows))
    }

    async fn write(&self, collection: Collection, records: Vec<Value>) -> Result<(), StorageError> {
        if records.is_empty() {
            debug!(%collection, "Nothing to upsert");
            return Ok(());
        }
        ensure_success(self.upsert_request(collection, &records).send().await?).await?;
        debug!(%collection, count = records.len(), "Remote table upserted");
        Ok(())
    }

    async fn delete_by_id(&self, collection: Collection, id: i64) -> Result<(), StorageError> {
        ensure_success(self.delete_request(collection, id).send().await?).await?;
        debug!(%collection, id, "Remote row deleted");
        Ok(())
    }
}
