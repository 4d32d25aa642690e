//! HTTP implementation of [`StoreClient`].
//!
//! Talks to an Elasticsearch-compatible REST API: `HEAD`/`PUT`/`DELETE` on
//! the index for provisioning, `_bulk` with upsert actions for writes, and
//! `_search` for queries.

use ahash::AHashMap;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{Value, json};

use crate::attributes::NAMESPACE_FIELD;
use crate::client::{StoreClient, WriteOutcome};
use crate::error::{MejiroError, Result};

/// REST client for an Elasticsearch-compatible document store.
pub struct RestClient {
    /// HTTP client for making store requests.
    client: Client,
    /// Base URL of the store, without a trailing slash.
    base_url: String,
}

impl RestClient {
    /// Create a client for the store at `base_url`.
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        RestClient {
            client: Client::new(),
            base_url,
        }
    }

    fn index_url(&self, index: &str) -> String {
        format!("{}/{}", self.base_url, index)
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self.client.head(self.index_url(index)).send().await?;
        Ok(response.status().is_success())
    }
}

/// Index mapping that keeps each namespace's fields queryable as an
/// independent group.
fn index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                NAMESPACE_FIELD: { "type": "nested" }
            }
        }
    })
}

/// Build the newline-delimited `_bulk` request body.
///
/// Each item contributes an upsert action pair: an `update` action line and
/// a `doc` + `doc_as_upsert` payload line, so the document is created when
/// absent and replaced when present.
fn bulk_body(items: &AHashMap<String, Value>) -> Result<String> {
    let mut body = String::new();

    for (id, payload) in items {
        let action = json!({ "update": { "_id": id } });
        body.push_str(&serde_json::to_string(&action)?);
        body.push('\n');

        let document = json!({ "doc": payload, "doc_as_upsert": true });
        body.push_str(&serde_json::to_string(&document)?);
        body.push('\n');
    }

    Ok(body)
}

/// Extract per-id outcomes from a `_bulk` response body.
fn parse_bulk_outcomes(response: &Value) -> Result<AHashMap<String, WriteOutcome>> {
    let items = response
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| MejiroError::invalid_data("items node is missing from bulk response"))?;

    let mut outcomes = AHashMap::with_capacity(items.len());
    for item in items {
        let action = item
            .get("update")
            .ok_or_else(|| MejiroError::invalid_data("bulk response item has no update action"))?;
        let id = action
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| MejiroError::invalid_data("bulk response item has no _id"))?;

        let outcome = match action.get("error") {
            Some(error) => {
                let reason = error
                    .get("reason")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string());
                WriteOutcome::Failure(reason)
            }
            None => WriteOutcome::Success,
        };

        outcomes.insert(id.to_string(), outcome);
    }

    Ok(outcomes)
}

#[async_trait]
impl StoreClient for RestClient {
    async fn ensure_index(&self, index: &str) -> Result<()> {
        if self.index_exists(index).await? {
            return Ok(());
        }

        debug!("creating index {index}");
        let response = self
            .client
            .put(self.index_url(index))
            .json(&index_mapping())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(MejiroError::internal(format!(
                "index creation failed with status {status}: {detail}"
            )));
        }

        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        if !self.index_exists(index).await? {
            return Ok(());
        }

        debug!("deleting index {index}");
        let response = self.client.delete(self.index_url(index)).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(MejiroError::internal(format!(
                "index deletion failed with status {status}"
            )));
        }

        Ok(())
    }

    async fn bulk_write(
        &self,
        index: &str,
        items: AHashMap<String, Value>,
    ) -> Result<AHashMap<String, WriteOutcome>> {
        if items.is_empty() {
            return Ok(AHashMap::new());
        }

        debug!("bulk writing {} documents to {index}", items.len());
        let response = self
            .client
            .post(format!("{}/_bulk", self.index_url(index)))
            .header("Content-Type", "application/x-ndjson")
            .body(bulk_body(&items)?)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(MejiroError::internal(format!(
                "bulk write failed with status {status}: {detail}"
            )));
        }

        parse_bulk_outcomes(&response.json::<Value>().await?)
    }

    async fn search(&self, index: &str, body: &str) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}/_search", self.index_url(index)))
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(MejiroError::internal(format!(
                "search request failed with status {status}"
            )));
        }

        Ok(response.json::<Value>().await?)
    }
}
