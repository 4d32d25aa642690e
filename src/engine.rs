//! High-level write and search entry point.
//!
//! An [`Engine`] ties the pieces together: records are encoded into
//! attribute maps and batched through the write coordinator; searches
//! compile example records into the store's query syntax, execute them, and
//! decode the hits back into attribute maps or typed records.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::attributes::{AttributesMap, AttributesMapList, Entity};
use crate::client::StoreClient;
use crate::coordinator::{DEFAULT_FLUSH_INTERVAL, WriteCoordinator, WriteCoordinatorConfig};
use crate::error::{MejiroError, Result};
use crate::query;

/// Configuration for an engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Index all records are written to and searched in.
    pub index: String,
    /// Interval between write flush cycles.
    pub flush_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            index: "entities".to_string(),
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

/// Stores and searches typed records in a remote document store.
///
/// Writes block until the batched flush cycle containing them resolves, so
/// a returned `Ok` means the store accepted the document. The store is
/// eventually consistent; a search issued right after a write may not see
/// it yet.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use mejiro::attributes::Entity;
/// use mejiro::client::RestClient;
/// use mejiro::engine::{Engine, EngineConfig};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct School {
///     address: Option<String>,
/// }
///
/// impl Entity for School {}
///
/// # async fn example() -> mejiro::error::Result<()> {
/// let client = Arc::new(RestClient::new("http://localhost:9200"));
/// let engine = Engine::connect(client, EngineConfig::default()).await?;
///
/// let school = School { address: Some("nyc".to_string()) };
/// engine.write("s1", &school).await?;
///
/// // Query by example: populated fields constrain, absent fields match
/// // anything.
/// let example = School { address: Some("nyc".to_string()) };
/// let matches: Vec<School> = engine.search_as(&example).await?;
/// # Ok(())
/// # }
/// ```
pub struct Engine {
    client: Arc<dyn StoreClient>,
    coordinator: WriteCoordinator,
    index: String,
}

impl Engine {
    /// Provision the index and start the write coordinator.
    pub async fn connect(client: Arc<dyn StoreClient>, config: EngineConfig) -> Result<Self> {
        client.ensure_index(&config.index).await?;

        let coordinator = WriteCoordinator::start(
            Arc::clone(&client),
            WriteCoordinatorConfig {
                index: config.index.clone(),
                flush_interval: config.flush_interval,
            },
        );

        Ok(Engine {
            client,
            coordinator,
            index: config.index,
        })
    }

    /// Write a record under `id`, blocking until its flush cycle resolves.
    ///
    /// Creates the document when absent, replaces it when present.
    pub async fn write<T: Entity>(&self, id: &str, record: &T) -> Result<()> {
        let map = AttributesMap::from_entity(record)?;
        self.coordinator.submit(id, serde_json::to_value(&map)?).await
    }

    /// Search with one example map; results stay as attribute maps.
    pub async fn search_map(&self, example: &AttributesMap) -> Result<Vec<AttributesMap>> {
        let mut list = AttributesMapList::new();
        list.push(example.clone());
        self.search_maps(&list).await
    }

    /// Search with a list of example maps, matching documents that resemble
    /// any one of them; results stay as attribute maps.
    pub async fn search_maps(&self, examples: &AttributesMapList) -> Result<Vec<AttributesMap>> {
        let rendered = query::render(&query::compile_any(examples));
        let response = self.client.search(&self.index, &rendered).await?;
        parse_hits(&response)
    }

    /// Search with one example record, decoding hits back into `T`.
    pub async fn search_as<T: Entity>(&self, example: &T) -> Result<Vec<T>> {
        let list = AttributesMapList::from_entity(example)?;
        self.decode_hits(self.search_maps(&list).await?)
    }

    /// Search with several example records, matching documents that resemble
    /// any one of them, decoding hits back into `T`.
    pub async fn search_any_as<T: Entity>(&self, examples: &[T]) -> Result<Vec<T>> {
        let list = AttributesMapList::from_entities(examples)?;
        self.decode_hits(self.search_maps(&list).await?)
    }

    /// Stop the write coordinator. Pending writes not yet observed by a
    /// tick are abandoned.
    pub fn shutdown(&self) {
        self.coordinator.shutdown();
    }

    fn decode_hits<T: Entity>(&self, maps: Vec<AttributesMap>) -> Result<Vec<T>> {
        // Hits without the target namespace are skipped rather than failed;
        // a multi-namespace query legitimately returns mixed documents.
        maps.iter()
            .filter(|map| map.contains_namespace(T::namespace()))
            .map(AttributesMap::decode)
            .collect()
    }
}

/// Walk `hits.hits[]._source` out of a search response.
fn parse_hits(response: &Value) -> Result<Vec<AttributesMap>> {
    let hits = response
        .get("hits")
        .ok_or_else(|| MejiroError::invalid_data("hits node is missing from search results"))?;
    let hits_array = hits
        .get("hits")
        .and_then(Value::as_array)
        .ok_or_else(|| MejiroError::invalid_data("hits array node is missing from search results"))?;

    hits_array
        .iter()
        .map(|hit| {
            let source = hit.get("_source").ok_or_else(|| {
                MejiroError::invalid_data("_source node is missing from search hit")
            })?;
            Ok(serde_json::from_value(source.clone())?)
        })
        .collect()
}
