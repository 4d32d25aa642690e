//! Document store client seam.
//!
//! [`StoreClient`] is the boundary between this crate and the remote search
//! engine: index provisioning, batched upsert writes, and query execution.
//! [`RestClient`] implements it over HTTP; tests substitute hand-written
//! mocks.

pub mod rest;

use ahash::AHashMap;
use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use rest::RestClient;

/// Per-id outcome of one bulk write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The document was created or replaced.
    Success,
    /// The store rejected this document, with its reported reason.
    Failure(String),
}

impl WriteOutcome {
    /// Whether this outcome is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, WriteOutcome::Success)
    }

    /// The failure reason, if this outcome is a failure.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            WriteOutcome::Success => None,
            WriteOutcome::Failure(reason) => Some(reason),
        }
    }
}

/// Operations the remote document store must provide.
///
/// One id's failure inside `bulk_write` does not abort the rest of the
/// batch; the returned map carries an outcome for every submitted id. The
/// store is eventually consistent, so a write's effects may not be visible
/// to an immediately following `search`.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Create the index if it does not exist yet. Idempotent.
    async fn ensure_index(&self, index: &str) -> Result<()>;

    /// Delete the index if it exists. Idempotent.
    async fn delete_index(&self, index: &str) -> Result<()>;

    /// Upsert every `(id, document)` pair in one batched call.
    async fn bulk_write(
        &self,
        index: &str,
        items: AHashMap<String, Value>,
    ) -> Result<AHashMap<String, WriteOutcome>>;

    /// Execute one structured query and return the raw response body.
    async fn search(&self, index: &str, body: &str) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_outcome_accessors() {
        assert!(WriteOutcome::Success.is_success());
        assert_eq!(WriteOutcome::Success.failure_reason(), None);

        let failure = WriteOutcome::Failure("mapping conflict".to_string());
        assert!(!failure.is_success());
        assert_eq!(failure.failure_reason(), Some("mapping conflict"));
    }
}
