//! # Mejiro
//!
//! Query-by-example object mapping and batched writes for document search
//! engines.
//!
//! ## Features
//!
//! - Generic record ↔ attribute-map codec, no per-type field mappings
//! - Query-by-example: partially populated records become boolean queries
//! - Batched asynchronous writes with per-id success/failure reporting
//! - Namespace isolation between record types sharing one index
//! - Pluggable store client with an HTTP implementation

pub mod attributes;
pub mod client;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod query;

pub use attributes::{AttrValue, AttributesMap, AttributesMapList, Entity};
pub use client::{RestClient, StoreClient, WriteOutcome};
pub use coordinator::{WriteCoordinator, WriteCoordinatorConfig};
pub use engine::{Engine, EngineConfig};
pub use error::{MejiroError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
