//! Attribute map codec for arbitrary records.
//!
//! Records are serialized into namespace-tagged attribute maps: the
//! namespace is the record's type name, and the fields under it keep their
//! native scalar/map/sequence shape. The same representation serves as the
//! persisted document form and as the query-by-example input.

pub mod entity;
pub mod map;
pub mod value;

// Re-export commonly used types
pub use entity::Entity;
pub use map::{AttributesMap, AttributesMapList, FieldMap, NAMESPACE_FIELD};
pub use value::AttrValue;
