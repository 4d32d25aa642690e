//! Namespace-tagged attribute maps.
//!
//! An [`AttributesMap`] is the serialized form of any record: a mapping from
//! *namespace* (the record's type name) to that record's field set. Fields
//! that serialize to null are omitted, which is what lets a partially
//! populated record later act as a broad query-by-example. A combined map
//! holds at most one entry per namespace; folding a second record of the
//! same type replaces the namespace's whole field set, it does not merge
//! field by field.
//!
//! [`AttributesMapList`] is an ordered list of maps, each one example object
//! to be OR-combined during search.
//!
//! # Examples
//!
//! ```
//! use mejiro::attributes::{AttributesMap, Entity};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct School {
//!     address: Option<String>,
//!     school_id: Option<String>,
//! }
//!
//! impl Entity for School {}
//!
//! let school = School {
//!     address: Some("nyc".to_string()),
//!     school_id: None,
//! };
//! let map = AttributesMap::from_entity(&school).unwrap();
//!
//! // The unpopulated field is absent, not null.
//! let fields = map.fields("School").unwrap();
//! assert!(fields.contains_key("address"));
//! assert!(!fields.contains_key("school_id"));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attributes::entity::Entity;
use crate::attributes::value::AttrValue;
use crate::error::{MejiroError, Result};

/// Name of the document field holding the namespace map.
///
/// Every persisted document is one object under this field, keeping each
/// namespace's fields queryable as an independent group.
pub const NAMESPACE_FIELD: &str = "namespace_map";

/// Field set of a single namespace.
pub type FieldMap = BTreeMap<String, AttrValue>;

/// The serialized representation of one or more records, keyed by namespace.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttributesMap {
    namespace_map: BTreeMap<String, FieldMap>,
}

impl AttributesMap {
    /// Create a new empty attributes map.
    pub fn new() -> Self {
        AttributesMap {
            namespace_map: BTreeMap::new(),
        }
    }

    /// Encode a single record into a fresh map.
    pub fn from_entity<T: Entity>(entity: &T) -> Result<Self> {
        let mut map = AttributesMap::new();
        map.insert_entity(entity)?;
        Ok(map)
    }

    /// Fold a record into this map under its own namespace.
    ///
    /// If the namespace is already present, its whole field set is replaced
    /// by this record's fields.
    pub fn insert_entity<T: Entity>(&mut self, entity: &T) -> Result<()> {
        let namespace = T::namespace();
        let value = serde_json::to_value(entity)?;

        let fields = match AttrValue::from(value) {
            AttrValue::Nested(fields) => fields
                .into_iter()
                .filter(|(_, value)| !value.is_null())
                .collect(),
            // Scalars and sequences keep a self-describing single-field
            // wrapper keyed by the namespace itself.
            other => {
                let mut fields = FieldMap::new();
                fields.insert(namespace.to_string(), other);
                fields
            }
        };

        self.namespace_map.insert(namespace.to_string(), fields);
        Ok(())
    }

    /// Decode the record stored under `T`'s namespace.
    ///
    /// Fields that were unpopulated at encode time come back as the
    /// target's unset value. Fails when the namespace is absent or its
    /// stored shape is structurally incompatible with `T`.
    pub fn decode<T: Entity>(&self) -> Result<T> {
        let namespace = T::namespace();
        let fields = self.namespace_map.get(namespace).ok_or_else(|| {
            MejiroError::decode(format!("no attributes stored under namespace: {namespace}"))
        })?;

        let object = Value::from(AttrValue::Nested(fields.clone()));
        match serde_json::from_value::<T>(object) {
            Ok(entity) => Ok(entity),
            Err(object_error) => {
                // Unwrap the self-describing scalar form before giving up.
                if fields.len() == 1 {
                    if let Some(value) = fields.get(namespace) {
                        if let Ok(entity) = serde_json::from_value::<T>(Value::from(value.clone()))
                        {
                            return Ok(entity);
                        }
                    }
                }
                Err(MejiroError::decode(format!(
                    "namespace {namespace} is not compatible with the requested type: {object_error}"
                )))
            }
        }
    }

    /// Whether the map holds an entry for the namespace.
    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.namespace_map.contains_key(namespace)
    }

    /// Get the field set stored under a namespace.
    pub fn fields(&self, namespace: &str) -> Option<&FieldMap> {
        self.namespace_map.get(namespace)
    }

    /// The full namespace-to-fields mapping.
    pub fn namespace_map(&self) -> &BTreeMap<String, FieldMap> {
        &self.namespace_map
    }

    /// Iterate over the namespaces in this map.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespace_map.keys().map(String::as_str)
    }

    /// Number of namespaces in this map.
    pub fn len(&self) -> usize {
        self.namespace_map.len()
    }

    /// Whether the map holds no namespaces.
    pub fn is_empty(&self) -> bool {
        self.namespace_map.is_empty()
    }

    /// Serialize to the persisted JSON document form.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from the persisted JSON document form.
    pub fn from_json_string(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// An ordered list of attribute maps, OR-combined during search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributesMapList {
    maps: Vec<AttributesMap>,
}

impl AttributesMapList {
    /// Create a new empty list.
    pub fn new() -> Self {
        AttributesMapList { maps: Vec::new() }
    }

    /// Build a single-example list from one record.
    pub fn from_entity<T: Entity>(entity: &T) -> Result<Self> {
        let mut list = AttributesMapList::new();
        list.maps.push(AttributesMap::from_entity(entity)?);
        Ok(list)
    }

    /// Build a list with one map per record; each record is an independent
    /// example.
    pub fn from_entities<T: Entity>(entities: &[T]) -> Result<Self> {
        let mut list = AttributesMapList::new();
        for entity in entities {
            list.maps.push(AttributesMap::from_entity(entity)?);
        }
        Ok(list)
    }

    /// Append a map to the list.
    pub fn push(&mut self, map: AttributesMap) {
        self.maps.push(map);
    }

    /// The maps in this list, in order.
    pub fn maps(&self) -> &[AttributesMap] {
        &self.maps
    }

    /// Iterate over the maps in order.
    pub fn iter(&self) -> impl Iterator<Item = &AttributesMap> {
        self.maps.iter()
    }

    /// Number of maps in the list.
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

impl From<Vec<AttributesMap>> for AttributesMapList {
    fn from(maps: Vec<AttributesMap>) -> Self {
        AttributesMapList { maps }
    }
}
