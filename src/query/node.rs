//! Boolean query tree nodes.

use serde_json::{Value, json};

use crate::attributes::AttrValue;

/// One node of a compiled query tree.
///
/// A tree is built from three shapes: a `Match` leaf constraining one dotted
/// field path to a literal value, a `Must` node requiring every child to
/// match, and a `Should` node requiring at least one child to match.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// Leaf constraint: the field at `path` matches `value`.
    Match {
        /// Fully dotted field path, namespace included.
        path: String,
        /// Literal value the field must match.
        value: AttrValue,
    },
    /// Conjunction: every child must match.
    Must(Vec<QueryNode>),
    /// Disjunction: at least one child must match.
    Should(Vec<QueryNode>),
}

impl QueryNode {
    /// Build a match leaf.
    pub fn match_field<P: Into<String>, V: Into<AttrValue>>(path: P, value: V) -> Self {
        QueryNode::Match {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Number of direct clauses under this node. A leaf counts as one.
    pub fn clause_count(&self) -> usize {
        match self {
            QueryNode::Match { .. } => 1,
            QueryNode::Must(children) | QueryNode::Should(children) => children.len(),
        }
    }

    /// Serialize into the store's boolean query syntax.
    ///
    /// `Must` and `Should` nodes render as `bool` queries with `must` /
    /// `should` clause arrays; `Match` leaves render as `match` queries.
    pub fn to_json(&self) -> Value {
        match self {
            QueryNode::Match { path, value } => {
                let mut field = serde_json::Map::new();
                field.insert(path.clone(), Value::from(value.clone()));
                json!({ "match": field })
            }
            QueryNode::Must(children) => {
                let clauses: Vec<Value> = children.iter().map(QueryNode::to_json).collect();
                json!({ "bool": { "must": clauses } })
            }
            QueryNode::Should(children) => {
                let clauses: Vec<Value> = children.iter().map(QueryNode::to_json).collect();
                json!({ "bool": { "should": clauses } })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_match_leaf_rendering() {
        let node = QueryNode::match_field("namespace_map.School.address", "nyc");

        assert_eq!(
            node.to_json(),
            json!({ "match": { "namespace_map.School.address": "nyc" } })
        );
    }

    #[test]
    fn test_must_rendering() {
        let node = QueryNode::Must(vec![
            QueryNode::match_field("a.b", 1i64),
            QueryNode::match_field("a.c", true),
        ]);

        assert_eq!(
            node.to_json(),
            json!({ "bool": { "must": [
                { "match": { "a.b": 1 } },
                { "match": { "a.c": true } },
            ] } })
        );
    }

    #[test]
    fn test_should_of_musts_rendering() {
        let node = QueryNode::Should(vec![
            QueryNode::Must(vec![QueryNode::match_field("a.b", "x")]),
            QueryNode::Must(vec![QueryNode::match_field("a.b", "y")]),
        ]);

        assert_eq!(
            node.to_json(),
            json!({ "bool": { "should": [
                { "bool": { "must": [{ "match": { "a.b": "x" } }] } },
                { "bool": { "must": [{ "match": { "a.b": "y" } }] } },
            ] } })
        );
    }

    #[test]
    fn test_empty_must_renders_empty_clause_list() {
        let node = QueryNode::Must(vec![]);

        assert_eq!(node.clause_count(), 0);
        assert_eq!(node.to_json(), json!({ "bool": { "must": [] } }));
    }
}
