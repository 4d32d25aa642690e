//! Query-by-example compilation.
//!
//! Turns attribute maps into boolean query trees: every populated field of an
//! example becomes a match constraint, absent fields constrain nothing. An
//! example with no populated fields therefore matches every document in its
//! namespace.
//!
//! Known quirk, kept for compatibility with the stored behavior: while
//! walking one field set, an explicit null value stops the walk of the
//! remaining sibling fields at that level. Encoded maps drop top-level nulls,
//! so this only affects nulls inside nested maps, but maps built by hand or
//! deserialized from documents can trigger it at any level.

use serde_json::json;

use crate::attributes::{AttrValue, AttributesMap, AttributesMapList, FieldMap, NAMESPACE_FIELD};
use crate::query::node::QueryNode;

/// Compile one example map into a conjunction.
///
/// For each namespace, each populated field adds one clause on the fully
/// dotted path (`namespace_map.<Namespace>.<field...>`): nested maps recurse
/// with the path extended, sequences become a disjunction that matches when
/// any element matches, scalars become match leaves.
pub fn compile(map: &AttributesMap) -> QueryNode {
    let mut clauses = Vec::new();

    for (namespace, fields) in map.namespace_map() {
        let path = format!("{NAMESPACE_FIELD}.{namespace}");
        populate_clauses(&mut clauses, &path, fields);
    }

    QueryNode::Must(clauses)
}

/// Compile a list of example maps into a disjunction.
///
/// A document matches when it matches at least one of the examples.
pub fn compile_any(list: &AttributesMapList) -> QueryNode {
    QueryNode::Should(list.iter().map(compile).collect())
}

/// Render a compiled tree into the store's query wire form.
///
/// The tree is wrapped in a nested scope on the namespace field, so every
/// clause must be satisfied by fields of the same namespace element. Without
/// the scope, namespace A's field X could be satisfied by namespace B's
/// same-named field.
pub fn render(node: &QueryNode) -> String {
    json!({
        "query": {
            "nested": {
                "path": NAMESPACE_FIELD,
                "score_mode": "max",
                "query": node.to_json(),
            }
        }
    })
    .to_string()
}

fn populate_clauses(clauses: &mut Vec<QueryNode>, path: &str, fields: &FieldMap) {
    for (name, value) in fields {
        let field_path = format!("{path}.{name}");

        match value {
            // Quirk: a null ends the walk of this level, dropping the
            // remaining sibling fields.
            AttrValue::Null => return,
            AttrValue::Nested(nested) => populate_clauses(clauses, &field_path, nested),
            AttrValue::Sequence(elements) => {
                let mut alternatives = Vec::new();
                for element in elements {
                    match element {
                        AttrValue::Nested(element_fields) => {
                            let mut element_clauses = Vec::new();
                            populate_clauses(&mut element_clauses, &field_path, element_fields);
                            alternatives.push(QueryNode::Must(element_clauses));
                        }
                        AttrValue::Null => {}
                        scalar => {
                            alternatives.push(QueryNode::match_field(&field_path, scalar.clone()));
                        }
                    }
                }
                clauses.push(QueryNode::Should(alternatives));
            }
            scalar => clauses.push(QueryNode::match_field(&field_path, scalar.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Entity;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Serialize, Deserialize)]
    struct Student {
        name: Option<String>,
        age: Option<i64>,
    }

    impl Entity for Student {}

    #[derive(Serialize, Deserialize)]
    struct School {
        address: Option<String>,
        manager: Option<String>,
        school_id: Option<String>,
        students: Option<Vec<Student>>,
    }

    impl Entity for School {}

    fn example_school() -> School {
        School {
            address: Some("nyc".to_string()),
            manager: None,
            school_id: None,
            students: None,
        }
    }

    #[test]
    fn test_compile_scalar_fields() {
        let map = AttributesMap::from_entity(&example_school()).unwrap();

        let node = compile(&map);
        assert_eq!(
            node,
            QueryNode::Must(vec![QueryNode::match_field(
                "namespace_map.School.address",
                "nyc"
            )])
        );
    }

    #[test]
    fn test_compile_all_unset_example_matches_namespace() {
        let school = School {
            address: None,
            manager: None,
            school_id: None,
            students: None,
        };
        let map = AttributesMap::from_entity(&school).unwrap();

        // No populated field, no constraint.
        assert_eq!(compile(&map), QueryNode::Must(vec![]));
    }

    #[test]
    fn test_compile_nested_map_extends_path() {
        let map = AttributesMap::from_json_string(
            r#"{"namespace_map":{"School":{"location":{"city":"nyc","zip":"10001"}}}}"#,
        )
        .unwrap();

        let node = compile(&map);
        assert_eq!(
            node,
            QueryNode::Must(vec![
                QueryNode::match_field("namespace_map.School.location.city", "nyc"),
                QueryNode::match_field("namespace_map.School.location.zip", "10001"),
            ])
        );
    }

    #[test]
    fn test_compile_sequence_of_records() {
        let school = School {
            address: None,
            manager: None,
            school_id: None,
            students: Some(vec![Student {
                name: Some("April".to_string()),
                age: Some(17),
            }]),
        };
        let map = AttributesMap::from_entity(&school).unwrap();

        // The example constrains only the students sequence; an item matches
        // when any element of its sequence matches all of the example
        // element's fields.
        let node = compile(&map);
        assert_eq!(
            node,
            QueryNode::Must(vec![QueryNode::Should(vec![QueryNode::Must(vec![
                QueryNode::match_field("namespace_map.School.students.age", 17i64),
                QueryNode::match_field("namespace_map.School.students.name", "April"),
            ])])])
        );
    }

    #[test]
    fn test_compile_sequence_of_scalars() {
        let map = AttributesMap::from_json_string(
            r#"{"namespace_map":{"School":{"tags":["public","charter"]}}}"#,
        )
        .unwrap();

        let node = compile(&map);
        assert_eq!(
            node,
            QueryNode::Must(vec![QueryNode::Should(vec![
                QueryNode::match_field("namespace_map.School.tags", "public"),
                QueryNode::match_field("namespace_map.School.tags", "charter"),
            ])])
        );
    }

    #[test]
    fn halts_namespace_walk_at_null_field() {
        // "city" < "state" < "zip" in walk order; the null at "state" drops
        // "zip" from the compiled tree. Kept as-is for compatibility.
        let map = AttributesMap::from_json_string(
            r#"{"namespace_map":{"School":{"location":{"city":"nyc","state":null,"zip":"10001"}}}}"#,
        )
        .unwrap();

        let node = compile(&map);
        assert_eq!(
            node,
            QueryNode::Must(vec![QueryNode::match_field(
                "namespace_map.School.location.city",
                "nyc"
            )])
        );
    }

    #[test]
    fn test_null_halt_is_per_level() {
        // The null ends only the nested level's walk; the outer level's
        // remaining fields still compile.
        let map = AttributesMap::from_json_string(
            r#"{"namespace_map":{"School":{"address":"nyc","location":{"a":null,"b":"x"}}}}"#,
        )
        .unwrap();

        let node = compile(&map);
        assert_eq!(
            node,
            QueryNode::Must(vec![QueryNode::match_field(
                "namespace_map.School.address",
                "nyc"
            )])
        );
    }

    #[test]
    fn test_compile_any_builds_disjunction() {
        let first = AttributesMap::from_entity(&example_school()).unwrap();
        let second = AttributesMap::from_entity(&Student {
            name: Some("April".to_string()),
            age: None,
        })
        .unwrap();

        let mut list = AttributesMapList::new();
        list.push(first.clone());
        list.push(second.clone());

        assert_eq!(
            compile_any(&list),
            QueryNode::Should(vec![compile(&first), compile(&second)])
        );
    }

    #[test]
    fn test_render_wraps_in_namespace_scope() {
        let map = AttributesMap::from_entity(&example_school()).unwrap();

        let rendered = render(&compile(&map));
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(
            parsed,
            json!({
                "query": {
                    "nested": {
                        "path": "namespace_map",
                        "score_mode": "max",
                        "query": {
                            "bool": {
                                "must": [
                                    { "match": { "namespace_map.School.address": "nyc" } }
                                ]
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_compile_multiple_namespaces() {
        let mut map = AttributesMap::from_entity(&example_school()).unwrap();
        map.insert_entity(&Student {
            name: Some("April".to_string()),
            age: None,
        })
        .unwrap();

        let node = compile(&map);
        assert_eq!(
            node,
            QueryNode::Must(vec![
                QueryNode::match_field("namespace_map.School.address", "nyc"),
                QueryNode::match_field("namespace_map.Student.name", "April"),
            ])
        );
    }
}
