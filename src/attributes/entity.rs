//! Per-type contract for records stored as attribute maps.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Contract for types that can be encoded into and decoded from an
/// attribute map.
///
/// The namespace is the type-name key that isolates one record type's
/// attribute set inside a combined map. The default implementation derives
/// it from the unqualified runtime type name, so a record type usually needs
/// nothing more than an empty impl block:
///
/// ```
/// use mejiro::attributes::Entity;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct School {
///     address: Option<String>,
/// }
///
/// impl Entity for School {}
///
/// assert_eq!(School::namespace(), "School");
/// ```
///
/// Override `namespace` for generic types, whose runtime names carry type
/// parameters.
pub trait Entity: Serialize + DeserializeOwned {
    /// The type-name key for this record type.
    fn namespace() -> &'static str {
        let name = std::any::type_name::<Self>();
        name.rsplit("::").next().unwrap_or(name)
    }
}

// Primitive scalars participate too; they encode as a self-describing
// single-field wrapper under their own type name.
impl Entity for bool {}
impl Entity for char {}
impl Entity for String {}
impl Entity for i16 {}
impl Entity for i32 {}
impl Entity for i64 {}
impl Entity for f32 {}
impl Entity for f64 {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Student {
        name: Option<String>,
    }

    impl Entity for Student {}

    #[test]
    fn test_namespace_from_type_name() {
        assert_eq!(Student::namespace(), "Student");
    }

    #[test]
    fn test_scalar_namespaces() {
        assert_eq!(String::namespace(), "String");
        assert_eq!(bool::namespace(), "bool");
        assert_eq!(i64::namespace(), "i64");
        assert_eq!(f64::namespace(), "f64");
        assert_eq!(char::namespace(), "char");
    }

    #[test]
    fn test_namespace_override() {
        #[derive(Serialize, Deserialize)]
        struct Wrapped(String);

        impl Entity for Wrapped {
            fn namespace() -> &'static str {
                "Alias"
            }
        }

        assert_eq!(Wrapped::namespace(), "Alias");
    }
}
