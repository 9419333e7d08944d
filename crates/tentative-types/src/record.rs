use std::fmt;

use serde_json::Value;

/// The plain key-value record a wrapped reducer produces.
pub type Record = serde_json::Map<String, Value>;

/// JSON shape of a value returned by a wrapped reducer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Null,
    Bool,
    Number,
    String,
    List,
    Record,
}

impl ShapeKind {
    /// Classify a JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Record,
        }
    }

    /// Returns `true` only for a keyed record.
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool => write!(f, "boolean"),
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
            Self::List => write!(f, "list"),
            Self::Record => write!(f, "record"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn only_objects_are_records() {
        assert!(ShapeKind::of(&json!({"a": 1})).is_record());
        assert!(ShapeKind::of(&json!({})).is_record());
        assert_eq!(ShapeKind::of(&json!([1, 2])), ShapeKind::List);
        assert_eq!(ShapeKind::of(&Value::Null), ShapeKind::Null);
        assert_eq!(ShapeKind::of(&json!("x")), ShapeKind::String);
    }

    #[test]
    fn display_names_the_shape() {
        assert_eq!(ShapeKind::List.to_string(), "list");
        assert_eq!(ShapeKind::Null.to_string(), "null");
    }
}
