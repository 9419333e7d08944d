use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TypeError;

/// Token opening a transaction.
pub const BEGIN: &str = "BEGIN";
/// Token making a transaction's effects permanent.
pub const COMMIT: &str = "COMMIT";
/// Token undoing a transaction's effects.
pub const REVERT: &str = "REVERT";

/// Conventional event field holding the transaction marker.
pub const DEFAULT_MARKER_FIELD: &str = "optimist";

/// Opaque, host-supplied identity of a transaction.
///
/// Ids are compared by value. A numeric id read from JSON is kept in its
/// decimal string form, so `7` and `"7"` name the same transaction.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read an id from a JSON string or number.
    pub fn from_json(value: &Value) -> Result<Self, TypeError> {
        match value {
            Value::String(s) => Ok(Self(s.clone())),
            Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(TypeError::MalformedMarker(format!(
                "id must be a string or number, got {other}"
            ))),
        }
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TransactionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({:?})", self.0)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a control marker asks the ledger to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Begin,
    Commit,
    Revert,
}

impl TransactionKind {
    /// The published token for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Begin => BEGIN,
            Self::Commit => COMMIT,
            Self::Revert => REVERT,
        }
    }
}

impl FromStr for TransactionKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            BEGIN => Ok(Self::Begin),
            COMMIT => Ok(Self::Commit),
            REVERT => Ok(Self::Revert),
            other => Err(TypeError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction-control metadata carried by an event.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionMarker {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub id: TransactionId,
}

impl TransactionMarker {
    pub fn new(kind: TransactionKind, id: impl Into<TransactionId>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn begin(id: impl Into<TransactionId>) -> Self {
        Self::new(TransactionKind::Begin, id)
    }

    pub fn commit(id: impl Into<TransactionId>) -> Self {
        Self::new(TransactionKind::Commit, id)
    }

    pub fn revert(id: impl Into<TransactionId>) -> Self {
        Self::new(TransactionKind::Revert, id)
    }

    /// Parse a marker from its JSON form `{"type": <token>, "id": <id>}`.
    pub fn from_json(value: &Value) -> Result<Self, TypeError> {
        let object = value
            .as_object()
            .ok_or_else(|| TypeError::MalformedMarker(format!("expected an object, got {value}")))?;
        let kind: TransactionKind = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| TypeError::MalformedMarker("missing \"type\" token".into()))?
            .parse()?;
        let id = object
            .get("id")
            .ok_or_else(|| TypeError::MalformedMarker("missing \"id\"".into()))
            .and_then(TransactionId::from_json)?;
        Ok(Self { kind, id })
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "type": self.kind.as_str(),
            "id": self.id.as_str(),
        })
    }

    /// Attach this marker to a JSON event under `field`, replacing any
    /// marker already present.
    pub fn stamp(&self, event: &mut Value, field: &str) -> Result<(), TypeError> {
        let object = event.as_object_mut().ok_or(TypeError::NotAnObject)?;
        object.insert(field.to_string(), self.to_json());
        Ok(())
    }

    /// Same as [`stamp`](Self::stamp) on the conventional field, by value.
    pub fn attach(&self, mut event: Value) -> Result<Value, TypeError> {
        self.stamp(&mut event, DEFAULT_MARKER_FIELD)?;
        Ok(event)
    }
}

impl fmt::Display for TransactionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn kind_tokens_round_trip_through_from_str() {
        for kind in [
            TransactionKind::Begin,
            TransactionKind::Commit,
            TransactionKind::Revert,
        ] {
            assert_eq!(kind.as_str().parse::<TransactionKind>().unwrap(), kind);
        }
        assert_eq!(
            "ROLLBACK".parse::<TransactionKind>(),
            Err(TypeError::UnknownKind("ROLLBACK".into()))
        );
    }

    #[test]
    fn kind_serializes_as_published_token() {
        assert_eq!(
            serde_json::to_value(TransactionKind::Revert).unwrap(),
            json!(REVERT)
        );
    }

    #[test]
    fn marker_parses_string_and_numeric_ids() {
        let marker = TransactionMarker::from_json(&json!({"type": "BEGIN", "id": "t1"})).unwrap();
        assert_eq!(marker, TransactionMarker::begin("t1"));

        let numeric = TransactionMarker::from_json(&json!({"type": "COMMIT", "id": 7})).unwrap();
        assert_eq!(numeric.id, TransactionId::from("7"));
        assert_eq!(numeric.kind, TransactionKind::Commit);
    }

    #[test]
    fn marker_rejects_malformed_json() {
        assert!(TransactionMarker::from_json(&json!(null)).is_err());
        assert!(TransactionMarker::from_json(&json!({"id": "t1"})).is_err());
        assert!(TransactionMarker::from_json(&json!({"type": "BEGIN"})).is_err());
        assert!(TransactionMarker::from_json(&json!({"type": "BEGIN", "id": [1]})).is_err());
        assert!(matches!(
            TransactionMarker::from_json(&json!({"type": "begin", "id": "t1"})),
            Err(TypeError::UnknownKind(_))
        ));
    }

    #[test]
    fn marker_serde_matches_json_form() {
        let marker = TransactionMarker::revert("abc");
        let value = serde_json::to_value(&marker).unwrap();
        assert_eq!(value, marker.to_json());
        assert_eq!(value, json!({"type": "REVERT", "id": "abc"}));
    }

    #[test]
    fn attach_stamps_conventional_field() {
        let event = TransactionMarker::begin("t1")
            .attach(json!({"type": "SET", "value": 5}))
            .unwrap();
        assert_eq!(event["optimist"], json!({"type": "BEGIN", "id": "t1"}));
        assert_eq!(event["value"], json!(5));

        assert_eq!(
            TransactionMarker::commit("t1").attach(json!([1])),
            Err(TypeError::NotAnObject)
        );
    }

    #[test]
    fn display_formats() {
        assert_eq!(TransactionMarker::commit("x").to_string(), "COMMIT(x)");
        assert_eq!(format!("{:?}", TransactionId::from("x")), "TransactionId(\"x\")");
    }
}
