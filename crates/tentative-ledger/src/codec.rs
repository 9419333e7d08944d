//! JSON layout of a composite state.
//!
//! The ledger sits under a configurable key next to the inner record's own
//! keys. A checkpoint entry is `{"beforeState": <record|null>, "action": <event>}`
//! and a plain entry is `{"action": <event>}`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tentative_types::Record;

use crate::composite::CompositeState;
use crate::entry::LedgerEntry;
use crate::error::OptimistError;
use crate::extract::Extractor;
use crate::optimist::Optimist;
use crate::reducer::Reducer;

const BEFORE_STATE: &str = "beforeState";
const ACTION: &str = "action";

/// Encode `state` with its ledger under `ledger_key`.
///
/// If the inner record has its own `ledger_key`, the ledger takes precedence.
pub fn encode<E: Serialize>(
    state: &CompositeState<E>,
    ledger_key: &str,
) -> Result<Value, OptimistError> {
    let entries = state
        .ledger()
        .iter()
        .map(encode_entry)
        .collect::<Result<Vec<_>, _>>()?;

    let mut object = state.inner().clone();
    object.insert(ledger_key.to_string(), Value::Array(entries));
    Ok(Value::Object(object))
}

/// Decode a composite state; a missing ledger key means an empty ledger.
pub fn decode<E: DeserializeOwned>(
    value: Value,
    ledger_key: &str,
) -> Result<CompositeState<E>, OptimistError> {
    let Value::Object(mut inner) = value else {
        return Err(OptimistError::MalformedComposite(
            "composite state must be a JSON object".into(),
        ));
    };

    let ledger = match inner.remove(ledger_key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| decode_entry(index, entry))
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(OptimistError::MalformedComposite(format!(
                "ledger under \"{ledger_key}\" must be a list, got {other}"
            )))
        }
    };

    Ok(CompositeState::from_parts(ledger, inner))
}

fn encode_entry<E: Serialize>(entry: &LedgerEntry<E>) -> Result<Value, OptimistError> {
    let event = serde_json::to_value(entry.event())
        .map_err(|e| OptimistError::MalformedComposite(e.to_string()))?;

    let mut object = Record::new();
    if let LedgerEntry::Checkpoint { before, .. } = entry {
        let before = before.clone().map(Value::Object).unwrap_or(Value::Null);
        object.insert(BEFORE_STATE.into(), before);
    }
    object.insert(ACTION.into(), event);
    Ok(Value::Object(object))
}

fn decode_entry<E: DeserializeOwned>(
    index: usize,
    entry: Value,
) -> Result<LedgerEntry<E>, OptimistError> {
    let malformed = |reason: &str| {
        OptimistError::MalformedComposite(format!("ledger entry {index}: {reason}"))
    };

    let Value::Object(mut object) = entry else {
        return Err(malformed("expected an object"));
    };
    let action = object
        .remove(ACTION)
        .ok_or_else(|| malformed("missing \"action\""))?;
    let event: E = serde_json::from_value(action).map_err(|e| malformed(&e.to_string()))?;

    match object.remove(BEFORE_STATE) {
        None => Ok(LedgerEntry::Plain { event }),
        Some(Value::Null) => Ok(LedgerEntry::Checkpoint {
            before: None,
            event,
        }),
        Some(Value::Object(before)) => Ok(LedgerEntry::Checkpoint {
            before: Some(before),
            event,
        }),
        Some(_) => Err(malformed("\"beforeState\" must be a record or null")),
    }
}

impl<R, E, X> Optimist<R, E, X>
where
    R: Reducer<E>,
    X: Extractor<E>,
    E: Clone + Serialize + DeserializeOwned,
{
    /// Encode `state` using the configured ledger key.
    pub fn to_value(&self, state: &CompositeState<E>) -> Result<Value, OptimistError> {
        encode(state, &self.config().ledger_key)
    }

    /// Decode a state previously produced by [`to_value`](Self::to_value).
    pub fn from_value(&self, value: Value) -> Result<CompositeState<E>, OptimistError> {
        decode(value, &self.config().ledger_key)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: i64) -> Record {
        let mut record = Record::new();
        record.insert("value".into(), json!(value));
        record
    }

    #[test]
    fn settled_state_encodes_with_empty_ledger() {
        let state: CompositeState<Value> = CompositeState::settled(record(0));
        assert_eq!(
            encode(&state, "optimist").unwrap(),
            json!({"optimist": [], "value": 0})
        );
    }

    #[test]
    fn entries_use_host_layout() {
        let begin = json!({"type": "SET", "optimist": {"type": "BEGIN", "id": "t1"}});
        let state = CompositeState::from_parts(
            vec![
                LedgerEntry::Checkpoint {
                    before: Some(record(0)),
                    event: begin.clone(),
                },
                LedgerEntry::Checkpoint {
                    before: None,
                    event: json!({"type": "LATE"}),
                },
                LedgerEntry::Plain {
                    event: json!({"type": "INCREMENT"}),
                },
            ],
            record(6),
        );

        let encoded = encode(&state, "optimist").unwrap();
        assert_eq!(
            encoded,
            json!({
                "optimist": [
                    {"beforeState": {"value": 0}, "action": begin},
                    {"beforeState": null, "action": {"type": "LATE"}},
                    {"action": {"type": "INCREMENT"}}
                ],
                "value": 6
            })
        );
        assert_eq!(decode::<Value>(encoded, "optimist").unwrap(), state);
    }

    #[test]
    fn ledger_key_wins_over_inner_key() {
        let mut inner = record(1);
        inner.insert("pending".into(), json!("shadowed"));
        let state: CompositeState<Value> = CompositeState::settled(inner);
        let encoded = encode(&state, "pending").unwrap();
        assert_eq!(encoded["pending"], json!([]));
    }

    #[test]
    fn missing_ledger_decodes_as_settled() {
        let state: CompositeState<Value> = decode(json!({"value": 3}), "optimist").unwrap();
        assert!(state.is_settled());
        assert_eq!(state.get("value"), Some(&json!(3)));
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        assert!(decode::<Value>(json!([1]), "optimist").is_err());
        assert!(decode::<Value>(json!({"optimist": {}}), "optimist").is_err());
        assert!(decode::<Value>(json!({"optimist": [{"beforeState": null}]}), "optimist").is_err());
        assert!(decode::<Value>(
            json!({"optimist": [{"beforeState": [1], "action": {}}]}),
            "optimist"
        )
        .is_err());

        let err = decode::<Value>(json!({"optimist": [7]}), "optimist").unwrap_err();
        assert_eq!(
            err,
            OptimistError::MalformedComposite("ledger entry 0: expected an object".into())
        );
    }
}
