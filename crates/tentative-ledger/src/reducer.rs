use serde_json::Value;
use tentative_types::{Record, ShapeKind};

use crate::error::{Handler, OptimistError};

/// A pure state-transition function wrapped by the ledger.
///
/// `state` is `None` only on the very first call. Implementations must be
/// deterministic: the ledger replays them to rebuild state after a revert.
pub trait Reducer<E> {
    fn reduce(&self, state: Option<&Record>, event: &E) -> Value;
}

impl<E, F> Reducer<E> for F
where
    F: Fn(Option<&Record>, &E) -> Value,
{
    fn reduce(&self, state: Option<&Record>, event: &E) -> Value {
        self(state, event)
    }
}

/// Accept a reducer result only if it is a keyed record.
pub(crate) fn into_record(value: Value, handler: Handler) -> Result<Record, OptimistError> {
    match value {
        Value::Object(record) => Ok(record),
        other => Err(OptimistError::InvalidStateShape {
            handler,
            found: ShapeKind::of(&other),
        }),
    }
}
