use serde::{Deserialize, Serialize};
use tentative_types::DEFAULT_MARKER_FIELD;

/// Configuration for an [`Optimist`](crate::Optimist) dispatcher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimistConfig {
    /// Key under which the ledger appears in the JSON form of a composite state.
    pub ledger_key: String,
    /// Event field the default extractor reads the transaction marker from.
    pub marker_field: String,
    /// When `true`, a plain event that leaves a settled state unchanged
    /// returns the incoming composite state as is.
    pub skip_unchanged: bool,
}

impl Default for OptimistConfig {
    fn default() -> Self {
        Self {
            ledger_key: DEFAULT_MARKER_FIELD.to_string(),
            marker_field: DEFAULT_MARKER_FIELD.to_string(),
            skip_unchanged: true,
        }
    }
}

impl OptimistConfig {
    /// Use `key` both as the ledger key and the marker field.
    pub fn keyed(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            ledger_key: key.clone(),
            marker_field: key,
            ..Default::default()
        }
    }
}
