use serde_json::Value;
use tentative_types::{TransactionMarker, DEFAULT_MARKER_FIELD};
use tracing::trace;

/// Reads transaction-control metadata from an event.
///
/// Returning `None` means the event is an ordinary one.
pub trait Extractor<E> {
    fn extract(&self, event: &E) -> Option<TransactionMarker>;
}

impl<E, F> Extractor<E> for F
where
    F: Fn(&E) -> Option<TransactionMarker>,
{
    fn extract(&self, event: &E) -> Option<TransactionMarker> {
        self(event)
    }
}

/// Default extractor for JSON events: reads a marker object from a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldExtractor {
    field: String,
}

impl FieldExtractor {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_FIELD)
    }
}

impl Extractor<Value> for FieldExtractor {
    fn extract(&self, event: &Value) -> Option<TransactionMarker> {
        let raw = event.get(&self.field)?;
        if raw.is_null() {
            return None;
        }
        match TransactionMarker::from_json(raw) {
            Ok(marker) => Some(marker),
            Err(e) => {
                trace!(field = %self.field, error = %e, "ignoring malformed transaction marker");
                None
            }
        }
    }
}
