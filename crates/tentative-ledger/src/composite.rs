use serde_json::Value;
use tentative_types::Record;

use crate::entry::LedgerEntry;

/// The value exchanged with the host on every call: the ledger plus the
/// wrapped reducer's inner state.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeState<E> {
    ledger: Vec<LedgerEntry<E>>,
    inner: Record,
}

impl<E> CompositeState<E> {
    pub fn from_parts(ledger: Vec<LedgerEntry<E>>, inner: Record) -> Self {
        Self { ledger, inner }
    }

    /// A composite state with no open transactions.
    pub fn settled(inner: Record) -> Self {
        Self::from_parts(Vec::new(), inner)
    }

    /// Recorded entries, oldest first.
    pub fn ledger(&self) -> &[LedgerEntry<E>] {
        &self.ledger
    }

    pub fn inner(&self) -> &Record {
        &self.inner
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    /// Returns `true` when no transaction is open.
    pub fn is_settled(&self) -> bool {
        self.ledger.is_empty()
    }

    pub fn into_parts(self) -> (Vec<LedgerEntry<E>>, Record) {
        (self.ledger, self.inner)
    }

    pub fn into_inner(self) -> Record {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn settled_state_exposes_inner_record() {
        let mut inner = Record::new();
        inner.insert("value".into(), json!(0));
        let state: CompositeState<Value> = CompositeState::settled(inner.clone());

        assert!(state.is_settled());
        assert!(state.ledger().is_empty());
        assert_eq!(state.get("value"), Some(&json!(0)));
        assert_eq!(state.get("missing"), None);
        assert_eq!(state.into_inner(), inner);
    }

    #[test]
    fn ledger_makes_state_unsettled() {
        let state = CompositeState::from_parts(
            vec![LedgerEntry::Plain {
                event: json!({"type": "SET"}),
            }],
            Record::new(),
        );
        assert!(!state.is_settled());
        let (ledger, inner) = state.into_parts();
        assert_eq!(ledger.len(), 1);
        assert!(inner.is_empty());
    }
}
