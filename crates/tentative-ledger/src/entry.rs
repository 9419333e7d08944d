use tentative_types::{Record, TransactionId};

use crate::extract::Extractor;

/// One recorded step of the ledger.
#[derive(Clone, Debug, PartialEq)]
pub enum LedgerEntry<E> {
    /// Start of an open transaction and the inner state just before it.
    ///
    /// `before` is `None` when the transaction began on an unset state.
    Checkpoint { before: Option<Record>, event: E },
    /// An event recorded while some transaction was open.
    Plain { event: E },
}

impl<E> LedgerEntry<E> {
    pub fn event(&self) -> &E {
        match self {
            Self::Checkpoint { event, .. } | Self::Plain { event } => event,
        }
    }

    pub fn into_event(self) -> E {
        match self {
            Self::Checkpoint { event, .. } | Self::Plain { event } => event,
        }
    }

    pub fn is_checkpoint(&self) -> bool {
        matches!(self, Self::Checkpoint { .. })
    }

    /// The rollback snapshot of a checkpoint, if any.
    pub fn before_state(&self) -> Option<&Record> {
        match self {
            Self::Checkpoint { before, .. } => before.as_ref(),
            Self::Plain { .. } => None,
        }
    }

    /// Drop the snapshot, keeping the event as history.
    pub fn into_plain(self) -> Self {
        Self::Plain {
            event: self.into_event(),
        }
    }

    /// Returns `true` if this is the open checkpoint of transaction `id`.
    pub fn opens<X: Extractor<E>>(&self, id: &TransactionId, extractor: &X) -> bool {
        self.is_checkpoint()
            && extractor
                .extract(self.event())
                .is_some_and(|marker| marker.id == *id)
    }
}
