use std::fmt;

use tentative_types::{TransactionId, TransactionKind};

/// A non-fatal anomaly reported while applying an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// Commit or revert of an id with no open checkpoint.
    MissingTransaction {
        kind: TransactionKind,
        id: TransactionId,
    },
    /// Begin of an id that was already open; the earlier begin is kept as committed.
    ImplicitCommit { id: TransactionId },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTransaction { kind, id } => write!(
                f,
                "cannot {kind} transaction with id \"{id}\" because it does not exist"
            ),
            Self::ImplicitCommit { id } => write!(
                f,
                "transaction with id \"{id}\" was begun while already open; committing the earlier begin"
            ),
        }
    }
}

/// Host-side receiver for [`Warning`]s.
pub trait WarningSink {
    fn warn(&self, warning: &Warning);
}

impl<F> WarningSink for F
where
    F: Fn(&Warning),
{
    fn warn(&self, warning: &Warning) {
        self(warning)
    }
}
