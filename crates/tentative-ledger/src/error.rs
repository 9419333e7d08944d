use std::fmt;

use tentative_types::ShapeKind;

/// Which dispatcher path invoked the wrapped reducer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handler {
    Begin,
    Commit,
    Revert,
    Replay,
    PassThrough,
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Begin => write!(f, "begin"),
            Self::Commit => write!(f, "commit"),
            Self::Revert => write!(f, "revert"),
            Self::Replay => write!(f, "replay"),
            Self::PassThrough => write!(f, "pass-through"),
        }
    }
}

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptimistError {
    #[error("error while handling {handler} event: state must always be a plain record, reducer returned a {found}")]
    InvalidStateShape { handler: Handler, found: ShapeKind },

    #[error("malformed composite state: {0}")]
    MalformedComposite(String),
}
