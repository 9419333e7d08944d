use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown transaction type token: {0}")]
    UnknownKind(String),

    #[error("transaction marker is malformed: {0}")]
    MalformedMarker(String),

    #[error("event is not a JSON object; cannot attach a transaction marker")]
    NotAnObject,
}
