//! Foundation types for tentative.
//!
//! This crate provides the identity and marker types shared by the
//! optimistic ledger and its hosts. Host code uses it to build events that
//! open, commit, or revert a transaction.
//!
//! # Key Types
//!
//! - [`TransactionId`] — Opaque, host-supplied transaction identity
//! - [`TransactionKind`] — One of the published [`BEGIN`], [`COMMIT`], [`REVERT`] tokens
//! - [`TransactionMarker`] — The `{type, id}` control metadata carried by an event
//! - [`Record`] — The plain key-value record a wrapped reducer works on

pub mod error;
pub mod record;
pub mod transaction;

pub use error::TypeError;
pub use record::{Record, ShapeKind};
pub use transaction::{
    TransactionId, TransactionKind, TransactionMarker, BEGIN, COMMIT, DEFAULT_MARKER_FIELD, REVERT,
};
