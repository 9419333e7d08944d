//! Optimistic transaction ledger for tentative.
//!
//! Wraps a pure reducer so a host can apply changes before a remote
//! operation confirms them, then either keep them or undo them precisely.
//! It provides:
//! - The [`Optimist`] dispatcher with begin, commit, revert, and pass-through paths
//! - [`LedgerEntry`] checkpoints and the replay-based rollback behind revert
//! - [`CompositeState`], the ledger plus inner record exchanged with the host
//! - Pluggable [`Extractor`]s and a [`WarningSink`] for non-fatal anomalies
//! - A JSON [`codec`] for the host-visible composite layout

pub mod codec;
pub mod composite;
pub mod config;
pub mod entry;
pub mod error;
pub mod extract;
pub mod optimist;
mod replay;
pub mod reducer;
pub mod warning;

pub use composite::CompositeState;
pub use config::OptimistConfig;
pub use entry::LedgerEntry;
pub use error::{Handler, OptimistError};
pub use extract::{Extractor, FieldExtractor};
pub use optimist::Optimist;
pub use reducer::Reducer;
pub use warning::{Warning, WarningSink};

pub use tentative_types::{
    Record, TransactionId, TransactionKind, TransactionMarker, BEGIN, COMMIT, REVERT,
};
