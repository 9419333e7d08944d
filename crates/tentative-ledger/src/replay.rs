//! Ledger rewrites behind commit and revert.
//!
//! Both scans walk the ledger oldest first and keep only the entries from the
//! first still-open checkpoint onward; anything older can never be replayed
//! again and is drained.

use tentative_types::{Record, TransactionId};
use tracing::debug;

use crate::entry::LedgerEntry;
use crate::error::OptimistError;
use crate::extract::Extractor;

/// Result of [`release`].
pub(crate) struct Released<E> {
    pub ledger: Vec<LedgerEntry<E>>,
    pub found: bool,
}

/// Drop the snapshot of `id`'s checkpoint, turning it into plain history.
pub(crate) fn release<E, X: Extractor<E>>(
    ledger: Vec<LedgerEntry<E>>,
    id: &TransactionId,
    extractor: &X,
) -> Released<E> {
    let mut retained = Vec::with_capacity(ledger.len());
    let mut started = false;
    let mut found = false;

    for entry in ledger {
        let entry = if !found && entry.opens(id, extractor) {
            found = true;
            entry.into_plain()
        } else {
            if entry.is_checkpoint() {
                started = true;
            }
            entry
        };
        if started {
            retained.push(entry);
        }
    }

    Released {
        ledger: retained,
        found,
    }
}

/// Result of [`rewind`].
pub(crate) struct Rewound<E> {
    pub ledger: Vec<LedgerEntry<E>>,
    /// Inner state with the transaction's effects excised, if it was found.
    pub state: Option<Option<Record>>,
    pub replayed: usize,
}

/// Excise `id`'s checkpoint and rebuild the state that follows it.
///
/// Every entry after the checkpoint is replayed through `step`, starting from
/// the checkpoint's snapshot. Checkpoints met along the way are rebased onto
/// the replayed state so they can still be reverted independently.
pub(crate) fn rewind<E, X, F>(
    ledger: Vec<LedgerEntry<E>>,
    id: &TransactionId,
    extractor: &X,
    mut step: F,
) -> Result<Rewound<E>, OptimistError>
where
    X: Extractor<E>,
    F: FnMut(Option<&Record>, &E) -> Result<Record, OptimistError>,
{
    let mut retained = Vec::with_capacity(ledger.len());
    let mut started = false;
    let mut running: Option<Option<Record>> = None;
    let mut replayed = 0;

    for entry in ledger {
        if running.is_none() && entry.opens(id, extractor) {
            if let LedgerEntry::Checkpoint { before, .. } = entry {
                running = Some(before);
            }
            continue;
        }

        let entry = match (entry, &running) {
            (LedgerEntry::Checkpoint { event, .. }, Some(state)) => {
                started = true;
                LedgerEntry::Checkpoint {
                    before: state.clone(),
                    event,
                }
            }
            (entry, _) => {
                if entry.is_checkpoint() {
                    started = true;
                }
                entry
            }
        };

        if let Some(state) = running.as_mut() {
            let next = step(state.as_ref(), entry.event())?;
            *state = Some(next);
            replayed += 1;
        }

        if started {
            retained.push(entry);
        }
    }

    debug!(replayed, retained = retained.len(), "ledger rewound");

    Ok(Rewound {
        ledger: retained,
        state: running,
        replayed,
    })
}
