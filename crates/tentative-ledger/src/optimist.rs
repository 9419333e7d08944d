use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;
use tentative_types::{Record, TransactionId, TransactionKind};
use tracing::{debug, warn};

use crate::composite::CompositeState;
use crate::config::OptimistConfig;
use crate::entry::LedgerEntry;
use crate::error::{Handler, OptimistError};
use crate::extract::{Extractor, FieldExtractor};
use crate::reducer::{into_record, Reducer};
use crate::replay::{release, rewind};
use crate::warning::{Warning, WarningSink};

/// Optimistic-update dispatcher around a pure reducer.
///
/// Every call to [`apply`](Self::apply) classifies the event by its
/// transaction marker and routes it to the begin, commit, revert, or
/// pass-through path. Calls must be serialized: each returned state is the
/// input of the next call.
pub struct Optimist<R, E = Value, X = FieldExtractor> {
    reducer: R,
    extractor: X,
    config: OptimistConfig,
    sink: Option<Box<dyn WarningSink>>,
    _event: PhantomData<fn(&E)>,
}

impl<R: Reducer<Value>> Optimist<R, Value, FieldExtractor> {
    /// Wrap a reducer over JSON events with the default configuration.
    pub fn new(reducer: R) -> Self {
        Self::with_config(reducer, OptimistConfig::default())
    }

    pub fn with_config(reducer: R, config: OptimistConfig) -> Self {
        let extractor = FieldExtractor::new(config.marker_field.clone());
        Self::with_extractor(reducer, extractor, config)
    }
}

impl<R, E, X> Optimist<R, E, X>
where
    R: Reducer<E>,
    X: Extractor<E>,
    E: Clone,
{
    pub fn with_extractor(reducer: R, extractor: X, config: OptimistConfig) -> Self {
        Self {
            reducer,
            extractor,
            config,
            sink: None,
            _event: PhantomData,
        }
    }

    /// Forward every [`Warning`] to `sink` in addition to the log.
    pub fn on_warning(mut self, sink: impl WarningSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn config(&self) -> &OptimistConfig {
        &self.config
    }

    /// Apply one event to a composite state.
    ///
    /// `state` is `None` on the first call. The only error is
    /// [`OptimistError::InvalidStateShape`], raised by the reducer call that
    /// returned something other than a record.
    pub fn apply(
        &self,
        state: Option<CompositeState<E>>,
        event: &E,
    ) -> Result<CompositeState<E>, OptimistError> {
        let Some(marker) = self.extractor.extract(event) else {
            return self.pass_through(state, event);
        };

        let (ledger, inner) = split(state);
        debug!(
            kind = %marker.kind,
            id = %marker.id,
            ledger_len = ledger.len(),
            "routing transaction event"
        );
        match marker.kind {
            TransactionKind::Begin => self.begin(ledger, inner, event, &marker.id),
            TransactionKind::Commit => self.commit(ledger, inner, event, &marker.id),
            TransactionKind::Revert => self.revert(ledger, inner, event, &marker.id),
        }
    }

    /// Fold a sequence of events, stopping at the first error.
    pub fn apply_all<'a, I>(
        &self,
        state: Option<CompositeState<E>>,
        events: I,
    ) -> Result<Option<CompositeState<E>>, OptimistError>
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        events
            .into_iter()
            .try_fold(state, |state, event| self.apply(state, event).map(Some))
    }

    /// Ids of the transactions still open in `state`, oldest first.
    pub fn open_transactions(&self, state: &CompositeState<E>) -> Vec<TransactionId> {
        state
            .ledger()
            .iter()
            .filter(|entry| entry.is_checkpoint())
            .filter_map(|entry| self.extractor.extract(entry.event()))
            .map(|marker| marker.id)
            .collect()
    }

    pub fn is_pending(&self, state: &CompositeState<E>, id: &TransactionId) -> bool {
        state
            .ledger()
            .iter()
            .any(|entry| entry.opens(id, &self.extractor))
    }

    fn pass_through(
        &self,
        state: Option<CompositeState<E>>,
        event: &E,
    ) -> Result<CompositeState<E>, OptimistError> {
        match state {
            Some(state) if state.is_settled() && self.config.skip_unchanged => {
                let next = self.reducer.reduce(Some(state.inner()), event);
                if next.as_object() == Some(state.inner()) {
                    return Ok(state);
                }
                let inner = into_record(next, Handler::PassThrough)?;
                Ok(CompositeState::settled(inner))
            }
            state => {
                let (ledger, inner) = split(state);
                self.settle(ledger, inner, event, Handler::PassThrough)
            }
        }
    }

    fn begin(
        &self,
        ledger: Vec<LedgerEntry<E>>,
        inner: Option<Record>,
        event: &E,
        id: &TransactionId,
    ) -> Result<CompositeState<E>, OptimistError> {
        let mut ledger = if ledger.iter().any(|entry| entry.opens(id, &self.extractor)) {
            self.report(Warning::ImplicitCommit { id: id.clone() });
            release(ledger, id, &self.extractor).ledger
        } else {
            ledger
        };

        let next = self.reduce(inner.as_ref(), event, Handler::Begin)?;
        ledger.push(LedgerEntry::Checkpoint {
            before: inner,
            event: event.clone(),
        });
        Ok(CompositeState::from_parts(ledger, next))
    }

    fn commit(
        &self,
        ledger: Vec<LedgerEntry<E>>,
        inner: Option<Record>,
        event: &E,
        id: &TransactionId,
    ) -> Result<CompositeState<E>, OptimistError> {
        let released = release(ledger, id, &self.extractor);
        if !released.found {
            self.report(Warning::MissingTransaction {
                kind: TransactionKind::Commit,
                id: id.clone(),
            });
        }
        self.settle(released.ledger, inner, event, Handler::Commit)
    }

    fn revert(
        &self,
        ledger: Vec<LedgerEntry<E>>,
        inner: Option<Record>,
        event: &E,
        id: &TransactionId,
    ) -> Result<CompositeState<E>, OptimistError> {
        let rewound = rewind(ledger, id, &self.extractor, |state, replayed| {
            self.reduce(state, replayed, Handler::Replay)
        })?;

        let baseline = match rewound.state {
            Some(state) => {
                debug!(%id, replayed = rewound.replayed, "transaction reverted");
                state
            }
            None => {
                self.report(Warning::MissingTransaction {
                    kind: TransactionKind::Revert,
                    id: id.clone(),
                });
                inner
            }
        };
        self.settle(rewound.ledger, baseline, event, Handler::Revert)
    }

    /// Record `event` if a transaction is still open, then reduce it.
    fn settle(
        &self,
        mut ledger: Vec<LedgerEntry<E>>,
        inner: Option<Record>,
        event: &E,
        handler: Handler,
    ) -> Result<CompositeState<E>, OptimistError> {
        let next = self.reduce(inner.as_ref(), event, handler)?;
        if !ledger.is_empty() {
            ledger.push(LedgerEntry::Plain {
                event: event.clone(),
            });
        }
        Ok(CompositeState::from_parts(ledger, next))
    }

    fn reduce(
        &self,
        state: Option<&Record>,
        event: &E,
        handler: Handler,
    ) -> Result<Record, OptimistError> {
        into_record(self.reducer.reduce(state, event), handler)
    }

    fn report(&self, warning: Warning) {
        warn!("{warning}");
        if let Some(sink) = &self.sink {
            sink.warn(&warning);
        }
    }
}

impl<R, E, X: fmt::Debug> fmt::Debug for Optimist<R, E, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Optimist")
            .field("extractor", &self.extractor)
            .field("config", &self.config)
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

fn split<E>(state: Option<CompositeState<E>>) -> (Vec<LedgerEntry<E>>, Option<Record>) {
    match state {
        Some(state) => {
            let (ledger, inner) = state.into_parts();
            (ledger, Some(inner))
        }
        None => (Vec::new(), None),
    }
}
