//! Stale-state sweeping.
//!
//! A sweep takes one snapshot of the store's keys and decides each key on its
//! own: keep it, or remove it because its value is gone, unparsable, or was
//! created at or before `now - max_age`. Per-key store failures are reported
//! to the [`Observer`] and never abort the rest of the sweep. Every removal is
//! awaited before the sweep returns.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures_util::{StreamExt, stream};
use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::config::StateConfig;
use crate::error::{StoreError, StoreOperation};
use crate::observability::{Observer, ObserverMetric, SweepEvent, create_observer};
use crate::state::State;
use crate::store::{PrefixedStore, StateStore};

pub const DEFAULT_SWEEP_CONCURRENCY: usize = 1;

/// Why a key was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalReason {
    Expired { created: i64 },
    Malformed { message: String },
    /// Listed by the store but gone by the time it was read.
    Missing,
}

impl fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired { created } => write!(f, "expired (created {created})"),
            Self::Malformed { message } => write!(f, "malformed ({message})"),
            Self::Missing => f.write_str("missing"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub scanned: u64,
    pub retained: u64,
    pub removed_expired: u64,
    pub removed_malformed: u64,
    pub removed_missing: u64,
    /// Keys left in place because a read or remove failed.
    pub failed: u64,
}

impl SweepReport {
    pub fn total_removed(&self) -> u64 {
        self.removed_expired + self.removed_malformed + self.removed_missing
    }

    fn record(&mut self, outcome: &KeyOutcome) {
        self.scanned += 1;
        match outcome {
            KeyOutcome::Retained => self.retained += 1,
            KeyOutcome::Removed(RemovalReason::Expired { .. }) => self.removed_expired += 1,
            KeyOutcome::Removed(RemovalReason::Malformed { .. }) => self.removed_malformed += 1,
            KeyOutcome::Removed(RemovalReason::Missing) => self.removed_missing += 1,
            KeyOutcome::Failed => self.failed += 1,
        }
    }
}

#[derive(Debug)]
enum KeyOutcome {
    Retained,
    Removed(RemovalReason),
    Failed,
}

/// Remove every entry in `store` that is stale, malformed or missing,
/// visiting keys one at a time.
///
/// Only a failure to list the keys is returned; nothing has been touched at
/// that point.
pub async fn clear_stale_state(
    store: &dyn StateStore,
    max_age_secs: u64,
    clock: &dyn Clock,
    observer: &dyn Observer,
) -> Result<SweepReport, StoreError> {
    sweep_with_concurrency(
        store,
        max_age_secs,
        clock,
        observer,
        DEFAULT_SWEEP_CONCURRENCY,
    )
    .await
}

/// Same as [`clear_stale_state`], with up to `concurrency` keys in flight.
pub async fn sweep_with_concurrency(
    store: &dyn StateStore,
    max_age_secs: u64,
    clock: &dyn Clock,
    observer: &dyn Observer,
    concurrency: usize,
) -> Result<SweepReport, StoreError> {
    let started = Instant::now();
    let cutoff = cutoff_for(clock.now(), max_age_secs);

    let keys = match store.get_all_keys().await {
        Ok(keys) => keys,
        Err(err) => {
            observer.record_event(&SweepEvent::StoreFailure {
                key: None,
                operation: StoreOperation::ListKeys,
                message: err.to_string(),
            });
            return Err(err);
        }
    };
    observer.record_event(&SweepEvent::Started {
        keys: keys.len(),
        cutoff,
    });

    let outcomes: Vec<KeyOutcome> = stream::iter(keys)
        .map(|key| sweep_key(store, clock, observer, key, cutoff))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut report = SweepReport::default();
    for outcome in &outcomes {
        report.record(outcome);
    }

    let duration = started.elapsed();
    observer.record_event(&SweepEvent::Completed { report, duration });
    observer.record_metric(&ObserverMetric::EntriesRemoved(report.total_removed()));
    observer.record_metric(&ObserverMetric::SweepLatency(duration));

    Ok(report)
}

fn cutoff_for(now: i64, max_age_secs: u64) -> i64 {
    now.saturating_sub(i64::try_from(max_age_secs).unwrap_or(i64::MAX))
}

async fn sweep_key(
    store: &dyn StateStore,
    clock: &dyn Clock,
    observer: &dyn Observer,
    key: String,
    cutoff: i64,
) -> KeyOutcome {
    let raw = match store.get(&key).await {
        Ok(raw) => raw,
        Err(err) => {
            observer.record_event(&SweepEvent::StoreFailure {
                key: Some(key),
                operation: StoreOperation::Get,
                message: err.to_string(),
            });
            return KeyOutcome::Failed;
        }
    };

    let reason = match raw {
        None => RemovalReason::Missing,
        Some(raw) => match State::from_storage_string(&raw, clock) {
            Ok(state) if state.is_stale(cutoff) => RemovalReason::Expired {
                created: state.created(),
            },
            Ok(state) => {
                observer.record_event(&SweepEvent::Retained {
                    key,
                    created: state.created(),
                });
                return KeyOutcome::Retained;
            }
            Err(err) => RemovalReason::Malformed {
                message: err.to_string(),
            },
        },
    };

    match store.remove(&key).await {
        Ok(_) => {
            observer.record_event(&SweepEvent::Removed {
                key,
                reason: reason.clone(),
            });
            KeyOutcome::Removed(reason)
        }
        Err(err) => {
            observer.record_event(&SweepEvent::StoreFailure {
                key: Some(key),
                operation: StoreOperation::Remove,
                message: err.to_string(),
            });
            KeyOutcome::Failed
        }
    }
}

/// Owns the collaborators a recurring sweep needs.
pub struct StateSweeper {
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn Observer>,
    max_age_secs: u64,
    concurrency: usize,
}

impl StateSweeper {
    pub fn new(
        store: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            store,
            clock,
            observer,
            max_age_secs: StateConfig::default().stale_state_age_secs,
            concurrency: DEFAULT_SWEEP_CONCURRENCY,
        }
    }

    /// Wrap `storage` in the configured prefix and use the system clock and
    /// configured observer.
    pub fn from_config<S: StateStore + 'static>(storage: S, config: &StateConfig) -> Self {
        let store: Arc<dyn StateStore> =
            Arc::new(PrefixedStore::new(config.prefix.clone(), storage));
        let observer: Arc<dyn Observer> = Arc::from(create_observer(&config.observability));
        Self::new(store, Arc::new(SystemClock), observer)
            .with_max_age(config.stale_state_age_secs)
            .with_concurrency(config.sweep_concurrency)
    }

    pub fn with_max_age(mut self, max_age_secs: u64) -> Self {
        self.max_age_secs = max_age_secs;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn max_age_secs(&self) -> u64 {
        self.max_age_secs
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// The (possibly namespaced) store the sweeper reads.
    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub async fn sweep(&self) -> Result<SweepReport, StoreError> {
        sweep_with_concurrency(
            self.store.as_ref(),
            self.max_age_secs,
            self.clock.as_ref(),
            self.observer.as_ref(),
            self.concurrency,
        )
        .await
    }
}
