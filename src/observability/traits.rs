use std::time::Duration;

use crate::error::StoreOperation;
use crate::sweep::{RemovalReason, SweepReport};

/// Events the observer can record
#[derive(Debug, Clone, PartialEq)]
pub enum SweepEvent {
    Started {
        keys: usize,
        cutoff: i64,
    },
    Retained {
        key: String,
        created: i64,
    },
    Removed {
        key: String,
        reason: RemovalReason,
    },
    StoreFailure {
        key: Option<String>,
        operation: StoreOperation,
        message: String,
    },
    Completed {
        report: SweepReport,
        duration: Duration,
    },
}

/// Numeric metrics
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverMetric {
    EntriesRemoved(u64),
    SweepLatency(Duration),
}

/// Diagnostics sink injected into the sweeper.
pub trait Observer: Send + Sync {
    /// Record a discrete event
    fn record_event(&self, event: &SweepEvent);

    /// Record a numeric metric
    fn record_metric(&self, metric: &ObserverMetric);

    /// Flush any buffered data (no-op for most backends)
    fn flush(&self) {}

    /// Human-readable name of this observer
    fn name(&self) -> &str;
}
