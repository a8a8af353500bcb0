use super::traits::{Observer, ObserverMetric, SweepEvent};
use tracing::{debug, info, warn};

/// Log-based observer — uses tracing, zero external deps
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

impl Observer for LogObserver {
    fn record_event(&self, event: &SweepEvent) {
        match event {
            SweepEvent::Started { keys, cutoff } => {
                debug!(keys = keys, cutoff = cutoff, "sweep.start");
            }
            SweepEvent::Retained { key, created } => {
                debug!(key = %key, created = created, "sweep.retained");
            }
            SweepEvent::Removed { key, reason } => {
                debug!(key = %key, reason = %reason, "sweep.removed");
            }
            SweepEvent::StoreFailure {
                key,
                operation,
                message,
            } => {
                warn!(key = ?key, operation = %operation, error = %message, "sweep.store_failure");
            }
            SweepEvent::Completed { report, duration } => {
                let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
                info!(
                    scanned = report.scanned,
                    retained = report.retained,
                    removed = report.total_removed(),
                    failed = report.failed,
                    duration_ms = ms,
                    "sweep.complete"
                );
            }
        }
    }

    fn record_metric(&self, metric: &ObserverMetric) {
        match metric {
            ObserverMetric::EntriesRemoved(count) => {
                info!(count = count, "metric.entries_removed");
            }
            ObserverMetric::SweepLatency(d) => {
                let ms = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
                info!(latency_ms = ms, "metric.sweep_latency");
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
