#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;

use authstate::observability::ObserverMetric;
use authstate::{
    Clock, InMemoryStorage, Observer, State, StateArgs, StateStore, StoreError, StoreOperation,
    SweepEvent,
};

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Observer that keeps every event for later assertions.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SweepEvent>>,
    metrics: Mutex<Vec<ObserverMetric>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SweepEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn metrics(&self) -> Vec<ObserverMetric> {
        self.metrics.lock().unwrap().clone()
    }

    pub fn store_failures(&self) -> Vec<(Option<String>, StoreOperation)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SweepEvent::StoreFailure { key, operation, .. } => Some((key, operation)),
                _ => None,
            })
            .collect()
    }

    pub fn removed_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .events()
            .into_iter()
            .filter_map(|event| match event {
                SweepEvent::Removed { key, .. } => Some(key),
                _ => None,
            })
            .collect();
        keys.sort();
        keys
    }
}

impl Observer for RecordingObserver {
    fn record_event(&self, event: &SweepEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn record_metric(&self, metric: &ObserverMetric) {
        self.metrics.lock().unwrap().push(metric.clone());
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Store whose operations fail for chosen keys.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryStorage,
    pub fail_get: HashSet<String>,
    pub fail_remove: HashSet<String>,
    pub fail_list: bool,
}

#[async_trait]
impl StateStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_get.contains(key) {
            return Err(anyhow::anyhow!("read of '{key}' timed out").into());
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_remove.contains(key) {
            return Err(StoreError::operation(
                StoreOperation::Remove,
                key,
                "permission denied",
            ));
        }
        self.inner.remove(key).await
    }

    async fn get_all_keys(&self) -> Result<Vec<String>, StoreError> {
        if self.fail_list {
            return Err(StoreError::Unavailable {
                backend: "flaky".into(),
                message: "connection refused".into(),
            });
        }
        self.inner.get_all_keys().await
    }
}

/// Store that lists keys another actor already removed.
pub struct GhostStore {
    pub inner: Arc<InMemoryStorage>,
    pub ghosts: Vec<String>,
}

#[async_trait]
impl StateStore for GhostStore {
    fn name(&self) -> &str {
        "ghost"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.remove(key).await
    }

    async fn get_all_keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = self.inner.get_all_keys().await?;
        keys.extend(self.ghosts.iter().cloned());
        Ok(keys)
    }
}

/// Store whose removals only land after a delay.
pub struct SlowRemoveStore {
    pub inner: Arc<InMemoryStorage>,
    pub delay: Duration,
}

#[async_trait]
impl StateStore for SlowRemoveStore {
    fn name(&self) -> &str {
        "slow-remove"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<Option<String>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.remove(key).await
    }

    async fn get_all_keys(&self) -> Result<Vec<String>, StoreError> {
        self.inner.get_all_keys().await
    }
}

/// Write a state with a fixed id and creation time.
pub async fn seed(store: &dyn StateStore, clock: &dyn Clock, id: &str, created: i64) -> State {
    let state = State::new(
        StateArgs::new("type").with_id(id).with_created(created),
        clock,
    );
    state.save(store).await.unwrap();
    state
}

pub async fn sorted_keys(store: &dyn StateStore) -> Vec<String> {
    let mut keys = store.get_all_keys().await.unwrap();
    keys.sort();
    keys
}
