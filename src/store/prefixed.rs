use async_trait::async_trait;

use super::StateStore;
use crate::error::StoreError;

pub const DEFAULT_PREFIX: &str = "oidc.";

/// Namespaced view over another store.
///
/// Keys are written as `prefix + key`. [`StateStore::get_all_keys`] only
/// reports keys under the prefix, with the prefix stripped, so anything else
/// sharing the backing store is invisible to the sweeper.
#[derive(Debug)]
pub struct PrefixedStore<S> {
    prefix: String,
    inner: S,
}

impl<S: StateStore> PrefixedStore<S> {
    pub fn new(prefix: impl Into<String>, inner: S) -> Self {
        Self {
            prefix: prefix.into(),
            inner,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }
}

#[async_trait]
impl<S: StateStore> StateStore for PrefixedStore<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(&self.scoped(key)).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.inner.set(&self.scoped(key), value).await
    }

    async fn remove(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.remove(&self.scoped(key)).await
    }

    async fn get_all_keys(&self) -> Result<Vec<String>, StoreError> {
        let keys = self.inner.get_all_keys().await?;
        Ok(keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(self.prefix.as_str()).map(str::to_owned))
            .collect())
    }
}
