//! Key-value persistence for serialized states.
//!
//! [`StateStore`] is the only shared mutable resource the sweeper touches. It
//! makes no promises beyond per-key last-write-wins: no transactions, no
//! isolation between a read and a concurrent remove.

pub mod memory;
pub mod prefixed;

pub use memory::InMemoryStorage;
pub use prefixed::PrefixedStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;

#[async_trait]
pub trait StateStore: Send + Sync {
    fn name(&self) -> &str;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Remove `key`, returning the value it held.
    async fn remove(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Snapshot of every key visible through this store at call time.
    async fn get_all_keys(&self) -> Result<Vec<String>, StoreError>;
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).remove(key).await
    }

    async fn get_all_keys(&self) -> Result<Vec<String>, StoreError> {
        (**self).get_all_keys().await
    }
}
