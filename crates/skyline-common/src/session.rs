//! Generic session storage traits and utilities.

use async_trait::async_trait;
use miette::Diagnostic;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Errors emitted by session stores.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum SessionStoreError {
    /// Filesystem or I/O error
    #[error("I/O error: {0}")]
    #[diagnostic(code(skyline::session_store::io))]
    Io(#[from] std::io::Error),
    /// Serialization error (e.g., JSON)
    #[error("serialization error: {0}")]
    #[diagnostic(code(skyline::session_store::serde))]
    Serde(#[from] serde_json::Error),
    /// Any other error from a backend implementation
    #[error(transparent)]
    #[diagnostic(code(skyline::session_store::other))]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

/// Pluggable storage for arbitrary session records.
///
/// `get` distinguishes "nothing stored" (`Ok(None)`) from a store that could not be
/// read; callers decide whether a broken store is fatal.
#[async_trait]
pub trait SessionStore<K, T>: Send + Sync
where
    K: Eq + Hash,
    T: Clone,
{
    /// Get the stored session, if any.
    async fn get(&self, key: &K) -> Result<Option<T>, SessionStoreError>;
    /// Persist the given session, replacing whatever was stored.
    async fn set(&self, key: K, session: T) -> Result<(), SessionStoreError>;
    /// Delete the given session.
    async fn del(&self, key: &K) -> Result<(), SessionStoreError>;
}

/// In-memory session store suitable for short-lived sessions and tests.
#[derive(Clone)]
pub struct MemorySessionStore<K, T>(Arc<RwLock<HashMap<K, T>>>);

impl<K, T> Default for MemorySessionStore<K, T> {
    fn default() -> Self {
        Self(Arc::new(RwLock::new(HashMap::new())))
    }
}

impl<K, T> MemorySessionStore<K, T>
where
    K: Eq + Hash,
{
    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.0.read().await.len()
    }

    /// Whether the store holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.0.read().await.is_empty()
    }
}

#[async_trait]
impl<K, T> SessionStore<K, T> for MemorySessionStore<K, T>
where
    K: Eq + Hash + Send + Sync,
    T: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Result<Option<T>, SessionStoreError> {
        Ok(self.0.read().await.get(key).cloned())
    }
    async fn set(&self, key: K, session: T) -> Result<(), SessionStoreError> {
        self.0.write().await.insert(key, session);
        Ok(())
    }
    async fn del(&self, key: &K) -> Result<(), SessionStoreError> {
        self.0.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store: MemorySessionStore<String, u32> = MemorySessionStore::default();
        assert_eq!(store.get(&"a".to_string()).await.unwrap(), None);
        store.set("a".into(), 7).await.unwrap();
        store.set("a".into(), 8).await.unwrap();
        assert_eq!(store.get(&"a".to_string()).await.unwrap(), Some(8));
        assert_eq!(store.len().await, 1);
        store.del(&"a".to_string()).await.unwrap();
        assert!(store.is_empty().await);
    }
}
