use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-process string key/value store.
///
/// No persistence and no expiry — contents vanish with the process. Each
/// operation takes the lock once, so set/get/delete are atomic even with
/// parallel callers.
#[derive(Clone, Default)]
pub struct KeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Last write wins.
    pub async fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
    }

    /// Look up a key. `None` for an unset key — never an error.
    pub async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().await;
        entries.get(key).cloned()
    }

    /// Remove a key if present. Deleting an absent key is a no-op;
    /// returns whether the key existed.
    pub async fn delete(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        entries.remove(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let store = KeyValueStore::new();
        store.set("k", "v").await;
        assert_eq!(store.get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn set_overwrites_existing_value() {
        let store = KeyValueStore::new();
        store.set("k", "first").await;
        store.set("k", "second").await;
        assert_eq!(store.get("k").await.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let store = KeyValueStore::new();
        assert_eq!(store.get("missing").await, None);
    }

    #[tokio::test]
    async fn delete_removes_key() {
        let store = KeyValueStore::new();
        store.set("k", "v").await;
        assert!(store.delete("k").await);
        assert_eq!(store.get("k").await, None);
    }

    #[tokio::test]
    async fn delete_absent_key_is_noop() {
        let store = KeyValueStore::new();
        assert!(!store.delete("never-set").await);
    }
}
