use std::sync::{Arc, Mutex};

use super::{KeyValueStore, StorageError};

/// Cloneable handle to one store, so several owners write the same file.
#[derive(Debug)]
pub struct SharedStore<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for SharedStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> SharedStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }
}

impl<S: KeyValueStore> KeyValueStore for SharedStore<S> {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().ok()?.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut store = self.inner.lock().map_err(|_| StorageError::Unavailable)?;
        store.set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_clones_see_each_others_writes() {
        let mut a = SharedStore::new(MemoryStore::new());
        let mut b = a.clone();
        a.set("drawings", "[]").unwrap();
        b.set("markers", "[]").unwrap();
        assert_eq!(b.get("drawings").as_deref(), Some("[]"));
        assert_eq!(a.get("markers").as_deref(), Some("[]"));
    }
}
