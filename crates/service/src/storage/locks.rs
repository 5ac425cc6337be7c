use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

/// Per-collection write locks, created lazily on first use.
///
/// Entries are never removed, so the table grows with the number of distinct
/// collection names seen over the life of the process.
#[derive(Debug, Default)]
pub struct LockTable {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the lock for `collection`, inserting a fresh one if none exists.
    pub fn get_or_create(&self, collection: &str) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.get(collection) {
            return Arc::clone(lock.value());
        }
        let entry = self
            .locks
            .entry(collection.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Arc::clone(entry.value())
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_collection_shares_lock() {
        let table = LockTable::new();
        let a = table.get_or_create("users");
        let b = table.get_or_create("users");
        let c = table.get_or_create("orders");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_lookups_create_one_lock() {
        let table = Arc::new(LockTable::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let table = Arc::clone(&table);
                tokio::spawn(async move { table.get_or_create("users") })
            })
            .collect();

        let mut locks = Vec::new();
        for h in handles {
            locks.push(h.await.expect("join"));
        }
        assert_eq!(table.len(), 1);
        assert!(locks.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn lock_excludes_second_holder() {
        let table = LockTable::new();
        let lock = table.get_or_create("users");
        let guard = lock.lock().await;
        assert!(table.get_or_create("users").try_lock().is_err());
        drop(guard);
        assert!(table.get_or_create("users").try_lock().is_ok());
    }
}
