use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use crate::share::ShareRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("share id already taken: {0}")]
    Collision(String),
    #[error("result store unavailable: {0}")]
    Unavailable(String),
}

pub trait ResultStore: Send + Sync {
    fn insert(&self, record: ShareRecord) -> Result<(), StoreError>;
    fn get(&self, share_id: &str) -> Result<Option<ShareRecord>, StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    records: Mutex<HashMap<String, ShareRecord>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.guard()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<String, ShareRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("result store mutex poisoned".to_string()))
    }
}

impl ResultStore for InMemoryResultStore {
    fn insert(&self, record: ShareRecord) -> Result<(), StoreError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&record.share_id) {
            return Err(StoreError::Collision(record.share_id));
        }
        guard.insert(record.share_id.clone(), record);
        Ok(())
    }

    fn get(&self, share_id: &str) -> Result<Option<ShareRecord>, StoreError> {
        Ok(self.guard()?.get(share_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::panic::AssertUnwindSafe;

    use chrono::Utc;

    use super::{InMemoryResultStore, ResultStore, StoreError};
    use crate::recommend::{Confidence, RecommendationResult};
    use crate::share::ShareRecord;

    fn record(share_id: &str) -> ShareRecord {
        ShareRecord {
            share_id: share_id.to_string(),
            tree_id: "database".to_string(),
            tree_fingerprint: "abc".to_string(),
            result: RecommendationResult {
                recommendation: "postgresql".to_string(),
                scores: BTreeMap::from([("postgresql".to_string(), 4)]),
                result: None,
                answers: Vec::new(),
                tie_breaker: None,
                confidence: Confidence::Low,
            },
            metadata: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn stores_and_returns_records() {
        let store = InMemoryResultStore::new();
        store.insert(record("abc123")).expect("insert failed");
        let loaded = store.get("abc123").expect("get failed").expect("missing record");
        assert_eq!(loaded.result.recommendation, "postgresql");
        assert!(store.get("other").expect("get failed").is_none());
    }

    #[test]
    fn duplicate_ids_collide() {
        let store = InMemoryResultStore::new();
        store.insert(record("abc123")).expect("insert failed");
        assert_eq!(
            store.insert(record("abc123")),
            Err(StoreError::Collision("abc123".to_string()))
        );
        assert_eq!(store.len(), Ok(1));
    }

    #[test]
    fn poisoned_store_is_unavailable_everywhere() {
        let store = InMemoryResultStore::new();
        let _ = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = store.records.lock().expect("lock");
            panic!("writer crashed while holding the lock");
        }));

        assert!(matches!(store.len(), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.is_empty(), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.get("abc123"), Err(StoreError::Unavailable(_))));
        assert!(matches!(
            store.insert(record("abc123")),
            Err(StoreError::Unavailable(_))
        ));
    }
}
