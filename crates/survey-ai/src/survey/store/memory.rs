use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{ResponseStore, StoreError};
use crate::survey::domain::{SurveyRecord, SurveyToken, Variant};

/// Process-local store for tests and database-free runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryResponseStore {
    records: Arc<Mutex<HashMap<SurveyToken, SurveyRecord>>>,
}

impl InMemoryResponseStore {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SurveyToken, SurveyRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store mutex poisoned".to_string()))
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }
}

#[async_trait]
impl ResponseStore for InMemoryResponseStore {
    async fn count_by_variant(&self, variant: Variant) -> Result<u64, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .values()
            .filter(|record| record.variant == variant)
            .count() as u64)
    }

    async fn find_by_token(
        &self,
        token: &SurveyToken,
    ) -> Result<Option<SurveyRecord>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.get(token).cloned())
    }

    async fn insert(&self, record: SurveyRecord) -> Result<SurveyRecord, StoreError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&record.token) {
            return Err(StoreError::Conflict);
        }
        guard.insert(record.token.clone(), record.clone());
        Ok(record)
    }
}
