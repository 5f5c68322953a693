//! Persistence boundary for submitted questionnaires.

mod memory;
mod postgres;

use async_trait::async_trait;

use super::domain::{SurveyRecord, SurveyToken, Variant};

pub use memory::InMemoryResponseStore;
pub use postgres::PostgresResponseStore;

/// Storage abstraction so the service can be exercised without a database.
///
/// Implementations must treat `insert` as insert-once per token.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Number of stored submissions for a variant.
    async fn count_by_variant(&self, variant: Variant) -> Result<u64, StoreError>;

    async fn find_by_token(&self, token: &SurveyToken)
        -> Result<Option<SurveyRecord>, StoreError>;

    /// Persist a new submission; `StoreError::Conflict` if the token already has one.
    async fn insert(&self, record: SurveyRecord) -> Result<SurveyRecord, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a submission already exists for this token")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store query failed: {0}")]
    Query(String),
    #[error("stored record is unreadable: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_store_is_object_safe() {
        fn _takes_boxed(_: Box<dyn ResponseStore>) {}
    }
}
