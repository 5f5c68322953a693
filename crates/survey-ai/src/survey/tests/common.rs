use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::survey::answers::{AnswerSet, EmailAnswer, ScoreValidation};
use crate::survey::domain::{Submission, SurveyRecord, SurveyToken, Variant};
use crate::survey::router::survey_router;
use crate::survey::service::SurveyService;
use crate::survey::store::{InMemoryResponseStore, ResponseStore, StoreError};

pub(super) fn answers(ai: [i64; 5], legitimacy: [i64; 5]) -> AnswerSet {
    let entry = |i: usize| EmailAnswer::new(ai[i], legitimacy[i]);
    AnswerSet {
        email1: entry(0),
        email2: entry(1),
        email3: entry(2),
        email4: entry(3),
        email5: entry(4),
    }
}

pub(super) fn submission(variant: Variant, token: &str) -> Submission {
    Submission {
        variant: Some(variant),
        token: Some(token.to_string()),
        answers: Some(answers([10, 10, 0, 0, 0], [5; 5])),
        language: Some("en-GB".to_string()),
    }
}

pub(super) fn stored_record(token: &str, variant: Variant) -> SurveyRecord {
    SurveyRecord {
        token: SurveyToken(token.to_string()),
        variant,
        submitted_at_millis: 1_717_000_000_000,
        language: None,
        answers: answers([10, 10, 0, 0, 0], [5; 5]),
    }
}

pub(super) fn build_service() -> (
    SurveyService<InMemoryResponseStore>,
    Arc<InMemoryResponseStore>,
) {
    build_service_with(ScoreValidation::Lenient)
}

pub(super) fn build_service_with(
    validation: ScoreValidation,
) -> (
    SurveyService<InMemoryResponseStore>,
    Arc<InMemoryResponseStore>,
) {
    let store = Arc::new(InMemoryResponseStore::default());
    let service = SurveyService::new(store.clone(), validation);
    (service, store)
}

pub(super) async fn seed(store: &InMemoryResponseStore, variant: Variant, count: usize) {
    for _ in 0..count {
        store
            .insert(stored_record(SurveyToken::generate().as_str(), variant))
            .await
            .expect("seed insert succeeds");
    }
}

pub(super) struct UnavailableStore;

#[async_trait]
impl ResponseStore for UnavailableStore {
    async fn count_by_variant(&self, _variant: Variant) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn find_by_token(
        &self,
        _token: &SurveyToken,
    ) -> Result<Option<SurveyRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn insert(&self, _record: SurveyRecord) -> Result<SurveyRecord, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn router_with_service(service: SurveyService<InMemoryResponseStore>) -> axum::Router {
    survey_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
