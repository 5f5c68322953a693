use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::domain::{QuestionnaireType, Submission, SurveyToken};
use super::scoring::ScoreCard;
use super::service::SurveyService;
use super::store::ResponseStore;
use crate::error::AppError;

pub const QUESTIONNAIRE_TYPE_PATH: &str = "/api/questionnaire-type";
pub const SUBMIT_QUESTIONNAIRE_PATH: &str = "/api/submit-questionnaire";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QuestionnaireTypeQuery {
    #[serde(default)]
    pub(crate) token: Option<String>,
}

/// Payload of the assignment endpoint; scores appear only for returning participants.
#[derive(Debug, Serialize)]
pub struct QuestionnaireTypeResponse {
    #[serde(rename = "type")]
    pub questionnaire_type: QuestionnaireType,
    pub token: SurveyToken,
    #[serde(flatten)]
    pub scores: Option<ScoreCard>,
}

/// Router builder exposing the assignment and submission endpoints.
pub fn survey_router<S>(service: Arc<SurveyService<S>>) -> Router
where
    S: ResponseStore + 'static,
{
    Router::new()
        .route(QUESTIONNAIRE_TYPE_PATH, get(questionnaire_type_handler::<S>))
        .route(SUBMIT_QUESTIONNAIRE_PATH, post(submit_handler::<S>))
        .with_state(service)
}

pub(crate) async fn questionnaire_type_handler<S>(
    State(service): State<Arc<SurveyService<S>>>,
    Query(query): Query<QuestionnaireTypeQuery>,
) -> Result<Json<QuestionnaireTypeResponse>, AppError>
where
    S: ResponseStore + 'static,
{
    let assignment = service.assign(query.token.as_deref()).await?;

    Ok(Json(QuestionnaireTypeResponse {
        questionnaire_type: assignment.questionnaire_type(),
        scores: assignment.scores(),
        token: assignment.token().clone(),
    }))
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<SurveyService<S>>>,
    Json(submission): Json<Submission>,
) -> Result<Json<ScoreCard>, AppError>
where
    S: ResponseStore + 'static,
{
    let scores = service.submit(submission).await?;
    Ok(Json(scores))
}
