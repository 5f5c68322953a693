use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::answers::{AnswerValidationError, ScoreValidation};
use super::assignment::{resolve_token, VariantCounts};
use super::domain::{QuestionnaireType, Submission, SurveyRecord, SurveyToken, Variant};
use super::scoring::ScoreCard;
use super::store::{ResponseStore, StoreError};

/// Service composing the response store, the variant balancer, and scoring.
///
/// Assignment reads both counts and then decides without holding any lock.
/// Two participants arriving together may both land in the same variant;
/// later assignments even that out.
pub struct SurveyService<S> {
    store: Arc<S>,
    validation: ScoreValidation,
}

/// Outcome of asking for a questionnaire.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// The token already submitted; scores are recomputed from the stored answers.
    Returning {
        token: SurveyToken,
        scores: ScoreCard,
    },
    Assigned {
        variant: Variant,
        token: SurveyToken,
    },
}

impl Assignment {
    pub fn questionnaire_type(&self) -> QuestionnaireType {
        match self {
            Assignment::Returning { .. } => QuestionnaireType::Completed,
            Assignment::Assigned { variant, .. } => QuestionnaireType::Assigned(*variant),
        }
    }

    pub fn token(&self) -> &SurveyToken {
        match self {
            Assignment::Returning { token, .. } | Assignment::Assigned { token, .. } => token,
        }
    }

    pub fn scores(&self) -> Option<ScoreCard> {
        match self {
            Assignment::Returning { scores, .. } => Some(*scores),
            Assignment::Assigned { .. } => None,
        }
    }
}

impl<S> SurveyService<S>
where
    S: ResponseStore + 'static,
{
    pub fn new(store: Arc<S>, validation: ScoreValidation) -> Self {
        Self { store, validation }
    }

    /// Hand out a questionnaire variant, or recognize a participant who already submitted.
    pub async fn assign(
        &self,
        supplied_token: Option<&str>,
    ) -> Result<Assignment, SurveyServiceError> {
        if let Some(token) = supplied_token.filter(|token| !token.is_empty()) {
            let token = SurveyToken(token.to_string());
            if let Some(record) = self.store.find_by_token(&token).await? {
                debug!(token = %record.token, "returning participant");
                let scores = ScoreCard::compute(record.variant, &record.answers);
                return Ok(Assignment::Returning {
                    token: record.token,
                    scores,
                });
            }
        }

        let counts = self.counts().await?;
        let variant = counts.next_variant();
        let token = resolve_token(supplied_token);
        debug!(
            %token,
            %variant,
            variant_0 = counts.variant_0,
            variant_1 = counts.variant_1,
            "assigned questionnaire variant"
        );

        Ok(Assignment::Assigned { variant, token })
    }

    /// Persist a completed questionnaire and return its scores.
    pub async fn submit(&self, submission: Submission) -> Result<ScoreCard, SurveyServiceError> {
        let Submission {
            variant,
            token,
            answers,
            language,
        } = submission;
        let token = token.filter(|token| !token.is_empty());
        info!(token = token.as_deref().unwrap_or("<none>"), "submission received");

        let (variant, token, answers) = match (variant, token, answers) {
            (Some(variant), Some(token), Some(answers)) => (variant, SurveyToken(token), answers),
            (variant, token, answers) => {
                let mut missing = Vec::new();
                if variant.is_none() {
                    missing.push("type");
                }
                if token.is_none() {
                    missing.push("token");
                }
                if answers.is_none() {
                    missing.push("answers");
                }
                warn!(?missing, "submission rejected");
                return Err(SurveyServiceError::MissingFields(missing));
            }
        };

        self.validation.check(&answers)?;

        let record = SurveyRecord {
            token,
            variant,
            submitted_at_millis: Utc::now().timestamp_millis(),
            language,
            answers,
        };

        let stored = self.store.insert(record).await?;
        Ok(ScoreCard::compute(stored.variant, &stored.answers))
    }

    /// Current submission counts for both variants.
    pub async fn counts(&self) -> Result<VariantCounts, SurveyServiceError> {
        let (variant_0, variant_1) = tokio::try_join!(
            self.store.count_by_variant(Variant::Zero),
            self.store.count_by_variant(Variant::One),
        )?;
        Ok(VariantCounts {
            variant_0,
            variant_1,
        })
    }
}

/// Error raised by the survey service.
#[derive(Debug, thiserror::Error)]
pub enum SurveyServiceError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error(transparent)]
    InvalidAnswers(#[from] AnswerValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
