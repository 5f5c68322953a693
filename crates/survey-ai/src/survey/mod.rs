//! Two-variant email survey: variant balancing, response storage, and scoring.
//!
//! Participants ask for a questionnaire, receive a variant (0 or 1) and a
//! token, and later submit five rated emails under that token. Scores are
//! derived from the stored answers every time they are requested.

pub mod answers;
pub mod assignment;
pub mod domain;
pub mod router;
pub mod scoring;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use answers::{AnswerSet, AnswerValidationError, EmailAnswer, ScoreValidation, SubScore};
pub use assignment::{choose_variant, resolve_token, VariantCounts};
pub use domain::{QuestionnaireType, Submission, SurveyRecord, SurveyToken, Variant};
pub use router::survey_router;
pub use scoring::{compute_ai_score, compute_legitimacy_score, ScoreCard};
pub use service::{Assignment, SurveyService, SurveyServiceError};
pub use store::{InMemoryResponseStore, PostgresResponseStore, ResponseStore, StoreError};
