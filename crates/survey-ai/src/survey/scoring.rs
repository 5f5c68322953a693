//! AI-likeness and legitimacy scores derived from the five rated emails.
//!
//! Both scores live on a nominal 0-10 scale. Some emails in each questionnaire
//! are framed so that a high rating means "human" or "phishing" instead of
//! "AI" or "legitimate"; those positions are inverted (`10 - value`) before
//! averaging. Nothing here validates input: a sub-score that does not parse
//! yields NaN, which propagates to the final score.

use serde::Serialize;

use super::answers::{AnswerSet, MAX_SUB_SCORE};
use super::domain::Variant;

/// Number of rated emails in every questionnaire.
pub const RATED_EMAILS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Direct,
    Inverted,
}

impl Polarity {
    fn apply(self, value: f64) -> f64 {
        match self {
            Polarity::Direct => value,
            Polarity::Inverted => MAX_SUB_SCORE as f64 - value,
        }
    }
}

use Polarity::{Direct, Inverted};

const AI_POLARITY_VARIANT_0: [Polarity; RATED_EMAILS] =
    [Inverted, Inverted, Direct, Direct, Direct];
const AI_POLARITY_VARIANT_1: [Polarity; RATED_EMAILS] =
    [Direct, Direct, Inverted, Inverted, Direct];
const LEGITIMACY_POLARITY: [Polarity; RATED_EMAILS] =
    [Inverted, Direct, Direct, Inverted, Inverted];

/// Per-position polarity of the AI-likeness score for a questionnaire variant.
pub fn ai_polarity(variant: Variant) -> [Polarity; RATED_EMAILS] {
    match variant {
        Variant::Zero => AI_POLARITY_VARIANT_0,
        Variant::One => AI_POLARITY_VARIANT_1,
    }
}

/// The legitimacy polarity is the same for both variants.
pub fn legitimacy_polarity(_variant: Variant) -> [Polarity; RATED_EMAILS] {
    LEGITIMACY_POLARITY
}

fn polarized_mean(values: [f64; RATED_EMAILS], polarity: [Polarity; RATED_EMAILS]) -> f64 {
    let sum: f64 = values
        .iter()
        .zip(polarity)
        .map(|(value, polarity)| polarity.apply(*value))
        .sum();
    sum / RATED_EMAILS as f64
}

pub fn compute_ai_score(variant: Variant, answers: &AnswerSet) -> f64 {
    polarized_mean(answers.ai_scores(), ai_polarity(variant))
}

/// `variant` is accepted for symmetry with [`compute_ai_score`] and ignored.
pub fn compute_legitimacy_score(variant: Variant, answers: &AnswerSet) -> f64 {
    polarized_mean(answers.legitimacy_scores(), legitimacy_polarity(variant))
}

/// Scores returned to the participant. Always recomputed, never stored.
///
/// Non-finite values serialize as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCard {
    pub ai_score: f64,
    pub legitimacy_score: f64,
    pub avg_score: f64,
}

impl ScoreCard {
    pub fn compute(variant: Variant, answers: &AnswerSet) -> Self {
        let ai_score = compute_ai_score(variant, answers);
        let legitimacy_score = compute_legitimacy_score(variant, answers);
        Self {
            ai_score,
            legitimacy_score,
            avg_score: (ai_score + legitimacy_score) / 2.0,
        }
    }
}
