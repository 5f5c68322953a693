use clap::Args;
use std::path::PathBuf;
use survey_ai::error::AppError;
use survey_ai::survey::{AnswerSet, ScoreCard, ScoreValidation, Variant};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Questionnaire variant the answers were collected under (0 or 1)
    #[arg(long, value_parser = parse_variant)]
    pub(crate) variant: Variant,
    /// JSON file holding the five rated emails (`email1`..`email5`)
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Reject non-integer or out-of-range ratings instead of scoring them as NaN
    #[arg(long)]
    pub(crate) strict: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        variant,
        answers,
        strict,
    } = args;

    let validation = if strict {
        ScoreValidation::Strict
    } else {
        ScoreValidation::Lenient
    };

    let raw = std::fs::read_to_string(&answers)?;
    let card = score_answers(&raw, variant, validation)?;
    println!("{}", serde_json::to_string_pretty(&card)?);
    Ok(())
}

pub(crate) fn score_answers(
    raw: &str,
    variant: Variant,
    validation: ScoreValidation,
) -> Result<ScoreCard, AppError> {
    let answers: AnswerSet = serde_json::from_str(raw)?;
    validation.check(&answers)?;
    Ok(ScoreCard::compute(variant, &answers))
}

fn parse_variant(raw: &str) -> Result<Variant, String> {
    raw.trim()
        .parse::<i64>()
        .map_err(|err| format!("failed to parse '{raw}' as a variant ({err})"))
        .and_then(|value| Variant::try_from(value).map_err(|err| err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWERS: &str = r#"{
        "email1": { "aiScore": 10, "legitimacyScore": 5 },
        "email2": { "aiScore": 10, "legitimacyScore": 5 },
        "email3": { "aiScore": 0, "legitimacyScore": 5 },
        "email4": { "aiScore": 0, "legitimacyScore": 5 },
        "email5": { "aiScore": 0, "legitimacyScore": "eleven" }
    }"#;

    #[test]
    fn scores_answers_for_each_variant() {
        let card = score_answers(ANSWERS, Variant::One, ScoreValidation::Lenient)
            .expect("lenient scoring succeeds");
        assert_eq!(card.ai_score, 8.0);
        assert!(card.legitimacy_score.is_nan());

        let card = score_answers(ANSWERS, Variant::Zero, ScoreValidation::Lenient)
            .expect("lenient scoring succeeds");
        assert_eq!(card.ai_score, 0.0);
    }

    #[test]
    fn strict_mode_surfaces_validation_errors() {
        let err = score_answers(ANSWERS, Variant::Zero, ScoreValidation::Strict)
            .expect_err("strict rejects");
        assert!(err.to_string().contains("email5.legitimacyScore"));
    }

    #[test]
    fn malformed_json_is_an_input_error() {
        let err = score_answers("{ \"email1\": ", Variant::Zero, ScoreValidation::Lenient)
            .expect_err("parse fails");
        assert!(matches!(err, AppError::Input(_)));
    }

    #[test]
    fn parses_variant_codes() {
        assert_eq!(parse_variant("0"), Ok(Variant::Zero));
        assert_eq!(parse_variant(" 1 "), Ok(Variant::One));
        assert!(parse_variant("-1").is_err());
        assert!(parse_variant("one").is_err());
    }
}
