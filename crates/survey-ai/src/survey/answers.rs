use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upper bound of the rating scale used by every sub-score.
pub const MAX_SUB_SCORE: i64 = 10;

/// The five rated emails, keyed `email1`..`email5` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSet {
    pub email1: EmailAnswer,
    pub email2: EmailAnswer,
    pub email3: EmailAnswer,
    pub email4: EmailAnswer,
    pub email5: EmailAnswer,
}

impl AnswerSet {
    /// Entries in position order, paired with their wire keys.
    pub fn entries(&self) -> [(&'static str, &EmailAnswer); 5] {
        [
            ("email1", &self.email1),
            ("email2", &self.email2),
            ("email3", &self.email3),
            ("email4", &self.email4),
            ("email5", &self.email5),
        ]
    }

    pub fn ai_scores(&self) -> [f64; 5] {
        self.entries().map(|(_, answer)| answer.ai_score.value())
    }

    pub fn legitimacy_scores(&self) -> [f64; 5] {
        self.entries()
            .map(|(_, answer)| answer.legitimacy_score.value())
    }

    /// Require every sub-score to be an integer on the 0..=10 scale.
    pub fn validate(&self) -> Result<(), AnswerValidationError> {
        for (entry, answer) in self.entries() {
            answer.ai_score.validate(entry, "aiScore")?;
            answer.legitimacy_score.validate(entry, "legitimacyScore")?;
        }
        Ok(())
    }
}

/// Ratings for one email. Unknown keys are kept so the stored document
/// matches what the client sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAnswer {
    #[serde(default, skip_serializing_if = "SubScore::is_missing")]
    pub ai_score: SubScore,
    #[serde(default, skip_serializing_if = "SubScore::is_missing")]
    pub legitimacy_score: SubScore,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl EmailAnswer {
    pub fn new(ai_score: i64, legitimacy_score: i64) -> Self {
        Self {
            ai_score: SubScore::from(ai_score),
            legitimacy_score: SubScore::from(legitimacy_score),
            extra: BTreeMap::new(),
        }
    }
}

/// A sub-score exactly as the client sent it.
///
/// Parsing is deferred to [`SubScore::value`] so malformed input turns into
/// NaN during scoring instead of failing the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubScore(pub Value);

impl SubScore {
    pub fn is_missing(&self) -> bool {
        self.0.is_null()
    }

    /// Leading-integer interpretation of the raw value; NaN when there is none.
    pub fn value(&self) -> f64 {
        match &self.0 {
            Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    int as f64
                } else if let Some(uint) = number.as_u64() {
                    uint as f64
                } else {
                    number.as_f64().map(truncate_float).unwrap_or(f64::NAN)
                }
            }
            Value::String(raw) => parse_leading_integer(raw),
            _ => f64::NAN,
        }
    }

    fn strict_integer(&self) -> Option<i64> {
        match &self.0 {
            Value::Number(number) => number.as_i64(),
            Value::String(raw) => raw.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    fn validate(
        &self,
        entry: &'static str,
        field: &'static str,
    ) -> Result<(), AnswerValidationError> {
        let value = self
            .strict_integer()
            .ok_or_else(|| AnswerValidationError::NotAnInteger {
                entry,
                field,
                raw: self.0.to_string(),
            })?;
        if !(0..=MAX_SUB_SCORE).contains(&value) {
            return Err(AnswerValidationError::OutOfRange {
                entry,
                field,
                value,
            });
        }
        Ok(())
    }
}

impl From<i64> for SubScore {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

impl From<&str> for SubScore {
    fn from(value: &str) -> Self {
        Self(Value::from(value))
    }
}

/// Integer part of a float as its decimal rendering would read it.
///
/// Magnitudes of at least 1e21 or below 1e-6 render in exponent form, so only
/// the leading mantissa digit survives (`1e21` and `1e-7` both read as 1).
fn truncate_float(value: f64) -> f64 {
    let magnitude = value.abs();
    if magnitude >= 1e21 || (magnitude != 0.0 && magnitude < 1e-6) {
        parse_leading_integer(&format!("{value:e}"))
    } else {
        value.trunc()
    }
}

fn parse_leading_integer(raw: &str) -> f64 {
    let trimmed = raw.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1.0, &trimmed[1..]),
        Some(b'+') => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    let (radix, digits) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let mut value = 0.0_f64;
    let mut seen_digit = false;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(digit) => {
                value = value * f64::from(radix) + f64::from(digit);
                seen_digit = true;
            }
            None => break,
        }
    }

    if seen_digit {
        sign * value
    } else {
        f64::NAN
    }
}

/// How strictly sub-scores are checked before a submission is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoreValidation {
    /// Accept anything; malformed values surface as NaN scores.
    #[default]
    Lenient,
    /// Reject non-integer or out-of-range sub-scores.
    Strict,
}

impl ScoreValidation {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" => Some(Self::Lenient),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    pub fn check(self, answers: &AnswerSet) -> Result<(), AnswerValidationError> {
        match self {
            ScoreValidation::Lenient => Ok(()),
            ScoreValidation::Strict => answers.validate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnswerValidationError {
    #[error("{entry}.{field} must be an integer, got {raw}")]
    NotAnInteger {
        entry: &'static str,
        field: &'static str,
        raw: String,
    },
    #[error("{entry}.{field} must be between 0 and 10, got {value}")]
    OutOfRange {
        entry: &'static str,
        field: &'static str,
        value: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn score(raw: Value) -> f64 {
        SubScore(raw).value()
    }

    #[test]
    fn numbers_parse_as_integers() {
        assert_eq!(score(json!(7)), 7.0);
        assert_eq!(score(json!(0)), 0.0);
        assert_eq!(score(json!(7.9)), 7.0);
        assert_eq!(score(json!(-2.5)), -2.0);
    }

    #[test]
    fn exponent_form_numbers_keep_only_the_leading_digit() {
        assert_eq!(score(json!(1e21)), 1.0);
        assert_eq!(score(json!(1.5e21)), 1.0);
        assert_eq!(score(json!(-3e25)), -3.0);
        assert_eq!(score(json!(1e-7)), 1.0);
        assert_eq!(score(json!(2.5e-7)), 2.0);
        assert_eq!(score(json!(0.000001)), 0.0);
        assert_eq!(score(json!(9.99e20)), 999_000_000_000_000_000_000.0);
        assert_eq!(score(json!(0.0)), 0.0);
    }

    #[test]
    fn strings_use_leading_digits() {
        assert_eq!(score(json!("8")), 8.0);
        assert_eq!(score(json!("  6 ")), 6.0);
        assert_eq!(score(json!("7abc")), 7.0);
        assert_eq!(score(json!("3.9")), 3.0);
        assert_eq!(score(json!("-4")), -4.0);
        assert_eq!(score(json!("+5")), 5.0);
        assert_eq!(score(json!("0xA")), 10.0);
    }

    #[test]
    fn garbage_becomes_nan() {
        for raw in [
            json!("abc"),
            json!(""),
            json!("-"),
            json!(null),
            json!(true),
            json!([5]),
            json!({ "value": 5 }),
        ] {
            assert!(score(raw.clone()).is_nan(), "{raw} should be NaN");
        }
    }

    #[test]
    fn missing_fields_deserialize_as_nan() {
        let answer: EmailAnswer =
            serde_json::from_value(json!({ "aiScore": 4 })).expect("answer parses");
        assert_eq!(answer.ai_score.value(), 4.0);
        assert!(answer.legitimacy_score.is_missing());
        assert!(answer.legitimacy_score.value().is_nan());
    }

    #[test]
    fn extra_answer_keys_survive_round_trip() {
        let raw = json!({ "aiScore": "4", "legitimacyScore": 6, "comment": "looked fine" });
        let answer: EmailAnswer = serde_json::from_value(raw.clone()).expect("answer parses");
        assert_eq!(answer.extra.get("comment"), Some(&json!("looked fine")));
        assert_eq!(serde_json::to_value(&answer).expect("serializes"), raw);
    }

    #[test]
    fn answer_set_requires_all_five_entries() {
        let raw = json!({
            "email1": { "aiScore": 1, "legitimacyScore": 1 },
            "email2": { "aiScore": 1, "legitimacyScore": 1 },
            "email3": { "aiScore": 1, "legitimacyScore": 1 },
            "email4": { "aiScore": 1, "legitimacyScore": 1 },
        });
        assert!(serde_json::from_value::<AnswerSet>(raw).is_err());
    }

    #[test]
    fn strict_validation_rejects_bad_scores() {
        let mut answers = AnswerSet {
            email1: EmailAnswer::new(0, 10),
            email2: EmailAnswer::new(5, 5),
            email3: EmailAnswer::new(5, 5),
            email4: EmailAnswer::new(5, 5),
            email5: EmailAnswer::new(5, 5),
        };
        assert!(ScoreValidation::Strict.check(&answers).is_ok());

        answers.email3.legitimacy_score = SubScore::from(11);
        assert_eq!(
            ScoreValidation::Strict.check(&answers),
            Err(AnswerValidationError::OutOfRange {
                entry: "email3",
                field: "legitimacyScore",
                value: 11,
            })
        );
        assert!(ScoreValidation::Lenient.check(&answers).is_ok());

        answers.email3.legitimacy_score = SubScore::from("7abc");
        assert!(matches!(
            ScoreValidation::Strict.check(&answers),
            Err(AnswerValidationError::NotAnInteger { entry: "email3", .. })
        ));
    }

    #[test]
    fn strict_validation_accepts_integer_strings() {
        let answers = AnswerSet {
            email1: EmailAnswer {
                ai_score: SubScore::from("3"),
                legitimacy_score: SubScore::from(" 9 "),
                extra: BTreeMap::new(),
            },
            email2: EmailAnswer::new(0, 0),
            email3: EmailAnswer::new(0, 0),
            email4: EmailAnswer::new(0, 0),
            email5: EmailAnswer::new(0, 0),
        };
        assert!(answers.validate().is_ok());
    }
}
