use std::fmt;

use rand::RngCore;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use super::answers::AnswerSet;

/// Byte length of freshly minted tokens before hex encoding.
pub const TOKEN_BYTES: usize = 8;

/// Opaque per-participant identifier that ties an assignment to its submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyToken(pub String);

impl SurveyToken {
    /// Mint a new 16-character hex token from the thread-local CSPRNG.
    ///
    /// Uniqueness is probabilistic only; the store is not consulted.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurveyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the two questionnaire framings. Serialized as the integer `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Zero,
    One,
}

impl Variant {
    pub fn index(self) -> u8 {
        match self {
            Variant::Zero => 0,
            Variant::One => 1,
        }
    }
}

impl TryFrom<i64> for Variant {
    type Error = UnknownVariant;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Variant::Zero),
            1 => Ok(Variant::One),
            other => Err(UnknownVariant(other)),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

impl Serialize for Variant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.index())
    }
}

impl<'de> Deserialize<'de> for Variant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Variant::try_from(raw).map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("questionnaire type must be 0 or 1, got {0}")]
pub struct UnknownVariant(pub i64);

/// Value of the `type` field returned by the assignment endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionnaireType {
    Assigned(Variant),
    /// Sentinel `-1`: the token already submitted, nothing new was assigned.
    Completed,
}

impl QuestionnaireType {
    pub fn code(self) -> i8 {
        match self {
            QuestionnaireType::Assigned(variant) => variant.index() as i8,
            QuestionnaireType::Completed => -1,
        }
    }
}

impl Serialize for QuestionnaireType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.code())
    }
}

/// A submitted questionnaire. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRecord {
    pub token: SurveyToken,
    pub variant: Variant,
    pub submitted_at_millis: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub answers: AnswerSet,
}

/// Body of a questionnaire submission before required fields are checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Submission {
    #[serde(default, rename = "type")]
    pub variant: Option<Variant>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub answers: Option<AnswerSet>,
    #[serde(default)]
    pub language: Option<String>,
}
