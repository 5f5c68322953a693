use super::domain::{SurveyToken, Variant};

/// Placeholder some browser clients send when they have no token yet.
const UNDEFINED_TOKEN: &str = "undefined";

/// Pick the variant with fewer recorded submissions; ties go to variant 0.
///
/// Greedy and stateless: concurrent callers that read the same counts get the
/// same answer, so balance is approximate and self-corrects over time.
pub fn choose_variant(count_variant_0: u64, count_variant_1: u64) -> Variant {
    if count_variant_0 <= count_variant_1 {
        Variant::Zero
    } else {
        Variant::One
    }
}

/// Snapshot of stored submissions per variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariantCounts {
    pub variant_0: u64,
    pub variant_1: u64,
}

impl VariantCounts {
    pub fn next_variant(&self) -> Variant {
        choose_variant(self.variant_0, self.variant_1)
    }

    pub fn record(&mut self, variant: Variant) {
        match variant {
            Variant::Zero => self.variant_0 += 1,
            Variant::One => self.variant_1 += 1,
        }
    }
}

/// A client-supplied token worth reusing for a fresh assignment, if any.
fn usable_token(supplied: Option<&str>) -> Option<SurveyToken> {
    supplied
        .filter(|token| !token.is_empty() && *token != UNDEFINED_TOKEN)
        .map(|token| SurveyToken(token.to_string()))
}

/// Reuse the caller's token verbatim when present, otherwise mint one.
pub fn resolve_token(supplied: Option<&str>) -> SurveyToken {
    usable_token(supplied).unwrap_or_else(SurveyToken::generate)
}
