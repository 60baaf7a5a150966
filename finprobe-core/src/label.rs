//! The closed failure-label taxonomy.
//!
//! Every labeled record carries exactly one of these categories. The judge
//! is only ever offered the seven assignable labels in [`ErrorLabel::CLOSED_SET`];
//! `Unknown` is the pipeline's sentinel for anything that goes wrong on the
//! way to a verdict (call failure, malformed response, out-of-vocabulary
//! label) and is never part of the judge's vocabulary.

use serde::{Deserialize, Serialize};

/// Categorical failure classification for one model answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorLabel {
    /// The answer matches the truth and is consistent with finance conventions.
    Correct,
    /// Numbers from the context are used but the math is wrong.
    ArithmeticError,
    /// Violates standard accounting practice (basic/diluted shares,
    /// pre/post-tax, GAAP vs non-GAAP).
    AccountingConventionError,
    /// Bad assumptions made, or required assumptions missed.
    MissingOrWrongAssumption,
    /// Confuses metrics (EBITDA vs operating income, margin vs dollars).
    WrongMetricOrConcept,
    /// Ignores given context or invents line items not in the document.
    ContextMisuseOrHallucination,
    /// Hand-wavy commentary, refusal, or no actual answer.
    NonAnswerOrGeneric,
    /// Sentinel for failed, malformed, or out-of-vocabulary verdicts.
    Unknown,
}

impl ErrorLabel {
    /// The labels the judge may assign, in prompt order. Excludes `Unknown`.
    pub const CLOSED_SET: [ErrorLabel; 7] = [
        ErrorLabel::Correct,
        ErrorLabel::ArithmeticError,
        ErrorLabel::AccountingConventionError,
        ErrorLabel::MissingOrWrongAssumption,
        ErrorLabel::WrongMetricOrConcept,
        ErrorLabel::ContextMisuseOrHallucination,
        ErrorLabel::NonAnswerOrGeneric,
    ];

    /// Wire representation, as stored in the CSV and shown to the judge.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorLabel::Correct => "CORRECT",
            ErrorLabel::ArithmeticError => "ARITHMETIC_ERROR",
            ErrorLabel::AccountingConventionError => "ACCOUNTING_CONVENTION_ERROR",
            ErrorLabel::MissingOrWrongAssumption => "MISSING_OR_WRONG_ASSUMPTION",
            ErrorLabel::WrongMetricOrConcept => "WRONG_METRIC_OR_CONCEPT",
            ErrorLabel::ContextMisuseOrHallucination => "CONTEXT_MISUSE_OR_HALLUCINATION",
            ErrorLabel::NonAnswerOrGeneric => "NON_ANSWER_OR_GENERIC",
            ErrorLabel::Unknown => "UNKNOWN",
        }
    }

    /// Whether this label counts as a failure for the summary metrics.
    pub fn is_failure(&self) -> bool {
        !matches!(self, ErrorLabel::Correct)
    }
}

impl std::fmt::Display for ErrorLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a member of the label vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a known error label: {0}")]
pub struct UnknownLabel(pub String);

impl std::str::FromStr for ErrorLabel {
    type Err = UnknownLabel;

    /// Exact, case-sensitive match against the wire strings.
    ///
    /// `"UNKNOWN"` parses (the viewer reads it back from persisted rows),
    /// but callers validating judge output must check membership in
    /// [`ErrorLabel::CLOSED_SET`] separately.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CORRECT" => Ok(ErrorLabel::Correct),
            "ARITHMETIC_ERROR" => Ok(ErrorLabel::ArithmeticError),
            "ACCOUNTING_CONVENTION_ERROR" => Ok(ErrorLabel::AccountingConventionError),
            "MISSING_OR_WRONG_ASSUMPTION" => Ok(ErrorLabel::MissingOrWrongAssumption),
            "WRONG_METRIC_OR_CONCEPT" => Ok(ErrorLabel::WrongMetricOrConcept),
            "CONTEXT_MISUSE_OR_HALLUCINATION" => Ok(ErrorLabel::ContextMisuseOrHallucination),
            "NON_ANSWER_OR_GENERIC" => Ok(ErrorLabel::NonAnswerOrGeneric),
            "UNKNOWN" => Ok(ErrorLabel::Unknown),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_roundtrip_all_labels() {
        for label in ErrorLabel::CLOSED_SET {
            assert_eq!(ErrorLabel::from_str(label.as_str()).unwrap(), label);
        }
        assert_eq!(
            ErrorLabel::from_str("UNKNOWN").unwrap(),
            ErrorLabel::Unknown
        );
    }

    #[test]
    fn test_out_of_vocabulary_rejected() {
        assert_eq!(
            ErrorLabel::from_str("FOO"),
            Err(UnknownLabel("FOO".to_string()))
        );
        // Case-sensitive on purpose; the judge contract is exact strings.
        assert!(ErrorLabel::from_str("correct").is_err());
    }

    #[test]
    fn test_closed_set_excludes_unknown() {
        assert!(!ErrorLabel::CLOSED_SET.contains(&ErrorLabel::Unknown));
        assert_eq!(ErrorLabel::CLOSED_SET.len(), 7);
    }

    #[test]
    fn test_is_failure() {
        assert!(!ErrorLabel::Correct.is_failure());
        assert!(ErrorLabel::ArithmeticError.is_failure());
        assert!(ErrorLabel::Unknown.is_failure());
    }

    #[test]
    fn test_serde_wire_strings() {
        let json = serde_json::to_string(&ErrorLabel::WrongMetricOrConcept).unwrap();
        assert_eq!(json, r#""WRONG_METRIC_OR_CONCEPT""#);
        let back: ErrorLabel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ErrorLabel::WrongMetricOrConcept);
    }
}
