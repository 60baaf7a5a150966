//! Aggregate statistics over a labeled table.

use serde::Serialize;

use crate::label::ErrorLabel;
use crate::types::LabeledRecord;

/// Summary statistics the viewer presents above the record inspector.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Total row count.
    pub total: usize,
    /// count(label == CORRECT) / total. Zero for an empty table.
    pub accuracy: f64,
    /// Rows with any label other than CORRECT.
    pub failures: usize,
    /// Most frequent non-CORRECT label. None when every row is correct or
    /// the table is empty; CORRECT never contends.
    pub most_common_error: Option<ErrorLabel>,
    /// Per-label counts, descending.
    pub histogram: Vec<(ErrorLabel, usize)>,
}

impl Summary {
    pub fn compute(records: &[LabeledRecord]) -> Self {
        let total = records.len();
        let correct = records
            .iter()
            .filter(|r| r.error_label == ErrorLabel::Correct)
            .count();
        let accuracy = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        };

        let histogram = crate::pipeline::label_counts(records);
        let most_common_error = histogram
            .iter()
            .find(|(label, _)| label.is_failure())
            .map(|(label, _)| *label);

        Self {
            total,
            accuracy,
            failures: total - correct,
            most_common_error,
            histogram,
        }
    }
}
