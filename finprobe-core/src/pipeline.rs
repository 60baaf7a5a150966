//! The labeling pipeline.
//!
//! For each sampled record: ask the target model for a candidate answer,
//! then ask the judge model to classify it against the truth, then append a
//! composed record to the batch. Nothing is persisted until the whole batch
//! finishes.
//!
//! The error policy is deliberately lossy and best-effort: every failure on
//! the way to a verdict is swallowed at the point of occurrence and
//! represented as a sentinel value (empty answer, `UNKNOWN` label) so that a
//! failed sample still produces a row. Output cardinality always equals
//! input cardinality. No retries.

use futures::StreamExt;
use serde_json::Value;
use std::str::FromStr;
use tracing::{info, warn};

use crate::label::ErrorLabel;
use crate::prompts;
use crate::providers::LlmProvider;
use crate::types::{CompletionRequest, LabeledRecord, Message, ResponseFormat, SampleRecord};

/// Ask the target model for a candidate answer.
///
/// Any provider error is logged and substituted with an empty-string answer;
/// the non-answer flows downstream to be labeled by the judge rather than
/// aborting the batch.
pub async fn answer_question(target: &dyn LlmProvider, record: &SampleRecord) -> String {
    let request = CompletionRequest {
        messages: vec![Message::user(prompts::target_prompt(
            &record.question,
            &record.context,
        ))],
        ..Default::default()
    };

    match target.complete(request).await {
        Ok(response) => response.content.trim().to_string(),
        Err(err) => {
            warn!(model = target.model_name(), error = %err, "Target call failed; recording empty answer");
            String::new()
        }
    }
}

/// Ask the judge model to classify a candidate answer against the truth.
///
/// The judge is treated as untrusted input: the response must parse as an
/// object with exactly the fields `label` and `rationale`, and the label
/// must be a member of the closed set. Call failure, malformed output, and
/// out-of-vocabulary labels all collapse to `UNKNOWN` with a diagnostic
/// rationale; this call never fails the batch.
pub async fn judge_answer(
    judge: &dyn LlmProvider,
    question: &str,
    truth: &str,
    model_answer: &str,
) -> (ErrorLabel, String) {
    let request = CompletionRequest {
        messages: vec![
            Message::system(prompts::judge_system_prompt()),
            Message::user(prompts::judge_prompt(question, truth, model_answer)),
        ],
        response_format: Some(ResponseFormat::JsonSchema {
            name: prompts::LABEL_SCHEMA_NAME.to_string(),
            schema: prompts::label_schema(),
            strict: true,
        }),
        ..Default::default()
    };

    let content = match judge.complete(request).await {
        Ok(response) => response.content,
        Err(err) => {
            warn!(model = judge.model_name(), error = %err, "Judge call failed; recording UNKNOWN");
            return (ErrorLabel::Unknown, format!("Judge call failed: {err}"));
        }
    };

    if content.trim().is_empty() {
        return (
            ErrorLabel::Unknown,
            "No content returned by judge".to_string(),
        );
    }

    let parsed: Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "Judge returned unparseable JSON; recording UNKNOWN");
            return (ErrorLabel::Unknown, format!("JSON decode error: {err}"));
        }
    };

    let label_str = parsed.get("label").and_then(|v| v.as_str()).unwrap_or("");
    let rationale = parsed
        .get("rationale")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    match ErrorLabel::from_str(label_str) {
        Ok(label) if ErrorLabel::CLOSED_SET.contains(&label) => (label, rationale),
        _ => {
            warn!(label = label_str, "Invalid label returned; storing as UNKNOWN");
            (ErrorLabel::Unknown, rationale)
        }
    }
}

/// Label one sample: target call, then judge call, then compose the record.
async fn label_record(
    target: &dyn LlmProvider,
    judge: &dyn LlmProvider,
    sample: SampleRecord,
) -> LabeledRecord {
    let model_answer = answer_question(target, &sample).await;
    let (error_label, error_rationale) =
        judge_answer(judge, &sample.question, &sample.answer, &model_answer).await;

    LabeledRecord {
        sample,
        model_answer,
        error_label,
        error_rationale,
    }
}

/// Run the labeling batch over every sampled record.
///
/// Per-record atomicity (target, then judge) is always preserved. Records
/// are processed with bounded, order-preserving concurrency; `concurrency`
/// of 1 is fully sequential. The returned vector has exactly one labeled
/// record per input sample, in input order, even when every call fails.
pub async fn run_batch(
    target: &dyn LlmProvider,
    judge: &dyn LlmProvider,
    samples: Vec<SampleRecord>,
    concurrency: usize,
) -> Vec<LabeledRecord> {
    let total = samples.len();
    info!(
        total,
        target = target.model_name(),
        judge = judge.model_name(),
        "Labeling batch started"
    );

    let records: Vec<LabeledRecord> = futures::stream::iter(samples)
        .map(|sample| label_record(target, judge, sample))
        .buffered(concurrency.max(1))
        .enumerate()
        .map(|(i, record)| {
            info!(
                progress = format!("{}/{}", i + 1, total),
                label = %record.error_label,
                "Labeled sample"
            );
            record
        })
        .collect()
        .await;

    debug_assert_eq!(records.len(), total);
    records
}

/// Run the whole job: fetch, sample, label, persist.
///
/// The batch is accumulated in memory and written once at the end; an
/// interrupted run loses all progress. Returns the labeled records for the
/// caller's summary output.
pub async fn run_to_file(
    target: &dyn LlmProvider,
    judge: &dyn LlmProvider,
    source: &dyn crate::dataset::RecordSource,
    run: &crate::config::RunConfig,
) -> crate::error::Result<Vec<LabeledRecord>> {
    let records = source.fetch().await?;
    let samples = crate::sampler::sample_records(records, run.samples, run.seed);
    info!(
        requested = run.samples,
        selected = samples.len(),
        seed = run.seed,
        "Sampled question bank"
    );

    let labeled = run_batch(target, judge, samples, run.concurrency).await;
    crate::report::write_csv(&run.output, &labeled)?;
    Ok(labeled)
}

/// Per-label frequency over a batch, descending by count.
pub fn label_counts(records: &[LabeledRecord]) -> Vec<(ErrorLabel, usize)> {
    let mut counts: Vec<(ErrorLabel, usize)> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|(l, _)| *l == record.error_label) {
            Some((_, n)) => *n += 1,
            None => counts.push((record.error_label, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockProvider;
    use pretty_assertions::assert_eq;

    fn sample(question: &str) -> SampleRecord {
        SampleRecord {
            question: question.to_string(),
            answer: "the truth".to_string(),
            question_type: "basic".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_answer_question_failure_yields_empty_answer() {
        let target = MockProvider::always_failing("network down");
        let answer = answer_question(&target, &sample("Q?")).await;
        assert_eq!(answer, "");
    }

    #[tokio::test]
    async fn test_answer_question_trims_whitespace() {
        let target = MockProvider::with_response("  $4.2B, up 8% YoY.\n");
        let answer = answer_question(&target, &sample("Q?")).await;
        assert_eq!(answer, "$4.2B, up 8% YoY.");
    }

    #[tokio::test]
    async fn test_judge_answer_happy_path() {
        let judge = MockProvider::with_response(
            r#"{"label": "ARITHMETIC_ERROR", "rationale": "Summed the wrong rows."}"#,
        );
        let (label, rationale) = judge_answer(&judge, "Q?", "truth", "candidate").await;
        assert_eq!(label, ErrorLabel::ArithmeticError);
        assert_eq!(rationale, "Summed the wrong rows.");
    }

    #[tokio::test]
    async fn test_judge_call_failure_yields_unknown_with_diagnostic() {
        let judge = MockProvider::always_failing("503 from upstream");
        let (label, rationale) = judge_answer(&judge, "Q?", "truth", "candidate").await;
        assert_eq!(label, ErrorLabel::Unknown);
        assert!(!rationale.is_empty());
        assert!(rationale.contains("503 from upstream"));
    }

    #[tokio::test]
    async fn test_judge_malformed_json_yields_unknown() {
        let judge = MockProvider::with_response("the answer is wrong because");
        let (label, rationale) = judge_answer(&judge, "Q?", "truth", "candidate").await;
        assert_eq!(label, ErrorLabel::Unknown);
        assert!(rationale.contains("JSON decode error"));
    }

    #[tokio::test]
    async fn test_judge_empty_content_yields_unknown() {
        let judge = MockProvider::with_response("");
        let (label, rationale) = judge_answer(&judge, "Q?", "truth", "candidate").await;
        assert_eq!(label, ErrorLabel::Unknown);
        assert!(!rationale.is_empty());
    }

    #[tokio::test]
    async fn test_judge_out_of_vocabulary_label_coerced_to_unknown() {
        let judge =
            MockProvider::with_response(r#"{"label": "FOO", "rationale": "made-up bucket"}"#);
        let (label, rationale) = judge_answer(&judge, "Q?", "truth", "candidate").await;
        assert_eq!(label, ErrorLabel::Unknown);
        // Well-formed responses keep their rationale through the coercion.
        assert_eq!(rationale, "made-up bucket");
    }

    #[tokio::test]
    async fn test_judge_cannot_self_assign_the_sentinel() {
        let judge =
            MockProvider::with_response(r#"{"label": "UNKNOWN", "rationale": "not sure"}"#);
        let (label, _) = judge_answer(&judge, "Q?", "truth", "candidate").await;
        // UNKNOWN parses but is not in the judge's closed set, so the
        // coercion path (with its warning) handles it.
        assert_eq!(label, ErrorLabel::Unknown);
    }

    #[tokio::test]
    async fn test_batch_cardinality_under_total_failure() {
        let target = MockProvider::always_failing("down");
        let judge = MockProvider::always_failing("also down");
        let samples: Vec<_> = (0..7).map(|i| sample(&format!("Q{i}"))).collect();

        let records = run_batch(&target, &judge, samples, 1).await;
        assert_eq!(records.len(), 7);
        for record in &records {
            assert_eq!(record.model_answer, "");
            assert_eq!(record.error_label, ErrorLabel::Unknown);
            assert!(!record.error_rationale.is_empty());
        }
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order() {
        let target = MockProvider::with_response("42");
        let judge = MockProvider::with_response(r#"{"label": "CORRECT", "rationale": "ok"}"#);
        let samples: Vec<_> = (0..5).map(|i| sample(&format!("Q{i}"))).collect();

        // Concurrency above 1 must still produce input-ordered output.
        let records = run_batch(&target, &judge, samples, 4).await;
        let questions: Vec<_> = records.iter().map(|r| r.sample.question.as_str()).collect();
        assert_eq!(questions, vec!["Q0", "Q1", "Q2", "Q3", "Q4"]);
    }

    #[tokio::test]
    async fn test_batch_zero_concurrency_clamped() {
        let target = MockProvider::with_response("42");
        let judge = MockProvider::with_response(r#"{"label": "CORRECT", "rationale": "ok"}"#);
        let records = run_batch(&target, &judge, vec![sample("Q0")], 0).await;
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_label_counts_descending() {
        let target = MockProvider::with_response("42");
        let judge = MockProvider::new("mock-model");
        judge.queue_text(r#"{"label": "CORRECT", "rationale": ""}"#);
        judge.queue_text(r#"{"label": "CORRECT", "rationale": ""}"#);
        judge.queue_text(r#"{"label": "ARITHMETIC_ERROR", "rationale": ""}"#);

        let samples: Vec<_> = (0..3).map(|i| sample(&format!("Q{i}"))).collect();
        let records = run_batch(&target, &judge, samples, 1).await;

        let counts = label_counts(&records);
        assert_eq!(counts[0], (ErrorLabel::Correct, 2));
        assert_eq!(counts[1], (ErrorLabel::ArithmeticError, 1));
    }
}
