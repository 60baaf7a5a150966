//! End-to-end pipeline tests: sample, label, persist, reload, summarize.
//!
//! Drives the batch with mock providers through the happy path and every
//! recovery path, and checks the invariants the tool is built around:
//! output cardinality always matches input cardinality, and persisted
//! labels are always members of the closed set plus UNKNOWN.

use finprobe_core::{
    ErrorLabel, LabeledRecord, MockProvider, RecordSource, SampleRecord, StaticSource, Summary,
    report, run_batch, sample_records,
};
use pretty_assertions::assert_eq;
use std::str::FromStr;

fn bank(size: usize) -> Vec<SampleRecord> {
    (0..size)
        .map(|i| SampleRecord {
            question: format!("What was company {i}'s operating margin?"),
            answer: format!("{i}%"),
            context: format!("Operating margin was {i}% in FY23."),
            question_type: if i % 2 == 0 { "basic" } else { "assumption" }.to_string(),
            company: format!("Company {i}"),
            file_link: String::new(),
            file_name: format!("filing_{i}.pdf"),
        })
        .collect()
}

#[tokio::test]
async fn sample_label_persist_reload() {
    let source = StaticSource::new(bank(40));
    let records = source.fetch().await.unwrap();
    let samples = sample_records(records, 8, 42);
    assert_eq!(samples.len(), 8);

    let target = MockProvider::with_response("7%; operating margin from the filing.");
    let judge = MockProvider::new("mock-judge");
    for i in 0..8 {
        if i % 2 == 0 {
            judge.queue_text(r#"{"label": "CORRECT", "rationale": "Matches the filing."}"#);
        } else {
            judge.queue_text(
                r#"{"label": "WRONG_METRIC_OR_CONCEPT", "rationale": "Quoted gross margin."}"#,
            );
        }
    }

    let labeled = run_batch(&target, &judge, samples.clone(), 1).await;
    assert_eq!(labeled.len(), samples.len());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("financeqa_labeled.csv");
    report::write_csv(&path, &labeled).unwrap();

    let reloaded = report::read_csv(&path).unwrap();
    assert_eq!(reloaded, labeled);

    let summary = Summary::compute(&reloaded);
    assert_eq!(summary.total, 8);
    assert_eq!(summary.accuracy, 0.5);
    assert_eq!(summary.failures, 4);
    assert_eq!(
        summary.most_common_error,
        Some(ErrorLabel::WrongMetricOrConcept)
    );
}

#[tokio::test]
async fn cardinality_holds_under_total_failure() {
    let target = MockProvider::always_failing("target upstream 500");
    let judge = MockProvider::always_failing("judge upstream 500");

    let samples = sample_records(bank(20), 10, 42);
    let labeled = run_batch(&target, &judge, samples, 3).await;

    assert_eq!(labeled.len(), 10);
    for record in &labeled {
        assert_eq!(record.error_label, ErrorLabel::Unknown);
        assert!(record.model_answer.is_empty());
        assert!(
            !record.error_rationale.is_empty(),
            "failed rows carry a diagnostic rationale"
        );
    }
}

#[tokio::test]
async fn every_persisted_label_is_in_vocabulary() {
    // Mix of verdicts: valid labels, an out-of-vocabulary label, malformed
    // JSON, and a judge transport failure.
    let target = MockProvider::with_response("some answer");
    let judge = MockProvider::new("mock-judge");
    judge.queue_text(r#"{"label": "CORRECT", "rationale": "fine"}"#);
    judge.queue_text(r#"{"label": "FOO", "rationale": "made up"}"#);
    judge.queue_text("not json at all");
    judge.queue_error(finprobe_core::LlmError::ApiRequest {
        message: "boom".to_string(),
    });
    judge.queue_text(r#"{"label": "NON_ANSWER_OR_GENERIC", "rationale": "refused"}"#);

    let samples = sample_records(bank(5), 5, 42);
    let labeled = run_batch(&target, &judge, samples, 1).await;
    assert_eq!(labeled.len(), 5);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("labeled.csv");
    report::write_csv(&path, &labeled).unwrap();
    let reloaded = report::read_csv(&path).unwrap();

    for record in &reloaded {
        // Reparsing the wire string must succeed for every persisted row.
        let parsed = ErrorLabel::from_str(record.error_label.as_str()).unwrap();
        assert_eq!(parsed, record.error_label);
    }

    let unknowns = reloaded
        .iter()
        .filter(|r| r.error_label == ErrorLabel::Unknown)
        .count();
    assert_eq!(unknowns, 3, "FOO, malformed JSON, and the failed call");
}

#[tokio::test]
async fn run_to_file_writes_the_configured_path() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("data").join("financeqa_labeled.csv");
    let run = finprobe_core::RunConfig {
        samples: 4,
        seed: 42,
        output: output.clone(),
        concurrency: 1,
    };

    let target = MockProvider::with_response("3%");
    let judge = MockProvider::with_response(r#"{"label": "CORRECT", "rationale": "Matches."}"#);
    let source = StaticSource::new(bank(10));

    let labeled = finprobe_core::run_to_file(&target, &judge, &source, &run)
        .await
        .unwrap();
    assert_eq!(labeled.len(), 4);

    let reloaded = report::read_csv(&output).unwrap();
    assert_eq!(reloaded, labeled);
}

#[tokio::test]
async fn deterministic_sampling_is_stable_across_runs() {
    let first = sample_records(bank(100), 12, 42);
    let second = sample_records(bank(100), 12, 42);
    assert_eq!(first, second);

    let questions: Vec<_> = first.iter().map(|r| r.question.as_str()).collect();
    let again: Vec<_> = second.iter().map(|r| r.question.as_str()).collect();
    assert_eq!(questions, again);
}

#[test]
fn summary_over_handwritten_table() {
    let rows = |label: ErrorLabel, n: usize| -> Vec<LabeledRecord> {
        (0..n)
            .map(|_| LabeledRecord {
                sample: SampleRecord::default(),
                model_answer: String::new(),
                error_label: label,
                error_rationale: String::new(),
            })
            .collect()
    };

    let mut table = rows(ErrorLabel::Correct, 20);
    table.extend(rows(ErrorLabel::ArithmeticError, 5));
    table.extend(rows(ErrorLabel::WrongMetricOrConcept, 2));

    let summary = Summary::compute(&table);
    assert_eq!(summary.most_common_error, Some(ErrorLabel::ArithmeticError));
    assert_eq!(summary.total, 27);
    assert_eq!(summary.failures, 7);
}
