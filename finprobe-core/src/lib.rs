//! # finprobe core
//!
//! Core library for finprobe, a weak-to-strong failure-analysis tool for
//! FinanceQA. Provides the deterministic sampler, the labeling pipeline
//! (target answer, judge verdict, sentinel-on-failure recovery), CSV report
//! I/O, aggregate metrics, and the viewer's navigation state.

pub mod config;
pub mod dataset;
pub mod error;
pub mod label;
pub mod metrics;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod report;
pub mod sampler;
pub mod types;
pub mod viewer;

// Re-export commonly used types at the crate root.
pub use config::{DatasetConfig, LlmSettings, ProbeConfig, RunConfig, load_config};
pub use dataset::{HfRowsSource, RecordSource, StaticSource};
pub use error::{ConfigError, DatasetError, LlmError, ProbeError, ReportError, Result};
pub use label::ErrorLabel;
pub use metrics::Summary;
pub use pipeline::{label_counts, run_batch, run_to_file};
pub use providers::{LlmProvider, MockProvider, OpenAiProvider, resolve_api_key};
pub use sampler::sample_records;
pub use types::{
    CompletionRequest, CompletionResponse, LabeledRecord, Message, ResponseFormat, Role,
    SampleRecord, TokenUsage,
};
pub use viewer::ViewerState;
