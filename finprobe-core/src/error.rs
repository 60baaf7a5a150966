//! Error types for the finprobe core library.
//!
//! Uses `thiserror` for public API error types with structured error variants
//! covering LLM, configuration, dataset, and report domains.

use std::path::PathBuf;

/// Top-level error type for the finprobe core library.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from LLM provider interactions.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Provider connection failed: {message}")]
    Connection { message: String },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not set: {var}")]
    EnvVarMissing { var: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// Errors from the remote record source.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Dataset fetch failed for {dataset}: {message}")]
    Fetch { dataset: String, message: String },

    #[error("Malformed dataset row at offset {offset}: {message}")]
    MalformedRow { offset: usize, message: String },
}

/// Errors from reading or writing the labeled report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Report file not found: {path}")]
    MissingFile { path: PathBuf },

    #[error("Malformed report at line {line}: {message}")]
    Malformed { line: usize, message: String },
}

/// A type alias for results using the top-level `ProbeError`.
pub type Result<T> = std::result::Result<T, ProbeError>;
