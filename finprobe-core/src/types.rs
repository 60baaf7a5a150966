//! Core type definitions for finprobe.
//!
//! Defines the message and completion plumbing shared by the target and
//! judge providers, plus the record types that flow through the pipeline.

use serde::{Deserialize, Serialize};

use crate::label::ErrorLabel;

/// Represents a participant role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single role-tagged message sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: text.into(),
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }
}

/// Structured-output contract attached to a completion request.
///
/// Only the JSON-schema form is supported; the judge call uses it to force
/// a `{"label": ..., "rationale": ...}` object out of the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    JsonSchema {
        name: String,
        schema: serde_json::Value,
        strict: bool,
    },
}

/// A request to the LLM for completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: Option<usize>,
    pub response_format: Option<ResponseFormat>,
}

impl Default for CompletionRequest {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            // Deterministic generation by default; both pipeline calls rely on it.
            temperature: 0.0,
            max_tokens: None,
            response_format: None,
        }
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// The result of an LLM completion request.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<String>,
}

/// One question/answer/context tuple drawn from the source collection.
///
/// Immutable once sampled; every field is text and optional provenance
/// fields are carried as empty strings when the source omits them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub question_type: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub file_link: String,
    #[serde(default)]
    pub file_name: String,
}

/// A sample record plus the target's answer and the judge's verdict.
///
/// Created once per sample and never mutated after the pipeline finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledRecord {
    #[serde(flatten)]
    pub sample: SampleRecord,
    pub model_answer: String,
    pub error_label: ErrorLabel,
    pub error_rationale: String,
}
