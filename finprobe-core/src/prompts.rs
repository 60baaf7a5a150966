//! Prompt construction for the target and judge calls.
//!
//! The numeric-first answer format is a prompt convention, not a structural
//! guarantee; only the judge call carries a structured-output contract.

use serde_json::{Value, json};

use crate::label::ErrorLabel;

/// System prompt for the judge: classify one answer against the truth.
pub fn judge_system_prompt() -> String {
    let labels: Vec<&str> = ErrorLabel::CLOSED_SET.iter().map(|l| l.as_str()).collect();
    format!(
        r#"You are a senior buy-side financial analyst.

Given:
1) a FinanceQA question,
2) the correct answer (truth),
3) a model's answer,

decide whether the model's answer is correct. If it is wrong, assign
the SINGLE PRIMARY failure type from this list:

{labels:?}

Definitions:
- ARITHMETIC_ERROR: Numbers from the context are used but math is wrong.
- ACCOUNTING_CONVENTION_ERROR: Violates standard accounting practice
  (e.g., mixing basic/diluted shares, pre/post-tax, GAAP vs non-GAAP).
- MISSING_OR_WRONG_ASSUMPTION: Fails because the model makes bad
  assumptions or misses required assumptions.
- WRONG_METRIC_OR_CONCEPT: Confuses metrics (EBITDA vs operating income,
  cash vs accrual, margin vs absolute dollars, etc.).
- CONTEXT_MISUSE_OR_HALLUCINATION: Ignores given context or invents
  line items/values not in the document.
- NON_ANSWER_OR_GENERIC: Hand-wavy commentary, refuses, or doesn't
  actually answer the question.
- CORRECT: The model's answer matches the truth and is consistent
  with finance conventions.

Return STRICT JSON only in the form:
{{"label": "...", "rationale": "..."}}"#
    )
}

/// User prompt for the target model: answer one FinanceQA question.
pub fn target_prompt(question: &str, context: &str) -> String {
    format!(
        r#"You are a professional equity research analyst.

Use the context if helpful, but keep the answer concise and numeric-first.

Context:
{context}

Question:
{question}

Answer with the final numeric answer first, then one short sentence of explanation."#
    )
}

/// User prompt for the judge: the question, the truth, and the candidate.
pub fn judge_prompt(question: &str, truth: &str, model_answer: &str) -> String {
    let labels: Vec<&str> = ErrorLabel::CLOSED_SET.iter().map(|l| l.as_str()).collect();
    format!(
        r#"Question:
{question}

Actual answer:
{truth}

Model Answer:
{model_answer}

Is the model's answer correct? If not, choose ONE label from:
{labels:?}

Return JSON {{"label": "[Your Answer Here]", "rationale": "[Your Answer Here]"}}"#
    )
}

/// JSON schema for the judge's structured output: exactly the string fields
/// `label` and `rationale`, nothing else.
pub fn label_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "label": { "type": "string" },
            "rationale": { "type": "string" }
        },
        "required": ["label", "rationale"],
        "additionalProperties": false
    })
}

/// Schema name advertised to the provider.
pub const LABEL_SCHEMA_NAME: &str = "finance_label_schema";
