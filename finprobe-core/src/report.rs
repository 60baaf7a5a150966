//! CSV persistence for labeled records.
//!
//! The table is the sole interface between the labeling batch and the
//! viewer: header row plus one row per labeled record, fixed column order,
//! RFC 4180 quoting. Writes overwrite the destination unconditionally;
//! reads accept quoted fields with embedded commas, quotes, and newlines.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

use crate::error::ReportError;
use crate::label::ErrorLabel;
use crate::types::{LabeledRecord, SampleRecord};

/// Column order of the persisted table. Fixed; the reader validates it.
pub const COLUMNS: [&str; 10] = [
    "question",
    "answer",
    "context",
    "question_type",
    "company",
    "file_link",
    "file_name",
    "model_answer",
    "error_label",
    "error_rationale",
];

/// Quote a field if it contains a comma, quote, or line break.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn record_row(record: &LabeledRecord) -> String {
    let fields = [
        record.sample.question.as_str(),
        record.sample.answer.as_str(),
        record.sample.context.as_str(),
        record.sample.question_type.as_str(),
        record.sample.company.as_str(),
        record.sample.file_link.as_str(),
        record.sample.file_name.as_str(),
        record.model_answer.as_str(),
        record.error_label.as_str(),
        record.error_rationale.as_str(),
    ];
    fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Serialize the batch to `path`, overwriting any existing file.
pub fn write_csv(path: &Path, records: &[LabeledRecord]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut out = String::with_capacity(records.len() * 256);
    out.push_str(&COLUMNS.join(","));
    out.push('\n');
    for record in records {
        out.push_str(&record_row(record));
        out.push('\n');
    }
    fs::write(path, out)?;

    info!(path = %path.display(), rows = records.len(), "Labeled data written");
    Ok(())
}

/// Split raw CSV text into rows of fields, honoring quoted fields that span
/// commas and line breaks.
fn parse_rows(input: &str) -> Result<Vec<Vec<String>>, ReportError> {
    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                if field.is_empty() {
                    in_quotes = true;
                } else {
                    return Err(ReportError::Malformed {
                        line,
                        message: "quote inside unquoted field".to_string(),
                    });
                }
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
            }
            '\r' => {
                // Swallow; the following '\n' terminates the row.
            }
            '\n' => {
                line += 1;
                fields.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut fields));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(ReportError::Malformed {
            line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        rows.push(fields);
    }

    Ok(rows)
}

/// Load a labeled table from `path`.
///
/// A missing file is `ReportError::MissingFile` so the viewer can report it
/// as a user-visible message instead of crashing. Label values outside the
/// closed vocabulary are coerced to `UNKNOWN` with a warning, preserving the
/// invariant that an `ErrorLabel` never carries arbitrary text.
pub fn read_csv(path: &Path) -> Result<Vec<LabeledRecord>, ReportError> {
    if !path.exists() {
        return Err(ReportError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path).map_err(|e| ReportError::Malformed {
        line: 0,
        message: format!("unreadable file: {e}"),
    })?;

    let mut rows = parse_rows(&content)?.into_iter();

    let header = rows.next().ok_or(ReportError::Malformed {
        line: 1,
        message: "missing header row".to_string(),
    })?;
    if header != COLUMNS {
        return Err(ReportError::Malformed {
            line: 1,
            message: format!("unexpected header: {}", header.join(",")),
        });
    }

    let mut records = Vec::new();
    for (i, row) in rows.enumerate() {
        let line = i + 2;
        if row.len() != COLUMNS.len() {
            return Err(ReportError::Malformed {
                line,
                message: format!("expected {} fields, got {}", COLUMNS.len(), row.len()),
            });
        }
        let mut row = row.into_iter();
        // Fixed column order; see COLUMNS.
        let sample = SampleRecord {
            question: row.next().unwrap_or_default(),
            answer: row.next().unwrap_or_default(),
            context: row.next().unwrap_or_default(),
            question_type: row.next().unwrap_or_default(),
            company: row.next().unwrap_or_default(),
            file_link: row.next().unwrap_or_default(),
            file_name: row.next().unwrap_or_default(),
        };
        let model_answer = row.next().unwrap_or_default();
        let label_str = row.next().unwrap_or_default();
        let error_rationale = row.next().unwrap_or_default();

        let error_label = match ErrorLabel::from_str(&label_str) {
            Ok(label) => label,
            Err(_) => {
                warn!(line, label = %label_str, "Out-of-vocabulary label in report; coercing to UNKNOWN");
                ErrorLabel::Unknown
            }
        };

        records.push(LabeledRecord {
            sample,
            model_answer,
            error_label,
            error_rationale,
        });
    }

    Ok(records)
}
