//! The external question bank.
//!
//! Records come from a named Hugging Face dataset, read through the public
//! datasets-server `/rows` REST endpoint page by page. The source is
//! consumed read-only: fetch once, filter to the allowed question types,
//! hand the records to the sampler.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::DatasetConfig;
use crate::error::DatasetError;
use crate::types::SampleRecord;

const DATASETS_SERVER_URL: &str = "https://datasets-server.huggingface.co/rows";

/// A collection of sample records the pipeline can draw from.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every record in the configured split, already filtered to the
    /// allowed question types. An empty result is not an error.
    async fn fetch(&self) -> Result<Vec<SampleRecord>, DatasetError>;
}

/// One page of the datasets-server `/rows` response.
#[derive(Debug, Deserialize)]
struct RowsPage {
    rows: Vec<RowEntry>,
    num_rows_total: usize,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
    row_idx: usize,
    row: Value,
}

/// Record source backed by the Hugging Face datasets-server rows API.
pub struct HfRowsSource {
    client: Client,
    config: DatasetConfig,
}

impl HfRowsSource {
    pub fn new(config: DatasetConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Decode one row object into a `SampleRecord`.
    ///
    /// `question` and `answer` are required; provenance columns may be
    /// missing or null and decode to empty strings.
    fn decode_row(entry: &RowEntry) -> Result<SampleRecord, DatasetError> {
        let field = |name: &str| -> String {
            entry
                .row
                .get(name)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };

        let question = field("question");
        let answer = field("answer");
        if question.is_empty() || answer.is_empty() {
            return Err(DatasetError::MalformedRow {
                offset: entry.row_idx,
                message: "missing question or answer column".to_string(),
            });
        }

        Ok(SampleRecord {
            question,
            answer,
            context: field("context"),
            question_type: field("question_type"),
            company: field("company"),
            file_link: field("file_link"),
            file_name: field("file_name"),
        })
    }

    async fn fetch_page(&self, offset: usize) -> Result<RowsPage, DatasetError> {
        let fetch_err = |message: String| DatasetError::Fetch {
            dataset: self.config.dataset.clone(),
            message,
        };

        let response = self
            .client
            .get(DATASETS_SERVER_URL)
            .query(&[
                ("dataset", self.config.dataset.as_str()),
                ("config", self.config.config.as_str()),
                ("split", self.config.split.as_str()),
                ("offset", offset.to_string().as_str()),
                ("length", self.config.page_size.to_string().as_str()),
            ])
            .send()
            .await
            .map_err(|e| fetch_err(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(fetch_err(format!("HTTP {status}: {body}")));
        }

        response
            .json::<RowsPage>()
            .await
            .map_err(|e| fetch_err(format!("invalid rows payload: {e}")))
    }
}

#[async_trait]
impl RecordSource for HfRowsSource {
    async fn fetch(&self) -> Result<Vec<SampleRecord>, DatasetError> {
        let mut records = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.fetch_page(offset).await?;
            let page_len = page.rows.len();
            debug!(offset, rows = page_len, total = page.num_rows_total, "Fetched dataset page");

            for entry in &page.rows {
                records.push(Self::decode_row(entry)?);
            }

            offset += page_len;
            if offset >= page.num_rows_total || page_len == 0 {
                break;
            }
        }

        let before = records.len();
        records.retain(|r| {
            self.config
                .question_types
                .iter()
                .any(|t| t == &r.question_type)
        });
        info!(
            dataset = %self.config.dataset,
            split = %self.config.split,
            fetched = before,
            kept = records.len(),
            "Loaded question bank"
        );

        Ok(records)
    }
}

/// In-memory record source for tests and offline runs.
pub struct StaticSource {
    records: Vec<SampleRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<SampleRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<SampleRecord>, DatasetError> {
        Ok(self.records.clone())
    }
}
