//! Configuration system for finprobe.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> environment. Configuration is loaded from
//! `~/.config/finprobe/config.toml` and/or `.finprobe/config.toml` in the
//! working directory, with `FINPROBE_`-prefixed environment variables on top
//! (e.g. `FINPROBE_RUN__SAMPLES=50`, `FINPROBE_TARGET__MODEL=gpt-4o-mini`).

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for a finprobe run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// The weaker model under evaluation.
    pub target: LlmSettings,
    /// The stronger model that classifies failures.
    pub judge: LlmSettings,
    pub dataset: DatasetConfig,
    pub run: RunConfig,
}

/// Settings for one OpenAI-compatible provider endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Model identifier (e.g. "gpt-4o-mini").
    pub model: String,
    /// Environment variable name containing the API key.
    pub api_key_env: String,
    /// Base URL for the chat completions endpoint.
    pub base_url: String,
    /// Sampling temperature. Zero keeps both pipeline calls deterministic.
    pub temperature: f32,
    /// Maximum tokens to generate, if capped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.0,
            max_tokens: None,
            timeout_secs: 120,
        }
    }
}

impl LlmSettings {
    /// The judge defaults: same endpoint, stronger model.
    pub fn judge_default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            ..Self::default()
        }
    }
}

/// Identity and filtering for the remote question bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Hugging Face dataset id.
    pub dataset: String,
    /// Dataset config name.
    pub config: String,
    /// Split to read.
    pub split: String,
    /// Only records whose `question_type` is in this set are sampled.
    pub question_types: Vec<String>,
    /// Rows per page when fetching from the datasets server.
    pub page_size: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dataset: "AfterQuery/FinanceQA".to_string(),
            config: "default".to_string(),
            split: "test".to_string(),
            question_types: vec!["basic".to_string(), "assumption".to_string()],
            page_size: 100,
        }
    }
}

/// Batch run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of example questions to sample.
    pub samples: usize,
    /// Seed for the deterministic sampler.
    pub seed: u64,
    /// Destination for the labeled CSV. Overwritten unconditionally.
    pub output: PathBuf,
    /// Records labeled in flight at once. 1 reproduces fully sequential
    /// processing; higher values keep per-record target-then-judge ordering
    /// and preserve output order.
    pub concurrency: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            samples: 5,
            seed: 42,
            output: PathBuf::from("data/financeqa_labeled.csv"),
            concurrency: 1,
        }
    }
}

impl ProbeConfig {
    fn default_with_judge() -> Self {
        Self {
            judge: LlmSettings::judge_default(),
            ..Self::default()
        }
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `FINPROBE_`, `__` splits sections)
/// 2. Workspace-local config (`.finprobe/config.toml`)
/// 3. User config (`~/.config/finprobe/config.toml`)
/// 4. Built-in defaults
pub fn load_config(workspace: Option<&Path>) -> Result<ProbeConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(ProbeConfig::default_with_judge()));

    // User-level config
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "finprobe", "finprobe") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = ws.join(".finprobe").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // Environment variables (FINPROBE_RUN__SAMPLES, FINPROBE_JUDGE__MODEL, ...)
    figment = figment.merge(Env::prefixed("FINPROBE_").split("__"));

    figment.extract().map_err(Box::new)
}
