//! The `label` command: run the batch end to end.

use anyhow::Context;
use std::path::PathBuf;

use finprobe_core::{
    HfRowsSource, OpenAiProvider, ProbeConfig, label_counts, pipeline, resolve_api_key,
};

/// Sample the question bank, label every sample, write the CSV, and print
/// the per-label frequency summary.
pub async fn run_label(
    mut config: ProbeConfig,
    samples_override: Option<usize>,
    output_override: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(samples) = samples_override {
        config.run.samples = samples;
    }
    if let Some(output) = output_override {
        config.run.output = output;
    }

    // Missing credentials are fatal before any work starts.
    let target_key = resolve_api_key(&config.target)
        .with_context(|| format!("set {} in the environment or .env", config.target.api_key_env))?;
    let judge_key = resolve_api_key(&config.judge)
        .with_context(|| format!("set {} in the environment or .env", config.judge.api_key_env))?;

    let target = OpenAiProvider::new(&config.target, target_key)?;
    let judge = OpenAiProvider::new(&config.judge, judge_key)?;
    let source = HfRowsSource::new(config.dataset.clone());

    let labeled = pipeline::run_to_file(&target, &judge, &source, &config.run)
        .await
        .with_context(|| format!("labeling batch into {}", config.run.output.display()))?;

    println!(
        "The labeled data has been saved to {}",
        config.run.output.display()
    );
    println!("error_label");
    for (label, count) in label_counts(&labeled) {
        println!("{:<35} {}", label.to_string(), count);
    }

    Ok(())
}
