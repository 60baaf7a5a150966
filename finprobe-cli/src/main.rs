//! finprobe CLI: run the FinanceQA labeling batch or browse labeled results.

mod commands;
mod viewer;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// finprobe: weak-to-strong failure analysis for FinanceQA
#[derive(Parser, Debug)]
#[command(name = "finprobe", version, about, long_about = None)]
struct Cli {
    /// Working directory (where `.finprobe/config.toml` is looked up)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the labeling batch: sample, answer, judge, write the CSV
    Label {
        /// Number of questions to sample (overrides config)
        #[arg(short, long)]
        samples: Option<usize>,

        /// Output CSV path (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Browse a labeled CSV interactively
    View {
        /// Input CSV path (defaults to the configured output path)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "finprobe", "finprobe")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "finprobe.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let config = finprobe_core::load_config(Some(&workspace))
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    tracing::debug!(
        workspace = %workspace.display(),
        target = %config.target.model,
        judge = %config.judge.model,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Label { samples, output } => {
            commands::run_label(config, samples, output).await
        }
        Commands::View { input } => {
            let path = input.unwrap_or(config.run.output);
            viewer::run(&path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_structure_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_label_overrides_parse() {
        let cli = Cli::parse_from(["finprobe", "label", "--samples", "50", "-o", "out.csv"]);
        match cli.command {
            Commands::Label { samples, output } => {
                assert_eq!(samples, Some(50));
                assert_eq!(output, Some(PathBuf::from("out.csv")));
            }
            _ => panic!("expected the label subcommand"),
        }
    }

    #[test]
    fn test_view_defaults_to_configured_output() {
        let cli = Cli::parse_from(["finprobe", "view"]);
        match cli.command {
            Commands::View { input } => assert_eq!(input, None),
            _ => panic!("expected the view subcommand"),
        }
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::parse_from(["finprobe", "-vv", "view"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }
}
