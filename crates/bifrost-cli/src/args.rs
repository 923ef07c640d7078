//! CLI argument definitions using clap
//!
//! - bifrost-eval validate <suite>
//! - bifrost-eval run <suite> --traces <file>
//! - bifrost-eval compare <suite> --configuration name=<file> ...
//! - bifrost-eval report <result.json>
//! - bifrost-eval diff <baseline.json> <current.json>

use std::path::PathBuf;

use bifrost_eval::ReportFormat;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bifrost-eval")]
#[command(about = "Bifrost Eval - scenario-based evaluation for agent pipelines")]
#[command(
    long_about = r#"Bifrost Eval - scenario-based evaluation for agent pipelines

USAGE:
  bifrost-eval validate suite.yaml
  bifrost-eval run suite.yaml --traces traces.json
  bifrost-eval compare suite.yaml -C fast=fast.json -C accurate=accurate.json
  bifrost-eval report eval_result.json --format markdown
  bifrost-eval diff baseline.json current.json

Logging honours RUST_LOG; --verbose defaults it to debug."#
)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that a suite file loads and is well formed
    Validate {
        /// Suite file (.yaml, .yml or .json)
        suite: PathBuf,
    },

    /// Run a suite against recorded traces
    Run(RunArgs),

    /// Compare several recorded configurations on one suite
    Compare(CompareArgs),

    /// Re-render a saved evaluation or comparison result
    Report {
        /// Saved result JSON
        input: PathBuf,

        /// Output format: table, json or markdown
        #[arg(long, short, default_value = "table")]
        format: ReportFormat,
    },

    /// Detect regressions between two saved results
    Diff {
        /// Baseline result JSON
        baseline: PathBuf,

        /// Current result JSON
        current: PathBuf,

        /// Exit with an error when any regression is found
        #[arg(long)]
        fail_on_regression: bool,
    },
}

/// Options shared by commands that run a suite
#[derive(Args, Debug, Clone)]
pub struct EvalOptions {
    /// Evaluation config file (.yaml, .yml or .json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format: table, json or markdown
    #[arg(long, short, default_value = "table")]
    pub format: ReportFormat,

    /// Maximum scenarios in flight
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Only run scenarios carrying one of these tags
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Delay before each replayed trace is returned
    #[arg(long)]
    pub replay_delay_ms: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Suite file (.yaml, .yml or .json)
    pub suite: PathBuf,

    /// Recorded traces to replay (.json, .yaml or .yml)
    #[arg(long)]
    pub traces: PathBuf,

    /// Directory to save the result JSON into
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub options: EvalOptions,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Suite file (.yaml, .yml or .json)
    pub suite: PathBuf,

    /// Named configuration as NAME=TRACES_FILE (repeatable)
    #[arg(long = "configuration", short = 'C', value_parser = parse_configuration, required = true)]
    pub configurations: Vec<(String, PathBuf)>,

    /// Run configurations concurrently
    #[arg(long)]
    pub parallel: bool,

    #[command(flatten)]
    pub options: EvalOptions,
}

fn parse_configuration(value: &str) -> Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
            Ok((name.trim().to_string(), PathBuf::from(path.trim())))
        }
        _ => Err(format!("expected NAME=TRACES_FILE, got '{}'", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_configuration() {
        assert_eq!(
            parse_configuration("fast=traces/fast.json").unwrap(),
            ("fast".to_string(), PathBuf::from("traces/fast.json"))
        );
        assert!(parse_configuration("fast").is_err());
        assert!(parse_configuration("=x.json").is_err());
    }

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "bifrost-eval",
            "run",
            "suite.yaml",
            "--traces",
            "t.json",
            "--format",
            "json",
            "--tag",
            "smoke",
            "--tag",
            "geo",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.options.format, ReportFormat::Json);
                assert_eq!(args.options.tags, vec!["smoke", "geo"]);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let parsed = Cli::try_parse_from(["bifrost-eval", "report", "r.json", "--format", "html"]);
        assert!(parsed.is_err());
    }
}
