//! CLI commands

pub mod compare;
pub mod report;
pub mod run;
pub mod validate;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bifrost_eval::runner::{EvalProgress, ProgressCallback};
use bifrost_eval::{EvalConfig, EvalSuite, SuiteLoader, TraceReplayer};

use crate::args::EvalOptions;

/// Load the config file (or defaults), environment, then command-line flags
fn load_config(options: &EvalOptions) -> Result<EvalConfig> {
    let mut config = EvalConfig::load(options.config.as_deref())?;

    if let Some(max_concurrency) = options.max_concurrency {
        config = config.with_max_concurrency(max_concurrency);
    }
    if !options.tags.is_empty() {
        config = config.with_tags(options.tags.clone());
    }

    config.validate()?;
    Ok(config)
}

fn load_suite(path: &Path, config: &EvalConfig) -> Result<EvalSuite> {
    SuiteLoader::new()
        .with_default_timeout_ms(config.default_timeout_ms)
        .load_file(path)
}

fn load_replayer(path: &Path, options: &EvalOptions) -> Result<TraceReplayer> {
    let replayer = TraceReplayer::from_file(path)
        .with_context(|| format!("Failed to load traces for replay: {}", path.display()))?;

    Ok(match options.replay_delay_ms {
        Some(ms) => replayer.with_delay(Duration::from_millis(ms)),
        None => replayer,
    })
}

/// Progress printer for verbose runs
fn progress_printer() -> ProgressCallback {
    Arc::new(|progress: EvalProgress| {
        eprintln!(
            "[{}/{}] {} - {}",
            progress.current, progress.total, progress.status, progress.message
        );
    })
}
