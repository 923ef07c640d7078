//! Suite loading from YAML/JSON files
//!
//! Loads evaluation suites from single files or from a directory tree.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use walkdir::WalkDir;

use super::{DEFAULT_TIMEOUT_MS, EvalSuite};

/// Loader for evaluation suites
#[derive(Debug, Clone)]
pub struct SuiteLoader {
    /// Timeout applied to scenarios that do not declare one
    default_timeout_ms: f64,
}

impl SuiteLoader {
    /// Create a loader using the standard scenario timeout
    pub fn new() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Override the timeout given to scenarios without an explicit one
    pub fn with_default_timeout_ms(mut self, timeout_ms: f64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    /// Load and validate a suite from a file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<EvalSuite> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read suite file: {:?}", path))?;

        let raw: Value = if is_yaml(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML suite: {:?}", path))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON suite: {:?}", path))?
        };

        self.materialize(raw)
            .with_context(|| format!("Invalid suite format: {:?}", path))
    }

    /// Load every suite file below a directory.
    ///
    /// Files that fail to load are skipped with a warning. The result is
    /// sorted by suite name.
    pub fn load_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<EvalSuite>> {
        let dir = dir.as_ref();
        let mut suites = Vec::new();

        if !dir.exists() {
            return Ok(suites);
        }

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if is_suite_file(path) {
                match self.load_file(path) {
                    Ok(suite) => suites.push(suite),
                    Err(e) => {
                        tracing::warn!("Failed to load suite from {:?}: {:#}", path, e);
                    }
                }
            }
        }

        suites.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(suites)
    }

    /// List suite files below a directory without parsing them
    pub fn list_files(&self, dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir.as_ref())
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| is_suite_file(p))
            .collect();
        files.sort();
        files
    }

    /// Parse a suite from a YAML string
    pub fn load_yaml(&self, yaml: &str) -> Result<EvalSuite> {
        let raw: Value = serde_yaml::from_str(yaml).context("Failed to parse YAML suite")?;
        self.materialize(raw)
    }

    /// Parse a suite from a JSON string
    pub fn load_json(&self, json: &str) -> Result<EvalSuite> {
        let raw: Value = serde_json::from_str(json).context("Failed to parse JSON suite")?;
        self.materialize(raw)
    }

    fn materialize(&self, mut raw: Value) -> Result<EvalSuite> {
        if let Some(scenarios) = raw.get_mut("scenarios").and_then(Value::as_array_mut) {
            for scenario in scenarios.iter_mut().filter_map(Value::as_object_mut) {
                scenario
                    .entry("timeout_ms")
                    .or_insert_with(|| Value::from(self.default_timeout_ms));
            }
        }

        let suite: EvalSuite = serde_json::from_value(raw)?;
        suite.validate()?;
        Ok(suite)
    }
}

impl Default for SuiteLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a suite from a YAML string using default settings
pub fn load_suite_from_yaml(yaml: &str) -> Result<EvalSuite> {
    SuiteLoader::new().load_yaml(yaml)
}

/// Parse a suite from a JSON string using default settings
pub fn load_suite_from_json(json: &str) -> Result<EvalSuite> {
    SuiteLoader::new().load_json(json)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

fn is_suite_file(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml") | Some("json")
    )
}
