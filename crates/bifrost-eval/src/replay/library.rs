//! Recorded traces keyed by scenario name

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ExecutionTrace;

/// A set of recorded traces, one per scenario name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceLibrary {
    /// Traces by scenario name
    #[serde(default)]
    pub traces: BTreeMap<String, ExecutionTrace>,

    /// When the library was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl TraceLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trace, replacing any earlier one for the same scenario
    pub fn with_trace(mut self, scenario: impl Into<String>, trace: ExecutionTrace) -> Self {
        self.insert(scenario, trace);
        self
    }

    pub fn insert(&mut self, scenario: impl Into<String>, trace: ExecutionTrace) {
        self.traces.insert(scenario.into(), trace);
    }

    pub fn get(&self, scenario: &str) -> Option<&ExecutionTrace> {
        self.traces.get(scenario)
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Scenario names in sorted order
    pub fn scenario_names(&self) -> impl Iterator<Item = &str> {
        self.traces.keys().map(String::as_str)
    }

    /// Load from JSON, or YAML for `.yaml`/`.yml`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read trace file: {:?}", path))?;

        if is_yaml(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML traces: {:?}", path))
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON traces: {:?}", path))
        }
    }

    /// Save as JSON, or YAML for `.yaml`/`.yml`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to save traces to {:?}", path))?;

        tracing::info!(traces = self.len(), "Saved trace library to {:?}", path);
        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn library() -> TraceLibrary {
        TraceLibrary::new()
            .with_trace("b", ExecutionTrace::new(json!(2)).with_tools(["search"]))
            .with_trace("a", ExecutionTrace::new(json!(1)))
    }

    #[test]
    fn test_names_are_sorted() {
        let lib = library();
        let names: Vec<_> = lib.scenario_names().collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_save_and_load_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let original = library();

        for file in ["traces.json", "nested/traces.yaml"] {
            let path = dir.path().join(file);
            original.save(&path).unwrap();
            assert_eq!(TraceLibrary::load(&path).unwrap(), original);
        }
    }

    #[test]
    fn test_load_hand_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traces.json");
        std::fs::write(
            &path,
            r#"{ "traces": { "greet": { "output": "hello", "latency": { "total_ms": 12 } } } }"#,
        )
        .unwrap();

        let library = TraceLibrary::load(&path).unwrap();
        let trace = library.get("greet").unwrap();
        assert_eq!(trace.output, json!("hello"));
        assert_eq!(trace.latency.total_ms, 12.0);
        assert!(trace.success);
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = TraceLibrary::load("/nonexistent/traces.json").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read trace file"));
    }
}
