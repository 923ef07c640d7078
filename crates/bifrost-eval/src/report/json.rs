//! JSON report generation

use anyhow::Result;

use crate::compare::ComparisonResult;
use crate::model::EvalResult;

/// JSON report generator
pub struct JsonReporter;

impl JsonReporter {
    /// Generate a JSON report
    pub fn generate(result: &EvalResult) -> Result<String> {
        let json = serde_json::to_string_pretty(result)?;
        Ok(json)
    }

    /// Generate a compact JSON report (no pretty printing)
    pub fn generate_compact(result: &EvalResult) -> Result<String> {
        let json = serde_json::to_string(result)?;
        Ok(json)
    }

    pub fn generate_comparison(comparison: &ComparisonResult) -> Result<String> {
        let json = serde_json::to_string_pretty(comparison)?;
        Ok(json)
    }
}
