//! Comparing runs
//!
//! Ranking several configurations over one suite, and detecting
//! regressions between a baseline run and a current one.

mod comparator;
mod regression;

pub use comparator::{CONFIGURATION_KEY, ComparisonResult, ComparisonRunner, ConfigSummary};
pub use regression::{Regression, RegressionConfig, RegressionDetector, RegressionType};
