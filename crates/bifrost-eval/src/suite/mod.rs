//! Scenario and suite definitions and loading
//!
//! This module provides the suite types and the file loader.

mod loader;
mod scenario;

pub use loader::{SuiteLoader, load_suite_from_json, load_suite_from_yaml};
pub use scenario::{DEFAULT_TIMEOUT_MS, EvalSuite, Scenario};
