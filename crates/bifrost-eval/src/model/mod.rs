//! Evaluation data model
//!
//! Value types shared by every layer: traces produced by executors,
//! scores produced by metrics, and the outcomes/results built from them.

mod grade;
mod outcome;
mod score;
mod trace;

pub use grade::{GradeLevel, GradeThresholds};
pub use outcome::{EvalResult, ScenarioOutcome, ScenarioStatus};
pub use score::EvalScore;
pub use trace::{CostBreakdown, ExecutionTrace, LatencyBreakdown, ToolCallRecord};
