//! Grading policies and the scorer that applies them

mod grader;
mod scorer;

pub use grader::{DEFAULT_MIN_PASS_SCORE, GradingStrategy, ThresholdGrader, WeightedGrader};
pub use scorer::Scorer;
