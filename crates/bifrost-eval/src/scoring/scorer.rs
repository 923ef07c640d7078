//! Scorer: applies a grading strategy to outcomes

use std::sync::Arc;

use super::{GradingStrategy, ThresholdGrader};
use crate::model::{GradeLevel, ScenarioOutcome};

/// Finalizes the grade and pass flag of an outcome
#[derive(Clone)]
pub struct Scorer {
    strategy: Arc<dyn GradingStrategy>,
}

impl Scorer {
    pub fn new(strategy: Arc<dyn GradingStrategy>) -> Self {
        Self { strategy }
    }

    /// Set `grade` and overwrite `passed` from it
    pub fn apply_grade(&self, outcome: &mut ScenarioOutcome) -> GradeLevel {
        let grade = self.strategy.grade(outcome);
        outcome.grade = grade;
        outcome.passed = grade.is_passing();
        grade
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(Arc::new(ThresholdGrader::default()))
    }
}

impl std::fmt::Debug for Scorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scorer").finish_non_exhaustive()
    }
}
