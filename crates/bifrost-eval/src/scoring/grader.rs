//! Grading strategies

use std::collections::HashMap;

use crate::error::{BifrostError, BifrostResult};
use crate::model::{GradeLevel, GradeThresholds, ScenarioOutcome};

/// Policy mapping a scored outcome to a grade
pub trait GradingStrategy: Send + Sync {
    fn grade(&self, outcome: &ScenarioOutcome) -> GradeLevel;
}

/// Grades the weighted score against configurable cut points
#[derive(Debug, Clone, Default)]
pub struct ThresholdGrader {
    thresholds: GradeThresholds,
}

impl ThresholdGrader {
    pub fn new(thresholds: GradeThresholds) -> BifrostResult<Self> {
        if !thresholds.is_well_formed() {
            return Err(BifrostError::config(format!(
                "grade thresholds must descend within [0, 1], got {:?}",
                thresholds
            )));
        }
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &GradeThresholds {
        &self.thresholds
    }
}

impl GradingStrategy for ThresholdGrader {
    fn grade(&self, outcome: &ScenarioOutcome) -> GradeLevel {
        self.thresholds.grade(outcome.weighted_score())
    }
}

/// Default minimum weighted score for a pass under [`WeightedGrader`]
pub const DEFAULT_MIN_PASS_SCORE: f64 = 0.6;

/// Enforces per-dimension minimums, then grades the weighted score.
///
/// A dimension present in the outcome and below its minimum forces
/// [`GradeLevel::Fail`]. Dimensions missing from the outcome are not checked.
#[derive(Debug, Clone)]
pub struct WeightedGrader {
    required_scores: HashMap<String, f64>,
    min_pass_score: f64,
}

impl WeightedGrader {
    pub fn new() -> Self {
        Self {
            required_scores: HashMap::new(),
            min_pass_score: DEFAULT_MIN_PASS_SCORE,
        }
    }

    /// Require `name` to score at least `minimum` when present
    pub fn require(mut self, name: impl Into<String>, minimum: f64) -> Self {
        self.required_scores.insert(name.into(), minimum);
        self
    }

    pub fn with_required_scores(mut self, required: HashMap<String, f64>) -> Self {
        self.required_scores = required;
        self
    }

    /// Set the acceptable cut point.
    ///
    /// Any value in [0, 1] is accepted. The Excellent, Good and Poor cut
    /// points stay fixed, so a lenient minimum below the Poor cut grades
    /// low scores Acceptable rather than Poor.
    pub fn with_min_pass_score(mut self, min_pass_score: f64) -> BifrostResult<Self> {
        if !(0.0..=1.0).contains(&min_pass_score) {
            return Err(BifrostError::config(format!(
                "min_pass_score must lie within [0, 1], got {}",
                min_pass_score
            )));
        }
        self.min_pass_score = min_pass_score;
        Ok(self)
    }

    pub fn min_pass_score(&self) -> f64 {
        self.min_pass_score
    }

    fn below_minimum(&self, outcome: &ScenarioOutcome) -> Option<(&str, f64, f64)> {
        self.required_scores.iter().find_map(|(name, minimum)| {
            outcome
                .score(name)
                .filter(|score| score.value() < *minimum)
                .map(|score| (name.as_str(), score.value(), *minimum))
        })
    }
}

impl Default for WeightedGrader {
    fn default() -> Self {
        Self::new()
    }
}

impl GradingStrategy for WeightedGrader {
    fn grade(&self, outcome: &ScenarioOutcome) -> GradeLevel {
        if let Some((name, value, minimum)) = self.below_minimum(outcome) {
            tracing::debug!(
                scenario = %outcome.scenario_name,
                dimension = name,
                value,
                minimum,
                "Required score not met"
            );
            return GradeLevel::Fail;
        }

        GradeThresholds {
            acceptable: self.min_pass_score,
            ..GradeThresholds::default()
        }
        .grade(outcome.weighted_score())
    }
}
