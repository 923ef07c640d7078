//! Grade levels and the score-to-grade cut points

use serde::{Deserialize, Serialize};

/// Discrete grade of an outcome or a whole run, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeLevel {
    Excellent,
    Good,
    Acceptable,
    Poor,
    Fail,
}

impl GradeLevel {
    /// Whether this grade counts as a pass
    pub fn is_passing(&self) -> bool {
        matches!(
            self,
            GradeLevel::Excellent | GradeLevel::Good | GradeLevel::Acceptable
        )
    }

    /// Numeric rank, higher is better
    pub fn rank(&self) -> u8 {
        match self {
            GradeLevel::Excellent => 4,
            GradeLevel::Good => 3,
            GradeLevel::Acceptable => 2,
            GradeLevel::Poor => 1,
            GradeLevel::Fail => 0,
        }
    }

    /// Serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            GradeLevel::Excellent => "excellent",
            GradeLevel::Good => "good",
            GradeLevel::Acceptable => "acceptable",
            GradeLevel::Poor => "poor",
            GradeLevel::Fail => "fail",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            GradeLevel::Excellent => "EXCELLENT",
            GradeLevel::Good => "GOOD",
            GradeLevel::Acceptable => "ACCEPTABLE",
            GradeLevel::Poor => "POOR",
            GradeLevel::Fail => "FAIL",
        }
    }

    /// All grades, best first
    pub fn all() -> &'static [GradeLevel] {
        &[
            GradeLevel::Excellent,
            GradeLevel::Good,
            GradeLevel::Acceptable,
            GradeLevel::Poor,
            GradeLevel::Fail,
        ]
    }
}

impl std::fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Lower bounds (inclusive) for each passing-or-poor grade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeThresholds {
    #[serde(default = "default_excellent")]
    pub excellent: f64,
    #[serde(default = "default_good")]
    pub good: f64,
    #[serde(default = "default_acceptable")]
    pub acceptable: f64,
    #[serde(default = "default_poor")]
    pub poor: f64,
}

fn default_excellent() -> f64 {
    0.9
}

fn default_good() -> f64 {
    0.75
}

fn default_acceptable() -> f64 {
    0.6
}

fn default_poor() -> f64 {
    0.4
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            excellent: default_excellent(),
            good: default_good(),
            acceptable: default_acceptable(),
            poor: default_poor(),
        }
    }
}

impl GradeThresholds {
    /// Create thresholds from explicit cut points
    pub fn new(excellent: f64, good: f64, acceptable: f64, poor: f64) -> Self {
        Self {
            excellent,
            good,
            acceptable,
            poor,
        }
    }

    /// Map a score to the highest grade whose cut point it reaches
    pub fn grade(&self, score: f64) -> GradeLevel {
        if score >= self.excellent {
            GradeLevel::Excellent
        } else if score >= self.good {
            GradeLevel::Good
        } else if score >= self.acceptable {
            GradeLevel::Acceptable
        } else if score >= self.poor {
            GradeLevel::Poor
        } else {
            GradeLevel::Fail
        }
    }

    /// Cut points are within [0, 1] and non-increasing from excellent to poor
    pub fn is_well_formed(&self) -> bool {
        let cuts = [self.excellent, self.good, self.acceptable, self.poor];
        cuts.iter().all(|c| (0.0..=1.0).contains(c)) && cuts.windows(2).all(|w| w[0] >= w[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let thresholds = GradeThresholds::default();
        assert_eq!(thresholds.grade(0.95), GradeLevel::Excellent);
        assert_eq!(thresholds.grade(0.9), GradeLevel::Excellent);
        assert_eq!(thresholds.grade(0.8), GradeLevel::Good);
        assert_eq!(thresholds.grade(0.6), GradeLevel::Acceptable);
        assert_eq!(thresholds.grade(0.5), GradeLevel::Poor);
        assert_eq!(thresholds.grade(0.39), GradeLevel::Fail);
    }

    #[test]
    fn test_passing_grades() {
        assert!(GradeLevel::Excellent.is_passing());
        assert!(GradeLevel::Acceptable.is_passing());
        assert!(!GradeLevel::Poor.is_passing());
        assert!(!GradeLevel::Fail.is_passing());
    }

    #[test]
    fn test_grade_ordering_and_serde() {
        let ranks: Vec<u8> = GradeLevel::all().iter().map(|g| g.rank()).collect();
        assert_eq!(ranks, vec![4, 3, 2, 1, 0]);
        assert_eq!(
            serde_json::to_string(&GradeLevel::Acceptable).unwrap(),
            "\"acceptable\""
        );
    }

    #[test]
    fn test_malformed_thresholds() {
        assert!(GradeThresholds::default().is_well_formed());
        assert!(!GradeThresholds::new(0.5, 0.75, 0.6, 0.4).is_well_formed());
        assert!(!GradeThresholds::new(1.2, 0.75, 0.6, 0.4).is_well_formed());
    }
}
