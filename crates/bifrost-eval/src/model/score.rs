//! Validated per-dimension score

use serde::{Deserialize, Serialize};

use crate::error::{BifrostError, BifrostResult};

/// One named scoring dimension.
///
/// `value` always lies in [0, 1] and `weight` is never negative; both
/// constructors and deserialization enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEvalScore")]
pub struct EvalScore {
    name: String,
    value: f64,
    weight: f64,
    details: String,
}

#[derive(Deserialize)]
struct RawEvalScore {
    name: String,
    value: f64,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(default)]
    details: String,
}

fn default_weight() -> f64 {
    1.0
}

impl TryFrom<RawEvalScore> for EvalScore {
    type Error = BifrostError;

    fn try_from(raw: RawEvalScore) -> Result<Self, Self::Error> {
        Ok(EvalScore::new(raw.name, raw.value)?
            .with_weight(raw.weight)?
            .with_details(raw.details))
    }
}

impl EvalScore {
    /// Create a score with weight 1.0
    pub fn new(name: impl Into<String>, value: f64) -> BifrostResult<Self> {
        let name = name.into();
        if !(0.0..=1.0).contains(&value) {
            return Err(BifrostError::ScoreOutOfRange { name, value });
        }
        Ok(Self {
            name,
            value,
            weight: default_weight(),
            details: String::new(),
        })
    }

    /// Replace the weight
    pub fn with_weight(mut self, weight: f64) -> BifrostResult<Self> {
        if weight.is_nan() || weight < 0.0 {
            return Err(BifrostError::InvalidWeight {
                name: self.name,
                weight,
            });
        }
        self.weight = weight;
        Ok(self)
    }

    /// Attach a rationale
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn details(&self) -> &str {
        &self.details
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_range_is_enforced() {
        for value in [0.0, 0.25, 0.5, 1.0] {
            assert!(EvalScore::new("dim", value).is_ok(), "{value} should be accepted");
        }
        for value in [-0.01, 1.01, f64::NAN, f64::INFINITY] {
            assert!(EvalScore::new("dim", value).is_err(), "{value} should be rejected");
        }
    }

    #[test]
    fn test_weight_must_be_non_negative() {
        let score = EvalScore::new("dim", 0.5).unwrap();
        assert_eq!(score.weight(), 1.0);
        assert!(score.clone().with_weight(0.0).is_ok());
        assert!(score.clone().with_weight(-1.0).is_err());
        assert!(score.with_weight(f64::NAN).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: EvalScore =
            serde_json::from_value(json!({ "name": "accuracy", "value": 1.0 })).unwrap();
        assert_eq!(ok.weight(), 1.0);
        assert_eq!(ok.details(), "");

        let bad = serde_json::from_value::<EvalScore>(json!({ "name": "accuracy", "value": 2.0 }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_serialize_shape() {
        let score = EvalScore::new("latency", 0.5)
            .unwrap()
            .with_weight(2.0)
            .unwrap()
            .with_details("Target: 100ms");
        let value = serde_json::to_value(&score).unwrap();
        assert_eq!(
            value,
            json!({ "name": "latency", "value": 0.5, "weight": 2.0, "details": "Target: 100ms" })
        );
    }
}
