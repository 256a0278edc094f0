//! Linear regressor artifacts
//!
//! Artifacts are JSON files exported from the training pipeline: feature
//! order, standardization mean/scale and one weight set per target. The
//! amount target is optionally log1p-transformed during training, in which
//! case the prediction is inverted with expm1 here.

use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::{FeatureVector, Prediction, Scorer, ScoringError};

/// One regression head of the artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionHead {
    pub weights: Vec<f64>,
    pub intercept: f64,
    /// Target was log1p-transformed during training
    #[serde(default)]
    pub log_target: bool,
}

/// Serialized scorer artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerArtifact {
    /// Feature names, in training order
    pub features: Vec<String>,
    /// Standardization means, one per feature
    pub mean: Vec<f64>,
    /// Standardization scales, one per feature
    pub scale: Vec<f64>,
    /// Eligible-amount regression
    pub amount: RegressionHead,
    /// Interest-rate regression
    pub rate: RegressionHead,
}

/// Linear scorer backed by a loaded artifact
pub struct LinearScorer {
    features: Vec<String>,
    mean: Array1<f64>,
    scale: Array1<f64>,
    amount_weights: Array1<f64>,
    amount_intercept: f64,
    amount_log_target: bool,
    rate_weights: Array1<f64>,
    rate_intercept: f64,
}

impl LinearScorer {
    /// Build a scorer from a deserialized artifact, checking dimensions.
    pub fn from_artifact(artifact: ScorerArtifact, path: &str) -> Result<Self, ScoringError> {
        let n = artifact.features.len();
        for (name, len) in [
            ("mean", artifact.mean.len()),
            ("scale", artifact.scale.len()),
            ("amount.weights", artifact.amount.weights.len()),
            ("rate.weights", artifact.rate.weights.len()),
        ] {
            if len != n {
                return Err(ScoringError::Artifact {
                    path: path.to_string(),
                    message: format!("{} has {} entries, expected {}", name, len, n),
                });
            }
        }

        // A zero scale would divide by zero; constant features standardize
        // to zero instead.
        let scale = artifact
            .scale
            .iter()
            .map(|s| if *s == 0.0 { 1.0 } else { *s })
            .collect::<Vec<_>>();

        Ok(Self {
            features: artifact.features,
            mean: Array1::from_vec(artifact.mean),
            scale: Array1::from_vec(scale),
            amount_weights: Array1::from_vec(artifact.amount.weights),
            amount_intercept: artifact.amount.intercept,
            amount_log_target: artifact.amount.log_target,
            rate_weights: Array1::from_vec(artifact.rate.weights),
            rate_intercept: artifact.rate.intercept,
        })
    }

    /// Load an artifact from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScoringError> {
        let display = path.as_ref().display().to_string();
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ScoringError::Artifact {
            path: display.clone(),
            message: e.to_string(),
        })?;
        let artifact: ScorerArtifact =
            serde_json::from_str(&content).map_err(|e| ScoringError::Artifact {
                path: display.clone(),
                message: e.to_string(),
            })?;
        Self::from_artifact(artifact, &display)
    }

    /// Arrange the caller's features into training order and standardize.
    fn standardized(&self, features: &FeatureVector) -> Result<Array1<f64>, ScoringError> {
        let mut x = Array1::zeros(self.features.len());
        for (i, name) in self.features.iter().enumerate() {
            let value = features
                .get(name)
                .ok_or_else(|| ScoringError::Feature(format!("missing feature {}", name)))?;
            x[i] = value;
        }
        Ok((x - &self.mean) / &self.scale)
    }
}

impl Scorer for LinearScorer {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction, ScoringError> {
        let z = self.standardized(features)?;

        let mut eligible_amount = z.dot(&self.amount_weights) + self.amount_intercept;
        if self.amount_log_target {
            eligible_amount = eligible_amount.exp_m1();
        }
        let interest_rate = z.dot(&self.rate_weights) + self.rate_intercept;

        Ok(Prediction {
            eligible_amount,
            interest_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_artifact() -> ScorerArtifact {
        ScorerArtifact {
            features: vec!["Age".to_string(), "CIBIL_Score".to_string()],
            mean: vec![40.0, 700.0],
            scale: vec![10.0, 100.0],
            amount: RegressionHead {
                weights: vec![50_000.0, 200_000.0],
                intercept: 600_000.0,
                log_target: false,
            },
            rate: RegressionHead {
                weights: vec![0.5, -2.0],
                intercept: 12.0,
                log_target: false,
            },
        }
    }

    #[test]
    fn test_predict() {
        let scorer = LinearScorer::from_artifact(test_artifact(), "test").unwrap();
        let mut fv = FeatureVector::new();
        fv.push("Age", 30.0);
        fv.push("CIBIL_Score", 800.0);

        // z = [-1.0, 1.0] => amount = -50k + 200k + 600k, rate = -0.5 - 2 + 12
        let p = scorer.predict(&fv).unwrap();
        assert!((p.eligible_amount - 750_000.0).abs() < 1e-6);
        assert!((p.interest_rate - 9.5).abs() < 1e-6);
    }

    #[test]
    fn test_missing_feature() {
        let scorer = LinearScorer::from_artifact(test_artifact(), "test").unwrap();
        let mut fv = FeatureVector::new();
        fv.push("Age", 30.0);
        assert!(matches!(
            scorer.predict(&fv),
            Err(ScoringError::Feature(_))
        ));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut artifact = test_artifact();
        artifact.mean.pop();
        assert!(matches!(
            LinearScorer::from_artifact(artifact, "test"),
            Err(ScoringError::Artifact { .. })
        ));
    }

    #[test]
    fn test_log_target_inversion() {
        let mut artifact = test_artifact();
        artifact.amount = RegressionHead {
            weights: vec![0.0, 0.0],
            intercept: 13.0,
            log_target: true,
        };
        let scorer = LinearScorer::from_artifact(artifact, "test").unwrap();
        let mut fv = FeatureVector::new();
        fv.push("Age", 40.0);
        fv.push("CIBIL_Score", 700.0);
        let p = scorer.predict(&fv).unwrap();
        assert!((p.eligible_amount - 13f64.exp_m1()).abs() < 1.0);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("personal_scorer.json");
        std::fs::write(&path, serde_json::to_string(&test_artifact()).unwrap()).unwrap();

        let scorer = LinearScorer::load(&path).unwrap();
        let mut fv = FeatureVector::new();
        fv.push("Age", 40.0);
        fv.push("CIBIL_Score", 700.0);
        let p = scorer.predict(&fv).unwrap();
        assert!((p.eligible_amount - 600_000.0).abs() < 1e-6);
        assert!((p.interest_rate - 12.0).abs() < 1e-6);
    }
}
