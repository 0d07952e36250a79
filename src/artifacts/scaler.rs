//! Standardising feature scaler exported by the training pipeline.

use super::FeatureScaler;
use crate::error::{ForecastError, Result};
use ndarray::{Array1, Array2};
use serde::Deserialize;

/// On-disk form of the scaler
#[derive(Debug, Deserialize)]
struct StandardScalerSpec {
    mean: Vec<f64>,
    scale: Vec<f64>,
    #[serde(default)]
    feature_names_in: Option<Vec<String>>,
}

/// `(x - mean) / scale`, column-wise
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "StandardScalerSpec")]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
    feature_names_in: Option<Vec<String>>,
}

impl TryFrom<StandardScalerSpec> for StandardScaler {
    type Error = String;

    fn try_from(spec: StandardScalerSpec) -> std::result::Result<Self, Self::Error> {
        if spec.mean.is_empty() {
            return Err("scaler has no features".to_string());
        }
        if spec.mean.len() != spec.scale.len() {
            return Err(format!(
                "mean has {} entries but scale has {}",
                spec.mean.len(),
                spec.scale.len()
            ));
        }
        if let Some(names) = &spec.feature_names_in {
            if names.len() != spec.mean.len() {
                return Err(format!(
                    "{} feature names for {} features",
                    names.len(),
                    spec.mean.len()
                ));
            }
        }

        // Constant training features were stored with zero scale.
        let scale = spec
            .scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();

        Ok(Self {
            mean: Array1::from(spec.mean),
            scale,
            feature_names_in: spec.feature_names_in,
        })
    }
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>, feature_names_in: Option<Vec<String>>) -> Result<Self> {
        Self::try_from(StandardScalerSpec {
            mean,
            scale,
            feature_names_in,
        })
        .map_err(|reason| ForecastError::artifact_shape("scaler", reason))
    }
}

impl FeatureScaler for StandardScaler {
    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names_in.as_deref()
    }

    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        if features.ncols() != self.n_features() {
            return Err(ForecastError::artifact_shape(
                "scaler",
                format!(
                    "expected {} features, got {}",
                    self.n_features(),
                    features.ncols()
                ),
            ));
        }
        Ok((features - &self.mean) / &self.scale)
    }
}
