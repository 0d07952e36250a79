//! Pre-trained artifact loading.
//!
//! The offline training pipeline exports two tree ensembles, a neural
//! regressor, a feature scaler and a categorical encoder as JSON files in
//! one directory. The forecast only talks to them through the
//! [`Estimator`], [`FeatureScaler`] and [`CategoryEncoder`] traits.

pub mod encoder;
pub mod neural;
pub mod scaler;
pub mod tree;

pub use encoder::LabelEncoder;
pub use neural::NeuralNetwork;
pub use scaler::StandardScaler;
pub use tree::TreeEnsemble;

use crate::constants::{
    ENCODER_FILE, GRADIENT_BOOSTED_FILE, NEURAL_NETWORK_FILE, RANDOM_FOREST_FILE, SCALER_FILE,
};
use crate::error::{ForecastError, Result};
use crate::logging;
use ndarray::Array2;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

/// A fitted regressor over scaled features
pub trait Estimator {
    fn n_features(&self) -> usize;

    /// One prediction per row of `features`
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<f64>>;
}

/// A fitted column-wise feature transform
pub trait FeatureScaler {
    /// Input columns the scaler was fitted on, when it recorded them
    fn feature_names(&self) -> Option<&[String]>;

    fn n_features(&self) -> usize;

    fn transform(&self, features: &Array2<f64>) -> Result<Array2<f64>>;
}

/// A fitted categorical encoder
pub trait CategoryEncoder {
    /// Numeric code for `label`; errors on labels unseen during fitting
    fn encode(&self, label: &str) -> Result<f64>;
}

/// Every artifact a forecast needs
pub struct ArtifactSet {
    pub random_forest: Box<dyn Estimator>,
    pub gradient_boosted: Box<dyn Estimator>,
    pub neural_network: Box<dyn Estimator>,
    pub scaler: Box<dyn FeatureScaler>,
    pub encoder: Box<dyn CategoryEncoder>,
}

impl std::fmt::Debug for ArtifactSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactSet")
            .field("scaler_features", &self.scaler.n_features())
            .finish_non_exhaustive()
    }
}

impl ArtifactSet {
    /// Estimators with their display names, in invocation order
    pub fn estimators(&self) -> [(&'static str, &dyn Estimator); 3] {
        [
            ("random_forest", self.random_forest.as_ref()),
            ("gradient_boosted", self.gradient_boosted.as_ref()),
            ("neural_network", self.neural_network.as_ref()),
        ]
    }
}

/// Load all artifacts from `models_dir`. Output is suppressed while loading;
/// the first failure aborts and nothing partially loaded is returned.
pub fn load_artifacts(models_dir: &Path) -> Result<ArtifactSet> {
    info!("Loading artifacts from {}", models_dir.display());

    let artifacts = {
        let _quiet = logging::suppress();
        ArtifactSet {
            random_forest: Box::new(read_artifact::<TreeEnsemble>(models_dir, RANDOM_FOREST_FILE)?),
            gradient_boosted: Box::new(read_artifact::<TreeEnsemble>(
                models_dir,
                GRADIENT_BOOSTED_FILE,
            )?),
            neural_network: Box::new(read_artifact::<NeuralNetwork>(
                models_dir,
                NEURAL_NETWORK_FILE,
            )?),
            scaler: Box::new(read_artifact::<StandardScaler>(models_dir, SCALER_FILE)?),
            encoder: Box::new(read_artifact::<LabelEncoder>(models_dir, ENCODER_FILE)?),
        }
    };

    check_widths(&artifacts)?;
    debug!("Artifacts loaded: {:?}", artifacts);
    Ok(artifacts)
}

/// Every estimator must consume exactly the scaler's output width
fn check_widths(artifacts: &ArtifactSet) -> Result<()> {
    let width = artifacts.scaler.n_features();
    for (name, estimator) in artifacts.estimators() {
        if estimator.n_features() != width {
            return Err(ForecastError::artifact_shape(
                name,
                format!(
                    "expects {} features but the scaler produces {}",
                    estimator.n_features(),
                    width
                ),
            ));
        }
    }
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(models_dir: &Path, file_name: &str) -> Result<T> {
    let path = models_dir.join(file_name);
    let contents = std::fs::read_to_string(&path)
        .map_err(|e| ForecastError::artifact_load(&path, e.to_string()))?;
    serde_json::from_str(&contents).map_err(|e| ForecastError::artifact_load(&path, e.to_string()))
}
