//! Feed-forward neural regressor.
//!
//! A stack of dense layers, each `activation(x · W + b)`, ending in a
//! single output unit.

use super::Estimator;
use crate::error::{ForecastError, Result};
use ndarray::{Array1, Array2};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Linear,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Linear => x,
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DenseLayerSpec {
    /// `inputs` rows of `units` weights each
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    activation: Activation,
}

#[derive(Debug, Deserialize)]
struct NeuralNetworkSpec {
    layers: Vec<DenseLayerSpec>,
}

#[derive(Debug, Clone)]
struct DenseLayer {
    weights: Array2<f64>,
    bias: Array1<f64>,
    activation: Activation,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "NeuralNetworkSpec")]
pub struct NeuralNetwork {
    layers: Vec<DenseLayer>,
}

impl TryFrom<NeuralNetworkSpec> for NeuralNetwork {
    type Error = String;

    fn try_from(spec: NeuralNetworkSpec) -> std::result::Result<Self, Self::Error> {
        if spec.layers.is_empty() {
            return Err("network has no layers".to_string());
        }

        let mut layers = Vec::with_capacity(spec.layers.len());
        let mut expected_inputs = None;

        for (index, layer) in spec.layers.into_iter().enumerate() {
            let inputs = layer.weights.len();
            let units = layer.weights.first().map_or(0, Vec::len);

            if inputs == 0 || units == 0 {
                return Err(format!("layer {} has empty weights", index));
            }
            if layer.weights.iter().any(|row| row.len() != units) {
                return Err(format!("layer {} has ragged weight rows", index));
            }
            if layer.bias.len() != units {
                return Err(format!(
                    "layer {} has {} units but {} biases",
                    index,
                    units,
                    layer.bias.len()
                ));
            }
            if let Some(expected) = expected_inputs {
                if inputs != expected {
                    return Err(format!(
                        "layer {} takes {} inputs but previous layer has {} units",
                        index, inputs, expected
                    ));
                }
            }
            expected_inputs = Some(units);

            let weights = Array2::from_shape_vec((inputs, units), layer.weights.concat())
                .map_err(|e| format!("layer {}: {}", index, e))?;
            layers.push(DenseLayer {
                weights,
                bias: Array1::from(layer.bias),
                activation: layer.activation,
            });
        }

        if expected_inputs != Some(1) {
            return Err("final layer must have exactly one unit".to_string());
        }

        Ok(Self { layers })
    }
}

impl Estimator for NeuralNetwork {
    fn n_features(&self) -> usize {
        self.layers[0].weights.nrows()
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<f64>> {
        if features.ncols() != self.n_features() {
            return Err(ForecastError::artifact_shape(
                "neural network",
                format!(
                    "expected {} features, got {}",
                    self.n_features(),
                    features.ncols()
                ),
            ));
        }

        let mut activations = features.to_owned();
        for layer in &self.layers {
            let activation = layer.activation;
            activations = (activations.dot(&layer.weights) + &layer.bias).mapv(|x| activation.apply(x));
        }

        Ok(activations.column(0).to_vec())
    }
}
