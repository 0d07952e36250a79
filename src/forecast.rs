//! Forecast generation over a synthesized future time grid.
//!
//! Builds one row per hour past the latest observation, encodes the
//! categorical labels, aligns and scales the feature matrix for the
//! loaded scaler, runs the three estimators, and produces the emitted
//! series either analytically (seasonal terms plus Gaussian noise) or as
//! the estimator ensemble mean, depending on [`ForecastMode`].

use crate::artifacts::{ArtifactSet, CategoryEncoder, FeatureScaler};
use crate::config::{ForecastConfig, ForecastMode, ValueBounds};
use crate::constants::{PM25_MARKER, UNKNOWN_CATEGORY_CODE, columns};
use crate::error::{ForecastError, Result};
use crate::features::cyclical;
use crate::logging;
use crate::models::{FeatureRow, FutureRow, TimeFeatures};
use chrono::Duration;
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use tracing::{debug, info, warn};

/// Where a scaler column's values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSource {
    Supplied,
    /// Expected by the scaler but not produced here; filled with 0
    ZeroFilled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutColumn {
    pub name: String,
    pub source: FeatureSource,
}

/// Ordered feature columns handed to the scaler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFeatureLayout {
    pub columns: Vec<LayoutColumn>,
}

/// Columns the future grid can supply
const SUPPLIED_FEATURES: &[&str] = &[
    columns::LATITUDE,
    columns::LONGITUDE,
    columns::YEAR,
    columns::MONTH,
    columns::DAY,
    columns::HOUR,
    columns::DAY_OF_WEEK,
    columns::SIN_HOUR,
    columns::COS_HOUR,
    columns::SIN_MONTH,
    columns::COS_MONTH,
    columns::CITY,
    columns::PARAMETER,
];

impl ResolvedFeatureLayout {
    /// Use the scaler's declared inputs, or the fallback order without
    /// categorical columns when it declares none
    pub fn resolve(scaler: &dyn FeatureScaler) -> Self {
        let names: Vec<String> = match scaler.feature_names() {
            Some(names) => names.to_vec(),
            None => columns::FALLBACK_FEATURES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        };

        let columns = names
            .into_iter()
            .map(|name| {
                let source = if SUPPLIED_FEATURES.contains(&name.as_str()) {
                    FeatureSource::Supplied
                } else {
                    FeatureSource::ZeroFilled
                };
                LayoutColumn { name, source }
            })
            .collect();

        Self { columns }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn zero_filled(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|column| column.source == FeatureSource::ZeroFilled)
            .map(|column| column.name.as_str())
    }
}

/// Numeric codes for the categorical fields of the future grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedCategories {
    pub region: f64,
    pub parameter: f64,
}

impl EncodedCategories {
    /// Encode both labels; an unseen label becomes the neutral code
    pub fn encode(encoder: &dyn CategoryEncoder, region: &str, parameter: &str) -> Self {
        Self {
            region: encode_or_neutral(encoder, region),
            parameter: encode_or_neutral(encoder, parameter),
        }
    }
}

fn encode_or_neutral(encoder: &dyn CategoryEncoder, label: &str) -> f64 {
    encoder.encode(label).unwrap_or_else(|e| {
        debug!("Encoding fallback for '{}': {}", label, e);
        UNKNOWN_CATEGORY_CODE
    })
}

/// Raw estimator outputs, one value per future row
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorOutputs {
    pub random_forest: Vec<f64>,
    pub gradient_boosted: Vec<f64>,
    pub neural_network: Vec<f64>,
}

impl EstimatorOutputs {
    /// Per-row mean across the three estimators
    pub fn mean(&self) -> Vec<f64> {
        self.random_forest
            .iter()
            .zip(&self.gradient_boosted)
            .zip(&self.neural_network)
            .map(|((rf, gb), nn)| (rf + gb + nn) / 3.0)
            .collect()
    }
}

/// One row per hour offset `1..=horizon` after the latest timestamp,
/// positioned at the last row's coordinates
pub fn build_future_grid(rows: &[FeatureRow], region: &str, horizon: usize) -> Result<Vec<FutureRow>> {
    let last_row = rows
        .last()
        .ok_or_else(|| ForecastError::processing("no observations to forecast from"))?;
    let last_time = rows
        .iter()
        .map(|row| row.observation.timestamp)
        .max()
        .unwrap_or(last_row.observation.timestamp);

    let grid = (1..=horizon as i64)
        .map(|offset| {
            let timestamp = last_time + Duration::hours(offset);
            FutureRow {
                timestamp,
                latitude: last_row.observation.latitude,
                longitude: last_row.observation.longitude,
                time: TimeFeatures::from_timestamp(&timestamp),
                region: region.to_string(),
                parameter: PM25_MARKER.to_string(),
                predicted_pm25: 0.0,
            }
        })
        .collect();

    Ok(grid)
}

/// Feature matrix in layout order, before scaling
pub fn feature_matrix(
    grid: &[FutureRow],
    layout: &ResolvedFeatureLayout,
    categories: &EncodedCategories,
) -> Result<Array2<f64>> {
    let mut values = Vec::with_capacity(grid.len() * layout.width());

    for row in grid {
        for column in &layout.columns {
            let value = match column.name.as_str() {
                columns::LATITUDE => row.latitude,
                columns::LONGITUDE => row.longitude,
                columns::CITY => categories.region,
                columns::PARAMETER => categories.parameter,
                name => row.time.get(name).unwrap_or(0.0),
            };
            values.push(value);
        }
    }

    Array2::from_shape_vec((grid.len(), layout.width()), values)
        .map_err(|e| ForecastError::processing(format!("feature matrix: {}", e)))
}

/// Invoke all three estimators with output suppressed
pub fn run_estimators(artifacts: &ArtifactSet, scaled: &Array2<f64>) -> Result<EstimatorOutputs> {
    let estimators = artifacts.estimators();
    let [random_forest, gradient_boosted, neural_network] = {
        let _quiet = logging::suppress();
        estimators.map(|(_, estimator)| estimator.predict(scaled))
    };
    let outputs = EstimatorOutputs {
        random_forest: random_forest?,
        gradient_boosted: gradient_boosted?,
        neural_network: neural_network?,
    };

    for ((name, _), predictions) in estimators.iter().zip([
        &outputs.random_forest,
        &outputs.gradient_boosted,
        &outputs.neural_network,
    ]) {
        let head = &predictions[..predictions.len().min(3)];
        debug!("{} predictions (first {}): {:?}", name, head.len(), head);
    }

    Ok(outputs)
}

/// Noise source for the analytic series
pub fn noise_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// `base + hour_term + day_term + month_term + noise`, clamped
pub fn analytic_series(
    grid: &[FutureRow],
    base_value: f64,
    config: &ForecastConfig,
    rng: &mut StdRng,
) -> Result<Vec<f64>> {
    let noise = Normal::new(0.0, config.noise_std_dev)
        .map_err(|e| ForecastError::processing(format!("noise distribution: {}", e)))?;

    let series = grid
        .iter()
        .map(|row| {
            let (sin_hour, _) = cyclical(row.time.hour as f64, 24.0);
            let (_, cos_weekday) = cyclical(row.time.day_of_week as f64, 7.0);
            let (sin_month, _) = cyclical(row.time.month as f64, 12.0);

            let value = base_value
                + config.hour_amplitude * sin_hour
                + config.weekday_amplitude * cos_weekday
                + config.month_amplitude * sin_month
                + noise.sample(rng);
            config.value_bounds.clamp(value)
        })
        .collect();

    Ok(series)
}

/// Ensemble mean of the estimators, clamped
pub fn ensemble_series(outputs: &EstimatorOutputs, bounds: &ValueBounds) -> Vec<f64> {
    outputs
        .mean()
        .into_iter()
        .map(|value| {
            if value.is_finite() {
                bounds.clamp(value)
            } else {
                bounds.lower
            }
        })
        .collect()
}

/// Produce the forecast grid, ordered by timestamp, with `predicted_pm25` set
pub fn generate_forecast(
    rows: &[FeatureRow],
    region: &str,
    base_value: f64,
    artifacts: &ArtifactSet,
    config: &ForecastConfig,
) -> Result<Vec<FutureRow>> {
    let mut grid = build_future_grid(rows, region, config.horizon_hours)?;

    let categories = EncodedCategories::encode(artifacts.encoder.as_ref(), region, PM25_MARKER);
    let layout = ResolvedFeatureLayout::resolve(artifacts.scaler.as_ref());
    let zero_filled: Vec<&str> = layout.zero_filled().collect();
    if !zero_filled.is_empty() {
        warn!("Scaler expects features with no source, filled with 0: {:?}", zero_filled);
    }

    let features = feature_matrix(&grid, &layout, &categories)?;
    let scaled = artifacts.scaler.transform(&features)?;
    let outputs = run_estimators(artifacts, &scaled)?;

    let series = match config.mode {
        ForecastMode::Analytic => {
            let mut rng = noise_rng(config.seed);
            analytic_series(&grid, base_value, config, &mut rng)?
        }
        ForecastMode::Ensemble => ensemble_series(&outputs, &config.value_bounds),
    };
    info!(
        "Generated {} forecast points ({:?} mode) for '{}'",
        series.len(),
        config.mode,
        region
    );

    for (row, value) in grid.iter_mut().zip(series) {
        row.predicted_pm25 = value;
    }
    grid.sort_by_key(|row| row.timestamp);

    Ok(grid)
}
