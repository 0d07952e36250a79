//! End-to-end forecast run: artifacts, dataset, features, forecast and
//! analysis, strictly in that order. The first failure aborts the run.

use crate::analysis::analyze;
use crate::artifacts::load_artifacts;
use crate::config::ForecastConfig;
use crate::dataset::{compute_baseline, detect_region, load_dataset};
use crate::error::{ForecastError, Result};
use crate::features::engineer_features;
use crate::forecast::generate_forecast;
use crate::models::{ForecastRequest, ForecastResult};
use std::time::Instant;
use tracing::{debug, info};

/// Run the full pipeline for one request
pub fn run(request: &ForecastRequest, config: &ForecastConfig) -> Result<ForecastResult> {
    let start_time = Instant::now();

    let models_dir = config.resolve_models_dir()?;
    let artifacts = load_artifacts(&models_dir)?;

    let dataset = load_dataset(&request.csv_path)?;
    let region = detect_region(&dataset, &request.region, &request.csv_path);
    let baseline = compute_baseline(
        &dataset.observations,
        config.recent_window,
        request.latest_value,
        &config.value_bounds,
    );
    debug!(
        "Region '{}', latest reading {:.2}, baseline {:.2}",
        region, baseline.latest_reading, baseline.base_value
    );

    let rows = engineer_features(&dataset.observations, &region);
    let grid = generate_forecast(&rows, &region, baseline.base_value, &artifacts, config)?;
    let forecast: Vec<f64> = grid.iter().map(|row| row.predicted_pm25).collect();

    let last_actual = dataset.last_actual().ok_or(ForecastError::EmptyDataset)?;
    let result = analyze(
        &region,
        forecast,
        baseline.latest_reading,
        baseline.base_value,
        last_actual,
        config,
    );

    info!(
        "Forecast for '{}' completed in {:.2?}: mean {:.2} ({})",
        result.region,
        start_time.elapsed(),
        result.predicted_mean,
        result.category
    );
    Ok(result)
}
