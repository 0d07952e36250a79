//! Air-quality classification and forecast summary statistics.

use crate::config::ForecastConfig;
use crate::constants::{
    CATEGORY_LABELS, CATEGORY_UPPER_EDGES, DIRECTION_DECREASING, DIRECTION_INCREASING,
    DIRECTION_STABLE, TREND_DECREASING, TREND_INCREASING, TREND_SHARP_DECREASE,
};
use crate::models::{AnalysisBlock, ForecastResult};
use tracing::{debug, info};

/// Ordinal air-quality category over fixed PM2.5 bins
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AirQualityCategory {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
}

impl AirQualityCategory {
    const ORDERED: [Self; 5] = [
        Self::Good,
        Self::Moderate,
        Self::UnhealthySensitive,
        Self::Unhealthy,
        Self::VeryUnhealthy,
    ];

    /// Bins are left-closed, right-open; the last one is unbounded
    pub fn from_value(value: f64) -> Self {
        let index = CATEGORY_UPPER_EDGES
            .iter()
            .position(|&edge| value < edge)
            .unwrap_or(CATEGORY_UPPER_EDGES.len());
        Self::ORDERED[index]
    }

    pub fn label(self) -> &'static str {
        CATEGORY_LABELS[self as usize]
    }
}

/// Three-way direction of the forecast series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    /// Classify `delta`, treating `[-dead_zone, dead_zone]` as stable
    pub fn classify(delta: f64, dead_zone: f64) -> Self {
        if delta > dead_zone {
            Self::Increasing
        } else if delta < -dead_zone {
            Self::Decreasing
        } else {
            Self::Stable
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Increasing => DIRECTION_INCREASING,
            Self::Decreasing => DIRECTION_DECREASING,
            Self::Stable => DIRECTION_STABLE,
        }
    }
}

/// Mean of a series, `None` when empty or non-finite
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    mean.is_finite().then_some(mean)
}

/// `decreasing` only when the last point is strictly below the first
pub fn trend_label(forecast: &[f64]) -> &'static str {
    match (forecast.first(), forecast.last()) {
        (Some(first), Some(last)) if last < first => TREND_DECREASING,
        _ => TREND_INCREASING,
    }
}

/// `(last_actual - mean) / last_actual * 100`, or 0 for a zero reading
pub fn percent_change(last_actual: f64, mean: f64) -> f64 {
    if last_actual == 0.0 {
        0.0
    } else {
        (last_actual - mean) / last_actual * 100.0
    }
}

/// Replace a degenerate low mean after an extreme reading.
///
/// Returns the adjusted mean when the rule fires.
pub fn apply_override(latest_reading: f64, predicted_mean: f64, config: &ForecastConfig) -> Option<f64> {
    (latest_reading > config.override_reading_threshold
        && predicted_mean < config.override_mean_threshold)
        .then(|| latest_reading * config.override_factor)
}

/// Summary block over the forecast series
pub fn summarize(forecast: &[f64], last_actual: f64, config: &ForecastConfig) -> AnalysisBlock {
    let forecast_mean = mean(forecast).unwrap_or(0.0);
    let forecast_min = forecast.iter().copied().fold(f64::INFINITY, f64::min);
    let forecast_max = forecast.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let trend_delta = match (forecast.first(), forecast.last()) {
        (Some(first), Some(last)) => last - first,
        _ => 0.0,
    };

    AnalysisBlock {
        last_actual,
        forecast_mean,
        forecast_min: if forecast.is_empty() { 0.0 } else { forecast_min },
        forecast_max: if forecast.is_empty() { 0.0 } else { forecast_max },
        trend_delta,
        direction: TrendDirection::classify(trend_delta, config.trend_dead_zone)
            .label()
            .to_string(),
        quality_category: AirQualityCategory::from_value(forecast_mean).label().to_string(),
        percent_change: percent_change(last_actual, forecast_mean),
    }
}

/// Classify the forecast and assemble the final result
pub fn analyze(
    region: &str,
    forecast: Vec<f64>,
    latest_reading: f64,
    base_value: f64,
    last_actual: f64,
    config: &ForecastConfig,
) -> ForecastResult {
    let mut predicted_mean = mean(&forecast).unwrap_or(base_value);
    let mut trend = trend_label(&forecast);
    // Classified before any override; the override only touches mean and trend
    let category = AirQualityCategory::from_value(predicted_mean);

    if let Some(adjusted) = apply_override(latest_reading, predicted_mean, config) {
        info!(
            "Forecast mean {:.2} too low after reading {:.2}, adjusted to {:.2}",
            predicted_mean, latest_reading, adjusted
        );
        predicted_mean = adjusted;
        trend = TREND_SHARP_DECREASE;
    }

    let analysis = summarize(&forecast, last_actual, config);
    debug!("Analysis: {:?}", analysis);

    ForecastResult {
        region: region.to_string(),
        predicted_mean,
        category: category.label().to_string(),
        trend: trend.to_string(),
        forecast,
        analysis,
    }
}
