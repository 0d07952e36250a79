//! Core data structures for PM2.5 forecasting.
//!
//! Defines the validated request, cleaned observations, engineered and
//! future feature rows, the forecast result, and the JSON document
//! written to stdout.

use crate::constants::{RANGE_SEPARATOR, round_output};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Validated command-line request
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    /// Latest reading as supplied (clamping happens downstream)
    pub latest_value: f64,
    /// Caller-supplied region label, may be empty
    pub region: String,
    pub csv_path: PathBuf,
}

/// One cleaned row of the input dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Normalised to UTC
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Calendar fields and cyclical encodings derived from a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeFeatures {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    /// Monday = 0
    pub day_of_week: u32,
    pub sin_hour: f64,
    pub cos_hour: f64,
    pub sin_month: f64,
    pub cos_month: f64,
}

/// Observation extended with engineered features and categorical labels
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub observation: Observation,
    pub time: TimeFeatures,
    pub region: String,
    pub parameter: String,
}

/// One synthesized hour of the forecast horizon
#[derive(Debug, Clone, PartialEq)]
pub struct FutureRow {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub time: TimeFeatures,
    pub region: String,
    pub parameter: String,
    /// Filled in by the forecast generator
    pub predicted_pm25: f64,
}

/// Summary statistics over the forecast series
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisBlock {
    pub last_actual: f64,
    pub forecast_mean: f64,
    pub forecast_min: f64,
    pub forecast_max: f64,
    /// Last point minus first point
    pub trend_delta: f64,
    pub direction: String,
    pub quality_category: String,
    pub percent_change: f64,
}

/// Final outcome of a successful run, unrounded
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub region: String,
    pub predicted_mean: f64,
    pub category: String,
    pub trend: String,
    pub forecast: Vec<f64>,
    pub analysis: AnalysisBlock,
}

/// Analysis block as serialized in the output document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub nilai_aktual_terakhir: f64,
    pub rata_rata_prediksi: f64,
    /// `"<min> – <max>"`
    pub rentang_prediksi: String,
    pub perubahan_tren: f64,
    pub arah_tren: String,
    pub kategori_kualitas: String,
    pub persentase_perubahan: f64,
}

/// The single JSON document written to stdout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForecastOutput {
    Success {
        success: bool,
        region: String,
        predicted_mean: f64,
        kategori: String,
        trend: String,
        forecast_1day: Vec<f64>,
        analisis: AnalysisOutput,
    },
    Failure {
        success: bool,
        message: String,
    },
}

impl ForecastOutput {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            success: false,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Process exit code matching this document
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

impl From<&ForecastResult> for ForecastOutput {
    /// Round every numeric field to the output precision
    fn from(result: &ForecastResult) -> Self {
        let analysis = &result.analysis;
        let min = round_output(analysis.forecast_min);
        let max = round_output(analysis.forecast_max);

        Self::Success {
            success: true,
            region: result.region.clone(),
            predicted_mean: round_output(result.predicted_mean),
            kategori: result.category.clone(),
            trend: result.trend.clone(),
            forecast_1day: result.forecast.iter().copied().map(round_output).collect(),
            analisis: AnalysisOutput {
                nilai_aktual_terakhir: round_output(analysis.last_actual),
                rata_rata_prediksi: round_output(analysis.forecast_mean),
                rentang_prediksi: format!("{:?}{}{:?}", min, RANGE_SEPARATOR, max),
                perubahan_tren: round_output(analysis.trend_delta),
                arah_tren: analysis.direction.clone(),
                kategori_kualitas: analysis.quality_category.clone(),
                persentase_perubahan: round_output(analysis.percent_change),
            },
        }
    }
}
