//! Calendar and cyclical time features.
//!
//! Hour-of-day and month-of-year are encoded as sine/cosine pairs so that
//! 23:00 sits next to 00:00 and December next to January.

use crate::constants::{PM25_MARKER, columns};
use crate::models::{FeatureRow, Observation, TimeFeatures};
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::f64::consts::PI;

/// (sin, cos) of `value` on a cycle of length `period`
pub fn cyclical(value: f64, period: f64) -> (f64, f64) {
    let angle = 2.0 * PI * value / period;
    (angle.sin(), angle.cos())
}

impl TimeFeatures {
    /// Derive calendar fields and cyclical encodings from a UTC timestamp
    pub fn from_timestamp(timestamp: &DateTime<Utc>) -> Self {
        let hour = timestamp.hour();
        let month = timestamp.month();
        let (sin_hour, cos_hour) = cyclical(hour as f64, 24.0);
        let (sin_month, cos_month) = cyclical(month as f64, 12.0);

        Self {
            year: timestamp.year(),
            month,
            day: timestamp.day(),
            hour,
            day_of_week: timestamp.weekday().num_days_from_monday(),
            sin_hour,
            cos_hour,
            sin_month,
            cos_month,
        }
    }

    /// Look up a time feature by its scaler column name
    pub fn get(&self, name: &str) -> Option<f64> {
        let value = match name {
            columns::YEAR => self.year as f64,
            columns::MONTH => self.month as f64,
            columns::DAY => self.day as f64,
            columns::HOUR => self.hour as f64,
            columns::DAY_OF_WEEK => self.day_of_week as f64,
            columns::SIN_HOUR => self.sin_hour,
            columns::COS_HOUR => self.cos_hour,
            columns::SIN_MONTH => self.sin_month,
            columns::COS_MONTH => self.cos_month,
            _ => return None,
        };
        Some(value)
    }
}

/// Extend cleaned observations with time features, stamping each row
/// with the detected region and the PM2.5 marker
pub fn engineer_features(observations: &[Observation], region: &str) -> Vec<FeatureRow> {
    observations
        .iter()
        .map(|observation| FeatureRow {
            observation: observation.clone(),
            time: TimeFeatures::from_timestamp(&observation.timestamp),
            region: region.to_string(),
            parameter: PM25_MARKER.to_string(),
        })
        .collect()
}
