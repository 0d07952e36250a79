//! Configuration management and validation.
//!
//! Holds every tunable constant of the forecast (amplitudes, noise,
//! override thresholds, bounds), the forecast mode switch and the
//! artifact directory, layered as defaults -> JSON file -> CLI/env.

use crate::constants::{
    DEFAULT_HORIZON_HOURS, DEFAULT_HOUR_AMPLITUDE, DEFAULT_MONTH_AMPLITUDE,
    DEFAULT_NOISE_STD_DEV, DEFAULT_OVERRIDE_FACTOR, DEFAULT_OVERRIDE_MEAN_THRESHOLD,
    DEFAULT_OVERRIDE_READING_THRESHOLD, DEFAULT_RECENT_WINDOW, DEFAULT_TREND_DEAD_ZONE,
    DEFAULT_WEEKDAY_AMPLITUDE, MODELS_DIR_NAME, VALUE_LOWER_BOUND, VALUE_UPPER_BOUND,
};
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How the emitted forecast series is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ForecastMode {
    /// Closed-form seasonal formula plus Gaussian noise
    #[default]
    Analytic,
    /// Per-point mean of the three loaded estimators
    Ensemble,
}

/// Closed interval every reading and forecast value is clamped into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueBounds {
    pub lower: f64,
    pub upper: f64,
}

impl Default for ValueBounds {
    fn default() -> Self {
        Self {
            lower: VALUE_LOWER_BOUND,
            upper: VALUE_UPPER_BOUND,
        }
    }
}

impl ValueBounds {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }
}

/// Global configuration for a forecast run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub mode: ForecastMode,

    /// Seed for the noise generator; `None` draws from OS entropy
    pub seed: Option<u64>,

    pub horizon_hours: usize,

    /// Trailing cleaned rows averaged into the baseline
    pub recent_window: usize,

    pub value_bounds: ValueBounds,

    pub hour_amplitude: f64,
    pub weekday_amplitude: f64,
    pub month_amplitude: f64,
    pub noise_std_dev: f64,

    pub override_reading_threshold: f64,
    pub override_mean_threshold: f64,
    pub override_factor: f64,

    pub trend_dead_zone: f64,

    /// Artifact directory; defaults to `models/` beside the executable
    pub models_dir: Option<PathBuf>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            mode: ForecastMode::Analytic,
            seed: None,
            horizon_hours: DEFAULT_HORIZON_HOURS,
            recent_window: DEFAULT_RECENT_WINDOW,
            value_bounds: ValueBounds::default(),
            hour_amplitude: DEFAULT_HOUR_AMPLITUDE,
            weekday_amplitude: DEFAULT_WEEKDAY_AMPLITUDE,
            month_amplitude: DEFAULT_MONTH_AMPLITUDE,
            noise_std_dev: DEFAULT_NOISE_STD_DEV,
            override_reading_threshold: DEFAULT_OVERRIDE_READING_THRESHOLD,
            override_mean_threshold: DEFAULT_OVERRIDE_MEAN_THRESHOLD,
            override_factor: DEFAULT_OVERRIDE_FACTOR,
            trend_dead_zone: DEFAULT_TREND_DEAD_ZONE,
            models_dir: None,
        }
    }
}

impl ForecastConfig {
    /// Load a configuration file (JSON). Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ForecastError::Configuration {
            message: format!("cannot read config file {}: {}", path.display(), e),
        })?;
        let config: Self =
            serde_json::from_str(&contents).map_err(|e| ForecastError::Configuration {
                message: format!("invalid config file {}: {}", path.display(), e),
            })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Set the forecast mode
    pub fn with_mode(mut self, mode: ForecastMode) -> Self {
        self.mode = mode;
        self
    }

    /// Fix the noise seed for reproducible output
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Point artifact loading at a specific directory
    pub fn with_models_dir(mut self, models_dir: impl Into<PathBuf>) -> Self {
        self.models_dir = Some(models_dir.into());
        self
    }

    /// Set the number of forecast hours
    pub fn with_horizon_hours(mut self, horizon_hours: usize) -> Self {
        self.horizon_hours = horizon_hours;
        self
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        let fail = |message: &str| {
            Err(ForecastError::Configuration {
                message: message.to_string(),
            })
        };

        if self.horizon_hours == 0 {
            return fail("horizon_hours must be at least 1");
        }
        if self.recent_window == 0 {
            return fail("recent_window must be at least 1");
        }
        if !(self.value_bounds.lower.is_finite() && self.value_bounds.upper.is_finite())
            || self.value_bounds.lower > self.value_bounds.upper
        {
            return fail("value_bounds must be finite with lower <= upper");
        }
        if !self.noise_std_dev.is_finite() || self.noise_std_dev < 0.0 {
            return fail("noise_std_dev must be a non-negative number");
        }
        if !self.override_factor.is_finite() {
            return fail("override_factor must be finite");
        }
        if !self.trend_dead_zone.is_finite() || self.trend_dead_zone < 0.0 {
            return fail("trend_dead_zone must be a non-negative number");
        }
        Ok(())
    }

    /// Resolve the artifact directory
    pub fn resolve_models_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.models_dir {
            return Ok(dir.clone());
        }

        let exe = std::env::current_exe()?;
        let base = exe.parent().ok_or_else(|| ForecastError::Configuration {
            message: format!("executable path has no parent: {}", exe.display()),
        })?;
        Ok(base.join(MODELS_DIR_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = ForecastConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mode, ForecastMode::Analytic);
        assert_eq!(config.horizon_hours, 24);
        assert_eq!(config.value_bounds.upper, 500.0);
    }

    #[test]
    fn test_partial_config_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"mode": "ensemble", "seed": 7}}"#).unwrap();

        let config = ForecastConfig::from_file(file.path()).unwrap();
        assert_eq!(config.mode, ForecastMode::Ensemble);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.noise_std_dev, 5.0);
        assert_eq!(config.recent_window, 10);
    }

    #[test]
    fn test_invalid_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        assert!(matches!(
            ForecastConfig::from_file(file.path()),
            Err(ForecastError::Configuration { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(ForecastConfig::default().with_horizon_hours(0).validate().is_err());

        let mut config = ForecastConfig::default();
        config.value_bounds = ValueBounds {
            lower: 10.0,
            upper: 5.0,
        };
        assert!(config.validate().is_err());

        let mut config = ForecastConfig::default();
        config.noise_std_dev = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_models_dir_override() {
        let config = ForecastConfig::default().with_models_dir("/tmp/artifacts");
        assert_eq!(
            config.resolve_models_dir().unwrap(),
            PathBuf::from("/tmp/artifacts")
        );
    }

    #[test]
    fn test_bounds_clamp() {
        let bounds = ValueBounds::default();
        assert_eq!(bounds.clamp(-3.0), 0.0);
        assert_eq!(bounds.clamp(612.0), 500.0);
        assert_eq!(bounds.clamp(42.0), 42.0);
    }
}
