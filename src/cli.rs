//! Command-line interface components.
//!
//! Three positional inputs (latest reading, region label, dataset path)
//! plus options that select the forecast mode, seed and artifact
//! directory. Positionals are taken as raw strings so that every
//! malformed invocation is reported through the failure JSON rather
//! than clap's usage output.

use crate::config::{ForecastConfig, ForecastMode};
use crate::constants::{ENV_MODE, ENV_MODELS_DIR, ENV_SEED};
use crate::error::{ForecastError, Result};
use crate::models::ForecastRequest;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

const USAGE: &str = "pm25-forecast <latest_value> <region> <csv_path>";

#[derive(Parser, Debug, Clone)]
#[command(name = "pm25-forecast")]
#[command(about = "Forecast the next 24 hours of PM2.5 from a historical air-quality CSV")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(allow_negative_numbers = true)]
pub struct Args {
    /// Most recent PM2.5 reading (µg/m³)
    #[arg(value_name = "LATEST_VALUE")]
    pub latest_value: Option<String>,

    /// Region label used when the dataset carries none
    #[arg(value_name = "REGION")]
    pub region: Option<String>,

    /// Path to the historical CSV dataset
    #[arg(value_name = "CSV_PATH")]
    pub csv_path: Option<PathBuf>,

    /// Trailing positionals after the dataset path are ignored
    #[arg(hide = true, value_name = "EXTRA")]
    pub extra: Vec<String>,

    /// Forecast mode: closed-form seasonal formula or estimator ensemble
    #[arg(long, value_enum, env = ENV_MODE)]
    pub mode: Option<ForecastMode>,

    /// Seed for the forecast noise (reproducible output)
    #[arg(long, env = ENV_SEED)]
    pub seed: Option<u64>,

    /// Directory containing the exported model artifacts
    #[arg(long = "models-dir", value_name = "DIR", env = ENV_MODELS_DIR)]
    pub models_dir: Option<PathBuf>,

    /// Path to a JSON configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Increase logging verbosity on stderr (-v: info, -vv: debug, -vvv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl Args {
    /// Validate the positional inputs into a forecast request
    pub fn request(&self) -> Result<ForecastRequest> {
        let (Some(raw_value), Some(region), Some(csv_path)) =
            (&self.latest_value, &self.region, &self.csv_path)
        else {
            return Err(ForecastError::MissingArgument {
                message: format!("expected {}", USAGE),
            });
        };

        let latest_value = parse_reading(raw_value)?;
        if !self.extra.is_empty() {
            debug!("Ignoring {} extra positional argument(s)", self.extra.len());
        }

        Ok(ForecastRequest {
            latest_value,
            region: region.clone(),
            csv_path: csv_path.clone(),
        })
    }

    /// Build the effective configuration: file, then env/CLI overrides
    pub fn config(&self) -> Result<ForecastConfig> {
        let mut config = match &self.config_file {
            Some(path) => ForecastConfig::from_file(path)?,
            None => ForecastConfig::default(),
        };

        if let Some(mode) = self.mode {
            config = config.with_mode(mode);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(dir) = &self.models_dir {
            config = config.with_models_dir(dir);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

/// One-line description of a clap usage error for the failure document
pub fn usage_error_message(error: &clap::Error) -> String {
    let rendered = error.to_string();
    let first_line = rendered.lines().next().unwrap_or_default().trim();
    let detail = first_line.strip_prefix("error:").unwrap_or(first_line).trim();

    if detail.is_empty() {
        format!("Invalid arguments: {}", error.kind())
    } else {
        format!("Invalid arguments: {}", detail)
    }
}

/// Parse the latest reading, rejecting anything that is not a finite number
fn parse_reading(raw: &str) -> Result<f64> {
    let value: f64 = raw.trim().parse().map_err(|e| {
        ForecastError::invalid_argument("latest_value", format!("'{}' is not a number ({})", raw, e))
    })?;

    if !value.is_finite() {
        return Err(ForecastError::invalid_argument(
            "latest_value",
            format!("'{}' is not a finite number", raw),
        ));
    }

    Ok(value)
}
