//! PM2.5 Forecast Library
//!
//! A Rust library for producing a 24-hour-ahead PM2.5 forecast from a
//! historical air-quality CSV and a set of pre-trained artifacts.
//!
//! This library provides tools for:
//! - Loading and cleaning OpenAQ-style CSV exports with Polars
//! - Deriving calendar and cyclical time features
//! - Loading exported tree-ensemble, neural and preprocessing artifacts
//! - Generating the forecast series (analytic or estimator ensemble)
//! - Classifying air quality and summarising the forecast trend

pub mod analysis;
pub mod artifacts;
pub mod cli;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod features;
pub mod forecast;
pub mod logging;
pub mod models;
pub mod pipeline;

// Re-export commonly used types
pub use config::{ForecastConfig, ForecastMode};
pub use error::{ForecastError, Result};
pub use models::{ForecastOutput, ForecastRequest, ForecastResult};
