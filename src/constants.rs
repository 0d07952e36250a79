//! Application constants for the PM2.5 forecaster
//!
//! This module contains the literal defaults, column names, alias sets,
//! artifact file names and output labels used throughout the pipeline.

// =============================================================================
// Forecast Defaults
// =============================================================================

/// Number of hourly points in a forecast
pub const DEFAULT_HORIZON_HOURS: usize = 24;

/// Number of trailing cleaned rows averaged into the baseline value
pub const DEFAULT_RECENT_WINDOW: usize = 10;

/// Lower clamp bound for readings and forecast values (µg/m³)
pub const VALUE_LOWER_BOUND: f64 = 0.0;

/// Upper clamp bound for readings and forecast values (µg/m³)
pub const VALUE_UPPER_BOUND: f64 = 500.0;

/// Analytic model amplitudes
pub const DEFAULT_HOUR_AMPLITUDE: f64 = 15.0;
pub const DEFAULT_WEEKDAY_AMPLITUDE: f64 = 8.0;
pub const DEFAULT_MONTH_AMPLITUDE: f64 = 5.0;

/// Standard deviation of the per-point Gaussian noise
pub const DEFAULT_NOISE_STD_DEV: f64 = 5.0;

/// Override rule: latest reading above this triggers the check
pub const DEFAULT_OVERRIDE_READING_THRESHOLD: f64 = 300.0;

/// Override rule: forecast mean below this is considered degenerate
pub const DEFAULT_OVERRIDE_MEAN_THRESHOLD: f64 = 50.0;

/// Override rule: replacement mean as a fraction of the latest reading
pub const DEFAULT_OVERRIDE_FACTOR: f64 = 0.75;

/// Dead zone (±) for the Increasing/Stable/Decreasing classification
pub const DEFAULT_TREND_DEAD_ZONE: f64 = 10.0;

/// Decimal places used for every numeric output field
pub const OUTPUT_DECIMALS: i32 = 2;

// =============================================================================
// Column Name Constants
// =============================================================================

/// Column names recognised in input datasets
pub mod columns {
    /// Preferred time column, used verbatim when present
    pub const TIME: &str = "datetimeLocal";

    /// Substrings that mark a column as time-like (matched case-insensitively)
    pub const TIME_HINTS: &[&str] = &["datetime", "date"];

    pub const PARAMETER: &str = "parameter";
    pub const VALUE: &str = "value";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";

    /// Required measurement columns, in the order they are checked
    pub const REQUIRED: &[&str] = &[VALUE, LATITUDE, LONGITUDE];

    /// Region label candidates, highest priority first
    pub const REGION_CANDIDATES: &[&str] = &["city", "location", "location_name"];

    // Engineered feature names as exposed to the scaler
    pub const CITY: &str = "city";
    pub const YEAR: &str = "year";
    pub const MONTH: &str = "month";
    pub const DAY: &str = "day";
    pub const HOUR: &str = "hour";
    pub const DAY_OF_WEEK: &str = "dayofweek";
    pub const SIN_HOUR: &str = "sin_hour";
    pub const COS_HOUR: &str = "cos_hour";
    pub const SIN_MONTH: &str = "sin_month";
    pub const COS_MONTH: &str = "cos_month";

    /// Feature order used when the scaler does not declare its inputs
    pub const FALLBACK_FEATURES: &[&str] = &[
        LATITUDE,
        LONGITUDE,
        YEAR,
        MONTH,
        DAY,
        HOUR,
        DAY_OF_WEEK,
        SIN_HOUR,
        COS_HOUR,
        SIN_MONTH,
        COS_MONTH,
    ];
}

/// Accepted spellings of the PM2.5 parameter (compared lowercased)
pub const PM25_ALIASES: &[&str] = &["pm25", "pm2.5", "pm_2_5"];

/// Pollutant marker stamped on engineered and future rows
pub const PM25_MARKER: &str = "pm25";

/// Value substituted when a categorical field cannot be encoded
pub const UNKNOWN_CATEGORY_CODE: f64 = 0.0;

// =============================================================================
// Artifact Files
// =============================================================================

/// Directory name (next to the executable) holding exported artifacts
pub const MODELS_DIR_NAME: &str = "models";

pub const RANDOM_FOREST_FILE: &str = "model_rf.json";
pub const GRADIENT_BOOSTED_FILE: &str = "model_xgb_best.json";
pub const NEURAL_NETWORK_FILE: &str = "model_nn.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const ENCODER_FILE: &str = "encoder.json";

// =============================================================================
// Output Labels
// =============================================================================

/// Air-quality category labels, aligned with `CATEGORY_UPPER_EDGES`
pub const CATEGORY_LABELS: &[&str] = &[
    "Good",
    "Moderate",
    "Unhealthy (Sensitive)",
    "Unhealthy",
    "Very Unhealthy",
];

/// Exclusive upper edge of each category except the open-ended last one
pub const CATEGORY_UPPER_EDGES: &[f64] = &[12.0, 35.0, 55.0, 150.0];

pub const TREND_INCREASING: &str = "increasing";
pub const TREND_DECREASING: &str = "decreasing";
pub const TREND_SHARP_DECREASE: &str = "sharp decrease (auto-adjusted)";

pub const DIRECTION_INCREASING: &str = "Increasing";
pub const DIRECTION_DECREASING: &str = "Decreasing";
pub const DIRECTION_STABLE: &str = "Stable";

/// Separator between min and max in the range string
pub const RANGE_SEPARATOR: &str = " – ";

// =============================================================================
// Environment
// =============================================================================

pub const ENV_SEED: &str = "PM25_FORECAST_SEED";
pub const ENV_MODE: &str = "PM25_FORECAST_MODE";
pub const ENV_MODELS_DIR: &str = "PM25_FORECAST_MODELS_DIR";

/// Log filter target for this crate
pub const LOG_TARGET: &str = "pm25_forecast";

// =============================================================================
// Helper Functions
// =============================================================================

/// Check if a parameter label names PM2.5
pub fn is_pm25_alias(label: &str) -> bool {
    let lowered = label.trim().to_lowercase();
    PM25_ALIASES.contains(&lowered.as_str())
}

/// Check if a column name looks like a date/time column
pub fn is_time_like_column(column_name: &str) -> bool {
    let lowered = column_name.to_lowercase();
    columns::TIME_HINTS.iter().any(|hint| lowered.contains(hint))
}

/// Round to the number of decimals used in the JSON output
pub fn round_output(value: f64) -> f64 {
    let factor = 10f64.powi(OUTPUT_DECIMALS);
    (value * factor).round() / factor
}
