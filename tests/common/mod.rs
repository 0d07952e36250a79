//! Shared fixtures for integration tests: an exported artifact directory
//! and OpenAQ-style CSV datasets written to temp dirs.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scaler inputs as recorded by the training pipeline
pub const FEATURES: &[&str] = &[
    "latitude",
    "longitude",
    "year",
    "month",
    "day",
    "hour",
    "dayofweek",
    "sin_hour",
    "cos_hour",
    "sin_month",
    "cos_month",
    "city",
    "parameter",
];

/// Forest splits on the scaled hour column (index 5)
const FOREST: &str = r#"{
    "n_features": 13,
    "aggregation": "mean",
    "trees": [
        {"nodes": [
            {"feature": 5, "threshold": 12.0, "left": 1, "right": 2},
            {"value": 30.0},
            {"value": 60.0}
        ]},
        {"nodes": [{"value": 45.0}]}
    ]
}"#;

const BOOSTER: &str = r#"{
    "n_features": 13,
    "aggregation": "sum",
    "base_score": 40.0,
    "learning_rate": 0.5,
    "trees": [{"nodes": [{"value": 10.0}]}]
}"#;

fn network() -> String {
    let weights: Vec<String> = (0..FEATURES.len()).map(|_| "[0.0, 0.0]".to_string()).collect();
    format!(
        r#"{{"layers": [
            {{"weights": [{}], "bias": [1.0, 2.0], "activation": "relu"}},
            {{"weights": [[10.0], [10.0]], "bias": [15.0], "activation": "linear"}}
        ]}}"#,
        weights.join(", ")
    )
}

fn scaler() -> String {
    let names: Vec<String> = FEATURES.iter().map(|name| format!("\"{}\"", name)).collect();
    let zeros = vec!["0.0"; FEATURES.len()].join(", ");
    let ones = vec!["1.0"; FEATURES.len()].join(", ");
    format!(
        r#"{{"mean": [{}], "scale": [{}], "feature_names_in": [{}]}}"#,
        zeros,
        ones,
        names.join(", ")
    )
}

const ENCODER: &str = r#"{"classes": ["Jakarta", "Medan", "pm25"]}"#;

/// Write a complete artifact directory under `root`
pub fn write_models(root: &Path) -> PathBuf {
    let dir = root.join("models");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("model_rf.json"), FOREST).unwrap();
    fs::write(dir.join("model_xgb_best.json"), BOOSTER).unwrap();
    fs::write(dir.join("model_nn.json"), network()).unwrap();
    fs::write(dir.join("scaler.json"), scaler()).unwrap();
    fs::write(dir.join("encoder.json"), ENCODER).unwrap();
    dir
}

pub const HEADER: &str =
    "location_id,location_name,parameter,value,unit,datetimeLocal,latitude,longitude,city";

/// Hourly PM2.5 rows for one Medan station, plus some PM10 noise
pub fn openaq_csv() -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for hour in 0..12 {
        csv.push_str(&format!(
            "101,Medan Station,pm25,{}.0,µg/m³,2024-03-01T{:02}:00:00+07:00,3.59,98.67,Medan\n",
            20 + hour,
            hour
        ));
        csv.push_str(&format!(
            "101,Medan Station,pm10,{}.0,µg/m³,2024-03-01T{:02}:00:00+07:00,3.59,98.67,Medan\n",
            80 + hour,
            hour
        ));
    }
    csv
}

/// Write `contents` as `name` in `dir`
pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Temp workspace holding a models directory and one dataset
pub struct Workspace {
    pub dir: TempDir,
    pub models_dir: PathBuf,
    pub csv_path: PathBuf,
}

impl Workspace {
    pub fn new(csv: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let models_dir = write_models(dir.path());
        let csv_path = write_csv(dir.path(), "medan_openaq.csv", csv);
        Self {
            dir,
            models_dir,
            csv_path,
        }
    }
}
