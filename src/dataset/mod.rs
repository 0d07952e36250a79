//! Dataset loading and cleaning.
//!
//! Reads the historical CSV with Polars, resolves the column roles,
//! normalises timestamps to UTC, keeps PM2.5 rows with every required
//! field present, then derives the region label and the baseline value
//! the forecast starts from.

pub mod schema;
pub mod timestamps;

pub use schema::ResolvedSchema;
pub use timestamps::parse_timestamp;

use crate::config::ValueBounds;
use crate::constants::is_pm25_alias;
use crate::error::{ForecastError, Result};
use crate::models::Observation;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Row counts through the cleaning steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningStats {
    pub rows_read: usize,
    pub dropped_invalid_time: usize,
    pub dropped_other_pollutant: usize,
    pub dropped_missing_fields: usize,
    pub rows_kept: usize,
}

/// Cleaned dataset in file row order
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    pub schema: ResolvedSchema,
    pub observations: Vec<Observation>,
    /// Region candidate columns restricted to kept rows, in priority order
    pub region_columns: Vec<(String, Vec<Option<String>>)>,
    pub stats: CleaningStats,
}

impl CleanedDataset {
    /// Last cleaned pollutant value
    pub fn last_actual(&self) -> Option<f64> {
        self.observations.last().map(|obs| obs.value)
    }
}

/// Clamped inputs the forecast is anchored on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    /// Caller-supplied reading, clamped
    pub latest_reading: f64,
    /// Mean of the recent window (or the reading), clamped
    pub base_value: f64,
}

/// Load and clean a CSV dataset
pub fn load_dataset(path: &Path) -> Result<CleanedDataset> {
    let df = read_csv(path)?;
    clean_frame(&df)
}

/// Read a CSV file into a DataFrame, all rows used for type inference
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let dataset_error = |e: PolarsError| ForecastError::Dataset {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(dataset_error)?
        .finish()
        .map_err(dataset_error)?;

    debug!(
        "Read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Apply the cleaning rules to an already-loaded frame
pub fn clean_frame(df: &DataFrame) -> Result<CleanedDataset> {
    let header: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.as_str().to_owned())
        .collect();
    let schema = ResolvedSchema::resolve(&header)?;

    let times: Vec<_> = string_column(df, &schema.time_column)?
        .into_iter()
        .map(|raw| raw.as_deref().and_then(parse_timestamp))
        .collect();
    let parameters = match &schema.parameter_column {
        Some(name) => Some(string_column(df, name)?),
        None => None,
    };
    let values = float_column(df, &schema.value_column)?;
    let latitudes = float_column(df, &schema.latitude_column)?;
    let longitudes = float_column(df, &schema.longitude_column)?;

    let mut stats = CleaningStats {
        rows_read: df.height(),
        ..CleaningStats::default()
    };
    let mut kept_rows = Vec::new();
    let mut observations = Vec::new();

    for row in 0..df.height() {
        let Some(timestamp) = times[row] else {
            stats.dropped_invalid_time += 1;
            continue;
        };

        if let Some(parameters) = &parameters {
            let is_pm25 = parameters[row].as_deref().is_some_and(is_pm25_alias);
            if !is_pm25 {
                stats.dropped_other_pollutant += 1;
                continue;
            }
        }

        let (Some(value), Some(latitude), Some(longitude)) =
            (values[row], latitudes[row], longitudes[row])
        else {
            stats.dropped_missing_fields += 1;
            continue;
        };

        kept_rows.push(row);
        observations.push(Observation {
            timestamp,
            value,
            latitude,
            longitude,
        });
    }

    stats.rows_kept = observations.len();
    info!(
        "Cleaned dataset: {} read, {} bad time, {} other pollutant, {} missing fields, {} kept",
        stats.rows_read,
        stats.dropped_invalid_time,
        stats.dropped_other_pollutant,
        stats.dropped_missing_fields,
        stats.rows_kept
    );

    if observations.is_empty() {
        return Err(ForecastError::EmptyDataset);
    }

    let mut region_columns = Vec::with_capacity(schema.region_columns.len());
    for name in &schema.region_columns {
        let labels = string_column(df, name)?;
        let kept = kept_rows.iter().map(|&row| labels[row].clone()).collect();
        region_columns.push((name.clone(), kept));
    }

    Ok(CleanedDataset {
        schema,
        observations,
        region_columns,
        stats,
    })
}

/// Pick the region label: mode of the first populated candidate column,
/// then the caller's label, then the dataset file stem.
pub fn detect_region(dataset: &CleanedDataset, region_arg: &str, csv_path: &Path) -> String {
    for (column, labels) in &dataset.region_columns {
        if let Some(mode) = most_frequent(labels) {
            debug!("Region '{}' detected from column '{}'", mode, column);
            return mode;
        }
    }

    if !region_arg.is_empty() {
        return region_arg.to_string();
    }

    csv_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Most frequent non-missing label; ties go to the smallest label
fn most_frequent(labels: &[Option<String>]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels.iter().flatten() {
        let label = label.trim();
        if !label.is_empty() {
            *counts.entry(label).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .max_by(|(a_label, a_count), (b_label, b_count)| {
            a_count.cmp(b_count).then_with(|| b_label.cmp(a_label))
        })
        .map(|(label, _)| label.to_string())
}

/// Mean of the trailing `window` values, falling back to the caller's
/// reading; both are clamped into `bounds`.
pub fn compute_baseline(
    observations: &[Observation],
    window: usize,
    latest_value: f64,
    bounds: &ValueBounds,
) -> Baseline {
    let start = observations.len().saturating_sub(window);
    let recent = &observations[start..];

    let recent_mean = if recent.is_empty() {
        None
    } else {
        let mean = recent.iter().map(|obs| obs.value).sum::<f64>() / recent.len() as f64;
        mean.is_finite().then_some(mean)
    };

    Baseline {
        latest_reading: bounds.clamp(latest_value),
        base_value: bounds.clamp(recent_mean.unwrap_or(latest_value)),
    }
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_owned))
        .collect())
}

/// Numeric view of a column; unparseable and non-finite cells become `None`
fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .map(|value| value.filter(|v| v.is_finite()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    const OPENAQ_CSV: &str = "\
location_id,location_name,parameter,value,unit,datetimeUtc,datetimeLocal,timezone,latitude,longitude,city
1,Station A,pm25,30.0,µg/m³,2024-03-01T03:00:00Z,2024-03-01T10:00:00+07:00,Asia/Jakarta,3.59,98.67,Medan
1,Station A,pm10,80.0,µg/m³,2024-03-01T04:00:00Z,2024-03-01T11:00:00+07:00,Asia/Jakarta,3.59,98.67,Medan
1,Station A,PM2.5,34.0,µg/m³,2024-03-01T05:00:00Z,2024-03-01T12:00:00+07:00,Asia/Jakarta,3.59,98.67,Medan
1,Station A,pm25,,µg/m³,2024-03-01T06:00:00Z,2024-03-01T13:00:00+07:00,Asia/Jakarta,3.59,98.67,Medan
1,Station A,pm25,38.0,µg/m³,2024-03-01T07:00:00Z,not-a-date,Asia/Jakarta,3.59,98.67,Medan
1,Station B,pm_2_5,40.0,µg/m³,2024-03-01T08:00:00Z,2024-03-01T15:00:00+07:00,Asia/Jakarta,3.60,98.70,Binjai
";

    #[test]
    fn test_cleaning_rules() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "medan.csv", OPENAQ_CSV);

        let dataset = load_dataset(&path).unwrap();

        assert_eq!(dataset.schema.time_column, "datetimeLocal");
        assert_eq!(dataset.stats.rows_read, 6);
        assert_eq!(dataset.stats.dropped_invalid_time, 1);
        assert_eq!(dataset.stats.dropped_other_pollutant, 1);
        assert_eq!(dataset.stats.dropped_missing_fields, 1);
        assert_eq!(dataset.stats.rows_kept, 3);

        let values: Vec<f64> = dataset.observations.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![30.0, 34.0, 40.0]);
        assert_eq!(dataset.last_actual(), Some(40.0));

        // Local +07:00 normalised to UTC
        assert_eq!(
            dataset.observations[0].timestamp.to_rfc3339(),
            "2024-03-01T03:00:00+00:00"
        );
    }

    #[test]
    fn test_region_from_city_mode_beats_argument() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "medan.csv", OPENAQ_CSV);
        let dataset = load_dataset(&path).unwrap();

        assert_eq!(detect_region(&dataset, "Jakarta", &path), "Medan");
    }

    #[test]
    fn test_region_falls_back_to_argument_then_file_stem() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "bandung.csv",
            "date,value,latitude,longitude\n2024-01-01 00:00,12,1,2\n",
        );
        let dataset = load_dataset(&path).unwrap();

        assert_eq!(detect_region(&dataset, "Bogor", &path), "Bogor");
        assert_eq!(detect_region(&dataset, "", &path), "bandung");
    }

    #[test]
    fn test_empty_region_column_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "x.csv",
            "date,value,latitude,longitude,city,location\n\
             2024-01-01 00:00,12,1,2,,North\n\
             2024-01-01 01:00,14,1,2,,South\n\
             2024-01-01 02:00,16,1,2,,South\n",
        );
        let dataset = load_dataset(&path).unwrap();

        assert_eq!(detect_region(&dataset, "arg", &path), "South");
    }

    #[test]
    fn test_mode_tie_breaks_to_smallest_label() {
        let labels = vec![
            Some("b".to_string()),
            Some("a".to_string()),
            None,
            Some("b".to_string()),
            Some("a".to_string()),
        ];
        assert_eq!(most_frequent(&labels), Some("a".to_string()));
        assert_eq!(most_frequent(&[None, Some("  ".to_string())]), None);
    }

    #[test]
    fn test_missing_latitude_column() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "x.csv",
            "datetimeLocal,value,longitude\n2024-01-01T00:00:00Z,12,2\n",
        );

        match load_dataset(&path) {
            Err(ForecastError::MissingColumn { column }) => assert_eq!(column, "latitude"),
            other => panic!("Expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_no_time_column() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "x.csv", "value,latitude,longitude\n1,2,3\n");

        assert!(matches!(
            load_dataset(&path),
            Err(ForecastError::TimeColumnNotFound)
        ));
    }

    #[test]
    fn test_empty_after_pm25_filter() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "x.csv",
            "datetimeLocal,parameter,value,latitude,longitude\n\
             2024-01-01T00:00:00Z,pm10,50,1,2\n\
             2024-01-01T01:00:00Z,o3,20,1,2\n",
        );

        assert!(matches!(load_dataset(&path), Err(ForecastError::EmptyDataset)));
    }

    #[test]
    fn test_non_numeric_values_are_dropped_as_missing() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "x.csv",
            "datetimeLocal,value,latitude,longitude\n\
             2024-01-01T00:00:00Z,n/a,1,2\n\
             2024-01-01T01:00:00Z,25,1,2\n",
        );

        let dataset = load_dataset(&path).unwrap();
        assert_eq!(dataset.stats.dropped_missing_fields, 1);
        assert_eq!(dataset.stats.rows_kept, 1);
        assert_eq!(dataset.last_actual(), Some(25.0));

        let only_text = write_csv(
            &dir,
            "y.csv",
            "datetimeLocal,value,latitude,longitude\n\
             2024-01-01T00:00:00Z,n/a,1,2\n\
             2024-01-01T01:00:00Z,high,1,2\n",
        );
        assert!(matches!(load_dataset(&only_text), Err(ForecastError::EmptyDataset)));
    }

    #[test]
    fn test_missing_file_is_dataset_error() {
        let dir = TempDir::new().unwrap();
        let result = load_dataset(&dir.path().join("absent.csv"));
        assert!(matches!(result, Err(ForecastError::Dataset { .. })));
    }

    fn observations(values: &[f64]) -> Vec<Observation> {
        let start = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| Observation {
                timestamp: start + chrono::Duration::hours(i as i64),
                value,
                latitude: 0.0,
                longitude: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_baseline_uses_trailing_window() {
        let bounds = ValueBounds::default();
        let obs = observations(&[1000.0, 1000.0, 10.0, 20.0, 30.0]);

        let baseline = compute_baseline(&obs, 3, 42.0, &bounds);
        assert_eq!(baseline.base_value, 20.0);
        assert_eq!(baseline.latest_reading, 42.0);

        // Short series: the whole series is the window
        let baseline = compute_baseline(&obs[2..], 10, 42.0, &bounds);
        assert_eq!(baseline.base_value, 20.0);
    }

    #[test]
    fn test_baseline_clamps_and_falls_back() {
        let bounds = ValueBounds::default();

        let baseline = compute_baseline(&[], 10, 812.0, &bounds);
        assert_eq!(baseline.base_value, 500.0);
        assert_eq!(baseline.latest_reading, 500.0);

        let baseline = compute_baseline(&observations(&[700.0]), 10, -4.0, &bounds);
        assert_eq!(baseline.base_value, 500.0);
        assert_eq!(baseline.latest_reading, 0.0);
    }
}
