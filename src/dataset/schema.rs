//! Column resolution for input datasets.
//!
//! Maps the raw CSV header onto the columns the pipeline needs, once,
//! returning a typed [`ResolvedSchema`] instead of probing names at
//! each use site.

use crate::constants::{columns, is_time_like_column};
use crate::error::{ForecastError, Result};
use tracing::debug;

/// Columns of an input dataset, resolved by role
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    /// Source column holding timestamps
    pub time_column: String,
    /// Pollutant-type column; when absent every row is taken as PM2.5
    pub parameter_column: Option<String>,
    pub value_column: String,
    pub latitude_column: String,
    pub longitude_column: String,
    /// Region label candidates present in the file, highest priority first
    pub region_columns: Vec<String>,
}

impl ResolvedSchema {
    /// Resolve roles from the header. Fails on a missing time column first,
    /// then on the first missing required column.
    pub fn resolve(header: &[String]) -> Result<Self> {
        let has = |name: &str| header.iter().any(|column| column == name);

        let time_column = if has(columns::TIME) {
            columns::TIME.to_string()
        } else {
            header
                .iter()
                .find(|column| is_time_like_column(column))
                .cloned()
                .ok_or(ForecastError::TimeColumnNotFound)?
        };

        for required in columns::REQUIRED {
            if !has(required) {
                return Err(ForecastError::MissingColumn {
                    column: required.to_string(),
                });
            }
        }

        let parameter_column = has(columns::PARAMETER).then(|| columns::PARAMETER.to_string());

        let region_columns = columns::REGION_CANDIDATES
            .iter()
            .filter(|candidate| has(candidate))
            .map(|candidate| candidate.to_string())
            .collect();

        let schema = Self {
            time_column,
            parameter_column,
            value_column: columns::VALUE.to_string(),
            latitude_column: columns::LATITUDE.to_string(),
            longitude_column: columns::LONGITUDE.to_string(),
            region_columns,
        };

        debug!("Resolved dataset schema: {:?}", schema);
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_prefers_exact_time_column() {
        let schema = ResolvedSchema::resolve(&header(&[
            "observation_date",
            "datetimeLocal",
            "value",
            "latitude",
            "longitude",
        ]))
        .unwrap();
        assert_eq!(schema.time_column, "datetimeLocal");
    }

    #[test]
    fn test_falls_back_to_first_time_like_column() {
        let schema = ResolvedSchema::resolve(&header(&[
            "id",
            "DateUtc",
            "reading_datetime",
            "value",
            "latitude",
            "longitude",
        ]))
        .unwrap();
        assert_eq!(schema.time_column, "DateUtc");
        assert_eq!(schema.parameter_column, None);
        assert!(schema.region_columns.is_empty());
    }

    #[test]
    fn test_missing_time_column() {
        let result = ResolvedSchema::resolve(&header(&["value", "latitude", "longitude"]));
        assert!(matches!(result, Err(ForecastError::TimeColumnNotFound)));
    }

    #[test]
    fn test_missing_required_column_is_named() {
        let result = ResolvedSchema::resolve(&header(&["date", "value", "longitude"]));
        match result {
            Err(ForecastError::MissingColumn { column }) => assert_eq!(column, "latitude"),
            other => panic!("Expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_region_candidates_in_priority_order() {
        let schema = ResolvedSchema::resolve(&header(&[
            "location_name",
            "date",
            "value",
            "latitude",
            "longitude",
            "parameter",
            "city",
        ]))
        .unwrap();
        assert_eq!(schema.region_columns, vec!["city", "location_name"]);
        assert_eq!(schema.parameter_column.as_deref(), Some("parameter"));
    }
}
