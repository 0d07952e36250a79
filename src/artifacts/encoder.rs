//! Label encoder for categorical fields.

use super::CategoryEncoder;
use crate::error::{ForecastError, Result};
use serde::Deserialize;

/// Maps each known class to its index in `classes`
#[derive(Debug, Clone, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }
}

impl CategoryEncoder for LabelEncoder {
    fn encode(&self, label: &str) -> Result<f64> {
        self.classes
            .iter()
            .position(|class| class == label)
            .map(|index| index as f64)
            .ok_or_else(|| {
                ForecastError::artifact_shape("encoder", format!("unseen label '{}'", label))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unseen_labels() {
        let encoder: LabelEncoder =
            serde_json::from_str(r#"{"classes": ["Bandung", "Jakarta", "Medan"]}"#).unwrap();

        assert_eq!(encoder.encode("Bandung").unwrap(), 0.0);
        assert_eq!(encoder.encode("Medan").unwrap(), 2.0);
        assert!(encoder.encode("medan").is_err());
        assert!(encoder.encode("pm25").is_err());
    }
}
