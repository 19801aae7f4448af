use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, TableError};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sampling: SamplingConfig,
    pub export: ExportConfig,
}

impl AppConfig {
    /// Loads a JSON configuration file. Missing fields take their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            TableError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Where polylines are sampled along their length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Number of equal segments; `N` gives `N + 1` positions.
    pub segments: Option<usize>,
    /// Explicit normalized positions. Take precedence over `segments`.
    pub positions: Option<Vec<f64>>,
}

impl SamplingConfig {
    /// Resolved list of positions. Defaults to one segment, i.e. the two
    /// endpoints.
    pub fn positions(&self) -> Result<Vec<f64>> {
        if let Some(positions) = &self.positions {
            return Ok(positions.clone());
        }

        let segments = self.segments.unwrap_or(1);
        if segments == 0 {
            return Err(TableError::InvalidSampling(
                "segments must be at least 1".to_string(),
            ));
        }
        Ok((0..=segments)
            .map(|i| i as f64 / segments as f64)
            .collect())
    }
}

/// Configuration for delimited text output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub delimiter: char,
    /// Decimal places for floating point columns.
    pub precision: usize,
    pub header: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            precision: 3,
            header: true,
        }
    }
}
