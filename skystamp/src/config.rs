//! Run configuration for chart rendering and stamp placement.
//!
//! All tunables that the placement engine, noise initializer and chart
//! renderer read live in [`ChartConfig`]. The JSON form uses camelCase keys
//! (`canvasSize`, `noiseDensity`, `limitingMagnitude`, `maxMarkerSize`, ...)
//! and any key left out falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a [`ChartConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// What happens when two stamps cover the same canvas cells.
///
/// Only last-write-wins is supported: the stamp applied later replaces the
/// earlier one cell for cell. No collision avoidance is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    #[default]
    Overwrite,
}

/// Explicit configuration for a rendering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartConfig {
    /// Side length `N` of the square binary canvas, in cells
    pub canvas_size: usize,
    /// Probability that a background cell is 0
    pub noise_density: f64,
    /// Inclusive magnitude threshold; fainter stars are dropped
    pub limiting_magnitude: f64,
    /// Marker area (points²) of a magnitude-0 star
    pub max_marker_size: f64,
    /// Chart side length in inches
    pub chart_size: f64,
    /// Chart resolution in pixels per inch
    pub dpi: u32,
    /// Field of view handed to the projection collaborator, degrees
    pub field_of_view_deg: f64,
    pub on_overlap: OverlapPolicy,
    /// Seed for the background noise; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            canvas_size: 1000,
            noise_density: 0.85,
            limiting_magnitude: 5.0,
            max_marker_size: 100.0,
            chart_size: 10.0,
            dpi: 100,
            field_of_view_deg: 180.0,
            on_overlap: OverlapPolicy::Overwrite,
            seed: None,
        }
    }
}

impl ChartConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse a configuration from a JSON string and validate it.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: ChartConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_size == 0 {
            return Err(ConfigError::Invalid {
                field: "canvasSize",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.noise_density) {
            return Err(ConfigError::Invalid {
                field: "noiseDensity",
                reason: format!("{} is outside [0, 1]", self.noise_density),
            });
        }
        if !self.limiting_magnitude.is_finite() {
            return Err(ConfigError::Invalid {
                field: "limitingMagnitude",
                reason: "must be finite".to_string(),
            });
        }
        if !self.max_marker_size.is_finite() || self.max_marker_size < 0.0 {
            return Err(ConfigError::Invalid {
                field: "maxMarkerSize",
                reason: format!("{} is not a finite non-negative size", self.max_marker_size),
            });
        }
        if !self.chart_size.is_finite() || self.chart_size <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "chartSize",
                reason: format!("{} is not a positive size", self.chart_size),
            });
        }
        if self.dpi == 0 {
            return Err(ConfigError::Invalid {
                field: "dpi",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !self.field_of_view_deg.is_finite() || self.field_of_view_deg <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "fieldOfViewDeg",
                reason: format!("{} is not a positive angle", self.field_of_view_deg),
            });
        }
        Ok(())
    }

    /// Chart side length in pixels.
    pub fn chart_pixels(&self) -> u32 {
        (self.chart_size * self.dpi as f64).round() as u32
    }
}
