//! Coordinate source boundary.
//!
//! The stereographic projection itself (ephemeris lookup, timezone
//! handling, equatorial to horizontal transform) belongs to an external
//! astronomy library. This module only fixes the contract: an
//! [`Observer`] goes in, a list of projected [`Star`]s comes out.
//!
//! [`CsvStarSource`] reads a catalog that was already projected for the
//! observer, one `x,y,magnitude` row per star.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::debug;
use thiserror::Error;

use crate::star::{Star, StarError};

/// Civil timestamp format accepted by [`Observer::new`].
pub const OBSERVATION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to open star catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Line {line}: expected 3 fields (x, y, magnitude), found {found}")]
    FieldCount { line: u64, found: usize },
    #[error("Line {line}: cannot parse {field} value '{value}'")]
    Parse {
        line: u64,
        field: &'static str,
        value: String,
    },
    #[error("Invalid observer: {0}")]
    InvalidObserver(String),
    #[error("Malformed star record: {0}")]
    Malformed(#[from] StarError),
}

/// Where and when the sky is observed.
///
/// The timestamp is civil local time in `timezone` (an IANA name such as
/// `Europe/Zurich`); converting it to UTC is the projection's job.
#[derive(Debug, Clone, PartialEq)]
pub struct Observer {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub when: NaiveDateTime,
    pub timezone: String,
}

impl Observer {
    /// Build an observer from degrees and a `YYYY-MM-DD HH:MM` timestamp.
    pub fn new(
        latitude_deg: f64,
        longitude_deg: f64,
        when: &str,
        timezone: &str,
    ) -> Result<Self, SourceError> {
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(SourceError::InvalidObserver(format!(
                "latitude {latitude_deg} is outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude_deg) {
            return Err(SourceError::InvalidObserver(format!(
                "longitude {longitude_deg} is outside [-180, 180]"
            )));
        }
        let when = NaiveDateTime::parse_from_str(when.trim(), OBSERVATION_TIME_FORMAT)
            .map_err(|e| SourceError::InvalidObserver(format!("timestamp '{when}': {e}")))?;
        if timezone.trim().is_empty() {
            return Err(SourceError::InvalidObserver(
                "timezone name is empty".to_string(),
            ));
        }
        Ok(Self {
            latitude_deg,
            longitude_deg,
            when,
            timezone: timezone.trim().to_string(),
        })
    }
}

/// Produces projected star positions for an observer.
pub trait CoordinateSource {
    /// Return every catalog star in catalog order.
    ///
    /// Unobservable stars carry NaN coordinates. Implementations must fail
    /// on malformed records rather than drop them.
    fn stars(&self, observer: &Observer) -> Result<Vec<Star>, SourceError>;
}

/// A pre-projected catalog stored as CSV.
///
/// Rows are `x,y,magnitude`. Blank lines and lines starting with `#` are
/// ignored, and a leading `x,y,magnitude` header is skipped. Positions may
/// be written as `nan` for stars outside the projection.
#[derive(Debug, Clone)]
pub struct CsvStarSource {
    path: PathBuf,
}

impl CsvStarSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a projected catalog from any reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<Star>, SourceError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut stars = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            if row == 0 && record.get(0).is_some_and(|f| f.eq_ignore_ascii_case("x")) {
                continue;
            }
            // File line, counting skipped comment and blank lines
            let line = record.position().map_or(row as u64 + 1, |p| p.line());
            if record.len() != 3 {
                return Err(SourceError::FieldCount {
                    line,
                    found: record.len(),
                });
            }

            let field = |i: usize, name: &'static str| -> Result<f64, SourceError> {
                let value = &record[i];
                value.parse::<f64>().map_err(|_| SourceError::Parse {
                    line,
                    field: name,
                    value: value.to_string(),
                })
            };
            let x = field(0, "x")?;
            let y = field(1, "y")?;
            let magnitude = field(2, "magnitude")?;

            stars.push(Star::new(stars.len(), x, y, magnitude)?);
        }
        Ok(stars)
    }
}

impl CoordinateSource for CsvStarSource {
    fn stars(&self, observer: &Observer) -> Result<Vec<Star>, SourceError> {
        debug!(
            "Reading projected catalog {} for observer at ({:.4}, {:.4}) {} {}",
            self.path.display(),
            observer.latitude_deg,
            observer.longitude_deg,
            observer.when,
            observer.timezone
        );
        let file = File::open(&self.path).map_err(|source| SourceError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        let stars = Self::parse(file)?;
        debug!("Loaded {} stars", stars.len());
        Ok(stars)
    }
}
