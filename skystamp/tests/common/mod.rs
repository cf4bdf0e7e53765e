//! Deterministic stand-ins for the external collaborators.

use ndarray::Array2;
use skystamp::{
    CoordinateSource, Observer, PatternGenerator, SourceError, Stamp, StampError, Star,
};

/// Returns a fixed star list regardless of the observer.
pub struct FixedStarSource {
    pub rows: Vec<(f64, f64, f64)>,
}

impl CoordinateSource for FixedStarSource {
    fn stars(&self, _observer: &Observer) -> Result<Vec<Star>, SourceError> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, &(x, y, mag))| Star::new(i, x, y, mag).map_err(SourceError::from))
            .collect()
    }
}

/// Always hands back the same matrix, whatever the payload.
pub struct MatrixPattern {
    pub cells: Array2<u8>,
}

impl PatternGenerator for MatrixPattern {
    fn generate(&self, _payload: &str) -> Result<Stamp, StampError> {
        Stamp::from_array(self.cells.clone())
    }
}

pub fn zurich() -> Observer {
    Observer::new(47.400698, 8.512807, "2023-06-14 12:00", "Europe/Zurich").unwrap()
}
