//! Projected star records.

use thiserror::Error;

/// A star record that breaks the coordinate source contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StarError {
    #[error("star {index}: magnitude {magnitude} is not finite")]
    NonFiniteMagnitude { index: usize, magnitude: f64 },
    #[error("star {index}: position is half defined (x={x}, y={y})")]
    HalfPosition { index: usize, x: f64, y: f64 },
    #[error("star {index}: coordinate is infinite (x={x}, y={y})")]
    InfiniteCoordinate { index: usize, x: f64, y: f64 },
}

/// One catalog star after projection.
///
/// `x` and `y` are normalized chart coordinates in `[-1, 1]`, or both NaN
/// when the star lies outside the projection's valid range. Lower
/// magnitudes are brighter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// Position in the source catalog; fixes the placement order
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub magnitude: f64,
}

impl Star {
    /// Build a star, rejecting records no projection could have produced.
    ///
    /// A star with both coordinates NaN is valid (unobservable). A finite
    /// magnitude paired with only one NaN coordinate, an infinite
    /// coordinate, or a non-finite magnitude is a malformed record.
    pub fn new(index: usize, x: f64, y: f64, magnitude: f64) -> Result<Self, StarError> {
        if !magnitude.is_finite() {
            return Err(StarError::NonFiniteMagnitude { index, magnitude });
        }
        if x.is_nan() != y.is_nan() {
            return Err(StarError::HalfPosition { index, x, y });
        }
        if x.is_infinite() || y.is_infinite() {
            return Err(StarError::InfiniteCoordinate { index, x, y });
        }
        Ok(Self {
            index,
            x,
            y,
            magnitude,
        })
    }

    /// True when the star has a projected position.
    pub fn is_observable(&self) -> bool {
        !self.x.is_nan() && !self.y.is_nan()
    }
}
