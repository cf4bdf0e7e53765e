//! Square binary canvas.
//!
//! The canvas is the raster that accumulates background noise and stamps.
//! Cells hold 0 or 1; the array is indexed `[row, col]`.

use std::path::Path;

use image::{GrayImage, Luma};
use log::debug;
use ndarray::{Array2, ArrayView2, ArrayViewMut2};
use rand::distr::{Bernoulli, Distribution};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("Canvas size must be greater than zero")]
    EmptyCanvas,
    #[error("Noise density {0} is outside [0, 1]")]
    InvalidDensity(f64),
    #[error("Failed to write canvas image: {0}")]
    Image(#[from] image::ImageError),
}

/// An owned `N`×`N` grid of binary cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    cells: Array2<u8>,
}

impl Canvas {
    /// A canvas with every cell set to `value`.
    pub fn filled(size: usize, value: bool) -> Result<Self, CanvasError> {
        if size == 0 {
            return Err(CanvasError::EmptyCanvas);
        }
        Ok(Self {
            cells: Array2::from_elem((size, size), u8::from(value)),
        })
    }

    /// Draw a noise canvas from the supplied generator.
    ///
    /// Every cell is drawn independently: 0 with probability `density`,
    /// 1 otherwise. Cells are filled in row-major order, so a seeded
    /// generator always yields the same canvas.
    pub fn noise<R: Rng + ?Sized>(
        size: usize,
        density: f64,
        rng: &mut R,
    ) -> Result<Self, CanvasError> {
        if size == 0 {
            return Err(CanvasError::EmptyCanvas);
        }
        if !(0.0..=1.0).contains(&density) {
            return Err(CanvasError::InvalidDensity(density));
        }
        let on = Bernoulli::new(1.0 - density).map_err(|_| CanvasError::InvalidDensity(density))?;
        let cells = Array2::from_shape_fn((size, size), |_| u8::from(on.sample(rng)));
        Ok(Self { cells })
    }

    /// Draw a noise canvas from a seed, or from OS entropy without one.
    pub fn noise_seeded(
        size: usize,
        density: f64,
        rng_seed: Option<u64>,
    ) -> Result<Self, CanvasError> {
        let rng_seed = rng_seed.unwrap_or_else(|| rand::rng().next_u64());
        debug!("Background noise seed: {rng_seed}");
        let mut rng = StdRng::seed_from_u64(rng_seed);
        Self::noise(size, density, &mut rng)
    }

    /// Side length `N`.
    pub fn size(&self) -> usize {
        self.cells.nrows()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        self.cells.get((row, col)).copied()
    }

    pub fn as_array(&self) -> ArrayView2<'_, u8> {
        self.cells.view()
    }

    pub(crate) fn cells_mut(&mut self) -> ArrayViewMut2<'_, u8> {
        self.cells.view_mut()
    }

    pub fn count_ones(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 1).count()
    }

    /// Fraction of cells that are 0.
    pub fn zero_fraction(&self) -> f64 {
        let total = self.cells.len();
        (total - self.count_ones()) as f64 / total as f64
    }

    /// Render as a grayscale image: 1 is white, 0 is black.
    ///
    /// Row `r`, column `c` of the canvas lands on pixel `(c, r)`.
    pub fn to_gray_image(&self) -> GrayImage {
        let size = self.size() as u32;
        GrayImage::from_fn(size, size, |x, y| {
            Luma([self.cells[[y as usize, x as usize]] * 255])
        })
    }

    pub fn save_png(&self, path: &Path) -> Result<(), CanvasError> {
        self.to_gray_image().save(path)?;
        Ok(())
    }
}
