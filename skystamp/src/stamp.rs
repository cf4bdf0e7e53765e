//! Square binary stamps and the pattern generator boundary.
//!
//! A [`Stamp`] is the fixed-size bitmap written onto the canvas at each
//! placement. Turning a payload string into a 2-D code matrix belongs to
//! an external code generator; [`PatternGenerator`] is the seam where one
//! plugs in. Two generators ship with the crate:
//!
//! - [`UniformPattern`] produces a solid square, used as the border drawn
//!   behind a centered code.
//! - [`ImagePattern`] reads a code that was already rendered to an image
//!   file, treating the payload as that file's path.

use std::path::Path;

use image::GrayImage;
use ndarray::{Array2, ArrayView2};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StampError {
    #[error("Stamp must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("Stamp must not be empty")]
    Empty,
    #[error("Stamp cell ({row}, {col}) has value {value}, expected 0 or 1")]
    NonBinary { row: usize, col: usize, value: u8 },
    #[error("Image side {side}px is not a multiple of the {module_px}px module size")]
    ModuleMismatch { side: u32, module_px: u32 },
    #[error("Failed to load code image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// An immutable square matrix of 0/1 cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    cells: Array2<u8>,
}

impl Stamp {
    /// Wrap a matrix, checking it is square, non-empty and binary.
    pub fn from_array(cells: Array2<u8>) -> Result<Self, StampError> {
        let (rows, cols) = cells.dim();
        if rows != cols {
            return Err(StampError::NotSquare { rows, cols });
        }
        if rows == 0 {
            return Err(StampError::Empty);
        }
        if let Some(((row, col), &value)) = cells.indexed_iter().find(|(_, &v)| v > 1) {
            return Err(StampError::NonBinary { row, col, value });
        }
        Ok(Self { cells })
    }

    /// A `size`×`size` stamp with every cell set to `value`.
    pub fn uniform(size: usize, value: bool) -> Result<Self, StampError> {
        if size == 0 {
            return Err(StampError::Empty);
        }
        Ok(Self {
            cells: Array2::from_elem((size, size), u8::from(value)),
        })
    }

    /// Threshold a grayscale code image into a stamp.
    ///
    /// Each `module_px`×`module_px` block becomes one cell, sampled at the
    /// block center. Pixels darker than `threshold` are dark modules and map
    /// to 1, following the usual code-matrix convention.
    pub fn from_gray_image(
        image: &GrayImage,
        module_px: u32,
        threshold: u8,
    ) -> Result<Self, StampError> {
        let (width, height) = image.dimensions();
        if width != height {
            return Err(StampError::NotSquare {
                rows: height as usize,
                cols: width as usize,
            });
        }
        if width == 0 {
            return Err(StampError::Empty);
        }
        let module_px = module_px.max(1);
        if width % module_px != 0 {
            return Err(StampError::ModuleMismatch {
                side: width,
                module_px,
            });
        }

        let side = (width / module_px) as usize;
        let offset = module_px / 2;
        let cells = Array2::from_shape_fn((side, side), |(row, col)| {
            let x = col as u32 * module_px + offset;
            let y = row as u32 * module_px + offset;
            u8::from(image.get_pixel(x, y).0[0] < threshold)
        });
        Ok(Self { cells })
    }

    /// Side length `S`.
    pub fn size(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cells(&self) -> ArrayView2<'_, u8> {
        self.cells.view()
    }
}

/// Turns an arbitrary payload into a stamp. The stamp side is chosen by
/// the generator, never by the caller.
pub trait PatternGenerator {
    fn generate(&self, payload: &str) -> Result<Stamp, StampError>;
}

/// Solid square of a fixed size; ignores the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformPattern {
    pub size: usize,
    pub value: bool,
}

impl PatternGenerator for UniformPattern {
    fn generate(&self, _payload: &str) -> Result<Stamp, StampError> {
        Stamp::uniform(self.size, self.value)
    }
}

/// Loads a pre-rendered code image; the payload is the image path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePattern {
    /// Pixels per code module along each axis
    pub module_px: u32,
    /// Luma below this is a dark module
    pub threshold: u8,
}

impl Default for ImagePattern {
    fn default() -> Self {
        Self {
            module_px: 1,
            threshold: 128,
        }
    }
}

impl PatternGenerator for ImagePattern {
    fn generate(&self, payload: &str) -> Result<Stamp, StampError> {
        let path = Path::new(payload);
        let image = image::open(path)
            .map_err(|source| StampError::Image {
                path: path.display().to_string(),
                source,
            })?
            .into_luma8();
        Stamp::from_gray_image(&image, self.module_px, self.threshold)
    }
}
