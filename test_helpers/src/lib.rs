//! Shared test infrastructure for the skystamp workspace.
//!
//! - **Workspace paths**: locate the workspace root and a `test_output/`
//!   directory for artifacts worth inspecting by eye.
//! - **Reproducible randomness**: seeded generators so statistical tests
//!   give the same answer on every run.
//! - **Deterministic patterns**: small binary matrices with known content
//!   to stand in for generated code bitmaps.
//!
//! # Usage
//! ```rust
//! use test_helpers::{checkerboard, seeded_rng};
//! use rand::Rng;
//!
//! let mut rng = seeded_rng(42);
//! let _value: f64 = rng.random();
//!
//! let pattern = checkerboard(3);
//! assert_eq!(pattern[[0, 0]], 1);
//! assert_eq!(pattern[[0, 1]], 0);
//! ```

use ndarray::Array2;
use once_cell::sync::Lazy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::env;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum TestHelperError {
    #[error("Failed to find project root: {0}")]
    ProjectRootNotFound(String),
}

/// Walk up from the current directory to the Cargo.toml holding `[workspace]`.
pub fn find_project_root() -> Result<PathBuf, TestHelperError> {
    let mut current_dir = env::current_dir().map_err(|e| {
        TestHelperError::ProjectRootNotFound(format!("Failed to get current directory: {e}"))
    })?;

    loop {
        let cargo_toml = current_dir.join("Cargo.toml");
        if cargo_toml.exists() {
            let content = std::fs::read_to_string(&cargo_toml).map_err(|e| {
                TestHelperError::ProjectRootNotFound(format!("Failed to read Cargo.toml: {e}"))
            })?;

            if content.contains("[workspace]") {
                return Ok(current_dir);
            }
        }

        if !current_dir.pop() {
            break;
        }
    }

    Err(TestHelperError::ProjectRootNotFound(
        "Workspace root not found".to_string(),
    ))
}

static PROJECT_ROOT: Lazy<PathBuf> =
    Lazy::new(|| find_project_root().expect("Failed to find project root directory"));

/// `<workspace>/test_output`, created on first use.
pub fn get_output_dir() -> PathBuf {
    let output_dir = PROJECT_ROOT.join("test_output");

    if !output_dir.exists() {
        std::fs::create_dir_all(&output_dir).expect("Failed to create output directory");
    }

    output_dir
}

/// Path inside the test output directory.
pub fn output_path<P: AsRef<Path>>(path: P) -> PathBuf {
    get_output_dir().join(path)
}

/// ChaCha generator with a fixed seed.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// `size`×`size` checkerboard with a 1 in the top-left corner.
pub fn checkerboard(size: usize) -> Array2<u8> {
    Array2::from_shape_fn((size, size), |(r, c)| u8::from((r + c) % 2 == 0))
}

/// Matrix whose cell `(r, c)` is 1 only on the main diagonal, so any
/// transposition or shift of a placed copy is detectable.
pub fn diagonal(size: usize) -> Array2<u8> {
    Array2::from_shape_fn((size, size), |(r, c)| u8::from(r == c))
}

/// Normalized coordinate in `[-1, 1]` that lands exactly on `index` of an
/// `n`-cell grid.
pub fn coord_for_index(index: usize, n: usize) -> f64 {
    assert!(n > 1, "grid needs at least two cells");
    index as f64 * 2.0 / (n - 1) as f64 - 1.0
}
