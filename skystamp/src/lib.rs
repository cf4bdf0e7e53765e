//! Star charts and binary code stamping on star-field canvases.
//!
//! Two products come out of a projected star list:
//!
//! - **Sky chart**: stars drawn as white markers sized by brightness on a
//!   navy horizon disk, clipped to the unit circle ([`chart`]).
//! - **Stamp field**: a square binary canvas of background noise with a
//!   small code bitmap stamped at the grid cell of every visible star
//!   ([`canvas`], [`placement`]).
//!
//! Projecting the sky for an observer and encoding payloads into code
//! matrices are left to external collaborators, reached through the
//! [`source::CoordinateSource`] and [`stamp::PatternGenerator`] traits.
//!
//! # Example
//!
//! ```rust
//! use skystamp::{Canvas, PlacementEngine, Stamp, Star};
//!
//! let mut canvas = Canvas::noise_seeded(100, 0.85, Some(42)).unwrap();
//! let stamp = Stamp::uniform(5, true).unwrap();
//! let stars = vec![
//!     Star::new(0, 0.0, 0.0, 1.0).unwrap(),
//!     Star::new(1, f64::NAN, f64::NAN, 2.0).unwrap(),
//!     Star::new(2, -1.0, 0.5, 3.0).unwrap(),
//! ];
//!
//! let summary = PlacementEngine::default().place_all(&mut canvas, &stars, &stamp);
//! assert_eq!(summary.placed, 1);
//! assert_eq!(summary.skipped_unobservable, 1);
//! assert_eq!(summary.skipped_out_of_bounds, 1);
//! ```

pub mod brightness;
pub mod canvas;
pub mod chart;
pub mod config;
pub mod placement;
pub mod source;
pub mod stamp;
pub mod star;

pub use brightness::{is_visible, marker_size, scale_markers, visible_stars, Marker};
pub use canvas::{Canvas, CanvasError};
pub use chart::{render_chart, render_stars, save_chart, ChartError};
pub use config::{ChartConfig, ConfigError, OverlapPolicy};
pub use placement::{
    grid_index, locate, place, PlacementEngine, PlacementOutcome, PlacementSummary, StampBox,
};
pub use source::{CoordinateSource, CsvStarSource, Observer, SourceError};
pub use stamp::{ImagePattern, PatternGenerator, Stamp, StampError, UniformPattern};
pub use star::{Star, StarError};
