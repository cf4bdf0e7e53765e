//! Sky chart rasterisation with circular clipping.
//!
//! The chart spans normalized coordinates `[-1, 1]` on both axes. The unit
//! disk (the horizon of the stereographic view) is filled navy, stars are
//! drawn as white point markers, and every marker is painted through a
//! unit-disk mask so nothing shows outside the horizon. Star data is never
//! modified by the clip.

use std::path::Path;

use log::debug;
use tiny_skia::{Color, FillRule, Mask, Paint, Path as SkPath, PathBuilder, Pixmap, Transform};
use thiserror::Error;

use crate::brightness::{scale_markers, Marker};
use crate::config::ChartConfig;
use crate::star::Star;

/// Horizon fill.
pub const SKY_COLOR: (u8, u8, u8) = (0, 0, 128);
pub const STAR_COLOR: (u8, u8, u8) = (255, 255, 255);

/// Point markers are drawn at half the diameter of the nominal marker square.
const POINT_MARKER_SCALE: f64 = 0.5;
const POINTS_PER_INCH: f64 = 72.0;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Cannot allocate a {0}x{0} chart")]
    Allocation(u32),
    #[error("Failed to write chart image: {0}")]
    Encode(String),
}

/// True when `(x, y)` lies inside or on the unit circle.
pub fn unit_disk_contains(x: f64, y: f64) -> bool {
    x * x + y * y <= 1.0
}

/// Normalized chart coordinate to pixel position; y points up.
pub fn to_pixel(x: f64, y: f64, side_px: u32) -> (f32, f32) {
    let side = side_px as f64;
    (
        ((x + 1.0) / 2.0 * side) as f32,
        ((1.0 - y) / 2.0 * side) as f32,
    )
}

/// Radius in pixels of a point marker with area `size` points².
pub fn marker_radius_px(size: f64, dpi: u32) -> f32 {
    let diameter_pt = size.max(0.0).sqrt() * POINT_MARKER_SCALE;
    (diameter_pt / 2.0 * dpi as f64 / POINTS_PER_INCH) as f32
}

fn horizon_path(side_px: u32) -> Option<SkPath> {
    let half = side_px as f32 / 2.0;
    PathBuilder::from_circle(half, half, half)
}

fn solid_paint((r, g, b): (u8, u8, u8)) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, 255);
    paint.anti_alias = true;
    paint
}

/// Draw the markers onto a fresh chart.
pub fn render_chart(markers: &[Marker], config: &ChartConfig) -> Result<Pixmap, ChartError> {
    let side = config.chart_pixels();
    let mut pixmap = Pixmap::new(side, side).ok_or(ChartError::Allocation(side))?;
    pixmap.fill(Color::BLACK);

    let horizon = horizon_path(side).ok_or(ChartError::Allocation(side))?;
    pixmap.fill_path(
        &horizon,
        &solid_paint(SKY_COLOR),
        FillRule::Winding,
        Transform::identity(),
        None,
    );

    let mut clip = Mask::new(side, side).ok_or(ChartError::Allocation(side))?;
    clip.fill_path(&horizon, FillRule::Winding, true, Transform::identity());

    let star_paint = solid_paint(STAR_COLOR);
    let mut drawn = 0;
    for marker in markers {
        let (cx, cy) = to_pixel(marker.x, marker.y, side);
        let radius = marker_radius_px(marker.size, config.dpi);
        // Zero-area markers have no path
        let Some(circle) = PathBuilder::from_circle(cx, cy, radius) else {
            continue;
        };
        pixmap.fill_path(
            &circle,
            &star_paint,
            FillRule::Winding,
            Transform::identity(),
            Some(&clip),
        );
        drawn += 1;
    }
    debug!("Drew {drawn} of {} markers on a {side}px chart", markers.len());

    Ok(pixmap)
}

/// Scale, filter and draw a star list.
pub fn render_stars(stars: &[Star], config: &ChartConfig) -> Result<Pixmap, ChartError> {
    render_chart(&scale_markers(stars, config), config)
}

pub fn save_chart(pixmap: &Pixmap, path: &Path) -> Result<(), ChartError> {
    pixmap
        .save_png(path)
        .map_err(|e| ChartError::Encode(e.to_string()))
}
