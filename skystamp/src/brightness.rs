//! Magnitude to marker size scaling and the limiting-magnitude filter.

use crate::config::ChartConfig;
use crate::star::Star;

/// Magnitudes per decade of flux, with the sign that makes brighter stars
/// (smaller magnitudes) larger.
pub const MAGNITUDE_SCALE: f64 = -2.5;

/// Marker size for a star: `max_size * 10^(magnitude / -2.5)`.
///
/// A magnitude-0 star gets exactly `max_size`; each 2.5 magnitudes fainter
/// divides the size by ten.
pub fn marker_size(magnitude: f64, max_size: f64) -> f64 {
    max_size * 10f64.powf(magnitude / MAGNITUDE_SCALE)
}

/// Inclusive limiting magnitude test.
pub fn is_visible(magnitude: f64, limiting_magnitude: f64) -> bool {
    magnitude <= limiting_magnitude
}

/// Stars at or brighter than the limit, in their original order.
pub fn visible_stars(stars: &[Star], limiting_magnitude: f64) -> Vec<Star> {
    stars
        .iter()
        .filter(|star| is_visible(star.magnitude, limiting_magnitude))
        .copied()
        .collect()
}

/// One scatter mark in normalized chart coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    /// Marker area in points²
    pub size: f64,
}

/// Markers for every visible star that has a projected position.
pub fn scale_markers(stars: &[Star], config: &ChartConfig) -> Vec<Marker> {
    stars
        .iter()
        .filter(|star| star.is_observable())
        .filter(|star| is_visible(star.magnitude, config.limiting_magnitude))
        .map(|star| Marker {
            x: star.x,
            y: star.y,
            size: marker_size(star.magnitude, config.max_marker_size),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_magnitude_zero_is_max_size() {
        assert_relative_eq!(marker_size(0.0, 100.0), 100.0);
    }

    #[test]
    fn test_five_magnitudes_is_factor_hundred() {
        assert_relative_eq!(marker_size(5.0, 100.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(marker_size(-2.5, 100.0), 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_marker_size_strictly_decreasing() {
        let mags: Vec<f64> = (-20..=40).map(|m| m as f64 * 0.25).collect();
        for pair in mags.windows(2) {
            assert!(marker_size(pair[0], 100.0) > marker_size(pair[1], 100.0));
        }
    }

    #[test]
    fn test_filter_is_inclusive() {
        assert!(is_visible(4.9, 5.0));
        assert!(is_visible(5.0, 5.0));
        assert!(!is_visible(5.1, 5.0));
    }

    #[test]
    fn test_visible_stars_preserves_order() {
        let stars = vec![
            Star::new(0, 0.0, 0.0, 6.0).unwrap(),
            Star::new(1, 0.1, 0.1, 2.0).unwrap(),
            Star::new(2, 0.2, 0.2, 5.0).unwrap(),
            Star::new(3, f64::NAN, f64::NAN, 1.0).unwrap(),
        ];
        let visible = visible_stars(&stars, 5.0);
        let indices: Vec<usize> = visible.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_scale_markers_drops_unobservable_and_faint() {
        let config = ChartConfig {
            limiting_magnitude: 5.0,
            max_marker_size: 100.0,
            ..Default::default()
        };
        let stars = vec![
            Star::new(0, 0.5, -0.5, 0.0).unwrap(),
            Star::new(1, f64::NAN, f64::NAN, 1.0).unwrap(),
            Star::new(2, 0.1, 0.1, 7.0).unwrap(),
        ];
        let markers = scale_markers(&stars, &config);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].x, 0.5);
        assert_relative_eq!(markers[0].size, 100.0);
    }
}
