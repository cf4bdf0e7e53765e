//! Stamp placement engine.
//!
//! Maps normalized chart coordinates onto canvas cells and writes a stamp
//! centered on the resulting cell. A placement whose coordinates are NaN,
//! or whose box would leave the canvas, is dropped without touching a
//! single cell: there is no partial stamping, no wraparound and no
//! clipping of the stamp.
//!
//! # Axis convention
//!
//! The x coordinate selects the canvas row and y selects the column,
//! so a box spans `[x_start, x_end)` rows by `[y_start, y_end)` columns.
//!
//! # Overlap
//!
//! Stamps are not coordinated. Under [`OverlapPolicy::Overwrite`] a later
//! placement replaces every cell of an earlier one it covers, so batch
//! placement always runs in ascending catalog index order.

use log::debug;
use ndarray::s;
use rayon::prelude::*;

use crate::canvas::Canvas;
use crate::config::{ChartConfig, OverlapPolicy};
use crate::stamp::Stamp;
use crate::star::Star;

/// Map a normalized coordinate in `[-1, 1]` to a grid index in `[0, N-1]`.
///
/// Computes `round((coord + 1) / 2 * (N - 1))` with halves rounded away
/// from zero. The value is not clamped: coordinates outside `[-1, 1]` give
/// indices outside the grid, which the bounds check later rejects.
/// Returns `None` for NaN.
pub fn grid_index(coord: f64, size: usize) -> Option<i64> {
    if coord.is_nan() {
        return None;
    }
    let span = size.saturating_sub(1) as f64;
    Some(((coord + 1.0) / 2.0 * span).round() as i64)
}

/// Cell rectangle covered by one stamp, half-open on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StampBox {
    pub x_start: i64,
    pub x_end: i64,
    pub y_start: i64,
    pub y_end: i64,
}

impl StampBox {
    /// Box of side `stamp_size` around cell `(x_idx, y_idx)`.
    ///
    /// The start is `idx - S/2`, so for even `S` the extra cell falls on
    /// the low side of the center. Arithmetic saturates at the `i64` range;
    /// a saturated box never fits a canvas.
    pub fn around(x_idx: i64, y_idx: i64, stamp_size: usize) -> Self {
        let size = i64::try_from(stamp_size).unwrap_or(i64::MAX);
        let x_start = x_idx.saturating_sub(size / 2);
        let y_start = y_idx.saturating_sub(size / 2);
        Self {
            x_start,
            x_end: x_start.saturating_add(size),
            y_start,
            y_end: y_start.saturating_add(size),
        }
    }

    /// True when the whole box lies inside an `N`×`N` canvas.
    pub fn fits(&self, canvas_size: usize) -> bool {
        let n = i64::try_from(canvas_size).unwrap_or(i64::MAX);
        self.x_start >= 0
            && self.y_start >= 0
            && self.x_start <= self.x_end
            && self.y_start <= self.y_end
            && self.x_end <= n
            && self.y_end <= n
    }
}

/// Result of a single placement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// The stamp was written into this box
    Placed(StampBox),
    /// x or y was NaN
    SkippedUnobservable,
    /// The box would leave the canvas
    SkippedOutOfBounds(StampBox),
}

impl PlacementOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, PlacementOutcome::Placed(_))
    }
}

/// Work out where a stamp would go without writing anything.
pub fn locate(
    canvas_size: usize,
    x_norm: f64,
    y_norm: f64,
    stamp_size: usize,
) -> PlacementOutcome {
    let (Some(x_idx), Some(y_idx)) = (
        grid_index(x_norm, canvas_size),
        grid_index(y_norm, canvas_size),
    ) else {
        return PlacementOutcome::SkippedUnobservable;
    };

    let stamp_box = StampBox::around(x_idx, y_idx, stamp_size);
    if stamp_box.fits(canvas_size) {
        PlacementOutcome::Placed(stamp_box)
    } else {
        PlacementOutcome::SkippedOutOfBounds(stamp_box)
    }
}

/// Stamp onto the canvas at a normalized position, overwriting the box.
pub fn place(
    canvas: &mut Canvas,
    x_norm: f64,
    y_norm: f64,
    stamp: &Stamp,
) -> PlacementOutcome {
    PlacementEngine::default().place(canvas, x_norm, y_norm, stamp)
}

/// Counts from a batch placement.
///
/// `placed == 0` with observable stars present usually means the stamp is
/// larger than the canvas or every star sits too close to the edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementSummary {
    pub placed: usize,
    pub skipped_unobservable: usize,
    pub skipped_out_of_bounds: usize,
}

impl PlacementSummary {
    pub fn record(&mut self, outcome: &PlacementOutcome) {
        match outcome {
            PlacementOutcome::Placed(_) => self.placed += 1,
            PlacementOutcome::SkippedUnobservable => self.skipped_unobservable += 1,
            PlacementOutcome::SkippedOutOfBounds(_) => self.skipped_out_of_bounds += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.placed + self.skipped_unobservable + self.skipped_out_of_bounds
    }
}

/// Placement engine bound to an overlap policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementEngine {
    pub on_overlap: OverlapPolicy,
}

impl PlacementEngine {
    pub fn new(on_overlap: OverlapPolicy) -> Self {
        Self { on_overlap }
    }

    pub fn from_config(config: &ChartConfig) -> Self {
        Self::new(config.on_overlap)
    }

    fn write(&self, canvas: &mut Canvas, stamp_box: &StampBox, stamp: &Stamp) {
        let mut cells = canvas.cells_mut();
        let mut region = cells.slice_mut(s![
            stamp_box.x_start as usize..stamp_box.x_end as usize,
            stamp_box.y_start as usize..stamp_box.y_end as usize
        ]);
        match self.on_overlap {
            OverlapPolicy::Overwrite => region.assign(&stamp.cells()),
        }
    }

    /// Stamp at a normalized position. Skips are silent.
    pub fn place(
        &self,
        canvas: &mut Canvas,
        x_norm: f64,
        y_norm: f64,
        stamp: &Stamp,
    ) -> PlacementOutcome {
        let outcome = locate(canvas.size(), x_norm, y_norm, stamp.size());
        if let PlacementOutcome::Placed(stamp_box) = &outcome {
            self.write(canvas, stamp_box, stamp);
        }
        outcome
    }

    /// Stamp once at the canvas center, normalized `(0, 0)`.
    pub fn place_centered(&self, canvas: &mut Canvas, stamp: &Stamp) -> PlacementOutcome {
        self.place(canvas, 0.0, 0.0, stamp)
    }

    /// Stamp every star in ascending catalog index order.
    pub fn place_all(
        &self,
        canvas: &mut Canvas,
        stars: &[Star],
        stamp: &Stamp,
    ) -> PlacementSummary {
        self.place_all_with(canvas, stars, stamp, |_| {})
    }

    /// Like [`place_all`](Self::place_all), calling `on_step` after each star.
    pub fn place_all_with<F>(
        &self,
        canvas: &mut Canvas,
        stars: &[Star],
        stamp: &Stamp,
        mut on_step: F,
    ) -> PlacementSummary
    where
        F: FnMut(&PlacementOutcome),
    {
        let mut summary = PlacementSummary::default();
        for star in catalog_order(stars) {
            let outcome = self.place(canvas, star.x, star.y, stamp);
            summary.record(&outcome);
            on_step(&outcome);
        }
        debug!("Placement summary: {summary:?}");
        summary
    }

    /// Compute boxes in parallel, then write them sequentially in catalog
    /// order. Produces exactly the canvas [`place_all`](Self::place_all) does.
    pub fn place_all_parallel(
        &self,
        canvas: &mut Canvas,
        stars: &[Star],
        stamp: &Stamp,
    ) -> PlacementSummary {
        let canvas_size = canvas.size();
        let stamp_size = stamp.size();
        let ordered = catalog_order(stars);
        let outcomes: Vec<PlacementOutcome> = ordered
            .par_iter()
            .map(|star| locate(canvas_size, star.x, star.y, stamp_size))
            .collect();

        let mut summary = PlacementSummary::default();
        for outcome in &outcomes {
            if let PlacementOutcome::Placed(stamp_box) = outcome {
                self.write(canvas, stamp_box, stamp);
            }
            summary.record(outcome);
        }
        debug!("Parallel placement summary: {summary:?}");
        summary
    }
}

fn catalog_order(stars: &[Star]) -> Vec<&Star> {
    let mut ordered: Vec<&Star> = stars.iter().collect();
    ordered.sort_by_key(|star| star.index);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use test_helpers::checkerboard;

    /// Normalized coordinate that maps exactly onto `idx` on an `n` grid.
    fn coord_for(idx: usize, n: usize) -> f64 {
        idx as f64 * 2.0 / (n - 1) as f64 - 1.0
    }

    fn pattern3() -> Stamp {
        Stamp::from_array(array![[1, 0, 1], [0, 1, 1], [1, 1, 0]]).unwrap()
    }

    #[test]
    fn test_grid_index_boundaries() {
        assert_eq!(grid_index(-1.0, 1000), Some(0));
        assert_eq!(grid_index(1.0, 1000), Some(999));
        assert_eq!(grid_index(0.0, 1000), Some(500));
        assert_eq!(grid_index(0.0, 11), Some(5));
        assert_eq!(grid_index(f64::NAN, 10), None);
    }

    #[test]
    fn test_grid_index_not_clamped() {
        assert_eq!(grid_index(-1.5, 11), Some(-3));
        assert_eq!(grid_index(1.2, 11), Some(11));
    }

    #[test]
    fn test_huge_coordinates_are_skipped() {
        let stamp = pattern3();
        for (x, y) in [(1e300, 0.0), (-1e300, 0.0), (0.0, 1e300), (0.0, -1e300)] {
            let mut canvas = Canvas::filled(10, false).unwrap();
            let outcome = place(&mut canvas, x, y, &stamp);
            assert!(
                matches!(outcome, PlacementOutcome::SkippedOutOfBounds(_)),
                "({x}, {y}) gave {outcome:?}"
            );
            assert_eq!(canvas.count_ones(), 0);
        }
    }

    #[test]
    fn test_saturated_box_never_fits() {
        assert!(!StampBox::around(i64::MAX, 5, 3).fits(10));
        assert!(!StampBox::around(i64::MIN, 5, 3).fits(10));
        assert!(!StampBox::around(5, i64::MIN, 4).fits(usize::MAX));
    }

    #[test]
    fn test_box_even_and_odd() {
        let odd = StampBox::around(5, 5, 3);
        assert_eq!((odd.x_start, odd.x_end), (4, 7));
        let even = StampBox::around(5, 5, 4);
        assert_eq!((even.x_start, even.x_end), (3, 7));
    }

    #[test]
    fn test_successful_placement_exact_region() {
        let mut canvas = Canvas::filled(10, false).unwrap();
        let stamp = pattern3();
        let c = coord_for(5, 10);

        let outcome = place(&mut canvas, c, c, &stamp);
        assert_eq!(
            outcome,
            PlacementOutcome::Placed(StampBox {
                x_start: 4,
                x_end: 7,
                y_start: 4,
                y_end: 7
            })
        );

        let cells = canvas.as_array();
        assert_eq!(cells.slice(s![4..7, 4..7]), stamp.cells());
        let ones_outside = cells
            .indexed_iter()
            .filter(|((r, c), &v)| !((4..7).contains(r) && (4..7).contains(c)) && v != 0)
            .count();
        assert_eq!(ones_outside, 0);
    }

    #[test]
    fn test_bounds_rejection_leaves_canvas_unchanged() {
        let mut canvas = Canvas::noise_seeded(10, 0.5, Some(11)).unwrap();
        let before = canvas.clone();
        let stamp = Stamp::uniform(4, true).unwrap();

        let outcome = place(&mut canvas, -1.0, 0.0, &stamp);
        assert_eq!(
            outcome,
            PlacementOutcome::SkippedOutOfBounds(StampBox {
                x_start: -2,
                x_end: 2,
                y_start: 3,
                y_end: 7
            })
        );
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_upper_edge_rejected() {
        let mut canvas = Canvas::filled(10, false).unwrap();
        let stamp = Stamp::uniform(3, true).unwrap();
        assert!(!place(&mut canvas, 0.0, 1.0, &stamp).is_placed());
        assert_eq!(canvas.count_ones(), 0);
    }

    #[test]
    fn test_nan_never_writes() {
        let stamp = Stamp::uniform(3, true).unwrap();
        for y in [f64::NAN, -1.0, 0.0, 0.5, 1.0] {
            let mut canvas = Canvas::filled(10, false).unwrap();
            let outcome = place(&mut canvas, f64::NAN, y, &stamp);
            assert_eq!(outcome, PlacementOutcome::SkippedUnobservable);
            assert_eq!(canvas.count_ones(), 0);
        }
        let mut canvas = Canvas::filled(10, false).unwrap();
        assert!(!place(&mut canvas, 0.0, f64::NAN, &stamp).is_placed());
        assert_eq!(canvas.count_ones(), 0);
    }

    #[test]
    fn test_stamp_larger_than_canvas() {
        let mut canvas = Canvas::filled(5, false).unwrap();
        let stamp = Stamp::uniform(6, true).unwrap();
        let stars: Vec<Star> = [(-1.0, -1.0), (0.0, 0.0), (1.0, 1.0)]
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Star::new(i, x, y, 1.0).unwrap())
            .collect();

        let summary = PlacementEngine::default().place_all(&mut canvas, &stars, &stamp);
        assert_eq!(summary.placed, 0);
        assert_eq!(summary.skipped_out_of_bounds, 3);
        assert_eq!(canvas.count_ones(), 0);
    }

    #[test]
    fn test_overlap_last_write_wins() {
        let a = Stamp::uniform(3, true).unwrap();
        let b = Stamp::uniform(3, false).unwrap();
        let (ca, cb) = (coord_for(4, 10), coord_for(5, 10));

        let mut ab = Canvas::filled(10, false).unwrap();
        place(&mut ab, ca, ca, &a);
        place(&mut ab, cb, cb, &b);
        // overlap region [4,6)x[4,6) belongs to b
        assert_eq!(ab.get(4, 4), Some(0));
        assert_eq!(ab.get(5, 5), Some(0));
        assert_eq!(ab.get(3, 3), Some(1));

        let mut ba = Canvas::filled(10, false).unwrap();
        place(&mut ba, cb, cb, &b);
        place(&mut ba, ca, ca, &a);
        assert_eq!(ba.get(4, 4), Some(1));
        assert_eq!(ba.get(5, 5), Some(1));
        assert_eq!(ba.get(6, 6), Some(0));
    }

    #[test]
    fn test_place_all_uses_catalog_order() {
        let stamp = pattern3();
        let c = coord_for(5, 10);
        let first = Star::new(0, c, c, 1.0).unwrap();
        let second = Star::new(1, coord_for(6, 10), c, 1.0).unwrap();

        // Handed over out of order; index 1 must still be applied last.
        let mut batch = Canvas::filled(10, false).unwrap();
        PlacementEngine::default().place_all(&mut batch, &[second, first], &stamp);

        let mut expected = Canvas::filled(10, false).unwrap();
        place(&mut expected, first.x, first.y, &stamp);
        place(&mut expected, second.x, second.y, &stamp);
        assert_eq!(batch, expected);

        let mut reversed = Canvas::filled(10, false).unwrap();
        place(&mut reversed, second.x, second.y, &stamp);
        place(&mut reversed, first.x, first.y, &stamp);
        assert_ne!(batch, reversed);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let checker = Stamp::from_array(checkerboard(5)).unwrap();
        let stars: Vec<Star> = (0..200)
            .map(|i| {
                let t = i as f64 * 0.37;
                let x = if i % 17 == 0 { f64::NAN } else { t.sin() };
                let y = if i % 17 == 0 { f64::NAN } else { (t * 1.3).cos() };
                Star::new(i, x, y, 2.0).unwrap()
            })
            .collect();

        let engine = PlacementEngine::default();
        let mut sequential = Canvas::noise_seeded(64, 0.85, Some(5)).unwrap();
        let mut parallel = sequential.clone();
        let s1 = engine.place_all(&mut sequential, &stars, &checker);
        let s2 = engine.place_all_parallel(&mut parallel, &stars, &checker);

        assert_eq!(s1, s2);
        assert_eq!(sequential, parallel);
        assert_eq!(s1.total(), 200);
        assert!(s1.placed > 0);
        assert!(s1.skipped_unobservable > 0);
    }

    #[test]
    fn test_place_centered() {
        let mut canvas = Canvas::filled(30, false).unwrap();
        let stamp = pattern3();
        let outcome = PlacementEngine::default().place_centered(&mut canvas, &stamp);
        // round(29 / 2) = 15 (half away from zero)
        assert_eq!(
            outcome,
            PlacementOutcome::Placed(StampBox::around(15, 15, 3))
        );
        assert_eq!(canvas.as_array().slice(s![14..17, 14..17]), stamp.cells());
    }

    #[test]
    fn test_progress_callback_sees_every_star() {
        let stamp = Stamp::uniform(1, true).unwrap();
        let stars: Vec<Star> = (0..5)
            .map(|i| Star::new(i, coord_for(i, 10), 0.0, 1.0).unwrap())
            .collect();
        let mut canvas = Canvas::filled(10, false).unwrap();
        let mut steps = 0;
        let summary =
            PlacementEngine::default().place_all_with(&mut canvas, &stars, &stamp, |_| steps += 1);
        assert_eq!(steps, 5);
        assert_eq!(summary.placed, 5);
    }
}
