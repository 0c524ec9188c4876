//! Squad formation layout
//!
//! Packs `n` units into a small grid anchored on the leader:
//! - 1-4 units: one row
//! - 5-10 units: two rows, the front row takes the extra unit
//! - more: `min(ceil(n/3), max_formation_width)` columns, rows filled greedily
//!
//! Short rows are centered under the full grid width. The grid is clamped to
//! the playfield (and above the bottom padding); if it is too large to fit, the
//! spacing is compressed so units overlap instead of leaving the screen.

use glam::Vec2;

use super::state::WorldBounds;
use crate::config::SimConfig;
use crate::consts::{UNIT_HEIGHT, UNIT_WIDTH};

/// Grid shape for a given squad size
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub cols: usize,
    /// Units per row, front row first
    pub row_counts: Vec<usize>,
    /// Distance between neighbouring unit origins
    pub step: Vec2,
    /// Bounding box of the whole grid
    pub size: Vec2,
}

impl Grid {
    pub fn rows(&self) -> usize {
        self.row_counts.len()
    }

    /// Plan the grid for `squad_size` units (0 is laid out as 1)
    pub fn plan(squad_size: i32, bounds: &WorldBounds, config: &SimConfig) -> Self {
        let n = squad_size.max(1) as usize;
        let max_cols = config.max_formation_width.max(1) as usize;

        let (cols, row_counts) = if n <= 4 {
            (n, vec![n])
        } else if n <= 10 {
            (n.div_ceil(2), vec![n.div_ceil(2), n / 2])
        } else {
            let cols = n.div_ceil(3).min(max_cols);
            let rows = n.div_ceil(cols);
            let mut remaining = n;
            let mut counts = Vec::with_capacity(rows);
            for _ in 0..rows {
                let count = cols.min(remaining);
                counts.push(count);
                remaining -= count;
            }
            (cols, counts)
        };
        let rows = row_counts.len();

        let avail_h = usable_height(bounds, config);
        let mut step = Vec2::new(UNIT_WIDTH + config.unit_gap, UNIT_HEIGHT + config.unit_gap);
        if cols > 1 && (cols - 1) as f32 * step.x + UNIT_WIDTH > bounds.width {
            step.x = ((bounds.width - UNIT_WIDTH) / (cols - 1) as f32).max(0.0);
        }
        if rows > 1 && (rows - 1) as f32 * step.y + UNIT_HEIGHT > avail_h {
            step.y = ((avail_h - UNIT_HEIGHT) / (rows - 1) as f32).max(0.0);
        }

        let size = Vec2::new(
            (cols - 1) as f32 * step.x + UNIT_WIDTH,
            (rows - 1) as f32 * step.y + UNIT_HEIGHT,
        );

        Self {
            cols,
            row_counts,
            step,
            size,
        }
    }
}

/// Height available to the formation (the bottom padding is dropped when the
/// playfield is too short to honor it)
fn usable_height(bounds: &WorldBounds, config: &SimConfig) -> f32 {
    let padded = bounds.height - config.bottom_padding;
    if padded >= UNIT_HEIGHT {
        padded
    } else {
        bounds.height
    }
}

/// Width of the grid for `squad_size`, used to clamp leader movement
pub fn formation_width(squad_size: i32, bounds: &WorldBounds, config: &SimConfig) -> f32 {
    Grid::plan(squad_size, bounds, config).size.x
}

/// Top-left positions for every unit, front row first, left to right
///
/// Always returns `max(1, squad_size)` positions.
pub fn layout(
    squad_size: i32,
    anchor_x: f32,
    anchor_y: f32,
    bounds: &WorldBounds,
    config: &SimConfig,
) -> Vec<Vec2> {
    let grid = Grid::plan(squad_size, bounds, config);
    let avail_h = usable_height(bounds, config);

    let anchor_x = if anchor_x.is_finite() { anchor_x } else { 0.0 };
    let anchor_y = if anchor_y.is_finite() { anchor_y } else { avail_h };

    let start_x = anchor_x.min(bounds.width - grid.size.x).max(0.0);
    let start_y = anchor_y.min(avail_h - grid.size.y).max(0.0);

    let max_x = (bounds.width - UNIT_WIDTH).max(0.0);
    let max_y = (avail_h - UNIT_HEIGHT).max(0.0);

    let mut positions = Vec::with_capacity(grid.row_counts.iter().sum());
    for (row, &count) in grid.row_counts.iter().enumerate() {
        let mut row_start = start_x;
        if count < grid.cols {
            let row_width = (count - 1) as f32 * grid.step.x + UNIT_WIDTH;
            row_start += (grid.size.x - row_width) / 2.0;
        }
        let y = start_y + row as f32 * grid.step.y;
        for col in 0..count {
            let x = row_start + col as f32 * grid.step.x;
            // Absorb float drift from compressed spacing
            positions.push(Vec2::new(x.clamp(0.0, max_x), y.clamp(0.0, max_y)));
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::Aabb;
    use proptest::prelude::*;

    fn rows_of(positions: &[Vec2]) -> Vec<usize> {
        let mut rows: Vec<(f32, usize)> = Vec::new();
        for p in positions {
            match rows.iter_mut().find(|(y, _)| (*y - p.y).abs() < 0.01) {
                Some((_, n)) => *n += 1,
                None => rows.push((p.y, 1)),
            }
        }
        rows.into_iter().map(|(_, n)| n).collect()
    }

    #[test]
    fn test_seven_units_two_rows() {
        let bounds = WorldBounds::new(360.0, 640.0);
        let positions = layout(7, 0.0, 0.0, &bounds, &SimConfig::default());
        assert_eq!(positions.len(), 7);
        assert_eq!(rows_of(&positions), vec![4, 3]);
        for p in &positions {
            let rect = Aabb::from_top_left(*p, Vec2::new(UNIT_WIDTH, UNIT_HEIGHT));
            assert!(rect.within(bounds.width, bounds.height));
        }
    }

    #[test]
    fn test_short_row_is_centered() {
        let bounds = WorldBounds::new(360.0, 640.0);
        let config = SimConfig::default();
        let positions = layout(7, 0.0, 0.0, &bounds, &config);
        let step = UNIT_WIDTH + config.unit_gap;
        // Front row spans 4 slots, back row is shifted by half a slot
        assert_eq!(positions[0].x, 0.0);
        assert!((positions[4].x - step / 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_small_squads_single_row() {
        let bounds = WorldBounds::new(360.0, 640.0);
        for n in 1..=4 {
            let positions = layout(n, 100.0, 500.0, &bounds, &SimConfig::default());
            assert_eq!(rows_of(&positions), vec![n as usize]);
        }
    }

    #[test]
    fn test_large_squad_greedy_rows() {
        let bounds = WorldBounds::new(360.0, 640.0);
        let grid = Grid::plan(11, &bounds, &SimConfig::default());
        assert_eq!(grid.cols, 4);
        assert_eq!(grid.row_counts, vec![4, 4, 3]);

        let grid = Grid::plan(100, &bounds, &SimConfig::default());
        assert_eq!(grid.cols, 8);
        assert_eq!(grid.row_counts.iter().sum::<usize>(), 100);
        assert_eq!(grid.rows(), 13);
    }

    #[test]
    fn test_zero_and_negative_lay_out_one() {
        let bounds = WorldBounds::new(360.0, 640.0);
        assert_eq!(layout(0, 10.0, 10.0, &bounds, &SimConfig::default()).len(), 1);
        assert_eq!(layout(-3, 10.0, 10.0, &bounds, &SimConfig::default()).len(), 1);
    }

    #[test]
    fn test_anchor_clamped_to_right_edge() {
        let bounds = WorldBounds::new(360.0, 640.0);
        let config = SimConfig::default();
        let positions = layout(4, 1000.0, 500.0, &bounds, &config);
        let right = positions.iter().map(|p| p.x + UNIT_WIDTH).fold(0.0, f32::max);
        assert!((right - bounds.width).abs() < 1e-3);
    }

    #[test]
    fn test_bottom_padding_respected() {
        let bounds = WorldBounds::new(360.0, 640.0);
        let config = SimConfig::default();
        let positions = layout(3, 0.0, 10_000.0, &bounds, &config);
        for p in positions {
            assert!(p.y + UNIT_HEIGHT <= bounds.height - config.bottom_padding + 1e-3);
        }
    }

    proptest! {
        #[test]
        fn prop_formation_stays_in_bounds(
            n in 0i32..=500,
            width in 100.0f32..2000.0,
            height in 100.0f32..2000.0,
            ax in -1000.0f32..3000.0,
            ay in -1000.0f32..3000.0,
        ) {
            let bounds = WorldBounds::new(width, height);
            let positions = layout(n, ax, ay, &bounds, &SimConfig::default());
            prop_assert_eq!(positions.len(), n.max(1) as usize);
            for p in positions {
                let rect = Aabb::from_top_left(p, Vec2::new(UNIT_WIDTH, UNIT_HEIGHT));
                // Allow for rounding in `width - UNIT_WIDTH + UNIT_WIDTH`
                prop_assert!(
                    rect.within(width + 1e-3, height + 1e-3),
                    "{:?} escaped {}x{}", rect, width, height
                );
            }
        }
    }
}
