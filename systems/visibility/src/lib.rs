#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Line-of-sight field of view with persistent fog-of-war memory.

use std::collections::BTreeSet;

use crystal_delve_core::{Coord, Grid, Tile, VISIBILITY_RADIUS};

/// Currently visible tiles plus every tile ever seen during one game.
///
/// `visible` is rebuilt from scratch on every recompute. `seen` only grows and
/// is discarded together with the whole fog when a new game starts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FogOfWar {
    visible: BTreeSet<Coord>,
    seen: BTreeSet<Coord>,
}

impl FogOfWar {
    /// Creates a fog where nothing has been seen yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the field of view around `origin`.
    ///
    /// Returns the tiles that were remembered for the first time, in
    /// row-major order.
    pub fn recompute(&mut self, grid: &Grid, origin: Coord) -> Vec<Coord> {
        self.visible = visible_from(grid, origin);

        let mut revealed: Vec<Coord> = self
            .visible
            .iter()
            .copied()
            .filter(|cell| self.seen.insert(*cell))
            .collect();
        revealed.sort_by_key(|cell| (cell.row(), cell.column()));
        revealed
    }

    /// Tiles in view after the most recent recompute.
    #[must_use]
    pub fn visible(&self) -> &BTreeSet<Coord> {
        &self.visible
    }

    /// Tiles that have been in view at any point.
    #[must_use]
    pub fn seen(&self) -> &BTreeSet<Coord> {
        &self.seen
    }

    /// Reports whether the tile is in view right now.
    #[must_use]
    pub fn is_visible(&self, cell: Coord) -> bool {
        self.visible.contains(&cell)
    }

    /// Reports whether the tile has ever been in view.
    #[must_use]
    pub fn has_seen(&self, cell: Coord) -> bool {
        self.seen.contains(&cell)
    }
}

/// Collects every tile within [`VISIBILITY_RADIUS`] that `origin` can see.
///
/// A tile qualifies when its Euclidean distance to the origin is at most the
/// radius and [`has_line_of_sight`] holds. Walls bounding an open area are
/// therefore included while anything behind them is not.
#[must_use]
pub fn visible_from(grid: &Grid, origin: Coord) -> BTreeSet<Coord> {
    let radius = i64::from(VISIBILITY_RADIUS);
    let origin_column = i64::from(origin.column());
    let origin_row = i64::from(origin.row());

    let mut visible = BTreeSet::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let Some(target) = coord_at(origin_column + dx, origin_row + dy) else {
                continue;
            };
            if !grid.contains(target) {
                continue;
            }
            if has_line_of_sight(grid, origin, target) {
                let _ = visible.insert(target);
            }
        }
    }
    visible
}

/// Traces a Bresenham line from `from` to `to` and reports whether it is clear.
///
/// The line is blocked by any wall it crosses before reaching `to`; the
/// target itself may be a wall. Leaving the grid blocks the line.
#[must_use]
pub fn has_line_of_sight(grid: &Grid, from: Coord, to: Coord) -> bool {
    let (mut x, mut y) = (i64::from(from.column()), i64::from(from.row()));
    let (x1, y1) = (i64::from(to.column()), i64::from(to.row()));

    let dx = (x1 - x).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let dy = -(y1 - y).abs();
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        let Some(tile) = coord_at(x, y).and_then(|cell| grid.tile(cell)) else {
            return false;
        };
        let reached = x == x1 && y == y1;
        if reached {
            return true;
        }
        if tile == Tile::Wall {
            return false;
        }

        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x += sx;
        }
        if doubled <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn coord_at(column: i64, row: i64) -> Option<Coord> {
    let column = u32::try_from(column).ok()?;
    let row = u32::try_from(row).ok()?;
    Some(Coord::new(column, row))
}
