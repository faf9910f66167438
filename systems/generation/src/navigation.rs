//! Breadth-first distance field used to place the dungeon exit.

use std::collections::VecDeque;

use crystal_delve_core::{Coord, Direction, Grid, HEIGHT, WIDTH};

/// Dense hop-distance grid seeded from a single origin.
///
/// Distances default to `u16::MAX` for unreachable tiles so callers can
/// distinguish walls and sealed pockets from traversable ground. Walls are
/// never expanded.
#[derive(Clone, Debug, Default)]
pub struct DistanceField {
    distances: Vec<u16>,
}

impl DistanceField {
    /// Builds the field by flooding walkable tiles outward from `origin`.
    #[must_use]
    pub fn from_origin(grid: &Grid, origin: Coord) -> Self {
        let mut field = Self::default();
        field.rebuild_from(grid, origin);
        field
    }

    /// Rebuilds the distances in place using a breadth-first search.
    ///
    /// The origin is always seeded with distance zero, even when it is not
    /// walkable itself.
    pub fn rebuild_from(&mut self, grid: &Grid, origin: Coord) {
        let cell_count = (WIDTH * HEIGHT) as usize;
        if self.distances.len() != cell_count {
            self.distances = vec![u16::MAX; cell_count];
        } else {
            self.distances.fill(u16::MAX);
        }

        let Some(origin_index) = index(origin) else {
            return;
        };
        self.distances[origin_index] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(origin);

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = index(cell) else {
                continue;
            };
            let next_distance = self.distances[current_index].saturating_add(1);

            for neighbor in neighbors(cell) {
                if !grid.is_walkable(neighbor) {
                    continue;
                }

                let Some(neighbor_index) = index(neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] != u16::MAX {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }
    }

    /// Distance captured for the provided tile, if it was reached.
    #[must_use]
    pub fn distance(&self, cell: Coord) -> Option<u16> {
        index(cell)
            .and_then(|offset| self.distances.get(offset).copied())
            .filter(|distance| *distance != u16::MAX)
    }

    /// Reports whether the tile was reached by the search.
    #[must_use]
    pub fn is_reachable(&self, cell: Coord) -> bool {
        self.distance(cell).is_some()
    }

    /// Reachable tile with the greatest distance and that distance.
    ///
    /// Ties resolve to the first tile in row-major order, i.e. the smallest
    /// `(row, column)` pair. Returns `None` when the field is empty.
    #[must_use]
    pub fn farthest(&self) -> Option<(Coord, u16)> {
        let mut best: Option<(Coord, u16)> = None;
        for row in 0..HEIGHT {
            for column in 0..WIDTH {
                let cell = Coord::new(column, row);
                let Some(distance) = self.distance(cell) else {
                    continue;
                };
                let farther = match best {
                    Some((_, max)) => distance > max,
                    None => true,
                };
                if farther {
                    best = Some((cell, distance));
                }
            }
        }
        best
    }
}

fn neighbors(cell: Coord) -> impl Iterator<Item = Coord> {
    Direction::ALL
        .into_iter()
        .filter_map(move |direction| cell.step(direction))
}

fn index(cell: Coord) -> Option<usize> {
    if cell.column() >= WIDTH || cell.row() >= HEIGHT {
        return None;
    }
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(WIDTH as usize)?.checked_add(column)
}
