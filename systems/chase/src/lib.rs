#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Greedy chase heuristic that moves enemies one tile toward the player.

use crystal_delve_core::Coord;

/// Ordered step candidates an enemy at `from` considers when chasing `target`.
///
/// The list is: a step along the axis with the larger absolute delta (the
/// vertical axis on ties, nothing when both deltas are zero), a vertical-only
/// step, a horizontal-only step, and finally staying put. Candidates are
/// expressed as `(dx, dy)` offsets and may repeat.
#[must_use]
pub fn candidate_steps(from: Coord, target: Coord) -> [(i32, i32); 4] {
    let (dx, dy) = from.delta_to(target);
    let (step_x, step_y) = (dx.signum(), dy.signum());

    let primary = if dx.abs() > dy.abs() {
        (step_x, 0)
    } else if dy != 0 {
        (0, step_y)
    } else {
        (0, 0)
    };

    [primary, (0, step_y), (step_x, 0), (0, 0)]
}

/// Picks the tile an enemy at `from` steps onto while chasing `target`.
///
/// `is_open` decides whether a destination is inside the dungeon, walkable,
/// and free of other enemies. The target tile itself is always rejected, as
/// is the enemy's own tile. Returns `None` when the enemy stays put.
#[must_use]
pub fn chase_step<F>(from: Coord, target: Coord, is_open: F) -> Option<Coord>
where
    F: Fn(Coord) -> bool,
{
    candidate_steps(from, target)
        .into_iter()
        .filter(|step| *step != (0, 0))
        .filter_map(|(dx, dy)| from.offset(dx, dy))
        .find(|cell| *cell != target && is_open(*cell))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_axis_follows_the_larger_delta() {
        let from = Coord::new(5, 5);
        assert_eq!(
            candidate_steps(from, Coord::new(9, 7)),
            [(1, 0), (0, 1), (1, 0), (0, 0)]
        );
        assert_eq!(
            candidate_steps(from, Coord::new(4, 1)),
            [(0, -1), (0, -1), (-1, 0), (0, 0)]
        );
    }

    #[test]
    fn equal_deltas_prefer_vertical_primary() {
        assert_eq!(
            candidate_steps(Coord::new(5, 5), Coord::new(7, 3)),
            [(0, -1), (0, -1), (1, 0), (0, 0)]
        );
    }

    #[test]
    fn blocked_primary_falls_back_to_other_axis() {
        let from = Coord::new(5, 5);
        let target = Coord::new(9, 7);
        let blocked = Coord::new(6, 5);

        let step = chase_step(from, target, |cell| cell != blocked);

        assert_eq!(step, Some(Coord::new(5, 6)));
    }

    #[test]
    fn aligned_enemy_stays_when_its_only_axis_is_blocked() {
        let from = Coord::new(5, 5);
        let target = Coord::new(9, 5);

        let step = chase_step(from, target, |cell| cell != Coord::new(6, 5));

        assert_eq!(step, None);
    }

    #[test]
    fn never_steps_onto_the_target() {
        let from = Coord::new(5, 5);
        let target = Coord::new(6, 5);

        assert_eq!(chase_step(from, target, |_| true), None);
    }
}
