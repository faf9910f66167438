#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic dungeon generator driven by an explicit random source.
//!
//! A dungeon is built in five passes: a clamped random walk carves floor out
//! of solid rock, a start tile is drawn from the carved floor, the exit is
//! stamped on the tile farthest from the start by breadth-first distance, and
//! finally crystals, hearts and enemies are scattered over the remaining
//! floor without ever sharing a tile.

mod navigation;

use std::collections::{BTreeMap, BTreeSet};

use crystal_delve_core::{
    Coord, Direction, Dungeon, EnemyId, EnemySpawn, Grid, Item, Species, Tile, HEIGHT,
    MAX_CRYSTALS, MAX_ENEMIES, MAX_HEARTS, WIDTH,
};
use rand::Rng;

pub use navigation::DistanceField;

/// Number of random-walk steps taken while carving.
pub const CARVE_STEPS: usize = (WIDTH * HEIGHT * 5) as usize;

/// Generates a complete dungeon from the provided random source.
///
/// Generation never fails. When the floor pool runs dry fewer items and
/// enemies are placed than were rolled.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Dungeon {
    let grid = carve(rng);
    let start = select_start(rng, &grid);
    furnish(rng, grid, start)
}

/// Carves floor out of a solid grid using a clamped random walk from the centre.
///
/// The cursor is pinned to `[1, WIDTH - 2] x [1, HEIGHT - 2]`, so the border
/// is never carved. Every carved tile is orthogonally adjacent to the tile
/// carved before it, so the floor always forms one connected region.
pub fn carve<R: Rng + ?Sized>(rng: &mut R) -> Grid {
    let mut grid = Grid::filled(Tile::Wall);
    let mut cursor = Coord::center();

    for _ in 0..CARVE_STEPS {
        grid.set(cursor, Tile::Floor);
        let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        let (dx, dy) = direction.delta();
        cursor = Coord::new(
            clamp_axis(cursor.column(), dx, WIDTH),
            clamp_axis(cursor.row(), dy, HEIGHT),
        );
    }

    grid
}

fn clamp_axis(value: u32, delta: i32, extent: u32) -> u32 {
    let moved = i64::from(value) + i64::from(delta);
    let clamped = moved.clamp(1, i64::from(extent) - 2);
    u32::try_from(clamped).unwrap_or(1)
}

/// Draws the player's start uniformly from the floor tiles.
///
/// Falls back to the exact grid centre when the grid holds no floor.
pub fn select_start<R: Rng + ?Sized>(rng: &mut R, grid: &Grid) -> Coord {
    let floors = grid.floor_cells();
    if floors.is_empty() {
        return Coord::center();
    }
    floors[rng.gen_range(0..floors.len())]
}

/// Stamps the exit on the tile farthest from `start` and returns its location.
///
/// See [`DistanceField::farthest`] for the tie-break. When nothing beyond the
/// start is reachable the exit lands on the start itself.
pub fn place_exit(grid: &mut Grid, start: Coord) -> Coord {
    let field = DistanceField::from_origin(grid, start);
    let exit = field.farthest().map_or(start, |(cell, _)| cell);
    grid.set(exit, Tile::Exit);
    exit
}

/// Places the exit, items and enemies on a carved grid.
pub fn furnish<R: Rng + ?Sized>(rng: &mut R, mut grid: Grid, start: Coord) -> Dungeon {
    let exit = place_exit(&mut grid, start);

    let mut occupied = BTreeSet::from([start, exit]);
    let items = place_items(rng, &grid, &occupied);
    occupied.extend(items.keys().copied());
    let enemies = place_enemies(rng, &grid, &occupied);

    log::debug!(
        "furnished dungeon: start {start:?}, exit {exit:?}, {} items, {} enemies",
        items.len(),
        enemies.len()
    );

    Dungeon {
        grid,
        start,
        exit,
        items,
        enemies,
    }
}

fn open_floor(grid: &Grid, excluded: &BTreeSet<Coord>) -> Vec<Coord> {
    grid.floor_cells()
        .into_iter()
        .filter(|cell| !excluded.contains(cell))
        .collect()
}

fn take_random<R: Rng + ?Sized>(rng: &mut R, pool: &mut Vec<Coord>) -> Option<Coord> {
    if pool.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..pool.len());
    Some(pool.remove(index))
}

fn place_items<R: Rng + ?Sized>(
    rng: &mut R,
    grid: &Grid,
    excluded: &BTreeSet<Coord>,
) -> BTreeMap<Coord, Item> {
    let mut pool = open_floor(grid, excluded);
    let crystals = rng.gen_range(MAX_CRYSTALS - 2..=MAX_CRYSTALS);
    let hearts = rng.gen_range(MAX_HEARTS.saturating_sub(2).max(1)..=MAX_HEARTS);

    let mut items = BTreeMap::new();
    for _ in 0..crystals {
        let Some(cell) = take_random(rng, &mut pool) else {
            break;
        };
        let _ = items.insert(cell, Item::crystal());
    }
    for _ in 0..hearts {
        let Some(cell) = take_random(rng, &mut pool) else {
            break;
        };
        let _ = items.insert(cell, Item::heart());
    }
    items
}

fn place_enemies<R: Rng + ?Sized>(
    rng: &mut R,
    grid: &Grid,
    excluded: &BTreeSet<Coord>,
) -> Vec<EnemySpawn> {
    let mut pool = open_floor(grid, excluded);
    let count = rng.gen_range(MAX_ENEMIES - 2..=MAX_ENEMIES);

    let mut enemies = Vec::with_capacity(count);
    for index in 0..count {
        let Some(cell) = take_random(rng, &mut pool) else {
            break;
        };
        let species = Species::ROSTER[rng.gen_range(0..Species::ROSTER.len())];
        enemies.push(EnemySpawn {
            id: EnemyId::new(index as u32),
            species,
            cell,
        });
    }
    enemies
}
