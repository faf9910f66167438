#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state management for Crystal Delve.
//!
//! The [`World`] owns every piece of mutable game state. It is only ever
//! changed through [`apply`], and adapters observe it through the read-only
//! functions in [`query`].

mod turn;

use std::collections::BTreeMap;

use crystal_delve_core::{
    Command, Coord, Dungeon, EnemyId, EnemySnapshot, Event, GameStatus, Grid, Item, PlayerSnapshot,
    Species, Tile, PLAYER_MAX_HP, WELCOME_MESSAGE,
};
use crystal_delve_system_generation as generation;
use crystal_delve_system_visibility::FogOfWar;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use turn::{BLOCKED_MESSAGE, DEFEAT_MESSAGE, FULL_HEALTH_MESSAGE, HEAL_MESSAGE, REST_MESSAGE};

/// Represents the authoritative Crystal Delve game state.
#[derive(Clone, Debug)]
pub struct World {
    status: GameStatus,
    seed: Option<u64>,
    grid: Grid,
    exit: Coord,
    items: BTreeMap<Coord, Item>,
    enemies: Vec<Enemy>,
    player: Player,
    fog: FogOfWar,
    message: String,
}

impl World {
    /// Creates an empty world waiting for its first game.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: GameStatus::Loading,
            seed: None,
            grid: Grid::filled(Tile::Wall),
            exit: Coord::center(),
            items: BTreeMap::new(),
            enemies: Vec::new(),
            player: Player::spawn(Coord::center()),
            fog: FogOfWar::new(),
            message: String::new(),
        }
    }

    fn from_dungeon(dungeon: Dungeon, seed: Option<u64>) -> Self {
        let Dungeon {
            mut grid,
            start,
            exit,
            items,
            enemies,
        } = dungeon;
        grid.set(exit, Tile::Exit);

        Self {
            status: GameStatus::Playing,
            seed,
            grid,
            exit,
            items,
            enemies: enemies
                .into_iter()
                .map(|spawn| Enemy::spawn(spawn.id, spawn.species, spawn.cell))
                .collect(),
            player: Player::spawn(start),
            fog: FogOfWar::new(),
            message: WELCOME_MESSAGE.to_owned(),
        }
    }

    fn start(&mut self, dungeon: Dungeon, seed: Option<u64>, out_events: &mut Vec<Event>) {
        let start = dungeon.start;
        let exit = dungeon.exit;
        *self = Self::from_dungeon(dungeon, seed);

        log::info!(
            "entered dungeon (seed {seed:?}): start {start:?}, exit {exit:?}, {} items, {} enemies",
            self.items.len(),
            self.enemies.len()
        );

        out_events.push(Event::GameStarted { seed, start, exit });
        out_events.push(Event::StatusChanged {
            status: GameStatus::Playing,
        });
        self.refresh_visibility(out_events);
    }

    fn refresh_visibility(&mut self, out_events: &mut Vec<Event>) {
        let revealed = self.fog.recompute(&self.grid, self.player.cell);
        if !revealed.is_empty() {
            out_events.push(Event::TilesRevealed { cells: revealed });
        }
    }

    fn enemy_index(&self, id: EnemyId) -> Option<usize> {
        self.enemies.iter().position(|enemy| enemy.id == id)
    }

    fn enemy_index_at(&self, cell: Coord) -> Option<usize> {
        self.enemies.iter().position(|enemy| enemy.cell == cell)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::NewGame { seed } => {
            let seed = seed.unwrap_or_else(rand::random);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let dungeon = generation::generate(&mut rng);
            world.start(dungeon, Some(seed), out_events);
        }
        Command::LoadDungeon { dungeon } => world.start(dungeon, None, out_events),
        Command::Act { action } => world.act(action, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::collections::BTreeSet;

    use super::World;
    use crystal_delve_core::{
        Coord, EnemySnapshot, GameSnapshot, GameStatus, Item, PlayerSnapshot, Tile,
    };

    /// Lifecycle state of the current game.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Seed the current dungeon was generated from, if it was generated.
    #[must_use]
    pub fn seed(world: &World) -> Option<u64> {
        world.seed
    }

    /// Message produced by the most recent turn.
    #[must_use]
    pub fn message(world: &World) -> &str {
        &world.message
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Terrain at the given tile, or `None` outside the dungeon.
    #[must_use]
    pub fn tile_at(world: &World, cell: Coord) -> Option<Tile> {
        world.grid.tile(cell)
    }

    /// Item lying on the given tile.
    #[must_use]
    pub fn item_at(world: &World, cell: Coord) -> Option<Item> {
        world.items.get(&cell).copied()
    }

    /// Enemy standing on the given tile.
    #[must_use]
    pub fn enemy_at(world: &World, cell: Coord) -> Option<EnemySnapshot> {
        world
            .enemy_index_at(cell)
            .map(|index| world.enemies[index].snapshot())
    }

    /// Captures every living enemy in roster order.
    #[must_use]
    pub fn enemies(world: &World) -> Vec<EnemySnapshot> {
        world.enemies.iter().map(|enemy| enemy.snapshot()).collect()
    }

    /// Reports whether the tile is in view this turn.
    #[must_use]
    pub fn is_visible(world: &World, cell: Coord) -> bool {
        world.fog.is_visible(cell)
    }

    /// Reports whether the tile has been in view at any point this game.
    #[must_use]
    pub fn has_seen(world: &World, cell: Coord) -> bool {
        world.fog.has_seen(cell)
    }

    /// Tiles in view this turn.
    #[must_use]
    pub fn visible(world: &World) -> &BTreeSet<Coord> {
        world.fog.visible()
    }

    /// Tiles in view at any point this game.
    #[must_use]
    pub fn seen(world: &World) -> &BTreeSet<Coord> {
        world.fog.seen()
    }

    /// Captures an owned copy of the whole game state for presentation.
    #[must_use]
    pub fn snapshot(world: &World) -> GameSnapshot {
        GameSnapshot {
            grid: world.grid.clone(),
            items: world.items.clone(),
            enemies: enemies(world),
            player: player(world),
            exit: world.exit,
            visible: world.fog.visible().clone(),
            seen: world.fog.seen().clone(),
            status: world.status,
            message: world.message.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Player {
    cell: Coord,
    hp: i32,
    max_hp: i32,
    crystals: i32,
    score: u32,
}

impl Player {
    fn spawn(cell: Coord) -> Self {
        Self {
            cell,
            hp: PLAYER_MAX_HP,
            max_hp: PLAYER_MAX_HP,
            crystals: 0,
            score: 0,
        }
    }

    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            cell: self.cell,
            hp: self.hp,
            max_hp: self.max_hp,
            crystals: self.crystals,
            score: self.score,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Enemy {
    id: EnemyId,
    species: Species,
    hp: i32,
    damage: i32,
    cell: Coord,
}

impl Enemy {
    fn spawn(id: EnemyId, species: Species, cell: Coord) -> Self {
        Self {
            id,
            species,
            hp: species.base_hp(),
            damage: species.damage(),
            cell,
        }
    }

    fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            species: self.species,
            hp: self.hp,
            damage: self.damage,
            cell: self.cell,
        }
    }

    fn noun(&self) -> String {
        self.species.name().to_lowercase()
    }
}
