#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Crystal Delve engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! happened. Adapters never write to the world directly; they read
//! [`GameSnapshot`] copies captured after each completed turn.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of tile columns in every dungeon.
pub const WIDTH: u32 = 29;

/// Number of tile rows in every dungeon.
pub const HEIGHT: u32 = 19;

/// Euclidean radius of the player's field of view, measured in tiles.
pub const VISIBILITY_RADIUS: u32 = 7;

/// Upper bound of the enemy count rolled for a new dungeon.
pub const MAX_ENEMIES: usize = 7;

/// Upper bound of the crystal count rolled for a new dungeon.
pub const MAX_CRYSTALS: usize = 6;

/// Upper bound of the heart count rolled for a new dungeon.
pub const MAX_HEARTS: usize = 3;

/// Hit points the player starts with, which are also the healing cap.
pub const PLAYER_MAX_HP: i32 = 8;

/// Damage dealt by every player attack.
pub const PLAYER_ATTACK_DAMAGE: i32 = 2;

/// Crystals granted by a single crystal pickup.
pub const CRYSTAL_VALUE: i32 = 1;

/// Hit points restored by a single heart pickup, before capping.
pub const HEART_VALUE: i32 = 2;

/// Score awarded for every successful step.
pub const STEP_SCORE: u32 = 1;

/// Additional score awarded for pocketing a crystal.
pub const CRYSTAL_SCORE_BONUS: u32 = 10;

/// Score awarded for every strike landed on an enemy.
pub const STRIKE_SCORE: u32 = 5;

/// Message shown when a fresh dungeon has been entered.
pub const WELCOME_MESSAGE: &str = "Explore the dungeon!";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Discards any running game and generates a brand-new dungeon.
    NewGame {
        /// Seed for the generator. A random seed is drawn when absent.
        seed: Option<u64>,
    },
    /// Discards any running game and starts one from a prebuilt layout.
    LoadDungeon {
        /// Layout the new game is built from.
        dungeon: Dungeon,
    },
    /// Resolves one player action followed by the enemy phase.
    Act {
        /// Action chosen by the player.
        action: Action,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a fresh game has begun.
    GameStarted {
        /// Seed the dungeon was generated from, if it was generated.
        seed: Option<u64>,
        /// Tile the player starts on.
        start: Coord,
        /// Tile holding the dungeon exit.
        exit: Coord,
    },
    /// Reports that the player walked into a wall. No turn was spent.
    MoveBlocked {
        /// Tile the player attempted to enter.
        target: Coord,
    },
    /// Confirms that the player moved between two tiles.
    PlayerMoved {
        /// Tile occupied before the move.
        from: Coord,
        /// Tile occupied after the move.
        to: Coord,
    },
    /// Confirms that the player picked up an item.
    ItemCollected {
        /// Tile the item was lying on.
        cell: Coord,
        /// Kind of item collected.
        kind: ItemKind,
        /// Crystals gained or hit points restored by the pickup.
        gained: i32,
    },
    /// Reports that the player struck an enemy that survived.
    EnemyStruck {
        /// Identifier of the enemy that was hit.
        enemy: EnemyId,
        /// Hit points the enemy has left.
        remaining_hp: i32,
    },
    /// Reports that an enemy was slain and removed from the roster.
    EnemyDefeated {
        /// Identifier of the enemy that fell.
        enemy: EnemyId,
        /// Species of the enemy that fell.
        species: Species,
    },
    /// Confirms that the player spent a turn resting.
    PlayerRested,
    /// Reports that an adjacent enemy hit the player.
    PlayerHit {
        /// Identifier of the attacking enemy.
        enemy: EnemyId,
        /// Damage dealt by the attack.
        damage: i32,
        /// Player hit points after the attack. May be negative.
        remaining_hp: i32,
    },
    /// Confirms that an enemy took a chase step.
    EnemyAdvanced {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// Tile occupied before the step.
        from: Coord,
        /// Tile occupied after the step.
        to: Coord,
    },
    /// Lists tiles that became remembered for the first time.
    TilesRevealed {
        /// Newly seen tiles in row-major order.
        cells: Vec<Coord>,
    },
    /// Announces a transition of the game status.
    StatusChanged {
        /// Status that became active.
        status: GameStatus,
    },
}

/// Action chosen by the player for a single turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Step one tile in the given direction, attacking any enemy standing there.
    Move(Direction),
    /// Spend the turn resting in place.
    Wait,
}

/// Lifecycle of a single game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// No dungeon has been generated yet.
    #[default]
    Loading,
    /// Actions are accepted.
    Playing,
    /// The player reached the exit.
    Won,
    /// The player ran out of hit points.
    Lost,
}

impl GameStatus {
    /// Reports whether the status accepts no further actions for this game.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Cardinal movement directions available to every actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in the order the generator draws them from.
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Column and row offsets of a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Picks the single step that best approaches `to` from `from`.
    ///
    /// The axis with the larger absolute delta wins and ties favour the
    /// vertical axis. Returns `None` when both cells coincide.
    #[must_use]
    pub fn toward(from: Coord, to: Coord) -> Option<Self> {
        let (dx, dy) = from.delta_to(to);

        if dx.abs() > dy.abs() {
            Some(if dx > 0 { Self::East } else { Self::West })
        } else if dy != 0 {
            Some(if dy > 0 { Self::South } else { Self::North })
        } else {
            None
        }
    }
}

/// Location of a single tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    column: u32,
    row: u32,
}

impl Coord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Tile at the exact centre of the dungeon.
    #[must_use]
    pub const fn center() -> Self {
        Self::new(WIDTH / 2, HEIGHT / 2)
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: Coord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Signed column and row delta that leads from `self` to `other`.
    #[must_use]
    pub fn delta_to(self, other: Coord) -> (i32, i32) {
        let dx = i64::from(other.column) - i64::from(self.column);
        let dy = i64::from(other.row) - i64::from(self.row);
        (saturate(dx), saturate(dy))
    }

    /// Shifts the coordinate by a signed offset.
    ///
    /// Returns `None` when the result would have a negative component. Upper
    /// bounds are left to [`Grid::contains`].
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Coord> {
        let column = self.column.checked_add_signed(dx)?;
        let row = self.row.checked_add_signed(dy)?;
        Some(Self::new(column, row))
    }

    /// Neighbouring coordinate one step away in `direction`.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Coord> {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }
}

fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Terrain classification of a single tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Solid rock. Blocks movement and sight.
    #[default]
    Wall,
    /// Open ground.
    Floor,
    /// The way out. Walkable; entering it wins the game.
    Exit,
}

impl Tile {
    /// Reports whether actors may stand on the tile.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::Wall)
    }
}

/// Fixed-size row-major tile map covering the whole dungeon.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid where every tile holds `tile`.
    #[must_use]
    pub fn filled(tile: Tile) -> Self {
        let count = (WIDTH * HEIGHT) as usize;
        Self {
            tiles: vec![tile; count],
        }
    }

    /// Parses an ASCII layout using `#` for walls, `.` for floor and `>` for the exit.
    ///
    /// Layouts may be smaller than the dungeon; missing tiles are padded with
    /// walls. Leading and trailing blank lines are ignored.
    pub fn from_ascii(layout: &str) -> Result<Self, GridParseError> {
        let mut grid = Self::filled(Tile::Wall);
        let lines: Vec<&str> = layout
            .trim_matches(|c| c == '\n' || c == '\r')
            .lines()
            .collect();

        if lines.len() > HEIGHT as usize {
            return Err(GridParseError::TooManyRows { rows: lines.len() });
        }

        for (row, line) in lines.iter().enumerate() {
            let line = line.trim_end();
            let columns = line.chars().count();
            if columns > WIDTH as usize {
                return Err(GridParseError::RowTooWide { row, columns });
            }

            for (column, symbol) in line.chars().enumerate() {
                let tile = match symbol {
                    '#' => Tile::Wall,
                    '.' => Tile::Floor,
                    '>' => Tile::Exit,
                    other => {
                        return Err(GridParseError::UnknownSymbol {
                            symbol: other,
                            row,
                            column,
                        })
                    }
                };
                grid.set(Coord::new(column as u32, row as u32), tile);
            }
        }

        Ok(grid)
    }

    /// Reports whether the coordinate lies inside the dungeon.
    #[must_use]
    pub const fn contains(&self, cell: Coord) -> bool {
        cell.column() < WIDTH && cell.row() < HEIGHT
    }

    /// Tile stored at `cell`, or `None` outside the dungeon.
    #[must_use]
    pub fn tile(&self, cell: Coord) -> Option<Tile> {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Overwrites the tile at `cell`. Coordinates outside the dungeon are ignored.
    pub fn set(&mut self, cell: Coord, tile: Tile) {
        if let Some(slot) = self.index(cell).and_then(|index| self.tiles.get_mut(index)) {
            *slot = tile;
        }
    }

    /// Reports whether `cell` is inside the dungeon and not a wall.
    #[must_use]
    pub fn is_walkable(&self, cell: Coord) -> bool {
        self.tile(cell).is_some_and(Tile::is_walkable)
    }

    /// Iterates over every coordinate in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        (0..HEIGHT).flat_map(|row| (0..WIDTH).map(move |column| Coord::new(column, row)))
    }

    /// Collects every floor tile in row-major order.
    #[must_use]
    pub fn floor_cells(&self) -> Vec<Coord> {
        self.cells()
            .filter(|cell| self.tile(*cell) == Some(Tile::Floor))
            .collect()
    }

    fn index(&self, cell: Coord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            Some(row * WIDTH as usize + column)
        } else {
            None
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::filled(Tile::Wall)
    }
}

/// Reasons an ASCII layout could not be turned into a [`Grid`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridParseError {
    /// The layout has more rows than the dungeon.
    #[error("layout has {rows} rows but the dungeon only has {}", HEIGHT)]
    TooManyRows {
        /// Number of rows found in the layout.
        rows: usize,
    },
    /// A row is wider than the dungeon.
    #[error("row {row} is {columns} tiles wide but the dungeon is only {}", WIDTH)]
    RowTooWide {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the offending row.
        columns: usize,
    },
    /// A character does not name any tile.
    #[error("unknown tile symbol {symbol:?} at column {column}, row {row}")]
    UnknownSymbol {
        /// Character that could not be parsed.
        symbol: char,
        /// Row holding the character.
        row: usize,
        /// Column holding the character.
        column: usize,
    },
}

/// Kinds of collectible items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Adds to the crystal count and the score.
    Crystal,
    /// Restores hit points up to the maximum.
    Heart,
}

/// Collectible lying on a floor tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Kind of the item.
    pub kind: ItemKind,
    /// Crystals granted or hit points restored.
    pub value: i32,
}

impl Item {
    /// Standard crystal pickup.
    #[must_use]
    pub const fn crystal() -> Self {
        Self {
            kind: ItemKind::Crystal,
            value: CRYSTAL_VALUE,
        }
    }

    /// Standard heart pickup.
    #[must_use]
    pub const fn heart() -> Self {
        Self {
            kind: ItemKind::Heart,
            value: HEART_VALUE,
        }
    }
}

/// Enemy species that can inhabit a dungeon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    /// Sturdy melee brute.
    Goblin,
    /// Fragile flyer.
    Bat,
    /// Slow but resilient ooze.
    Slime,
}

impl Species {
    /// Every species the generator may pick from.
    pub const ROSTER: [Species; 3] = [Self::Goblin, Self::Bat, Self::Slime];

    /// Display name used in messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Goblin => "Goblin",
            Self::Bat => "Bat",
            Self::Slime => "Slime",
        }
    }

    /// Single-character glyph used by renderers.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Goblin => 'g',
            Self::Bat => 'b',
            Self::Slime => 's',
        }
    }

    /// Hit points a freshly spawned enemy starts with.
    #[must_use]
    pub const fn base_hp(self) -> i32 {
        match self {
            Self::Goblin => 2,
            Self::Bat => 1,
            Self::Slime => 3,
        }
    }

    /// Damage dealt to the player per hit.
    #[must_use]
    pub const fn damage(self) -> i32 {
        match self {
            Self::Goblin | Self::Bat | Self::Slime => 1,
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Placement of a single enemy inside a [`Dungeon`] blueprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnemySpawn {
    /// Identifier the enemy keeps for the whole game.
    pub id: EnemyId,
    /// Species of the enemy.
    pub species: Species,
    /// Tile the enemy starts on.
    pub cell: Coord,
}

/// Complete layout of a freshly generated dungeon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dungeon {
    /// Terrain with the exit already stamped.
    pub grid: Grid,
    /// Tile the player starts on.
    pub start: Coord,
    /// Tile holding the exit.
    pub exit: Coord,
    /// Items keyed by the tile they lie on.
    pub items: BTreeMap<Coord, Item>,
    /// Enemies in roster order.
    pub enemies: Vec<EnemySpawn>,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Species of the enemy.
    pub species: Species,
    /// Remaining hit points.
    pub hp: i32,
    /// Damage dealt per hit.
    pub damage: i32,
    /// Tile currently occupied by the enemy.
    pub cell: Coord,
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlayerSnapshot {
    /// Tile currently occupied by the player.
    pub cell: Coord,
    /// Current hit points. Damage may push this below zero.
    pub hp: i32,
    /// Healing cap.
    pub max_hp: i32,
    /// Crystals collected so far.
    pub crystals: i32,
    /// Score accumulated so far.
    pub score: u32,
}

/// Owned, read-only copy of the whole game state captured after a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSnapshot {
    /// Terrain of the dungeon.
    pub grid: Grid,
    /// Items keyed by the tile they lie on.
    pub items: BTreeMap<Coord, Item>,
    /// Living enemies in roster order.
    pub enemies: Vec<EnemySnapshot>,
    /// State of the player.
    pub player: PlayerSnapshot,
    /// Tile holding the exit.
    pub exit: Coord,
    /// Tiles visible this turn.
    pub visible: BTreeSet<Coord>,
    /// Tiles ever visible during this game.
    pub seen: BTreeSet<Coord>,
    /// Lifecycle state of the game.
    pub status: GameStatus,
    /// Message produced by the most recent turn.
    pub message: String,
}

impl GameSnapshot {
    /// Terrain at the given tile, or `None` outside the dungeon.
    #[must_use]
    pub fn tile_at(&self, cell: Coord) -> Option<Tile> {
        self.grid.tile(cell)
    }

    /// Item lying on the given tile.
    #[must_use]
    pub fn item_at(&self, cell: Coord) -> Option<Item> {
        self.items.get(&cell).copied()
    }

    /// Enemy standing on the given tile.
    #[must_use]
    pub fn enemy_at(&self, cell: Coord) -> Option<&EnemySnapshot> {
        self.enemies.iter().find(|enemy| enemy.cell == cell)
    }

    /// Reports whether the tile is in view this turn.
    #[must_use]
    pub fn is_visible(&self, cell: Coord) -> bool {
        self.visible.contains(&cell)
    }

    /// Reports whether the tile has been in view at any point this game.
    #[must_use]
    pub fn has_seen(&self, cell: Coord) -> bool {
        self.seen.contains(&cell)
    }
}
