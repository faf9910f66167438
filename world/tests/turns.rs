use std::collections::BTreeMap;

use crystal_delve_core::{
    Action, Command, Coord, Direction, Dungeon, EnemyId, EnemySpawn, Event, GameStatus, Grid, Item,
    Species, Tile, PLAYER_MAX_HP,
};
use crystal_delve_world::{
    self as world, query, World, BLOCKED_MESSAGE, DEFEAT_MESSAGE, FULL_HEALTH_MESSAGE,
    HEAL_MESSAGE, REST_MESSAGE,
};

const CORRIDOR: &str = "
#######
#....>#
#.#####
#######
";

const ROOM: &str = "
#####
#...#
#...#
#..>#
#####
";

fn blueprint(layout: &str, start: Coord) -> Dungeon {
    let grid = Grid::from_ascii(layout).expect("layout parses");
    let exit = grid
        .cells()
        .find(|cell| grid.tile(*cell) == Some(Tile::Exit))
        .expect("layout has an exit");
    Dungeon {
        grid,
        start,
        exit,
        items: BTreeMap::new(),
        enemies: Vec::new(),
    }
}

fn with_enemies(mut dungeon: Dungeon, enemies: &[(Species, Coord)]) -> Dungeon {
    dungeon.enemies = enemies
        .iter()
        .enumerate()
        .map(|(index, (species, cell))| EnemySpawn {
            id: EnemyId::new(index as u32),
            species: *species,
            cell: *cell,
        })
        .collect();
    dungeon
}

fn with_items(mut dungeon: Dungeon, items: &[(Coord, Item)]) -> Dungeon {
    dungeon.items = items.iter().copied().collect();
    dungeon
}

fn load(dungeon: Dungeon) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::LoadDungeon { dungeon }, &mut events);
    world
}

fn act(world: &mut World, action: Action) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Act { action }, &mut events);
    events
}

fn step(world: &mut World, direction: Direction) -> Vec<Event> {
    act(world, Action::Move(direction))
}

#[test]
fn walking_into_a_wall_costs_no_turn() {
    let dungeon = with_enemies(
        blueprint(CORRIDOR, Coord::new(2, 1)),
        &[(Species::Goblin, Coord::new(4, 1))],
    );
    let mut world = load(dungeon);
    let before = query::snapshot(&world);

    let events = step(&mut world, Direction::North);

    assert_eq!(
        events,
        vec![Event::MoveBlocked {
            target: Coord::new(2, 0)
        }]
    );
    let after = query::snapshot(&world);
    assert_eq!(after.player, before.player);
    assert_eq!(after.enemies, before.enemies, "enemies must not act");
    assert_eq!(query::message(&world), BLOCKED_MESSAGE);
}

#[test]
fn moving_off_the_map_is_a_silent_no_op() {
    let mut grid = Grid::filled(Tile::Wall);
    grid.set(Coord::new(0, 1), Tile::Floor);
    grid.set(Coord::new(1, 1), Tile::Exit);
    let dungeon = Dungeon {
        grid,
        start: Coord::new(0, 1),
        exit: Coord::new(1, 1),
        items: BTreeMap::new(),
        enemies: Vec::new(),
    };
    let mut world = load(dungeon);
    let before = query::snapshot(&world);

    let events = step(&mut world, Direction::West);

    assert!(events.is_empty());
    assert_eq!(query::snapshot(&world), before);
}

#[test]
fn generated_dungeon_with_wall_to_the_east_blocks_the_move() {
    let mut world = World::new();
    let seed = (0..10_000u64)
        .find(|seed| {
            let mut events = Vec::new();
            let command = Command::NewGame { seed: Some(*seed) };
            world::apply(&mut world, command, &mut events);
            let start = query::player(&world).cell;
            let east = start.step(Direction::East).expect("east neighbour exists");
            query::tile_at(&world, east) == Some(Tile::Wall)
        })
        .expect("some seed starts next to an eastern wall");

    assert_eq!(query::seed(&world), Some(seed));
    let before = query::snapshot(&world);

    let _ = step(&mut world, Direction::East);

    let after = query::snapshot(&world);
    assert_eq!(after.player.cell, before.player.cell);
    assert_eq!(after.player.crystals, before.player.crystals);
    assert_eq!(after.player.score, before.player.score);
    assert_eq!(after.enemies, before.enemies);
    assert_eq!(after.message, BLOCKED_MESSAGE);
}

#[test]
fn stepping_onto_floor_scores_and_clears_the_message() {
    let mut world = load(blueprint(CORRIDOR, Coord::new(1, 1)));

    let events = step(&mut world, Direction::East);

    assert_eq!(
        events.first(),
        Some(&Event::PlayerMoved {
            from: Coord::new(1, 1),
            to: Coord::new(2, 1),
        })
    );
    assert_eq!(query::player(&world).score, 1);
    assert_eq!(query::message(&world), "");
    assert!(query::is_visible(&world, Coord::new(2, 1)));
}

#[test]
fn crystals_add_to_count_and_score() {
    let dungeon = with_items(
        blueprint(CORRIDOR, Coord::new(1, 1)),
        &[(Coord::new(2, 1), Item::crystal())],
    );
    let mut world = load(dungeon);

    let events = step(&mut world, Direction::East);

    let player = query::player(&world);
    assert_eq!(player.crystals, 1);
    assert_eq!(player.score, 11);
    assert_eq!(query::message(&world), "You pocket a shimmering crystal!");
    assert_eq!(query::item_at(&world, Coord::new(2, 1)), None);
    assert!(events.contains(&Event::ItemCollected {
        cell: Coord::new(2, 1),
        kind: crystal_delve_core::ItemKind::Crystal,
        gained: 1,
    }));
}

#[test]
fn heart_at_full_health_is_consumed_without_healing() {
    let dungeon = with_items(
        blueprint(CORRIDOR, Coord::new(1, 1)),
        &[(Coord::new(2, 1), Item::heart())],
    );
    let mut world = load(dungeon);

    let _ = step(&mut world, Direction::East);

    assert_eq!(query::player(&world).hp, PLAYER_MAX_HP);
    assert_eq!(query::message(&world), FULL_HEALTH_MESSAGE);
    assert_eq!(query::item_at(&world, Coord::new(2, 1)), None);
}

#[test]
fn heart_one_below_maximum_heals_exactly_to_the_cap() {
    let dungeon = with_enemies(
        with_items(
            blueprint(CORRIDOR, Coord::new(1, 1)),
            &[(Coord::new(2, 1), Item::heart())],
        ),
        &[(Species::Goblin, Coord::new(1, 2))],
    );
    let mut world = load(dungeon);

    let _ = act(&mut world, Action::Wait);
    assert_eq!(query::player(&world).hp, PLAYER_MAX_HP - 1);
    assert_eq!(query::message(&world), "The goblin hits you!");

    let _ = step(&mut world, Direction::East);

    assert_eq!(query::player(&world).hp, PLAYER_MAX_HP);
    assert_eq!(query::message(&world), HEAL_MESSAGE);
    assert_eq!(
        query::enemy_at(&world, Coord::new(1, 1)).map(|enemy| enemy.species),
        Some(Species::Goblin),
        "goblin follows into the vacated tile"
    );
}

#[test]
fn bumping_a_goblin_kills_it_in_one_strike() {
    let dungeon = with_enemies(
        blueprint(CORRIDOR, Coord::new(1, 1)),
        &[(Species::Goblin, Coord::new(2, 1))],
    );
    let mut world = load(dungeon);

    let events = step(&mut world, Direction::East);

    assert!(query::enemies(&world).is_empty());
    assert_eq!(query::player(&world).cell, Coord::new(1, 1));
    assert_eq!(query::player(&world).score, 5);
    assert_eq!(query::message(&world), "The goblin falls!");
    assert!(events.contains(&Event::EnemyDefeated {
        enemy: EnemyId::new(0),
        species: Species::Goblin,
    }));
}

#[test]
fn bat_with_one_hit_point_falls_with_defeat_message() {
    let dungeon = with_enemies(
        blueprint(CORRIDOR, Coord::new(1, 1)),
        &[(Species::Bat, Coord::new(1, 2))],
    );
    let mut world = load(dungeon);

    let _ = step(&mut world, Direction::South);

    assert!(query::enemy_at(&world, Coord::new(1, 2)).is_none());
    assert_eq!(query::message(&world), "The bat falls!");
}

#[test]
fn surviving_enemy_strikes_back_in_the_same_turn() {
    let dungeon = with_enemies(
        blueprint(CORRIDOR, Coord::new(1, 1)),
        &[(Species::Slime, Coord::new(2, 1))],
    );
    let mut world = load(dungeon);

    let events = step(&mut world, Direction::East);

    let slime = query::enemy_at(&world, Coord::new(2, 1)).expect("slime survives");
    assert_eq!(slime.hp, 1);
    assert_eq!(query::player(&world).hp, PLAYER_MAX_HP - 1);
    assert_eq!(query::player(&world).score, 5);
    assert_eq!(query::message(&world), "The slime hits you!");
    assert_eq!(
        &events[..2],
        &[
            Event::EnemyStruck {
                enemy: EnemyId::new(0),
                remaining_hp: 1,
            },
            Event::PlayerHit {
                enemy: EnemyId::new(0),
                damage: 1,
                remaining_hp: PLAYER_MAX_HP - 1,
            },
        ]
    );
}

#[test]
fn resting_lets_enemies_close_in() {
    let dungeon = with_enemies(
        blueprint(CORRIDOR, Coord::new(1, 1)),
        &[(Species::Goblin, Coord::new(4, 1))],
    );
    let mut world = load(dungeon);

    let events = act(&mut world, Action::Wait);

    assert_eq!(events.first(), Some(&Event::PlayerRested));
    assert_eq!(query::message(&world), REST_MESSAGE);
    assert!(events.contains(&Event::EnemyAdvanced {
        enemy: EnemyId::new(0),
        from: Coord::new(4, 1),
        to: Coord::new(3, 1),
    }));
}

#[test]
fn enemies_move_in_roster_order_and_see_earlier_moves() {
    let dungeon = with_enemies(
        blueprint(CORRIDOR, Coord::new(1, 1)),
        &[
            (Species::Goblin, Coord::new(3, 1)),
            (Species::Slime, Coord::new(4, 1)),
        ],
    );
    let mut world = load(dungeon);

    let _ = act(&mut world, Action::Wait);

    let cells: Vec<Coord> = query::enemies(&world)
        .iter()
        .map(|enemy| enemy.cell)
        .collect();
    assert_eq!(cells, vec![Coord::new(2, 1), Coord::new(3, 1)]);
}

#[test]
fn later_enemy_waits_behind_an_earlier_one() {
    let dungeon = with_enemies(
        blueprint(CORRIDOR, Coord::new(1, 1)),
        &[
            (Species::Slime, Coord::new(4, 1)),
            (Species::Goblin, Coord::new(3, 1)),
        ],
    );
    let mut world = load(dungeon);

    let _ = act(&mut world, Action::Wait);

    let cells: Vec<Coord> = query::enemies(&world)
        .iter()
        .map(|enemy| enemy.cell)
        .collect();
    assert_eq!(
        cells,
        vec![Coord::new(4, 1), Coord::new(2, 1)],
        "slime is blocked by the goblin that has not moved yet"
    );
}

#[test]
fn reaching_the_exit_wins_and_skips_the_enemy_phase() {
    let dungeon = with_enemies(
        with_items(
            blueprint(CORRIDOR, Coord::new(3, 1)),
            &[(Coord::new(4, 1), Item::crystal())],
        ),
        &[(Species::Goblin, Coord::new(1, 2))],
    );
    let mut world = load(dungeon);

    let _ = step(&mut world, Direction::East);
    let events = step(&mut world, Direction::East);

    assert_eq!(query::status(&world), GameStatus::Won);
    assert_eq!(query::message(&world), "You escape with 1 crystals!");
    assert!(events.contains(&Event::StatusChanged {
        status: GameStatus::Won
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::EnemyAdvanced { .. } | Event::PlayerHit { .. })));

    let frozen = query::snapshot(&world);
    let events = act(&mut world, Action::Wait);
    assert!(events.is_empty());
    assert_eq!(query::snapshot(&world), frozen);
}

#[test]
fn defeat_keeps_resolving_remaining_enemies() {
    let dungeon = with_enemies(
        blueprint(ROOM, Coord::new(2, 2)),
        &[
            (Species::Goblin, Coord::new(2, 1)),
            (Species::Bat, Coord::new(1, 2)),
            (Species::Slime, Coord::new(3, 2)),
        ],
    );
    let mut world = load(dungeon);

    let _ = act(&mut world, Action::Wait);
    let _ = act(&mut world, Action::Wait);
    assert_eq!(query::player(&world).hp, 2);
    assert_eq!(query::status(&world), GameStatus::Playing);

    let events = act(&mut world, Action::Wait);

    assert_eq!(query::status(&world), GameStatus::Lost);
    assert_eq!(
        query::player(&world).hp,
        -1,
        "last hit lands on a fallen player"
    );
    assert_eq!(query::message(&world), DEFEAT_MESSAGE);
    let hits = events
        .iter()
        .filter(|event| matches!(event, Event::PlayerHit { .. }))
        .count();
    assert_eq!(hits, 3);
    let transitions = events
        .iter()
        .filter(|event| matches!(event, Event::StatusChanged { .. }))
        .count();
    assert_eq!(transitions, 1);

    let frozen = query::snapshot(&world);
    assert!(step(&mut world, Direction::South).is_empty());
    assert_eq!(query::snapshot(&world), frozen);
}

#[test]
fn new_game_discards_the_previous_one() {
    let dungeon = with_enemies(
        blueprint(CORRIDOR, Coord::new(4, 1)),
        &[(Species::Goblin, Coord::new(1, 1))],
    );
    let mut world = load(dungeon);
    let _ = step(&mut world, Direction::East);
    assert_eq!(query::status(&world), GameStatus::Won);

    let mut events = Vec::new();
    world::apply(&mut world, Command::NewGame { seed: Some(5) }, &mut events);

    assert_eq!(query::status(&world), GameStatus::Playing);
    let player = query::player(&world);
    assert_eq!(player.hp, PLAYER_MAX_HP);
    assert_eq!((player.crystals, player.score), (0, 0));
    assert_eq!(query::visible(&world), query::seen(&world));
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::GameStarted { .. }))
            .count(),
        1
    );
}
