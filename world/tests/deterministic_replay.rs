use crystal_delve_core::{Action, Command, Direction, Event, GameSnapshot};
use crystal_delve_world::{self as world, query, World};

#[test]
fn deterministic_replay_produces_identical_runs() {
    let first = replay(7, scripted_actions());
    let second = replay(7, scripted_actions());

    assert_eq!(first, second, "replay diverged between runs");
}

#[test]
fn replays_with_different_seeds_diverge() {
    let first = replay(7, scripted_actions());
    let second = replay(8, scripted_actions());

    assert_ne!(first.snapshot.grid, second.snapshot.grid);
}

#[test]
fn replay_leaves_the_world_in_a_consistent_state() {
    let outcome = replay(1234, scripted_actions());
    let snapshot = &outcome.snapshot;

    assert!(snapshot.seen.is_superset(&snapshot.visible));
    assert!(snapshot.is_visible(snapshot.player.cell) || snapshot.status.is_terminal());
    for enemy in &snapshot.enemies {
        assert_ne!(enemy.cell, snapshot.player.cell);
        assert!(snapshot.grid.is_walkable(enemy.cell));
    }
    assert!(matches!(
        outcome.events.first(),
        Some(Event::GameStarted {
            seed: Some(1234),
            ..
        })
    ));
}

fn replay(seed: u64, actions: Vec<Action>) -> ReplayOutcome {
    let mut world = World::new();
    let mut events = Vec::new();

    let command = Command::NewGame { seed: Some(seed) };
    world::apply(&mut world, command, &mut events);
    for action in actions {
        world::apply(&mut world, Command::Act { action }, &mut events);
    }

    ReplayOutcome {
        snapshot: query::snapshot(&world),
        events,
    }
}

fn scripted_actions() -> Vec<Action> {
    let pattern = [
        Action::Move(Direction::East),
        Action::Move(Direction::East),
        Action::Move(Direction::South),
        Action::Wait,
        Action::Move(Direction::West),
        Action::Move(Direction::North),
        Action::Move(Direction::North),
        Action::Move(Direction::East),
    ];
    pattern.iter().copied().cycle().take(64).collect()
}

#[derive(Clone, Debug, PartialEq)]
struct ReplayOutcome {
    snapshot: GameSnapshot,
    events: Vec<Event>,
}
