//! Drives one world from parsed player inputs.

use crystal_delve_core::{Action, Command, Direction, Event, GameSnapshot};
use crystal_delve_world::{self as world, query, World};

use crate::input::Input;

/// Whether the session should keep reading input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Quit,
}

/// Owns the world and forwards player inputs to it.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    events: Vec<Event>,
}

impl Session {
    /// Starts the first dungeon, generated from `seed` when one is given.
    pub(crate) fn start(seed: Option<u64>) -> Self {
        let mut session = Self {
            world: World::new(),
            events: Vec::new(),
        };
        session.submit(Command::NewGame { seed });
        session
    }

    /// Applies every input in order, stopping at the first quit request.
    pub(crate) fn handle_all<I>(&mut self, inputs: I) -> Flow
    where
        I: IntoIterator<Item = Input>,
    {
        for input in inputs {
            if self.handle(input) == Flow::Quit {
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    /// Applies a single input.
    pub(crate) fn handle(&mut self, input: Input) -> Flow {
        match input {
            Input::Act(action) => self.act(action),
            Input::Tap(target) => {
                let from = query::player(&self.world).cell;
                if let Some(direction) = Direction::toward(from, target) {
                    self.act(Action::Move(direction));
                }
            }
            Input::NewGame => self.submit(Command::NewGame { seed: None }),
            Input::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Captures the current state for rendering.
    pub(crate) fn snapshot(&self) -> GameSnapshot {
        query::snapshot(&self.world)
    }

    fn act(&mut self, action: Action) {
        self.submit(Command::Act { action });
    }

    fn submit(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.events);
        for event in self.events.drain(..) {
            log::trace!("{event:?}");
        }
    }
}
