//! Parsing of typed command lines into player inputs.

use crystal_delve_core::{Action, Coord, Direction, HEIGHT, WIDTH};
use thiserror::Error;

/// One thing the player asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Input {
    /// Perform a turn action.
    Act(Action),
    /// Step once toward a tile.
    Tap(Coord),
    /// Abandon the current dungeon and generate a new one.
    NewGame,
    /// Leave the program.
    Quit,
}

/// Reasons a command line could not be understood.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum InputError {
    /// A key outside the key map was typed.
    #[error("unknown key `{key}` (use w/a/s/d, ., t <x> <y>, n or q)")]
    UnknownKey {
        /// Offending key.
        key: char,
    },
    /// `t` was not followed by two coordinates.
    #[error("tap needs a column and a row, e.g. `t 4 7`")]
    MissingTapCoordinate,
    /// A tap coordinate was not a number.
    #[error("`{value}` is not a tile coordinate")]
    InvalidTapCoordinate {
        /// Offending token.
        value: String,
    },
    /// A tap coordinate fell outside the dungeon.
    #[error(
        "tile ({column}, {row}) lies outside the {} x {} dungeon",
        WIDTH,
        HEIGHT
    )]
    TapOutOfBounds {
        /// Requested column.
        column: u32,
        /// Requested row.
        row: u32,
    },
}

/// Parses one line of input.
///
/// Whitespace separates tokens. The words `up`, `down`, `left`, `right` and
/// `wait` are single inputs, `t <x> <y>` taps a tile, and any other token is
/// read key by key so `ddds` moves three times east and once south. A line
/// with any error yields no inputs at all.
pub(crate) fn parse_line(line: &str) -> Result<Vec<Input>, InputError> {
    let mut inputs = Vec::new();
    let mut tokens = line.split_whitespace();

    while let Some(token) = tokens.next() {
        let word = match token.to_ascii_lowercase().as_str() {
            "up" => Some(Input::Act(Action::Move(Direction::North))),
            "down" => Some(Input::Act(Action::Move(Direction::South))),
            "left" => Some(Input::Act(Action::Move(Direction::West))),
            "right" => Some(Input::Act(Action::Move(Direction::East))),
            "wait" => Some(Input::Act(Action::Wait)),
            "t" => Some(Input::Tap(parse_tap(&mut tokens)?)),
            _ => None,
        };

        match word {
            Some(input) => inputs.push(input),
            None => {
                for key in token.chars() {
                    inputs.push(parse_key(key)?);
                }
            }
        }
    }

    Ok(inputs)
}

fn parse_key(key: char) -> Result<Input, InputError> {
    let input = match key.to_ascii_lowercase() {
        'w' => Input::Act(Action::Move(Direction::North)),
        'a' => Input::Act(Action::Move(Direction::West)),
        's' => Input::Act(Action::Move(Direction::South)),
        'd' => Input::Act(Action::Move(Direction::East)),
        '.' => Input::Act(Action::Wait),
        'n' => Input::NewGame,
        'q' => Input::Quit,
        _ => return Err(InputError::UnknownKey { key }),
    };
    Ok(input)
}

fn parse_tap<'a, I>(tokens: &mut I) -> Result<Coord, InputError>
where
    I: Iterator<Item = &'a str>,
{
    let column = parse_coordinate(tokens.next())?;
    let row = parse_coordinate(tokens.next())?;

    if column >= WIDTH || row >= HEIGHT {
        return Err(InputError::TapOutOfBounds { column, row });
    }
    Ok(Coord::new(column, row))
}

fn parse_coordinate(token: Option<&str>) -> Result<u32, InputError> {
    let token = token.ok_or(InputError::MissingTapCoordinate)?;
    token.parse().map_err(|_| InputError::InvalidTapCoordinate {
        value: token.to_owned(),
    })
}
