#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Crystal Delve adapters.
//!
//! Everything here is a pure function of a [`GameSnapshot`]: the glyph shown
//! for a tile, the HUD line, and the composed text frame. Backends only decide
//! how a finished [`Frame`] reaches the player.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use crossterm::{
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use crystal_delve_core::{
    Coord, GameSnapshot, GameStatus, ItemKind, PlayerSnapshot, Tile, HEIGHT, WIDTH,
};

/// Symbol drawn for tiles that have never been seen.
pub const UNSEEN_SYMBOL: char = '·';

/// Symbol drawn for the player.
pub const PLAYER_SYMBOL: char = '@';

/// Suffix appended to the message after an escape.
pub const WON_SUFFIX: &str = "Press n to delve again.";

/// Suffix appended to the message after a defeat.
pub const LOST_SUFFIX: &str = "Press n to retry.";

/// Opaque RGB color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel intensity.
    pub red: u8,
    /// Green channel intensity.
    pub green: u8,
    /// Blue channel intensity.
    pub blue: u8,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Returns a new color darkened towards black by the provided amount.
    #[must_use]
    pub fn darken(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: darken_channel(self.red, amount),
            green: darken_channel(self.green, amount),
            blue: darken_channel(self.blue, amount),
        }
    }
}

fn darken_channel(channel: u8, amount: f32) -> u8 {
    (f32::from(channel) * (1.0 - amount)).round() as u8
}

const WALL_COLOR: Color = Color::from_rgb_u8(120, 110, 140);
const FLOOR_COLOR: Color = Color::from_rgb_u8(90, 90, 100);
const EXIT_COLOR: Color = Color::from_rgb_u8(240, 200, 80);
const CRYSTAL_COLOR: Color = Color::from_rgb_u8(110, 220, 240);
const HEART_COLOR: Color = Color::from_rgb_u8(230, 90, 110);
const ENEMY_COLOR: Color = Color::from_rgb_u8(220, 120, 60);
const PLAYER_COLOR: Color = Color::from_rgb_u8(250, 250, 250);
const UNSEEN_COLOR: Color = Color::from_rgb_u8(50, 50, 60);
const REMEMBERED_DARKEN: f32 = 0.6;

/// How much of a tile the player currently perceives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// In the field of view this turn.
    Lit,
    /// Seen earlier in the game but out of view now.
    Remembered,
    /// Never seen.
    Unseen,
}

/// Whether fog of war hides tiles when composing a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Fog {
    /// Tiles are shown according to what the player has seen.
    #[default]
    Enabled,
    /// Every tile is drawn as lit.
    Disabled,
}

/// Single character cell of a rendered frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Glyph {
    /// Character drawn in the cell.
    pub symbol: char,
    /// Foreground color for color-capable backends.
    pub color: Color,
    /// Perception tier the glyph was drawn with.
    pub visibility: Visibility,
}

/// Decides what the player sees at `cell`.
///
/// Unseen tiles are [`UNSEEN_SYMBOL`]. Otherwise the player wins over an
/// enemy, an enemy over an item, an item over the exit, and the exit over
/// plain terrain. Entities are drawn on remembered tiles as well.
#[must_use]
pub fn glyph_at(snapshot: &GameSnapshot, cell: Coord, fog: Fog) -> Glyph {
    let visibility = match fog {
        Fog::Disabled => Visibility::Lit,
        Fog::Enabled if snapshot.is_visible(cell) => Visibility::Lit,
        Fog::Enabled if snapshot.has_seen(cell) => Visibility::Remembered,
        Fog::Enabled => Visibility::Unseen,
    };

    let (symbol, color) = if visibility == Visibility::Unseen {
        (UNSEEN_SYMBOL, UNSEEN_COLOR)
    } else if snapshot.player.cell == cell {
        (PLAYER_SYMBOL, PLAYER_COLOR)
    } else if let Some(enemy) = snapshot.enemy_at(cell) {
        (enemy.species.glyph(), ENEMY_COLOR)
    } else if let Some(item) = snapshot.item_at(cell) {
        match item.kind {
            ItemKind::Crystal => ('*', CRYSTAL_COLOR),
            ItemKind::Heart => ('+', HEART_COLOR),
        }
    } else if snapshot.exit == cell {
        ('>', EXIT_COLOR)
    } else {
        terrain(snapshot.tile_at(cell).unwrap_or_default())
    };

    let color = if visibility == Visibility::Remembered {
        color.darken(REMEMBERED_DARKEN)
    } else {
        color
    };

    Glyph {
        symbol,
        color,
        visibility,
    }
}

fn terrain(tile: Tile) -> (char, Color) {
    match tile {
        Tile::Wall => ('#', WALL_COLOR),
        Tile::Floor => ('.', FLOOR_COLOR),
        Tile::Exit => ('>', EXIT_COLOR),
    }
}

/// Formats the statistics line shown above the map.
#[must_use]
pub fn hud_line(player: &PlayerSnapshot) -> String {
    format!(
        "HP: {}/{} · Crystals: {} · Score: {}",
        player.hp, player.max_hp, player.crystals, player.score
    )
}

/// Formats the message line, adding a restart hint once the game has ended.
#[must_use]
pub fn message_line(message: &str, status: GameStatus) -> String {
    let suffix = match status {
        GameStatus::Won => WON_SUFFIX,
        GameStatus::Lost => LOST_SUFFIX,
        GameStatus::Loading | GameStatus::Playing => return message.to_owned(),
    };

    if message.is_empty() {
        suffix.to_owned()
    } else {
        format!("{message} {suffix}")
    }
}

/// Fully composed frame ready for a backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Statistics line.
    pub hud: String,
    /// Map glyphs in row-major order, one inner vector per row.
    pub rows: Vec<Vec<Glyph>>,
    /// Message line including any restart hint.
    pub message: String,
}

impl Frame {
    /// Composes the frame for the provided snapshot.
    #[must_use]
    pub fn compose(snapshot: &GameSnapshot, fog: Fog) -> Self {
        let rows = (0..HEIGHT)
            .map(|row| {
                (0..WIDTH)
                    .map(|column| glyph_at(snapshot, Coord::new(column, row), fog))
                    .collect()
            })
            .collect();

        Self {
            hud: hud_line(&snapshot.player),
            rows,
            message: message_line(&snapshot.message, snapshot.status),
        }
    }

    /// Map rows as plain characters.
    #[must_use]
    pub fn map_lines(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|glyph| glyph.symbol).collect())
            .collect()
    }

    /// Renders the frame as uncolored text, one line per row.
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        let mut text = String::new();
        text.push_str(&self.hud);
        text.push('\n');
        for line in self.map_lines() {
            text.push_str(&line);
            text.push('\n');
        }
        text.push_str(&self.message);
        text.push('\n');
        text
    }

    /// Encodes the frame with 24-bit foreground colors into `out`.
    ///
    /// The color escape is only emitted when it changes along a row, and every
    /// row ends with a color reset.
    pub fn encode_ansi_into(&self, out: &mut Vec<u8>) -> AnyResult<()> {
        writeln!(out, "{}", self.hud)?;
        for row in &self.rows {
            let mut current = None;
            for glyph in row {
                if current != Some(glyph.color) {
                    let _ = out.queue(SetForegroundColor(terminal_color(glyph.color)))?;
                    current = Some(glyph.color);
                }
                let _ = out.queue(Print(glyph.symbol))?;
            }
            let _ = out.queue(ResetColor)?;
            writeln!(out)?;
        }
        writeln!(out, "{}", self.message)?;
        Ok(())
    }
}

fn terminal_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.red,
        g: color.green,
        b: color.blue,
    }
}

/// Whether a text backend emits color escapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Plain characters only.
    #[default]
    Plain,
    /// 24-bit ANSI foreground colors.
    Ansi,
}

/// Rendering backend capable of presenting Crystal Delve frames.
pub trait RenderingBackend {
    /// Presents one composed frame.
    fn present(&mut self, frame: &Frame) -> AnyResult<()>;
}

/// Backend that writes frames as text to any [`Write`] sink.
#[derive(Debug)]
pub struct TextBackend<W> {
    writer: W,
    colors: ColorMode,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend writing to `writer`.
    #[must_use]
    pub fn new(writer: W, colors: ColorMode) -> Self {
        Self { writer, colors }
    }

    /// Consumes the backend and returns the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, frame: &Frame) -> AnyResult<()> {
        let mut bytes = Vec::new();
        match self.colors {
            ColorMode::Plain => bytes.extend_from_slice(frame.to_plain_text().as_bytes()),
            ColorMode::Ansi => frame
                .encode_ansi_into(&mut bytes)
                .context("failed to encode frame")?,
        }
        self.writer
            .write_all(&bytes)
            .context("failed to write frame")?;
        self.writer.flush().context("failed to flush frame")?;
        Ok(())
    }
}
