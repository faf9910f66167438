#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that lets a player delve through Crystal Delve dungeons.

mod input;
mod session;

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use clap::Parser;
use crystal_delve_rendering::{ColorMode, Fog, Frame, RenderingBackend, TextBackend};

use crate::{
    input::parse_line,
    session::{Flow, Session},
};

/// Turn-based crystal hunt through a fog-covered dungeon.
#[derive(Parser, Debug)]
#[command(name = "crystal-delve")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for the first dungeon (default: random)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Play these keys without reading stdin, then print the final frame
    #[arg(long, value_name = "KEYS")]
    script: Option<String>,

    /// Reveal the whole dungeon
    #[arg(long)]
    no_fog: bool,
}

/// Entry point for the Crystal Delve command-line interface.
fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let args = Args::parse();
    let fog = if args.no_fog {
        Fog::Disabled
    } else {
        Fog::Enabled
    };
    let mut session = Session::start(args.seed);

    match args.script {
        Some(script) => run_script(&mut session, &script, fog),
        None => run_interactive(&mut session, fog),
    }
}

fn run_script(session: &mut Session, script: &str, fog: Fog) -> Result<()> {
    let inputs = parse_line(script).context("invalid --script")?;
    let _ = session.handle_all(inputs);

    let mut backend = TextBackend::new(io::stdout().lock(), ColorMode::Plain);
    backend.present(&Frame::compose(&session.snapshot(), fog))
}

fn run_interactive(session: &mut Session, fog: Fog) -> Result<()> {
    let stdout = io::stdout();
    let colors = if stdout.is_terminal() {
        ColorMode::Ansi
    } else {
        ColorMode::Plain
    };
    let mut backend = TextBackend::new(stdout.lock(), colors);
    backend.present(&Frame::compose(&session.snapshot(), fog))?;

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read input")?;
        let flow = match parse_line(&line) {
            Ok(inputs) => session.handle_all(inputs),
            Err(error) => {
                log::debug!("rejected input {line:?}: {error}");
                let mut stderr = io::stderr().lock();
                writeln!(stderr, "{error}").context("failed to report input error")?;
                Flow::Continue
            }
        };
        if flow == Flow::Quit {
            break;
        }
        backend.present(&Frame::compose(&session.snapshot(), fog))?;
    }

    Ok(())
}
