//! Command line front end for the headless runner.

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::core::{
    daily_seed, parse_seed, CalendarDate, EngineConfig, GameSnapshot, GameState, LockEvent,
};
use crate::types::{InputIntent, RandomizerMode, BOARD_WIDTH, TICK_MS};

pub const USAGE: &str = "\
usage: blockfall <command> [options]

commands:
  sequence   print the first pieces for a seed
             --seed <n>  --mode <bag|classic|double>  --count <n>
  daily      print the daily seed
             --date <YYYY-MM-DD>   (default: today, UTC)
  simulate   play a seeded game headlessly and print JSON
             --seed <n> | --daily  --mode <m>  --pieces <n>  --frames <n>
             --config <file.json>  --events

environment:
  BLOCKFALL_* variables override engine config, RUST_LOG controls logging";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceArgs {
    pub seed: u32,
    pub mode: RandomizerMode,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulateArgs {
    pub seed: Option<u32>,
    pub daily: bool,
    pub mode: Option<RandomizerMode>,
    pub pieces: u32,
    pub max_frames: u32,
    pub config: Option<PathBuf>,
    pub events: bool,
}

impl Default for SimulateArgs {
    fn default() -> Self {
        Self {
            seed: None,
            daily: false,
            mode: None,
            pieces: 100,
            max_frames: 200_000,
            config: None,
            events: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Sequence(SequenceArgs),
    Daily { date: Option<CalendarDate> },
    Simulate(SimulateArgs),
    Help,
}

fn value<'a>(args: &'a [String], i: usize, cmd: &str, flag: &str) -> Result<&'a String> {
    args.get(i)
        .ok_or_else(|| anyhow!("{cmd}: missing value for {flag}"))
}

fn number<T: std::str::FromStr>(raw: &str, cmd: &str, flag: &str) -> Result<T> {
    raw.parse::<T>()
        .map_err(|_| anyhow!("{cmd}: invalid {flag} value: {raw}"))
}

/// Parse `args` (without the program name)
pub fn parse_args(args: &[String]) -> Result<Command> {
    let Some(cmd) = args.first() else {
        return Ok(Command::Help);
    };
    let rest = &args[1..];
    match cmd.as_str() {
        "sequence" => parse_sequence(rest).map(Command::Sequence),
        "daily" => parse_daily(rest),
        "simulate" => parse_simulate(rest).map(Command::Simulate),
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => Err(anyhow!("unknown command: {other}")),
    }
}

fn parse_sequence(args: &[String]) -> Result<SequenceArgs> {
    let mut out = SequenceArgs {
        seed: 1,
        mode: RandomizerMode::Bag,
        count: 14,
    };
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                out.seed = parse_seed(value(args, i, "sequence", "--seed")?);
            }
            "--mode" => {
                i += 1;
                out.mode = RandomizerMode::parse(value(args, i, "sequence", "--mode")?);
            }
            "--count" => {
                i += 1;
                out.count = number(value(args, i, "sequence", "--count")?, "sequence", "--count")?;
            }
            other => return Err(anyhow!("sequence: unknown argument: {other}")),
        }
        i += 1;
    }
    Ok(out)
}

fn parse_daily(args: &[String]) -> Result<Command> {
    let mut date = None;
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--date" => {
                i += 1;
                let raw = value(args, i, "daily", "--date")?;
                date = Some(
                    CalendarDate::parse(raw)
                        .ok_or_else(|| anyhow!("daily: invalid --date value: {raw}"))?,
                );
            }
            other => return Err(anyhow!("daily: unknown argument: {other}")),
        }
        i += 1;
    }
    Ok(Command::Daily { date })
}

fn parse_simulate(args: &[String]) -> Result<SimulateArgs> {
    let mut out = SimulateArgs::default();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                out.seed = Some(parse_seed(value(args, i, "simulate", "--seed")?));
            }
            "--daily" => out.daily = true,
            "--mode" => {
                i += 1;
                out.mode = Some(RandomizerMode::parse(value(args, i, "simulate", "--mode")?));
            }
            "--pieces" => {
                i += 1;
                out.pieces =
                    number(value(args, i, "simulate", "--pieces")?, "simulate", "--pieces")?;
            }
            "--frames" => {
                i += 1;
                out.max_frames =
                    number(value(args, i, "simulate", "--frames")?, "simulate", "--frames")?;
            }
            "--config" => {
                i += 1;
                out.config = Some(PathBuf::from(value(args, i, "simulate", "--config")?));
            }
            "--events" => out.events = true,
            other => return Err(anyhow!("simulate: unknown argument: {other}")),
        }
        i += 1;
    }
    if out.daily && out.seed.is_some() {
        return Err(anyhow!("simulate: --seed and --daily are mutually exclusive"));
    }
    Ok(out)
}

/// Config file (if any), then `BLOCKFALL_*` overrides, then clamping
pub fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<EngineConfig>(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    config.apply_env();
    Ok(config.sanitized())
}

/// Column the headless runner steers the `piece_id`-th piece to
fn target_column(piece_id: u32, box_size: u8) -> i8 {
    let column = (piece_id.wrapping_mul(3) % 8) as u8;
    column.min(BOARD_WIDTH - box_size) as i8
}

/// Intents for one frame of the headless runner: slide toward a target column, then drop
pub fn autopilot_intents(game: &GameState) -> Vec<InputIntent> {
    let Some(active) = game.active() else {
        return Vec::new();
    };
    let target = target_column(game.piece_id(), active.matrix.size());
    if active.x < target {
        vec![InputIntent::Right]
    } else if active.x > target {
        vec![InputIntent::Left]
    } else {
        vec![InputIntent::HardDrop]
    }
}

#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub frames: u32,
    pub events: Vec<LockEvent>,
    pub snapshot: GameSnapshot,
}

/// Run a headless game until it ends, `pieces` pieces have locked, or `max_frames` pass
pub fn simulate(config: EngineConfig, seed: u32, pieces: u32, max_frames: u32) -> SimulationReport {
    let mut game = GameState::new(config, seed);
    game.start();

    let mut events = Vec::new();
    let mut frames = 0u32;
    while frames < max_frames && !game.is_over() && (events.len() as u32) < pieces {
        let intents = autopilot_intents(&game);
        game.step(&intents, TICK_MS);
        frames += 1;
        if let Some(event) = game.take_last_event() {
            events.push(event);
        }
    }
    log::info!(
        "simulation done after {frames} frames: score {} lines {} over {}",
        game.score(),
        game.lines(),
        game.is_over()
    );

    SimulationReport {
        frames,
        events,
        snapshot: game.snapshot(),
    }
}

/// Seed for a simulate run: explicit, daily, or fresh
pub fn resolve_seed(args: &SimulateArgs) -> u32 {
    match (args.seed, args.daily) {
        (Some(seed), _) => seed,
        (None, true) => daily_seed(CalendarDate::today()),
        (None, false) => crate::core::create_seed(),
    }
}
