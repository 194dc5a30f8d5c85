//! Headless blockfall runner (default binary).
//!
//! Prints piece sequences and daily seeds, or plays a seeded game without a display and
//! writes the result as JSON on stdout.

use anyhow::Result;
use serde_json::json;

use blockfall::cli::{self, Command, USAGE};
use blockfall::core::{daily_seed, generate_sequence, CalendarDate};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match cli::parse_args(&args)? {
        Command::Help => println!("{USAGE}"),
        Command::Sequence(seq) => {
            let pieces: Vec<&str> = generate_sequence(seq.count, seq.seed, seq.mode)
                .iter()
                .map(|kind| kind.as_str())
                .collect();
            let out = json!({
                "seed": seq.seed,
                "mode": seq.mode,
                "pieces": pieces,
            });
            println!("{}", serde_json::to_string(&out)?);
        }
        Command::Daily { date } => {
            let date = date.unwrap_or_else(CalendarDate::today);
            let out = json!({
                "date": date.to_string(),
                "seed": daily_seed(date),
            });
            println!("{}", serde_json::to_string(&out)?);
        }
        Command::Simulate(sim) => {
            let mut config = cli::load_config(sim.config.as_ref())?;
            if let Some(mode) = sim.mode {
                config.randomizer = mode;
            }
            let seed = cli::resolve_seed(&sim);
            log::info!("simulating seed {seed} mode {}", config.randomizer.as_str());

            let report = cli::simulate(config, seed, sim.pieces, sim.max_frames);
            if sim.events {
                for event in &report.events {
                    println!("{}", serde_json::to_string(event)?);
                }
            }
            let out = json!({
                "seed": seed,
                "frames": report.frames,
                "locks": report.events.len(),
                "snapshot": report.snapshot,
            });
            println!("{}", serde_json::to_string(&out)?);
        }
    }
    Ok(())
}
