//! Core game logic - pure, deterministic, and testable
//!
//! Everything that decides what happens in a game of blockfall lives here. There is no
//! rendering, audio, or I/O: callers feed in input intents and elapsed time and read back
//! [`GameSnapshot`] values.
//!
//! - **Deterministic**: the same seed, config, and inputs produce the same game
//! - **Self-contained**: one [`GameState`] owns all of its state; run as many as you like
//! - **Pluggable rotation**: wall kicks come from a [`RotationResolver`]
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid, collision, merge, and row collapse
//! - [`pieces`]: piece matrices and the active piece
//! - [`rotation`]: rotation resolvers and kick tables
//! - [`rng`]: Mulberry32 and the bag / classic / double randomizers
//! - [`daily`]: calendar dates and the daily seed
//! - [`tspin`]: T-Spin detection
//! - [`scoring`]: line clears, T-Spins, combos, back-to-back, drop points
//! - [`level`]: level progression and fall speed
//! - [`lock`]: lock delay and the line clear gate
//! - [`game_state`]: the engine
//! - [`snapshot`]: per-frame state export
//! - [`records`]: best score / best lines
//! - [`replay`]: input recording and playback
//! - [`config`]: engine configuration
//!
//! # Example
//!
//! ```
//! use blockfall_core::{EngineConfig, GameState};
//! use blockfall_core::types::InputIntent;
//!
//! let mut game = GameState::new(EngineConfig::default(), 42);
//! game.start();
//!
//! game.apply_intent(InputIntent::Right);
//! game.apply_intent(InputIntent::RotateCw);
//! game.step(&[InputIntent::HardDrop], 16);
//!
//! let snapshot = game.snapshot();
//! assert!(!snapshot.over);
//! assert!(snapshot.score > 0); // hard drop points
//! ```
//!
//! # Timing
//!
//! Call [`GameState::tick`] (or [`GameState::step`] with the frame's intents) every frame
//! with the elapsed time in milliseconds. Gravity starts at 700ms per row and speeds up by
//! 60ms per level down to 120ms; a grounded piece locks after 500ms, with at most 15 resets.
//! Line clears hold the game for a 120ms flash followed by a 60ms impact stage.

pub mod board;
pub mod config;
pub mod daily;
pub mod game_state;
pub mod level;
pub mod lock;
pub mod pieces;
pub mod records;
pub mod replay;
pub mod rng;
pub mod rotation;
pub mod scoring;
pub mod snapshot;
pub mod tspin;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use board::{collide, Board};
pub use config::{EngineConfig, GravityConfig};
pub use daily::{daily_seed, daily_seed_at, CalendarDate};
pub use game_state::{GameState, LockEvent};
pub use level::{fall_interval_for, LevelProgress};
pub use lock::{ClearJob, ClearStage, LockState};
pub use pieces::{PieceMatrix, Tetromino};
pub use records::{BestRecords, InMemoryRecords, RecordKeeper, RecordStore};
pub use replay::{Recorder, ReplayAction, ReplayData, ReplayInput, ReplayPlayer};
pub use rng::{create_seed, generate_sequence, parse_seed, sanitize_seed, Mulberry32, Randomizer};
pub use rotation::{BasicResolver, RotationOutcome, RotationResolver, SrsResolver};
pub use scoring::{LockInput, LockScore, ScoreKeeper};
pub use snapshot::{ActiveSnapshot, GameSnapshot, Phase};
pub use tspin::{detect_tspin, LastRotation, TSpinProbe, TSpinResult};
