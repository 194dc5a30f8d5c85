use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::pieces::{PieceMatrix, Tetromino};
use crate::types::{PieceKind, RandomizerMode, COLS, MAX_PREVIEW, ROWS};

/// Engine phase as seen by consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    NotStarted,
    Falling,
    Locking,
    ClearPending,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub matrix: PieceMatrix,
    pub x: i8,
    pub y: i8,
    pub orientation: u8,
}

impl From<Tetromino> for ActiveSnapshot {
    fn from(value: Tetromino) -> Self {
        Self {
            kind: value.kind,
            matrix: value.matrix,
            x: value.x,
            y: value.y,
            orientation: value.rotation.index(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub grid: [[u8; COLS]; ROWS],
    pub active: Option<ActiveSnapshot>,
    pub ghost_y: Option<i8>,
    pub hold: Option<PieceKind>,
    pub next_queue: ArrayVec<PieceKind, MAX_PREVIEW>,
    pub can_hold: bool,
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
    pub combo: i32,
    pub back_to_back: bool,
    pub over: bool,
    pub paused: bool,
    pub phase: Phase,
    pub seed: u32,
    pub randomizer_mode: RandomizerMode,
    pub clearing_rows: ArrayVec<usize, ROWS>,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        !self.over && !self.paused
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            grid: [[0u8; COLS]; ROWS],
            active: None,
            ghost_y: None,
            hold: None,
            next_queue: ArrayVec::new(),
            can_hold: true,
            score: 0,
            level: 0,
            lines_cleared: 0,
            combo: -1,
            back_to_back: false,
            over: false,
            paused: false,
            phase: Phase::NotStarted,
            seed: 0,
            randomizer_mode: RandomizerMode::Bag,
            clearing_rows: ArrayVec::new(),
        }
    }
}
