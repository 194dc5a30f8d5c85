//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are plain data with no behaviour beyond parsing and lookups, making them
//! usable in any context (engine logic, snapshot consumers, replay tooling).
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 at the top)
//! - **Spawn position**: horizontally centered, `y = 0`
//!
//! # Default Timing
//!
//! Timing values are in milliseconds and can be overridden per engine through
//! `EngineConfig` in `blockfall-core`:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Frame step used by the headless runner (~60 FPS) |
//! | `BASE_FALL_MS` | 700 | Gravity interval at the starting level |
//! | `FALL_STEP_MS` | 60 | Interval reduction per level |
//! | `MIN_FALL_MS` | 120 | Gravity interval floor |
//! | `SOFT_DROP_MULTIPLIER` | 10 | Held soft drop divides the interval by this |
//! | `LOCK_DELAY_MS` | 500 | Time before a grounded piece locks |
//! | `LOCK_RESET_LIMIT` | 15 | Max lock timer resets per piece |
//! | `CLEAR_FLASH_MS` | 120 | First line clear stage |
//! | `CLEAR_IMPACT_MS` | 60 | Second line clear stage, rows collapse at its end |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{
//!     InputIntent, PieceKind, RandomizerMode, Rotation, BOARD_HEIGHT, BOARD_WIDTH,
//! };
//!
//! let piece = PieceKind::T;
//! assert_eq!(piece.tag(), 3);
//! assert_eq!(PieceKind::from_tag(3), Some(PieceKind::T));
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//! assert_eq!(InputIntent::from_str("rotateCW"), Some(InputIntent::RotateCw));
//!
//! // Unknown randomizer modes fall back to the bag.
//! assert_eq!(RandomizerMode::parse("chaos"), RandomizerMode::Bag);
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

use serde::{Deserialize, Serialize};

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Board width as a `usize` for array sizing
pub const COLS: usize = BOARD_WIDTH as usize;

/// Board height as a `usize` for array sizing
pub const ROWS: usize = BOARD_HEIGHT as usize;

/// Frame step used by the headless runner (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Gravity interval at the starting level
pub const BASE_FALL_MS: u32 = 700;

/// Gravity interval reduction per level gained
pub const FALL_STEP_MS: u32 = 60;

/// Gravity interval floor
pub const MIN_FALL_MS: u32 = 120;

/// Cumulative cleared lines needed per level
pub const LINES_PER_LEVEL: u32 = 10;

/// Level a fresh game starts at
pub const START_LEVEL: u32 = 1;

/// Held soft drop divides the gravity interval by this factor
pub const SOFT_DROP_MULTIPLIER: u32 = 10;

/// Lock delay for a grounded piece
pub const LOCK_DELAY_MS: u32 = 500;

/// Maximum number of lock timer resets per piece
pub const LOCK_RESET_LIMIT: u8 = 15;

/// Duration of the first (flash) line clear stage
pub const CLEAR_FLASH_MS: u32 = 120;

/// Duration of the second (impact) line clear stage
pub const CLEAR_IMPACT_MS: u32 = 60;

/// Number of upcoming pieces exposed in snapshots by default
pub const DEFAULT_PREVIEW: usize = 5;

/// Upper bound for the preview length
pub const MAX_PREVIEW: usize = 7;

/// Tetromino piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// The seven kinds in canonical bag order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Grid tag written into the board for this kind (1..=7)
    pub fn tag(self) -> u8 {
        match self {
            PieceKind::I => 1,
            PieceKind::O => 2,
            PieceKind::T => 3,
            PieceKind::S => 4,
            PieceKind::Z => 5,
            PieceKind::J => 6,
            PieceKind::L => 7,
        }
    }

    /// Inverse of [`PieceKind::tag`]; 0 and unknown tags map to `None`
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(PieceKind::I),
            2 => Some(PieceKind::O),
            3 => Some(PieceKind::T),
            4 => Some(PieceKind::S),
            5 => Some(PieceKind::Z),
            6 => Some(PieceKind::J),
            7 => Some(PieceKind::L),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::O => "O",
            PieceKind::T => "T",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
            PieceKind::J => "J",
            PieceKind::L => "L",
        }
    }
}

/// Rotation states (North = spawn orientation, index 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    /// Orientation index in `0..4`
    pub fn index(&self) -> u8 {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    /// Orientation from any integer, wrapped into `0..4`
    pub fn from_index(index: i32) -> Self {
        match index.rem_euclid(4) {
            0 => Rotation::North,
            1 => Rotation::East,
            2 => Rotation::South,
            _ => Rotation::West,
        }
    }
}

/// Direction of a rotation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    pub fn apply(self, rotation: Rotation) -> Rotation {
        match self {
            RotationDirection::Clockwise => rotation.rotate_cw(),
            RotationDirection::CounterClockwise => rotation.rotate_ccw(),
        }
    }
}

/// Player input intents, one per call into the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputIntent {
    Left,
    Right,
    #[serde(rename = "rotateCW")]
    RotateCw,
    #[serde(rename = "rotateCCW")]
    RotateCcw,
    SoftDrop,
    HardDrop,
    Hold,
}

impl InputIntent {
    pub const ALL: [InputIntent; 7] = [
        InputIntent::Left,
        InputIntent::Right,
        InputIntent::RotateCw,
        InputIntent::RotateCcw,
        InputIntent::SoftDrop,
        InputIntent::HardDrop,
        InputIntent::Hold,
    ];

    /// Parse intent from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" => Some(InputIntent::Left),
            "right" => Some(InputIntent::Right),
            "rotatecw" => Some(InputIntent::RotateCw),
            "rotateccw" => Some(InputIntent::RotateCcw),
            "softdrop" => Some(InputIntent::SoftDrop),
            "harddrop" => Some(InputIntent::HardDrop),
            "hold" => Some(InputIntent::Hold),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputIntent::Left => "left",
            InputIntent::Right => "right",
            InputIntent::RotateCw => "rotateCW",
            InputIntent::RotateCcw => "rotateCCW",
            InputIntent::SoftDrop => "softDrop",
            InputIntent::HardDrop => "hardDrop",
            InputIntent::Hold => "hold",
        }
    }
}

/// Piece supply policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RandomizerMode {
    /// One of each kind per shuffled group of seven
    #[default]
    Bag,
    /// Independent uniform draw per piece
    Classic,
    /// Two shuffled bags concatenated into a group of fourteen
    Double,
}

impl RandomizerMode {
    /// Parse a mode name; anything unrecognized falls back to [`RandomizerMode::Bag`]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "classic" => RandomizerMode::Classic,
            "double" => RandomizerMode::Double,
            _ => RandomizerMode::Bag,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RandomizerMode::Bag => "bag",
            RandomizerMode::Classic => "classic",
            RandomizerMode::Double => "double",
        }
    }
}

/// T-Spin detection result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TSpinKind {
    #[default]
    None,
    Mini,
    Full,
}

impl TSpinKind {
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            TSpinKind::None => None,
            TSpinKind::Mini => Some("mini"),
            TSpinKind::Full => Some("full"),
        }
    }
}

/// Classification of a lock for scoring and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearType {
    #[default]
    None,
    Single,
    Double,
    Triple,
    Tetris,
    TSpinZero,
    TSpinSingle,
    TSpinDouble,
    TSpinTriple,
    TSpinMiniZero,
    TSpinMiniSingle,
    TSpinMiniDouble,
}

impl ClearType {
    /// Human readable label, empty for plain locks
    pub fn describe(&self) -> &'static str {
        match self {
            ClearType::None => "",
            ClearType::Single => "Single",
            ClearType::Double => "Double",
            ClearType::Triple => "Triple",
            ClearType::Tetris => "Tetris",
            ClearType::TSpinZero => "T-Spin",
            ClearType::TSpinSingle => "T-Spin Single",
            ClearType::TSpinDouble => "T-Spin Double",
            ClearType::TSpinTriple => "T-Spin Triple",
            ClearType::TSpinMiniZero => "T-Spin Mini",
            ClearType::TSpinMiniSingle => "T-Spin Mini Single",
            ClearType::TSpinMiniDouble => "T-Spin Mini Double",
        }
    }
}

/// Cell on the board (None = empty, Some = filled with piece kind)
pub type Cell = Option<PieceKind>;

/// Line clear points indexed by line count
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// Combo scoring base
pub const COMBO_BASE: u32 = 50;
