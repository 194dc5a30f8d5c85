//! Scoring module - line clears, T-Spins, combos, and back-to-back
//!
//! Rules:
//! - T-Spin locks use the T-Spin table instead of the line-clear table.
//! - Combo bonus (`combo × 50`) is added to the base points *before* the back-to-back bonus.
//! - Back-to-back adds half (rounded down) of base+combo when two eligible clears are
//!   consecutive. A lock that clears nothing keeps the chain alive.
//! - Drop points are added last and never multiplied.

use serde::{Deserialize, Serialize};

use crate::types::{ClearType, TSpinKind, COMBO_BASE, LINE_SCORES};

/// Inputs for a single lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockInput {
    pub lines_cleared: u32,
    pub tspin: TSpinKind,
    pub soft_drop_steps: u32,
    pub hard_drop_steps: u32,
}

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockScore {
    /// Everything this lock added to the score
    pub points: u32,
    /// Base + combo + back-to-back
    pub line_points: u32,
    pub drop_points: u32,
    pub combo_bonus: u32,
    /// Running total after this lock
    pub score: u32,
    pub combo: i32,
    pub back_to_back: bool,
    pub b2b_just_awarded: bool,
    pub b2b_eligible: bool,
    pub clear_type: ClearType,
}

/// Line clear points for an ordinary (non T-Spin) clear
pub fn line_clear_points(lines: u32) -> u32 {
    LINE_SCORES.get(lines as usize).copied().unwrap_or(0)
}

/// T-Spin table points and clear type
pub fn tspin_points(tspin: TSpinKind, lines: u32) -> (u32, ClearType) {
    match (tspin, lines) {
        (TSpinKind::None, _) => (0, ClearType::None),
        (TSpinKind::Mini, 0) => (100, ClearType::TSpinMiniZero),
        (TSpinKind::Mini, 1) => (200, ClearType::TSpinMiniSingle),
        (TSpinKind::Mini, 2) => (400, ClearType::TSpinMiniDouble),
        (TSpinKind::Mini, _) => (800, ClearType::TSpinSingle),
        (TSpinKind::Full, 0) => (100, ClearType::TSpinZero),
        (TSpinKind::Full, 1) => (800, ClearType::TSpinSingle),
        (TSpinKind::Full, 2) => (1200, ClearType::TSpinDouble),
        (TSpinKind::Full, 3) => (1600, ClearType::TSpinTriple),
        (TSpinKind::Full, _) => (0, ClearType::None),
    }
}

fn ordinary_clear_type(lines: u32) -> ClearType {
    match lines {
        0 => ClearType::None,
        1 => ClearType::Single,
        2 => ClearType::Double,
        3 => ClearType::Triple,
        _ => ClearType::Tetris,
    }
}

/// Calculate combo bonus.
///
/// - `-1`: no combo chain
/// - `0`: first clear in chain (no bonus)
/// - `1+`: bonus applies as `combo_base * combo`
pub fn combo_bonus(combo: i32) -> u32 {
    if combo <= 0 {
        return 0;
    }
    COMBO_BASE.saturating_mul(combo as u32)
}

/// B2B applies to: Tetrises, and non-mini T-Spins that clear lines
pub fn qualifies_for_b2b(tspin: TSpinKind, lines: u32) -> bool {
    lines >= 4 || (tspin == TSpinKind::Full && lines > 0)
}

/// soft: +1 per cell, hard: +2 per cell
pub fn drop_points(soft_steps: u32, hard_steps: u32) -> u32 {
    soft_steps.saturating_add(hard_steps.saturating_mul(2))
}

/// Running score, combo chain, and back-to-back flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreKeeper {
    score: u32,
    combo: i32,
    back_to_back: bool,
}

impl ScoreKeeper {
    pub fn new() -> Self {
        Self {
            score: 0,
            combo: -1,
            back_to_back: false,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo(&self) -> i32 {
        self.combo
    }

    pub fn back_to_back(&self) -> bool {
        self.back_to_back
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Add drop points outside of a lock
    pub fn add_drop_points(&mut self, soft_steps: u32, hard_steps: u32) -> u32 {
        let gain = drop_points(soft_steps, hard_steps);
        self.score = self.score.saturating_add(gain);
        gain
    }

    /// Score one lock and advance the combo / back-to-back state
    pub fn score_lock(&mut self, input: LockInput) -> LockScore {
        let lines = input.lines_cleared;
        let dropped = self.add_drop_points(input.soft_drop_steps, input.hard_drop_steps);

        let (mut base, clear_type) = match input.tspin {
            TSpinKind::None => (line_clear_points(lines), ordinary_clear_type(lines)),
            tspin => tspin_points(tspin, lines),
        };

        self.combo = if lines > 0 {
            if self.combo < 0 {
                0
            } else {
                self.combo + 1
            }
        } else {
            -1
        };
        let bonus = combo_bonus(self.combo);
        base = base.saturating_add(bonus);

        let eligible = qualifies_for_b2b(input.tspin, lines);
        let mut b2b_just_awarded = false;
        if eligible {
            if self.back_to_back {
                base = base.saturating_add(base / 2);
                b2b_just_awarded = true;
            }
            self.back_to_back = true;
        } else if lines > 0 {
            self.back_to_back = false;
        }

        self.score = self.score.saturating_add(base);

        LockScore {
            points: base.saturating_add(dropped),
            line_points: base,
            drop_points: dropped,
            combo_bonus: bonus,
            score: self.score,
            combo: self.combo,
            back_to_back: self.back_to_back,
            b2b_just_awarded,
            b2b_eligible: eligible,
            clear_type,
        }
    }
}

impl Default for ScoreKeeper {
    fn default() -> Self {
        Self::new()
    }
}
