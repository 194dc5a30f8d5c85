//! Lock delay and the line clear gate

use serde::{Deserialize, Serialize};

use crate::board::FullRows;

/// Lock delay timer for the active piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockState {
    pub timer_ms: u32,
    pub reset_count: u8,
}

impl LockState {
    /// Restart the timer if the piece still has resets left.
    /// Returns whether the timer was actually reset.
    pub fn try_reset(&mut self, limit: u8) -> bool {
        if self.reset_count >= limit {
            return false;
        }
        self.timer_ms = 0;
        self.reset_count += 1;
        true
    }

    /// Accumulate grounded time; true once `delay_ms` has elapsed
    pub fn advance(&mut self, elapsed_ms: u32, delay_ms: u32) -> bool {
        self.timer_ms = self.timer_ms.saturating_add(elapsed_ms);
        self.timer_ms >= delay_ms
    }

    /// Airborne: the timer stops, the reset budget does not come back
    pub fn lift(&mut self) {
        self.timer_ms = 0;
    }

    /// Fresh state for a new piece
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearStage {
    Flash,
    Impact,
}

/// Pending line clear. While one exists the rest of the engine is frozen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearJob {
    rows: FullRows,
    stage: ClearStage,
    timer_ms: u32,
    flash_ms: u32,
    impact_ms: u32,
}

impl ClearJob {
    pub fn new(rows: FullRows, flash_ms: u32, impact_ms: u32) -> Self {
        Self {
            rows,
            stage: ClearStage::Flash,
            timer_ms: 0,
            flash_ms,
            impact_ms,
        }
    }

    /// Rows to remove, sorted ascending
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn stage(&self) -> ClearStage {
        self.stage
    }

    pub fn timer_ms(&self) -> u32 {
        self.timer_ms
    }

    /// Advance the animation; true once the impact stage has run out and the rows should
    /// collapse. Leftover time from the flash stage carries into the impact stage.
    pub fn advance(&mut self, elapsed_ms: u32) -> bool {
        self.timer_ms = self.timer_ms.saturating_add(elapsed_ms);
        if self.stage == ClearStage::Flash {
            if self.timer_ms < self.flash_ms {
                return false;
            }
            self.timer_ms -= self.flash_ms;
            self.stage = ClearStage::Impact;
        }
        self.timer_ms >= self.impact_ms
    }
}
