//! Level and gravity progression

use serde::{Deserialize, Serialize};

use crate::config::GravityConfig;

/// Fall interval for `level` under `gravity`
pub fn fall_interval_for(gravity: &GravityConfig, level: u32) -> u32 {
    let gained = level.saturating_sub(gravity.start_level);
    gravity
        .base_ms
        .saturating_sub(gravity.step_ms.saturating_mul(gained))
        .max(gravity.min_ms)
}

/// Level for a cumulative line count
pub fn level_for_lines(gravity: &GravityConfig, lines: u32) -> u32 {
    gravity.start_level + lines / gravity.lines_per_level.max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    gravity: GravityConfig,
    level: u32,
    lines: u32,
    fall_interval_ms: u32,
}

impl LevelProgress {
    pub fn new(gravity: GravityConfig) -> Self {
        Self {
            gravity,
            level: gravity.start_level,
            lines: 0,
            fall_interval_ms: fall_interval_for(&gravity, gravity.start_level),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn fall_interval_ms(&self) -> u32 {
        self.fall_interval_ms
    }

    /// Count cleared lines; returns the number of levels gained
    pub fn add_lines(&mut self, cleared: u32) -> u32 {
        if cleared == 0 {
            return 0;
        }
        self.lines = self.lines.saturating_add(cleared);
        let level = level_for_lines(&self.gravity, self.lines);
        let gained = level.saturating_sub(self.level);
        if gained > 0 {
            self.level = level;
            self.fall_interval_ms = fall_interval_for(&self.gravity, level);
        }
        gained
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.gravity);
    }
}

impl Default for LevelProgress {
    fn default() -> Self {
        Self::new(GravityConfig::default())
    }
}
