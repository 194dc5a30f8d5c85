//! Engine configuration
//!
//! Every field has a default matching the stock game, so a partial JSON document (or none at
//! all) is enough. Values outside their legal range are clamped by [`EngineConfig::sanitized`]
//! rather than rejected.

use std::env;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::types::{
    RandomizerMode, BASE_FALL_MS, CLEAR_FLASH_MS, CLEAR_IMPACT_MS, DEFAULT_PREVIEW, FALL_STEP_MS,
    LINES_PER_LEVEL, LOCK_DELAY_MS, LOCK_RESET_LIMIT, MAX_PREVIEW, MIN_FALL_MS,
    SOFT_DROP_MULTIPLIER, START_LEVEL,
};

/// Level progression and fall speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityConfig {
    pub start_level: u32,
    pub lines_per_level: u32,
    pub base_ms: u32,
    pub step_ms: u32,
    pub min_ms: u32,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            start_level: START_LEVEL,
            lines_per_level: LINES_PER_LEVEL,
            base_ms: BASE_FALL_MS,
            step_ms: FALL_STEP_MS,
            min_ms: MIN_FALL_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upcoming pieces exposed in snapshots
    pub preview: usize,
    pub lock_delay_ms: u32,
    pub lock_reset_limit: u8,
    pub soft_drop_multiplier: u32,
    pub clear_flash_ms: u32,
    pub clear_impact_ms: u32,
    pub gravity: GravityConfig,
    /// Award soft/hard drop points
    pub drop_points: bool,
    pub randomizer: RandomizerMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preview: DEFAULT_PREVIEW,
            lock_delay_ms: LOCK_DELAY_MS,
            lock_reset_limit: LOCK_RESET_LIMIT,
            soft_drop_multiplier: SOFT_DROP_MULTIPLIER,
            clear_flash_ms: CLEAR_FLASH_MS,
            clear_impact_ms: CLEAR_IMPACT_MS,
            gravity: GravityConfig::default(),
            drop_points: true,
            randomizer: RandomizerMode::Bag,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring {key}={raw:?}: not a valid value");
            None
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    let raw = env::var(key).ok()?;
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!("ignoring {key}={raw:?}: expected a boolean");
            None
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `BLOCKFALL_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `BLOCKFALL_*` environment variables that are set and valid
    pub fn apply_env(&mut self) {
        if let Some(v) = env_parse("BLOCKFALL_PREVIEW") {
            self.preview = v;
        }
        if let Some(v) = env_parse("BLOCKFALL_LOCK_DELAY_MS") {
            self.lock_delay_ms = v;
        }
        if let Some(v) = env_parse("BLOCKFALL_LOCK_RESET_LIMIT") {
            self.lock_reset_limit = v;
        }
        if let Some(v) = env_parse("BLOCKFALL_SOFT_DROP_MULTIPLIER") {
            self.soft_drop_multiplier = v;
        }
        if let Some(v) = env_parse("BLOCKFALL_CLEAR_FLASH_MS") {
            self.clear_flash_ms = v;
        }
        if let Some(v) = env_parse("BLOCKFALL_CLEAR_IMPACT_MS") {
            self.clear_impact_ms = v;
        }
        if let Some(v) = env_parse("BLOCKFALL_START_LEVEL") {
            self.gravity.start_level = v;
        }
        if let Some(v) = env_flag("BLOCKFALL_DROP_POINTS") {
            self.drop_points = v;
        }
        if let Ok(mode) = env::var("BLOCKFALL_RANDOMIZER") {
            self.randomizer = RandomizerMode::parse(&mode);
        }
    }

    /// Clamp every field into the range the engine supports
    pub fn sanitized(mut self) -> Self {
        self.preview = self.preview.min(MAX_PREVIEW);
        self.soft_drop_multiplier = self.soft_drop_multiplier.max(1);
        self.gravity.lines_per_level = self.gravity.lines_per_level.max(1);
        self.gravity.min_ms = self.gravity.min_ms.max(1);
        self.gravity.base_ms = self.gravity.base_ms.max(self.gravity.min_ms);
        self
    }

    /// Total duration of the line clear animation gate
    pub fn clear_total_ms(&self) -> u32 {
        self.clear_flash_ms.saturating_add(self.clear_impact_ms)
    }
}
