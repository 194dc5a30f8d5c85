//! Replay recording and playback
//!
//! A replay is the seed and supply mode plus every input that actually changed the game,
//! stamped with the play time of the frame it was applied in. Feeding the same inputs back
//! with the same frame cadence reproduces the game exactly; the recorded piece kinds are
//! kept so a player can verify that.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::game_state::GameState;
use crate::rotation::{RotationResolver, SrsResolver};
use crate::types::{InputIntent, PieceKind, RandomizerMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReplayInput {
    Intent(InputIntent),
    /// Soft drop key pressed or released
    SoftDrop(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayAction {
    pub at_ms: u64,
    pub input: ReplayInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReplayData {
    pub seed: u32,
    pub mode: RandomizerMode,
    pub pieces: Vec<PieceKind>,
    pub actions: Vec<ReplayAction>,
}

/// Wraps a game and logs what happens to it
#[derive(Debug)]
pub struct Recorder<R = SrsResolver> {
    game: GameState<R>,
    data: ReplayData,
    soft_drop_held: bool,
}

impl<R: RotationResolver> Recorder<R> {
    pub fn new(game: GameState<R>) -> Self {
        let data = ReplayData {
            seed: game.seed(),
            mode: game.randomizer_mode(),
            ..ReplayData::default()
        };
        Self {
            game,
            data,
            soft_drop_held: false,
        }
    }

    pub fn game(&self) -> &GameState<R> {
        &self.game
    }

    pub fn data(&self) -> &ReplayData {
        &self.data
    }

    pub fn start(&mut self) -> bool {
        let before = self.game.piece_id();
        let started = self.game.start();
        self.note_spawn(before);
        started
    }

    /// Run one frame, logging the intents the game accepted
    pub fn step(&mut self, intents: &[InputIntent], elapsed_ms: u32) -> bool {
        let at_ms = self.game.elapsed_ms();
        let before = self.game.piece_id();
        let actions = &mut self.data.actions;
        let changed = self.game.step_observed(intents, elapsed_ms, |intent, accepted| {
            if accepted {
                actions.push(ReplayAction {
                    at_ms,
                    input: ReplayInput::Intent(intent),
                });
            }
        });
        self.note_spawn(before);
        changed
    }

    pub fn set_soft_drop_held(&mut self, held: bool) {
        if self.soft_drop_held == held {
            return;
        }
        self.soft_drop_held = held;
        self.game.set_soft_drop_held(held);
        self.data.actions.push(ReplayAction {
            at_ms: self.game.elapsed_ms(),
            input: ReplayInput::SoftDrop(held),
        });
    }

    /// Stop recording and hand back the game and its replay
    pub fn finish(self) -> (GameState<R>, ReplayData) {
        debug!(
            "replay finished: {} pieces, {} actions",
            self.data.pieces.len(),
            self.data.actions.len()
        );
        (self.game, self.data)
    }

    // At most one draw happens per call.
    fn note_spawn(&mut self, before: u32) {
        if self.game.piece_id() != before {
            if let Some(kind) = self.game.last_spawned() {
                self.data.pieces.push(kind);
            }
        }
    }
}

/// Feeds recorded inputs back on a time base
#[derive(Debug, Clone)]
pub struct ReplayPlayer {
    data: ReplayData,
    action_index: usize,
    piece_index: usize,
}

impl ReplayPlayer {
    pub fn new(data: ReplayData) -> Self {
        Self {
            data,
            action_index: 0,
            piece_index: 0,
        }
    }

    pub fn data(&self) -> &ReplayData {
        &self.data
    }

    /// A fresh game configured with the recorded seed and mode
    pub fn new_game(&self, config: EngineConfig) -> GameState {
        GameState::new(
            EngineConfig {
                randomizer: self.data.mode,
                ..config
            },
            self.data.seed,
        )
    }

    /// Inputs whose timestamp is at or before `now_ms`, in recorded order
    pub fn due(&mut self, now_ms: u64) -> Vec<ReplayInput> {
        let start = self.action_index;
        while self
            .data
            .actions
            .get(self.action_index)
            .is_some_and(|action| action.at_ms <= now_ms)
        {
            self.action_index += 1;
        }
        self.data.actions[start..self.action_index]
            .iter()
            .map(|action| action.input)
            .collect()
    }

    pub fn next_piece(&mut self) -> Option<PieceKind> {
        let kind = self.data.pieces.get(self.piece_index).copied()?;
        self.piece_index += 1;
        Some(kind)
    }

    pub fn is_finished(&self) -> bool {
        self.action_index >= self.data.actions.len()
    }

    /// Play one frame into `game`: due soft drop changes, then due intents, then time
    pub fn drive<R: RotationResolver>(&mut self, game: &mut GameState<R>, elapsed_ms: u32) -> bool {
        let mut intents = Vec::new();
        for input in self.due(game.elapsed_ms()) {
            match input {
                ReplayInput::SoftDrop(held) => game.set_soft_drop_held(held),
                ReplayInput::Intent(intent) => intents.push(intent),
            }
        }
        game.step(&intents, elapsed_ms)
    }
}
