//! Game state module - manages the complete game state
//!
//! Ties together the board, the active piece, the piece supply, scoring, and every timer.
//! One `GameState` is one game; nothing is global, so any number can run side by side.
//!
//! A frame always runs in the same order: intents, gravity, lock delay expiry, then the
//! line clear gate. While a clear is pending nothing but the clear animation advances.

use arrayvec::ArrayVec;
use log::{debug, info};
use serde::Serialize;

use crate::board::{Board, FullRows};
use crate::config::EngineConfig;
use crate::level::LevelProgress;
use crate::lock::{ClearJob, LockState};
use crate::pieces::Tetromino;
use crate::records::{BestRecords, RecordKeeper};
use crate::rng::Randomizer;
use crate::rotation::{RotationResolver, SrsResolver};
use crate::scoring::{LockInput, ScoreKeeper};
use crate::snapshot::{ActiveSnapshot, GameSnapshot, Phase};
use crate::tspin::{LastRotation, TSpinProbe, TSpinResult};
use crate::types::{
    ClearType, InputIntent, PieceKind, RandomizerMode, RotationDirection, MAX_PREVIEW,
};

/// Outcome of the most recent lock (consumed by observers)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockEvent {
    pub piece: PieceKind,
    pub lines_cleared: u32,
    pub rows: FullRows,
    pub tspin: TSpinResult,
    pub clear_type: ClearType,
    pub points: u32,
    pub line_points: u32,
    pub drop_points: u32,
    pub combo: i32,
    pub back_to_back: bool,
    pub b2b_just_awarded: bool,
    pub levels_gained: u32,
    pub level: u32,
    pub score: u32,
    pub record_improved: bool,
    /// Part of the piece locked above the visible board
    pub lock_out: bool,
}

/// Complete game state
#[derive(Debug)]
pub struct GameState<R = SrsResolver> {
    config: EngineConfig,
    resolver: R,
    board: Board,
    active: Option<Tetromino>,
    hold: Option<PieceKind>,
    can_hold: bool,
    randomizer: Randomizer,
    /// Cached lookahead, refreshed whenever the supply changes
    preview: ArrayVec<PieceKind, MAX_PREVIEW>,
    scoring: ScoreKeeper,
    progress: LevelProgress,
    lock: LockState,
    clear_job: Option<ClearJob>,
    last_rotation: Option<LastRotation>,
    drop_timer_ms: u32,
    soft_drop_held: bool,
    soft_drop_steps: u32,
    hard_drop_steps: u32,
    records: RecordKeeper,
    last_event: Option<LockEvent>,
    last_spawned: Option<PieceKind>,
    /// Monotonic episode id (increments on reset)
    episode_id: u32,
    /// Monotonic id for pieces drawn from the supply
    piece_id: u32,
    /// Unpaused play time
    elapsed_ms: u64,
    started: bool,
    paused: bool,
    over: bool,
}

impl GameState<SrsResolver> {
    /// Create a new game using the standard kick tables
    pub fn new(config: EngineConfig, seed: u32) -> Self {
        Self::with_resolver(config, seed, SrsResolver)
    }
}

impl Default for GameState<SrsResolver> {
    fn default() -> Self {
        Self::new(EngineConfig::default(), 1)
    }
}

impl<R: RotationResolver> GameState<R> {
    pub fn with_resolver(config: EngineConfig, seed: u32, resolver: R) -> Self {
        let config = config.sanitized();
        let mut state = Self {
            config,
            resolver,
            board: Board::new(),
            active: None,
            hold: None,
            can_hold: true,
            randomizer: Randomizer::new(config.randomizer, seed),
            preview: ArrayVec::new(),
            scoring: ScoreKeeper::new(),
            progress: LevelProgress::new(config.gravity),
            lock: LockState::default(),
            clear_job: None,
            last_rotation: None,
            drop_timer_ms: 0,
            soft_drop_held: false,
            soft_drop_steps: 0,
            hard_drop_steps: 0,
            records: RecordKeeper::default(),
            last_event: None,
            last_spawned: None,
            episode_id: 0,
            piece_id: 0,
            elapsed_ms: 0,
            started: false,
            paused: false,
            over: false,
        };
        state.refresh_preview();
        state
    }

    /// Track best records through `records` instead of an in-memory store
    pub fn with_records(mut self, records: RecordKeeper) -> Self {
        self.records = records;
        self
    }

    /// Start the game and spawn the first piece
    pub fn start(&mut self) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        info!(
            "game start: episode {} seed {} mode {}",
            self.episode_id,
            self.randomizer.seed(),
            self.randomizer.mode().as_str()
        );
        self.spawn();
        true
    }

    /// Throw the current game away and start over from `seed`.
    /// Best records survive.
    pub fn reset(&mut self, seed: u32) {
        let episode_id = self.episode_id.wrapping_add(1);
        info!("reset: episode {episode_id} seed {seed}");

        self.board.clear();
        self.active = None;
        self.hold = None;
        self.can_hold = true;
        self.randomizer.reset(seed);
        self.refresh_preview();
        self.scoring.reset();
        self.progress.reset();
        self.clear_job = None;
        self.reset_piece_state();
        self.soft_drop_held = false;
        self.last_event = None;
        self.last_spawned = None;
        self.episode_id = episode_id;
        self.piece_id = 0;
        self.elapsed_ms = 0;
        self.started = false;
        self.paused = false;
        self.over = false;

        self.start();
    }

    /// Reseed the piece supply; queued lookahead is regenerated, the board is kept
    pub fn set_seed(&mut self, seed: u32) {
        self.randomizer.reset(seed);
        self.refresh_preview();
    }

    /// Switch supply policy, keeping the current seed unless a new one is given
    pub fn set_mode(&mut self, mode: RandomizerMode, seed: Option<u32>) {
        let seed = seed.unwrap_or_else(|| self.randomizer.seed());
        self.randomizer.set_mode(mode, seed);
        self.config.randomizer = mode;
        self.refresh_preview();
    }

    pub fn set_paused(&mut self, paused: bool) -> bool {
        if !self.started || self.over || self.paused == paused {
            return false;
        }
        self.paused = paused;
        debug!("paused: {paused}");
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.set_paused(!self.paused)
    }

    /// Soft drop key state; while held gravity runs `soft_drop_multiplier` times faster
    pub fn set_soft_drop_held(&mut self, held: bool) {
        if self.soft_drop_held != held {
            self.soft_drop_held = held;
            self.drop_timer_ms = 0;
        }
    }

    /// Replace the stack, e.g. to set up a puzzle
    pub fn load_board(&mut self, board: Board) {
        self.board = board;
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn score(&self) -> u32 {
        self.scoring.score()
    }

    pub fn level(&self) -> u32 {
        self.progress.level()
    }

    pub fn lines(&self) -> u32 {
        self.progress.lines()
    }

    pub fn combo(&self) -> i32 {
        self.scoring.combo()
    }

    pub fn back_to_back(&self) -> bool {
        self.scoring.back_to_back()
    }

    pub fn seed(&self) -> u32 {
        self.randomizer.seed()
    }

    pub fn randomizer_mode(&self) -> RandomizerMode {
        self.randomizer.mode()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn hold_piece(&self) -> Option<PieceKind> {
        self.hold
    }

    pub fn next_queue(&self) -> &[PieceKind] {
        &self.preview
    }

    pub fn active(&self) -> Option<Tetromino> {
        self.active
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn lock_timer_ms(&self) -> u32 {
        self.lock.timer_ms
    }

    pub fn lock_reset_count(&self) -> u8 {
        self.lock.reset_count
    }

    pub fn last_rotation(&self) -> Option<LastRotation> {
        self.last_rotation
    }

    pub fn records(&self) -> BestRecords {
        self.records.records()
    }

    /// Kind of the most recent piece drawn from the supply
    pub fn last_spawned(&self) -> Option<PieceKind> {
        self.last_spawned
    }

    /// Rows waiting to collapse, empty when no clear is pending
    pub fn clearing_rows(&self) -> &[usize] {
        match &self.clear_job {
            Some(job) => job.rows(),
            None => &[],
        }
    }

    /// Take and clear the last lock event.
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    pub fn phase(&self) -> Phase {
        if self.over {
            return Phase::Over;
        }
        if !self.started {
            return Phase::NotStarted;
        }
        if self.clear_job.is_some() {
            return Phase::ClearPending;
        }
        match self.active {
            Some(piece) if piece.is_grounded(&self.board) => Phase::Locking,
            _ => Phase::Falling,
        }
    }

    /// Calculate the ghost piece Y position (where piece would land)
    pub fn ghost_y(&self) -> Option<i8> {
        let active = self.active?;
        Some(active.y + active.drop_distance(&self.board))
    }

    /// Current gravity interval, soft drop included
    pub fn fall_interval_ms(&self) -> u32 {
        let base = self.progress.fall_interval_ms();
        if self.soft_drop_held {
            (base / self.config.soft_drop_multiplier.max(1)).max(1)
        } else {
            base
        }
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.board.write_u8_grid(&mut out.grid);

        out.active = self.active.map(ActiveSnapshot::from);
        out.ghost_y = self.ghost_y();
        out.hold = self.hold;
        out.next_queue.clone_from(&self.preview);
        out.can_hold = self.can_hold;
        out.score = self.score();
        out.level = self.level();
        out.lines_cleared = self.lines();
        out.combo = self.combo();
        out.back_to_back = self.back_to_back();
        out.over = self.over;
        out.paused = self.paused;
        out.phase = self.phase();
        out.seed = self.randomizer.seed();
        out.randomizer_mode = self.randomizer.mode();
        out.clearing_rows.clear();
        out.clearing_rows
            .try_extend_from_slice(self.clearing_rows())
            .ok();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Inputs are only accepted for a live, unpaused piece outside the clear gate
    fn accepts_input(&self) -> bool {
        self.started
            && !self.paused
            && !self.over
            && self.clear_job.is_none()
            && self.active.is_some()
    }

    /// Apply one intent; returns whether anything changed
    pub fn apply_intent(&mut self, intent: InputIntent) -> bool {
        if !self.accepts_input() {
            return false;
        }
        match intent {
            InputIntent::Left => self.try_shift(-1),
            InputIntent::Right => self.try_shift(1),
            InputIntent::SoftDrop => self.soft_drop(),
            InputIntent::HardDrop => self.hard_drop(),
            InputIntent::RotateCw => self.try_rotate(RotationDirection::Clockwise),
            InputIntent::RotateCcw => self.try_rotate(RotationDirection::CounterClockwise),
            InputIntent::Hold => self.hold(),
        }
    }

    /// One frame: apply `intents` in order, then advance timers by `elapsed_ms`.
    /// A clear started during this frame begins counting on the next one.
    pub fn step(&mut self, intents: &[InputIntent], elapsed_ms: u32) -> bool {
        self.step_observed(intents, elapsed_ms, |_, _| {})
    }

    /// [`GameState::step`], reporting every intent together with whether it was accepted
    pub fn step_observed<F>(
        &mut self,
        intents: &[InputIntent],
        elapsed_ms: u32,
        mut observe: F,
    ) -> bool
    where
        F: FnMut(InputIntent, bool),
    {
        if !self.is_running() {
            return false;
        }
        let gate_was_closed = self.clear_job.is_some();
        let mut changed = false;
        for &intent in intents {
            let accepted = self.apply_intent(intent);
            observe(intent, accepted);
            changed |= accepted;
        }
        changed | self.advance(elapsed_ms, gate_was_closed)
    }

    /// Main game tick - gravity, lock delay, and the clear gate
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        self.step(&[], elapsed_ms)
    }

    fn is_running(&self) -> bool {
        self.started && !self.paused && !self.over
    }

    fn advance(&mut self, elapsed_ms: u32, gate_was_closed: bool) -> bool {
        if self.over {
            return false;
        }
        self.elapsed_ms = self.elapsed_ms.saturating_add(u64::from(elapsed_ms));

        if gate_was_closed {
            return self.advance_clear(elapsed_ms);
        }
        if self.clear_job.is_some() {
            // Created by an intent this frame.
            return false;
        }
        self.advance_piece(elapsed_ms)
    }

    fn advance_piece(&mut self, elapsed_ms: u32) -> bool {
        let Some(piece) = self.active else {
            return false;
        };

        if piece.is_grounded(&self.board) {
            self.drop_timer_ms = 0;
            if self.lock.advance(elapsed_ms, self.config.lock_delay_ms) {
                self.lock_piece();
                return true;
            }
            return false;
        }

        self.lock.lift();
        self.drop_timer_ms = self.drop_timer_ms.saturating_add(elapsed_ms);
        let interval = self.fall_interval_ms();
        let mut moved = false;
        while self.drop_timer_ms >= interval {
            self.drop_timer_ms -= interval;
            let Some(piece) = self.active else {
                break;
            };
            let next = piece.shifted(0, 1);
            if next.collides(&self.board) {
                self.drop_timer_ms = 0;
                break;
            }
            self.active = Some(next);
            moved = true;
            if self.soft_drop_held {
                self.soft_drop_steps += 1;
            }
        }
        moved
    }

    fn advance_clear(&mut self, elapsed_ms: u32) -> bool {
        let Some(job) = self.clear_job.as_mut() else {
            return false;
        };
        if job.advance(elapsed_ms) {
            if let Some(job) = self.clear_job.take() {
                self.board.collapse_rows(job.rows());
                debug!("collapsed rows {:?}", job.rows());
            }
            self.spawn();
        }
        true
    }

    fn reset_piece_state(&mut self) {
        self.lock.clear();
        self.last_rotation = None;
        self.drop_timer_ms = 0;
        self.soft_drop_steps = 0;
        self.hard_drop_steps = 0;
    }

    fn refresh_preview(&mut self) {
        let count = self.config.preview.min(MAX_PREVIEW);
        self.preview.clear();
        self.preview.extend(self.randomizer.peek(count));
    }

    /// Draw the next piece from the supply
    fn spawn(&mut self) -> bool {
        let kind = self.randomizer.next();
        self.refresh_preview();
        self.reset_piece_state();
        self.can_hold = true;
        self.last_spawned = Some(kind);

        let piece = Tetromino::new(kind);
        if piece.collides(&self.board) {
            self.top_out("spawn blocked");
            return false;
        }
        self.piece_id = self.piece_id.wrapping_add(1);
        self.active = Some(piece);
        debug!("spawn #{} {}", self.piece_id, kind.as_str());
        true
    }

    fn top_out(&mut self, reason: &str) {
        self.over = true;
        self.active = None;
        self.clear_job = None;
        self.records.update(self.score(), self.lines());
        info!(
            "game over ({reason}): score {} lines {} level {}",
            self.score(),
            self.lines(),
            self.level()
        );
    }

    /// Restart the lock timer after a move made on or onto the ground
    fn note_grounded_move(&mut self, before: &Tetromino, after: &Tetromino) {
        if before.is_grounded(&self.board) || after.is_grounded(&self.board) {
            self.lock.try_reset(self.config.lock_reset_limit);
        }
    }

    fn try_shift(&mut self, dx: i8) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        let moved = piece.shifted(dx, 0);
        if moved.collides(&self.board) {
            return false;
        }
        self.active = Some(moved);
        self.last_rotation = None;
        self.note_grounded_move(&piece, &moved);
        true
    }

    fn soft_drop(&mut self) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        let moved = piece.shifted(0, 1);
        if moved.collides(&self.board) {
            return false;
        }
        self.active = Some(moved);
        self.soft_drop_steps += 1;
        self.drop_timer_ms = 0;
        true
    }

    fn try_rotate(&mut self, direction: RotationDirection) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        let Some(outcome) = self
            .resolver
            .attempt_rotate(&piece, &self.board, direction)
        else {
            return false;
        };
        let turned = outcome.apply_to(&piece);
        self.active = Some(turned);
        self.last_rotation = Some(LastRotation {
            kick_index: outcome.kick_index,
            used_kick: outcome.used_kick,
        });
        self.note_grounded_move(&piece, &turned);
        true
    }

    /// Drop the active piece to the bottom and lock it
    fn hard_drop(&mut self) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        let distance = piece.drop_distance(&self.board);
        self.active = Some(piece.shifted(0, distance));
        self.hard_drop_steps = distance as u32;
        self.lock_piece();
        true
    }

    /// Swap active piece with hold piece
    fn hold(&mut self) -> bool {
        if !self.can_hold {
            return false;
        }
        let Some(active) = self.active.take() else {
            return false;
        };

        match self.hold.replace(active.kind) {
            Some(kind) => {
                self.reset_piece_state();
                let piece = Tetromino::new(kind);
                if piece.collides(&self.board) {
                    self.top_out("hold blocked");
                } else {
                    self.active = Some(piece);
                }
            }
            None => {
                self.spawn();
            }
        }

        self.can_hold = false;
        true
    }

    /// Lock the active piece onto the board and start the clear pipeline
    fn lock_piece(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };

        // Corners must be read before the piece becomes part of the stack.
        let probe = TSpinProbe::capture(&piece, &self.board, self.last_rotation);
        let inside = self.board.merge(&piece);
        let rows = self.board.full_rows();
        let lines = rows.len() as u32;
        let tspin = match probe {
            Some(probe) => probe.classify(rows.len()),
            None => TSpinResult {
                lines: lines as u8,
                ..TSpinResult::default()
            },
        };

        let (soft, hard) = if self.config.drop_points {
            (self.soft_drop_steps, self.hard_drop_steps)
        } else {
            (0, 0)
        };
        let scored = self.scoring.score_lock(LockInput {
            lines_cleared: lines,
            tspin: tspin.kind,
            soft_drop_steps: soft,
            hard_drop_steps: hard,
        });
        let levels_gained = self.progress.add_lines(lines);
        let record_improved = self.records.update(scored.score, self.progress.lines());

        debug!(
            "lock {} at ({}, {}): lines {} {:?} +{}",
            piece.kind.as_str(),
            piece.x,
            piece.y,
            lines,
            scored.clear_type,
            scored.points
        );
        if levels_gained > 0 {
            debug!("level up: {}", self.progress.level());
        }

        self.last_event = Some(LockEvent {
            piece: piece.kind,
            lines_cleared: lines,
            rows: rows.clone(),
            tspin,
            clear_type: scored.clear_type,
            points: scored.points,
            line_points: scored.line_points,
            drop_points: scored.drop_points,
            combo: scored.combo,
            back_to_back: scored.back_to_back,
            b2b_just_awarded: scored.b2b_just_awarded,
            levels_gained,
            level: self.progress.level(),
            score: scored.score,
            record_improved,
            lock_out: !inside,
        });
        self.reset_piece_state();

        if !inside {
            self.top_out("lock out");
            return;
        }
        if rows.is_empty() {
            self.spawn();
        } else {
            self.clear_job = Some(ClearJob::new(
                rows,
                self.config.clear_flash_ms,
                self.config.clear_impact_ms,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::PieceMatrix;
    use crate::types::{Rotation, TSpinKind, BOARD_WIDTH};

    fn started(seed: u32) -> GameState {
        let mut state = GameState::new(EngineConfig::default(), seed);
        state.start();
        state
    }

    /// Fill the bottom row around wherever the active piece would land, so that a hard drop
    /// completes exactly that row.
    fn prepare_single_clear(state: &mut GameState) {
        let piece = state.active.unwrap();
        let landed = piece.shifted(0, piece.drop_distance(&state.board));
        for x in 0..BOARD_WIDTH as i8 {
            if !landed.minos().any(|(mx, my)| mx == x && my == 19) {
                state.board.set(x, 19, Some(PieceKind::Z));
            }
        }
    }

    #[test]
    fn test_new_game_state() {
        let state = GameState::new(EngineConfig::default(), 12345);
        assert!(!state.started());
        assert!(!state.is_over());
        assert_eq!(state.score(), 0);
        assert_eq!(state.level(), 1);
        assert_eq!(state.combo(), -1);
        assert_eq!(state.phase(), Phase::NotStarted);
        assert!(state.active().is_none());
        assert_eq!(state.next_queue().len(), 5);
    }

    #[test]
    fn test_intents_ignored_before_start() {
        let mut state = GameState::new(EngineConfig::default(), 1);
        assert!(!state.apply_intent(InputIntent::Left));
        assert!(!state.tick(1000));
        assert_eq!(state.elapsed_ms(), 0);
    }

    #[test]
    fn test_start_spawns_first_preview_piece() {
        let mut state = GameState::new(EngineConfig::default(), 7);
        let first = state.next_queue()[0];
        assert!(state.start());
        assert!(!state.start());
        assert_eq!(state.active().unwrap().kind, first);
        assert_eq!(state.piece_id(), 1);
        assert_eq!(state.phase(), Phase::Falling);
    }

    #[test]
    fn test_gravity_moves_piece() {
        let mut state = started(3);
        let y = state.active().unwrap().y;
        assert!(!state.tick(699));
        assert!(state.tick(1));
        assert_eq!(state.active().unwrap().y, y + 1);
    }

    #[test]
    fn test_soft_drop_held_speeds_gravity_and_counts_steps() {
        let mut state = started(3);
        state.set_soft_drop_held(true);
        assert_eq!(state.fall_interval_ms(), 70);
        let y = state.active().unwrap().y;
        state.tick(140);
        assert_eq!(state.active().unwrap().y, y + 2);
        assert_eq!(state.soft_drop_steps, 2);
    }

    #[test]
    fn test_hold_once_per_piece() {
        let mut state = started(11);
        let first = state.active().unwrap().kind;
        let second = state.next_queue()[0];

        assert!(state.apply_intent(InputIntent::Hold));
        assert_eq!(state.hold_piece(), Some(first));
        assert_eq!(state.active().unwrap().kind, second);
        assert!(!state.can_hold());
        assert!(!state.apply_intent(InputIntent::Hold));

        state.apply_intent(InputIntent::HardDrop);
        assert!(state.can_hold());
        let third = state.active().unwrap().kind;
        assert!(state.apply_intent(InputIntent::Hold));
        assert_eq!(state.active().unwrap().kind, first);
        assert_eq!(state.hold_piece(), Some(third));
    }

    #[test]
    fn test_clear_gate_blocks_everything() {
        let mut state = started(5);
        prepare_single_clear(&mut state);

        assert!(state.step(&[InputIntent::HardDrop], 500));
        assert_eq!(state.phase(), Phase::ClearPending);
        assert_eq!(state.clearing_rows(), &[19]);
        assert!(state.active().is_none());
        // The job was created this frame, so it has not started counting.
        assert_eq!(state.clear_job.as_ref().unwrap().timer_ms(), 0);

        assert!(!state.apply_intent(InputIntent::Left));
        assert!(!state.apply_intent(InputIntent::Hold));
        state.tick(100);
        assert_eq!(state.phase(), Phase::ClearPending);
        state.tick(79);
        assert_eq!(state.phase(), Phase::ClearPending);
        state.tick(1);
        assert_ne!(state.phase(), Phase::ClearPending);
        assert!(state.active().is_some());
        assert_eq!(state.lines(), 1);
        assert!(!state.board().is_row_full(19));
    }

    #[test]
    fn test_tspin_double_scores_through_the_engine() {
        let mut state = started(9);
        let mut board = Board::new();
        for x in 0..BOARD_WIDTH as i8 {
            if x != 4 {
                board.set(x, 19, Some(PieceKind::I));
            }
            if !(3..=5).contains(&x) {
                board.set(x, 18, Some(PieceKind::I));
            }
        }
        board.set(3, 17, Some(PieceKind::I));
        state.load_board(board);
        state.active = Some(Tetromino {
            kind: PieceKind::T,
            matrix: PieceMatrix::for_rotation(PieceKind::T, Rotation::East),
            rotation: Rotation::East,
            x: 3,
            y: 17,
        });

        assert!(state.apply_intent(InputIntent::RotateCw));
        assert_eq!(state.active().unwrap().rotation, Rotation::South);
        assert!(state.apply_intent(InputIntent::HardDrop));

        let event = state.take_last_event().unwrap();
        assert_eq!(event.tspin.kind, TSpinKind::Full);
        assert_eq!(event.lines_cleared, 2);
        assert_eq!(event.clear_type, ClearType::TSpinDouble);
        assert_eq!(event.points, 1200);
        assert!(event.back_to_back);
        assert_eq!(state.clearing_rows(), &[18, 19]);
    }

    #[test]
    fn test_horizontal_move_clears_rotation_metadata() {
        let mut state = started(2);
        state.active = Some(Tetromino::new(PieceKind::T).shifted(0, 5));
        assert!(state.apply_intent(InputIntent::RotateCw));
        assert!(state.last_rotation().is_some());
        assert!(state.apply_intent(InputIntent::Left));
        assert!(state.last_rotation().is_none());
    }

    #[test]
    fn test_spawn_collision_is_game_over() {
        let mut state = started(4);
        let mut board = Board::new();
        for y in 0..4 {
            for x in 0..BOARD_WIDTH as i8 - 1 {
                board.set(x, y, Some(PieceKind::O));
            }
        }
        state.load_board(board);
        state.active = Some(Tetromino::new(PieceKind::O).shifted(4, 10));
        state.apply_intent(InputIntent::HardDrop);
        assert!(state.is_over());
        assert_eq!(state.phase(), Phase::Over);
        assert!(!state.apply_intent(InputIntent::Left));
        assert!(!state.tick(1000));
    }

    #[test]
    fn test_lock_out_above_the_board() {
        let mut state = started(4);
        let mut board = Board::new();
        for y in 0..20 {
            board.set(4, y, Some(PieceKind::I));
        }
        state.load_board(board);
        // A vertical I hanging above column 4 cannot fall any further.
        state.active = Some(Tetromino {
            kind: PieceKind::I,
            matrix: PieceMatrix::for_rotation(PieceKind::I, Rotation::East),
            rotation: Rotation::East,
            x: 2,
            y: -4,
        });
        state.apply_intent(InputIntent::HardDrop);
        let event = state.take_last_event().unwrap();
        assert!(event.lock_out);
        assert!(state.is_over());
    }

    #[test]
    fn test_pause_freezes_time() {
        let mut state = started(8);
        assert!(state.toggle_pause());
        assert!(!state.tick(5000));
        assert!(!state.apply_intent(InputIntent::Left));
        assert_eq!(state.elapsed_ms(), 0);
        assert!(state.set_paused(false));
        state.tick(16);
        assert_eq!(state.elapsed_ms(), 16);
    }

    #[test]
    fn test_reset_restarts_and_bumps_episode() {
        let mut state = started(8);
        state.apply_intent(InputIntent::HardDrop);
        assert!(state.score() > 0);
        state.reset(99);
        assert_eq!(state.episode_id(), 1);
        assert_eq!(state.seed(), 99);
        assert_eq!(state.score(), 0);
        assert_eq!(state.piece_id(), 1);
        assert!(state.started());
        assert!(state.board().top_filled_row().is_none());
    }

    #[test]
    fn test_set_mode_regenerates_preview() {
        let mut state = GameState::new(EngineConfig::default(), 21);
        state.set_mode(RandomizerMode::Double, Some(5));
        assert_eq!(state.randomizer_mode(), RandomizerMode::Double);
        assert_eq!(state.seed(), 5);
        let expected = crate::rng::generate_sequence(5, 5, RandomizerMode::Double);
        assert_eq!(state.next_queue(), expected.as_slice());
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut state = started(13);
        state.apply_intent(InputIntent::Hold);
        let snap = state.snapshot();
        assert_eq!(snap.hold, state.hold_piece());
        assert!(!snap.can_hold);
        assert_eq!(snap.next_queue.as_slice(), state.next_queue());
        assert_eq!(snap.ghost_y, state.ghost_y());
        assert_eq!(snap.seed, 13);
        assert_eq!(snap.phase, Phase::Falling);
        assert!(snap.playable());
    }
}
