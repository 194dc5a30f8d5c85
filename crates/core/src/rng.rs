//! RNG module - seeded piece supply
//!
//! Every supply policy is driven by [`Mulberry32`], a small 32-bit PRNG, so a seed fully
//! determines the infinite piece sequence. Three policies are available:
//!
//! - **bag**: each group of seven is a Fisher-Yates shuffle of all kinds, so the same kind
//!   never goes more than 12 pieces without appearing.
//! - **classic**: independent uniform draws, no fairness guarantee.
//! - **double**: two independently shuffled bags concatenated into a group of fourteen.
//!
//! The queue is refilled lazily, so peeking ahead never changes what [`Randomizer::next`]
//! returns later.

use std::collections::VecDeque;

use log::{debug, warn};

use crate::types::{PieceKind, RandomizerMode};

/// Mulberry32 generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let a = self.state;
        let mut t = (a ^ (a >> 15)).wrapping_mul(1 | a);
        t = (t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t))) ^ t;
        t ^ (t >> 14)
    }

    /// Uniform float in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        (self.next_f64() * max as f64) as u32
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// Fresh, non-deterministic seed for games that were not given one
pub fn create_seed() -> u32 {
    rand::random::<u32>()
}

/// Convert an untrusted numeric seed to `u32`.
///
/// Finite values wrap modulo 2^32 after truncation. NaN and infinities are replaced by a
/// fresh seed.
pub fn sanitize_seed(raw: f64) -> u32 {
    if !raw.is_finite() {
        let seed = create_seed();
        warn!("invalid seed {raw}, using generated seed {seed}");
        return seed;
    }
    raw.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// Parse a seed from text, replacing garbage with a fresh seed
pub fn parse_seed(text: &str) -> u32 {
    let text = text.trim();
    if let Ok(seed) = text.parse::<u32>() {
        return seed;
    }
    match text.parse::<f64>() {
        Ok(raw) => sanitize_seed(raw),
        Err(_) => {
            let seed = create_seed();
            warn!("unparseable seed {text:?}, using generated seed {seed}");
            seed
        }
    }
}

/// Seeded piece generator for one supply policy
#[derive(Debug, Clone)]
pub struct Randomizer {
    mode: RandomizerMode,
    seed: u32,
    rng: Mulberry32,
    /// Upcoming pieces in draw order
    queue: VecDeque<PieceKind>,
}

impl Randomizer {
    pub fn new(mode: RandomizerMode, seed: u32) -> Self {
        Self {
            mode,
            seed,
            rng: Mulberry32::new(seed),
            queue: VecDeque::with_capacity(14),
        }
    }

    pub fn mode(&self) -> RandomizerMode {
        self.mode
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Draw the next piece
    pub fn next(&mut self) -> PieceKind {
        if self.queue.is_empty() {
            self.refill();
        }
        match self.queue.pop_front() {
            Some(kind) => kind,
            // refill always pushes at least one piece
            None => PieceKind::I,
        }
    }

    /// Restart the sequence from `seed`, dropping any queued pieces
    pub fn reset(&mut self, seed: u32) -> u32 {
        self.seed = seed;
        self.rng = Mulberry32::new(seed);
        self.queue.clear();
        seed
    }

    /// Switch policy and restart from `seed`
    pub fn set_mode(&mut self, mode: RandomizerMode, seed: u32) {
        debug!("randomizer mode {} -> {} (seed {seed})", self.mode.as_str(), mode.as_str());
        self.mode = mode;
        self.reset(seed);
    }

    /// Remaining pieces of the current group, in draw order
    pub fn snapshot(&mut self) -> Vec<PieceKind> {
        if self.queue.is_empty() {
            self.refill();
        }
        self.queue.iter().copied().collect()
    }

    /// The next `count` pieces without consuming them
    pub fn peek(&mut self, count: usize) -> Vec<PieceKind> {
        while self.queue.len() < count {
            self.refill();
        }
        self.queue.iter().take(count).copied().collect()
    }

    fn refill(&mut self) {
        match self.mode {
            RandomizerMode::Bag => self.push_bag(),
            RandomizerMode::Classic => {
                let idx = self.rng.next_range(PieceKind::ALL.len() as u32) as usize;
                self.queue.push_back(PieceKind::ALL[idx]);
            }
            RandomizerMode::Double => {
                self.push_bag();
                self.push_bag();
            }
        }
    }

    fn push_bag(&mut self) {
        let mut bag = PieceKind::ALL;
        self.rng.shuffle(&mut bag);
        // Drawn from the back of the shuffled bag.
        self.queue.extend(bag.iter().rev().copied());
    }
}

impl Default for Randomizer {
    fn default() -> Self {
        Self::new(RandomizerMode::Bag, 1)
    }
}

/// Pure preview of the first `count` pieces for a seed and mode
pub fn generate_sequence(count: usize, seed: u32, mode: RandomizerMode) -> Vec<PieceKind> {
    let mut randomizer = Randomizer::new(mode, seed);
    (0..count).map(|_| randomizer.next()).collect()
}
