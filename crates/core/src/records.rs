//! Best score / best lines bookkeeping
//!
//! Storage is behind [`RecordStore`] so a front end can persist records however it likes.
//! The engine only ever talks to a [`RecordKeeper`].

use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BestRecords {
    pub best_score: u32,
    pub best_lines: u32,
}

impl BestRecords {
    /// Fold a game result in; true when either record improved
    pub fn observe(&mut self, score: u32, lines: u32) -> bool {
        let mut improved = false;
        if score > self.best_score {
            self.best_score = score;
            improved = true;
        }
        if lines > self.best_lines {
            self.best_lines = lines;
            improved = true;
        }
        improved
    }
}

pub trait RecordStore {
    fn load(&self) -> BestRecords;
    fn save(&mut self, records: &BestRecords);
}

/// Store that keeps records for the lifetime of the value
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecords {
    records: BestRecords,
}

impl InMemoryRecords {
    pub fn new(records: BestRecords) -> Self {
        Self { records }
    }
}

impl RecordStore for InMemoryRecords {
    fn load(&self) -> BestRecords {
        self.records
    }

    fn save(&mut self, records: &BestRecords) {
        self.records = *records;
    }
}

/// Tracks records for a game and writes through to a store on improvement
pub struct RecordKeeper {
    current: BestRecords,
    store: Box<dyn RecordStore>,
}

impl RecordKeeper {
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        let current = store.load();
        Self { current, store }
    }

    pub fn records(&self) -> BestRecords {
        self.current
    }

    /// Check a running score/line total; saves and returns true when a record improved
    pub fn update(&mut self, score: u32, lines: u32) -> bool {
        if !self.current.observe(score, lines) {
            return false;
        }
        debug!(
            "new best: score {} lines {}",
            self.current.best_score, self.current.best_lines
        );
        self.store.save(&self.current);
        true
    }
}

impl Default for RecordKeeper {
    fn default() -> Self {
        Self::new(Box::new(InMemoryRecords::default()))
    }
}

impl std::fmt::Debug for RecordKeeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordKeeper")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_tracks_each_field() {
        let mut records = BestRecords::default();
        assert!(records.observe(100, 0));
        assert!(!records.observe(50, 0));
        assert!(records.observe(50, 3));
        assert_eq!(records, BestRecords { best_score: 100, best_lines: 3 });
    }

    #[test]
    fn keeper_loads_and_saves_on_improvement() {
        let store = InMemoryRecords::new(BestRecords {
            best_score: 500,
            best_lines: 4,
        });
        let mut keeper = RecordKeeper::new(Box::new(store));
        assert_eq!(keeper.records().best_score, 500);
        assert!(!keeper.update(400, 2));
        assert!(keeper.update(600, 2));
        assert_eq!(keeper.records().best_score, 600);
        assert_eq!(keeper.records().best_lines, 4);
    }
}
