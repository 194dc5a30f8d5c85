//! T-Spin detection
//!
//! Runs against the board *before* the T piece is merged. Two facts are captured at that
//! point (how many of the four box corners are blocked, and whether the cell in front of
//! the pivot is blocked) and combined with the line count once rows have been scanned.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::pieces::Tetromino;
use crate::types::{PieceKind, Rotation, TSpinKind};

/// Kick metadata kept from the last successful rotation of the active piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LastRotation {
    pub kick_index: u8,
    pub used_kick: bool,
}

impl LastRotation {
    /// Kicks from the third table entry onwards move the piece far enough to count
    pub fn is_aggressive(&self) -> bool {
        self.kick_index >= 2
    }
}

/// Classification with the facts that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TSpinResult {
    pub kind: TSpinKind,
    pub corners: u8,
    pub front_filled: bool,
    pub lines: u8,
}

/// Pre-merge observation of a locking T piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TSpinProbe {
    pub corners: u8,
    pub front_filled: bool,
    pub rotation: LastRotation,
}

const CORNERS: [(i8, i8); 4] = [(0, 0), (2, 0), (0, 2), (2, 2)];

fn front_offset(rotation: Rotation) -> (i8, i8) {
    match rotation {
        Rotation::North => (0, -1),
        Rotation::East => (1, 0),
        Rotation::South => (0, 1),
        Rotation::West => (-1, 0),
    }
}

impl TSpinProbe {
    /// Observe the board around `piece`. Returns None unless the piece is a T whose last
    /// successful action was a rotation.
    pub fn capture(piece: &Tetromino, board: &Board, last: Option<LastRotation>) -> Option<Self> {
        if piece.kind != PieceKind::T {
            return None;
        }
        let rotation = last?;

        let corners = CORNERS
            .iter()
            .filter(|&&(dx, dy)| board.is_blocked(piece.x + dx, piece.y + dy))
            .count() as u8;

        let (fx, fy) = front_offset(piece.rotation);
        let front_filled = board.is_blocked(piece.x + 1 + fx, piece.y + 1 + fy);

        Some(Self {
            corners,
            front_filled,
            rotation,
        })
    }

    /// Combine the observation with the number of lines the lock cleared
    pub fn classify(&self, lines: usize) -> TSpinResult {
        let kind = if self.corners < 3 {
            TSpinKind::None
        } else if lines >= 2 {
            TSpinKind::Full
        } else if self.front_filled || (self.rotation.is_aggressive() && lines == 1) {
            TSpinKind::Full
        } else {
            // An aggressive kick with nothing cleared stays mini.
            TSpinKind::Mini
        };
        TSpinResult {
            kind,
            corners: self.corners,
            front_filled: self.front_filled,
            lines: lines.min(u8::MAX as usize) as u8,
        }
    }
}

/// Classify a T piece that is about to lock on `board` (pre-merge) and clear `lines`
pub fn detect_tspin(
    piece: &Tetromino,
    board: &Board,
    last: Option<LastRotation>,
    lines: usize,
) -> TSpinResult {
    match TSpinProbe::capture(piece, board, last) {
        Some(probe) => probe.classify(lines),
        None => TSpinResult {
            lines: lines.min(u8::MAX as usize) as u8,
            ..TSpinResult::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::PieceMatrix;

    fn t_at(rotation: Rotation, x: i8, y: i8) -> Tetromino {
        Tetromino {
            kind: PieceKind::T,
            matrix: PieceMatrix::for_rotation(PieceKind::T, rotation),
            rotation,
            x,
            y,
        }
    }

    fn rot(kick_index: u8) -> Option<LastRotation> {
        Some(LastRotation {
            kick_index,
            used_kick: kick_index > 0,
        })
    }

    /// South-facing T at (3, 10) with corners (3,10), (5,10), (3,12) filled.
    fn three_corner_board() -> (Board, Tetromino) {
        let mut board = Board::new();
        board.set(3, 10, Some(PieceKind::I));
        board.set(5, 10, Some(PieceKind::I));
        board.set(3, 12, Some(PieceKind::I));
        (board, t_at(Rotation::South, 3, 10))
    }

    #[test]
    fn non_t_or_unrotated_is_none() {
        let (board, t) = three_corner_board();
        let o = Tetromino {
            kind: PieceKind::O,
            ..t
        };
        assert_eq!(detect_tspin(&o, &board, rot(0), 1).kind, TSpinKind::None);
        assert_eq!(detect_tspin(&t, &board, None, 1).kind, TSpinKind::None);
    }

    #[test]
    fn two_corners_is_none() {
        let mut board = Board::new();
        board.set(3, 10, Some(PieceKind::I));
        board.set(5, 10, Some(PieceKind::I));
        let t = t_at(Rotation::South, 3, 10);
        let result = detect_tspin(&t, &board, rot(0), 1);
        assert_eq!(result.kind, TSpinKind::None);
        assert_eq!(result.corners, 2);
    }

    #[test]
    fn walls_and_floor_count_as_corners() {
        let board = Board::new();
        // North-facing T in the bottom-left corner: left corners off the wall, bottom row
        // corners under the floor.
        let t = t_at(Rotation::North, -1, 18);
        let result = detect_tspin(&t, &board, rot(0), 0);
        assert_eq!(result.corners, 3);
    }

    #[test]
    fn front_filled_is_full() {
        let (mut board, t) = three_corner_board();
        // South-facing pivot is (4, 11); front is (4, 12).
        board.set(4, 12, Some(PieceKind::I));
        let result = detect_tspin(&t, &board, rot(0), 0);
        assert_eq!(result.kind, TSpinKind::Full);
        assert!(result.front_filled);
    }

    #[test]
    fn mild_kick_single_is_mini() {
        let (board, t) = three_corner_board();
        assert_eq!(detect_tspin(&t, &board, rot(1), 1).kind, TSpinKind::Mini);
    }

    #[test]
    fn aggressive_kick_single_is_full() {
        let (board, t) = three_corner_board();
        assert_eq!(detect_tspin(&t, &board, rot(2), 1).kind, TSpinKind::Full);
        assert_eq!(detect_tspin(&t, &board, rot(4), 1).kind, TSpinKind::Full);
    }

    #[test]
    fn aggressive_kick_without_lines_stays_mini() {
        let (board, t) = three_corner_board();
        assert_eq!(detect_tspin(&t, &board, rot(3), 0).kind, TSpinKind::Mini);
    }

    #[test]
    fn two_or_more_lines_always_full() {
        let (board, t) = three_corner_board();
        assert_eq!(detect_tspin(&t, &board, rot(0), 2).kind, TSpinKind::Full);
        assert_eq!(detect_tspin(&t, &board, rot(1), 3).kind, TSpinKind::Full);
    }
}
