//! Rotation resolvers - pluggable wall kick strategies
//!
//! The engine never decides on its own where a rotated piece ends up. It asks a
//! [`RotationResolver`], which either rejects the turn or returns the new matrix, position,
//! and which kick test succeeded. The kick index is kept on the piece afterwards because
//! T-Spin classification depends on it.

use crate::board::Board;
use crate::pieces::{PieceMatrix, Tetromino};
use crate::types::{PieceKind, Rotation, RotationDirection};

/// Accepted rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationOutcome {
    pub matrix: PieceMatrix,
    pub x: i8,
    pub y: i8,
    pub rotation: Rotation,
    /// Index of the kick test that fit (0 = rotated in place)
    pub kick_index: u8,
    pub used_kick: bool,
}

impl RotationOutcome {
    /// Apply the outcome to a piece
    pub fn apply_to(&self, piece: &Tetromino) -> Tetromino {
        Tetromino {
            kind: piece.kind,
            matrix: self.matrix,
            rotation: self.rotation,
            x: self.x,
            y: self.y,
        }
    }
}

/// Strategy deciding whether and where a piece may rotate
pub trait RotationResolver {
    fn attempt_rotate(
        &self,
        piece: &Tetromino,
        board: &Board,
        direction: RotationDirection,
    ) -> Option<RotationOutcome>;
}

/// Kick offsets tried in order; entry 0 is always (0, 0)
pub type KickTable = [[(i8, i8); 5]; 8];

/// JLSTZ kick table (shared by J, L, S, T, Z)
const JLSTZ_KICKS: KickTable = [
    // 0->1 (N->E, clockwise)
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 0->3 (N->W, counter-clockwise)
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // 1->0 (E->N, counter-clockwise)
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // 1->2 (E->S, clockwise)
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // 2->1 (S->E, counter-clockwise)
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 2->3 (S->W, clockwise)
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // 3->2 (W->S, counter-clockwise)
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // 3->0 (W->N, clockwise)
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

/// I piece kick table
const I_KICKS: KickTable = [
    // 0->1 (N->E)
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    // 0->3 (N->W)
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    // 1->0 (E->N)
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    // 1->2 (E->S)
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    // 2->1 (S->E)
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
    // 2->3 (S->W)
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    // 3->2 (W->S)
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    // 3->0 (W->N)
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
];

/// Row of the kick table for a rotation transition
fn kick_row(from: Rotation, direction: RotationDirection) -> usize {
    let clockwise = direction == RotationDirection::Clockwise;
    match (from, clockwise) {
        (Rotation::North, true) => 0,
        (Rotation::North, false) => 1,
        (Rotation::East, false) => 2,
        (Rotation::East, true) => 3,
        (Rotation::South, false) => 4,
        (Rotation::South, true) => 5,
        (Rotation::West, false) => 6,
        (Rotation::West, true) => 7,
    }
}

fn turned(piece: &Tetromino, direction: RotationDirection) -> (PieceMatrix, Rotation) {
    let matrix = match direction {
        RotationDirection::Clockwise => piece.matrix.rotated_cw(),
        RotationDirection::CounterClockwise => piece.matrix.rotated_ccw(),
    };
    (matrix, direction.apply(piece.rotation))
}

fn first_fit(
    piece: &Tetromino,
    board: &Board,
    direction: RotationDirection,
    kicks: &[(i8, i8)],
) -> Option<RotationOutcome> {
    let (matrix, rotation) = turned(piece, direction);
    kicks.iter().enumerate().find_map(|(index, &(dx, dy))| {
        let candidate = Tetromino {
            matrix,
            rotation,
            x: piece.x + dx,
            y: piece.y + dy,
            ..*piece
        };
        (!candidate.collides(board)).then_some(RotationOutcome {
            matrix,
            x: candidate.x,
            y: candidate.y,
            rotation,
            kick_index: index as u8,
            used_kick: index > 0,
        })
    })
}

/// Standard kick tables; the O piece does not rotate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SrsResolver;

impl SrsResolver {
    pub fn kick_table(kind: PieceKind) -> Option<&'static KickTable> {
        match kind {
            PieceKind::O => None,
            PieceKind::I => Some(&I_KICKS),
            _ => Some(&JLSTZ_KICKS),
        }
    }
}

impl RotationResolver for SrsResolver {
    fn attempt_rotate(
        &self,
        piece: &Tetromino,
        board: &Board,
        direction: RotationDirection,
    ) -> Option<RotationOutcome> {
        let table = Self::kick_table(piece.kind)?;
        let kicks = &table[kick_row(piece.rotation, direction)];
        first_fit(piece, board, direction, kicks)
    }
}

/// In-place rotation only, no kicks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasicResolver;

impl RotationResolver for BasicResolver {
    fn attempt_rotate(
        &self,
        piece: &Tetromino,
        board: &Board,
        direction: RotationDirection,
    ) -> Option<RotationOutcome> {
        if piece.kind == PieceKind::O {
            return None;
        }
        first_fit(piece, board, direction, &[(0, 0)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_in_place_on_open_board() {
        let board = Board::new();
        let mut piece = Tetromino::new(PieceKind::T);
        piece.y = 5;
        let out = SrsResolver
            .attempt_rotate(&piece, &board, RotationDirection::Clockwise)
            .unwrap();
        assert_eq!(out.rotation, Rotation::East);
        assert_eq!((out.x, out.y), (piece.x, piece.y));
        assert_eq!(out.kick_index, 0);
        assert!(!out.used_kick);
    }

    #[test]
    fn o_piece_never_rotates() {
        let board = Board::new();
        let piece = Tetromino::new(PieceKind::O);
        assert!(SrsResolver
            .attempt_rotate(&piece, &board, RotationDirection::Clockwise)
            .is_none());
        assert!(BasicResolver
            .attempt_rotate(&piece, &board, RotationDirection::CounterClockwise)
            .is_none());
    }

    #[test]
    fn kicks_off_the_left_wall() {
        let board = Board::new();
        // East-facing T flush against the left wall: turning clockwise would poke out.
        let piece = Tetromino {
            matrix: PieceMatrix::for_rotation(PieceKind::T, Rotation::East),
            rotation: Rotation::East,
            x: -1,
            y: 5,
            ..Tetromino::new(PieceKind::T)
        };
        assert!(!piece.collides(&board));

        assert!(BasicResolver
            .attempt_rotate(&piece, &board, RotationDirection::Clockwise)
            .is_none());

        let out = SrsResolver
            .attempt_rotate(&piece, &board, RotationDirection::Clockwise)
            .unwrap();
        assert_eq!(out.rotation, Rotation::South);
        assert!(out.used_kick);
        assert_eq!(out.kick_index, 1);
        assert_eq!(out.x, 0);
        assert!(!out.apply_to(&piece).collides(&board));
    }

    #[test]
    fn fully_boxed_piece_is_rejected() {
        let mut board = Board::new();
        for y in 0..20 {
            for x in 0..10 {
                board.set(x, y, Some(PieceKind::Z));
            }
        }
        for (x, y) in Tetromino::new(PieceKind::T).shifted(0, 8).minos() {
            board.set(x, y, None);
        }
        let piece = Tetromino::new(PieceKind::T).shifted(0, 8);
        assert!(SrsResolver
            .attempt_rotate(&piece, &board, RotationDirection::Clockwise)
            .is_none());
    }
}
