//! Pieces module - tetromino shapes and the active piece
//!
//! Each kind lives in a square box (I: 4x4, O: 2x2, the rest 3x3). Turning the box by
//! a quarter yields the next rotation state, so shapes for every orientation come from
//! rotating the spawn matrix rather than from a separate table.

use serde::{Deserialize, Serialize};

use crate::board::{collide, Board};
use crate::types::{PieceKind, Rotation, BOARD_WIDTH};

/// Offset of a single mino relative to piece origin
pub type MinoOffset = (i8, i8);

/// Largest box side used by any kind
pub const MAX_BOX: usize = 4;

/// Spawn-orientation minos and box size for a kind
fn spawn_layout(kind: PieceKind) -> (u8, [MinoOffset; 4]) {
    match kind {
        PieceKind::I => (4, [(0, 1), (1, 1), (2, 1), (3, 1)]),
        PieceKind::O => (2, [(0, 0), (1, 0), (0, 1), (1, 1)]),
        PieceKind::T => (3, [(1, 0), (0, 1), (1, 1), (2, 1)]),
        PieceKind::S => (3, [(1, 0), (2, 0), (0, 1), (1, 1)]),
        PieceKind::Z => (3, [(0, 0), (1, 0), (1, 1), (2, 1)]),
        PieceKind::J => (3, [(0, 0), (0, 1), (1, 1), (2, 1)]),
        PieceKind::L => (3, [(2, 0), (0, 1), (1, 1), (2, 1)]),
    }
}

/// Square occupancy box; each occupied cell holds the kind's grid tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceMatrix {
    size: u8,
    /// Row-major: `cells[y][x]`
    cells: [[u8; MAX_BOX]; MAX_BOX],
}

impl PieceMatrix {
    /// Matrix for `kind` in spawn orientation
    pub fn spawn(kind: PieceKind) -> Self {
        let (size, minos) = spawn_layout(kind);
        let mut cells = [[0u8; MAX_BOX]; MAX_BOX];
        for (x, y) in minos {
            cells[y as usize][x as usize] = kind.tag();
        }
        Self { size, cells }
    }

    /// Matrix for `kind` turned to `rotation`
    pub fn for_rotation(kind: PieceKind, rotation: Rotation) -> Self {
        let mut matrix = Self::spawn(kind);
        for _ in 0..rotation.index() {
            matrix = matrix.rotated_cw();
        }
        matrix
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    /// Tag at box coordinates, 0 outside the box
    pub fn get(&self, x: u8, y: u8) -> u8 {
        if x >= self.size || y >= self.size {
            return 0;
        }
        self.cells[y as usize][x as usize]
    }

    /// Quarter turn clockwise
    pub fn rotated_cw(&self) -> Self {
        let n = self.size as usize;
        let mut cells = [[0u8; MAX_BOX]; MAX_BOX];
        for (y, row) in cells.iter_mut().enumerate().take(n) {
            for (x, cell) in row.iter_mut().enumerate().take(n) {
                *cell = self.cells[n - 1 - x][y];
            }
        }
        Self {
            size: self.size,
            cells,
        }
    }

    /// Quarter turn counter-clockwise
    pub fn rotated_ccw(&self) -> Self {
        let n = self.size as usize;
        let mut cells = [[0u8; MAX_BOX]; MAX_BOX];
        for (y, row) in cells.iter_mut().enumerate().take(n) {
            for (x, cell) in row.iter_mut().enumerate().take(n) {
                *cell = self.cells[x][n - 1 - y];
            }
        }
        Self {
            size: self.size,
            cells,
        }
    }

    /// Occupied cells as `(dx, dy, tag)` relative to the box origin
    pub fn occupied(&self) -> impl Iterator<Item = (i8, i8, u8)> + '_ {
        let n = self.size as usize;
        (0..n).flat_map(move |y| {
            (0..n).filter_map(move |x| {
                let tag = self.cells[y][x];
                (tag != 0).then_some((x as i8, y as i8, tag))
            })
        })
    }

    /// The box as nested rows, for display and snapshots
    pub fn rows(&self) -> Vec<Vec<u8>> {
        let n = self.size as usize;
        self.cells[..n].iter().map(|row| row[..n].to_vec()).collect()
    }
}

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetromino {
    pub kind: PieceKind,
    pub matrix: PieceMatrix,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl Tetromino {
    /// Create a new tetromino at the spawn cell
    pub fn new(kind: PieceKind) -> Self {
        let matrix = PieceMatrix::spawn(kind);
        let (x, y) = spawn_position(&matrix);
        Self {
            kind,
            matrix,
            rotation: Rotation::North,
            x,
            y,
        }
    }

    /// Absolute board coordinates of every mino
    pub fn minos(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.matrix
            .occupied()
            .map(move |(dx, dy, _)| (self.x + dx, self.y + dy))
    }

    /// Copy shifted by `(dx, dy)`
    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn collides(&self, board: &Board) -> bool {
        collide(self, board)
    }

    /// Check if the piece is resting on the floor or the stack
    pub fn is_grounded(&self, board: &Board) -> bool {
        self.shifted(0, 1).collides(board)
    }

    /// Rows the piece could still fall before touching down
    pub fn drop_distance(&self, board: &Board) -> i8 {
        let mut distance = 0;
        while !self.shifted(0, distance + 1).collides(board) {
            distance += 1;
        }
        distance
    }
}

/// Spawn cell for a matrix: horizontally centered at the top row
pub fn spawn_position(matrix: &PieceMatrix) -> (i8, i8) {
    (((BOARD_WIDTH - matrix.size()) / 2) as i8, 0)
}
