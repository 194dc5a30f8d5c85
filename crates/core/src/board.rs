//! Board module - manages the game grid
//!
//! The board is a 10x20 grid where each cell can be empty or filled with a piece kind.
//! Uses a flat array for better cache locality and zero-allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom).
//! Cells above row 0 are open space: pieces may hang there without colliding.

use arrayvec::ArrayVec;

use crate::pieces::Tetromino;
use crate::types::{Cell, PieceKind, BOARD_HEIGHT, BOARD_WIDTH, COLS, ROWS};

/// Total number of cells on the board
const BOARD_SIZE: usize = COLS * ROWS;

/// Row indices found full after a merge, sorted top to bottom
pub type FullRows = ArrayVec<usize, ROWS>;

/// True iff any mino of `piece` is outside the walls, below the floor, or on a filled cell.
/// Minos above the top row never collide.
pub fn collide(piece: &Tetromino, board: &Board) -> bool {
    piece.minos().any(|(x, y)| board.is_blocked(x, y))
}

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * COLS + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Grid tag at (x, y); 0 for empty or out of bounds
    pub fn tag(&self, x: i8, y: i8) -> u8 {
        match self.get(x, y) {
            Some(Some(kind)) => kind.tag(),
            _ => 0,
        }
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Collision test for a single cell: walls, floor, and filled cells block;
    /// open space above the board does not.
    pub fn is_blocked(&self, x: i8, y: i8) -> bool {
        if x < 0 || x >= BOARD_WIDTH as i8 || y >= BOARD_HEIGHT as i8 {
            return true;
        }
        y >= 0 && self.is_occupied(x, y)
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= ROWS {
            return false;
        }
        let start = y * COLS;
        self.cells[start..start + COLS].iter().all(|cell| cell.is_some())
    }

    /// Indices of all full rows, top to bottom
    pub fn full_rows(&self) -> FullRows {
        (0..ROWS).filter(|&y| self.is_row_full(y)).collect()
    }

    /// Write the piece's minos into the grid.
    ///
    /// Returns false when any mino lies above the top row (lock out); the minos that are on
    /// the board are still written.
    pub fn merge(&mut self, piece: &Tetromino) -> bool {
        let mut inside = true;
        for (x, y) in piece.minos() {
            if !self.set(x, y, Some(piece.kind)) {
                inside = false;
            }
        }
        inside
    }

    /// Remove the given rows and shift everything above them down.
    /// Uses a two-pointer pass with zero allocation; vacated top rows become empty.
    pub fn collapse_rows(&mut self, rows: &[usize]) -> usize {
        let mut write_y = ROWS;
        let mut removed = 0;

        // Scan from bottom to top
        for read_y in (0..ROWS).rev() {
            if rows.contains(&read_y) {
                removed += 1;
                continue;
            }
            write_y -= 1;
            if write_y != read_y {
                let src_start = read_y * COLS;
                self.cells
                    .copy_within(src_start..src_start + COLS, write_y * COLS);
            }
        }

        for cell in &mut self.cells[..write_y * COLS] {
            *cell = None;
        }

        removed
    }

    /// Remove every full row; returns the removed indices
    pub fn clear_full_rows(&mut self) -> FullRows {
        let rows = self.full_rows();
        self.collapse_rows(&rows);
        rows
    }

    /// Highest filled row index, or None for an empty board
    pub fn top_filled_row(&self) -> Option<usize> {
        (0..ROWS).find(|&y| self.cells[y * COLS..(y + 1) * COLS].iter().any(|c| c.is_some()))
    }

    /// Copy the board into a grid of tags (0 = empty)
    pub fn write_u8_grid(&self, out: &mut [[u8; COLS]; ROWS]) {
        for (y, row) in out.iter_mut().enumerate() {
            for (x, dst) in row.iter_mut().enumerate() {
                *dst = self.cells[y * COLS + x].map_or(0, PieceKind::tag);
            }
        }
    }

    /// Build a board from a grid of tags; unknown tags are treated as empty
    pub fn from_u8_grid(grid: &[[u8; COLS]; ROWS]) -> Self {
        let mut board = Self::new();
        for (y, row) in grid.iter().enumerate() {
            for (x, &tag) in row.iter().enumerate() {
                board.cells[y * COLS + x] = PieceKind::from_tag(tag);
            }
        }
        board
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
