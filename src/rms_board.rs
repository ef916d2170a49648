// Board model and generation
// Allocates the cell grid, places mines and computes adjacency counts

use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::debug;

use crate::rms_error::{GameError, GameResult};

/// A single position on the board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    mine: bool,     // Contains a mine, fixed at generation
    adj: u8,        // Adjacent mine count (0-8), fixed at generation
    revealed: bool, // Exposed by the player, never reverts
    flagged: bool,  // Marked as a suspected mine
}

impl Cell {
    pub fn is_mine(&self) -> bool {
        self.mine
    }

    pub fn adjacent_mines(&self) -> u8 {
        self.adj
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    /// Neither revealed nor flagged
    pub fn is_covered(&self) -> bool {
        !self.revealed && !self.flagged
    }
}

/// Rectangular grid of cells stored row-major
#[derive(Debug, Clone)]
pub struct Board {
    rows: usize,
    cols: usize,
    mines: usize,
    cells: Vec<Cell>,
}

/// Build a board of `rows` x `cols` with `mine_count` mines placed from `seed`.
/// The same arguments always produce the same board.
pub fn generate(rows: usize, cols: usize, mine_count: usize, seed: u64) -> GameResult<Board> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_with_rng(rows, cols, mine_count, &mut rng)
}

/// Build a board drawing mine positions from the supplied random source
pub fn generate_with_rng<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    mine_count: usize,
    rng: &mut R,
) -> GameResult<Board> {
    check_config(rows, cols, mine_count)?;
    let mut board = Board::empty(rows, cols)?;
    board.place_mines(mine_count, rng);
    board.count_adjacent();
    Ok(board)
}

/// At least one cell and at least one safe cell
fn check_config(rows: usize, cols: usize, mines: usize) -> GameResult<usize> {
    match rows.checked_mul(cols) {
        Some(n) if rows > 0 && cols > 0 && mines < n => Ok(n),
        _ => Err(GameError::InvalidConfig { rows, cols, mines }),
    }
}

impl Board {
    fn empty(rows: usize, cols: usize) -> GameResult<Board> {
        let n = rows * cols;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(n)
            .map_err(|_| GameError::AllocationFailed { cells: n })?;
        cells.resize(n, Cell::default());
        Ok(Board {
            rows,
            cols,
            mines: 0,
            cells,
        })
    }

    /// Build a board with mines at fixed positions.
    /// Repeated positions count once.
    pub fn with_mines(rows: usize, cols: usize, positions: &[(usize, usize)]) -> GameResult<Board> {
        check_config(rows, cols, 0)?;
        let mut board = Board::empty(rows, cols)?;
        for &(row, col) in positions {
            if row >= rows || col >= cols {
                return Err(GameError::OutOfBounds {
                    row: row as isize,
                    col: col as isize,
                    rows,
                    cols,
                });
            }
            let idx = board.index(row, col);
            if !board.cells[idx].mine {
                board.cells[idx].mine = true;
                board.mines += 1;
            }
        }
        check_config(rows, cols, board.mines)?;
        board.count_adjacent();
        Ok(board)
    }

    // Rejection sampling: a draw that hits an existing mine is retried
    fn place_mines<R: Rng + ?Sized>(&mut self, mine_count: usize, rng: &mut R) {
        let n = self.cells.len();
        let mut placed = 0;
        while placed < mine_count {
            let i = rng.gen_range(0..n);
            if self.cells[i].mine {
                continue;
            }
            self.cells[i].mine = true;
            placed += 1;
            debug!(
                "placed mine {} of {} at row {} col {}",
                placed,
                mine_count,
                i / self.cols,
                i % self.cols
            );
        }
        self.mines = mine_count;
    }

    // Must run after every mine is placed
    fn count_adjacent(&mut self) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let adj = self
                    .neighbors(row, col)
                    .filter(|&(r, c)| self.cells[self.index(r, c)].mine)
                    .count() as u8;
                let idx = self.index(row, col);
                self.cells[idx].adj = adj;
            }
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn mine_count(&self) -> usize {
        self.mines
    }

    /// Convert (row, col) to the flat row-major index
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Flat index for signed coordinates, rejecting anything off the board
    pub fn checked_index(&self, row: isize, col: isize) -> GameResult<usize> {
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            return Err(GameError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.index(row as usize, col as usize))
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        if row < self.rows && col < self.cols {
            self.cells.get(self.index(row, col))
        } else {
            None
        }
    }

    pub fn cell(&self, row: isize, col: isize) -> GameResult<&Cell> {
        let idx = self.checked_index(row, col)?;
        Ok(&self.cells[idx])
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// In-bounds positions around (row, col), excluding the cell itself.
    /// Edge and corner cells yield fewer than eight.
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
        let (rows, cols) = (self.rows, self.cols);
        (row.saturating_sub(1)..=(row + 1).min(rows - 1))
            .flat_map(move |r| {
                (col.saturating_sub(1)..=(col + 1).min(cols - 1)).map(move |c| (r, c))
            })
            .filter(move |&(r, c)| !(r == row && c == col))
    }

    pub fn revealed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.revealed).count()
    }

    pub fn flagged_count(&self) -> usize {
        self.cells.iter().filter(|c| c.flagged).count()
    }

    /// Every non-mine cell is revealed
    pub fn all_safe_revealed(&self) -> bool {
        let safe_revealed = self.cells.iter().filter(|c| c.revealed && !c.mine).count();
        safe_revealed + self.mines == self.cells.len()
    }

    /// Returns false if the cell was already revealed or is flagged
    pub(crate) fn reveal_at(&mut self, idx: usize) -> bool {
        let cell = &mut self.cells[idx];
        if cell.revealed || cell.flagged {
            return false;
        }
        cell.revealed = true;
        true
    }

    /// Returns false if the cell is revealed or already flagged
    pub(crate) fn flag_at(&mut self, idx: usize) -> bool {
        let cell = &mut self.cells[idx];
        if cell.revealed || cell.flagged {
            return false;
        }
        cell.flagged = true;
        true
    }
}
