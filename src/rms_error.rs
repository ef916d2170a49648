// Error kinds reported by board generation and game operations

use thiserror::Error;

/// Errors surfaced by the board generator and the game
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Rows, columns and mine count do not describe a playable board
    #[error("invalid board config: {rows}x{cols} with {mines} mines")]
    InvalidConfig {
        rows: usize,
        cols: usize,
        mines: usize,
    },

    /// Cell coordinates outside the current board
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} board")]
    OutOfBounds {
        row: isize,
        col: isize,
        rows: usize,
        cols: usize,
    },

    /// The cell storage for a board could not be allocated
    #[error("unable to allocate {cells} cells")]
    AllocationFailed { cells: usize },
}

pub type GameResult<T> = Result<T, GameError>;
