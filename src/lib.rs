// Minesweeper game engine with a terminal front end
// The board and game modules carry all game state; the rest is presentation

pub mod rms_board;  // Board model, mine placement and adjacency counts
pub mod rms_config; // Persisted user configuration
pub mod rms_error;  // Error kinds shared by board and game
pub mod rms_game;   // Size presets, reveal/flag and win/loss evaluation
pub mod rms_theme;  // Colour themes and terminal colour matching
pub mod rms_ui;     // Terminal rendering and input handling

pub use rms_board::{Board, Cell, generate, generate_with_rng};
pub use rms_error::{GameError, GameResult};
pub use rms_game::{BoardSize, FlagOutcome, Game, GameConfig, GameStatus, RevealOutcome};
