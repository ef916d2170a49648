// Game state: owns the board and applies player actions
// Handles size presets, new games, reveal/flag and win/loss evaluation

use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

use crate::rms_board::{Board, generate};
use crate::rms_error::GameResult;

/// Board size presets, cycled in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoardSize {
    #[default]
    Small,      // 5x5, 10 mines
    Medium,     // 19x19, 24 mines
    Large,      // 29x29, 36 mines
    ExtraLarge, // 39x39, 64 mines
}

/// Dimensions and mine count for one board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub mines: usize,
}

impl BoardSize {
    pub const ALL: [BoardSize; 4] = [
        BoardSize::Small,
        BoardSize::Medium,
        BoardSize::Large,
        BoardSize::ExtraLarge,
    ];

    pub fn config(&self) -> GameConfig {
        let (rows, cols, mines) = match self {
            BoardSize::Small => (5, 5, 10),
            BoardSize::Medium => (19, 19, 24),
            BoardSize::Large => (29, 29, 36),
            BoardSize::ExtraLarge => (39, 39, 64),
        };
        GameConfig { rows, cols, mines }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BoardSize::Small => "Small",
            BoardSize::Medium => "Medium",
            BoardSize::Large => "Large",
            BoardSize::ExtraLarge => "Extra Large",
        }
    }

    /// Next preset, wrapping from the last back to the first
    pub fn next(&self) -> BoardSize {
        match self {
            BoardSize::Small => BoardSize::Medium,
            BoardSize::Medium => BoardSize::Large,
            BoardSize::Large => BoardSize::ExtraLarge,
            BoardSize::ExtraLarge => BoardSize::Small,
        }
    }
}

/// Result of a reveal request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Unchanged, // already revealed or flagged
    Continue,
    Won,
    Lost,
}

/// Result of a flag request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOutcome {
    Flagged,
    Unchanged, // already flagged or revealed
}

/// First terminal outcome of the current board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

/// One game session: the board, the selected size and the seed source
pub struct Game {
    size: BoardSize,
    board: Board,
    status: GameStatus,
    seeds: StdRng,
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

impl Game {
    /// Start a game whose boards are seeded from the clock
    pub fn new(size: BoardSize) -> GameResult<Game> {
        Game::with_seed(size, time_seed())
    }

    /// Start a game whose sequence of boards is fully determined by `seed`
    pub fn with_seed(size: BoardSize, seed: u64) -> GameResult<Game> {
        let mut seeds = StdRng::seed_from_u64(seed);
        let cfg = size.config();
        let board = generate(cfg.rows, cfg.cols, cfg.mines, seeds.r#gen())?;
        info!("new {} game: {}x{} with {} mines", size.name(), cfg.rows, cfg.cols, cfg.mines);
        Ok(Game {
            size,
            board,
            status: GameStatus::Playing,
            seeds,
        })
    }

    /// Wrap a prepared board
    pub fn with_board(size: BoardSize, board: Board) -> Game {
        Game {
            size,
            board,
            status: GameStatus::Playing,
            seeds: StdRng::seed_from_u64(time_seed()),
        }
    }

    /// Replace the board with a fresh one of `size`
    pub fn new_game(&mut self, size: BoardSize) -> GameResult<()> {
        let seed = self.seeds.r#gen();
        self.new_custom_game(size.config(), seed)?;
        self.size = size;
        info!("new {} game", size.name());
        Ok(())
    }

    /// New game with the currently selected size
    pub fn restart(&mut self) -> GameResult<()> {
        self.new_game(self.size)
    }

    /// Replace the board with one built from `config` and `seed`.
    /// On error the current board is kept.
    pub fn new_custom_game(&mut self, config: GameConfig, seed: u64) -> GameResult<()> {
        let board = generate(config.rows, config.cols, config.mines, seed).map_err(|e| {
            warn!("new game rejected: {}", e);
            e
        })?;
        self.board = board;
        self.status = GameStatus::Playing;
        Ok(())
    }

    /// Select the next size preset; takes effect on the next new game
    pub fn cycle_size(&mut self) -> BoardSize {
        self.size = self.size.next();
        self.size
    }

    /// Reveal a single cell (no cascade)
    pub fn reveal(&mut self, row: isize, col: isize) -> GameResult<RevealOutcome> {
        let idx = self.board.checked_index(row, col).map_err(|e| {
            warn!("reveal rejected: {}", e);
            e
        })?;
        if !self.board.reveal_at(idx) {
            return Ok(RevealOutcome::Unchanged);
        }

        let outcome = if self.board.cells()[idx].is_mine() {
            info!("revealed a mine at row {} col {}: game over", row, col);
            RevealOutcome::Lost
        } else if self.board.all_safe_revealed() {
            info!(
                "all {} safe cells revealed: you win",
                self.board.cells().len() - self.board.mine_count()
            );
            RevealOutcome::Won
        } else {
            RevealOutcome::Continue
        };

        if self.status == GameStatus::Playing {
            match outcome {
                RevealOutcome::Won => self.status = GameStatus::Won,
                RevealOutcome::Lost => self.status = GameStatus::Lost,
                _ => (),
            }
        }
        Ok(outcome)
    }

    /// Place a flag on a covered cell. Flags are never removed.
    pub fn flag(&mut self, row: isize, col: isize) -> GameResult<FlagOutcome> {
        let idx = self.board.checked_index(row, col).map_err(|e| {
            warn!("flag rejected: {}", e);
            e
        })?;
        if self.board.flag_at(idx) {
            Ok(FlagOutcome::Flagged)
        } else {
            Ok(FlagOutcome::Unchanged)
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Selected size preset
    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != GameStatus::Playing
    }

    /// Mine counter display value; negative when over-flagged
    pub fn remaining_mines(&self) -> isize {
        self.board.mine_count() as isize - self.board.flagged_count() as isize
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rms_error::GameError;

    fn two_mine_game() -> Game {
        // mines on the diagonal corners of a 3x3
        let board = Board::with_mines(3, 3, &[(0, 0), (2, 2)]).unwrap();
        Game::with_board(BoardSize::Small, board)
    }

    fn revealed_flags(game: &Game) -> Vec<bool> {
        game.board().cells().iter().map(|c| c.is_revealed()).collect()
    }

    #[test]
    fn preset_sizes() {
        let test_cases = vec![
            (BoardSize::Small, 5, 5, 10),
            (BoardSize::Medium, 19, 19, 24),
            (BoardSize::Large, 29, 29, 36),
            (BoardSize::ExtraLarge, 39, 39, 64),
        ];
        for (size, rows, cols, mines) in test_cases {
            let game = Game::with_seed(size, 3).unwrap();
            assert_eq!(game.board().rows(), rows);
            assert_eq!(game.board().cols(), cols);
            assert_eq!(game.board().mine_count(), mines);
            assert_eq!(size.config(), GameConfig { rows, cols, mines });
        }
    }

    #[test]
    fn size_cycle_wraps() {
        let mut game = Game::with_seed(BoardSize::Small, 1).unwrap();
        assert_eq!(game.cycle_size(), BoardSize::Medium);
        assert_eq!(game.cycle_size(), BoardSize::Large);
        assert_eq!(game.cycle_size(), BoardSize::ExtraLarge);
        assert_eq!(game.cycle_size(), BoardSize::Small);
        for size in BoardSize::ALL {
            assert_ne!(size.next(), size);
        }
    }

    #[test]
    fn cycle_size_does_not_touch_board() {
        let mut game = Game::with_seed(BoardSize::Small, 1).unwrap();
        game.cycle_size();
        assert_eq!(game.board().rows(), 5);
        game.restart().unwrap();
        assert_eq!(game.board().rows(), 19);
        assert_eq!(game.size(), BoardSize::Medium);
    }

    #[test]
    fn new_game_resets_state() {
        let mut game = two_mine_game();
        game.reveal(0, 0).unwrap();
        assert_eq!(game.status(), GameStatus::Lost);
        game.new_game(BoardSize::Medium).unwrap();
        assert_eq!(game.status(), GameStatus::Playing);
        assert_eq!(game.board().revealed_count(), 0);
        assert_eq!(game.board().rows(), 19);
    }

    #[test]
    fn same_seed_same_games() {
        let mut a = Game::with_seed(BoardSize::Medium, 99).unwrap();
        let mut b = Game::with_seed(BoardSize::Medium, 99).unwrap();
        assert_eq!(a.board().cells(), b.board().cells());
        a.restart().unwrap();
        b.restart().unwrap();
        assert_eq!(a.board().cells(), b.board().cells());
    }

    #[test]
    fn invalid_new_game_keeps_previous_board() {
        let mut game = two_mine_game();
        game.reveal(1, 1).unwrap();
        let before = game.board().cells().to_vec();
        let bad = GameConfig { rows: 0, cols: 5, mines: 1 };
        assert_eq!(
            game.new_custom_game(bad, 7).unwrap_err(),
            GameError::InvalidConfig { rows: 0, cols: 5, mines: 1 }
        );
        assert_eq!(game.board().cells(), &before[..]);
    }

    #[test]
    fn reveal_twice_is_unchanged() {
        let mut game = two_mine_game();
        assert_eq!(game.reveal(1, 1).unwrap(), RevealOutcome::Continue);
        let before = revealed_flags(&game);
        assert_eq!(game.reveal(1, 1).unwrap(), RevealOutcome::Unchanged);
        assert_eq!(revealed_flags(&game), before);
    }

    #[test]
    fn reveal_flagged_is_unchanged() {
        let mut game = two_mine_game();
        game.flag(0, 0).unwrap();
        assert_eq!(game.reveal(0, 0).unwrap(), RevealOutcome::Unchanged);
        let cell = game.board().get(0, 0).unwrap();
        assert!(cell.is_flagged());
        assert!(!cell.is_revealed());
        assert_eq!(game.status(), GameStatus::Playing);
    }

    #[test]
    fn reveal_mine_loses_and_touches_nothing_else() {
        let mut game = two_mine_game();
        game.reveal(0, 1).unwrap();
        assert_eq!(game.reveal(2, 2).unwrap(), RevealOutcome::Lost);
        assert_eq!(game.status(), GameStatus::Lost);
        assert!(game.is_over());
        let revealed: Vec<(usize, usize)> = (0..3)
            .flat_map(|r| (0..3).map(move |c| (r, c)))
            .filter(|&(r, c)| game.board().get(r, c).unwrap().is_revealed())
            .collect();
        assert_eq!(revealed, vec![(0, 1), (2, 2)]);
    }

    #[test]
    fn win_only_on_last_safe_cell() {
        let mut game = two_mine_game();
        let safe: Vec<(isize, isize)> = vec![(0, 1), (0, 2), (1, 0), (1, 1), (1, 2), (2, 0), (2, 1)];
        let last = safe.len() - 1;
        for (i, &(r, c)) in safe.iter().enumerate() {
            let outcome = game.reveal(r, c).unwrap();
            if i == last {
                assert_eq!(outcome, RevealOutcome::Won);
            } else {
                assert_eq!(outcome, RevealOutcome::Continue);
            }
        }
        assert_eq!(game.status(), GameStatus::Won);
    }

    #[test]
    fn status_keeps_first_terminal_outcome() {
        let mut game = two_mine_game();
        assert_eq!(game.reveal(0, 0).unwrap(), RevealOutcome::Lost);
        let safe = [(0, 1), (0, 2), (1, 0), (1, 1), (1, 2), (2, 0), (2, 1)];
        let last = safe.len() - 1;
        for (i, &(r, c)) in safe.iter().enumerate() {
            let outcome = game.reveal(r, c).unwrap();
            // the revealed mine must not make the win come one cell early
            if i == last {
                assert_eq!(outcome, RevealOutcome::Won, "reveal ({}, {})", r, c);
            } else {
                assert_eq!(outcome, RevealOutcome::Continue, "reveal ({}, {})", r, c);
            }
        }
        assert_eq!(game.status(), GameStatus::Lost);
    }

    #[test]
    fn flag_rules() {
        let mut game = two_mine_game();
        game.reveal(1, 1).unwrap();
        assert_eq!(game.flag(1, 1).unwrap(), FlagOutcome::Unchanged);
        assert!(!game.board().get(1, 1).unwrap().is_flagged());

        assert_eq!(game.flag(0, 0).unwrap(), FlagOutcome::Flagged);
        assert_eq!(game.flag(0, 0).unwrap(), FlagOutcome::Unchanged);
        assert!(game.board().get(0, 0).unwrap().is_flagged());
        assert_eq!(game.board().flagged_count(), 1);
    }

    #[test]
    fn remaining_mines_counts_flags() {
        let mut game = two_mine_game();
        assert_eq!(game.remaining_mines(), 2);
        game.flag(0, 0).unwrap();
        game.flag(0, 1).unwrap();
        game.flag(0, 2).unwrap();
        assert_eq!(game.remaining_mines(), -1);
    }

    #[test]
    fn out_of_bounds_mutates_nothing() {
        let mut game = two_mine_game();
        let before = game.board().cells().to_vec();
        for &(r, c) in [(3, 0), (0, 3), (-1, 0), (0, -1), (3, 3)].iter() {
            assert!(matches!(game.reveal(r, c), Err(GameError::OutOfBounds { .. })));
            assert!(matches!(game.flag(r, c), Err(GameError::OutOfBounds { .. })));
        }
        assert_eq!(game.board().cells(), &before[..]);
        assert_eq!(game.status(), GameStatus::Playing);
    }
}
