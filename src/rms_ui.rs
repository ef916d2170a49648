use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{QueueableCommand, cursor, terminal};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::error::Error;
use std::io::{self, Stdout, Write};
use std::time::Duration;
use tracing::{debug, info};
use unicode_width::UnicodeWidthStr;

use crate::rms_board::Cell;
use crate::rms_config::{Config, save_config};
use crate::rms_game::{Game, GameStatus, RevealOutcome};
use crate::rms_theme::{Palette, Theme};

// Key labels shown in the menu row (key, action)
const MENU_ITEMS: [(&str, &str); 6] = [
    ("Space", "Reveal"),
    ("F", "Flag"),
    ("N", "New"),
    ("S", "Size"),
    ("1-8", "Theme"),
    ("Esc", "Exit"),
];

/// What a single input event asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Reveal(usize, usize),
    Flag(usize, usize),
    Move(isize, isize),
    NewGame,
    ChangeSize,
    SetTheme(Theme),
    Quit,
}

// Runtime UI variables
struct UiState {
    cursor: (usize, usize),   // keyboard cursor (row, col)
    board_rect: Option<Rect>, // last drawn board area, for pointer mapping
    palette: Palette,
}

impl UiState {
    fn new(theme: Theme) -> Self {
        UiState {
            cursor: (0, 0),
            board_rect: None,
            palette: theme.palette(),
        }
    }

    fn step_cursor(&mut self, dr: isize, dc: isize, rows: usize, cols: usize) {
        let r = (self.cursor.0 as isize + dr).clamp(0, rows as isize - 1) as usize;
        let c = (self.cursor.1 as isize + dc).clamp(0, cols as isize - 1) as usize;
        self.cursor = (r, c);
    }
}

// Raw mode, alternate screen and mouse capture for the guard's lifetime
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<TerminalGuard> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        let mut stdout = io::stdout();
        stdout.queue(terminal::EnterAlternateScreen)?.queue(EnableMouseCapture)?;
        stdout.flush()?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if let Err(e) = queue_restore(&mut stdout).and_then(|_| stdout.flush()) {
            tracing::warn!("failed to restore terminal: {}", e);
        }
        let _ = disable_raw_mode();
    }
}

fn queue_restore<W: Write>(out: &mut W) -> io::Result<()> {
    out.queue(DisableMouseCapture)?
        .queue(terminal::LeaveAlternateScreen)?
        .queue(cursor::Show)?;
    Ok(())
}

pub fn run(cfg: &mut Config) -> Result<(), Box<dyn Error>> {
    let mut game = match cfg.seed {
        Some(seed) => Game::with_seed(cfg.size, seed)?,
        None => Game::new(cfg.size)?,
    };

    let result = {
        let _guard = TerminalGuard::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        event_loop(&mut terminal, &mut game, cfg)
    };

    cfg.size = game.size();
    save_config(cfg);
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    game: &mut Game,
    cfg: &mut Config,
) -> Result<(), Box<dyn Error>> {
    let mut ui = UiState::new(cfg.theme);
    let tick_rate = Duration::from_millis(200);

    loop {
        terminal.draw(|f| draw(f, game, cfg, &mut ui))?;

        if !event::poll(tick_rate)? {
            continue;
        }
        let action = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => action_for_key(key.code, ui.cursor),
            Event::Mouse(me) => {
                let board = game.board();
                let cell = ui
                    .board_rect
                    .and_then(|r| cell_at(r, me.column, me.row, board.rows(), board.cols()));
                match (me.kind, cell) {
                    (MouseEventKind::Down(MouseButton::Left), Some((r, c))) => {
                        ui.cursor = (r, c);
                        Some(Action::Reveal(r, c))
                    }
                    (MouseEventKind::Down(MouseButton::Right), Some((r, c))) => {
                        ui.cursor = (r, c);
                        Some(Action::Flag(r, c))
                    }
                    (MouseEventKind::Moved, Some(pos)) => {
                        ui.cursor = pos;
                        None
                    }
                    _ => None,
                }
            }
            _ => None,
        };

        match action {
            Some(Action::Quit) => break,
            Some(action) => apply(action, game, cfg, &mut ui)?,
            None => (),
        }
    }
    Ok(())
}

fn apply(action: Action, game: &mut Game, cfg: &mut Config, ui: &mut UiState) -> Result<(), Box<dyn Error>> {
    match action {
        // board input is ignored once the game has ended
        Action::Reveal(r, c) if !game.is_over() => {
            match game.reveal(r as isize, c as isize)? {
                RevealOutcome::Won => info!("game won on {}", game.size().name()),
                RevealOutcome::Lost => info!("game lost on {}", game.size().name()),
                _ => (),
            }
        }
        Action::Flag(r, c) if !game.is_over() => {
            game.flag(r as isize, c as isize)?;
        }
        Action::Reveal(..) | Action::Flag(..) => (),
        Action::Move(dr, dc) => {
            let board = game.board();
            ui.step_cursor(dr, dc, board.rows(), board.cols());
        }
        Action::NewGame => {
            game.restart()?;
            ui.cursor = (0, 0);
        }
        Action::ChangeSize => {
            let size = game.cycle_size();
            game.new_game(size)?;
            ui.cursor = (0, 0);
            ui.board_rect = None;
        }
        Action::SetTheme(theme) => {
            debug!("theme changed to {}", theme.name());
            cfg.theme = theme;
            ui.palette = theme.palette();
        }
        Action::Quit => (),
    }
    Ok(())
}

fn action_for_key(code: KeyCode, cursor: (usize, usize)) -> Option<Action> {
    let (r, c) = cursor;
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Action::Quit),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Reveal(r, c)),
        KeyCode::Char('f') | KeyCode::Char('F') => Some(Action::Flag(r, c)),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::F(2) => Some(Action::NewGame),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::ChangeSize),
        KeyCode::Char(ch) => Theme::from_key(ch).map(Action::SetTheme),
        KeyCode::Left => Some(Action::Move(0, -1)),
        KeyCode::Right => Some(Action::Move(0, 1)),
        KeyCode::Up => Some(Action::Move(-1, 0)),
        KeyCode::Down => Some(Action::Move(1, 0)),
        _ => None,
    }
}

/// Map a terminal position to the (row, col) of the board cell under it.
/// Each cell is two columns wide inside a one-character border.
fn cell_at(board: Rect, x: u16, y: u16, rows: usize, cols: usize) -> Option<(usize, usize)> {
    let x0 = board.x + 1;
    let y0 = board.y + 1;
    if x < x0 || y < y0 {
        return None;
    }
    let col = ((x - x0) / 2) as usize;
    let row = (y - y0) as usize;
    if row < rows && col < cols { Some((row, col)) } else { None }
}

/// Glyph for a cell; mines under cover are shown once the game is lost
fn glyph_for(cell: &Cell, lost: bool, ascii: bool) -> String {
    if cell.is_revealed() {
        if cell.is_mine() {
            mine_glyph(ascii).to_string()
        } else if cell.adjacent_mines() > 0 {
            cell.adjacent_mines().to_string()
        } else {
            " ".to_string()
        }
    } else if cell.is_flagged() {
        (if ascii { "F" } else { "⚑" }).to_string()
    } else if lost && cell.is_mine() {
        mine_glyph(ascii).to_string()
    } else {
        (if ascii { "#" } else { "■" }).to_string()
    }
}

fn mine_glyph(ascii: bool) -> &'static str {
    if ascii { "*" } else { "☼" }
}

fn draw<B: Backend>(f: &mut Frame<B>, game: &Game, cfg: &Config, ui: &mut UiState) {
    let size = f.size();
    let board = game.board();
    let board_w = (board.cols() * 2) as u16 + 3;
    let board_h = board.rows() as u16 + 2;
    let min_twidth = board_w.max(60);
    let min_theight = board_h + 6;

    // If terminal too small, render a centered warning and skip normal UI
    if size.width < min_twidth || size.height < min_theight {
        ui.board_rect = None;
        let warn_lines = vec![
            Spans::from(Span::raw("Terminal size too small.")),
            Spans::from(Span::raw(format!("Minimum required: {} x {}", min_twidth, min_theight))),
            Spans::from(Span::raw("S: next size   Esc: exit")),
        ];
        let warn = Paragraph::new(Text::from(warn_lines))
            .block(Block::default().borders(Borders::ALL).title("Resize Terminal"))
            .alignment(Alignment::Center);
        f.render_widget(Clear, size);
        let w = 40u16.min(size.width);
        let h = 5u16.min(size.height);
        f.render_widget(warn, center_rect(w, h, size));
        return;
    }

    // layout: top menu row, center board, bottom status
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(3)].as_ref())
        .split(size);

    let key_style = Style::default().fg(ui.palette.accent).add_modifier(Modifier::BOLD);
    let mut spans_vec: Vec<Span> = vec![Span::raw(" ")];
    for (i, (key, rest)) in MENU_ITEMS.iter().enumerate() {
        if i > 0 {
            spans_vec.push(Span::raw("   "));
        }
        spans_vec.push(Span::styled(key.to_string(), key_style));
        spans_vec.push(Span::raw(format!(": {}", rest)));
    }
    let menu = Paragraph::new(Spans::from(spans_vec)).block(Block::default().borders(Borders::ALL));
    f.render_widget(menu, chunks[0]);

    // status row: game info left, outcome right
    let left_text = format!(
        " Mines: {}   Size: {}   Theme: {} ",
        game.remaining_mines(),
        game.size().name(),
        cfg.theme.name()
    );
    let (right_text, right_style) = match game.status() {
        GameStatus::Playing => ("", Style::default()),
        GameStatus::Won => ("You win! N: new game ", Style::default().fg(ui.palette.numbers[1]).add_modifier(Modifier::BOLD)),
        GameStatus::Lost => ("Game over. N: new game ", Style::default().fg(ui.palette.flag).add_modifier(Modifier::BOLD)),
    };
    let inner_w = chunks[2].width.saturating_sub(2) as usize;
    let used = left_text.as_str().width() + right_text.width();
    let mid_spaces = inner_w.saturating_sub(used).max(1);
    let status = Paragraph::new(Spans::from(vec![
        Span::raw(left_text),
        Span::raw(" ".repeat(mid_spaces)),
        Span::styled(right_text, right_style),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, chunks[2]);

    // board area
    let board_area = center_rect(board_w, board_h, chunks[1]);
    ui.board_rect = Some(board_area);
    let lost = game.status() == GameStatus::Lost;
    let pal = &ui.palette;
    let mut lines = Vec::with_capacity(board.rows());
    for r in 0..board.rows() {
        let mut spans = Vec::with_capacity(board.cols() + 1);
        for c in 0..board.cols() {
            let Some(cell) = board.get(r, c) else { continue };
            let mut style = Style::default().fg(pal.covered).bg(pal.board_bg);
            if cell.is_revealed() && !cell.is_mine() && cell.adjacent_mines() > 0 {
                style = style.fg(pal.numbers[cell.adjacent_mines() as usize - 1]);
            } else if cell.is_flagged() {
                style = style.fg(pal.flag);
            } else if cell.is_mine() && (cell.is_revealed() || lost) {
                style = style.fg(pal.mine);
            }
            if !game.is_over() && ui.cursor == (r, c) {
                style = style.bg(pal.cursor_bg);
            }
            spans.push(Span::styled(format!(" {}", glyph_for(cell, lost, cfg.ascii_icons)), style));
        }
        // one-character padding column on the right, same background as the board
        spans.push(Span::styled(" ", Style::default().bg(pal.board_bg)));
        lines.push(Spans::from(spans));
    }
    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(game.size().name()).title_alignment(Alignment::Center))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, board_area);
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let w = width.min(r.width);
    let h = height.min(r.height);
    Rect::new(r.x + (r.width - w) / 2, r.y + (r.height - h) / 2, w, h)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rms_board::Board;

    #[test]
    fn restore_sequence_undoes_setup() {
        let mut buf = Vec::new();
        queue_restore(&mut buf).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.contains("\x1b[?1000l"), "{:?}", s); // mouse capture off
        assert!(s.contains("\x1b[?1049l"), "{:?}", s); // main screen
        assert!(s.contains("\x1b[?25h"), "{:?}", s); // cursor shown
    }

    #[test]
    fn pointer_maps_to_cells() {
        let rect = Rect::new(10, 4, 13, 7); // 5x5 board
        assert_eq!(cell_at(rect, 11, 5, 5, 5), Some((0, 0)));
        assert_eq!(cell_at(rect, 12, 5, 5, 5), Some((0, 0)));
        assert_eq!(cell_at(rect, 13, 5, 5, 5), Some((0, 1)));
        assert_eq!(cell_at(rect, 20, 9, 5, 5), Some((4, 4)));
        // border and padding column
        assert_eq!(cell_at(rect, 10, 5, 5, 5), None);
        assert_eq!(cell_at(rect, 11, 4, 5, 5), None);
        assert_eq!(cell_at(rect, 21, 5, 5, 5), None);
        assert_eq!(cell_at(rect, 11, 10, 5, 5), None);
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(action_for_key(KeyCode::Char(' '), (2, 3)), Some(Action::Reveal(2, 3)));
        assert_eq!(action_for_key(KeyCode::Char('f'), (1, 0)), Some(Action::Flag(1, 0)));
        assert_eq!(action_for_key(KeyCode::Char('n'), (0, 0)), Some(Action::NewGame));
        assert_eq!(action_for_key(KeyCode::Char('s'), (0, 0)), Some(Action::ChangeSize));
        assert_eq!(action_for_key(KeyCode::Char('3'), (0, 0)), Some(Action::SetTheme(Theme::new(2))));
        assert_eq!(action_for_key(KeyCode::Char('9'), (0, 0)), None);
        assert_eq!(action_for_key(KeyCode::Esc, (0, 0)), Some(Action::Quit));
        assert_eq!(action_for_key(KeyCode::Up, (0, 0)), Some(Action::Move(-1, 0)));
    }

    #[test]
    fn cursor_stays_on_board() {
        let mut ui = UiState {
            cursor: (0, 0),
            board_rect: None,
            palette: Theme::default().palette(),
        };
        ui.step_cursor(-1, -1, 5, 5);
        assert_eq!(ui.cursor, (0, 0));
        ui.step_cursor(10, 10, 5, 5);
        assert_eq!(ui.cursor, (4, 4));
    }

    #[test]
    fn glyphs_follow_cell_state() {
        let board = Board::with_mines(2, 2, &[(0, 0)]).unwrap();
        let mut game = Game::with_board(crate::rms_game::BoardSize::Small, board);
        let mine = *game.board().get(0, 0).unwrap();
        assert_eq!(glyph_for(&mine, false, true), "#");
        assert_eq!(glyph_for(&mine, true, true), "*");

        game.reveal(1, 1).unwrap();
        game.flag(0, 1).unwrap();
        assert_eq!(glyph_for(game.board().get(1, 1).unwrap(), false, true), "1");
        assert_eq!(glyph_for(game.board().get(0, 1).unwrap(), false, true), "F");
    }

    #[test]
    fn board_input_ignored_after_loss() {
        let board = Board::with_mines(2, 2, &[(0, 0)]).unwrap();
        let mut game = Game::with_board(crate::rms_game::BoardSize::Small, board);
        let mut cfg = Config::default();
        let mut ui = UiState::new(cfg.theme);
        apply(Action::Reveal(0, 0), &mut game, &mut cfg, &mut ui).unwrap();
        assert!(game.is_over());
        apply(Action::Reveal(1, 1), &mut game, &mut cfg, &mut ui).unwrap();
        apply(Action::Flag(0, 1), &mut game, &mut cfg, &mut ui).unwrap();
        assert!(!game.board().get(1, 1).unwrap().is_revealed());
        assert!(!game.board().get(0, 1).unwrap().is_flagged());
    }

    #[test]
    fn change_size_starts_next_preset() {
        let mut game = Game::with_seed(crate::rms_game::BoardSize::Small, 5).unwrap();
        let mut cfg = Config::default();
        let mut ui = UiState::new(cfg.theme);
        ui.cursor = (3, 3);
        apply(Action::ChangeSize, &mut game, &mut cfg, &mut ui).unwrap();
        assert_eq!(game.board().rows(), 19);
        assert_eq!(ui.cursor, (0, 0));
        apply(Action::SetTheme(Theme::new(4)), &mut game, &mut cfg, &mut ui).unwrap();
        assert_eq!(cfg.theme, Theme::new(4));
    }
}
