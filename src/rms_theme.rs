// Board colour themes
// Eight palettes, matched to the colour depth of the running terminal

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use term_color_support::ColorSupport;

/// Colour depth the terminal can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    TrueColor,
    Indexed256,
    Basic,
}

impl ColorDepth {
    /// Query stdout once; palettes are resolved against the result
    pub fn detect() -> ColorDepth {
        let support = ColorSupport::stdout();
        if support.has_16m {
            ColorDepth::TrueColor
        } else if support.has_256 {
            ColorDepth::Indexed256
        } else {
            ColorDepth::Basic
        }
    }

    /// Pin an ANSI colour to the Windows Terminal "Campbell" look so boards
    /// render the same across terminals. Other colours pass through.
    pub fn adapt(self, color: Color) -> Color {
        match (self, campbell(color)) {
            (ColorDepth::TrueColor, Some(((r, g, b), _))) => Color::Rgb(r, g, b),
            (ColorDepth::Indexed256, Some((_, index))) => Color::Indexed(index),
            _ => color,
        }
    }
}

// ((R, G, B), ANSI 256 index) for each of the 16 named colours
fn campbell(color: Color) -> Option<((u8, u8, u8), u8)> {
    let mapping = match color {
        Color::Black =>         ((12, 12, 12),   232),
        Color::Red =>           ((197, 15, 31),  160),
        Color::Green =>         ((19, 161, 14),  28),
        Color::Yellow =>        ((193, 156, 0),  178),
        Color::Blue =>          ((0, 55, 218),   20),
        Color::Magenta =>       ((136, 23, 152), 90),
        Color::Cyan =>          ((58, 150, 221), 38),
        Color::Gray =>          ((204, 204, 204), 250),
        Color::DarkGray =>      ((118, 118, 118), 243),
        Color::LightRed =>      ((231, 72, 86),  203),
        Color::LightGreen =>    ((22, 198, 12),  46),
        Color::LightYellow =>   ((249, 241, 165), 229),
        Color::LightBlue =>     ((59, 120, 255), 63),
        Color::LightMagenta =>  ((180, 0, 158),  163),
        Color::LightCyan =>     ((97, 214, 214), 116),
        Color::White =>         ((242, 242, 242), 255),
        _ => return None, // Rgb / Indexed / Reset
    };
    Some(mapping)
}

/// One of the eight selectable colour themes (keys 1-8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme(u8);

/// Resolved colours for drawing a board
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub board_bg: Color,
    pub covered: Color,
    pub flag: Color,
    pub mine: Color,
    pub cursor_bg: Color,
    pub accent: Color, // menu key labels
    pub numbers: [Color; 8],
}

impl Theme {
    pub const COUNT: u8 = 8;

    /// Theme by zero-based index; out of range falls back to the first
    pub fn new(index: u8) -> Theme {
        if index < Theme::COUNT { Theme(index) } else { Theme(0) }
    }

    /// Theme bound to a digit key '1'..='8'
    pub fn from_key(c: char) -> Option<Theme> {
        match c.to_digit(10) {
            Some(d) if (1..=Theme::COUNT as u32).contains(&d) => Some(Theme(d as u8 - 1)),
            _ => None,
        }
    }

    pub fn index(&self) -> u8 {
        self.0
    }

    pub fn name(&self) -> &'static str {
        match self.0 {
            0 => "Classic",
            1 => "Ocean",
            2 => "Forest",
            3 => "Ember",
            4 => "Slate",
            5 => "Candy",
            6 => "Mono",
            _ => "Night",
        }
    }

    /// Palette for the current terminal
    pub fn palette(&self) -> Palette {
        self.palette_for(ColorDepth::detect())
    }

    pub fn palette_for(&self, depth: ColorDepth) -> Palette {
        use Color::*;
        let (board_bg, covered, flag, mine, cursor_bg) = match self.0 {
            0 => (DarkGray, Gray, Red, Black, LightBlue),
            1 => (Blue, LightCyan, LightRed, Black, Cyan),
            2 => (Green, LightGreen, Red, Black, LightYellow),
            3 => (Red, LightYellow, White, Black, Yellow),
            4 => (Black, DarkGray, LightRed, White, Gray),
            5 => (Magenta, LightMagenta, White, Black, LightCyan),
            6 => (Black, Gray, White, White, DarkGray),
            _ => (Black, Blue, LightRed, LightYellow, DarkGray),
        };
        let numbers = match self.0 {
            6 => [White; 8],
            _ => [
                LightBlue, LightGreen, LightRed, Blue, Red, Cyan, White, Gray,
            ],
        };
        let adapt = |c| depth.adapt(c);
        Palette {
            board_bg: adapt(board_bg),
            covered: adapt(covered),
            flag: adapt(flag),
            mine: adapt(mine),
            cursor_bg: adapt(cursor_bg),
            accent: adapt(Yellow),
            numbers: numbers.map(adapt),
        }
    }
}
