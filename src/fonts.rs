//! Terminal styling for outbound text.
//!
//! Styling uses 256-color SGR sequences restricted to the 16-entry base palette:
//! `ESC[38;5;<fg>m ESC[48;5;<bg>m <text> ESC[0m`. A disabled [`Fonts`] returns
//! text unchanged, which keeps plain clients (and tests) readable.

const ESC: char = '\u{1b}';

/// Base 16-color palette indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
    BrightBlack = 8,
    BrightRed = 9,
    BrightGreen = 10,
    BrightYellow = 11,
    BrightBlue = 12,
    BrightMagenta = 13,
    BrightCyan = 14,
    BrightWhite = 15,
}

/// Foreground/background pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
}

impl Style {
    pub const fn fg(fg: Color) -> Self {
        Self { fg, bg: Color::Black }
    }

    pub const fn on(self, bg: Color) -> Self {
        Self { fg: self.fg, bg }
    }

    pub fn paint(&self, text: &str) -> String {
        format!(
            "{ESC}[38;5;{}m{ESC}[48;5;{}m{}{ESC}[0m",
            self.fg as u8, self.bg as u8, text
        )
    }
}

/// Named styles used across the lobby and the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fonts {
    enabled: bool,
}

impl Fonts {
    pub const SYSTEM: Style = Style::fg(Color::Green);
    pub const HIGHLIGHT: Style = Style::fg(Color::BrightWhite);
    pub const WARNING: Style = Style::fg(Color::BrightWhite).on(Color::Red);
    pub const ENEMY: Style = Style::fg(Color::Magenta);
    pub const DAMAGE: Style = Style::fg(Color::BrightRed);
    pub const BANNER: Style = Style::fg(Color::BrightGreen).on(Color::Red);

    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn styled(&self, style: Style, text: &str) -> String {
        if self.enabled {
            style.paint(text)
        } else {
            text.to_string()
        }
    }

    pub fn system(&self, text: &str) -> String {
        self.styled(Self::SYSTEM, text)
    }

    pub fn highlight(&self, text: &str) -> String {
        self.styled(Self::HIGHLIGHT, text)
    }

    pub fn warning(&self, text: &str) -> String {
        self.styled(Self::WARNING, text)
    }

    pub fn enemy(&self, text: &str) -> String {
        self.styled(Self::ENEMY, text)
    }

    pub fn damage(&self, text: &str) -> String {
        self.styled(Self::DAMAGE, text)
    }

    pub fn banner(&self, text: &str) -> String {
        self.styled(Self::BANNER, text)
    }
}

impl Default for Fonts {
    fn default() -> Self {
        Self::new(true)
    }
}
