//! TUI theme and styles

use ratatui::style::{Color, Modifier, Style};

use crate::core::model::{color_family, Difficulty};

/// Application color theme
pub struct Theme;

impl Theme {
    /// Primary accent color
    pub const PRIMARY: Color = Color::Cyan;

    /// Points and rewards
    pub const REWARD: Color = Color::Yellow;

    /// Success color
    pub const SUCCESS: Color = Color::Green;

    /// Error color
    pub const ERROR: Color = Color::Red;

    /// Teacher mode accent
    pub const TEACHER: Color = Color::Magenta;

    /// Muted text color
    pub const MUTED: Color = Color::DarkGray;

    /// Header style
    pub fn header() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    /// Status bar style
    pub fn status_bar() -> Style {
        Style::default().bg(Color::DarkGray)
    }

    /// Selected item style
    pub fn selected() -> Style {
        Style::default().bg(Self::PRIMARY).fg(Color::Black)
    }

    /// Normal text style
    pub fn normal() -> Style {
        Style::default()
    }

    /// Muted text style
    pub fn muted() -> Style {
        Style::default().fg(Self::MUTED)
    }

    /// Bold label style
    pub fn label() -> Style {
        Style::default().fg(Self::PRIMARY).add_modifier(Modifier::BOLD)
    }

    /// Terminal color for a subject's color token
    pub fn subject(color: &str) -> Color {
        match color_family(color) {
            "rose" | "red" | "pink" => Color::LightRed,
            "emerald" | "green" | "teal" => Color::Green,
            "amber" | "yellow" => Color::Yellow,
            "orange" => Color::Rgb(249, 115, 22),
            "indigo" | "purple" | "violet" => Color::Magenta,
            "sky" | "cyan" => Color::Cyan,
            _ => Color::Blue,
        }
    }

    /// Badge color for a difficulty
    pub fn difficulty(difficulty: Difficulty) -> Color {
        match difficulty {
            Difficulty::Easy => Color::Green,
            Difficulty::Medium => Color::Yellow,
            Difficulty::Hard => Color::Red,
        }
    }
}
