//! Theme color definitions for the UI

use crate::config::Theme;
use ratatui::style::Color;

/// Color palette, named by what each color marks on screen
#[derive(Debug, Clone, Copy)]
pub struct ThemeColors {
    pub fg: Color,
    pub dim: Color,
    /// Headings, focused entry border, status messages
    pub accent: Color,
    /// Decoded scans and the READY badge
    pub scanned: Color,
    /// Manually entered codes
    pub manual: Color,
    /// Scan in progress
    pub pending: Color,
    pub disabled: Color,
    pub bar_bg: Color,
}

impl ThemeColors {
    pub fn from_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            fg: Color::Rgb(200, 200, 210),
            dim: Color::Rgb(90, 90, 110),
            accent: Color::Rgb(80, 200, 220),
            scanned: Color::Rgb(80, 200, 120),
            manual: Color::Rgb(170, 150, 240),
            pending: Color::Rgb(240, 180, 80),
            disabled: Color::Rgb(240, 90, 100),
            bar_bg: Color::Rgb(40, 40, 50),
        }
    }

    /// High contrast for bright terminals
    pub fn light() -> Self {
        Self {
            fg: Color::Rgb(30, 30, 40),
            dim: Color::Rgb(130, 130, 150),
            accent: Color::Rgb(0, 130, 160),
            scanned: Color::Rgb(30, 150, 70),
            manual: Color::Rgb(110, 70, 190),
            pending: Color::Rgb(180, 120, 0),
            disabled: Color::Rgb(200, 50, 60),
            bar_bg: Color::Rgb(220, 220, 228),
        }
    }
}
