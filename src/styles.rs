//! Terminal palette and style helpers.
//!
//! A process-wide theme chosen at startup from config, `NO_COLOR` or
//! `--no-colors`. Style helpers fall back to modifiers only in the no-color
//! theme so nothing emits color codes.

use ratatui::style::{Color, Modifier, Style};
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

/// Marker drawn next to the selected list row
pub const LIST_HIGHLIGHT_SYMBOL: &str = "» ";

static THEME: RwLock<Theme> = RwLock::new(Theme::dark());

/// Install the theme used by every screen
pub fn init_theme(theme_type: ThemeType) {
    let mut theme = THEME.write().unwrap_or_else(PoisonError::into_inner);
    *theme = Theme::new(theme_type);
}

/// Current theme
pub fn theme() -> Theme {
    THEME.read().unwrap_or_else(PoisonError::into_inner).clone()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeType {
    #[default]
    Dark,
    Light,
    NoColor,
}

impl FromStr for ThemeType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "light" => ThemeType::Light,
            "nocolor" | "no-color" | "no_color" | "none" => ThemeType::NoColor,
            _ => ThemeType::Dark,
        })
    }
}

/// Pick the theme: the no-color flag and `NO_COLOR` win over config.
pub fn resolve_theme_type(configured: &str, no_colors_flag: bool, no_color_env: bool) -> ThemeType {
    if no_colors_flag || no_color_env {
        ThemeType::NoColor
    } else {
        configured.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub theme_type: ThemeType,
    /// Titles, active tab, focused borders
    pub primary: Color,
    /// Prices and badges
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub text: Color,
    pub text_muted: Color,
    pub border: Color,
    pub highlight_bg: Color,
}

impl Theme {
    pub fn new(theme_type: ThemeType) -> Self {
        match theme_type {
            ThemeType::Dark => Self::dark(),
            ThemeType::Light => Self::light(),
            ThemeType::NoColor => Self::no_color(),
        }
    }

    pub const fn dark() -> Self {
        Self {
            theme_type: ThemeType::Dark,
            primary: Color::Yellow,
            accent: Color::LightYellow,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            text: Color::White,
            text_muted: Color::DarkGray,
            border: Color::DarkGray,
            highlight_bg: Color::DarkGray,
        }
    }

    pub const fn light() -> Self {
        Self {
            theme_type: ThemeType::Light,
            primary: Color::Rgb(150, 100, 0),
            accent: Color::Rgb(180, 120, 0),
            success: Color::Green,
            warning: Color::Rgb(180, 120, 0),
            error: Color::Red,
            text: Color::Black,
            text_muted: Color::DarkGray,
            border: Color::DarkGray,
            highlight_bg: Color::Gray,
        }
    }

    pub const fn no_color() -> Self {
        Self {
            theme_type: ThemeType::NoColor,
            primary: Color::Reset,
            accent: Color::Reset,
            success: Color::Reset,
            warning: Color::Reset,
            error: Color::Reset,
            text: Color::Reset,
            text_muted: Color::Reset,
            border: Color::Reset,
            highlight_bg: Color::Reset,
        }
    }

    fn plain(&self) -> bool {
        self.theme_type == ThemeType::NoColor
    }

    fn fg_or(&self, color: Color, fallback: Modifier) -> Style {
        if self.plain() {
            Style::default().add_modifier(fallback)
        } else {
            Style::default().fg(color)
        }
    }

    pub fn title_style(&self) -> Style {
        self.fg_or(self.primary, Modifier::BOLD)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text_style(&self) -> Style {
        self.fg_or(self.text, Modifier::empty())
    }

    pub fn muted_style(&self) -> Style {
        self.fg_or(self.text_muted, Modifier::DIM)
    }

    pub fn accent_style(&self) -> Style {
        self.fg_or(self.accent, Modifier::BOLD)
    }

    pub fn success_style(&self) -> Style {
        self.fg_or(self.success, Modifier::BOLD)
    }

    pub fn warning_style(&self) -> Style {
        self.fg_or(self.warning, Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        self.fg_or(self.error, Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        self.fg_or(self.border, Modifier::empty())
    }

    pub fn border_focused_style(&self) -> Style {
        self.fg_or(self.primary, Modifier::BOLD)
    }

    /// Selected list row
    pub fn highlight_style(&self) -> Style {
        if self.plain() {
            return Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }
        Style::default()
            .fg(self.primary)
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn disabled_style(&self) -> Style {
        self.fg_or(self.text_muted, Modifier::DIM)
    }
}
