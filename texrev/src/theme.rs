//! Color themes for texrev.
//!
//! - `dark` sticks to ANSI 16 colors so it works on any terminal.
//! - `catppuccin_mocha` uses the Catppuccin Mocha palette and needs truecolor.

use ratatui::style::Color;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Theme {
    pub border: Color,
    pub title: Color,

    /// Marker and line-number color per row kind.
    pub diff_added: Color,
    pub diff_removed: Color,
    pub diff_modified: Color,
    pub diff_unchanged: Color,

    /// Row backgrounds; `Color::Reset` leaves the terminal background.
    pub diff_added_bg: Color,
    pub diff_removed_bg: Color,
    pub diff_modified_bg: Color,

    pub line_number: Color,

    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_mode_normal: Color,
    pub status_mode_confirm: Color,

    /// syntect theme used for LaTeX highlighting.
    pub syntax_theme: &'static str,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            border: Color::DarkGray,
            title: Color::Cyan,

            diff_added: Color::Green,
            diff_removed: Color::Red,
            diff_modified: Color::Yellow,
            diff_unchanged: Color::Reset,

            diff_added_bg: Color::Reset,
            diff_removed_bg: Color::Reset,
            diff_modified_bg: Color::Reset,

            line_number: Color::DarkGray,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_confirm: Color::Yellow,

            syntax_theme: "base16-ocean.dark",
        }
    }

    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay0 = Color::Rgb(108, 112, 134); // #6c7086
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let peach = Color::Rgb(250, 179, 135); // #fab387
        let text = Color::Rgb(205, 214, 244); // #cdd6f4

        Self {
            border: overlay1,
            title: lavender,

            diff_added: green,
            diff_removed: red,
            diff_modified: yellow,
            diff_unchanged: text,

            // base blended toward green, red, and yellow
            diff_added_bg: Color::Rgb(40, 58, 52),
            diff_removed_bg: Color::Rgb(62, 40, 54),
            diff_modified_bg: Color::Rgb(60, 56, 50),

            line_number: overlay0,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_confirm: peach,

            syntax_theme: "base16-mocha.dark",
        }
    }

    /// Resolves a theme name from config. Unknown names fall back to `dark()`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }
}
