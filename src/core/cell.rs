//! Terminal Cell
//!
//! Represents a single cell in the rendered grid: one displayable
//! character and a copy of the pen style that was active when it was
//! emitted.

use serde::{Deserialize, Serialize};

use super::color::{Palette, Rgb};

/// Brighten factor used to approximate bold glyphs
pub const BOLD_BRIGHTEN: f32 = 1.12;

/// Text style attributes (the "pen")
///
/// `None` for `fg`/`bg` always means the ambient default color, never a
/// literal color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub inverse: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Style {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check whether every attribute is at its default
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Resolve the colors this style is drawn with: inverse swaps
    /// foreground and background, then bold brightens the foreground.
    pub fn effective_colors(&self, palette: &Palette, bold_factor: f32) -> (Rgb, Rgb) {
        let mut fg = self.fg.unwrap_or(palette.foreground);
        let mut bg = self.bg.unwrap_or(palette.background);
        if self.inverse {
            std::mem::swap(&mut fg, &mut bg);
        }
        if self.bold {
            fg = fg.brighten(bold_factor);
        }
        (fg, bg)
    }
}

/// A single cell in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The displayed character
    pub symbol: char,
    /// Style snapshot taken when the cell was emitted
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank(Style::default())
    }
}

impl Cell {
    /// Create a new cell with a single character
    pub fn new(symbol: char, style: Style) -> Self {
        Self { symbol, style }
    }

    /// A space carrying the given style
    pub fn blank(style: Style) -> Self {
        Self { symbol: ' ', style }
    }

    /// Check if this cell draws no glyph
    pub fn is_blank(&self) -> bool {
        self.symbol == ' ' || self.style.hidden
    }
}
