//! Pre-structured snapshot documents
//!
//! Some captures arrive as JSON cell data instead of raw escape sequences:
//! `{width, height, cells: [{symbol, fg, bg, modifier_bits}]}` in row-major
//! order. Colors are a name string, `{"rgb": [r, g, b]}` or
//! `{"indexed": n}`; anything else falls back to the default color.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Style};
use super::color::{ColorRef, Palette};
use super::grid::Grid;
use super::line::Line;
use crate::error::{check_dimensions, Error, Result};

/// Modifier bit flags
pub const MOD_BOLD: i64 = 0x0001;
pub const MOD_UNDERLINED: i64 = 0x0008;
pub const MOD_REVERSED: i64 = 0x0040;
pub const MOD_HIDDEN: i64 = 0x0080;

/// A color as written in a snapshot document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Name(String),
    Rgb { rgb: [i64; 3] },
    Indexed { indexed: i64 },
    /// Unrecognized shape; resolves to the default
    Other(serde_json::Value),
}

impl Default for ColorSpec {
    fn default() -> Self {
        ColorSpec::Name("reset".to_string())
    }
}

impl ColorSpec {
    pub fn to_color_ref(&self) -> Option<ColorRef> {
        match self {
            ColorSpec::Name(name) => Some(ColorRef::Named(name.clone())),
            ColorSpec::Rgb { rgb: [r, g, b] } => Some(ColorRef::Rgb(*r, *g, *b)),
            ColorSpec::Indexed { indexed } => Some(ColorRef::Indexed(*indexed)),
            ColorSpec::Other(_) => None,
        }
    }
}

/// One cell record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotCell {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default)]
    pub fg: ColorSpec,
    #[serde(default)]
    pub bg: ColorSpec,
    #[serde(default)]
    pub modifier_bits: i64,
}

fn default_symbol() -> String {
    " ".to_string()
}

impl SnapshotCell {
    /// Resolve into a grid cell
    pub fn to_cell(&self, palette: &Palette) -> Cell {
        let resolve = |spec: &ColorSpec| {
            spec.to_color_ref()
                .and_then(|color| palette.resolve_opt(&color))
        };
        let style = Style {
            fg: resolve(&self.fg),
            bg: resolve(&self.bg),
            bold: self.modifier_bits & MOD_BOLD != 0,
            underline: self.modifier_bits & MOD_UNDERLINED != 0,
            inverse: self.modifier_bits & MOD_REVERSED != 0,
            hidden: self.modifier_bits & MOD_HIDDEN != 0,
        };
        Cell::new(self.symbol.chars().next().unwrap_or(' '), style)
    }
}

/// A complete snapshot document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub width: i64,
    #[serde(default)]
    pub height: i64,
    #[serde(default)]
    pub cells: Vec<SnapshotCell>,
}

impl SnapshotDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validate the document and lay its cells out as a grid
    ///
    /// Fails when either dimension is not positive or there are fewer than
    /// `width * height` cells. Extra cells are ignored.
    pub fn to_grid(&self, palette: &Palette) -> Result<Grid> {
        let (cols, rows) = match (usize::try_from(self.width), usize::try_from(self.height)) {
            (Ok(cols), Ok(rows)) if cols > 0 && rows > 0 => (cols, rows),
            _ => {
                return Err(Error::InvalidDimensions {
                    cols: self.width.max(0) as usize,
                    rows: self.height.max(0) as usize,
                })
            }
        };

        check_dimensions(cols, rows)?;
        let expected = cols * rows;
        if self.cells.len() < expected {
            return Err(Error::InsufficientCells {
                expected,
                actual: self.cells.len(),
            });
        }

        let lines = self.cells[..expected]
            .chunks(cols)
            .map(|row| {
                let cells = row.iter().map(|cell| cell.to_cell(palette)).collect();
                Line::from_row(cells, cols, Style::default())
            })
            .collect();
        Grid::from_lines(lines, cols, rows)
    }
}
