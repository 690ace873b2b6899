//! Grid line representation
//!
//! A line is a fixed-length row of cells. Its length always equals the
//! target width of the capture it belongs to.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Style};

/// A row of cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    cells: Vec<Cell>,
}

impl Line {
    /// Create a blank, default-styled line with the specified number of columns
    pub fn new(cols: usize) -> Self {
        Self {
            cells: vec![Cell::default(); cols],
        }
    }

    /// Close off a partially built row: truncate it to `cols`, or right-pad
    /// it with spaces carrying `pad_style`.
    pub fn from_row(mut cells: Vec<Cell>, cols: usize, pad_style: Style) -> Self {
        cells.truncate(cols);
        cells.resize(cols, Cell::blank(pad_style));
        Self { cells }
    }

    /// Lay plain text out as one line, dropping characters past `cols`
    pub fn from_text(text: &str, cols: usize, style: Style) -> Self {
        let cells = text.chars().map(|c| Cell::new(c, style)).collect();
        Self::from_row(cells, cols, style)
    }

    /// Get the number of columns in this line
    pub fn cols(&self) -> usize {
        self.cells.len()
    }

    /// Get a reference to a cell at the given column
    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    /// Get all cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Get the text content of this line, trailing spaces trimmed
    pub fn text(&self) -> String {
        let text: String = self.cells.iter().map(|c| c.symbol).collect();
        text.trim_end().to_string()
    }

    /// Check if the line is empty (all cells are spaces)
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.symbol == ' ')
    }
}
