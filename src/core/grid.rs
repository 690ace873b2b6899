//! Cell grid
//!
//! A `Grid` is one frame's worth of terminal content: exactly `rows` lines
//! of exactly `cols` cells each. `GridBuilder` produces one from a single
//! interpreted pass in snapshot mode.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Style};
use super::line::Line;
use super::sink::{tab_width, LineSink};
use crate::error::{check_dimensions, Result};

/// A fixed-size grid of styled cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cols: usize,
    lines: Vec<Line>,
}

impl Grid {
    /// Create a blank, default-styled grid
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        check_dimensions(cols, rows)?;
        Ok(Self {
            cols,
            lines: vec![Line::new(cols); rows],
        })
    }

    /// Shape lines into a grid: keep the most recent `rows` lines, top-pad
    /// with blank lines when there are fewer. Lines of the wrong width are
    /// padded or truncated.
    pub fn from_lines(lines: Vec<Line>, cols: usize, rows: usize) -> Result<Self> {
        check_dimensions(cols, rows)?;
        Ok(Self::shaped(lines, cols, rows))
    }

    /// `from_lines` for dimensions already known to be positive
    pub(crate) fn shaped(lines: Vec<Line>, cols: usize, rows: usize) -> Self {
        let skip = lines.len().saturating_sub(rows);
        let missing = rows.saturating_sub(lines.len());

        let mut shaped = Vec::with_capacity(rows);
        shaped.resize(missing, Line::new(cols));
        shaped.extend(lines.into_iter().skip(skip).map(|line| {
            if line.cols() == cols {
                line
            } else {
                Line::from_row(line.cells().to_vec(), cols, Style::default())
            }
        }));

        Self { cols, lines: shaped }
    }

    /// Lay out plain text lines (such as a streaming viewport) with one
    /// style for every cell
    pub fn from_text_lines<S: AsRef<str>>(
        lines: &[S],
        cols: usize,
        rows: usize,
        style: Style,
    ) -> Result<Self> {
        let lines = lines
            .iter()
            .map(|text| Line::from_text(text.as_ref(), cols, style))
            .collect();
        Self::from_lines(lines, cols, rows)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.lines.len()
    }

    /// Get a reference to a line
    pub fn line(&self, row: usize) -> Option<&Line> {
        self.lines.get(row)
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Get a reference to a cell
    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        self.lines.get(row).and_then(|line| line.cell(col))
    }

    /// Text of every line, trailing spaces trimmed
    pub fn text(&self) -> Vec<String> {
        self.lines.iter().map(Line::text).collect()
    }
}

/// Snapshot-mode line sink
///
/// Characters past `cols` are dropped (no wraparound). Only the most recent
/// `rows` flushed lines are retained since earlier ones can never reach the
/// final grid.
#[derive(Debug, Clone)]
pub struct GridBuilder {
    cols: usize,
    rows: usize,
    lines: VecDeque<Line>,
    current: Vec<Cell>,
}

impl GridBuilder {
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        check_dimensions(cols, rows)?;
        Ok(Self {
            cols,
            rows,
            lines: VecDeque::with_capacity(rows + 1),
            current: Vec::with_capacity(cols),
        })
    }

    /// Number of cells in the row being built
    pub fn current_len(&self) -> usize {
        self.current.len()
    }

    fn flush(&mut self, pen: &Style) {
        let row = std::mem::replace(&mut self.current, Vec::with_capacity(self.cols));
        self.lines.push_back(Line::from_row(row, self.cols, *pen));
        if self.lines.len() > self.rows {
            self.lines.pop_front();
        }
    }

    /// Flush the partial row (unless it is empty and a line already exists)
    /// and shape the result into a grid
    pub fn finish(mut self, pen: &Style) -> Grid {
        if !self.current.is_empty() || self.lines.is_empty() {
            self.flush(pen);
        }

        let missing = self.rows - self.lines.len();
        let mut lines = Vec::with_capacity(self.rows);
        lines.resize(missing, Line::new(self.cols));
        lines.extend(self.lines);
        Grid {
            cols: self.cols,
            lines,
        }
    }
}

impl LineSink for GridBuilder {
    fn print(&mut self, c: char, pen: &Style) {
        if self.current.len() < self.cols {
            self.current.push(Cell::new(c, *pen));
        }
    }

    fn line_feed(&mut self, pen: &Style) {
        self.flush(pen);
    }

    fn carriage_return(&mut self) {
        self.current.clear();
    }

    fn tab(&mut self, pen: &Style) {
        for _ in 0..tab_width(self.current.len()) {
            if self.current.len() < self.cols {
                self.current.push(Cell::blank(*pen));
            }
        }
    }
}
