//! Streaming scrollback buffer
//!
//! Holds completed plain-text lines plus the line in progress. Content
//! wider than the buffer wraps onto new lines instead of being dropped.
//! Once the retained line count passes a ceiling, the oldest block of lines
//! is evicted in one go.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::cell::Style;
use super::grid::Grid;
use super::line::Line;
use super::sink::{tab_width, LineSink};
use crate::error::MAX_GRID_DIM;

/// Narrowest buffer accepted
pub const MIN_LOG_COLS: usize = 20;
/// Shortest viewport accepted
pub const MIN_LOG_ROWS: usize = 5;

/// Retention limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollbackConfig {
    /// Ceiling on retained completed lines
    pub max_lines: usize,
    /// Lines dropped from the front each time the ceiling is exceeded
    pub evict_lines: usize,
}

impl Default for ScrollbackConfig {
    fn default() -> Self {
        Self {
            max_lines: 8000,
            evict_lines: 1000,
        }
    }
}

/// Streaming-mode line buffer with a trailing viewport
#[derive(Debug, Clone)]
pub struct LogBuffer {
    cols: usize,
    rows: usize,
    config: ScrollbackConfig,
    lines: VecDeque<String>,
    current: Vec<char>,
}

impl LogBuffer {
    /// Create a buffer, clamping the size between the minimum and
    /// `MAX_GRID_DIM`
    pub fn new(cols: usize, rows: usize) -> Self {
        Self::with_config(cols, rows, ScrollbackConfig::default())
    }

    pub fn with_config(cols: usize, rows: usize, config: ScrollbackConfig) -> Self {
        Self {
            cols: cols.clamp(MIN_LOG_COLS, MAX_GRID_DIM),
            rows: rows.clamp(MIN_LOG_ROWS, MAX_GRID_DIM),
            config,
            lines: VecDeque::new(),
            current: Vec::new(),
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Completed lines, oldest first
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Number of completed lines retained
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.current.is_empty()
    }

    /// The line in progress
    pub fn current(&self) -> String {
        self.current.iter().collect()
    }

    /// Exactly `rows` lines: the tail of the completed lines followed by the
    /// line in progress, top-padded with empty lines
    pub fn viewport(&self) -> Vec<String> {
        let total = self.lines.len() + 1;
        let skip = total.saturating_sub(self.rows);

        let mut view = vec![String::new(); self.rows.saturating_sub(total)];
        view.extend(self.lines.iter().skip(skip).cloned());
        view.push(self.current());
        view.truncate(self.rows);
        view
    }

    /// Lay the viewport out as a grid, every cell drawn with `style`
    pub fn viewport_grid(&self, style: Style) -> Grid {
        let lines = self
            .viewport()
            .iter()
            .map(|text| Line::from_text(text, self.cols, style))
            .collect();
        Grid::shaped(lines, self.cols, self.rows)
    }

    /// Push a completed line, wrap-splitting it at the buffer width
    fn push_line(&mut self, text: &[char]) {
        if text.is_empty() {
            self.lines.push_back(String::new());
        } else {
            for chunk in text.chunks(self.cols) {
                self.lines.push_back(chunk.iter().collect());
            }
        }
        self.evict();
    }

    fn evict(&mut self) {
        let step = self.config.evict_lines.max(1);
        while self.lines.len() > self.config.max_lines {
            let count = step.min(self.lines.len());
            self.lines.drain(..count);
            tracing::debug!(count, retained = self.lines.len(), "Evicted scrollback lines");
        }
    }
}

impl LineSink for LogBuffer {
    fn print(&mut self, c: char, _pen: &Style) {
        self.current.push(c);
        if self.current.len() > self.cols {
            let rest = self.current.split_off(self.cols);
            let full = std::mem::replace(&mut self.current, rest);
            self.push_line(&full);
        }
    }

    fn line_feed(&mut self, _pen: &Style) {
        let line = std::mem::take(&mut self.current);
        self.push_line(&line);
    }

    fn carriage_return(&mut self) {
        self.current.clear();
    }

    // Tabs may run past the width; the excess wraps at the next push.
    fn tab(&mut self, _pen: &Style) {
        let width = tab_width(self.current.len());
        self.current.extend(std::iter::repeat(' ').take(width));
    }

    fn backspace(&mut self) {
        self.current.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(buffer: &mut LogBuffer, text: &str) {
        let pen = Style::default();
        for c in text.chars() {
            match c {
                '\n' => buffer.line_feed(&pen),
                '\r' => buffer.carriage_return(),
                '\t' => buffer.tab(&pen),
                '\x08' => buffer.backspace(),
                c => buffer.print(c, &pen),
            }
        }
    }

    #[test]
    fn test_minimum_size() {
        let buffer = LogBuffer::new(3, 1);
        assert_eq!(buffer.cols(), MIN_LOG_COLS);
        assert_eq!(buffer.rows(), MIN_LOG_ROWS);
    }

    #[test]
    fn test_maximum_size() {
        let buffer = LogBuffer::new(usize::MAX, usize::MAX);
        assert_eq!(buffer.cols(), MAX_GRID_DIM);
        assert_eq!(buffer.rows(), MAX_GRID_DIM);
    }

    #[test]
    fn test_viewport_padding() {
        let mut buffer = LogBuffer::new(20, 5);
        feed(&mut buffer, "one\ntwo");
        assert_eq!(buffer.viewport(), vec!["", "", "", "one", "two"]);
    }

    #[test]
    fn test_viewport_tail() {
        let mut buffer = LogBuffer::new(20, 5);
        for i in 0..10 {
            feed(&mut buffer, &format!("line {i}\n"));
        }
        assert_eq!(
            buffer.viewport(),
            vec!["line 6", "line 7", "line 8", "line 9", ""]
        );
    }

    #[test]
    fn test_overflow_wraps() {
        let mut buffer = LogBuffer::new(20, 5);
        let text: String = ('a'..='z').collect();
        feed(&mut buffer, &text);

        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.lines().next(), Some("abcdefghijklmnopqrst"));
        assert_eq!(buffer.current(), "uvwxyz");
    }

    #[test]
    fn test_long_tab_line_wraps_on_push() {
        let mut buffer = LogBuffer::new(20, 5);
        feed(&mut buffer, &"x".repeat(20));
        assert_eq!(buffer.len(), 0);
        feed(&mut buffer, "\t\n");

        let lines: Vec<&str> = buffer.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "x".repeat(20));
        assert_eq!(lines[1], "    ");
    }

    #[test]
    fn test_carriage_return_and_backspace() {
        let mut buffer = LogBuffer::new(20, 5);
        feed(&mut buffer, "50%\r100%");
        assert_eq!(buffer.current(), "100%");
        feed(&mut buffer, "\x08\x08");
        assert_eq!(buffer.current(), "10");
    }

    #[test]
    fn test_empty_line_pushed() {
        let mut buffer = LogBuffer::new(20, 5);
        feed(&mut buffer, "\n\n");
        assert_eq!(buffer.len(), 2);
        assert!(buffer.lines().all(str::is_empty));
    }

    #[test]
    fn test_viewport_grid() {
        let mut buffer = LogBuffer::new(20, 5);
        feed(&mut buffer, "hello\nworld");
        let grid = buffer.viewport_grid(Style::default());
        assert_eq!((grid.cols(), grid.rows()), (20, 5));
        assert_eq!(grid.text(), vec!["", "", "", "hello", "world"]);
    }

    #[test]
    fn test_bulk_eviction() {
        let config = ScrollbackConfig {
            max_lines: 10,
            evict_lines: 4,
        };
        let mut buffer = LogBuffer::with_config(20, 5, config);
        for i in 0..11 {
            feed(&mut buffer, &format!("{i}\n"));
        }
        assert_eq!(buffer.len(), 7);
        assert_eq!(buffer.lines().next(), Some("4"));
        assert_eq!(buffer.viewport()[3], "10");
    }
}
