//! Line sinks
//!
//! The interpreter turns parsed actions into calls on a `LineSink`. The
//! snapshot grid builder and the streaming log buffer are the two sinks;
//! they differ in how rows overflow and what backspace does.

use super::cell::Style;

/// Receiver of interpreted text and line structure
pub trait LineSink {
    /// A printable character, drawn with `pen`
    fn print(&mut self, c: char, pen: &Style);

    /// `\n`: close the current row and start a new one
    fn line_feed(&mut self, pen: &Style);

    /// `\r`: discard the current row's content
    fn carriage_return(&mut self);

    /// `\t`: pad to the next multiple-of-4 column
    fn tab(&mut self, pen: &Style);

    /// `\b`: ignored unless the sink edits its current row
    fn backspace(&mut self) {}
}

/// Number of columns a tab advances from `col`
pub fn tab_width(col: usize) -> usize {
    4 - col % 4
}
