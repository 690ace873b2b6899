//! Terminal Interpreter
//!
//! Ties together the parser, the SGR rules and a line sink. One
//! interpreter serves both capture modes: snapshot mode tracks styling and
//! writes into a fixed grid, streaming mode flattens everything to plain
//! text and writes into a wrapping scrollback.

use crate::core::{Grid, GridBuilder, LineSink, LogBuffer, Palette, ScrollbackConfig, Style};
use crate::error::Result;
use crate::parser::{apply_sgr, Action, Parser, Utf8Stream};

/// Whether SGR sequences affect the pen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Styling {
    /// Apply SGR codes to the pen
    #[default]
    Track,
    /// Strip all styling; the pen stays at its default
    Flatten,
}

/// Escape sequence interpreter
///
/// Holds everything that must survive a chunk boundary: the parser state
/// and the pen. Output goes to whatever `LineSink` the caller passes in.
#[derive(Debug, Clone)]
pub struct Interpreter {
    parser: Parser,
    styling: Styling,
    palette: Palette,
    pen: Style,
}

impl Interpreter {
    pub fn new(styling: Styling, palette: Palette) -> Self {
        Self {
            parser: Parser::new(),
            styling,
            palette,
            pen: Style::default(),
        }
    }

    /// The pen applied to newly emitted cells
    pub fn pen(&self) -> &Style {
        &self.pen
    }

    pub fn styling(&self) -> Styling {
        self.styling
    }

    /// Interpret a chunk of text into `sink`
    pub fn feed<S: LineSink + ?Sized>(&mut self, text: &str, sink: &mut S) {
        let Self {
            parser,
            styling,
            palette,
            pen,
        } = self;

        parser.parse(text, |action| match action {
            Action::Print(c) => sink.print(c, pen),
            Action::Control(b'\n') => sink.line_feed(pen),
            Action::Control(b'\r') => sink.carriage_return(),
            Action::Control(b'\t') => sink.tab(pen),
            Action::Control(0x08) => sink.backspace(),
            Action::Control(_) => {}
            Action::Csi(seq) => {
                if *styling == Styling::Track && seq.is_sgr() {
                    apply_sgr(&seq.sgr_codes(), pen, palette);
                }
            }
        });
    }

    /// End of stream: drop any unterminated escape sequence
    pub fn finish(&mut self) {
        self.parser.reset();
    }
}

/// Interpret a complete capture into a `cols x rows` grid
///
/// Rows wider than `cols` are truncated. Only the last `rows` lines are
/// kept, and short output is top-padded with blank lines.
pub fn interpret_snapshot(text: &str, cols: usize, rows: usize, palette: &Palette) -> Result<Grid> {
    let mut builder = GridBuilder::new(cols, rows)?;
    let mut interpreter = Interpreter::new(Styling::Track, palette.clone());
    interpreter.feed(text, &mut builder);
    interpreter.finish();
    Ok(builder.finish(interpreter.pen()))
}

/// Streaming-mode front end
///
/// Decodes raw byte chunks, strips styling and accumulates wrapped lines in
/// a bounded scrollback.
#[derive(Debug, Clone)]
pub struct LogStream {
    decoder: Utf8Stream,
    interpreter: Interpreter,
    buffer: LogBuffer,
}

impl LogStream {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self::with_config(cols, rows, ScrollbackConfig::default())
    }

    pub fn with_config(cols: usize, rows: usize, config: ScrollbackConfig) -> Self {
        Self {
            decoder: Utf8Stream::new(),
            interpreter: Interpreter::new(Styling::Flatten, Palette::default()),
            buffer: LogBuffer::with_config(cols, rows, config),
        }
    }

    /// Feed one chunk of raw output, in stream order
    pub fn feed(&mut self, chunk: &[u8]) {
        let text = self.decoder.decode(chunk);
        self.feed_str(&text);
    }

    /// Feed already-decoded text
    pub fn feed_str(&mut self, text: &str) {
        self.interpreter.feed(text, &mut self.buffer);
    }

    /// Flush a dangling partial character and drop unterminated sequences
    pub fn finish(&mut self) {
        let tail = self.decoder.finish();
        self.feed_str(&tail);
        self.interpreter.finish();
    }

    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    /// The trailing viewport, exactly `rows` lines
    pub fn viewport(&self) -> Vec<String> {
        self.buffer.viewport()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Rgb;

    fn snapshot(text: &str, cols: usize, rows: usize) -> Grid {
        interpret_snapshot(text, cols, rows, &Palette::default()).unwrap()
    }

    #[test]
    fn test_styled_cells() {
        let grid = snapshot("A\x1b[1mB\x1b[0mC\n", 3, 1);
        let line = grid.line(0).unwrap();

        assert_eq!(line.text(), "ABC");
        assert!(line.cell(0).unwrap().style.is_default());
        assert!(line.cell(1).unwrap().style.bold);
        assert!(line.cell(2).unwrap().style.is_default());
    }

    #[test]
    fn test_colors_tracked() {
        let grid = snapshot("\x1b[31;48;5;196mx\x1b[39my", 4, 1);
        let x = grid.cell(0, 0).unwrap();
        assert_eq!(x.style.fg, Some(Rgb(205, 49, 49)));
        assert_eq!(x.style.bg, Some(Rgb(255, 0, 0)));

        let y = grid.cell(1, 0).unwrap();
        assert_eq!(y.style.fg, None);
        assert_eq!(y.style.bg, Some(Rgb(255, 0, 0)));
    }

    #[test]
    fn test_padding_uses_pen_at_flush() {
        let grid = snapshot("a\x1b[44m\n", 3, 1);
        let pad = grid.cell(2, 0).unwrap();
        assert_eq!(pad.symbol, ' ');
        assert_eq!(pad.style.bg, Some(Rgb(36, 114, 200)));
        assert!(grid.cell(0, 0).unwrap().style.is_default());
    }

    #[test]
    fn test_non_sgr_sequences_ignored() {
        let grid = snapshot("\x1b[2J\x1b[Hab\x1b[5Ccd\x1b[?25l", 10, 1);
        assert_eq!(grid.text(), vec!["abcd"]);
    }

    #[test]
    fn test_lone_escape_keeps_following_text() {
        let grid = snapshot("\x1bPq\nhello\nworld", 10, 3);
        assert_eq!(grid.text(), vec!["Pq", "hello", "world"]);

        let grid = snapshot("\x1b_x\x1b^y\x1bXz", 10, 1);
        assert_eq!(grid.text(), vec!["_x^yXz"]);
    }

    #[test]
    fn test_controls() {
        let grid = snapshot("x\x07y\x08z\rq\tw", 10, 1);
        assert_eq!(grid.text(), vec!["q   w"]);
    }

    #[test]
    fn test_unterminated_sequence_discarded() {
        let grid = snapshot("ok\x1b[38;5", 5, 1);
        assert_eq!(grid.text(), vec!["ok"]);
    }

    #[test]
    fn test_private_marker_sgr_resets_pen() {
        let grid = snapshot("\x1b[1m\x1b[>4;2mY", 5, 1);
        assert!(grid.cell(0, 0).unwrap().style.is_default());
    }

    #[test]
    fn test_subparameter_sgr_resets_pen() {
        let grid = snapshot("\x1b[1;31m\x1b[4:3;22mX", 5, 1);
        assert!(grid.cell(0, 0).unwrap().style.is_default());
    }

    #[test]
    fn test_chunked_feed_matches_whole() {
        let text = "\x1b[1;32mgreen\x1b[0m plain\n\x1b[7minv";
        let whole = snapshot(text, 12, 3);

        let mut builder = GridBuilder::new(12, 3).unwrap();
        let mut interpreter = Interpreter::new(Styling::Track, Palette::default());
        for piece in text.as_bytes().chunks(3) {
            interpreter.feed(std::str::from_utf8(piece).unwrap(), &mut builder);
        }
        interpreter.finish();
        assert_eq!(builder.finish(interpreter.pen()), whole);
    }

    #[test]
    fn test_flatten_strips_styling() {
        let mut interpreter = Interpreter::new(Styling::Flatten, Palette::default());
        let mut builder = GridBuilder::new(5, 1).unwrap();
        interpreter.feed("\x1b[1;31mhi", &mut builder);
        assert!(interpreter.pen().is_default());
        let grid = builder.finish(interpreter.pen());
        assert!(grid.cell(0, 0).unwrap().style.is_default());
    }

    #[test]
    fn test_log_stream_wraps_and_strips() {
        let mut stream = LogStream::new(20, 5);
        stream.feed(b"\x1b[32mok\x1b[0m ");
        stream.feed(&[b'x'; 25]);
        stream.finish();

        let lines: Vec<&str> = stream.buffer().lines().collect();
        assert_eq!(lines, vec!["ok xxxxxxxxxxxxxxxxx"]);
        assert_eq!(stream.buffer().current(), "xxxxxxxx");
    }

    #[test]
    fn test_log_stream_split_utf8() {
        let mut stream = LogStream::new(20, 5);
        let bytes = "ab─cd".as_bytes();
        stream.feed(&bytes[..3]);
        stream.feed(&bytes[3..]);
        assert_eq!(stream.buffer().current(), "ab─cd");
    }

    #[test]
    fn test_log_stream_lone_escape() {
        let mut stream = LogStream::new(20, 5);
        stream.feed(b"\x1bPq\nhello\n");
        assert_eq!(stream.buffer().lines().collect::<Vec<_>>(), vec!["Pq", "hello"]);
    }

    #[test]
    fn test_log_stream_backspace() {
        let mut stream = LogStream::new(20, 5);
        stream.feed(b"abc\x08\x08d\n");
        assert_eq!(stream.viewport()[3], "ad");
    }
}
