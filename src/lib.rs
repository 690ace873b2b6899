//! Mochi Reel Library
//!
//! Turns raw terminal output into pictures: escape sequences are
//! interpreted into a grid of styled cells, the grid is rasterized into a
//! bitmap, and timed bitmaps are encoded as a looping animated GIF.
//!
//! - `core`: Colors, cells, grids, the streaming scrollback
//! - `parser`: Escape sequence parser and SGR rules
//! - `terminal`: Interpreter tying the parser to a grid or scrollback
//! - `renderer`: Fonts and rasterization
//! - `reel`: Frame sequencing, recording sessions, GIF/PNG output
//! - `app`: Configuration

pub mod app;
pub mod core;
pub mod error;
pub mod parser;
pub mod reel;
pub mod renderer;
pub mod terminal;

pub use error::{Error, Result, MAX_GRID_DIM};
pub use terminal::{interpret_snapshot, Interpreter, LogStream, Styling};
