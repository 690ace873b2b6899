//! Cell Model
//!
//! Platform-independent capture state. This module contains:
//! - Color references and the palette that resolves them
//! - Cell representation with style attributes
//! - Fixed-size grids built in snapshot mode
//! - The bounded scrollback used in streaming mode
//! - The JSON snapshot interchange format
//!
//! Everything here is deterministic: the same input always produces the
//! same grid.

mod cell;
mod color;
mod grid;
mod line;
mod scrollback;
mod sink;
mod snapshot;

pub use cell::{Cell, Style, BOLD_BRIGHTEN};
pub use color::{
    clamp_channel, cube_level, ColorRef, ColorRole, NamedColor, Palette, Rgb, DEFAULT_ANSI,
    DEFAULT_BACKGROUND, DEFAULT_FOREGROUND,
};
pub use grid::{Grid, GridBuilder};
pub use line::Line;
pub use scrollback::{LogBuffer, ScrollbackConfig, MIN_LOG_COLS, MIN_LOG_ROWS};
pub use sink::{tab_width, LineSink};
pub use snapshot::{
    ColorSpec, SnapshotCell, SnapshotDocument, MOD_BOLD, MOD_HIDDEN, MOD_REVERSED, MOD_UNDERLINED,
};
