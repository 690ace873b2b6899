//! Renderer Module
//!
//! Turns cell grids into bitmaps. Glyphs come from a `GlyphSource`: a
//! TrueType font when one can be loaded, otherwise the built-in bitmap font.

mod font;
mod raster;

pub use font::{
    find_font, load_font, BuiltinFont, FontError, GlyphSource, TrueTypeFont,
    DEFAULT_FONT_CANDIDATES, MAX_BUILTIN_SCALE,
};
pub use raster::{Header, Layout, RasterConfig, Rasterizer};
