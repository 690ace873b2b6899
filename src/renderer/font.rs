//! Font Rendering
//!
//! Glyph sources for the rasterizer. `TrueTypeFont` uses fontdue for
//! simple, fast glyph rasterization with a per-character cache.
//! `BuiltinFont` draws the 8x8 bitmaps from `font8x8`, scaled up, and is
//! used whenever no font file can be loaded.

use std::collections::HashMap;
use std::path::Path;

use font8x8::{UnicodeFonts, BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, LATIN_FONTS};
use fontdue::{Font, FontSettings, Metrics};
use image::RgbImage;
use thiserror::Error;

use crate::core::Rgb;

/// Monospace fonts tried in order by `load_font`
pub const DEFAULT_FONT_CANDIDATES: [&str; 4] = [
    "/System/Library/Fonts/SFNSMono.ttf",
    "/Library/Fonts/Menlo.ttc",
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
];

/// Font-related errors
#[derive(Error, Debug)]
pub enum FontError {
    #[error("Font IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Font parse error: {0}")]
    Parse(String),

    #[error("No suitable font found")]
    NoFontFound,
}

/// A fixed-pitch glyph provider
pub trait GlyphSource {
    /// Ink bounding box of `c` in pixels
    fn measure(&mut self, c: char) -> (u32, u32);

    /// Draw `c` with its cell's top-left corner at `(x, y)`
    fn draw(&mut self, canvas: &mut RgbImage, c: char, x: i32, y: i32, color: Rgb);
}

/// A rendered glyph with its metrics and bitmap
#[derive(Debug, Clone)]
struct RasterizedGlyph {
    metrics: Metrics,
    /// Coverage, 1 byte per pixel
    bitmap: Vec<u8>,
}

/// TrueType/OpenType font rasterized with fontdue
pub struct TrueTypeFont {
    font: Font,
    font_size: f32,
    /// Offset of the baseline from the top of a cell
    baseline: i32,
    glyph_cache: HashMap<char, RasterizedGlyph>,
}

impl TrueTypeFont {
    /// Load a font file
    pub fn new(font_path: &Path, font_size: f32) -> Result<Self, FontError> {
        let font_data = std::fs::read(font_path)?;
        Self::from_bytes(&font_data, font_size)
    }

    /// Create a font from font data bytes
    pub fn from_bytes(font_data: &[u8], font_size: f32) -> Result<Self, FontError> {
        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| FontError::Parse(e.to_string()))?;

        // Cap height plus a one pixel top margin
        let reference = font.metrics('M', font_size);
        let baseline = reference.height as i32 + 1;

        Ok(Self {
            font,
            font_size,
            baseline,
            glyph_cache: HashMap::new(),
        })
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    fn rasterize(&mut self, c: char) -> &RasterizedGlyph {
        let font = &self.font;
        let size = self.font_size;
        self.glyph_cache.entry(c).or_insert_with(|| {
            let (metrics, bitmap) = font.rasterize(c, size);
            RasterizedGlyph { metrics, bitmap }
        })
    }
}

impl GlyphSource for TrueTypeFont {
    fn measure(&mut self, c: char) -> (u32, u32) {
        let metrics = self.rasterize(c).metrics;
        (metrics.width as u32, metrics.height as u32)
    }

    fn draw(&mut self, canvas: &mut RgbImage, c: char, x: i32, y: i32, color: Rgb) {
        let baseline = self.baseline;
        let glyph = self.rasterize(c);
        let Metrics {
            width,
            height,
            xmin,
            ymin,
            ..
        } = glyph.metrics;
        if width == 0 || height == 0 {
            return;
        }

        let gx = x + xmin;
        let gy = y + baseline - ymin - height as i32;
        for dy in 0..height {
            for dx in 0..width {
                let alpha = glyph.bitmap[dy * width + dx];
                blend_pixel(canvas, gx + dx as i32, gy + dy as i32, color, alpha);
            }
        }
    }
}

/// Largest scale factor of the built-in font
pub const MAX_BUILTIN_SCALE: u32 = 64;

/// Built-in 8x8 bitmap font, scaled by an integer factor
#[derive(Debug, Clone, Copy)]
pub struct BuiltinFont {
    scale: u32,
}

impl BuiltinFont {
    pub fn new(scale: u32) -> Self {
        Self {
            scale: scale.clamp(1, MAX_BUILTIN_SCALE),
        }
    }

    /// Pick the scale closest to a point size
    pub fn for_size(font_size: f32) -> Self {
        Self::new((font_size / 8.0).round().clamp(1.0, MAX_BUILTIN_SCALE as f32) as u32)
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    fn bitmap(c: char) -> [u8; 8] {
        BASIC_FONTS
            .get(c)
            .or_else(|| LATIN_FONTS.get(c))
            .or_else(|| BOX_FONTS.get(c))
            .or_else(|| BLOCK_FONTS.get(c))
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8])
    }
}

impl GlyphSource for BuiltinFont {
    fn measure(&mut self, c: char) -> (u32, u32) {
        let bitmap = Self::bitmap(c);
        let rows: Vec<usize> = (0..8).filter(|&r| bitmap[r] != 0).collect();
        let columns = bitmap.iter().fold(0u8, |acc, row| acc | row);
        let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
            return (0, 0);
        };

        // Bit 0 is the leftmost pixel
        let left = columns.trailing_zeros();
        let right = 8 - columns.leading_zeros();
        let width = (right - left) * self.scale;
        let height = (last - first + 1) as u32 * self.scale;
        (width, height)
    }

    fn draw(&mut self, canvas: &mut RgbImage, c: char, x: i32, y: i32, color: Rgb) {
        let scale = self.scale as i32;
        let top = y + 1;
        for (row, bits) in Self::bitmap(c).iter().enumerate() {
            for col in 0..8 {
                if (bits >> col) & 1 == 0 {
                    continue;
                }
                let px = x + col * scale;
                let py = top + row as i32 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        blend_pixel(canvas, px + sx, py + sy, color, 255);
                    }
                }
            }
        }
    }
}

/// Load the first usable font among `candidates`
pub fn find_font<P: AsRef<Path>>(candidates: &[P], font_size: f32) -> Result<TrueTypeFont, FontError> {
    for path in candidates {
        let path = path.as_ref();
        if !path.exists() {
            continue;
        }
        match TrueTypeFont::new(path, font_size) {
            Ok(font) => {
                tracing::info!(path = %path.display(), "Loaded font");
                return Ok(font);
            }
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "Skipping font"),
        }
    }
    Err(FontError::NoFontFound)
}

/// Load a glyph source, falling back to the built-in font
pub fn load_font<P: AsRef<Path>>(candidates: &[P], font_size: f32) -> Box<dyn GlyphSource> {
    match find_font(candidates, font_size) {
        Ok(font) => Box::new(font),
        Err(e) => {
            tracing::warn!(error = %e, "Falling back to built-in bitmap font");
            Box::new(BuiltinFont::for_size(font_size))
        }
    }
}

/// Alpha-blend `color` over one pixel, ignoring out-of-bounds coordinates
pub(crate) fn blend_pixel(canvas: &mut RgbImage, x: i32, y: i32, color: Rgb, alpha: u8) {
    if alpha == 0 || x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= canvas.width() || y >= canvas.height() {
        return;
    }

    let pixel = canvas.get_pixel_mut(x, y);
    if alpha == 255 {
        *pixel = color.into();
        return;
    }

    let a = alpha as u32;
    let mix = |src: u8, dst: u8| ((src as u32 * a + dst as u32 * (255 - a)) / 255) as u8;
    let [er, eg, eb] = pixel.0;
    pixel.0 = [mix(color.0, er), mix(color.1, eg), mix(color.2, eb)];
}
