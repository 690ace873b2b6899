//! Grid rasterization
//!
//! Renders a grid of styled cells, plus an optional header band, into an
//! RGB bitmap. Every cell has the same pixel pitch, derived once from the
//! ink box of `M`.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::font::GlyphSource;
use crate::core::{Grid, Palette, Rgb, BOLD_BRIGHTEN};

/// Layout and header colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Horizontal inset
    pub pad_x: u32,
    /// Vertical inset
    pub pad_y: u32,
    /// Smallest canvas produced
    pub min_width: u32,
    pub min_height: u32,
    /// Canvas fill; the palette background when unset
    pub background: Option<Rgb>,
    pub header_background: Rgb,
    pub title_color: Rgb,
    pub status_color: Rgb,
    /// Foreground multiplier for bold cells
    pub bold_factor: f32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            pad_x: 16,
            pad_y: 12,
            min_width: 0,
            min_height: 0,
            background: None,
            header_background: Rgb(12, 22, 40),
            title_color: Rgb(121, 203, 255),
            status_color: Rgb(170, 220, 255),
            bold_factor: BOLD_BRIGHTEN,
        }
    }
}

impl RasterConfig {
    /// Darker canvas used for streaming recordings
    pub fn recording() -> Self {
        Self {
            background: Some(Rgb(6, 10, 24)),
            ..Self::default()
        }
    }

    /// Header-less documentation screenshots
    pub fn screenshot() -> Self {
        Self {
            pad_x: 18,
            pad_y: 14,
            min_width: 320,
            min_height: 120,
            ..Self::default()
        }
    }
}

/// Text drawn in the header band
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    /// Optional second line
    pub status: Option<String>,
}

impl Header {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Pixel geometry of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub char_w: u32,
    pub char_h: u32,
    pub pad_x: u32,
    pub pad_y: u32,
    /// Height of the header band, 0 without a header
    pub header_h: u32,
    pub width: u32,
    pub height: u32,
}

impl Layout {
    /// Top-left pixel of a cell
    pub fn cell_origin(&self, col: usize, row: usize) -> (u32, u32) {
        (
            self.pad_x.saturating_add(span(col, self.char_w)),
            self.pad_y
                .saturating_add(self.header_h)
                .saturating_add(span(row, self.char_h)),
        )
    }
}

/// Pixel extent of `count` cells, saturating at `u32::MAX`
fn span(count: usize, pitch: u32) -> u32 {
    u32::try_from(count)
        .unwrap_or(u32::MAX)
        .saturating_mul(pitch)
}

/// Fit header text to `cols` characters, marking the cut with `...`
fn clip_text(text: &str, cols: usize) -> String {
    if text.chars().count() <= cols {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(cols.saturating_sub(3)).collect();
    clipped.push_str("...");
    clipped
}

fn clamp_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

fn fill_rect(canvas: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb) {
    let x_end = x.saturating_add(w).min(canvas.width());
    let y_end = y.saturating_add(h).min(canvas.height());
    let pixel = image::Rgb::from(color);
    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, pixel);
        }
    }
}

/// Renders grids with a fixed glyph source and palette
pub struct Rasterizer {
    font: Box<dyn GlyphSource>,
    palette: Palette,
    config: RasterConfig,
    char_w: u32,
    char_h: u32,
}

impl Rasterizer {
    pub fn new(mut font: Box<dyn GlyphSource>, palette: Palette, config: RasterConfig) -> Self {
        let (w, h) = font.measure('M');
        Self {
            font,
            palette,
            config,
            char_w: w.max(1),
            char_h: h.saturating_add(3),
        }
    }

    /// Cell pitch in pixels
    pub fn cell_size(&self) -> (u32, u32) {
        (self.char_w, self.char_h)
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    /// Geometry of a `cols x rows` frame
    pub fn layout(&self, cols: usize, rows: usize, header: Option<&Header>) -> Layout {
        let header_h = match header {
            None => 0,
            Some(Header { status: None, .. }) => self.char_h.saturating_add(10),
            Some(Header { status: Some(_), .. }) => self.char_h.saturating_mul(2).saturating_add(10),
        };
        let RasterConfig {
            pad_x,
            pad_y,
            min_width,
            min_height,
            ..
        } = self.config;

        let width = pad_x
            .saturating_mul(2)
            .saturating_add(span(cols, self.char_w))
            .max(min_width);
        let height = pad_y
            .saturating_mul(2)
            .saturating_add(header_h)
            .saturating_add(span(rows, self.char_h))
            .max(min_height);
        Layout {
            char_w: self.char_w,
            char_h: self.char_h,
            pad_x,
            pad_y,
            header_h,
            width,
            height,
        }
    }

    /// Canvas size in pixels
    pub fn canvas_size(&self, cols: usize, rows: usize, header: Option<&Header>) -> (u32, u32) {
        let layout = self.layout(cols, rows, header);
        (layout.width, layout.height)
    }

    /// Render one frame
    pub fn render(&mut self, grid: &Grid, header: Option<&Header>) -> RgbImage {
        let layout = self.layout(grid.cols(), grid.rows(), header);
        let background = self.config.background.unwrap_or(self.palette.background);
        let mut canvas = RgbImage::from_pixel(layout.width, layout.height, background.into());

        if let Some(header) = header {
            self.draw_header(&mut canvas, &layout, header, grid.cols());
        }

        let (char_w, char_h) = (layout.char_w, layout.char_h);
        for (row, line) in grid.lines().iter().enumerate() {
            for (col, cell) in line.cells().iter().enumerate() {
                let (x, y) = layout.cell_origin(col, row);
                let (fg, bg) = cell
                    .style
                    .effective_colors(&self.palette, self.config.bold_factor);

                fill_rect(&mut canvas, x, y, char_w, char_h, bg);
                if !cell.is_blank() {
                    self.font.draw(&mut canvas, cell.symbol, clamp_i32(x), clamp_i32(y), fg);
                }
                if cell.style.underline {
                    fill_rect(&mut canvas, x, y + char_h.saturating_sub(2), char_w, 1, fg);
                }
            }
        }
        canvas
    }

    fn draw_header(&mut self, canvas: &mut RgbImage, layout: &Layout, header: &Header, cols: usize) {
        let band_h = layout.header_h + layout.pad_y;
        fill_rect(canvas, 0, 0, layout.width, band_h, self.config.header_background);

        let title = clip_text(&header.title, cols);
        self.draw_text(canvas, &title, layout.pad_x, layout.pad_y, self.config.title_color);
        if let Some(status) = &header.status {
            let status = clip_text(status, cols);
            let y = layout.pad_y.saturating_add(layout.char_h).saturating_add(2);
            self.draw_text(canvas, &status, layout.pad_x, y, self.config.status_color);
        }
    }

    fn draw_text(&mut self, canvas: &mut RgbImage, text: &str, x: u32, y: u32, color: Rgb) {
        for (i, c) in text.chars().enumerate() {
            if c == ' ' {
                continue;
            }
            let cx = x.saturating_add(span(i, self.char_w));
            self.font.draw(canvas, c, clamp_i32(cx), clamp_i32(y), color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Cell, Line, Style};
    use crate::renderer::BuiltinFont;

    fn pixel_at(canvas: &RgbImage, x: u32, y: u32) -> Rgb {
        let [r, g, b] = canvas.get_pixel(x, y).0;
        Rgb(r, g, b)
    }

    fn rasterizer(config: RasterConfig) -> Rasterizer {
        Rasterizer::new(Box::new(BuiltinFont::new(1)), Palette::default(), config)
    }

    #[test]
    fn test_cell_metrics_from_m() {
        let raster = rasterizer(RasterConfig::default());
        let mut font = BuiltinFont::new(1);
        let (w, h) = font.measure('M');
        assert_eq!(raster.cell_size(), (w, h + 3));
    }

    #[test]
    fn test_blank_grid_dimensions() {
        let mut raster = rasterizer(RasterConfig::default());
        let (cw, ch) = raster.cell_size();
        let grid = Grid::new(10, 4).unwrap();

        let image = raster.render(&grid, None);
        assert_eq!(image.dimensions(), (32 + 10 * cw, 24 + 4 * ch));

        let header = Header::new("title");
        let image = raster.render(&grid, Some(&header));
        assert_eq!(image.height(), 24 + ch + 10 + 4 * ch);

        let header = header.with_status("elapsed");
        assert_eq!(
            raster.canvas_size(10, 4, Some(&header)).1,
            24 + 2 * ch + 10 + 4 * ch
        );
    }

    #[test]
    fn test_huge_layout_saturates() {
        let raster = rasterizer(RasterConfig::default());
        let header = Header::new("t").with_status("s");
        let layout = raster.layout(usize::MAX, usize::MAX, Some(&header));
        assert_eq!((layout.width, layout.height), (u32::MAX, u32::MAX));
        assert_eq!(layout.cell_origin(usize::MAX, usize::MAX), (u32::MAX, u32::MAX));

        let (cw, _) = raster.cell_size();
        assert_eq!(raster.canvas_size(1 << 20, 1, None).0, 32 + (1 << 20) * cw);
    }

    #[test]
    fn test_content_independent_size() {
        let mut raster = rasterizer(RasterConfig::default());
        let blank = Grid::new(6, 2).unwrap();
        let text = Grid::from_text_lines(&["hello!", "world"], 6, 2, Style::default()).unwrap();
        assert_eq!(
            raster.render(&blank, None).dimensions(),
            raster.render(&text, None).dimensions()
        );
    }

    #[test]
    fn test_screenshot_minimum_canvas() {
        let raster = rasterizer(RasterConfig::screenshot());
        assert_eq!(raster.canvas_size(1, 1, None), (320, 120));
    }

    #[test]
    fn test_cell_background_and_inverse() {
        let mut raster = rasterizer(RasterConfig::default());
        let style = Style {
            bg: Some(Rgb(1, 2, 3)),
            ..Default::default()
        };
        let inverse = Style {
            fg: Some(Rgb(9, 8, 7)),
            inverse: true,
            ..Default::default()
        };
        let line = Line::from_row(
            vec![Cell::blank(style), Cell::blank(inverse)],
            2,
            Style::default(),
        );
        let grid = Grid::from_lines(vec![line], 2, 1).unwrap();
        let image = raster.render(&grid, None);

        let layout = raster.layout(2, 1, None);
        let (x0, y0) = layout.cell_origin(0, 0);
        let (x1, y1) = layout.cell_origin(1, 0);
        assert_eq!(pixel_at(&image, x0, y0), Rgb(1, 2, 3));
        assert_eq!(pixel_at(&image, x1, y1), Rgb(9, 8, 7));
        // Padding keeps the canvas color
        assert_eq!(pixel_at(&image, 0, 0), Palette::default().background);
    }

    #[test]
    fn test_hidden_cell_draws_no_glyph() {
        let mut raster = rasterizer(RasterConfig::default());
        let hidden = Style {
            hidden: true,
            ..Default::default()
        };
        let visible = Grid::from_text_lines(&["M"], 1, 1, Style::default()).unwrap();
        let concealed = Grid::from_text_lines(&["M"], 1, 1, hidden).unwrap();
        let blank = Grid::new(1, 1).unwrap();

        assert_eq!(raster.render(&concealed, None), raster.render(&blank, None));
        assert_ne!(raster.render(&visible, None), raster.render(&blank, None));
    }

    #[test]
    fn test_underline_row() {
        let mut raster = rasterizer(RasterConfig::default());
        let underline = Style {
            underline: true,
            ..Default::default()
        };
        let grid = Grid::from_text_lines(&[" "], 1, 1, underline).unwrap();
        let image = raster.render(&grid, None);

        let layout = raster.layout(1, 1, None);
        let (x, y) = layout.cell_origin(0, 0);
        let uy = y + layout.char_h - 2;
        assert_eq!(pixel_at(&image, x, uy), Palette::default().foreground);
        assert_eq!(pixel_at(&image, x, uy - 1), Palette::default().background);
    }

    #[test]
    fn test_header_band() {
        let mut raster = rasterizer(RasterConfig::recording());
        let grid = Grid::new(4, 1).unwrap();
        let image = raster.render(&grid, Some(&Header::new("")));
        let layout = raster.layout(4, 1, Some(&Header::new("")));

        assert_eq!(pixel_at(&image, 0, 0), Rgb(12, 22, 40));
        let below = layout.header_h + layout.pad_y;
        assert_eq!(pixel_at(&image, 0, below), Rgb(6, 10, 24));
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut raster = rasterizer(RasterConfig::default());
        let bold = Style {
            bold: true,
            ..Default::default()
        };
        let grid = Grid::from_text_lines(&["abc", "xyz"], 5, 3, bold).unwrap();
        let header = Header::new("run").with_status("elapsed:   1.0s");
        assert_eq!(
            raster.render(&grid, Some(&header)),
            raster.render(&grid, Some(&header))
        );
    }

    #[test]
    fn test_clip_text() {
        assert_eq!(clip_text("short", 10), "short");
        assert_eq!(clip_text("a long header", 8), "a lon...");
        assert_eq!(clip_text("abcdef", 2), "...");
    }
}
