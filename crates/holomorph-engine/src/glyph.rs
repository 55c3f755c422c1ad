//! Text rasterization for the text particle shape.
//!
//! A text string is rendered into a small grayscale bitmap, then sparsely
//! sampled: every lit pixel becomes a candidate particle position. Two
//! rasterizer backends are provided. The default is a built-in 5x7 dot
//! matrix font with no file dependencies. When a TrueType font path is
//! configured, glyphs are rendered through `rusttype` instead.

use std::path::{Path, PathBuf};

use rusttype::{point, Font, PositionedGlyph, Scale};
use serde::{Deserialize, Serialize};

use holomorph_core::{Error, Result};

/// Glyph columns in the built-in dot matrix font.
const GLYPH_COLS: usize = 5;
/// Glyph rows in the built-in dot matrix font.
const GLYPH_ROWS: usize = 7;

/// Rasterization settings shared by both backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterConfig {
    /// Bitmap width in pixels.
    pub width: usize,
    /// Bitmap height in pixels.
    pub height: usize,
    /// Pixels with intensity strictly above this value count as lit.
    pub intensity_threshold: u8,
    /// Sampling step in pixels along both axes.
    pub sample_stride: usize,
    /// Optional TrueType font file. When absent the dot matrix font is used.
    pub font_path: Option<PathBuf>,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 100,
            intensity_threshold: 128,
            sample_stride: 2,
            font_path: None,
        }
    }
}

/// Grayscale intensity buffer produced by a rasterizer.
#[derive(Debug, Clone)]
pub struct GlyphBitmap {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl GlyphBitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Intensity at a pixel. Out of bounds reads as dark.
    pub fn intensity(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            0
        }
    }

    /// Writes a pixel. Out of bounds writes are dropped.
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = value;
        }
    }

    /// Samples the bitmap on a coarse grid and returns the pixel coordinates
    /// of every lit sample in row-major order.
    pub fn lit_points(&self, threshold: u8, stride: usize) -> Vec<(usize, usize)> {
        let stride = stride.max(1);
        let mut points = Vec::new();
        for y in (0..self.height).step_by(stride) {
            for x in (0..self.width).step_by(stride) {
                if self.pixels[y * self.width + x] > threshold {
                    points.push((x, y));
                }
            }
        }
        points
    }
}

/// Renders a text string into a grayscale bitmap.
pub trait GlyphRasterizer: Send + Sync {
    fn rasterize(&self, text: &str) -> GlyphBitmap;
}

/// Builds the rasterizer backend selected by the configuration.
pub fn build_rasterizer(config: &RasterConfig) -> Result<Box<dyn GlyphRasterizer>> {
    match &config.font_path {
        Some(path) => Ok(Box::new(TtfRasterizer::from_file(path, config.clone())?)),
        None => Ok(Box::new(BitmapFontRasterizer::new(config.clone()))),
    }
}

/// Built-in 5x7 dot matrix rasterizer.
///
/// Supports uppercase letters, digits and space. Lowercase input is folded
/// to uppercase, anything else renders as a solid block. Glyphs are scaled
/// by an integer factor to fill the bitmap and centered.
pub struct BitmapFontRasterizer {
    config: RasterConfig,
}

impl BitmapFontRasterizer {
    pub fn new(config: RasterConfig) -> Self {
        Self { config }
    }
}

impl GlyphRasterizer for BitmapFontRasterizer {
    fn rasterize(&self, text: &str) -> GlyphBitmap {
        let mut bitmap = GlyphBitmap::new(self.config.width, self.config.height);
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return bitmap;
        }

        // 5 glyph columns plus a 1 column gap between characters.
        let cols = chars.len() * (GLYPH_COLS + 1) - 1;
        let max_w = self.config.width * 9 / 10;
        let max_h = self.config.height * 9 / 10;
        let scale = (max_w / cols).min(max_h / GLYPH_ROWS).max(1);
        let x0 = self.config.width.saturating_sub(cols * scale) / 2;
        let y0 = self.config.height.saturating_sub(GLYPH_ROWS * scale) / 2;

        for (ci, &c) in chars.iter().enumerate() {
            let rows = glyph_rows(c);
            for (r, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_COLS {
                    if (bits >> (GLYPH_COLS - 1 - col)) & 1 == 0 {
                        continue;
                    }
                    let px0 = x0 + (ci * (GLYPH_COLS + 1) + col) * scale;
                    let py0 = y0 + r * scale;
                    for dy in 0..scale {
                        for dx in 0..scale {
                            bitmap.set(px0 + dx, py0 + dy, 255);
                        }
                    }
                }
            }
        }

        bitmap
    }
}

/// Row bit patterns for one character, most significant bit leftmost.
fn glyph_rows(c: char) -> [u8; GLYPH_ROWS] {
    match c.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x1B, 0x11],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x06, 0x08, 0x10, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        ' ' => [0x00; GLYPH_ROWS],
        _ => [0x1F; GLYPH_ROWS],
    }
}

/// TrueType rasterizer backed by `rusttype`.
#[derive(Debug)]
pub struct TtfRasterizer {
    font: Font<'static>,
    config: RasterConfig,
}

impl TtfRasterizer {
    /// Loads a font file from disk.
    pub fn from_file(path: &Path, config: RasterConfig) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| Error::Raster(format!("failed to read font {}: {}", path.display(), e)))?;
        let font = Font::try_from_vec(data)
            .ok_or_else(|| Error::Raster(format!("unsupported font data in {}", path.display())))?;
        Ok(Self { font, config })
    }
}

impl GlyphRasterizer for TtfRasterizer {
    fn rasterize(&self, text: &str) -> GlyphBitmap {
        let mut bitmap = GlyphBitmap::new(self.config.width, self.config.height);
        if text.is_empty() {
            return bitmap;
        }

        let scale = Scale::uniform(self.config.height as f32 * 0.6);
        let v_metrics = self.font.v_metrics(scale);
        let glyphs: Vec<PositionedGlyph> = self
            .font
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .collect();

        let text_width = glyphs
            .iter()
            .rev()
            .filter_map(|g| g.pixel_bounding_box().map(|bb| bb.max.x))
            .next()
            .unwrap_or(0)
            .max(0) as usize;
        let text_height = (v_metrics.ascent - v_metrics.descent).ceil().max(0.0) as usize;
        let x_off = bitmap.width().saturating_sub(text_width) as i32 / 2;
        let y_off = bitmap.height().saturating_sub(text_height) as i32 / 2;

        for glyph in &glyphs {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    let px = bb.min.x + gx as i32 + x_off;
                    let py = bb.min.y + gy as i32 + y_off;
                    if px >= 0 && py >= 0 {
                        bitmap.set(px as usize, py as usize, (v * 255.0) as u8);
                    }
                });
            }
        }

        bitmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_font_lights_pixels() {
        let raster = BitmapFontRasterizer::new(RasterConfig::default());
        let bitmap = raster.rasterize("A");
        let lit = bitmap.lit_points(128, 2);
        assert!(!lit.is_empty());
        for &(x, y) in &lit {
            assert!(x < bitmap.width() && y < bitmap.height());
        }
    }

    #[test]
    fn test_empty_text_is_dark() {
        let raster = BitmapFontRasterizer::new(RasterConfig::default());
        let bitmap = raster.rasterize("");
        assert!(bitmap.lit_points(128, 2).is_empty());
    }

    #[test]
    fn test_space_only_text_is_dark() {
        let raster = BitmapFontRasterizer::new(RasterConfig::default());
        let bitmap = raster.rasterize("   ");
        assert!(bitmap.lit_points(128, 2).is_empty());
    }

    #[test]
    fn test_lowercase_folds_to_uppercase() {
        let raster = BitmapFontRasterizer::new(RasterConfig::default());
        let upper = raster.rasterize("HOLO");
        let lower = raster.rasterize("holo");
        assert_eq!(upper.lit_points(128, 2), lower.lit_points(128, 2));
    }

    #[test]
    fn test_longer_text_scales_down_not_out() {
        let raster = BitmapFontRasterizer::new(RasterConfig::default());
        let bitmap = raster.rasterize("HOLOMORPHIC FIELD");
        let lit = bitmap.lit_points(128, 1);
        assert!(!lit.is_empty());
        for &(x, y) in &lit {
            assert!(x < bitmap.width() && y < bitmap.height());
        }
    }

    #[test]
    fn test_stride_reduces_sample_count() {
        let raster = BitmapFontRasterizer::new(RasterConfig::default());
        let bitmap = raster.rasterize("W");
        let dense = bitmap.lit_points(128, 1).len();
        let sparse = bitmap.lit_points(128, 4).len();
        assert!(dense > sparse);
        assert!(sparse > 0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut bitmap = GlyphBitmap::new(4, 4);
        bitmap.set(1, 1, 128);
        bitmap.set(2, 2, 129);
        let lit = bitmap.lit_points(128, 1);
        assert_eq!(lit, vec![(2, 2)]);
    }

    #[test]
    fn test_out_of_bounds_access_is_silent() {
        let mut bitmap = GlyphBitmap::new(4, 4);
        bitmap.set(10, 10, 255);
        assert_eq!(bitmap.intensity(10, 10), 0);
    }

    #[test]
    fn test_ttf_missing_file_errors() {
        let err = TtfRasterizer::from_file(
            Path::new("/nonexistent/font.ttf"),
            RasterConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Raster(_)));
    }

    #[test]
    fn test_build_rasterizer_defaults_to_bitmap_font() {
        let raster = build_rasterizer(&RasterConfig::default()).unwrap();
        let bitmap = raster.rasterize("HI");
        assert!(!bitmap.lit_points(128, 2).is_empty());
    }
}
