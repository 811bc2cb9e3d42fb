use anyhow::{Context, Result};
use fontdue::{Font, FontSettings};

use super::color::Color;
use super::surface::Surface;

/// Rasterizes glyphs with fontdue and composites them onto a [`Surface`].
/// The font is supplied by the caller (path or URL); effects that draw text
/// degrade to non-text shapes when no painter is available.
pub struct GlyphPainter {
    font: Font,
}

impl GlyphPainter {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| anyhow::anyhow!("failed to parse font: {e}"))?;
        Ok(Self { font })
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.font.lookup_glyph_index(ch) != 0
    }

    /// Composite one glyph into the cell whose top-left corner is (x, y).
    pub fn draw_char(
        &self,
        surface: &mut Surface,
        ch: char,
        x: f32,
        y: f32,
        size: f32,
        color: Color,
    ) {
        let (metrics, bitmap) = self.font.rasterize(ch, size);
        let glyph_y = y as i32 + size as i32 - metrics.height as i32 - metrics.ymin;
        for gy in 0..metrics.height {
            for gx in 0..metrics.width {
                let coverage = bitmap[gy * metrics.width + gx];
                if coverage == 0 {
                    continue;
                }
                let alpha = (coverage as u32 * color.a as u32 / 255) as u8;
                surface.blend_pixel(
                    x as i32 + gx as i32,
                    glyph_y + gy as i32,
                    color.with_alpha(alpha),
                );
            }
        }
    }
}

/// Download a font over HTTP(S) for the glyph painter.
pub fn load_font_from_url(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::blocking::get(url)
        .with_context(|| format!("Failed to fetch font from {url}"))?
        .error_for_status()
        .with_context(|| format!("Font server returned an error for {url}"))?;
    let bytes = response.bytes().context("Failed to read font response body")?;
    Ok(bytes.to_vec())
}
