//! Text-overlay composition.
//!
//! Given a template raster and a call sign, the compositor draws the text
//! centered on both axes with a fixed style (fill, font, size, letter
//! spacing) and returns a new raster with the template's own bounding box.
//! The operation is deterministic for one style value and has no side
//! effects; decode failures surface as [`Error::AssetCorrupt`].

use std::borrow::Cow;
use std::io::Cursor;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{DynamicImage, ImageFormat, Rgba};
use imageproc::drawing::draw_text_mut;

use decal_core::{Error, Result};

/// The font shipped with the pipeline, used unless a style overrides it.
pub const DEFAULT_FONT: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

/// Fixed overlay style applied to every call sign.
#[derive(Debug, Clone)]
pub struct OverlayStyle {
    /// Text fill color (RGBA).
    pub fill: Rgba<u8>,
    /// TrueType/OpenType font bytes.
    pub font_data: Cow<'static, [u8]>,
    /// Font size in pixels.
    pub font_size: f32,
    /// Extra horizontal spacing between glyphs, in pixels.
    pub letter_spacing: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            fill: Rgba([20, 24, 33, 255]),
            font_data: Cow::Borrowed(DEFAULT_FONT),
            font_size: 96.0,
            letter_spacing: 6.0,
        }
    }
}

/// Overlays call-sign text onto template rasters.
///
/// Construction validates the style's font once so per-item composition
/// cannot fail on font parsing.
#[derive(Debug)]
pub struct Compositor {
    font: FontVec,
    fill: Rgba<u8>,
    font_size: f32,
    letter_spacing: f32,
}

impl Compositor {
    /// Builds a compositor from a style.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the style's font bytes are not a
    /// parseable font.
    pub fn new(style: OverlayStyle) -> Result<Self> {
        let font = FontVec::try_from_vec(style.font_data.into_owned())
            .map_err(|e| Error::InvalidInput(format!("overlay style font is invalid: {e}")))?;
        Ok(Self {
            font,
            fill: style.fill,
            font_size: style.font_size,
            letter_spacing: style.letter_spacing,
        })
    }

    /// Composites `text` over the template raster and returns PNG bytes.
    ///
    /// The output keeps the template's resolution; content outside the
    /// text region is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssetCorrupt`] if the template raster cannot be
    /// decoded, or an internal error if the result cannot be re-encoded.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn compose(&self, template_raster: &[u8], text: &str) -> Result<Vec<u8>> {
        let decoded = image::load_from_memory(template_raster).map_err(|e| {
            Error::corrupt(format!("template raster failed to decode: {e}"))
        })?;
        let mut canvas = decoded.to_rgba8();
        let (width, height) = canvas.dimensions();

        let scale = PxScale::from(self.font_size);
        let scaled = self.font.as_scaled(scale);

        // Glyph-by-glyph layout so letter spacing is explicit rather than
        // baked into a single draw call.
        let advances: Vec<(char, f32)> = text
            .chars()
            .map(|c| (c, scaled.h_advance(scaled.glyph_id(c))))
            .collect();
        let glyph_width: f32 = advances.iter().map(|(_, advance)| advance).sum();
        let spacing_total = if advances.len() > 1 {
            self.letter_spacing * (advances.len() - 1) as f32
        } else {
            0.0
        };
        let text_width = glyph_width + spacing_total;
        let text_height = scaled.height();

        let mut cursor_x = (width as f32 - text_width) / 2.0;
        let top_y = ((height as f32 - text_height) / 2.0).round() as i32;

        let mut rendered = [0u8; 4];
        for (c, advance) in advances {
            draw_text_mut(
                &mut canvas,
                self.fill,
                cursor_x.round() as i32,
                top_y,
                scale,
                &self.font,
                c.encode_utf8(&mut rendered),
            );
            cursor_x += advance + self.letter_spacing;
        }

        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| Error::internal(format!("encoding composited raster: {e}")))?;
        Ok(out.into_inner())
    }
}
