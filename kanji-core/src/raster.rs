//! Rasterization of drawings into fixed-size grayscale images.
//!
//! Strokes are scaled from canvas coordinates into the output image and
//! painted with the tiny-skia pipeline. The result is a pure function of the
//! strokes and the [`RasterConfig`]; nothing is cached between calls.

use image::ImageEncoder;
use serde::{Deserialize, Serialize};
use tiny_skia as sk;

use crate::error::{InkError, InkResult};
use crate::stroke::Stroke;

/// Configuration for rendering a drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Stroke width in output pixels.
    pub stroke_width: f32,
    /// Background gray level.
    pub background: u8,
    /// Ink gray level.
    pub ink: u8,
    /// Enable anti-aliasing.
    pub anti_alias: bool,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            stroke_width: 4.0,
            background: 0,
            ink: 255,
            anti_alias: true,
        }
    }
}

/// A rendered drawing: row-major 8-bit grayscale pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    background: u8,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Create an image filled with `background`.
    #[must_use]
    pub fn blank(width: u32, height: u32, background: u8) -> Self {
        Self {
            width,
            height,
            background,
            pixels: vec![background; (width as usize) * (height as usize)],
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Background gray level the image was rendered on.
    #[must_use]
    pub fn background(&self) -> u8 {
        self.background
    }

    /// Row-major pixel data.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Gray level at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get((y as usize) * (self.width as usize) + (x as usize))
            .copied()
    }

    /// Whether no pixel differs from the background.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&p| p == self.background)
    }

    /// Fraction of pixels touched by ink, in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ink_coverage(&self) -> f32 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        let inked = self
            .pixels
            .iter()
            .filter(|&&p| p != self.background)
            .count();
        inked as f32 / self.pixels.len() as f32
    }

    /// Encode the image as a grayscale PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn encode_png(&self) -> InkResult<Vec<u8>> {
        let mut buf = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buf)
            .write_image(
                &self.pixels,
                self.width,
                self.height,
                image::ColorType::L8.into(),
            )
            .map_err(|e| InkError::Raster(format!("PNG encoding failed: {e}")))?;
        Ok(buf)
    }
}

/// Render `strokes` drawn on a `canvas_width` x `canvas_height` surface.
///
/// Single-point (degenerate) strokes are painted as a dot of the stroke width.
///
/// # Errors
///
/// Returns an error if the output dimensions are zero.
pub fn rasterize<'a, I>(
    strokes: I,
    canvas_width: f32,
    canvas_height: f32,
    config: &RasterConfig,
) -> InkResult<RasterImage>
where
    I: IntoIterator<Item = &'a Stroke>,
{
    let mut pixmap = sk::Pixmap::new(config.width, config.height).ok_or_else(|| {
        InkError::Raster(format!(
            "invalid raster size {}x{}",
            config.width, config.height
        ))
    })?;
    pixmap.fill(gray(config.background));

    #[allow(clippy::cast_precision_loss)]
    let (sx, sy) = (
        config.width as f32 / canvas_width.max(1.0),
        config.height as f32 / canvas_height.max(1.0),
    );

    let mut paint = sk::Paint::default();
    paint.set_color(gray(config.ink));
    paint.anti_alias = config.anti_alias;

    let pen = sk::Stroke {
        width: config.stroke_width,
        line_cap: sk::LineCap::Round,
        line_join: sk::LineJoin::Round,
        ..sk::Stroke::default()
    };

    for stroke in strokes {
        let Some(origin) = stroke.points().first() else {
            continue;
        };

        if stroke.is_degenerate() {
            let radius = (config.stroke_width / 2.0).max(0.5);
            if let Some(dot) = sk::PathBuilder::from_circle(origin.x * sx, origin.y * sy, radius)
            {
                pixmap.fill_path(
                    &dot,
                    &paint,
                    sk::FillRule::Winding,
                    sk::Transform::identity(),
                    None,
                );
            }
            continue;
        }

        let mut builder = sk::PathBuilder::new();
        builder.move_to(origin.x * sx, origin.y * sy);
        for point in &stroke.points()[1..] {
            builder.line_to(point.x * sx, point.y * sy);
        }
        if let Some(path) = builder.finish() {
            pixmap.stroke_path(&path, &paint, &pen, sk::Transform::identity(), None);
        }
    }

    // Background and ink are opaque gray, so any channel carries the level.
    let pixels = pixmap.data().chunks_exact(4).map(|px| px[0]).collect();

    Ok(RasterImage {
        width: config.width,
        height: config.height,
        background: config.background,
        pixels,
    })
}

fn gray(level: u8) -> sk::Color {
    sk::Color::from_rgba8(level, level, level, 255)
}
