//! Reference collaborator implementations: a software raster surface
//! (tiny-skia paths for shapes, ab_glyph for text), a page renderer over
//! a stack of decoded images, and an encoder that stitches the composited
//! pages into a single PNG. The core only ever talks to these through
//! the seams in [`crate::document`].

use std::io::Cursor;
use std::sync::Arc;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use egui::{Color32, ColorImage, Pos2, Rect, Vec2};
use futures::future::BoxFuture;
use image::RgbaImage;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::annotation::PageIndex;
use crate::document::{DocumentEncoder, EncodeError, PageRenderer, RasterPage, RenderError};
use crate::error::EditorError;
use crate::renderer::Surface;

/// The typeface used for flattened text annotations: the proportional
/// face egui already embeds for on-screen display, so exported text
/// matches what the user saw.
pub fn default_font() -> Result<Arc<FontVec>, RenderError> {
    let definitions = egui::FontDefinitions::default();
    let data = definitions
        .font_data
        .get("Ubuntu-Light")
        .or_else(|| definitions.font_data.values().next())
        .ok_or_else(|| RenderError::Raster("no embedded font available".to_owned()))?;
    let bytes = data.font.clone().into_owned();
    let font = FontVec::try_from_vec(bytes)
        .map_err(|err| RenderError::Raster(format!("embedded font unusable: {err}")))?;
    Ok(Arc::new(font))
}

/// A pixel-backed drawing surface. Positions arrive in content
/// coordinates and are multiplied by `scale` (the export analog of the
/// painter's zoom).
pub struct RasterSurface {
    pixmap: Pixmap,
    /// Pristine page pixels, restored by `clear`.
    background: Pixmap,
    scale: f32,
    font: Arc<FontVec>,
}

impl RasterSurface {
    /// A blank white surface, for callers that have no page raster.
    pub fn blank(width: u32, height: u32, scale: f32, font: Arc<FontVec>) -> Result<Self, RenderError> {
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| RenderError::Raster(format!("bad surface size {width}x{height}")))?;
        pixmap.fill(tiny_skia::Color::WHITE);
        Ok(Self {
            background: pixmap.clone(),
            pixmap,
            scale,
            font,
        })
    }

    /// Wrap decoded page pixels.
    pub fn from_image(image: &RgbaImage, scale: f32, font: Arc<FontVec>) -> Result<Self, RenderError> {
        let mut pixmap = Pixmap::new(image.width(), image.height()).ok_or_else(|| {
            RenderError::Raster(format!("bad page size {}x{}", image.width(), image.height()))
        })?;
        for (pixel, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
            let [r, g, b, a] = src.0;
            *pixel = tiny_skia::ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        Ok(Self {
            background: pixmap.clone(),
            pixmap,
            scale,
            font,
        })
    }

    fn paint(color: Color32) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r(), color.g(), color.b(), color.a());
        paint.anti_alias = true;
        paint
    }

    fn stroke_path(&mut self, path: Option<tiny_skia::Path>, color: Color32, width: f32) {
        let Some(path) = path else { return };
        let stroke = Stroke {
            width: width * self.scale,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &path,
            &Self::paint(color),
            &stroke,
            Transform::identity(),
            None,
        );
    }

    /// Alpha-blend one glyph coverage sample over the premultiplied
    /// pixmap contents.
    fn blend_pixel(&mut self, x: i32, y: i32, coverage: f32, color: Color32) {
        if x < 0 || y < 0 || x >= self.pixmap.width() as i32 || y >= self.pixmap.height() as i32 {
            return;
        }
        let alpha = coverage.clamp(0.0, 1.0);
        let index = (y as usize * self.pixmap.width() as usize + x as usize) * 4;
        let data = self.pixmap.data_mut();
        let src = [
            color.r() as f32 * alpha,
            color.g() as f32 * alpha,
            color.b() as f32 * alpha,
            255.0 * alpha,
        ];
        for (offset, channel) in src.iter().enumerate() {
            let dst = data[index + offset] as f32;
            data[index + offset] = (channel + dst * (1.0 - alpha)).round().min(255.0) as u8;
        }
    }
}

impl Surface for RasterSurface {
    fn clear(&mut self) {
        self.pixmap = self.background.clone();
    }

    fn line(&mut self, from: Pos2, to: Pos2, color: Color32, width: f32) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x * self.scale, from.y * self.scale);
        pb.line_to(to.x * self.scale, to.y * self.scale);
        self.stroke_path(pb.finish(), color, width);
    }

    fn circle(&mut self, center: Pos2, radius: f32, color: Color32, width: f32) {
        if radius <= 0.0 {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.push_circle(center.x * self.scale, center.y * self.scale, radius * self.scale);
        self.stroke_path(pb.finish(), color, width);
    }

    fn rect(&mut self, rect: Rect, color: Color32, width: f32) {
        let Some(skia_rect) = tiny_skia::Rect::from_ltrb(
            rect.min.x * self.scale,
            rect.min.y * self.scale,
            rect.max.x * self.scale,
            rect.max.y * self.scale,
        ) else {
            return; // zero-area rect, nothing to stroke
        };
        let mut pb = PathBuilder::new();
        pb.push_rect(skia_rect);
        self.stroke_path(pb.finish(), color, width);
    }

    fn fill_polygon(&mut self, points: &[Pos2], color: Color32) {
        let Some((first, rest)) = points.split_first() else { return };
        let mut pb = PathBuilder::new();
        pb.move_to(first.x * self.scale, first.y * self.scale);
        for p in rest {
            pb.line_to(p.x * self.scale, p.y * self.scale);
        }
        pb.close();
        if let Some(path) = pb.finish() {
            self.pixmap.fill_path(
                &path,
                &Self::paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn text_line(&mut self, anchor: Pos2, text: &str, size: f32, color: Color32) {
        let scale = PxScale::from(size * self.scale);
        let font = Arc::clone(&self.font);
        let scaled = font.as_scaled(scale);

        let mut caret = anchor.x * self.scale;
        let baseline = anchor.y * self.scale;
        let mut previous = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, ab_glyph::point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    self.blend_pixel(
                        bounds.min.x as i32 + gx as i32,
                        bounds.min.y as i32 + gy as i32,
                        coverage,
                        color,
                    );
                });
            }
        }
    }
}

impl RasterPage for RasterSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn to_color_image(&self) -> ColorImage {
        let pixels = self
            .pixmap
            .pixels()
            .iter()
            .map(|p| Color32::from_rgba_premultiplied(p.red(), p.green(), p.blue(), p.alpha()))
            .collect();
        ColorImage {
            size: [self.pixmap.width() as usize, self.pixmap.height() as usize],
            pixels,
        }
    }
}

/// A document decoded from ordinary image files, one page per file in
/// drop order. Stands in for a real document decoder collaborator while
/// exercising the identical seams.
pub struct ImageDocument {
    pages: Arc<Vec<RgbaImage>>,
    font: Arc<FontVec>,
}

impl ImageDocument {
    /// Decode one page per `(name, bytes)` file. Fails with the first
    /// undecodable file; no partial document is produced.
    pub fn decode(files: &[(String, Vec<u8>)]) -> Result<Self, EditorError> {
        if files.is_empty() {
            return Err(EditorError::InvalidInput);
        }
        let mut pages = Vec::with_capacity(files.len());
        for (name, bytes) in files {
            let decoded = image::load_from_memory(bytes)
                .map_err(|err| EditorError::DecodeFailure(format!("{name}: {err}")))?;
            log::info!("decoded page {}: {} ({}x{})", pages.len() + 1, name, decoded.width(), decoded.height());
            pages.push(decoded.to_rgba8());
        }
        Ok(Self {
            pages: Arc::new(pages),
            font: default_font().map_err(|err| EditorError::DecodeFailure(err.to_string()))?,
        })
    }
}

impl PageRenderer for ImageDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, page: PageIndex) -> Option<Vec2> {
        self.pages
            .get(page as usize - 1)
            .map(|image| Vec2::new(image.width() as f32, image.height() as f32))
    }

    fn render_page(
        &self,
        page: PageIndex,
        scale: f32,
    ) -> BoxFuture<'static, Result<Box<dyn RasterPage>, RenderError>> {
        let pages = Arc::clone(&self.pages);
        let font = Arc::clone(&self.font);
        Box::pin(async move {
            let image = pages
                .get(page as usize - 1)
                .ok_or(RenderError::PageOutOfRange(page))?;
            let surface = if (scale - 1.0).abs() < f32::EPSILON {
                RasterSurface::from_image(image, scale, font)?
            } else {
                let width = (image.width() as f32 * scale).round().max(1.0) as u32;
                let height = (image.height() as f32 * scale).round().max(1.0) as u32;
                let resized =
                    image::imageops::resize(image, width, height, image::imageops::FilterType::Triangle);
                RasterSurface::from_image(&resized, scale, font)?
            };
            Ok(Box::new(surface) as Box<dyn RasterPage>)
        })
    }
}

/// Stitches the composited pages vertically into one PNG. Canvas width
/// follows the first page (the original's "page size from surface 0"
/// convention); narrower pages are left-aligned, wider ones clipped.
pub struct StitchedPngEncoder;

impl DocumentEncoder for StitchedPngEncoder {
    fn encode(&self, pages: Vec<Box<dyn RasterPage>>) -> Result<Vec<u8>, EncodeError> {
        let first = pages.first().ok_or(EncodeError::Empty)?;
        let width = first.width();
        let orientation = if first.width() > first.height() {
            "landscape"
        } else {
            "portrait"
        };
        log::debug!("encoding {} {orientation} pages at width {width}", pages.len());

        let total_height: u32 = pages.iter().map(|p| p.height()).sum();
        let mut canvas = RgbaImage::from_pixel(width, total_height, image::Rgba([255, 255, 255, 255]));

        let mut top = 0u32;
        for page in &pages {
            let pixels = page.to_color_image();
            for y in 0..page.height() {
                for x in 0..page.width().min(width) {
                    let color = pixels.pixels[(y * page.width() + x) as usize];
                    let [r, g, b, a] = color.to_srgba_unmultiplied();
                    canvas.put_pixel(x, top + y, image::Rgba([r, g, b, a]));
                }
            }
            top += page.height();
        }

        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(canvas)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|err| EncodeError::Encode(err.to_string()))?;
        Ok(bytes)
    }
}
