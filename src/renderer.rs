use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke as EguiStroke};

use crate::annotation::{Annotation, ColorId, FontSpec, ShapeKind};

/// Outline width for all shapes, in content coordinates.
pub const STROKE_WIDTH: f32 = 2.0;

/// Vertical advance between the lines of a multi-line text annotation.
pub const TEXT_LINE_HEIGHT: f32 = 18.0;

pub const ARROW_HEAD_LENGTH: f32 = 15.0;

/// Arrows shorter than this are stretched to it before the head is
/// placed, so a tiny drag still yields a legible arrow.
pub const ARROW_MIN_LENGTH: f32 = 32.0;

/// The 2D drawing surface the bridge replays annotations onto. Positions
/// and sizes are in content coordinates; each implementation decides how
/// they map to its own pixels (the live painter applies zoom, the
/// flatten surface applies the export scale).
pub trait Surface {
    /// Reset the surface to its blank state.
    fn clear(&mut self);
    fn line(&mut self, from: Pos2, to: Pos2, color: Color32, width: f32);
    fn circle(&mut self, center: Pos2, radius: f32, color: Color32, width: f32);
    fn rect(&mut self, rect: Rect, color: Color32, width: f32);
    /// Filled convex polygon; used for arrowheads.
    fn fill_polygon(&mut self, points: &[Pos2], color: Color32);
    /// A single line of text with its baseline at `anchor`.
    fn text_line(&mut self, anchor: Pos2, text: &str, size: f32, color: Color32);
}

/// Clear the surface, then draw every annotation in sequence order
/// (insertion order = z-order). Idempotent: replaying the same sequence
/// twice produces identical output and accumulates nothing.
pub fn redraw<S: Surface + ?Sized>(surface: &mut S, annotations: &[Annotation]) {
    surface.clear();
    draw_annotations(surface, annotations);
}

/// Draw without clearing first. This is the export-compositing entry
/// point, where the rendered page pixels underneath must survive.
pub fn draw_annotations<S: Surface + ?Sized>(surface: &mut S, annotations: &[Annotation]) {
    for annotation in annotations {
        draw_annotation(surface, annotation);
    }
}

fn draw_annotation<S: Surface + ?Sized>(surface: &mut S, annotation: &Annotation) {
    match annotation {
        Annotation::Shape { kind, color, start, end } => {
            draw_shape(surface, *kind, *color, *start, *end);
        }
        Annotation::Text { color, content, anchor, font } => {
            draw_text(surface, *anchor, content, *font, *color);
        }
    }
}

/// Draw one shape from its two defining points. Also used for the live
/// preview while a drag is still in progress.
pub fn draw_shape<S: Surface + ?Sized>(
    surface: &mut S,
    kind: ShapeKind,
    color: ColorId,
    start: Pos2,
    end: Pos2,
) {
    let color = color.color32();
    match kind {
        ShapeKind::Circle => {
            surface.circle(start, start.distance(end), color, STROKE_WIDTH);
        }
        ShapeKind::Square => {
            surface.rect(Rect::from_two_pos(start, end), color, STROKE_WIDTH);
        }
        ShapeKind::Line => {
            surface.line(start, end, color, STROKE_WIDTH);
        }
        ShapeKind::Arrow => {
            draw_arrow(surface, start, end, color);
        }
    }
}

fn draw_text<S: Surface + ?Sized>(
    surface: &mut S,
    anchor: Pos2,
    content: &str,
    font: FontSpec,
    color: ColorId,
) {
    let color = color.color32();
    for (i, line) in content.split('\n').enumerate() {
        let baseline = Pos2::new(anchor.x, anchor.y + i as f32 * TEXT_LINE_HEIGHT);
        surface.text_line(baseline, line, font.size, color);
    }
}

fn draw_arrow<S: Surface + ?Sized>(surface: &mut S, from: Pos2, mut to: Pos2, color: Color32) {
    let delta = to - from;
    let length = delta.length();
    if length == 0.0 {
        return;
    }
    if length < ARROW_MIN_LENGTH {
        to = from + delta * (ARROW_MIN_LENGTH / length);
    }

    surface.line(from, to, color, STROKE_WIDTH);

    let angle = (to.y - from.y).atan2(to.x - from.x);
    let left = Pos2::new(
        to.x - ARROW_HEAD_LENGTH * (angle - std::f32::consts::FRAC_PI_6).cos(),
        to.y - ARROW_HEAD_LENGTH * (angle - std::f32::consts::FRAC_PI_6).sin(),
    );
    let right = Pos2::new(
        to.x - ARROW_HEAD_LENGTH * (angle + std::f32::consts::FRAC_PI_6).cos(),
        to.y - ARROW_HEAD_LENGTH * (angle + std::f32::consts::FRAC_PI_6).sin(),
    );
    surface.fill_polygon(&[to, left, right], color);
}

/// Live drawing surface over an [`egui::Painter`], mapping content
/// coordinates onto a page rect at the current zoom. Clearing is a no-op
/// because immediate mode repaints from blank every frame, which keeps
/// the redraw contract trivially idempotent.
pub struct PainterSurface<'a> {
    painter: &'a Painter,
    origin: Pos2,
    zoom: f32,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a Painter, origin: Pos2, zoom: f32) -> Self {
        Self { painter, origin, zoom }
    }

    fn project(&self, pos: Pos2) -> Pos2 {
        crate::layout::to_screen_coords(pos, self.origin, self.zoom)
    }
}

impl Surface for PainterSurface<'_> {
    fn clear(&mut self) {}

    fn line(&mut self, from: Pos2, to: Pos2, color: Color32, width: f32) {
        self.painter.line_segment(
            [self.project(from), self.project(to)],
            EguiStroke::new(width * self.zoom, color),
        );
    }

    fn circle(&mut self, center: Pos2, radius: f32, color: Color32, width: f32) {
        self.painter.circle_stroke(
            self.project(center),
            radius * self.zoom,
            EguiStroke::new(width * self.zoom, color),
        );
    }

    fn rect(&mut self, rect: Rect, color: Color32, width: f32) {
        let projected = Rect::from_two_pos(self.project(rect.min), self.project(rect.max));
        self.painter
            .rect_stroke(projected, 0.0, EguiStroke::new(width * self.zoom, color));
    }

    fn fill_polygon(&mut self, points: &[Pos2], color: Color32) {
        let projected = points.iter().map(|p| self.project(*p)).collect();
        self.painter
            .add(egui::Shape::convex_polygon(projected, color, EguiStroke::NONE));
    }

    fn text_line(&mut self, anchor: Pos2, text: &str, size: f32, color: Color32) {
        self.painter.text(
            self.project(anchor),
            Align2::LEFT_BOTTOM,
            text,
            FontId::proportional(size * self.zoom),
            color,
        );
    }
}
