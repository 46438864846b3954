use egui::{Color32, Pos2, Vec2};
use serde::{Deserialize, Serialize};

mod store;

pub use store::{AnnotationStore, StoreError};

/// 1-based page number. Pages are contiguous `1..=page_count` for the
/// lifetime of a loaded document.
pub type PageIndex = u32;

/// Discrete marker palette. Annotations reference a palette id rather than
/// a raw color so the palette can be restyled in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorId {
    #[default]
    Green,
    Red,
    Blue,
    Yellow,
    Black,
}

impl ColorId {
    pub const ALL: [ColorId; 5] = [
        ColorId::Green,
        ColorId::Red,
        ColorId::Blue,
        ColorId::Yellow,
        ColorId::Black,
    ];

    pub fn color32(self) -> Color32 {
        match self {
            ColorId::Green => Color32::from_rgb(0x2e, 0x7d, 0x32),
            ColorId::Red => Color32::from_rgb(0xc6, 0x28, 0x28),
            ColorId::Blue => Color32::from_rgb(0x15, 0x65, 0xc0),
            ColorId::Yellow => Color32::from_rgb(0xf9, 0xa8, 0x25),
            ColorId::Black => Color32::BLACK,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorId::Green => "Green",
            ColorId::Red => "Red",
            ColorId::Blue => "Blue",
            ColorId::Yellow => "Yellow",
            ColorId::Black => "Black",
        }
    }
}

/// The four shape kinds. Circle and Square are spanned by two corner
/// points, Line and Arrow by their endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    Square,
    Line,
    Arrow,
}

/// Structured font description for text annotations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Point size in content coordinates (scaled with zoom at draw time).
    pub size: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self { size: 16.0 }
    }
}

/// One piece of markup on a page.
///
/// All coordinates are page-local content coordinates, i.e. independent of
/// the current zoom factor; they are never rewritten when zoom changes.
/// An annotation is immutable once committed except for the start/end
/// translation applied while dragging a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Annotation {
    Shape {
        kind: ShapeKind,
        color: ColorId,
        start: Pos2,
        end: Pos2,
    },
    Text {
        color: ColorId,
        /// May contain newlines; drawn one line per `'\n'`-separated chunk.
        content: String,
        anchor: Pos2,
        font: FontSpec,
    },
}

impl Annotation {
    pub fn color(&self) -> ColorId {
        match self {
            Annotation::Shape { color, .. } | Annotation::Text { color, .. } => *color,
        }
    }

    /// Move the annotation by `delta`, keeping its size.
    ///
    /// Shapes move both endpoints. Text moves its anchor; nothing reaches
    /// this arm today since text is never hit-tested, but the method stays
    /// total.
    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Annotation::Shape { start, end, .. } => {
                *start += delta;
                *end += delta;
            }
            Annotation::Text { anchor, .. } => {
                *anchor += delta;
            }
        }
    }

    /// Start point for shapes, anchor for text. This is the reference
    /// point used when computing the pointer grab offset during drags.
    pub fn origin(&self) -> Pos2 {
        match self {
            Annotation::Shape { start, .. } => *start,
            Annotation::Text { anchor, .. } => *anchor,
        }
    }
}
