use egui::{Pos2, Vec2};

use crate::annotation::PageIndex;

pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 2.0;
pub const ZOOM_STEP: f32 = 0.1;

/// Fixed vertical gap between stacked pages, in screen pixels.
pub const PAGE_GAP: f32 = 80.0;

/// Scale used for the thumbnail sidebar.
pub const PREVIEW_SCALE: f32 = 0.2;

/// Screen/client position -> page-local content coordinates. Content
/// coordinates are zoom-independent, so everything entering the
/// annotation store goes through this.
pub fn to_content_coords(client: Pos2, page_origin: Pos2, zoom: f32) -> Pos2 {
    ((client - page_origin) / zoom).to_pos2()
}

/// Inverse of [`to_content_coords`].
pub fn to_screen_coords(content: Pos2, page_origin: Pos2, zoom: f32) -> Pos2 {
    page_origin + content.to_vec2() * zoom
}

/// Vertical stacking of all pages at a given zoom: each page's top
/// offset, the widest page, and the total content height. Pages are
/// separated by [`PAGE_GAP`] (the gap itself does not scale with zoom).
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    tops: Vec<f32>,
    max_width: f32,
    total_height: f32,
}

impl PageLayout {
    pub fn compute(page_sizes: &[Vec2], zoom: f32) -> Self {
        let mut tops = Vec::with_capacity(page_sizes.len());
        let mut top = 0.0;
        let mut max_width = 0.0f32;
        for size in page_sizes {
            tops.push(top);
            top += size.y * zoom + PAGE_GAP;
            max_width = max_width.max(size.x * zoom);
        }
        Self {
            tops,
            max_width,
            total_height: top,
        }
    }

    /// Top offset of `page` within the stacked content, if it exists.
    pub fn page_top(&self, page: PageIndex) -> Option<f32> {
        self.tops.get(page as usize - 1).copied()
    }

    pub fn page_count(&self) -> usize {
        self.tops.len()
    }

    pub fn max_width(&self) -> f32 {
        self.max_width
    }

    pub fn total_height(&self) -> f32 {
        self.total_height
    }

    /// The page whose band contains vertical offset `y`, for deciding
    /// which page is "current" while scrolling. Offsets past the last
    /// page clamp to the last page.
    pub fn page_at_offset(&self, y: f32) -> Option<PageIndex> {
        if self.tops.is_empty() {
            return None;
        }
        let index = self.tops.iter().rposition(|top| *top <= y).unwrap_or(0);
        Some(index as PageIndex + 1)
    }
}

/// Scroll offset that keeps the content point under `viewport_point`
/// stationary across a zoom change. The stable point is recovered at the
/// old zoom and re-projected at the new one.
pub fn anchored_scroll(
    viewport_point: Vec2,
    old_scroll: Vec2,
    old_zoom: f32,
    new_zoom: f32,
) -> Vec2 {
    let content = (viewport_point + old_scroll) / old_zoom;
    content * new_zoom - viewport_point
}
