use egui::{Pos2, Rect, Response};

use crate::layout;

/// A pointer event on one page, already converted to page-local content
/// coordinates (screen position divided by zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down(Pos2),
    Moved(Pos2),
    Up(Pos2),
    /// Pointer left the page (or tracking was lost) mid-gesture.
    Out(Pos2),
}

/// Translate one frame's worth of egui interaction on a page widget into
/// domain pointer events. A plain click (press and release without
/// movement) yields a Down/Up pair at the same spot, which is how
/// degenerate shapes and text placement come out of egui's click/drag
/// disambiguation.
pub fn collect_pointer_events(response: &Response, page_rect: Rect, zoom: f32) -> Vec<PointerInput> {
    let mut events = Vec::new();
    let to_content = |pos: Pos2| layout::to_content_coords(pos, page_rect.min, zoom);

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            events.push(PointerInput::Down(to_content(pos)));
            events.push(PointerInput::Up(to_content(pos)));
        }
    }
    if response.drag_started() {
        // egui recognizes a drag only after a small movement threshold;
        // the gesture anchor is the original press position.
        let pressed_at = response
            .ctx
            .input(|i| i.pointer.press_origin())
            .or_else(|| response.interact_pointer_pos());
        if let Some(pos) = pressed_at {
            events.push(PointerInput::Down(to_content(pos)));
        }
    }
    if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            events.push(PointerInput::Moved(to_content(pos)));
        }
    }
    if response.drag_stopped() {
        match response.interact_pointer_pos() {
            Some(pos) => events.push(PointerInput::Up(to_content(pos))),
            // Release position unknown; treat it like the pointer
            // leaving the page at its last known spot.
            None => {
                if let Some(pos) = response.hover_pos() {
                    events.push(PointerInput::Out(to_content(pos)));
                }
            }
        }
    }

    events
}
