use egui::{Color32, Rect, Sense, Stroke, Vec2, pos2, vec2};

use crate::MarkupApp;
use crate::annotation::PageIndex;
use crate::input;
use crate::layout::{self, PageLayout};
use crate::renderer::{self, PainterSurface};

/// The page stack: renders every page raster with its annotation overlay
/// replayed on top, and feeds per-page pointer events to the interaction
/// controller.
pub fn central_panel(app: &mut MarkupApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        if app.session.is_none() {
            ui.centered_and_justified(|ui| {
                ui.heading("Drop PNG or JPEG files here — each image becomes a page");
            });
            return;
        }

        let viewport = ui.max_rect();

        // Zoom requests: toolbar buttons anchor at the viewport center,
        // ctrl+wheel (or pinch) at the pointer, keeping the content
        // point under the anchor stationary.
        let mut zoom_steps = app.zoom_request.take().unwrap_or(0);
        let mut anchor = viewport.center();
        let zoom_delta = ctx.input(|i| i.zoom_delta());
        if zoom_delta != 1.0 {
            zoom_steps = if zoom_delta > 1.0 { 1 } else { -1 };
            if let Some(pointer) = ctx.pointer_hover_pos() {
                anchor = pointer;
            }
        }
        if zoom_steps != 0 {
            let session = app.session.as_mut().expect("session checked above");
            let old_zoom = session.zoom();
            if session.adjust_zoom(zoom_steps) {
                let viewport_point = anchor - viewport.min;
                app.pending_scroll = Some(layout::anchored_scroll(
                    viewport_point,
                    app.scroll_offset,
                    old_zoom,
                    session.zoom(),
                ));
            }
        }

        let zoom = app.session.as_ref().expect("session checked above").zoom();
        let page_layout = PageLayout::compute(&app.page_sizes, zoom);

        if let Some(page) = app.scroll_to_page.take() {
            if let Some(top) = page_layout.page_top(page) {
                app.pending_scroll = Some(vec2(app.scroll_offset.x, top));
            }
        }

        let mut scroll_area = egui::ScrollArea::both().auto_shrink([false, false]);
        if let Some(offset) = app.pending_scroll.take() {
            scroll_area = scroll_area.scroll_offset(offset.max(Vec2::ZERO));
        }

        let output = scroll_area.show(ui, |ui| {
            let desired = vec2(
                page_layout.max_width().max(ui.available_width()),
                page_layout.total_height(),
            );
            let (canvas_rect, _) = ui.allocate_exact_size(desired, Sense::hover());

            let session = app.session.as_mut().expect("session checked above");
            app.page_rects.clear();

            for page in 1..=app.page_sizes.len() as PageIndex {
                let top = page_layout.page_top(page).expect("page within layout");
                let size = app.page_sizes[page as usize - 1] * zoom;
                let x = canvas_rect.min.x + (page_layout.max_width() - size.x) / 2.0;
                let page_rect = Rect::from_min_size(pos2(x, canvas_rect.min.y + top), size);
                app.page_rects.insert(page, page_rect);

                if ui.is_rect_visible(page_rect) {
                    let painter = ui.painter_at(page_rect.expand(2.0));
                    match app.page_textures.get(&page) {
                        Some(texture) => painter.image(
                            texture.id(),
                            page_rect,
                            Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                            Color32::WHITE,
                        ),
                        // Raster still pending; show the blank page.
                        None => painter.rect_filled(page_rect, 0.0, Color32::WHITE),
                    };
                    painter.rect_stroke(page_rect, 0.0, Stroke::new(1.0, Color32::from_gray(180)));

                    let mut surface = PainterSurface::new(&painter, page_rect.min, zoom);
                    renderer::redraw(&mut surface, session.store().get(page));
                    if let Some((preview_page, kind, color, start, end)) =
                        app.controller.preview(session)
                    {
                        if preview_page == page {
                            renderer::draw_shape(&mut surface, kind, color, start, end);
                        }
                    }
                }

                let response =
                    ui.interact(page_rect, ui.id().with(("page", page)), Sense::click_and_drag());
                for event in input::collect_pointer_events(&response, page_rect, zoom) {
                    app.controller.handle(session, page, event);
                }
            }
        });
        app.scroll_offset = output.state.offset;
    });
}
