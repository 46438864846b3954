use egui::{Color32, Rect, Sense, Stroke, pos2};

use crate::MarkupApp;
use crate::annotation::PageIndex;
use crate::layout::PREVIEW_SCALE;

/// Thumbnail sidebar: every page at preview scale, the active page
/// outlined. Clicking a thumbnail activates that page and scrolls the
/// main view to it.
pub fn previews_panel(app: &mut MarkupApp, ctx: &egui::Context) {
    if app.session.is_none() {
        return;
    }

    egui::SidePanel::right("page_previews")
        .resizable(false)
        .default_width(150.0)
        .show(ctx, |ui| {
            ui.heading("Pages");
            egui::ScrollArea::vertical().show(ui, |ui| {
                let page_count = app.page_sizes.len();
                for page in 1..=page_count as PageIndex {
                    let size = app.page_sizes[page as usize - 1] * PREVIEW_SCALE;
                    let (rect, response) = ui.allocate_exact_size(size, Sense::click());

                    if ui.is_rect_visible(rect) {
                        let painter = ui.painter();
                        match app.page_textures.get(&page) {
                            Some(texture) => painter.image(
                                texture.id(),
                                rect,
                                Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                                Color32::WHITE,
                            ),
                            None => painter.rect_filled(rect, 0.0, Color32::WHITE),
                        };

                        let active = app
                            .session
                            .as_ref()
                            .is_some_and(|s| s.active_page() == page);
                        let outline = if active {
                            Stroke::new(2.0, ui.visuals().selection.stroke.color)
                        } else {
                            Stroke::new(1.0, Color32::GRAY)
                        };
                        painter.rect_stroke(rect, 0.0, outline);
                    }

                    if response.clicked() {
                        if let Some(session) = app.session.as_mut() {
                            session.set_active_page(page);
                        }
                        app.scroll_to_page = Some(page);
                    }

                    ui.label(page.to_string());
                    ui.add_space(6.0);
                }
            });
        });
}
