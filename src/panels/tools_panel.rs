use egui::RichText;

use crate::MarkupApp;
use crate::annotation::ColorId;
use crate::interaction::Tool;

pub fn tools_panel(app: &mut MarkupApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(false)
        .default_width(160.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let busy =
                app.export_pending || app.render_queue.is_busy() || !app.render_backlog.is_empty();

            let Some(session) = app.session.as_mut() else {
                ui.label("Drop an image file to start annotating.");
                return;
            };

            for tool in Tool::ALL {
                let selected = session.tool() == Some(tool);
                if ui.selectable_label(selected, tool.label()).clicked() {
                    session.toggle_tool(tool);
                }
            }
            ui.small("No tool selected: click a shape to drag it.");
            ui.separator();

            ui.label("Color");
            ui.horizontal(|ui| {
                for color in ColorId::ALL {
                    let swatch = RichText::new("⏹").size(20.0).color(color.color32());
                    let selected = session.color() == color;
                    if ui
                        .selectable_label(selected, swatch)
                        .on_hover_text(color.label())
                        .clicked()
                    {
                        session.set_color(color);
                        app.color = color; // persisted preference
                    }
                }
            });
            ui.separator();

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(session.can_undo(), egui::Button::new("Undo"))
                    .clicked()
                {
                    session.undo();
                }
                if ui
                    .add_enabled(session.can_redo(), egui::Button::new("Redo"))
                    .clicked()
                {
                    session.redo();
                }
            });
            ui.separator();

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(session.can_zoom_out(), egui::Button::new("−"))
                    .clicked()
                {
                    app.zoom_request = Some(-1);
                }
                ui.label(format!("{:.0}%", session.zoom() * 100.0));
                if ui
                    .add_enabled(session.can_zoom_in(), egui::Button::new("+"))
                    .clicked()
                {
                    app.zoom_request = Some(1);
                }
            });
            ui.separator();

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!app.export_pending, egui::Button::new("Export"))
                    .clicked()
                {
                    app.export_requested = true;
                }
                if busy {
                    ui.spinner();
                }
            });
            ui.separator();

            ui.label(format!("{} annotations", session.store().annotation_count()));
            ui.label(format!(
                "history: {} / {}",
                session.history().cursor() + 1,
                session.history().len()
            ));
        });
}
