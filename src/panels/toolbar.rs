use eframe::egui;

use crate::app::WhiteboardApp;
use crate::components::ToolButton;
use crate::tools::Tool;
use crate::ui_state::Popup;

/// Top bar with the tools, the popup toggles and the canvas actions
pub fn toolbar(app: &mut WhiteboardApp, ctx: &egui::Context, now: f64) {
    let panel = egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let current = app.model.tool();

            for tool in [Tool::Brush, Tool::Eraser] {
                if ToolButton::for_tool(tool, current).show(ui).clicked() {
                    app.select_tool(tool);
                }
            }

            ui.separator();

            let brush = *app.model.tools().brush_settings();
            let swatch = egui::Button::new("  ").fill(brush.color());
            let color = ui.add(swatch).on_hover_text(format!("Color {}", brush.color_hex()));
            if color.clicked() {
                app.hex_input = brush.color_hex();
                app.ui_state.toggle(Popup::Color);
            }
            app.popup_anchors.insert(Popup::Color, color.rect);

            let size = ui
                .selectable_label(app.ui_state.is_open(Popup::BrushSize), format!("Size {}", brush.width()))
                .on_hover_text("Brush size");
            if size.clicked() {
                app.ui_state.toggle(Popup::BrushSize);
            }
            app.popup_anchors.insert(Popup::BrushSize, size.rect);

            let upload = ui.selectable_label(app.ui_state.is_open(Popup::Upload), "⬆ Upload");
            if upload.clicked() {
                app.ui_state.toggle(Popup::Upload);
            }
            app.popup_anchors.insert(Popup::Upload, upload.rect);

            if ui.button("🗑 Clear").on_hover_text("Remove everything").clicked() {
                app.clear_canvas(now);
            }

            ui.separator();

            if ToolButton::for_tool(Tool::Selection, current).show(ui).clicked() {
                app.select_tool(Tool::Selection);
            }

            ui.separator();

            let history = app.model.history();
            let (can_undo, can_redo) = (history.can_undo(), history.can_redo());
            if ui.add_enabled(can_undo, egui::Button::new("⟲")).on_hover_text("Undo (Ctrl+Z)").clicked() {
                app.model.undo(now);
            }
            if ui
                .add_enabled(can_redo, egui::Button::new("⟳"))
                .on_hover_text("Redo (Ctrl+Shift+Z)")
                .clicked()
            {
                app.model.redo(now);
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                ui.separator();
                if ui.button("💾 Export PNG").clicked() {
                    app.export_png();
                }
            }
        });
    });
    app.ui_state.shield(panel.response.rect);
}
