use eframe::egui;

use crate::app::WhiteboardApp;
use crate::brush::{self, MAX_WIDTH, MIN_WIDTH};
use crate::file_handler::accepted_types_label;
use crate::ui_state::Popup;

/// Draw the open popup, if any, under its toolbar button
pub fn popups(app: &mut WhiteboardApp, ctx: &egui::Context) {
    let Some(popup) = app.ui_state.active_popup() else {
        return;
    };
    let anchor = app
        .popup_anchors
        .get(&popup)
        .map(|rect| rect.left_bottom() + egui::vec2(0.0, 4.0))
        .unwrap_or(egui::pos2(8.0, 40.0));

    let area = egui::Area::new(egui::Id::new(("popup", popup)))
        .order(egui::Order::Foreground)
        .fixed_pos(anchor)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| match popup {
                Popup::BrushSize => brush_size(app, ui),
                Popup::Color => color(app, ui),
                Popup::Upload => upload(app, ui),
            });
        });
    app.ui_state.shield(area.response.rect);
}

fn brush_size(app: &mut WhiteboardApp, ui: &mut egui::Ui) {
    let mut width = app.model.tools().brush_settings().width();
    ui.label("Brush size");
    let slider = ui.add(egui::Slider::new(&mut width, MIN_WIDTH..=MAX_WIDTH).suffix(" px"));
    if slider.changed() {
        app.model.set_brush_width(width);
    }
}

fn color(app: &mut WhiteboardApp, ui: &mut egui::Ui) {
    let mut color = app.model.tools().brush_settings().color();
    ui.label("Brush color");
    if egui::color_picker::color_picker_color32(ui, &mut color, egui::color_picker::Alpha::Opaque) {
        app.model.set_brush_color(color);
        app.hex_input = brush::format_hex_color(color);
    }

    ui.horizontal(|ui| {
        ui.label("Hex");
        let field = ui.add(egui::TextEdit::singleline(&mut app.hex_input).desired_width(80.0));
        let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if submitted || (field.changed() && app.hex_input.len() == 7) {
            match brush::parse_hex_color(&app.hex_input) {
                Ok(color) => app.model.set_brush_color(color),
                Err(err) if submitted => log::warn!("{}", err),
                Err(_) => {}
            }
        }
    });
}

fn upload(app: &mut WhiteboardApp, ui: &mut egui::Ui) {
    ui.label("Add an image or video to the board");
    ui.small(accepted_types_label());
    if ui.button("Choose file…").clicked() {
        app.files.open_picker(ui.ctx());
        app.ui_state.close_all();
    }
    ui.small("or drop files onto the window");
}
