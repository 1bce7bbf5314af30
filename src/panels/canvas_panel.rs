use eframe::egui;

use crate::app::WhiteboardApp;
use crate::input::CanvasEvent;
use crate::tools::{SelectionState, SelectionTool, Tool};

/// The drawing surface. `closed_popup` swallows the press that dismissed a popup.
pub fn canvas_panel(app: &mut WhiteboardApp, ctx: &egui::Context, now: f64, closed_popup: bool) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            app.input.set_canvas_rect(rect);
            if app.model.canvas().size() != rect.size() {
                app.model.canvas_mut().set_size(rect.size());
            }

            let blocked = closed_popup || !response.hovered() || app.ui_state.context_menu().is_some();
            for event in app.input.process_input(ctx, blocked) {
                handle_event(app, event, now);
            }

            app.renderer.render(&painter, rect, app.model.canvas(), app.model.tools());

            if response.hovered() {
                update_cursor(app, ctx, rect);
            }
        });
}

fn handle_event(app: &mut WhiteboardApp, event: CanvasEvent, now: f64) {
    match event {
        CanvasEvent::PointerDown(pos) => app.model.pointer_down(pos, now),
        CanvasEvent::PointerMove(pos) => app.model.pointer_move(pos, now),
        CanvasEvent::PointerUp(pos) => app.model.pointer_up(pos, now),
        CanvasEvent::DoubleClick(pos) => {
            app.model.double_click(pos, now);
        }
        CanvasEvent::ContextMenu { canvas, screen } => {
            if app.model.tool() == Tool::Selection {
                if let Some(id) = app.model.canvas().hit_test(canvas) {
                    app.model.canvas_mut().set_active(Some(id));
                }
            }
            app.ui_state.open_context_menu(screen);
        }
    }
}

fn update_cursor(app: &WhiteboardApp, ctx: &egui::Context, rect: egui::Rect) {
    let tool = app.model.tool();
    if tool.is_drawing() {
        ctx.set_cursor_icon(egui::CursorIcon::Crosshair);
        return;
    }

    let cursor = match app.model.tools().selection_state() {
        SelectionState::Dragging { .. } => egui::CursorIcon::Grabbing,
        SelectionState::Resizing { corner, .. } => corner.cursor_icon(),
        SelectionState::Idle => {
            let Some(screen) = ctx.pointer_hover_pos() else {
                return;
            };
            let pos = (screen - rect.min).to_pos2();
            let canvas = app.model.canvas();
            match SelectionTool::handle_at(canvas, pos) {
                Some((_, corner)) => corner.cursor_icon(),
                None => canvas
                    .hit_test(pos)
                    .and_then(|id| canvas.get(id))
                    .map_or(egui::CursorIcon::Default, |object| object.props().hover_cursor),
            }
        }
    };
    ctx.set_cursor_icon(cursor);
}

/// Right-click menu on the canvas
pub fn context_menu(app: &mut WhiteboardApp, ctx: &egui::Context, now: f64) {
    let Some(at) = app.ui_state.context_menu() else {
        return;
    };
    let has_active = app.model.canvas().active_object().is_some();

    let area = egui::Area::new(egui::Id::new("canvas_context_menu"))
        .order(egui::Order::Foreground)
        .fixed_pos(at)
        .show(ctx, |ui| {
            egui::Frame::menu(ui.style()).show(ui, |ui| {
                ui.set_min_width(140.0);
                if ui.button("Selection tool").clicked() {
                    app.select_tool(Tool::Selection);
                }
                if ui.add_enabled(has_active, egui::Button::new("Bring to front")).clicked() {
                    app.model.bring_active_to_front(now);
                    app.ui_state.close_context_menu();
                }
                if ui.add_enabled(has_active, egui::Button::new("Delete")).clicked() {
                    app.model.delete_active(now);
                    app.ui_state.close_context_menu();
                }
            });
        });

    let dismissed = ctx.input(|i| {
        i.pointer.any_pressed()
            && i.pointer
                .interact_pos()
                .is_some_and(|pos| !area.response.rect.contains(pos))
    });
    if dismissed && !ctx.input(|i| i.pointer.secondary_clicked()) {
        app.ui_state.close_context_menu();
    }
}
