use std::collections::HashMap;

use egui::Rect;

use crate::brush::BrushSettings;
use crate::file_handler::FileHandler;
use crate::input::{InputHandler, Shortcut};
use crate::panels;
use crate::renderer::Renderer;
use crate::settings::Settings;
use crate::state::EditorModel;
use crate::tools::Tool;
use crate::ui_state::{Popup, UiState};

/// We derive Deserialize/Serialize so we can persist app state on shutdown.
///
/// Only the brush and the last tool survive a restart; the board itself does not.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct WhiteboardApp {
    brush: BrushSettings,
    tool: Tool,

    #[serde(skip)]
    pub(crate) settings: Settings,
    #[serde(skip)]
    pub(crate) model: EditorModel,
    #[serde(skip)]
    pub(crate) ui_state: UiState,
    #[serde(skip)]
    pub(crate) renderer: Renderer,
    #[serde(skip)]
    pub(crate) input: InputHandler,
    #[serde(skip)]
    pub(crate) files: FileHandler,
    /// Toolbar buttons the popups hang from, refreshed every frame
    #[serde(skip)]
    pub(crate) popup_anchors: HashMap<Popup, Rect>,
    /// Text in the color popup's hex field
    #[serde(skip)]
    pub(crate) hex_input: String,
}

impl Default for WhiteboardApp {
    fn default() -> Self {
        Self::with_settings(Settings::default(), None)
    }
}

impl WhiteboardApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        let restored: Option<Self> = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY));
        let app = Self::with_settings(settings, restored.map(|app| (app.brush, app.tool)));
        log::info!("Whiteboard ready, tool: {}", app.model.tool().name());
        app
    }

    fn with_settings(settings: Settings, restored: Option<(BrushSettings, Tool)>) -> Self {
        let (brush, tool) =
            restored.unwrap_or_else(|| (BrushSettings::new(settings.brush(), settings.brush_width), Tool::Brush));
        let mut model = EditorModel::new(&settings, brush);
        model.set_tool(tool);
        Self {
            brush,
            tool,
            hex_input: brush.color_hex(),
            settings,
            model,
            ui_state: UiState::new(),
            renderer: Renderer::new(),
            input: InputHandler::new(),
            files: FileHandler::new(),
            popup_anchors: HashMap::new(),
        }
    }

    pub fn model(&self) -> &EditorModel {
        &self.model
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn select_tool(&mut self, tool: Tool) {
        self.ui_state.close_all();
        self.model.set_tool(tool);
    }

    pub(crate) fn apply_shortcut(&mut self, shortcut: Shortcut, now: f64) {
        log::debug!("Shortcut {:?}", shortcut);
        match shortcut {
            Shortcut::Brush => self.select_tool(Tool::Brush),
            Shortcut::Eraser => self.select_tool(Tool::Eraser),
            Shortcut::Selection => self.select_tool(Tool::Selection),
            Shortcut::Undo => self.model.undo(now),
            Shortcut::Redo => self.model.redo(now),
            Shortcut::Delete => self.model.delete_active(now),
            Shortcut::Escape => self.ui_state.close_all(),
        }
    }

    pub(crate) fn clear_canvas(&mut self, now: f64) {
        self.ui_state.close_all();
        self.model.clear(now);
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub(crate) fn export_png(&self) {
        let bytes = match self.model.canvas().export_png() {
            Ok(bytes) => bytes,
            Err(err) => {
                log::error!("Failed to encode PNG: {}", err);
                return;
            }
        };
        let dialog = rfd::FileDialog::new()
            .set_title("Export PNG")
            .set_file_name("whiteboard.png")
            .add_filter("PNG Image", &["png"]);
        if let Some(path) = dialog.save_file() {
            match std::fs::write(&path, &bytes) {
                Ok(()) => log::info!("Exported PNG to {}", path.display()),
                Err(err) => log::error!("Failed to write PNG: {}", err),
            }
        }
    }

    fn import_incoming(&mut self, ctx: &egui::Context, now: f64) {
        let incoming = self.files.take_incoming(ctx);
        for file in &incoming {
            if self.model.import_file(file, now).is_some() {
                self.ui_state.close_all();
            }
        }
    }
}

impl eframe::App for WhiteboardApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.brush = *self.model.tools().brush_settings();
        self.tool = self.model.tool();
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);
        self.ui_state.begin_frame();

        for shortcut in crate::input::shortcuts(ctx) {
            self.apply_shortcut(shortcut, now);
        }

        panels::toolbar(self, ctx, now);
        panels::popups(self, ctx);

        let pressed_at = ctx.input(|i| {
            i.pointer
                .primary_pressed()
                .then(|| i.pointer.interact_pos())
                .flatten()
        });
        let closed_popup = pressed_at.is_some_and(|pos| self.ui_state.on_primary_press(pos));

        panels::canvas_panel(self, ctx, now, closed_popup);
        panels::context_menu(self, ctx, now);

        self.import_incoming(ctx, now);
        self.files.preview_files_being_dropped(ctx);

        if self.model.tick(now) {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restored_brush_and_tool_are_applied() {
        let brush = BrushSettings::new(egui::Color32::GREEN, 20);
        let app = WhiteboardApp::with_settings(Settings::default(), Some((brush, Tool::Eraser)));
        assert_eq!(app.model.tool(), Tool::Eraser);
        assert_eq!(app.model.canvas().freehand_brush().width, 20);
        assert_eq!(app.model.canvas().freehand_brush().color, egui::Color32::WHITE);
    }

    #[test]
    fn shortcuts_switch_tools_and_close_popups() {
        let mut app = WhiteboardApp::default();
        app.ui_state.open(Popup::Color);
        app.apply_shortcut(Shortcut::Selection, 0.0);
        assert_eq!(app.model.tool(), Tool::Selection);
        assert!(!app.model.canvas().is_drawing_mode());
        assert_eq!(app.ui_state.active_popup(), None);
    }

    #[test]
    fn persisted_state_round_trips_through_json() {
        let mut app = WhiteboardApp::default();
        app.model.set_brush_width(9);
        app.model.set_tool(Tool::Selection);
        app.brush = *app.model.tools().brush_settings();
        app.tool = app.model.tool();

        let json = serde_json::to_string(&app).unwrap();
        let restored: WhiteboardApp = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.tool, Tool::Selection);
        assert_eq!(restored.brush.width(), 9);
    }
}
