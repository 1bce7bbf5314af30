use egui::Pos2;
use log::{error, info, warn};

use crate::brush::BrushSettings;
use crate::canvas::Canvas;
use crate::command::{Command, CommandHistory};
use crate::element::{Element, SceneObject};
use crate::error::ImportError;
use crate::media::{Imported, IncomingFile, MediaImporter, PendingVideo};
use crate::settings::Settings;
use crate::tools::{Tool, ToolState};

/// Everything the editor edits, without any UI: the canvas, the tool state,
/// the undo history and the media importer with its still-loading videos.
///
/// All methods take the frame clock (`now`, seconds) where timing matters so
/// the model can be driven from tests.
#[derive(Debug)]
pub struct EditorModel {
    canvas: Canvas,
    tools: ToolState,
    history: CommandHistory,
    importer: MediaImporter,
    pending: Vec<PendingVideo>,
}

impl EditorModel {
    pub fn new(settings: &Settings, brush: BrushSettings) -> Self {
        let mut canvas = Canvas::new(settings.background());
        let mut tools = ToolState::new(brush);
        tools.attach(&mut canvas);
        Self {
            canvas,
            tools,
            history: CommandHistory::new(),
            importer: MediaImporter::new(settings),
            pending: Vec::new(),
        }
    }

    pub fn with_importer(mut self, importer: MediaImporter) -> Self {
        self.importer = importer;
        self
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn tool(&self) -> Tool {
        self.tools.current()
    }

    pub fn set_tool(&mut self, tool: Tool) -> bool {
        self.tools.set_tool(tool, &mut self.canvas)
    }

    pub fn set_brush_width(&mut self, width: u8) {
        self.tools.set_brush_width(width, &mut self.canvas);
    }

    pub fn set_brush_color(&mut self, color: egui::Color32) {
        self.tools.set_brush_color(color, &mut self.canvas);
    }

    /// Run `command` through the history, logging failures
    pub fn execute(&mut self, command: Command, now: f64) -> bool {
        let label = command.label();
        match self.history.execute(command, &mut self.canvas, now) {
            Ok(()) => true,
            Err(err) => {
                error!("{label} failed: {err}");
                false
            }
        }
    }

    pub fn undo(&mut self, now: f64) {
        self.tools.cancel(&mut self.canvas);
        if let Err(err) = self.history.undo(&mut self.canvas, now) {
            warn!("Undo: {err}");
        }
        self.after_history_change();
    }

    pub fn redo(&mut self, now: f64) {
        self.tools.cancel(&mut self.canvas);
        if let Err(err) = self.history.redo(&mut self.canvas, now) {
            warn!("Redo: {err}");
        }
        self.after_history_change();
    }

    // Restored objects carry whatever flags they had when removed
    fn after_history_change(&mut self) {
        self.tools.attach(&mut self.canvas);
    }

    /// Remove everything and reset the background. Undoable.
    pub fn clear(&mut self, now: f64) {
        self.tools.cancel(&mut self.canvas);
        self.execute(Command::Clear, now);
        self.tools.sync_brush(&mut self.canvas);
    }

    /// Import `file` onto the canvas and switch to the selection tool so the
    /// new object can be manipulated right away.
    ///
    /// Failures are logged and nothing changes; the session stays usable.
    /// Videos that are still loading return `None` and are placed by a later
    /// [`EditorModel::tick`].
    pub fn import_file(&mut self, file: &IncomingFile, now: f64) -> Option<usize> {
        match self.importer.import(file, self.canvas.size()) {
            Ok(Imported::Ready(object)) => Some(self.place(object, now)),
            Ok(Imported::Loading(pending)) => {
                info!("Waiting for {} to load", file.name);
                self.pending.push(pending);
                None
            }
            Err(err) => {
                report_import_error(&file.name, &err);
                None
            }
        }
    }

    /// Videos still waiting for their first frame
    pub fn pending_imports(&self) -> usize {
        self.pending.len()
    }

    fn place(&mut self, mut object: SceneObject, now: f64) -> usize {
        let id = object.id();
        self.set_tool(Tool::Selection);
        self.tools.configure_new_object(&mut object);
        self.execute(Command::AddObject { object, index: None }, now);
        self.canvas.set_active(Some(id));
        id
    }

    fn resume_pending(&mut self, now: f64) {
        for pending in std::mem::take(&mut self.pending) {
            let name = pending.name().to_owned();
            match self.importer.resume(pending, self.canvas.size()) {
                Ok(Imported::Ready(object)) => {
                    self.place(object, now);
                }
                Ok(Imported::Loading(pending)) => self.pending.push(pending),
                Err(err) => report_import_error(&name, &err),
            }
        }
    }

    pub fn pointer_down(&mut self, pos: Pos2, now: f64) {
        if let Some(command) = self.tools.on_pointer_down(pos, &mut self.canvas) {
            self.execute(command, now);
        }
    }

    pub fn pointer_move(&mut self, pos: Pos2, now: f64) {
        if let Some(command) = self.tools.on_pointer_move(pos, &mut self.canvas) {
            self.execute(command, now);
        }
    }

    pub fn pointer_up(&mut self, pos: Pos2, now: f64) {
        if let Some(command) = self.tools.on_pointer_up(pos, &mut self.canvas) {
            self.execute(command, now);
        }
    }

    /// Toggle playback of the video under `pos`, if any
    pub fn double_click(&mut self, pos: Pos2, now: f64) -> Option<bool> {
        let id = self.canvas.hit_test(pos)?;
        self.canvas.toggle_playback(id, now)
    }

    pub fn delete_active(&mut self, now: f64) {
        if let Some(id) = self.canvas.active_object() {
            let kind = self.canvas.get(id).map_or("object", |object| object.element_type());
            info!("Deleting {kind} {id}");
            self.execute(Command::RemoveObject { id }, now);
        }
    }

    pub fn bring_active_to_front(&mut self, now: f64) {
        let Some(id) = self.canvas.active_object() else {
            return;
        };
        let order = self.canvas.order_with_on_top(id);
        if order != self.canvas.order() {
            self.execute(Command::Reorder { order }, now);
        }
    }

    /// Advance animations and place videos that finished loading. Returns
    /// true while another frame is needed.
    pub fn tick(&mut self, now: f64) -> bool {
        if !self.pending.is_empty() {
            self.resume_pending(now);
        }
        let animating = self.canvas.tick(now);
        animating || !self.pending.is_empty()
    }
}

fn report_import_error(name: &str, err: &ImportError) {
    match err {
        ImportError::TooSmall { .. } => warn!("Skipping {name}: {err}"),
        _ => error!("Failed to import {name}: {err}"),
    }
}
