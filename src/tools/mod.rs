use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

use crate::brush::{Brush, BrushSettings};
use crate::canvas::Canvas;
use crate::command::Command;
use crate::element::{MutableStroke, ObjectProps, SceneObject};

mod draw_stroke_tool;
pub use draw_stroke_tool::DrawStrokeTool;

mod selection_tool;
pub use selection_tool::{SelectionState, SelectionTool};

/// The tool the user is working with. Exactly one is active at a time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Brush,
    Eraser,
    Selection,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Brush, Tool::Eraser, Tool::Selection];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::Brush => "Brush",
            Tool::Eraser => "Eraser",
            Tool::Selection => "Selection",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Tool::Brush => "🖌",
            Tool::Eraser => "⌫",
            Tool::Selection => "⬚",
        }
    }

    /// Brush and eraser paint freehand strokes
    pub fn is_drawing(&self) -> bool {
        matches!(self, Tool::Brush | Tool::Eraser)
    }
}

/// Pointer handling shared by the concrete tools.
///
/// Handlers may mutate the canvas for live previews; anything that should be
/// undoable is returned as a [`Command`] instead.
pub trait PointerTool {
    fn on_pointer_down(&mut self, pos: Pos2, canvas: &mut Canvas) -> Option<Command>;

    fn on_pointer_move(&mut self, pos: Pos2, canvas: &mut Canvas) -> Option<Command>;

    fn on_pointer_up(&mut self, pos: Pos2, canvas: &mut Canvas) -> Option<Command>;

    /// Abandon an in-progress gesture, undoing any preview
    fn cancel(&mut self, canvas: &mut Canvas);
}

/// Holds the active tool and the brush settings, and keeps every scene
/// object's interaction flags consistent with the active tool.
#[derive(Debug, Clone)]
pub struct ToolState {
    current: Tool,
    brush: BrushSettings,
    draw: DrawStrokeTool,
    selection: SelectionTool,
}

impl ToolState {
    /// Starts with the brush. Call [`ToolState::attach`] once to set up the canvas.
    pub fn new(brush: BrushSettings) -> Self {
        Self {
            current: Tool::Brush,
            brush,
            draw: DrawStrokeTool::new(Tool::Brush),
            selection: SelectionTool::new(),
        }
    }

    /// Apply the current tool's policy to `canvas` unconditionally.
    pub fn attach(&mut self, canvas: &mut Canvas) {
        self.apply(canvas);
    }

    pub fn current(&self) -> Tool {
        self.current
    }

    pub fn brush_settings(&self) -> &BrushSettings {
        &self.brush
    }

    /// Switch tools. Returns false, touching nothing, if `tool` is already active.
    pub fn set_tool(&mut self, tool: Tool, canvas: &mut Canvas) -> bool {
        if tool == self.current {
            return false;
        }
        log::info!("Tool changed: {} -> {}", self.current.name(), tool.name());
        self.draw.cancel(canvas);
        self.selection.cancel(canvas);
        self.current = tool;
        self.apply(canvas);
        true
    }

    fn apply(&mut self, canvas: &mut Canvas) {
        if self.current.is_drawing() {
            canvas.set_drawing_mode(true);
            let pinned = canvas.discard_active();
            for object in canvas.objects_mut().filter(|object| object.is_image()) {
                let props = if Some(object.id()) == pinned {
                    ObjectProps::PINNED
                } else {
                    ObjectProps::INERT
                };
                object.set_props(props);
            }
            self.draw.set_mode(self.current);
        } else {
            canvas.set_drawing_mode(false);
            for object in canvas.objects_mut().filter(|object| object.is_image()) {
                object.set_props(ObjectProps::MOVABLE);
            }
        }
        self.sync_brush(canvas);
    }

    /// Interaction flags a new image should get under the current tool
    pub fn configure_new_object(&self, object: &mut SceneObject) {
        let props = if self.current.is_drawing() {
            ObjectProps::INERT
        } else {
            ObjectProps::MOVABLE
        };
        object.set_props(props);
    }

    /// What the freehand brush should paint with under the current tool
    pub fn active_brush(&self, background: Color32) -> Brush {
        match self.current {
            Tool::Eraser => self.brush.erase_brush(background),
            Tool::Brush | Tool::Selection => self.brush.paint_brush(),
        }
    }

    /// Push width and color into the canvas brush. Needed after the settings
    /// or the background change.
    pub fn sync_brush(&self, canvas: &mut Canvas) {
        let brush = self.active_brush(canvas.background());
        canvas.set_freehand_brush(brush);
    }

    pub fn set_brush_width(&mut self, width: u8, canvas: &mut Canvas) {
        self.brush.set_width(width);
        self.sync_brush(canvas);
    }

    pub fn set_brush_color(&mut self, color: Color32, canvas: &mut Canvas) {
        self.brush.set_color(color);
        self.sync_brush(canvas);
    }

    /// Stroke being drawn right now, for the live preview
    pub fn preview_stroke(&self) -> Option<&MutableStroke> {
        self.draw.current_stroke()
    }

    pub fn selection_state(&self) -> SelectionState {
        self.selection.state()
    }

    fn active_pointer_tool(&mut self) -> &mut dyn PointerTool {
        match self.current {
            Tool::Brush | Tool::Eraser => &mut self.draw,
            Tool::Selection => &mut self.selection,
        }
    }

    pub fn on_pointer_down(&mut self, pos: Pos2, canvas: &mut Canvas) -> Option<Command> {
        self.active_pointer_tool().on_pointer_down(pos, canvas)
    }

    pub fn on_pointer_move(&mut self, pos: Pos2, canvas: &mut Canvas) -> Option<Command> {
        self.active_pointer_tool().on_pointer_move(pos, canvas)
    }

    pub fn on_pointer_up(&mut self, pos: Pos2, canvas: &mut Canvas) -> Option<Command> {
        self.active_pointer_tool().on_pointer_up(pos, canvas)
    }

    pub fn cancel(&mut self, canvas: &mut Canvas) {
        self.active_pointer_tool().cancel(canvas);
    }
}
