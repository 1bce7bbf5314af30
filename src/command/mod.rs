mod history;

use egui::{Color32, Rect, Vec2};

use crate::canvas::Canvas;
use crate::element::{Element, SceneObject, Stroke};
use crate::error::CommandError;
use crate::tools::Tool;

pub use history::CommandHistory;

/// Result type for command operations. The success value is the command that
/// undoes the one just executed.
pub type CommandResult = Result<Command, CommandError>;

/// An undoable change to the canvas
#[derive(Debug)]
pub enum Command {
    /// Finish a freehand stroke (eraser strokes reorder the scene)
    AddStroke { stroke: Stroke, tool: Tool },
    /// Insert an object; `None` puts it on top
    AddObject { object: SceneObject, index: Option<usize> },
    RemoveObject { id: usize },
    /// Move an object by `delta`, keeping its size
    Translate { id: usize, delta: Vec2 },
    /// Resize an object to `rect`
    Transform { id: usize, rect: Rect },
    /// Set the paint order
    Reorder { order: Vec<usize> },
    Clear,
    Restore { objects: Vec<SceneObject>, background: Color32 },
}

impl Command {
    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Command::AddStroke { tool: Tool::Eraser, .. } => "Erase",
            Command::AddStroke { .. } => "Draw stroke",
            Command::AddObject { .. } => "Add object",
            Command::RemoveObject { .. } => "Remove object",
            Command::Translate { .. } => "Move",
            Command::Transform { .. } => "Transform",
            Command::Reorder { .. } => "Reorder",
            Command::Clear => "Clear canvas",
            Command::Restore { .. } => "Restore canvas",
        }
    }

    /// Apply to `canvas`, consuming the command and returning its inverse.
    ///
    /// `now` is the frame clock, needed to pause videos on clear.
    pub fn execute(self, canvas: &mut Canvas, now: f64) -> CommandResult {
        match self {
            Command::AddStroke { stroke, tool } => {
                let id = canvas.finish_stroke(stroke, tool);
                Ok(Command::RemoveObject { id })
            }
            Command::AddObject { object, index } => {
                let id = match index {
                    Some(index) => canvas.insert(index, object),
                    None => canvas.add(object),
                };
                Ok(Command::RemoveObject { id })
            }
            Command::RemoveObject { id } => {
                let (index, object) = canvas.remove(id).ok_or(CommandError::UnknownObject(id))?;
                Ok(Command::AddObject {
                    object,
                    index: Some(index),
                })
            }
            Command::Translate { id, delta } => {
                let object = canvas.get_mut(id).ok_or(CommandError::UnknownObject(id))?;
                object.translate(delta).map_err(CommandError::InvalidGeometry)?;
                Ok(Command::Translate { id, delta: -delta })
            }
            Command::Transform { id, rect } => {
                let object = canvas.get_mut(id).ok_or(CommandError::UnknownObject(id))?;
                let old_rect = object.rect();
                object.resize(rect).map_err(CommandError::InvalidGeometry)?;
                Ok(Command::Transform { id, rect: old_rect })
            }
            Command::Reorder { order } => {
                let old_order = canvas.order();
                if !canvas.reorder(&order) {
                    return Err(CommandError::OrderMismatch);
                }
                Ok(Command::Reorder { order: old_order })
            }
            Command::Clear => {
                let (objects, background) = canvas.clear(now);
                Ok(Command::Restore { objects, background })
            }
            Command::Restore { objects, background } => {
                canvas.restore(objects, background);
                Ok(Command::Clear)
            }
        }
    }
}
