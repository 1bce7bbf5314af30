use super::{Command, CommandError};
use crate::canvas::Canvas;

/// Manages the history of executed commands for undo/redo functionality.
///
/// Both stacks hold ready-to-run commands: the undo stack holds the inverses
/// of what was done, the redo stack the inverses of what was undone.
#[derive(Debug, Default)]
pub struct CommandHistory {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a command and record its inverse. Clears the redo stack.
    pub fn execute(&mut self, command: Command, canvas: &mut Canvas, now: f64) -> Result<(), CommandError> {
        let label = command.label();
        let inverse = command.execute(canvas, now)?;
        log::debug!("Executed {label}");
        self.undo_stack.push(inverse);
        self.redo_stack.clear();
        Ok(())
    }

    /// Undo the last executed command
    pub fn undo(&mut self, canvas: &mut Canvas, now: f64) -> Result<(), CommandError> {
        let inverse = self.undo_stack.pop().ok_or(CommandError::EmptyHistory("undo"))?;
        let redo = inverse.execute(canvas, now)?;
        self.redo_stack.push(redo);
        Ok(())
    }

    /// Redo the last undone command
    pub fn redo(&mut self, canvas: &mut Canvas, now: f64) -> Result<(), CommandError> {
        let command = self.redo_stack.pop().ok_or(CommandError::EmptyHistory("redo"))?;
        let inverse = command.execute(canvas, now)?;
        self.undo_stack.push(inverse);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, MediaObject, SceneObject};
    use egui::{Color32, Pos2, Rect, Vec2};

    fn canvas_with_strip() -> (Canvas, usize) {
        let mut canvas = Canvas::new(Color32::WHITE);
        // Thinner than the minimum element size
        let rect = Rect::from_min_size(Pos2::new(80.0, 297.0), Vec2::new(640.0, 5.0));
        let id = canvas.add(SceneObject::image(MediaObject::still(image::RgbaImage::new(2000, 16), rect)));
        (canvas, id)
    }

    #[test]
    fn moves_are_undone_and_redone() {
        let (mut canvas, id) = canvas_with_strip();
        let mut history = CommandHistory::new();
        let delta = Vec2::new(50.0, 50.0);

        history.execute(Command::Translate { id, delta }, &mut canvas, 0.0).unwrap();
        assert_eq!(canvas.get(id).unwrap().rect().min, Pos2::new(130.0, 347.0));

        history.undo(&mut canvas, 0.0).unwrap();
        assert_eq!(canvas.get(id).unwrap().rect().min, Pos2::new(80.0, 297.0));
        assert!(history.can_redo());

        history.redo(&mut canvas, 0.0).unwrap();
        assert_eq!(canvas.get(id).unwrap().rect().min, Pos2::new(130.0, 347.0));
        assert!(!history.can_redo());
    }

    #[test]
    fn failed_commands_leave_history_untouched() {
        let (mut canvas, id) = canvas_with_strip();
        let mut history = CommandHistory::new();
        let degenerate = Rect::from_min_size(Pos2::ZERO, Vec2::new(2.0, 2.0));

        let result = history.execute(Command::Transform { id, rect: degenerate }, &mut canvas, 0.0);
        assert!(matches!(result, Err(CommandError::InvalidGeometry(_))));
        assert!(!history.can_undo());
        assert!(matches!(history.undo(&mut canvas, 0.0), Err(CommandError::EmptyHistory("undo"))));
    }
}
