use egui::Pos2;

use super::{PointerTool, Tool};
use crate::canvas::Canvas;
use crate::command::Command;
use crate::element::MutableStroke;

/// Freehand drawing, shared by the brush and the eraser
#[derive(Debug, Clone)]
pub struct DrawStrokeTool {
    mode: Tool,
    // Transient state: the stroke being drawn (if any)
    current_stroke: Option<MutableStroke>,
}

impl DrawStrokeTool {
    pub fn new(mode: Tool) -> Self {
        Self {
            mode,
            current_stroke: None,
        }
    }

    /// Brush or eraser; decides how the finished stroke is layered
    pub fn set_mode(&mut self, mode: Tool) {
        self.mode = mode;
    }

    pub fn current_stroke(&self) -> Option<&MutableStroke> {
        self.current_stroke.as_ref()
    }
}

impl PointerTool for DrawStrokeTool {
    fn on_pointer_down(&mut self, pos: Pos2, canvas: &mut Canvas) -> Option<Command> {
        if !canvas.is_drawing_mode() {
            return None;
        }
        let mut stroke = MutableStroke::new(canvas.freehand_brush());
        stroke.add_point(pos);
        self.current_stroke = Some(stroke);
        None
    }

    fn on_pointer_move(&mut self, pos: Pos2, _canvas: &mut Canvas) -> Option<Command> {
        if let Some(stroke) = &mut self.current_stroke {
            stroke.add_point(pos);
        }
        None
    }

    fn on_pointer_up(&mut self, pos: Pos2, _canvas: &mut Canvas) -> Option<Command> {
        let mut stroke = self.current_stroke.take()?;
        stroke.add_point(pos);
        Some(Command::AddStroke {
            stroke: stroke.into_stroke(),
            tool: self.mode,
        })
    }

    fn cancel(&mut self, _canvas: &mut Canvas) {
        self.current_stroke = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;

    #[test]
    fn press_drag_release_yields_one_stroke() {
        let mut canvas = Canvas::new(Color32::WHITE);
        let mut tool = DrawStrokeTool::new(Tool::Brush);

        assert!(tool.on_pointer_down(Pos2::new(0.0, 0.0), &mut canvas).is_none());
        assert!(tool.on_pointer_move(Pos2::new(5.0, 5.0), &mut canvas).is_none());
        assert_eq!(tool.current_stroke().map(|s| s.points().len()), Some(2));

        match tool.on_pointer_up(Pos2::new(10.0, 5.0), &mut canvas) {
            Some(Command::AddStroke { stroke, tool }) => {
                assert_eq!(stroke.points().len(), 3);
                assert_eq!(tool, Tool::Brush);
            }
            other => panic!("expected AddStroke, got {other:?}"),
        }
        assert!(tool.current_stroke().is_none());
    }

    #[test]
    fn nothing_is_drawn_outside_drawing_mode() {
        let mut canvas = Canvas::new(Color32::WHITE);
        canvas.set_drawing_mode(false);
        let mut tool = DrawStrokeTool::new(Tool::Eraser);
        tool.on_pointer_down(Pos2::ZERO, &mut canvas);
        assert!(tool.on_pointer_up(Pos2::ZERO, &mut canvas).is_none());
    }
}
