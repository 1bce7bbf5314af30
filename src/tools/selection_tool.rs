use egui::{Pos2, Rect, Vec2};
use log::debug;

use super::PointerTool;
use crate::canvas::Canvas;
use crate::command::Command;
use crate::element::Element;
use crate::widgets::resize_handle::{self, Corner, HANDLE_RADIUS};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionState {
    Idle,
    Dragging {
        id: usize,
        original_rect: Rect,
        start_pos: Pos2,
    },
    Resizing {
        id: usize,
        corner: Corner,
        original_rect: Rect,
    },
}

/// Picks, moves and corner-resizes image objects.
///
/// While a gesture is in progress the object is transformed live; on release
/// it is put back and the final rect is returned as one undoable command.
#[derive(Debug, Clone)]
pub struct SelectionTool {
    state: SelectionState,
}

impl Default for SelectionTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionTool {
    pub fn new() -> Self {
        Self {
            state: SelectionState::Idle,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Corner handle of the active object under `pos`
    pub fn handle_at(canvas: &Canvas, pos: Pos2) -> Option<(usize, Corner)> {
        let id = canvas.active_object()?;
        let object = canvas.get(id)?;
        if !object.props().controls.corners {
            return None;
        }
        resize_handle::corner_at(object.rect(), pos, HANDLE_RADIUS).map(|corner| (id, corner))
    }

    /// Show `rect` live. Same-size rects are a move and always apply;
    /// a degenerate resize is rejected and the previous preview stays.
    fn preview(canvas: &mut Canvas, id: usize, rect: Rect) {
        let Some(object) = canvas.get_mut(id) else {
            return;
        };
        let current = object.rect();
        let result = if rect.size() == current.size() {
            object.translate(rect.min - current.min)
        } else {
            object.resize(rect)
        };
        if let Err(err) = result {
            debug!("Preview of {id} rejected: {err}");
        }
    }

    fn current_rect(&self, pos: Pos2, canvas: &Canvas) -> Option<(usize, Rect, Rect)> {
        match self.state {
            SelectionState::Idle => None,
            SelectionState::Dragging {
                id,
                original_rect,
                start_pos,
            } => {
                let props = canvas.get(id)?.props();
                let delta = pos - start_pos;
                let delta = Vec2::new(
                    if props.lock_movement_x { 0.0 } else { delta.x },
                    if props.lock_movement_y { 0.0 } else { delta.y },
                );
                Some((id, original_rect, original_rect.translate(delta)))
            }
            SelectionState::Resizing {
                id,
                corner,
                original_rect,
            } => Some((id, original_rect, resize_handle::resize_from_corner(original_rect, corner, pos))),
        }
    }
}

impl PointerTool for SelectionTool {
    fn on_pointer_down(&mut self, pos: Pos2, canvas: &mut Canvas) -> Option<Command> {
        if let Some((id, corner)) = Self::handle_at(canvas, pos) {
            let original_rect = canvas.get(id)?.rect();
            debug!("Resizing {} from {:?}", id, corner);
            self.state = SelectionState::Resizing {
                id,
                corner,
                original_rect,
            };
            return None;
        }

        match canvas.hit_test(pos) {
            Some(id) if canvas.set_active(Some(id)) => {
                let object = canvas.get(id)?;
                if !object.props().movement_locked() {
                    self.state = SelectionState::Dragging {
                        id,
                        original_rect: object.rect(),
                        start_pos: pos,
                    };
                }
            }
            _ => {
                canvas.set_active(None);
            }
        }
        None
    }

    fn on_pointer_move(&mut self, pos: Pos2, canvas: &mut Canvas) -> Option<Command> {
        if let Some((id, _, rect)) = self.current_rect(pos, canvas) {
            Self::preview(canvas, id, rect);
        }
        None
    }

    fn on_pointer_up(&mut self, pos: Pos2, canvas: &mut Canvas) -> Option<Command> {
        let (id, original_rect, rect) = self.current_rect(pos, canvas)?;
        self.state = SelectionState::Idle;
        Self::preview(canvas, id, original_rect);
        if rect == original_rect {
            return None;
        }
        Some(if rect.size() == original_rect.size() {
            Command::Translate {
                id,
                delta: rect.min - original_rect.min,
            }
        } else {
            Command::Transform { id, rect }
        })
    }

    fn cancel(&mut self, canvas: &mut Canvas) {
        if let SelectionState::Dragging { id, original_rect, .. } | SelectionState::Resizing { id, original_rect, .. } =
            self.state
        {
            Self::preview(canvas, id, original_rect);
        }
        self.state = SelectionState::Idle;
    }
}
