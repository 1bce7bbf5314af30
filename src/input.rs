use egui::{Context, InputState, Key, Modifiers, PointerButton, Pos2, Rect};

/// Pointer events in canvas-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasEvent {
    PointerDown(Pos2),
    PointerMove(Pos2),
    PointerUp(Pos2),
    DoubleClick(Pos2),
    /// Secondary click; carries the screen position for placing the menu
    ContextMenu { canvas: Pos2, screen: Pos2 },
}

/// Keyboard commands understood by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Brush,
    Eraser,
    Selection,
    Undo,
    Redo,
    Delete,
    Escape,
}

impl Shortcut {
    pub fn from_key(key: Key, modifiers: Modifiers) -> Option<Self> {
        if modifiers.command {
            return match key {
                Key::Z if modifiers.shift => Some(Shortcut::Redo),
                Key::Z => Some(Shortcut::Undo),
                Key::Y => Some(Shortcut::Redo),
                _ => None,
            };
        }
        match key {
            Key::B => Some(Shortcut::Brush),
            Key::E => Some(Shortcut::Eraser),
            Key::V => Some(Shortcut::Selection),
            Key::Delete | Key::Backspace => Some(Shortcut::Delete),
            Key::Escape => Some(Shortcut::Escape),
            _ => None,
        }
    }
}

/// The pointer state of one frame, lifted out of egui so the translation
/// below can be exercised without a running context.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerSnapshot {
    pub pos: Option<Pos2>,
    pub primary_pressed: bool,
    pub primary_released: bool,
    pub primary_down: bool,
    pub double_clicked: bool,
    pub secondary_clicked: bool,
}

impl PointerSnapshot {
    pub fn from_input(input: &InputState) -> Self {
        let pointer = &input.pointer;
        Self {
            pos: pointer.interact_pos(),
            primary_pressed: pointer.button_pressed(PointerButton::Primary),
            primary_released: pointer.button_released(PointerButton::Primary),
            primary_down: pointer.button_down(PointerButton::Primary),
            double_clicked: pointer.button_double_clicked(PointerButton::Primary),
            secondary_clicked: pointer.button_clicked(PointerButton::Secondary),
        }
    }
}

/// Turns raw egui pointer input into [`CanvasEvent`]s.
///
/// A gesture belongs to the canvas if it started inside it; once started it
/// keeps receiving moves and its release even outside the canvas rect.
#[derive(Debug)]
pub struct InputHandler {
    canvas_rect: Rect,
    gesture_active: bool,
    last_pos: Option<Pos2>,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            canvas_rect: Rect::NOTHING,
            gesture_active: false,
            last_pos: None,
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture_active
    }

    fn to_canvas(&self, screen: Pos2) -> Pos2 {
        (screen - self.canvas_rect.min).to_pos2()
    }

    /// `blocked` suppresses new gestures, e.g. while the pointer is over a popup
    pub fn process(&mut self, pointer: PointerSnapshot, blocked: bool) -> Vec<CanvasEvent> {
        let mut events = Vec::new();
        let Some(screen) = pointer.pos.or(self.last_pos) else {
            return events;
        };
        let inside = self.canvas_rect.contains(screen) && !blocked;
        let pos = self.to_canvas(screen);

        if pointer.double_clicked && inside {
            events.push(CanvasEvent::DoubleClick(pos));
        }
        if pointer.secondary_clicked && inside {
            events.push(CanvasEvent::ContextMenu { canvas: pos, screen });
        }

        if pointer.primary_pressed && inside && !self.gesture_active {
            self.gesture_active = true;
            events.push(CanvasEvent::PointerDown(pos));
        } else if self.gesture_active && pointer.primary_down && pointer.pos != self.last_pos {
            events.push(CanvasEvent::PointerMove(pos));
        }

        if self.gesture_active && (pointer.primary_released || !pointer.primary_down) {
            self.gesture_active = false;
            events.push(CanvasEvent::PointerUp(pos));
        }

        self.last_pos = pointer.pos.or(self.last_pos);
        events
    }

    /// Collect this frame's canvas events from `ctx`
    pub fn process_input(&mut self, ctx: &Context, blocked: bool) -> Vec<CanvasEvent> {
        let snapshot = ctx.input(PointerSnapshot::from_input);
        self.process(snapshot, blocked)
    }
}

/// Shortcuts pressed this frame. Nothing fires while a text field has focus.
pub fn shortcuts(ctx: &Context) -> Vec<Shortcut> {
    if ctx.wants_keyboard_input() {
        return Vec::new();
    }
    ctx.input(|input| {
        input
            .events
            .iter()
            .filter_map(|event| match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    repeat: false,
                    modifiers,
                    ..
                } => Shortcut::from_key(*key, *modifiers),
                _ => None,
            })
            .collect()
    })
}
