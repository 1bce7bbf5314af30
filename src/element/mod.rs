use egui::{CursorIcon, Pos2, Rect, Vec2};

mod common;
pub(crate) mod media;
pub(crate) mod stroke;

pub use common::MIN_ELEMENT_SIZE;
pub use media::{MediaObject, MediaSource};
pub use stroke::{MutableStroke, Stroke};

use crate::id_generator::generate_id;

/// Geometry shared by everything that lives on the canvas
pub trait Element {
    /// Get the element type as a string
    fn element_type(&self) -> &'static str;

    /// Bounding rectangle in canvas coordinates
    fn rect(&self) -> Rect;

    /// Test if the element contains the given position
    fn hit_test(&self, pos: Pos2) -> bool;
}

/// Which transform handles are shown around the active object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub corners: bool,
    pub edges: bool,
    pub rotate: bool,
}

impl Controls {
    pub const NONE: Self = Self {
        corners: false,
        edges: false,
        rotate: false,
    };

    pub const CORNERS_ONLY: Self = Self {
        corners: true,
        edges: false,
        rotate: false,
    };
}

/// Interaction flags of a scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectProps {
    /// Can become the active object and be transformed
    pub selectable: bool,
    /// Receives pointer events at all (hit testing skips it otherwise)
    pub evented: bool,
    pub lock_movement_x: bool,
    pub lock_movement_y: bool,
    pub hover_cursor: CursorIcon,
    pub controls: Controls,
}

impl ObjectProps {
    /// Ignores the pointer entirely. Strokes always look like this.
    pub const INERT: Self = Self {
        selectable: false,
        evented: false,
        lock_movement_x: true,
        lock_movement_y: true,
        hover_cursor: CursorIcon::Default,
        controls: Controls::NONE,
    };

    /// Images while the selection tool is active
    pub const MOVABLE: Self = Self {
        selectable: true,
        evented: true,
        lock_movement_x: false,
        lock_movement_y: false,
        hover_cursor: CursorIcon::Move,
        controls: Controls::CORNERS_ONLY,
    };

    /// The active image while drawing: still clickable, never movable
    pub const PINNED: Self = Self {
        selectable: false,
        evented: true,
        lock_movement_x: true,
        lock_movement_y: true,
        hover_cursor: CursorIcon::Default,
        controls: Controls::NONE,
    };

    pub fn movement_locked(&self) -> bool {
        self.lock_movement_x && self.lock_movement_y
    }
}

#[derive(Debug)]
pub enum SceneObjectKind {
    Image(MediaObject),
    Stroke(Stroke),
}

/// A renderable, independently transformable entity on the canvas
#[derive(Debug)]
pub struct SceneObject {
    id: usize,
    kind: SceneObjectKind,
    props: ObjectProps,
}

impl SceneObject {
    pub fn image(media: MediaObject) -> Self {
        Self {
            id: generate_id(),
            kind: SceneObjectKind::Image(media),
            props: ObjectProps::INERT,
        }
    }

    pub fn stroke(stroke: Stroke) -> Self {
        Self {
            id: generate_id(),
            kind: SceneObjectKind::Stroke(stroke),
            props: ObjectProps::INERT,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn kind(&self) -> &SceneObjectKind {
        &self.kind
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, SceneObjectKind::Image(_))
    }

    pub fn is_stroke(&self) -> bool {
        matches!(self.kind, SceneObjectKind::Stroke(_))
    }

    pub fn as_media(&self) -> Option<&MediaObject> {
        match &self.kind {
            SceneObjectKind::Image(media) => Some(media),
            SceneObjectKind::Stroke(_) => None,
        }
    }

    pub fn as_media_mut(&mut self) -> Option<&mut MediaObject> {
        match &mut self.kind {
            SceneObjectKind::Image(media) => Some(media),
            SceneObjectKind::Stroke(_) => None,
        }
    }

    pub fn as_stroke(&self) -> Option<&Stroke> {
        match &self.kind {
            SceneObjectKind::Stroke(stroke) => Some(stroke),
            SceneObjectKind::Image(_) => None,
        }
    }

    pub fn props(&self) -> &ObjectProps {
        &self.props
    }

    /// Strokes ignore this and stay inert.
    pub fn set_props(&mut self, props: ObjectProps) {
        self.props = if self.is_stroke() { ObjectProps::INERT } else { props };
    }

    /// Move by `delta`. Only image-like objects can be moved.
    pub fn translate(&mut self, delta: Vec2) -> Result<(), String> {
        match &mut self.kind {
            SceneObjectKind::Image(media) => {
                media.translate(delta);
                Ok(())
            }
            SceneObjectKind::Stroke(_) => Err(STROKES_ARE_FIXED.to_owned()),
        }
    }

    /// Resize to `new_rect`. Only image-like objects can be resized.
    pub fn resize(&mut self, new_rect: Rect) -> Result<(), String> {
        match &mut self.kind {
            SceneObjectKind::Image(media) => media.resize(new_rect),
            SceneObjectKind::Stroke(_) => Err(STROKES_ARE_FIXED.to_owned()),
        }
    }
}

const STROKES_ARE_FIXED: &str = "Strokes cannot be transformed";

impl Element for SceneObject {
    fn element_type(&self) -> &'static str {
        match &self.kind {
            SceneObjectKind::Image(media) => media.element_type(),
            SceneObjectKind::Stroke(stroke) => stroke.element_type(),
        }
    }

    fn rect(&self) -> Rect {
        match &self.kind {
            SceneObjectKind::Image(media) => media.rect(),
            SceneObjectKind::Stroke(stroke) => stroke.rect(),
        }
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        match &self.kind {
            SceneObjectKind::Image(media) => media.hit_test(pos),
            SceneObjectKind::Stroke(stroke) => stroke.hit_test(pos),
        }
    }
}
