use egui::{Color32, CursorIcon, Painter, Pos2, Rect, Stroke, Vec2};

use crate::element::MIN_ELEMENT_SIZE;

/// Half-size of the square grab area around each corner
pub const HANDLE_RADIUS: f32 = 8.0;

const HANDLE_COLOR: Color32 = Color32::from_rgb(30, 120, 255);

/// Represents a corner of a selection box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::TopLeft, Corner::TopRight, Corner::BottomLeft, Corner::BottomRight];

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            Corner::TopLeft | Corner::BottomRight => CursorIcon::ResizeNwSe,
            Corner::TopRight | Corner::BottomLeft => CursorIcon::ResizeNeSw,
        }
    }

    pub fn position(&self, rect: Rect) -> Pos2 {
        match self {
            Corner::TopLeft => rect.left_top(),
            Corner::TopRight => rect.right_top(),
            Corner::BottomLeft => rect.left_bottom(),
            Corner::BottomRight => rect.right_bottom(),
        }
    }

    pub fn opposite(&self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }
}

/// Which corner handle of `rect`, if any, is under `pos`
pub fn corner_at(rect: Rect, pos: Pos2, radius: f32) -> Option<Corner> {
    Corner::ALL
        .into_iter()
        .find(|corner| Rect::from_center_size(corner.position(rect), Vec2::splat(radius * 2.0)).contains(pos))
}

/// New rect when `corner` of `original` is dragged to `pos`.
///
/// The opposite corner stays put and the aspect ratio is kept; the result
/// never shrinks below [`MIN_ELEMENT_SIZE`] on either axis.
pub fn resize_from_corner(original: Rect, corner: Corner, pos: Pos2) -> Rect {
    let anchor = corner.opposite().position(original);
    let size = original.size();
    if size.x <= 0.0 || size.y <= 0.0 {
        return original;
    }

    let scale_x = (pos.x - anchor.x).abs() / size.x;
    let scale_y = (pos.y - anchor.y).abs() / size.y;
    let min_scale = (MIN_ELEMENT_SIZE / size.x).max(MIN_ELEMENT_SIZE / size.y);
    let scale = scale_x.max(scale_y).max(min_scale);
    let new_size = size * scale;

    let min = Pos2::new(
        match corner {
            Corner::TopLeft | Corner::BottomLeft => anchor.x - new_size.x,
            Corner::TopRight | Corner::BottomRight => anchor.x,
        },
        match corner {
            Corner::TopLeft | Corner::TopRight => anchor.y - new_size.y,
            Corner::BottomLeft | Corner::BottomRight => anchor.y,
        },
    );
    Rect::from_min_size(min, new_size)
}

/// Draw the outline and the four corner handles of the active object
pub fn draw_handles(painter: &Painter, rect: Rect) {
    painter.rect_stroke(rect, 0.0, Stroke::new(1.0, HANDLE_COLOR));
    for corner in Corner::ALL {
        let handle = Rect::from_center_size(corner.position(rect), Vec2::splat(HANDLE_RADIUS * 1.5));
        painter.rect_filled(handle, 2.0, Color32::WHITE);
        painter.rect_stroke(handle, 2.0, Stroke::new(1.0, HANDLE_COLOR));
    }
}
