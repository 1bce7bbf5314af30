use egui::{Pos2, Rect};

// Common constants for all element types
pub const MIN_ELEMENT_SIZE: f32 = 8.0;

/// Validates that a rectangle has minimum dimensions
pub(crate) fn validate_rect(rect: &Rect) -> Result<(), String> {
    if rect.width() < MIN_ELEMENT_SIZE || rect.height() < MIN_ELEMENT_SIZE {
        Err(format!(
            "Element dimensions too small (min: {}). Width: {}, Height: {}",
            MIN_ELEMENT_SIZE,
            rect.width(),
            rect.height()
        ))
    } else {
        Ok(())
    }
}

/// Distance from a point to a line segment (stroke hit testing and rasterizing)
pub(crate) fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let line_len = line_vec.length();
    if line_len == 0.0 {
        return point_vec.length();
    }

    let t = ((point_vec.x * line_vec.x + point_vec.y * line_vec.y) / line_len).clamp(0.0, line_len);
    let projection = line_start + (line_vec * t / line_len);
    (point - projection).length()
}

/// Calculate the bounding box for a set of points
pub(crate) fn calculate_bounds(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::from_min_max(
        Pos2::new(min_x - padding, min_y - padding),
        Pos2::new(max_x + padding, max_y + padding),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_distance() {
        let d = distance_to_line_segment(Pos2::new(5.0, 3.0), Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0));
        assert!((d - 3.0).abs() < 1e-5);
        // Past the end of the segment the distance is to the endpoint
        let d = distance_to_line_segment(Pos2::new(13.0, 4.0), Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-5);
    }

    #[test]
    fn bounds_are_padded() {
        let rect = calculate_bounds(&[Pos2::new(1.0, 2.0), Pos2::new(5.0, -1.0)], 1.0);
        assert_eq!(rect, Rect::from_min_max(Pos2::new(0.0, -2.0), Pos2::new(6.0, 3.0)));
        assert_eq!(calculate_bounds(&[], 3.0), Rect::NOTHING);
    }
}
