use egui::{Color32, Pos2, Rect};

use super::Element;
use crate::brush::Brush;
use crate::element::common;

/// A finished freehand stroke in canvas coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    points: Vec<Pos2>,
    color: Color32,
    width: f32,
}

impl Stroke {
    pub fn new(points: Vec<Pos2>, brush: Brush) -> Self {
        Self {
            points,
            color: brush.color,
            width: f32::from(brush.width),
        }
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }
}

impl Element for Stroke {
    fn element_type(&self) -> &'static str {
        "stroke"
    }

    fn rect(&self) -> Rect {
        common::calculate_bounds(&self.points, self.width / 2.0)
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        let radius = self.width / 2.0;
        match self.points.as_slice() {
            [] => false,
            [only] => (pos - *only).length() <= radius,
            points => points
                .windows(2)
                .any(|w| common::distance_to_line_segment(pos, w[0], w[1]) <= radius),
        }
    }
}

/// Stroke being recorded while the pointer is held down
#[derive(Debug, Clone)]
pub struct MutableStroke {
    points: Vec<Pos2>,
    brush: Brush,
}

impl MutableStroke {
    pub fn new(brush: Brush) -> Self {
        Self {
            points: Vec::new(),
            brush,
        }
    }

    /// Consecutive duplicates are dropped, they add nothing to the path
    pub fn add_point(&mut self, point: Pos2) {
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    pub fn into_stroke(self) -> Stroke {
        Stroke::new(self.points, self.brush)
    }
}
