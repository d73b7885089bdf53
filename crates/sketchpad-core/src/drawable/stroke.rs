//! Freehand stroke drawable.

use super::{DrawableId, DrawableTrait, Thickness};
use crate::surface::Surface;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand stroke: a connected path through the recorded points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub(crate) id: DrawableId,
    /// Points in drawing order. Never empty.
    points: Vec<Point>,
    /// Thickness category chosen when the stroke began.
    pub thickness: Thickness,
    /// Line width resolved from the thickness at creation.
    pub line_width: f64,
}

impl Stroke {
    /// Start a stroke at `start`.
    pub fn new(start: Point, thickness: Thickness, line_width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: vec![start],
            thickness,
            line_width,
        }
    }

    /// Append a point. Coincident points are kept.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Recorded points in drawing order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// A stroke always holds its start point.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the stroke has no visible extent yet.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }
}

impl DrawableTrait for Stroke {
    fn id(&self) -> DrawableId {
        self.id
    }

    fn extend(&mut self, point: Point) {
        self.add_point(point);
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.draw_path(&self.points, self.line_width);
    }
}
