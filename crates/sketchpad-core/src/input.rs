//! Pointer events delivered to the session.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event in canvas coordinates.
///
/// Positions are already mapped into the surface's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up,
    /// Pointer left the canvas; ends any open gesture.
    Leave,
}

impl PointerEvent {
    /// Position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position } | PointerEvent::Move { position } => Some(*position),
            PointerEvent::Up | PointerEvent::Leave => None,
        }
    }
}

/// Maps window coordinates to canvas coordinates.
///
/// The canvas is drawn at `offset` with `scale` physical pixels per canvas unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMapping {
    pub offset: kurbo::Vec2,
    pub scale: f64,
}

impl Default for CanvasMapping {
    fn default() -> Self {
        Self {
            offset: kurbo::Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl CanvasMapping {
    /// Fit a canvas of `canvas` size centered inside `viewport`.
    pub fn fit(canvas: kurbo::Size, viewport: kurbo::Size) -> Self {
        if canvas.width <= 0.0 || canvas.height <= 0.0 {
            return Self::default();
        }
        let scale = (viewport.width / canvas.width)
            .min(viewport.height / canvas.height)
            .max(f64::EPSILON);
        let offset = kurbo::Vec2::new(
            (viewport.width - canvas.width * scale) / 2.0,
            (viewport.height - canvas.height * scale) / 2.0,
        );
        Self { offset, scale }
    }

    /// Convert a window position to canvas coordinates.
    pub fn to_canvas(&self, window: Point) -> Point {
        ((window - self.offset).to_vec2() / self.scale).to_point()
    }

    /// Canvas coordinates of `window`, or `None` when it falls outside a canvas of `canvas` size.
    pub fn hit(&self, window: Point, canvas: kurbo::Size) -> Option<Point> {
        let point = self.to_canvas(window);
        kurbo::Rect::from_origin_size(Point::ZERO, canvas)
            .contains(point)
            .then_some(point)
    }

    /// Affine that draws canvas coordinates into the window.
    pub fn transform(&self) -> kurbo::Affine {
        kurbo::Affine::translate(self.offset) * kurbo::Affine::scale(self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;

    #[test]
    fn test_event_position() {
        let down = PointerEvent::Down { position: Point::new(1.0, 2.0) };
        assert_eq!(down.position(), Some(Point::new(1.0, 2.0)));
        assert_eq!(PointerEvent::Up.position(), None);
        assert_eq!(PointerEvent::Leave.position(), None);
    }

    #[test]
    fn test_fit_centers_canvas() {
        let mapping = CanvasMapping::fit(Size::new(256.0, 256.0), Size::new(1024.0, 512.0));
        assert_eq!(mapping.scale, 2.0);
        assert_eq!(mapping.offset, kurbo::Vec2::new(256.0, 0.0));
    }

    #[test]
    fn test_to_canvas_inverts_transform() {
        let mapping = CanvasMapping::fit(Size::new(256.0, 256.0), Size::new(1024.0, 512.0));
        let canvas_point = Point::new(10.0, 20.0);
        let window = mapping.transform() * canvas_point;
        let back = mapping.to_canvas(window);
        assert!((back.x - canvas_point.x).abs() < 1e-9);
        assert!((back.y - canvas_point.y).abs() < 1e-9);
    }

    #[test]
    fn test_hit_ignores_letterbox() {
        let canvas = Size::new(256.0, 256.0);
        let mapping = CanvasMapping::fit(canvas, Size::new(1024.0, 512.0));
        assert_eq!(mapping.hit(Point::new(100.0, 100.0), canvas), None);
        assert_eq!(mapping.hit(Point::new(900.0, 10.0), canvas), None);
        assert_eq!(
            mapping.hit(Point::new(276.0, 40.0), canvas),
            Some(Point::new(10.0, 20.0))
        );
    }
}
