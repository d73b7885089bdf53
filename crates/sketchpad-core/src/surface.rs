//! Abstract render surface and an in-memory recording implementation.

use kurbo::{Affine, Point, Rect, Vec2};

/// A 2-D drawing target.
///
/// Transform calls compose onto the current transform the way a canvas
/// context does: `translate` then `rotate` rotates about the translated origin.
pub trait Surface {
    /// Erase everything drawn so far.
    fn clear(&mut self);

    /// Stroke a connected path through `points`.
    fn draw_path(&mut self, points: &[Point], line_width: f64);

    /// Draw `text` centered on `center`.
    fn draw_text(&mut self, text: &str, center: Point, font_size: f64);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect);

    /// Push the current transform.
    fn save(&mut self);

    /// Pop the last saved transform. Unbalanced calls are ignored.
    fn restore(&mut self);

    fn translate(&mut self, offset: Vec2);

    fn rotate(&mut self, radians: f64);

    fn scale(&mut self, factor: f64);
}

/// Save/restore stack of affine transforms, shared by surface implementations.
#[derive(Debug, Clone, Default)]
pub struct TransformStack {
    current: Affine,
    saved: Vec<Affine>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform in effect for the next draw call.
    pub fn current(&self) -> Affine {
        self.current
    }

    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    pub fn restore(&mut self) {
        if let Some(previous) = self.saved.pop() {
            self.current = previous;
        }
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.current = self.current * Affine::translate(offset);
    }

    pub fn rotate(&mut self, radians: f64) {
        self.current = self.current * Affine::rotate(radians);
    }

    pub fn scale(&mut self, factor: f64) {
        self.current = self.current * Affine::scale(factor);
    }

    /// Drop all saved state and return to identity.
    pub fn reset(&mut self) {
        self.current = Affine::IDENTITY;
        self.saved.clear();
    }

    /// Number of unrestored saves.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

/// A draw call captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Path {
        points: Vec<Point>,
        line_width: f64,
        transform: Affine,
    },
    Text {
        glyph: String,
        at: Point,
        font_size: f64,
        transform: Affine,
    },
    Rect {
        rect: Rect,
        transform: Affine,
    },
}

/// Surface that records draw calls with the transform in effect.
///
/// `clear` empties the recording, so after a redraw it holds exactly one frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    transforms: TransformStack,
    clears: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded since the last clear.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of times the surface has been cleared.
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    /// Current transform.
    pub fn transform(&self) -> Affine {
        self.transforms.current()
    }

    /// Points of every recorded path, in draw order.
    pub fn paths(&self) -> Vec<&[Point]> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Path { points, .. } => Some(points.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Text of every recorded glyph, in draw order.
    pub fn glyphs(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { glyph, .. } => Some(glyph.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
        self.transforms.reset();
        self.clears += 1;
    }

    fn draw_path(&mut self, points: &[Point], line_width: f64) {
        self.commands.push(DrawCommand::Path {
            points: points.to_vec(),
            line_width,
            transform: self.transforms.current(),
        });
    }

    fn draw_text(&mut self, text: &str, center: Point, font_size: f64) {
        self.commands.push(DrawCommand::Text {
            glyph: text.to_string(),
            at: center,
            font_size,
            transform: self.transforms.current(),
        });
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Rect {
            rect,
            transform: self.transforms.current(),
        });
    }

    fn save(&mut self) {
        self.transforms.save();
    }

    fn restore(&mut self) {
        self.transforms.restore();
    }

    fn translate(&mut self, offset: Vec2) {
        self.transforms.translate(offset);
    }

    fn rotate(&mut self, radians: f64) {
        self.transforms.rotate(radians);
    }

    fn scale(&mut self, factor: f64) {
        self.transforms.scale(factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_returns_to_saved() {
        let mut stack = TransformStack::new();
        stack.translate(Vec2::new(5.0, 5.0));
        stack.save();
        stack.rotate(1.0);
        stack.restore();
        assert_eq!(stack.current(), Affine::translate((5.0, 5.0)));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_unbalanced_restore_ignored() {
        let mut stack = TransformStack::new();
        stack.scale(2.0);
        stack.restore();
        assert_eq!(stack.current(), Affine::scale(2.0));
    }

    #[test]
    fn test_translate_then_rotate_pivots_on_offset() {
        let mut stack = TransformStack::new();
        stack.translate(Vec2::new(10.0, 0.0));
        stack.rotate(std::f64::consts::FRAC_PI_2);
        let p = stack.current() * Point::new(1.0, 0.0);
        assert!((p.x - 10.0).abs() < 1e-9);
        assert!((p.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_recording_clear_starts_new_frame() {
        let mut surface = RecordingSurface::new();
        surface.draw_path(&[Point::ZERO], 3.0);
        surface.clear();
        surface.draw_text("x", Point::ZERO, 15.0);
        assert_eq!(surface.commands().len(), 2);
        assert_eq!(surface.commands()[0], DrawCommand::Clear);
        assert_eq!(surface.glyphs(), vec!["x"]);
        assert_eq!(surface.clear_count(), 1);
    }
}
