//! Live drawables and their undo/redo history.

use crate::drawable::{Drawable, DrawableId};
use kurbo::Point;

/// Marker returned by every operation that changed what is on screen.
///
/// The caller redraws once per marker.
#[must_use = "content changes must trigger a redraw"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentChanged;

/// Ordered live drawables plus undo record and redo buffer.
///
/// Drawables are moved between the live sequence and the redo buffer, never
/// copied, so a redone drawable keeps its identity.
#[derive(Debug, Default)]
pub struct History {
    /// Visible drawables, back to front.
    live: Vec<Drawable>,
    /// Creation record used to find the most recent drawable.
    undo_record: Vec<DrawableId>,
    /// Drawables removed by undo, most recent last.
    redo_buffer: Vec<Drawable>,
    /// Drawable still receiving points from its gesture.
    open: Option<DrawableId>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new drawable and open its gesture. Invalidates redo.
    pub fn begin_gesture(&mut self, drawable: Drawable) -> ContentChanged {
        let id = drawable.id();
        self.live.push(drawable);
        self.undo_record.push(id);
        self.redo_buffer.clear();
        self.open = Some(id);
        log::debug!("Gesture began: {}", id);
        ContentChanged
    }

    /// Extend the open drawable. Returns `None` if no gesture is open.
    pub fn continue_gesture(&mut self, point: Point) -> Option<ContentChanged> {
        let open = self.open?;
        let drawable = self.live.last_mut().filter(|d| d.id() == open)?;
        drawable.extend(point);
        Some(ContentChanged)
    }

    /// Close the open gesture, if any.
    pub fn end_gesture(&mut self) {
        if let Some(id) = self.open.take() {
            log::debug!("Gesture ended: {}", id);
        }
    }

    /// Move the most recent live drawable to the redo buffer.
    pub fn undo(&mut self) -> ContentChanged {
        self.open = None;
        self.undo_record.pop();
        if let Some(drawable) = self.live.pop() {
            log::debug!("Undo: {}", drawable.id());
            self.redo_buffer.push(drawable);
        }
        ContentChanged
    }

    /// Restore the most recently undone drawable to the top.
    pub fn redo(&mut self) -> ContentChanged {
        self.open = None;
        if let Some(drawable) = self.redo_buffer.pop() {
            log::debug!("Redo: {}", drawable.id());
            self.undo_record.push(drawable.id());
            self.live.push(drawable);
        }
        ContentChanged
    }

    /// Drop every drawable, including the redo buffer.
    pub fn clear(&mut self) -> ContentChanged {
        self.live.clear();
        self.undo_record.clear();
        self.redo_buffer.clear();
        self.open = None;
        ContentChanged
    }

    /// Live drawables, back to front.
    pub fn live(&self) -> &[Drawable] {
        &self.live
    }

    /// Undone drawables, most recent last.
    pub fn redo_buffer(&self) -> &[Drawable] {
        &self.redo_buffer
    }

    /// Creation record, most recent last.
    pub fn undo_record(&self) -> &[DrawableId] {
        &self.undo_record
    }

    /// The drawable whose gesture is still open.
    pub fn open_drawable(&self) -> Option<&Drawable> {
        let open = self.open?;
        self.live.last().filter(|d| d.id() == open)
    }

    pub fn is_gesture_open(&self) -> bool {
        self.open.is_some()
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.live.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_buffer.is_empty()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Serialize the live drawables to JSON for inspection.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawable::{Stroke, Thickness};

    fn stroke_at(x: f64, y: f64) -> Drawable {
        Drawable::Stroke(Stroke::new(Point::new(x, y), Thickness::Thin, 3.0))
    }

    fn ids(drawables: &[Drawable]) -> Vec<DrawableId> {
        drawables.iter().map(|d| d.id()).collect()
    }

    #[test]
    fn test_history_creation() {
        let history = History::new();
        assert!(history.is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(!history.is_gesture_open());
    }

    #[test]
    fn test_begin_records_everywhere() {
        let mut history = History::new();
        let stroke = stroke_at(0.0, 0.0);
        let id = stroke.id();

        assert_eq!(history.begin_gesture(stroke), ContentChanged);
        assert_eq!(ids(history.live()), vec![id]);
        assert_eq!(history.undo_record(), &[id]);
        assert_eq!(history.open_drawable().map(|d| d.id()), Some(id));
    }

    #[test]
    fn test_continue_without_gesture_is_silent() {
        let mut history = History::new();
        assert_eq!(history.continue_gesture(Point::new(1.0, 1.0)), None);

        let _ = history.begin_gesture(stroke_at(0.0, 0.0));
        history.end_gesture();
        assert_eq!(history.continue_gesture(Point::new(1.0, 1.0)), None);
        assert_eq!(history.live()[0].as_stroke().unwrap().len(), 1);
    }

    #[test]
    fn test_continue_extends_open_drawable() {
        let mut history = History::new();
        let _ = history.begin_gesture(stroke_at(0.0, 0.0));
        assert_eq!(history.continue_gesture(Point::new(1.0, 1.0)), Some(ContentChanged));
        assert_eq!(history.continue_gesture(Point::new(2.0, 2.0)), Some(ContentChanged));

        let stroke = history.live()[0].as_stroke().unwrap();
        assert_eq!(
            stroke.points(),
            &[Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 2.0)]
        );
    }

    #[test]
    fn test_undo_redo_preserve_identity() {
        let mut history = History::new();
        let stroke = stroke_at(0.0, 0.0);
        let id = stroke.id();
        let _ = history.begin_gesture(stroke);
        let _ = history.continue_gesture(Point::new(5.0, 5.0));
        history.end_gesture();

        let _ = history.undo();
        assert!(history.is_empty());
        assert!(history.undo_record().is_empty());
        assert_eq!(ids(history.redo_buffer()), vec![id]);

        let _ = history.redo();
        assert_eq!(ids(history.live()), vec![id]);
        assert_eq!(history.undo_record(), &[id]);
        assert!(history.redo_buffer().is_empty());
        assert_eq!(history.live()[0].as_stroke().unwrap().len(), 2);
    }

    #[test]
    fn test_undo_targets_tail() {
        let mut history = History::new();
        let a = stroke_at(0.0, 0.0);
        let b = stroke_at(1.0, 1.0);
        let (a_id, b_id) = (a.id(), b.id());
        let _ = history.begin_gesture(a);
        let _ = history.begin_gesture(b);

        let _ = history.undo();
        assert_eq!(ids(history.live()), vec![a_id]);
        let _ = history.undo();
        assert_eq!(ids(history.redo_buffer()), vec![b_id, a_id]);

        let _ = history.redo();
        assert_eq!(ids(history.live()), vec![a_id]);
        let _ = history.redo();
        assert_eq!(ids(history.live()), vec![a_id, b_id]);
    }

    #[test]
    fn test_new_gesture_invalidates_redo() {
        let mut history = History::new();
        let _ = history.begin_gesture(stroke_at(0.0, 0.0));
        let _ = history.undo();
        assert!(history.can_redo());

        let b = stroke_at(1.0, 1.0);
        let b_id = b.id();
        let _ = history.begin_gesture(b);
        assert!(!history.can_redo());

        let _ = history.redo();
        assert_eq!(ids(history.live()), vec![b_id]);
    }

    #[test]
    fn test_empty_undo_redo_change_nothing() {
        let mut history = History::new();
        assert_eq!(history.undo(), ContentChanged);
        assert_eq!(history.redo(), ContentChanged);
        assert!(history.is_empty());
        assert!(history.undo_record().is_empty());
        assert!(history.redo_buffer().is_empty());
    }

    #[test]
    fn test_clear_then_redo_is_noop() {
        let mut history = History::new();
        let _ = history.begin_gesture(stroke_at(0.0, 0.0));
        let _ = history.begin_gesture(stroke_at(1.0, 1.0));
        let _ = history.undo();

        let _ = history.clear();
        let _ = history.redo();
        assert!(history.is_empty());
        assert!(history.undo_record().is_empty());
        assert!(history.redo_buffer().is_empty());
    }

    #[test]
    fn test_undo_closes_open_gesture() {
        let mut history = History::new();
        let _ = history.begin_gesture(stroke_at(0.0, 0.0));
        let _ = history.begin_gesture(stroke_at(1.0, 1.0));
        let _ = history.undo();

        assert!(!history.is_gesture_open());
        assert_eq!(history.continue_gesture(Point::new(9.0, 9.0)), None);
        assert_eq!(history.live()[0].as_stroke().unwrap().len(), 1);
    }

    #[test]
    fn test_to_json_lists_live() {
        let mut history = History::new();
        let _ = history.begin_gesture(stroke_at(0.0, 0.0));
        let json = history.to_json().unwrap();
        let restored: Vec<Drawable> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, history.live());
    }
}
