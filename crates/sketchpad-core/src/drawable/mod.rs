//! Drawables: the recorded units of ink on the canvas.

mod sticker;
mod stroke;

pub use sticker::Sticker;
pub use stroke::Stroke;

use crate::error::Result;
use crate::surface::Surface;
use crate::tools::{ToolKind, ToolSettings};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for drawables.
pub type DrawableId = Uuid;

/// Thickness category, fixed per drawable when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Thickness {
    #[default]
    Thin,
    Thick,
}

impl Thickness {
    /// Display name for buttons and logs.
    pub fn name(self) -> &'static str {
        match self {
            Thickness::Thin => "thin",
            Thickness::Thick => "thick",
        }
    }
}

/// Common behaviour of all drawables.
pub trait DrawableTrait {
    /// Get the unique identifier.
    fn id(&self) -> DrawableId;

    /// Feed a pointer position from the drawable's own gesture.
    fn extend(&mut self, point: Point);

    /// Issue draw calls for this drawable. Leaves the surface transform as found.
    fn render(&self, surface: &mut dyn Surface);
}

/// Enum wrapper for all drawable types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Drawable {
    Stroke(Stroke),
    Sticker(Sticker),
}

impl Drawable {
    /// Create a drawable of `kind` at `anchor`, snapshotting `settings`.
    ///
    /// The result does not refer back to `settings`; later changes to the
    /// tool settings never affect it.
    pub fn create(kind: &ToolKind, anchor: Point, settings: &ToolSettings) -> Result<Self> {
        let thickness = settings.thickness();
        match kind {
            ToolKind::Stroke => Ok(Drawable::Stroke(Stroke::new(
                anchor,
                thickness,
                settings.line_width(),
            ))),
            ToolKind::Sticker(glyph) | ToolKind::Custom(glyph) => Ok(Drawable::Sticker(Sticker::new(
                anchor,
                glyph.as_str(),
                thickness,
                settings.font_size(),
                settings.rotation(),
            )?)),
        }
    }

    pub fn id(&self) -> DrawableId {
        match self {
            Drawable::Stroke(d) => d.id(),
            Drawable::Sticker(d) => d.id(),
        }
    }

    pub fn extend(&mut self, point: Point) {
        match self {
            Drawable::Stroke(d) => d.extend(point),
            Drawable::Sticker(d) => d.extend(point),
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        match self {
            Drawable::Stroke(d) => d.render(surface),
            Drawable::Sticker(d) => d.render(surface),
        }
    }

    /// Thickness category the drawable was created with.
    pub fn thickness(&self) -> Thickness {
        match self {
            Drawable::Stroke(d) => d.thickness,
            Drawable::Sticker(d) => d.thickness,
        }
    }

    /// Get the stroke if this drawable is a stroke.
    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            Drawable::Stroke(s) => Some(s),
            _ => None,
        }
    }

    /// Get the sticker if this drawable is a sticker.
    pub fn as_sticker(&self) -> Option<&Sticker> {
        match self {
            Drawable::Sticker(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SketchpadConfig;
    use crate::error::Error;

    #[test]
    fn test_create_stroke_snapshots_width() {
        let mut settings = ToolSettings::new(&SketchpadConfig::default());
        settings.set_thickness(Thickness::Thick);

        let drawable = Drawable::create(&ToolKind::Stroke, Point::new(1.0, 2.0), &settings).unwrap();
        settings.set_thickness(Thickness::Thin);

        let stroke = drawable.as_stroke().unwrap();
        assert_eq!(stroke.thickness, Thickness::Thick);
        assert_eq!(stroke.line_width, 7.0);
        assert_eq!(stroke.points(), &[Point::new(1.0, 2.0)]);
    }

    #[test]
    fn test_create_sticker_snapshots_rotation() {
        let mut settings = ToolSettings::new(&SketchpadConfig::default());
        settings.set_rotation(45.0);

        let kind = ToolKind::Sticker("🐟".to_string());
        let drawable = Drawable::create(&kind, Point::new(3.0, 4.0), &settings).unwrap();
        settings.set_rotation(0.0);

        let sticker = drawable.as_sticker().unwrap();
        assert_eq!(sticker.glyph(), "🐟");
        assert_eq!(sticker.rotation, 45.0);
        assert_eq!(sticker.font_size, 15.0);
        assert_eq!(sticker.anchor, Point::new(3.0, 4.0));
    }

    #[test]
    fn test_create_rejects_empty_glyph() {
        let settings = ToolSettings::new(&SketchpadConfig::default());
        let kind = ToolKind::Custom(String::new());
        let result = Drawable::create(&kind, Point::ZERO, &settings);
        assert!(matches!(result, Err(Error::InvalidGlyph)));
    }

    #[test]
    fn test_ids_are_unique() {
        let settings = ToolSettings::new(&SketchpadConfig::default());
        let a = Drawable::create(&ToolKind::Stroke, Point::ZERO, &settings).unwrap();
        let b = Drawable::create(&ToolKind::Stroke, Point::ZERO, &settings).unwrap();
        assert_ne!(a.id(), b.id());
    }
}
