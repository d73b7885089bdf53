//! Sticker drawable: a glyph stamped at an anchor.

use super::{DrawableId, DrawableTrait, Thickness};
use crate::error::{Error, Result};
use crate::surface::Surface;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A glyph stamped on the canvas, centered on its anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sticker {
    pub(crate) id: DrawableId,
    /// Center of the glyph. Moves while the sticker is being placed.
    pub anchor: Point,
    glyph: String,
    /// Thickness category chosen when the sticker was stamped.
    pub thickness: Thickness,
    /// Font size resolved from the thickness at creation.
    pub font_size: f64,
    /// Rotation about the anchor, in degrees.
    pub rotation: f64,
}

impl Sticker {
    /// Create a sticker. Fails if `glyph` is empty or whitespace.
    pub fn new(
        anchor: Point,
        glyph: impl Into<String>,
        thickness: Thickness,
        font_size: f64,
        rotation: f64,
    ) -> Result<Self> {
        let glyph = glyph.into();
        if glyph.trim().is_empty() {
            return Err(Error::InvalidGlyph);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            anchor,
            glyph,
            thickness,
            font_size,
            rotation,
        })
    }

    /// The stamped text.
    pub fn glyph(&self) -> &str {
        &self.glyph
    }

    /// Move the sticker to a new anchor.
    pub fn move_to(&mut self, point: Point) {
        self.anchor = point;
    }
}

impl DrawableTrait for Sticker {
    fn id(&self) -> DrawableId {
        self.id
    }

    fn extend(&mut self, point: Point) {
        self.move_to(point);
    }

    fn render(&self, surface: &mut dyn Surface) {
        surface.save();
        surface.translate(self.anchor.to_vec2());
        surface.rotate(self.rotation.to_radians());
        surface.draw_text(&self.glyph, Point::ZERO, self.font_size);
        surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};
    use kurbo::Affine;

    #[test]
    fn test_empty_glyph_rejected() {
        let result = Sticker::new(Point::ZERO, "", Thickness::Thin, 15.0, 0.0);
        assert!(matches!(result, Err(Error::InvalidGlyph)));
        let result = Sticker::new(Point::ZERO, "  ", Thickness::Thin, 15.0, 0.0);
        assert!(matches!(result, Err(Error::InvalidGlyph)));
    }

    #[test]
    fn test_extend_relocates() {
        let mut sticker = Sticker::new(Point::new(1.0, 1.0), "🐟", Thickness::Thin, 15.0, 0.0).unwrap();
        sticker.extend(Point::new(5.0, 6.0));
        sticker.extend(Point::new(7.0, 8.0));
        assert_eq!(sticker.anchor, Point::new(7.0, 8.0));
    }

    #[test]
    fn test_render_rotates_about_anchor() {
        let sticker = Sticker::new(Point::new(10.0, 20.0), "🤡", Thickness::Thick, 30.0, 90.0).unwrap();
        let mut surface = RecordingSurface::new();
        sticker.render(&mut surface);

        let expected = Affine::translate((10.0, 20.0)) * Affine::rotate(90f64.to_radians());
        match &surface.commands()[0] {
            DrawCommand::Text { glyph, at, font_size, transform } => {
                assert_eq!(glyph, "🤡");
                assert_eq!(*at, Point::ZERO);
                assert_eq!(*font_size, 30.0);
                assert_eq!(*transform, expected);
            }
            other => panic!("expected text, got {:?}", other),
        }
        assert_eq!(surface.transform(), Affine::IDENTITY);
    }
}
