//! Vello-based surface implementation.

use crate::renderer::{ExportScene, RenderResult, export_dimensions};
use kurbo::{Affine, BezPath, Cap, Join, Point, Rect, Size, Stroke, Vec2};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, LayoutContext};
use peniko::{Brush, Color, Fill, Mix};
use sketchpad_core::{Session, Surface, TransformStack};
use vello::Scene;

/// Font families tried for sticker glyphs, emoji fonts first.
const STICKER_FONT_STACK: &str =
    "'Noto Color Emoji', 'Apple Color Emoji', 'Segoe UI Emoji', system-ui, sans-serif";

/// Surface that encodes draw calls into a Vello scene.
pub struct VelloSurface {
    /// The Vello scene being built.
    scene: Scene,
    transforms: TransformStack,
    /// Canvas-to-target transform applied beneath all draw calls.
    view: Affine,
    /// Paper drawn on every clear, in canvas coordinates.
    paper: Option<(Rect, Color)>,
    ink: Color,
    /// Font context for text rendering (cached so system fonts load once).
    font_cx: FontContext,
    /// Layout context for text rendering.
    layout_cx: LayoutContext<Brush>,
}

impl Default for VelloSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloSurface {
    /// Create a surface drawing black ink with no paper.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            transforms: TransformStack::new(),
            view: Affine::IDENTITY,
            paper: None,
            ink: Color::BLACK,
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
        }
    }

    /// Draw a `color` sheet of `size` beneath everything on each clear.
    pub fn with_paper(mut self, size: Size, color: Color) -> Self {
        self.paper = Some((size.to_rect(), color));
        self
    }

    /// Set the canvas-to-target transform used from the next draw call on.
    pub fn set_view_transform(&mut self, view: Affine) {
        self.view = view;
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// Build the export scene for `session` at `scale`.
    ///
    /// Replays the live drawables only; the target size is the canvas
    /// size multiplied by `scale`.
    pub fn build_export_scene<S: Surface>(
        &mut self,
        session: &Session<S>,
        scale: f64,
    ) -> RenderResult<ExportScene> {
        let size = session.config().canvas_size();
        let (width, height) = export_dimensions(size.width, size.height, scale)?;

        self.view = Affine::IDENTITY;
        session.export(self, scale);

        Ok(ExportScene {
            scene: self.take_scene(),
            width,
            height,
        })
    }

    fn current_transform(&self) -> Affine {
        self.view * self.transforms.current()
    }

    /// Clip following ink to the paper, if there is one. Returns whether a layer was pushed.
    fn begin_ink(&mut self) -> bool {
        match self.paper {
            Some((rect, _)) => {
                self.scene.push_layer(Mix::Clip, 1.0, self.view, &rect);
                true
            }
            None => false,
        }
    }

    fn end_ink(&mut self, clipped: bool) {
        if clipped {
            self.scene.pop_layer();
        }
    }
}

/// Connected polyline through `points`.
fn polyline(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(*first);
    for point in rest {
        path.line_to(*point);
    }
    path
}

impl Surface for VelloSurface {
    fn clear(&mut self) {
        self.scene.reset();
        self.transforms.reset();
        if let Some((rect, color)) = self.paper {
            self.scene.fill(Fill::NonZero, self.view, color, None, &rect);
        }
    }

    fn draw_path(&mut self, points: &[Point], line_width: f64) {
        // A single point has no visible extent.
        if points.len() < 2 {
            return;
        }
        let stroke = Stroke::new(line_width)
            .with_caps(Cap::Round)
            .with_join(Join::Round);
        let clipped = self.begin_ink();
        self.scene.stroke(
            &stroke,
            self.current_transform(),
            self.ink,
            None,
            &polyline(points),
        );
        self.end_ink(clipped);
    }

    fn draw_text(&mut self, text: &str, center: Point, font_size: f64) {
        use parley::StyleProperty;

        if text.is_empty() {
            return;
        }

        let brush = Brush::Solid(self.ink);
        let mut builder = self.layout_cx.ranged_builder(&mut self.font_cx, text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(font_size as f32));
        builder.push_default(StyleProperty::Brush(brush.clone()));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::Source(
            STICKER_FONT_STACK.into(),
        )));
        let mut layout = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());

        // Parley lays out from the top-left; shift so the box is centered.
        let half = Vec2::new(layout.width() as f64, layout.height() as f64) / 2.0;
        let text_transform = self.current_transform() * Affine::translate(center.to_vec2() - half);

        let clipped = self.begin_ink();
        let mut glyph_count = 0;
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let font = run.font();
                let run_font_size = run.font_size();
                let synthesis = run.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        glyph_count += 1;
                        vello::Glyph { id: glyph.id, x: gx, y: gy }
                    })
                    .collect();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(font)
                        .brush(&brush)
                        .hint(false)
                        .transform(text_transform)
                        .glyph_transform(glyph_xform)
                        .font_size(run_font_size)
                        .normalized_coords(run.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }

        // No font covered the text: mark its footprint instead of drawing nothing.
        if glyph_count == 0 {
            log::warn!("No font found for sticker {:?}", text);
            let rect = Rect::from_center_size(center, (font_size, font_size));
            self.scene.fill(
                Fill::NonZero,
                self.current_transform(),
                Color::from_rgba8(255, 100, 100, 100),
                None,
                &rect,
            );
        }
        self.end_ink(clipped);
    }

    fn fill_rect(&mut self, rect: Rect) {
        let clipped = self.begin_ink();
        self.scene
            .fill(Fill::NonZero, self.current_transform(), self.ink, None, &rect);
        self.end_ink(clipped);
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
    use sketchpad_core::{RecordingSurface, ToolKind};

    #[test]
    fn test_surface_creation() {
        let surface = VelloSurface::new();
        assert!(surface.scene().encoding().is_empty());
    }

    #[test]
    fn test_single_point_path_draws_nothing() {
        let mut surface = VelloSurface::new();
        surface.clear();
        surface.draw_path(&[Point::new(1.0, 1.0)], 3.0);
        assert!(surface.scene().encoding().is_empty());
    }

    #[test]
    fn test_path_is_encoded() {
        let mut surface = VelloSurface::new();
        surface.clear();
        surface.draw_path(&[Point::new(0.0, 0.0), Point::new(10.0, 10.0)], 3.0);
        assert!(!surface.scene().encoding().is_empty());
    }

    #[test]
    fn test_clear_keeps_only_paper() {
        let mut surface = VelloSurface::new().with_paper(Size::new(256.0, 256.0), Color::WHITE);
        surface.draw_path(&[Point::new(0.0, 0.0), Point::new(10.0, 10.0)], 3.0);
        surface.clear();
        let with_paper = surface.scene().encoding().n_paths;
        assert_eq!(with_paper, 1);
    }

    #[test]
    fn test_ink_is_clipped_to_paper() {
        let mut surface = VelloSurface::new().with_paper(Size::new(256.0, 256.0), Color::WHITE);
        surface.clear();
        surface.draw_path(&[Point::new(-100.0, -100.0), Point::new(400.0, 400.0)], 7.0);
        let one_draw = surface.scene().encoding().n_clips;
        assert!(one_draw > 0);

        surface.fill_rect(Rect::new(250.0, 250.0, 300.0, 300.0));
        assert_eq!(surface.scene().encoding().n_clips, one_draw * 2);
    }

    #[test]
    fn test_no_clip_without_paper() {
        let mut surface = VelloSurface::new();
        surface.clear();
        surface.draw_path(&[Point::new(-100.0, -100.0), Point::new(400.0, 400.0)], 7.0);
        assert_eq!(surface.scene().encoding().n_clips, 0);
    }

    #[test]
    fn test_polyline_visits_points_in_order() {
        let path = polyline(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 2.0)]);
        let elements: Vec<_> = path.elements().to_vec();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0], kurbo::PathEl::MoveTo(Point::new(0.0, 0.0)));
        assert_eq!(elements[2], kurbo::PathEl::LineTo(Point::new(2.0, 2.0)));
        assert!(polyline(&[]).elements().is_empty());
    }

    #[test]
    fn test_export_scene_size() {
        let mut session = Session::new(RecordingSurface::new());
        session.set_tool(ToolKind::Stroke).unwrap();
        session.pointer_down(Point::new(0.0, 0.0));
        session.pointer_move(Point::new(100.0, 100.0));
        session.pointer_up();

        let mut exporter = VelloSurface::new();
        let export = exporter.build_export_scene(&session, 4.0).unwrap();
        assert_eq!((export.width, export.height), (1024, 1024));
        assert!(!export.scene.encoding().is_empty());
        assert!(exporter.scene().encoding().is_empty());
    }

    #[test]
    fn test_export_rejects_zero_scale() {
        let session = Session::new(RecordingSurface::new());
        let mut exporter = VelloSurface::new();
        assert!(exporter.build_export_scene(&session, 0.0).is_err());
    }
}
