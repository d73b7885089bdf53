//! Input/render session: turns pointer events and commands into history
//! operations and replays the live drawables onto a surface.

use crate::config::SketchpadConfig;
use crate::drawable::{Drawable, DrawableId, Sticker, Thickness};
use crate::error::Result;
use crate::history::{ContentChanged, History};
use crate::input::PointerEvent;
use crate::surface::Surface;
use crate::tools::{ToolKind, ToolSettings};
use kurbo::{Point, Rect};

/// Gesture state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// A pointer is down and `drawable` is receiving its points.
    Gesturing { drawable: DrawableId },
}

/// Sketchpad session owning the history and the render surface.
///
/// Every content change is followed synchronously by a full redraw.
pub struct Session<S: Surface> {
    history: History,
    tools: ToolSettings,
    config: SketchpadConfig,
    state: GestureState,
    surface: S,
    /// Last idle pointer position, for the tool preview.
    hover: Option<Point>,
    content_changes: u64,
}

impl<S: Surface> Session<S> {
    /// Create a session with the default configuration.
    pub fn new(surface: S) -> Self {
        Self::with_config(surface, SketchpadConfig::default())
    }

    /// Create a session with a custom configuration.
    pub fn with_config(surface: S, config: SketchpadConfig) -> Self {
        let mut session = Self {
            history: History::new(),
            tools: ToolSettings::new(&config),
            config,
            state: GestureState::Idle,
            surface,
            hover: None,
            content_changes: 0,
        };
        session.repaint();
        session
    }

    /// Dispatch a pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position } => self.pointer_down(position),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up => self.pointer_up(),
            PointerEvent::Leave => self.pointer_leave(),
        }
    }

    /// Start a gesture with a new drawable from the current tool.
    pub fn pointer_down(&mut self, point: Point) {
        self.end_open_gesture();
        self.hover = None;

        let drawable = match Drawable::create(self.tools.tool(), point, &self.tools) {
            Ok(drawable) => drawable,
            Err(e) => {
                log::warn!("Cannot start gesture: {}", e);
                return;
            }
        };
        let id = drawable.id();
        self.state = GestureState::Gesturing { drawable: id };
        let changed = self.history.begin_gesture(drawable);
        self.content_changed(changed);
    }

    /// Extend the open drawable, or move the tool preview when idle.
    pub fn pointer_move(&mut self, point: Point) {
        match self.state {
            GestureState::Gesturing { .. } => {
                if let Some(changed) = self.history.continue_gesture(point) {
                    self.content_changed(changed);
                }
            }
            GestureState::Idle => {
                self.hover = Some(point);
                self.repaint();
            }
        }
    }

    /// End the open gesture.
    pub fn pointer_up(&mut self) {
        self.end_open_gesture();
    }

    /// Pointer left the canvas: end the gesture and hide the preview.
    pub fn pointer_leave(&mut self) {
        self.end_open_gesture();
        if self.hover.take().is_some() {
            self.repaint();
        }
    }

    /// Remove every drawable.
    pub fn clear(&mut self) {
        self.end_open_gesture();
        log::info!("Canvas cleared");
        let changed = self.history.clear();
        self.content_changed(changed);
    }

    /// Undo the most recent drawable.
    pub fn undo(&mut self) {
        self.end_open_gesture();
        if self.history.can_undo() {
            log::info!("Undo performed");
        } else {
            log::info!("Nothing to undo");
        }
        let changed = self.history.undo();
        self.content_changed(changed);
    }

    /// Redo the most recently undone drawable.
    pub fn redo(&mut self) {
        self.end_open_gesture();
        if self.history.can_redo() {
            log::info!("Redo performed");
        } else {
            log::info!("Nothing to redo");
        }
        let changed = self.history.redo();
        self.content_changed(changed);
    }

    /// Select the thickness for new drawables. Ends any open gesture.
    pub fn set_thickness(&mut self, thickness: Thickness) {
        self.end_open_gesture();
        self.tools.set_thickness(thickness);
        log::info!("Thickness: {}", thickness.name());
        self.refresh_preview();
    }

    /// Select the tool for new drawables.
    ///
    /// An open gesture keeps its drawable. An empty sticker glyph is
    /// rejected and the previous tool stays selected.
    pub fn set_tool(&mut self, tool: ToolKind) -> Result<()> {
        if let Err(e) = self.tools.set_tool(tool) {
            log::warn!("Tool change ignored: {}", e);
            return Err(e);
        }
        log::info!("Tool: {:?}", self.tools.tool());
        self.refresh_preview();
        Ok(())
    }

    /// Select a sticker with user-supplied text.
    pub fn set_custom_sticker(&mut self, text: &str) -> Result<()> {
        self.set_tool(ToolKind::Custom(text.to_string()))
    }

    /// Select the next palette sticker after the current tool.
    pub fn cycle_sticker(&mut self) {
        let palette = &self.config.stickers;
        if palette.is_empty() {
            return;
        }
        let next = match self.tools.tool() {
            ToolKind::Sticker(glyph) => palette
                .iter()
                .position(|g| g == glyph)
                .map_or(0, |i| (i + 1) % palette.len()),
            _ => 0,
        };
        let glyph = palette[next].clone();
        // Palette glyphs are validated with the config.
        let _ = self.set_tool(ToolKind::Sticker(glyph));
    }

    /// Set sticker rotation in degrees for stickers created from now on.
    pub fn set_rotation(&mut self, degrees: f64) {
        self.tools.set_rotation(degrees);
        log::info!("Rotation: {}°", self.tools.rotation());
        self.refresh_preview();
    }

    /// Replay the live drawables onto `target` at `scale`, without preview.
    pub fn export<T: Surface>(&self, target: &mut T, scale: f64) {
        target.clear();
        target.save();
        target.scale(scale);
        for drawable in self.history.live() {
            drawable.render(target);
        }
        target.restore();
        log::info!("Exported {} drawables at {}x", self.history.len(), scale);
    }

    /// Redraw the surface from scratch: live drawables, then the tool preview.
    pub fn repaint(&mut self) {
        self.surface.clear();
        for drawable in self.history.live() {
            drawable.render(&mut self.surface);
        }
        if self.state == GestureState::Idle {
            if let Some(point) = self.hover {
                self.draw_preview(point);
            }
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn tools(&self) -> &ToolSettings {
        &self.tools
    }

    /// Currently selected tool.
    pub fn tool(&self) -> &ToolKind {
        self.tools.tool()
    }

    pub fn config(&self) -> &SketchpadConfig {
        &self.config
    }

    /// Configured sticker palette.
    pub fn palette(&self) -> &[String] {
        &self.config.stickers
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Number of content-changed notifications handled so far.
    pub fn content_changes(&self) -> u64 {
        self.content_changes
    }

    fn content_changed(&mut self, _changed: ContentChanged) {
        self.content_changes += 1;
        self.repaint();
    }

    fn end_open_gesture(&mut self) {
        if let GestureState::Gesturing { .. } = self.state {
            self.history.end_gesture();
            self.state = GestureState::Idle;
        }
    }

    fn refresh_preview(&mut self) {
        if self.hover.is_some() {
            self.repaint();
        }
    }

    fn draw_preview(&mut self, point: Point) {
        match self.tools.tool() {
            ToolKind::Stroke => {
                let width = self.tools.line_width();
                self.surface
                    .fill_rect(Rect::from_origin_size(point, (width, width)));
            }
            ToolKind::Sticker(glyph) | ToolKind::Custom(glyph) => {
                let preview = Sticker::new(
                    point,
                    glyph.as_str(),
                    self.tools.thickness(),
                    self.tools.font_size(),
                    self.tools.rotation(),
                );
                if let Ok(sticker) = preview {
                    Drawable::Sticker(sticker).render(&mut self.surface);
                }
            }
        }
    }
}
