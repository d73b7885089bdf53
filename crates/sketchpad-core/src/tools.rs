//! Tool selection and the settings captured into new drawables.

use crate::config::SketchpadConfig;
use crate::drawable::Thickness;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    /// Freehand stroke.
    Stroke,
    /// A sticker from the palette.
    Sticker(String),
    /// A sticker with user-supplied text.
    Custom(String),
}

impl ToolKind {
    /// Sticker text, if this is a sticker tool.
    pub fn glyph(&self) -> Option<&str> {
        match self {
            ToolKind::Stroke => None,
            ToolKind::Sticker(glyph) | ToolKind::Custom(glyph) => Some(glyph),
        }
    }

    /// Check that a sticker tool carries a usable glyph.
    fn validate(&self) -> Result<()> {
        match self.glyph() {
            Some(glyph) if glyph.trim().is_empty() => Err(Error::InvalidGlyph),
            _ => Ok(()),
        }
    }
}

/// Session-wide settings applied to drawables created from now on.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    tool: ToolKind,
    thickness: Thickness,
    /// Sticker rotation in degrees.
    rotation: f64,
    line_widths: [f64; 2],
    font_sizes: [f64; 2],
}

impl ToolSettings {
    /// Settings resolved from `config`. The first palette sticker is selected.
    pub fn new(config: &SketchpadConfig) -> Self {
        let tool = config
            .stickers
            .first()
            .filter(|glyph| !glyph.trim().is_empty())
            .map(|glyph| ToolKind::Sticker(glyph.clone()))
            .unwrap_or(ToolKind::Stroke);
        let mut settings = Self {
            tool,
            thickness: Thickness::default(),
            rotation: 0.0,
            line_widths: [
                config.line_width(Thickness::Thin),
                config.line_width(Thickness::Thick),
            ],
            font_sizes: [
                config.font_size(Thickness::Thin),
                config.font_size(Thickness::Thick),
            ],
        };
        settings.set_rotation(config.default_rotation);
        settings
    }

    /// Currently selected tool.
    pub fn tool(&self) -> &ToolKind {
        &self.tool
    }

    /// Select a tool. An empty sticker glyph is rejected and the previous tool kept.
    pub fn set_tool(&mut self, tool: ToolKind) -> Result<()> {
        tool.validate()?;
        self.tool = tool;
        Ok(())
    }

    /// Select a custom sticker from user text.
    pub fn set_custom_sticker(&mut self, text: &str) -> Result<()> {
        self.set_tool(ToolKind::Custom(text.to_string()))
    }

    pub fn thickness(&self) -> Thickness {
        self.thickness
    }

    pub fn set_thickness(&mut self, thickness: Thickness) {
        self.thickness = thickness;
    }

    /// Sticker rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Set sticker rotation in degrees, normalized to [0, 360).
    pub fn set_rotation(&mut self, degrees: f64) {
        if degrees.is_finite() {
            let normalized = degrees.rem_euclid(360.0);
            // Tiny negative inputs round up to exactly 360.
            self.rotation = if normalized >= 360.0 { 0.0 } else { normalized };
        }
    }

    /// Line width for the current thickness.
    pub fn line_width(&self) -> f64 {
        self.line_widths[self.thickness_index()]
    }

    /// Sticker font size for the current thickness.
    pub fn font_size(&self) -> f64 {
        self.font_sizes[self.thickness_index()]
    }

    fn thickness_index(&self) -> usize {
        match self.thickness {
            Thickness::Thin => 0,
            Thickness::Thick => 1,
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::new(&SketchpadConfig::default())
    }
}
