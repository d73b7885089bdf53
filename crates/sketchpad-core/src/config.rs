//! Sketchpad configuration.

use crate::drawable::Thickness;
use crate::error::{Error, Result};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stickers offered by default, in palette order.
pub const DEFAULT_STICKERS: [&str; 4] = ["🤡", "🐟", "💩", "❤️"];

/// Configuration for a sketchpad session.
///
/// Every field has a default, so a partial JSON document is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchpadConfig {
    /// Canvas width in logical units.
    pub canvas_width: f64,
    /// Canvas height in logical units.
    pub canvas_height: f64,
    /// Line width used for thin strokes.
    pub thin_line_width: f64,
    /// Line width used for thick strokes.
    pub thick_line_width: f64,
    /// Font size used for thin stickers.
    pub thin_font_size: f64,
    /// Font size used for thick stickers.
    pub thick_font_size: f64,
    /// Resolution multiplier applied on export.
    pub export_scale: f64,
    /// Sticker palette, in display order.
    pub stickers: Vec<String>,
    /// Rotation in degrees applied to stickers until changed.
    pub default_rotation: f64,
}

impl Default for SketchpadConfig {
    fn default() -> Self {
        Self {
            canvas_width: 256.0,
            canvas_height: 256.0,
            thin_line_width: 3.0,
            thick_line_width: 7.0,
            thin_font_size: 15.0,
            thick_font_size: 30.0,
            export_scale: 4.0,
            stickers: DEFAULT_STICKERS.iter().map(|s| s.to_string()).collect(),
            default_rotation: 0.0,
        }
    }
}

impl SketchpadConfig {
    /// Parse and validate a config from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Serialize the config to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that all sizes are usable.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
            ("thin_line_width", self.thin_line_width),
            ("thick_line_width", self.thick_line_width),
            ("thin_font_size", self.thin_font_size),
            ("thick_font_size", self.thick_font_size),
            ("export_scale", self.export_scale),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig(format!("{name} must be positive, got {value}")));
            }
        }
        if !self.default_rotation.is_finite() {
            return Err(Error::InvalidConfig("default_rotation must be finite".to_string()));
        }
        if self.stickers.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::InvalidConfig("stickers must not contain empty glyphs".to_string()));
        }
        Ok(())
    }

    /// Canvas size in logical units.
    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas_width, self.canvas_height)
    }

    /// Line width for a thickness category.
    pub fn line_width(&self, thickness: Thickness) -> f64 {
        match thickness {
            Thickness::Thin => self.thin_line_width,
            Thickness::Thick => self.thick_line_width,
        }
    }

    /// Sticker font size for a thickness category.
    pub fn font_size(&self, thickness: Thickness) -> f64 {
        match thickness {
            Thickness::Thin => self.thin_font_size,
            Thickness::Thick => self.thick_font_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = SketchpadConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.line_width(Thickness::Thin), 3.0);
        assert_eq!(config.line_width(Thickness::Thick), 7.0);
        assert_eq!(config.font_size(Thickness::Thin), 15.0);
        assert_eq!(config.font_size(Thickness::Thick), 30.0);
        assert_eq!(config.stickers.len(), 4);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SketchpadConfig::from_json(r#"{ "thick_line_width": 10.0 }"#).unwrap();
        assert_eq!(config.thick_line_width, 10.0);
        assert_eq!(config.thin_line_width, 3.0);
        assert_eq!(config.export_scale, 4.0);
    }

    #[test]
    fn test_rejects_non_positive_sizes() {
        let result = SketchpadConfig::from_json(r#"{ "export_scale": 0.0 }"#);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_empty_sticker() {
        let result = SketchpadConfig::from_json(r#"{ "stickers": ["🐟", " "] }"#);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = SketchpadConfig::from_json("{ not json");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "canvas_width": 512.0, "stickers": ["⭐"] }}"#).unwrap();

        let config = SketchpadConfig::load(file.path()).unwrap();
        assert_eq!(config.canvas_size(), Size::new(512.0, 256.0));
        assert_eq!(config.stickers, vec!["⭐".to_string()]);
    }

    #[test]
    fn test_json_roundtrip_preserves_palette() {
        let config = SketchpadConfig::default();
        let json = config.to_json().unwrap();
        let restored = SketchpadConfig::from_json(&json).unwrap();
        assert_eq!(restored, config);
    }
}
