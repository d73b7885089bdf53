//! Sketchpad Core Library
//!
//! Platform-agnostic drawable model, undo/redo history and input session
//! for the sticker sketchpad.

pub mod config;
pub mod drawable;
pub mod error;
pub mod history;
pub mod input;
pub mod session;
pub mod surface;
pub mod tools;

pub use config::SketchpadConfig;
pub use drawable::{Drawable, DrawableId, DrawableTrait, Sticker, Stroke, Thickness};
pub use error::{Error, Result};
pub use history::{ContentChanged, History};
pub use input::{CanvasMapping, PointerEvent};
pub use session::{GestureState, Session};
pub use surface::{DrawCommand, RecordingSurface, Surface, TransformStack};
pub use tools::{ToolKind, ToolSettings};
