//! Sticker Sketchpad Application
//!
//! Windowing, pointer and keyboard input, and PNG export around the
//! sketchpad session.

mod app;
mod shortcuts;

pub use app::{App, AppConfig, CONFIG_ENV};
pub use shortcuts::{Command, Shortcut, ShortcutRegistry};
