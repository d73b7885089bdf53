//! Sketchpad Render Library
//!
//! Vello-backed implementation of the sketchpad [`Surface`](sketchpad_core::Surface)
//! plus export scene building and PNG encoding.

mod renderer;
mod vello_impl;

pub use renderer::{
    ExportScene, MAX_EXPORT_DIMENSION, PngRenderResult, RenderResult, RendererError,
    padded_row_bytes,
};
pub use vello_impl::VelloSurface;
