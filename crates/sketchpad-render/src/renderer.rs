//! Render results and errors.

use thiserror::Error;
use vello::Scene;

/// Largest export dimension accepted, in pixels.
pub const MAX_EXPORT_DIMENSION: u32 = 8192;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid image size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
}

impl From<png::EncodingError> for RendererError {
    fn from(e: png::EncodingError) -> Self {
        RendererError::Encode(e.to_string())
    }
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// A scene ready to be rendered off-screen for export.
pub struct ExportScene {
    pub scene: Scene,
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
}

/// Pixels read back from an export render.
#[derive(Debug)]
pub struct PngRenderResult {
    /// RGBA pixel data (4 bytes per pixel).
    pub rgba_data: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl PngRenderResult {
    /// Collect pixels from a GPU readback buffer whose rows start `row_bytes` apart.
    pub fn from_padded_rows(
        data: &[u8],
        width: u32,
        height: u32,
        row_bytes: u32,
    ) -> RenderResult<Self> {
        let tight = width as usize * 4;
        let stride = row_bytes as usize;
        let expected = stride * height as usize;
        if stride < tight || data.len() < expected {
            return Err(RendererError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        let rgba_data = if stride == 0 {
            Vec::new()
        } else {
            data.chunks_exact(stride)
                .take(height as usize)
                .flat_map(|row| &row[..tight])
                .copied()
                .collect()
        };
        Ok(Self {
            rgba_data,
            width,
            height,
        })
    }

    /// Encode the pixels as an 8-bit RGBA PNG.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        if self.width == 0 || self.height == 0 {
            return Err(RendererError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.width as usize * self.height as usize * 4;
        if self.rgba_data.len() != expected {
            return Err(RendererError::BufferSize {
                expected,
                actual: self.rgba_data.len(),
            });
        }

        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.rgba_data)?;
        }
        Ok(png_data)
    }
}

/// Row pitch of a readback buffer holding RGBA rows `width` pixels wide.
pub fn padded_row_bytes(width: u32) -> u32 {
    (width * 4).next_multiple_of(vello::wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
}

/// Pixel size of a canvas rendered at `scale`.
pub(crate) fn export_dimensions(width: f64, height: f64, scale: f64) -> RenderResult<(u32, u32)> {
    let w = (width * scale).ceil();
    let h = (height * scale).ceil();
    let max = f64::from(MAX_EXPORT_DIMENSION);
    if !(w >= 1.0 && h >= 1.0 && w <= max && h <= max) {
        return Err(RendererError::InvalidSize {
            width: w.max(0.0).min(u32::MAX as f64) as u32,
            height: h.max(0.0).min(u32::MAX as f64) as u32,
        });
    }
    Ok((w as u32, h as u32))
}
