//! Core application state and lifecycle.

use kurbo::{Point, Size};
use peniko::Color;
use sketchpad_core::{CanvasMapping, PointerEvent, Session, SketchpadConfig, ToolKind};
use sketchpad_render::{
    ExportScene, PngRenderResult, RenderResult, RendererError, VelloSurface, padded_row_bytes,
};
use std::sync::Arc;
use vello::util::RenderSurface;
use vello::wgpu::PresentMode;
use vello::{AaConfig, RenderParams, RendererOptions};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, ModifiersState, NamedKey};
use winit::window::{Window, WindowId};

use crate::shortcuts::{Command, ShortcutRegistry};

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "SKETCHPAD_CONFIG";

#[cfg(feature = "native")]
mod file_ops {
    /// Ask for a destination and write PNG bytes there.
    pub fn export_png(png_data: &[u8], name: &str) {
        let dialog = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(format!("{}.png", name));

        if let Some(path) = dialog.save_file() {
            if let Err(e) = std::fs::write(&path, png_data) {
                log::error!("Failed to write PNG: {}", e);
            } else {
                log::info!("Exported PNG to: {:?}", path);
            }
        }
    }
}

#[cfg(not(feature = "native"))]
mod file_ops {
    /// Without a file dialog, write next to the working directory.
    pub fn export_png(png_data: &[u8], name: &str) {
        let path = format!("{}.png", name);
        match std::fs::write(&path, png_data) {
            Ok(()) => log::info!("Exported PNG to: {}", path),
            Err(e) => log::error!("Failed to write PNG: {}", e),
        }
    }
}

/// Rgba8 texture Vello can render into and that can be copied or sampled.
fn render_target_descriptor(
    label: &'static str,
    width: u32,
    height: u32,
) -> vello::wgpu::TextureDescriptor<'static> {
    use vello::wgpu::{Extent3d, TextureDimension, TextureFormat, TextureUsages};

    vello::wgpu::TextureDescriptor {
        label: Some(label),
        size: Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: TextureFormat::Rgba8Unorm,
        usage: TextureUsages::STORAGE_BINDING
            | TextureUsages::COPY_SRC
            | TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    }
}

/// Map `buffer` for reading, wait for the GPU, and copy its contents out.
fn read_buffer(device: &vello::wgpu::Device, buffer: &vello::wgpu::Buffer) -> RenderResult<Vec<u8>> {
    let slice = buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(vello::wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device
        .poll(vello::wgpu::PollType::Wait)
        .map_err(|e| RendererError::RenderFailed(format!("GPU poll failed: {:?}", e)))?;

    match rx.recv() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(RendererError::RenderFailed(format!("Readback failed: {}", e))),
        Err(_) => return Err(RendererError::RenderFailed("Readback never completed".to_string())),
    }
    let bytes = slice.get_mapped_range().to_vec();
    buffer.unmap();
    Ok(bytes)
}

/// Render an export scene on a white background and read its pixels back (blocking).
fn render_scene_to_png(
    device: &vello::wgpu::Device,
    queue: &vello::wgpu::Queue,
    vello_renderer: &mut vello::Renderer,
    export: &ExportScene,
) -> RenderResult<PngRenderResult> {
    let (width, height) = (export.width, export.height);
    if width == 0 || height == 0 {
        return Err(RendererError::InvalidSize { width, height });
    }

    let target = device.create_texture(&render_target_descriptor("export target", width, height));
    let view = target.create_view(&vello::wgpu::TextureViewDescriptor::default());
    let params = RenderParams {
        base_color: Color::WHITE,
        width,
        height,
        antialiasing_method: AaConfig::Area,
    };
    vello_renderer
        .render_to_texture(device, queue, &export.scene, &view, &params)
        .map_err(|e| RendererError::RenderFailed(format!("{:?}", e)))?;

    let row_bytes = padded_row_bytes(width);
    let readback = device.create_buffer(&vello::wgpu::BufferDescriptor {
        label: Some("export readback"),
        size: u64::from(row_bytes) * u64::from(height),
        usage: vello::wgpu::BufferUsages::COPY_DST | vello::wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
        label: Some("export copy"),
    });
    encoder.copy_texture_to_buffer(
        target.as_image_copy(),
        vello::wgpu::TexelCopyBufferInfo {
            buffer: &readback,
            layout: vello::wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(row_bytes),
                rows_per_image: Some(height),
            },
        },
        target.size(),
    );
    queue.submit(std::iter::once(encoder.finish()));

    let bytes = read_buffer(device, &readback)?;
    PngRenderResult::from_padded_rows(&bytes, width, height, row_bytes)
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Window color around the canvas.
    pub background_color: Color,
    /// Canvas paper color.
    pub paper_color: Color,
    pub sketchpad: SketchpadConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Sticker Sketchpad".to_string(),
            width: 768,
            height: 768,
            background_color: Color::from_rgba8(230, 230, 230, 255),
            paper_color: Color::WHITE,
            sketchpad: SketchpadConfig::default(),
        }
    }
}

impl AppConfig {
    /// Default config with the sketchpad section read from `$SKETCHPAD_CONFIG`, if set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            match SketchpadConfig::load(&path) {
                Ok(sketchpad) => config.sketchpad = sketchpad,
                Err(e) => log::warn!("Ignoring config {}: {}", path, e),
            }
        }
        config
    }
}

/// Runtime state for the application.
struct AppState {
    // Windowing
    window: Arc<Window>,
    surface: RenderSurface<'static>,

    // Rendering
    vello_renderer: vello::Renderer,
    /// Texture blitter for RGBA->surface format conversion.
    texture_blitter: vello::wgpu::util::TextureBlitter,
    /// Separate surface so exporting never disturbs the on-screen scene.
    exporter: VelloSurface,

    // State
    session: Session<VelloSurface>,
    mapping: CanvasMapping,
    modifiers: ModifiersState,
    /// Last cursor position in window pixels.
    cursor: Option<Point>,
    /// Whether the cursor was over the canvas at the last move.
    on_canvas: bool,
    /// Custom sticker text being typed, if entry is active.
    custom_entry: Option<String>,
    config: AppConfig,
}

impl AppState {
    /// Cursor position on the canvas; `None` over the letterbox.
    fn canvas_point(&self) -> Option<Point> {
        let canvas = self.session.config().canvas_size();
        self.cursor.and_then(|p| self.mapping.hit(p, canvas))
    }

    /// Refit the canvas into the window and redraw.
    fn update_mapping(&mut self, width: u32, height: u32) {
        self.mapping = CanvasMapping::fit(
            self.session.config().canvas_size(),
            Size::new(width as f64, height as f64),
        );
        self.session
            .surface_mut()
            .set_view_transform(self.mapping.transform());
        self.session.repaint();
    }

    fn update_title(&self) {
        let tool = match self.session.tool() {
            ToolKind::Stroke => "draw".to_string(),
            ToolKind::Sticker(glyph) | ToolKind::Custom(glyph) => glyph.clone(),
        };
        let mut title = format!(
            "{} [{} | {} | {}°]",
            self.config.title,
            tool,
            self.session.tools().thickness().name(),
            self.session.tools().rotation()
        );
        if let Some(entry) = &self.custom_entry {
            title.push_str(&format!(" sticker: {}_", entry));
        }
        self.window.set_title(&title);
    }

    fn apply_command(&mut self, command: Command, render_cx: &vello::util::RenderContext) {
        match command {
            Command::Undo => self.session.undo(),
            Command::Redo => self.session.redo(),
            Command::Clear => self.session.clear(),
            Command::Export => self.export(render_cx),
            Command::SetThickness(thickness) => self.session.set_thickness(thickness),
            Command::StrokeTool => {
                let _ = self.session.set_tool(ToolKind::Stroke);
            }
            Command::NextSticker => self.session.cycle_sticker(),
            Command::RotateBy(delta) => {
                let rotation = self.session.tools().rotation() + delta;
                self.session.set_rotation(rotation);
            }
            Command::BeginCustomSticker => {
                self.custom_entry = Some(String::new());
            }
        }
        self.update_title();
        self.window.request_redraw();
    }

    /// Feed a key press to custom sticker entry. Returns false if entry is inactive.
    fn handle_custom_entry(&mut self, key: &Key, text: Option<&str>) -> bool {
        let Some(entry) = self.custom_entry.as_mut() else {
            return false;
        };
        match key {
            Key::Named(NamedKey::Enter) => {
                let text = std::mem::take(entry);
                self.custom_entry = None;
                // Empty text is rejected by the session and the tool is kept.
                let _ = self.session.set_custom_sticker(&text);
            }
            Key::Named(NamedKey::Escape) => {
                self.custom_entry = None;
            }
            Key::Named(NamedKey::Backspace) => {
                entry.pop();
            }
            _ => {
                if let Some(text) = text.filter(|t| !t.chars().any(char::is_control)) {
                    entry.push_str(text);
                }
            }
        }
        self.update_title();
        true
    }

    fn export(&mut self, render_cx: &vello::util::RenderContext) {
        let scale = self.session.config().export_scale;
        let export = match self.exporter.build_export_scene(&self.session, scale) {
            Ok(export) => export,
            Err(e) => {
                log::error!("Cannot export: {}", e);
                return;
            }
        };
        log::info!("Exporting PNG at {}x scale: {}x{}", scale, export.width, export.height);

        let device_handle = &render_cx.devices[self.surface.dev_id];
        let result = render_scene_to_png(
            &device_handle.device,
            &device_handle.queue,
            &mut self.vello_renderer,
            &export,
        )
        .and_then(|pixels| pixels.encode_png());

        match result {
            Ok(png_data) => file_ops::export_png(&png_data, "sketchpad"),
            Err(e) => log::error!("PNG export failed: {}", e),
        }
    }

    fn render(&mut self, render_cx: &vello::util::RenderContext) {
        let device_handle = &render_cx.devices[self.surface.dev_id];
        let device = &device_handle.device;
        let queue = &device_handle.queue;

        let surface_texture = match self.surface.surface.get_current_texture() {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Failed to get surface texture: {:?}", e);
                return;
            }
        };

        let width = self.surface.config.width;
        let height = self.surface.config.height;
        let params = RenderParams {
            base_color: self.config.background_color,
            width,
            height,
            antialiasing_method: AaConfig::Area,
        };

        // Vello needs a StorageBinding Rgba8Unorm target; blit to the surface format afterwards.
        let render_texture =
            device.create_texture(&render_target_descriptor("frame target", width, height));
        let render_texture_view =
            render_texture.create_view(&vello::wgpu::TextureViewDescriptor::default());

        if let Err(e) = self.vello_renderer.render_to_texture(
            device,
            queue,
            self.session.surface().scene(),
            &render_texture_view,
            &params,
        ) {
            log::error!("Failed to render: {:?}", e);
            return;
        }

        let surface_view = surface_texture
            .texture
            .create_view(&vello::wgpu::TextureViewDescriptor::default());
        let mut blit_encoder = device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
            label: Some("blit encoder"),
        });
        self.texture_blitter
            .copy(device, &mut blit_encoder, &render_texture_view, &surface_view);
        queue.submit(std::iter::once(blit_encoder.finish()));

        surface_texture.present();
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    state: Option<AppState>,
    render_cx: Option<vello::util::RenderContext>,
}

impl App {
    /// Create a new application with configuration from the environment.
    pub fn new() -> Self {
        Self::with_config(AppConfig::from_env())
    }

    /// Create a new application with custom configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            state: None,
            render_cx: None,
        }
    }

    /// Run the application.
    pub async fn run() {
        let event_loop = EventLoop::new().expect("Failed to create event loop");
        let mut app = App::new();
        event_loop.run_app(&mut app).expect("Event loop error");
    }

    /// Finish initialization after surface is created.
    fn finish_init(&mut self, window: Arc<Window>, surface: RenderSurface<'static>) {
        let Some(render_cx) = self.render_cx.as_ref() else {
            log::error!("Render context missing during init");
            return;
        };
        let device = &render_cx.devices[surface.dev_id].device;

        let vello_renderer = match vello::Renderer::new(device, RendererOptions::default()) {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("Failed to create Vello renderer: {:?}", e);
                return;
            }
        };
        let texture_blitter = vello::wgpu::util::TextureBlitter::new(device, surface.config.format);

        let sketchpad = self.config.sketchpad.clone();
        let canvas_surface =
            VelloSurface::new().with_paper(sketchpad.canvas_size(), self.config.paper_color);
        let session = Session::with_config(canvas_surface, sketchpad);

        log::info!(
            "Sketchpad initialized - {}x{}",
            surface.config.width,
            surface.config.height
        );
        ShortcutRegistry::print_all();

        let (width, height) = (surface.config.width, surface.config.height);
        let mut state = AppState {
            window: window.clone(),
            surface,
            vello_renderer,
            texture_blitter,
            exporter: VelloSurface::new(),
            session,
            mapping: CanvasMapping::default(),
            modifiers: ModifiersState::empty(),
            cursor: None,
            on_canvas: false,
            custom_entry: None,
            config: self.config.clone(),
        };
        state.update_mapping(width, height);
        state.update_title();
        self.state = Some(state);

        window.request_redraw();
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        log::info!("Creating window...");
        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let (width, height) = if size.width == 0 || size.height == 0 {
            (self.config.width, self.config.height)
        } else {
            (size.width, size.height)
        };
        log::info!("Surface size: {}x{}", width, height);

        let render_cx = self.render_cx.get_or_insert_with(vello::util::RenderContext::new);
        let surface = match pollster::block_on(render_cx.create_surface(
            window.clone(),
            width,
            height,
            PresentMode::AutoVsync,
        )) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {:?}", e);
                event_loop.exit();
                return;
            }
        };
        self.finish_init(window, surface);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(state), Some(render_cx)) = (self.state.as_mut(), self.render_cx.as_ref()) else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    render_cx.resize_surface(&mut state.surface, size.width, size.height);
                    state.update_mapping(size.width, size.height);
                    state.window.request_redraw();
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                state.modifiers = modifiers.state();
            }
            WindowEvent::CursorMoved { position, .. } => {
                state.cursor = Some(Point::new(position.x, position.y));
                let event = match state.canvas_point() {
                    Some(position) => PointerEvent::Move { position },
                    // Crossing into the letterbox counts as leaving the canvas.
                    None if state.on_canvas => PointerEvent::Leave,
                    None => return,
                };
                state.on_canvas = event != PointerEvent::Leave;
                state.session.handle_pointer_event(event);
                state.window.request_redraw();
            }
            WindowEvent::CursorLeft { .. } => {
                state.cursor = None;
                state.on_canvas = false;
                state.session.handle_pointer_event(PointerEvent::Leave);
                state.window.request_redraw();
            }
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => {
                let event = match button_state {
                    ElementState::Pressed => match state.canvas_point() {
                        Some(position) => PointerEvent::Down { position },
                        None => return,
                    },
                    ElementState::Released => PointerEvent::Up,
                };
                state.session.handle_pointer_event(event);
                state.window.request_redraw();
            }
            WindowEvent::Focused(false) => {
                // Releasing the button while unfocused is never reported.
                state.session.handle_pointer_event(PointerEvent::Up);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                if state.handle_custom_entry(&event.logical_key, event.text.as_deref()) {
                    state.window.request_redraw();
                    return;
                }

                let ctrl = state.modifiers.control_key() || state.modifiers.super_key();
                let shift = state.modifiers.shift_key();
                let key = match &event.logical_key {
                    Key::Character(c) => c.to_string(),
                    Key::Named(NamedKey::Delete) => "Delete".to_string(),
                    _ => return,
                };
                if let Some(command) = ShortcutRegistry::lookup(&key, ctrl, shift) {
                    log::debug!("Shortcut {} -> {:?}", key, command);
                    state.apply_command(command, render_cx);
                }
            }
            WindowEvent::RedrawRequested => {
                state.render(render_cx);
            }
            _ => {}
        }
    }
}
