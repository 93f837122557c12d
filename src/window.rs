//! Interactive viewer.
//!
//! Opens a window the size of the canvas and presents the atlas on every
//! redraw. Escape or closing the window ends the loop.

use std::{iter, sync::Arc};

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{assembly::DecodedTexture, context::Context, layout::CanvasLayout, render::GpuAtlas};

struct ViewerState {
    window: Arc<Window>,
    ctx: Context,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    atlas: GpuAtlas,
    is_surface_configured: bool,
}

impl ViewerState {
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.is_surface_configured = true;
            self.surface.configure(&self.ctx.device, &self.config);
        }
    }

    fn render(&mut self) {
        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return;
        }

        let (output, reconfigure) = match self.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output) => (output, false),
            wgpu::CurrentSurfaceTexture::Suboptimal(output) => (output, true),
            wgpu::CurrentSurfaceTexture::Outdated | wgpu::CurrentSurfaceTexture::Lost => {
                let size = self.window.inner_size();
                self.resize(size.width, size.height);
                self.window.request_redraw();
                return;
            }
            wgpu::CurrentSurfaceTexture::Timeout | wgpu::CurrentSurfaceTexture::Occluded => return,
            wgpu::CurrentSurfaceTexture::Validation => {
                log::error!("Unable to render: surface validation failed");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Viewer Encoder"),
            });
        self.atlas.record(&self.ctx, &mut encoder, &view);
        self.ctx.queue.submit(iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();

        if reconfigure {
            let size = self.window.inner_size();
            self.resize(size.width, size.height);
        }
    }
}

struct Viewer {
    async_runtime: tokio::runtime::Runtime,
    texture: DecodedTexture,
    title: String,
    state: Option<ViewerState>,
    error: Option<anyhow::Error>,
}

impl Viewer {
    fn open(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<ViewerState> {
        let layout = &self.texture.layout;
        let window_attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(layout.canvas_width, layout.canvas_height))
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let (ctx, surface, config) = self
            .async_runtime
            .block_on(Context::with_surface(window.clone()))?;
        let atlas = GpuAtlas::new(&ctx, &self.texture)?;

        let mut state = ViewerState {
            window,
            ctx,
            surface,
            config,
            atlas,
            is_surface_configured: false,
        };
        let size = state.window.inner_size();
        state.resize(size.width, size.height);
        Ok(state)
    }
}

impl ApplicationHandler for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Some platforms resume more than once; the window outlives a suspend.
        if self.state.is_some() {
            return;
        }
        match self.open(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                state.resize(size.width, size.height);
                state.window.request_redraw();
            }
            WindowEvent::RedrawRequested => state.render(),
            _ => {}
        }
    }
}

/// Title of the viewer window for texture `texture_id`.
pub fn window_title(texture_id: &str, layout: &CanvasLayout) -> String {
    format!(
        "mipview: {texture_id} ({} mips, {}x{})",
        layout.rects.len(),
        layout.canvas_width,
        layout.canvas_height
    )
}

/// Show `texture` in a window until it is closed.
pub fn run_window(texture: DecodedTexture, title: String) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let mut viewer = Viewer {
        async_runtime: tokio::runtime::Runtime::new()?,
        texture,
        title,
        state: None,
        error: None,
    };
    event_loop.run_app(&mut viewer)?;

    match viewer.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
