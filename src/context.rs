//! GPU context.
//!
//! Owns the device, queue and the atlas pipeline. The headless context draws
//! into an offscreen target that is read back. With the `window` feature the
//! same setup can also target a window surface.

#[cfg(feature = "window")]
use std::sync::Arc;

use anyhow::Context as _;

use crate::pipelines::atlas::AtlasPipeline;

/// Env var that stops the context from requesting BC texture compression.
///
/// Useful to exercise the placeholder path for native-upload-only mips on
/// machines whose GPU would otherwise accept them.
pub const DISABLE_TEXTURE_COMPRESSION_ENV: &str = "MIPVIEW_DISABLE_TEXTURE_COMPRESSION";

#[derive(Debug)]
pub struct Context {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub atlas: AtlasPipeline,
}

impl Context {
    /// Color format of the offscreen target.
    pub const RENDER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    pub async fn headless() -> anyhow::Result<Self> {
        log::debug!("WGPU setup");
        let instance = new_instance();
        let adapter = request_adapter(&instance, None).await?;
        Self::from_adapter(&adapter, Self::RENDER_FORMAT).await
    }

    /// Context drawing into `window`, plus its surface and a configuration
    /// sized to the window. The surface is left unconfigured.
    #[cfg(feature = "window")]
    pub async fn with_surface(
        window: Arc<winit::window::Window>,
    ) -> anyhow::Result<(Self, wgpu::Surface<'static>, wgpu::SurfaceConfiguration)> {
        log::debug!("WGPU setup");
        let instance = new_instance();
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create a window surface")?;
        let adapter = request_adapter(&instance, Some(&surface)).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = pick_surface_format(&surface_caps.formats)
            .context("the adapter cannot present to this window")?;
        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let ctx = Self::from_adapter(&adapter, format).await?;
        Ok((ctx, surface, config))
    }

    async fn from_adapter(adapter: &wgpu::Adapter, target: wgpu::TextureFormat) -> anyhow::Result<Self> {
        let required_features = negotiated_features(
            adapter.features(),
            env_var_truthy(DISABLE_TEXTURE_COMPRESSION_ENV),
        );
        log::info!(
            "using adapter {:?}, BC upload {}",
            adapter.get_info().name,
            if required_features.contains(wgpu::Features::TEXTURE_COMPRESSION_BC) {
                "enabled"
            } else {
                "disabled"
            }
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("mipview device"),
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                ..Default::default()
            })
            .await
            .context("failed to create GPU device")?;

        let atlas = AtlasPipeline::new(&device, target);

        Ok(Self {
            device,
            queue,
            atlas,
        })
    }

    /// Whether compressed BC payloads can be uploaded without decoding.
    pub fn supports_bc_upload(&self) -> bool {
        self.device
            .features()
            .contains(wgpu::Features::TEXTURE_COMPRESSION_BC)
    }
}

fn new_instance() -> wgpu::Instance {
    wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..wgpu::InstanceDescriptor::new_without_display_handle()
    })
}

async fn request_adapter(
    instance: &wgpu::Instance,
    compatible_surface: Option<&wgpu::Surface<'_>>,
) -> anyhow::Result<wgpu::Adapter> {
    instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface,
            force_fallback_adapter: false,
        })
        .await
        .context("no GPU adapter available")
}

/// Surface format for showing mips as stored: linear if offered, else the first one.
#[cfg_attr(not(feature = "window"), allow(dead_code))]
pub(crate) fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first().copied())
}

fn env_var_truthy(name: &str) -> bool {
    let Ok(raw) = std::env::var(name) else {
        return false;
    };

    let v = raw.trim();
    v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}

/// Request BC compression only when the adapter offers it and it wasn't disabled.
fn negotiated_features(
    available: wgpu::Features,
    disable_texture_compression: bool,
) -> wgpu::Features {
    if !disable_texture_compression && available.contains(wgpu::Features::TEXTURE_COMPRESSION_BC) {
        wgpu::Features::TEXTURE_COMPRESSION_BC
    } else {
        wgpu::Features::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_bc_only_when_available() {
        assert!(negotiated_features(wgpu::Features::empty(), false).is_empty());
        assert_eq!(
            negotiated_features(wgpu::Features::TEXTURE_COMPRESSION_BC, false),
            wgpu::Features::TEXTURE_COMPRESSION_BC
        );
    }

    #[test]
    fn linear_surface_formats_are_preferred() {
        use wgpu::TextureFormat as F;
        assert_eq!(
            pick_surface_format(&[F::Bgra8UnormSrgb, F::Bgra8Unorm]),
            Some(F::Bgra8Unorm)
        );
        assert_eq!(pick_surface_format(&[F::Rgba8UnormSrgb]), Some(F::Rgba8UnormSrgb));
        assert_eq!(pick_surface_format(&[]), None);
    }

    #[test]
    fn opt_out_wins_over_adapter_support() {
        assert!(negotiated_features(wgpu::Features::TEXTURE_COMPRESSION_BC, true).is_empty());
    }
}
