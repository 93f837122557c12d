//! GPU textures for individual mips.
//!
//! Every mip gets its own [`Texture`]; the mips are not packed into a shared
//! image, only their quads share the canvas.

use anyhow::*;

use crate::data_structures::{
    format::{BLOCK_DIM, TextureFormat, block_aligned},
    pixels::DecodedPixelBuffer,
};

/// A GPU texture with a view and sampler.
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Upload a software-decoded mip as RGBA8.
    pub fn from_decoded(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pixels: &DecodedPixelBuffer,
        label: &str,
    ) -> Self {
        let rgba = pixels.to_rgba8();
        Self::from_rgba8(device, queue, &rgba, pixels.width(), pixels.height(), label)
    }

    /// Upload compressed bytes directly in the format's native GPU encoding.
    ///
    /// The device must have been created with `TEXTURE_COMPRESSION_BC`. The
    /// texture is padded to whole blocks; only the top-left `width` x `height`
    /// texels hold the mip.
    pub fn from_compressed(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: TextureFormat,
        width: u32,
        height: u32,
        bytes: &[u8],
        label: &str,
    ) -> Result<Self> {
        if !device
            .features()
            .contains(wgpu::Features::TEXTURE_COMPRESSION_BC)
        {
            bail!("{label}: device cannot sample {format} textures");
        }
        let (padded_width, padded_height) = block_aligned(width, height);
        let required = format.min_payload_size(width, height);
        ensure!(
            bytes.len() >= required,
            "{label}: {format} payload has {} bytes, {required} needed",
            bytes.len()
        );

        let size = wgpu::Extent3d {
            width: padded_width,
            height: padded_height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: format.wgpu_format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &bytes[..required],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_width / BLOCK_DIM * format.block_footprint_bytes() as u32),
                rows_per_image: Some(padded_height / BLOCK_DIM),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = create_nearest_sampler(device);
        Ok(Self {
            texture,
            view,
            sampler,
        })
    }

    /// A magenta/black checker standing in for a mip that could not be shown.
    pub fn placeholder(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let data: Vec<u8> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .flat_map(|(x, y)| {
                if (x / 4 + y / 4) % 2 == 0 {
                    [255, 0, 255, 255]
                } else {
                    [0, 0, 0, 255]
                }
            })
            .collect();
        Self::from_rgba8(device, queue, &data, width, height, label)
    }

    fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = create_nearest_sampler(device);
        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// Texel-exact sampling: no filtering across texels, no wrap-around at the edges.
pub fn create_nearest_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}
