//! Offscreen rendering of a [`DecodedTexture`].
//!
//! [`GpuAtlas`] uploads the geometry once and one texture per mip. Drawing
//! binds each mip's texture in turn and issues the six indices of its quad,
//! so every mip samples its own image in the shared canvas.
//!
//! Compressed uploads are padded to whole blocks. Their quads get texture
//! coordinates scaled down so they sample only the real texels.

use std::iter;

use anyhow::Context as _;
use wgpu::util::DeviceExt;

use crate::{
    assembly::{DecodedTexture, MipImage},
    context::Context,
    data_structures::{format::block_aligned, texture::Texture},
    geometry::{VERTICES_PER_QUAD, Vertex},
};

/// Background of the canvas area no mip covers.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// A mip on the GPU: its texture and the bind group that samples it.
pub struct GpuMip {
    pub texture: Texture,
    pub group: wgpu::BindGroup,
}

/// Uploaded geometry and per-mip textures of one texture.
pub struct GpuAtlas {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub mips: Vec<GpuMip>,
    pub canvas_width: u32,
    pub canvas_height: u32,
    index_ranges: Vec<std::ops::Range<u32>>,
}

impl GpuAtlas {
    pub fn new(ctx: &Context, texture: &DecodedTexture) -> anyhow::Result<Self> {
        let mut vertices = texture.geometry.vertices.clone();
        let mut mips = Vec::with_capacity(texture.mips.len());
        for (i, mip) in texture.mips.iter().enumerate() {
            let label = format!("mip {i}");
            let (gpu_texture, scale) = upload_mip(ctx, mip, &label)?;
            scale_quad_uvs(&mut vertices, i, scale);
            let group = ctx.atlas.bind_group(&ctx.device, &gpu_texture, &label);
            mips.push(GpuMip {
                texture: gpu_texture,
                group,
            });
        }

        let vertex = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Atlas Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Atlas Index Buffer"),
                contents: bytemuck::cast_slice(&texture.geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        let index_ranges = (0..mips.len())
            .map(|i| texture.geometry.mip_index_range(i))
            .collect();

        Ok(Self {
            vertex,
            index,
            mips,
            canvas_width: texture.layout.canvas_width,
            canvas_height: texture.layout.canvas_height,
            index_ranges,
        })
    }

    /// Record the draws for every mip into `render_pass`.
    pub fn draw<'pass>(&'pass self, ctx: &'pass Context, render_pass: &mut wgpu::RenderPass<'pass>) {
        render_pass.set_pipeline(&ctx.atlas.pipeline);
        render_pass.set_vertex_buffer(0, self.vertex.slice(..));
        render_pass.set_index_buffer(self.index.slice(..), wgpu::IndexFormat::Uint32);
        for (mip, range) in self.mips.iter().zip(&self.index_ranges) {
            render_pass.set_bind_group(0, &mip.group, &[]);
            render_pass.draw_indexed(range.clone(), 0, 0..1);
        }
    }

    /// Clear `view` and draw every mip into it.
    pub fn record(&self, ctx: &Context, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Atlas Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });
        self.draw(ctx, &mut render_pass);
    }
}

/// Upload one mip and return the share of its texture the mip occupies.
fn upload_mip(ctx: &Context, mip: &MipImage, label: &str) -> anyhow::Result<(Texture, [f32; 2])> {
    let uploaded = match mip {
        MipImage::Decoded(pixels) => (
            Texture::from_decoded(&ctx.device, &ctx.queue, pixels, label),
            [1.0, 1.0],
        ),
        MipImage::Compressed {
            format,
            width,
            height,
            bytes,
        } => {
            if ctx.supports_bc_upload() {
                let texture = Texture::from_compressed(
                    &ctx.device,
                    &ctx.queue,
                    *format,
                    *width,
                    *height,
                    bytes,
                    label,
                )?;
                (texture, uv_scale((*width, *height), block_aligned(*width, *height)))
            } else {
                log::warn!("{label}: device has no {format} support, drawing a placeholder");
                (
                    Texture::placeholder(&ctx.device, &ctx.queue, *width, *height, label),
                    [1.0, 1.0],
                )
            }
        }
        MipImage::Placeholder { width, height } => (
            Texture::placeholder(&ctx.device, &ctx.queue, *width, *height, label),
            [1.0, 1.0],
        ),
    };
    Ok(uploaded)
}

/// Fraction of an `allocated` texture covered by `content` texels, per axis.
pub(crate) fn uv_scale(content: (u32, u32), allocated: (u32, u32)) -> [f32; 2] {
    [
        content.0 as f32 / allocated.0 as f32,
        content.1 as f32 / allocated.1 as f32,
    ]
}

/// Scale the texture coordinates of quad `quad` so `u1`/`v1` land on `scale`.
fn scale_quad_uvs(vertices: &mut [Vertex], quad: usize, scale: [f32; 2]) {
    let start = quad * VERTICES_PER_QUAD;
    for vertex in &mut vertices[start..start + VERTICES_PER_QUAD] {
        vertex.tex_coords[0] *= scale[0];
        vertex.tex_coords[1] *= scale[1];
    }
}

/// Row pitch of a readback buffer, padded to wgpu's copy alignment.
pub(crate) fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Draw `atlas` into a canvas-sized offscreen target and read it back.
pub async fn render_to_image(ctx: &Context, atlas: &GpuAtlas) -> anyhow::Result<image::RgbaImage> {
    let (width, height) = (atlas.canvas_width, atlas.canvas_height);
    let extent = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let target = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Atlas Target"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: Context::RENDER_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Atlas Encoder"),
        });
    atlas.record(ctx, &mut encoder, &view);

    let bytes_per_row = padded_bytes_per_row(width);
    let output_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        size: (bytes_per_row * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        label: Some("Atlas Readback"),
        mapped_at_creation: false,
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &target,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &output_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        extent,
    );
    ctx.queue.submit(iter::once(encoder.finish()));

    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
    let buffer_slice = output_buffer.slice(..);
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        // The receiver only goes away if the caller stopped waiting.
        let _ = tx.send(result);
    });
    ctx.device.poll(wgpu::PollType::Wait {
        submission_index: None,
        timeout: None,
    })?;
    rx.receive()
        .await
        .context("readback channel closed before the buffer was mapped")??;

    let pixels = {
        let data = buffer_slice.get_mapped_range();
        let row_len = (width * 4) as usize;
        data.chunks(bytes_per_row as usize)
            .flat_map(|row| &row[..row_len])
            .copied()
            .collect::<Vec<u8>>()
    };
    output_buffer.unmap();

    image::RgbaImage::from_raw(width, height, pixels).context("readback size mismatch")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readback_rows_are_aligned() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(127), 512);
        assert_eq!(padded_bytes_per_row(1), 256);
    }

    #[test]
    fn padded_tail_mips_sample_only_their_texels() {
        assert_eq!(uv_scale((2, 2), block_aligned(2, 2)), [0.5, 0.5]);
        assert_eq!(uv_scale((1, 1), block_aligned(1, 1)), [0.25, 0.25]);
        assert_eq!(uv_scale((8, 2), block_aligned(8, 2)), [1.0, 0.5]);
        assert_eq!(uv_scale((16, 16), block_aligned(16, 16)), [1.0, 1.0]);
    }

    #[test]
    fn only_the_scaled_quad_changes() {
        let quad = |u: f32, v: f32| Vertex {
            position: [0.0; 3],
            tex_coords: [u, v],
        };
        let mut vertices = vec![
            quad(0.0, 0.0),
            quad(0.0, 1.0),
            quad(1.0, 0.0),
            quad(1.0, 1.0),
        ];
        vertices.extend(vertices.clone());

        scale_quad_uvs(&mut vertices, 1, [0.25, 0.5]);

        assert_eq!(vertices[3].tex_coords, [1.0, 1.0]);
        assert_eq!(vertices[4].tex_coords, [0.0, 0.0]);
        assert_eq!(vertices[5].tex_coords, [0.0, 0.5]);
        assert_eq!(vertices[6].tex_coords, [0.25, 0.0]);
        assert_eq!(vertices[7].tex_coords, [0.25, 0.5]);
    }
}
