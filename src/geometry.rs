//! Quad geometry for the laid-out mips.
//!
//! Every [`LayoutRect`] becomes four vertices (top-left, bottom-left,
//! top-right, bottom-right) and six indices forming two counter-clockwise
//! triangles. Mip `i` owns vertices `4i..4i+4` and indices `6i..6i+6`.

use std::ops::Range;

use crate::{error::LayoutError, layout::LayoutRect};

pub const VERTICES_PER_QUAD: usize = 4;
pub const INDICES_PER_QUAD: usize = 6;

/// Triangle list of one quad, relative to its first vertex.
const QUAD_INDICES: [u32; INDICES_PER_QUAD] = [0, 1, 2, 1, 3, 2];

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderGeometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl RenderGeometry {
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD
    }

    /// Index range to draw mip `mip` on its own.
    pub fn mip_index_range(&self, mip: usize) -> Range<u32> {
        let start = (mip * INDICES_PER_QUAD) as u32;
        start..start + INDICES_PER_QUAD as u32
    }
}

pub fn emit(rects: &[LayoutRect]) -> Result<RenderGeometry, LayoutError> {
    if rects.is_empty() {
        return Err(LayoutError::InvalidMipChain);
    }

    let mut geometry = RenderGeometry {
        vertices: Vec::with_capacity(rects.len() * VERTICES_PER_QUAD),
        indices: Vec::with_capacity(rects.len() * INDICES_PER_QUAD),
    };

    for (mip, rect) in rects.iter().enumerate() {
        let (left, right, top, bottom) = (rect.left(), rect.right(), rect.top(), rect.bottom());
        let uv = rect.uv;
        geometry.vertices.extend_from_slice(&[
            // top left
            Vertex {
                position: [left, top, 0.0],
                tex_coords: [uv.u0, uv.v0],
            },
            // bottom left
            Vertex {
                position: [left, bottom, 0.0],
                tex_coords: [uv.u0, uv.v1],
            },
            // top right
            Vertex {
                position: [right, top, 0.0],
                tex_coords: [uv.u1, uv.v0],
            },
            // bottom right
            Vertex {
                position: [right, bottom, 0.0],
                tex_coords: [uv.u1, uv.v1],
            },
        ]);

        let first = (mip * VERTICES_PER_QUAD) as u32;
        geometry
            .indices
            .extend(QUAD_INDICES.iter().map(|offset| first + offset));
    }

    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::UvRect;

    fn unit_rect() -> LayoutRect {
        LayoutRect {
            origin_x: -1.0,
            origin_y: 1.0,
            extent_x: 2.0,
            extent_y: 2.0,
            uv: UvRect::FULL,
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(emit(&[]), Err(LayoutError::InvalidMipChain));
    }

    #[test]
    fn corners_and_uvs_follow_the_quad_order() {
        let geometry = emit(&[unit_rect()]).unwrap();
        let corners: Vec<_> = geometry
            .vertices
            .iter()
            .map(|v| (v.position, v.tex_coords))
            .collect();
        assert_eq!(
            corners,
            vec![
                ([-1.0, 1.0, 0.0], [0.0, 0.0]),
                ([-1.0, -1.0, 0.0], [0.0, 1.0]),
                ([1.0, 1.0, 0.0], [1.0, 0.0]),
                ([1.0, -1.0, 0.0], [1.0, 1.0]),
            ]
        );
        assert_eq!(geometry.indices, vec![0, 1, 2, 1, 3, 2]);
    }

    #[test]
    fn triangles_wind_counter_clockwise() {
        let geometry = emit(&[unit_rect()]).unwrap();
        for tri in geometry.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|k| geometry.vertices[tri[k] as usize].position);
            let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(cross > 0.0, "triangle {tri:?} is clockwise");
        }
    }

    #[test]
    fn later_quads_are_offset_by_four_vertices() {
        let geometry = emit(&[unit_rect(), unit_rect(), unit_rect()]).unwrap();
        assert_eq!(&geometry.indices[12..18], &[8, 9, 10, 9, 11, 10]);
        assert_eq!(geometry.mip_index_range(2), 12..18);
        assert_eq!(geometry.quad_count(), 3);
    }

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
        assert_eq!(bytemuck::cast_slice::<Vertex, f32>(&[Vertex {
            position: [1.0, 2.0, 3.0],
            tex_coords: [4.0, 5.0],
        }]), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }
}
