//! mipview
//!
//! Decodes block-compressed (BC1-BC7) mip chains and lays them out side by side
//! on one canvas: the base mip on the left, the smaller mips stepping to the
//! right along the bottom edge. The result can be rendered on the CPU into an
//! image, drawn offscreen with wgpu, or shown in a window (`window` feature).
//!
//! High-level modules
//! - `assembly`: loads a texture from an asset store and zips mips, layout and geometry
//! - `compose`: CPU rendering of an assembled texture into an RGBA image
//! - `context`: GPU context that owns device/queue/pipeline
//! - `data_structures`: formats, descriptions, decoded pixels and GPU textures
//! - `decode`: software BC decoders
//! - `error`: error types for every stage
//! - `geometry`: vertex and index buffers for the mip quads
//! - `layout`: staircase placement of mips on the canvas
//! - `pipelines`: the atlas render pipeline
//! - `render`: offscreen drawing and readback
//! - `resources`: where descriptions and payloads are loaded from
//! - `window`: winit viewer presenting the atlas every frame
//!

pub mod assembly;
pub mod compose;
pub mod context;
pub mod data_structures;
pub mod decode;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod pipelines;
pub mod render;
pub mod resources;
#[cfg(feature = "window")]
pub mod window;

// Re-exports commonly used types for convenience in downstream code.
pub use assembly::{
    AssemblyOptions, DecodedTexture, MipImage, UnsupportedMipPolicy, assemble,
    assemble_description,
};
pub use compose::compose_atlas;
pub use data_structures::{
    description::{MipDescriptor, TextureDescription},
    format::TextureFormat,
    pixels::DecodedPixelBuffer,
};
pub use decode::{Decoded, decode, decode_to_pixels};
pub use error::{AssemblyError, DecodeError, DescriptionError, FormatError, LayoutError};
pub use geometry::{RenderGeometry, Vertex};
pub use layout::{CanvasLayout, LayoutRect, UvRect, compute_layout};
pub use resources::{AssetStore, DirStore, MemoryStore};
