//! Texture data models.
//!
//! - `format` holds the BC format table: block footprints, decoded layouts, wgpu formats
//! - `description` is the parsed texture description with its mip chain
//! - `pixels` is the software-decoded image of a single mip
//! - `texture` wraps a mip uploaded to the GPU

pub mod description;
pub mod format;
pub mod pixels;
pub mod texture;
