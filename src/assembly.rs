//! Decoded texture assembly.
//!
//! The only part of the crate that talks to storage. It loads a description,
//! lays out and triangulates the mip chain, decodes every mip and zips the
//! results by mip index into a [`DecodedTexture`] ready for a renderer.

use crate::{
    data_structures::{
        description::TextureDescription, format::TextureFormat, pixels::DecodedPixelBuffer,
    },
    decode::{self, Decoded},
    error::{AssemblyError, DecodeError},
    geometry::{self, RenderGeometry},
    layout::{self, CanvasLayout},
    resources::AssetStore,
};

/// What to do with a mip whose format has no software decoder.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum UnsupportedMipPolicy {
    /// Keep the compressed bytes for a direct GPU upload.
    #[default]
    NativeUpload,
    /// Show a placeholder in place of the mip.
    Placeholder,
    /// Fail the whole texture.
    Fail,
}

#[derive(Clone, Debug, Default)]
pub struct AssemblyOptions {
    pub unsupported: UnsupportedMipPolicy,
}

impl AssemblyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unsupported(mut self, policy: UnsupportedMipPolicy) -> Self {
        self.unsupported = policy;
        self
    }
}

/// Per-mip image handed to the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MipImage {
    Decoded(DecodedPixelBuffer),
    /// Compressed bytes, trimmed to the size the mip needs.
    Compressed {
        format: TextureFormat,
        width: u32,
        height: u32,
        bytes: Vec<u8>,
    },
    Placeholder {
        width: u32,
        height: u32,
    },
}

impl MipImage {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            MipImage::Decoded(pixels) => (pixels.width(), pixels.height()),
            MipImage::Compressed { width, height, .. } | MipImage::Placeholder { width, height } => {
                (*width, *height)
            }
        }
    }
}

/// Everything needed to show a texture: layout, geometry and one image per mip.
#[derive(Clone, Debug)]
pub struct DecodedTexture {
    pub description: TextureDescription,
    pub layout: CanvasLayout,
    pub geometry: RenderGeometry,
    pub mips: Vec<MipImage>,
}

/// Load, decode and lay out texture `texture_id` from `store`.
pub fn assemble<S: AssetStore>(
    store: &S,
    texture_id: &str,
    options: &AssemblyOptions,
) -> Result<DecodedTexture, AssemblyError> {
    let document =
        store
            .load_description(texture_id)
            .map_err(|source| AssemblyError::MissingDescription {
                texture_id: texture_id.to_string(),
                source,
            })?;
    let description = TextureDescription::from_json(&document)?;
    log::info!(
        "texture {texture_id}: {} with {} mip(s), base {}x{}",
        description.format(),
        description.mips().len(),
        description.base().width(),
        description.base().height()
    );

    let payloads = (0..description.mips().len())
        .map(|mip| {
            store
                .load_payload(texture_id, mip)
                .map_err(|source| AssemblyError::MissingPayload {
                    texture_id: texture_id.to_string(),
                    mip,
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    assemble_description(description, &payloads, options)
}

/// Assemble an already parsed description with its payloads, `payloads[i]` being mip `i`.
pub fn assemble_description<P: AsRef<[u8]>>(
    description: TextureDescription,
    payloads: &[P],
    options: &AssemblyOptions,
) -> Result<DecodedTexture, AssemblyError> {
    let layout = layout::compute_layout(description.mips())?;
    let geometry = geometry::emit(&layout.rects)?;

    let format = description.format();
    let mut mips = Vec::with_capacity(description.mips().len());
    for (index, mip) in description.mips().iter().enumerate() {
        let bytes: &[u8] = payloads.get(index).map(|p| p.as_ref()).unwrap_or(&[]);
        if bytes.len() as u64 != mip.payload_size() {
            log::warn!(
                "mip {index}: payload is {} bytes, description declares {}",
                bytes.len(),
                mip.payload_size()
            );
        }

        let (width, height) = (mip.width(), mip.height());
        let decoded = decode::decode(format, width, height, bytes)
            .map_err(|source| AssemblyError::Decode { mip: index, source })?;
        let image = match decoded {
            Decoded::Pixels(pixels) => MipImage::Decoded(pixels),
            Decoded::NativeUpload(format) => match options.unsupported {
                UnsupportedMipPolicy::NativeUpload => MipImage::Compressed {
                    format,
                    width,
                    height,
                    bytes: bytes[..format.min_payload_size(width, height)].to_vec(),
                },
                UnsupportedMipPolicy::Placeholder => {
                    log::warn!("mip {index}: {format} cannot be decoded, using a placeholder");
                    MipImage::Placeholder { width, height }
                }
                UnsupportedMipPolicy::Fail => {
                    return Err(AssemblyError::Decode {
                        mip: index,
                        source: DecodeError::Unsupported(format),
                    });
                }
            },
        };
        log::debug!("mip {index}: {width}x{height} ready");
        mips.push(image);
    }

    Ok(DecodedTexture {
        description,
        layout,
        geometry,
        mips,
    })
}
