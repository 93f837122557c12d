//! Static knowledge about the block-compressed formats.
//!
//! [`TextureFormat`] is a closed set. Everything the decoder and the upload
//! path need to know about a format (block footprint, decoded buffer sizing,
//! channel layout and native GPU format) is a pure lookup on it.

use std::{fmt, str::FromStr};

use crate::error::FormatError;

/// Edge length of a compression block in texels.
pub const BLOCK_DIM: u32 = 4;

/// `width × height` rounded up to whole blocks, the extent a native BC texture is allocated with.
pub fn block_aligned(width: u32, height: u32) -> (u32, u32) {
    (
        width.div_ceil(BLOCK_DIM).saturating_mul(BLOCK_DIM),
        height.div_ceil(BLOCK_DIM).saturating_mul(BLOCK_DIM),
    )
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Bc1,
    Bc2,
    Bc3,
    Bc4,
    Bc5,
    Bc6,
    Bc7,
}

/// Channels a format natively carries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChannelLayout {
    Luminance,
    LuminanceAlpha,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    pub fn channel_count(self) -> u32 {
        match self {
            ChannelLayout::Luminance => 1,
            ChannelLayout::LuminanceAlpha => 2,
            ChannelLayout::Rgb => 3,
            ChannelLayout::Rgba => 4,
        }
    }
}

/// Byte layout of a software-decoded pixel buffer.
///
/// All multi-byte values are little-endian.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecodedLayout {
    /// One packed `u16` per pixel, 5:6:5 red/green/blue.
    Rgb565,
    /// Four `u8` per pixel.
    Rgba8,
    /// One `u16` luminance value per pixel.
    L16,
    /// Two `u16` per pixel, luminance (red) then alpha (green).
    La16,
}

impl DecodedLayout {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            DecodedLayout::Rgb565 | DecodedLayout::L16 => 2,
            DecodedLayout::Rgba8 | DecodedLayout::La16 => 4,
        }
    }
}

impl TextureFormat {
    pub const ALL: [TextureFormat; 7] = [
        TextureFormat::Bc1,
        TextureFormat::Bc2,
        TextureFormat::Bc3,
        TextureFormat::Bc4,
        TextureFormat::Bc5,
        TextureFormat::Bc6,
        TextureFormat::Bc7,
    ];

    /// Size of one 4x4 block in the compressed payload.
    pub fn block_footprint_bytes(self) -> usize {
        match self {
            TextureFormat::Bc1 | TextureFormat::Bc4 => 8,
            TextureFormat::Bc2
            | TextureFormat::Bc3
            | TextureFormat::Bc5
            | TextureFormat::Bc6
            | TextureFormat::Bc7 => 16,
        }
    }

    /// Bytes per pixel of the decoded buffer.
    ///
    /// This is a fixed sizing policy shared with existing payload producers and
    /// must not be re-derived from block math.
    pub fn decoded_bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::Bc1 | TextureFormat::Bc4 => 2,
            TextureFormat::Bc3 | TextureFormat::Bc5 => 4,
            _ => self.native_channel_layout().channel_count() as usize,
        }
    }

    pub fn native_channel_layout(self) -> ChannelLayout {
        match self {
            TextureFormat::Bc1 | TextureFormat::Bc6 => ChannelLayout::Rgb,
            TextureFormat::Bc2 | TextureFormat::Bc3 | TextureFormat::Bc7 => ChannelLayout::Rgba,
            TextureFormat::Bc4 => ChannelLayout::Luminance,
            TextureFormat::Bc5 => ChannelLayout::LuminanceAlpha,
        }
    }

    /// Layout produced by the software decoder, `None` for native-upload-only formats.
    pub fn decoded_layout(self) -> Option<DecodedLayout> {
        match self {
            TextureFormat::Bc1 => Some(DecodedLayout::Rgb565),
            TextureFormat::Bc3 => Some(DecodedLayout::Rgba8),
            TextureFormat::Bc4 => Some(DecodedLayout::L16),
            TextureFormat::Bc5 => Some(DecodedLayout::La16),
            TextureFormat::Bc2 | TextureFormat::Bc6 | TextureFormat::Bc7 => None,
        }
    }

    /// `decoded_bytes_per_pixel × width × height`, `None` if that does not fit a `usize`.
    pub fn decoded_size(self, width: u32, height: u32) -> Option<usize> {
        self.decoded_bytes_per_pixel()
            .checked_mul(width as usize)?
            .checked_mul(height as usize)
    }

    /// Smallest payload that covers a `width × height` mip.
    ///
    /// Saturates at `usize::MAX`, which no payload can reach, so oversized mips
    /// fail the truncation check instead of wrapping around to a small size.
    pub fn min_payload_size(self, width: u32, height: u32) -> usize {
        let blocks_wide = width.div_ceil(BLOCK_DIM) as usize;
        let blocks_high = height.div_ceil(BLOCK_DIM) as usize;
        self.block_footprint_bytes()
            .saturating_mul(blocks_wide)
            .saturating_mul(blocks_high)
    }

    /// The GPU format used when the compressed bytes are uploaded directly.
    pub fn wgpu_format(self) -> wgpu::TextureFormat {
        match self {
            TextureFormat::Bc1 => wgpu::TextureFormat::Bc1RgbaUnorm,
            TextureFormat::Bc2 => wgpu::TextureFormat::Bc2RgbaUnorm,
            TextureFormat::Bc3 => wgpu::TextureFormat::Bc3RgbaUnorm,
            TextureFormat::Bc4 => wgpu::TextureFormat::Bc4RUnorm,
            TextureFormat::Bc5 => wgpu::TextureFormat::Bc5RgUnorm,
            TextureFormat::Bc6 => wgpu::TextureFormat::Bc6hRgbUfloat,
            TextureFormat::Bc7 => wgpu::TextureFormat::Bc7RgbaUnorm,
        }
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextureFormat::Bc1 => "BC1",
            TextureFormat::Bc2 => "BC2",
            TextureFormat::Bc3 => "BC3",
            TextureFormat::Bc4 => "BC4",
            TextureFormat::Bc5 => "BC5",
            TextureFormat::Bc6 => "BC6",
            TextureFormat::Bc7 => "BC7",
        };
        f.write_str(name)
    }
}

impl FromStr for TextureFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextureFormat::ALL
            .into_iter()
            .find(|format| format.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FormatError::UnknownFormat(s.to_string()))
    }
}
