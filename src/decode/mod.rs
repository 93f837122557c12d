//! Format-dispatch block decoder.
//!
//! [`decode`] turns one mip's compressed bytes into a [`DecodedPixelBuffer`]
//! for BC1/BC3/BC4/BC5, or tells the caller to upload the compressed bytes
//! as-is for BC2/BC6/BC7. It never hands back zeroed or partial pixels for a
//! format it cannot decode.
//!
//! Decoding is a pure function of `(format, width, height, bytes)`, so results
//! may be cached by content and mips may be decoded in any order or in parallel.

mod bc;

use crate::{
    data_structures::{
        format::{BLOCK_DIM, DecodedLayout, TextureFormat},
        pixels::DecodedPixelBuffer,
    },
    error::DecodeError,
};

/// Result of a successful [`decode`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded {
    Pixels(DecodedPixelBuffer),
    /// No software decoder exists for this format; upload the compressed bytes directly.
    NativeUpload(TextureFormat),
}

/// Decode a mip, falling back to [`Decoded::NativeUpload`] for formats without a software path.
pub fn decode(
    format: TextureFormat,
    width: u32,
    height: u32,
    bytes: &[u8],
) -> Result<Decoded, DecodeError> {
    check_payload(format, width, height, bytes)?;

    let pixels = match format {
        TextureFormat::Bc1 => decode_blocks(bytes, width, height, DecodedLayout::Rgb565, |block: &[u8; 8]| {
            let mut texels = [0u16; 16];
            bc::decode_bc1_block(block, &mut texels);
            texels.map(u16::to_le_bytes)
        })?,
        TextureFormat::Bc3 => decode_blocks(bytes, width, height, DecodedLayout::Rgba8, |block: &[u8; 16]| {
            let mut texels = [[0u8; 4]; 16];
            bc::decode_bc3_block(block, &mut texels);
            texels
        })?,
        TextureFormat::Bc4 => decode_blocks(bytes, width, height, DecodedLayout::L16, |block: &[u8; 8]| {
            let mut texels = [0u16; 16];
            bc::decode_bc4_block(block, &mut texels);
            texels.map(u16::to_le_bytes)
        })?,
        TextureFormat::Bc5 => decode_blocks(bytes, width, height, DecodedLayout::La16, |block: &[u8; 16]| {
            let mut texels = [[0u16; 2]; 16];
            bc::decode_bc5_block(block, &mut texels);
            texels.map(|[r, g]| {
                let [r0, r1] = r.to_le_bytes();
                let [g0, g1] = g.to_le_bytes();
                [r0, r1, g0, g1]
            })
        })?,
        TextureFormat::Bc2 | TextureFormat::Bc6 | TextureFormat::Bc7 => {
            log::trace!("{format} {width}x{height}: routing to native compressed upload");
            return Ok(Decoded::NativeUpload(format));
        }
    };

    debug_assert_eq!(
        Some(pixels.as_bytes().len()),
        format.decoded_size(width, height)
    );
    Ok(Decoded::Pixels(pixels))
}

/// Decode a mip in software only; formats without a decoder fail with
/// [`DecodeError::Unsupported`].
pub fn decode_to_pixels(
    format: TextureFormat,
    width: u32,
    height: u32,
    bytes: &[u8],
) -> Result<DecodedPixelBuffer, DecodeError> {
    match decode(format, width, height, bytes)? {
        Decoded::Pixels(pixels) => Ok(pixels),
        Decoded::NativeUpload(format) => Err(DecodeError::Unsupported(format)),
    }
}

/// Validate dimensions and payload length without decoding.
pub fn check_payload(
    format: TextureFormat,
    width: u32,
    height: u32,
    bytes: &[u8],
) -> Result<(), DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::ZeroDimension { width, height });
    }
    let expected = format.min_payload_size(width, height);
    if bytes.len() < expected {
        return Err(DecodeError::TruncatedPayload {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Run `decode_block` over every `N`-byte block of a checked payload, in
/// row-major block order, writing `B`-byte texels into a fresh buffer.
fn decode_blocks<const N: usize, const B: usize>(
    bytes: &[u8],
    width: u32,
    height: u32,
    layout: DecodedLayout,
    decode_block: impl Fn(&[u8; N]) -> [[u8; B]; 16],
) -> Result<DecodedPixelBuffer, DecodeError> {
    let mut out = DecodedPixelBuffer::try_zeroed(width, height, layout)
        .ok_or(DecodeError::TooLarge { width, height })?;
    let blocks_wide = width.div_ceil(BLOCK_DIM) as usize;
    let blocks_high = height.div_ceil(BLOCK_DIM) as usize;

    let mut block = [0u8; N];
    for (i, chunk) in bytes.chunks_exact(N).take(blocks_wide * blocks_high).enumerate() {
        block.copy_from_slice(chunk);
        let texels = decode_block(&block);
        BlockTarget {
            buffer: &mut out,
            x: (i % blocks_wide) as u32 * BLOCK_DIM,
            y: (i / blocks_wide) as u32 * BLOCK_DIM,
        }
        .write(&texels);
    }
    Ok(out)
}

/// Destination of one decoded 4x4 block inside the mip.
struct BlockTarget<'a> {
    buffer: &'a mut DecodedPixelBuffer,
    x: u32,
    y: u32,
}

impl BlockTarget<'_> {
    /// Copy 16 row-major texels, clipping those outside the mip.
    fn write<const B: usize>(&mut self, texels: &[[u8; B]; 16]) {
        let width = self.buffer.width();
        let height = self.buffer.height();
        let data = self.buffer.bytes_mut();
        for (i, texel) in texels.iter().enumerate() {
            let px = self.x + (i as u32 % BLOCK_DIM);
            let py = self.y + (i as u32 / BLOCK_DIM);
            if px < width && py < height {
                let idx = (py as usize * width as usize + px as usize) * B;
                data[idx..idx + B].copy_from_slice(texel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clips_blocks_past_the_right_and_bottom_edge() {
        // Solid white BC1 block decoded into a 2x3 mip.
        let bc1 = [0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let Decoded::Pixels(pixels) = decode(TextureFormat::Bc1, 2, 3, &bc1).unwrap() else {
            panic!("BC1 must decode in software");
        };
        assert_eq!(pixels.as_bytes(), &[0xff; 12]);
    }

    #[test]
    fn dispatch_agrees_with_the_format_catalog() {
        for format in TextureFormat::ALL {
            let bytes = vec![0x5A; format.min_payload_size(5, 3)];
            match (decode(format, 5, 3, &bytes).unwrap(), format.decoded_layout()) {
                (Decoded::Pixels(pixels), Some(layout)) => {
                    assert_eq!(pixels.layout(), layout, "{format}");
                    assert_eq!(Some(pixels.as_bytes().len()), format.decoded_size(5, 3));
                }
                (Decoded::NativeUpload(routed), None) => assert_eq!(routed, format),
                (other, layout) => panic!("{format}: got {other:?} for layout {layout:?}"),
            }
        }
    }

    #[test]
    fn native_formats_still_check_truncation() {
        let err = decode(TextureFormat::Bc7, 4, 4, &[0; 15]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedPayload {
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn huge_dimensions_fail_the_length_check() {
        let err = decode(TextureFormat::Bc3, u32::MAX, u32::MAX, &[]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedPayload {
                expected: usize::MAX,
                actual: 0
            }
        );
    }

    #[test]
    fn zero_dimension_wins_over_truncation() {
        let err = decode(TextureFormat::Bc1, 0, 4, &[]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::ZeroDimension {
                width: 0,
                height: 4
            }
        );
    }
}
