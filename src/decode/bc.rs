//! Per-block BCn decompression.
//!
//! Each routine decodes one 4x4 block into a caller-provided `[T; 16]` of
//! texels in row-major order. Writing texels into the mip (and clipping blocks
//! that hang over the edge) is done by the caller.

use crate::data_structures::pixels::{rgb565_to_rgb888, rgb888_to_rgb565};

fn lerp_u8(a: u8, b: u8, num: u32, den: u32) -> u8 {
    debug_assert!(num <= den);
    (((a as u32) * (den - num) + (b as u32) * num) / den) as u8
}

fn lerp_u16_from_u8(a: u8, b: u8, num: u32, den: u32) -> u16 {
    debug_assert!(num <= den);
    ((((a as u32) * (den - num) + (b as u32) * num) * 257) / den) as u16
}

fn bc1_palette(color0: u16, color1: u16, force_four_color: bool) -> [[u8; 3]; 4] {
    let c0 = rgb565_to_rgb888(color0);
    let c1 = rgb565_to_rgb888(color1);
    let mix = |num, den| {
        [
            lerp_u8(c0[0], c1[0], num, den),
            lerp_u8(c0[1], c1[1], num, den),
            lerp_u8(c0[2], c1[2], num, den),
        ]
    };

    if force_four_color || color0 > color1 {
        [c0, c1, mix(1, 3), mix(2, 3)]
    } else {
        // 3-color mode; index 3 is transparent black.
        [c0, c1, mix(1, 2), [0, 0, 0]]
    }
}

fn color_indices(block: &[u8]) -> u32 {
    u32::from_le_bytes([block[4], block[5], block[6], block[7]])
}

/// BC1 block (8 bytes) to packed RGB565 texels.
pub(crate) fn decode_bc1_block(block: &[u8; 8], out: &mut [u16; 16]) {
    let color0 = u16::from_le_bytes([block[0], block[1]]);
    let color1 = u16::from_le_bytes([block[2], block[3]]);
    let palette = bc1_palette(color0, color1, false).map(rgb888_to_rgb565);
    let indices = color_indices(block);

    for (i, texel) in out.iter_mut().enumerate() {
        *texel = palette[((indices >> (2 * i)) & 0b11) as usize];
    }
}

/// Interpolation weights of a BC3-style alpha block, shared by BC3, BC4 and BC5.
struct AlphaBlock {
    endpoints: [u8; 2],
    indices: u64,
}

impl AlphaBlock {
    fn read(block: &[u8]) -> Self {
        // 48 bits, little-endian.
        let mut indices: u64 = 0;
        for (i, b) in block[2..8].iter().enumerate() {
            indices |= (*b as u64) << (8 * i);
        }
        Self {
            endpoints: [block[0], block[1]],
            indices,
        }
    }

    fn index(&self, texel: usize) -> usize {
        ((self.indices >> (3 * texel)) & 0b111) as usize
    }

    fn palette_u8(&self) -> [u8; 8] {
        let [a0, a1] = self.endpoints;
        let mut a = [0u8; 8];
        a[0] = a0;
        a[1] = a1;
        if a0 > a1 {
            for i in 1..7 {
                a[i + 1] = lerp_u8(a0, a1, i as u32, 7);
            }
        } else {
            for i in 1..5 {
                a[i + 1] = lerp_u8(a0, a1, i as u32, 5);
            }
            a[6] = 0;
            a[7] = 255;
        }
        a
    }

    fn palette_u16(&self) -> [u16; 8] {
        let [a0, a1] = self.endpoints;
        let mut a = [0u16; 8];
        a[0] = a0 as u16 * 257;
        a[1] = a1 as u16 * 257;
        if a0 > a1 {
            for i in 1..7 {
                a[i + 1] = lerp_u16_from_u8(a0, a1, i as u32, 7);
            }
        } else {
            for i in 1..5 {
                a[i + 1] = lerp_u16_from_u8(a0, a1, i as u32, 5);
            }
            a[6] = 0;
            a[7] = u16::MAX;
        }
        a
    }
}

/// BC3 block (16 bytes) to RGBA8 texels.
pub(crate) fn decode_bc3_block(block: &[u8; 16], out: &mut [[u8; 4]; 16]) {
    let alpha = AlphaBlock::read(&block[0..8]);
    let alpha_palette = alpha.palette_u8();

    let color = &block[8..16];
    let color0 = u16::from_le_bytes([color[0], color[1]]);
    let color1 = u16::from_le_bytes([color[2], color[3]]);
    // BC3 colour is always decoded in 4-color mode.
    let color_palette = bc1_palette(color0, color1, true);
    let indices = color_indices(color);

    for (i, texel) in out.iter_mut().enumerate() {
        let [r, g, b] = color_palette[((indices >> (2 * i)) & 0b11) as usize];
        *texel = [r, g, b, alpha_palette[alpha.index(i)]];
    }
}

/// BC4 block (8 bytes) to 16-bit luminance texels.
pub(crate) fn decode_bc4_block(block: &[u8; 8], out: &mut [u16; 16]) {
    let channel = AlphaBlock::read(block);
    let palette = channel.palette_u16();
    for (i, texel) in out.iter_mut().enumerate() {
        *texel = palette[channel.index(i)];
    }
}

/// BC5 block (16 bytes) to pairs of 16-bit channels.
pub(crate) fn decode_bc5_block(block: &[u8; 16], out: &mut [[u16; 2]; 16]) {
    let red = AlphaBlock::read(&block[0..8]);
    let green = AlphaBlock::read(&block[8..16]);
    let red_palette = red.palette_u16();
    let green_palette = green.palette_u16();
    for (i, texel) in out.iter_mut().enumerate() {
        *texel = [red_palette[red.index(i)], green_palette[green.index(i)]];
    }
}
