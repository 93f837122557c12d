#![allow(dead_code)]

use mipview::{MemoryStore, TextureFormat};

pub(crate) const RED_565: u16 = 0xF800;
pub(crate) const GREEN_565: u16 = 0x07E0;
pub(crate) const WHITE_565: u16 = 0xFFFF;

/// BC1 block where every texel is `color`.
pub(crate) fn bc1_solid(color: u16) -> [u8; 8] {
    let [lo, hi] = color.to_le_bytes();
    [lo, hi, lo, hi, 0, 0, 0, 0]
}

/// BC4 block where every texel is `value`.
pub(crate) fn bc4_solid(value: u8) -> [u8; 8] {
    [value, value, 0, 0, 0, 0, 0, 0]
}

/// BC3 block with constant alpha and color.
pub(crate) fn bc3_solid(alpha: u8, color: u16) -> [u8; 16] {
    let mut block = [0u8; 16];
    block[..8].copy_from_slice(&bc4_solid(alpha));
    block[8..].copy_from_slice(&bc1_solid(color));
    block
}

/// BC5 block with constant red and green.
pub(crate) fn bc5_solid(red: u8, green: u8) -> [u8; 16] {
    let mut block = [0u8; 16];
    block[..8].copy_from_slice(&bc4_solid(red));
    block[8..].copy_from_slice(&bc4_solid(green));
    block
}

/// Opaque BC7 mode 6 block: the left two columns black, the right two white.
pub(crate) fn bc7_split_block() -> [u8; 16] {
    let mut bits: u128 = 0;
    let mut at = 0;
    let mut push = |value: u128, width: u32| {
        bits |= value << at;
        at += width;
    };
    push(1 << 6, 7);
    // Endpoint pairs for R, G and B, then alpha.
    for _ in 0..3 {
        push(0, 7);
        push(127, 7);
    }
    push(127, 7);
    push(127, 7);
    // P-bits: endpoint 0 stays 0, endpoint 1 becomes 255.
    push(0, 1);
    push(1, 1);
    for texel in 0..16 {
        let index = if texel % 4 < 2 { 0 } else { 15 };
        // The anchor texel drops its top index bit.
        push(index, if texel == 0 { 3 } else { 4 });
    }
    bits.to_le_bytes()
}

/// Some block of the right footprint for `format`, not necessarily meaningful.
pub(crate) fn any_block(format: TextureFormat) -> Vec<u8> {
    match format {
        TextureFormat::Bc1 => bc1_solid(RED_565).to_vec(),
        TextureFormat::Bc4 => bc4_solid(128).to_vec(),
        TextureFormat::Bc3 => bc3_solid(200, GREEN_565).to_vec(),
        TextureFormat::Bc5 => bc5_solid(10, 250).to_vec(),
        TextureFormat::Bc2 | TextureFormat::Bc6 | TextureFormat::Bc7 => vec![0xAB; 16],
    }
}

/// A payload for a `width × height` mip made of `block` repeated.
pub(crate) fn tiled_payload(block: &[u8], width: u32, height: u32) -> Vec<u8> {
    let blocks = (width.div_ceil(4) * height.div_ceil(4)) as usize;
    block.repeat(blocks)
}

/// Description document in the on-disk JSON shape.
pub(crate) fn description_json(format: TextureFormat, mips: &[(u32, u32)]) -> String {
    let mips: Vec<String> = mips
        .iter()
        .map(|&(w, h)| {
            format!(
                r#"{{"width": {w}, "height": {h}, "payloadSize": {}}}"#,
                format.min_payload_size(w, h)
            )
        })
        .collect();
    format!(r#"{{"format": "{format}", "mips": [{}]}}"#, mips.join(", "))
}

/// Store holding texture `texture_id` with a full set of payloads.
pub(crate) fn store_with(texture_id: &str, format: TextureFormat, mips: &[(u32, u32)]) -> MemoryStore {
    let mut store = MemoryStore::new();
    store.insert_description(texture_id, description_json(format, mips));
    let block = any_block(format);
    for (i, &(w, h)) in mips.iter().enumerate() {
        store.insert_payload(texture_id, i, tiled_payload(&block, w, h));
    }
    store
}

/// `base`, `base/2`, ... down to 1x1.
pub(crate) fn full_chain(width: u32, height: u32) -> Vec<(u32, u32)> {
    let mut mips = vec![(width, height)];
    let (mut w, mut h) = (width, height);
    while w > 1 || h > 1 {
        w = (w / 2).max(1);
        h = (h / 2).max(1);
        mips.push((w, h));
    }
    mips
}
