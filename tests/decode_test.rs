use mipview::{Decoded, DecodeError, TextureFormat, data_structures::format::DecodedLayout, decode, decode_to_pixels};

use crate::common::test_utils::*;

mod common;

fn pixels(decoded: Decoded) -> mipview::DecodedPixelBuffer {
    match decoded {
        Decoded::Pixels(pixels) => pixels,
        Decoded::NativeUpload(format) => panic!("expected pixels, got native upload of {format}"),
    }
}

#[test]
fn should_decode_solid_bc1_to_rgb565() {
    let payload = tiled_payload(&bc1_solid(RED_565), 8, 8);
    let buffer = pixels(decode(TextureFormat::Bc1, 8, 8, &payload).unwrap());

    assert_eq!(buffer.layout(), DecodedLayout::Rgb565);
    assert_eq!(buffer.as_bytes().len(), 8 * 8 * 2);
    assert!(buffer.as_bytes().chunks(2).all(|px| px == [0x00, 0xF8]));
    assert_eq!(buffer.to_image().get_pixel(7, 7).0, [255, 0, 0, 255]);
}

#[test]
fn should_decode_bc3_alpha_and_color() {
    let payload = tiled_payload(&bc3_solid(200, GREEN_565), 4, 4);
    let buffer = pixels(decode(TextureFormat::Bc3, 4, 4, &payload).unwrap());

    assert_eq!(buffer.layout(), DecodedLayout::Rgba8);
    assert_eq!(buffer.as_bytes().len(), 4 * 4 * 4);
    assert!(buffer.as_bytes().chunks(4).all(|px| px == [0, 255, 0, 200]));
}

#[test]
fn should_widen_bc4_to_sixteen_bits() {
    let payload = tiled_payload(&bc4_solid(128), 4, 4);
    let buffer = pixels(decode(TextureFormat::Bc4, 4, 4, &payload).unwrap());

    assert_eq!(buffer.layout(), DecodedLayout::L16);
    let expected = (128u16 * 257).to_le_bytes();
    assert!(buffer.as_bytes().chunks(2).all(|px| px == expected));
}

#[test]
fn should_decode_bc5_into_two_channels() {
    let payload = tiled_payload(&bc5_solid(10, 250), 4, 4);
    let buffer = pixels(decode(TextureFormat::Bc5, 4, 4, &payload).unwrap());

    assert_eq!(buffer.layout(), DecodedLayout::La16);
    let [r0, r1] = (10u16 * 257).to_le_bytes();
    let [g0, g1] = (250u16 * 257).to_le_bytes();
    assert!(buffer.as_bytes().chunks(4).all(|px| px == [r0, r1, g0, g1]));
    assert_eq!(buffer.to_image().get_pixel(0, 0).0, [10, 250, 0, 255]);
}

#[test]
fn should_clip_blocks_at_the_mip_edge() {
    // 5x3 needs 2x1 blocks but only 15 texels are kept.
    let payload = tiled_payload(&bc1_solid(WHITE_565), 5, 3);
    assert_eq!(payload.len(), 16);
    let buffer = pixels(decode(TextureFormat::Bc1, 5, 3, &payload).unwrap());
    assert_eq!((buffer.width(), buffer.height()), (5, 3));
    assert_eq!(buffer.as_bytes().len(), 5 * 3 * 2);
}

#[test]
fn should_accept_trailing_bytes() {
    let mut payload = tiled_payload(&bc4_solid(1), 4, 4);
    payload.extend_from_slice(&[0xFF; 8]);
    assert!(decode(TextureFormat::Bc4, 4, 4, &payload).is_ok());
}

#[test]
fn should_route_formats_without_decoder_to_native_upload() {
    for format in [TextureFormat::Bc2, TextureFormat::Bc6, TextureFormat::Bc7] {
        let payload = tiled_payload(&any_block(format), 8, 8);
        assert_eq!(
            decode(format, 8, 8, &payload),
            Ok(Decoded::NativeUpload(format))
        );
    }
}

#[test]
fn should_refuse_software_decode_of_bc7() {
    let payload = tiled_payload(&any_block(TextureFormat::Bc7), 4, 4);
    assert_eq!(
        decode_to_pixels(TextureFormat::Bc7, 4, 4, &payload),
        Err(DecodeError::Unsupported(TextureFormat::Bc7))
    );
}

#[test]
fn should_reject_truncated_payloads() {
    let payload = vec![0u8; 15];
    assert_eq!(
        decode(TextureFormat::Bc3, 4, 4, &payload),
        Err(DecodeError::TruncatedPayload {
            expected: 16,
            actual: 15
        })
    );
    // Native-upload formats are checked too.
    assert!(matches!(
        decode(TextureFormat::Bc7, 4, 4, &payload),
        Err(DecodeError::TruncatedPayload { .. })
    ));
}

#[test]
fn should_reject_zero_dimensions_before_length() {
    assert_eq!(
        decode(TextureFormat::Bc1, 0, 4, &[]),
        Err(DecodeError::ZeroDimension {
            width: 0,
            height: 4
        })
    );
}
