//! CPU rendering of the mip atlas into an image.
//!
//! Produces the same picture the GPU path draws, without a device: every
//! decoded mip is copied into its pixel rect of a canvas-sized image.

use image::{Rgba, RgbaImage, imageops};

use crate::{
    assembly::{DecodedTexture, MipImage},
    layout::PixelRect,
};

const PLACEHOLDER_A: Rgba<u8> = Rgba([255, 0, 255, 255]);
const PLACEHOLDER_B: Rgba<u8> = Rgba([0, 0, 0, 255]);
const COMPRESSED_STRIPE: Rgba<u8> = Rgba([255, 200, 0, 255]);
const COMPRESSED_GAP: Rgba<u8> = Rgba([40, 40, 40, 255]);

pub fn compose_atlas(texture: &DecodedTexture, background: Rgba<u8>) -> RgbaImage {
    let (canvas_width, canvas_height) = (
        texture.layout.canvas_width,
        texture.layout.canvas_height,
    );
    let mut canvas = RgbaImage::from_pixel(canvas_width, canvas_height, background);

    for (rect, mip) in texture.layout.rects.iter().zip(&texture.mips) {
        let target = rect.to_pixels(canvas_width, canvas_height);
        if target.width == 0 || target.height == 0 {
            continue;
        }
        match mip {
            MipImage::Decoded(pixels) => {
                let mut image = pixels.to_image();
                if image.dimensions() != (target.width, target.height) {
                    image = imageops::resize(
                        &image,
                        target.width,
                        target.height,
                        imageops::FilterType::Nearest,
                    );
                }
                imageops::replace(&mut canvas, &image, target.x as i64, target.y as i64);
            }
            MipImage::Compressed { .. } => fill(&mut canvas, target, |x, y| {
                if (x + y) % 4 < 2 {
                    COMPRESSED_STRIPE
                } else {
                    COMPRESSED_GAP
                }
            }),
            MipImage::Placeholder { .. } => fill(&mut canvas, target, |x, y| {
                if (x / 4 + y / 4) % 2 == 0 {
                    PLACEHOLDER_A
                } else {
                    PLACEHOLDER_B
                }
            }),
        }
    }

    canvas
}

/// Paint `rect` with a pattern evaluated in rect-local coordinates.
fn fill(canvas: &mut RgbaImage, rect: PixelRect, pattern: impl Fn(u32, u32) -> Rgba<u8>) {
    for y in 0..rect.height {
        for x in 0..rect.width {
            let (px, py) = (rect.x + x, rect.y + y);
            if px < canvas.width() && py < canvas.height() {
                canvas.put_pixel(px, py, pattern(x, y));
            }
        }
    }
}
