//! Owned output of the software block decoder.

use crate::data_structures::format::DecodedLayout;

/// A decoded mip. `data.len()` is always `layout.bytes_per_pixel() × width × height`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedPixelBuffer {
    width: u32,
    height: u32,
    layout: DecodedLayout,
    data: Vec<u8>,
}

impl DecodedPixelBuffer {
    /// A zero-filled buffer, or `None` if it cannot be sized or allocated.
    pub(crate) fn try_zeroed(width: u32, height: u32, layout: DecodedLayout) -> Option<Self> {
        let len = layout
            .bytes_per_pixel()
            .checked_mul(width as usize)?
            .checked_mul(height as usize)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).ok()?;
        data.resize(len, 0);
        Some(Self {
            width,
            height,
            layout,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> DecodedLayout {
        self.layout
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Expand to tightly packed RGBA8 for display.
    ///
    /// Two-channel data is shown as red/green with blue at zero.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let pixels = self.width as usize * self.height as usize;
        let mut out = Vec::with_capacity(pixels * 4);
        match self.layout {
            DecodedLayout::Rgba8 => out.extend_from_slice(&self.data),
            DecodedLayout::Rgb565 => {
                for px in self.data.chunks_exact(2) {
                    let [r, g, b] = rgb565_to_rgb888(u16::from_le_bytes([px[0], px[1]]));
                    out.extend_from_slice(&[r, g, b, 255]);
                }
            }
            DecodedLayout::L16 => {
                for px in self.data.chunks_exact(2) {
                    let l = px[1];
                    out.extend_from_slice(&[l, l, l, 255]);
                }
            }
            DecodedLayout::La16 => {
                // High byte of each little-endian u16.
                for px in self.data.chunks_exact(4) {
                    out.extend_from_slice(&[px[1], px[3], 0, 255]);
                }
            }
        }
        out
    }

    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_raw(self.width, self.height, self.to_rgba8())
            .expect("rgba8 expansion always matches the buffer dimensions")
    }
}

pub(crate) fn rgb565_to_rgb888(c: u16) -> [u8; 3] {
    let r5 = ((c >> 11) & 0x1f) as u8;
    let g6 = ((c >> 5) & 0x3f) as u8;
    let b5 = (c & 0x1f) as u8;

    // Replicate top bits into low bits to fill 8-bit channels.
    let r = (r5 << 3) | (r5 >> 2);
    let g = (g6 << 2) | (g6 >> 4);
    let b = (b5 << 3) | (b5 >> 2);
    [r, g, b]
}

pub(crate) fn rgb888_to_rgb565([r, g, b]: [u8; 3]) -> u16 {
    let scale = |v: u8, max: u32| ((v as u32 * max + 127) / 255) as u16;
    (scale(r, 31) << 11) | (scale(g, 63) << 5) | scale(b, 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrepresentable_sizes_are_refused() {
        assert!(DecodedPixelBuffer::try_zeroed(u32::MAX, u32::MAX, DecodedLayout::Rgba8).is_none());
    }

    #[test]
    fn rgb565_round_trips_expanded_endpoints() {
        for c in [0x0000u16, 0xffff, 0xf800, 0x07e0, 0x001f, 0x8410, 0x1234] {
            assert_eq!(rgb888_to_rgb565(rgb565_to_rgb888(c)), c);
        }
    }

    #[test]
    fn expands_rgb565_to_opaque_rgba() {
        let mut buf = DecodedPixelBuffer::try_zeroed(2, 1, DecodedLayout::Rgb565).unwrap();
        buf.bytes_mut().copy_from_slice(&[0xff, 0xff, 0x00, 0xf8]);
        assert_eq!(buf.to_rgba8(), vec![255, 255, 255, 255, 255, 0, 0, 255]);
    }

    #[test]
    fn expands_two_channel_data_to_red_green() {
        let mut buf = DecodedPixelBuffer::try_zeroed(1, 1, DecodedLayout::La16).unwrap();
        buf.bytes_mut().copy_from_slice(&[0xff, 0xff, 0x00, 0x80]);
        assert_eq!(buf.to_rgba8(), vec![255, 128, 0, 255]);
    }

    #[test]
    fn image_has_buffer_dimensions() {
        let buf = DecodedPixelBuffer::try_zeroed(3, 5, DecodedLayout::L16).unwrap();
        assert_eq!(buf.as_bytes().len(), 30);
        assert_eq!(buf.to_image().dimensions(), (3, 5));
    }
}
