//! Staircase layout of a mip chain on one canvas.
//!
//! Mip 0 is placed at the top-left of the canvas; every following mip sits
//! directly to its right, bottom-aligned. For a conventional chain (each level
//! half the size of the previous one) the widths sum to `2 * w0 - 1`, which is
//! the canvas width used regardless of how many levels are supplied.
//!
//! Rects are expressed in a normalized `[-1, 1]` space with y pointing up, the
//! same space the vertex shader receives positions in.

use crate::{data_structures::description::MipDescriptor, error::LayoutError};

/// UV range a quad samples from. Each mip owns its full texture.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    pub const FULL: UvRect = UvRect {
        u0: 0.0,
        v0: 0.0,
        u1: 1.0,
        v1: 1.0,
    };
}

/// Placement of one mip. `origin` is the top-left corner, `extent` grows right and down.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutRect {
    pub origin_x: f32,
    pub origin_y: f32,
    pub extent_x: f32,
    pub extent_y: f32,
    pub uv: UvRect,
}

/// Integer pixel rectangle on the canvas, top-left origin.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl LayoutRect {
    pub fn left(&self) -> f32 {
        self.origin_x
    }

    pub fn right(&self) -> f32 {
        self.origin_x + self.extent_x
    }

    pub fn top(&self) -> f32 {
        self.origin_y
    }

    pub fn bottom(&self) -> f32 {
        self.origin_y - self.extent_y
    }

    /// Map the rect onto a `canvas_width × canvas_height` pixel grid, clamped to the canvas.
    pub fn to_pixels(&self, canvas_width: u32, canvas_height: u32) -> PixelRect {
        let to_px = |ndc: f32, size: u32| -> u32 {
            let px = ((ndc + 1.0) * 0.5 * size as f32).round();
            px.clamp(0.0, size as f32) as u32
        };
        let x0 = to_px(self.left(), canvas_width);
        let x1 = to_px(self.right(), canvas_width);
        // y is flipped: ndc +1 is pixel row 0
        let y0 = to_px(-self.top(), canvas_height);
        let y1 = to_px(-self.bottom(), canvas_height);
        PixelRect {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }
}

/// Canvas size plus one rect per mip, in mip order.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub rects: Vec<LayoutRect>,
}

impl CanvasLayout {
    /// Whether any rect leaves the `[-1, 1]` canvas. Only possible for chains that
    /// are not halved at every level.
    pub fn overflows(&self) -> bool {
        const EPS: f32 = 1e-4;
        self.rects.iter().any(|r| {
            r.left() < -1.0 - EPS
                || r.right() > 1.0 + EPS
                || r.top() > 1.0 + EPS
                || r.bottom() < -1.0 - EPS
        })
    }
}

/// `2 * w0 - 1` by `h0`.
///
/// Exact for every width a [`MipDescriptor`] accepts.
pub fn canvas_size(base: &MipDescriptor) -> (u32, u32) {
    let width = base.width();
    (width + (width - 1), base.height())
}

/// Whether every level is exactly half (rounded down, at least 1) of the previous one.
pub fn is_conventional_chain(mips: &[MipDescriptor]) -> bool {
    mips.windows(2).all(|pair| {
        let (prev, next) = (&pair[0], &pair[1]);
        next.width() == (prev.width() / 2).max(1) && next.height() == (prev.height() / 2).max(1)
    })
}

pub fn compute_layout(mips: &[MipDescriptor]) -> Result<CanvasLayout, LayoutError> {
    let base = mips.first().ok_or(LayoutError::InvalidMipChain)?;
    let (canvas_width, canvas_height) = canvas_size(base);

    if !is_conventional_chain(mips) {
        log::warn!(
            "mip chain based on {}x{} is not halved at every level; quads may not fit the {}x{} canvas",
            base.width(),
            base.height(),
            canvas_width,
            canvas_height
        );
    }

    let mut x = -1.0f32;
    let mut y = 1.0f32;
    let mut rects = Vec::with_capacity(mips.len());
    for mip in mips {
        let viewport_width = (mip.width() as f32 / canvas_width as f32) * 2.0;
        let viewport_height = (mip.height() as f32 / canvas_height as f32) * 2.0;
        rects.push(LayoutRect {
            origin_x: x,
            origin_y: y,
            extent_x: viewport_width,
            extent_y: viewport_height,
            uv: UvRect::FULL,
        });

        x += viewport_width;
        // The next, half-height mip sits on the canvas floor under the freed midpoint.
        y = -1.0 + viewport_height / 2.0;
    }

    Ok(CanvasLayout {
        canvas_width,
        canvas_height,
        rects,
    })
}
