/// Blit rectangle planning
///
/// Guest blits are expressed in units of `bpp` bytes per pixel, which may
/// differ from either framebuffer's own pixel size. Both sides are rescaled
/// to their own pixels, clipped to guest bounds with the same parameter
/// range (so source and destination stay in correspondence), then mapped to
/// render resolution.

use crate::device::Rect2D;

/// One framebuffer taking part in a blit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitSide {
    pub guest_width: u32,
    pub guest_height: u32,
    pub render_width: u32,
    pub render_height: u32,
    /// Bytes per pixel of the framebuffer's guest format
    pub format_bpp: u32,
}

/// Render-resolution rectangles of a clipped blit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitPlan {
    pub src: Rect2D,
    pub dst: Rect2D,
}

impl BlitPlan {
    /// Same size on both sides (plain copy, no scaling)
    pub fn is_one_to_one(&self) -> bool {
        self.src.width == self.dst.width && self.src.height == self.dst.height
    }
}

/// Clip a guest blit and map it to render resolution
///
/// Returns `None` when nothing remains after clipping.
#[allow(clippy::too_many_arguments)]
pub fn plan_blit(
    dst: &BlitSide,
    dst_x: i32,
    dst_y: i32,
    src: &BlitSide,
    src_x: i32,
    src_y: i32,
    width: i32,
    height: i32,
    bpp: u32,
) -> Option<BlitPlan> {
    if width <= 0 || height <= 0 || bpp == 0 || src.format_bpp == 0 || dst.format_bpp == 0 {
        return None;
    }
    let src_factor = bpp as f64 / src.format_bpp as f64;
    let dst_factor = bpp as f64 / dst.format_bpp as f64;
    let (src_x, src_y, dst_x, dst_y) = (src_x as f64, src_y as f64, dst_x as f64, dst_y as f64);

    // Parameter range along the blit, in blit units
    let t0 = 0f64.max(-src_x).max(-dst_x);
    let t1 = (width as f64)
        .min(src.guest_width as f64 / src_factor - src_x)
        .min(dst.guest_width as f64 / dst_factor - dst_x);
    let s0 = 0f64.max(-src_y).max(-dst_y);
    let s1 = (height as f64)
        .min(src.guest_height as f64 - src_y)
        .min(dst.guest_height as f64 - dst_y);
    if t1 <= t0 || s1 <= s0 {
        return None;
    }

    let src_rect = to_render(src, src_factor * (src_x + t0), src_factor * (src_x + t1), src_y + s0, src_y + s1);
    let dst_rect = to_render(dst, dst_factor * (dst_x + t0), dst_factor * (dst_x + t1), dst_y + s0, dst_y + s1);
    if src_rect.is_empty() || dst_rect.is_empty() {
        return None;
    }
    Some(BlitPlan { src: src_rect, dst: dst_rect })
}

fn to_render(side: &BlitSide, x0: f64, x1: f64, y0: f64, y1: f64) -> Rect2D {
    let sx = side.render_width as f64 / side.guest_width.max(1) as f64;
    let sy = side.render_height as f64 / side.guest_height.max(1) as f64;
    let rx0 = ((x0 * sx).round() as u32).min(side.render_width);
    let rx1 = ((x1 * sx).round() as u32).min(side.render_width);
    let ry0 = ((y0 * sy).round() as u32).min(side.render_height);
    let ry1 = ((y1 * sy).round() as u32).min(side.render_height);
    Rect2D::new(rx0 as i32, ry0 as i32, rx1.saturating_sub(rx0), ry1.saturating_sub(ry0))
}

#[cfg(test)]
#[path = "blit_tests.rs"]
mod tests;
