/// Conversion table for in-place framebuffer reformats.
///
/// A reformat re-quantizes host RGBA8 content from the precision of the
/// old guest format to the precision of the new one. The table is explicit:
/// every supported `(old, new)` pair has an entry, and a pair without an
/// entry forces the caller onto the destroy/recreate path.

use super::guest_format::GuestFormat;

/// What happens to the alpha/stencil channel during a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaRule {
    /// Alpha is re-quantized to the new format's alpha precision
    Preserve,
    /// Alpha/stencil is cleared to zero (the old format had no alpha)
    Clear,
    /// Alpha is forced opaque (the new format has no alpha)
    Opaque,
}

/// One entry of the conversion table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelConversion {
    /// Format the host content currently represents
    pub from: GuestFormat,
    /// Format the host content must represent afterwards
    pub to: GuestFormat,
    /// Alpha channel handling
    pub alpha: AlphaRule,
}

use GuestFormat::*;
use AlphaRule::*;

const fn entry(from: GuestFormat, to: GuestFormat, alpha: AlphaRule) -> PixelConversion {
    PixelConversion { from, to, alpha }
}

/// Every convertible pair of distinct guest formats
///
/// 565 carries no alpha, so leaving it clears alpha/stencil and entering it
/// makes host alpha opaque. All other pairs re-quantize all four channels.
pub const CONVERSION_TABLE: [PixelConversion; 12] = [
    entry(Rgb565, Rgba5551, Clear),
    entry(Rgb565, Rgba4444, Clear),
    entry(Rgb565, Rgba8888, Clear),
    entry(Rgba5551, Rgb565, Opaque),
    entry(Rgba5551, Rgba4444, Preserve),
    entry(Rgba5551, Rgba8888, Preserve),
    entry(Rgba4444, Rgb565, Opaque),
    entry(Rgba4444, Rgba5551, Preserve),
    entry(Rgba4444, Rgba8888, Preserve),
    entry(Rgba8888, Rgb565, Opaque),
    entry(Rgba8888, Rgba5551, Preserve),
    entry(Rgba8888, Rgba4444, Preserve),
];

impl PixelConversion {
    /// Look up the conversion from `from` to `to`
    ///
    /// Returns `None` for identical formats (nothing to do) and for pairs
    /// missing from the table.
    pub fn lookup(from: GuestFormat, to: GuestFormat) -> Option<PixelConversion> {
        if from == to {
            return None;
        }
        CONVERSION_TABLE
            .iter()
            .find(|c| c.from == from && c.to == to)
            .copied()
    }

    /// Convert one host RGBA8 pixel
    pub fn apply(&self, rgba: [u8; 4]) -> [u8; 4] {
        let mut out = self.to.quantize(rgba);
        out[3] = match self.alpha {
            Preserve => out[3],
            Clear => 0,
            Opaque => 0xFF,
        };
        out
    }

    /// Convert a tightly packed RGBA8 buffer in place
    pub fn apply_in_place(&self, pixels: &mut [u8]) {
        for px in pixels.chunks_exact_mut(4) {
            let converted = self.apply([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&converted);
        }
    }
}
