/// Guest framebuffer pixel formats and their packing rules.
///
/// Host render targets always store RGBA8. The guest format only decides
/// how many bits of each channel are meaningful, how pixels are packed in
/// guest memory, and which bits hold stencil.

/// Pixel format of a guest framebuffer
///
/// 16-bit formats are little-endian with red in the low bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuestFormat {
    /// 5-6-5, no alpha (and therefore no stencil)
    Rgb565,
    /// 5-5-5 with a 1-bit alpha/stencil
    Rgba5551,
    /// 4-4-4-4, alpha nibble doubles as 4-bit stencil
    Rgba4444,
    /// 8-8-8-8, alpha byte doubles as 8-bit stencil
    Rgba8888,
}

impl GuestFormat {
    /// All guest formats, in hardware enumeration order
    pub const ALL: [GuestFormat; 4] = [
        GuestFormat::Rgb565,
        GuestFormat::Rgba5551,
        GuestFormat::Rgba4444,
        GuestFormat::Rgba8888,
    ];

    /// Bytes used by one pixel in guest memory
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            GuestFormat::Rgba8888 => 4,
            _ => 2,
        }
    }

    /// Meaningful bits per channel as (r, g, b, a)
    pub fn channel_bits(self) -> [u32; 4] {
        match self {
            GuestFormat::Rgb565 => [5, 6, 5, 0],
            GuestFormat::Rgba5551 => [5, 5, 5, 1],
            GuestFormat::Rgba4444 => [4, 4, 4, 4],
            GuestFormat::Rgba8888 => [8, 8, 8, 8],
        }
    }

    /// Number of stencil bits carried in the alpha channel
    pub fn stencil_bits(self) -> u32 {
        self.channel_bits()[3]
    }

    /// Decode one guest pixel into host RGBA8
    ///
    /// Narrow channels are expanded by bit replication so that
    /// `encode(decode(p)) == p` for every guest pixel.
    pub fn decode_pixel(self, bytes: &[u8]) -> [u8; 4] {
        match self {
            GuestFormat::Rgba8888 => [bytes[0], bytes[1], bytes[2], bytes[3]],
            _ => {
                let packed = u16::from_le_bytes([bytes[0], bytes[1]]) as u32;
                let [rb, gb, bb, ab] = self.channel_bits();
                let r = packed & mask(rb);
                let g = (packed >> rb) & mask(gb);
                let b = (packed >> (rb + gb)) & mask(bb);
                let a = if ab == 0 {
                    0xFF
                } else {
                    expand((packed >> (rb + gb + bb)) & mask(ab), ab)
                };
                [expand(r, rb), expand(g, gb), expand(b, bb), a]
            }
        }
    }

    /// Encode host RGBA8 into one guest pixel
    ///
    /// `out` must hold at least `bytes_per_pixel()` bytes.
    pub fn encode_pixel(self, rgba: [u8; 4], out: &mut [u8]) {
        match self {
            GuestFormat::Rgba8888 => out[..4].copy_from_slice(&rgba),
            _ => {
                let [rb, gb, bb, ab] = self.channel_bits();
                let mut packed = reduce(rgba[0], rb)
                    | (reduce(rgba[1], gb) << rb)
                    | (reduce(rgba[2], bb) << (rb + gb));
                if ab > 0 {
                    packed |= reduce(rgba[3], ab) << (rb + gb + bb);
                }
                out[..2].copy_from_slice(&(packed as u16).to_le_bytes());
            }
        }
    }

    /// Round a host color to the precision this format can hold
    ///
    /// Alpha is left untouched for formats without alpha; callers decide
    /// what alpha a 565 target carries.
    pub fn quantize(self, rgba: [u8; 4]) -> [u8; 4] {
        let bits = self.channel_bits();
        let mut out = rgba;
        for c in 0..4 {
            if bits[c] > 0 {
                out[c] = expand(reduce(rgba[c], bits[c]), bits[c]);
            }
        }
        out
    }

    /// Stencil value stored in a guest pixel, expanded to 8 bits
    ///
    /// Returns `None` for formats without stencil bits.
    pub fn stencil_from_pixel(self, bytes: &[u8]) -> Option<u8> {
        if self.stencil_bits() == 0 {
            return None;
        }
        Some(self.decode_pixel(bytes)[3])
    }
}

fn mask(bits: u32) -> u32 {
    (1 << bits) - 1
}

/// Round an 8-bit channel to `bits` bits
fn reduce(value: u8, bits: u32) -> u32 {
    if bits >= 8 {
        return value as u32;
    }
    (value as u32 * mask(bits) + 127) / 255
}

/// Expand a `bits`-bit channel to 8 bits by bit replication
fn expand(value: u32, bits: u32) -> u8 {
    match bits {
        0 => 0,
        1 => if value != 0 { 0xFF } else { 0 },
        8.. => value as u8,
        _ => {
            let mut out = value << (8 - bits);
            let mut shift = bits;
            while shift < 8 {
                out |= out >> shift;
                shift *= 2;
            }
            out as u8
        }
    }
}
