/// A single RGBA pixel.
///
/// Images with 3 channels still use this type, with `a` fixed at 255.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    /// The all-zero pixel (including alpha) every color cache slot starts out with.
    pub const ZERO: Pixel = Pixel::new(0, 0, 0, 0);

    /// The pixel both encoder and decoder treat as "previous" before the first pixel.
    pub const START: Pixel = Pixel::new(0, 0, 0, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// An opaque pixel.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Position of this pixel in the color cache: `(3r + 5g + 7b + 11a) % 64`.
    #[inline]
    pub const fn cache_index(self) -> u8 {
        // 256 is a multiple of 64, so wrapping u8 math keeps the low 6 bits intact.
        let sum = self
            .r
            .wrapping_mul(3)
            .wrapping_add(self.g.wrapping_mul(5))
            .wrapping_add(self.b.wrapping_mul(7))
            .wrapping_add(self.a.wrapping_mul(11));
        sum & 0b0011_1111 // % 64
    }

    /// Signed per-channel difference `self - prev` for r, g and b, wrapping around at 256.
    #[inline]
    pub const fn rgb_diff(self, prev: Pixel) -> [i8; 3] {
        [
            self.r.wrapping_sub(prev.r) as i8,
            self.g.wrapping_sub(prev.g) as i8,
            self.b.wrapping_sub(prev.b) as i8,
        ]
    }

    /// Applies signed (wrapping) r, g and b differences, keeping alpha.
    #[inline]
    pub const fn apply_diff(self, [dr, dg, db]: [i8; 3]) -> Self {
        Self::new(
            self.r.wrapping_add_signed(dr),
            self.g.wrapping_add_signed(dg),
            self.b.wrapping_add_signed(db),
            self.a,
        )
    }

    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    #[inline]
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub const fn to_rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 4]> for Pixel {
    #[inline]
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

impl From<[u8; 3]> for Pixel {
    #[inline]
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::rgb(r, g, b)
    }
}

impl From<Pixel> for [u8; 4] {
    #[inline]
    fn from(pixel: Pixel) -> Self {
        pixel.to_rgba()
    }
}
