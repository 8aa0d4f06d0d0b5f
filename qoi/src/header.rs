use crate::consts::{HEADER_SIZE, MAGIC, PIXELS_MAX};
use byteorder::{BigEndian, ByteOrder};

/// Number of interleaved channels an image has.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channels {
    /// R, G, B. Alpha is always 255.
    Rgb = 3,
    /// R, G, B, A.
    Rgba = 4,
}

impl Channels {
    #[inline]
    pub const fn count(self) -> usize {
        self as usize
    }
}

/// Colorspace tag stored in the header. Purely informative, it does not change how pixels are
/// encoded.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Colorspace {
    /// sRGB color channels with linear alpha.
    #[default]
    Srgb = 0,
    /// All channels linear.
    Linear = 1,
}

/// The fixed 14-byte preamble of every stream.
///
/// ```plain
/// .- Header ---------------------------------------------------.
/// | 0..4  | 4..8        | 8..12        | 12       | 13         |
/// |-------+-------------+--------------+----------+------------|
/// | qoif  | width u32be | height u32be | channels | colorspace |
/// `------------------------------------------------------------`
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    pub width: u32,
    pub height: u32,
    pub channels: Channels,
    pub colorspace: Colorspace,
}

impl Header {
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&MAGIC);
        BigEndian::write_u32(&mut bytes[4..8], self.width);
        BigEndian::write_u32(&mut bytes[8..12], self.height);
        bytes[12] = self.channels as u8;
        bytes[13] = self.colorspace as u8;
        bytes
    }

    /// `width * height`, or `None` if it exceeds [`PIXELS_MAX`] or `usize`.
    pub fn checked_pixel_count(&self) -> Option<usize> {
        let count = usize::try_from(self.width)
            .ok()?
            .checked_mul(usize::try_from(self.height).ok()?)?;
        (count <= PIXELS_MAX).then_some(count)
    }

    /// `width * height`, for headers that came out of [`Header::from_bytes`].
    #[inline]
    pub(crate) fn pixel_count(&self) -> usize {
        self.checked_pixel_count().unwrap_or(0)
    }
}
