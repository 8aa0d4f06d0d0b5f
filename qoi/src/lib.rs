//! Encoder and decoder for the [QOI Image format](https://qoiformat.org/).
//!
//! QOI losslessly compresses 8-bit RGB and RGBA images into a byte stream made of a 14-byte
//! header, a sequence of chunks, and an 8-byte end marker.
//!
//! # Stream format
//!
//! - Header: see [`Header`].
//! - Chunks: see [consts] for the different operation types. Every chunk describes one or more
//!   pixels relative to the previous pixel (starting at `(0, 0, 0, 255)`) or to a 64-slot
//!   [color cache](ColorCache) (starting out all zero, including alpha) that both sides update
//!   with every pixel.
//! - End marker: [`consts::END_MARKER`].
//!
//! # Example
//!
//! ```
//! use qoi::{Channels, Colorspace, Image, Pixel};
//!
//! let pixels = vec![Pixel::rgb(10, 20, 30); 4];
//! let image = Image::new(2, 2, Channels::Rgb, Colorspace::Srgb, pixels).unwrap();
//!
//! let encoded = qoi::encode(&image);
//! assert_eq!(qoi::decode(&encoded).unwrap(), image);
//! ```
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod cache;
pub mod chunk;
pub mod decode;
pub mod encode;
pub mod header;
#[cfg(feature = "alloc")]
pub mod image;
pub mod pixel;

pub use cache::ColorCache;
pub use chunk::Chunk;
#[cfg(feature = "alloc")]
pub use decode::streaming::QoiStreamingDecodeContext;
pub use decode::{DecodeError, DecodeErrorKind, QoiDecodeContext};
pub use encode::QoiEncodeContext;
pub use header::{Channels, Colorspace, Header};
#[cfg(feature = "alloc")]
pub use crate::image::{Image, ImageError};
pub use pixel::Pixel;

/// Encodes an image into a complete QOI stream (header, chunks and end marker).
#[cfg(feature = "alloc")]
pub fn encode(image: &Image) -> alloc::vec::Vec<u8> {
    let mut out = alloc::vec::Vec::new();
    QoiEncodeContext::encode_to_vec(image, &mut out);
    out
}

/// Decodes a complete QOI stream into an image.
#[cfg(feature = "alloc")]
pub fn decode(data: &[u8]) -> Result<Image, DecodeError> {
    QoiDecodeContext::decode_to_image(data)
}

pub mod consts {
    /// Re-emit a pixel from the color cache.
    ///
    /// ```plain
    /// .- QOI_OP_INDEX ----------.
    /// |         Byte[0]         |
    /// |  7  6  5  4  3  2  1  0 |
    /// |-------+-----------------|
    /// |  0  0 |     index       |
    /// `-------------------------`
    /// ```
    ///
    /// - 2-bit tag b00
    /// - 6-bit index into the color cache: 0..63
    /// - An encoder never emits this for a pixel equal to the previous one, QOI_OP_RUN is used
    ///   instead.
    pub const QOI_OP_INDEX: u8 = 0b0000_0000;

    /// Calculate a pixel based on a 2-bit difference from the previous pixel.
    ///
    /// ```plain
    /// .- QOI_OP_DIFF -----------.
    /// |         Byte[0]         |
    /// |  7  6  5  4  3  2  1  0 |
    /// |-------+-----+-----+-----|
    /// |  0  1 |  dr |  dg |  db |
    /// `-------------------------`
    /// ```
    ///
    /// - 2-bit tag b01
    /// - 2-bit red, green and blue channel differences from the previous pixel between -2..1,
    ///   each stored with a bias of 2
    /// - Differences wrap around, so `1 - 2` is 255 and `255 + 1` is 0.
    /// - Alpha stays unchanged.
    pub const QOI_OP_DIFF: u8 = 0b0100_0000;

    /// Calculate a pixel based on a 6-bit green-channel difference from the previous pixel, and
    /// differences to the green-channel difference for red and blue.
    ///
    /// ```plain
    /// .- QOI_OP_LUMA -------------------------------------.
    /// |         Byte[0]         |         Byte[1]         |
    /// |  7  6  5  4  3  2  1  0 |  7  6  5  4  3  2  1  0 |
    /// |-------+-----------------+-------------+-----------|
    /// |  1  0 |   green diff    |   dr - dg   |  db - dg  |
    /// `---------------------------------------------------`
    /// ```
    ///
    /// - 2-bit tag b10
    /// - 6-bit green channel difference from the previous pixel (`-32..31`), stored with a bias
    ///   of 32
    /// - 4-bit red channel difference minus green channel difference (`-8..7`), stored with a bias
    ///   of 8
    /// - 4-bit blue channel difference minus green channel difference (`-8..7`), stored with a
    ///   bias of 8
    /// - Alpha stays unchanged.
    pub const QOI_OP_LUMA: u8 = 0b1000_0000;

    /// Repeats the previous pixel.
    ///
    /// ```plain
    /// .- QOI_OP_RUN ------------.
    /// |         Byte[0]         |
    /// |  7  6  5  4  3  2  1  0 |
    /// |-------+-----------------|
    /// |  1  1 |       run       |
    /// `-------------------------`
    /// ```
    ///
    /// - 2-bit tag b11
    /// - 6-bit run-length repeating the previous pixel: 1..62
    /// - The run-length is stored with a bias of -1. Note that the run-lengths 63 and 64 (`b111110`
    ///   and `b111111`) are illegal as they are occupied by the QOI_OP_RGB and QOI_OP_RGBA tag.
    pub const QOI_OP_RUN: u8 = 0b1100_0000;

    /// Emits a full raw pixel, keeping the alpha of the previous pixel.
    ///
    /// ```plain
    /// .- QOI_OP_RGB ------------------------------------------.
    /// |         Byte[0]         | Byte[1] | Byte[2] | Byte[3] |
    /// |  7  6  5  4  3  2  1  0 | 7 .. 0  | 7 .. 0  | 7 .. 0  |
    /// |-------------------------+---------+---------+---------|
    /// |  1  1  1  1  1  1  1  0 |   red   |  green  |  blue   |
    /// `-------------------------------------------------------`
    /// ```
    pub const QOI_OP_RGB: u8 = 0b1111_1110;

    /// Emits a full raw pixel including alpha.
    ///
    /// ```plain
    /// .- QOI_OP_RGBA ---------------------------------------------------.
    /// |         Byte[0]         | Byte[1] | Byte[2] | Byte[3] | Byte[4] |
    /// |  7  6  5  4  3  2  1  0 | 7 .. 0  | 7 .. 0  | 7 .. 0  | 7 .. 0  |
    /// |-------------------------+---------+---------+---------+---------|
    /// |  1  1  1  1  1  1  1  1 |   red   |  green  |  blue   |  alpha  |
    /// `-----------------------------------------------------------------`
    /// ```
    pub const QOI_OP_RGBA: u8 = 0b1111_1111;

    /// Mask selecting the 2-bit tag of the INDEX, DIFF, LUMA and RUN operations.
    pub const QOI_MASK_2: u8 = 0b1100_0000;

    /// Longest run a single QOI_OP_RUN can describe.
    pub const MAX_RUN: u8 = 62;

    /// Size of the largest chunk (QOI_OP_RGBA).
    pub const MAX_CHUNK_SIZE: usize = 5;

    pub const MAGIC: [u8; 4] = *b"qoif";
    pub const HEADER_SIZE: usize = 14;

    /// Marks the end of the stream: seven `0x00` bytes followed by `0x01`.
    pub const END_MARKER: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];

    /// Upper bound on `width * height` the decoder accepts.
    pub const PIXELS_MAX: usize = 400_000_000;
}
