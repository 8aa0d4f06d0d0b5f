use crate::{cache::ColorCache, consts::*, Channels, Chunk, Colorspace, Header, Pixel};
use byteorder::{BigEndian, ByteOrder};
use snafu::{ensure, OptionExt, Snafu};

#[cfg(feature = "alloc")]
pub mod streaming;

#[cfg(feature = "alloc")]
mod alloc_api;
#[cfg(feature = "std")]
mod std_api;
#[cfg(feature = "std")]
pub use std_api::*;

#[derive(Debug, Snafu)]
#[snafu(module)]
pub enum DecodeError {
    #[snafu(display("Invalid magic bytes {magic:?}, expected `qoif`"))]
    InvalidMagic { magic: [u8; 4] },
    #[snafu(display("Unsupported channel count {channels}, expected 3 or 4"))]
    InvalidChannels { channels: u8 },
    #[snafu(display("Unsupported colorspace {colorspace}, expected 0 or 1"))]
    InvalidColorspace { colorspace: u8 },
    #[snafu(display("Image dimensions {width}x{height} exceed the supported pixel count"))]
    ImageTooLarge { width: u32, height: u32 },
    #[snafu(display("Stream ended before all pixels were decoded"))]
    UnexpectedEof,
    #[snafu(display("Output holds {available} pixels, but the image needs {required}"))]
    OutputTooSmall { required: usize, available: usize },
}

/// Broad classes of [`DecodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// The header is not a valid QOI header.
    Format,
    /// The stream ended before the image was complete.
    Truncated,
    /// The caller-provided output cannot hold the image.
    Output,
}

impl DecodeError {
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            DecodeError::InvalidMagic { .. }
            | DecodeError::InvalidChannels { .. }
            | DecodeError::InvalidColorspace { .. }
            | DecodeError::ImageTooLarge { .. } => DecodeErrorKind::Format,
            DecodeError::UnexpectedEof => DecodeErrorKind::Truncated,
            DecodeError::OutputTooSmall { .. } => DecodeErrorKind::Output,
        }
    }
}

impl TryFrom<u8> for Channels {
    type Error = DecodeError;

    fn try_from(channels: u8) -> Result<Self, Self::Error> {
        match channels {
            3 => Ok(Channels::Rgb),
            4 => Ok(Channels::Rgba),
            _ => decode_error::InvalidChannelsSnafu { channels }.fail(),
        }
    }
}

impl TryFrom<u8> for Colorspace {
    type Error = DecodeError;

    fn try_from(colorspace: u8) -> Result<Self, Self::Error> {
        match colorspace {
            0 => Ok(Colorspace::Srgb),
            1 => Ok(Colorspace::Linear),
            _ => decode_error::InvalidColorspaceSnafu { colorspace }.fail(),
        }
    }
}

impl Header {
    /// Parses and validates the header at the start of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let header = data
            .get(..HEADER_SIZE)
            .context(decode_error::UnexpectedEofSnafu)?;

        let magic = [header[0], header[1], header[2], header[3]];
        ensure!(magic == MAGIC, decode_error::InvalidMagicSnafu { magic });

        let width = BigEndian::read_u32(&header[4..8]);
        let height = BigEndian::read_u32(&header[8..12]);
        let header = Header {
            width,
            height,
            channels: Channels::try_from(header[12])?,
            colorspace: Colorspace::try_from(header[13])?,
        };
        ensure!(
            header.checked_pixel_count().is_some(),
            decode_error::ImageTooLargeSnafu { width, height }
        );

        Ok(header)
    }
}

/// State carried from chunk to chunk while decoding: the previous pixel and the color cache.
///
/// Mirrors [`QoiEncodeContext`](crate::QoiEncodeContext); after the same number of pixels both
/// hold identical state.
#[derive(Debug, Clone, Copy)]
pub struct QoiDecodeContext {
    pub prev: Pixel,
    pub cache: ColorCache,
}

impl QoiDecodeContext {
    pub const fn new() -> Self {
        Self {
            prev: Pixel::START,
            cache: ColorCache::new(),
        }
    }
}

impl Default for QoiDecodeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl QoiDecodeContext {
    /// Decodes a complete stream into `output`, which must hold at least `width * height`
    /// pixels. Pixels past that are left untouched.
    pub fn decode_to_slice(data: &[u8], output: &mut [Pixel]) -> Result<Header, DecodeError> {
        let header = Header::from_bytes(data)?;
        let pixel_count = header.pixel_count();
        ensure!(
            output.len() >= pixel_count,
            decode_error::OutputTooSmallSnafu {
                required: pixel_count,
                available: output.len()
            }
        );

        let body = &data[HEADER_SIZE..];
        let mut ctx = QoiDecodeContext::new();
        let consumed = ctx.decode_chunks(body, header.channels, &mut output[..pixel_count])?;
        check_end_marker(&body[consumed..]);

        Ok(header)
    }

    /// Fills all of `output` from the chunks at the start of `data`, returning the number of
    /// bytes consumed.
    pub fn decode_chunks(
        &mut self,
        data: &[u8],
        channels: Channels,
        output: &mut [Pixel],
    ) -> Result<usize, DecodeError> {
        ensure!(
            could_hold(data, output.len()),
            decode_error::UnexpectedEofSnafu
        );

        let mut pos = 0;
        let mut written = 0;
        while written < output.len() {
            let (chunk, size) =
                Chunk::parse(&data[pos..]).context(decode_error::UnexpectedEofSnafu)?;
            pos += size;
            written += self.apply_chunk(chunk, channels, &mut output[written..]);
        }

        Ok(pos)
    }

    /// Applies one chunk, writing the pixels it produces to the start of `output`.
    ///
    /// Returns the number of pixels written. A run longer than `output` is cut short.
    #[inline]
    pub(crate) fn apply_chunk(
        &mut self,
        chunk: Chunk,
        channels: Channels,
        output: &mut [Pixel],
    ) -> usize {
        let pixel = chunk.apply(self.prev, &self.cache);
        let count = match chunk {
            Chunk::Run(run) => {
                let run = usize::from(run);
                if run > output.len() {
                    log::warn!(
                        "run of {run} pixels overshoots the image by {}, truncating",
                        run - output.len()
                    );
                }
                run.min(output.len())
            }
            _ => 1,
        };

        // 3-channel images report opaque pixels, the state keeps what the stream said
        let visible = match channels {
            Channels::Rgb => pixel.with_alpha(255),
            Channels::Rgba => pixel,
        };

        for slot in &mut output[..count] {
            self.cache.update(pixel);
            *slot = visible;
        }
        self.prev = pixel;

        count
    }
}

/// Whether `data` is long enough to possibly describe `pixel_count` pixels.
#[inline]
pub(crate) fn could_hold(data: &[u8], pixel_count: usize) -> bool {
    pixel_count <= data.len().saturating_mul(usize::from(MAX_RUN))
}

/// Checks the bytes following the last pixel. A missing or damaged end marker does not fail the
/// decode, the pixel count already determines where the image ends.
pub(crate) fn check_end_marker(rest: &[u8]) -> bool {
    match rest.get(..END_MARKER.len()) {
        Some(marker) if marker == END_MARKER => {
            if rest.len() > END_MARKER.len() {
                log::debug!(
                    "ignoring {} bytes after the end marker",
                    rest.len() - END_MARKER.len()
                );
            }
            true
        }
        _ => {
            log::warn!("end marker missing or corrupted after the last pixel");
            false
        }
    }
}
