use crate::{consts::END_MARKER, encode::QoiEncodeContext, Header, Image};
use snafu::{ResultExt, Snafu};
use std::io::Write;

#[derive(Debug, Snafu)]
pub enum EncodeError {
    #[snafu(display("Failed to write the encoded stream"))]
    WriteIo { source: std::io::Error },
}

impl QoiEncodeContext {
    /// Writes the complete stream for `image` to `w`.
    ///
    /// Chunks are written one at a time, so `w` should be buffered.
    pub fn encode<W: Write>(image: &Image, mut w: W) -> Result<(), EncodeError> {
        Self::encode_header(image.header(), &mut w)?;

        let mut ctx = QoiEncodeContext::new();
        ctx.encode_chunks(image.pixels(), |chunk| {
            w.write_all(&chunk.to_bytes()).context(WriteIoSnafu)
        })?;

        w.write_all(&END_MARKER).context(WriteIoSnafu)
    }

    pub fn encode_header<W: Write>(header: &Header, mut w: W) -> Result<(), EncodeError> {
        w.write_all(&header.to_bytes()).context(WriteIoSnafu)
    }
}
