use crate::{
    decode::{DecodeError, QoiDecodeContext},
    Image, QoiStreamingDecodeContext,
};
use snafu::{ResultExt, Snafu};
use std::io::{ErrorKind, Read};

#[derive(Debug, Snafu)]
pub enum DecodeReadError {
    #[snafu(display("Failed to decode the stream"))]
    Decode { source: DecodeError },
    #[snafu(display("Failed to read the stream"))]
    ReadIo { source: std::io::Error },
}

impl QoiDecodeContext {
    /// Decodes an image from `r`, reading until the end marker or the end of the input.
    pub fn decode_reader<R: Read>(mut r: R) -> Result<Image, DecodeReadError> {
        let mut stream = QoiStreamingDecodeContext::new();
        let mut pixels = Vec::new();
        let mut buf = [0u8; 8 * 1024];

        while !stream.is_finished() {
            let read = match r.read(&mut buf) {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context(ReadIoSnafu),
            };
            stream.push(&buf[..read], &mut pixels).context(DecodeSnafu)?;
        }

        let header = stream.finish().context(DecodeSnafu)?;
        Ok(Image::from_parts(header, pixels))
    }
}
