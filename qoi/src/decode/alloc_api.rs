use crate::{
    consts::HEADER_SIZE,
    decode::{check_end_marker, could_hold, decode_error, DecodeError, QoiDecodeContext},
    Header, Image, Pixel,
};
use alloc::vec::Vec;
use snafu::ensure;

impl QoiDecodeContext {
    /// Decodes a complete stream, appending its pixels to `w`.
    ///
    /// On error `w` is left as it was.
    pub fn decode_to_vec(data: &[u8], w: &mut Vec<Pixel>) -> Result<Header, DecodeError> {
        let header = Header::from_bytes(data)?;
        let pixel_count = header.pixel_count();
        let body = &data[HEADER_SIZE..];

        // don't allocate for a header the body can't back up
        ensure!(
            could_hold(body, pixel_count),
            decode_error::UnexpectedEofSnafu
        );

        log::debug!(
            "decoding {}x{} image, {:?} {:?}",
            header.width,
            header.height,
            header.channels,
            header.colorspace
        );

        let start = w.len();
        w.resize(start + pixel_count, Pixel::ZERO);

        let mut ctx = QoiDecodeContext::new();
        let consumed = match ctx.decode_chunks(body, header.channels, &mut w[start..]) {
            Ok(consumed) => consumed,
            Err(e) => {
                w.truncate(start);
                return Err(e);
            }
        };
        check_end_marker(&body[consumed..]);

        Ok(header)
    }

    pub fn decode_to_image(data: &[u8]) -> Result<Image, DecodeError> {
        let mut pixels = Vec::new();
        let header = Self::decode_to_vec(data, &mut pixels)?;
        Ok(Image::from_parts(header, pixels))
    }
}
