use crate::{
    consts::*,
    decode::{check_end_marker, decode_error, DecodeError, QoiDecodeContext},
    Chunk, Header, Pixel,
};
use alloc::vec::Vec;
use snafu::OptionExt;

/// Decodes a stream handed over in arbitrarily sized pieces.
///
/// Bytes of a header or chunk that is split across two [`push`](Self::push) calls are buffered
/// until the rest arrives. The produced pixels are identical to a one-shot decode.
#[derive(Debug, Clone)]
pub struct QoiStreamingDecodeContext {
    ctx: QoiDecodeContext,
    state: StreamingDecodeState,
    header: Option<Header>,
    remaining: usize,
    pending: [u8; HEADER_SIZE],
    pending_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamingDecodeState {
    Header,
    Chunks,
    EndMarker,
    Finished,
}

impl Default for QoiStreamingDecodeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl QoiStreamingDecodeContext {
    pub const fn new() -> Self {
        Self {
            ctx: QoiDecodeContext::new(),
            state: StreamingDecodeState::Header,
            header: None,
            remaining: 0,
            pending: [0; HEADER_SIZE],
            pending_len: 0,
        }
    }

    /// The header, once all of it has been pushed.
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// Pixels still to be decoded, or 0 before the header is known.
    pub fn remaining_pixels(&self) -> usize {
        self.remaining
    }

    /// Whether all pixels and the end marker have been consumed.
    pub fn is_finished(&self) -> bool {
        self.state == StreamingDecodeState::Finished
    }

    /// Feeds the next piece of the stream, appending every pixel that can be decoded so far to
    /// `output`.
    ///
    /// Returns the number of pixels appended by this call.
    pub fn push(&mut self, mut input: &[u8], output: &mut Vec<Pixel>) -> Result<usize, DecodeError> {
        let start = output.len();

        while !input.is_empty() {
            match self.state {
                StreamingDecodeState::Header => {
                    if !self.fill_pending(&mut input, HEADER_SIZE) {
                        break;
                    }

                    let header = Header::from_bytes(&self.pending)?;
                    self.pending_len = 0;
                    self.remaining = header.pixel_count();
                    self.header = Some(header);
                    self.state = if self.remaining == 0 {
                        StreamingDecodeState::EndMarker
                    } else {
                        StreamingDecodeState::Chunks
                    };
                }
                StreamingDecodeState::Chunks => {
                    let chunk = if self.pending_len > 0 {
                        let size = Chunk::size_for_tag(self.pending[0]);
                        if !self.fill_pending(&mut input, size) {
                            break;
                        }
                        self.pending_len = 0;
                        Chunk::parse(&self.pending[..size]).map(|(chunk, _)| chunk)
                    } else {
                        Chunk::parse(input).map(|(chunk, size)| {
                            input = &input[size..];
                            chunk
                        })
                    };

                    let Some(chunk) = chunk else {
                        // the rest of the input is the start of a chunk
                        self.fill_pending(&mut input, MAX_CHUNK_SIZE);
                        break;
                    };

                    let channels = self
                        .header
                        .map(|h| h.channels)
                        .context(decode_error::UnexpectedEofSnafu)?;
                    let produced = match chunk {
                        Chunk::Run(run) => usize::from(run).min(self.remaining),
                        _ => 1,
                    };

                    let at = output.len();
                    output.resize(at + produced, Pixel::ZERO);
                    let written = self.ctx.apply_chunk(chunk, channels, &mut output[at..]);
                    self.remaining -= written;

                    if self.remaining == 0 {
                        self.state = StreamingDecodeState::EndMarker;
                    }
                }
                StreamingDecodeState::EndMarker => {
                    if !self.fill_pending(&mut input, END_MARKER.len()) {
                        break;
                    }
                    check_end_marker(&self.pending[..END_MARKER.len()]);
                    self.pending_len = 0;
                    self.state = StreamingDecodeState::Finished;
                }
                StreamingDecodeState::Finished => {
                    log::debug!("ignoring {} bytes after the end marker", input.len());
                    break;
                }
            }
        }

        Ok(output.len() - start)
    }

    /// Ends the stream, failing if it stopped before the last pixel.
    pub fn finish(self) -> Result<Header, DecodeError> {
        match self.state {
            StreamingDecodeState::Header | StreamingDecodeState::Chunks => {
                decode_error::UnexpectedEofSnafu.fail()
            }
            StreamingDecodeState::EndMarker => {
                check_end_marker(&self.pending[..self.pending_len]);
                self.header.context(decode_error::UnexpectedEofSnafu)
            }
            StreamingDecodeState::Finished => {
                self.header.context(decode_error::UnexpectedEofSnafu)
            }
        }
    }

    /// Moves bytes from `input` into the pending buffer until it holds `target` bytes.
    ///
    /// Returns whether the target was reached.
    fn fill_pending(&mut self, input: &mut &[u8], target: usize) -> bool {
        let take = target.saturating_sub(self.pending_len).min(input.len());
        self.pending[self.pending_len..self.pending_len + take].copy_from_slice(&input[..take]);
        self.pending_len += take;
        *input = &input[take..];

        self.pending_len >= target
    }
}
