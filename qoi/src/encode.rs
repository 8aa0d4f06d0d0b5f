use crate::{cache::ColorCache, consts::*, Chunk, Pixel};
#[cfg(feature = "alloc")]
use core::convert::Infallible;
use itertools::Itertools;

#[cfg(feature = "alloc")]
use {crate::Image, alloc::vec::Vec};

#[cfg(feature = "std")]
mod std_api;
#[cfg(feature = "std")]
pub use std_api::*;

/// State carried from pixel to pixel while encoding: the previous pixel and the color cache.
#[derive(Debug, Clone, Copy)]
pub struct QoiEncodeContext {
    pub prev: Pixel,
    pub cache: ColorCache,
}

impl QoiEncodeContext {
    pub const fn new() -> Self {
        Self {
            prev: Pixel::START,
            cache: ColorCache::new(),
        }
    }
}

impl Default for QoiEncodeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl QoiEncodeContext {
    /// Appends the complete stream for `image` to `w`.
    #[cfg(feature = "alloc")]
    pub fn encode_to_vec(image: &Image, w: &mut Vec<u8>) {
        // rough guess: one byte per pixel plus framing
        w.reserve(HEADER_SIZE + image.pixels().len() + END_MARKER.len());

        w.extend_from_slice(&image.header().to_bytes());

        let mut state = QoiEncodeContext::new();
        state
            .encode_chunks(image.pixels(), |chunk| {
                w.extend_from_slice(&chunk.to_bytes());
                Ok(())
            })
            .unwrap_or_else(|never: Infallible| match never {});

        w.extend_from_slice(&END_MARKER);

        log::debug!(
            "encoded {}x{} image into {} bytes",
            image.width(),
            image.height(),
            w.len()
        );
    }

    /// Translates `pixels` into chunks, handing each one to `emit` in stream order.
    ///
    /// Equal neighbouring pixels are coalesced into runs of at most [`MAX_RUN`]. Every pixel,
    /// including the repeated ones, goes through the color cache.
    pub fn encode_chunks<E>(
        &mut self,
        pixels: &[Pixel],
        mut emit: impl FnMut(Chunk) -> Result<(), E>,
    ) -> Result<(), E> {
        for (count, &pixel) in pixels.iter().dedup_with_count() {
            let mut repeats = count;

            if pixel != self.prev {
                emit(Chunk::select(self.prev, pixel, &self.cache))?;
                self.cache.update(pixel);
                self.prev = pixel;
                repeats -= 1;
            }

            if repeats == 0 {
                continue;
            }

            // only differs from the slot content for a leading run of the start pixel
            self.cache.update(pixel);

            let max_run_count = repeats / usize::from(MAX_RUN);
            let rest_count = repeats % usize::from(MAX_RUN);
            for _ in 0..max_run_count {
                emit(Chunk::Run(MAX_RUN))?;
            }
            if rest_count > 0 {
                emit(Chunk::Run(rest_count as u8))?;
            }
        }

        Ok(())
    }
}
