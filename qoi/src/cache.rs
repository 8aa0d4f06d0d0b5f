use crate::Pixel;

/// Number of slots in the color cache.
pub const CACHE_SIZE: usize = 64;

/// The 64-slot color cache ("color array") shared by the encoder and decoder.
///
/// Each pixel lives at [`Pixel::cache_index`]. Writing a pixel unconditionally replaces whatever
/// was stored in its slot, so both sides end up with the same contents as long as they call
/// [`update`](Self::update) for the same pixels in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCache {
    slots: [Pixel; CACHE_SIZE],
}

impl ColorCache {
    pub const fn new() -> Self {
        Self {
            slots: [Pixel::ZERO; CACHE_SIZE],
        }
    }

    /// Returns the pixel stored at `index`. Only the lowest 6 bits of `index` are used.
    #[inline]
    pub const fn lookup(&self, index: u8) -> Pixel {
        self.slots[(index & 0b0011_1111) as usize]
    }

    #[inline]
    pub fn update(&mut self, pixel: Pixel) {
        self.slots[usize::from(pixel.cache_index())] = pixel;
    }

    /// Returns the slot index of `pixel` if the cache currently holds it.
    #[inline]
    pub fn find(&self, pixel: Pixel) -> Option<u8> {
        let index = pixel.cache_index();
        (self.slots[usize::from(index)] == pixel).then_some(index)
    }
}

impl Default for ColorCache {
    fn default() -> Self {
        Self::new()
    }
}
