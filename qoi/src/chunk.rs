//! The chunk grammar: one tagged unit of the encoded stream.

use crate::{cache::ColorCache, consts::*, Pixel};
use core::ops::Deref;

/// A single decoded chunk, with its payload already unbiased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk {
    /// Re-emit the pixel stored at this color cache slot (`0..64`).
    Index(u8),
    /// Small r/g/b differences to the previous pixel, each in `-2..=1`.
    Diff { dr: i8, dg: i8, db: i8 },
    /// Green difference in `-32..=31`, and red/blue differences relative to it in `-8..=7`.
    Luma { dg: i8, dr_dg: i8, db_dg: i8 },
    /// Repeat the previous pixel this many times (`1..=62`).
    Run(u8),
    /// Literal r/g/b, alpha taken from the previous pixel.
    Rgb([u8; 3]),
    /// Literal r/g/b/a.
    Rgba(Pixel),
}

/// The serialized form of a [`Chunk`], 1 to 5 bytes long.
#[derive(Debug, Clone, Copy)]
pub struct ChunkBytes {
    buf: [u8; MAX_CHUNK_SIZE],
    len: u8,
}

impl Deref for ChunkBytes {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        &self.buf[..usize::from(self.len)]
    }
}

impl Chunk {
    /// Picks the chunk used to move from `prev` to a differing `pixel`, in format precedence
    /// order: INDEX, DIFF, LUMA, RGB, RGBA.
    ///
    /// Runs are not considered here, the caller handles `pixel == prev`.
    #[inline]
    pub fn select(prev: Pixel, pixel: Pixel, cache: &ColorCache) -> Chunk {
        if let Some(index) = cache.find(pixel) {
            return Chunk::Index(index);
        }

        if pixel.a != prev.a {
            return Chunk::Rgba(pixel);
        }

        let [dr, dg, db] = pixel.rgb_diff(prev);
        if matches!((dr, dg, db), (-2..=1, -2..=1, -2..=1)) {
            return Chunk::Diff { dr, dg, db };
        }

        let dr_dg = dr.wrapping_sub(dg);
        let db_dg = db.wrapping_sub(dg);
        if matches!((dr_dg, dg, db_dg), (-8..=7, -32..=31, -8..=7)) {
            return Chunk::Luma { dg, dr_dg, db_dg };
        }

        Chunk::Rgb(pixel.to_rgb())
    }

    /// Number of bytes a chunk starting with `tag` occupies, tag included.
    #[inline]
    pub const fn size_for_tag(tag: u8) -> usize {
        match tag {
            QOI_OP_RGB => 4,
            QOI_OP_RGBA => 5,
            _ if tag & QOI_MASK_2 == QOI_OP_LUMA => 2,
            _ => 1,
        }
    }

    #[inline]
    pub const fn size(&self) -> usize {
        match self {
            Chunk::Index(_) | Chunk::Diff { .. } | Chunk::Run(_) => 1,
            Chunk::Luma { .. } => 2,
            Chunk::Rgb(_) => 4,
            Chunk::Rgba(_) => 5,
        }
    }

    /// Serializes the chunk.
    ///
    /// Payloads outside the ranges documented on each variant are truncated to their bit width,
    /// and runs are clamped to `1..=62`, so the tag always matches the variant.
    pub fn to_bytes(self) -> ChunkBytes {
        let mut buf = [0; MAX_CHUNK_SIZE];
        match self {
            Chunk::Index(index) => {
                buf[0] = QOI_OP_INDEX | (index & 0b0011_1111);
            }
            Chunk::Diff { dr, dg, db } => {
                let bias = |d: i8| d.wrapping_add(2) as u8 & 0b11;
                buf[0] = QOI_OP_DIFF | bias(dr) << 4 | bias(dg) << 2 | bias(db);
            }
            Chunk::Luma { dg, dr_dg, db_dg } => {
                let bias = |d: i8| d.wrapping_add(8) as u8 & 0b1111;
                buf[0] = QOI_OP_LUMA | (dg.wrapping_add(32) as u8 & 0b0011_1111);
                buf[1] = bias(dr_dg) << 4 | bias(db_dg);
            }
            Chunk::Run(run) => {
                buf[0] = QOI_OP_RUN | (run.clamp(1, MAX_RUN) - 1);
            }
            Chunk::Rgb([r, g, b]) => {
                buf[..4].copy_from_slice(&[QOI_OP_RGB, r, g, b]);
            }
            Chunk::Rgba(pixel) => {
                buf[0] = QOI_OP_RGBA;
                buf[1..5].copy_from_slice(&pixel.to_rgba());
            }
        }

        ChunkBytes {
            buf,
            len: self.size() as u8,
        }
    }

    /// Parses the chunk at the start of `data`, returning it along with its size in bytes.
    ///
    /// Returns `None` if `data` is empty or ends in the middle of the chunk.
    pub fn parse(data: &[u8]) -> Option<(Chunk, usize)> {
        let &tag = data.first()?;
        let size = Chunk::size_for_tag(tag);
        let bytes = data.get(..size)?;

        // the literal tags overlap the RUN tag, so they are matched first
        let chunk = match tag {
            QOI_OP_RGB => Chunk::Rgb([bytes[1], bytes[2], bytes[3]]),
            QOI_OP_RGBA => Chunk::Rgba(Pixel::new(bytes[1], bytes[2], bytes[3], bytes[4])),
            _ => match tag & QOI_MASK_2 {
                QOI_OP_INDEX => Chunk::Index(tag & 0b0011_1111),
                QOI_OP_DIFF => Chunk::Diff {
                    dr: ((tag >> 4) & 0b11) as i8 - 2,
                    dg: ((tag >> 2) & 0b11) as i8 - 2,
                    db: (tag & 0b11) as i8 - 2,
                },
                QOI_OP_LUMA => Chunk::Luma {
                    dg: (tag & 0b0011_1111) as i8 - 32,
                    dr_dg: (bytes[1] >> 4) as i8 - 8,
                    db_dg: (bytes[1] & 0b1111) as i8 - 8,
                },
                QOI_OP_RUN => Chunk::Run((tag & 0b0011_1111) + 1),
                _ => unreachable!("2-bit tag out of range"),
            },
        };

        Some((chunk, size))
    }

    /// Computes the pixel this chunk stands for, given the previous pixel and the cache.
    ///
    /// For [`Chunk::Run`] this is the previous pixel, repeated by the caller.
    #[inline]
    pub fn apply(self, prev: Pixel, cache: &ColorCache) -> Pixel {
        match self {
            Chunk::Index(index) => cache.lookup(index),
            Chunk::Diff { dr, dg, db } => prev.apply_diff([dr, dg, db]),
            Chunk::Luma { dg, dr_dg, db_dg } => {
                prev.apply_diff([dg.wrapping_add(dr_dg), dg, dg.wrapping_add(db_dg)])
            }
            Chunk::Run(_) => prev,
            Chunk::Rgb([r, g, b]) => Pixel::new(r, g, b, prev.a),
            Chunk::Rgba(pixel) => pixel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_byte_is_classified() {
        for tag in 0..=u8::MAX {
            let mut data = [0u8; MAX_CHUNK_SIZE];
            data[0] = tag;
            let (chunk, size) = Chunk::parse(&data).unwrap();
            assert_eq!(size, Chunk::size_for_tag(tag));
            assert_eq!(chunk.size(), size);
            assert_eq!(chunk.to_bytes()[0], tag, "{chunk:?}");
        }
    }

    #[test]
    fn run_never_uses_literal_tags() {
        assert_eq!(Chunk::Run(62).to_bytes()[..], [0xFD]);
        assert_eq!(Chunk::Run(1).to_bytes()[..], [0xC0]);
        assert_eq!(Chunk::parse(&[0xFD]), Some((Chunk::Run(62), 1)));
    }

    #[test]
    fn out_of_range_payloads_keep_their_tag() {
        let diff = Chunk::Diff {
            dr: 127,
            dg: -128,
            db: 5,
        };
        assert_eq!(diff.to_bytes()[0] & QOI_MASK_2, QOI_OP_DIFF);

        let luma = Chunk::Luma {
            dg: 100,
            dr_dg: -100,
            db_dg: 127,
        };
        let bytes = luma.to_bytes();
        assert_eq!(bytes.len(), 2);
        assert_eq!(bytes[0] & QOI_MASK_2, QOI_OP_LUMA);

        assert_eq!(Chunk::Index(200).to_bytes()[..], [QOI_OP_INDEX | (200 & 0x3F)]);
        assert_eq!(Chunk::Run(0).to_bytes()[..], [0xC0]);
        assert_eq!(Chunk::Run(63).to_bytes()[..], [0xFD]);
        assert_eq!(Chunk::Run(u8::MAX).to_bytes()[..], [0xFD]);
    }

    #[test]
    fn literal_tags_need_payload() {
        assert_eq!(Chunk::parse(&[QOI_OP_RGB, 1, 2]), None);
        assert_eq!(Chunk::parse(&[QOI_OP_RGBA, 1, 2, 3]), None);
        assert_eq!(Chunk::parse(&[QOI_OP_LUMA]), None);
        assert_eq!(Chunk::parse(&[]), None);
    }

    #[test]
    fn selection_order() {
        let cache = ColorCache::new();
        let prev = Pixel::rgb(100, 100, 100);

        assert_eq!(
            Chunk::select(prev, Pixel::rgb(101, 99, 100), &cache),
            Chunk::Diff {
                dr: 1,
                dg: -1,
                db: 0
            }
        );
        assert_eq!(
            Chunk::select(prev, Pixel::rgb(115, 120, 118), &cache),
            Chunk::Luma {
                dg: 20,
                dr_dg: -5,
                db_dg: -2
            }
        );
        // dr - dg == -10 is out of LUMA range
        assert_eq!(
            Chunk::select(prev, Pixel::rgb(110, 120, 125), &cache),
            Chunk::Rgb([110, 120, 125])
        );
        assert_eq!(
            Chunk::select(prev, Pixel::rgb(0, 200, 50), &cache),
            Chunk::Rgb([0, 200, 50])
        );
        assert_eq!(
            Chunk::select(prev, Pixel::new(101, 99, 100, 0), &cache),
            Chunk::Rgba(Pixel::new(101, 99, 100, 0))
        );

        let mut cache = cache;
        cache.update(Pixel::rgb(101, 99, 100));
        assert_eq!(
            Chunk::select(prev, Pixel::rgb(101, 99, 100), &cache),
            Chunk::Index(Pixel::rgb(101, 99, 100).cache_index())
        );
    }

    #[test]
    fn luma_edges() {
        let cache = ColorCache::new();
        let prev = Pixel::rgb(128, 128, 128);
        let pixel = Pixel::rgb(128 - 32 - 8, 128 - 32, 128 - 32 + 7);
        let chunk = Chunk::select(prev, pixel, &cache);
        assert_eq!(
            chunk,
            Chunk::Luma {
                dg: -32,
                dr_dg: -8,
                db_dg: 7
            }
        );
        assert_eq!(chunk.to_bytes()[..], [0x80, 0x0F]);
        let (parsed, _) = Chunk::parse(&chunk.to_bytes()).unwrap();
        assert_eq!(parsed.apply(prev, &cache), pixel);
    }
}
