use crate::{Channels, Colorspace, Header, Pixel};
use alloc::vec::Vec;
use snafu::{ensure, OptionExt, Snafu};

#[derive(Debug, Snafu)]
#[snafu(module)]
pub enum ImageError {
    #[snafu(display(
        "Specified image dimensions don't match the number of pixels: {width} * {height} pixels, but {pixel_count} pixels were given"
    ))]
    InvalidDimensions {
        width: u32,
        height: u32,
        pixel_count: usize,
    },
    #[snafu(display("Image dimensions {width}x{height} exceed the decodable pixel count"))]
    TooLarge { width: u32, height: u32 },
    #[snafu(display("Raw buffer holds {actual} bytes, expected {expected}"))]
    InvalidRawLength { expected: usize, actual: usize },
    #[snafu(display("Pixel {index} of an RGB image has an alpha value other than 255"))]
    TranslucentRgbPixel { index: usize },
}

/// An owned, row-major image.
///
/// Always well formed: the pixel count equals `width * height`, and 3-channel images only
/// contain opaque pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    header: Header,
    pixels: Vec<Pixel>,
}

impl Image {
    pub fn new(
        width: u32,
        height: u32,
        channels: Channels,
        colorspace: Colorspace,
        pixels: Vec<Pixel>,
    ) -> Result<Self, ImageError> {
        let header = Header {
            width,
            height,
            channels,
            colorspace,
        };
        ensure!(
            header.checked_pixel_count().is_some(),
            image_error::TooLargeSnafu { width, height }
        );

        ensure!(
            u64::from(width) * u64::from(height) == pixels.len() as u64,
            image_error::InvalidDimensionsSnafu {
                width,
                height,
                pixel_count: pixels.len()
            }
        );

        if channels == Channels::Rgb {
            if let Some(index) = pixels.iter().position(|p| p.a != 255) {
                return image_error::TranslucentRgbPixelSnafu { index }.fail();
            }
        }

        Ok(Self { header, pixels })
    }

    /// Builds an image from interleaved `RGB` or `RGBA` bytes, depending on `channels`.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: Channels,
        colorspace: Colorspace,
        raw: &[u8],
    ) -> Result<Self, ImageError> {
        let pixel_count = Header {
            width,
            height,
            channels,
            colorspace,
        }
        .checked_pixel_count()
        .context(image_error::TooLargeSnafu { width, height })?;
        let expected = pixel_count * channels.count();
        ensure!(
            raw.len() == expected,
            image_error::InvalidRawLengthSnafu {
                expected,
                actual: raw.len()
            }
        );

        let pixels = match channels {
            Channels::Rgb => raw
                .chunks_exact(3)
                .map(|p| Pixel::rgb(p[0], p[1], p[2]))
                .collect(),
            Channels::Rgba => raw
                .chunks_exact(4)
                .map(|p| Pixel::new(p[0], p[1], p[2], p[3]))
                .collect(),
        };

        Self::new(width, height, channels, colorspace, pixels)
    }

    /// Assembles a decoded image. `pixels` must already have `header.pixel_count()` entries.
    pub(crate) fn from_parts(header: Header, pixels: Vec<Pixel>) -> Self {
        debug_assert_eq!(pixels.len(), header.pixel_count());
        Self { header, pixels }
    }

    /// Interleaved `RGB` or `RGBA` bytes, depending on the channel count.
    pub fn to_raw(&self) -> Vec<u8> {
        let mut raw = Vec::with_capacity(self.pixels.len() * self.header.channels.count());
        match self.header.channels {
            Channels::Rgb => {
                for pixel in &self.pixels {
                    raw.extend_from_slice(&pixel.to_rgb());
                }
            }
            Channels::Rgba => {
                for pixel in &self.pixels {
                    raw.extend_from_slice(&pixel.to_rgba());
                }
            }
        }
        raw
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.header.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.header.height
    }

    #[inline]
    pub fn channels(&self) -> Channels {
        self.header.channels
    }

    #[inline]
    pub fn colorspace(&self) -> Colorspace {
        self.header.colorspace
    }

    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    #[inline]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    #[inline]
    pub fn into_pixels(self) -> Vec<Pixel> {
        self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PIXELS_MAX;
    use alloc::vec;

    #[test]
    fn dimensions_must_match() {
        let err = Image::new(
            2,
            2,
            Channels::Rgba,
            Colorspace::Srgb,
            vec![Pixel::ZERO; 3],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ImageError::InvalidDimensions { pixel_count: 3, .. }
        ));
    }

    #[test]
    fn rgb_images_are_opaque() {
        let pixels = vec![Pixel::rgb(1, 2, 3), Pixel::new(1, 2, 3, 4)];
        assert!(matches!(
            Image::new(2, 1, Channels::Rgb, Colorspace::Srgb, pixels.clone()),
            Err(ImageError::TranslucentRgbPixel { index: 1 })
        ));
        assert!(Image::new(2, 1, Channels::Rgba, Colorspace::Srgb, pixels).is_ok());
    }

    #[test]
    fn raw_conversion() {
        let raw = [1, 2, 3, 4, 5, 6];
        let image = Image::from_raw(2, 1, Channels::Rgb, Colorspace::Linear, &raw).unwrap();
        assert_eq!(image.pixels(), &[Pixel::rgb(1, 2, 3), Pixel::rgb(4, 5, 6)]);
        assert_eq!(image.to_raw(), raw);

        assert!(matches!(
            Image::from_raw(2, 1, Channels::Rgba, Colorspace::Srgb, &raw),
            Err(ImageError::InvalidRawLength {
                expected: 8,
                actual: 6
            })
        ));
    }

    #[test]
    fn undecodable_sizes_are_rejected() {
        let width = PIXELS_MAX as u32 + 1;
        assert!(matches!(
            Image::new(width, 1, Channels::Rgb, Colorspace::Srgb, Vec::new()),
            Err(ImageError::TooLarge { height: 1, .. })
        ));
        assert!(matches!(
            Image::from_raw(u32::MAX, u32::MAX, Channels::Rgba, Colorspace::Srgb, &[]),
            Err(ImageError::TooLarge { .. })
        ));

        // the largest decodable size is still accepted up to the pixel count check
        assert!(matches!(
            Image::new(PIXELS_MAX as u32, 1, Channels::Rgb, Colorspace::Srgb, Vec::new()),
            Err(ImageError::InvalidDimensions { pixel_count: 0, .. })
        ));
    }

    #[test]
    fn empty_image() {
        let image = Image::new(0, 0, Channels::Rgba, Colorspace::Srgb, Vec::new()).unwrap();
        assert!(image.pixels().is_empty());
        assert!(image.to_raw().is_empty());
    }
}
