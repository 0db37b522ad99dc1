//! Image buffers and pixel-level stages.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit
//! stride; the stride counts elements between the starts of consecutive
//! rows. `OwnedImage` is the owned single-channel counterpart used for
//! grayscale images and disparity maps, and `ColorImage` holds interleaved
//! RGBA input straight from the codec. Each pipeline stage produces a new
//! owned buffer; inputs are only ever read.

use crate::util::{StereoMatchError, StereoMatchResult};

pub mod gray;
pub mod resize;

#[cfg(feature = "image-io")]
pub mod io;

/// Number of interleaved channels in a [`ColorImage`].
pub const COLOR_CHANNELS: usize = 4;

/// Borrowed 2D single-channel view with an explicit stride.
#[derive(Copy, Clone)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> StereoMatchResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(
        data: &'a [T],
        width: usize,
        height: usize,
        stride: usize,
    ) -> StereoMatchResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(StereoMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }
}

impl ImageView<'_, u8> {
    /// Returns the sample at `(x, y)` treating signed coordinates as a
    /// boundary test, the access pattern of the matching window loops.
    #[inline]
    pub(crate) fn sample(&self, x: i64, y: i64) -> Option<u8> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.data[y as usize * self.stride + x as usize])
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> StereoMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(StereoMatchError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(StereoMatchError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(StereoMatchError::InvalidDimensions { width, height })?;
    Ok(needed)
}

/// Owned contiguous single-channel u8 image.
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

/// Disparity maps are single-channel images: `[0, max_disparity]` right
/// after matching, `[0, 255]` after normalization.
pub type DisparityMap = OwnedImage;

impl OwnedImage {
    /// Creates an owned image, taking ownership of `data`.
    ///
    /// The buffer length must be exactly `width * height`.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> StereoMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(StereoMatchError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(StereoMatchError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(StereoMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(StereoMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Single-channel images always report one channel.
    pub fn channels(&self) -> usize {
        1
    }

    /// Returns the raw pixel data, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the image and returns the backing buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

/// Owned interleaved RGBA image, the codec-facing input type.
pub struct ColorImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl ColorImage {
    /// Creates a color image from interleaved RGBA bytes.
    ///
    /// The buffer length must be exactly `width * height * 4`.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> StereoMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(StereoMatchError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(COLOR_CHANNELS))
            .ok_or(StereoMatchError::InvalidDimensions { width, height })?;
        if data.len() != needed {
            return Err(StereoMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Color images always report four interleaved channels.
    pub fn channels(&self) -> usize {
        COLOR_CHANNELS
    }

    /// Returns the raw interleaved RGBA data, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
