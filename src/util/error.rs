//! Error types for stereomatch.

use thiserror::Error;

/// Result alias for stereomatch operations.
pub type StereoMatchResult<T> = std::result::Result<T, StereoMatchError>;

/// Errors that can occur while building buffers or running pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StereoMatchError {
    /// An image dimension is zero or overflows the address space.
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The row stride is smaller than the image width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// The backing buffer is too small for the requested dimensions.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// The two inputs of a binary stage have different dimensions.
    #[error("dimension mismatch: left {left_width}x{left_height}, right {right_width}x{right_height}")]
    DimensionMismatch {
        left_width: usize,
        left_height: usize,
        right_width: usize,
        right_height: usize,
    },
    /// A matching window dimension is zero.
    #[error("invalid matching window: {height}x{width}")]
    InvalidWindow { height: usize, width: usize },
    /// The disparity range is empty or exceeds the 8-bit map domain.
    #[error("invalid disparity range: [{min}, {max})")]
    InvalidDisparityRange { min: i32, max: i32 },
    /// Decimation would produce an empty image.
    #[error("decimation by {factor} of a {width}x{height} image is degenerate")]
    DegenerateResize {
        width: usize,
        height: usize,
        factor: u32,
    },
    /// No non-zero neighbor was found within the maximum search spread.
    ///
    /// The whole fill operation fails; partially filled maps are never
    /// returned.
    #[error("occlusion fill found no non-zero neighbor for ({x}, {y}) within spread {max_spread}")]
    OcclusionFillExhausted {
        x: usize,
        y: usize,
        max_spread: usize,
    },
    /// Decoding or encoding an image file failed.
    #[error("image i/o failed: {reason}")]
    ImageIo { reason: String },
    /// An execution backend failed (device unavailable, build error, ...).
    #[error("backend failure: {reason}")]
    Backend { reason: String },
}
