//! Convenience helpers for loading and saving images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. The codec is treated
//! purely as a byte-buffer boundary: RGBA in, 8-bit grayscale out.

use crate::image::{ColorImage, OwnedImage};
use crate::util::{StereoMatchError, StereoMatchResult};
use std::path::Path;

fn io_err(err: impl std::fmt::Display) -> StereoMatchError {
    StereoMatchError::ImageIo {
        reason: err.to_string(),
    }
}

/// Loads an image from disk and converts it to interleaved RGBA.
pub fn load_color_image<P: AsRef<Path>>(path: P) -> StereoMatchResult<ColorImage> {
    let img = image::open(path).map_err(io_err)?;
    let rgba = img.to_rgba8();
    let width = rgba.width() as usize;
    let height = rgba.height() as usize;
    ColorImage::new(rgba.into_raw(), width, height)
}

/// Saves a single-channel image as an 8-bit grayscale file.
///
/// The format is inferred from the file extension by the `image` crate.
pub fn save_gray_image<P: AsRef<Path>>(path: P, img: &OwnedImage) -> StereoMatchResult<()> {
    let buffer = image::GrayImage::from_raw(
        img.width() as u32,
        img.height() as u32,
        img.data().to_vec(),
    )
    .ok_or(StereoMatchError::BufferTooSmall {
        needed: img.width() * img.height(),
        got: img.data().len(),
    })?;
    buffer.save(path).map_err(io_err)
}
