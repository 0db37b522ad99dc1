//! RGBA to luminance conversion.

use crate::image::{ColorImage, OwnedImage, COLOR_CHANNELS};
use crate::util::StereoMatchResult;

/// Converts one RGBA pixel to its 8-bit luminance.
///
/// The weighted sum is truncated toward zero, not rounded; alpha is
/// ignored.
#[inline]
pub(crate) fn luminance(r: u8, g: u8, b: u8) -> u8 {
    (r as f32 * 0.299 + g as f32 * 0.587 + b as f32 * 0.114) as u8
}

/// Converts an RGBA image to a single-channel grayscale image.
pub fn grayscale(src: &ColorImage) -> StereoMatchResult<OwnedImage> {
    let data = src.data();
    let mut out = Vec::with_capacity(src.width() * src.height());
    for px in data.chunks_exact(COLOR_CHANNELS) {
        out.push(luminance(px[0], px[1], px[2]));
    }
    OwnedImage::new(out, src.width(), src.height())
}

#[cfg(test)]
mod tests {
    use super::{grayscale, luminance};
    use crate::image::ColorImage;

    #[test]
    fn luminance_truncates_toward_zero() {
        // 0.299*10 + 0.587*20 + 0.114*30 = 18.15 -> 18
        assert_eq!(luminance(10, 20, 30), 18);
        assert_eq!(luminance(255, 255, 255), 255);
        assert_eq!(luminance(0, 0, 0), 0);
    }

    #[test]
    fn grayscale_ignores_alpha() {
        let opaque = ColorImage::new(vec![50, 100, 150, 255], 1, 1).unwrap();
        let clear = ColorImage::new(vec![50, 100, 150, 0], 1, 1).unwrap();
        assert_eq!(
            grayscale(&opaque).unwrap().data(),
            grayscale(&clear).unwrap().data()
        );
    }

    #[test]
    fn grayscale_output_matches_input_dimensions() {
        let src = ColorImage::new(vec![0u8; 6 * 4 * 4], 6, 4).unwrap();
        let gray = grayscale(&src).unwrap();
        assert_eq!(gray.width(), 6);
        assert_eq!(gray.height(), 4);
        assert_eq!(gray.data().len(), 24);
    }
}
