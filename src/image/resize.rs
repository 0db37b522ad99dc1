//! Nearest-neighbor decimation.
//!
//! Downscaling drops samples at regular intervals; there is no filtering or
//! interpolation, so the operation is deterministic and preserves exact
//! channel values.

use crate::image::{ColorImage, COLOR_CHANNELS};
use crate::util::{StereoMatchError, StereoMatchResult};

/// Decimates `src` by an integer factor.
///
/// The output is `floor(w/factor) x floor(h/factor)`; output pixel `(x, y)`
/// copies source pixel `(x*w/new_w, y*h/new_h)` with truncating division,
/// all four channels unchanged. Fails when the target would be empty.
pub fn decimate(src: &ColorImage, factor: u32) -> StereoMatchResult<ColorImage> {
    let width = src.width();
    let height = src.height();
    let degenerate = StereoMatchError::DegenerateResize {
        width,
        height,
        factor,
    };
    if factor == 0 {
        return Err(degenerate);
    }

    let new_width = width / factor as usize;
    let new_height = height / factor as usize;
    if new_width == 0 || new_height == 0 {
        return Err(degenerate);
    }

    let data = src.data();
    let mut out = vec![0u8; new_width * new_height * COLOR_CHANNELS];
    for y in 0..new_height {
        let src_y = y * height / new_height;
        for x in 0..new_width {
            let src_x = x * width / new_width;
            let src_idx = (src_y * width + src_x) * COLOR_CHANNELS;
            let dst_idx = (y * new_width + x) * COLOR_CHANNELS;
            out[dst_idx..dst_idx + COLOR_CHANNELS]
                .copy_from_slice(&data[src_idx..src_idx + COLOR_CHANNELS]);
        }
    }

    ColorImage::new(out, new_width, new_height)
}

#[cfg(test)]
mod tests {
    use super::decimate;
    use crate::image::{ColorImage, COLOR_CHANNELS};
    use crate::util::StereoMatchError;

    fn ramp_image(width: usize, height: usize) -> ColorImage {
        let mut data = Vec::with_capacity(width * height * COLOR_CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, (x + y) as u8, 255]);
            }
        }
        ColorImage::new(data, width, height).unwrap()
    }

    #[test]
    fn decimate_halves_dimensions() {
        let src = ramp_image(8, 6);
        let out = decimate(&src, 2).unwrap();
        assert_eq!(out.width(), 4);
        assert_eq!(out.height(), 3);
        // Output (2, 1) maps back to source (4, 2) for an exact factor.
        let idx = (4 + 2) * COLOR_CHANNELS;
        assert_eq!(&out.data()[idx..idx + COLOR_CHANNELS], &[4, 2, 6, 255]);
    }

    #[test]
    fn decimate_truncates_odd_dimensions() {
        let src = ramp_image(9, 7);
        let out = decimate(&src, 4).unwrap();
        assert_eq!(out.width(), 2);
        assert_eq!(out.height(), 1);
    }

    #[test]
    fn decimate_rejects_degenerate_factor() {
        let src = ramp_image(3, 3);
        let err = decimate(&src, 4).err().unwrap();
        assert_eq!(
            err,
            StereoMatchError::DegenerateResize {
                width: 3,
                height: 3,
                factor: 4,
            }
        );
        assert!(decimate(&src, 0).is_err());
    }
}
