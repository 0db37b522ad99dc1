//! Disparity kernels and execution backends.
//!
//! The per-pixel ZNCC search in [`best_disparity_at`] is the single
//! correctness-critical routine of the crate. Every CPU backend evaluates
//! it unchanged over the output grid, which is what makes their disparity
//! maps byte-identical; the backends differ only in how the grid is
//! partitioned across workers.

use crate::image::{ColorImage, DisparityMap, ImageView, OwnedImage};
use crate::util::{StereoMatchError, StereoMatchResult};

pub mod scalar;
pub mod threads;

#[cfg(feature = "rayon")]
pub mod rayon;

#[cfg(feature = "opencl")]
pub mod opencl;

/// Matching neighborhood dimensions.
///
/// Offsets run over `[-height/2, height/2)` and `[-width/2, width/2)` with
/// truncating division, so even window dimensions produce an asymmetric
/// neighborhood.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSpec {
    pub height: usize,
    pub width: usize,
}

impl WindowSpec {
    /// Total nominal sample count, used as the fixed mean divisor.
    pub fn area(&self) -> usize {
        self.height * self.width
    }
}

/// Half-open candidate disparity interval `[min, max)`.
///
/// A left-as-reference pass uses non-negative disparities; the
/// right-as-reference pass uses the negated interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisparityRange {
    pub min: i32,
    pub max: i32,
}

impl DisparityRange {
    /// Returns the interval searched when the other image is the reference.
    pub fn negated(&self) -> Self {
        Self {
            min: -self.max,
            max: -self.min,
        }
    }
}

/// Full parameter set for one disparity-map computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisparityParams {
    pub window: WindowSpec,
    pub range: DisparityRange,
}

impl DisparityParams {
    /// Validates the window and range.
    ///
    /// Disparity magnitudes are capped at 255 so `abs(best)` always fits
    /// the 8-bit map.
    pub fn validate(&self) -> StereoMatchResult<()> {
        if self.window.height == 0 || self.window.width == 0 {
            return Err(StereoMatchError::InvalidWindow {
                height: self.window.height,
                width: self.window.width,
            });
        }
        if self.range.min >= self.range.max || self.range.min < -255 || self.range.max > 255 {
            return Err(StereoMatchError::InvalidDisparityRange {
                min: self.range.min,
                max: self.range.max,
            });
        }
        Ok(())
    }
}

/// Strategy interface over the compute-heavy per-pixel stages.
///
/// Implementations must be pure functions of their inputs: identical
/// images and parameters produce identical maps regardless of how the
/// work is scheduled.
pub trait ExecutionBackend {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Computes a disparity map for `left` against `right`.
    fn compute_disparity(
        &self,
        left: ImageView<'_, u8>,
        right: ImageView<'_, u8>,
        params: &DisparityParams,
    ) -> StereoMatchResult<DisparityMap>;

    /// Converts an RGBA image to grayscale.
    ///
    /// The default is the sequential loop; parallel backends may override.
    fn grayscale(&self, src: &ColorImage) -> StereoMatchResult<OwnedImage> {
        crate::image::gray::grayscale(src)
    }
}

/// Validates parameters and input pairing, returning the shared dimensions.
pub(crate) fn check_inputs(
    left: ImageView<'_, u8>,
    right: ImageView<'_, u8>,
    params: &DisparityParams,
) -> StereoMatchResult<(usize, usize)> {
    params.validate()?;
    if left.width() != right.width() || left.height() != right.height() {
        return Err(StereoMatchError::DimensionMismatch {
            left_width: left.width(),
            left_height: left.height(),
            right_width: right.width(),
            right_height: right.height(),
        });
    }
    Ok((left.width(), left.height()))
}

/// Runs the full disparity search for one output pixel.
///
/// For every candidate `d` the window is scanned twice, first for the two
/// window means and then for the correlation sums. A sample is skipped
/// whenever its coordinate (including the disparity-shifted x) leaves the
/// image, but the mean divisor stays the full nominal window area. A zero
/// ZNCC denominator yields a non-finite score and the candidate is
/// rejected, so flat windows never update the running best and the
/// default `range.max` survives.
pub(crate) fn best_disparity_at(
    left: ImageView<'_, u8>,
    right: ImageView<'_, u8>,
    x: usize,
    y: usize,
    params: &DisparityParams,
) -> u8 {
    let x = x as i64;
    let y = y as i64;
    let win_h = params.window.height as i64;
    let win_w = params.window.width as i64;
    let window_size = params.window.area() as f32;

    let mut max_corr = -1.0f32;
    let mut best = params.range.max;

    for d in params.range.min..params.range.max {
        let shift = d as i64;

        let mut left_sum = 0.0f32;
        let mut right_sum = 0.0f32;
        for wy in -win_h / 2..win_h / 2 {
            for wx in -win_w / 2..win_w / 2 {
                if let (Some(l), Some(r)) = (
                    left.sample(x + wx, y + wy),
                    right.sample(x + wx - shift, y + wy),
                ) {
                    left_sum += f32::from(l);
                    right_sum += f32::from(r);
                }
            }
        }
        let left_mean = left_sum / window_size;
        let right_mean = right_sum / window_size;

        let mut upper = 0.0f32;
        let mut lower_left = 0.0f32;
        let mut lower_right = 0.0f32;
        for wy in -win_h / 2..win_h / 2 {
            for wx in -win_w / 2..win_w / 2 {
                if let (Some(l), Some(r)) = (
                    left.sample(x + wx, y + wy),
                    right.sample(x + wx - shift, y + wy),
                ) {
                    let left_diff = f32::from(l) - left_mean;
                    let right_diff = f32::from(r) - right_mean;
                    lower_left += left_diff * left_diff;
                    lower_right += right_diff * right_diff;
                    upper += left_diff * right_diff;
                }
            }
        }

        let denom = lower_left.sqrt() * lower_right.sqrt();
        let zncc = upper / denom;
        if zncc.is_finite() && zncc > max_corr {
            max_corr = zncc;
            best = d;
        }
    }

    best.unsigned_abs() as u8
}

#[cfg(test)]
mod tests {
    use super::{best_disparity_at, DisparityParams, DisparityRange, WindowSpec};
    use crate::image::ImageView;
    use crate::util::StereoMatchError;

    fn params(window: (usize, usize), range: (i32, i32)) -> DisparityParams {
        DisparityParams {
            window: WindowSpec {
                height: window.0,
                width: window.1,
            },
            range: DisparityRange {
                min: range.0,
                max: range.1,
            },
        }
    }

    #[test]
    fn validate_rejects_bad_window_and_range() {
        let err = params((0, 3), (0, 5)).validate().err().unwrap();
        assert_eq!(err, StereoMatchError::InvalidWindow { height: 0, width: 3 });

        let err = params((3, 3), (5, 5)).validate().err().unwrap();
        assert_eq!(err, StereoMatchError::InvalidDisparityRange { min: 5, max: 5 });

        let err = params((3, 3), (0, 300)).validate().err().unwrap();
        assert_eq!(err, StereoMatchError::InvalidDisparityRange { min: 0, max: 300 });

        assert!(params((3, 3), (-255, 255)).validate().is_ok());
    }

    #[test]
    fn negated_range_mirrors_the_interval() {
        let range = DisparityRange { min: 0, max: 65 };
        assert_eq!(range.negated(), DisparityRange { min: -65, max: 0 });
    }

    #[test]
    fn all_black_input_reports_the_range_upper_bound() {
        // Zero-intensity windows are the truly degenerate case: every sum
        // is zero, every score non-finite, and the default survives.
        let black = vec![0u8; 8 * 8];
        let view = ImageView::from_slice(&black, 8, 8).unwrap();
        let p = params((3, 3), (0, 5));
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(best_disparity_at(view, view, x, y, &p), 5);
            }
        }
    }

    #[test]
    fn self_match_prefers_zero_disparity() {
        let mut data = vec![0u8; 16 * 16];
        for y in 0..16 {
            for x in 0..16 {
                data[y * 16 + x] = ((x * 13) ^ (y * 7) ^ (x * y)) as u8;
            }
        }
        let view = ImageView::from_slice(&data, 16, 16).unwrap();
        let p = params((5, 5), (0, 5));
        // Interior pixels with textured windows self-match at d = 0.
        for y in 4..12 {
            for x in 4..12 {
                assert_eq!(best_disparity_at(view, view, x, y, &p), 0);
            }
        }
    }
}
