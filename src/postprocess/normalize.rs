//! Linear rescale of a disparity map to the full 8-bit range.

use crate::image::{DisparityMap, OwnedImage};
use crate::util::StereoMatchResult;

/// Rescales the map so the observed minimum maps to 0 and the maximum to
/// 255, with truncating integer arithmetic.
///
/// A constant map has no range to stretch; it normalizes to all zeros
/// rather than dividing by zero.
pub fn normalize(map: &DisparityMap) -> StereoMatchResult<DisparityMap> {
    let data = map.data();
    let min = data.iter().copied().min().unwrap_or(0);
    let max = data.iter().copied().max().unwrap_or(0);

    let out = if max == min {
        vec![0u8; data.len()]
    } else {
        let span = u32::from(max - min);
        data.iter()
            .map(|&v| (255 * u32::from(v - min) / span) as u8)
            .collect()
    };
    OwnedImage::new(out, map.width(), map.height())
}
