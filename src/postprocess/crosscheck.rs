//! Consistency check between two disparity maps.

use crate::image::{DisparityMap, OwnedImage};
use crate::util::{StereoMatchError, StereoMatchResult};

/// Cross-checks the two passes of the disparity engine.
///
/// A pixel whose maps disagree by more than `threshold` is zeroed (marking
/// it for occlusion filling); otherwise the value of `right` is kept.
pub fn cross_check(
    left: &DisparityMap,
    right: &DisparityMap,
    threshold: u8,
) -> StereoMatchResult<DisparityMap> {
    if left.width() != right.width() || left.height() != right.height() {
        return Err(StereoMatchError::DimensionMismatch {
            left_width: left.width(),
            left_height: left.height(),
            right_width: right.width(),
            right_height: right.height(),
        });
    }

    let out = left
        .data()
        .iter()
        .zip(right.data())
        .map(|(&l, &r)| {
            let diff = (i16::from(l) - i16::from(r)).unsigned_abs();
            if diff > u16::from(threshold) {
                0
            } else {
                r
            }
        })
        .collect();
    OwnedImage::new(out, left.width(), left.height())
}

#[cfg(test)]
mod tests {
    use super::cross_check;
    use crate::image::OwnedImage;

    #[test]
    fn checking_a_map_against_itself_is_identity() {
        let map = OwnedImage::new(vec![0, 3, 7, 255], 2, 2).unwrap();
        let out = cross_check(&map, &map, 0).unwrap();
        assert_eq!(out.data(), map.data());
    }

    #[test]
    fn disagreements_beyond_threshold_are_zeroed() {
        let left = OwnedImage::new(vec![10, 10, 10], 3, 1).unwrap();
        let right = OwnedImage::new(vec![10, 13, 14], 3, 1).unwrap();
        let out = cross_check(&left, &right, 3).unwrap();
        // |10-13| = 3 passes, |10-14| = 4 does not.
        assert_eq!(out.data(), &[10, 13, 0]);
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let left = OwnedImage::new(vec![0; 4], 2, 2).unwrap();
        let right = OwnedImage::new(vec![0; 6], 3, 2).unwrap();
        assert!(cross_check(&left, &right, 0).is_err());
    }
}
