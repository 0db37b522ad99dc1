//! Nearest-nonzero-neighbor occlusion filling.

use crate::image::{DisparityMap, OwnedImage};
use crate::util::{StereoMatchError, StereoMatchResult};

/// Largest square-ring spread searched around an occluded pixel.
pub const DEFAULT_MAX_SPREAD: usize = 75;

/// Replaces zeroed pixels with the nearest non-zero neighbor value.
///
/// The search expands square rings of increasing spread, scanning each
/// ring's cells in row-major order, and always reads the input map, never
/// the partially filled output. If any pixel has no non-zero neighbor
/// within `max_spread`, the whole operation fails and no map is returned;
/// partial fills are never observable.
pub fn occlusion_fill(cross: &DisparityMap, max_spread: usize) -> StereoMatchResult<DisparityMap> {
    let width = cross.width();
    let height = cross.height();
    let data = cross.data();

    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let value = data[y * width + x];
            out[y * width + x] = if value != 0 {
                value
            } else {
                nearest_nonzero(data, width, height, x, y, max_spread).ok_or(
                    StereoMatchError::OcclusionFillExhausted { x, y, max_spread },
                )?
            };
        }
    }
    OwnedImage::new(out, width, height)
}

/// Finds the first non-zero value on expanding square rings around
/// `(x, y)`, visiting each ring in row-major order.
fn nearest_nonzero(
    data: &[u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    max_spread: usize,
) -> Option<u8> {
    let x = x as i64;
    let y = y as i64;
    for spread in 1..=max_spread as i64 {
        for ny in -spread..=spread {
            let on_y_edge = ny == -spread || ny == spread;
            for nx in -spread..=spread {
                // Interior cells were covered by smaller spreads.
                if !on_y_edge && nx != -spread && nx != spread {
                    continue;
                }
                let cy = y + ny;
                let cx = x + nx;
                if cy < 0 || cy >= height as i64 || cx < 0 || cx >= width as i64 {
                    continue;
                }
                let value = data[cy as usize * width + cx as usize];
                if value != 0 {
                    return Some(value);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{occlusion_fill, DEFAULT_MAX_SPREAD};
    use crate::image::OwnedImage;
    use crate::util::StereoMatchError;

    #[test]
    fn nonzero_pixels_pass_through() {
        let map = OwnedImage::new(vec![5, 6, 7, 8], 2, 2).unwrap();
        let out = occlusion_fill(&map, DEFAULT_MAX_SPREAD).unwrap();
        assert_eq!(out.data(), map.data());
    }

    #[test]
    fn zero_pixels_take_the_nearest_ring_value() {
        #[rustfmt::skip]
        let data = vec![
            0, 0, 0, 0,
            0, 0, 0, 9,
            0, 0, 0, 0,
        ];
        let map = OwnedImage::new(data, 4, 3).unwrap();
        let out = occlusion_fill(&map, DEFAULT_MAX_SPREAD).unwrap();
        assert!(out.data().iter().all(|&v| v == 9));
    }

    #[test]
    fn nearer_neighbor_wins_over_farther() {
        // (0,0) sees 3 at spread 1 and 9 at spread 2.
        #[rustfmt::skip]
        let data = vec![
            0, 3, 9,
            0, 0, 0,
            0, 0, 0,
        ];
        let map = OwnedImage::new(data, 3, 3).unwrap();
        let out = occlusion_fill(&map, DEFAULT_MAX_SPREAD).unwrap();
        assert_eq!(out.data()[0], 3);
    }

    #[test]
    fn exhausted_search_fails_the_whole_image() {
        let map = OwnedImage::new(vec![0u8; 9], 3, 3).unwrap();
        let err = occlusion_fill(&map, 2).err().unwrap();
        assert_eq!(
            err,
            StereoMatchError::OcclusionFillExhausted {
                x: 0,
                y: 0,
                max_spread: 2,
            }
        );
    }
}
