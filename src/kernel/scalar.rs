//! Sequential baseline backend.

use crate::image::{DisparityMap, ImageView, OwnedImage};
use crate::kernel::{best_disparity_at, check_inputs, DisparityParams, ExecutionBackend};
use crate::util::StereoMatchResult;

/// Single-threaded nested-loop backend, the correctness baseline the
/// parallel backends are checked against.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialBackend;

impl ExecutionBackend for SequentialBackend {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn compute_disparity(
        &self,
        left: ImageView<'_, u8>,
        right: ImageView<'_, u8>,
        params: &DisparityParams,
    ) -> StereoMatchResult<DisparityMap> {
        let (width, height) = check_inputs(left, right, params)?;
        let mut out = vec![0u8; width * height];
        for y in 0..height {
            let row = &mut out[y * width..(y + 1) * width];
            for (x, px) in row.iter_mut().enumerate() {
                *px = best_disparity_at(left, right, x, y, params);
            }
        }
        OwnedImage::new(out, width, height)
    }
}
