//! Rayon data-parallel backend (feature-gated).
//!
//! The outer row loop is parallelized; all window accumulators live in the
//! per-pixel routine's stack frame, so nothing is shared across rows
//! except the read-only input views.

use crate::image::{ColorImage, DisparityMap, ImageView, OwnedImage, COLOR_CHANNELS};
use crate::kernel::{best_disparity_at, check_inputs, DisparityParams, ExecutionBackend};
use crate::util::StereoMatchResult;
use rayon::prelude::*;

/// Row-parallel backend on the rayon worker pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct DataParallelBackend;

impl ExecutionBackend for DataParallelBackend {
    fn name(&self) -> &'static str {
        "data_parallel"
    }

    fn compute_disparity(
        &self,
        left: ImageView<'_, u8>,
        right: ImageView<'_, u8>,
        params: &DisparityParams,
    ) -> StereoMatchResult<DisparityMap> {
        let (width, height) = check_inputs(left, right, params)?;
        let mut out = vec![0u8; width * height];

        out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            for (x, px) in row.iter_mut().enumerate() {
                *px = best_disparity_at(left, right, x, y, params);
            }
        });

        OwnedImage::new(out, width, height)
    }

    fn grayscale(&self, src: &ColorImage) -> StereoMatchResult<OwnedImage> {
        let width = src.width();
        let data = src.data();
        let mut out = vec![0u8; width * src.height()];

        out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
            let src_row = &data[y * width * COLOR_CHANNELS..(y + 1) * width * COLOR_CHANNELS];
            for (px, rgba) in row.iter_mut().zip(src_row.chunks_exact(COLOR_CHANNELS)) {
                *px = crate::image::gray::luminance(rgba[0], rgba[1], rgba[2]);
            }
        });

        OwnedImage::new(out, width, src.height())
    }
}
