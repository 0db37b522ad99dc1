//! The five-stage stereo pipeline.
//!
//! Stages run strictly in sequence (resize, grayscale, disparity with one
//! pass per reference image, cross-check, occlusion fill, normalize),
//! each consuming the previous stage's output and producing a fresh
//! buffer. The compute-heavy stages go through the configured
//! [`ExecutionBackend`]; everything else is negligible and runs inline.

use crate::image::resize::decimate;
use crate::image::{ColorImage, DisparityMap, OwnedImage};
use crate::kernel::{DisparityParams, DisparityRange, ExecutionBackend, WindowSpec};
use crate::postprocess::{cross_check, normalize, occlusion_fill, DEFAULT_MAX_SPREAD};
use crate::trace::{trace_event, trace_span};
use crate::util::{StereoMatchError, StereoMatchResult, Stopwatch};
use std::time::Duration;

/// Tunable parameters for one pipeline run.
///
/// The defaults reproduce the canonical configuration: decimation by 4, a
/// 13x11 matching window, disparities `[0, 65)` and a cross-check
/// threshold of 3.
#[derive(Clone, Copy, Debug)]
pub struct PipelineConfig {
    /// Integer decimation factor applied to both inputs.
    pub resize_factor: u32,
    /// Matching window (height x width).
    pub window: WindowSpec,
    /// Candidate disparity interval for the left-as-reference pass; the
    /// right pass searches the negated interval.
    pub range: DisparityRange,
    /// Maximum allowed disagreement between the two passes.
    pub cross_check_threshold: u8,
    /// Maximum square-ring spread for occlusion filling.
    pub max_fill_spread: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resize_factor: 4,
            window: WindowSpec {
                height: 13,
                width: 11,
            },
            range: DisparityRange { min: 0, max: 65 },
            cross_check_threshold: 3,
            max_fill_spread: DEFAULT_MAX_SPREAD,
        }
    }
}

impl PipelineConfig {
    /// Returns the disparity parameters for the left-as-reference pass.
    pub fn params(&self) -> DisparityParams {
        DisparityParams {
            window: self.window,
            range: self.range,
        }
    }
}

/// Wall-clock duration of each pipeline stage.
#[derive(Clone, Copy, Debug, Default)]
pub struct StageTimings {
    pub resize: Duration,
    pub grayscale: Duration,
    pub disparity_left: Duration,
    pub disparity_right: Duration,
    pub cross_check: Duration,
    pub occlusion_fill: Duration,
    pub normalize: Duration,
}

impl StageTimings {
    /// Total time across all stages.
    pub fn total(&self) -> Duration {
        self.resize
            + self.grayscale
            + self.disparity_left
            + self.disparity_right
            + self.cross_check
            + self.occlusion_fill
            + self.normalize
    }
}

/// Every intermediate and final product of a pipeline run.
pub struct PipelineOutput {
    pub left_gray: OwnedImage,
    pub right_gray: OwnedImage,
    pub left_disparity: DisparityMap,
    pub right_disparity: DisparityMap,
    pub cross_checked: DisparityMap,
    pub filled: DisparityMap,
    /// The normalized occlusion-filled map, the pipeline's final product.
    pub depth: DisparityMap,
    pub timings: StageTimings,
}

/// Runs the full disparity pipeline over a stereo pair.
pub struct StereoPipeline<'a> {
    backend: &'a dyn ExecutionBackend,
    config: PipelineConfig,
}

impl<'a> StereoPipeline<'a> {
    /// Creates a pipeline, validating the configuration up front.
    pub fn new(
        backend: &'a dyn ExecutionBackend,
        config: PipelineConfig,
    ) -> StereoMatchResult<Self> {
        config.params().validate()?;
        Ok(Self { backend, config })
    }

    /// Returns the configuration the pipeline was built with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Executes all stages over an RGBA stereo pair.
    pub fn run(
        &self,
        left: &ColorImage,
        right: &ColorImage,
    ) -> StereoMatchResult<PipelineOutput> {
        if left.width() != right.width() || left.height() != right.height() {
            return Err(StereoMatchError::DimensionMismatch {
                left_width: left.width(),
                left_height: left.height(),
                right_width: right.width(),
                right_height: right.height(),
            });
        }

        let mut timings = StageTimings::default();
        let mut watch = Stopwatch::start();

        let (left_small, right_small) = {
            let _guard = trace_span!("resize").entered();
            let pair = (
                decimate(left, self.config.resize_factor)?,
                decimate(right, self.config.resize_factor)?,
            );
            timings.resize = watch.lap();
            pair
        };

        let (left_gray, right_gray) = {
            let _guard = trace_span!("grayscale", backend = self.backend.name()).entered();
            let pair = (
                self.backend.grayscale(&left_small)?,
                self.backend.grayscale(&right_small)?,
            );
            timings.grayscale = watch.lap();
            pair
        };

        let params = self.config.params();
        let left_disparity = {
            let _guard = trace_span!("disparity_left", backend = self.backend.name()).entered();
            let map = self
                .backend
                .compute_disparity(left_gray.view(), right_gray.view(), &params)?;
            timings.disparity_left = watch.lap();
            map
        };

        let right_params = DisparityParams {
            window: params.window,
            range: params.range.negated(),
        };
        let right_disparity = {
            let _guard = trace_span!("disparity_right", backend = self.backend.name()).entered();
            let map = self
                .backend
                .compute_disparity(right_gray.view(), left_gray.view(), &right_params)?;
            timings.disparity_right = watch.lap();
            map
        };

        let cross_checked = {
            let _guard = trace_span!("cross_check").entered();
            let map = cross_check(
                &left_disparity,
                &right_disparity,
                self.config.cross_check_threshold,
            )?;
            timings.cross_check = watch.lap();
            map
        };

        let filled = {
            let _guard = trace_span!("occlusion_fill").entered();
            let map = occlusion_fill(&cross_checked, self.config.max_fill_spread)?;
            timings.occlusion_fill = watch.lap();
            map
        };

        let depth = {
            let _guard = trace_span!("normalize").entered();
            let map = normalize(&filled)?;
            timings.normalize = watch.lap();
            map
        };

        trace_event!(
            "pipeline_complete",
            backend = self.backend.name(),
            total_us = timings.total().as_micros() as u64
        );

        Ok(PipelineOutput {
            left_gray,
            right_gray,
            left_disparity,
            right_disparity,
            cross_checked,
            filled,
            depth,
            timings,
        })
    }
}
