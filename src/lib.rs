//! StereoMatch is a CPU-first stereo disparity library built around ZNCC
//! block matching.
//!
//! The crate runs a five-stage pipeline over an RGBA stereo pair:
//! decimation, grayscale, windowed ZNCC disparity search (once per
//! reference image), cross-check, occlusion fill and normalization, with
//! the compute-heavy stages dispatched through a pluggable
//! [`ExecutionBackend`]: a sequential baseline, a batch-and-join thread
//! backend, optional rayon data-parallelism, and optional OpenCL device
//! offload.

pub mod image;
pub mod kernel;
pub mod pipeline;
pub mod postprocess;
pub(crate) mod trace;
pub mod util;

pub use image::gray::grayscale;
pub use image::resize::decimate;
pub use image::{ColorImage, DisparityMap, ImageView, OwnedImage};
pub use kernel::scalar::SequentialBackend;
pub use kernel::threads::ThreadPoolBackend;
pub use kernel::{DisparityParams, DisparityRange, ExecutionBackend, WindowSpec};
pub use pipeline::{PipelineConfig, PipelineOutput, StageTimings, StereoPipeline};
pub use postprocess::{cross_check, normalize, occlusion_fill};
pub use util::{StereoMatchError, StereoMatchResult};

#[cfg(feature = "rayon")]
pub use kernel::rayon::DataParallelBackend;

#[cfg(feature = "opencl")]
pub use kernel::opencl::DeviceOffloadBackend;

#[cfg(feature = "image-io")]
pub use image::io;
