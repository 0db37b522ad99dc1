//! Disparity-map post-processing stages.
//!
//! All three stages are pure per-map transforms: cross-check consistency
//! filtering, nearest-neighbor occlusion filling, and linear rescaling to
//! the full 8-bit range.

pub mod crosscheck;
pub mod normalize;
pub mod occlusion;

pub use crosscheck::cross_check;
pub use normalize::normalize;
pub use occlusion::{occlusion_fill, DEFAULT_MAX_SPREAD};
