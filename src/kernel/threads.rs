//! Batch-and-join thread backend.
//!
//! Rows are dispatched to scoped worker threads in fixed-size batches; the
//! scope join is the barrier between batches, so peak concurrency is
//! bounded by the batch size without a long-lived pool. Each worker owns a
//! disjoint output row, so no synchronization is needed beyond the join.

use crate::image::{DisparityMap, ImageView, OwnedImage};
use crate::kernel::{best_disparity_at, check_inputs, DisparityParams, ExecutionBackend};
use crate::util::StereoMatchResult;
use std::thread;

/// Number of concurrently running row tasks per batch.
pub const DEFAULT_BATCH_TASKS: usize = 8;

/// Backend dispatching row tasks to scoped threads in bounded batches.
#[derive(Clone, Copy, Debug)]
pub struct ThreadPoolBackend {
    batch_tasks: usize,
}

impl ThreadPoolBackend {
    /// Creates a backend with the default batch size of eight tasks.
    pub fn new() -> Self {
        Self {
            batch_tasks: DEFAULT_BATCH_TASKS,
        }
    }

    /// Overrides the batch size; zero is clamped to one task.
    pub fn with_batch_tasks(batch_tasks: usize) -> Self {
        Self {
            batch_tasks: batch_tasks.max(1),
        }
    }

    /// Returns the configured batch size.
    pub fn batch_tasks(&self) -> usize {
        self.batch_tasks
    }
}

impl Default for ThreadPoolBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionBackend for ThreadPoolBackend {
    fn name(&self) -> &'static str {
        "thread_pool"
    }

    fn compute_disparity(
        &self,
        left: ImageView<'_, u8>,
        right: ImageView<'_, u8>,
        params: &DisparityParams,
    ) -> StereoMatchResult<DisparityMap> {
        let (width, height) = check_inputs(left, right, params)?;
        let mut out = vec![0u8; width * height];

        let mut row_tasks: Vec<(usize, &mut [u8])> =
            out.chunks_mut(width).enumerate().collect();
        for batch in row_tasks.chunks_mut(self.batch_tasks) {
            thread::scope(|scope| {
                for (y, row) in batch.iter_mut() {
                    let y = *y;
                    scope.spawn(move || {
                        for (x, px) in row.iter_mut().enumerate() {
                            *px = best_disparity_at(left, right, x, y, params);
                        }
                    });
                }
            });
        }

        OwnedImage::new(out, width, height)
    }
}
