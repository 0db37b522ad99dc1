//! OpenCL device-offload backend (feature-gated).
//!
//! The per-pixel search is expressed as an OpenCL kernel over a 2D global
//! work size; the host marshals the grayscale buffers in, enqueues the
//! dispatch and reads the map back. Kernel execution time comes from the
//! command queue's event profiling, not a host-side clock. Any device,
//! build or enqueue failure is fatal for the run; there is no fallback to
//! a CPU backend.

use crate::image::{DisparityMap, ImageView, OwnedImage};
use crate::kernel::{check_inputs, DisparityParams, ExecutionBackend};
use crate::trace::trace_event;
use crate::util::{StereoMatchError, StereoMatchResult};
use ocl::enums::ProfilingInfo;
use ocl::flags::CommandQueueProperties;
use ocl::{Buffer, Context, Device, Event, Kernel, MemFlags, Platform, Program, Queue};
use std::borrow::Cow;

/// The disparity search as an OpenCL kernel.
///
/// Mirrors the CPU routine operation for operation: truncated half-window
/// bounds, skip-aware sums with the fixed nominal divisor, and rejection
/// of non-finite scores so the `max_d` default survives degenerate
/// windows.
const ZNCC_KERNEL_SRC: &str = r#"
    __kernel void zncc_disparity(
                __global uchar const* const left,
                __global uchar const* const right,
                __global uchar* const out,
                int const w,
                int const h,
                int const win_w,
                int const win_h,
                int const min_d,
                int const max_d)
    {
        int const x = get_global_id(0);
        int const y = get_global_id(1);
        if (x >= w || y >= h) {
            return;
        }

        float const window_size = (float)(win_w * win_h);
        float max_corr = -1.0f;
        int best = max_d;

        for (int d = min_d; d < max_d; d++) {
            float left_sum = 0.0f;
            float right_sum = 0.0f;
            for (int wy = -win_h / 2; wy < win_h / 2; wy++) {
                for (int wx = -win_w / 2; wx < win_w / 2; wx++) {
                    if (y + wy < 0 || y + wy >= h || x + wx < 0 || x + wx >= w ||
                            x + wx - d < 0 || x + wx - d >= w) {
                        continue;
                    }
                    left_sum += left[(y + wy) * w + (x + wx)];
                    right_sum += right[(y + wy) * w + (x + wx - d)];
                }
            }
            float const left_mean = left_sum / window_size;
            float const right_mean = right_sum / window_size;

            float upper = 0.0f;
            float lower_left = 0.0f;
            float lower_right = 0.0f;
            for (int wy = -win_h / 2; wy < win_h / 2; wy++) {
                for (int wx = -win_w / 2; wx < win_w / 2; wx++) {
                    if (y + wy < 0 || y + wy >= h || x + wx < 0 || x + wx >= w ||
                            x + wx - d < 0 || x + wx - d >= w) {
                        continue;
                    }
                    float const left_diff = left[(y + wy) * w + (x + wx)] - left_mean;
                    float const right_diff = right[(y + wy) * w + (x + wx - d)] - right_mean;
                    lower_left += left_diff * left_diff;
                    lower_right += right_diff * right_diff;
                    upper += left_diff * right_diff;
                }
            }

            float const denom = sqrt(lower_left) * sqrt(lower_right);
            float const zncc = upper / denom;
            if (isfinite(zncc) && zncc > max_corr) {
                max_corr = zncc;
                best = d;
            }
        }

        out[y * w + x] = (uchar)abs(best);
    }
"#;

fn backend_err(err: impl std::fmt::Display) -> StereoMatchError {
    StereoMatchError::Backend {
        reason: err.to_string(),
    }
}

/// Enumerates available OpenCL platforms and their devices.
pub fn list_devices() -> StereoMatchResult<Vec<String>> {
    let mut entries = Vec::new();
    for platform in Platform::list() {
        let platform_name = platform.name().map_err(backend_err)?;
        for device in Device::list_all(platform).map_err(backend_err)? {
            let device_name = device.name().map_err(backend_err)?;
            entries.push(format!("{platform_name}: {device_name}"));
        }
    }
    Ok(entries)
}

/// Backend dispatching the disparity search to an OpenCL device.
pub struct DeviceOffloadBackend {
    device: Device,
    queue: Queue,
    program: Program,
}

impl DeviceOffloadBackend {
    /// Selects the first device of the default platform, builds the
    /// program and a profiling-enabled command queue.
    pub fn new() -> StereoMatchResult<Self> {
        let platform = Platform::default();
        let device = Device::first(platform).map_err(backend_err)?;
        let context = Context::builder()
            .platform(platform)
            .devices(device)
            .build()
            .map_err(backend_err)?;
        let queue = Queue::new(
            &context,
            device,
            Some(CommandQueueProperties::new().profiling()),
        )
        .map_err(backend_err)?;
        let program = Program::builder()
            .src(ZNCC_KERNEL_SRC)
            .devices(device)
            .build(&context)
            .map_err(backend_err)?;
        Ok(Self {
            device,
            queue,
            program,
        })
    }

    /// Returns the selected device's name.
    pub fn device_name(&self) -> String {
        self.device
            .name()
            .unwrap_or_else(|_| String::from("unknown device"))
    }
}

/// Returns the view's pixels as one contiguous row-major slice.
fn contiguous<'a>(view: ImageView<'a, u8>) -> Cow<'a, [u8]> {
    let len = view.width() * view.height();
    if view.stride() == view.width() {
        Cow::Borrowed(&view.as_slice()[..len])
    } else {
        let mut data = Vec::with_capacity(len);
        for y in 0..view.height() {
            data.extend_from_slice(view.row(y).expect("row within bounds"));
        }
        Cow::Owned(data)
    }
}

impl ExecutionBackend for DeviceOffloadBackend {
    fn name(&self) -> &'static str {
        "device_offload"
    }

    fn compute_disparity(
        &self,
        left: ImageView<'_, u8>,
        right: ImageView<'_, u8>,
        params: &DisparityParams,
    ) -> StereoMatchResult<DisparityMap> {
        let (width, height) = check_inputs(left, right, params)?;
        let len = width * height;

        let left_data = contiguous(left);
        let right_data = contiguous(right);

        let left_buf = Buffer::<u8>::builder()
            .queue(self.queue.clone())
            .flags(MemFlags::new().read_only())
            .len(len)
            .copy_host_slice(&left_data)
            .build()
            .map_err(backend_err)?;
        let right_buf = Buffer::<u8>::builder()
            .queue(self.queue.clone())
            .flags(MemFlags::new().read_only())
            .len(len)
            .copy_host_slice(&right_data)
            .build()
            .map_err(backend_err)?;
        let out_buf = Buffer::<u8>::builder()
            .queue(self.queue.clone())
            .flags(MemFlags::new().write_only())
            .len(len)
            .build()
            .map_err(backend_err)?;

        let kernel = Kernel::builder()
            .program(&self.program)
            .name("zncc_disparity")
            .queue(self.queue.clone())
            .global_work_size((width, height))
            .arg(&left_buf)
            .arg(&right_buf)
            .arg(&out_buf)
            .arg(width as i32)
            .arg(height as i32)
            .arg(params.window.width as i32)
            .arg(params.window.height as i32)
            .arg(params.range.min)
            .arg(params.range.max)
            .build()
            .map_err(backend_err)?;

        let mut event = Event::empty();
        unsafe {
            kernel
                .cmd()
                .enew(&mut event)
                .enq()
                .map_err(backend_err)?;
        }
        event.wait_for().map_err(backend_err)?;

        let started = event
            .profiling_info(ProfilingInfo::Start)
            .map_err(backend_err)?
            .time()
            .map_err(backend_err)?;
        let ended = event
            .profiling_info(ProfilingInfo::End)
            .map_err(backend_err)?
            .time()
            .map_err(backend_err)?;
        trace_event!(
            "device_dispatch_complete",
            kernel = "zncc_disparity",
            elapsed_ns = ended.saturating_sub(started)
        );

        let mut out = vec![0u8; len];
        out_buf.read(&mut out).enq().map_err(backend_err)?;
        OwnedImage::new(out, width, height)
    }
}
