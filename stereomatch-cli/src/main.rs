use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use stereomatch::io::{load_color_image, save_gray_image};
use stereomatch::{
    normalize, DataParallelBackend, DisparityRange, ExecutionBackend, OwnedImage, PipelineConfig,
    SequentialBackend, StereoPipeline, ThreadPoolBackend, WindowSpec,
};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "StereoMatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// List OpenCL platforms and devices and exit (opencl builds only).
    #[arg(long)]
    list_devices: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
enum BackendConfig {
    #[default]
    Sequential,
    ThreadPool,
    DataParallel,
    DeviceOffload,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PipelineConfigJson {
    resize_factor: u32,
    window_height: usize,
    window_width: usize,
    min_disparity: i32,
    max_disparity: i32,
    cross_check_threshold: u8,
    max_fill_spread: usize,
}

impl Default for PipelineConfigJson {
    fn default() -> Self {
        let cfg = PipelineConfig::default();
        Self {
            resize_factor: cfg.resize_factor,
            window_height: cfg.window.height,
            window_width: cfg.window.width,
            min_disparity: cfg.range.min,
            max_disparity: cfg.range.max,
            cross_check_threshold: cfg.cross_check_threshold,
            max_fill_spread: cfg.max_fill_spread,
        }
    }
}

impl From<&PipelineConfigJson> for PipelineConfig {
    fn from(value: &PipelineConfigJson) -> Self {
        Self {
            resize_factor: value.resize_factor,
            window: WindowSpec {
                height: value.window_height,
                width: value.window_width,
            },
            range: DisparityRange {
                min: value.min_disparity,
                max: value.max_disparity,
            },
            cross_check_threshold: value.cross_check_threshold,
            max_fill_spread: value.max_fill_spread,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    left_path: String,
    right_path: String,
    output_dir: String,
    backend: BackendConfig,
    save_intermediate: bool,
    pipeline: PipelineConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            left_path: String::from("im0.png"),
            right_path: String::from("im1.png"),
            output_dir: String::from("imgs"),
            backend: BackendConfig::default(),
            save_intermediate: true,
            pipeline: PipelineConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TimingsRecord {
    resize_ms: f64,
    grayscale_ms: f64,
    disparity_left_ms: f64,
    disparity_right_ms: f64,
    cross_check_ms: f64,
    occlusion_fill_ms: f64,
    normalize_ms: f64,
    total_ms: f64,
}

#[derive(Debug, Serialize)]
struct Report {
    backend: &'static str,
    device: Option<String>,
    output_files: Vec<String>,
    timings: TimingsRecord,
}

fn build_backend(
    kind: BackendConfig,
) -> Result<(Box<dyn ExecutionBackend>, Option<String>), Box<dyn std::error::Error>> {
    match kind {
        BackendConfig::Sequential => Ok((Box::new(SequentialBackend), None)),
        BackendConfig::ThreadPool => Ok((Box::new(ThreadPoolBackend::new()), None)),
        BackendConfig::DataParallel => Ok((Box::new(DataParallelBackend), None)),
        #[cfg(feature = "opencl")]
        BackendConfig::DeviceOffload => {
            let backend = stereomatch::DeviceOffloadBackend::new()?;
            let device = backend.device_name();
            Ok((Box::new(backend), Some(device)))
        }
        #[cfg(not(feature = "opencl"))]
        BackendConfig::DeviceOffload => {
            Err("device_offload backend requires a build with the opencl feature".into())
        }
    }
}

fn save_map(
    dir: &Path,
    name: &str,
    map: &OwnedImage,
    files: &mut Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = dir.join(name);
    save_gray_image(&path, map)?;
    files.push(path.display().to_string());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("stereomatch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }
    if cli.list_devices {
        #[cfg(feature = "opencl")]
        {
            for entry in stereomatch::kernel::opencl::list_devices()? {
                println!("{entry}");
            }
            return Ok(());
        }
        #[cfg(not(feature = "opencl"))]
        return Err("device listing requires a build with the opencl feature".into());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;

    let (backend, device) = build_backend(config.backend)?;
    let pipeline_config = PipelineConfig::from(&config.pipeline);
    let pipeline = StereoPipeline::new(backend.as_ref(), pipeline_config)?;

    let left = load_color_image(&config.left_path)?;
    let right = load_color_image(&config.right_path)?;
    let out = pipeline.run(&left, &right)?;

    let dir = PathBuf::from(&config.output_dir);
    fs::create_dir_all(&dir)?;

    let mut output_files = Vec::new();
    if config.save_intermediate {
        save_map(&dir, "im0_gray.png", &out.left_gray, &mut output_files)?;
        save_map(&dir, "im1_gray.png", &out.right_gray, &mut output_files)?;
        save_map(&dir, "im0_disparity.png", &out.left_disparity, &mut output_files)?;
        save_map(&dir, "im1_disparity.png", &out.right_disparity, &mut output_files)?;
        save_map(&dir, "cross_check.png", &out.cross_checked, &mut output_files)?;
        save_map(&dir, "occlusion_fill.png", &out.filled, &mut output_files)?;
        save_map(
            &dir,
            "im0_disparity_norm.png",
            &normalize(&out.left_disparity)?,
            &mut output_files,
        )?;
        save_map(
            &dir,
            "im1_disparity_norm.png",
            &normalize(&out.right_disparity)?,
            &mut output_files,
        )?;
        save_map(
            &dir,
            "cross_check_norm.png",
            &normalize(&out.cross_checked)?,
            &mut output_files,
        )?;
    }
    save_map(&dir, "occlusion_fill_norm.png", &out.depth, &mut output_files)?;

    let timings = &out.timings;
    let report = Report {
        backend: backend.name(),
        device,
        output_files,
        timings: TimingsRecord {
            resize_ms: timings.resize.as_secs_f64() * 1e3,
            grayscale_ms: timings.grayscale.as_secs_f64() * 1e3,
            disparity_left_ms: timings.disparity_left.as_secs_f64() * 1e3,
            disparity_right_ms: timings.disparity_right.as_secs_f64() * 1e3,
            cross_check_ms: timings.cross_check.as_secs_f64() * 1e3,
            occlusion_fill_ms: timings.occlusion_fill.as_secs_f64() * 1e3,
            normalize_ms: timings.normalize.as_secs_f64() * 1e3,
            total_ms: timings.total().as_secs_f64() * 1e3,
        },
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
