use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Log levels exposed on the command line.
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Radiance estimator selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum IntegratorKind {
    /// Path tracer with next-event estimation.
    Path,
    /// One-bounce direct lighting.
    Direct,
    /// Shading normals debug output.
    AovNormals,
    /// BVH traversal cost debug output.
    AovBvh,
}

/// Built-in demo scenes.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SceneKind {
    /// Material test: diffuse, metal and glass spheres on a checkerboard.
    Spheres,
    /// Diffuse box interior with an area light in the ceiling.
    Cornell,
    /// Homogeneous scattering medium inside a sphere boundary.
    Volume,
}

/// Command line arguments.
#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "Offline Monte Carlo path tracer")]
pub struct Args {
    /// Image width in pixels
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "600")]
    pub height: u32,

    /// Number of samples per pixel
    #[arg(long, short = 's', default_value = "64")]
    pub samples_per_pixel: u32,

    /// Maximum path depth in segments
    #[arg(long, short = 'd', default_value = "8")]
    pub depth: u32,

    /// Disable next-event estimation in the path tracer
    #[arg(long)]
    pub no_nee: bool,

    /// Radiance estimator
    #[arg(long, value_enum, default_value = "path")]
    pub integrator: IntegratorKind,

    /// Demo scene to render
    #[arg(long, value_enum, default_value = "spheres")]
    pub scene: SceneKind,

    /// Base random seed
    #[arg(long, default_value = "0")]
    pub seed: u64,

    /// Output file path (.png for 8-bit sRGB, .exr for HDR linear)
    #[arg(short, long, default_value = "output.exr")]
    pub output: String,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}
