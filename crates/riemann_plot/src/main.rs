use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use riemann_core::scene::{build_scene, Theme};
use riemann_core::surface::{
    RiemannSurface, SurfaceSettings, DEFAULT_COL_STRIDE, DEFAULT_RADIUS_MAX, DEFAULT_RADIUS_MIN,
    DEFAULT_RESOLUTION, DEFAULT_ROW_STRIDE,
};
use riemann_plot::camera::Camera;
use riemann_plot::render::{save_figure, FigureSize};

#[derive(Parser, Debug)]
#[command(
    name = "riemann-plot",
    about = "Render the two-sheeted Riemann surface of sqrt(z)"
)]
struct Cli {
    /// Samples per axis of the (radius, angle) grid.
    #[arg(short = 'n', long, default_value_t = DEFAULT_RESOLUTION)]
    resolution: usize,
    #[arg(long, default_value_t = DEFAULT_RADIUS_MIN)]
    r_min: f64,
    #[arg(long, default_value_t = DEFAULT_RADIUS_MAX)]
    r_max: f64,
    #[arg(long, default_value_t = 0.0)]
    theta_min: f64,
    #[arg(long, default_value_t = std::f64::consts::TAU)]
    theta_max: f64,
    #[arg(long, default_value_t = 1.0)]
    z_scale: f64,
    /// Decimation along the angle direction.
    #[arg(long, default_value_t = DEFAULT_ROW_STRIDE)]
    row_stride: usize,
    /// Decimation along the radius direction.
    #[arg(long, default_value_t = DEFAULT_COL_STRIDE)]
    col_stride: usize,
    #[arg(long, default_value_t = 1000)]
    width: u32,
    #[arg(long, default_value_t = 700)]
    height: u32,
    #[arg(long)]
    yaw: Option<f64>,
    #[arg(long)]
    pitch: Option<f64>,
    #[arg(long)]
    scale: Option<f64>,
    /// White background instead of the dark theme.
    #[arg(long)]
    light: bool,
    /// Output image; `.png` or `.svg`.
    #[arg(short, long, default_value = "riemann_surface_sqrt.png")]
    output: PathBuf,
    /// Also write the scene description as JSON.
    #[arg(long)]
    dump_scene: Option<PathBuf>,
}

impl Cli {
    fn surface_settings(&self) -> SurfaceSettings {
        SurfaceSettings {
            resolution: self.resolution,
            radius_min: self.r_min,
            radius_max: self.r_max,
            angle_min: self.theta_min,
            angle_max: self.theta_max,
            z_scale: self.z_scale,
            row_stride: self.row_stride,
            col_stride: self.col_stride,
        }
    }

    fn camera(&self) -> Camera {
        let defaults = Camera::default();
        Camera {
            yaw: self.yaw.unwrap_or(defaults.yaw),
            pitch: self.pitch.unwrap_or(defaults.pitch),
            scale: self.scale.unwrap_or(defaults.scale),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let cli = Cli::parse();
    let settings = cli.surface_settings();
    info!(
        "Sampling {n}x{n} grid over r in [{}, {}], theta in [{}, {}]",
        settings.radius_min,
        settings.radius_max,
        settings.angle_min,
        settings.angle_max,
        n = settings.resolution
    );

    let surface = RiemannSurface::compute(&settings).context("invalid surface settings")?;
    let mut scene = build_scene(&surface, &settings).context("failed to build scene")?;
    if cli.light {
        scene.theme = Theme::Light;
    }
    info!(
        "Scene has {} surfaces and {} wireframes",
        scene.surface_count(),
        scene.wireframe_count()
    );

    if let Some(path) = &cli.dump_scene {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &scene)
            .with_context(|| format!("failed to write scene to {}", path.display()))?;
        info!("Wrote scene description to {}", path.display());
    }

    let size = FigureSize {
        width: cli.width,
        height: cli.height,
    };
    save_figure(&scene, &cli.output, size, &cli.camera())
        .with_context(|| format!("failed to render {}", cli.output.display()))?;
    Ok(())
}
