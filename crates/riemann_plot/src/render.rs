use std::ops::Range;
use std::path::Path;

use log::{debug, info};
use plotters::coord::ranged3d::Cartesian3d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use riemann_core::colormap::Rgba;
use riemann_core::scene::{Axis, Facet, Layer, Point3, Scene};

use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};

const CHART_MARGIN: u32 = 20;
const VISIBLE_TICK_COUNT: usize = 10;
const DEFAULT_WIDTH: u32 = 1000;
const DEFAULT_HEIGHT: u32 = 700;

/// Output size in pixels; the default is a 10x7 inch figure at 100 dpi.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FigureSize {
    pub width: u32,
    pub height: u32,
}

impl Default for FigureSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl FigureSize {
    fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::EmptyFigure {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Data ranges (x, y, z) for the chart cube.
///
/// plotters stretches every axis over the same cube edge, so each range is
/// sized `span * max_aspect / aspect` around the data center. The visible box
/// then has the scene's aspect while one data unit keeps the same length
/// along x and y.
pub fn axis_ranges(scene: &Scene) -> [Range<f64>; 3] {
    let bounds = &scene.bounds;
    let extents = [bounds.x, bounds.y, bounds.z];
    let max_aspect = scene
        .box_aspect
        .iter()
        .copied()
        .filter(|a| a.is_finite() && *a > 0.0)
        .fold(0.0, f64::max);
    let mut ranges = [0.0..1.0, 0.0..1.0, 0.0..1.0];
    for (axis, (lo, hi)) in extents.into_iter().enumerate() {
        let span = hi - lo;
        let span = if span.is_finite() && span > 0.0 { span } else { 1.0 };
        let aspect = scene.box_aspect[axis];
        let stretch = if max_aspect > 0.0 && aspect.is_finite() && aspect > 0.0 {
            max_aspect / aspect
        } else {
            1.0
        };
        let center = 0.5 * (lo + hi);
        let half = 0.5 * span * stretch;
        ranges[axis] = (center - half)..(center + half);
    }
    ranges
}

/// Scene coordinates carry height in z; plotters draws its y axis upward.
fn to_chart(p: Point3) -> (f64, f64, f64) {
    (p[0], p[2], p[1])
}

type Chart3d = Cartesian3d<RangedCoordf64, RangedCoordf64, RangedCoordf64>;

/// Depth plotters assigns to a scene point under the chart's projection.
fn chart_depth(coord: &Chart3d, p: Point3) -> i32 {
    let (x, height, y) = to_chart(p);
    coord.projected_depth(&x, &height, &y)
}

fn rgba(color: Rgba) -> RGBAColor {
    let (r, g, b) = color.to_rgb8();
    RGBAColor(r, g, b, color.a)
}

/// Facets of every surface layer, farthest first (largest projected depth).
fn painter_order<'a>(scene: &'a Scene, coord: &Chart3d) -> Vec<&'a Facet> {
    let mut facets: Vec<(i32, &Facet)> = scene
        .layers
        .iter()
        .filter_map(|layer| match layer {
            Layer::Surface { facets, .. } => Some(facets),
            Layer::Wireframe { .. } => None,
        })
        .flatten()
        .map(|facet| (chart_depth(coord, facet.centroid()), facet))
        .collect();
    facets.sort_by(|a, b| b.0.cmp(&a.0));
    facets.into_iter().map(|(_, facet)| facet).collect()
}

fn tick_count(scene: &Scene, axis: Axis) -> usize {
    if scene.tick_labels.is_visible(axis) {
        VISIBLE_TICK_COUNT
    } else {
        0
    }
}

fn build_chart<'a, DB: DrawingBackend>(
    scene: &Scene,
    root: &'a DrawingArea<DB, Shift>,
    camera: &Camera,
) -> RenderResult<ChartContext<'a, DB, Chart3d>> {
    let [x_range, y_range, z_range] = axis_ranges(scene);
    let mut chart = ChartBuilder::on(root)
        .margin(CHART_MARGIN)
        .build_cartesian_3d(x_range, z_range, y_range)
        .map_err(RenderError::drawing)?;
    chart.with_projection(|pb| camera.projection(pb));
    Ok(chart)
}

/// Draws the scene onto `root`: axes, filled facets back to front, then wireframes.
pub fn render_scene<DB: DrawingBackend>(
    scene: &Scene,
    root: &DrawingArea<DB, Shift>,
    camera: &Camera,
) -> RenderResult<()> {
    let background = rgba(scene.theme.background());
    let foreground = rgba(scene.theme.foreground());
    root.fill(&background).map_err(RenderError::drawing)?;

    let mut chart = build_chart(scene, root, camera)?;

    let x_formatter = |v: &f64| scene.tick_label(Axis::X, *v);
    let height_formatter = |v: &f64| scene.tick_label(Axis::Z, *v);
    let y_formatter = |v: &f64| scene.tick_label(Axis::Y, *v);
    chart
        .configure_axes()
        .x_labels(tick_count(scene, Axis::X))
        .y_labels(tick_count(scene, Axis::Z))
        .z_labels(tick_count(scene, Axis::Y))
        .x_formatter(&x_formatter)
        .y_formatter(&height_formatter)
        .z_formatter(&y_formatter)
        .label_style(("sans-serif", 12).into_font().color(&foreground))
        .bold_grid_style(foreground.mix(0.3))
        .light_grid_style(foreground.mix(0.1))
        .axis_panel_style(foreground.mix(0.05).filled())
        .draw()
        .map_err(RenderError::drawing)?;

    let facets = painter_order(scene, chart.as_coord_spec());
    debug!("Drawing {} shaded facets", facets.len());
    chart
        .draw_series(facets.into_iter().map(|facet| {
            let boundary: Vec<_> = facet.boundary.iter().copied().map(to_chart).collect();
            Polygon::new(boundary, rgba(facet.shaded_color(&scene.light)).filled())
        }))
        .map_err(RenderError::drawing)?;

    for layer in &scene.layers {
        if let Layer::Wireframe {
            sheet,
            color,
            line_width,
            lines,
        } = layer
        {
            debug!(
                "Drawing {} wireframe lines for the {} sheet",
                lines.len(),
                sheet.label()
            );
            chart
                .draw_series(lines.iter().map(|line| {
                    let path: Vec<_> = line.iter().copied().map(to_chart).collect();
                    PathElement::new(path, rgba(*color).stroke_width(*line_width))
                }))
                .map_err(RenderError::drawing)?;
        }
    }
    Ok(())
}

/// Renders into a packed RGB buffer without touching the filesystem.
pub fn render_to_rgb(scene: &Scene, size: FigureSize, camera: &Camera) -> RenderResult<Vec<u8>> {
    size.validate()?;
    let mut buffer = vec![0u8; size.width as usize * size.height as usize * 3];
    {
        let root =
            BitMapBackend::with_buffer(&mut buffer, (size.width, size.height)).into_drawing_area();
        render_scene(scene, &root, camera)?;
        root.present().map_err(RenderError::drawing)?;
    }
    Ok(buffer)
}

/// Writes the figure to `path`; the extension selects PNG or SVG output.
pub fn save_figure(
    scene: &Scene,
    path: &Path,
    size: FigureSize,
    camera: &Camera,
) -> RenderResult<()> {
    size.validate()?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => {
            let root = BitMapBackend::new(path, (size.width, size.height)).into_drawing_area();
            render_scene(scene, &root, camera)?;
            root.present().map_err(RenderError::drawing)?;
        }
        Some("svg") => {
            let root = SVGBackend::new(path, (size.width, size.height)).into_drawing_area();
            render_scene(scene, &root, camera)?;
            root.present().map_err(RenderError::drawing)?;
        }
        _ => return Err(RenderError::UnsupportedFormat(path.to_path_buf())),
    }
    info!(
        "Wrote {}x{} figure to {}",
        size.width,
        size.height,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use riemann_core::scene::build_scene;
    use riemann_core::surface::{RiemannSurface, SurfaceSettings};

    fn default_scene() -> Scene {
        let settings = SurfaceSettings::default();
        let surface = RiemannSurface::compute(&settings).expect("surface");
        build_scene(&surface, &settings).expect("scene")
    }

    fn small_scene() -> Scene {
        let settings = SurfaceSettings {
            resolution: 20,
            row_stride: 2,
            col_stride: 3,
            ..SurfaceSettings::default()
        };
        let surface = RiemannSurface::compute(&settings).expect("surface");
        build_scene(&surface, &settings).expect("scene")
    }

    #[test]
    fn axis_ranges_follow_box_aspect() {
        let scene = default_scene();
        let [x, y, z] = axis_ranges(&scene);
        let len = |r: &Range<f64>| r.end - r.start;
        assert!((len(&x) - 2.0).abs() < 1e-3);
        assert!((len(&y) - len(&x)).abs() < 1e-3);
        // Both sheets span ~2 in height, squeezed into half the box.
        assert!((len(&z) - 4.0).abs() < 1e-2);
        assert!((z.start + z.end).abs() < 1e-12);
    }

    fn surface_facet_count(scene: &Scene) -> usize {
        scene
            .layers
            .iter()
            .map(|layer| match layer {
                Layer::Surface { facets, .. } => facets.len(),
                Layer::Wireframe { .. } => 0,
            })
            .sum()
    }

    #[test]
    fn painter_order_follows_chart_projection() {
        let scene = default_scene();
        let mut buffer = vec![0u8; 1000 * 700 * 3];
        let root = BitMapBackend::with_buffer(&mut buffer, (1000, 700)).into_drawing_area();
        let chart = build_chart(&scene, &root, &Camera::default()).expect("chart");
        let coord = chart.as_coord_spec();
        let ordered = painter_order(&scene, coord);
        assert_eq!(ordered.len(), surface_facet_count(&scene));
        let depths: Vec<i32> = ordered
            .iter()
            .map(|facet| {
                let [x, y, height] = facet.centroid();
                coord.projected_depth(&x, &height, &y)
            })
            .collect();
        assert!(depths.windows(2).all(|w| w[0] >= w[1]));
        assert!(depths[0] > depths[depths.len() - 1]);
    }

    #[test]
    fn chart_depth_tracks_data_y_axis() {
        let scene = default_scene();
        let mut buffer = vec![0u8; 1000 * 700 * 3];
        let root = BitMapBackend::with_buffer(&mut buffer, (1000, 700)).into_drawing_area();
        let chart = build_chart(&scene, &root, &Camera::default()).expect("chart");
        let coord = chart.as_coord_spec();
        // Scene y is plotters' z axis; the swap must reach projected_depth.
        assert_eq!(
            chart_depth(coord, [0.1, 0.7, -0.2]),
            coord.projected_depth(&0.1, &-0.2, &0.7)
        );
        assert_ne!(
            chart_depth(coord, [0.0, 0.9, 0.0]),
            chart_depth(coord, [0.0, -0.9, 0.0])
        );
    }

    #[test]
    fn render_to_rgb_paints_colored_facets() {
        let scene = small_scene();
        let size = FigureSize {
            width: 200,
            height: 140,
        };
        let buffer = render_to_rgb(&scene, size, &Camera::default()).expect("render");
        assert_eq!(buffer.len(), 200 * 140 * 3);
        let colored = buffer
            .chunks_exact(3)
            .filter(|px| px.iter().max() != px.iter().min())
            .count();
        assert!(colored > 0, "expected hue-colored pixels in the figure");
    }

    #[test]
    fn save_figure_rejects_unknown_extension() {
        let scene = small_scene();
        let path = std::env::temp_dir().join("riemann_plot_unsupported.jpg");
        let err = save_figure(&scene, &path, FigureSize::default(), &Camera::default())
            .expect_err("jpg should be rejected");
        assert!(matches!(err, RenderError::UnsupportedFormat(_)));
        assert!(!path.exists());
    }

    #[test]
    fn save_figure_rejects_empty_size() {
        let scene = small_scene();
        let path = std::env::temp_dir().join("riemann_plot_empty.png");
        let err = save_figure(
            &scene,
            &path,
            FigureSize {
                width: 0,
                height: 10,
            },
            &Camera::default(),
        )
        .expect_err("empty figure should be rejected");
        assert!(err.to_string().contains("0x10"));
    }

    #[test]
    fn save_figure_writes_svg() {
        let scene = small_scene();
        let path = std::env::temp_dir().join(format!("riemann_plot_{}.svg", std::process::id()));
        save_figure(
            &scene,
            &path,
            FigureSize {
                width: 300,
                height: 200,
            },
            &Camera::default(),
        )
        .expect("svg should be written");
        let contents = std::fs::read_to_string(&path).expect("read svg");
        std::fs::remove_file(&path).ok();
        assert!(contents.contains("<svg"));
        assert!(contents.contains("polygon"));
    }
}
