//! Renderer-neutral description of the figure: two filled sheets, two
//! wireframes, a box aspect and the tick-label policy.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::colormap::{LightSource, Rgba};
use crate::grid::stride_indices;
use crate::surface::{RiemannSurface, SheetIndex, SurfaceSettings};

pub type Point3 = [f64; 3];

pub const WIREFRAME_LINE_WIDTH: u32 = 1;

/// Closed boundary of one decimated patch, filled with a single color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    pub boundary: Vec<Point3>,
    pub color: Rgba,
    /// Unit normal from the patch corners, pointing to increasing height.
    pub normal: Point3,
}

impl Facet {
    pub fn shaded_color(&self, light: &LightSource) -> Rgba {
        light.shade(self.color, self.normal)
    }

    pub fn centroid(&self) -> Point3 {
        let n = self.boundary.len().max(1) as f64;
        let mut sum = [0.0; 3];
        for p in &self.boundary {
            sum[0] += p[0];
            sum[1] += p[1];
            sum[2] += p[2];
        }
        [sum[0] / n, sum[1] / n, sum[2] / n]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layer", rename_all = "snake_case")]
pub enum Layer {
    Surface {
        sheet: SheetIndex,
        facets: Vec<Facet>,
    },
    Wireframe {
        sheet: SheetIndex,
        color: Rgba,
        line_width: u32,
        lines: Vec<Vec<Point3>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickLabels {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl TickLabels {
    pub fn hidden() -> Self {
        Self {
            x: false,
            y: false,
            z: false,
        }
    }

    pub fn is_visible(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn background(self) -> Rgba {
        match self {
            Theme::Dark => Rgba::BLACK,
            Theme::Light => Rgba::WHITE,
        }
    }

    pub fn foreground(self) -> Rgba {
        match self {
            Theme::Dark => Rgba::WHITE,
            Theme::Light => Rgba::BLACK,
        }
    }
}

/// Axis-aligned data bounds over every layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneBounds {
    pub x: (f64, f64),
    pub y: (f64, f64),
    pub z: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub layers: Vec<Layer>,
    /// Relative box lengths (x, y, z), taken from the data spans.
    pub box_aspect: [f64; 3],
    pub bounds: SceneBounds,
    pub tick_labels: TickLabels,
    pub theme: Theme,
    pub light: LightSource,
}

impl Scene {
    pub fn surface_count(&self) -> usize {
        self.layers
            .iter()
            .filter(|layer| matches!(layer, Layer::Surface { .. }))
            .count()
    }

    pub fn wireframe_count(&self) -> usize {
        self.layers
            .iter()
            .filter(|layer| matches!(layer, Layer::Wireframe { .. }))
            .count()
    }

    /// Tick text for `value` on `axis`; empty when that axis hides its labels.
    pub fn tick_label(&self, axis: Axis, value: f64) -> String {
        if self.tick_labels.is_visible(axis) {
            format!("{value:.1}")
        } else {
            String::new()
        }
    }
}

/// Builds the four layers in draw order: both filled sheets, then both wireframes.
pub fn build_scene(surface: &RiemannSurface, settings: &SurfaceSettings) -> Result<Scene> {
    let (rows, cols) = surface.grid.shape();
    if rows < 2 || cols < 2 {
        bail!("Scene needs at least a 2x2 grid, got {rows}x{cols}.");
    }
    let row_idx = stride_indices(rows, settings.row_stride)?;
    let col_idx = stride_indices(cols, settings.col_stride)?;

    let mut layers = Vec::with_capacity(4);
    for sheet in SheetIndex::ALL {
        layers.push(Layer::Surface {
            sheet,
            facets: sheet_facets(surface, sheet, &row_idx, &col_idx),
        });
    }
    for sheet in SheetIndex::ALL {
        layers.push(Layer::Wireframe {
            sheet,
            color: Rgba::BLACK,
            line_width: WIREFRAME_LINE_WIDTH,
            lines: sheet_wireframe(surface, sheet, &row_idx, &col_idx),
        });
    }

    let spans = surface.coordinate_spans();
    Ok(Scene {
        layers,
        box_aspect: [spans.ptp_x(), spans.ptp_x(), spans.ptp_z_principal()],
        bounds: SceneBounds {
            x: spans.x,
            y: spans.y,
            z: spans.z,
        },
        tick_labels: TickLabels::hidden(),
        theme: Theme::default(),
        light: LightSource::default(),
    })
}

fn point(surface: &RiemannSurface, sheet: SheetIndex, i: usize, j: usize) -> Point3 {
    [
        surface.x[(i, j)],
        surface.y[(i, j)],
        surface.sheet(sheet).z[(i, j)],
    ]
}

fn sub(a: Point3, b: Point3) -> Point3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Normal of the patch spanned by its four corners, from the cross product of
/// the diagonals. Degenerate patches fall back to straight up.
fn patch_normal(p00: Point3, p01: Point3, p11: Point3, p10: Point3) -> Point3 {
    let d1 = sub(p11, p00);
    let d2 = sub(p10, p01);
    let n = [
        d1[1] * d2[2] - d1[2] * d2[1],
        d1[2] * d2[0] - d1[0] * d2[2],
        d1[0] * d2[1] - d1[1] * d2[0],
    ];
    let norm = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if !norm.is_finite() || norm <= f64::EPSILON {
        return [0.0, 0.0, 1.0];
    }
    [n[0] / norm, n[1] / norm, n[2] / norm]
}

fn sheet_facets(
    surface: &RiemannSurface,
    sheet: SheetIndex,
    row_idx: &[usize],
    col_idx: &[usize],
) -> Vec<Facet> {
    let colors = &surface.sheet(sheet).colors;
    let patch_count = row_idx.len().saturating_sub(1) * col_idx.len().saturating_sub(1);
    let mut facets = Vec::with_capacity(patch_count);
    for rows in row_idx.windows(2) {
        let (i0, i1) = (rows[0], rows[1]);
        for cols in col_idx.windows(2) {
            let (j0, j1) = (cols[0], cols[1]);
            // Walk the patch edge once: top, right, bottom, left.
            let mut boundary = Vec::with_capacity(2 * ((i1 - i0) + (j1 - j0)));
            boundary.extend((j0..j1).map(|j| point(surface, sheet, i0, j)));
            boundary.extend((i0..i1).map(|i| point(surface, sheet, i, j1)));
            boundary.extend((j0 + 1..=j1).rev().map(|j| point(surface, sheet, i1, j)));
            boundary.extend((i0 + 1..=i1).rev().map(|i| point(surface, sheet, i, j0)));
            let normal = patch_normal(
                point(surface, sheet, i0, j0),
                point(surface, sheet, i0, j1),
                point(surface, sheet, i1, j1),
                point(surface, sheet, i1, j0),
            );
            facets.push(Facet {
                boundary,
                color: colors[(i0, j0)],
                normal,
            });
        }
    }
    facets
}

fn sheet_wireframe(
    surface: &RiemannSurface,
    sheet: SheetIndex,
    row_idx: &[usize],
    col_idx: &[usize],
) -> Vec<Vec<Point3>> {
    let (rows, cols) = surface.grid.shape();
    let mut lines = Vec::with_capacity(row_idx.len() + col_idx.len());
    for &i in row_idx {
        lines.push((0..cols).map(|j| point(surface, sheet, i, j)).collect());
    }
    for &j in col_idx {
        lines.push((0..rows).map(|i| point(surface, sheet, i, j)).collect());
    }
    lines
}
