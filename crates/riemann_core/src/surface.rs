//! The two sheets of the Riemann surface of `sqrt(z)`.
//!
//! With `z = r e^{iθ}` the branches are `w = ±sqrt(r) e^{iθ/2}`. Each sheet is
//! drawn over the `z`-plane with height `Im(w)`, so one trip around the origin
//! moves along half of the surface and lands on the other sheet.

use anyhow::{bail, Result};
use nalgebra::DMatrix;
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::colormap::{sheet_color, Rgba};
use crate::grid::{AxisSpec, PolarGrid};

pub const DEFAULT_RESOLUTION: usize = 100;
pub const DEFAULT_RADIUS_MIN: f64 = 0.01;
pub const DEFAULT_RADIUS_MAX: f64 = 1.0;
pub const DEFAULT_ROW_STRIDE: usize = 5;
pub const DEFAULT_COL_STRIDE: usize = 15;
/// Largest accepted samples-per-axis; the mesh holds `resolution²` points per matrix.
pub const MAX_RESOLUTION: usize = 10_000;

/// Constants controlling grid sampling, height scaling and decimation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceSettings {
    pub resolution: usize,
    pub radius_min: f64,
    pub radius_max: f64,
    pub angle_min: f64,
    pub angle_max: f64,
    pub z_scale: f64,
    /// Decimation along the angle axis (mesh rows).
    pub row_stride: usize,
    /// Decimation along the radius axis (mesh columns).
    pub col_stride: usize,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            radius_min: DEFAULT_RADIUS_MIN,
            radius_max: DEFAULT_RADIUS_MAX,
            angle_min: 0.0,
            angle_max: 2.0 * PI,
            z_scale: 1.0,
            row_stride: DEFAULT_ROW_STRIDE,
            col_stride: DEFAULT_COL_STRIDE,
        }
    }
}

impl SurfaceSettings {
    pub fn radius_axis(&self) -> AxisSpec {
        AxisSpec::new(self.radius_min, self.radius_max, self.resolution)
    }

    pub fn angle_axis(&self) -> AxisSpec {
        AxisSpec::new(self.angle_min, self.angle_max, self.resolution)
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution < 2 {
            bail!(
                "Grid resolution must be at least 2, got {}.",
                self.resolution
            );
        }
        if self.resolution > MAX_RESOLUTION {
            bail!(
                "Grid resolution must be at most {MAX_RESOLUTION}, got {}.",
                self.resolution
            );
        }
        if self.radius_min.is_nan() || self.radius_min <= 0.0 {
            bail!(
                "Radius minimum must be positive to stay off the branch point, got {}.",
                self.radius_min
            );
        }
        self.radius_axis().validate("Radius")?;
        self.angle_axis().validate("Angle")?;
        if !self.z_scale.is_finite() || self.z_scale == 0.0 {
            bail!("z-scale must be finite and non-zero, got {}.", self.z_scale);
        }
        if self.row_stride == 0 || self.col_stride == 0 {
            bail!("Row and column strides must be at least 1.");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetIndex {
    Principal,
    Negated,
}

impl SheetIndex {
    pub const ALL: [SheetIndex; 2] = [SheetIndex::Principal, SheetIndex::Negated];

    pub fn label(self) -> &'static str {
        match self {
            SheetIndex::Principal => "principal",
            SheetIndex::Negated => "negated",
        }
    }
}

/// Branch value `±sqrt(r) e^{iθ/2}`. θ over `[0, 2π]` sweeps the argument
/// through `[0, π]` only.
pub fn sqrt_branch(r: f64, theta: f64, sheet: SheetIndex) -> Complex<f64> {
    let principal = Complex::from_polar(r.sqrt(), theta / 2.0);
    match sheet {
        SheetIndex::Principal => principal,
        SheetIndex::Negated => -principal,
    }
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub index: SheetIndex,
    pub z: DMatrix<f64>,
    pub colors: DMatrix<Rgba>,
}

/// Peak-to-peak extents of the evaluated coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSpans {
    pub x: (f64, f64),
    pub y: (f64, f64),
    /// Extent of the principal sheet alone.
    pub z_principal: (f64, f64),
    /// Extent of both sheets together.
    pub z: (f64, f64),
}

impl CoordinateSpans {
    pub fn ptp_x(&self) -> f64 {
        self.x.1 - self.x.0
    }

    pub fn ptp_z_principal(&self) -> f64 {
        self.z_principal.1 - self.z_principal.0
    }
}

#[derive(Debug, Clone)]
pub struct RiemannSurface {
    pub grid: PolarGrid,
    pub x: DMatrix<f64>,
    pub y: DMatrix<f64>,
    pub sheets: [Sheet; 2],
}

impl RiemannSurface {
    pub fn compute(settings: &SurfaceSettings) -> Result<Self> {
        settings.validate()?;
        let grid = PolarGrid::new(&settings.radius_axis(), &settings.angle_axis())?;
        let (rows, cols) = grid.shape();
        let r = &grid.radius_mesh;
        let theta = &grid.angle_mesh;

        let x = r.zip_map(theta, |r, t| r * t.cos());
        let y = r.zip_map(theta, |r, t| r * t.sin());

        let z_principal = r.zip_map(theta, |r, t| {
            sqrt_branch(r, t, SheetIndex::Principal).im * settings.z_scale
        });
        // Exact mirror: negating the stored heights keeps z2 == -z1 bit for bit.
        let z_negated = -&z_principal;

        let sheets = SheetIndex::ALL.map(|index| {
            let z = match index {
                SheetIndex::Principal => z_principal.clone(),
                SheetIndex::Negated => z_negated.clone(),
            };
            let colors = DMatrix::from_fn(rows, cols, |i, j| sheet_color(theta[(i, j)], index));
            Sheet { index, z, colors }
        });

        Ok(Self {
            grid,
            x,
            y,
            sheets,
        })
    }

    pub fn sheet(&self, index: SheetIndex) -> &Sheet {
        match index {
            SheetIndex::Principal => &self.sheets[0],
            SheetIndex::Negated => &self.sheets[1],
        }
    }

    pub fn coordinate_spans(&self) -> CoordinateSpans {
        let principal = min_max(&self.sheet(SheetIndex::Principal).z);
        let negated = min_max(&self.sheet(SheetIndex::Negated).z);
        CoordinateSpans {
            x: min_max(&self.x),
            y: min_max(&self.y),
            z_principal: principal,
            z: (principal.0.min(negated.0), principal.1.max(negated.1)),
        }
    }
}

fn min_max(values: &DMatrix<f64>) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
