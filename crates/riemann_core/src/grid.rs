use anyhow::{anyhow, bail, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::traits::Scalar;

/// Closed sampling interval `[min, max]` with `samples` evenly spaced points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

impl AxisSpec {
    pub fn new(min: f64, max: f64, samples: usize) -> Self {
        Self { min, max, samples }
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.max <= self.min {
            bail!("{name} range must be finite with max > min.");
        }
        if self.samples < 2 {
            bail!("{name} axis needs at least 2 samples.");
        }
        Ok(())
    }

    pub fn sample(&self) -> Result<Vec<f64>> {
        linspace(self.min, self.max, self.samples)
    }
}

/// Evenly spaced samples over `[min, max]`, both endpoints included.
///
/// The last sample is pinned to `max` so accumulated rounding never leaves
/// the interval short.
pub fn linspace<T: Scalar>(min: T, max: T, samples: usize) -> Result<Vec<T>> {
    if samples < 2 {
        bail!("linspace needs at least 2 samples, got {samples}.");
    }
    let denom = T::from_usize(samples - 1)
        .ok_or_else(|| anyhow!("Sample count {samples} is not representable."))?;
    let step = (max - min) / denom;
    let mut values = Vec::with_capacity(samples);
    for i in 0..samples - 1 {
        let offset = T::from_usize(i)
            .ok_or_else(|| anyhow!("Sample index {i} is not representable."))?;
        values.push(min + step * offset);
    }
    values.push(max);
    Ok(values)
}

/// Indices `0, stride, 2*stride, ...` over `0..len`, always ending at `len - 1`.
pub fn stride_indices(len: usize, stride: usize) -> Result<Vec<usize>> {
    if stride == 0 {
        bail!("Stride must be at least 1.");
    }
    if len == 0 {
        return Ok(Vec::new());
    }
    let mut indices: Vec<usize> = (0..len).step_by(stride).collect();
    if indices.last() != Some(&(len - 1)) {
        indices.push(len - 1);
    }
    Ok(indices)
}

/// Outer-product mesh over (radius, angle).
///
/// Rows are indexed by angle and columns by radius, so `radius_mesh[(i, j)] == r[j]`
/// and `angle_mesh[(i, j)] == theta[i]`.
#[derive(Debug, Clone)]
pub struct PolarGrid {
    pub r: Vec<f64>,
    pub theta: Vec<f64>,
    pub radius_mesh: DMatrix<f64>,
    pub angle_mesh: DMatrix<f64>,
}

impl PolarGrid {
    pub fn new(radius: &AxisSpec, angle: &AxisSpec) -> Result<Self> {
        radius.validate("Radius")?;
        angle.validate("Angle")?;
        if radius.min <= 0.0 {
            bail!(
                "Radius minimum must be positive to stay off the branch point, got {}.",
                radius.min
            );
        }
        let r = radius.sample()?;
        let theta = angle.sample()?;
        let radius_mesh = DMatrix::from_fn(theta.len(), r.len(), |_, j| r[j]);
        let angle_mesh = DMatrix::from_fn(theta.len(), r.len(), |i, _| theta[i]);
        Ok(Self {
            r,
            theta,
            radius_mesh,
            angle_mesh,
        })
    }

    /// (rows, cols) = (angle samples, radius samples).
    pub fn shape(&self) -> (usize, usize) {
        self.radius_mesh.shape()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn assert_err_contains<T: std::fmt::Debug>(result: Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn linspace_spans_endpoints_monotonically() {
        let values = linspace(0.01, 1.0, 100).expect("linspace");
        assert_eq!(values.len(), 100);
        assert_eq!(values[0], 0.01);
        assert_eq!(values[99], 1.0);
        assert!(values.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn default_angle_axis_spans_full_turn() {
        let theta = crate::surface::SurfaceSettings::default()
            .angle_axis()
            .sample()
            .expect("angle samples");
        assert_eq!(theta.len(), 100);
        assert_eq!(theta[0], 0.0);
        assert_eq!(theta[99], 2.0 * PI);
        assert!(theta.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn linspace_matches_uniform_step() {
        let values = linspace(0.0_f32, 2.0, 5).expect("linspace");
        assert_eq!(values, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn linspace_rejects_single_sample() {
        assert_err_contains(linspace(0.0, 1.0, 1), "at least 2 samples");
    }

    #[test]
    fn axis_spec_validation() {
        assert_err_contains(AxisSpec::new(1.0, 1.0, 10).validate("Radius"), "max > min");
        assert_err_contains(
            AxisSpec::new(0.0, f64::NAN, 10).validate("Angle"),
            "Angle range",
        );
        assert_err_contains(AxisSpec::new(0.0, 1.0, 1).validate("Radius"), "2 samples");
        assert!(AxisSpec::new(0.0, 2.0 * PI, 100).validate("Angle").is_ok());
    }

    #[test]
    fn stride_indices_always_include_last() {
        assert_eq!(stride_indices(10, 3).expect("stride"), vec![0, 3, 6, 9]);
        assert_eq!(stride_indices(11, 3).expect("stride"), vec![0, 3, 6, 9, 10]);
        assert_eq!(stride_indices(4, 1).expect("stride"), vec![0, 1, 2, 3]);
        assert_eq!(stride_indices(5, 50).expect("stride"), vec![0, 4]);
        assert!(stride_indices(0, 5).expect("stride").is_empty());
        assert_err_contains(stride_indices(10, 0), "Stride");
    }

    #[test]
    fn polar_grid_is_outer_product() {
        let grid = PolarGrid::new(
            &AxisSpec::new(0.01, 1.0, 4),
            &AxisSpec::new(0.0, 2.0 * PI, 3),
        )
        .expect("grid");
        assert_eq!(grid.shape(), (3, 4));
        for i in 0..3 {
            for j in 0..4 {
                assert_eq!(grid.radius_mesh[(i, j)], grid.r[j]);
                assert_eq!(grid.angle_mesh[(i, j)], grid.theta[i]);
            }
        }
    }

    #[test]
    fn polar_grid_rejects_branch_point() {
        assert_err_contains(
            PolarGrid::new(
                &AxisSpec::new(0.0, 1.0, 10),
                &AxisSpec::new(0.0, 2.0 * PI, 10),
            ),
            "branch point",
        );
    }
}
