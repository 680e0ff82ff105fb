use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::surface::SheetIndex;

/// Normalizes angle into hue; two sheets together cover one full hue cycle.
pub const HUE_ANGLE_DIVISOR: f64 = 4.0 * PI;
/// Hue offset between the principal and negated sheets.
pub const SHEET_HUE_OFFSET: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::opaque(1.0, 1.0, 1.0);

    pub const fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        (
            channel_to_u8(self.r),
            channel_to_u8(self.g),
            channel_to_u8(self.b),
        )
    }
}

fn channel_to_u8(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Cyclic hue wheel at full saturation and value.
///
/// `value` wraps into `[0, 1)`, so `hsv(0.0) == hsv(1.0)` (pure red).
pub fn hsv(value: f64) -> Rgba {
    let hue = (value.rem_euclid(1.0) * 6.0) % 6.0;
    let sector = hue.floor();
    let frac = hue - sector;
    let rising = frac;
    let falling = 1.0 - frac;
    match sector as u8 {
        0 => Rgba::opaque(1.0, rising, 0.0),
        1 => Rgba::opaque(falling, 1.0, 0.0),
        2 => Rgba::opaque(0.0, 1.0, rising),
        3 => Rgba::opaque(0.0, falling, 1.0),
        4 => Rgba::opaque(rising, 0.0, 1.0),
        _ => Rgba::opaque(1.0, 0.0, falling),
    }
}

/// Hue in `[0, 1)` used for the point at angle `theta` on `sheet`.
pub fn sheet_hue(theta: f64, sheet: SheetIndex) -> f64 {
    let base = theta / HUE_ANGLE_DIVISOR;
    let offset = match sheet {
        SheetIndex::Principal => 0.0,
        SheetIndex::Negated => SHEET_HUE_OFFSET,
    };
    (base + offset).rem_euclid(1.0)
}

pub fn sheet_color(theta: f64, sheet: SheetIndex) -> Rgba {
    hsv(sheet_hue(theta, sheet))
}

/// Smallest brightness factor, reached on faces turned fully away from the light.
pub const MIN_SHADE: f64 = 0.3;

/// Directional light given by azimuth and altitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSource {
    pub azimuth_deg: f64,
    pub altitude_deg: f64,
}

impl Default for LightSource {
    fn default() -> Self {
        Self {
            azimuth_deg: 225.0,
            altitude_deg: 19.4712,
        }
    }
}

impl LightSource {
    /// Unit vector pointing towards the light.
    pub fn direction(&self) -> [f64; 3] {
        let az = (90.0 - self.azimuth_deg).to_radians();
        let alt = self.altitude_deg.to_radians();
        [az.cos() * alt.cos(), az.sin() * alt.cos(), alt.sin()]
    }

    /// Scales the RGB channels of `color` by how directly `normal` faces the light.
    ///
    /// The cosine in `[-1, 1]` maps linearly onto `[MIN_SHADE, 1]`; alpha is kept.
    pub fn shade(&self, color: Rgba, normal: [f64; 3]) -> Rgba {
        let [nx, ny, nz] = normal;
        let norm = (nx * nx + ny * ny + nz * nz).sqrt();
        if !norm.is_finite() || norm == 0.0 {
            return color;
        }
        let light = self.direction();
        let cosine = (nx * light[0] + ny * light[1] + nz * light[2]) / norm;
        let factor = MIN_SHADE + (1.0 - MIN_SHADE) * 0.5 * (cosine.clamp(-1.0, 1.0) + 1.0);
        Rgba {
            r: color.r * factor,
            g: color.g * factor,
            b: color.b * factor,
            a: color.a,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Rgba, b: Rgba) {
        for (x, y) in [(a.r, b.r), (a.g, b.g), (a.b, b.b), (a.a, b.a)] {
            assert!((x - y).abs() < 1e-12, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn hsv_primary_hues() {
        assert_close(hsv(0.0), Rgba::opaque(1.0, 0.0, 0.0));
        assert_close(hsv(1.0 / 3.0), Rgba::opaque(0.0, 1.0, 0.0));
        assert_close(hsv(2.0 / 3.0), Rgba::opaque(0.0, 0.0, 1.0));
        assert_close(hsv(0.5), Rgba::opaque(0.0, 1.0, 1.0));
    }

    #[test]
    fn hsv_is_cyclic() {
        assert_close(hsv(1.0), hsv(0.0));
        assert_close(hsv(1.25), hsv(0.25));
        assert_close(hsv(-0.25), hsv(0.75));
    }

    #[test]
    fn negated_sheet_is_half_cycle_ahead() {
        for k in 0..=16 {
            let theta = 2.0 * PI * k as f64 / 16.0;
            let h1 = sheet_hue(theta, SheetIndex::Principal);
            let h2 = sheet_hue(theta, SheetIndex::Negated);
            let expected = (h1 + 0.5).rem_euclid(1.0);
            assert!((h2 - expected).abs() < 1e-12, "theta={theta}");
        }
    }

    #[test]
    fn hue_is_continuous_across_branch_cut() {
        // Sheet 1 at theta = 2*pi continues into sheet 2 at theta = 0.
        let end_of_first = sheet_hue(2.0 * PI, SheetIndex::Principal);
        let start_of_second = sheet_hue(0.0, SheetIndex::Negated);
        assert!((end_of_first - start_of_second).abs() < 1e-12);
    }

    #[test]
    fn shading_depends_on_normal() {
        let light = LightSource::default();
        let base = hsv(0.2);
        let facing = light.shade(base, light.direction());
        let away = light.shade(base, [0.0, 0.0, -1.0]);
        assert_close(facing, base);
        assert!(away.r < facing.r && away.g < facing.g);
        assert_ne!(light.shade(base, [0.0, 0.0, 1.0]), away);
        assert_eq!(away.a, 1.0);
    }

    #[test]
    fn shading_bounds_and_degenerate_normals() {
        let light = LightSource::default();
        let opposite = light.direction().map(|v| -v);
        let darkest = light.shade(Rgba::WHITE, opposite);
        assert!((darkest.r - MIN_SHADE).abs() < 1e-12);
        assert_eq!(light.shade(Rgba::WHITE, [0.0, 0.0, 0.0]), Rgba::WHITE);
    }

    #[test]
    fn light_direction_is_unit() {
        let d = LightSource::default().direction();
        let norm = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        assert!(d[2] > 0.0);
    }

    #[test]
    fn rgb8_conversion_clamps() {
        let color = Rgba::opaque(1.2, 0.5, -0.1);
        assert_eq!(color.to_rgb8(), (255, 128, 0));
    }
}
