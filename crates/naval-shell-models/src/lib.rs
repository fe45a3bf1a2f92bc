//! naval-shell-models
//!
//! Closed-form models used by the solver, none of which integrate anything:
//!
//! - Drag: quadratic (and optional linear) deceleration scaled by air density,
//!
//!     |a_drag| = ρ(y) · k · (v² + cw2 · v)
//!
//! - Penetration: `pen = pPPC · v^1.4822`, obliquity normalization, effective
//!   thickness, residual speed after perforation, and the conversion between a
//!   total obliquity limit and the matching lateral (horizontal) angle.
//! - Dispersion: see [`dispersion`].
//!
//! Angles are radians unless a name says otherwise.

use core::f64::consts::FRAC_PI_2;

use naval_shell_core::{air_density, normalize_obliquity, AtmosphereModel, ShellParams};

pub mod dispersion;

pub use dispersion::{DispersionParams, DispersionSample, ModelError};

/* --------------------------------- drag --------------------------------- */

/// Drag coefficients of one shell under one atmosphere model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragTerms {
    k: f64,
    cw2: f64,
    atmosphere: AtmosphereModel,
}

impl DragTerms {
    pub fn new(k: f64, cw2: f64, atmosphere: AtmosphereModel) -> Self {
        Self { k, cw2, atmosphere }
    }

    pub fn for_shell(params: &ShellParams, atmosphere: AtmosphereModel) -> Self {
        let d = params.derived();
        Self::new(d.k, d.cw2, atmosphere)
    }

    /// Coefficient of v² at `altitude` [1/m].
    #[inline]
    pub fn quadratic_term(&self, altitude: f64) -> f64 {
        air_density(self.atmosphere, altitude) * self.k
    }

    /// Coefficient of v at `altitude` [1/s].
    #[inline]
    pub fn linear_term(&self, altitude: f64) -> f64 {
        self.quadratic_term(altitude) * self.cw2
    }

    /// Deceleration magnitude [m/s²], opposing the velocity vector.
    #[inline]
    pub fn deceleration(&self, speed: f64, altitude: f64) -> f64 {
        self.quadratic_term(altitude) * (speed * speed + self.cw2 * speed)
    }
}

/* ------------------------------ penetration ------------------------------ */

/// Empirical velocity exponent of the penetration formula.
pub const VELOCITY_EXPONENT: f64 = 1.482_206_489_295_385_5;

/// Penetration [mm] of a shell hitting a perpendicular plate at `speed`.
#[inline]
pub fn raw_penetration(coefficient: f64, speed: f64) -> f64 {
    coefficient * speed.max(0.0).powf(VELOCITY_EXPONENT)
}

/// Penetration left after the plate obliquity, normalization applied.
/// Never exceeds `raw`.
#[inline]
pub fn effective_penetration(raw: f64, obliquity: f64, normalization: f64) -> f64 {
    raw * normalize_obliquity(obliquity, normalization).cos()
}

/// Line-of-sight thickness [mm] the shell has to defeat.
///
/// Infinite once the normalized obliquity reaches 90°: the shell no longer
/// travels into the plate.
#[inline]
pub fn effective_thickness(thickness: f64, obliquity: f64, normalization: f64) -> f64 {
    let angle = normalize_obliquity(obliquity, normalization);
    if angle >= FRAC_PI_2 {
        return f64::INFINITY;
    }
    thickness / angle.cos()
}

/// Speed left after perforating `effective_thickness` with `penetration`.
///
/// Zero when the two are equal, negative when the plate is not defeated.
#[inline]
pub fn residual_velocity(speed: f64, penetration: f64, effective_thickness: f64) -> f64 {
    speed * (1.0 - (1.0 - penetration / effective_thickness).exp())
}

/// Total obliquity of a plate hit at `vertical` (fall + inclination) and
/// `lateral` (horizontal) angles.
#[inline]
pub fn combined_obliquity(vertical: f64, lateral: f64) -> f64 {
    (vertical.cos() * lateral.cos()).clamp(-1.0, 1.0).acos()
}

/// Largest lateral angle whose total obliquity stays within `critical` for a
/// shell falling at `vertical`.
///
/// Returns 0 when even a head-on lateral hit exceeds `critical`, and π/2
/// when no lateral angle does.
pub fn lateral_limit(critical: f64, vertical: f64) -> f64 {
    if critical >= FRAC_PI_2 {
        return FRAC_PI_2;
    }
    let cos_vertical = vertical.cos();
    if cos_vertical <= 0.0 {
        return 0.0;
    }
    let ratio = critical.cos() / cos_vertical;
    if ratio > 1.0 {
        0.0
    } else {
        ratio.acos()
    }
}

/// Largest total obliquity at which `raw` still defeats `thickness`.
pub fn critical_penetration_angle(raw: f64, thickness: f64, normalization: f64) -> f64 {
    if raw > thickness {
        (thickness / raw).acos() + normalization
    } else {
        0.0
    }
}

/// Smallest total obliquity at which `thickness` arms a fuse with the given
/// `threshold`; 0 when the plate arms it head-on.
pub fn critical_fuse_angle(threshold: f64, thickness: f64, normalization: f64) -> f64 {
    if thickness >= threshold {
        0.0
    } else {
        (thickness / threshold).acos() + normalization
    }
}

/// Direction after the shell turns toward the plate normal by the
/// normalization allowance.
///
/// Takes and returns `(vertical, lateral)` angles in the plate frame.
pub fn deflected_direction(vertical: f64, lateral: f64, normalization: f64) -> (f64, f64) {
    let obliquity = combined_obliquity(vertical, lateral);
    if obliquity < 1e-9 || obliquity >= FRAC_PI_2 - 1e-9 {
        return (vertical, lateral);
    }
    let ratio = normalize_obliquity(obliquity, normalization).tan() / obliquity.tan();
    let lateral_out = (ratio * lateral.tan()).atan();
    let vertical_out = (ratio * lateral_out.cos() * vertical.tan() / lateral.cos()).atan();
    (vertical_out, lateral_out)
}

/* -------------------------------- tests -------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn drag_scales_with_density_and_speed() {
        let sea = DragTerms::new(1.66e-5, 0.0, AtmosphereModel::SeaLevel);
        assert_relative_eq!(sea.deceleration(780.0, 0.0), 1.225 * 1.66e-5 * 780.0 * 780.0);
        assert_eq!(sea.linear_term(0.0), 0.0);

        let thin = DragTerms::new(1.66e-5, 0.0, AtmosphereModel::Troposphere);
        assert!(thin.deceleration(780.0, 8_000.0) < thin.deceleration(780.0, 0.0));

        let linear = DragTerms::new(1.0e-5, 250.0, AtmosphereModel::SeaLevel);
        assert_relative_eq!(
            linear.deceleration(500.0, 0.0),
            linear.quadratic_term(0.0) * 500.0 * 500.0 + linear.linear_term(0.0) * 500.0
        );
    }

    #[test]
    fn effective_never_beats_raw() {
        let n = 6f64.to_radians();
        for deg in 0..90 {
            let a = f64::from(deg).to_radians();
            assert!(effective_penetration(500.0, a, n) <= 500.0);
        }
        assert_eq!(effective_penetration(500.0, 3f64.to_radians(), n), 500.0);
    }

    #[test]
    fn residual_velocity_changes_sign_at_balance() {
        assert_abs_diff_eq!(residual_velocity(500.0, 300.0, 300.0), 0.0);
        assert!(residual_velocity(500.0, 400.0, 300.0) > 0.0);
        assert!(residual_velocity(500.0, 200.0, 300.0) < 0.0);
    }

    #[test]
    fn effective_thickness_grows_without_bound_past_grazing() {
        let n = 6f64.to_radians();
        assert_relative_eq!(effective_thickness(100.0, 66f64.to_radians(), n), 200.0, max_relative = 1e-12);
        assert_eq!(effective_thickness(100.0, 96f64.to_radians(), n), f64::INFINITY);
        // obliquity beyond a quarter turn plus normalization: never negative
        assert_eq!(effective_thickness(100.0, 120f64.to_radians(), n), f64::INFINITY);
    }

    #[test]
    fn lateral_limit_edges() {
        assert_eq!(lateral_limit(FRAC_PI_2, 0.3), FRAC_PI_2);
        // already past the limit head-on
        assert_eq!(lateral_limit(0.2, 0.3), 0.0);
        // flat fall: lateral limit equals the critical obliquity itself
        assert_relative_eq!(lateral_limit(0.7, 0.0), 0.7, epsilon = 1e-12);
        // the limit angle reproduces the critical obliquity
        let l = lateral_limit(1.0, 0.4);
        assert_relative_eq!(combined_obliquity(0.4, l), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn critical_angles() {
        let n = 6f64.to_radians();
        assert_eq!(critical_penetration_angle(100.0, 200.0, n), 0.0);
        assert_relative_eq!(critical_penetration_angle(200.0, 100.0, n), 60f64.to_radians() + n);
        assert_eq!(critical_fuse_angle(76.0, 100.0, n), 0.0);
        assert_relative_eq!(critical_fuse_angle(76.0, 38.0, n), 60f64.to_radians() + n);
    }

    #[test]
    fn deflection_removes_normalization() {
        let n = 6f64.to_radians();
        let (v, l) = deflected_direction(0.5, 0.0, n);
        assert_relative_eq!(v, 0.5 - n, epsilon = 1e-12);
        assert_eq!(l, 0.0);

        let (v, l) = deflected_direction(0.3, 0.4, n);
        assert!(v < 0.3 && l < 0.4);
        assert_relative_eq!(combined_obliquity(v, l), combined_obliquity(0.3, 0.4) - n, epsilon = 1e-9);
    }
}
