//! Aim dispersion as a closed-form function of distance.
//!
//! Horizontal radius grows as a power law from `min_radius` at the muzzle to
//! `ideal_radius` at `ideal_distance`:
//!
//!   h(d) = min + (ideal - min) · (d / ideal_distance)^exponent
//!
//! and is scaled down linearly to zero below `taper_distance`. The vertical
//! radius is `h · ratio(d)`, with `ratio` piecewise linear through
//! `zero_radius` (d = 0), `delim_radius` (d = delim · max_distance) and
//! `max_radius` (d = max_distance). Radii are maxima of a normal distribution
//! truncated at `sigma` standard deviations.

use std::f64::consts::PI;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("invalid dispersion parameter `{name}`: {reason}")]
    InvalidDispersion { name: &'static str, reason: String },
}

impl From<ModelError> for naval_shell_core::ShellError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InvalidDispersion { name, reason } => {
                naval_shell_core::ShellError::InvalidParameter { name, reason }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispersionParams {
    pub ideal_radius: f64,   // m, horizontal radius at ideal_distance
    pub min_radius: f64,     // m, horizontal radius at the muzzle
    pub ideal_distance: f64, // m
    pub horizontal_exponent: f64,
    pub taper_distance: f64, // m, 0 disables
    pub delim: f64,          // fraction of max_distance
    pub zero_radius: f64,    // vertical/horizontal ratio at 0
    pub delim_radius: f64,   // ratio at delim · max_distance
    pub max_radius: f64,     // ratio at max_distance
    pub max_distance: f64,   // m
    pub sigma: f64,
}

impl Default for DispersionParams {
    /// A late-war battleship main battery.
    fn default() -> Self {
        Self {
            ideal_radius: 300.0,
            min_radius: 30.0,
            ideal_distance: 30_000.0,
            horizontal_exponent: 1.0,
            taper_distance: 0.0,
            delim: 0.5,
            zero_radius: 0.2,
            delim_radius: 0.6,
            max_radius: 0.8,
            max_distance: 26_630.0,
            sigma: 2.1,
        }
    }
}

/// Dispersion ellipse at one distance.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispersionSample {
    pub horizontal: f64,
    pub horizontal_std: f64,
    pub vertical: f64,
    pub vertical_std: f64,
    pub vertical_ratio: f64,
    /// Vertical radius projected onto the water plane
    pub vertical_on_water: f64,
    pub area: f64,
}

impl DispersionParams {
    pub fn validate(&self) -> Result<(), ModelError> {
        let fail = |name, reason: &str| {
            Err(ModelError::InvalidDispersion { name, reason: reason.to_owned() })
        };
        for (name, v) in [
            ("ideal_distance", self.ideal_distance),
            ("max_distance", self.max_distance),
            ("sigma", self.sigma),
            ("horizontal_exponent", self.horizontal_exponent),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return fail(name, "must be positive");
            }
        }
        for (name, v) in [
            ("ideal_radius", self.ideal_radius),
            ("min_radius", self.min_radius),
            ("taper_distance", self.taper_distance),
            ("zero_radius", self.zero_radius),
            ("delim_radius", self.delim_radius),
            ("max_radius", self.max_radius),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return fail(name, "must be non-negative");
            }
        }
        if !(self.delim > 0.0 && self.delim < 1.0) {
            return fail("delim", "must lie strictly between 0 and 1");
        }
        Ok(())
    }

    /// Horizontal radius [m] at `distance`, before tapering.
    fn base_horizontal(&self, distance: f64) -> f64 {
        let scale = (distance.max(0.0) / self.ideal_distance).powf(self.horizontal_exponent);
        self.min_radius + (self.ideal_radius - self.min_radius) * scale
    }

    pub fn horizontal(&self, distance: f64) -> f64 {
        if distance < self.taper_distance {
            self.base_horizontal(self.taper_distance) * distance.max(0.0) / self.taper_distance
        } else {
            self.base_horizontal(distance)
        }
    }

    pub fn vertical_ratio(&self, distance: f64) -> f64 {
        let split = self.delim * self.max_distance;
        if distance < split {
            self.zero_radius + (self.delim_radius - self.zero_radius) * distance.max(0.0) / split
        } else {
            self.delim_radius
                + (self.max_radius - self.delim_radius) * (distance - split)
                    / (self.max_distance - split)
        }
    }

    /// Ellipse for a salvo landing at `distance` with fall angle `fall` [rad].
    pub fn evaluate(&self, distance: f64, fall: f64) -> DispersionSample {
        let horizontal = self.horizontal(distance);
        let vertical_ratio = self.vertical_ratio(distance);
        let vertical = horizontal * vertical_ratio;
        let sin_fall = fall.abs().sin();
        let vertical_on_water = if sin_fall > 1e-6 { vertical / sin_fall } else { vertical };

        DispersionSample {
            horizontal,
            horizontal_std: horizontal / self.sigma,
            vertical,
            vertical_std: vertical / self.sigma,
            vertical_ratio,
            vertical_on_water,
            area: PI * horizontal * vertical,
        }
    }
}
