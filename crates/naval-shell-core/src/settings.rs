//! Calculation tuning knobs.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShellError};

/// Air density model used by the drag terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtmosphereModel {
    /// Constant sea-level density
    #[default]
    SeaLevel,
    /// ISA lapse-rate troposphere
    Troposphere,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcSettings {
    pub min_angle: f64, // degrees
    pub max_angle: f64, // degrees
    pub precision: f64, // degrees per sweep step
    pub x0: f64,        // m
    pub y0: f64,        // m
    pub dt_min: f64,    // s
    pub max_distance: f64, // m
    pub xf0: f64,       // m, post-penetration start
    pub yf0: f64,       // m, post-penetration start
    pub dtf: f64,       // s, post-penetration step
    /// Divisor applied to time of flight for the adjusted time column
    pub time_multiplier: f64,
    /// Flight-path angle [deg] below which the hybrid scheme switches to RK2
    pub hybrid_switch_angle: f64,
    pub atmosphere: AtmosphereModel,
    /// Dedicated worker count; `None` runs on the global pool
    pub workers: Option<usize>,
    pub keep_trajectories: bool,
}

impl Default for CalcSettings {
    fn default() -> Self {
        Self {
            min_angle: 0.0,
            max_angle: 25.0,
            precision: 0.1,
            x0: 0.0,
            y0: 0.0,
            dt_min: 0.02,
            max_distance: 100_000.0,
            xf0: 0.0,
            yf0: 0.0,
            dtf: 0.0001,
            time_multiplier: 2.75,
            hybrid_switch_angle: 0.0,
            atmosphere: AtmosphereModel::SeaLevel,
            workers: None,
            keep_trajectories: false,
        }
    }
}

impl CalcSettings {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let settings: Self = serde_json::from_str(json).context("parsing calculation settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file; missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(ShellError::InvalidSettings(msg));

        if !(self.min_angle.is_finite() && self.max_angle.is_finite()) {
            return fail("angle range must be finite".into());
        }
        if self.min_angle >= self.max_angle {
            return fail(format!(
                "min_angle {} must be below max_angle {}",
                self.min_angle, self.max_angle
            ));
        }
        for (name, value) in [
            ("precision", self.precision),
            ("dt_min", self.dt_min),
            ("dtf", self.dtf),
            ("max_distance", self.max_distance),
            ("time_multiplier", self.time_multiplier),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return fail(format!("{name} must be positive, got {value}"));
            }
        }
        if self.workers == Some(0) {
            return fail("workers must be at least 1".into());
        }
        Ok(())
    }

    /// Number of launch angles in the sweep: `floor((max - min) / precision) + 1`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn sweep_len(&self) -> usize {
        // small slack so 45 / 0.1 does not round down to 449
        ((self.max_angle - self.min_angle) / self.precision + 1e-9).floor() as usize + 1
    }

    /// Launch angle [deg] of sweep row `i`.
    #[allow(clippy::cast_precision_loss)]
    pub fn launch_angle(&self, i: usize) -> f64 {
        self.min_angle + i as f64 * self.precision
    }
}
