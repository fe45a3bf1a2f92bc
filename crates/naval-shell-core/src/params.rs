//! Shell inputs and the constants derived from them.
//!
//! `ShellSpec` is the raw, serializable parameter set. `ShellParams` validates a
//! spec and condenses it into the values the calculations actually use, so that
//! nothing is recomputed per integration step:
//!
//!   k    = 0.5 · cD · (caliber/2)² · π / mass          (quadratic drag)
//!   cw2  = 100 + 1000/3 · caliber   (only with `linear_drag`)
//!   pPPC = 3.4205e-4 · krupp/2400 · mass^0.5506 · caliber^-0.6521
//!
//! Raw penetration is then `pPPC · v^1.4822`.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShellError};

const PEN_SCALE: f64 = 0.000_342_050_797_394_055_6;
const PEN_KRUPP_REF: f64 = 2400.0;
const PEN_MASS_EXPONENT: f64 = 0.5506;
const PEN_CALIBER_EXPONENT: f64 = -0.6521;

/// Raw shell inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellSpec {
    pub caliber: f64,         // m
    pub muzzle_velocity: f64, // m/s
    pub drag_coefficient: f64,
    pub mass: f64, // kg
    pub krupp: f64,
    pub normalization: f64, // degrees
    pub fuse_time: f64,     // s
    pub threshold: f64,     // mm, fusing threshold
    pub ricochet0: f64,     // degrees
    pub ricochet1: f64,     // degrees
    /// Fixed penetration of non-AP ammunition [mm]; 0 disables.
    #[serde(default)]
    pub non_ap: f64,
    #[serde(default)]
    pub linear_drag: bool,
    #[serde(default)]
    pub name: String,
}

impl ShellSpec {
    fn validate(&self) -> Result<()> {
        let positive = [
            ("caliber", self.caliber),
            ("muzzle_velocity", self.muzzle_velocity),
            ("drag_coefficient", self.drag_coefficient),
            ("mass", self.mass),
            ("krupp", self.krupp),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ShellError::InvalidParameter {
                    name,
                    reason: format!("must be positive and finite, got {value}"),
                });
            }
        }

        let non_negative = [
            ("normalization", self.normalization),
            ("fuse_time", self.fuse_time),
            ("threshold", self.threshold),
            ("non_ap", self.non_ap),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ShellError::InvalidParameter {
                    name,
                    reason: format!("must be non-negative, got {value}"),
                });
            }
        }

        for (name, value) in [("ricochet0", self.ricochet0), ("ricochet1", self.ricochet1)] {
            if !(0.0..=90.0).contains(&value) {
                return Err(ShellError::InvalidParameter {
                    name,
                    reason: format!("must lie in [0, 90] degrees, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Constants condensed from a `ShellSpec`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derived {
    /// Quadratic drag coefficient (per unit air density)
    pub k: f64,
    /// Linear drag ratio; zero unless `linear_drag` is set
    pub cw2: f64,
    /// Penetration coefficient
    pub pen_coefficient: f64,
    pub normalization_rad: f64,
    pub ricochet0_rad: f64,
    pub ricochet1_rad: f64,
}

impl Derived {
    fn from_spec(spec: &ShellSpec) -> Self {
        let radius = spec.caliber / 2.0;
        let k = 0.5 * spec.drag_coefficient * radius * radius * PI / spec.mass;
        let cw2 = if spec.linear_drag {
            100.0 + 1000.0 / 3.0 * spec.caliber
        } else {
            0.0
        };
        let pen_coefficient = PEN_SCALE * spec.krupp / PEN_KRUPP_REF
            * spec.mass.powf(PEN_MASS_EXPONENT)
            * spec.caliber.powf(PEN_CALIBER_EXPONENT);

        Self {
            k,
            cw2,
            pen_coefficient,
            normalization_rad: spec.normalization.to_radians(),
            ricochet0_rad: spec.ricochet0.to_radians(),
            ricochet1_rad: spec.ricochet1.to_radians(),
        }
    }
}

/// A validated shell: raw inputs plus derived constants, always in sync.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellParams {
    spec: ShellSpec,
    derived: Derived,
}

impl ShellParams {
    pub fn new(spec: ShellSpec) -> Result<Self> {
        spec.validate()?;
        let derived = Derived::from_spec(&spec);
        Ok(Self { spec, derived })
    }

    /// Replace the raw inputs; derived constants are recomputed before returning.
    /// On error the previous values are kept.
    pub fn set_spec(&mut self, spec: ShellSpec) -> Result<()> {
        *self = Self::new(spec)?;
        Ok(())
    }

    pub fn spec(&self) -> &ShellSpec {
        &self.spec
    }

    pub fn derived(&self) -> &Derived {
        &self.derived
    }

    pub fn muzzle_velocity(&self) -> f64 {
        self.spec.muzzle_velocity
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Non-AP shells carry a fixed penetration value.
    pub fn non_ap_penetration(&self) -> Option<f64> {
        (self.spec.non_ap > 0.0).then_some(self.spec.non_ap)
    }
}
