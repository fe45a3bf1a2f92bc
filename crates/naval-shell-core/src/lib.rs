//! Core naval shell utilities
//!
//! Includes:
//! - Physical constants shared by the models and the solver
//! - Atmosphere density (constant sea level or ISA troposphere)
//! - Shell parameters and their derived constants
//! - Calculation settings (sweep range, step sizes, start overrides)
//! - Column-major padded table buffers used for every result table
//! - The workspace error type

pub mod error;
pub mod params;
pub mod settings;
pub mod table;

pub use error::{Result, ShellError, TableKind};
pub use params::{ShellParams, ShellSpec};
pub use settings::{AtmosphereModel, CalcSettings};
pub use table::{padded_len, Column, ColumnTable, LANES};

/// -------------------------
/// Physical constants
/// -------------------------

/// Gravitational acceleration [m/s²]
pub const G: f64 = 9.81;
/// Temperature at sea level [K]
pub const T0: f64 = 288.15;
/// Temperature lapse rate [K/m]
pub const LAPSE_RATE: f64 = 0.0065;
/// Pressure at sea level [Pa]
pub const P0: f64 = 101_325.0;
/// Ideal gas constant [J/(mol·K)]
pub const R_GAS: f64 = 8.31447;
/// Molar mass of dry air [kg/mol]
pub const M_AIR: f64 = 0.028_964_4;
/// Sea-level air density [kg/m³]
pub const RHO0: f64 = 1.225;

/// Highest altitude the troposphere formula is evaluated at [m]
const MAX_ALTITUDE: f64 = 40_000.0;

/// -------------------------
/// Atmosphere
/// -------------------------

/// Air density [kg/m³] at `altitude_m` under the selected model.
///
/// `Troposphere` uses a constant lapse rate:
///   T = T0 - L·y,  p = p0·(1 - L·y/T0)^(gM/RL),  ρ = pM/(RT)
///
/// Altitude is clamped to [0, 40 km]; shells below the waterline see sea-level air.
pub fn air_density(model: AtmosphereModel, altitude_m: f64) -> f64 {
    match model {
        AtmosphereModel::SeaLevel => RHO0,
        AtmosphereModel::Troposphere => {
            let y = altitude_m.clamp(0.0, MAX_ALTITUDE);
            let t_kelvin = T0 - LAPSE_RATE * y;
            let exponent = G * M_AIR / (R_GAS * LAPSE_RATE);
            let p_pa = P0 * (1.0 - LAPSE_RATE * y / T0).powf(exponent);
            p_pa * M_AIR / (R_GAS * t_kelvin)
        }
    }
}

/// -------------------------
/// Angles
/// -------------------------

/// Reduce an obliquity by the normalization allowance, never below zero.
#[inline]
pub fn normalize_obliquity(angle_rad: f64, normalization_rad: f64) -> f64 {
    (angle_rad.abs() - normalization_rad).max(0.0)
}
