//! naval-shell-solver
//!
//! Numerical side of the naval shell calculator.
//! - Planar point-mass integration under gravity and drag with five
//!   interchangeable schemes (Euler, RK2, RK4, Adams-Bashforth 5, hybrid).
//! - Launch-angle sweeps into a column-major impact table, with a binary peak
//!   search and distance-keyed interpolation on the rising part of the table.
//! - Per-row lateral angle thresholds (ricochet, armor, fuse).
//! - Post-penetration travel per (lateral angle, impact row) pair.
//! - Dispersion ellipses per impact row.
//!
//! Rows are independent, so every table is filled in parallel with rayon.
//!
//! Conventions:
//! - x downrange, y up, z to the right of the line of fire.
//! - Launch angles and user-facing plate angles in degrees; table columns
//!   carry both radian and degree forms where both are useful.

pub mod angles;
pub mod calc;
pub mod dispersion;
pub mod impact;
pub mod integrator;
pub mod postpen;
pub mod search;

pub use angles::{angle_row, AngleColumn, AngleTable};
pub use calc::{Shell, ShellCalc, ShellResults};
pub use dispersion::{dispersion_row, DispersionColumn, DispersionTable};
pub use impact::{build_impact_table, impact_row, ImpactColumn, ImpactTable};
pub use integrator::{integrate_with, Flight, FlightLimits, Scheme, Stepper, Termination};
pub use postpen::{post_pen_cell, PenetrationOutcome, PostPenColumn, PostPenMode, PostPenTable, PostPenTarget};
pub use search::{interpolate_prefix, is_unimodal, peak_index};

pub use naval_shell_core::{CalcSettings, Result, ShellError, ShellParams, ShellSpec, TableKind};
pub use naval_shell_models::DispersionParams;
