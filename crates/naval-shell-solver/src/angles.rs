//! Lateral angle thresholds per impact row.
//!
//! A plate inclined by `inclination` is hit with a vertical obliquity of
//! `fall + inclination`; a lateral (horizontal) angle `l` then gives the total
//! obliquity `acos(cos(fall + inclination) · cos(l))`. Every column here is the
//! lateral angle at which that total reaches one of the shell's thresholds.

use core::f64::consts::FRAC_PI_2;

use naval_shell_core::{Column, ColumnTable, ShellParams};
use naval_shell_models::{critical_fuse_angle, critical_penetration_angle, lateral_limit};

use crate::impact::{ImpactColumn, ImpactTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AngleColumn {
    Distance,
    Ricochet0Rad,
    Ricochet0Deg,
    Ricochet1Rad,
    Ricochet1Deg,
    ArmorRad,
    ArmorDeg,
    FuseRad,
    FuseDeg,
}

pub const ANGLE_COLUMNS: usize = 9;

impl Column for AngleColumn {
    const COUNT: usize = ANGLE_COLUMNS;
    fn index(self) -> usize {
        self as usize
    }
}

pub type AngleTable = ColumnTable<AngleColumn>;

/// Thresholds for impact row `row` against `thickness` [mm] inclined by
/// `inclination` [rad].
///
/// - ricochet: lateral angles where the total obliquity reaches ricochet0/1
/// - armor: largest lateral angle at which the plate is still defeated
/// - fuse: lateral angle from which the plate is thick enough to arm the fuse
pub fn angle_row(
    params: &ShellParams,
    thickness: f64,
    inclination: f64,
    impact: &ImpactTable,
    row: usize,
) -> [f64; ANGLE_COLUMNS] {
    let d = params.derived();
    let vertical = impact.get(row, ImpactColumn::ImpactAngleHorizontalRad) + inclination;
    let raw = impact.get(row, ImpactColumn::RawPenetration);

    let ricochet0 = lateral_limit(d.ricochet0_rad, vertical);
    let ricochet1 = lateral_limit(d.ricochet1_rad, vertical);
    let armor = match params.non_ap_penetration() {
        Some(fixed) if fixed >= thickness => FRAC_PI_2,
        Some(_) => 0.0,
        None => {
            let critical = critical_penetration_angle(raw, thickness, d.normalization_rad);
            if critical > 0.0 {
                lateral_limit(critical, vertical)
            } else {
                0.0
            }
        }
    };
    let fuse = lateral_limit(
        critical_fuse_angle(params.spec().threshold, thickness, d.normalization_rad),
        vertical,
    );

    [
        impact.get(row, ImpactColumn::Distance),
        ricochet0,
        ricochet0.to_degrees(),
        ricochet1,
        ricochet1.to_degrees(),
        armor,
        armor.to_degrees(),
        fuse,
        fuse.to_degrees(),
    ]
}
