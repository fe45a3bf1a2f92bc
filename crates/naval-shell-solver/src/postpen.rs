//! Shell travel after perforating a plate.
//!
//! Each (lateral angle, impact row) pair is one cell. A cell that does not
//! perforate keeps NaN offsets. A perforating shell keeps
//! `v · (1 - exp(1 - pen / effective_thickness))` of its speed and flies for
//! the fuse time, either on a drag-free arc ([`PostPenMode::Fast`]) or
//! re-integrated with drag at step `dtf` ([`PostPenMode::Full`]).

use nalgebra::Vector3;
use naval_shell_core::{CalcSettings, Column, ColumnTable, ShellParams, G};
use naval_shell_models::{
    combined_obliquity, deflected_direction, effective_thickness, residual_velocity, DragTerms,
};
use serde::{Deserialize, Serialize};

use crate::impact::{ImpactColumn, ImpactTable};
use crate::integrator::{integrate_with, FlightLimits, RungeKutta4};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostPenColumn {
    /// Lateral angle [deg]
    LateralAngle,
    /// Distance of the impact row
    Distance,
    X,
    Y,
    Z,
    DetonationDistance,
    /// [`PenetrationOutcome::code`]
    Outcome,
}

pub const POST_PEN_COLUMNS: usize = 7;

impl Column for PostPenColumn {
    const COUNT: usize = POST_PEN_COLUMNS;
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PenetrationOutcome {
    /// Perforated and armed; detonates after the fuse time
    Detonated,
    /// Did not perforate; offsets are NaN
    NotPenetrated,
    /// Perforated without arming the fuse
    FuseLoss,
}

impl PenetrationOutcome {
    pub fn code(self) -> f64 {
        match self {
            PenetrationOutcome::Detonated => 1.0,
            PenetrationOutcome::NotPenetrated => 0.0,
            PenetrationOutcome::FuseLoss => -1.0,
        }
    }

    #[allow(clippy::float_cmp)]
    pub fn from_code(code: f64) -> Option<Self> {
        if code == 1.0 {
            Some(PenetrationOutcome::Detonated)
        } else if code == 0.0 {
            Some(PenetrationOutcome::NotPenetrated)
        } else if code == -1.0 {
            Some(PenetrationOutcome::FuseLoss)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostPenMode {
    #[default]
    Fast,
    Full,
}

/// The plate and how the shell behind it is simulated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostPenTarget {
    /// mm
    pub thickness: f64,
    /// rad
    pub inclination: f64,
    pub mode: PostPenMode,
    /// Turn the residual velocity toward the plate normal by the
    /// normalization allowance
    pub change_direction: bool,
}

/// One cell for lateral angle `lateral_deg` and impact row `row`.
pub fn post_pen_cell(
    params: &ShellParams,
    settings: &CalcSettings,
    drag: &DragTerms,
    target: &PostPenTarget,
    lateral_deg: f64,
    impact: &ImpactTable,
    row: usize,
) -> [f64; POST_PEN_COLUMNS] {
    let distance = impact.get(row, ImpactColumn::Distance);
    let start = Vector3::new(settings.xf0, settings.yf0, 0.0);
    let cell = |offset: Vector3<f64>, detonation: f64, outcome: PenetrationOutcome| {
        [lateral_deg, distance, offset.x, offset.y, offset.z, detonation, outcome.code()]
    };
    let not_penetrated = cell(Vector3::repeat(f64::NAN), f64::NAN, PenetrationOutcome::NotPenetrated);

    if let Some(fixed) = params.non_ap_penetration() {
        return if fixed >= target.thickness {
            cell(start, start.x, PenetrationOutcome::Detonated)
        } else {
            not_penetrated
        };
    }

    let d = params.derived();
    let spec = params.spec();
    let lateral = lateral_deg.to_radians();
    let vertical = impact.get(row, ImpactColumn::ImpactAngleHorizontalRad) + target.inclination;
    let obliquity = combined_obliquity(vertical, lateral);
    let raw = impact.get(row, ImpactColumn::RawPenetration);
    // infinite past grazing incidence
    let e_thickness = effective_thickness(target.thickness, obliquity, d.normalization_rad);
    if raw < e_thickness {
        return not_penetrated;
    }

    let speed = residual_velocity(impact.get(row, ImpactColumn::ImpactVelocity), raw, e_thickness);
    let (vertical_out, lateral_out) = if target.change_direction {
        deflected_direction(vertical, lateral, d.normalization_rad)
    } else {
        (vertical, lateral)
    };
    let descent = vertical_out - target.inclination;
    let t = spec.fuse_time;

    let (along, height) = match target.mode {
        PostPenMode::Fast => (
            speed * descent.cos() * t,
            settings.yf0 - speed * descent.sin() * t - 0.5 * G * t * t,
        ),
        PostPenMode::Full => {
            let flight = integrate_with(
                RungeKutta4,
                drag,
                speed,
                -descent,
                &FlightLimits::post_penetration(settings, t),
            );
            (flight.x - settings.xf0, flight.y)
        }
    };
    let offset = Vector3::new(
        settings.xf0 + along * lateral_out.cos(),
        height,
        along * lateral_out.sin(),
    );

    if e_thickness >= spec.threshold {
        cell(offset, offset.x, PenetrationOutcome::Detonated)
    } else {
        cell(offset, f64::NAN, PenetrationOutcome::FuseLoss)
    }
}

/// Cells for every (lateral angle, impact row) pair; row `a · impact_rows + r`
/// holds angle `a` against impact row `r`.
#[derive(Debug, Clone, PartialEq)]
pub struct PostPenTable {
    table: ColumnTable<PostPenColumn>,
    angles: Vec<f64>,
    impact_rows: usize,
}

impl PostPenTable {
    pub fn new(table: ColumnTable<PostPenColumn>, angles: Vec<f64>, impact_rows: usize) -> Self {
        Self { table, angles, impact_rows }
    }

    /// Lateral angles [deg], in table order.
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    pub fn impact_rows(&self) -> usize {
        self.impact_rows
    }

    pub fn rows(&self) -> usize {
        self.table.rows()
    }

    pub fn stride(&self) -> usize {
        self.table.stride()
    }

    pub fn row_index(&self, angle: usize, row: usize) -> usize {
        angle * self.impact_rows + row
    }

    pub fn get(&self, angle: usize, row: usize, col: PostPenColumn) -> f64 {
        self.table.get(self.row_index(angle, row), col)
    }

    pub fn outcome(&self, angle: usize, row: usize) -> Option<PenetrationOutcome> {
        PenetrationOutcome::from_code(self.get(angle, row, PostPenColumn::Outcome))
    }

    pub fn column(&self, col: PostPenColumn) -> &[f64] {
        self.table.column(col)
    }

    pub fn as_slice(&self) -> &[f64] {
        self.table.as_slice()
    }

    pub fn table(&self) -> &ColumnTable<PostPenColumn> {
        &self.table
    }
}
