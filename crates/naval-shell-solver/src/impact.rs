//! Launch-angle sweep into the impact table.

use core::f64::consts::FRAC_PI_2;

use naval_shell_core::{CalcSettings, Column, ColumnTable, ShellParams};
use naval_shell_models::{effective_penetration, raw_penetration, DragTerms};
use rayon::prelude::*;

use crate::integrator::{
    integrate_with, AdamsBashforth5, Flight, FlightLimits, ForwardEuler, Hybrid, RungeKutta2,
    RungeKutta4, Scheme, Stepper,
};
use crate::search;

/// Columns of the impact table, in buffer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactColumn {
    Distance,
    LaunchAngle,
    ImpactAngleHorizontalRad,
    ImpactAngleHorizontalDeg,
    ImpactVelocity,
    RawPenetration,
    EffectivePenetrationHorizontal,
    EffectivePenetrationHorizontalNormalized,
    ImpactAngleDeckRad,
    ImpactAngleDeckDeg,
    EffectivePenetrationDeck,
    EffectivePenetrationDeckNormalized,
    TimeToTarget,
    TimeToTargetAdjusted,
}

pub const IMPACT_COLUMNS: usize = 14;

impl Column for ImpactColumn {
    const COUNT: usize = IMPACT_COLUMNS;
    fn index(self) -> usize {
        self as usize
    }
}

/// One row of the impact table from a finished flight.
///
/// Impact angles are magnitudes below the horizontal; the deck angle is
/// measured from the deck normal.
pub fn impact_row(
    params: &ShellParams,
    settings: &CalcSettings,
    launch_deg: f64,
    flight: &Flight,
) -> [f64; IMPACT_COLUMNS] {
    let d = params.derived();
    let fall = flight.fall_angle();
    let deck = FRAC_PI_2 - fall;
    let speed = flight.speed();
    let n = d.normalization_rad;

    let (raw, pens) = match params.non_ap_penetration() {
        Some(fixed) => (fixed, [fixed; 4]),
        None => {
            let raw = raw_penetration(d.pen_coefficient, speed);
            (
                raw,
                [
                    effective_penetration(raw, fall, 0.0),
                    effective_penetration(raw, fall, n),
                    effective_penetration(raw, deck, 0.0),
                    effective_penetration(raw, deck, n),
                ],
            )
        }
    };

    [
        flight.x,
        launch_deg,
        fall,
        fall.to_degrees(),
        speed,
        raw,
        pens[0],
        pens[1],
        deck,
        deck.to_degrees(),
        pens[2],
        pens[3],
        flight.time,
        flight.time / settings.time_multiplier,
    ]
}

/// Impact table plus the index of its range peak.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactTable {
    table: ColumnTable<ImpactColumn>,
    peak: Option<usize>,
    unimodal: bool,
    trajectories: Vec<Vec<[f64; 2]>>,
}

impl ImpactTable {
    pub fn from_parts(table: ColumnTable<ImpactColumn>, trajectories: Vec<Vec<[f64; 2]>>) -> Self {
        let distances = table.column(ImpactColumn::Distance);
        let peak = search::peak_index(distances);
        let unimodal = search::is_unimodal(distances);
        Self { table, peak, unimodal, trajectories }
    }

    pub fn rows(&self) -> usize {
        self.table.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn stride(&self) -> usize {
        self.table.stride()
    }

    pub fn get(&self, row: usize, col: ImpactColumn) -> f64 {
        self.table.get(row, col)
    }

    pub fn column(&self, col: ImpactColumn) -> &[f64] {
        self.table.column(col)
    }

    pub fn as_slice(&self) -> &[f64] {
        self.table.as_slice()
    }

    pub fn table(&self) -> &ColumnTable<ImpactColumn> {
        &self.table
    }

    /// Row of maximum distance; `None` for an empty table.
    pub fn peak_index(&self) -> Option<usize> {
        self.peak
    }

    pub fn is_unimodal(&self) -> bool {
        self.unimodal
    }

    /// Distance range `[first row, peak row]` usable for lookups.
    pub fn interpolable_range(&self) -> Option<(f64, f64)> {
        let peak = self.peak?;
        let d = self.column(ImpactColumn::Distance);
        Some((d[0], d[peak]))
    }

    /// Value of `col` at `distance`, interpolated on the rising part of the table.
    pub fn interpolate(&self, distance: f64, col: ImpactColumn) -> Option<f64> {
        let peak = self.peak?;
        search::interpolate_prefix(self.column(ImpactColumn::Distance), self.column(col), peak, distance)
    }

    /// Sampled (x, y) path of one row; empty unless trajectories were kept.
    pub fn trajectory(&self, row: usize) -> &[[f64; 2]] {
        self.trajectories.get(row).map(Vec::as_slice).unwrap_or_default()
    }
}

fn sweep<S: Stepper>(
    stepper: &S,
    params: &ShellParams,
    settings: &CalcSettings,
    drag: &DragTerms,
) -> Vec<([f64; IMPACT_COLUMNS], Vec<[f64; 2]>)> {
    let limits = FlightLimits::impact(settings);
    let speed = params.muzzle_velocity();
    (0..settings.sweep_len())
        .into_par_iter()
        .map(|i| {
            let launch = settings.launch_angle(i);
            let flight = integrate_with(stepper.clone(), drag, speed, launch.to_radians(), &limits);
            let row = impact_row(params, settings, launch, &flight);
            (row, flight.path)
        })
        .collect()
}

/// Run one flight per launch angle of the sweep and assemble the table.
///
/// Flights are spread over the current rayon pool.
pub fn build_impact_table(params: &ShellParams, settings: &CalcSettings, scheme: Scheme) -> ImpactTable {
    let drag = DragTerms::for_shell(params, settings.atmosphere);
    let results = match scheme {
        Scheme::ForwardEuler => sweep(&ForwardEuler, params, settings, &drag),
        Scheme::RungeKutta2 => sweep(&RungeKutta2, params, settings, &drag),
        Scheme::RungeKutta4 => sweep(&RungeKutta4, params, settings, &drag),
        Scheme::AdamsBashforth5 => sweep(&AdamsBashforth5::default(), params, settings, &drag),
        Scheme::Hybrid => sweep(&Hybrid::new(settings.hybrid_switch_angle), params, settings, &drag),
    };

    let table = ColumnTable::from_rows(results.iter().map(|(row, _)| row));
    let trajectories = if settings.keep_trajectories {
        results.into_iter().map(|(_, path)| path).collect()
    } else {
        Vec::new()
    };
    ImpactTable::from_parts(table, trajectories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use naval_shell_core::ShellSpec;

    fn params(non_ap: f64) -> ShellParams {
        ShellParams::new(ShellSpec {
            caliber: 0.460,
            muzzle_velocity: 780.0,
            drag_coefficient: 0.292,
            mass: 1460.0,
            krupp: 2574.0,
            normalization: 6.0,
            fuse_time: 0.033,
            threshold: 76.0,
            ricochet0: 45.0,
            ricochet1: 60.0,
            non_ap,
            linear_drag: false,
            name: "test".into(),
        })
        .unwrap()
    }

    fn coarse() -> CalcSettings {
        CalcSettings { max_angle: 45.0, precision: 1.0, ..CalcSettings::default() }
    }

    #[test]
    fn first_row_is_the_muzzle() {
        let t = build_impact_table(&params(0.0), &coarse(), Scheme::RungeKutta4);
        assert_eq!(t.rows(), 46);
        assert_eq!(t.get(0, ImpactColumn::Distance), 0.0);
        assert_eq!(t.get(0, ImpactColumn::TimeToTarget), 0.0);
        assert_relative_eq!(t.get(0, ImpactColumn::ImpactVelocity), 780.0);
    }

    #[test]
    fn columns_are_consistent() {
        let s = coarse();
        let t = build_impact_table(&params(0.0), &s, Scheme::RungeKutta4);
        for r in 1..t.rows() {
            let raw = t.get(r, ImpactColumn::RawPenetration);
            let fall = t.get(r, ImpactColumn::ImpactAngleHorizontalRad);
            assert!(fall > 0.0);
            assert_relative_eq!(t.get(r, ImpactColumn::ImpactAngleHorizontalDeg), fall.to_degrees());
            assert_relative_eq!(t.get(r, ImpactColumn::ImpactAngleDeckRad), FRAC_PI_2 - fall);
            for col in [
                ImpactColumn::EffectivePenetrationHorizontal,
                ImpactColumn::EffectivePenetrationHorizontalNormalized,
                ImpactColumn::EffectivePenetrationDeck,
                ImpactColumn::EffectivePenetrationDeckNormalized,
            ] {
                assert!(t.get(r, col) <= raw);
            }
            assert!(
                t.get(r, ImpactColumn::EffectivePenetrationHorizontal)
                    <= t.get(r, ImpactColumn::EffectivePenetrationHorizontalNormalized)
            );
            assert_relative_eq!(
                t.get(r, ImpactColumn::TimeToTargetAdjusted),
                t.get(r, ImpactColumn::TimeToTarget) / s.time_multiplier
            );
        }
    }

    #[test]
    fn non_ap_penetration_is_fixed() {
        let t = build_impact_table(&params(120.0), &coarse(), Scheme::RungeKutta4);
        for r in 0..t.rows() {
            assert_eq!(t.get(r, ImpactColumn::RawPenetration), 120.0);
            assert_eq!(t.get(r, ImpactColumn::EffectivePenetrationDeckNormalized), 120.0);
        }
    }

    #[test]
    fn peak_lies_inside_the_sweep() {
        let t = build_impact_table(&params(0.0), &coarse(), Scheme::RungeKutta4);
        let peak = t.peak_index().unwrap();
        assert!(peak > 0 && peak < t.rows() - 1);
        let d = t.column(ImpactColumn::Distance);
        assert!(d[peak - 1] <= d[peak] && d[peak + 1] <= d[peak]);
        assert!(t.is_unimodal());
    }

    #[test]
    fn trajectories_only_when_asked() {
        let t = build_impact_table(&params(0.0), &coarse(), Scheme::RungeKutta4);
        assert!(t.trajectory(10).is_empty());

        let kept = CalcSettings { keep_trajectories: true, ..coarse() };
        let t = build_impact_table(&params(0.0), &kept, Scheme::RungeKutta4);
        let path = t.trajectory(10);
        assert!(path.len() > 2);
        assert_relative_eq!(path[path.len() - 1][0], t.get(10, ImpactColumn::Distance));
    }
}
