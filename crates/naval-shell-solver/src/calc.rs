//! Shells, their result tables, and the calculator that fills them.
//!
//! Call order: build a [`Shell`], build a [`ShellCalc`] from settings, run
//! [`ShellCalc::calculate_impact`], then any of the angle, post-penetration
//! and dispersion calculations. Each of those reads the impact table and
//! fails with [`ShellError::NotComputed`] without one.

use naval_shell_core::{CalcSettings, ColumnTable, Result, ShellError, ShellParams, ShellSpec, TableKind};
use naval_shell_models::{DispersionParams, DragTerms};
use rayon::prelude::*;

use crate::angles::{angle_row, AngleTable};
use crate::dispersion::{dispersion_row, DispersionTable};
use crate::impact::{build_impact_table, ImpactColumn, ImpactTable};
use crate::integrator::Scheme;
use crate::postpen::{post_pen_cell, PostPenMode, PostPenTable, PostPenTarget};

/// Result tables of one shell; `None` until calculated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShellResults {
    pub impact: Option<ImpactTable>,
    pub angles: Option<AngleTable>,
    pub post_pen: Option<PostPenTable>,
    pub dispersion: Option<DispersionTable>,
}

impl ShellResults {
    /// Drop the tables derived from the impact table.
    fn clear_dependents(&mut self) {
        self.angles = None;
        self.post_pen = None;
        self.dispersion = None;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shell {
    params: ShellParams,
    results: ShellResults,
}

impl Shell {
    pub fn new(spec: ShellSpec) -> Result<Self> {
        Ok(Self::from_params(ShellParams::new(spec)?))
    }

    pub fn from_params(params: ShellParams) -> Self {
        Self { params, results: ShellResults::default() }
    }

    pub fn params(&self) -> &ShellParams {
        &self.params
    }

    pub fn results(&self) -> &ShellResults {
        &self.results
    }

    /// Replace the shell inputs. Every table is dropped; on error nothing changes.
    pub fn set_spec(&mut self, spec: ShellSpec) -> Result<()> {
        self.params.set_spec(spec)?;
        self.results = ShellResults::default();
        Ok(())
    }

    pub fn impact(&self) -> Result<&ImpactTable> {
        self.results.impact.as_ref().ok_or(ShellError::NotComputed(TableKind::Impact))
    }

    pub fn angles(&self) -> Result<&AngleTable> {
        self.results.angles.as_ref().ok_or(ShellError::NotComputed(TableKind::Angle))
    }

    pub fn post_pen(&self) -> Result<&PostPenTable> {
        self.results
            .post_pen
            .as_ref()
            .ok_or(ShellError::NotComputed(TableKind::PostPenetration))
    }

    pub fn dispersion(&self) -> Result<&DispersionTable> {
        self.results
            .dispersion
            .as_ref()
            .ok_or(ShellError::NotComputed(TableKind::Dispersion))
    }

    /// Row of maximum range.
    pub fn peak_index(&self) -> Result<usize> {
        self.impact()?.peak_index().ok_or(ShellError::NoData)
    }

    /// Impact column `col` at `distance` [m], on the rising part of the table.
    pub fn interpolate_impact(&self, distance: f64, col: ImpactColumn) -> Result<f64> {
        let impact = self.impact()?;
        let (min, max) = impact.interpolable_range().ok_or(ShellError::NoData)?;
        impact
            .interpolate(distance, col)
            .ok_or(ShellError::OutOfRange { distance, min, max })
    }
}

fn check_plate(thickness: f64, inclination_deg: f64) -> Result<()> {
    if !(thickness.is_finite() && thickness > 0.0) {
        return Err(ShellError::InvalidParameter {
            name: "thickness",
            reason: format!("must be positive and finite, got {thickness}"),
        });
    }
    if !inclination_deg.is_finite() {
        return Err(ShellError::InvalidParameter {
            name: "inclination",
            reason: format!("must be finite, got {inclination_deg}"),
        });
    }
    Ok(())
}

/// Runs calculations under one set of settings, on a dedicated pool when
/// `workers` is set and on the global rayon pool otherwise.
#[derive(Debug)]
pub struct ShellCalc {
    settings: CalcSettings,
    pool: Option<rayon::ThreadPool>,
}

impl ShellCalc {
    pub fn new(settings: CalcSettings) -> Result<Self> {
        settings.validate()?;
        let pool = Self::build_pool(settings.workers)?;
        Ok(Self { settings, pool })
    }

    fn build_pool(workers: Option<usize>) -> Result<Option<rayon::ThreadPool>> {
        workers
            .map(|n| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| ShellError::ThreadPool(e.to_string()))
            })
            .transpose()
    }

    pub fn settings(&self) -> &CalcSettings {
        &self.settings
    }

    /// Swap settings; the pool is rebuilt when the worker count changes.
    pub fn set_settings(&mut self, settings: CalcSettings) -> Result<()> {
        settings.validate()?;
        if settings.workers != self.settings.workers {
            self.pool = Self::build_pool(settings.workers)?;
        }
        self.settings = settings;
        Ok(())
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Sweep the launch angles and store a fresh impact table. Tables derived
    /// from a previous impact table are dropped.
    pub fn calculate_impact(&self, shell: &mut Shell, scheme: Scheme) {
        let s = &self.settings;
        log::debug!(
            "impact sweep for '{}': {} angles from {} to {} deg, {:?}",
            shell.params.name(),
            s.sweep_len(),
            s.min_angle,
            s.max_angle,
            scheme
        );
        let params = &shell.params;
        let table = self.install(|| build_impact_table(params, s, scheme));
        if !table.is_unimodal() {
            log::warn!(
                "impact distances of '{}' have more than one local maximum; lookups use row {:?}",
                shell.params.name(),
                table.peak_index()
            );
        }
        log::info!(
            "impact table for '{}': {} rows, peak at row {:?}",
            shell.params.name(),
            table.rows(),
            table.peak_index()
        );
        shell.results.clear_dependents();
        shell.results.impact = Some(table);
    }

    /// Lateral ricochet, armor and fuse thresholds against a plate of
    /// `thickness` [mm] inclined by `inclination_deg`.
    pub fn calculate_angles(&self, shell: &mut Shell, thickness: f64, inclination_deg: f64) -> Result<()> {
        check_plate(thickness, inclination_deg)?;
        let impact = shell.impact()?;
        let params = &shell.params;
        let inclination = inclination_deg.to_radians();

        let rows: Vec<_> = self.install(|| {
            (0..impact.rows())
                .into_par_iter()
                .map(|r| angle_row(params, thickness, inclination, impact, r))
                .collect()
        });
        let table = ColumnTable::from_rows(rows.iter());
        log::info!("angle table for '{}': {} rows at {thickness} mm", params.name(), table.rows());
        shell.results.angles = Some(table);
        Ok(())
    }

    /// Post-penetration offsets for every lateral angle in `angles_deg`
    /// against every impact row.
    pub fn calculate_post_pen(
        &self,
        shell: &mut Shell,
        thickness: f64,
        inclination_deg: f64,
        angles_deg: &[f64],
        mode: PostPenMode,
        change_direction: bool,
    ) -> Result<()> {
        check_plate(thickness, inclination_deg)?;
        if let Some(bad) = angles_deg.iter().find(|a| !(-90.0..=90.0).contains(*a)) {
            return Err(ShellError::InvalidParameter {
                name: "angles",
                reason: format!("lateral angles must lie in [-90, 90] degrees, got {bad}"),
            });
        }
        let impact = shell.impact()?;
        let params = &shell.params;
        let settings = &self.settings;
        let drag = DragTerms::for_shell(params, settings.atmosphere);
        let target = PostPenTarget {
            thickness,
            inclination: inclination_deg.to_radians(),
            mode,
            change_direction,
        };
        let impact_rows = impact.rows();
        log::debug!(
            "post-penetration for '{}': {} angles x {impact_rows} rows, {mode:?}",
            params.name(),
            angles_deg.len()
        );

        let cells: Vec<_> = self.install(|| {
            (0..angles_deg.len() * impact_rows)
                .into_par_iter()
                .map(|i| {
                    let (a, r) = (i / impact_rows, i % impact_rows);
                    post_pen_cell(params, settings, &drag, &target, angles_deg[a], impact, r)
                })
                .collect()
        });
        let table = PostPenTable::new(ColumnTable::from_rows(cells.iter()), angles_deg.to_vec(), impact_rows);
        log::info!("post-penetration table for '{}': {} rows", params.name(), table.rows());
        shell.results.post_pen = Some(table);
        Ok(())
    }

    pub fn calculate_dispersion(&self, shell: &mut Shell, model: &DispersionParams) -> Result<()> {
        model.validate()?;
        let impact = shell.impact()?;
        let rows: Vec<_> = self.install(|| {
            (0..impact.rows())
                .into_par_iter()
                .map(|r| dispersion_row(model, impact, r))
                .collect()
        });
        shell.results.dispersion = Some(ColumnTable::from_rows(rows.iter()));
        Ok(())
    }
}
