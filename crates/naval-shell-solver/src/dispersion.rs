//! Dispersion ellipse per impact row.

use naval_shell_core::{Column, ColumnTable};
use naval_shell_models::DispersionParams;

use crate::impact::{ImpactColumn, ImpactTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispersionColumn {
    Distance,
    Horizontal,
    HorizontalStd,
    Vertical,
    VerticalStd,
    VerticalRatio,
    VerticalOnWater,
    Area,
}

pub const DISPERSION_COLUMNS: usize = 8;

impl Column for DispersionColumn {
    const COUNT: usize = DISPERSION_COLUMNS;
    fn index(self) -> usize {
        self as usize
    }
}

pub type DispersionTable = ColumnTable<DispersionColumn>;

pub fn dispersion_row(model: &DispersionParams, impact: &ImpactTable, row: usize) -> [f64; DISPERSION_COLUMNS] {
    let distance = impact.get(row, ImpactColumn::Distance);
    let s = model.evaluate(distance, impact.get(row, ImpactColumn::ImpactAngleHorizontalRad));
    [
        distance,
        s.horizontal,
        s.horizontal_std,
        s.vertical,
        s.vertical_std,
        s.vertical_ratio,
        s.vertical_on_water,
        s.area,
    ]
}
