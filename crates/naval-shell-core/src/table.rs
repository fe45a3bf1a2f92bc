//! Column-major result buffers.
//!
//! Layout contract shared by every result table:
//!
//! - One `f64` buffer, `C::COUNT` columns laid out back to back.
//! - Each column occupies `stride` slots, where `stride = padded_len(rows)`
//!   rounds the logical row count up to a multiple of [`LANES`].
//! - Cell `(row, col)` lives at `row + col.index() * stride`.
//! - Padding slots (`rows..stride` in every column) are zero and never read
//!   by accessors; [`ColumnTable::as_slice`] exposes them for bulk export.

use std::marker::PhantomData;

/// Row padding granularity (four f64 per 256-bit lane).
pub const LANES: usize = 4;

/// Round `rows` up to the next multiple of [`LANES`].
pub fn padded_len(rows: usize) -> usize {
    rows.div_ceil(LANES) * LANES
}

/// A typed column index.
pub trait Column: Copy {
    const COUNT: usize;
    fn index(self) -> usize;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTable<C> {
    rows: usize,
    stride: usize,
    data: Vec<f64>,
    _columns: PhantomData<C>,
}

impl<C: Column> ColumnTable<C> {
    /// A zero-filled table of `rows` logical rows.
    pub fn new(rows: usize) -> Self {
        let stride = padded_len(rows);
        Self {
            rows,
            stride,
            data: vec![0.0; stride * C::COUNT],
            _columns: PhantomData,
        }
    }

    /// Build a table from per-row values, in row order.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: ExactSizeIterator,
        I::Item: AsRef<[f64]>,
    {
        let mut table = Self::new(rows.len());
        for (r, values) in rows.enumerate() {
            table.write_row(r, values.as_ref());
        }
        table
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Padded row count (distance between two columns in the buffer).
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// # Panics
    /// If `row >= self.rows()`.
    pub fn get(&self, row: usize, col: C) -> f64 {
        assert!(row < self.rows, "row {row} out of bounds ({} rows)", self.rows);
        self.data[row + col.index() * self.stride]
    }

    /// # Panics
    /// If `row >= self.rows()`.
    pub fn set(&mut self, row: usize, col: C, value: f64) {
        assert!(row < self.rows, "row {row} out of bounds ({} rows)", self.rows);
        self.data[row + col.index() * self.stride] = value;
    }

    /// Logical rows of one column.
    pub fn column(&self, col: C) -> &[f64] {
        let start = col.index() * self.stride;
        &self.data[start..start + self.rows]
    }

    /// Every column value of one row, in column order.
    ///
    /// # Panics
    /// If `row >= self.rows()`.
    pub fn row(&self, row: usize) -> Vec<f64> {
        assert!(row < self.rows, "row {row} out of bounds ({} rows)", self.rows);
        (0..C::COUNT).map(|c| self.data[row + c * self.stride]).collect()
    }

    /// The whole buffer, padding included.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Write `values` (one per column, in column order) into `row`.
    ///
    /// # Panics
    /// If `values` is not exactly `C::COUNT` long or `row` is out of bounds.
    pub fn write_row(&mut self, row: usize, values: &[f64]) {
        assert_eq!(values.len(), C::COUNT, "row width mismatch");
        assert!(row < self.rows, "row {row} out of bounds ({} rows)", self.rows);
        for (c, v) in values.iter().enumerate() {
            self.data[row + c * self.stride] = *v;
        }
    }
}
