//! 2-D Pixel Buffers
//!
//! [`PixelArray`] is the value handed across the boundary when a caller reads
//! pixels from an image-like foreign object, and the block handed back when a
//! region is assigned. It is a plain owned copy: mutating it never touches
//! foreign memory. In-place mutation of a foreign buffer always goes through
//! the foreign library's region assignment call.
//!
//! ## Layout
//!
//! Row-major; `(row, col)` indexing with `row` along the image height (`y`)
//! and `col` along the width (`x`). Values are stored as `f64` and coerced to
//! the array's [`DType`] on every write, so an `int32` array never holds a
//! fractional value.

use std::fmt;
use std::ops::Range;

use crate::dtype::DType;
use crate::error::{AdapterError, AdapterResult};

// ============================================================================
// Region - rectangular slice of a buffer
// ============================================================================

/// Rectangular region `[rows) x [cols)`, the equivalent of `a[r0:r1, c0:c1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Row range (y)
    pub rows: Range<usize>,
    /// Column range (x)
    pub cols: Range<usize>,
}

impl Region {
    /// Create a region from row and column ranges
    pub fn new(rows: Range<usize>, cols: Range<usize>) -> Self {
        Self { rows, cols }
    }

    /// Region covering a whole buffer of the given shape
    pub fn full(rows: usize, cols: usize) -> Self {
        Self::new(0..rows, 0..cols)
    }

    /// Single pixel
    pub fn pixel(row: usize, col: usize) -> Self {
        Self::new(row..row.saturating_add(1), col..col.saturating_add(1))
    }

    /// Number of rows covered
    pub fn height(&self) -> usize {
        self.rows.end.saturating_sub(self.rows.start)
    }

    /// Number of columns covered
    pub fn width(&self) -> usize {
        self.cols.end.saturating_sub(self.cols.start)
    }

    /// Whether neither range runs backwards
    pub fn is_ordered(&self) -> bool {
        self.rows.start <= self.rows.end && self.cols.start <= self.cols.end
    }

    /// Check the region against a buffer shape
    pub fn check(&self, rows: usize, cols: usize) -> AdapterResult<()> {
        if self.rows.start > self.rows.end || self.rows.end > rows {
            return Err(AdapterError::out_of_range(format!(
                "row slice {}:{} for buffer with {} rows",
                self.rows.start, self.rows.end, rows
            )));
        }
        if self.cols.start > self.cols.end || self.cols.end > cols {
            return Err(AdapterError::out_of_range(format!(
                "column slice {}:{} for buffer with {} columns",
                self.cols.start, self.cols.end, cols
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}, {}:{}]",
            self.rows.start, self.rows.end, self.cols.start, self.cols.end
        )
    }
}

// ============================================================================
// PixelArray
// ============================================================================

/// Owned 2-D pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelArray {
    rows: usize,
    cols: usize,
    dtype: DType,
    data: Vec<f64>,
}

impl PixelArray {
    /// Create a zero-initialized array
    pub fn zeros(rows: usize, cols: usize, dtype: DType) -> Self {
        Self::filled(rows, cols, dtype, 0.0)
    }

    /// Create an array with every pixel set to `value`
    pub fn filled(rows: usize, cols: usize, dtype: DType, value: f64) -> Self {
        Self {
            rows,
            cols,
            dtype,
            data: vec![dtype.coerce(value); rows * cols],
        }
    }

    /// Create from row-major data
    pub fn from_vec(rows: usize, cols: usize, dtype: DType, data: Vec<f64>) -> AdapterResult<Self> {
        if data.len() != rows * cols {
            return Err(AdapterError::out_of_range(format!(
                "{} values cannot fill a {}x{} array",
                data.len(),
                rows,
                cols
            )));
        }
        let data = data.into_iter().map(|v| dtype.coerce(v)).collect();
        Ok(Self {
            rows,
            cols,
            dtype,
            data,
        })
    }

    /// Create from nested rows; all rows must have the same length
    pub fn from_rows(rows: &[Vec<f64>], dtype: DType) -> AdapterResult<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != cols) {
            return Err(AdapterError::out_of_range("ragged rows in pixel array"));
        }
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self::from_vec(rows.len(), cols, dtype, data)
    }

    /// Number of rows (height)
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (width)
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Pixel data type
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Row-major pixel values
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    fn flat_index(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    /// Read one pixel
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.flat_index(row, col).map(|i| self.data[i])
    }

    /// Write one pixel
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> AdapterResult<()> {
        let idx = self.flat_index(row, col).ok_or_else(|| {
            AdapterError::out_of_range(format!(
                "pixel ({}, {}) outside {}x{} array",
                row, col, self.rows, self.cols
            ))
        })?;
        self.data[idx] = self.dtype.coerce(value);
        Ok(())
    }

    /// Copy out a region
    pub fn slice(&self, region: &Region) -> AdapterResult<PixelArray> {
        region.check(self.rows, self.cols)?;
        let mut data = Vec::with_capacity(region.height() * region.width());
        for row in region.rows.clone() {
            let start = row * self.cols;
            data.extend_from_slice(&self.data[start + region.cols.start..start + region.cols.end]);
        }
        Ok(Self {
            rows: region.height(),
            cols: region.width(),
            dtype: self.dtype,
            data,
        })
    }

    /// Overwrite the block starting at `(row0, col0)` with `block`
    pub fn assign(&mut self, row0: usize, col0: usize, block: &PixelArray) -> AdapterResult<()> {
        let region = Region::new(row0..row0 + block.rows, col0..col0 + block.cols);
        region.check(self.rows, self.cols)?;
        for r in 0..block.rows {
            for c in 0..block.cols {
                let value = block.data[r * block.cols + c];
                let idx = (row0 + r) * self.cols + col0 + c;
                self.data[idx] = self.dtype.coerce(value);
            }
        }
        Ok(())
    }

    /// Set every pixel of a region to `value`
    pub fn fill(&mut self, region: &Region, value: f64) -> AdapterResult<()> {
        let block = PixelArray::filled(region.height(), region.width(), self.dtype, value);
        self.assign(region.rows.start, region.cols.start, &block)
    }

    /// Copy converted to another dtype
    pub fn cast(&self, dtype: DType) -> PixelArray {
        Self {
            rows: self.rows,
            cols: self.cols,
            dtype,
            data: self.data.iter().map(|&v| dtype.coerce(v)).collect(),
        }
    }

    /// Row-major nested copy of the pixels
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.cols.max(1)).map(|c| c.to_vec()).collect()
    }
}
