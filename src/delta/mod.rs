//! Row-predictive delta transform for single-channel sample grids.
//!
//! Each sample is replaced by its difference from the previous sample of the
//! same row. The first sample of a row is predicted from the sample above it
//! and the very first sample is stored as is. Differences are 16-bit and wrap.

use std::fmt::Debug;

use num_traits::PrimInt;

use crate::{HuffError, Result};

/// Bytes per residual once flattened.
pub const RESIDUAL_BYTES: usize = 2;

/// Sample depth a grid can be stored with.
pub trait Sample: PrimInt + Debug + Default {
    /// Lossless widening.
    fn to_u16(self) -> u16;
    /// Keeps the low bits of `x`.
    fn from_u16(x: u16) -> Self;
}

impl Sample for u8 {
    #[inline(always)]
    fn to_u16(self) -> u16 {
        self as u16
    }

    #[inline(always)]
    fn from_u16(x: u16) -> Self {
        x as u8
    }
}

impl Sample for u16 {
    #[inline(always)]
    fn to_u16(self) -> u16 {
        self
    }

    #[inline(always)]
    fn from_u16(x: u16) -> Self {
        x
    }
}

/// A `rows` x `cols` matrix of samples stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleGrid<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Sample> SampleGrid<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![T::zero(); rows * cols] }
    }

    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(HuffError::Geometry { rows, cols, samples: data.len() });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    #[inline(always)]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }
}

/// Cell whose value predicts `(row, col)`, if any.
#[inline(always)]
fn predictor(row: usize, col: usize) -> Option<(usize, usize)> {
    match (row, col) {
        (0, 0) => None,
        (r, 0) => Some((r - 1, 0)),
        (r, c) => Some((r, c - 1)),
    }
}

pub fn forward_delta<T: Sample>(grid: &SampleGrid<T>) -> SampleGrid<u16> {
    let mut residuals: SampleGrid<u16> = SampleGrid::new(grid.rows(), grid.cols());

    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let sample = grid.get(row, col).to_u16();
            let predicted = predictor(row, col).map_or(0, |(r, c)| grid.get(r, c).to_u16());
            residuals.set(row, col, sample.wrapping_sub(predicted));
        }
    }

    residuals
}

/// Undoes [`forward_delta`], predicting from the samples already rebuilt.
pub fn inverse_delta<T: Sample>(residuals: &SampleGrid<u16>) -> SampleGrid<T> {
    let mut grid: SampleGrid<T> = SampleGrid::new(residuals.rows(), residuals.cols());

    for row in 0..residuals.rows() {
        for col in 0..residuals.cols() {
            let predicted = predictor(row, col).map_or(0, |(r, c)| grid.get(r, c).to_u16());
            let sample = residuals.get(row, col).wrapping_add(predicted);
            grid.set(row, col, T::from_u16(sample));
        }
    }

    grid
}

/// Low byte first, row-major.
pub fn residuals_to_bytes(residuals: &SampleGrid<u16>) -> Vec<u8> {
    residuals.data().iter().flat_map(|d| d.to_le_bytes()).collect()
}

pub fn bytes_to_residuals(bytes: &[u8], rows: usize, cols: usize) -> Result<SampleGrid<u16>> {
    if bytes.len() % RESIDUAL_BYTES != 0 {
        return Err(HuffError::ResidualShape { len: bytes.len(), width: RESIDUAL_BYTES });
    }

    let data = bytes
        .chunks_exact(RESIDUAL_BYTES)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    SampleGrid::from_vec(rows, cols, data)
}

/// Maps residuals, read as signed values in -255..=255, onto 0..=255 so they
/// can be looked at as an 8-bit image. Zero lands on 128.
pub fn residual_preview(residuals: &SampleGrid<u16>) -> SampleGrid<u8> {
    let mut preview = SampleGrid::new(residuals.rows(), residuals.cols());

    for row in 0..residuals.rows() {
        for col in 0..residuals.cols() {
            let shifted = residuals.get(row, col) as i16 as i32 + 255;
            let value = (shifted / 2 + shifted % 2).clamp(0, 255);
            preview.set(row, col, value as u8);
        }
    }

    preview
}
