#![warn(missing_docs)]
//! Transfer-matrix algebra.
//!
//! This module provides a small dense [`Matrix`] type together with the [`MatrixBackend`] trait, which
//! defines the operations needed for composing paraxial transfer matrices (matrix product, matrix-vector
//! product and integer matrix powers). Two backends are available:
//!   - [`NaiveBackend`]: plain row / column loops
//!   - [`NalgebraBackend`]: delegates the products to [`nalgebra`]
//!
//! Both backends share the same error contract. Which one is used is selected by a [`BackendType`], usually
//! taken from the simulator configuration.
use std::{
    fmt::Display,
    ops::{Index, IndexMut},
};

use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::error::{CrlError, CrlResult};

pub mod naive;
pub mod nalgebra_backend;

pub use naive::NaiveBackend;
pub use nalgebra_backend::NalgebraBackend;

/// Dense, real-valued matrix stored in row-major order. Serialized as a vector of rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}
impl Matrix {
    /// Create a new [`Matrix`] from a vector of rows.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Dimension`] if
    ///   - no rows or empty rows are given
    ///   - the rows have different lengths
    pub fn new(rows: Vec<Vec<f64>>) -> CrlResult<Self> {
        let nr_of_rows = rows.len();
        let nr_of_cols = rows.first().map_or(0, Vec::len);
        if nr_of_rows == 0 || nr_of_cols == 0 {
            return Err(CrlError::Dimension("matrix must not be empty".into()));
        }
        if rows.iter().any(|row| row.len() != nr_of_cols) {
            return Err(CrlError::Dimension(
                "all rows of a matrix must have the same length".into(),
            ));
        }
        Ok(Self {
            rows: nr_of_rows,
            cols: nr_of_cols,
            data: rows.into_iter().flatten().collect(),
        })
    }
    /// Create a new [`Matrix`] of the given size from row-major data.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Dimension`] if the size is zero or does not match the length of `data`.
    pub fn from_row_slice(rows: usize, cols: usize, data: &[f64]) -> CrlResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(CrlError::Dimension("matrix must not be empty".into()));
        }
        if data.len() != rows * cols {
            return Err(CrlError::Dimension(format!(
                "{} values given for a {rows} x {cols} matrix",
                data.len()
            )));
        }
        Ok(Self {
            rows,
            cols,
            data: data.to_vec(),
        })
    }
    /// Create a 2 x 2 transfer matrix `[[a, b], [c, d]]`.
    #[must_use]
    pub fn abcd(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            rows: 2,
            cols: 2,
            data: vec![a, b, c, d],
        }
    }
    /// Create a matrix of the given size filled with zeros.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Dimension`] if `rows` or `cols` is zero.
    pub fn zeros(rows: usize, cols: usize) -> CrlResult<Self> {
        Self::from_row_slice(rows, cols, &vec![0.0; rows * cols])
    }
    /// Create an identity matrix of dimension `size` x `size`.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Dimension`] if `size` is zero.
    pub fn identity(size: usize) -> CrlResult<Self> {
        let mut m = Self::zeros(size, size)?;
        for i in 0..size {
            m[(i, i)] = 1.0;
        }
        Ok(m)
    }
    /// Returns the number of rows of this [`Matrix`].
    #[must_use]
    pub const fn nrows(&self) -> usize {
        self.rows
    }
    /// Returns the number of columns of this [`Matrix`].
    #[must_use]
    pub const fn ncols(&self) -> usize {
        self.cols
    }
    /// Returns `true` if this [`Matrix`] has as many rows as columns.
    #[must_use]
    pub const fn is_square(&self) -> bool {
        self.rows == self.cols
    }
    /// Returns the matrix elements in row-major order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
    /// Returns a copy of the matrix as vector of rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.cols).map(<[f64]>::to_vec).collect()
    }
}
impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = CrlError;

    fn try_from(rows: Vec<Vec<f64>>) -> CrlResult<Self> {
        Self::new(rows)
    }
}
impl From<Matrix> for Vec<Vec<f64>> {
    fn from(m: Matrix) -> Self {
        m.to_rows()
    }
}
impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.data[row * self.cols + col]
    }
}
impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        &mut self.data[row * self.cols + col]
    }
}
impl Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows = self
            .to_rows()
            .iter()
            .map(|row| {
                let values: Vec<String> = row.iter().map(|v| format!("{v}")).collect();
                format!("[{}]", values.join(", "))
            })
            .collect::<Vec<String>>();
        write!(f, "[{}]", rows.join(", "))
    }
}

/// Common interface of all matrix backends.
///
/// Products are checked for matching inner dimensions. The default implementation of [`MatrixBackend::power`]
/// is shared by all backends so that the multiplication order is identical independent of the backend.
pub trait MatrixBackend: Send + Sync {
    /// Multiply matrix `a` by matrix `b` (`a · b`).
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Dimension`] if the number of columns of `a` does not match
    /// the number of rows of `b`.
    fn dot(&self, a: &Matrix, b: &Matrix) -> CrlResult<Matrix>;
    /// Multiply matrix `a` by the (column) vector `b`.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Dimension`] if the number of columns of `a` does not match
    /// the length of `b`.
    fn dot_vector(&self, a: &Matrix, b: &[f64]) -> CrlResult<Vec<f64>>;
    /// Calculate the integer power `a^n` of a square matrix.
    ///
    /// For `n == 0` the identity matrix of the same size is returned. For `n > 0` the result is accumulated
    /// from the left (`a · (a · (... · a))`).
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the matrix is not square ([`CrlError::NonSquareMatrix`])
    ///   - the power is negative ([`CrlError::UnsupportedOperation`])
    fn power(&self, a: &Matrix, n: i32) -> CrlResult<Matrix> {
        if !a.is_square() {
            return Err(CrlError::NonSquareMatrix(format!(
                "matrix is not square: {} x {}",
                a.nrows(),
                a.ncols()
            )));
        }
        if n < 0 {
            return Err(CrlError::UnsupportedOperation(format!(
                "negative power <{n}> is not supported for matrix power operation"
            )));
        }
        if n == 0 {
            return Matrix::identity(a.nrows());
        }
        let mut accumulated = a.clone();
        for _ in 1..n {
            accumulated = self.dot(a, &accumulated)?;
        }
        Ok(accumulated)
    }
}

/// Available matrix backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// hand-written loops
    #[default]
    Naive,
    /// products computed by `nalgebra`
    Nalgebra,
}
impl BackendType {
    /// Returns the backend implementation for this [`BackendType`].
    #[must_use]
    pub fn backend(self) -> Box<dyn MatrixBackend> {
        match self {
            Self::Naive => Box::new(NaiveBackend),
            Self::Nalgebra => Box::new(NalgebraBackend),
        }
    }
}
impl Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Naive => write!(f, "naive"),
            Self::Nalgebra => write!(f, "nalgebra"),
        }
    }
}
impl std::str::FromStr for BackendType {
    type Err = CrlError;

    fn from_str(s: &str) -> CrlResult<Self> {
        match s.to_lowercase().as_str() {
            "naive" => Ok(Self::Naive),
            "nalgebra" => Ok(Self::Nalgebra),
            _ => Err(CrlError::InvalidArgument(format!(
                "unknown matrix backend <{s}>"
            ))),
        }
    }
}
