//! Matrix backend delegating the products to [`nalgebra`].
use nalgebra::{DMatrix, DVector};

use super::{Matrix, MatrixBackend};
use crate::error::{CrlError, CrlResult};

/// Backend using dynamically sized `nalgebra` matrices.
#[derive(Debug, Default, Clone, Copy)]
pub struct NalgebraBackend;

fn to_dmatrix(m: &Matrix) -> DMatrix<f64> {
    DMatrix::from_row_slice(m.nrows(), m.ncols(), m.as_slice())
}
fn from_dmatrix(m: &DMatrix<f64>) -> CrlResult<Matrix> {
    let data: Vec<f64> = (0..m.nrows())
        .flat_map(|i| (0..m.ncols()).map(move |j| m[(i, j)]))
        .collect();
    Matrix::from_row_slice(m.nrows(), m.ncols(), &data)
}

impl MatrixBackend for NalgebraBackend {
    fn dot(&self, a: &Matrix, b: &Matrix) -> CrlResult<Matrix> {
        if a.ncols() != b.nrows() {
            return Err(CrlError::Dimension(format!(
                "matrices have wrong dimensions: {} x {} · {} x {}",
                a.nrows(),
                a.ncols(),
                b.nrows(),
                b.ncols()
            )));
        }
        from_dmatrix(&(to_dmatrix(a) * to_dmatrix(b)))
    }
    fn dot_vector(&self, a: &Matrix, b: &[f64]) -> CrlResult<Vec<f64>> {
        if a.ncols() != b.len() {
            return Err(CrlError::Dimension(format!(
                "matrix ({} x {}) and vector (length {}) have wrong dimensions",
                a.nrows(),
                a.ncols(),
                b.len()
            )));
        }
        let product = to_dmatrix(a) * DVector::from_column_slice(b);
        Ok(product.iter().copied().collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::matrix::NaiveBackend;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    #[test]
    fn same_as_naive() {
        let a = Matrix::new(vec![vec![1.0, 0.002], vec![-0.03, 1.0]]).unwrap();
        let b = Matrix::new(vec![vec![0.5, 1.5, 2.5], vec![-1.0, 3.0, 0.25]]).unwrap();
        let expected = NaiveBackend.dot(&a, &b).unwrap();
        let product = NalgebraBackend.dot(&a, &b).unwrap();
        assert_eq!(product.nrows(), 2);
        assert_eq!(product.ncols(), 3);
        for (p, e) in product.as_slice().iter().zip(expected.as_slice()) {
            assert_abs_diff_eq!(p, e, epsilon = 1e-15);
        }
        let v = NalgebraBackend.dot_vector(&a, &[3.0, -2.0]).unwrap();
        assert_eq!(v, NaiveBackend.dot_vector(&a, &[3.0, -2.0]).unwrap());
    }
    #[test]
    fn wrong_dimensions() {
        let a = Matrix::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let b = Matrix::new(vec![vec![1.0, 2.0]]).unwrap();
        assert_matches!(NalgebraBackend.dot(&a, &b), Err(CrlError::Dimension(_)));
        assert_matches!(
            NalgebraBackend.dot_vector(&a, &[1.0]),
            Err(CrlError::Dimension(_))
        );
    }
}
