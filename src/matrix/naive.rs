//! Matrix backend using plain loops over rows and columns.
use super::{Matrix, MatrixBackend};
use crate::error::{CrlError, CrlResult};

/// Reference backend without any external linear-algebra library.
#[derive(Debug, Default, Clone, Copy)]
pub struct NaiveBackend;

impl MatrixBackend for NaiveBackend {
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
        let mut c = Matrix::zeros(a.nrows(), b.ncols())?;
        for i in 0..a.nrows() {
            for j in 0..b.ncols() {
                for k in 0..b.nrows() {
                    c[(i, j)] += a[(i, k)] * b[(k, j)];
                }
            }
        }
        Ok(c)
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
        let mut c = vec![0.0; a.nrows()];
        for (i, value) in c.iter_mut().enumerate() {
            for (k, b_k) in b.iter().enumerate() {
                *value += a[(i, k)] * b_k;
            }
        }
        Ok(c)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;
    #[test]
    fn dot() {
        let a = Matrix::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let b = Matrix::new(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let c = NaiveBackend.dot(&a, &b).unwrap();
        assert_eq!(c.to_rows(), vec![vec![2.0, 1.0], vec![4.0, 3.0]]);
        let c = NaiveBackend.dot(&b, &a).unwrap();
        assert_eq!(c.to_rows(), vec![vec![3.0, 4.0], vec![1.0, 2.0]]);
    }
    #[test]
    fn dot_non_square() {
        let a = Matrix::new(vec![vec![1.0, 2.0, 3.0]]).unwrap();
        let b = Matrix::new(vec![vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        assert_eq!(NaiveBackend.dot(&a, &b).unwrap().to_rows(), vec![vec![14.0]]);
        assert_eq!(NaiveBackend.dot(&b, &a).unwrap().nrows(), 3);
    }
    #[test]
    fn dot_wrong_dimensions() {
        let a = Matrix::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let b = Matrix::new(vec![vec![1.0, 2.0, 3.0]]).unwrap();
        assert_matches!(NaiveBackend.dot(&a, &b), Err(CrlError::Dimension(_)));
    }
    #[test]
    fn dot_vector() {
        let a = Matrix::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(
            NaiveBackend.dot_vector(&a, &[1.0, -1.0]).unwrap(),
            vec![-1.0, -1.0]
        );
        assert_matches!(
            NaiveBackend.dot_vector(&a, &[1.0, 2.0, 3.0]),
            Err(CrlError::Dimension(_))
        );
    }
}
