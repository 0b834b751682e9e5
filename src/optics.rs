#![warn(missing_docs)]
//! Paraxial optical elements and rays.
//!
//! A [`Ray`] is described by its position `y` and angle `θ` with respect to the optical axis at a reference
//! plane. Optical elements are represented by 2x2 transfer matrices acting on the column vector `[y, θ]`.
//! When composing elements the matrix of the most downstream element has to appear leftmost.
use serde::{Deserialize, Serialize};

use crate::{
    error::{CrlError, CrlResult},
    matrix::{Matrix, MatrixBackend},
};

/// A paraxial ray at a reference plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ray {
    /// distance to the optical axis (m)
    pub y: f64,
    /// angle with respect to the optical axis (rad)
    pub theta: f64,
}
impl Ray {
    /// Creates a new [`Ray`].
    #[must_use]
    pub const fn new(y: f64, theta: f64) -> Self {
        Self { y, theta }
    }
    /// Create a [`Ray`] emitted from a point source on the optical axis at distance `p0` upstream of the
    /// reference plane with the divergence angle `teta0`.
    #[must_use]
    pub fn from_source(p0: f64, teta0: f64) -> Self {
        Self::new(p0 * teta0.tan(), teta0)
    }
    /// Propagate this [`Ray`] through an optical system given by its transfer matrix.
    ///
    /// # Errors
    ///
    /// This function will return an error if the transfer matrix is not a 2x2 matrix.
    pub fn propagate(&self, backend: &dyn MatrixBackend, transfer: &Matrix) -> CrlResult<Self> {
        let out = backend.dot_vector(transfer, &[self.y, self.theta])?;
        if out.len() != 2 {
            return Err(CrlError::Dimension(format!(
                "transfer matrix must map a ray onto a ray, got {} components",
                out.len()
            )));
        }
        Ok(Self::new(out[0], out[1]))
    }
}

/// Transfer matrix of a free-space drift of length `dl` (m).
#[must_use]
pub fn drift(dl: f64) -> Matrix {
    Matrix::abcd(1.0, dl, 0.0, 1.0)
}

/// Transfer matrix of a single parabolic thin lens (two refracting surfaces) with the radius of curvature
/// `radius` (m) made of a material with the index of refraction decrement `delta`.
///
/// The focal length of such a lens is `radius / (2 delta)`.
///
/// # Errors
///
/// This function will return an [`CrlError::InvalidOpticalParameter`] if `radius` or `delta` is zero or not finite.
pub fn thin_lens(radius: f64, delta: f64) -> CrlResult<Matrix> {
    if radius == 0.0 || !radius.is_finite() {
        return Err(CrlError::InvalidOpticalParameter(format!(
            "lens radius must be non-zero and finite, got {radius}"
        )));
    }
    if delta == 0.0 || !delta.is_finite() {
        return Err(CrlError::InvalidOpticalParameter(format!(
            "delta must be non-zero and finite, got {delta}"
        )));
    }
    Ok(Matrix::abcd(1.0, 0.0, -1.0 / (radius / (2.0 * delta)), 1.0))
}

/// Accumulated transfer matrix of `nr_of_lenses` identical thin lenses separated by `lens_spacing`.
///
/// The resulting matrix is `(L · D)^(n-1) · L` where `L` is the [`thin_lens`] and `D` the [`drift`] matrix.
///
/// # Errors
///
/// This function will return an error if
///   - `nr_of_lenses` is zero
///   - the lens parameters are invalid (see [`thin_lens`])
pub fn lens_array(
    backend: &dyn MatrixBackend,
    radius: f64,
    nr_of_lenses: u32,
    delta: f64,
    lens_spacing: f64,
) -> CrlResult<Matrix> {
    if nr_of_lenses == 0 {
        return Err(CrlError::InvalidArgument(
            "a lens array must contain at least one lens".into(),
        ));
    }
    let exponent = i32::try_from(nr_of_lenses - 1)
        .map_err(|_| CrlError::InvalidArgument("too many lenses in one cartridge".into()))?;
    let lens = thin_lens(radius, delta)?;
    let lens_and_gap = backend.dot(&lens, &drift(lens_spacing))?;
    backend.dot(&backend.power(&lens_and_gap, exponent)?, &lens)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::matrix::NaiveBackend;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    #[test]
    fn drift_matrix() {
        assert_eq!(drift(0.5).to_rows(), vec![vec![1.0, 0.5], vec![0.0, 1.0]]);
    }
    #[test]
    fn thin_lens_matrix() {
        let m = thin_lens(50e-6, 1e-6).unwrap();
        assert_eq!(m[(0, 0)], 1.0);
        assert_eq!(m[(0, 1)], 0.0);
        assert_abs_diff_eq!(m[(1, 0)], -1.0 / 25.0, epsilon = 1e-15);
        assert_eq!(m[(1, 1)], 1.0);
    }
    #[test]
    fn thin_lens_wrong() {
        assert_matches!(
            thin_lens(0.0, 1e-6),
            Err(CrlError::InvalidOpticalParameter(_))
        );
        assert_matches!(
            thin_lens(50e-6, 0.0),
            Err(CrlError::InvalidOpticalParameter(_))
        );
        assert_matches!(
            thin_lens(f64::NAN, 1e-6),
            Err(CrlError::InvalidOpticalParameter(_))
        );
    }
    #[test]
    fn single_lens_array_is_thin_lens() {
        let m = lens_array(&NaiveBackend, 50e-6, 1, 1e-6, 0.002).unwrap();
        assert_eq!(m, thin_lens(50e-6, 1e-6).unwrap());
    }
    #[test]
    fn two_lens_array() {
        let l = thin_lens(50e-6, 1e-6).unwrap();
        let expected = NaiveBackend
            .dot(&NaiveBackend.dot(&l, &drift(0.002)).unwrap(), &l)
            .unwrap();
        assert_eq!(
            lens_array(&NaiveBackend, 50e-6, 2, 1e-6, 0.002).unwrap(),
            expected
        );
    }
    #[test]
    fn lens_array_without_lenses() {
        assert_matches!(
            lens_array(&NaiveBackend, 50e-6, 0, 1e-6, 0.002),
            Err(CrlError::InvalidArgument(_))
        );
    }
    #[test]
    fn ray_from_source() {
        let ray = Ray::from_source(10.0, 1e-3);
        assert_abs_diff_eq!(ray.y, 10.0 * 1e-3_f64.tan());
        assert_eq!(ray.theta, 1e-3);
    }
    #[test]
    fn propagate_drift() {
        let ray = Ray::new(1e-3, 1e-4);
        let out = ray.propagate(&NaiveBackend, &drift(2.0)).unwrap();
        assert_abs_diff_eq!(out.y, 1.2e-3, epsilon = 1e-15);
        assert_eq!(out.theta, 1e-4);
    }
    #[test]
    fn propagate_wrong_matrix() {
        let m = Matrix::new(vec![vec![1.0, 0.0, 0.0]; 2]).unwrap();
        assert_matches!(
            Ray::default().propagate(&NaiveBackend, &m),
            Err(CrlError::Dimension(_))
        );
    }
}
