#![warn(missing_docs)]
//! Closed-form thin-lens focus of an ideal CRL.
//!
//! An ideal CRL consists of `n` identical parabolic lenses with radius `r` concentrated in one plane. Its focal
//! length is `r / (2 n delta)` and the image distance follows from the thin-lens equation.
use serde::{Deserialize, Serialize};
use uom::si::{f64::Length, length::meter};

use crate::error::{CrlError, CrlResult};

/// Focal properties of an ideal CRL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdealFocus {
    /// focal length of the lens stack
    pub ideal_focus: Length,
    /// image distance measured from the lens
    pub p1_ideal: Length,
    /// image distance measured from the source
    pub p1_ideal_from_source: Length,
}

/// Calculate the focus of an ideal CRL of `n` lenses with the given `radius` and `delta` illuminated by a source
/// at distance `p0` upstream.
///
/// # Errors
///
/// This function will return an error if
///   - `radius` or `n` is not positive or `delta` is zero ([`CrlError::InvalidArgument`])
///   - the source is located in the focal plane, so that no finite image exists ([`CrlError::DivisionByZero`])
pub fn compute_ideal_focus(
    radius: Length,
    n: i64,
    delta: f64,
    p0: Length,
) -> CrlResult<IdealFocus> {
    let radius = radius.get::<meter>();
    if !radius.is_finite() || radius <= 0.0 {
        return Err(CrlError::InvalidArgument(format!(
            "lens radius must be positive and finite, got {radius} m"
        )));
    }
    if n <= 0 {
        return Err(CrlError::InvalidArgument(format!(
            "number of lenses must be positive, got {n}"
        )));
    }
    if delta == 0.0 {
        return Err(CrlError::InvalidArgument("delta must not be zero".into()));
    }
    #[allow(clippy::cast_precision_loss)]
    let n = n as f64;
    let p0 = p0.get::<meter>();
    let ideal_focus = radius / (2.0 * n * delta);
    if ideal_focus == p0 {
        return Err(CrlError::DivisionByZero(format!(
            "source distance {p0} m equals the focal length, the image is at infinity"
        )));
    }
    let p1_ideal = 1.0 / (1.0 / ideal_focus - 1.0 / p0);
    Ok(IdealFocus {
        ideal_focus: Length::new::<meter>(ideal_focus),
        p1_ideal: Length::new::<meter>(p1_ideal),
        p1_ideal_from_source: Length::new::<meter>(p1_ideal + p0),
    })
}
