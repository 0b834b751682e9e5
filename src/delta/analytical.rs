#![warn(missing_docs)]
//! Analytical estimate of the index of refraction decrement.
//!
//! Far from absorption edges, delta of an elemental material is approximately
//!
//! `delta = 2.7e-6 · λ² · ρ · Z / A`
//!
//! with the wavelength `λ = 2π·ħc / E` in Å (`ħc = 1973 eV·Å`), the density `ρ` in g/cm³, the atomic number `Z`
//! and the atomic mass `A`.
use std::f64::consts::PI;

use crate::error::{CrlError, CrlResult};

/// `ħc` in eV·Å as used for the wavelength calculation
const HBAR_C: f64 = 1973.0;
/// prefactor of the delta estimate (for λ in Å and ρ in g/cm³)
const DELTA_PREFACTOR: f64 = 2.7e-6;

/// Material constants of a chemical element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    /// chemical symbol
    pub symbol: &'static str,
    /// atomic number
    pub number: u32,
    /// atomic mass (u)
    pub mass: f64,
    /// density at room temperature (g/cm³)
    pub density: f64,
}

#[rustfmt::skip]
const ELEMENTS: [Element; 14] = [
    Element { symbol: "Li", number: 3, mass: 6.941, density: 0.534 },
    Element { symbol: "Be", number: 4, mass: 9.012182, density: 1.848 },
    Element { symbol: "B", number: 5, mass: 10.811, density: 2.34 },
    Element { symbol: "C", number: 6, mass: 12.0107, density: 2.1 },
    Element { symbol: "Mg", number: 12, mass: 24.305, density: 1.738 },
    Element { symbol: "Al", number: 13, mass: 26.981538, density: 2.699 },
    Element { symbol: "Si", number: 14, mass: 28.0855, density: 2.33 },
    Element { symbol: "Ti", number: 22, mass: 47.867, density: 4.54 },
    Element { symbol: "Fe", number: 26, mass: 55.845, density: 7.874 },
    Element { symbol: "Ni", number: 28, mass: 58.6934, density: 8.9 },
    Element { symbol: "Cu", number: 29, mass: 63.546, density: 8.96 },
    Element { symbol: "Ag", number: 47, mass: 107.8682, density: 10.5 },
    Element { symbol: "W", number: 74, mass: 183.84, density: 19.3 },
    Element { symbol: "Au", number: 79, mass: 196.96655, density: 19.3 },
];

impl Element {
    /// Find an element by its chemical symbol (e.g. `Be`).
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::InvalidArgument`] if the symbol is not known.
    pub fn from_symbol(symbol: &str) -> CrlResult<Self> {
        ELEMENTS
            .iter()
            .find(|element| element.symbol == symbol.trim())
            .copied()
            .ok_or_else(|| {
                CrlError::InvalidArgument(format!(
                    "no material constants available for <{symbol}>"
                ))
            })
    }
}

/// Photon wavelength in Å for the given photon energy in eV.
#[must_use]
pub fn wavelength(energy: f64) -> f64 {
    2.0 * PI * HBAR_C / energy
}

/// Calculate delta of the given element for the given photon energy (eV).
///
/// # Errors
///
/// This function will return an error if
///   - the energy is not positive and finite ([`CrlError::InvalidArgument`])
///   - the material is unknown ([`CrlError::InvalidArgument`])
pub fn analytical_delta(energy: f64, formula: &str) -> CrlResult<f64> {
    if !energy.is_finite() || energy <= 0.0 {
        return Err(CrlError::InvalidArgument(format!(
            "photon energy must be positive, got {energy} eV"
        )));
    }
    let element = Element::from_symbol(formula)?;
    let z_over_a = f64::from(element.number) / element.mass;
    Ok(DELTA_PREFACTOR * wavelength(energy).powi(2) * element.density * z_over_a)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    #[test]
    fn from_symbol() {
        let be = Element::from_symbol("Be").unwrap();
        assert_eq!(be.number, 4);
        assert_eq!(be.density, 1.848);
        assert_matches!(
            Element::from_symbol("Xx"),
            Err(CrlError::InvalidArgument(_))
        );
    }
    #[test]
    fn wavelength_at_12_kev() {
        assert_relative_eq!(wavelength(12_397.0), 1.0, max_relative = 1e-3);
    }
    #[test]
    fn delta_beryllium() {
        let delta = analytical_delta(9000.0, "Be").unwrap();
        assert_relative_eq!(delta, 4.2016962882852e-6, max_relative = 1e-10);
        let delta_21500 = analytical_delta(21500.0, "Be").unwrap();
        // delta scales with 1/E²
        assert_relative_eq!(
            delta_21500,
            delta * (9000.0_f64 / 21500.0).powi(2),
            max_relative = 1e-12
        );
    }
    #[test]
    fn delta_wrong() {
        assert_matches!(
            analytical_delta(0.0, "Be"),
            Err(CrlError::InvalidArgument(_))
        );
        assert_matches!(
            analytical_delta(9000.0, "Unobtainium"),
            Err(CrlError::InvalidArgument(_))
        );
    }
}
