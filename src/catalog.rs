#![warn(missing_docs)]
//! Catalog of available lens types.
//!
//! A transfocator is equipped with cartridges, each containing a number of identical lenses. The set of
//! possible lens types is given by the cross product of the available radii and the available lens counts.
//! Each lens type is addressed by a name `T_<lens count>_<radius in µm>` (e.g. `T_4_50`), which is also the
//! name used in the beamline configuration files.
use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use uom::si::{
    f64::Length,
    length::{meter, micrometer},
};

use crate::error::{CrlError, CrlResult};

/// A lens type: a stack of `lens_count` identical lenses with a given radius of curvature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LensType {
    /// radius of curvature of a single lens
    pub radius: Length,
    /// number of lenses in the cartridge
    pub lens_count: u32,
}
impl LensType {
    /// Returns the radius of curvature in meters.
    #[must_use]
    pub fn radius_in_meter(&self) -> f64 {
        self.radius.get::<meter>()
    }
}

/// Map of lens type names to their [`LensType`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LensCatalog {
    lenses: BTreeMap<String, LensType>,
}
impl LensCatalog {
    /// Build a catalog from the set of radii (in micrometers) and the set of lens counts.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Config`] if
    ///   - one of the sets is empty
    ///   - a radius is not positive and finite
    ///   - a lens count is zero
    pub fn build(radii_um: &[f64], lens_counts: &[u32]) -> CrlResult<Self> {
        if radii_um.is_empty() || lens_counts.is_empty() {
            return Err(CrlError::Config(
                "radius and lens count sets must not be empty".into(),
            ));
        }
        if let Some(r) = radii_um.iter().find(|r| !r.is_finite() || **r <= 0.0) {
            return Err(CrlError::Config(format!(
                "lens radius must be positive and finite, got {r}"
            )));
        }
        if lens_counts.contains(&0) {
            return Err(CrlError::Config("lens count must be positive".into()));
        }
        let lenses = radii_um
            .iter()
            .cartesian_product(lens_counts.iter())
            .map(|(radius, lens_count)| {
                (
                    Self::lens_type_name(*lens_count, *radius),
                    LensType {
                        radius: Length::new::<micrometer>(*radius),
                        lens_count: *lens_count,
                    },
                )
            })
            .collect();
        Ok(Self { lenses })
    }
    /// Returns the catalog name of a lens type with the given lens count and radius (in micrometers).
    #[must_use]
    pub fn lens_type_name(lens_count: u32, radius_um: f64) -> String {
        format!("T_{lens_count}_{radius_um}")
    }
    /// Returns the [`LensType`] with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LensType> {
        self.lenses.get(name)
    }
    /// Returns the number of lens types in this [`LensCatalog`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.lenses.len()
    }
    /// Returns `true` if this [`LensCatalog`] contains no lens types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lenses.is_empty()
    }
    /// Iterate over all lens types sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &LensType)> {
        self.lenses.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::micrometer;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    #[test]
    fn build() {
        let catalog = LensCatalog::build(&[50.0, 200.0, 500.0], &[1, 2, 4, 8, 16]).unwrap();
        assert_eq!(catalog.len(), 15);
        let lens = catalog.get("T_16_50").unwrap();
        assert_eq!(lens.lens_count, 16);
        assert_abs_diff_eq!(lens.radius_in_meter(), 50e-6, epsilon = 1e-18);
        assert!(catalog.get("T_3_50").is_none());
        assert!(catalog.get("T_1_500").is_some());
    }
    #[test]
    fn build_wrong() {
        assert_matches!(LensCatalog::build(&[], &[1]), Err(CrlError::Config(_)));
        assert_matches!(LensCatalog::build(&[50.0], &[]), Err(CrlError::Config(_)));
        assert_matches!(
            LensCatalog::build(&[-50.0], &[1]),
            Err(CrlError::Config(_))
        );
        assert_matches!(
            LensCatalog::build(&[50.0], &[1, 0]),
            Err(CrlError::Config(_))
        );
    }
    #[test]
    fn lens_type_name() {
        assert_eq!(LensCatalog::lens_type_name(4, 50.0), "T_4_50");
        assert_eq!(LensCatalog::lens_type_name(1, 12.5), "T_1_12.5");
    }
    #[test]
    fn iter_sorted() {
        let catalog = LensCatalog::build(&[200.0, 50.0], &[2, 1]).unwrap();
        let names: Vec<&String> = catalog.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["T_1_200", "T_1_50", "T_2_200", "T_2_50"]);
        assert_eq!(
            catalog.get("T_2_200").unwrap().radius,
            micrometer!(200.0)
        );
    }
}
