#![warn(missing_docs)]
//! Beamline (transfocator) configuration.
//!
//! A [`BeamlineConfig`] is the ordered list of [`Cartridge`]s installed in the transfocator of a beamline.
//! It is read from a JSON file `<beamline>_crl.json` of the form
//! ```json
//! { "crl": [ { "id": "1", "name": "T_1_500", "offset_cart": 1 }, ... ] }
//! ```
//! Together with the [`TransfocatorGeometry`] (spacing of cartridges and lenses) it determines the physical
//! layout of the engaged lenses.
use std::{collections::HashSet, fs, path::Path};

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use uom::si::{f64::Length, length::meter};

use crate::{
    catalog::LensCatalog,
    error::{CrlError, CrlResult},
};

/// A cartridge of the transfocator containing lenses of one [`LensType`](crate::catalog::LensType).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cartridge {
    /// external identifier of the cartridge
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// name of the lens type (see [`LensCatalog::lens_type_name`])
    pub name: String,
    /// position index of the cartridge along the beam
    pub offset_cart: i32,
    /// horizontal alignment correction of the cartridge (m)
    #[serde(default)]
    pub offset_x: f64,
    /// vertical alignment correction of the cartridge (m)
    #[serde(default)]
    pub offset_y: f64,
}
impl Cartridge {
    /// Creates a new [`Cartridge`] without alignment corrections.
    #[must_use]
    pub fn new(id: &str, name: &str, offset_cart: i32) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            offset_cart,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
}
fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Integer(id) => id.to_string(),
    })
}

/// Base geometry constants of a transfocator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransfocatorGeometry {
    /// distance between the centers of two neighbouring cartridges
    pub dl_cart: Length,
    /// distance between two lenses within a cartridge
    pub dl_lens: Length,
    /// distance from the secondary source aperture (SSA) to the nominal focus
    pub d_ssa_focus: Length,
    /// maximum deviation of the mean lens radius from the first radius for the ideal lens calculation
    pub radii_tolerance: Length,
}

#[derive(Deserialize)]
struct BeamlineFile {
    crl: Vec<Cartridge>,
}

/// The cartridges of a transfocator in the order of their definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamlineConfig {
    name: String,
    crl: Vec<Cartridge>,
}
impl BeamlineConfig {
    /// Creates a new [`BeamlineConfig`].
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Config`] if a cartridge id is used more than once.
    pub fn new(name: &str, cartridges: Vec<Cartridge>) -> CrlResult<Self> {
        let mut ids = HashSet::new();
        for cartridge in &cartridges {
            if !ids.insert(cartridge.id.as_str()) {
                return Err(CrlError::Config(format!(
                    "cartridge id <{}> is defined more than once for beamline <{name}>",
                    cartridge.id
                )));
            }
        }
        Ok(Self {
            name: name.to_owned(),
            crl: cartridges,
        })
    }
    /// Read a [`BeamlineConfig`] from a `<beamline>_crl.json` file.
    ///
    /// The beamline name is taken from the file name.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Config`] if
    ///   - the file cannot be read
    ///   - the file cannot be parsed
    ///   - a cartridge id is used more than once
    pub fn from_file(path: &Path) -> CrlResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CrlError::Config(format!(
                "the specified file <{}> not found: {e}",
                path.display()
            ))
        })?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map_or("", |stem| stem.trim_end_matches("_crl"));
        let config = Self::from_string(name, &contents)?;
        debug!(
            "read {} cartridges of beamline <{}> from {}",
            config.crl.len(),
            config.name,
            path.display()
        );
        Ok(config)
    }
    /// Parse a [`BeamlineConfig`] from a JSON string.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Config`] if the string cannot be parsed or a cartridge id is
    /// used more than once.
    pub fn from_string(name: &str, json: &str) -> CrlResult<Self> {
        let file: BeamlineFile = serde_json::from_str(json)
            .map_err(|e| CrlError::Config(format!("malformed beamline file: {e}")))?;
        Self::new(name, file.crl)
    }
    /// Returns the name of the beamline.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Returns the cartridges of this [`BeamlineConfig`].
    #[must_use]
    pub fn cartridges(&self) -> &[Cartridge] {
        &self.crl
    }
    /// Returns the ids of all cartridges.
    #[must_use]
    pub fn available_ids(&self) -> Vec<&str> {
        self.crl.iter().map(|c| c.id.as_str()).collect()
    }
    /// Returns the index of the cartridge with the given id or `None` if the id is not found.
    #[must_use]
    pub fn find_element_by_id(&self, id: &str) -> Option<usize> {
        self.crl.iter().position(|c| c.id == id)
    }
    /// Returns the cartridge with the given id.
    #[must_use]
    pub fn cartridge(&self, id: &str) -> Option<&Cartridge> {
        self.find_element_by_id(id).map(|idx| &self.crl[idx])
    }
    fn cartridge_or_err(&self, id: &str) -> CrlResult<&Cartridge> {
        self.cartridge(id).ok_or_else(|| {
            CrlError::UnknownCartridge(format!(
                "specified cart_id <{id}> not in the list of available ids: <{}>",
                self.available_ids().join(", ")
            ))
        })
    }
    /// Returns the distance (in meters) between the exit of the lens array of cartridge `id1` and the entrance of
    /// cartridge `id2`.
    ///
    /// The distance is the difference of the cartridge positions (`offset_cart * dl_cart`) reduced by the length
    /// occupied by the lenses of the upstream cartridge (`lens_count * dl_lens`).
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - one of the ids is not found ([`CrlError::UnknownCartridge`])
    ///   - the lens type of cartridge `id1` is not part of the catalog ([`CrlError::Config`])
    pub fn distance_between(
        &self,
        id1: &str,
        id2: &str,
        catalog: &LensCatalog,
        geometry: &TransfocatorGeometry,
    ) -> CrlResult<f64> {
        let cartridge1 = self.cartridge_or_err(id1)?;
        let cartridge2 = self.cartridge_or_err(id2)?;
        let lens1 = catalog.get(&cartridge1.name).ok_or_else(|| {
            CrlError::Config(format!(
                "lens type <{}> of cartridge <{id1}> is not available",
                cartridge1.name
            ))
        })?;
        let dl_cart = geometry.dl_cart.get::<meter>();
        let coord1 = f64::from(cartridge1.offset_cart) * dl_cart;
        let coord2 = f64::from(cartridge2.offset_cart) * dl_cart;
        Ok(coord2 - coord1 - f64::from(lens1.lens_count) * geometry.dl_lens.get::<meter>())
    }
    /// Returns the position (in meters) of the given cartridge relative to offset position 0.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::UnknownCartridge`] if the id is not found.
    pub fn cartridge_position(&self, id: &str, geometry: &TransfocatorGeometry) -> CrlResult<f64> {
        let cartridge = self.cartridge_or_err(id)?;
        Ok(f64::from(cartridge.offset_cart) * geometry.dl_cart.get::<meter>())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{meter, millimeter};
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    fn geometry() -> TransfocatorGeometry {
        TransfocatorGeometry {
            dl_cart: millimeter!(30.0),
            dl_lens: millimeter!(2.0),
            d_ssa_focus: meter!(8.1),
            radii_tolerance: meter!(1e-8),
        }
    }
    fn beamline() -> BeamlineConfig {
        BeamlineConfig::new(
            "test",
            vec![
                Cartridge::new("1", "T_2_50", 3),
                Cartridge::new("2", "T_4_50", 5),
            ],
        )
        .unwrap()
    }
    #[test]
    fn from_string() {
        let json = r#"{"crl": [
            {"id": "1", "name": "T_1_50", "offset_cart": 1},
            {"id": 2, "name": "T_2_50", "offset_cart": 2, "offset_x": 0.001, "offset_y": -0.001}
        ]}"#;
        let config = BeamlineConfig::from_string("smi", json).unwrap();
        assert_eq!(config.name(), "smi");
        assert_eq!(config.available_ids(), vec!["1", "2"]);
        assert_eq!(config.cartridges()[1].offset_x, 0.001);
        assert_eq!(config.cartridges()[0].offset_y, 0.0);
    }
    #[test]
    fn from_string_wrong() {
        assert_matches!(
            BeamlineConfig::from_string("smi", "{\"crl\": [}"),
            Err(CrlError::Config(_))
        );
        let json = r#"{"crl": [
            {"id": "1", "name": "T_1_50", "offset_cart": 1},
            {"id": 1, "name": "T_2_50", "offset_cart": 2}
        ]}"#;
        assert_matches!(
            BeamlineConfig::from_string("smi", json),
            Err(CrlError::Config(_))
        );
    }
    #[test]
    fn from_file() {
        let config = BeamlineConfig::from_file(Path::new("package_data/json/smi_crl.json")).unwrap();
        assert_eq!(config.name(), "smi");
        assert!(config.find_element_by_id("8").is_some());
        assert_matches!(
            BeamlineConfig::from_file(Path::new("package_data/json/nonexistent_crl.json")),
            Err(CrlError::Config(_))
        );
    }
    #[test]
    fn find_element_by_id() {
        let config = beamline();
        assert_eq!(config.find_element_by_id("2"), Some(1));
        assert_eq!(config.find_element_by_id("3"), None);
        assert_eq!(config.cartridge("1").unwrap().name, "T_2_50");
    }
    #[test]
    fn distance_between() {
        let catalog = LensCatalog::build(&[50.0], &[2, 4]).unwrap();
        let d = beamline()
            .distance_between("1", "2", &catalog, &geometry())
            .unwrap();
        assert_abs_diff_eq!(d, 2.0 * 0.03 - 2.0 * 0.002, epsilon = 1e-15);
        assert_matches!(
            beamline().distance_between("1", "7", &catalog, &geometry()),
            Err(CrlError::UnknownCartridge(_))
        );
        let catalog = LensCatalog::build(&[200.0], &[2, 4]).unwrap();
        assert_matches!(
            beamline().distance_between("1", "2", &catalog, &geometry()),
            Err(CrlError::Config(_))
        );
    }
    #[test]
    fn cartridge_position() {
        assert_abs_diff_eq!(
            beamline().cartridge_position("2", &geometry()).unwrap(),
            0.15,
            epsilon = 1e-15
        );
    }
}
