#![warn(missing_docs)]
//! Simulator configuration.
//!
//! All tunable parameters of a simulation are collected in the typed [`SimulatorConfig`]. A configuration is
//! usually read from a JSON defaults file (e.g. `package_data/json/defaults_crl.json`). Missing keys fall back to
//! the built-in defaults, unknown keys are rejected. Lengths are given in meters and angles in radians, the lens
//! radii in micrometers.
use std::{fs, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};
use uom::si::{
    f64::{Angle, Length},
    length::meter,
};

use crate::{
    beamline::TransfocatorGeometry,
    delta::Characteristic,
    error::{CrlError, CrlResult},
    matrix::BackendType,
    meter, radian,
    report::OutputFormat,
};

/// Configuration of a transfocator simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorConfig {
    /// name of the beamline (selects `<beamline>_crl.json`)
    pub beamline: String,
    /// calculate delta analytically instead of looking it up in `data_file`
    pub calc_delta: bool,
    /// distance from the secondary source aperture to the nominal focus
    pub d_ssa_focus: Length,
    /// name of the tabulated delta file
    pub data_file: String,
    /// distance between two neighbouring cartridges
    pub dl_cart: Length,
    /// distance between two lenses within a cartridge
    pub dl_lens: Length,
    /// available numbers of lenses per cartridge
    pub lens_array: Vec<u32>,
    /// available lens radii (µm)
    pub r_array: Vec<f64>,
    /// format of the simulation report
    pub output_format: OutputFormat,
    /// distance from the source to the first lens
    pub p0: Length,
    /// divergence of the source
    pub teta0: Angle,
    /// tolerance for the comparison of lens radii
    pub radii_tolerance: Length,
    /// chemical formula of the lens material for the analytical delta calculation
    pub formula: String,
    /// tabulated characteristic in `data_file`
    pub characteristic: Characteristic,
    /// matrix backend
    pub matrix_backend: BackendType,
    /// optional file the simulation report is written to
    pub outfile: Option<String>,
}
impl Default for SimulatorConfig {
    /// Default configuration of the SMI beamline with beryllium lenses.
    fn default() -> Self {
        Self {
            beamline: "smi".into(),
            calc_delta: false,
            d_ssa_focus: meter!(8.1),
            data_file: "Be_delta.dat".into(),
            dl_cart: meter!(0.03),
            dl_lens: meter!(0.002),
            lens_array: vec![1, 2, 4, 8, 16],
            r_array: vec![50.0, 200.0, 500.0],
            output_format: OutputFormat::Csv,
            p0: meter!(6.2),
            teta0: radian!(6e-5),
            radii_tolerance: meter!(1e-8),
            formula: "Be".into(),
            characteristic: Characteristic::Delta,
            matrix_backend: BackendType::Naive,
            outfile: None,
        }
    }
}
impl SimulatorConfig {
    /// Read a [`SimulatorConfig`] from a JSON file and validate it.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Config`] if the file cannot be read or parsed or if the values
    /// are invalid (see [`SimulatorConfig::validate`]).
    pub fn from_file(path: &Path) -> CrlResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CrlError::Config(format!(
                "the specified file <{}> not found: {e}",
                path.display()
            ))
        })?;
        let config = Self::from_json(&contents)?;
        debug!("read simulator defaults from {}", path.display());
        Ok(config)
    }
    /// Parse a [`SimulatorConfig`] from a JSON string and validate it.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Config`] if the string cannot be parsed or the values are invalid.
    pub fn from_json(json: &str) -> CrlResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CrlError::Config(format!("malformed simulator configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }
    /// Check the values of this [`SimulatorConfig`].
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Config`] if
    ///   - a spacing, distance or the radius tolerance is not positive and finite
    ///   - the radius or lens count set is empty or contains non-positive values
    ///   - the beamline name is empty
    pub fn validate(&self) -> CrlResult<()> {
        for (name, value) in [
            ("d_ssa_focus", self.d_ssa_focus),
            ("dl_cart", self.dl_cart),
            ("dl_lens", self.dl_lens),
            ("p0", self.p0),
            ("radii_tolerance", self.radii_tolerance),
        ] {
            let value = value.get::<meter>();
            if !value.is_finite() || value <= 0.0 {
                return Err(CrlError::Config(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if !self.teta0.is_finite() {
            return Err(CrlError::Config("teta0 must be finite".into()));
        }
        if self.r_array.is_empty() || self.r_array.iter().any(|r| !r.is_finite() || *r <= 0.0) {
            return Err(CrlError::Config(
                "r_array must contain positive radii only".into(),
            ));
        }
        if self.lens_array.is_empty() || self.lens_array.contains(&0) {
            return Err(CrlError::Config(
                "lens_array must contain positive lens counts only".into(),
            ));
        }
        if self.beamline.trim().is_empty() {
            return Err(CrlError::Config("beamline name must not be empty".into()));
        }
        Ok(())
    }
    /// Returns the [`TransfocatorGeometry`] of this [`SimulatorConfig`].
    #[must_use]
    pub fn geometry(&self) -> TransfocatorGeometry {
        TransfocatorGeometry {
            dl_cart: self.dl_cart,
            dl_lens: self.dl_lens,
            d_ssa_focus: self.d_ssa_focus,
            radii_tolerance: self.radii_tolerance,
        }
    }
}
