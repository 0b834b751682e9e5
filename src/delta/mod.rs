#![warn(missing_docs)]
//! Determination of the index of refraction decrement (delta) of the lens material.
//!
//! Delta can either be looked up in a tabulated [`DeltaDataset`] (closest tabulated energy, no interpolation)
//! or estimated analytically for elemental materials (see [`analytical`]). The [`DeltaFinder`] combines both
//! methods behind one interface.
use std::{fmt::Display, path::Path};

use log::info;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::error::{CrlError, CrlResult};

pub mod analytical;
pub mod dataset;

pub use analytical::analytical_delta;
pub use dataset::DeltaDataset;

/// Optical characteristic tabulated in a [`DeltaDataset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Characteristic {
    /// index of refraction decrement
    #[default]
    Delta,
    /// attenuation length, tabulated in micrometers and returned in meters
    Atten,
    /// transmission of a sample with a given thickness
    Transmission,
}
impl Characteristic {
    /// Factor applied to a tabulated value of this [`Characteristic`].
    #[must_use]
    pub const fn scale(self) -> f64 {
        match self {
            Self::Atten => 1e-6,
            Self::Delta | Self::Transmission => 1.0,
        }
    }
}
impl Display for Characteristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delta => write!(f, "delta"),
            Self::Atten => write!(f, "atten"),
            Self::Transmission => write!(f, "transmission"),
        }
    }
}
impl std::str::FromStr for Characteristic {
    type Err = CrlError;

    fn from_str(s: &str) -> CrlResult<Self> {
        match s.to_lowercase().as_str() {
            "delta" => Ok(Self::Delta),
            "atten" => Ok(Self::Atten),
            "transmission" => Ok(Self::Transmission),
            _ => Err(CrlError::InvalidArgument(format!(
                "unknown characteristic <{s}>"
            ))),
        }
    }
}

/// Method by which a value was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaMethod {
    /// closest sample of a tabulated dataset
    File,
    /// analytical estimate
    Calculation,
}
impl Display for DeltaMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Calculation => write!(f, "calculation"),
        }
    }
}

/// Result of a delta determination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaLookup {
    /// the (rescaled) characteristic value
    pub characteristic_value: f64,
    /// energy (eV) the value belongs to
    pub closest_energy: f64,
    /// method used for the determination
    pub method: DeltaMethod,
}

/// Find the sample of the dataset closest to the given energy (eV).
///
/// The samples are split into those with an energy `<= energy` and those above. The last sample of the first
/// group and the first sample of the second group are compared and the one closer to `energy` is returned. On a
/// tie the lower sample wins.
///
/// # Errors
///
/// This function will return an [`CrlError::OutOfRange`] if one of the groups is empty, i.e. the energy is
/// below the first or not below the last tabulated energy.
pub fn find_closest_sample(energy: f64, dataset: &DeltaDataset) -> CrlResult<(f64, f64)> {
    let samples = dataset.samples();
    let split = samples.partition_point(|(e, _)| *e <= energy);
    if split == 0 || split == samples.len() {
        let range = dataset.energy_range();
        return Err(CrlError::OutOfRange(format!(
            "use energy range from {} to {} eV (requested {energy} eV)",
            range.start(),
            range.end()
        )));
    }
    let previous = samples[split - 1];
    let next = samples[split];
    if (previous.0 - energy).abs() <= (next.0 - energy).abs() {
        Ok(previous)
    } else {
        Ok(next)
    }
}

/// Resolve the value of the given characteristic at the given energy (eV) from a tabulated dataset.
///
/// The value of the closest tabulated sample is returned without interpolation (see [`find_closest_sample`]).
/// Attenuation lengths are converted from micrometers to meters.
///
/// # Errors
///
/// This function will return an [`CrlError::OutOfRange`] if the energy is outside the tabulated range.
pub fn resolve_delta(
    energy: f64,
    dataset: &DeltaDataset,
    characteristic: Characteristic,
) -> CrlResult<f64> {
    let (_, value) = find_closest_sample(energy, dataset)?;
    Ok(value * characteristic.scale())
}

/// Source of the characteristic values used by a [`DeltaFinder`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeltaSource {
    /// tabulated dataset
    Table(DeltaDataset),
    /// analytical estimate for an elemental material given by its chemical symbol
    Analytical(String),
}

/// Determines delta (or another [`Characteristic`]) for photon energies.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaFinder {
    source: DeltaSource,
    characteristic: Characteristic,
}
impl DeltaFinder {
    /// Creates a new [`DeltaFinder`].
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::InvalidArgument`] if an analytical source is combined with a
    /// characteristic other than [`Characteristic::Delta`].
    pub fn new(source: DeltaSource, characteristic: Characteristic) -> CrlResult<Self> {
        if matches!(source, DeltaSource::Analytical(_)) && characteristic != Characteristic::Delta {
            return Err(CrlError::InvalidArgument(format!(
                "{characteristic} cannot be calculated analytically"
            )));
        }
        Ok(Self {
            source,
            characteristic,
        })
    }
    /// Create a [`DeltaFinder`] using a CXRO text file.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file cannot be read (see [`DeltaDataset::from_dat_file`]).
    pub fn from_dat_file(path: &Path, characteristic: Characteristic) -> CrlResult<Self> {
        Self::new(
            DeltaSource::Table(DeltaDataset::from_dat_file(path)?),
            characteristic,
        )
    }
    /// Returns the source of this [`DeltaFinder`].
    #[must_use]
    pub const fn source(&self) -> &DeltaSource {
        &self.source
    }
    /// Returns the characteristic of this [`DeltaFinder`].
    #[must_use]
    pub const fn characteristic(&self) -> Characteristic {
        self.characteristic
    }
    /// Determine the characteristic value for the given photon energy (eV).
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the energy is outside the tabulated range ([`CrlError::OutOfRange`])
    ///   - the analytical calculation is not possible ([`CrlError::InvalidArgument`])
    pub fn find(&self, energy: f64) -> CrlResult<DeltaLookup> {
        let lookup = match &self.source {
            DeltaSource::Table(dataset) => {
                let (closest_energy, value) = find_closest_sample(energy, dataset)?;
                DeltaLookup {
                    characteristic_value: value * self.characteristic.scale(),
                    closest_energy,
                    method: DeltaMethod::File,
                }
            }
            DeltaSource::Analytical(formula) => DeltaLookup {
                characteristic_value: analytical_delta(energy, formula)?,
                closest_energy: energy,
                method: DeltaMethod::Calculation,
            },
        };
        info!(
            "found {}={} for the closest energy={} eV from {}",
            self.characteristic, lookup.characteristic_value, lookup.closest_energy, lookup.method
        );
        Ok(lookup)
    }
}
