#![warn(missing_docs)]
//! A simulation session combining configuration, beamline data and delta determination.
//!
//! The [`CrlSession`] wires the collaborators of the [`CrlSimulator`] together: it reads the beamline layout and
//! the tabulated delta values from the package data directory and determines delta for a given photon energy
//! before running the simulation.
//!
//! The package data directory is expected to have the following layout:
//! ```text
//! package_data/
//! ├── dat/<data_file>          tabulated delta values (CXRO format)
//! └── json/
//!     ├── <beamline>_crl.json  transfocator layout
//!     └── defaults_crl.json    simulator defaults
//! ```
use std::path::{Path, PathBuf};

use log::info;
use rayon::prelude::*;

use crate::{
    beamline::BeamlineConfig,
    config::SimulatorConfig,
    delta::{Characteristic, DeltaFinder, DeltaLookup, DeltaSource},
    error::{CrlError, CrlResult},
    report::SimulationReport,
    simulator::{CrlSimulator, SimulationResult},
};

/// Returns the package data directory shipped with this crate.
#[must_use]
pub fn default_package_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("package_data")
}
/// Returns the path of the beamline file of the given beamline within a package data directory.
#[must_use]
pub fn beamline_file(package_dir: &Path, beamline: &str) -> PathBuf {
    package_dir.join("json").join(format!("{beamline}_crl.json"))
}
/// Returns the path of the simulator defaults file within a package data directory.
#[must_use]
pub fn defaults_file(package_dir: &Path) -> PathBuf {
    package_dir.join("json").join("defaults_crl.json")
}
/// Returns the path of a tabulated data file within a package data directory.
#[must_use]
pub fn data_file(package_dir: &Path, file_name: &str) -> PathBuf {
    package_dir.join("dat").join(file_name)
}

/// Simulation session of one beamline.
#[derive(Debug, Clone)]
pub struct CrlSession {
    config: SimulatorConfig,
    simulator: CrlSimulator,
    delta_finder: DeltaFinder,
}
impl CrlSession {
    /// Creates a new [`CrlSession`] for the given configuration.
    ///
    /// The beamline layout and (unless `calc_delta` is set) the tabulated delta values are read from the given
    /// package data directory.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the configuration is invalid
    ///   - the beamline or data file cannot be read
    pub fn new(config: SimulatorConfig, package_dir: &Path) -> CrlResult<Self> {
        config.validate()?;
        let beamline = BeamlineConfig::from_file(&beamline_file(package_dir, &config.beamline))?;
        let delta_finder = if config.calc_delta {
            DeltaFinder::new(
                DeltaSource::Analytical(config.formula.clone()),
                config.characteristic,
            )?
        } else {
            DeltaFinder::from_dat_file(
                &data_file(package_dir, &config.data_file),
                config.characteristic,
            )?
        };
        let simulator = CrlSimulator::new(
            beamline,
            config.geometry(),
            &config.r_array,
            &config.lens_array,
            config.matrix_backend,
        )?;
        Ok(Self {
            config,
            simulator,
            delta_finder,
        })
    }
    /// Returns a reference to the configuration of this [`CrlSession`].
    #[must_use]
    pub const fn config(&self) -> &SimulatorConfig {
        &self.config
    }
    /// Returns a reference to the simulator of this [`CrlSession`].
    #[must_use]
    pub const fn simulator(&self) -> &CrlSimulator {
        &self.simulator
    }
    /// Determine delta for the given photon energy (eV).
    ///
    /// # Errors
    ///
    /// This function will return an error if delta cannot be determined (see [`DeltaFinder::find`]).
    pub fn find_delta(&self, energy: f64) -> CrlResult<DeltaLookup> {
        self.delta_finder.find(energy)
    }
    /// Simulate the transfocator with the given cartridges at the given photon energy (eV).
    ///
    /// If `delta` is given, it is used directly instead of being determined from the energy.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - delta has to be determined but the session tabulates another characteristic
    ///     ([`CrlError::InvalidArgument`])
    ///   - delta cannot be determined or the simulation fails (see [`CrlSimulator::simulate`])
    pub fn simulate(
        &self,
        cart_ids: &[String],
        energy: f64,
        delta: Option<f64>,
    ) -> CrlResult<SimulationResult> {
        if cart_ids.is_empty() {
            return Ok(SimulationResult::without_lenses());
        }
        let delta = match delta {
            Some(delta) => delta,
            None => {
                let characteristic = self.delta_finder.characteristic();
                if characteristic != Characteristic::Delta {
                    return Err(CrlError::InvalidArgument(format!(
                        "cannot simulate with {characteristic} values, the lenses need delta"
                    )));
                }
                self.find_delta(energy)?.characteristic_value
            }
        };
        info!(
            "simulating cartridges [{}] of beamline <{}> at {energy} eV",
            cart_ids.join(", "),
            self.simulator.beamline().name()
        );
        self.simulator
            .simulate(cart_ids, self.config.p0, self.config.teta0, delta)
    }
    /// Simulate the transfocator with the given cartridges for a list of photon energies (eV).
    ///
    /// The simulations are independent and run in parallel. The results are returned in the order of the given
    /// energies.
    ///
    /// # Errors
    ///
    /// This function will return the first error of any of the simulations.
    pub fn simulate_sweep(
        &self,
        cart_ids: &[String],
        energies: &[f64],
    ) -> CrlResult<Vec<SimulationResult>> {
        energies
            .par_iter()
            .map(|energy| self.simulate(cart_ids, *energy, None))
            .collect()
    }
    /// Create the [`SimulationReport`] of a result of this [`CrlSession`].
    #[must_use]
    pub fn report(&self, result: &SimulationResult) -> SimulationReport {
        SimulationReport::new(self.config.p0, result)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::meter;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use uom::si::length::meter;

    fn session() -> CrlSession {
        let config = SimulatorConfig {
            p0: meter!(6.52),
            ..SimulatorConfig::default()
        };
        CrlSession::new(config, Path::new("package_data")).unwrap()
    }
    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| (*id).to_owned()).collect()
    }
    #[test]
    fn paths() {
        let dir = Path::new("package_data");
        assert_eq!(
            beamline_file(dir, "smi"),
            Path::new("package_data/json/smi_crl.json")
        );
        assert_eq!(
            data_file(dir, "Be_delta.dat"),
            Path::new("package_data/dat/Be_delta.dat")
        );
        assert!(defaults_file(&default_package_dir()).exists());
    }
    #[test]
    fn new_wrong() {
        let config = SimulatorConfig {
            beamline: "nonexistent".into(),
            ..SimulatorConfig::default()
        };
        assert_matches!(
            CrlSession::new(config, Path::new("package_data")),
            Err(CrlError::Config(_))
        );
        let config = SimulatorConfig {
            data_file: "nonexistent.dat".into(),
            ..SimulatorConfig::default()
        };
        assert_matches!(
            CrlSession::new(config, Path::new("package_data")),
            Err(CrlError::Dataset(_))
        );
    }
    #[test]
    fn simulate() {
        let result = session()
            .simulate(&ids(&["2", "4", "6", "7", "8"]), 21500.0, None)
            .unwrap();
        assert_abs_diff_eq!(result.defocus_real.get::<meter>(), 0.0012016729, epsilon = 1e-9);
        let report = session().report(&result);
        assert_eq!(report.p0, 6.52);
    }
    #[test]
    fn simulate_explicit_delta() {
        let session = session();
        let from_energy = session
            .simulate(&ids(&["4", "7"]), 21500.0, None)
            .unwrap();
        let from_delta = session
            .simulate(&ids(&["4", "7"]), 0.0, Some(7.36433378E-07))
            .unwrap();
        assert_eq!(from_energy, from_delta);
    }
    #[test]
    fn simulate_out_of_range() {
        assert_matches!(
            session().simulate(&ids(&["2"]), 1.0, None),
            Err(CrlError::OutOfRange(_))
        );
        // no lenses, no delta needed
        assert!(session().simulate(&[], 1.0, None).is_ok());
    }
    #[test]
    fn simulate_needs_delta() {
        let config = SimulatorConfig {
            p0: meter!(6.52),
            characteristic: Characteristic::Atten,
            ..SimulatorConfig::default()
        };
        let session = CrlSession::new(config, Path::new("package_data")).unwrap();
        assert_matches!(
            session.simulate(&ids(&["2", "4", "6", "7", "8"]), 21500.0, None),
            Err(CrlError::InvalidArgument(_))
        );
        assert_matches!(
            session.simulate_sweep(&ids(&["2"]), &[21500.0]),
            Err(CrlError::InvalidArgument(_))
        );
        // an explicit delta does not need the tabulated values
        assert!(session
            .simulate(&ids(&["2"]), 21500.0, Some(7.36433378E-07))
            .is_ok());
        // the other characteristics can still be looked up
        assert!(session.find_delta(21500.0).is_ok());
    }
    #[test]
    fn sweep_keeps_order() {
        let session = session();
        let energies = [21000.0, 21500.0, 22000.0, 18000.0];
        let sweep = session
            .simulate_sweep(&ids(&["2", "4"]), &energies)
            .unwrap();
        assert_eq!(sweep.len(), energies.len());
        for (energy, result) in energies.iter().zip(sweep.iter()) {
            assert_eq!(
                result,
                &session.simulate(&ids(&["2", "4"]), *energy, None).unwrap()
            );
        }
        assert_matches!(
            session.simulate_sweep(&ids(&["2"]), &[21500.0, 1.0]),
            Err(CrlError::OutOfRange(_))
        );
    }
    #[test]
    fn analytical_delta() {
        let config = SimulatorConfig {
            calc_delta: true,
            data_file: "nonexistent.dat".into(),
            ..SimulatorConfig::default()
        };
        let session = CrlSession::new(config, Path::new("package_data")).unwrap();
        let lookup = session.find_delta(9000.0).unwrap();
        assert_abs_diff_eq!(lookup.characteristic_value, 4.2016962882852e-6, epsilon = 1e-15);
    }
}
