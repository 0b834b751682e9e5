//! This is the documentation for the **crlsim** software package, a simulator for compound refractive lens (CRL)
//! transfocators of synchrotron X-ray beamlines.
//!
//! A transfocator consists of a number of cartridges, each holding a stack of identical parabolic lenses. Given
//! the engaged cartridges and the photon energy, [`simulator::CrlSimulator`] composes the paraxial transfer
//! matrix of the lens system, propagates a ray from the source through it and derives the real focus as well as
//! the focus of an equivalent ideal lens ([`ideal_focus`]). The index of refraction decrement of the lens
//! material is determined by [`delta`] either from tabulated data or analytically.
//!
//! [`session::CrlSession`] wires configuration, beamline layout and delta determination together, [`console`]
//! provides the command line interface.
#![allow(clippy::module_name_repetitions)]

pub mod beamline;
pub mod catalog;
pub mod config;
pub mod console;
pub mod delta;
pub mod error;
pub mod ideal_focus;
pub mod matrix;
pub mod optics;
pub mod plot;
pub mod report;
pub mod session;
pub mod simulator;
pub mod utils;

pub use session::CrlSession;
pub use simulator::{CrlSimulator, SimulationResult};

/// Return the version information of the currently built crlsim executable.
#[must_use]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_owned()
}
