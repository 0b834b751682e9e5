#![warn(missing_docs)]
//! Crlsim specific error structures
use std::{error::Error, fmt::Display};

/// Crlsim application specific Result type
pub type CrlResult<T> = std::result::Result<T, CrlError>;

/// Errors that can be returned by the transfer-matrix algebra, the delta resolution and the CRL simulator.
///
/// All variants are fatal to a single simulation request. The only soft failure of a simulation
/// (ideal lens not computable because of differing radii) is not an error but reported inside the
/// [`SimulationResult`](crate::simulator::SimulationResult).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrlError {
    /// inner dimensions of a matrix product do not match
    Dimension(String),
    /// a square matrix was required (e.g. for matrix powers)
    NonSquareMatrix(String),
    /// the requested operation is not defined (e.g. negative matrix powers)
    UnsupportedOperation(String),
    /// an optical element was created with a zero radius or a zero delta
    InvalidOpticalParameter(String),
    /// a requested cartridge id is not part of the beamline configuration
    UnknownCartridge(String),
    /// the same cartridge id was requested more than once
    DuplicateCartridge(String),
    /// the photon energy is outside of the tabulated energy range
    OutOfRange(String),
    /// a precondition on a function argument is violated
    InvalidArgument(String),
    /// a formula degenerates (e.g. a collimated beam without finite image distance)
    DivisionByZero(String),
    /// malformed or invalid configuration or beamline files
    Config(String),
    /// errors while reading or constructing a delta dataset
    Dataset(String),
    /// errors console io
    Console(String),
    /// errors not falling in one of the categories above
    Other(String),
}

impl Display for CrlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dimension(m) => write!(f, "Dimension:{m}"),
            Self::NonSquareMatrix(m) => write!(f, "NonSquareMatrix:{m}"),
            Self::UnsupportedOperation(m) => write!(f, "UnsupportedOperation:{m}"),
            Self::InvalidOpticalParameter(m) => write!(f, "InvalidOpticalParameter:{m}"),
            Self::UnknownCartridge(m) => write!(f, "UnknownCartridge:{m}"),
            Self::DuplicateCartridge(m) => write!(f, "DuplicateCartridge:{m}"),
            Self::OutOfRange(m) => write!(f, "OutOfRange:{m}"),
            Self::InvalidArgument(m) => write!(f, "InvalidArgument:{m}"),
            Self::DivisionByZero(m) => write!(f, "DivisionByZero:{m}"),
            Self::Config(m) => write!(f, "Config:{m}"),
            Self::Dataset(m) => write!(f, "Dataset:{m}"),
            Self::Console(m) => write!(f, "Console:{m}"),
            Self::Other(m) => write!(f, "Crlsim Error:Other:{m}"),
        }
    }
}
impl Error for CrlError {}

impl std::convert::From<String> for CrlError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}
#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn from() {
        let error = CrlError::from("test".to_string());
        assert_eq!(error, CrlError::Other("test".to_string()));
    }
    #[test]
    fn display() {
        assert_eq!(
            format!("{}", CrlError::Dimension("test".to_string())),
            "Dimension:test"
        );
        assert_eq!(
            format!("{}", CrlError::UnknownCartridge("test".to_string())),
            "UnknownCartridge:test"
        );
        assert_eq!(
            format!("{}", CrlError::OutOfRange("test".to_string())),
            "OutOfRange:test"
        );
        assert_eq!(
            format!("{}", CrlError::DivisionByZero("test".to_string())),
            "DivisionByZero:test"
        );
        assert_eq!(
            format!("{}", CrlError::Config("test".to_string())),
            "Config:test"
        );
        assert_eq!(
            format!("{}", CrlError::Other("test".to_string())),
            "Crlsim Error:Other:test"
        );
    }
    #[test]
    fn debug() {
        assert_eq!(
            format!("{:?}", CrlError::NonSquareMatrix("test".to_string())),
            "NonSquareMatrix(\"test\")"
        );
    }
}
