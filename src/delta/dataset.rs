#![warn(missing_docs)]
//! Tabulated optical constants over photon energy.
use std::{fs, ops::RangeInclusive, path::Path};

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{CrlError, CrlResult};

/// Number of header lines of the text files exported by the CXRO X-ray database.
const DAT_HEADER_LINES: usize = 2;

/// A table of `(energy, value)` samples sorted by ascending energy.
///
/// The energy is given in eV. The meaning of the value depends on the tabulated
/// [`Characteristic`](super::Characteristic) (e.g. delta or attenuation length).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct DeltaDataset {
    samples: Vec<(f64, f64)>,
}
impl DeltaDataset {
    /// Creates a new [`DeltaDataset`].
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Dataset`] if
    ///   - no samples are given
    ///   - an energy or value is not finite
    ///   - the energies are not strictly ascending
    pub fn new(samples: Vec<(f64, f64)>) -> CrlResult<Self> {
        if samples.is_empty() {
            return Err(CrlError::Dataset("dataset contains no samples".into()));
        }
        if samples
            .iter()
            .any(|(energy, value)| !energy.is_finite() || !value.is_finite())
        {
            return Err(CrlError::Dataset(
                "dataset contains non-finite samples".into(),
            ));
        }
        if let Some(pair) = samples.windows(2).find(|pair| pair[1].0 <= pair[0].0) {
            return Err(CrlError::Dataset(format!(
                "energies must be strictly ascending, found {} eV followed by {} eV",
                pair[0].0, pair[1].0
            )));
        }
        Ok(Self { samples })
    }
    /// Read a [`DeltaDataset`] from a text file as exported by the CXRO X-ray database.
    ///
    /// The file starts with two header lines followed by whitespace separated columns. The first column is the
    /// photon energy in eV, the second column the tabulated value. Further columns are ignored.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Dataset`] if
    ///   - the file cannot be read
    ///   - a data line cannot be parsed
    ///   - the resulting dataset is invalid (see [`DeltaDataset::new`])
    pub fn from_dat_file(path: &Path) -> CrlResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CrlError::Dataset(format!(
                "the specified file <{}> not found: {e}",
                path.display()
            ))
        })?;
        Self::from_dat_string(&contents)
    }
    /// Parse a [`DeltaDataset`] from the contents of a CXRO text file. See [`DeltaDataset::from_dat_file`].
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Dataset`] if a data line cannot be parsed or the resulting
    /// dataset is invalid.
    pub fn from_dat_string(contents: &str) -> CrlResult<Self> {
        let mut samples = Vec::new();
        for (line_nr, line) in contents.trim().lines().enumerate().skip(DAT_HEADER_LINES) {
            let mut columns = line.split_whitespace();
            let (Some(energy), Some(value)) = (columns.next(), columns.next()) else {
                return Err(CrlError::Dataset(format!(
                    "line {} contains less than two columns",
                    line_nr + 1
                )));
            };
            samples.push((
                parse_number(energy, line_nr)?,
                parse_number(value, line_nr)?,
            ));
        }
        Self::new(samples)
    }
    /// Read a [`DeltaDataset`] from a CSV file with a header row and the two columns energy (eV) and value.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Dataset`] if
    ///   - the file cannot be read or parsed
    ///   - the resulting dataset is invalid (see [`DeltaDataset::new`])
    pub fn from_csv(path: &Path) -> CrlResult<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b',')
            .from_path(path)
            .map_err(|e| CrlError::Dataset(e.to_string()))?;
        let mut samples = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| CrlError::Dataset(e.to_string()))?;
            let line_nr = record
                .position()
                .and_then(|p| usize::try_from(p.line()).ok())
                .map_or(0, |line| line.saturating_sub(1));
            let (Some(energy), Some(value)) = (record.get(0), record.get(1)) else {
                return Err(CrlError::Dataset(format!(
                    "line {} contains less than two columns",
                    line_nr + 1
                )));
            };
            samples.push((
                parse_number(energy.trim(), line_nr)?,
                parse_number(value.trim(), line_nr)?,
            ));
        }
        Self::new(samples)
    }
    /// Write this [`DeltaDataset`] to a CSV file with a header row `energy,<value_header>`.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Console`] if the file cannot be written.
    pub fn to_csv(&self, path: &Path, value_header: &str) -> CrlResult<()> {
        let mut writer = WriterBuilder::new()
            .from_path(path)
            .map_err(|e| CrlError::Console(e.to_string()))?;
        writer
            .write_record(["energy", value_header])
            .map_err(|e| CrlError::Console(e.to_string()))?;
        for (energy, value) in &self.samples {
            writer
                .write_record([energy.to_string(), value.to_string()])
                .map_err(|e| CrlError::Console(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| CrlError::Console(e.to_string()))
    }
    /// Returns the samples of this [`DeltaDataset`].
    #[must_use]
    pub fn samples(&self) -> &[(f64, f64)] {
        &self.samples
    }
    /// Returns the tabulated energy range (eV).
    #[must_use]
    pub fn energy_range(&self) -> RangeInclusive<f64> {
        // samples are never empty
        self.samples[0].0..=self.samples[self.samples.len() - 1].0
    }
    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    /// Always `false`, since a [`DeltaDataset`] cannot be created without samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl TryFrom<Vec<(f64, f64)>> for DeltaDataset {
    type Error = CrlError;

    fn try_from(samples: Vec<(f64, f64)>) -> CrlResult<Self> {
        Self::new(samples)
    }
}
impl From<DeltaDataset> for Vec<(f64, f64)> {
    fn from(dataset: DeltaDataset) -> Self {
        dataset.samples
    }
}

fn parse_number(text: &str, line_nr: usize) -> CrlResult<f64> {
    text.parse::<f64>().map_err(|e| {
        CrlError::Dataset(format!(
            "cannot parse <{text}> in line {}: {e}",
            line_nr + 1
        ))
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::NamedTempFile;

    #[test]
    fn new() {
        let ds = DeltaDataset::new(vec![(1000.0, 1e-5), (2000.0, 3e-6)]).unwrap();
        assert_eq!(ds.len(), 2);
        assert!(!ds.is_empty());
        assert_eq!(ds.energy_range(), 1000.0..=2000.0);
    }
    #[test]
    fn new_wrong() {
        assert_matches!(DeltaDataset::new(vec![]), Err(CrlError::Dataset(_)));
        assert_matches!(
            DeltaDataset::new(vec![(2000.0, 1e-5), (1000.0, 3e-6)]),
            Err(CrlError::Dataset(_))
        );
        assert_matches!(
            DeltaDataset::new(vec![(1000.0, 1e-5), (1000.0, 3e-6)]),
            Err(CrlError::Dataset(_))
        );
        assert_matches!(
            DeltaDataset::new(vec![(1000.0, f64::NAN)]),
            Err(CrlError::Dataset(_))
        );
    }
    #[test]
    fn from_dat_string() {
        let contents = " Be Density=1.848\n Energy(eV), Delta, Beta\n  1000.00  3.4E-04  1.5E-05\n  2000.00  8.5E-05  1.1E-06\n";
        let ds = DeltaDataset::from_dat_string(contents).unwrap();
        assert_eq!(ds.samples(), &[(1000.0, 3.4e-4), (2000.0, 8.5e-5)]);
        assert_matches!(
            DeltaDataset::from_dat_string("a\nb\n 1000.0 abc\n"),
            Err(CrlError::Dataset(_))
        );
        assert_matches!(
            DeltaDataset::from_dat_string("a\nb\n 1000.0\n"),
            Err(CrlError::Dataset(_))
        );
        assert_matches!(
            DeltaDataset::from_dat_string("a\nb\n"),
            Err(CrlError::Dataset(_))
        );
    }
    #[test]
    fn from_dat_file() {
        let ds = DeltaDataset::from_dat_file(Path::new("package_data/dat/Be_delta.dat")).unwrap();
        assert!(ds.energy_range().contains(&21500.0));
        assert_matches!(
            DeltaDataset::from_dat_file(Path::new("wrong_path.dat")),
            Err(CrlError::Dataset(_))
        );
    }
    #[test]
    fn csv_roundtrip() {
        let ds = DeltaDataset::new(vec![(1000.0, 3.4e-4), (2000.0, 8.5e-5)]).unwrap();
        let file = NamedTempFile::new().unwrap();
        ds.to_csv(file.path(), "delta").unwrap();
        let contents = fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents, "energy,delta\n1000,0.00034\n2000,0.000085\n");
        assert_eq!(DeltaDataset::from_csv(file.path()).unwrap(), ds);
    }
    #[test]
    fn deserialize_checks_samples() {
        let ds: DeltaDataset = serde_json::from_str("[[1000.0, 3.4e-4], [2000.0, 8.5e-5]]").unwrap();
        assert_eq!(ds.samples(), &[(1000.0, 3.4e-4), (2000.0, 8.5e-5)]);
        let json = serde_json::to_string(&ds).unwrap();
        assert!(json.starts_with("[[1000.0,"));
        assert_eq!(serde_json::from_str::<DeltaDataset>(&json).unwrap(), ds);
        assert!(serde_json::from_str::<DeltaDataset>("[]").is_err());
        assert!(serde_json::from_str::<DeltaDataset>("[[3000, 1], [1000, 2], [2000, 3]]").is_err());
    }
    #[test]
    fn from_csv_wrong() {
        assert!(DeltaDataset::from_csv(Path::new("wrong_path.csv")).is_err());
    }
}
