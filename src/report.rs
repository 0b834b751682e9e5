#![warn(missing_docs)]
//! Rendering of simulation results.
//!
//! A [`SimulationReport`] condenses a [`SimulationResult`] into the six numbers printed by the command line tool
//! (`d`, `d_ideal`, `f`, `p0`, `p1`, `p1_ideal`, all in meters). It can be rendered as CSV, JSON or plain text
//! (see [`OutputFormat`]). Keys are always sorted alphabetically.
use std::{collections::BTreeMap, fmt::Display, fs, path::Path};

use csv::{QuoteStyle, WriterBuilder};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use strum::EnumIter;
use uom::si::{f64::Length, length::meter};

use crate::{
    error::{CrlError, CrlResult},
    simulator::SimulationResult,
};

/// Output format of a [`SimulationReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// quoted header line followed by one data line
    #[default]
    Csv,
    /// pretty printed JSON object
    Json,
    /// `key: value` pairs on a single line
    Plain,
}
impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
            Self::Plain => write!(f, "plain"),
        }
    }
}
impl std::str::FromStr for OutputFormat {
    type Err = CrlError;

    fn from_str(s: &str) -> CrlResult<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "plain" => Ok(Self::Plain),
            _ => Err(CrlError::InvalidArgument(format!(
                "unknown output format <{s}>"
            ))),
        }
    }
}

/// Summary of a simulation run as printed by the command line tool. All values in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// source distance
    pub p0: f64,
    /// real image distance
    pub p1: f64,
    /// ideal image distance
    pub p1_ideal: Option<f64>,
    /// real defocus
    pub d: f64,
    /// ideal defocus
    pub d_ideal: Option<f64>,
    /// focal length of the lens system
    pub f: f64,
}
impl SimulationReport {
    /// Create a [`SimulationReport`] from a [`SimulationResult`] and the source distance used for the simulation.
    #[must_use]
    pub fn new(p0: Length, result: &SimulationResult) -> Self {
        Self {
            p0: p0.get::<meter>(),
            p1: result.real_focus_distance.get::<meter>(),
            p1_ideal: result.ideal_focus_distance.map(|p| p.get::<meter>()),
            d: result.defocus_real.get::<meter>(),
            d_ideal: result.defocus_ideal.map(|d| d.get::<meter>()),
            f: result.composite_focal_length.get::<meter>(),
        }
    }
    /// Returns the values of this [`SimulationReport`] sorted by key.
    #[must_use]
    pub fn sorted_values(&self) -> BTreeMap<&'static str, Option<f64>> {
        BTreeMap::from([
            ("d", Some(self.d)),
            ("d_ideal", self.d_ideal),
            ("f", Some(self.f)),
            ("p0", Some(self.p0)),
            ("p1", Some(self.p1)),
            ("p1_ideal", self.p1_ideal),
        ])
    }
    /// Render this [`SimulationReport`] in the given format.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Console`] if the serialization fails.
    pub fn render(&self, format: OutputFormat) -> CrlResult<String> {
        render_values(&self.sorted_values(), format)
    }
    /// Write the rendered report to a file.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::Console`] if the rendering or the writing of the file fails.
    pub fn write_to_file(&self, format: OutputFormat, path: &Path) -> CrlResult<()> {
        fs::write(path, self.render(format)?).map_err(|e| {
            CrlError::Console(format!("writing report to {} failed: {e}", path.display()))
        })
    }
}

/// Render a set of named values in the given format. Missing values are rendered as empty CSV field, JSON `null`
/// or `n/a`.
///
/// # Errors
///
/// This function will return an [`CrlError::Console`] if the serialization fails.
pub fn render_values(
    values: &BTreeMap<&str, Option<f64>>,
    format: OutputFormat,
) -> CrlResult<String> {
    match format {
        OutputFormat::Csv => render_csv(std::slice::from_ref(values)),
        OutputFormat::Json => render_json(values),
        OutputFormat::Plain => Ok(render_plain(values)),
    }
}

/// Render a table of records sharing the same keys (e.g. the results of an energy sweep). CSV output has a single
/// header line, JSON output is an array and plain text output has one line per record.
///
/// # Errors
///
/// This function will return an [`CrlError::Console`] if the serialization fails.
pub fn render_table(
    records: &[BTreeMap<&str, Option<f64>>],
    format: OutputFormat,
) -> CrlResult<String> {
    match format {
        OutputFormat::Csv => render_csv(records),
        OutputFormat::Json => render_json(&records),
        OutputFormat::Plain => Ok(records
            .iter()
            .map(render_plain)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn render_csv(records: &[BTreeMap<&str, Option<f64>>]) -> CrlResult<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(vec![]);
    if let Some(first) = records.first() {
        writer
            .write_record(first.keys())
            .map_err(|e| CrlError::Console(e.to_string()))?;
    }
    for record in records {
        writer
            .write_record(
                record
                    .values()
                    .map(|v| v.map_or_else(String::new, |v| v.to_string())),
            )
            .map_err(|e| CrlError::Console(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CrlError::Console(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CrlError::Console(e.to_string()))
}

fn render_json<T: Serialize + ?Sized>(value: &T) -> CrlResult<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .map_err(|e| CrlError::Console(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| CrlError::Console(e.to_string()))
}

fn render_plain(values: &BTreeMap<&str, Option<f64>>) -> String {
    values
        .iter()
        .map(|(key, value)| value.map_or_else(|| format!("{key}: n/a"), |v| format!("{key}: {v}")))
        .collect::<Vec<_>>()
        .join(", ")
}
