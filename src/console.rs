//! Handling the crlsim CLI
//!
//! This module handles the command line parsing and the execution of the subcommands. Every subcommand returns the
//! text to be printed on the console.
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use clap::{builder::Str, Args as ClapArgs, Parser, Subcommand};
use log::info;
use uom::si::{
    angle::radian,
    f64::{Angle, Length},
    length::meter,
};

use crate::{
    config::SimulatorConfig,
    delta::{analytical_delta, Characteristic, DeltaDataset},
    error::{CrlError, CrlResult},
    get_version,
    ideal_focus::compute_ideal_focus,
    matrix::BackendType,
    plot::plot_dataset,
    report::{render_table, render_values, OutputFormat},
    session::{default_package_dir, defaults_file, CrlSession},
};

/// Command line arguments of the crlsim application.
#[derive(Parser, Debug)]
#[command(author, version = Str::from(&get_version()), about, long_about = None)]
pub struct Args {
    /// subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the crlsim application.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// simulate the transfocator with the given cartridges engaged
    Simulate {
        /// ids of the engaged cartridges in beam order
        cart_ids: Vec<String>,
        /// photon energy (eV)
        #[arg(short, long)]
        energy: f64,
        /// index of refraction decrement. determined from the energy if not given
        #[arg(long)]
        delta: Option<f64>,
        #[command(flatten)]
        options: SimulationOptions,
    },
    /// calculate the focus of an ideal lens
    IdealFocus {
        /// radius of a single lens (m)
        #[arg(short, long)]
        radius: f64,
        /// number of lenses
        #[arg(short, long)]
        n: i64,
        /// index of refraction decrement
        #[arg(short, long, required_unless_present = "energy")]
        delta: Option<f64>,
        /// photon energy (eV) used to calculate delta analytically
        #[arg(short, long, conflicts_with = "delta")]
        energy: Option<f64>,
        /// chemical formula of the lens material
        #[arg(short, long, default_value = "Be")]
        formula: String,
        /// distance from the source to the lens (m)
        #[arg(short, long)]
        p0: f64,
        /// output format
        #[arg(short, long, default_value = "plain")]
        output_format: OutputFormat,
    },
    /// determine delta (or another characteristic) for a photon energy
    FindDelta {
        /// photon energy (eV)
        #[arg(short, long)]
        energy: f64,
        /// calculate delta analytically instead of looking it up
        #[arg(long)]
        calc_delta: bool,
        /// name of the tabulated data file
        #[arg(long)]
        data_file: Option<String>,
        /// chemical formula of the lens material
        #[arg(long)]
        formula: Option<String>,
        /// tabulated characteristic
        #[arg(long)]
        characteristic: Option<Characteristic>,
        #[command(flatten)]
        paths: DataPaths,
    },
    /// simulate the transfocator for a list of photon energies
    Sweep {
        /// ids of the engaged cartridges in beam order
        cart_ids: Vec<String>,
        /// photon energies (eV)
        #[arg(long, num_args = 1.., required = true)]
        energies: Vec<f64>,
        #[command(flatten)]
        options: SimulationOptions,
    },
    /// export a tabulated data file as CSV and optionally plot it
    ExportDelta {
        /// name of the tabulated data file
        #[arg(long)]
        data_file: Option<String>,
        /// destination of the CSV file
        #[arg(long)]
        csv: PathBuf,
        /// destination of the plot (.svg, .png, .bmp or .jpg)
        #[arg(long)]
        plot: Option<PathBuf>,
        /// tabulated characteristic
        #[arg(long)]
        characteristic: Option<Characteristic>,
        #[command(flatten)]
        paths: DataPaths,
    },
}

/// Location of the package data.
#[derive(ClapArgs, Debug, Default)]
pub struct DataPaths {
    /// package data directory containing the `json` and `dat` subdirectories
    #[arg(long)]
    pub config_dir: Option<PathBuf>,
    /// simulator defaults file. `<config_dir>/json/defaults_crl.json` if not given
    #[arg(long)]
    pub defaults: Option<PathBuf>,
}
impl DataPaths {
    fn package_dir(&self) -> PathBuf {
        self.config_dir.clone().unwrap_or_else(default_package_dir)
    }
    fn load_config(&self) -> CrlResult<SimulatorConfig> {
        let defaults = self
            .defaults
            .clone()
            .unwrap_or_else(|| defaults_file(&self.package_dir()));
        SimulatorConfig::from_file(&defaults)
    }
}

/// Options overriding the simulator defaults.
#[derive(ClapArgs, Debug, Default)]
pub struct SimulationOptions {
    /// distance from the source to the first lens (m)
    #[arg(long)]
    pub p0: Option<f64>,
    /// divergence of the source (rad)
    #[arg(long)]
    pub teta0: Option<f64>,
    /// name of the beamline
    #[arg(short, long)]
    pub beamline: Option<String>,
    /// calculate delta analytically instead of looking it up
    #[arg(long)]
    pub calc_delta: bool,
    /// name of the tabulated data file
    #[arg(long)]
    pub data_file: Option<String>,
    /// chemical formula of the lens material
    #[arg(long)]
    pub formula: Option<String>,
    /// output format
    #[arg(short, long)]
    pub output_format: Option<OutputFormat>,
    /// file the report is written to
    #[arg(long)]
    pub outfile: Option<String>,
    /// matrix backend
    #[arg(long)]
    pub backend: Option<BackendType>,
    /// available numbers of lenses per cartridge, comma separated
    #[arg(long, value_delimiter = ',')]
    pub lens_array: Option<Vec<u32>>,
    /// available lens radii (µm), comma separated
    #[arg(long, value_delimiter = ',')]
    pub r_array: Option<Vec<f64>>,
    /// distance between two neighbouring cartridges (m)
    #[arg(long)]
    pub dl_cart: Option<f64>,
    /// distance between two lenses within a cartridge (m)
    #[arg(long)]
    pub dl_lens: Option<f64>,
    /// distance from the secondary source aperture to the nominal focus (m)
    #[arg(long)]
    pub d_ssa_focus: Option<f64>,
    #[command(flatten)]
    pub paths: DataPaths,
}
impl SimulationOptions {
    fn apply(&self, config: &mut SimulatorConfig) {
        if let Some(p0) = self.p0 {
            config.p0 = Length::new::<meter>(p0);
        }
        if let Some(teta0) = self.teta0 {
            config.teta0 = Angle::new::<radian>(teta0);
        }
        if let Some(beamline) = &self.beamline {
            config.beamline.clone_from(beamline);
        }
        config.calc_delta |= self.calc_delta;
        if let Some(data_file) = &self.data_file {
            config.data_file.clone_from(data_file);
        }
        if let Some(formula) = &self.formula {
            config.formula.clone_from(formula);
        }
        if let Some(output_format) = self.output_format {
            config.output_format = output_format;
        }
        if self.outfile.is_some() {
            config.outfile.clone_from(&self.outfile);
        }
        if let Some(backend) = self.backend {
            config.matrix_backend = backend;
        }
        if let Some(lens_array) = &self.lens_array {
            config.lens_array.clone_from(lens_array);
        }
        if let Some(r_array) = &self.r_array {
            config.r_array.clone_from(r_array);
        }
        if let Some(dl_cart) = self.dl_cart {
            config.dl_cart = Length::new::<meter>(dl_cart);
        }
        if let Some(dl_lens) = self.dl_lens {
            config.dl_lens = Length::new::<meter>(dl_lens);
        }
        if let Some(d_ssa_focus) = self.d_ssa_focus {
            config.d_ssa_focus = Length::new::<meter>(d_ssa_focus);
        }
    }
    fn session(&self) -> CrlResult<CrlSession> {
        let mut config = self.paths.load_config()?;
        self.apply(&mut config);
        CrlSession::new(config, &self.paths.package_dir())
    }
}

/// Execute the subcommand given by the command line arguments.
///
/// # Errors
///
/// This function will return an error if the subcommand fails.
pub fn execute(args: Args) -> CrlResult<String> {
    match args.command {
        Command::Simulate {
            cart_ids,
            energy,
            delta,
            options,
        } => simulate(&cart_ids, energy, delta, &options),
        Command::IdealFocus {
            radius,
            n,
            delta,
            energy,
            formula,
            p0,
            output_format,
        } => ideal_focus(radius, n, delta, energy, &formula, p0, output_format),
        Command::FindDelta {
            energy,
            calc_delta,
            data_file,
            formula,
            characteristic,
            paths,
        } => {
            let options = SimulationOptions {
                calc_delta,
                data_file,
                formula,
                paths,
                ..SimulationOptions::default()
            };
            let mut config = options.paths.load_config()?;
            options.apply(&mut config);
            if let Some(characteristic) = characteristic {
                config.characteristic = characteristic;
            }
            let session = CrlSession::new(config, &options.paths.package_dir())?;
            let lookup = session.find_delta(energy)?;
            Ok(format!(
                "{}: {}, closest_energy: {}, method: {}",
                session.config().characteristic,
                lookup.characteristic_value,
                lookup.closest_energy,
                lookup.method
            ))
        }
        Command::Sweep {
            cart_ids,
            energies,
            options,
        } => sweep(&cart_ids, &energies, &options),
        Command::ExportDelta {
            data_file,
            csv,
            plot,
            characteristic,
            paths,
        } => {
            let config = paths.load_config()?;
            let file_name = data_file.unwrap_or(config.data_file);
            let characteristic = characteristic.unwrap_or(config.characteristic);
            export_delta(
                &crate::session::data_file(&paths.package_dir(), &file_name),
                &csv,
                plot.as_deref(),
                characteristic,
            )
        }
    }
}

fn simulate(
    cart_ids: &[String],
    energy: f64,
    delta: Option<f64>,
    options: &SimulationOptions,
) -> CrlResult<String> {
    let session = options.session()?;
    let result = session.simulate(cart_ids, energy, delta)?;
    let report = session.report(&result);
    let config = session.config();
    if let Some(outfile) = &config.outfile {
        report.write_to_file(config.output_format, Path::new(outfile))?;
        info!("report written to {outfile}");
    }
    report.render(config.output_format)
}

fn sweep(cart_ids: &[String], energies: &[f64], options: &SimulationOptions) -> CrlResult<String> {
    let session = options.session()?;
    let results = session.simulate_sweep(cart_ids, energies)?;
    let records: Vec<BTreeMap<&str, Option<f64>>> = energies
        .iter()
        .zip(results.iter())
        .map(|(energy, result)| {
            let mut values = session.report(result).sorted_values();
            values.insert("energy", Some(*energy));
            values
        })
        .collect();
    let config = session.config();
    let text = render_table(&records, config.output_format)?;
    if let Some(outfile) = &config.outfile {
        std::fs::write(outfile, &text).map_err(|e| {
            CrlError::Console(format!("writing report to {outfile} failed: {e}"))
        })?;
    }
    Ok(text)
}

#[allow(clippy::too_many_arguments)]
fn ideal_focus(
    radius: f64,
    n: i64,
    delta: Option<f64>,
    energy: Option<f64>,
    formula: &str,
    p0: f64,
    output_format: OutputFormat,
) -> CrlResult<String> {
    let delta = match (delta, energy) {
        (Some(delta), _) => delta,
        (None, Some(energy)) => analytical_delta(energy, formula)?,
        (None, None) => {
            return Err(CrlError::Console(
                "either delta or the photon energy has to be given".into(),
            ))
        }
    };
    let focus = compute_ideal_focus(
        Length::new::<meter>(radius),
        n,
        delta,
        Length::new::<meter>(p0),
    )?;
    let values = BTreeMap::from([
        ("ideal_focus", Some(focus.ideal_focus.get::<meter>())),
        ("p1_ideal", Some(focus.p1_ideal.get::<meter>())),
        (
            "p1_ideal_from_source",
            Some(focus.p1_ideal_from_source.get::<meter>()),
        ),
    ]);
    render_values(&values, output_format)
}

fn export_delta(
    dat_file: &Path,
    csv: &Path,
    plot: Option<&Path>,
    characteristic: Characteristic,
) -> CrlResult<String> {
    let dataset = DeltaDataset::from_dat_file(dat_file)?;
    dataset.to_csv(csv, &characteristic.to_string())?;
    let mut message = format!(
        "exported {} samples of {} to {}",
        dataset.len(),
        dat_file.display(),
        csv.display()
    );
    if let Some(plot) = plot {
        plot_dataset(&dataset, characteristic, plot)?;
        message.push_str(&format!(", plot written to {}", plot.display()));
    }
    Ok(message)
}
