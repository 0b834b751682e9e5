#![warn(missing_docs)]
//! Plotting of tabulated optical constants.
use std::path::Path;

use plotters::{
    chart::ChartBuilder,
    coord::Shift,
    prelude::{BitMapBackend, DrawingArea, DrawingBackend, IntoDrawingArea, SVGBackend},
    series::LineSeries,
    style::{BLUE, WHITE},
};

use crate::{
    delta::{Characteristic, DeltaDataset},
    error::{CrlError, CrlResult},
};

/// Size of the generated figures in pixels.
const FIG_SIZE: (u32, u32) = (1000, 600);

/// Drawing backend of a plot, determined by the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PltBackEnd {
    /// `BitMapBackend`. Used to create .png, .bmp, .jpg
    Bmp,
    /// `SVGBackend`. Used to create .svg
    Svg,
}
impl PltBackEnd {
    /// Select the drawing backend suitable for the given file.
    ///
    /// # Errors
    ///
    /// This function will return an [`CrlError::InvalidArgument`] if the file extension is not supported.
    pub fn from_path(path: &Path) -> CrlResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("svg") => Ok(Self::Svg),
            Some("png" | "bmp" | "jpg") => Ok(Self::Bmp),
            _ => Err(CrlError::InvalidArgument(format!(
                "unsupported plot file <{}>. Choose \".svg\", \".png\", \".bmp\" or \".jpg\"",
                path.display()
            ))),
        }
    }
}

/// Plot a dataset (value over photon energy) into the given file.
///
/// # Errors
///
/// This function will return an error if
///   - the file extension is not supported ([`CrlError::InvalidArgument`])
///   - the plot cannot be drawn or written ([`CrlError::Console`])
pub fn plot_dataset(
    dataset: &DeltaDataset,
    characteristic: Characteristic,
    path: &Path,
) -> CrlResult<()> {
    match PltBackEnd::from_path(path)? {
        PltBackEnd::Bmp => {
            let root = BitMapBackend::new(path, FIG_SIZE).into_drawing_area();
            draw(&root, dataset, characteristic)
        }
        PltBackEnd::Svg => {
            let root = SVGBackend::new(path, FIG_SIZE).into_drawing_area();
            draw(&root, dataset, characteristic)
        }
    }
}

fn draw<T: DrawingBackend>(
    root: &DrawingArea<T, Shift>,
    dataset: &DeltaDataset,
    characteristic: Characteristic,
) -> CrlResult<()> {
    let plot_err = |e: &dyn std::fmt::Display| CrlError::Console(format!("plotting failed: {e}"));
    root.fill(&WHITE).map_err(|e| plot_err(&e))?;
    let scale = characteristic.scale();
    let energies = dataset.energy_range();
    let (min, max) = dataset
        .samples()
        .iter()
        .map(|(_, value)| value * scale)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
            (min.min(v), max.max(v))
        });
    let (x_start, x_end) = if energies.end() > energies.start() {
        (*energies.start(), *energies.end())
    } else {
        (energies.start() - 1.0, energies.end() + 1.0)
    };
    let margin = if max > min { 0.05 * (max - min) } else { max.abs().max(1e-12) };
    let mut chart = ChartBuilder::on(root)
        .caption(format!("{characteristic} vs. energy"), ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(
            x_start..x_end,
            (min - margin)..(max + margin),
        )
        .map_err(|e| plot_err(&e))?;
    chart
        .configure_mesh()
        .x_desc("energy (eV)")
        .y_desc(characteristic.to_string())
        .y_label_formatter(&|v| format!("{v:.2e}"))
        .draw()
        .map_err(|e| plot_err(&e))?;
    chart
        .draw_series(LineSeries::new(
            dataset
                .samples()
                .iter()
                .map(|(energy, value)| (*energy, value * scale)),
            &BLUE,
        ))
        .map_err(|e| plot_err(&e))?;
    root.present().map_err(|e| plot_err(&e))
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;
    #[test]
    fn backend_from_path() {
        assert_eq!(
            PltBackEnd::from_path(Path::new("delta.svg")).unwrap(),
            PltBackEnd::Svg
        );
        assert_eq!(
            PltBackEnd::from_path(Path::new("delta.PNG")).unwrap(),
            PltBackEnd::Bmp
        );
        assert_matches!(
            PltBackEnd::from_path(Path::new("delta.pdf")),
            Err(CrlError::InvalidArgument(_))
        );
        assert_matches!(
            PltBackEnd::from_path(Path::new("delta")),
            Err(CrlError::InvalidArgument(_))
        );
    }
    #[test]
    fn plot_wrong_extension() {
        let dataset = DeltaDataset::new(vec![(1000.0, 3.4e-4), (2000.0, 8.5e-5)]).unwrap();
        assert_matches!(
            plot_dataset(&dataset, Characteristic::Delta, Path::new("delta.txt")),
            Err(CrlError::InvalidArgument(_))
        );
    }
    #[test]
    fn plot_svg() {
        let dataset =
            DeltaDataset::new(vec![(1000.0, 3.4e-4), (2000.0, 8.5e-5), (3000.0, 3.8e-5)]).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("delta.svg");
        plot_dataset(&dataset, Characteristic::Delta, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("<svg"));
        let path = dir.path().join("atten.svg");
        plot_dataset(&dataset, Characteristic::Atten, &path).unwrap();
        assert!(path.exists());
    }
    #[test]
    fn plot_single_sample() {
        let dataset = DeltaDataset::new(vec![(1000.0, 3.4e-4)]).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("single.svg");
        plot_dataset(&dataset, Characteristic::Delta, &path).unwrap();
        assert!(path.exists());
    }
}
