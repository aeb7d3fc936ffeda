//! Subcommand implementations.

use anyhow::{Context, Result};
use clap::ValueEnum;
use ndarray::Array2;
use renderer::{render_spectrum_png, Colormap, PlotStyle};
use spectral::{SpaceTimeSpectrumAnalyzer, SpectrumConfig, WavenumberFrequencySpectrum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use wave_dispersion::config::parse_depths;
use wave_dispersion::{DispersionConfig, DispersionCurves, EquatorialWaveDispersion};

use crate::input::FieldInput;

/// Spectrum drawn into the PNG preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SpectrumComponent {
    /// Symmetric power over the background.
    #[default]
    Symmetric,
    /// Antisymmetric power over the background.
    Antisymmetric,
    /// Total power over the background.
    Normalized,
}

impl SpectrumComponent {
    fn select(&self, spectrum: &WavenumberFrequencySpectrum) -> Array2<f64> {
        match self {
            SpectrumComponent::Symmetric => spectrum.normalized_symmetric(),
            SpectrumComponent::Antisymmetric => spectrum.normalized_antisymmetric(),
            SpectrumComponent::Normalized => spectrum.normalized.clone(),
        }
    }
}

/// PNG preview settings.
#[derive(Debug, Clone)]
pub struct PngOptions {
    pub path: PathBuf,
    pub width: usize,
    pub height: usize,
    pub colormap: Colormap,
    pub component: SpectrumComponent,
}

/// Settings of one `spectrum` run.
#[derive(Debug, Clone)]
pub struct SpectrumJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub lat_range: (f64, f64),
    pub png: Option<PngOptions>,
}

/// Compute a Wheeler–Kiladis spectrum from a field file and write it as JSON.
pub fn run_spectrum(job: &SpectrumJob, config: SpectrumConfig) -> Result<WavenumberFrequencySpectrum> {
    let input = FieldInput::from_file(&job.input)?;
    let field = input.to_array()?;
    info!(
        path = %job.input.display(),
        time_steps = input.time_steps,
        latitudes = input.lat.len(),
        longitudes = input.lon.len(),
        "Loaded field"
    );

    let analyzer =
        SpaceTimeSpectrumAnalyzer::with_config(input.dims(), Vec::new(), job.lat_range, config)
            .context("Failed to configure spectrum analyzer")?;
    let spectrum = analyzer
        .process_spectrum(&field)
        .context("Spectrum computation failed")?;

    match spectrum.peak(&spectrum.normalized_symmetric()) {
        Some((frequency, wavenumber, value)) => info!(
            frequency,
            wavenumber, value, "Strongest normalized symmetric signal"
        ),
        None => warn!("Normalized symmetric spectrum has no finite values"),
    }

    write_text(&job.output, &spectrum.to_json()?)?;
    info!(path = %job.output.display(), "Wrote spectrum");

    if let Some(png) = &job.png {
        write_png(&spectrum, png)?;
    }

    Ok(spectrum)
}

fn write_png(spectrum: &WavenumberFrequencySpectrum, options: &PngOptions) -> Result<()> {
    let power = options.component.select(spectrum);
    let bytes = render_spectrum_png(&power, options.width, options.height, None, options.colormap)
        .context("Failed to render spectrum image")?;
    std::fs::write(&options.path, &bytes)
        .with_context(|| format!("Failed to write {}", options.path.display()))?;
    info!(
        path = %options.path.display(),
        width = options.width,
        height = options.height,
        component = ?options.component,
        bytes = bytes.len(),
        "Wrote spectrum image"
    );
    Ok(())
}

/// Apply command-line overrides to a dispersion configuration.
///
/// Settings not given on the command line keep their configured values.
pub fn dispersion_overrides(
    mut config: DispersionConfig,
    depths: Option<&str>,
    waves: Option<usize>,
) -> Result<DispersionConfig> {
    if let Some(depths) = depths {
        config.equivalent_depths =
            parse_depths(depths).with_context(|| format!("Invalid depth list '{}'", depths))?;
    }
    if let Some(waves) = waves {
        config.n_planetary_waves = waves;
    }
    Ok(config)
}

/// Compute Matsuno dispersion curves and write them as JSON.
pub fn run_dispersion(output: &Path, config: DispersionConfig) -> Result<DispersionCurves> {
    let dispersion = EquatorialWaveDispersion::new(config).context("Invalid dispersion settings")?;
    let curves = dispersion.compute();
    write_text(output, &curves.to_json()?)?;
    info!(
        path = %output.display(),
        wave_types = curves.wave_types.len(),
        depths = ?curves.equivalent_depths,
        "Wrote dispersion curves"
    );
    Ok(curves)
}

/// Write a Matplotlib style sheet.
pub fn run_style(output: &Path, style: &PlotStyle) -> Result<()> {
    style
        .write_mplstyle(output)
        .with_context(|| format!("Failed to write style sheet {}", output.display()))
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}
