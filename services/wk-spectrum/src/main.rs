//! Wheeler–Kiladis spectra, Matsuno dispersion curves and plot styles
//! from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use renderer::{Colormap, PlotStyle};
use spectral::SpectrumConfig;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use wave_dispersion::DispersionConfig;
use wk_spectrum::{
    dispersion_overrides, run_dispersion, run_spectrum, run_style, PngOptions, SpectrumComponent,
    SpectrumJob,
};

#[derive(Parser, Debug)]
#[command(name = "wk-spectrum")]
#[command(about = "Space-time spectral analysis of equatorial waves")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute a Wheeler–Kiladis spectrum from a JSON field file
    Spectrum {
        /// Field file with lat, lon, time_steps and flattened data
        #[arg(short, long)]
        input: PathBuf,

        /// Output spectrum JSON
        #[arg(short, long)]
        output: PathBuf,

        /// Also write a PNG heatmap of the normalized spectrum
        #[arg(long)]
        png: Option<PathBuf>,

        /// Southern edge of the latitude band
        #[arg(long, default_value = "-15", allow_negative_numbers = true)]
        lat_min: f64,

        /// Northern edge of the latitude band
        #[arg(long, default_value = "15", allow_negative_numbers = true)]
        lat_max: f64,

        /// Spectrum drawn into the PNG
        #[arg(long, value_enum, default_value_t = SpectrumComponent::Symmetric)]
        component: SpectrumComponent,

        /// Colormap for the PNG (viridis, cividis)
        #[arg(long, default_value = "viridis")]
        colormap: Colormap,

        /// PNG width in pixels
        #[arg(long, default_value = "800")]
        width: usize,

        /// PNG height in pixels
        #[arg(long, default_value = "600")]
        height: usize,
    },

    /// Compute Matsuno dispersion curves
    Dispersion {
        /// Output curves JSON
        #[arg(short, long)]
        output: PathBuf,

        /// Comma-separated equivalent depths in metres [default: 50,25,12]
        #[arg(long)]
        depths: Option<String>,

        /// Number of zonal wavenumber samples [default: 50]
        #[arg(long)]
        waves: Option<usize>,
    },

    /// Write a colorblind-aware Matplotlib style sheet
    Style {
        /// Output .mplstyle file
        #[arg(short, long)]
        output: PathBuf,

        /// Base font size in points
        #[arg(long)]
        font_size: Option<u32>,

        /// Render text with LaTeX
        #[arg(long)]
        latex: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs)?;

    match cli.command {
        Commands::Spectrum {
            input,
            output,
            png,
            lat_min,
            lat_max,
            component,
            colormap,
            width,
            height,
        } => {
            let config = SpectrumConfig::from_env();
            info!(
                chunk_length = config.chunk_length,
                chunk_stride = config.chunk_stride,
                samples_per_day = config.samples_per_day,
                "Loaded spectrum configuration"
            );

            let job = SpectrumJob {
                input,
                output,
                lat_range: (lat_min, lat_max),
                png: png.map(|path| PngOptions {
                    path,
                    width,
                    height,
                    colormap,
                    component,
                }),
            };
            run_spectrum(&job, config)?;
        }

        Commands::Dispersion {
            output,
            depths,
            waves,
        } => {
            let config =
                dispersion_overrides(DispersionConfig::from_env(), depths.as_deref(), waves)?;
            run_dispersion(&output, config)?;
        }

        Commands::Style {
            output,
            font_size,
            latex,
        } => {
            let mut style = PlotStyle::from_env();
            if let Some(size) = font_size {
                style.font_size = size;
            }
            style.use_latex |= latex;
            run_style(&output, &style)?;
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    Ok(())
}
