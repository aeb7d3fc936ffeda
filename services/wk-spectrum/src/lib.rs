//! Command-line front end for tropical wave spectra.
//!
//! The binary is a thin clap layer; the work happens in [`commands`] so the
//! subcommands can be driven from tests.

pub mod commands;
pub mod input;

pub use commands::{
    dispersion_overrides, run_dispersion, run_spectrum, run_style, PngOptions, SpectrumComponent,
    SpectrumJob,
};
pub use input::FieldInput;
