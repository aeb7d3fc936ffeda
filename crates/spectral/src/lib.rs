//! Spectral analysis of equatorial atmospheric fields.
//!
//! Provides:
//! - Symmetric/antisymmetric decomposition about the equator
//! - 1-2-1 smoothing and background estimation
//! - Power and cross spectra
//! - Wheeler–Kiladis wavenumber-frequency spectra
//! - Space-time cross covariance, growth rate and coherence
//! - EOF analysis
//! - Gradient-descent fitting under a blended MSE/correlation loss

pub mod config;
pub mod covariance;
pub mod decompose;
pub mod eof;
pub mod error;
pub mod fitting;
pub mod fourier;
pub mod smoothing;
pub mod wheeler_kiladis;

pub use config::{BackgroundConfig, SpectrumConfig};
pub use decompose::{symm_asymm, LatitudeWeights};
pub use eof::{Eof, EofResult};
pub use error::{Result, SpectralError};
pub use fitting::{gradient_descent, FitConfig, FitResult};
pub use fourier::{power_spectrum_1d, power_spectrum_2d, PowerSpectrum1D};
pub use wheeler_kiladis::{Dims, SpaceTimeSpectrumAnalyzer, WavenumberFrequencySpectrum};
