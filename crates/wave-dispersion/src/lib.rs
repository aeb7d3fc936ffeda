//! Dispersion curves of equatorially trapped shallow-water waves.
//!
//! Follows Matsuno (1966): for each wave type and equivalent depth the
//! frequency is evaluated on an evenly spaced set of planetary zonal
//! wavenumbers, ready to be overlaid on a Wheeler–Kiladis diagram.

pub mod config;
pub mod error;
pub mod matsuno;

pub use config::DispersionConfig;
pub use error::{DispersionError, Result};
pub use matsuno::{DispersionCurves, EquatorialWaveDispersion, WaveType};
