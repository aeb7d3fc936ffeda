//! Configuration for dispersion curve computation.

use serde::{Deserialize, Serialize};

/// Number of wave types with a dispersion relation.
pub const MAX_WAVE_TYPES: usize = 6;

/// Parameters of a dispersion curve computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispersionConfig {
    /// How many wave types to compute, in [`crate::WaveType::ALL`] order.
    pub n_wave_types: usize,
    /// Number of zonal wavenumber samples between -20 and 20.
    pub n_planetary_waves: usize,
    /// Reference latitude in radians.
    pub rlat: f64,
    /// Equivalent depths in metres.
    pub equivalent_depths: Vec<f64>,
}

impl Default for DispersionConfig {
    fn default() -> Self {
        Self {
            n_wave_types: MAX_WAVE_TYPES,
            n_planetary_waves: 50,
            rlat: 0.0,
            equivalent_depths: vec![50.0, 25.0, 12.0],
        }
    }
}

impl DispersionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("WD_N_WAVE_TYPES") {
            if let Ok(n) = val.parse() {
                config.n_wave_types = n;
            }
        }

        if let Ok(val) = std::env::var("WD_N_PLANETARY_WAVES") {
            if let Ok(n) = val.parse() {
                config.n_planetary_waves = n;
            }
        }

        if let Ok(val) = std::env::var("WD_RLAT") {
            if let Ok(rlat) = val.parse() {
                config.rlat = rlat;
            }
        }

        if let Ok(val) = std::env::var("WD_EQUIVALENT_DEPTHS") {
            if let Some(depths) = parse_depths(&val) {
                config.equivalent_depths = depths;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.n_wave_types == 0 || self.n_wave_types > MAX_WAVE_TYPES {
            return Err(format!(
                "n_wave_types must be between 1 and {}",
                MAX_WAVE_TYPES
            ));
        }

        if self.n_planetary_waves == 0 {
            return Err("n_planetary_waves must be > 0".to_string());
        }

        if !self.rlat.is_finite() || self.rlat.abs() >= std::f64::consts::FRAC_PI_2 {
            return Err("rlat must be a latitude in radians strictly inside (-pi/2, pi/2)".to_string());
        }

        if self.equivalent_depths.is_empty() {
            return Err("at least one equivalent depth is required".to_string());
        }

        Ok(())
    }
}

/// Parse a comma-separated list of depths such as `"50,25,12"`.
pub fn parse_depths(s: &str) -> Option<Vec<f64>> {
    s.split(',')
        .map(|part| part.trim().parse::<f64>().ok())
        .collect()
}
