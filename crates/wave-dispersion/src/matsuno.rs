//! Matsuno (1966) dispersion relations.
//!
//! Frequencies are solved in rad/s for a zonal wavenumber `k` in rad/m and a
//! gravity wave speed `c = √(g·he)`, then reported in cycles per day.

use crate::config::DispersionConfig;
use crate::error::{DispersionError, Result};
use ndarray::{Array1, Array3, ArrayView1};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Earth radius in metres.
pub const EARTH_RADIUS: f64 = 6.37122e6;
/// Gravitational acceleration in m/s².
pub const GRAVITY: f64 = 9.80665;
/// Earth's angular velocity in rad/s.
pub const OMEGA: f64 = 7.292e-5;

const SECONDS_PER_DAY: f64 = 86400.0;
const IG_ITERATIONS: usize = 5;

/// Equatorial wave types, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveType {
    /// Mixed Rossby-gravity wave (antisymmetric).
    Mrg,
    /// Inertia-gravity wave, n = 0 (antisymmetric).
    IgN0,
    /// Inertia-gravity wave, n = 2 (antisymmetric).
    IgN2,
    /// Equatorial Rossby wave, n = 1 (symmetric).
    ErN1,
    /// Kelvin wave (symmetric).
    Kelvin,
    /// Inertia-gravity wave, n = 1 (symmetric).
    IgN1,
}

impl WaveType {
    /// Every wave type, in curve index order.
    pub const ALL: [WaveType; 6] = [
        WaveType::Mrg,
        WaveType::IgN0,
        WaveType::IgN2,
        WaveType::ErN1,
        WaveType::Kelvin,
        WaveType::IgN1,
    ];

    /// Whether the wave's meridional structure is symmetric about the equator.
    pub fn is_symmetric(&self) -> bool {
        matches!(self, WaveType::ErN1 | WaveType::Kelvin | WaveType::IgN1)
    }

    /// Short label used in plots and file output.
    pub fn label(&self) -> &'static str {
        match self {
            WaveType::Mrg => "mrg",
            WaveType::IgN0 => "ig_n0",
            WaveType::IgN2 => "ig_n2",
            WaveType::ErN1 => "er_n1",
            WaveType::Kelvin => "kelvin",
            WaveType::IgN1 => "ig_n1",
        }
    }
}

impl fmt::Display for WaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WaveType {
    type Err = DispersionError;

    fn from_str(s: &str) -> Result<Self> {
        WaveType::ALL
            .iter()
            .copied()
            .find(|w| w.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| DispersionError::UnknownWaveType(s.to_string()))
    }
}

/// Dispersion curves for every wave type and equivalent depth.
///
/// Both arrays are shaped (wave type, depth, wavenumber sample).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispersionCurves {
    /// Wave types along the first axis.
    pub wave_types: Vec<WaveType>,
    /// Equivalent depths in metres along the second axis.
    pub equivalent_depths: Vec<f64>,
    /// Frequency in cycles per day; NaN where the wave does not exist.
    pub frequencies: Array3<f64>,
    /// Planetary zonal wavenumber.
    pub wavenumbers: Array3<f64>,
}

impl DispersionCurves {
    /// Wavenumbers and frequencies of one curve.
    pub fn curve(&self, wave: WaveType, depth_index: usize) -> Option<(ArrayView1<'_, f64>, ArrayView1<'_, f64>)> {
        let w = self.wave_types.iter().position(|&t| t == wave)?;
        if depth_index >= self.equivalent_depths.len() {
            return None;
        }
        Some((
            self.wavenumbers.slice(ndarray::s![w, depth_index, ..]),
            self.frequencies.slice(ndarray::s![w, depth_index, ..]),
        ))
    }

    /// Serialize the curves as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Dispersion relation solver for equatorial shallow-water waves.
#[derive(Debug, Clone)]
pub struct EquatorialWaveDispersion {
    config: DispersionConfig,
    beta: f64,
    circumference: f64,
}

impl EquatorialWaveDispersion {
    /// Validate `config` and precompute β and the latitude circle.
    pub fn new(config: DispersionConfig) -> Result<Self> {
        config.validate().map_err(DispersionError::config)?;
        if let Some(&he) = config.equivalent_depths.iter().find(|he| !(**he > 0.0)) {
            return Err(DispersionError::InvalidDepth(he));
        }

        let coslat = config.rlat.abs().cos();
        Ok(Self {
            beta: 2.0 * OMEGA * coslat / EARTH_RADIUS,
            circumference: 2.0 * PI * EARTH_RADIUS * coslat,
            config,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &DispersionConfig {
        &self.config
    }

    /// Meridional gradient of the Coriolis parameter, 1/(m·s).
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Length of the reference latitude circle in metres.
    pub fn circumference(&self) -> f64 {
        self.circumference
    }

    /// Planetary wavenumbers evenly spaced over [-20, 20].
    pub fn planetary_wavenumbers(&self) -> Array1<f64> {
        linspace(-20.0, 20.0, self.config.n_planetary_waves)
    }

    /// Mixed Rossby-gravity wave; defined for k ≤ 0.
    pub fn mrg_wave(&self, k: f64, c: f64) -> f64 {
        if k < 0.0 {
            let dell = (1.0 + 4.0 * self.beta / (k * k * c)).sqrt();
            k * c * (0.5 - 0.5 * dell)
        } else if k == 0.0 {
            (c * self.beta).sqrt()
        } else {
            f64::NAN
        }
    }

    /// n = 0 inertia-gravity wave; defined for k ≥ 0.
    pub fn ig_wave_n0(&self, k: f64, c: f64) -> f64 {
        if k == 0.0 {
            (c * self.beta).sqrt()
        } else if k > 0.0 {
            let dell = (1.0 + 4.0 * self.beta / (k * k * c)).sqrt();
            k * c * (0.5 + 0.5 * dell)
        } else {
            f64::NAN
        }
    }

    /// Inertia-gravity wave of meridional mode `n`, by fixed-point iteration.
    pub fn ig_wave_n(&self, k: f64, c: f64, he: f64, n: u32) -> f64 {
        let dell = self.beta * c;
        let mode = (2 * n + 1) as f64;
        let mut freq = (mode * dell + GRAVITY * he * k * k).sqrt();
        for _ in 0..IG_ITERATIONS {
            freq = (mode * dell + GRAVITY * he * k * k + GRAVITY * he * self.beta * k / freq).sqrt();
        }
        freq
    }

    /// Kelvin wave: non-dispersive, `ω = k·c`.
    pub fn kelvin_wave(&self, k: f64, c: f64) -> f64 {
        k * c
    }

    /// Equatorial Rossby wave of meridional mode `n`; defined for k < 0.
    pub fn er_wave_n(&self, k: f64, c: f64, n: u32) -> f64 {
        if k < 0.0 {
            let dell = (self.beta / c) * (2 * n + 1) as f64;
            -self.beta * k / (k * k + dell)
        } else {
            f64::NAN
        }
    }

    /// Angular frequency in rad/s of `wave` at wavenumber `k` (rad/m) and
    /// equivalent depth `he` (m).
    pub fn angular_frequency(&self, wave: WaveType, k: f64, he: f64) -> f64 {
        let c = (GRAVITY * he).sqrt();
        match wave {
            WaveType::Mrg => self.mrg_wave(k, c),
            WaveType::IgN0 => self.ig_wave_n0(k, c),
            WaveType::IgN2 => self.ig_wave_n(k, c, he, 2),
            WaveType::ErN1 => self.er_wave_n(k, c, 1),
            WaveType::Kelvin => self.kelvin_wave(k, c),
            WaveType::IgN1 => self.ig_wave_n(k, c, he, 1),
        }
    }

    /// Evaluate every configured wave type at every depth and wavenumber.
    pub fn compute(&self) -> DispersionCurves {
        let waves: Vec<WaveType> = WaveType::ALL[..self.config.n_wave_types].to_vec();
        let depths = &self.config.equivalent_depths;
        let planetary = self.planetary_wavenumbers();
        let shape = (waves.len(), depths.len(), planetary.len());

        let wavenumbers = Array3::from_shape_fn(shape, |(_, _, i)| planetary[i]);
        let frequencies = Array3::from_shape_fn(shape, |(w, d, i)| {
            let k = 2.0 * PI * planetary[i] / self.circumference;
            self.angular_frequency(waves[w], k, depths[d]) / (2.0 * PI) * SECONDS_PER_DAY
        });

        debug!(
            wave_types = waves.len(),
            depths = depths.len(),
            samples = planetary.len(),
            "Computed dispersion curves"
        );

        DispersionCurves {
            wave_types: waves,
            equivalent_depths: depths.clone(),
            frequencies,
            wavenumbers,
        }
    }
}

/// `n` evenly spaced samples from `start` to `stop` inclusive.
///
/// A single sample is `start`.
fn linspace(start: f64, stop: f64, n: usize) -> Array1<f64> {
    match n {
        0 => Array1::zeros(0),
        1 => Array1::from_elem(1, start),
        _ => Array1::from_shape_fn(n, |i| start + (stop - start) * i as f64 / (n - 1) as f64),
    }
}
