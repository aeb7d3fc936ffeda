//! Synthetic data generators for spectral analysis tests.
//!
//! These generators create fields with known spectral content so tests can
//! check that a peak appears where the input put it.

use ndarray::{Array2, Array3, Array4, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Parameters of a single zonally propagating wave.
#[derive(Debug, Clone, Copy)]
pub struct WaveSpec {
    /// Zonal wavenumber; positive values propagate eastward.
    pub wavenumber: i32,
    /// Period in time steps.
    pub period_steps: f64,
    /// Peak amplitude at the equator.
    pub amplitude: f64,
    /// Antisymmetric about the equator instead of symmetric.
    pub antisymmetric: bool,
    /// e-folding half-width of the latitudinal envelope in degrees.
    pub envelope_deg: f64,
}

impl Default for WaveSpec {
    fn default() -> Self {
        Self {
            wavenumber: 3,
            period_steps: 12.0,
            amplitude: 1.0,
            antisymmetric: false,
            envelope_deg: 10.0,
        }
    }
}

/// Creates a (time, lat, lon) field containing a single wave.
///
/// The value at time `t`, latitude `φ` and longitude index `i` is
///
/// ```text
/// A · env(φ) · cos(2π·k·i/nlon − 2π·t/period)
/// ```
///
/// where `env` is a Gaussian in latitude, multiplied by `φ / width` for
/// antisymmetric waves.
///
/// # Example
///
/// ```
/// use test_utils::{equatorial_wave, WaveSpec};
///
/// let lats = [-10.0, 0.0, 10.0];
/// let field = equatorial_wave(24, &lats, 16, WaveSpec::default());
/// assert_eq!(field.dim(), (24, 3, 16));
/// ```
pub fn equatorial_wave(nt: usize, lats: &[f64], nlon: usize, spec: WaveSpec) -> Array3<f64> {
    Array3::from_shape_fn((nt, lats.len(), nlon), |(t, j, i)| {
        let y = lats[j] / spec.envelope_deg;
        let mut envelope = (-y * y).exp();
        if spec.antisymmetric {
            envelope *= y;
        }
        let phase = 2.0 * PI * spec.wavenumber as f64 * i as f64 / nlon as f64
            - 2.0 * PI * t as f64 / spec.period_steps;
        spec.amplitude * envelope * phase.cos()
    })
}

/// Creates reproducible uniform noise in `[-amplitude, amplitude)`.
pub fn white_noise(shape: (usize, usize, usize), amplitude: f64, seed: u64) -> Array3<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array3::from_shape_simple_fn(shape, || amplitude * rng.gen_range(-1.0..1.0))
}

/// Stacks a (time, lat, lon) field into (time, lev, lat, lon), scaling
/// level `l` by `l + 1`.
pub fn stack_levels(field: &Array3<f64>, levels: usize) -> Array4<f64> {
    let (nt, nlat, nlon) = field.dim();
    let mut out = Array4::zeros((nt, levels, nlat, nlon));
    for (l, mut level) in out.axis_iter_mut(Axis(1)).enumerate() {
        level.assign(&(field * (l + 1) as f64));
    }
    out
}

/// Creates a (time, space) field of two standing oscillations.
///
/// Useful for EOF and covariance tests where a low-rank structure is wanted.
pub fn standing_modes(nt: usize, nx: usize) -> Array2<f64> {
    Array2::from_shape_fn((nt, nx), |(t, x)| {
        let t = t as f64;
        let x = x as f64 / nx as f64;
        2.0 * (2.0 * PI * x).sin() * (0.3 * t).cos() + 0.5 * (4.0 * PI * x).cos() * (0.9 * t).sin()
    })
}

/// Returns a copy of `data` with every `every`-th element set to NaN.
pub fn with_nans(data: &Array2<f64>, every: usize) -> Array2<f64> {
    let mut out = data.clone();
    if every == 0 {
        return out;
    }
    for (i, v) in out.iter_mut().enumerate() {
        if i % every == 0 {
            *v = f64::NAN;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_wave_mirrors_about_equator() {
        let lats = [-10.0, -5.0, 0.0, 5.0, 10.0];
        let field = equatorial_wave(8, &lats, 8, WaveSpec::default());
        for t in 0..8 {
            for i in 0..8 {
                assert!((field[[t, 0, i]] - field[[t, 4, i]]).abs() < 1e-12);
                assert!((field[[t, 1, i]] - field[[t, 3, i]]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_antisymmetric_wave_vanishes_on_equator() {
        let lats = [-10.0, 0.0, 10.0];
        let spec = WaveSpec {
            antisymmetric: true,
            ..WaveSpec::default()
        };
        let field = equatorial_wave(8, &lats, 8, spec);
        for t in 0..8 {
            for i in 0..8 {
                assert_eq!(field[[t, 1, i]], 0.0);
                assert!((field[[t, 0, i]] + field[[t, 2, i]]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_white_noise_is_reproducible() {
        let a = white_noise((4, 3, 5), 0.5, 42);
        let b = white_noise((4, 3, 5), 0.5, 42);
        let c = white_noise((4, 3, 5), 0.5, 43);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|v| v.abs() <= 0.5));
    }

    #[test]
    fn test_stack_levels() {
        let field = Array3::from_elem((2, 3, 4), 1.5);
        let stacked = stack_levels(&field, 3);
        assert_eq!(stacked.dim(), (2, 3, 3, 4));
        assert_eq!(stacked[[1, 2, 0, 0]], 4.5);
    }

    #[test]
    fn test_with_nans() {
        let data = Array2::from_elem((2, 5), 1.0);
        let holed = with_nans(&data, 3);
        assert_eq!(holed.iter().filter(|v| v.is_nan()).count(), 4);
    }
}
