//! Fourier transforms and power/cross spectra.
//!
//! The FFT machinery wraps `rustfft` and works along any axis of an
//! `ndarray` array. Frequency bookkeeping (`fftfreq`, `fftshift`) follows the
//! usual DFT layout: non-negative frequencies first, then negative ones.

use crate::error::{Result, SpectralError};
use ndarray::{Array, Array2, ArrayD, Axis, Dimension};
use num_complex::Complex64;
use num_traits::Zero;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use rustfft::FftDirection;

/// Sample frequencies of an `n`-point DFT with sample spacing `d`.
pub fn fftfreq(n: usize, d: f64) -> Vec<f64> {
    let scale = 1.0 / (n as f64 * d);
    let positive = (n as isize - 1) / 2 + 1;
    (0..n as isize)
        .map(|i| {
            let k = if i < positive { i } else { i - n as isize };
            k as f64 * scale
        })
        .collect()
}

/// Index into an unshifted axis of length `n` for position `i` of the shifted axis.
#[inline]
pub fn shifted_index(i: usize, n: usize) -> usize {
    (i + n - n / 2) % n
}

/// Move the zero-frequency entry to the centre of a 1-D sequence.
pub fn fftshift<T: Clone>(values: &[T]) -> Vec<T> {
    let n = values.len();
    (0..n).map(|i| values[shifted_index(i, n)].clone()).collect()
}

/// Transform every lane of `arr` along `axis` in place.
///
/// Neither direction is normalized: a forward then inverse transform scales
/// the data by the axis length.
pub fn fft_axis<D: Dimension>(arr: &mut Array<Complex64, D>, axis: Axis, direction: FftDirection) {
    let n = arr.len_of(axis);
    if n == 0 {
        return;
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft(n, direction);
    let mut buf = vec![Complex64::zero(); n];

    for mut lane in arr.lanes_mut(axis) {
        for (b, v) in buf.iter_mut().zip(lane.iter()) {
            *b = *v;
        }
        fft.process(&mut buf);
        for (v, b) in lane.iter_mut().zip(buf.iter()) {
            *v = *b;
        }
    }
}

/// Promote a real array to complex.
pub fn to_complex<D: Dimension>(arr: &Array<f64, D>) -> Array<Complex64, D> {
    arr.mapv(|v| Complex64::new(v, 0.0))
}

/// Forward 2-D FFT of a complex array.
pub fn fft2(arr: &Array2<Complex64>) -> Array2<Complex64> {
    let mut out = arr.clone();
    fft_axis(&mut out, Axis(0), FftDirection::Forward);
    fft_axis(&mut out, Axis(1), FftDirection::Forward);
    out
}

/// Shifted 2-D spectrum restricted to non-negative row frequencies with the
/// column axis reversed, i.e. `fftshift(F)[n0/2.., ::-1]`.
fn upper_half_reversed(spectrum: &Array2<Complex64>) -> Array2<Complex64> {
    let (n0, n1) = spectrum.dim();
    let start = n0 / 2;
    Array2::from_shape_fn((n0 - start, n1), |(r, c)| {
        spectrum[[shifted_index(start + r, n0), shifted_index(n1 - 1 - c, n1)]]
    })
}

/// One-sided 2-D power spectrum of a real field.
///
/// Rows are non-negative frequencies of axis 0; columns run over the
/// reversed, shifted frequencies of axis 1. Every row except the
/// zero-frequency row is doubled to account for the folded negative half.
pub fn power_spectrum(arr: &Array2<f64>) -> Array2<f64> {
    let (n0, n1) = arr.dim();
    if n0 == 0 || n1 == 0 {
        return Array2::zeros((0, n1));
    }

    let spectrum = upper_half_reversed(&fft2(&to_complex(arr)));
    let norm = (n0 * n1) as f64;

    let mut power = spectrum.mapv(|f| f.norm_sqr() / norm);
    for mut row in power.rows_mut().into_iter().skip(1) {
        row *= 2.0;
    }
    power
}

/// One-sided 2-D cross spectrum of two real fields.
///
/// Each field has its overall mean removed first. The normalization uses the
/// size of the retained half-spectrum.
pub fn cross_spectrum(arr1: &Array2<f64>, arr2: &Array2<f64>) -> Result<Array2<Complex64>> {
    if arr1.dim() != arr2.dim() {
        return Err(SpectralError::shape_mismatch(format!(
            "cross spectrum inputs {:?} and {:?}",
            arr1.shape(),
            arr2.shape()
        )));
    }
    if arr1.is_empty() {
        return Err(SpectralError::insufficient_data("cross spectrum of an empty field"));
    }

    let ano1 = arr1 - arr1.mean().unwrap_or(0.0);
    let ano2 = arr2 - arr2.mean().unwrap_or(0.0);

    let fft1 = upper_half_reversed(&fft2(&to_complex(&ano1)));
    let fft2_half = upper_half_reversed(&fft2(&to_complex(&ano2)));
    let norm = fft1.len() as f64;

    let mut cross = Array2::from_shape_fn(fft1.dim(), |idx| fft1[idx] * fft2_half[idx].conj() / norm);
    for mut row in cross.rows_mut().into_iter().skip(1) {
        row.mapv_inplace(|v| v * 2.0);
    }
    Ok(cross)
}

/// Power at the positive frequencies of a 1-D record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerSpectrum1D {
    /// Frequencies in cycles per record (1, 2, ...).
    pub frequencies: Vec<f64>,
    /// One-sided power at each frequency.
    pub power: Vec<f64>,
}

/// One-sided power spectrum of a 1-D record.
///
/// Fails with [`SpectralError::Dimension`] if `data` is not 1-dimensional.
pub fn power_spectrum_1d(data: &ArrayD<f64>) -> Result<PowerSpectrum1D> {
    if data.ndim() != 1 {
        return Err(SpectralError::Dimension {
            expected: 1,
            actual: data.ndim(),
        });
    }

    let n = data.len();
    if n == 0 {
        return Err(SpectralError::insufficient_data("power spectrum of an empty record"));
    }

    let fr = fftfreq(n, 1.0 / n as f64);
    debug!(n, frequencies = ?fr, "1-D power spectrum");

    let mut buf: Vec<Complex64> = data.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(n).process(&mut buf);

    let norm = (n as f64).powi(2);
    let (frequencies, power) = fr
        .iter()
        .zip(buf.iter())
        .filter(|(f, _)| **f > 0.0)
        .map(|(f, c)| (*f, c.norm_sqr() / norm * 2.0))
        .unzip();

    Ok(PowerSpectrum1D { frequencies, power })
}

/// Power spectrum of a (time, space) field from a real FFT along time and an
/// unnormalized inverse FFT along space.
///
/// The zero-frequency row is dropped, leaving `n0 / 2` rows.
pub fn power_spectrum_2d(data: &Array2<f64>) -> Array2<f64> {
    let (n0, n1) = data.dim();
    if n0 == 0 || n1 == 0 {
        return Array2::zeros((0, n1));
    }

    let mut spectrum = to_complex(data);
    fft_axis(&mut spectrum, Axis(0), FftDirection::Forward);

    let kept = n0 / 2 + 1;
    let mut half = spectrum.slice(ndarray::s![..kept, ..]).mapv(|v| v * 2.0);
    fft_axis(&mut half, Axis(1), FftDirection::Inverse);

    let norm = ((n0 * n1) as f64).powi(2) * 2.0;
    half.slice(ndarray::s![1.., ..]).mapv(|v| v.norm_sqr() / norm)
}
