//! Smoothed space-time cross covariance, growth rate and coherence
//! (Chien & Kim, 2023).
//!
//! Inputs are (time, space) fields of identical shape. The spectral cross
//! covariance is formed from a forward FFT along space and an unnormalized
//! inverse FFT along time, then smoothed once with a 1-2-1 filter along each
//! axis. Growth rate and coherence average that estimate over time.

use crate::error::{Result, SpectralError};
use crate::fourier::{fft_axis, to_complex, FftDirection};
use crate::smoothing::{smooth_axis, Boundary};
use ndarray::{Array1, Array2, Axis};
use num_complex::Complex64;

/// Smoothed spectral cross covariance of two (time, space) fields.
pub fn cross_covariance(arr1: &Array2<f64>, arr2: &Array2<f64>) -> Result<Array2<Complex64>> {
    check_shapes(arr1, arr2)?;

    let fft1 = space_time_transform(arr1);
    let fft2 = space_time_transform(arr2);
    let norm = arr1.len() as f64;

    let mut cs = Array2::from_shape_fn(fft1.dim(), |idx| fft1[idx] * fft2[idx].conj() / norm);
    smooth_axis(&mut cs, Axis(1), 1, Boundary::Zero);
    smooth_axis(&mut cs, Axis(0), 1, Boundary::Zero);
    Ok(cs)
}

/// Growth rate `2·Re⟨cov(a, b)⟩ / Re⟨cov(b, b)⟩` per wavenumber.
pub fn growth_rate(arr1: &Array2<f64>, arr2: &Array2<f64>) -> Result<Array1<f64>> {
    let var = time_mean(&cross_covariance(arr2, arr2)?)?;
    let cov = time_mean(&cross_covariance(arr1, arr2)?)?;

    Ok(Array1::from_shape_fn(cov.len(), |k| 2.0 * cov[k].re / var[k].re))
}

/// Squared coherence `|⟨cov(a, b)⟩|² / (⟨cov(a, a)⟩·⟨cov(b, b)⟩)` per wavenumber.
pub fn coherence(arr1: &Array2<f64>, arr2: &Array2<f64>) -> Result<Array1<f64>> {
    let var1 = time_mean(&cross_covariance(arr1, arr1)?)?;
    let var2 = time_mean(&cross_covariance(arr2, arr2)?)?;
    let cov = time_mean(&cross_covariance(arr1, arr2)?)?;

    Ok(Array1::from_shape_fn(cov.len(), |k| {
        cov[k].norm_sqr() / (var1[k].re * var2[k].re)
    }))
}

fn check_shapes(arr1: &Array2<f64>, arr2: &Array2<f64>) -> Result<()> {
    if arr1.dim() != arr2.dim() {
        return Err(SpectralError::shape_mismatch(format!(
            "covariance inputs {:?} and {:?}",
            arr1.shape(),
            arr2.shape()
        )));
    }
    if arr1.is_empty() {
        return Err(SpectralError::insufficient_data("covariance of an empty field"));
    }
    Ok(())
}

fn space_time_transform(arr: &Array2<f64>) -> Array2<Complex64> {
    let mut spectrum = to_complex(arr);
    fft_axis(&mut spectrum, Axis(1), FftDirection::Forward);
    fft_axis(&mut spectrum, Axis(0), FftDirection::Inverse);
    spectrum
}

fn time_mean(cs: &Array2<Complex64>) -> Result<Array1<Complex64>> {
    cs.mean_axis(Axis(0))
        .ok_or_else(|| SpectralError::insufficient_data("no time samples to average"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrambled_field(nt: usize, nx: usize) -> Array2<f64> {
        Array2::from_shape_fn((nt, nx), |(t, x)| ((t * 7 + x * 13 + t * x) % 11) as f64 - 5.0)
    }

    #[test]
    fn test_auto_covariance_is_real_and_non_negative() {
        let field = scrambled_field(12, 10);
        let cs = cross_covariance(&field, &field).unwrap();
        assert_eq!(cs.dim(), (12, 10));
        for v in cs.iter() {
            assert!(v.im.abs() < 1e-9);
            assert!(v.re >= -1e-9);
        }
    }

    #[test]
    fn test_growth_rate_of_scaled_field() {
        let b = scrambled_field(12, 10);
        let a = &b * 3.0;

        let sigma = growth_rate(&a, &b).unwrap();
        let var = time_mean(&cross_covariance(&b, &b).unwrap()).unwrap();
        assert_eq!(sigma.len(), 10);
        for (s, v) in sigma.iter().zip(var.iter()) {
            if v.re > 1e-3 {
                assert!((s - 6.0).abs() < 1e-6, "growth rate {}", s);
            }
        }
    }

    #[test]
    fn test_coherence_bounds() {
        let a = scrambled_field(12, 10);
        let b = Array2::from_shape_fn((12, 10), |(t, x)| ((t * 3 + x * x) % 7) as f64 - 3.0);
        let var_a = time_mean(&cross_covariance(&a, &a).unwrap()).unwrap();
        let var_b = time_mean(&cross_covariance(&b, &b).unwrap()).unwrap();
        let resolved = |k: usize| var_a[k].re > 1e-3 && var_b[k].re > 1e-3;

        let coh = coherence(&a, &b).unwrap();
        for (k, c) in coh.iter().enumerate().filter(|(k, _)| resolved(*k)) {
            assert!(*c >= -1e-12 && *c <= 1.0 + 1e-6, "coherence {} at {}", c, k);
        }

        let scaled = &a * -2.0;
        let perfect = coherence(&a, &scaled).unwrap();
        for (k, c) in perfect.iter().enumerate().filter(|(k, _)| var_a[*k].re > 1e-3) {
            assert!((c - 1.0).abs() < 1e-6, "coherence {} at {}", c, k);
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Array2::<f64>::zeros((4, 4));
        let b = Array2::<f64>::zeros((5, 4));
        assert!(matches!(growth_rate(&a, &b), Err(SpectralError::ShapeMismatch(_))));
        assert!(matches!(coherence(&a, &b), Err(SpectralError::ShapeMismatch(_))));
    }
}
