//! Wheeler–Kiladis space-time spectrum analysis.
//!
//! # Pipeline
//!
//! ```text
//! anomalies (time, lat, lon)
//!      │
//!      ├─► latitude subset (lat_range)
//!      │
//!      ├─► symmetric / antisymmetric split about the equator
//!      │
//!      ├─► overlapping chunks: detrend + Hann window
//!      │
//!      ├─► |FFT(time, lon)|², averaged over chunks, summed over latitude
//!      │
//!      ├─► positive frequencies, eastward-positive wavenumbers
//!      │
//!      └─► 1-2-1 background smoothing ─► power / background
//! ```

use crate::config::{BackgroundConfig, SpectrumConfig};
use crate::decompose::symm_asymm;
use crate::error::{Result, SpectralError};
use crate::fourier::{fft_axis, fftfreq, fftshift, to_complex, FftDirection};
use crate::smoothing::{smooth_axis, Boundary};
use ndarray::{s, Array, Array1, Array2, Array3, Array4, Axis, Dimension, RemoveAxis, Slice};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, info};

/// Coordinate axes of the analyzed field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dims {
    /// Latitudes in degrees.
    pub lat: Vec<f64>,
    /// Longitudes in degrees.
    pub lon: Vec<f64>,
    /// Pressure levels in hPa, if the field has a vertical axis.
    #[serde(default)]
    pub lev: Option<Vec<f64>>,
}

/// Result of a Wheeler–Kiladis analysis.
///
/// All power arrays are shaped (frequency, wavenumber).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WavenumberFrequencySpectrum {
    /// Positive frequencies in cycles per day.
    pub frequencies: Vec<f64>,
    /// Zonal wavenumbers; positive values propagate eastward.
    pub wavenumbers: Vec<i64>,
    /// Power of the equatorially symmetric component.
    pub symmetric: Array2<f64>,
    /// Power of the equatorially antisymmetric component.
    pub antisymmetric: Array2<f64>,
    /// Mean of the symmetric and antisymmetric power.
    pub total: Array2<f64>,
    /// Smoothed background of the total power.
    pub background: Array2<f64>,
    /// Total power divided by the background.
    pub normalized: Array2<f64>,
}

impl WavenumberFrequencySpectrum {
    /// Symmetric power divided by the background.
    pub fn normalized_symmetric(&self) -> Array2<f64> {
        normalize_power(&self.symmetric, &self.background)
    }

    /// Antisymmetric power divided by the background.
    pub fn normalized_antisymmetric(&self) -> Array2<f64> {
        normalize_power(&self.antisymmetric, &self.background)
    }

    /// Frequency, wavenumber and value of the largest entry of `power`.
    ///
    /// Returns `None` for an empty spectrum, one that is entirely NaN, or
    /// one whose shape does not match the axes.
    pub fn peak(&self, power: &Array2<f64>) -> Option<(f64, i64, f64)> {
        if power.dim() != (self.frequencies.len(), self.wavenumbers.len()) {
            return None;
        }
        power
            .indexed_iter()
            .filter(|(_, v)| !v.is_nan())
            .fold(None, |best: Option<((usize, usize), f64)>, (idx, &v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((idx, v)),
            })
            .map(|((f, k), v)| (self.frequencies[f], self.wavenumbers[k], v))
    }

    /// Serialize the spectrum as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Space-time spectrum analyzer for equatorial wave detection.
#[derive(Debug, Clone)]
pub struct SpaceTimeSpectrumAnalyzer {
    config: SpectrumConfig,
    experiments: Vec<String>,
    lat_range: (f64, f64),
    full_lat_len: usize,
    lat_indices: Vec<usize>,
    dims: Dims,
    converter: Option<Array1<f64>>,
}

impl SpaceTimeSpectrumAnalyzer {
    /// Create an analyzer with the default configuration.
    ///
    /// Latitudes inside `lat_range` (inclusive) are retained.
    pub fn new(dims: Dims, experiments: Vec<String>, lat_range: (f64, f64)) -> Result<Self> {
        Self::with_config(dims, experiments, lat_range, SpectrumConfig::default())
    }

    /// Create an analyzer with an explicit configuration.
    pub fn with_config(
        dims: Dims,
        experiments: Vec<String>,
        lat_range: (f64, f64),
        config: SpectrumConfig,
    ) -> Result<Self> {
        config.validate().map_err(SpectralError::config)?;

        if lat_range.0 > lat_range.1 {
            return Err(SpectralError::config(format!(
                "latitude range ({}, {}) is reversed",
                lat_range.0, lat_range.1
            )));
        }

        let lat_indices: Vec<usize> = dims
            .lat
            .iter()
            .enumerate()
            .filter(|(_, lat)| **lat >= lat_range.0 && **lat <= lat_range.1)
            .map(|(i, _)| i)
            .collect();

        if lat_indices.is_empty() {
            return Err(SpectralError::insufficient_data(format!(
                "no latitudes within ({}, {})",
                lat_range.0, lat_range.1
            )));
        }

        let full_lat_len = dims.lat.len();
        let subset: Vec<f64> = lat_indices.iter().map(|&i| dims.lat[i]).collect();
        let mut dims = dims;
        dims.lat = subset;

        // Potential temperature to temperature: (p / 1000)^kappa
        let converter = dims
            .lev
            .as_ref()
            .map(|lev| lev.iter().map(|&p| (1000.0 / p).powf(-0.285)).collect::<Array1<f64>>());

        debug!(
            latitudes = dims.lat.len(),
            longitudes = dims.lon.len(),
            levels = ?dims.lev.as_ref().map(|l| l.len()),
            "Created space-time spectrum analyzer"
        );

        Ok(Self {
            config,
            experiments,
            lat_range,
            full_lat_len,
            lat_indices,
            dims,
            converter,
        })
    }

    /// Coordinate axes after latitude subsetting.
    pub fn dims(&self) -> &Dims {
        &self.dims
    }

    /// Experiment names this analyzer was created for.
    pub fn experiments(&self) -> &[String] {
        &self.experiments
    }

    /// Latitude bounds used for subsetting.
    pub fn lat_range(&self) -> (f64, f64) {
        self.lat_range
    }

    /// Pipeline configuration.
    pub fn config(&self) -> &SpectrumConfig {
        &self.config
    }

    /// Indices of the retained latitudes in the full latitude axis.
    pub fn latitude_indices(&self) -> &[usize] {
        &self.lat_indices
    }

    /// Per-level factor `(1000 / lev)^(-0.285)`, if levels were given.
    pub fn converter(&self) -> Option<&Array1<f64>> {
        self.converter.as_ref()
    }

    /// Select the retained latitudes from a full-latitude field.
    ///
    /// The latitude axis is the second-to-last axis.
    pub fn subset_latitudes<D: Dimension + RemoveAxis>(
        &self,
        field: &Array<f64, D>,
    ) -> Result<Array<f64, D>> {
        if field.ndim() < 2 {
            return Err(SpectralError::Dimension {
                expected: 2,
                actual: field.ndim(),
            });
        }

        let lat_axis = Axis(field.ndim() - 2);
        if field.len_of(lat_axis) != self.full_lat_len {
            return Err(SpectralError::shape_mismatch(format!(
                "field has {} latitudes, expected {}",
                field.len_of(lat_axis),
                self.full_lat_len
            )));
        }

        Ok(field.select(lat_axis, &self.lat_indices))
    }

    /// Multiply a (time, lev, lat, lon) field by the level conversion factor.
    pub fn apply_level_conversion(&self, field: &Array4<f64>) -> Result<Array4<f64>> {
        let converter = self
            .converter
            .as_ref()
            .ok_or_else(|| SpectralError::config("no pressure levels configured"))?;

        if field.len_of(Axis(1)) != converter.len() {
            return Err(SpectralError::shape_mismatch(format!(
                "field has {} levels, expected {}",
                field.len_of(Axis(1)),
                converter.len()
            )));
        }

        let mut out = field.clone();
        for (mut level, &factor) in out.axis_iter_mut(Axis(1)).zip(converter.iter()) {
            level *= factor;
        }
        Ok(out)
    }

    /// Split a field into overlapping, detrended, Hann-windowed chunks along time.
    ///
    /// Works for (time, lat, lon) and (time, lev, lat, lon) fields.
    pub fn chunk_and_window<D: Dimension + RemoveAxis>(
        &self,
        data: &Array<f64, D>,
    ) -> Result<Vec<Array<f64, D>>> {
        if data.ndim() != 3 && data.ndim() != 4 {
            return Err(SpectralError::Dimension {
                expected: 3,
                actual: data.ndim(),
            });
        }

        let length = self.config.chunk_length;
        let time_steps = data.len_of(Axis(0));
        let num_chunks = self.config.num_chunks(time_steps);
        if num_chunks == 0 {
            return Err(SpectralError::insufficient_data(format!(
                "{} time steps is shorter than one {}-step chunk",
                time_steps, length
            )));
        }

        let window = hanning(length);
        let chunks = (0..num_chunks)
            .map(|i| {
                let start = i * self.config.chunk_stride;
                let mut chunk = detrend(
                    &data.slice_axis(Axis(0), Slice::from(start..start + length)).to_owned(),
                    Axis(0),
                );
                for (mut slab, &w) in chunk.axis_iter_mut(Axis(0)).zip(window.iter()) {
                    slab *= w;
                }
                chunk
            })
            .collect();

        Ok(chunks)
    }

    /// Wavenumber and frequency axes of the full, shifted spectrum.
    ///
    /// Frequencies are in cycles per day.
    pub fn fft_freqs(&self) -> (Vec<i64>, Vec<f64>) {
        let nlon = self.dims.lon.len();
        let wavenumbers = fftshift(&fftfreq(nlon, 1.0 / nlon as f64))
            .into_iter()
            .map(|k| k.round() as i64)
            .collect();
        let frequencies = fftshift(&fftfreq(
            self.config.chunk_length,
            1.0 / self.config.samples_per_day,
        ));
        (wavenumbers, frequencies)
    }

    /// Strictly positive frequencies, in cycles per day.
    pub fn positive_frequencies(&self) -> Vec<f64> {
        let length = self.config.chunk_length;
        (1..=(length - 1) / 2)
            .map(|m| m as f64 * self.config.samples_per_day / length as f64)
            .collect()
    }

    /// Smooth a (frequency, wavenumber) power spectrum into its background.
    pub fn compute_background(&self, power: &Array2<f64>) -> Array2<f64> {
        compute_background(power, &self.config.background)
    }

    /// Full Wheeler–Kiladis analysis of a full-latitude (time, lat, lon) field.
    pub fn process_spectrum(&self, anomalies: &Array3<f64>) -> Result<WavenumberFrequencySpectrum> {
        let (time_steps, _, nlon) = anomalies.dim();
        if nlon != self.dims.lon.len() {
            return Err(SpectralError::shape_mismatch(format!(
                "field has {} longitudes, expected {}",
                nlon,
                self.dims.lon.len()
            )));
        }

        let field = self.subset_latitudes(anomalies)?;
        let (symm_data, asym_data) = symm_asymm(&field)?;

        let symm_chunks = self.chunk_and_window(&symm_data)?;
        let asym_chunks = self.chunk_and_window(&asym_data)?;

        info!(
            time_steps,
            latitudes = field.len_of(Axis(1)),
            longitudes = nlon,
            chunks = symm_chunks.len(),
            "Computing space-time spectrum"
        );

        let symmetric = self.positive_half(&chunk_power(&symm_chunks));
        let antisymmetric = self.positive_half(&chunk_power(&asym_chunks));

        let total = (&symmetric + &antisymmetric) / 2.0;
        let background = self.compute_background(&total);
        let normalized = normalize_power(&total, &background);

        let (wavenumbers, _) = self.fft_freqs();

        Ok(WavenumberFrequencySpectrum {
            frequencies: self.positive_frequencies(),
            wavenumbers,
            symmetric,
            antisymmetric,
            total,
            background,
            normalized,
        })
    }

    /// Analyze each level of a full-latitude (time, lev, lat, lon) field.
    pub fn process_spectrum_levels(
        &self,
        anomalies: &Array4<f64>,
    ) -> Result<Vec<WavenumberFrequencySpectrum>> {
        anomalies
            .axis_iter(Axis(1))
            .enumerate()
            .map(|(lev, field)| {
                debug!(level = lev, "Processing level");
                self.process_spectrum(&field.to_owned())
            })
            .collect()
    }

    /// Restrict an unshifted (frequency, wavenumber) power array to positive
    /// frequencies, with wavenumbers reordered so eastward waves are positive.
    fn positive_half(&self, power: &Array2<f64>) -> Array2<f64> {
        let (wavenumbers, _) = self.fft_freqs();
        let nlon = wavenumbers.len() as i64;
        let rows = (self.config.chunk_length - 1) / 2;

        Array2::from_shape_fn((rows, wavenumbers.len()), |(r, c)| {
            let col = (-wavenumbers[c]).rem_euclid(nlon) as usize;
            power[[r + 1, col]]
        })
    }
}

/// Mean over chunks of |FFT(time, lon)|², summed over latitude.
///
/// Output is an unshifted (frequency, wavenumber) array.
fn chunk_power(chunks: &[Array3<f64>]) -> Array2<f64> {
    let Some(first) = chunks.first() else {
        return Array2::zeros((0, 0));
    };

    let mut acc = Array3::<f64>::zeros(first.dim());
    for chunk in chunks {
        let mut spectrum = to_complex(chunk);
        fft_axis(&mut spectrum, Axis(0), FftDirection::Forward);
        fft_axis(&mut spectrum, Axis(2), FftDirection::Forward);
        acc.zip_mut_with(&spectrum, |a, f| *a += f.norm_sqr());
    }
    acc /= chunks.len() as f64;
    acc.sum_axis(Axis(1))
}

/// Hann window of length `m` (zero at both ends).
pub fn hanning(m: usize) -> Vec<f64> {
    match m {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => (0..m)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / (m - 1) as f64).cos())
            .collect(),
    }
}

/// Remove the least-squares linear trend from every lane along `axis`.
pub fn detrend<D: Dimension>(data: &Array<f64, D>, axis: Axis) -> Array<f64, D> {
    let mut out = data.clone();
    let n = out.len_of(axis);
    if n == 0 {
        return out;
    }

    let t_mean = (n - 1) as f64 / 2.0;
    let t_var: f64 = (0..n).map(|t| (t as f64 - t_mean).powi(2)).sum();

    for mut lane in out.lanes_mut(axis) {
        let y_mean = lane.sum() / n as f64;
        let slope = if t_var > 0.0 {
            lane.iter()
                .enumerate()
                .map(|(t, y)| (t as f64 - t_mean) * (y - y_mean))
                .sum::<f64>()
                / t_var
        } else {
            0.0
        };
        for (t, y) in lane.iter_mut().enumerate() {
            *y -= y_mean + slope * (t as f64 - t_mean);
        }
    }
    out
}

/// Smooth a (frequency, wavenumber) power spectrum into its red-noise background.
///
/// Smooths along frequency first, then along wavenumber with more passes in
/// the upper half of the frequency rows than in the lower half.
pub fn compute_background(power: &Array2<f64>, passes: &BackgroundConfig) -> Array2<f64> {
    let mut data = power.clone();
    let half_freq = data.nrows() / 2;

    smooth_axis(&mut data, Axis(0), passes.freq_passes, Boundary::Reflect);
    smooth_axis(
        &mut data.slice_mut(s![..half_freq, ..]),
        Axis(1),
        passes.low_freq_wn_passes,
        Boundary::Reflect,
    );
    smooth_axis(
        &mut data.slice_mut(s![half_freq.., ..]),
        Axis(1),
        passes.high_freq_wn_passes,
        Boundary::Reflect,
    );

    data
}

/// Elementwise power / background.
pub fn normalize_power(power: &Array2<f64>, background: &Array2<f64>) -> Array2<f64> {
    power / background
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(nlat: usize, nlon: usize) -> Dims {
        let lat = (0..nlat)
            .map(|j| -20.0 + 40.0 * j as f64 / (nlat - 1) as f64)
            .collect();
        let lon = (0..nlon).map(|i| 360.0 * i as f64 / nlon as f64).collect();
        Dims { lat, lon, lev: None }
    }

    fn tiny_spectrum() -> WavenumberFrequencySpectrum {
        let power = Array2::from_shape_vec((2, 3), vec![1.0, f64::NAN, 2.0, 0.5, 7.0, 3.0]).unwrap();
        WavenumberFrequencySpectrum {
            frequencies: vec![0.25, 0.5],
            wavenumbers: vec![-1, 0, 1],
            symmetric: power.clone(),
            antisymmetric: power.clone(),
            total: power.clone(),
            background: Array2::ones((2, 3)),
            normalized: power,
        }
    }

    #[test]
    fn test_peak_skips_nan() {
        let spectrum = tiny_spectrum();
        assert_eq!(spectrum.peak(&spectrum.symmetric), Some((0.5, 0, 7.0)));
        assert_eq!(spectrum.peak(&Array2::from_elem((2, 3), f64::NAN)), None);
    }

    #[test]
    fn test_peak_rejects_mismatched_shape() {
        let spectrum = tiny_spectrum();
        let mut larger = Array2::zeros((4, 5));
        larger[[3, 4]] = 10.0;
        assert_eq!(spectrum.peak(&larger), None);
        assert_eq!(spectrum.peak(&Array2::zeros((2, 2))), None);
    }

    #[test]
    fn test_latitude_subset() {
        let analyzer = SpaceTimeSpectrumAnalyzer::new(dims(9, 8), vec![], (-5.0, 5.0)).unwrap();
        // -20, -15, ..., 20: only -5, 0, 5 survive
        assert_eq!(analyzer.latitude_indices(), &[3, 4, 5]);
        assert_eq!(analyzer.dims().lat, vec![-5.0, 0.0, 5.0]);
    }

    #[test]
    fn test_empty_latitude_subset_is_error() {
        let result = SpaceTimeSpectrumAnalyzer::new(dims(9, 8), vec![], (50.0, 60.0));
        assert!(matches!(result, Err(SpectralError::InsufficientData(_))));
    }

    #[test]
    fn test_reversed_latitude_range_is_error() {
        let result = SpaceTimeSpectrumAnalyzer::new(dims(9, 8), vec![], (5.0, -5.0));
        assert!(matches!(result, Err(SpectralError::Config(_))));
    }

    #[test]
    fn test_hanning() {
        let w = hanning(5);
        assert_eq!(w.len(), 5);
        assert!(w[0].abs() < 1e-12);
        assert!((w[2] - 1.0).abs() < 1e-12);
        assert!(w[4].abs() < 1e-12);
        assert!((w[1] - 0.5).abs() < 1e-12);
        assert_eq!(hanning(1), vec![1.0]);
        assert!(hanning(0).is_empty());
    }

    #[test]
    fn test_detrend_removes_linear_trend() {
        let data = Array2::from_shape_fn((10, 2), |(t, x)| 3.0 + 0.5 * t as f64 - x as f64 * t as f64);
        let out = detrend(&data, Axis(0));
        for v in out.iter() {
            assert!(v.abs() < 1e-12);
        }
    }

    #[test]
    fn test_detrend_keeps_oscillation_shape() {
        let data = Array1::from_vec(vec![1.0, -1.0, 1.0, -1.0]);
        let out = detrend(&data, Axis(0));
        // Zero-mean after detrending
        assert!(out.sum().abs() < 1e-12);
    }

    #[test]
    fn test_chunk_and_window_shapes() {
        let analyzer = SpaceTimeSpectrumAnalyzer::new(dims(9, 8), vec![], (-5.0, 5.0)).unwrap();
        let data = Array3::from_elem((360, 3, 8), 1.0);
        let chunks = analyzer.chunk_and_window(&data).unwrap();
        assert_eq!(chunks.len(), 5);
        for chunk in &chunks {
            assert_eq!(chunk.dim(), (120, 3, 8));
            // Constant input detrends to zero
            assert!(chunk.iter().all(|v| v.abs() < 1e-12));
        }
    }

    #[test]
    fn test_chunk_and_window_accepts_levels() {
        let analyzer = SpaceTimeSpectrumAnalyzer::new(dims(9, 8), vec![], (-5.0, 5.0)).unwrap();
        let data = Array4::from_shape_fn((150, 2, 3, 8), |(t, _, _, _)| (t as f64 * 0.3).sin());
        let chunks = analyzer.chunk_and_window(&data).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].dim(), (120, 2, 3, 8));
    }

    #[test]
    fn test_chunk_and_window_short_record() {
        let analyzer = SpaceTimeSpectrumAnalyzer::new(dims(9, 8), vec![], (-5.0, 5.0)).unwrap();
        let data = Array3::<f64>::zeros((100, 3, 8));
        assert!(matches!(
            analyzer.chunk_and_window(&data),
            Err(SpectralError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_fft_freqs() {
        let analyzer = SpaceTimeSpectrumAnalyzer::new(dims(9, 8), vec![], (-5.0, 5.0)).unwrap();
        let (wn, fr) = analyzer.fft_freqs();
        assert_eq!(wn, vec![-4, -3, -2, -1, 0, 1, 2, 3]);
        assert_eq!(fr.len(), 120);
        assert!((fr[0] + 2.0).abs() < 1e-12);
        assert!(fr[60].abs() < 1e-12);

        let positive = analyzer.positive_frequencies();
        assert_eq!(positive.len(), 59);
        assert!((positive[0] - 4.0 / 120.0).abs() < 1e-12);
        assert_eq!(fr.iter().filter(|f| **f > 0.0).count(), positive.len());
    }

    #[test]
    fn test_background_of_flat_spectrum_is_flat() {
        let power = Array2::from_elem((59, 16), 2.5);
        let bg = compute_background(&power, &BackgroundConfig::default());
        for v in bg.iter() {
            assert!((v - 2.5).abs() < 1e-9);
        }
        let normalized = normalize_power(&power, &bg);
        for v in normalized.iter() {
            assert!((v - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_level_conversion() {
        let mut d = dims(9, 4);
        d.lev = Some(vec![1000.0, 500.0]);
        let analyzer = SpaceTimeSpectrumAnalyzer::new(d, vec!["ctl".into()], (-5.0, 5.0)).unwrap();

        let conv = analyzer.converter().unwrap();
        assert!((conv[0] - 1.0).abs() < 1e-12);
        assert!((conv[1] - 0.5f64.powf(0.285)).abs() < 1e-12);

        let field = Array4::from_elem((2, 2, 9, 4), 300.0);
        let converted = analyzer.apply_level_conversion(&field).unwrap();
        assert!((converted[[0, 0, 0, 0]] - 300.0).abs() < 1e-9);
        assert!((converted[[1, 1, 8, 3]] - 300.0 * conv[1]).abs() < 1e-9);
    }

    #[test]
    fn test_level_conversion_without_levels() {
        let analyzer = SpaceTimeSpectrumAnalyzer::new(dims(9, 4), vec![], (-5.0, 5.0)).unwrap();
        assert!(analyzer.converter().is_none());
        let field = Array4::<f64>::zeros((2, 2, 9, 4));
        assert!(matches!(
            analyzer.apply_level_conversion(&field),
            Err(SpectralError::Config(_))
        ));
    }
}
