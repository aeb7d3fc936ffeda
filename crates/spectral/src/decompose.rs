//! Symmetric/antisymmetric decomposition about the equator.

use crate::error::{Result, SpectralError};
use ndarray::{Array, Array1, Array2, Array3, Axis, Dimension};

/// Cosine-of-latitude weights for projecting a (time, lat, lon) field onto
/// its equatorially symmetric and antisymmetric parts.
#[derive(Debug, Clone)]
pub struct LatitudeWeights {
    lat: Vec<f64>,
    weights: Array1<f64>,
    total: f64,
}

impl LatitudeWeights {
    /// Build weights for latitudes given in degrees.
    pub fn new(lat: &[f64]) -> Self {
        let weights: Array1<f64> = lat.iter().map(|l| l.to_radians().cos()).collect();
        let total = weights.sum();
        Self {
            lat: lat.to_vec(),
            weights,
            total,
        }
    }

    /// Latitudes in degrees.
    pub fn latitudes(&self) -> &[f64] {
        &self.lat
    }

    /// `cos(lat)` weight per latitude.
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Weighted latitude mean, giving the symmetric component.
    ///
    /// Input shape: (time, lat, lon). Output shape: (time, lon).
    pub fn sym(&self, field: &Array3<f64>) -> Result<Array2<f64>> {
        self.weighted_mean(field, |_| 1.0)
    }

    /// Weighted latitude mean with the southern hemisphere negated, giving the
    /// antisymmetric component.
    ///
    /// Input shape: (time, lat, lon). Output shape: (time, lon).
    pub fn asy(&self, field: &Array3<f64>) -> Result<Array2<f64>> {
        self.weighted_mean(field, |lat| if lat < 0.0 { -1.0 } else { 1.0 })
    }

    fn weighted_mean(&self, field: &Array3<f64>, sign: impl Fn(f64) -> f64) -> Result<Array2<f64>> {
        let (nt, nlat, nlon) = field.dim();
        if nlat != self.lat.len() {
            return Err(SpectralError::shape_mismatch(format!(
                "field has {} latitudes, weights have {}",
                nlat,
                self.lat.len()
            )));
        }

        let mut out = Array2::zeros((nt, nlon));
        for (j, slab) in field.axis_iter(Axis(1)).enumerate() {
            out.scaled_add(self.weights[j] * sign(self.lat[j]), &slab);
        }
        out /= self.total;
        Ok(out)
    }
}

/// Split a field into parts symmetric and antisymmetric about the equator.
///
/// The latitude axis is the second-to-last axis, so both (time, lat, lon) and
/// (time, lev, lat, lon) layouts work. Latitudes must be ordered
/// symmetrically about the equator for the result to be meaningful.
pub fn symm_asymm<D: Dimension>(field: &Array<f64, D>) -> Result<(Array<f64, D>, Array<f64, D>)> {
    if field.ndim() < 2 {
        return Err(SpectralError::Dimension {
            expected: 2,
            actual: field.ndim(),
        });
    }

    let lat_axis = Axis(field.ndim() - 2);
    let mut flipped = field.view();
    flipped.invert_axis(lat_axis);

    let symm = (field + &flipped) / 2.0;
    let asym = (field - &flipped) / 2.0;
    Ok((symm, asym))
}
