//! Empirical Orthogonal Function (EOF) decomposition.
//!
//! Data are arranged as (space, samples). The covariance matrix is
//! eigendecomposed with `nalgebra`, modes are ordered by explained variance
//! and the EOF patterns are standardized before projecting the data onto
//! them.

use crate::error::{Result, SpectralError};
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Output of [`Eof::decompose`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EofResult {
    /// Fraction of total variance per mode, in descending order.
    pub explained_variance: Array1<f64>,
    /// Standardized spatial patterns, one mode per column (space, modes).
    pub eofs: Array2<f64>,
    /// Principal component time series, one mode per row (modes, samples).
    pub pcs: Array2<f64>,
}

/// EOF analysis of a (space, samples) data matrix.
#[derive(Debug, Clone)]
pub struct Eof {
    arr: Array2<f64>,
}

impl Eof {
    /// Wrap a (space, samples) data matrix.
    pub fn new(arr: Array2<f64>) -> Self {
        Self { arr }
    }

    /// The (space, samples) data matrix.
    pub fn data(&self) -> &Array2<f64> {
        &self.arr
    }

    /// Least-squares coefficients of the data on the columns of `eof`:
    /// `(EOFᵀ·EOF)⁻¹·EOFᵀ·data`.
    pub fn normal_equation(&self, eof: &Array2<f64>) -> Result<Array2<f64>> {
        if eof.nrows() != self.arr.nrows() {
            return Err(SpectralError::shape_mismatch(format!(
                "patterns have {} points, data has {}",
                eof.nrows(),
                self.arr.nrows()
            )));
        }

        let x = to_dmatrix(eof);
        let xtx = x.transpose() * &x;
        let inverse = xtx
            .try_inverse()
            .ok_or_else(|| SpectralError::Singular("EOFᵀ·EOF is not invertible".to_string()))?;

        let normal = inverse * x.transpose() * to_dmatrix(&self.arr);
        Ok(from_dmatrix(&normal))
    }

    /// Decompose the data into explained variance, EOF patterns and PCs.
    pub fn decompose(&self) -> Result<EofResult> {
        let (n_space, n_samples) = self.arr.dim();
        if n_space < 2 || n_samples == 0 {
            return Err(SpectralError::insufficient_data(format!(
                "EOF analysis needs at least 2 points and 1 sample, got {}x{}",
                n_space, n_samples
            )));
        }

        let cov = self.arr.dot(&self.arr.t()) / n_samples as f64;
        let eigen = SymmetricEigen::new(to_dmatrix(&cov));

        let total: f64 = eigen.eigenvalues.iter().sum();
        if !(total > 0.0) {
            return Err(SpectralError::invalid_input("data has no variance"));
        }

        let mut order: Vec<usize> = (0..n_space).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

        let explained_variance: Array1<f64> =
            order.iter().map(|&i| eigen.eigenvalues[i] / total).collect();

        // Standardize against the whole eigenvector matrix, not per mode
        let vectors = &eigen.eigenvectors;
        let count = vectors.len() as f64;
        let mean = vectors.iter().sum::<f64>() / count;
        let std = (vectors.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count).sqrt();

        let mut eofs = Array2::from_shape_fn((n_space, n_space), |(i, c)| {
            (vectors[(i, order[c])] - mean) / std
        });

        if eofs[[n_space / 2, 0]] < 0.0 {
            eofs.mapv_inplace(|v| -v);
        }

        let pcs = eofs.t().dot(&self.arr);

        debug!(
            modes = n_space,
            samples = n_samples,
            leading = explained_variance[0],
            "EOF decomposition complete"
        );

        Ok(EofResult {
            explained_variance,
            eofs,
            pcs,
        })
    }
}

fn to_dmatrix(arr: &Array2<f64>) -> DMatrix<f64> {
    let (rows, cols) = arr.dim();
    DMatrix::from_fn(rows, cols, |i, j| arr[[i, j]])
}

fn from_dmatrix(mat: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((mat.nrows(), mat.ncols()), |(i, j)| mat[(i, j)])
}
