//! Gradient-descent fitting of a linear map under a blended loss.
//!
//! The model is `Ŷ = A·X` with weights `A` (outputs, predictors),
//! predictors `X` (predictors, samples) and targets `Y` (outputs, samples).
//! The loss mixes mean square error with the negative Pearson correlation of
//! each output row:
//!
//! ```text
//! loss = mse_rate · MSE(Ŷ, Y) + corr_rate · mean_rows(−corr(Ŷ, Y))
//! ```
//!
//! Targets may contain NaN; those samples are ignored by both terms.
//! Gradients are analytic and the weights are updated with SGD + momentum.

use crate::error::{Result, SpectralError};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array1, Array2, Zip};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Stabilizer inside the correlation denominator.
const CORRELATION_EPS: f64 = 1e-8;

/// Hyperparameters for [`gradient_descent`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FitConfig {
    /// Step size.
    pub learning_rate: f64,
    /// Momentum coefficient.
    pub momentum: f64,
    /// Number of full-batch updates.
    pub epochs: usize,
    /// Weight of the MSE term.
    pub mse_rate: f64,
    /// Weight of the correlation term.
    pub corr_rate: f64,
    /// Draw a progress bar on stderr.
    #[serde(default)]
    pub show_progress: bool,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-2,
            momentum: 0.9,
            epochs: 1000,
            mse_rate: 0.5,
            corr_rate: 0.5,
            show_progress: false,
        }
    }
}

impl FitConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("FIT_LEARNING_RATE") {
            if let Ok(lr) = val.parse() {
                config.learning_rate = lr;
            }
        }

        if let Ok(val) = std::env::var("FIT_MOMENTUM") {
            if let Ok(m) = val.parse() {
                config.momentum = m;
            }
        }

        if let Ok(val) = std::env::var("FIT_EPOCHS") {
            if let Ok(n) = val.parse() {
                config.epochs = n;
            }
        }

        if let Ok(val) = std::env::var("FIT_MSE_RATE") {
            if let Ok(r) = val.parse() {
                config.mse_rate = r;
            }
        }

        if let Ok(val) = std::env::var("FIT_CORR_RATE") {
            if let Ok(r) = val.parse() {
                config.corr_rate = r;
            }
        }

        if let Ok(val) = std::env::var("FIT_SHOW_PROGRESS") {
            config.show_progress = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.learning_rate > 0.0) {
            return Err("learning_rate must be > 0".to_string());
        }

        if !(0.0..1.0).contains(&self.momentum) {
            return Err("momentum must be in [0, 1)".to_string());
        }

        if self.mse_rate < 0.0 || self.corr_rate < 0.0 {
            return Err("loss rates must be non-negative".to_string());
        }

        Ok(())
    }
}

/// Fitted weights and diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    /// Final weights (outputs, predictors).
    pub weights: Array2<f64>,
    /// `weights · X` with the final weights.
    pub prediction: Array2<f64>,
    /// Loss before each update.
    pub loss_history: Vec<f64>,
}

/// Mean square error over samples where both arrays are finite.
pub fn mse_loss(pred: &Array2<f64>, truth: &Array2<f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    Zip::from(pred).and(truth).for_each(|&p, &y| {
        if p.is_finite() && y.is_finite() {
            sum += (p - y).powi(2);
            count += 1;
        }
    });
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Negative Pearson correlation of each row of `pred` against `truth`.
///
/// NaN targets drop out of the covariance and target variance only. Rows
/// with no finite prediction or no finite target yield NaN.
pub fn correlation_loss(pred: &Array2<f64>, truth: &Array2<f64>) -> Array1<f64> {
    pred.outer_iter()
        .zip(truth.outer_iter())
        .map(|(p, y)| {
            let p = p.to_vec();
            let y = y.to_vec();
            match RowStats::new(&p, &y) {
                Some(stats) => -stats.corr(),
                None => f64::NAN,
            }
        })
        .collect()
}

/// Centered sums for one output row.
///
/// Predictions are centered over all finite predictions and `sxx` runs over
/// every sample; only the target terms skip NaN targets.
struct RowStats {
    vx: Vec<f64>,
    vy: Vec<f64>,
    sxy: f64,
    sxx: f64,
    syy: f64,
}

impl RowStats {
    fn new(p: &[f64], y: &[f64]) -> Option<Self> {
        let mp = finite_mean(p)?;
        let my = finite_mean(y)?;

        // non-finite samples contribute zero to every sum
        let centered = |v: &[f64], mean: f64| -> Vec<f64> {
            v.iter()
                .map(|x| if x.is_finite() { x - mean } else { 0.0 })
                .collect()
        };
        let vx = centered(p, mp);
        let vy = centered(y, my);

        let dot = |a: &[f64], b: &[f64]| a.iter().zip(b).map(|(a, b)| a * b).sum::<f64>();
        let sxy = dot(&vx, &vy);
        let sxx = dot(&vx, &vx);
        let syy = dot(&vy, &vy);

        Some(Self {
            vx,
            vy,
            sxy,
            sxx,
            syy,
        })
    }

    fn denominator(&self) -> f64 {
        (self.sxx * self.syy + CORRELATION_EPS).sqrt()
    }

    fn corr(&self) -> f64 {
        self.sxy / self.denominator()
    }

    /// d corr / d pred for each sample of the row.
    ///
    /// Both centered vectors sum to zero, so the mean terms drop out.
    fn corr_gradient(&self) -> Vec<f64> {
        let d = self.denominator();
        let d3 = d * d * d;
        self.vx
            .iter()
            .zip(&self.vy)
            .map(|(vx, vy)| vy / d - self.sxy * self.syy * vx / d3)
            .collect()
    }
}

fn finite_mean(v: &[f64]) -> Option<f64> {
    let (sum, n) = v
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Blended loss and its gradient with respect to the prediction.
fn prediction_loss(pred: &Array2<f64>, truth: &Array2<f64>, config: &FitConfig) -> (f64, Array2<f64>) {
    let mut grad = Array2::<f64>::zeros(pred.dim());

    let mut mse_loss_value = 0.0;
    if config.mse_rate != 0.0 {
        let count = Zip::from(pred)
            .and(truth)
            .fold(0usize, |n, p, y| n + (p.is_finite() && y.is_finite()) as usize);
        if count > 0 {
            mse_loss_value = mse_loss(pred, truth);
            let scale = config.mse_rate * 2.0 / count as f64;
            Zip::from(&mut grad).and(pred).and(truth).for_each(|g, &p, &y| {
                if p.is_finite() && y.is_finite() {
                    *g += scale * (p - y);
                }
            });
        }
    }

    let mut corr_loss_value = 0.0;
    if config.corr_rate != 0.0 {
        let rows: Vec<Option<RowStats>> = pred
            .outer_iter()
            .zip(truth.outer_iter())
            .map(|(p, y)| RowStats::new(&p.to_vec(), &y.to_vec()))
            .collect();
        let active = rows.iter().filter(|r| r.is_some()).count();

        if active > 0 {
            let scale = config.corr_rate / active as f64;
            for (mut g_row, stats) in grad.outer_iter_mut().zip(&rows) {
                let Some(stats) = stats else { continue };
                corr_loss_value -= stats.corr() / active as f64;
                for (g, dc) in g_row.iter_mut().zip(stats.corr_gradient()) {
                    *g -= scale * dc;
                }
            }
        }
    }

    let loss = config.mse_rate * mse_loss_value + config.corr_rate * corr_loss_value;
    (loss, grad)
}

/// Blended loss and its gradient with respect to the weights.
fn loss_and_gradient(
    weights: &Array2<f64>,
    x: &Array2<f64>,
    y: &Array2<f64>,
    config: &FitConfig,
) -> (f64, Array2<f64>) {
    let pred = weights.dot(x);
    let (loss, grad_pred) = prediction_loss(&pred, y, config);
    (loss, grad_pred.dot(&x.t()))
}

/// Fit `weights` so that `weights · x` matches `y` under the blended loss.
pub fn gradient_descent(
    a_init: &Array2<f64>,
    x: &Array2<f64>,
    y: &Array2<f64>,
    config: &FitConfig,
) -> Result<FitResult> {
    config.validate().map_err(SpectralError::config)?;

    if a_init.ncols() != x.nrows() {
        return Err(SpectralError::shape_mismatch(format!(
            "weights {:?} cannot multiply predictors {:?}",
            a_init.shape(),
            x.shape()
        )));
    }
    if y.dim() != (a_init.nrows(), x.ncols()) {
        return Err(SpectralError::shape_mismatch(format!(
            "targets {:?} do not match prediction ({}, {})",
            y.shape(),
            a_init.nrows(),
            x.ncols()
        )));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(SpectralError::invalid_input("predictors must be finite"));
    }
    if !y.iter().any(|v| v.is_finite()) {
        return Err(SpectralError::invalid_input("targets contain no finite values"));
    }

    let progress = if config.show_progress {
        let pb = ProgressBar::new(config.epochs as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut weights = a_init.clone();
    let mut velocity = Array2::<f64>::zeros(weights.dim());
    let mut loss_history = Vec::with_capacity(config.epochs);

    for epoch in 0..config.epochs {
        let (loss, grad) = loss_and_gradient(&weights, x, y, config);
        loss_history.push(loss);

        velocity = velocity * config.momentum + &grad;
        weights.scaled_add(-config.learning_rate, &velocity);

        if epoch % 100 == 0 {
            debug!(epoch, loss, "Gradient descent step");
            progress.set_message(format!("loss {:.4e}", loss));
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let prediction = weights.dot(x);
    info!(
        epochs = config.epochs,
        final_loss = loss_history.last().copied().unwrap_or(f64::NAN),
        "Gradient descent finished"
    );

    Ok(FitResult {
        weights,
        prediction,
        loss_history,
    })
}
