//! Figure output for spectral analysis.
//!
//! Implements:
//! - Matplotlib style sheets with a colorblind-safe color cycle
//! - Colorblind-friendly colormaps and spectrum heatmaps
//! - PNG encoding (indexed and RGBA)

pub mod colormap;
pub mod error;
pub mod png;
pub mod style;

pub use colormap::{render_spectrum, Color, Colormap};
pub use error::{RenderError, RenderResult, StyleError, StyleResult};
pub use style::PlotStyle;

use ndarray::Array2;

/// Render a (frequency, wavenumber) spectrum straight to PNG bytes.
pub fn render_spectrum_png(
    power: &Array2<f64>,
    width: usize,
    height: usize,
    range: Option<(f64, f64)>,
    colormap: Colormap,
) -> RenderResult<Vec<u8>> {
    let pixels = render_spectrum(power, width, height, range, colormap)?;
    png::create_png_auto(&pixels, width, height)
}
