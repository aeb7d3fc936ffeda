//! Colorblind-friendly colormaps and heatmap rendering for spectra.

use crate::error::{RenderError, RenderResult};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

// Nine evenly spaced samples of each map, from 0 to 1.
const VIRIDIS: [Color; 9] = [
    Color::rgb(68, 1, 84),
    Color::rgb(71, 44, 122),
    Color::rgb(59, 82, 139),
    Color::rgb(44, 114, 142),
    Color::rgb(33, 145, 140),
    Color::rgb(40, 174, 128),
    Color::rgb(94, 201, 98),
    Color::rgb(173, 220, 48),
    Color::rgb(253, 231, 37),
];

const CIVIDIS: [Color; 9] = [
    Color::rgb(0, 34, 78),
    Color::rgb(18, 53, 112),
    Color::rgb(59, 73, 108),
    Color::rgb(87, 93, 109),
    Color::rgb(112, 113, 115),
    Color::rgb(138, 135, 121),
    Color::rgb(166, 157, 117),
    Color::rgb(196, 181, 102),
    Color::rgb(254, 232, 56),
];

/// Perceptually uniform sequential colormaps readable with color vision deficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    Viridis,
    Cividis,
}

impl Colormap {
    fn stops(&self) -> &'static [Color] {
        match self {
            Colormap::Viridis => &VIRIDIS,
            Colormap::Cividis => &CIVIDIS,
        }
    }

    /// Color at position `t` in [0, 1]; values outside are clamped.
    pub fn color_at(&self, t: f64) -> Color {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let pos = t * (stops.len() - 1) as f64;
        let low = pos.floor() as usize;
        let high = (low + 1).min(stops.len() - 1);
        interpolate_color(stops[low], stops[high], pos - low as f64)
    }
}

impl FromStr for Colormap {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "viridis" => Ok(Colormap::Viridis),
            "cividis" => Ok(Colormap::Cividis),
            _ => Err(RenderError::UnknownColormap(s.to_string())),
        }
    }
}

/// Linear color interpolation
fn interpolate_color(color1: Color, color2: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// Resample grid data to a different resolution using bilinear interpolation.
///
/// NaN in any of the four neighbours propagates to the output sample.
///
/// # Arguments
/// - `data`: Input grid data (row-major order)
/// - `src_width`: Source grid width
/// - `src_height`: Source grid height
/// - `dst_width`: Destination grid width
/// - `dst_height`: Destination grid height
pub fn resample_grid(
    data: &[f64],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<f64> {
    if src_width == dst_width && src_height == dst_height {
        return data.to_vec();
    }
    if src_width == 0 || src_height == 0 {
        return vec![f64::NAN; dst_width * dst_height];
    }

    let ratio = |src: usize, dst: usize| {
        if dst > 1 {
            (src - 1) as f64 / (dst - 1) as f64
        } else {
            0.0
        }
    };
    let x_ratio = ratio(src_width, dst_width);
    let y_ratio = ratio(src_height, dst_height);

    let mut output = vec![0.0; dst_width * dst_height];
    for y in 0..dst_height {
        for x in 0..dst_width {
            let src_x = x as f64 * x_ratio;
            let src_y = y as f64 * y_ratio;

            let x1 = src_x.floor() as usize;
            let y1 = src_y.floor() as usize;
            let x2 = (x1 + 1).min(src_width - 1);
            let y2 = (y1 + 1).min(src_height - 1);

            let dx = src_x - x1 as f64;
            let dy = src_y - y1 as f64;

            let v11 = data[y1 * src_width + x1];
            let v21 = data[y1 * src_width + x2];
            let v12 = data[y2 * src_width + x1];
            let v22 = data[y2 * src_width + x2];

            // Skip zero-weight neighbours so edge samples stay exact
            let lerp = |a: f64, b: f64, t: f64| if t == 0.0 { a } else { a * (1.0 - t) + b * t };
            let v1 = lerp(v11, v21, dx);
            let v2 = lerp(v12, v22, dx);
            output[y * dst_width + x] = lerp(v1, v2, dy);
        }
    }

    output
}

/// Map values to RGBA pixels.
///
/// Values are scaled linearly from `[min_val, max_val]` to the colormap;
/// NaN becomes fully transparent.
pub fn render_values(data: &[f64], min_val: f64, max_val: f64, colormap: Colormap) -> Vec<u8> {
    let range = max_val - min_val;
    let range = if range.abs() < f64::EPSILON { 1.0 } else { range };

    let mut pixels = Vec::with_capacity(data.len() * 4);
    for &value in data {
        let color = if value.is_nan() {
            Color::transparent()
        } else {
            colormap.color_at((value - min_val) / range)
        };
        pixels.extend_from_slice(&[color.r, color.g, color.b, color.a]);
    }
    pixels
}

/// Minimum and maximum of the finite values, if any.
pub fn finite_range(data: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    data.into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Render a (frequency, wavenumber) spectrum as a `width`×`height` heatmap.
///
/// The top image row is the highest frequency and wavenumber increases to
/// the right. Without an explicit `range` the finite data range is used.
pub fn render_spectrum(
    power: &Array2<f64>,
    width: usize,
    height: usize,
    range: Option<(f64, f64)>,
    colormap: Colormap,
) -> RenderResult<Vec<u8>> {
    let (rows, cols) = power.dim();
    if rows == 0 || cols == 0 || width == 0 || height == 0 {
        return Err(RenderError::EmptyImage { width, height });
    }

    let flipped: Vec<f64> = power
        .outer_iter()
        .rev()
        .flat_map(|row| row.to_vec())
        .collect();
    let resampled = resample_grid(&flipped, cols, rows, width, height);

    let (min_val, max_val) = range
        .or_else(|| finite_range(power.iter().copied()))
        .unwrap_or((0.0, 1.0));

    Ok(render_values(&resampled, min_val, max_val, colormap))
}
