//! Plot style for publication figures.
//!
//! A [`PlotStyle`] expands a base font size into the full set of Matplotlib
//! rc parameters and writes them as an `.mplstyle` sheet, together with a
//! colorblind-safe color cycle.

use crate::error::{StyleError, StyleResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Okabe–Ito palette, distinguishable under the common color vision deficiencies.
pub const OKABE_ITO: [&str; 8] = [
    "#E69F00", "#56B4E9", "#009E73", "#F0E442", "#0072B2", "#D55E00", "#CC79A7", "#000000",
];

fn default_font_size() -> u32 {
    24
}

fn default_color_cycle() -> Vec<String> {
    OKABE_ITO.iter().map(|c| c.to_string()).collect()
}

/// Figure style settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PlotStyle {
    /// Base font size in points.
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Render text with LaTeX.
    #[serde(default)]
    pub use_latex: bool,
    /// Line color cycle as `#RRGGBB` strings.
    #[serde(default = "default_color_cycle")]
    pub color_cycle: Vec<String>,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            use_latex: false,
            color_cycle: default_color_cycle(),
        }
    }
}

impl PlotStyle {
    /// Style with the given font size and LaTeX setting and the default colors.
    pub fn new(font_size: u32, use_latex: bool) -> Self {
        Self {
            font_size,
            use_latex,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut style = Self::default();

        if let Ok(val) = std::env::var("PLOT_FONT_SIZE") {
            if let Ok(size) = val.parse() {
                style.font_size = size;
            }
        }

        if let Ok(val) = std::env::var("PLOT_USE_LATEX") {
            style.use_latex = val.to_lowercase() == "true" || val == "1";
        }

        style
    }

    /// Load a style from a JSON string.
    pub fn from_json(json_str: &str) -> StyleResult<Self> {
        let style: Self = serde_json::from_str(json_str)?;
        style.validate()?;
        Ok(style)
    }

    /// Load a style from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> StyleResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validate the style.
    pub fn validate(&self) -> StyleResult<()> {
        if self.font_size == 0 {
            return Err(StyleError::Invalid("font_size must be > 0".to_string()));
        }
        if self.color_cycle.is_empty() {
            return Err(StyleError::Invalid("color_cycle must not be empty".to_string()));
        }
        for color in &self.color_cycle {
            if hex_to_rgb(color).is_none() {
                return Err(StyleError::Color(color.clone()));
            }
        }
        Ok(())
    }

    /// Matplotlib rc parameters as (key, value) pairs, in file order.
    pub fn rc_params(&self) -> Vec<(&'static str, String)> {
        let size = self.font_size;
        let cycle = self
            .color_cycle
            .iter()
            .map(|c| format!("'{}'", c.trim_start_matches('#')))
            .collect::<Vec<_>>()
            .join(", ");

        vec![
            ("font.size", size.to_string()),
            ("axes.titlesize", (size + 8).to_string()),
            ("axes.labelsize", (size + 4).to_string()),
            ("xtick.labelsize", size.to_string()),
            ("ytick.labelsize", size.to_string()),
            ("legend.fontsize", size.to_string()),
            ("text.usetex", python_bool(self.use_latex).to_string()),
            ("axes.grid", python_bool(true).to_string()),
            ("grid.alpha", "0.5".to_string()),
            ("axes.prop_cycle", format!("cycler('color', [{}])", cycle)),
        ]
    }

    /// Render the style as `.mplstyle` text.
    ///
    /// Colors are written without `#`, which starts a comment in style sheets.
    pub fn to_mplstyle(&self) -> String {
        let mut out = String::from("# Colorblind-aware figure style\n");
        for (key, value) in self.rc_params() {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(&value);
            out.push('\n');
        }
        out
    }

    /// Validate and write the style sheet to `path`.
    pub fn write_mplstyle(&self, path: impl AsRef<Path>) -> StyleResult<()> {
        self.validate()?;
        let path = path.as_ref();
        std::fs::write(path, self.to_mplstyle())?;
        info!(path = %path.display(), font_size = self.font_size, "Wrote plot style");
        Ok(())
    }
}

fn python_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}
