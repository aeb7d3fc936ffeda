//! JSON field files read by the `spectrum` command.
//!
//! A field file holds the coordinate axes and the anomaly values flattened
//! in (time, lat, lon) order:
//!
//! ```json
//! { "lat": [-10.0, 0.0, 10.0], "lon": [0.0, 120.0, 240.0], "time_steps": 2, "data": [...] }
//! ```

use anyhow::{bail, Context, Result};
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use spectral::Dims;
use std::path::Path;

/// Gridded anomaly field as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldInput {
    /// Latitudes in degrees.
    pub lat: Vec<f64>,
    /// Longitudes in degrees.
    pub lon: Vec<f64>,
    /// Number of time samples.
    pub time_steps: usize,
    /// Values in row-major (time, lat, lon) order.
    pub data: Vec<f64>,
}

impl FieldInput {
    /// Build a field file from an in-memory (time, lat, lon) array.
    pub fn from_field(lat: Vec<f64>, lon: Vec<f64>, field: &Array3<f64>) -> Self {
        Self {
            lat,
            lon,
            time_steps: field.len_of(ndarray::Axis(0)),
            data: field.iter().copied().collect(),
        }
    }

    /// Parse and validate a field from JSON text.
    pub fn from_json(json_str: &str) -> Result<Self> {
        let input: Self = serde_json::from_str(json_str).context("Failed to parse field JSON")?;
        input.validate()?;
        Ok(input)
    }

    /// Read and validate a field file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read field file {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid field file {}", path.display()))
    }

    /// Check that the axes and data agree.
    pub fn validate(&self) -> Result<()> {
        if self.lat.is_empty() || self.lon.is_empty() || self.time_steps == 0 {
            bail!(
                "field must have at least one time step, latitude and longitude (got {}x{}x{})",
                self.time_steps,
                self.lat.len(),
                self.lon.len()
            );
        }

        let expected = self.time_steps * self.lat.len() * self.lon.len();
        if self.data.len() != expected {
            bail!(
                "data holds {} values, expected {} ({} time steps x {} latitudes x {} longitudes)",
                self.data.len(),
                expected,
                self.time_steps,
                self.lat.len(),
                self.lon.len()
            );
        }

        if self.lat.iter().chain(&self.lon).any(|v| !v.is_finite()) {
            bail!("coordinates must be finite");
        }

        Ok(())
    }

    /// Coordinate axes for the analyzer.
    pub fn dims(&self) -> Dims {
        Dims {
            lat: self.lat.clone(),
            lon: self.lon.clone(),
            lev: None,
        }
    }

    /// Reshape the flattened data into a (time, lat, lon) array.
    pub fn to_array(&self) -> Result<Array3<f64>> {
        Array3::from_shape_vec(
            (self.time_steps, self.lat.len(), self.lon.len()),
            self.data.clone(),
        )
        .context("Field data does not match its axes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use std::io::Write;

    fn small_field() -> FieldInput {
        FieldInput {
            lat: vec![-5.0, 5.0],
            lon: vec![0.0, 120.0, 240.0],
            time_steps: 2,
            data: (0..12).map(|v| v as f64).collect(),
        }
    }

    #[test]
    fn test_to_array_layout() {
        let field = small_field().to_array().unwrap();
        assert_eq!(field.dim(), (2, 2, 3));
        assert_eq!(field[[0, 0, 2]], 2.0);
        assert_eq!(field[[0, 1, 0]], 3.0);
        assert_eq!(field[[1, 0, 0]], 6.0);
    }

    #[test]
    fn test_from_field_matches_layout() {
        let field = Array3::from_shape_fn((2, 2, 3), |(t, j, i)| (t * 6 + j * 3 + i) as f64);
        let input = FieldInput::from_field(vec![-5.0, 5.0], vec![0.0, 120.0, 240.0], &field);
        assert_eq!(input, small_field());
    }

    #[test]
    fn test_wrong_data_length_rejected() {
        let mut input = small_field();
        input.data.pop();
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("expected 12"));
    }

    #[test]
    fn test_empty_axis_rejected() {
        let mut input = small_field();
        input.lon.clear();
        input.data.clear();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&small_field()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let input = FieldInput::from_file(file.path()).unwrap();
        assert_eq!(input.dims().lat, vec![-5.0, 5.0]);
        assert_eq!(input.dims().lev, None);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = FieldInput::from_file("/nonexistent/field.json").unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/field.json"));
    }
}
