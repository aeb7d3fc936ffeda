//! Common test fixtures for spectral analysis tests.
//!
//! Coordinate axes and parameter sets that recur across the test suite.

/// Common latitude axes.
pub mod lat {
    /// Tropical band used by most Wheeler–Kiladis studies.
    pub const TROPICAL_BAND: (f64, f64) = (-15.0, 15.0);

    /// Range that selects no latitudes of [`super::latitudes`] grids.
    pub const POLAR_CAP: (f64, f64) = (80.0, 90.0);

    /// Nine latitudes every 5 degrees from -20 to 20.
    pub const EQUATORIAL_9: [f64; 9] = [-20.0, -15.0, -10.0, -5.0, 0.0, 5.0, 10.0, 15.0, 20.0];
}

/// Common pressure level sets in hPa.
pub mod lev {
    /// Mid and lower troposphere.
    pub const TROPOSPHERE: [f64; 4] = [850.0, 700.0, 500.0, 250.0];

    /// The reference level, where the potential temperature converter is 1.
    pub const REFERENCE: f64 = 1000.0;
}

/// Sampling parameters.
pub mod sampling {
    /// Four samples per day (6-hourly data).
    pub const SIX_HOURLY: f64 = 4.0;

    /// One sample per day.
    pub const DAILY: f64 = 1.0;
}

/// Latitudes evenly spaced from `-max_lat` to `max_lat`, inclusive.
///
/// An odd `n` places a point on the equator.
pub fn latitudes(n: usize, max_lat: f64) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n)
            .map(|j| -max_lat + 2.0 * max_lat * j as f64 / (n - 1) as f64)
            .collect(),
    }
}

/// `n` longitudes evenly spaced around the globe starting at 0.
pub fn longitudes(n: usize) -> Vec<f64> {
    (0..n).map(|i| 360.0 * i as f64 / n as f64).collect()
}
