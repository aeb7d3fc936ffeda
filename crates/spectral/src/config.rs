//! Configuration for the space-time spectrum pipeline.

use serde::{Deserialize, Serialize};

/// Configuration for the Wheeler–Kiladis analyzer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpectrumConfig {
    /// Number of time samples per chunk (segment length).
    pub chunk_length: usize,

    /// Offset between consecutive chunk starts, in time samples.
    pub chunk_stride: usize,

    /// Sampling rate of the input record (e.g. 4 for 6-hourly data).
    pub samples_per_day: f64,

    /// Background smoothing passes.
    pub background: BackgroundConfig,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            chunk_length: 120,
            chunk_stride: 60,
            samples_per_day: 4.0,
            background: BackgroundConfig::default(),
        }
    }
}

impl SpectrumConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("WK_CHUNK_LENGTH") {
            if let Ok(len) = val.parse() {
                config.chunk_length = len;
            }
        }

        if let Ok(val) = std::env::var("WK_CHUNK_STRIDE") {
            if let Ok(stride) = val.parse() {
                config.chunk_stride = stride;
            }
        }

        if let Ok(val) = std::env::var("WK_SAMPLES_PER_DAY") {
            if let Ok(rate) = val.parse() {
                config.samples_per_day = rate;
            }
        }

        config.background = BackgroundConfig::from_env();

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_length < 2 {
            return Err("chunk_length must be >= 2".to_string());
        }

        if self.chunk_stride == 0 {
            return Err("chunk_stride must be > 0".to_string());
        }

        if !(self.samples_per_day > 0.0) {
            return Err("samples_per_day must be > 0".to_string());
        }

        Ok(())
    }

    /// Number of overlapping chunks that fit in a record of `time_steps` samples.
    ///
    /// Returns 0 if the record is shorter than one chunk.
    pub fn num_chunks(&self, time_steps: usize) -> usize {
        if time_steps < self.chunk_length {
            return 0;
        }
        (time_steps - self.chunk_length) / self.chunk_stride + 1
    }
}

/// Number of 1-2-1 passes used to estimate the red-noise background.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackgroundConfig {
    /// Passes along the frequency axis over the whole spectrum.
    pub freq_passes: usize,

    /// Passes along wavenumber for the lower half of the frequency rows.
    pub low_freq_wn_passes: usize,

    /// Passes along wavenumber for the upper half of the frequency rows.
    pub high_freq_wn_passes: usize,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            freq_passes: 10,
            low_freq_wn_passes: 10,
            high_freq_wn_passes: 40,
        }
    }
}

impl BackgroundConfig {
    /// Load background smoothing configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("WK_BACKGROUND_FREQ_PASSES") {
            if let Ok(n) = val.parse() {
                config.freq_passes = n;
            }
        }

        if let Ok(val) = std::env::var("WK_BACKGROUND_LOW_WN_PASSES") {
            if let Ok(n) = val.parse() {
                config.low_freq_wn_passes = n;
            }
        }

        if let Ok(val) = std::env::var("WK_BACKGROUND_HIGH_WN_PASSES") {
            if let Ok(n) = val.parse() {
                config.high_freq_wn_passes = n;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SpectrumConfig::default();
        assert_eq!(config.chunk_length, 120);
        assert_eq!(config.chunk_stride, 60);
        assert_eq!(config.samples_per_day, 4.0);
        assert_eq!(config.background.freq_passes, 10);
        assert_eq!(config.background.low_freq_wn_passes, 10);
        assert_eq!(config.background.high_freq_wn_passes, 40);
    }

    #[test]
    fn test_config_validation() {
        let mut config = SpectrumConfig::default();
        assert!(config.validate().is_ok());

        config.chunk_length = 1;
        assert!(config.validate().is_err());

        config = SpectrumConfig::default();
        config.chunk_stride = 0;
        assert!(config.validate().is_err());

        config = SpectrumConfig::default();
        config.samples_per_day = 0.0;
        assert!(config.validate().is_err());

        config.samples_per_day = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_num_chunks() {
        let config = SpectrumConfig::default();
        // 90 days of 6-hourly data
        assert_eq!(config.num_chunks(360), 5);
        assert_eq!(config.num_chunks(120), 1);
        assert_eq!(config.num_chunks(179), 1);
        assert_eq!(config.num_chunks(180), 2);
        assert_eq!(config.num_chunks(119), 0);
    }
}
