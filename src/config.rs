//! Configuration management for analysis parameter tuning
//!
//! This module provides runtime configuration loading from JSON files so
//! calibration offsets, FFT size, smoothing window and band cutoffs can be
//! adjusted per device without recompilation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::classifier::{
    ClassificationThresholds, DEFAULT_NORMAL_UPPER_DB, DEFAULT_QUIET_UPPER_DB,
};
use crate::analysis::features::{
    FrequencyBands, SpectralAnalyzer, DEFAULT_FFT_SIZE, DEFAULT_LOW_CUTOFF_HZ,
    DEFAULT_MID_CUTOFF_HZ,
};
use crate::analysis::level::{LevelEstimator, DEFAULT_CALIBRATION_OFFSET_DB};
use crate::analysis::smoothing::DEFAULT_WINDOW_SIZE;
use crate::audio::{SampleBuffer, DEFAULT_CHUNK_MS, DEFAULT_SAMPLE_RATE};
use crate::error::{AnalysisError, Result};

/// Complete analysis configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub level: LevelConfig,
    pub spectral: SpectralConfig,
    pub smoothing: SmoothingConfig,
    pub classifier: ClassifierConfig,
}

/// Capture parameters assumed when chunking offline recordings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Expected capture sample rate in Hz; bin frequencies are precomputed
    /// for it and chunks at other rates are rescaled per call
    pub sample_rate: u32,
    /// Chunk duration handed to the pipeline in milliseconds
    pub chunk_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            chunk_ms: DEFAULT_CHUNK_MS,
        }
    }
}

/// Loudness calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Offset added to dBFS to approximate dB SPL on this device
    pub calibration_offset_db: f64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            calibration_offset_db: DEFAULT_CALIBRATION_OFFSET_DB,
        }
    }
}

/// FFT and band split parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralConfig {
    /// FFT size; rounded up to a power of two at analysis time
    pub fft_size: usize,
    pub low_cutoff_hz: f64,
    pub mid_cutoff_hz: f64,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            fft_size: DEFAULT_FFT_SIZE,
            low_cutoff_hz: DEFAULT_LOW_CUTOFF_HZ,
            mid_cutoff_hz: DEFAULT_MID_CUTOFF_HZ,
        }
    }
}

/// Trend smoothing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Number of chunk readings averaged
    pub window_size: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

/// Category thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub quiet_upper_db: f64,
    pub normal_upper_db: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            quiet_upper_db: DEFAULT_QUIET_UPPER_DB,
            normal_upper_db: DEFAULT_NORMAL_UPPER_DB,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// Missing or malformed files fall back to the default configuration
    /// with a warning, so a bad config never stops monitoring.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Rejected configuration from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Parse and validate a JSON configuration
    ///
    /// Missing sections and fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AppConfig =
            serde_json::from_str(json).map_err(|err| AnalysisError::InvalidConfig {
                reason: err.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every option against its contract
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate { sample_rate: 0 });
        }
        if self.audio.chunk_ms == 0 {
            return Err(AnalysisError::InvalidConfig {
                reason: "audio.chunk_ms must be positive".to_string(),
            });
        }
        SampleBuffer::chunk_len(self.audio.sample_rate, self.audio.chunk_ms)?;
        let fft_size = self.spectral.fft_size;
        if fft_size == 0 || fft_size.checked_next_power_of_two().is_none() {
            return Err(AnalysisError::InvalidSize {
                parameter: "spectral.fft_size",
                value: fft_size,
            });
        }
        if self.smoothing.window_size == 0 {
            return Err(AnalysisError::InvalidSize {
                parameter: "smoothing.window_size",
                value: 0,
            });
        }
        self.level_estimator()?;
        self.frequency_bands()?;
        self.thresholds()?;
        Ok(())
    }

    pub fn level_estimator(&self) -> Result<LevelEstimator> {
        LevelEstimator::new(self.level.calibration_offset_db)
    }

    /// Spectral analyzer planned for `spectral.fft_size` at `audio.sample_rate`
    pub fn spectral_analyzer(&self) -> Result<SpectralAnalyzer> {
        SpectralAnalyzer::with_fft_size(
            self.audio.sample_rate,
            self.frequency_bands()?,
            self.spectral.fft_size,
        )
    }

    pub fn frequency_bands(&self) -> Result<FrequencyBands> {
        FrequencyBands::new(self.spectral.low_cutoff_hz, self.spectral.mid_cutoff_hz)
    }

    pub fn thresholds(&self) -> Result<ClassificationThresholds> {
        ClassificationThresholds::new(
            self.classifier.quiet_upper_db,
            self.classifier.normal_upper_db,
        )
    }
}
