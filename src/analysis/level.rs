// Level module - calibrated loudness from amplitude samples
//
// Converts a buffer of normalized samples into an approximate sound-pressure
// level. The microphone has no absolute acoustic reference, so a calibration
// offset is added to the dBFS value:
//
//   rms = sqrt(mean(x^2))
//   db  = clamp(20 * log10(rms + EPSILON) + offset, 0, 120)
//
// All functions are pure; repeated calls on the same input are bit-identical.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_finite_samples, AnalysisError, Result};

/// Default calibration offset (dB) mapping dBFS onto an SPL-like scale
pub const DEFAULT_CALIBRATION_OFFSET_DB: f64 = 94.0;

/// Lowest reported level (dB)
pub const MIN_DB: f64 = 0.0;

/// Highest reported level (dB)
pub const MAX_DB: f64 = 120.0;

/// Guard against log10(0) for silent buffers
const EPSILON: f64 = 1e-10;

/// Default window for `decibel_series` (samples)
pub const DEFAULT_SERIES_WINDOW: usize = 4096;

/// Root-mean-square amplitude of a buffer
///
/// # Errors
/// `EmptyInput` for an empty buffer, `NonFiniteSample` naming the first
/// NaN/infinite sample.
pub fn root_mean_square(samples: &[f32]) -> Result<f64> {
    if samples.is_empty() {
        return Err(AnalysisError::EmptyInput { what: "samples" });
    }
    ensure_finite_samples("samples", samples)?;

    let sum_squares: f64 = samples
        .iter()
        .map(|&s| {
            let s = s as f64;
            s * s
        })
        .sum();

    Ok((sum_squares / samples.len() as f64).sqrt())
}

/// Calibrated level of a buffer in dB, clamped to [0, 120]
pub fn decibels(samples: &[f32], calibration_offset_db: f64) -> Result<f64> {
    let rms = root_mean_square(samples)?;
    decibels_from_rms(rms, calibration_offset_db)
}

/// Calibrated level from a precomputed RMS value
///
/// # Errors
/// `NegativeValue` or `NonFiniteValue` for a bad `rms`, `NonFiniteValue` for
/// a bad offset.
pub fn decibels_from_rms(rms: f64, calibration_offset_db: f64) -> Result<f64> {
    ensure_finite("rms", rms)?;
    if rms < 0.0 {
        return Err(AnalysisError::NegativeValue {
            parameter: "rms",
            value: rms,
        });
    }
    ensure_finite("calibration_offset_db", calibration_offset_db)?;

    let db = 20.0 * (rms + EPSILON).log10() + calibration_offset_db;
    Ok(db.clamp(MIN_DB, MAX_DB))
}

/// Time-varying level over half-overlapping windows
///
/// Short recordings are zero-padded to one window. Windows advance by
/// `window_size / 2` and stop before any window would run past the end.
pub fn decibel_series(
    samples: &[f32],
    window_size: usize,
    calibration_offset_db: f64,
) -> Result<Vec<f64>> {
    if window_size < 2 {
        return Err(AnalysisError::InvalidSize {
            parameter: "window_size",
            value: window_size,
        });
    }
    if samples.is_empty() {
        return Err(AnalysisError::EmptyInput { what: "samples" });
    }
    ensure_finite_samples("samples", samples)?;

    let mut padded;
    let audio = if samples.len() < window_size {
        padded = samples.to_vec();
        padded.resize(window_size, 0.0);
        &padded[..]
    } else {
        samples
    };

    let hop = window_size / 2;
    let num_windows = (audio.len() / hop).saturating_sub(1);

    let mut levels = Vec::with_capacity(num_windows);
    for i in 0..num_windows {
        let start = i * hop;
        let end = start + window_size;
        if end > audio.len() {
            break;
        }
        levels.push(decibels(&audio[start..end], calibration_offset_db)?);
    }

    Ok(levels)
}

/// Stateless level estimator carrying its calibration offset
///
/// Holds no mutable state and is safe to share across threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelEstimator {
    calibration_offset_db: f64,
}

impl Default for LevelEstimator {
    fn default() -> Self {
        Self {
            calibration_offset_db: DEFAULT_CALIBRATION_OFFSET_DB,
        }
    }
}

impl LevelEstimator {
    /// Create an estimator with a device-specific calibration offset
    pub fn new(calibration_offset_db: f64) -> Result<Self> {
        ensure_finite("calibration_offset_db", calibration_offset_db)?;
        Ok(Self {
            calibration_offset_db,
        })
    }

    pub fn calibration_offset_db(&self) -> f64 {
        self.calibration_offset_db
    }

    pub fn root_mean_square(&self, samples: &[f32]) -> Result<f64> {
        root_mean_square(samples)
    }

    pub fn decibels(&self, samples: &[f32]) -> Result<f64> {
        decibels(samples, self.calibration_offset_db)
    }

    pub fn decibels_from_rms(&self, rms: f64) -> Result<f64> {
        decibels_from_rms(rms, self.calibration_offset_db)
    }

    pub fn decibel_series(&self, samples: &[f32], window_size: usize) -> Result<Vec<f64>> {
        decibel_series(samples, window_size, self.calibration_offset_db)
    }
}

/// Summary statistics over a series of levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecibelStats {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

impl DecibelStats {
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(AnalysisError::EmptyInput { what: "decibel values" });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(AnalysisError::NonFiniteSample {
                what: "decibel values",
                index,
                value: values[index],
            });
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Ok(Self {
            mean,
            max,
            min,
            std_dev: variance.sqrt(),
        })
    }
}
