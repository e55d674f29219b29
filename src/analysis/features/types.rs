// Types module - Data structures for spectral analysis
//
// SpectralFrame carries the half-spectrum produced by the FFT stage and
// FeatureSet the nine scalar descriptors derived from it.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, AnalysisError, Result};

/// Allowed deviation of the band-ratio sum from 1
const RATIO_SUM_TOLERANCE: f64 = 1e-5;

/// Non-negative-frequency half of a real FFT
///
/// `frequencies` is ascending in Hz and has the same length as `magnitudes`
/// (`nfft / 2 + 1` bins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralFrame {
    pub frequencies: Vec<f64>,
    pub magnitudes: Vec<f64>,
    /// Transform size actually used (a power of two)
    pub nfft: usize,
}

impl SpectralFrame {
    /// Frequency spacing between adjacent bins in Hz
    pub fn bin_width(&self) -> f64 {
        if self.frequencies.len() < 2 {
            return 0.0;
        }
        self.frequencies[1] - self.frequencies[0]
    }
}

/// Spectral descriptors of one audio chunk
///
/// The three band ratios are each in [0, 1] and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Magnitude-weighted mean frequency in Hz ("brightness")
    pub centroid: f64,

    /// Magnitude-weighted standard deviation around the centroid in Hz
    pub spread: f64,

    /// Lowest frequency at which cumulative magnitude reaches 85% (Hz)
    pub rolloff: f64,

    /// Geometric / arithmetic mean of magnitudes
    ///
    /// 0.0 = pure tone, 1.0 = white noise
    pub flatness: f64,

    /// Shannon entropy of the normalized magnitude distribution (bits)
    pub entropy: f64,

    /// Frequency of the strongest bin in Hz
    pub dominant_frequency: f64,

    /// Share of magnitude below the low cutoff (default 250 Hz)
    pub low_ratio: f64,

    /// Share of magnitude between the low and mid cutoffs (default 250-4000 Hz)
    pub mid_ratio: f64,

    /// Share of magnitude at or above the mid cutoff (default 4000 Hz)
    pub high_ratio: f64,
}

impl FeatureSet {
    /// Check that the descriptors are usable for classification
    ///
    /// # Errors
    /// `NonFiniteValue` for any NaN/infinite field, `OutOfRange` for
    /// flatness or a band ratio outside [0, 1], or ratios not summing to 1.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("features.centroid", self.centroid),
            ("features.spread", self.spread),
            ("features.rolloff", self.rolloff),
            ("features.flatness", self.flatness),
            ("features.entropy", self.entropy),
            ("features.dominant_frequency", self.dominant_frequency),
            ("features.low_ratio", self.low_ratio),
            ("features.mid_ratio", self.mid_ratio),
            ("features.high_ratio", self.high_ratio),
        ];
        for (parameter, value) in fields {
            ensure_finite(parameter, value)?;
        }

        let unit = [
            ("features.flatness", self.flatness),
            ("features.low_ratio", self.low_ratio),
            ("features.mid_ratio", self.mid_ratio),
            ("features.high_ratio", self.high_ratio),
        ];
        for (parameter, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(AnalysisError::OutOfRange {
                    parameter,
                    value,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }

        let sum = self.low_ratio + self.mid_ratio + self.high_ratio;
        if (sum - 1.0).abs() > RATIO_SUM_TOLERANCE {
            return Err(AnalysisError::OutOfRange {
                parameter: "features band ratio sum",
                value: sum,
                min: 1.0 - RATIO_SUM_TOLERANCE,
                max: 1.0 + RATIO_SUM_TOLERANCE,
            });
        }

        Ok(())
    }
}
