// Spectral module - Frequency-domain feature extraction
//
// This module computes spectral descriptors from a magnitude spectrum and
// its bin frequencies. Magnitudes (not power) are used throughout, and a
// small epsilon guards every division and logarithm.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

use serde::{Deserialize, Serialize};

use super::types::FeatureSet;
use crate::error::{AnalysisError, Result};

/// Spectral rolloff threshold (85% of cumulative magnitude)
const ROLLOFF_THRESHOLD: f64 = 0.85;

/// Guard for divisions and logarithms
const EPSILON: f64 = 1e-10;

/// Default upper edge of the low band (Hz)
pub const DEFAULT_LOW_CUTOFF_HZ: f64 = 250.0;

/// Default upper edge of the mid band (Hz)
pub const DEFAULT_MID_CUTOFF_HZ: f64 = 4000.0;

/// Band edges splitting the spectrum into low / mid / high
///
/// Low is [0, low_cutoff), mid is [low_cutoff, mid_cutoff), high is
/// [mid_cutoff, ∞).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBands {
    pub low_cutoff_hz: f64,
    pub mid_cutoff_hz: f64,
}

impl Default for FrequencyBands {
    fn default() -> Self {
        Self {
            low_cutoff_hz: DEFAULT_LOW_CUTOFF_HZ,
            mid_cutoff_hz: DEFAULT_MID_CUTOFF_HZ,
        }
    }
}

impl FrequencyBands {
    pub fn new(low_cutoff_hz: f64, mid_cutoff_hz: f64) -> Result<Self> {
        let valid = low_cutoff_hz.is_finite()
            && mid_cutoff_hz.is_finite()
            && low_cutoff_hz > 0.0
            && low_cutoff_hz < mid_cutoff_hz;
        if !valid {
            return Err(AnalysisError::InvalidConfig {
                reason: format!(
                    "band cutoffs must satisfy 0 < low < mid (got {} and {})",
                    low_cutoff_hz, mid_cutoff_hz
                ),
            });
        }

        Ok(Self {
            low_cutoff_hz,
            mid_cutoff_hz,
        })
    }
}

/// Spectral feature computation functions
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralFeatures {
    bands: FrequencyBands,
}

impl SpectralFeatures {
    pub fn new(bands: FrequencyBands) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> FrequencyBands {
        self.bands
    }

    /// Compute all nine descriptors from a half-spectrum
    ///
    /// # Errors
    /// `EmptyInput` for empty input, `LengthMismatch` when the sequences
    /// differ in length, `NonFiniteSample`/`NegativeMagnitude` for bad bins.
    pub fn extract(&self, frequencies: &[f64], magnitudes: &[f64]) -> Result<FeatureSet> {
        validate_spectrum(frequencies, magnitudes)?;

        let total: f64 = magnitudes.iter().sum();
        let normalized: Vec<f64> = magnitudes.iter().map(|m| m / (total + EPSILON)).collect();

        let centroid = compute_centroid(frequencies, &normalized);
        let spread = compute_spread(frequencies, &normalized, centroid);
        let (low_ratio, mid_ratio, high_ratio) = self.compute_band_ratios(frequencies, magnitudes);

        Ok(FeatureSet {
            centroid,
            spread,
            rolloff: compute_rolloff(frequencies, &normalized),
            flatness: compute_flatness(magnitudes),
            entropy: compute_entropy(&normalized),
            dominant_frequency: compute_dominant_frequency(frequencies, magnitudes),
            low_ratio,
            mid_ratio,
            high_ratio,
        })
    }

    /// Share of total magnitude in each band
    ///
    /// A spectrum with no energy at all is split evenly so the ratios still
    /// sum to one.
    pub fn compute_band_ratios(&self, frequencies: &[f64], magnitudes: &[f64]) -> (f64, f64, f64) {
        let mut low = 0.0;
        let mut mid = 0.0;
        let mut high = 0.0;

        for (&freq, &mag) in frequencies.iter().zip(magnitudes) {
            if freq < self.bands.low_cutoff_hz {
                low += mag;
            } else if freq < self.bands.mid_cutoff_hz {
                mid += mag;
            } else {
                high += mag;
            }
        }

        let total = low + mid + high;
        if total <= EPSILON {
            let third = 1.0 / 3.0;
            return (third, third, third);
        }

        (low / total, mid / total, high / total)
    }
}

fn validate_spectrum(frequencies: &[f64], magnitudes: &[f64]) -> Result<()> {
    if frequencies.is_empty() {
        return Err(AnalysisError::EmptyInput { what: "frequencies" });
    }
    if magnitudes.is_empty() {
        return Err(AnalysisError::EmptyInput { what: "magnitudes" });
    }
    if frequencies.len() != magnitudes.len() {
        return Err(AnalysisError::LengthMismatch {
            frequencies: frequencies.len(),
            magnitudes: magnitudes.len(),
        });
    }
    if let Some(index) = frequencies.iter().position(|f| !f.is_finite()) {
        return Err(AnalysisError::NonFiniteSample {
            what: "frequencies",
            index,
            value: frequencies[index],
        });
    }
    if let Some(index) = magnitudes.iter().position(|m| !m.is_finite()) {
        return Err(AnalysisError::NonFiniteSample {
            what: "magnitudes",
            index,
            value: magnitudes[index],
        });
    }
    if let Some(index) = magnitudes.iter().position(|&m| m < 0.0) {
        return Err(AnalysisError::NegativeMagnitude {
            index,
            value: magnitudes[index],
        });
    }
    Ok(())
}

/// Spectral centroid: Σ f_i · p_i with p the normalized magnitudes
fn compute_centroid(frequencies: &[f64], normalized: &[f64]) -> f64 {
    frequencies
        .iter()
        .zip(normalized)
        .map(|(f, p)| f * p)
        .sum()
}

/// Spectral spread: sqrt(Σ (f_i - centroid)² · p_i)
fn compute_spread(frequencies: &[f64], normalized: &[f64], centroid: f64) -> f64 {
    let variance: f64 = frequencies
        .iter()
        .zip(normalized)
        .map(|(f, p)| (f - centroid).powi(2) * p)
        .sum();
    variance.sqrt()
}

/// First frequency where cumulative normalized magnitude reaches 85%
///
/// Falls back to the highest bin when the threshold is never reached
/// (silent spectrum).
fn compute_rolloff(frequencies: &[f64], normalized: &[f64]) -> f64 {
    let mut cumulative = 0.0;
    for (i, p) in normalized.iter().enumerate() {
        cumulative += p;
        if cumulative >= ROLLOFF_THRESHOLD {
            return frequencies[i];
        }
    }
    frequencies[frequencies.len() - 1]
}

/// Spectral flatness: geometric_mean(|X|) / arithmetic_mean(|X|)
///
/// Returns a value between 0 (tonal) and 1 (noise-like).
fn compute_flatness(magnitudes: &[f64]) -> f64 {
    let n = magnitudes.len() as f64;
    let log_sum: f64 = magnitudes.iter().map(|m| (m + EPSILON).ln()).sum();
    let geometric_mean = (log_sum / n).exp();
    let arithmetic_mean = magnitudes.iter().sum::<f64>() / n;

    (geometric_mean / (arithmetic_mean + EPSILON)).clamp(0.0, 1.0)
}

/// Shannon entropy in bits of the normalized magnitude distribution
fn compute_entropy(normalized: &[f64]) -> f64 {
    let entropy: f64 = normalized
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|p| p * (p + EPSILON).log2())
        .sum();
    -entropy
}

/// Frequency of the first bin holding the maximum magnitude
fn compute_dominant_frequency(frequencies: &[f64], magnitudes: &[f64]) -> f64 {
    let mut best_index = 0;
    let mut best = f64::NEG_INFINITY;
    for (i, &mag) in magnitudes.iter().enumerate() {
        if mag > best {
            best = mag;
            best_index = i;
        }
    }
    frequencies[best_index]
}
