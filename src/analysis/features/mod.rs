// SpectralAnalyzer - FFT and spectral descriptors for noise classification
//
// This module turns a chunk of time-domain samples into a half-spectrum and
// derives the nine scalar descriptors the classifier consumes.
//
// Module organization:
// - types: Data structures (SpectralFrame, FeatureSet)
// - fft: Hamming window, planned FFT (FftProcessor), bin frequencies
// - spectral: Descriptor computation (centroid, spread, rolloff, flatness,
//   entropy, dominant frequency, band ratios)
// - mod.rs: Coordinator (SpectralAnalyzer)
//
// SpectralAnalyzer holds immutable configuration plus a planned FFT shared
// through an Arc, so clones may analyse independent buffers on other threads.

mod fft;
mod spectral;
mod types;

pub use fft::{FftProcessor, DEFAULT_FFT_SIZE};
pub use spectral::{FrequencyBands, DEFAULT_LOW_CUTOFF_HZ, DEFAULT_MID_CUTOFF_HZ};
pub use types::{FeatureSet, SpectralFrame};

use crate::error::{ensure_finite_samples, AnalysisError, Result};
use spectral::SpectralFeatures;

/// SpectralAnalyzer coordinates the FFT and feature extraction stages
#[derive(Debug, Clone)]
pub struct SpectralAnalyzer {
    sample_rate: u32,
    spectral_features: SpectralFeatures,
    fft: FftProcessor,
}

impl SpectralAnalyzer {
    /// Create an analyzer for audio captured at `sample_rate` Hz
    ///
    /// # Errors
    /// `InvalidSampleRate` when `sample_rate` is zero.
    pub fn new(sample_rate: u32) -> Result<Self> {
        Self::with_bands(sample_rate, FrequencyBands::default())
    }

    /// Create an analyzer with custom low/mid/high band cutoffs
    pub fn with_bands(sample_rate: u32, bands: FrequencyBands) -> Result<Self> {
        Self::with_fft_size(sample_rate, bands, DEFAULT_FFT_SIZE)
    }

    /// Create an analyzer whose FFT is planned for `fft_size` points
    ///
    /// # Errors
    /// `InvalidSampleRate` when `sample_rate` is zero, `InvalidSize` when
    /// `fft_size` is zero or too large to round up to a power of two.
    pub fn with_fft_size(sample_rate: u32, bands: FrequencyBands, fft_size: usize) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate { sample_rate });
        }

        Ok(Self {
            sample_rate,
            spectral_features: SpectralFeatures::new(bands),
            fft: FftProcessor::new(fft_size)?,
        })
    }

    /// Same bands and FFT plan, bin frequencies computed for another rate
    pub fn with_sample_rate(&self, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate { sample_rate });
        }

        Ok(Self {
            sample_rate,
            ..self.clone()
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bands(&self) -> FrequencyBands {
        self.spectral_features.bands()
    }

    /// Size of the planned FFT (already a power of two)
    pub fn fft_size(&self) -> usize {
        self.fft.fft_size()
    }

    /// Compute the non-negative-frequency half-spectrum of `samples`
    ///
    /// The Hamming window spans the whole input; the windowed signal is then
    /// zero-padded or truncated to `nfft`. A non-power-of-two `nfft` is
    /// rounded up to the next power of two. The planned FFT is reused when
    /// the rounded size matches it; other sizes are planned on demand.
    ///
    /// # Errors
    /// `EmptyInput` for an empty buffer, `InvalidSize` when `nfft` is zero or
    /// cannot be rounded up, `NonFiniteSample` naming the first NaN/infinite
    /// sample.
    pub fn transform(&self, samples: &[f32], nfft: usize) -> Result<SpectralFrame> {
        if samples.is_empty() {
            return Err(AnalysisError::EmptyInput { what: "samples" });
        }
        let nfft = fft::normalize_fft_size(nfft)?;
        ensure_finite_samples("samples", samples)?;

        let magnitudes = if nfft == self.fft.fft_size() {
            self.fft.magnitude_spectrum(samples)
        } else {
            tracing::debug!(
                "[SpectralAnalyzer] planning FFT of {} points (configured {})",
                nfft,
                self.fft.fft_size()
            );
            FftProcessor::new(nfft)?.magnitude_spectrum(samples)
        };

        Ok(SpectralFrame {
            frequencies: fft::rfft_frequencies(nfft, self.sample_rate),
            magnitudes,
            nfft,
        })
    }

    /// Derive the nine spectral descriptors from a half-spectrum
    pub fn extract_features(&self, frequencies: &[f64], magnitudes: &[f64]) -> Result<FeatureSet> {
        self.spectral_features.extract(frequencies, magnitudes)
    }

    /// Transform and extract in one call
    pub fn analyze(&self, samples: &[f32], nfft: usize) -> Result<(SpectralFrame, FeatureSet)> {
        let frame = self.transform(samples, nfft)?;
        let features = self.extract_features(&frame.frequencies, &frame.magnitudes)?;
        Ok((frame, features))
    }
}
