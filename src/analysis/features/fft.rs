// FFT module - Fast Fourier Transform computation
//
// This module handles FFT computation with Hamming windowing to reduce
// spectral leakage from the implicit rectangular window of capture chunks.
// The magnitude half-spectrum feeds the spectral descriptors.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;

use crate::error::{AnalysisError, Result};

/// Default FFT size for spectral analysis
pub const DEFAULT_FFT_SIZE: usize = 2048;

/// Validate an FFT size and round it up to a power of two
///
/// Returns `InvalidSize` for zero or for a size with no representable
/// power of two above it.
pub fn normalize_fft_size(nfft: usize) -> Result<usize> {
    if nfft == 0 {
        return Err(AnalysisError::InvalidSize {
            parameter: "nfft",
            value: nfft,
        });
    }
    if nfft.is_power_of_two() {
        return Ok(nfft);
    }

    let rounded = nfft
        .checked_next_power_of_two()
        .ok_or(AnalysisError::InvalidSize {
            parameter: "nfft",
            value: nfft,
        })?;
    tracing::warn!(
        "[FftProcessor] FFT size {} is not a power of 2, using {}",
        nfft,
        rounded
    );
    Ok(rounded)
}

/// FFT processor that computes magnitude half-spectra of one fixed size
///
/// The forward plan is built once and shared between clones.
#[derive(Clone)]
pub struct FftProcessor {
    fft: Arc<dyn Fft<f64>>,
    fft_size: usize,
}

impl FftProcessor {
    /// Plan a forward FFT of `fft_size` points
    ///
    /// # Errors
    /// `InvalidSize` when `fft_size` is zero or cannot be rounded up to a
    /// power of two.
    pub fn new(fft_size: usize) -> Result<Self> {
        let fft_size = normalize_fft_size(fft_size)?;
        let mut planner = FftPlanner::new();

        Ok(Self {
            fft: planner.plan_fft_forward(fft_size),
            fft_size,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Window, pad or truncate, transform, and keep `fft_size / 2 + 1` magnitudes
    pub fn magnitude_spectrum(&self, samples: &[f32]) -> Vec<f64> {
        let mut buffer = windowed_input(samples, self.fft_size);
        self.fft.process(&mut buffer);
        half_spectrum_magnitudes(&buffer)
    }
}

impl fmt::Debug for FftProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftProcessor")
            .field("fft_size", &self.fft_size)
            .finish()
    }
}

/// Hamming window coefficients: w(n) = 0.54 - 0.46 cos(2πn / (N-1))
///
/// A single-sample window is `[1.0]`.
pub fn hamming_window(len: usize) -> Vec<f64> {
    if len == 1 {
        return vec![1.0];
    }

    let denom = (len - 1) as f64;
    (0..len)
        .map(|n| 0.54 - 0.46 * ((2.0 * std::f64::consts::PI * n as f64) / denom).cos())
        .collect()
}

/// Window `samples` over their full length, then zero-pad or truncate to `nfft`
pub fn windowed_input(samples: &[f32], nfft: usize) -> Vec<Complex<f64>> {
    let window = hamming_window(samples.len());

    let mut buffer: Vec<Complex<f64>> = samples
        .iter()
        .zip(window.iter())
        .take(nfft)
        .map(|(&s, &w)| Complex::new(s as f64 * w, 0.0))
        .collect();

    buffer.resize(nfft, Complex::new(0.0, 0.0));
    buffer
}

/// Magnitudes of the non-negative-frequency half (`nfft / 2 + 1` bins)
pub fn half_spectrum_magnitudes(spectrum: &[Complex<f64>]) -> Vec<f64> {
    let bins = spectrum.len() / 2 + 1;
    spectrum[..bins.min(spectrum.len())]
        .iter()
        .map(|c| c.norm())
        .collect()
}

/// Bin centre frequencies for a real FFT of size `nfft` (numpy `rfftfreq`)
pub fn rfft_frequencies(nfft: usize, sample_rate: u32) -> Vec<f64> {
    // k / (nfft * dt) with dt = 1 / sample_rate
    let bins = nfft / 2 + 1;
    (0..bins)
        .map(|k| k as f64 * sample_rate as f64 / nfft as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Direct O(N^2) DFT magnitudes of an already-windowed real signal
    fn naive_dft_magnitudes(input: &[f64]) -> Vec<f64> {
        let n = input.len();
        (0..n / 2 + 1)
            .map(|k| {
                let bin: Complex<f64> = input
                    .iter()
                    .enumerate()
                    .map(|(t, &x)| {
                        let angle = -2.0 * std::f64::consts::PI * (k * t) as f64 / n as f64;
                        Complex::new(x * angle.cos(), x * angle.sin())
                    })
                    .sum();
                bin.norm()
            })
            .collect()
    }

    #[test]
    fn test_hamming_window_shape() {
        let window = hamming_window(5);
        assert!((window[0] - 0.08).abs() < 1e-12);
        assert!((window[2] - 1.0).abs() < 1e-12);
        assert!((window[4] - 0.08).abs() < 1e-12);
        assert_eq!(hamming_window(1), vec![1.0]);
        assert!(hamming_window(0).is_empty());
    }

    #[test]
    fn test_windowed_input_pads_and_truncates() {
        let padded = windowed_input(&[1.0; 3], 8);
        assert_eq!(padded.len(), 8);
        assert!(padded[3..].iter().all(|c| c.re == 0.0 && c.im == 0.0));

        let truncated = windowed_input(&[1.0; 16], 4);
        assert_eq!(truncated.len(), 4);
        // Window spans the full 16 samples, so the first kept value is the edge taper
        assert!((truncated[0].re - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_fft_size() {
        assert_eq!(normalize_fft_size(2048).unwrap(), 2048);
        assert_eq!(normalize_fft_size(1000).unwrap(), 1024);
        assert_eq!(normalize_fft_size(1).unwrap(), 1);
        assert_eq!(
            normalize_fft_size(0).unwrap_err(),
            AnalysisError::InvalidSize {
                parameter: "nfft",
                value: 0
            }
        );
        assert_eq!(
            normalize_fft_size(usize::MAX).unwrap_err(),
            AnalysisError::InvalidSize {
                parameter: "nfft",
                value: usize::MAX
            }
        );
        assert!(normalize_fft_size((1usize << (usize::BITS - 1)) + 1).is_err());
    }

    #[test]
    fn test_impulse_spectrum_is_flat() {
        let processor = FftProcessor::new(16).unwrap();
        // One sample windows to 1.0, then zero padding
        let magnitudes = processor.magnitude_spectrum(&[1.0]);
        assert_eq!(magnitudes.len(), 9);
        for m in magnitudes {
            assert!((m - 1.0).abs() < 1e-12, "{}", m);
        }
    }

    #[test]
    fn test_bin_centred_sinusoid_has_single_peak() {
        let n = 64;
        let k = 5;
        let processor = FftProcessor::new(n).unwrap();
        let signal: Vec<f32> = (0..n)
            .map(|t| (2.0 * std::f64::consts::PI * (k * t) as f64 / n as f64).cos() as f32)
            .collect();

        let magnitudes = processor.magnitude_spectrum(&signal);
        let peak = magnitudes
            .iter()
            .enumerate()
            .fold((0, 0.0), |best, (i, &m)| if m > best.1 { (i, m) } else { best });
        assert_eq!(peak.0, k);

        // Coherent gain of the Hamming window is ~0.54, halved for a real cosine
        let expected = hamming_window(n).iter().sum::<f64>() / 2.0;
        assert!((peak.1 - expected).abs() / expected < 0.02, "{} vs {}", peak.1, expected);
        assert!(magnitudes[k + 3] < peak.1 * 1e-2);
    }

    #[test]
    fn test_planned_fft_matches_direct_dft() {
        let n = 128;
        let signal: Vec<f32> = (0..100)
            .map(|i| {
                let t = i as f32;
                (0.3 * t).sin() + 0.5 * (1.7 * t).cos()
            })
            .collect();

        let processor = FftProcessor::new(n).unwrap();
        let planned = processor.magnitude_spectrum(&signal);

        let windowed: Vec<f64> = windowed_input(&signal, n).iter().map(|c| c.re).collect();
        let direct = naive_dft_magnitudes(&windowed);

        assert_eq!(planned.len(), direct.len());
        for (k, (a, b)) in planned.iter().zip(direct.iter()).enumerate() {
            assert!((a - b).abs() < 1e-9, "bin {} differs: {} vs {}", k, a, b);
        }
    }

    #[test]
    fn test_processor_clones_share_plan() {
        let processor = FftProcessor::new(1000).unwrap();
        assert_eq!(processor.fft_size(), 1024);

        let clone = processor.clone();
        let signal = [0.25_f32; 300];
        assert_eq!(clone.magnitude_spectrum(&signal), processor.magnitude_spectrum(&signal));
        assert_eq!(format!("{:?}", clone), "FftProcessor { fft_size: 1024 }");
    }

    #[test]
    fn test_rfft_frequencies() {
        let freqs = rfft_frequencies(8, 8000);
        assert_eq!(freqs, vec![0.0, 1000.0, 2000.0, 3000.0, 4000.0]);
    }
}
