// SampleBuffer - one captured chunk of normalized microphone samples
//
// Produced by the capture collaborator and consumed read-only by the level
// and spectral stages. Samples are expected in [-1.0, 1.0]; the analysis
// stages validate finiteness themselves, so construction never fails.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Default capture sample rate (Hz)
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Default chunk duration handed to the pipeline (one second of audio)
pub const DEFAULT_CHUNK_MS: u64 = 1000;

/// An ordered chunk of f32 amplitudes with its sample rate and capture time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    /// Capture timestamp in milliseconds (collaborator-defined epoch)
    timestamp_ms: u64,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32, timestamp_ms: u64) -> Self {
        Self {
            samples,
            sample_rate,
            timestamp_ms,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration of the chunk in milliseconds (0 when the sample rate is 0)
    pub fn duration_ms(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 * 1000.0 / self.sample_rate as f64
    }

    /// Number of samples in a `chunk_ms` chunk at `sample_rate` Hz
    ///
    /// # Errors
    /// `InvalidConfig` when the sample count does not fit in `u64`/`usize`.
    pub fn chunk_len(sample_rate: u32, chunk_ms: u64) -> Result<usize> {
        chunk_ms
            .checked_mul(u64::from(sample_rate))
            .map(|product| product / 1000)
            .and_then(|len| usize::try_from(len).ok())
            .ok_or_else(|| AnalysisError::InvalidConfig {
                reason: format!(
                    "chunk of {} ms at {} Hz overflows the sample count",
                    chunk_ms, sample_rate
                ),
            })
    }

    /// Split a continuous recording into consecutive full chunks
    ///
    /// Trailing samples that do not fill a whole chunk are dropped. Each
    /// chunk's timestamp is offset from `start_ms` by its position in the
    /// recording.
    ///
    /// # Errors
    /// `InvalidConfig` when `chunk_ms` at `sample_rate` overflows.
    pub fn split_into_chunks(
        samples: &[f32],
        sample_rate: u32,
        chunk_ms: u64,
        start_ms: u64,
    ) -> Result<Vec<SampleBuffer>> {
        let chunk_len = Self::chunk_len(sample_rate, chunk_ms)?;
        if chunk_len == 0 {
            return Ok(Vec::new());
        }

        Ok(samples
            .chunks_exact(chunk_len)
            .enumerate()
            .map(|(i, chunk)| {
                let offset = (i as u64).saturating_mul(chunk_ms);
                SampleBuffer::new(chunk.to_vec(), sample_rate, start_ms.saturating_add(offset))
            })
            .collect())
    }
}
