// Analysis module - per-chunk noise monitoring pipeline
//
// This module composes the four analysis stages into one synchronous call per
// chunk of captured audio.
//
// Architecture:
// - level: RMS to calibrated dB
// - smoothing: TrendSmoother (sliding mean over recent chunk levels)
// - features: SpectralAnalyzer (Hamming window, FFT, spectral descriptors)
// - classifier: NoiseClassifier (level thresholds + spectral decision chain)
//
// Pipeline: samples -> dB -> smoothed dB -> spectrum -> features -> result
//
// AnalysisPipeline owns the only mutable state (the smoother history) and is
// bound to one continuous stream. Call reset() before reusing it for an
// unrelated session. Scheduling and backpressure belong to the caller.

pub mod classifier;
pub mod features;
pub mod level;
pub mod smoothing;

use serde::{Deserialize, Serialize};

use crate::audio::SampleBuffer;
use crate::config::AppConfig;
use crate::error::{AnalysisError, Result};
use classifier::{ClassificationResult, NoiseClassifier};
use features::{FeatureSet, SpectralAnalyzer};
use level::{DecibelStats, LevelEstimator};
use smoothing::TrendSmoother;

/// Output of one pipeline step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkAnalysis {
    /// Timestamp of the chunk, copied from the input buffer
    pub timestamp_ms: u64,
    /// Calibrated level of this chunk alone
    pub instantaneous_db: f64,
    /// Sliding mean of recent chunk levels; drives the category
    pub smoothed_db: f64,
    pub classification: ClassificationResult,
}

/// Summary of an offline recording processed chunk by chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingReport {
    pub chunks: Vec<ChunkAnalysis>,
    /// Statistics over the smoothed per-chunk levels
    pub stats: DecibelStats,
    /// Classification of the mean level with whole-recording spectral features
    pub overall: ClassificationResult,
}

/// AnalysisPipeline turns chunks of samples into classifications
pub struct AnalysisPipeline {
    level: LevelEstimator,
    smoother: TrendSmoother,
    analyzer: SpectralAnalyzer,
    classifier: NoiseClassifier,
    chunk_ms: u64,
}

impl AnalysisPipeline {
    /// Build a pipeline from a validated configuration
    ///
    /// # Errors
    /// Any configuration error reported by `AppConfig::validate`.
    pub fn new(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            level: config.level_estimator()?,
            smoother: TrendSmoother::new(config.smoothing.window_size)?,
            analyzer: config.spectral_analyzer()?,
            classifier: NoiseClassifier::with_thresholds(config.thresholds()?),
            chunk_ms: config.audio.chunk_ms,
        })
    }

    /// Analyze one chunk
    ///
    /// All stages that can reject the chunk run before the smoother is
    /// updated, so an error leaves the trend history untouched and the
    /// caller can log it and continue with the next chunk.
    pub fn process(&mut self, chunk: &SampleBuffer) -> Result<ChunkAnalysis> {
        let instantaneous_db = self.level.decibels(chunk.samples())?;
        let features = self.spectral_features(chunk.samples(), chunk.sample_rate())?;

        let smoothed_db = self.smoother.add(instantaneous_db)?;
        let classification = self
            .classifier
            .classify_with_spectrum(smoothed_db, &features)?;

        tracing::debug!(
            timestamp_ms = chunk.timestamp_ms(),
            instantaneous_db,
            smoothed_db,
            category = classification.category.as_str(),
            "[AnalysisPipeline] chunk analyzed"
        );

        Ok(ChunkAnalysis {
            timestamp_ms: chunk.timestamp_ms(),
            instantaneous_db,
            smoothed_db,
            classification,
        })
    }

    /// Process a whole recording in `chunk_ms` slices
    ///
    /// Each recording is its own session: the trend history is cleared
    /// first, so earlier chunks or recordings never leak into the report.
    /// A recording shorter than one chunk is processed as a single chunk.
    /// Trailing samples that do not fill a chunk are ignored for the
    /// per-chunk series but still contribute to the overall spectrum.
    pub fn analyze_recording(&mut self, samples: &[f32], sample_rate: u32) -> Result<RecordingReport> {
        if samples.is_empty() {
            return Err(AnalysisError::EmptyInput { what: "recording" });
        }

        let mut buffers = SampleBuffer::split_into_chunks(samples, sample_rate, self.chunk_ms, 0)?;
        self.reset();
        if buffers.is_empty() {
            buffers.push(SampleBuffer::new(samples.to_vec(), sample_rate, 0));
        }

        let chunks = buffers
            .iter()
            .map(|buffer| self.process(buffer))
            .collect::<Result<Vec<_>>>()?;

        let levels: Vec<f64> = chunks.iter().map(|c| c.smoothed_db).collect();
        let stats = DecibelStats::from_values(&levels)?;

        let features = self.spectral_features(samples, sample_rate)?;
        let overall = self.classifier.classify_with_spectrum(stats.mean, &features)?;

        tracing::info!(
            chunks = chunks.len(),
            mean_db = stats.mean,
            category = overall.category.as_str(),
            "[AnalysisPipeline] recording analyzed"
        );

        Ok(RecordingReport {
            chunks,
            stats,
            overall,
        })
    }

    /// Clear the trend history
    pub fn reset(&mut self) {
        self.smoother.reset();
    }

    pub fn smoother(&self) -> &TrendSmoother {
        &self.smoother
    }

    pub fn fft_size(&self) -> usize {
        self.analyzer.fft_size()
    }

    fn spectral_features(&self, samples: &[f32], sample_rate: u32) -> Result<FeatureSet> {
        let fft_size = self.analyzer.fft_size();
        let (_, features) = if sample_rate == self.analyzer.sample_rate() {
            self.analyzer.analyze(samples, fft_size)?
        } else {
            self.analyzer
                .with_sample_rate(sample_rate)?
                .analyze(samples, fft_size)?
        };
        Ok(features)
    }
}
