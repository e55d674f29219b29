// Noise Monitor Core - environmental noise analysis engine
// Calibrated loudness, trend smoothing, spectral features and classification

// Module declarations
pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod logging;

// Re-exports for convenience
pub use analysis::classifier::{
    classify_noise, classify_noise_with_spectrum, ClassificationResult, NoiseCategory,
    NoiseClassifier, NoiseType,
};
pub use analysis::features::{FeatureSet, SpectralAnalyzer};
pub use analysis::level::LevelEstimator;
pub use analysis::smoothing::TrendSmoother;
pub use analysis::{AnalysisPipeline, ChunkAnalysis, RecordingReport};
pub use audio::SampleBuffer;
pub use config::AppConfig;
pub use error::{AnalysisError, ErrorKind};
