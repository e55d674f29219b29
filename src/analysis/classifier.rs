// Classifier - threshold and rule-based noise classification
//
// This module maps a smoothed decibel level onto one of three categories
// and, when spectral features are available, attaches a noise-type label.
//
// Level rules (default thresholds):
//   db < 50        -> Quiet
//   50 <= db < 70  -> Normal
//   db >= 70       -> Noisy
//
// The noise-type label is an ordered decision chain; the first matching
// rule wins even when several bands are comparably strong.
//
// Confidence is floored at 0.5. The floor is kept for compatibility with
// existing consumers and means confidence is not a calibrated probability.

use serde::{Deserialize, Serialize};

use crate::analysis::features::FeatureSet;
use crate::error::{ensure_finite, AnalysisError, Result};

/// Default upper bound (exclusive) of the Quiet band in dB
pub const DEFAULT_QUIET_UPPER_DB: f64 = 50.0;

/// Default upper bound (exclusive) of the Normal band in dB
pub const DEFAULT_NORMAL_UPPER_DB: f64 = 70.0;

/// dB above the Noisy threshold at which level confidence saturates
const NOISY_SATURATION_DB: f64 = 30.0;

/// Minimum reported confidence
const CONFIDENCE_FLOOR: f32 = 0.5;

/// Flatness below this reads as tonal (voice, music)
const TONAL_UPPER: f64 = 0.4;

/// Flatness above this reads as broadband noise
const NOISY_LOWER: f64 = 0.6;

/// Low-band ratio above which the signal is bass-dominated
const LOW_DOMINANT: f64 = 0.5;

/// Mid-band ratio above which the signal is voice/music-dominated
const MID_DOMINANT: f64 = 0.6;

/// High-band ratio above which the signal is hiss-dominated
const HIGH_DOMINANT: f64 = 0.4;

/// Spectral plausibility: base score and bonus for a matching signature
const SPECTRAL_BASE: f32 = 0.5;
const SPECTRAL_MATCH_BONUS: f32 = 0.3;

/// Noise level category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoiseCategory {
    /// Library, study room (< 50 dB)
    Quiet,
    /// Conversation, office (50-70 dB)
    Normal,
    /// Traffic, construction (>= 70 dB)
    Noisy,
}

/// Presentation metadata for a category
///
/// Static lookup for UI collaborators; carries no decision logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryInfo {
    /// Hex display color
    pub color: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

impl NoiseCategory {
    pub const ALL: [NoiseCategory; 3] = [
        NoiseCategory::Quiet,
        NoiseCategory::Normal,
        NoiseCategory::Noisy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoiseCategory::Quiet => "Quiet",
            NoiseCategory::Normal => "Normal",
            NoiseCategory::Noisy => "Noisy",
        }
    }

    pub fn info(&self) -> CategoryInfo {
        match self {
            NoiseCategory::Quiet => CategoryInfo {
                color: "#4CAF50",
                icon: "\u{1F7E2}",
                description: "Library, study room, quiet office (<50 dB)",
            },
            NoiseCategory::Normal => CategoryInfo {
                color: "#FFC107",
                icon: "\u{1F7E1}",
                description: "Conversation, cafeteria, normal office (50-70 dB)",
            },
            NoiseCategory::Noisy => CategoryInfo {
                color: "#F44336",
                icon: "\u{1F534}",
                description: "Traffic, construction, loud environment (>70 dB)",
            },
        }
    }
}

/// Descriptive noise type derived from spectral shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseType {
    WhiteNoise,
    TrafficMachinery,
    LowFrequencyRumble,
    VoiceMusic,
    GeneralEnvironmental,
    HighFrequencyNoise,
    TonalSound,
    MixedNoise,
}

impl NoiseType {
    pub fn label(&self) -> &'static str {
        match self {
            NoiseType::WhiteNoise => "white noise / static",
            NoiseType::TrafficMachinery => "traffic / heavy machinery",
            NoiseType::LowFrequencyRumble => "low-frequency rumble",
            NoiseType::VoiceMusic => "voice / music",
            NoiseType::GeneralEnvironmental => "general environmental noise",
            NoiseType::HighFrequencyNoise => "high-frequency noise",
            NoiseType::TonalSound => "tonal sound",
            NoiseType::MixedNoise => "mixed noise",
        }
    }
}

/// Result of classifying one chunk
///
/// A value object built fresh for every classification call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: NoiseCategory,
    /// Decibel level the category was derived from
    pub decibels: f64,
    /// Confidence score (0.5-1.0)
    pub confidence: f32,
    /// Spectral noise type, present for spectrum-aware classification
    pub noise_type: Option<NoiseType>,
    /// Human-readable label of `noise_type`, e.g. "voice / music"
    pub description: Option<String>,
    /// Features that produced `noise_type`
    pub features: Option<FeatureSet>,
}

impl ClassificationResult {
    /// Human-readable noise-type label, if any
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Category band edges in dB
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationThresholds {
    pub quiet_upper_db: f64,
    pub normal_upper_db: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            quiet_upper_db: DEFAULT_QUIET_UPPER_DB,
            normal_upper_db: DEFAULT_NORMAL_UPPER_DB,
        }
    }
}

impl ClassificationThresholds {
    pub fn new(quiet_upper_db: f64, normal_upper_db: f64) -> Result<Self> {
        let valid = quiet_upper_db.is_finite()
            && normal_upper_db.is_finite()
            && quiet_upper_db > 0.0
            && quiet_upper_db < normal_upper_db;
        if !valid {
            return Err(AnalysisError::InvalidConfig {
                reason: format!(
                    "classification thresholds must satisfy 0 < quiet < normal (got {} and {})",
                    quiet_upper_db, normal_upper_db
                ),
            });
        }

        Ok(Self {
            quiet_upper_db,
            normal_upper_db,
        })
    }
}

/// NoiseClassifier applies level thresholds and spectral rules
///
/// Stateless apart from its thresholds; safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoiseClassifier {
    thresholds: ClassificationThresholds,
}

impl NoiseClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: ClassificationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> ClassificationThresholds {
        self.thresholds
    }

    /// Classify by level alone
    ///
    /// # Errors
    /// `NonFiniteValue` or `NegativeValue` for an invalid `decibels`.
    pub fn classify_by_level(&self, decibels: f64) -> Result<ClassificationResult> {
        ensure_finite("decibels", decibels)?;
        if decibels < 0.0 {
            return Err(AnalysisError::NegativeValue {
                parameter: "decibels",
                value: decibels,
            });
        }

        let category = self.category_for(decibels);
        let confidence = self.level_confidence(decibels, category);

        Ok(ClassificationResult {
            category,
            decibels,
            confidence: (confidence as f32).clamp(CONFIDENCE_FLOOR, 1.0),
            noise_type: None,
            description: None,
            features: None,
        })
    }

    /// Classify by level and label the noise type from spectral features
    ///
    /// Confidence is the mean of the level confidence and a spectral
    /// plausibility score for the chosen category.
    ///
    /// # Errors
    /// Level errors as for `classify_by_level`, then any error from
    /// `FeatureSet::validate`.
    pub fn classify_with_spectrum(
        &self,
        decibels: f64,
        features: &FeatureSet,
    ) -> Result<ClassificationResult> {
        let base = self.classify_by_level(decibels)?;
        features.validate()?;

        let noise_type = self.describe_noise_type(features, decibels);
        let spectral_confidence = spectral_confidence(features, base.category);
        let confidence = ((base.confidence + spectral_confidence) / 2.0).min(1.0);

        Ok(ClassificationResult {
            confidence,
            noise_type: Some(noise_type),
            description: Some(noise_type.label().to_string()),
            features: Some(*features),
            ..base
        })
    }

    fn category_for(&self, decibels: f64) -> NoiseCategory {
        if decibels < self.thresholds.quiet_upper_db {
            NoiseCategory::Quiet
        } else if decibels < self.thresholds.normal_upper_db {
            NoiseCategory::Normal
        } else {
            NoiseCategory::Noisy
        }
    }

    /// Unfloored level confidence
    ///
    /// Quiet falls toward its upper edge, Normal peaks at the band centre,
    /// Noisy rises until NOISY_SATURATION_DB above its threshold.
    fn level_confidence(&self, decibels: f64, category: NoiseCategory) -> f64 {
        let quiet = self.thresholds.quiet_upper_db;
        let normal = self.thresholds.normal_upper_db;

        let confidence = match category {
            NoiseCategory::Quiet => 1.0 - decibels / quiet,
            NoiseCategory::Normal => {
                let midpoint = (quiet + normal) / 2.0;
                let half_width = (normal - quiet) / 2.0;
                1.0 - (decibels - midpoint).abs() / half_width
            }
            NoiseCategory::Noisy => (decibels - normal) / NOISY_SATURATION_DB,
        };

        confidence.clamp(0.0, 1.0)
    }

    /// Ordered decision chain; first match wins
    fn describe_noise_type(&self, features: &FeatureSet, decibels: f64) -> NoiseType {
        if features.flatness > NOISY_LOWER {
            return NoiseType::WhiteNoise;
        }

        if features.low_ratio > LOW_DOMINANT {
            return if decibels >= self.thresholds.normal_upper_db {
                NoiseType::TrafficMachinery
            } else {
                NoiseType::LowFrequencyRumble
            };
        }

        if features.mid_ratio > MID_DOMINANT {
            return if features.flatness < TONAL_UPPER {
                NoiseType::VoiceMusic
            } else {
                NoiseType::GeneralEnvironmental
            };
        }

        if features.high_ratio > HIGH_DOMINANT {
            return NoiseType::HighFrequencyNoise;
        }

        if features.flatness < TONAL_UPPER {
            NoiseType::TonalSound
        } else {
            NoiseType::MixedNoise
        }
    }
}

/// How well the spectral shape fits the expected signature of `category`
fn spectral_confidence(features: &FeatureSet, category: NoiseCategory) -> f32 {
    let matches = match category {
        // Quiet rooms are either a single hum (tonal) or near-flat silence
        NoiseCategory::Quiet => features.flatness < 0.3 || features.flatness > 0.8,
        NoiseCategory::Normal => features.mid_ratio > 0.4,
        NoiseCategory::Noisy => features.low_ratio > 0.3 || features.flatness > 0.5,
    };

    let score = if matches {
        SPECTRAL_BASE + SPECTRAL_MATCH_BONUS
    } else {
        SPECTRAL_BASE
    };
    score.min(1.0)
}

/// Level-only category with default thresholds
pub fn classify_noise(decibels: f64) -> Result<NoiseCategory> {
    Ok(NoiseClassifier::new().classify_by_level(decibels)?.category)
}

/// Spectrum-aware classification with default thresholds
pub fn classify_noise_with_spectrum(
    decibels: f64,
    features: &FeatureSet,
) -> Result<ClassificationResult> {
    NoiseClassifier::new().classify_with_spectrum(decibels, features)
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
