// Analysis error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Analysis error code constants
///
/// Single source of truth for the numeric codes reported by `AnalysisError`.
///
/// Error code range: 3001-3010
pub struct AnalysisErrorCodes {}

impl AnalysisErrorCodes {
    /// A buffer or sequence that must be non-empty was empty
    pub const EMPTY_INPUT: i32 = 3001;

    /// A sample inside a buffer was NaN or infinite
    pub const NON_FINITE_SAMPLE: i32 = 3002;

    /// A scalar argument was NaN or infinite
    pub const NON_FINITE_VALUE: i32 = 3003;

    /// A scalar argument that must be non-negative was negative
    pub const NEGATIVE_VALUE: i32 = 3004;

    /// Two parallel sequences had different lengths
    pub const LENGTH_MISMATCH: i32 = 3005;

    /// A size parameter (window, FFT size) was zero
    pub const INVALID_SIZE: i32 = 3006;

    /// Sample rate was not strictly positive
    pub const INVALID_SAMPLE_RATE: i32 = 3007;

    /// Configuration values were inconsistent
    pub const INVALID_CONFIG: i32 = 3008;

    /// A spectrum magnitude was negative
    pub const NEGATIVE_MAGNITUDE: i32 = 3009;

    /// A scalar argument was outside its valid range
    pub const OUT_OF_RANGE: i32 = 3010;
}

/// Broad error category
///
/// Every analysis failure is a contract violation by the caller, so there is
/// exactly one kind. Orchestrators are expected to log it and move on to the
/// next chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
}

/// Log an analysis error with structured context
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_analysis_error(err: &AnalysisError, context: &str) {
    error!(
        "Analysis error in {}: code={}, kind={:?}, message={}",
        context,
        err.code(),
        err.kind(),
        err.message()
    );
}

/// Errors raised by the level, smoothing, spectral and classification stages
///
/// Every variant identifies the offending parameter and, for buffer
/// contents, the index of the first bad element.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// A buffer or sequence that must be non-empty was empty
    EmptyInput { what: &'static str },

    /// A sample inside a buffer was NaN or infinite
    NonFiniteSample {
        what: &'static str,
        index: usize,
        value: f64,
    },

    /// A scalar argument was NaN or infinite
    NonFiniteValue { parameter: &'static str, value: f64 },

    /// A scalar argument that must be non-negative was negative
    NegativeValue { parameter: &'static str, value: f64 },

    /// Two parallel sequences had different lengths
    LengthMismatch {
        frequencies: usize,
        magnitudes: usize,
    },

    /// A size parameter was zero
    InvalidSize { parameter: &'static str, value: usize },

    /// Sample rate was not strictly positive
    InvalidSampleRate { sample_rate: u32 },

    /// Configuration values were inconsistent
    InvalidConfig { reason: String },

    /// A spectrum magnitude was negative
    NegativeMagnitude { index: usize, value: f64 },

    /// A scalar argument was outside `[min, max]`
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl AnalysisError {
    /// Category of this error (always `InvalidInput`)
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }

    /// Index of the offending element, when the error refers to one
    pub fn index(&self) -> Option<usize> {
        match self {
            AnalysisError::NonFiniteSample { index, .. }
            | AnalysisError::NegativeMagnitude { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl ErrorCode for AnalysisError {
    fn code(&self) -> i32 {
        match self {
            AnalysisError::EmptyInput { .. } => AnalysisErrorCodes::EMPTY_INPUT,
            AnalysisError::NonFiniteSample { .. } => AnalysisErrorCodes::NON_FINITE_SAMPLE,
            AnalysisError::NonFiniteValue { .. } => AnalysisErrorCodes::NON_FINITE_VALUE,
            AnalysisError::NegativeValue { .. } => AnalysisErrorCodes::NEGATIVE_VALUE,
            AnalysisError::LengthMismatch { .. } => AnalysisErrorCodes::LENGTH_MISMATCH,
            AnalysisError::InvalidSize { .. } => AnalysisErrorCodes::INVALID_SIZE,
            AnalysisError::InvalidSampleRate { .. } => AnalysisErrorCodes::INVALID_SAMPLE_RATE,
            AnalysisError::InvalidConfig { .. } => AnalysisErrorCodes::INVALID_CONFIG,
            AnalysisError::NegativeMagnitude { .. } => AnalysisErrorCodes::NEGATIVE_MAGNITUDE,
            AnalysisError::OutOfRange { .. } => AnalysisErrorCodes::OUT_OF_RANGE,
        }
    }

    fn message(&self) -> String {
        match self {
            AnalysisError::EmptyInput { what } => {
                format!("{} must not be empty", what)
            }
            AnalysisError::NonFiniteSample { what, index, value } => {
                format!("{} contains non-finite value {} at index {}", what, value, index)
            }
            AnalysisError::NonFiniteValue { parameter, value } => {
                format!("{} must be finite (got {})", parameter, value)
            }
            AnalysisError::NegativeValue { parameter, value } => {
                format!("{} must be non-negative (got {})", parameter, value)
            }
            AnalysisError::LengthMismatch {
                frequencies,
                magnitudes,
            } => format!(
                "frequencies and magnitudes must have the same length (got {} and {})",
                frequencies, magnitudes
            ),
            AnalysisError::InvalidSize { parameter, value } => {
                format!("{} must be a positive integer (got {})", parameter, value)
            }
            AnalysisError::InvalidSampleRate { sample_rate } => {
                format!("Sample rate must be positive (got {})", sample_rate)
            }
            AnalysisError::InvalidConfig { reason } => {
                format!("Invalid configuration: {}", reason)
            }
            AnalysisError::NegativeMagnitude { index, value } => {
                format!("magnitudes must be non-negative (got {} at index {})", value, index)
            }
            AnalysisError::OutOfRange {
                parameter,
                value,
                min,
                max,
            } => format!("{} must be in [{}, {}] (got {})", parameter, min, max, value),
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InvalidInput (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for AnalysisError {}

/// Reject NaN and infinities in a buffer, naming the first bad index
pub(crate) fn ensure_finite_samples(what: &'static str, samples: &[f32]) -> crate::error::Result<()> {
    match samples.iter().position(|s| !s.is_finite()) {
        Some(index) => Err(AnalysisError::NonFiniteSample {
            what,
            index,
            value: samples[index] as f64,
        }),
        None => Ok(()),
    }
}

/// Reject a NaN or infinite scalar
pub(crate) fn ensure_finite(parameter: &'static str, value: f64) -> crate::error::Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AnalysisError::NonFiniteValue { parameter, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_codes() {
        assert_eq!(
            AnalysisError::EmptyInput { what: "samples" }.code(),
            AnalysisErrorCodes::EMPTY_INPUT
        );
        assert_eq!(
            AnalysisError::NonFiniteSample {
                what: "samples",
                index: 3,
                value: f64::NAN
            }
            .code(),
            AnalysisErrorCodes::NON_FINITE_SAMPLE
        );
        assert_eq!(
            AnalysisError::LengthMismatch {
                frequencies: 2,
                magnitudes: 3
            }
            .code(),
            AnalysisErrorCodes::LENGTH_MISMATCH
        );
        assert_eq!(
            AnalysisError::InvalidSampleRate { sample_rate: 0 }.code(),
            AnalysisErrorCodes::INVALID_SAMPLE_RATE
        );
        assert_eq!(
            AnalysisError::InvalidConfig {
                reason: "x".to_string()
            }
            .code(),
            AnalysisErrorCodes::INVALID_CONFIG
        );
        assert_eq!(
            AnalysisError::OutOfRange {
                parameter: "features.low_ratio",
                value: 1.5,
                min: 0.0,
                max: 1.0
            }
            .code(),
            AnalysisErrorCodes::OUT_OF_RANGE
        );
    }

    #[test]
    fn test_every_error_is_invalid_input() {
        let errors = [
            AnalysisError::EmptyInput { what: "samples" },
            AnalysisError::NonFiniteValue {
                parameter: "rms",
                value: f64::INFINITY,
            },
            AnalysisError::NegativeValue {
                parameter: "rms",
                value: -1.0,
            },
            AnalysisError::InvalidSize {
                parameter: "window_size",
                value: 0,
            },
        ];
        for err in errors {
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
    }

    #[test]
    fn test_non_finite_sample_reports_index_and_value() {
        let samples = [0.1_f32, 0.2, f32::NAN, f32::INFINITY];
        let err = ensure_finite_samples("samples", &samples).unwrap_err();
        assert_eq!(err.index(), Some(2));
        let message = err.message();
        assert!(message.contains("index 2"), "message was {}", message);
        assert!(message.contains("NaN"), "message was {}", message);
    }

    #[test]
    fn test_analysis_error_display() {
        let err = AnalysisError::NegativeValue {
            parameter: "decibels",
            value: -3.0,
        };
        let display = format!("{}", err);
        assert!(display.contains("InvalidInput"));
        assert!(display.contains(&err.code().to_string()));
        assert!(display.contains("decibels"));
    }
}
