// Error types for the noise monitor core
//
// This module defines the structured error type returned by every analysis
// component. Each error carries a numeric code so orchestrators can report
// failures without matching on message text.

mod analysis;

pub use analysis::{log_analysis_error, AnalysisError, AnalysisErrorCodes, ErrorKind};
pub(crate) use analysis::{ensure_finite, ensure_finite_samples};

/// Result alias used throughout the analysis core
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// collaborator boundaries.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
