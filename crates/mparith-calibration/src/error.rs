//! Calibration error type.

use mparith_core::MpError;

/// Errors from benchmarking or profile persistence.
#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    /// Reading or writing the profile file failed.
    #[error("profile I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The profile file is not valid JSON for this format.
    #[error("profile format error: {0}")]
    Format(#[from] serde_json::Error),

    /// A benchmarked operation failed.
    #[error("benchmark arithmetic failed: {0}")]
    Arithmetic(#[from] MpError),

    /// The profile was read but cannot be used here.
    #[error("profile rejected: {0}")]
    Rejected(String),
}
