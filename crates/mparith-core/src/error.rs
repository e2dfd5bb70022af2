//! Error type shared by every engine operation.

/// Error type for multiprecision operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MpError {
    /// An argument is outside the domain of the operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A numeral could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Division or modulus by zero.
    #[error("division by zero")]
    DivideByZero,

    /// The value does not fit the requested machine integer.
    #[error("value does not fit in {0}")]
    Overflow(&'static str),

    /// The modular inverse does not exist.
    #[error("value is not invertible modulo the given modulus")]
    NotInvertible,

    /// An internal arithmetic identity failed to hold.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

/// Result alias used throughout the crate.
pub type MpResult<T> = Result<T, MpError>;
