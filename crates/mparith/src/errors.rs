//! Exit codes for failed commands.

use mparith_calibration::CalibrationError;
use mparith_core::exit_codes;
use mparith_core::MpError;

/// Map an arithmetic error to its exit code.
#[must_use]
pub fn arithmetic_exit_code(err: &MpError) -> i32 {
    match err {
        MpError::InvalidArgument(_) | MpError::Parse(_) => exit_codes::ERROR_INVALID_INPUT,
        MpError::DivideByZero | MpError::NotInvertible | MpError::Overflow(_) => {
            exit_codes::ERROR_ARITHMETIC
        }
        MpError::InvariantViolation(_) => exit_codes::ERROR_GENERIC,
    }
}

/// Exit code for an error returned by [`crate::app::run`].
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(mp) = err.downcast_ref::<MpError>() {
        return arithmetic_exit_code(mp);
    }
    match err.downcast_ref::<CalibrationError>() {
        Some(CalibrationError::Arithmetic(mp)) => arithmetic_exit_code(mp),
        Some(_) => exit_codes::ERROR_CONFIG,
        None => exit_codes::ERROR_GENERIC,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_codes() {
        assert_eq!(arithmetic_exit_code(&MpError::DivideByZero), 3);
        assert_eq!(arithmetic_exit_code(&MpError::NotInvertible), 3);
        assert_eq!(arithmetic_exit_code(&MpError::Parse("x".into())), 2);
        assert_eq!(
            arithmetic_exit_code(&MpError::InvariantViolation("x".into())),
            1
        );
    }

    #[test]
    fn wrapped_errors_keep_their_code() {
        let err = anyhow::Error::new(MpError::DivideByZero).context("dividing");
        assert_eq!(exit_code(&err), exit_codes::ERROR_ARITHMETIC);

        let err = anyhow::Error::new(CalibrationError::Rejected("old".into()));
        assert_eq!(exit_code(&err), exit_codes::ERROR_CONFIG);

        assert_eq!(exit_code(&anyhow::anyhow!("other")), exit_codes::ERROR_GENERIC);
    }
}
