//! # mparith-core
//!
//! Multiprecision signed integers with a tiered multiplication engine
//! (grade-school, Toom-Cook 1.5/2/2.5/3, Schönhage-Strassen over Fermat
//! rings), Newton-iteration division, a complex-FFT multiplier and
//! number-theoretic utilities.
//!
//! # Example
//! ```
//! use mparith_core::MpInt;
//!
//! let a: MpInt = "123456789012345678901234567890".parse().unwrap();
//! let b: MpInt = "987654321098765432109876543210".parse().unwrap();
//! assert_eq!(
//!     (&a * &b).to_string(),
//!     "121932631137021795226185032733622923332237463801111263526900"
//! );
//! assert_eq!(MpInt::from(-7) % MpInt::from(3), MpInt::from(2));
//! ```

pub mod arith;
pub mod complex;
pub mod complex_mul;
pub mod constants;
pub(crate) mod conversions;
pub mod digits;
pub mod division;
pub mod error;
pub mod fermat;
pub mod in_place;
pub mod math;
pub mod multiply;
pub(crate) mod ops;
pub(crate) mod random;
pub mod schonhage;
pub mod thresholds;
pub(crate) mod toom;

// Re-exports
pub use complex::{ComplexDouble, ComplexSequence};
pub use complex_mul::multiply_complex_fft;
pub use constants::exit_codes;
pub use digits::{Digit, DoubleDigit, MpInt, DIGIT_BITS, DIGIT_MASK};
pub use error::{MpError, MpResult};
pub use in_place::PingPong;
pub use math::{
    extended_euclidean, gcd, is_prime, is_prime_with, modular_inverse, pow, pow_mod,
    pow_mod_into, Bezout,
};
pub use multiply::{select_algorithm, select_square_algorithm, MulAlgorithm};
pub use thresholds::Thresholds;
