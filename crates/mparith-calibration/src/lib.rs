//! # mparith-calibration
//!
//! Benchmarks that locate the crossover points between multiplication and
//! division algorithms, and the JSON profile that persists them.

pub mod calibration;
pub mod error;
pub mod io;
pub mod microbench;
pub mod profile;
pub mod runner;

pub use calibration::{CalibrationEngine, CalibrationMode, CalibrationProgress};
pub use error::CalibrationError;
pub use profile::CalibrationProfile;
