//! Constants for algorithm thresholds and numeric tuning.

/// Default threshold (in bits) above which Toom-Cook 2-way variants replace
/// grade-school multiplication.
pub const DEFAULT_TOOM2_THRESHOLD: usize = 2_500;

/// Default threshold (in bits) above which the 2.5/3-way Toom-Cook variants
/// replace the 1.5/2-way ones.
pub const DEFAULT_TOOM3_THRESHOLD: usize = 80_000;

/// Default threshold (in bits) for Schönhage-Strassen with 64 parts.
pub const DEFAULT_SSA6_THRESHOLD: usize = 10_000_000;

/// Default threshold (in bits) for Schönhage-Strassen with 128 parts.
pub const DEFAULT_SSA7_THRESHOLD: usize = 50_000_000;

/// Default operand size (in bits) below which products modulo a Fermat
/// number are computed by plain multiplication followed by reduction.
pub const DEFAULT_SSA_MOD_FERMAT_THRESHOLD: usize = 70_000;

/// Default dividend size (in bits) above which Newton-iteration division
/// replaces long division.
pub const DEFAULT_NEWTON_DIVISION_THRESHOLD: usize = 350_000;

/// Largest Fermat exponent for which the convolution cross-check runs by
/// default. Zero disables the check.
pub const DEFAULT_NEGACYCLIC_CHECK_MAX_BITS: usize = if cfg!(debug_assertions) {
    1 << 14
} else {
    0
};

/// Smallest accepted Toom-2 threshold; smaller splits would not shrink.
pub const MIN_TOOM2_THRESHOLD: usize = 4 * crate::digits::DIGIT_BITS;

/// Smallest accepted modulo-Fermat threshold.
pub const MIN_SSA_MOD_FERMAT_THRESHOLD: usize = 1_024;

/// Smallest accepted Newton threshold.
pub const MIN_NEWTON_DIVISION_THRESHOLD: usize = 64;

/// Bits packed into each complex sample by the complex-FFT multiplier.
pub const BITS_PER_COMPLEX_DOUBLE: u32 = 10;

/// Guard bits carried by Newton-iteration division.
pub const NEWTON_GUARD_BITS: usize = 8;

/// Numbers with at most this many bits are tested for primality by trial
/// division.
pub const TRIAL_DIVISION_MAX_BITS: usize = 20;

/// Default false-positive bound for Miller-Rabin.
pub const DEFAULT_FALSE_POSITIVE_PROBABILITY: f64 = 1e-6;

/// Exit codes used by the command-line front end.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// Malformed or out-of-domain input.
    pub const ERROR_INVALID_INPUT: i32 = 2;
    /// Arithmetic fault such as division by zero.
    pub const ERROR_ARITHMETIC: i32 = 3;
    /// Invalid configuration.
    pub const ERROR_CONFIG: i32 = 4;
}
