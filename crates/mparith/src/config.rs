//! Application configuration from CLI flags and environment.

use clap::{Args, Parser, Subcommand};

use mparith_core::{MpError, MpInt, Thresholds};

/// mparith: arbitrary-precision integer calculator.
#[derive(Parser, Debug)]
#[command(name = "mparith", version, about)]
pub struct AppConfig {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Print results in hexadecimal.
    #[arg(long, global = true)]
    pub hex: bool,

    /// Only print results.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Load thresholds from the saved calibration profile.
    #[arg(long, global = true, env = "MPARITH_PROFILE")]
    pub profile: bool,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,
}

/// Per-run threshold overrides in bits. Zero keeps the profile or default
/// value.
#[derive(Args, Debug, Clone, Default)]
pub struct ThresholdArgs {
    /// Toom-2 multiplication threshold.
    #[arg(long, global = true, default_value = "0", env = "MPARITH_TOOM2_THRESHOLD")]
    pub toom2_threshold: usize,

    /// Toom-3 multiplication threshold.
    #[arg(long, global = true, default_value = "0", env = "MPARITH_TOOM3_THRESHOLD")]
    pub toom3_threshold: usize,

    /// Schönhage-Strassen (64 parts) threshold.
    #[arg(long, global = true, default_value = "0", env = "MPARITH_SSA6_THRESHOLD")]
    pub ssa6_threshold: usize,

    /// Schönhage-Strassen (128 parts) threshold.
    #[arg(long, global = true, default_value = "0", env = "MPARITH_SSA7_THRESHOLD")]
    pub ssa7_threshold: usize,

    /// Recursive Fermat-ring product threshold.
    #[arg(
        long,
        global = true,
        default_value = "0",
        env = "MPARITH_SSA_MOD_FERMAT_THRESHOLD"
    )]
    pub ssa_mod_fermat_threshold: usize,

    /// Newton division threshold (dividend bits).
    #[arg(long, global = true, default_value = "0", env = "MPARITH_NEWTON_THRESHOLD")]
    pub newton_threshold: usize,
}

impl ThresholdArgs {
    /// `base` with every non-zero override applied, normalized.
    #[must_use]
    pub fn apply(&self, base: Thresholds) -> Thresholds {
        let pick = |value: usize, fallback: usize| if value == 0 { fallback } else { value };
        Thresholds {
            toom2_min_bits: pick(self.toom2_threshold, base.toom2_min_bits),
            toom3_min_bits: pick(self.toom3_threshold, base.toom3_min_bits),
            ssa6_min_bits: pick(self.ssa6_threshold, base.ssa6_min_bits),
            ssa7_min_bits: pick(self.ssa7_threshold, base.ssa7_min_bits),
            ssa_mod_fermat_min_bits: pick(
                self.ssa_mod_fermat_threshold,
                base.ssa_mod_fermat_min_bits,
            ),
            newton_division_min_bits: pick(self.newton_threshold, base.newton_division_min_bits),
            negacyclic_check_max_bits: base.negacyclic_check_max_bits,
        }
        .normalize()
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Product of two integers.
    #[command(allow_negative_numbers = true)]
    Mul {
        #[arg(value_parser = parse_operand)]
        a: MpInt,
        #[arg(value_parser = parse_operand)]
        b: MpInt,
    },
    /// Square of an integer.
    #[command(allow_negative_numbers = true)]
    Square {
        #[arg(value_parser = parse_operand)]
        x: MpInt,
    },
    /// Euclidean quotient and remainder, one per line.
    #[command(allow_negative_numbers = true)]
    Div {
        #[arg(value_parser = parse_operand)]
        a: MpInt,
        #[arg(value_parser = parse_operand)]
        b: MpInt,
    },
    /// Integer power.
    #[command(allow_negative_numbers = true)]
    Pow {
        #[arg(value_parser = parse_operand)]
        base: MpInt,
        exponent: u32,
    },
    /// Modular power `base^exponent mod modulus`.
    #[command(allow_negative_numbers = true)]
    Powmod {
        #[arg(value_parser = parse_operand)]
        base: MpInt,
        #[arg(value_parser = parse_operand)]
        exponent: MpInt,
        #[arg(value_parser = parse_operand)]
        modulus: MpInt,
    },
    /// Probabilistic primality test.
    #[command(allow_negative_numbers = true)]
    IsPrime {
        #[arg(value_parser = parse_operand)]
        n: MpInt,
        /// Acceptable probability of reporting a composite as prime.
        #[arg(long, default_value_t = mparith_core::constants::DEFAULT_FALSE_POSITIVE_PROBABILITY)]
        probability: f64,
    },
    /// Greatest common divisor.
    #[command(allow_negative_numbers = true)]
    Gcd {
        #[arg(value_parser = parse_operand)]
        a: MpInt,
        #[arg(value_parser = parse_operand)]
        b: MpInt,
    },
    /// Modular inverse of `a` modulo `m`.
    #[command(allow_negative_numbers = true)]
    Inverse {
        #[arg(value_parser = parse_operand)]
        a: MpInt,
        #[arg(value_parser = parse_operand)]
        m: MpInt,
    },
    /// Measure thresholds for this machine and save them as the profile.
    Calibrate {
        /// Benchmark every tier, Schönhage-Strassen included.
        #[arg(long)]
        full: bool,
        /// Print the measured profile without saving it.
        #[arg(long)]
        dry_run: bool,
    },
}

impl AppConfig {
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

/// Decimal, or hexadecimal with a `0x` prefix, each with an optional `-`.
pub fn parse_operand(text: &str) -> Result<MpInt, MpError> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    if digits.starts_with("0x") || digits.starts_with("0X") {
        MpInt::from_hex_str(trimmed)
    } else {
        trimmed.parse()
    }
}
