//! Tunable algorithm-selection thresholds.
//!
//! Thresholds affect speed only. A process-wide copy is installed with
//! [`Thresholds::install`] (typically from a calibration profile) and read
//! once at the entry of each public operation; the algorithms themselves
//! receive `&Thresholds` explicitly.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_NEGACYCLIC_CHECK_MAX_BITS, DEFAULT_NEWTON_DIVISION_THRESHOLD,
    DEFAULT_SSA6_THRESHOLD, DEFAULT_SSA7_THRESHOLD, DEFAULT_SSA_MOD_FERMAT_THRESHOLD,
    DEFAULT_TOOM2_THRESHOLD, DEFAULT_TOOM3_THRESHOLD, MIN_NEWTON_DIVISION_THRESHOLD,
    MIN_SSA_MOD_FERMAT_THRESHOLD, MIN_TOOM2_THRESHOLD,
};

/// Bit-length thresholds for multiplication and division dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Grade-school below, Toom-1.5/Toom-2 above.
    pub toom2_min_bits: usize,
    /// Toom-2.5/Toom-3 above.
    pub toom3_min_bits: usize,
    /// Schönhage-Strassen with 2^6 parts above.
    pub ssa6_min_bits: usize,
    /// Schönhage-Strassen with 2^7 parts above.
    pub ssa7_min_bits: usize,
    /// Recursive Schönhage-Strassen for products modulo a Fermat number above.
    #[serde(default = "default_ssa_mod_fermat")]
    pub ssa_mod_fermat_min_bits: usize,
    /// Newton-iteration division above (dividend bits).
    pub newton_division_min_bits: usize,
    /// Largest Fermat exponent cross-checked against the direct convolution.
    #[serde(default)]
    pub negacyclic_check_max_bits: usize,
}

fn default_ssa_mod_fermat() -> usize {
    DEFAULT_SSA_MOD_FERMAT_THRESHOLD
}

static CURRENT: RwLock<Thresholds> = parking_lot::const_rwlock(Thresholds::DEFAULT);

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Thresholds {
    /// Built-in defaults.
    pub const DEFAULT: Self = Self {
        toom2_min_bits: DEFAULT_TOOM2_THRESHOLD,
        toom3_min_bits: DEFAULT_TOOM3_THRESHOLD,
        ssa6_min_bits: DEFAULT_SSA6_THRESHOLD,
        ssa7_min_bits: DEFAULT_SSA7_THRESHOLD,
        ssa_mod_fermat_min_bits: DEFAULT_SSA_MOD_FERMAT_THRESHOLD,
        newton_division_min_bits: DEFAULT_NEWTON_DIVISION_THRESHOLD,
        negacyclic_check_max_bits: DEFAULT_NEGACYCLIC_CHECK_MAX_BITS,
    };

    /// The process-wide thresholds.
    #[must_use]
    pub fn current() -> Self {
        *CURRENT.read()
    }

    /// Replace the process-wide thresholds with a normalized copy of `self`.
    pub fn install(self) {
        let normalized = self.normalize();
        tracing::debug!(?normalized, "installing thresholds");
        *CURRENT.write() = normalized;
    }

    /// Restore the built-in defaults process-wide.
    pub fn reset() {
        *CURRENT.write() = Self::DEFAULT;
    }

    /// Apply defaults where values are zero, clamp to the smallest values
    /// for which recursion still shrinks, and restore ascending order.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.toom2_min_bits == 0 {
            self.toom2_min_bits = DEFAULT_TOOM2_THRESHOLD;
        }
        if self.toom3_min_bits == 0 {
            self.toom3_min_bits = DEFAULT_TOOM3_THRESHOLD;
        }
        if self.ssa6_min_bits == 0 {
            self.ssa6_min_bits = DEFAULT_SSA6_THRESHOLD;
        }
        if self.ssa7_min_bits == 0 {
            self.ssa7_min_bits = DEFAULT_SSA7_THRESHOLD;
        }
        if self.ssa_mod_fermat_min_bits == 0 {
            self.ssa_mod_fermat_min_bits = DEFAULT_SSA_MOD_FERMAT_THRESHOLD;
        }
        if self.newton_division_min_bits == 0 {
            self.newton_division_min_bits = DEFAULT_NEWTON_DIVISION_THRESHOLD;
        }

        self.toom2_min_bits = self.toom2_min_bits.max(MIN_TOOM2_THRESHOLD);
        self.toom3_min_bits = self.toom3_min_bits.max(self.toom2_min_bits);
        self.ssa6_min_bits = self.ssa6_min_bits.max(self.toom3_min_bits);
        self.ssa7_min_bits = self.ssa7_min_bits.max(self.ssa6_min_bits);
        self.ssa_mod_fermat_min_bits = self
            .ssa_mod_fermat_min_bits
            .max(MIN_SSA_MOD_FERMAT_THRESHOLD);
        self.newton_division_min_bits = self
            .newton_division_min_bits
            .max(MIN_NEWTON_DIVISION_THRESHOLD);
        self
    }

    /// Check that thresholds are ascending and above their minimums.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.toom2_min_bits >= MIN_TOOM2_THRESHOLD
            && self.toom2_min_bits <= self.toom3_min_bits
            && self.toom3_min_bits <= self.ssa6_min_bits
            && self.ssa6_min_bits <= self.ssa7_min_bits
            && self.ssa_mod_fermat_min_bits >= MIN_SSA_MOD_FERMAT_THRESHOLD
            && self.newton_division_min_bits >= MIN_NEWTON_DIVISION_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Thresholds::default().is_valid());
        assert_eq!(Thresholds::default().toom2_min_bits, DEFAULT_TOOM2_THRESHOLD);
    }

    #[test]
    fn normalize_zero_uses_defaults() {
        let t = Thresholds {
            toom2_min_bits: 0,
            toom3_min_bits: 0,
            ssa6_min_bits: 0,
            ssa7_min_bits: 0,
            ssa_mod_fermat_min_bits: 0,
            newton_division_min_bits: 0,
            negacyclic_check_max_bits: 0,
        }
        .normalize();
        assert_eq!(t.toom3_min_bits, DEFAULT_TOOM3_THRESHOLD);
        assert_eq!(t.newton_division_min_bits, DEFAULT_NEWTON_DIVISION_THRESHOLD);
        assert!(t.is_valid());
    }

    #[test]
    fn normalize_restores_order() {
        let t = Thresholds {
            toom2_min_bits: 10,
            toom3_min_bits: 5,
            ssa6_min_bits: 7,
            ssa7_min_bits: 6,
            ..Thresholds::default()
        }
        .normalize();
        assert_eq!(t.toom2_min_bits, MIN_TOOM2_THRESHOLD);
        assert!(t.is_valid());
    }

    #[test]
    fn serde_fills_optional_fields() {
        let json = r#"{"toom2_min_bits":3000,"toom3_min_bits":90000,
            "ssa6_min_bits":9000000,"ssa7_min_bits":40000000,
            "newton_division_min_bits":300000}"#;
        let t: Thresholds = serde_json::from_str(json).unwrap();
        assert_eq!(t.ssa_mod_fermat_min_bits, DEFAULT_SSA_MOD_FERMAT_THRESHOLD);
        assert_eq!(t.negacyclic_check_max_bits, 0);
        assert!(t.is_valid());
    }
}
