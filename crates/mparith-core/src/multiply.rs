//! Multiplication dispatch.
//!
//! Algorithm choice is a pure function of operand bit lengths and the
//! supplied [`Thresholds`]; each arm is a free function with the common
//! `(left, right, result, thresholds)` shape.

use serde::{Deserialize, Serialize};

use crate::arith::{multiply_grade_school, square_grade_school};
use crate::digits::MpInt;
use crate::error::MpResult;
use crate::schonhage::{multiply_schonhage_strassen, square_schonhage_strassen};
use crate::thresholds::Thresholds;
use crate::toom;

/// Multiplication algorithm selected for a pair of operand sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MulAlgorithm {
    /// Schoolbook O(n·m).
    GradeSchool,
    /// Toom-Cook splitting only the longer operand in two.
    Toom15,
    /// Toom-Cook 2-way (Karatsuba).
    Toom2,
    /// Toom-Cook 3-way by 2-way.
    Toom25,
    /// Toom-Cook 3-way.
    Toom3,
    /// Schönhage-Strassen with `2^log_num_parts` parts.
    SchonhageStrassen {
        /// Base-2 logarithm of the transform length.
        log_num_parts: u32,
    },
}

impl MulAlgorithm {
    /// Short label used in logs and benchmark names.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GradeSchool => "grade-school",
            Self::Toom15 => "toom-1.5",
            Self::Toom2 => "toom-2",
            Self::Toom25 => "toom-2.5",
            Self::Toom3 => "toom-3",
            Self::SchonhageStrassen { log_num_parts: 6 } => "ssa-64",
            Self::SchonhageStrassen { log_num_parts: 7 } => "ssa-128",
            Self::SchonhageStrassen { .. } => "ssa",
        }
    }
}

/// Choose the algorithm for operands of the given bit lengths.
#[must_use]
pub fn select_algorithm(left_bits: usize, right_bits: usize, thresholds: &Thresholds) -> MulAlgorithm {
    let (large, small) = if left_bits >= right_bits {
        (left_bits, right_bits)
    } else {
        (right_bits, left_bits)
    };
    if large < thresholds.toom2_min_bits {
        MulAlgorithm::GradeSchool
    } else if large < thresholds.toom3_min_bits {
        if small < large / 2 {
            MulAlgorithm::Toom15
        } else {
            MulAlgorithm::Toom2
        }
    } else if large < thresholds.ssa6_min_bits {
        if small < large * 2 / 3 {
            MulAlgorithm::Toom25
        } else {
            MulAlgorithm::Toom3
        }
    } else if large < thresholds.ssa7_min_bits {
        MulAlgorithm::SchonhageStrassen { log_num_parts: 6 }
    } else {
        MulAlgorithm::SchonhageStrassen { log_num_parts: 7 }
    }
}

/// Choose the squaring algorithm for an operand of `bits` bits.
#[must_use]
pub fn select_square_algorithm(bits: usize, thresholds: &Thresholds) -> MulAlgorithm {
    if bits < thresholds.toom2_min_bits {
        MulAlgorithm::GradeSchool
    } else if bits < thresholds.toom3_min_bits {
        MulAlgorithm::Toom2
    } else if bits < thresholds.ssa6_min_bits {
        MulAlgorithm::Toom3
    } else if bits < thresholds.ssa7_min_bits {
        MulAlgorithm::SchonhageStrassen { log_num_parts: 6 }
    } else {
        MulAlgorithm::SchonhageStrassen { log_num_parts: 7 }
    }
}

/// `result = |left| · |right|`.
///
/// Passing the same reference twice squares.
pub fn multiply_magnitudes(
    left: &MpInt,
    right: &MpInt,
    result: &mut MpInt,
    thresholds: &Thresholds,
) -> MpResult<()> {
    if left.is_zero() || right.is_zero() {
        result.set_zero();
        return Ok(());
    }
    if std::ptr::eq(left, right) {
        return square_magnitude(left, result, thresholds);
    }
    let algorithm = select_algorithm(left.num_bits(), right.num_bits(), thresholds);
    multiply_with(algorithm, left, right, result, thresholds)
}

/// `result = |x|²`.
pub fn square_magnitude(x: &MpInt, result: &mut MpInt, thresholds: &Thresholds) -> MpResult<()> {
    if x.is_zero() {
        result.set_zero();
        return Ok(());
    }
    let algorithm = select_square_algorithm(x.num_bits(), thresholds);
    square_with(algorithm, x, result, thresholds)
}

/// `result = |left| · |right|` with a forced top-level algorithm.
/// Recursive sub-products still go through the dispatcher.
pub fn multiply_with(
    algorithm: MulAlgorithm,
    left: &MpInt,
    right: &MpInt,
    result: &mut MpInt,
    thresholds: &Thresholds,
) -> MpResult<()> {
    let (left, right) = if left.nonzero_len() >= right.nonzero_len() {
        (left, right)
    } else {
        (right, left)
    };
    match algorithm {
        MulAlgorithm::GradeSchool => {
            multiply_grade_school(left, right, result);
            Ok(())
        }
        MulAlgorithm::Toom15 => toom::multiply_toom15(left, right, result, thresholds),
        MulAlgorithm::Toom2 => toom::multiply_toom2(left, right, result, thresholds),
        MulAlgorithm::Toom25 => toom::multiply_toom25(left, right, result, thresholds),
        MulAlgorithm::Toom3 => toom::multiply_toom3(left, right, result, thresholds),
        MulAlgorithm::SchonhageStrassen { log_num_parts } => {
            multiply_schonhage_strassen(left, right, result, log_num_parts, thresholds)
        }
    }
}

/// `result = |x|²` with a forced top-level algorithm. The unbalanced Toom
/// variants have no squaring form and fall back to their balanced ones.
pub fn square_with(
    algorithm: MulAlgorithm,
    x: &MpInt,
    result: &mut MpInt,
    thresholds: &Thresholds,
) -> MpResult<()> {
    match algorithm {
        MulAlgorithm::GradeSchool => {
            square_grade_school(x, result);
            Ok(())
        }
        MulAlgorithm::Toom15 | MulAlgorithm::Toom2 => toom::square_toom2(x, result, thresholds),
        MulAlgorithm::Toom25 | MulAlgorithm::Toom3 => toom::square_toom3(x, result, thresholds),
        MulAlgorithm::SchonhageStrassen { log_num_parts } => {
            square_schonhage_strassen(x, result, log_num_parts, thresholds)
        }
    }
}

/// Signed product `result = left · right`.
pub fn multiply(
    left: &MpInt,
    right: &MpInt,
    result: &mut MpInt,
    thresholds: &Thresholds,
) -> MpResult<()> {
    let negative = left.negative != right.negative;
    multiply_magnitudes(left, right, result, thresholds)?;
    result.negative = negative;
    result.normalize_zero();
    Ok(())
}

impl MpInt {
    /// `result = self · rhs` using the installed thresholds.
    pub fn mul_into(&self, rhs: &Self, result: &mut Self) -> MpResult<()> {
        multiply(self, rhs, result, &Thresholds::current())
    }

    /// `result = self · rhs` using explicit thresholds.
    pub fn mul_into_with(&self, rhs: &Self, result: &mut Self, thresholds: &Thresholds) -> MpResult<()> {
        multiply(self, rhs, result, thresholds)
    }

    /// Product as a new value.
    pub fn checked_mul(&self, rhs: &Self) -> MpResult<Self> {
        let mut result = Self::new();
        self.mul_into(rhs, &mut result)?;
        Ok(result)
    }

    /// `self · self` through the squaring dispatcher.
    pub fn square(&self) -> MpResult<Self> {
        let mut result = Self::new();
        square_magnitude(self, &mut result, &Thresholds::current())?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_thresholds() -> Thresholds {
        Thresholds {
            toom2_min_bits: 200,
            toom3_min_bits: 600,
            ssa6_min_bits: 3_000,
            ssa7_min_bits: 9_000,
            ssa_mod_fermat_min_bits: 1_024,
            newton_division_min_bits: 64,
            negacyclic_check_max_bits: 1 << 16,
        }
    }

    fn pattern(bits: usize, seed: u32) -> MpInt {
        let mut x = MpInt::new();
        let mut state = seed.wrapping_mul(2_654_435_761).max(1);
        for i in 0..bits {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            x.set_bit(i, state & 1 == 1);
        }
        x.set_bit(bits - 1, true);
        x
    }

    #[test]
    fn selection_follows_thresholds() {
        let t = Thresholds::default();
        assert_eq!(select_algorithm(100, 100, &t), MulAlgorithm::GradeSchool);
        assert_eq!(select_algorithm(10_000, 10_000, &t), MulAlgorithm::Toom2);
        assert_eq!(select_algorithm(10_000, 3_000, &t), MulAlgorithm::Toom15);
        assert_eq!(select_algorithm(3_000, 10_000, &t), MulAlgorithm::Toom15);
        assert_eq!(select_algorithm(100_000, 90_000, &t), MulAlgorithm::Toom3);
        assert_eq!(select_algorithm(100_000, 50_000, &t), MulAlgorithm::Toom25);
        assert_eq!(
            select_algorithm(20_000_000, 20_000_000, &t),
            MulAlgorithm::SchonhageStrassen { log_num_parts: 6 }
        );
        assert_eq!(
            select_algorithm(60_000_000, 10, &t),
            MulAlgorithm::SchonhageStrassen { log_num_parts: 7 }
        );
    }

    #[test]
    fn square_selection_follows_thresholds() {
        let t = Thresholds::default();
        assert_eq!(select_square_algorithm(1_000, &t), MulAlgorithm::GradeSchool);
        assert_eq!(select_square_algorithm(5_000, &t), MulAlgorithm::Toom2);
        assert_eq!(select_square_algorithm(500_000, &t), MulAlgorithm::Toom3);
    }

    #[test]
    fn every_algorithm_matches_grade_school() {
        let t = small_thresholds();
        let algorithms = [
            MulAlgorithm::Toom15,
            MulAlgorithm::Toom2,
            MulAlgorithm::Toom25,
            MulAlgorithm::Toom3,
            MulAlgorithm::SchonhageStrassen { log_num_parts: 2 },
            MulAlgorithm::SchonhageStrassen { log_num_parts: 4 },
        ];
        for &(lb, rb) in &[(700, 700), (1_500, 400), (2_100, 1_900), (4_000, 90)] {
            let a = pattern(lb, 3);
            let b = pattern(rb, 11);
            let mut expected = MpInt::new();
            multiply_grade_school(&a, &b, &mut expected);
            for &alg in &algorithms {
                let mut got = MpInt::new();
                multiply_with(alg, &a, &b, &mut got, &t).unwrap();
                assert_eq!(got, expected, "{} at {lb}x{rb}", alg.name());
            }
        }
    }

    #[test]
    fn every_square_matches_grade_school() {
        let t = small_thresholds();
        for bits in [250, 900, 3_500] {
            let a = pattern(bits, 7);
            let mut expected = MpInt::new();
            square_grade_school(&a, &mut expected);
            for alg in [
                MulAlgorithm::Toom2,
                MulAlgorithm::Toom3,
                MulAlgorithm::SchonhageStrassen { log_num_parts: 3 },
            ] {
                let mut got = MpInt::new();
                square_with(alg, &a, &mut got, &t).unwrap();
                assert_eq!(got, expected, "{} at {bits}", alg.name());
            }
        }
    }

    #[test]
    fn identical_operands_square() {
        let t = small_thresholds();
        let a = pattern(5_000, 5);
        let copy = a.clone();
        let mut via_square = MpInt::new();
        let mut via_product = MpInt::new();
        multiply_magnitudes(&a, &a, &mut via_square, &t).unwrap();
        multiply_magnitudes(&a, &copy, &mut via_product, &t).unwrap();
        assert_eq!(via_square, via_product);
    }

    #[test]
    fn signed_product() {
        let t = Thresholds::default();
        let mut out = MpInt::new();
        multiply(&MpInt::from(-6), &MpInt::from(7), &mut out, &t).unwrap();
        assert_eq!(out, MpInt::from(-42));
        multiply(&MpInt::from(-6), &MpInt::new(), &mut out, &t).unwrap();
        assert!(out.is_zero());
        assert!(!out.is_negative());
    }

    #[test]
    fn decimal_example_product() {
        let a: MpInt = "123456789012345678901234567890".parse().unwrap();
        let b: MpInt = "987654321098765432109876543210".parse().unwrap();
        assert_eq!(
            a.checked_mul(&b).unwrap().to_string(),
            "121932631137021795226185032733622923332237463801111263526900"
        );
    }
}
