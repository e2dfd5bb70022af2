//! Division dispatch and Newton-iteration division.
//!
//! Signed division follows the Euclidean convention: the remainder is
//! always in `[0, |divisor|)`.

use std::cmp::Ordering;

use tracing::{debug, trace};

use crate::arith::divide_grade_school;
use crate::constants::NEWTON_GUARD_BITS;
use crate::digits::MpInt;
use crate::error::{MpError, MpResult};
use crate::multiply::multiply;
use crate::thresholds::Thresholds;

/// Precision at which the reciprocal is seeded by long division.
const NEWTON_SEED_BITS: usize = 16;

/// Magnitude division: the quotient replaces `dividend`, the remainder goes
/// to `remainder`. Both come out non-negative.
pub fn divide_magnitudes_in_place(
    dividend: &mut MpInt,
    divisor: &MpInt,
    remainder: &mut MpInt,
    thresholds: &Thresholds,
) -> MpResult<()> {
    if divisor.is_zero() {
        return Err(MpError::DivideByZero);
    }
    if dividend.num_bits() < thresholds.newton_division_min_bits {
        divide_grade_school(dividend, divisor, remainder)
    } else {
        divide_newton(dividend, divisor, remainder, thresholds)
    }
}

/// Top `precision` bits of `d`, or `d` scaled up when it is shorter.
fn top_bits(d: &MpInt, d_bits: usize, precision: usize) -> MpInt {
    let mut t = d.clone();
    if precision <= d_bits {
        t.shr_in_place(d_bits - precision);
    } else {
        t.shl_in_place(precision - d_bits);
    }
    t
}

/// One Newton step taking `x ≈ 2^(2·from) / T_from` to an approximation of
/// `2^(2·to) / T_to`.
fn newton_step(
    x: &MpInt,
    from: usize,
    to: usize,
    divisor: &MpInt,
    divisor_bits: usize,
    thresholds: &Thresholds,
) -> MpResult<MpInt> {
    let t = top_bits(divisor, divisor_bits, to);
    let mut x0 = x.clone();
    x0.shl_in_place(to - from);

    let mut product = MpInt::new();
    multiply(&t, &x0, &mut product, thresholds)?;
    let mut error = MpInt::with_capacity_bits(2 * to + 1);
    error.set_bit(2 * to, true);
    error.sub_in_place(&product);

    multiply(&x0, &error, &mut product, thresholds)?;
    product.shr_in_place(2 * to);
    x0.add_in_place(&product);
    Ok(x0)
}

/// Newton-iteration division of magnitudes.
///
/// A reciprocal `X ≈ 2^(2p) / T` of the top `p` bits `T` of the divisor is
/// grown from a long-division seed, roughly doubling its precision each
/// step, and the quotient `(A · X) >> (p + bits(D))` is corrected against
/// the exact remainder.
fn divide_newton(
    dividend: &mut MpInt,
    divisor: &MpInt,
    remainder: &mut MpInt,
    thresholds: &Thresholds,
) -> MpResult<()> {
    dividend.negative = false;
    let mut d = divisor.abs();
    d.trim();
    match dividend.compare_magnitude(&d) {
        Ordering::Less => {
            remainder.assign(dividend);
            dividend.set_zero();
            return Ok(());
        }
        Ordering::Equal => {
            remainder.set_zero();
            dividend.set_small(1);
            return Ok(());
        }
        Ordering::Greater => {}
    }

    let n = dividend.num_bits();
    let d_bits = d.num_bits();
    let precision = n - d_bits + 2 * NEWTON_GUARD_BITS;
    debug!(dividend_bits = n, divisor_bits = d_bits, precision, "newton division");

    let mut current = precision.min(NEWTON_SEED_BITS);
    let mut reciprocal = MpInt::with_capacity_bits(2 * current + 1);
    reciprocal.set_bit(2 * current, true);
    let mut seed_rem = MpInt::new();
    divide_grade_school(&mut reciprocal, &top_bits(&d, d_bits, current), &mut seed_rem)?;

    while current < precision {
        let next = (2 * current - NEWTON_GUARD_BITS / 2).min(precision);
        reciprocal = newton_step(&reciprocal, current, next, &d, d_bits, thresholds)?;
        trace!(from = current, to = next, "newton precision step");
        current = next;
    }
    reciprocal = newton_step(&reciprocal, precision, precision, &d, d_bits, thresholds)?;

    let mut quotient = MpInt::new();
    multiply(dividend, &reciprocal, &mut quotient, thresholds)?;
    quotient.shr_in_place(precision + d_bits);

    let mut rem = MpInt::new();
    multiply(&quotient, &d, &mut rem, thresholds)?;
    rem.sub_from_in_place(dividend);

    let mut one = MpInt::new();
    one.set_small(1);
    let mut corrections = 0_u32;
    while rem.is_negative() {
        quotient.sub_in_place(&one);
        rem.add_in_place(&d);
        corrections += 1;
    }
    while rem.compare_magnitude(&d) != Ordering::Less {
        quotient.add_in_place(&one);
        rem.sub_in_place(&d);
        corrections += 1;
    }
    if corrections > 0 {
        trace!(corrections, "newton quotient corrected");
    }

    dividend.assign(&quotient);
    remainder.assign(&rem);
    Ok(())
}

impl MpInt {
    /// Euclidean division in place: `self` becomes the quotient and
    /// `remainder` receives a value in `[0, |divisor|)`.
    pub fn divide_in_place(&mut self, divisor: &Self, remainder: &mut Self) -> MpResult<()> {
        self.divide_in_place_with(divisor, remainder, &Thresholds::current())
    }

    /// [`divide_in_place`](Self::divide_in_place) with explicit thresholds.
    pub fn divide_in_place_with(
        &mut self,
        divisor: &Self,
        remainder: &mut Self,
        thresholds: &Thresholds,
    ) -> MpResult<()> {
        let dividend_negative = self.negative;
        let divisor_negative = divisor.negative;
        divide_magnitudes_in_place(self, divisor, remainder, thresholds)?;
        if dividend_negative && !remainder.is_zero() {
            let mut one = Self::new();
            one.set_small(1);
            self.add_magnitude(&one);
            remainder.sub_from_in_place(&divisor.abs());
        }
        self.negative = dividend_negative != divisor_negative;
        self.normalize_zero();
        Ok(())
    }

    /// Euclidean quotient and remainder as new values.
    pub fn checked_div_rem(&self, divisor: &Self) -> MpResult<(Self, Self)> {
        let mut quotient = self.clone();
        let mut remainder = Self::new();
        quotient.divide_in_place(divisor, &mut remainder)?;
        Ok((quotient, remainder))
    }

    /// Euclidean remainder, always in `[0, |modulus|)`.
    pub fn checked_rem(&self, modulus: &Self) -> MpResult<Self> {
        self.checked_div_rem(modulus).map(|(_, r)| r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn newton_thresholds() -> Thresholds {
        Thresholds {
            newton_division_min_bits: 64,
            ..Thresholds::DEFAULT
        }
    }

    fn pattern(digits: usize, seed: u32) -> MpInt {
        MpInt::from_digits(
            (0..digits as u32)
                .map(|i| i.wrapping_mul(0x2545_F491).wrapping_add(seed).rotate_left(i % 31))
                .collect(),
        )
    }

    fn int(v: i64) -> MpInt {
        MpInt::from(v)
    }

    #[test]
    fn euclidean_signs() {
        let th = Thresholds::DEFAULT;
        for (a, b, q, r) in [
            (-7, 3, -3, 2),
            (7, -3, -2, 1),
            (-7, -3, 3, 2),
            (7, 3, 2, 1),
            (-6, 3, -2, 0),
            (0, -5, 0, 0),
        ] {
            let mut x = int(a);
            let mut rem = MpInt::new();
            x.divide_in_place_with(&int(b), &mut rem, &th).unwrap();
            assert_eq!(x, int(q), "{a} / {b}");
            assert_eq!(rem, int(r), "{a} % {b}");
        }
    }

    #[test]
    fn divide_by_zero() {
        let mut x = int(10);
        let mut rem = MpInt::new();
        assert_eq!(
            x.divide_in_place(&MpInt::new(), &mut rem),
            Err(MpError::DivideByZero)
        );
    }

    #[test]
    fn newton_matches_grade_school() {
        let th = newton_thresholds();
        for (nd, dd) in [(40, 3), (40, 39), (60, 20), (25, 1), (90, 44)] {
            let a = pattern(nd, 17);
            let b = pattern(dd, 5);

            let mut q_gs = a.clone();
            let mut r_gs = MpInt::new();
            divide_grade_school(&mut q_gs, &b, &mut r_gs).unwrap();

            let mut q_nt = a.clone();
            let mut r_nt = MpInt::new();
            divide_magnitudes_in_place(&mut q_nt, &b, &mut r_nt, &th).unwrap();

            assert_eq!(q_nt, q_gs, "quotient {nd}/{dd}");
            assert_eq!(r_nt, r_gs, "remainder {nd}/{dd}");
        }
    }

    #[test]
    fn newton_special_cases() {
        let th = newton_thresholds();
        let a = pattern(10, 1);

        let mut q = a.clone();
        let mut r = MpInt::new();
        divide_magnitudes_in_place(&mut q, &a, &mut r, &th).unwrap();
        assert!(q.is_one());
        assert!(r.is_zero());

        let mut bigger = a.clone();
        bigger.shl_in_place(5);
        let mut q = a.clone();
        divide_magnitudes_in_place(&mut q, &bigger, &mut r, &th).unwrap();
        assert!(q.is_zero());
        assert_eq!(r, a);
    }

    #[test]
    fn newton_exact_multiple() {
        let th = newton_thresholds();
        let d = pattern(17, 9);
        let q = pattern(23, 4);
        let mut a = MpInt::new();
        multiply(&d, &q, &mut a, &th).unwrap();
        let mut r = MpInt::new();
        divide_magnitudes_in_place(&mut a, &d, &mut r, &th).unwrap();
        assert_eq!(a, q);
        assert!(r.is_zero());
    }

    #[test]
    fn power_of_two_divisor() {
        let th = newton_thresholds();
        let mut a = pattern(30, 2);
        let original = a.clone();
        let mut d = MpInt::new();
        d.set_bit(100, true);
        let mut r = MpInt::new();
        divide_magnitudes_in_place(&mut a, &d, &mut r, &th).unwrap();
        let mut expected = original.clone();
        expected.shr_in_place(100);
        assert_eq!(a, expected);
        assert_eq!(r, original.bit_subrange(0, 99));
    }

    #[test]
    fn checked_div_rem_identity() {
        let a: MpInt = "-123456789012345678901234567890".parse().unwrap();
        let b: MpInt = "987654321".parse().unwrap();
        let (q, r) = a.checked_div_rem(&b).unwrap();
        assert!(!r.is_negative());
        let mut back = q.checked_mul(&b).unwrap();
        back.add_in_place(&r);
        assert_eq!(back, a);
    }
}
