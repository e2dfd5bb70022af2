//! Toom-Cook multiplication and squaring.
//!
//! Operands are split into digit chunks of width `z`, the chunk polynomials
//! are evaluated at points drawn from {0, 1, -1, -2, ∞}, the evaluations are
//! multiplied through the signed dispatcher, and the product coefficients
//! are recovered with fixed add/subtract/halve/third sequences before being
//! recombined by digit shifts.
//!
//! Callers pass the operand with more digits as `left`.

use crate::arith::multiply_grade_school;
use crate::digits::MpInt;
use crate::error::{MpError, MpResult};
use crate::multiply::{multiply, square_magnitude};
use crate::thresholds::Thresholds;

/// Chunk `index` of width `z` digits; the last chunk takes the remaining
/// high digits.
fn chunk(x: &MpInt, index: usize, z: usize, last: bool) -> MpInt {
    let hi = if last {
        usize::MAX
    } else {
        (index + 1) * z - 1
    };
    x.digit_subrange(index * z, hi)
}

fn product(a: &MpInt, b: &MpInt, thresholds: &Thresholds) -> MpResult<MpInt> {
    let mut out = MpInt::new();
    multiply(a, b, &mut out, thresholds)?;
    Ok(out)
}

fn squared(a: &MpInt, thresholds: &Thresholds) -> MpResult<MpInt> {
    let mut out = MpInt::new();
    square_magnitude(a, &mut out, thresholds)?;
    Ok(out)
}

fn sum(a: &MpInt, b: &MpInt) -> MpInt {
    let mut out = a.clone();
    out.add_in_place(b);
    out
}

fn difference(a: &MpInt, b: &MpInt) -> MpInt {
    let mut out = a.clone();
    out.sub_in_place(b);
    out
}

/// Halve a value known to be even.
fn exact_halve(x: &mut MpInt) -> MpResult<()> {
    if !x.is_even() {
        return Err(MpError::InvariantViolation(
            "Toom interpolation halved an odd value".into(),
        ));
    }
    x.shr_in_place(1);
    Ok(())
}

/// Divide by three a value known to be a multiple of three.
fn exact_third(x: &mut MpInt) -> MpResult<()> {
    if x.div_small_in_place(3)? != 0 {
        return Err(MpError::InvariantViolation(
            "Toom interpolation divided a non-multiple of three".into(),
        ));
    }
    Ok(())
}

/// `result = Σ coefficients[i] · B^(i·z)` where `B` is the digit base.
fn recombine(result: &mut MpInt, coefficients: &[&MpInt], z: usize) {
    result.set_zero();
    for c in coefficients.iter().rev() {
        result.shl_digits(z);
        result.add_in_place(c);
    }
    result.negative = false;
}

/// Toom-1.5: only `left` is split, `right` multiplies both halves.
pub(crate) fn multiply_toom15(
    left: &MpInt,
    right: &MpInt,
    result: &mut MpInt,
    thresholds: &Thresholds,
) -> MpResult<()> {
    let ll = left.nonzero_len();
    let lr = right.nonzero_len();
    let z = (ll / 2).max(lr);
    if z == 0 || z >= ll {
        multiply_grade_school(left, right, result);
        return Ok(());
    }
    let mut q = right.clone();
    q.negative = false;
    let p0 = chunk(left, 0, z, false);
    let p1 = chunk(left, 1, z, true);

    let low = product(&p0, &q, thresholds)?;
    let high = product(&p1, &q, thresholds)?;
    recombine(result, &[&low, &high], z);
    Ok(())
}

/// Toom-2 (Karatsuba): points 0, 1, ∞.
pub(crate) fn multiply_toom2(
    left: &MpInt,
    right: &MpInt,
    result: &mut MpInt,
    thresholds: &Thresholds,
) -> MpResult<()> {
    let ll = left.nonzero_len();
    let lr = right.nonzero_len();
    let z = (ll / 2).max(lr / 2);
    if z == 0 {
        multiply_grade_school(left, right, result);
        return Ok(());
    }
    let p0 = chunk(left, 0, z, false);
    let p1 = chunk(left, 1, z, true);
    let q0 = chunk(right, 0, z, false);
    let q1 = chunk(right, 1, z, true);

    let r0 = product(&p0, &q0, thresholds)?;
    let r_inf = product(&p1, &q1, thresholds)?;
    let mut r1 = product(&sum(&p0, &p1), &sum(&q0, &q1), thresholds)?;
    r1.sub_in_place(&r0);
    r1.sub_in_place(&r_inf);

    recombine(result, &[&r0, &r1, &r_inf], z);
    Ok(())
}

/// Toom-2 squaring.
pub(crate) fn square_toom2(x: &MpInt, result: &mut MpInt, thresholds: &Thresholds) -> MpResult<()> {
    let len = x.nonzero_len();
    let z = len / 2;
    if z == 0 {
        crate::arith::square_grade_school(x, result);
        return Ok(());
    }
    let p0 = chunk(x, 0, z, false);
    let p1 = chunk(x, 1, z, true);

    let r0 = squared(&p0, thresholds)?;
    let r_inf = squared(&p1, thresholds)?;
    let mut r1 = squared(&sum(&p0, &p1), thresholds)?;
    r1.sub_in_place(&r0);
    r1.sub_in_place(&r_inf);

    recombine(result, &[&r0, &r1, &r_inf], z);
    Ok(())
}

/// Toom-2.5: `left` in three chunks, `right` in two; points 0, 1, -1, ∞.
pub(crate) fn multiply_toom25(
    left: &MpInt,
    right: &MpInt,
    result: &mut MpInt,
    thresholds: &Thresholds,
) -> MpResult<()> {
    let ll = left.nonzero_len();
    let lr = right.nonzero_len();
    let z = (ll / 3).max(lr / 2);
    if z == 0 {
        multiply_grade_school(left, right, result);
        return Ok(());
    }
    let p0 = chunk(left, 0, z, false);
    let p1 = chunk(left, 1, z, false);
    let p2 = chunk(left, 2, z, true);
    let q0 = chunk(right, 0, z, false);
    let q1 = chunk(right, 1, z, true);

    let r0 = product(&p0, &q0, thresholds)?;
    let r_inf = product(&p2, &q1, thresholds)?;

    let p02 = sum(&p0, &p2);
    let r_pos1 = product(&sum(&p02, &p1), &sum(&q0, &q1), thresholds)?;
    let r_neg1 = product(&difference(&p02, &p1), &difference(&q0, &q1), thresholds)?;

    let mut r1 = difference(&r_pos1, &r_neg1);
    exact_halve(&mut r1)?;
    let mut r2 = sum(&r1, &r_neg1);
    r2.sub_in_place(&r0);
    r1.sub_in_place(&r_inf);

    recombine(result, &[&r0, &r1, &r2, &r_inf], z);
    Ok(())
}

/// Toom-3 interpolation from r(0), r(1), r(-1), r(-2), r(∞).
fn interpolate_toom3(
    result: &mut MpInt,
    r0: &MpInt,
    r_pos1: &MpInt,
    r_neg1: &MpInt,
    r_neg2: &MpInt,
    r_inf: &MpInt,
    z: usize,
) -> MpResult<()> {
    let mut r3 = difference(r_neg2, r_pos1);
    exact_third(&mut r3)?;
    let mut r1 = difference(r_pos1, r_neg1);
    exact_halve(&mut r1)?;
    let mut r2 = difference(r_neg1, r0);

    r3.sub_from_in_place(&r2);
    exact_halve(&mut r3)?;
    let mut twice_inf = r_inf.clone();
    twice_inf.shl_in_place(1);
    r3.add_in_place(&twice_inf);

    r2.add_in_place(&r1);
    r2.sub_in_place(r_inf);
    r1.sub_in_place(&r3);

    recombine(result, &[r0, &r1, &r2, &r3, r_inf], z);
    Ok(())
}

/// `p(-2) = 2·(p(-1) + p2) - p0`.
fn eval_neg2(p_neg1: &MpInt, p0: &MpInt, p2: &MpInt) -> MpInt {
    let mut out = sum(p_neg1, p2);
    out.shl_in_place(1);
    out.sub_in_place(p0);
    out
}

/// Toom-3: both operands in three chunks; points 0, 1, -1, -2, ∞.
pub(crate) fn multiply_toom3(
    left: &MpInt,
    right: &MpInt,
    result: &mut MpInt,
    thresholds: &Thresholds,
) -> MpResult<()> {
    let ll = left.nonzero_len();
    let lr = right.nonzero_len();
    let z = (ll / 3).max(lr / 3);
    if z == 0 {
        multiply_grade_school(left, right, result);
        return Ok(());
    }
    let p0 = chunk(left, 0, z, false);
    let p1 = chunk(left, 1, z, false);
    let p2 = chunk(left, 2, z, true);
    let q0 = chunk(right, 0, z, false);
    let q1 = chunk(right, 1, z, false);
    let q2 = chunk(right, 2, z, true);

    let r0 = product(&p0, &q0, thresholds)?;
    let r_inf = product(&p2, &q2, thresholds)?;

    let p02 = sum(&p0, &p2);
    let q02 = sum(&q0, &q2);
    let p_pos1 = sum(&p02, &p1);
    let q_pos1 = sum(&q02, &q1);
    let p_neg1 = difference(&p02, &p1);
    let q_neg1 = difference(&q02, &q1);
    let p_neg2 = eval_neg2(&p_neg1, &p0, &p2);
    let q_neg2 = eval_neg2(&q_neg1, &q0, &q2);

    let r_pos1 = product(&p_pos1, &q_pos1, thresholds)?;
    let r_neg1 = product(&p_neg1, &q_neg1, thresholds)?;
    let r_neg2 = product(&p_neg2, &q_neg2, thresholds)?;

    interpolate_toom3(result, &r0, &r_pos1, &r_neg1, &r_neg2, &r_inf, z)
}

/// Toom-3 squaring.
pub(crate) fn square_toom3(x: &MpInt, result: &mut MpInt, thresholds: &Thresholds) -> MpResult<()> {
    let z = x.nonzero_len() / 3;
    if z == 0 {
        crate::arith::square_grade_school(x, result);
        return Ok(());
    }
    let p0 = chunk(x, 0, z, false);
    let p1 = chunk(x, 1, z, false);
    let p2 = chunk(x, 2, z, true);

    let r0 = squared(&p0, thresholds)?;
    let r_inf = squared(&p2, thresholds)?;
    let p02 = sum(&p0, &p2);
    let p_neg1 = difference(&p02, &p1);
    let r_pos1 = squared(&sum(&p02, &p1), thresholds)?;
    let r_neg1 = squared(&p_neg1, thresholds)?;
    let r_neg2 = squared(&eval_neg2(&p_neg1, &p0, &p2), thresholds)?;

    interpolate_toom3(result, &r0, &r_pos1, &r_neg1, &r_neg2, &r_inf, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::square_grade_school;

    fn thresholds() -> Thresholds {
        Thresholds {
            toom2_min_bits: 120,
            toom3_min_bits: 400,
            ssa6_min_bits: 1 << 30,
            ssa7_min_bits: 1 << 31,
            ..Thresholds::default()
        }
    }

    fn ramp(digits: usize, step: u32) -> MpInt {
        MpInt::from_digits((0..digits).map(|i| (i as u32 + 1).wrapping_mul(step)).collect())
    }

    fn reference(a: &MpInt, b: &MpInt) -> MpInt {
        let mut out = MpInt::new();
        multiply_grade_school(a, b, &mut out);
        out
    }

    #[test]
    fn toom15_uneven() {
        let a = ramp(40, 0x2345_6789);
        let b = ramp(9, 0x1357_9BDF);
        let mut got = MpInt::new();
        multiply_toom15(&a, &b, &mut got, &thresholds()).unwrap();
        assert_eq!(got, reference(&a, &b));
    }

    #[test]
    fn toom2_balanced_and_odd_lengths() {
        for (la, lb) in [(20, 20), (21, 17), (33, 32)] {
            let a = ramp(la, 0x3FFF_FFFF);
            let b = ramp(lb, 0x2AAA_AAAB);
            let mut got = MpInt::new();
            multiply_toom2(&a, &b, &mut got, &thresholds()).unwrap();
            assert_eq!(got, reference(&a, &b), "{la}x{lb}");
        }
    }

    #[test]
    fn toom25_three_by_two() {
        let a = ramp(45, 0x1111_1111);
        let b = ramp(25, 0x3333_3333);
        let mut got = MpInt::new();
        multiply_toom25(&a, &b, &mut got, &thresholds()).unwrap();
        assert_eq!(got, reference(&a, &b));
    }

    #[test]
    fn toom25_overwrites_stale_result() {
        let a = ramp(45, 7);
        let b = ramp(25, 5);
        let mut got = ramp(80, 0x0F0F_0F0F);
        multiply_toom25(&a, &b, &mut got, &thresholds()).unwrap();
        assert_eq!(got, reference(&a, &b));
    }

    #[test]
    fn toom3_balanced_all_ones() {
        let ones = MpInt::from_digits(vec![crate::digits::DIGIT_MASK; 61]);
        let other = MpInt::from_digits(vec![crate::digits::DIGIT_MASK; 58]);
        let mut got = MpInt::new();
        multiply_toom3(&ones, &other, &mut got, &thresholds()).unwrap();
        assert_eq!(got, reference(&ones, &other));
    }

    #[test]
    fn toom_squares() {
        let x = ramp(50, 0x2468_ACE1);
        let mut expected = MpInt::new();
        square_grade_school(&x, &mut expected);
        let mut got = MpInt::new();
        square_toom2(&x, &mut got, &thresholds()).unwrap();
        assert_eq!(got, expected);
        square_toom3(&x, &mut got, &thresholds()).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn tiny_operands_fall_back() {
        let a = MpInt::from(5);
        let b = MpInt::from(7);
        let mut got = MpInt::new();
        multiply_toom3(&a, &b, &mut got, &thresholds()).unwrap();
        assert_eq!(got, MpInt::from(35));
    }

    #[test]
    fn exact_division_checks() {
        let mut odd = MpInt::from(7);
        assert!(matches!(
            exact_halve(&mut odd),
            Err(MpError::InvariantViolation(_))
        ));
        let mut not_third = MpInt::from(-10);
        assert!(exact_third(&mut not_third).is_err());
        let mut third = MpInt::from(-12);
        exact_third(&mut third).unwrap();
        assert_eq!(third, MpInt::from(-4));
    }
}
