//! Arithmetic modulo Fermat-style numbers `2^n + 1`.
//!
//! In this ring 2 has multiplicative order `2n`, so multiplying by a power
//! of two is an exact bit shift with a wrap-around subtraction, and the
//! transforms below need no floating point. Values are kept as
//! non-negative representatives in `[0, 2^n]`.

use crate::arith::multiply_grade_school;
use crate::digits::MpInt;
use crate::error::{MpError, MpResult};

/// `2^exponent + 1`.
#[must_use]
pub fn fermat_modulus(exponent: usize) -> MpInt {
    let mut m = MpInt::with_capacity_bits(exponent + 1);
    m.set_bit(exponent, true);
    m.set_bit(0, true);
    m
}

/// `x · 2^shift mod (2^exponent + 1)` for `x` in `[0, 2^exponent]`.
///
/// The shift is folded with `2^(2·exponent) ≡ 1`, so negative shifts divide
/// by powers of two.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
pub fn shift_left_mod_fermat(x: &MpInt, shift: i64, exponent: usize, modulus: &MpInt) -> MpInt {
    let folded = shift.rem_euclid(2 * exponent as i64) as usize;
    let (wraps, bits) = (folded / exponent, folded % exponent);

    let mut result = x.bit_subrange(0, exponent - bits - 1);
    result.shl_in_place(bits);
    result.sub_in_place(&x.bit_subrange(exponent - bits, exponent));
    if wraps == 1 {
        result.negate();
    }
    if result.is_negative() {
        result.add_in_place(modulus);
    }
    result.normalize_zero();
    result
}

/// `x · 2^(-shift) mod (2^exponent + 1)`.
#[must_use]
pub fn shift_right_mod_fermat(x: &MpInt, shift: i64, exponent: usize, modulus: &MpInt) -> MpInt {
    shift_left_mod_fermat(x, -shift, exponent, modulus)
}

/// Reduce a non-negative `x` modulo `2^exponent + 1` by alternately
/// subtracting and adding its `exponent`-bit chunks.
#[must_use]
pub fn reduce_mod_fermat(x: &MpInt, exponent: usize, modulus: &MpInt) -> MpInt {
    if x.compare_magnitude(modulus) == std::cmp::Ordering::Less {
        let mut r = x.clone();
        r.negative = false;
        return r;
    }
    let bits = x.num_bits();
    let mut result = MpInt::new();
    let mut start = 0;
    let mut subtract = false;
    while start < bits {
        let chunk = x.bit_subrange(start, start + exponent - 1);
        if subtract {
            result.sub_in_place(&chunk);
        } else {
            result.add_in_place(&chunk);
        }
        subtract = !subtract;
        start += exponent;
    }
    while result.is_negative() {
        result.add_in_place(modulus);
    }
    while result.compare_magnitude(modulus) != std::cmp::Ordering::Less {
        result.sub_in_place(modulus);
    }
    result
}

/// `(a + b) mod m` for `a, b` in `[0, m)`.
fn add_mod(a: &MpInt, b: &MpInt, modulus: &MpInt) -> MpInt {
    let mut sum = a.clone();
    sum.add_in_place(b);
    if sum.compare_magnitude(modulus) != std::cmp::Ordering::Less {
        sum.sub_in_place(modulus);
    }
    sum
}

/// `(a - b) mod m` for `a, b` in `[0, m)`.
fn sub_mod(a: &MpInt, b: &MpInt, modulus: &MpInt) -> MpInt {
    let mut diff = a.clone();
    diff.sub_in_place(b);
    if diff.is_negative() {
        diff.add_in_place(modulus);
    }
    diff
}

/// Reduce a representative in `[0, m]` to `[0, m)`.
fn canonical(x: &MpInt, modulus: &MpInt) -> MpInt {
    if x.compare_magnitude(modulus) == std::cmp::Ordering::Equal {
        MpInt::new()
    } else {
        x.clone()
    }
}

#[allow(clippy::cast_possible_wrap)]
fn twiddle_shift(root_exponent: i64, j: usize, len: usize, half: usize) -> i64 {
    root_exponent * (j * (len / (2 * half))) as i64
}

fn check_power_of_two(len: usize) -> MpResult<()> {
    if len.is_power_of_two() {
        Ok(())
    } else {
        Err(MpError::InvalidArgument(format!(
            "transform length {len} is not a power of two"
        )))
    }
}

/// Forward decimation-in-frequency transform over `Z/(2^exponent + 1)`,
/// leaving the output in bit-reversed order. The root of unity is
/// `2^(-root_exponent)`.
pub fn dft_mod_fermat_scramble(
    signal: &mut [MpInt],
    root_exponent: i64,
    exponent: usize,
    modulus: &MpInt,
) -> MpResult<()> {
    let len = signal.len();
    check_power_of_two(len)?;
    let mut half = len / 2;
    while half >= 1 {
        for j in 0..half {
            let shift = twiddle_shift(root_exponent, j, len, half);
            let mut i = j;
            while i < len {
                let a = canonical(&signal[i], modulus);
                let b = canonical(&signal[i + half], modulus);
                let diff = sub_mod(&a, &b, modulus);
                signal[i] = add_mod(&a, &b, modulus);
                signal[i + half] = shift_right_mod_fermat(&diff, shift, exponent, modulus);
                i += 2 * half;
            }
        }
        half /= 2;
    }
    Ok(())
}

/// Inverse of [`dft_mod_fermat_scramble`] up to a factor of the length when
/// called with the negated root exponent: decimation-in-time from
/// bit-reversed input to natural order.
pub fn dft_mod_fermat_unscramble(
    signal: &mut [MpInt],
    root_exponent: i64,
    exponent: usize,
    modulus: &MpInt,
) -> MpResult<()> {
    let len = signal.len();
    check_power_of_two(len)?;
    let mut half = 1;
    while half < len {
        for j in 0..half {
            let shift = twiddle_shift(root_exponent, j, len, half);
            let mut i = j;
            while i < len {
                let a = canonical(&signal[i], modulus);
                let t = shift_right_mod_fermat(&signal[i + half], shift, exponent, modulus);
                let t = canonical(&t, modulus);
                signal[i + half] = sub_mod(&a, &t, modulus);
                signal[i] = add_mod(&a, &t, modulus);
                i += 2 * half;
            }
        }
        half *= 2;
    }
    Ok(())
}

/// Direct negacyclic convolution: the coefficients of
/// `left(X) · right(X) mod (X^n + 1)` for equal-length inputs.
#[must_use]
pub fn negacyclic_convolution(left: &[MpInt], right: &[MpInt]) -> Vec<MpInt> {
    let n = left.len().min(right.len());
    let mut term = MpInt::new();
    (0..n)
        .map(|col| {
            let mut acc = MpInt::new();
            for j in 0..n {
                if j <= col {
                    multiply_grade_school(&left[col - j], &right[j], &mut term);
                    acc.add_in_place(&term);
                } else {
                    multiply_grade_school(&left[col + n - j], &right[j], &mut term);
                    acc.sub_in_place(&term);
                }
            }
            acc
        })
        .collect()
}
