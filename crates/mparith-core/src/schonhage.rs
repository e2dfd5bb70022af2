//! Schönhage-Strassen multiplication.
//!
//! Operands are split into `2^k` parts of `M` bits and multiplied as
//! polynomials modulo `X^(2^k) + 1` with `X = 2^M`, which is the product
//! modulo `2^(2^k·M) + 1`. Choosing that modulus larger than the exact
//! product makes the result exact. Pointwise products are computed in a
//! smaller Fermat ring and recurse into the same scheme while it still
//! shrinks the problem.

use std::cmp::Ordering;

use tracing::{debug, trace};

use crate::digits::MpInt;
use crate::error::{MpError, MpResult};
use crate::fermat::{
    dft_mod_fermat_scramble, dft_mod_fermat_unscramble, fermat_modulus, negacyclic_convolution,
    reduce_mod_fermat, shift_left_mod_fermat, shift_right_mod_fermat,
};
use crate::multiply::{multiply_magnitudes, square_magnitude};
use crate::thresholds::Thresholds;

/// Smallest supported transform length exponent. With two parts the inner
/// ring is never smaller than the outer one.
const MIN_LOG_NUM_PARTS: u32 = 2;

fn round_up(value: usize, multiple: usize) -> usize {
    value.div_ceil(multiple) * multiple
}

/// Exponent of the inner Fermat ring for an outer exponent split in
/// `2^log_num_parts` parts. Its parts can hold a full negacyclic coefficient.
fn inner_exponent(exponent: usize, log_num_parts: u32) -> usize {
    let parts = 1usize << log_num_parts;
    round_up(2 * (exponent >> log_num_parts) + log_num_parts as usize, parts)
}

/// `result = |left| · |right|` using `2^log_num_parts` parts.
pub(crate) fn multiply_schonhage_strassen(
    left: &MpInt,
    right: &MpInt,
    result: &mut MpInt,
    log_num_parts: u32,
    thresholds: &Thresholds,
) -> MpResult<()> {
    check_log_num_parts(log_num_parts)?;
    let parts = 1usize << log_num_parts;
    let exponent = round_up(left.num_bits() + right.num_bits() + 1, parts);
    debug!(
        left_bits = left.num_bits(),
        right_bits = right.num_bits(),
        log_num_parts,
        exponent,
        "schonhage-strassen multiply"
    );
    let modulus = fermat_modulus(exponent);
    let product = convolve_mod_fermat(left, Some(right), exponent, log_num_parts, &modulus, thresholds)?;
    result.assign(&product);
    Ok(())
}

/// `result = |x|²` using `2^log_num_parts` parts. Only one forward
/// transform is computed.
pub(crate) fn square_schonhage_strassen(
    x: &MpInt,
    result: &mut MpInt,
    log_num_parts: u32,
    thresholds: &Thresholds,
) -> MpResult<()> {
    check_log_num_parts(log_num_parts)?;
    let parts = 1usize << log_num_parts;
    let exponent = round_up(2 * x.num_bits() + 1, parts);
    debug!(bits = x.num_bits(), log_num_parts, exponent, "schonhage-strassen square");
    let modulus = fermat_modulus(exponent);
    let product = convolve_mod_fermat(x, None, exponent, log_num_parts, &modulus, thresholds)?;
    result.assign(&product);
    Ok(())
}

fn check_log_num_parts(log_num_parts: u32) -> MpResult<()> {
    if (MIN_LOG_NUM_PARTS..usize::BITS - 1).contains(&log_num_parts) {
        Ok(())
    } else {
        Err(MpError::InvalidArgument(format!(
            "schonhage-strassen needs at least {} parts, got 2^{log_num_parts}",
            1u32 << MIN_LOG_NUM_PARTS
        )))
    }
}

/// `left · right mod (2^exponent + 1)` for operands in `[0, 2^exponent]`.
///
/// Uses a plain product and a fold when the operands are small or the
/// inner ring would not be smaller than this one.
pub fn multiply_mod_fermat(
    left: &MpInt,
    right: &MpInt,
    exponent: usize,
    log_num_parts: u32,
    modulus: &MpInt,
    thresholds: &Thresholds,
) -> MpResult<MpInt> {
    if is_minus_one(left, exponent) {
        return Ok(negate_mod(right, modulus));
    }
    if is_minus_one(right, exponent) {
        return Ok(negate_mod(left, modulus));
    }
    let bits = left.num_bits().max(right.num_bits());
    if use_plain_product(bits, exponent, log_num_parts, thresholds) {
        let mut product = MpInt::new();
        multiply_magnitudes(left, right, &mut product, thresholds)?;
        return Ok(reduce_mod_fermat(&product, exponent, modulus));
    }
    convolve_mod_fermat(left, Some(right), exponent, log_num_parts, modulus, thresholds)
}

/// `x² mod (2^exponent + 1)` for `x` in `[0, 2^exponent]`.
pub fn square_mod_fermat(
    x: &MpInt,
    exponent: usize,
    log_num_parts: u32,
    modulus: &MpInt,
    thresholds: &Thresholds,
) -> MpResult<MpInt> {
    if is_minus_one(x, exponent) {
        let mut one = MpInt::new();
        one.set_small(1);
        return Ok(one);
    }
    if use_plain_product(x.num_bits(), exponent, log_num_parts, thresholds) {
        let mut product = MpInt::new();
        square_magnitude(x, &mut product, thresholds)?;
        return Ok(reduce_mod_fermat(&product, exponent, modulus));
    }
    convolve_mod_fermat(x, None, exponent, log_num_parts, modulus, thresholds)
}

fn use_plain_product(bits: usize, exponent: usize, log_num_parts: u32, thresholds: &Thresholds) -> bool {
    bits < thresholds.ssa_mod_fermat_min_bits
        || exponent % (1usize << log_num_parts) != 0
        || inner_exponent(exponent, log_num_parts) >= exponent
}

/// `2^exponent`, the representative of -1, is the only value in range that
/// does not fit in `exponent` bits.
fn is_minus_one(x: &MpInt, exponent: usize) -> bool {
    x.num_bits() == exponent + 1
}

fn negate_mod(x: &MpInt, modulus: &MpInt) -> MpInt {
    let mut r = modulus.clone();
    r.sub_in_place(x);
    if r.compare_magnitude(modulus) == Ordering::Equal {
        r.set_zero();
    }
    r
}

fn split_parts(x: &MpInt, parts: usize, part_bits: usize) -> Vec<MpInt> {
    (0..parts)
        .map(|j| x.bit_subrange(j * part_bits, (j + 1) * part_bits - 1))
        .collect()
}

/// Weighted forward transform: multiply part `j` by `θ^j` with
/// `θ = 2^inner_part_bits`, then transform with root `2^(2·inner_part_bits)`.
#[allow(clippy::cast_possible_wrap)]
fn forward(
    signal: &mut [MpInt],
    inner_part_bits: usize,
    inner_exponent: usize,
    inner_modulus: &MpInt,
) -> MpResult<()> {
    for (j, part) in signal.iter_mut().enumerate() {
        *part = shift_left_mod_fermat(part, (j * inner_part_bits) as i64, inner_exponent, inner_modulus);
    }
    dft_mod_fermat_scramble(signal, 2 * inner_part_bits as i64, inner_exponent, inner_modulus)
}

/// Negacyclic product of `left` and `right` (or `left` squared) modulo
/// `2^exponent + 1`, reduced to `[0, modulus)`.
#[allow(clippy::cast_possible_wrap)]
fn convolve_mod_fermat(
    left: &MpInt,
    right: Option<&MpInt>,
    exponent: usize,
    log_num_parts: u32,
    modulus: &MpInt,
    thresholds: &Thresholds,
) -> MpResult<MpInt> {
    let parts = 1usize << log_num_parts;
    if exponent % parts != 0 {
        return Err(MpError::InvariantViolation(format!(
            "exponent {exponent} is not a multiple of {parts}"
        )));
    }
    let part_bits = exponent >> log_num_parts;
    let inner = inner_exponent(exponent, log_num_parts);
    if inner > exponent {
        return Err(MpError::InvariantViolation(format!(
            "inner ring 2^{inner}+1 is larger than outer ring 2^{exponent}+1"
        )));
    }
    let inner_part_bits = inner >> log_num_parts;
    let inner_modulus = fermat_modulus(inner);
    trace!(exponent, part_bits, inner, "fermat convolution");

    let mut a = split_parts(left, parts, part_bits);
    let mut b = right.map(|r| split_parts(r, parts, part_bits));

    let expected = (exponent <= thresholds.negacyclic_check_max_bits)
        .then(|| negacyclic_convolution(&a, b.as_deref().unwrap_or(a.as_slice())));

    forward(&mut a, inner_part_bits, inner, &inner_modulus)?;
    match b.as_mut() {
        Some(b) => {
            forward(b, inner_part_bits, inner, &inner_modulus)?;
            for (x, y) in a.iter_mut().zip(b.iter()) {
                *x = multiply_mod_fermat(x, y, inner, log_num_parts, &inner_modulus, thresholds)?;
            }
        }
        None => {
            for x in &mut a {
                *x = square_mod_fermat(x, inner, log_num_parts, &inner_modulus, thresholds)?;
            }
        }
    }
    dft_mod_fermat_unscramble(&mut a, -2 * inner_part_bits as i64, inner, &inner_modulus)?;

    for (j, coeff) in a.iter_mut().enumerate() {
        // Undo the weight and the transform length together.
        let shift = log_num_parts as usize + j * inner_part_bits;
        *coeff = shift_right_mod_fermat(coeff, shift as i64, inner, &inner_modulus);
        // Positive coefficients are below (j + 1)·2^(2M); larger residues
        // stand for negative ones.
        let mut bound = MpInt::new();
        bound.set_small(j as u64 + 1);
        bound.shl_in_place(2 * part_bits);
        if coeff.compare_magnitude(&bound) != Ordering::Less {
            coeff.sub_in_place(&inner_modulus);
        }
    }

    if let Some(expected) = expected {
        for (j, (got, want)) in a.iter().zip(&expected).enumerate() {
            if got != want {
                return Err(MpError::InvariantViolation(format!(
                    "negacyclic coefficient {j} disagrees with direct convolution"
                )));
            }
        }
    }

    let mut result = MpInt::with_capacity_bits(exponent + 1);
    for coeff in a.iter().rev() {
        result = shift_left_mod_fermat(&result, part_bits as i64, exponent, modulus);
        result.add_in_place(coeff);
        while result.is_negative() {
            result.add_in_place(modulus);
        }
        while result.compare_magnitude(modulus) != Ordering::Less {
            result.sub_in_place(modulus);
        }
    }
    result.trim();
    Ok(result)
}
