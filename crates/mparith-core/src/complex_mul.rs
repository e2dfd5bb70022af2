//! Multiplication through a floating-point FFT.
//!
//! Magnitudes are cut into small chunks, one per complex sample, and the
//! cyclic convolution of the chunk sequences is rounded back to integers.
//! The path is exact only while every convolution term stays well inside
//! the 53-bit mantissa, so oversized inputs are refused.

use crate::complex::{ComplexDouble, ComplexSequence};
use crate::constants::BITS_PER_COMPLEX_DOUBLE;
use crate::digits::{Digit, MpInt, DIGIT_BITS};
use crate::error::{MpError, MpResult};

/// Mantissa bits a convolution term plus transform round-off may occupy.
const SAFE_MANTISSA_BITS: u32 = 50;

#[allow(clippy::cast_possible_truncation)]
const DIGIT_WIDTH: u32 = DIGIT_BITS as u32;

fn check_base_bits(base_bits: u32) -> MpResult<()> {
    if (1..=DIGIT_WIDTH).contains(&base_bits) {
        Ok(())
    } else {
        Err(MpError::InvalidArgument(format!(
            "chunk width {base_bits} is outside 1..={DIGIT_WIDTH}"
        )))
    }
}

impl MpInt {
    /// Magnitude cut into `base_bits`-bit chunks, least significant first,
    /// as the real parts of a sequence of length `len`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_complex_sequence(&self, base_bits: u32, len: usize) -> MpResult<ComplexSequence> {
        check_base_bits(base_bits)?;
        let width = base_bits as usize;
        let chunks = self.num_bits().div_ceil(width);
        if !len.is_power_of_two() || len < chunks {
            return Err(MpError::InvalidArgument(format!(
                "sequence length {len} cannot hold {chunks} chunks"
            )));
        }
        let mut seq = ComplexSequence::zeros(len);
        let mask = (1_u64 << base_bits) - 1;
        let mut acc: u64 = 0;
        let mut acc_bits = 0_u32;
        let mut i = 0;
        let mut emit = |acc: u64, i: usize| {
            let chunk = (acc & mask) as Digit;
            // Zero chunks past the top bit may lie beyond `len`.
            if chunk != 0 {
                seq[i] = ComplexDouble::new(f64::from(chunk), 0.0);
            }
        };
        for &d in self.significant_digits() {
            acc |= u64::from(d) << acc_bits;
            acc_bits += DIGIT_WIDTH;
            while acc_bits >= base_bits {
                emit(acc, i);
                acc >>= base_bits;
                acc_bits -= base_bits;
                i += 1;
            }
        }
        if acc_bits > 0 {
            emit(acc, i);
        }
        Ok(seq)
    }

    /// Non-negative value `Σ round(seq[i].re) · 2^(i·base_bits)`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_complex_sequence(seq: &ComplexSequence, base_bits: u32) -> MpResult<Self> {
        check_base_bits(base_bits)?;
        let chunk_mask = (1_u128 << base_bits) - 1;
        let mut carry: u128 = 0;
        let mut packer = DigitPacker::default();
        for (i, sample) in seq.iter().enumerate() {
            let rounded = sample.re().round();
            if !rounded.is_finite() || rounded < 0.0 || rounded >= 2f64.powi(100) {
                return Err(MpError::InvariantViolation(format!(
                    "sample {i} rounds to {rounded}, outside the convolution range"
                )));
            }
            carry += rounded as u128;
            packer.push((carry & chunk_mask) as u64, base_bits);
            carry >>= base_bits;
        }
        while carry != 0 {
            packer.push((carry & chunk_mask) as u64, base_bits);
            carry >>= base_bits;
        }
        Ok(Self::from_digits(packer.finish()))
    }
}

/// Collects little-endian bit chunks into digits.
#[derive(Default)]
struct DigitPacker {
    digits: Vec<Digit>,
    acc: u64,
    acc_bits: u32,
}

impl DigitPacker {
    #[allow(clippy::cast_possible_truncation)]
    fn push(&mut self, chunk: u64, bits: u32) {
        self.acc |= chunk << self.acc_bits;
        self.acc_bits += bits;
        while self.acc_bits >= DIGIT_WIDTH {
            self.digits.push(self.acc as Digit);
            self.acc >>= DIGIT_WIDTH;
            self.acc_bits -= DIGIT_WIDTH;
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn finish(mut self) -> Vec<Digit> {
        if self.acc_bits > 0 {
            self.digits.push(self.acc as Digit);
        }
        self.digits
    }
}

/// Signed product through the complex FFT with
/// [`BITS_PER_COMPLEX_DOUBLE`]-bit chunks.
///
/// Fails with [`MpError::InvalidArgument`] when the operands are large
/// enough that rounding could corrupt the convolution.
pub fn multiply_complex_fft(left: &MpInt, right: &MpInt) -> MpResult<MpInt> {
    if left.is_zero() || right.is_zero() {
        return Ok(MpInt::new());
    }
    let base = BITS_PER_COMPLEX_DOUBLE;
    let width = base as usize;
    let left_chunks = left.num_bits().div_ceil(width);
    let right_chunks = right.num_bits().div_ceil(width);
    let len = (left_chunks + right_chunks).next_power_of_two();
    let term_bits = 2 * base + left_chunks.min(right_chunks).ilog2() + 1 + len.ilog2();
    if term_bits > SAFE_MANTISSA_BITS {
        return Err(MpError::InvalidArgument(format!(
            "operands of {} and {} bits exceed the double-precision FFT range",
            left.num_bits(),
            right.num_bits()
        )));
    }

    let mut a = left.to_complex_sequence(base, len)?;
    a.dft_in_place_scramble()?;
    if std::ptr::eq(left, right) {
        a.pointwise_square_in_place();
    } else {
        let mut b = right.to_complex_sequence(base, len)?;
        b.dft_in_place_scramble()?;
        a.pointwise_multiply_in_place(&b)?;
    }
    a.inverse_dft_in_place_unscramble()?;

    let mut product = MpInt::from_complex_sequence(&a, base)?;
    product.negative = left.negative != right.negative;
    product.normalize_zero();
    Ok(product)
}
