//! Uniform random values.

use rand::Rng;

use crate::digits::{digits_for_bits, Digit, MpInt, DIGIT_BITS};
use crate::error::{MpError, MpResult};

impl MpInt {
    /// Uniform non-negative value below `2^bits`.
    pub fn random_bits<R: Rng + ?Sized>(rng: &mut R, bits: usize) -> Self {
        let count = digits_for_bits(bits);
        let mut digits: Vec<Digit> = vec![0; count];
        rng.fill(&mut digits[..]);
        let top_bits = bits - count.saturating_sub(1) * DIGIT_BITS;
        if let Some(top) = digits.last_mut() {
            if top_bits < DIGIT_BITS {
                *top &= (1 << top_bits) - 1;
            }
        }
        Self::from_digits(digits)
    }

    /// Uniform value in `[0, upper)` by rejection sampling.
    pub fn random_below<R: Rng + ?Sized>(rng: &mut R, upper: &Self) -> MpResult<Self> {
        if !upper.is_positive() {
            return Err(MpError::InvalidArgument(format!(
                "random bound must be positive, got {upper}"
            )));
        }
        let bits = upper.num_bits();
        loop {
            let candidate = Self::random_bits(rng, bits);
            if candidate.compare_magnitude(upper) == std::cmp::Ordering::Less {
                return Ok(candidate);
            }
        }
    }
}
