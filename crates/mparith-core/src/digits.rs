//! Digit store: sign-magnitude representation of [`MpInt`].
//!
//! The magnitude is a little-endian vector of `DIGIT_BITS`-bit digits held in
//! [`Digit`] words, leaving headroom so that a full product of two digits
//! plus carries accumulates in a [`DoubleDigit`]. The vector may carry
//! trailing zero digits as reserved capacity; significant length and bit
//! count are recomputed on demand.

use std::cmp::Ordering;

/// Storage word for one digit.
pub type Digit = u32;

/// Accumulator wide enough for a digit product plus carries.
pub type DoubleDigit = u64;

/// Value bits per digit.
pub const DIGIT_BITS: usize = 30;

/// Mask selecting the value bits of a digit.
pub const DIGIT_MASK: Digit = (1 << DIGIT_BITS) - 1;

/// Arbitrary-precision signed integer.
///
/// Zero is canonical: an all-zero magnitude never carries the negative flag
/// once an operation returns.
#[derive(Clone, Default)]
pub struct MpInt {
    pub(crate) negative: bool,
    pub(crate) digits: Vec<Digit>,
}

/// Number of digits needed to hold `bits` bits.
#[must_use]
pub const fn digits_for_bits(bits: usize) -> usize {
    bits.div_ceil(DIGIT_BITS)
}

impl MpInt {
    /// Zero with no reserved storage.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            negative: false,
            digits: Vec::new(),
        }
    }

    /// Zero with room for `bits` bits.
    #[must_use]
    pub fn with_capacity_bits(bits: usize) -> Self {
        Self {
            negative: false,
            digits: vec![0; digits_for_bits(bits)],
        }
    }

    /// Non-negative value from little-endian digits; each digit is masked.
    #[must_use]
    pub fn from_digits(digits: Vec<Digit>) -> Self {
        let mut digits = digits;
        for d in &mut digits {
            *d &= DIGIT_MASK;
        }
        Self {
            negative: false,
            digits,
        }
    }

    /// All stored digits, including reserved zero capacity.
    #[must_use]
    pub fn digits(&self) -> &[Digit] {
        &self.digits
    }

    /// The significant digits, without trailing zeros.
    #[must_use]
    pub fn significant_digits(&self) -> &[Digit] {
        &self.digits[..self.nonzero_len()]
    }

    /// Digit at `index`, zero beyond the stored length.
    #[must_use]
    pub fn digit(&self, index: usize) -> Digit {
        self.digits.get(index).copied().unwrap_or(0)
    }

    /// Number of digits up to and including the most significant nonzero one.
    #[must_use]
    pub fn nonzero_len(&self) -> usize {
        self.digits
            .iter()
            .rposition(|&d| d != 0)
            .map_or(0, |i| i + 1)
    }

    /// Bit length of the magnitude; zero for zero.
    #[must_use]
    pub fn num_bits(&self) -> usize {
        match self.nonzero_len() {
            0 => 0,
            len => {
                let top = self.digits[len - 1];
                DIGIT_BITS * (len - 1) + (Digit::BITS - top.leading_zeros()) as usize
            }
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.digits.iter().all(|&d| d == 0)
    }

    /// True for values strictly below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.negative && !self.is_zero()
    }

    /// True for values strictly above zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        !self.negative && !self.is_zero()
    }

    /// -1, 0 or 1.
    #[must_use]
    pub fn signum(&self) -> i32 {
        if self.is_zero() {
            0
        } else if self.negative {
            -1
        } else {
            1
        }
    }

    #[must_use]
    pub fn is_even(&self) -> bool {
        self.digit(0) & 1 == 0
    }

    /// True when the value is exactly one.
    #[must_use]
    pub fn is_one(&self) -> bool {
        !self.negative && self.nonzero_len() == 1 && self.digits[0] == 1
    }

    /// Grow storage to hold at least `bits` bits. Never shrinks.
    pub fn reserve_bits(&mut self, bits: usize) {
        self.reserve_digits(digits_for_bits(bits));
    }

    /// Grow storage to at least `count` digits, zero-filling. Never shrinks.
    pub fn reserve_digits(&mut self, count: usize) {
        if count > self.digits.len() {
            self.digits.resize(count, 0);
        }
    }

    /// Drop reserved zero digits.
    pub fn trim(&mut self) {
        let len = self.nonzero_len();
        self.digits.truncate(len);
    }

    /// Clear the negative flag on a zero magnitude.
    pub(crate) fn normalize_zero(&mut self) {
        if self.negative && self.is_zero() {
            self.negative = false;
        }
    }

    /// Set to zero, keeping storage.
    pub fn set_zero(&mut self) {
        self.digits.fill(0);
        self.negative = false;
    }

    /// Set to a non-negative machine value, keeping storage.
    #[allow(clippy::cast_possible_truncation)]
    pub fn set_small(&mut self, mut value: u64) {
        self.set_zero();
        let mut i = 0;
        while value != 0 {
            self.reserve_digits(i + 1);
            self.digits[i] = value as Digit & DIGIT_MASK;
            value >>= DIGIT_BITS;
            i += 1;
        }
    }

    /// Copy the value of `other`, reusing storage.
    pub fn assign(&mut self, other: &Self) {
        self.digits.clear();
        self.digits.extend_from_slice(other.significant_digits());
        self.negative = other.negative;
        self.normalize_zero();
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        let mut result = self.clone();
        result.negative = false;
        result
    }

    /// Value of bit `index` of the magnitude.
    #[must_use]
    pub fn bit(&self, index: usize) -> bool {
        (self.digit(index / DIGIT_BITS) >> (index % DIGIT_BITS)) & 1 == 1
    }

    /// Set or clear bit `index` of the magnitude, growing as needed.
    pub fn set_bit(&mut self, index: usize, value: bool) {
        let digit = index / DIGIT_BITS;
        let mask: Digit = 1 << (index % DIGIT_BITS);
        if value {
            self.reserve_digits(digit + 1);
            self.digits[digit] |= mask;
        } else if digit < self.digits.len() {
            self.digits[digit] &= !mask;
            self.normalize_zero();
        }
    }

    /// Number of trailing zero bits; zero for the value zero.
    #[must_use]
    pub fn count_trailing_zeros(&self) -> usize {
        self.digits
            .iter()
            .position(|&d| d != 0)
            .map_or(0, |i| i * DIGIT_BITS + self.digits[i].trailing_zeros() as usize)
    }

    /// Number of trailing one bits of the magnitude.
    #[must_use]
    pub fn count_trailing_ones(&self) -> usize {
        let mut count = 0;
        for &d in self.significant_digits() {
            let ones = d.trailing_ones() as usize;
            count += ones;
            if ones < DIGIT_BITS {
                break;
            }
        }
        count
    }

    /// Digits `lo..=hi` of the magnitude as a new non-negative value.
    #[must_use]
    pub fn digit_subrange(&self, lo: usize, hi: usize) -> Self {
        let len = self.nonzero_len();
        if lo > hi || lo >= len {
            return Self::new();
        }
        let hi = hi.min(len - 1);
        Self::from_digits(self.digits[lo..=hi].to_vec())
    }

    /// Bits `lo..=hi` of the magnitude as a new non-negative value.
    #[must_use]
    pub fn bit_subrange(&self, lo: usize, hi: usize) -> Self {
        let available = self.nonzero_len() * DIGIT_BITS;
        if lo > hi || lo >= available {
            return Self::new();
        }
        let hi = hi.min(available - 1);
        let width = hi - lo + 1;
        let count = digits_for_bits(width);
        let first = lo / DIGIT_BITS;
        let shift = lo % DIGIT_BITS;

        let mut digits = Vec::with_capacity(count);
        for i in 0..count {
            let low = self.digit(first + i) >> shift;
            let high = if shift == 0 {
                0
            } else {
                self.digit(first + i + 1) << (DIGIT_BITS - shift)
            };
            digits.push((low | high) & DIGIT_MASK);
        }
        let top_bits = width - (count - 1) * DIGIT_BITS;
        if top_bits < DIGIT_BITS {
            digits[count - 1] &= (1 << top_bits) - 1;
        }
        Self::from_digits(digits)
    }

    /// Compare magnitudes, ignoring signs.
    #[must_use]
    pub fn compare_magnitude(&self, other: &Self) -> Ordering {
        let len = self.nonzero_len();
        let other_len = other.nonzero_len();
        if len != other_len {
            return len.cmp(&other_len);
        }
        for i in (0..len).rev() {
            match self.digits[i].cmp(&other.digits[i]) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}
