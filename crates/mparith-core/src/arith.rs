//! In-place signed arithmetic and the grade-school algorithms.
//!
//! Magnitude subtraction only ever runs with the operands already ordered
//! by [`MpInt::compare_magnitude`]; the private helpers below are named for
//! the side that is known to be larger.

use std::cmp::Ordering;

use crate::digits::{Digit, DoubleDigit, MpInt, DIGIT_BITS, DIGIT_MASK};
use crate::error::{MpError, MpResult};

/// Largest digit product.
const MAX_PRODUCT: DoubleDigit = (DIGIT_MASK as DoubleDigit) * (DIGIT_MASK as DoubleDigit);

/// Column sums at or above this value are folded before the next product.
const FOLD_LIMIT: DoubleDigit = DoubleDigit::MAX - MAX_PRODUCT;

const MASK: DoubleDigit = DIGIT_MASK as DoubleDigit;

/// Adjustments allowed to a double-precision quotient digit estimate.
const MAX_QUOTIENT_CORRECTIONS: u32 = 3;

impl MpInt {
    /// Flip the sign. Zero stays non-negative.
    pub fn negate(&mut self) {
        self.negative = !self.negative;
        self.normalize_zero();
    }

    /// `self += other`.
    pub fn add_in_place(&mut self, other: &Self) {
        if self.negative == other.negative {
            self.add_magnitude(other);
        } else {
            self.subtract_signed_magnitudes(other);
        }
        self.normalize_zero();
    }

    /// `self -= other`.
    pub fn sub_in_place(&mut self, other: &Self) {
        if self.negative != other.negative {
            self.add_magnitude(other);
        } else {
            self.subtract_signed_magnitudes(other);
        }
        self.normalize_zero();
    }

    /// `self = other - self`.
    pub fn sub_from_in_place(&mut self, other: &Self) {
        self.sub_in_place(other);
        self.negate();
    }

    /// `|self| -= |other|` when `|self| >= |other|`, otherwise
    /// `|self| = |other| - |self|` with the sign flipped.
    fn subtract_signed_magnitudes(&mut self, other: &Self) {
        match self.compare_magnitude(other) {
            Ordering::Less => {
                self.sub_from_larger_magnitude(other);
                self.negative = !self.negative;
            }
            Ordering::Equal | Ordering::Greater => self.sub_smaller_magnitude(other),
        }
    }

    /// `|self| += |other|`, sign unchanged.
    pub(crate) fn add_magnitude(&mut self, other: &Self) {
        let other_len = other.nonzero_len();
        let len = self.nonzero_len().max(other_len);
        self.reserve_digits(len + 1);

        let mut carry: Digit = 0;
        for i in 0..other_len {
            let sum = self.digits[i] + other.digits[i] + carry;
            self.digits[i] = sum & DIGIT_MASK;
            carry = sum >> DIGIT_BITS;
        }
        let mut i = other_len;
        while carry != 0 {
            let sum = self.digits[i] + carry;
            self.digits[i] = sum & DIGIT_MASK;
            carry = sum >> DIGIT_BITS;
            i += 1;
        }
    }

    /// `|self| -= |smaller|`; the caller has established `|self| >= |smaller|`.
    pub(crate) fn sub_smaller_magnitude(&mut self, smaller: &Self) {
        let smaller_len = smaller.nonzero_len();
        let mut borrow: Digit = 0;
        for i in 0..smaller_len {
            let (diff, b) = sub_digit(self.digits[i], smaller.digits[i], borrow);
            self.digits[i] = diff;
            borrow = b;
        }
        let mut i = smaller_len;
        while borrow != 0 && i < self.digits.len() {
            let (diff, b) = sub_digit(self.digits[i], 0, borrow);
            self.digits[i] = diff;
            borrow = b;
            i += 1;
        }
        debug_assert_eq!(borrow, 0, "minuend smaller than subtrahend");
    }

    /// `|self| = |larger| - |self|`; the caller has established
    /// `|larger| >= |self|`.
    pub(crate) fn sub_from_larger_magnitude(&mut self, larger: &Self) {
        let larger_len = larger.nonzero_len();
        self.reserve_digits(larger_len);
        let mut borrow: Digit = 0;
        for i in 0..larger_len {
            let (diff, b) = sub_digit(larger.digits[i], self.digits[i], borrow);
            self.digits[i] = diff;
            borrow = b;
        }
        debug_assert_eq!(borrow, 0, "minuend smaller than subtrahend");
    }

    /// `self *= factor` for a machine word.
    #[allow(clippy::cast_possible_truncation)]
    pub fn mul_small_in_place(&mut self, factor: u32) {
        if factor == 0 {
            self.set_zero();
            return;
        }
        let len = self.nonzero_len();
        let mut carry: DoubleDigit = 0;
        for d in &mut self.digits[..len] {
            let product = DoubleDigit::from(*d) * DoubleDigit::from(factor) + carry;
            *d = (product & MASK) as Digit;
            carry = product >> DIGIT_BITS;
        }
        let mut i = len;
        while carry != 0 {
            self.reserve_digits(i + 1);
            self.digits[i] = (carry & MASK) as Digit;
            carry >>= DIGIT_BITS;
            i += 1;
        }
    }

    /// `self *= factor` for a signed machine word.
    pub fn mul_small_signed_in_place(&mut self, factor: i32) {
        self.mul_small_in_place(factor.unsigned_abs());
        if factor < 0 {
            self.negate();
        }
    }

    /// Divide the magnitude by `divisor` in place, keeping the sign, and
    /// return the magnitude remainder.
    #[allow(clippy::cast_possible_truncation)]
    pub fn div_small_in_place(&mut self, divisor: u32) -> MpResult<u32> {
        if divisor == 0 {
            return Err(MpError::DivideByZero);
        }
        let divisor = DoubleDigit::from(divisor);
        let mut rem: DoubleDigit = 0;
        let len = self.nonzero_len();
        for d in self.digits[..len].iter_mut().rev() {
            let cur = (rem << DIGIT_BITS) | DoubleDigit::from(*d);
            *d = (cur / divisor) as Digit;
            rem = cur % divisor;
        }
        self.normalize_zero();
        Ok(rem as u32)
    }

    /// Euclidean division by a signed machine word: `self` becomes the
    /// quotient and the returned remainder lies in `[0, |divisor|)`.
    pub fn div_small_signed_in_place(&mut self, divisor: i32) -> MpResult<u32> {
        let negative = self.is_negative();
        let magnitude = divisor.unsigned_abs();
        let mut rem = self.div_small_in_place(magnitude)?;
        if negative && rem != 0 {
            self.add_magnitude(&Self::from(1_u32));
            self.negative = true;
            rem = magnitude - rem;
        }
        if divisor < 0 {
            self.negate();
        }
        Ok(rem)
    }

    /// Magnitude remainder modulo a machine word.
    #[allow(clippy::cast_possible_truncation)]
    pub fn rem_small(&self, divisor: u32) -> MpResult<u32> {
        if divisor == 0 {
            return Err(MpError::DivideByZero);
        }
        let divisor = DoubleDigit::from(divisor);
        let rem = self.significant_digits().iter().rev().fold(0, |rem, &d| {
            ((rem << DIGIT_BITS) | DoubleDigit::from(d)) % divisor
        });
        Ok(rem as u32)
    }

    /// Shift the magnitude left by `bits`.
    pub fn shl_in_place(&mut self, bits: usize) {
        let len = self.nonzero_len();
        if len == 0 || bits == 0 {
            return;
        }
        let digit_shift = bits / DIGIT_BITS;
        let bit_shift = bits % DIGIT_BITS;
        self.reserve_digits(len + digit_shift + 1);

        if bit_shift == 0 {
            for i in (0..len).rev() {
                self.digits[i + digit_shift] = self.digits[i];
            }
        } else {
            for i in (0..len).rev() {
                let d = self.digits[i];
                self.digits[i + digit_shift + 1] |= d >> (DIGIT_BITS - bit_shift);
                self.digits[i + digit_shift] = (d << bit_shift) & DIGIT_MASK;
            }
        }
        self.digits[..digit_shift].fill(0);
    }

    /// Shift the magnitude right by `bits`, discarding the low bits.
    pub fn shr_in_place(&mut self, bits: usize) {
        let len = self.nonzero_len();
        if len == 0 || bits == 0 {
            return;
        }
        let digit_shift = bits / DIGIT_BITS;
        let bit_shift = bits % DIGIT_BITS;
        if digit_shift >= len {
            self.set_zero();
            return;
        }
        let kept = len - digit_shift;
        for i in 0..kept {
            let low = self.digits[i + digit_shift] >> bit_shift;
            let high = if bit_shift == 0 {
                0
            } else {
                (self.digit(i + digit_shift + 1) << (DIGIT_BITS - bit_shift)) & DIGIT_MASK
            };
            self.digits[i] = low | high;
        }
        self.digits[kept..len].fill(0);
        self.normalize_zero();
    }

    /// Shift left by whole digits.
    pub fn shl_digits(&mut self, count: usize) {
        self.shl_in_place(count * DIGIT_BITS);
    }

    /// Shift right by whole digits.
    pub fn shr_digits(&mut self, count: usize) {
        self.shr_in_place(count * DIGIT_BITS);
    }

    /// Leading digits as a double in which digit `unit_digit` has place
    /// value one. Accumulation stops once a nonzero digit no longer changes
    /// the result.
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    pub fn get_scaled_double(&self, unit_digit: usize) -> f64 {
        let len = self.nonzero_len();
        let mut result = 0.0_f64;
        for i in (0..len).rev() {
            let d = self.digits[i];
            if d == 0 {
                continue;
            }
            let exponent = (i as i64 - unit_digit as i64) * DIGIT_BITS as i64;
            let exponent = exponent.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
            let next = result + f64::from(d) * 2f64.powi(exponent);
            if next == result {
                break;
            }
            result = next;
        }
        result
    }
}

/// `a - b - borrow` on digits, returning the digit and outgoing borrow.
fn sub_digit(a: Digit, b: Digit, borrow: Digit) -> (Digit, Digit) {
    let sub = b + borrow;
    if a >= sub {
        (a - sub, 0)
    } else {
        ((a + (1 << DIGIT_BITS)) - sub, 1)
    }
}

/// Schoolbook product of the magnitudes of `left` and `right` into `result`.
///
/// Columns accumulate in a double digit and are folded only when another
/// digit product could overflow the accumulator.
#[allow(clippy::cast_possible_truncation)]
pub fn multiply_grade_school(left: &MpInt, right: &MpInt, result: &mut MpInt) {
    let ll = left.nonzero_len();
    let lr = right.nonzero_len();
    result.set_zero();
    if ll == 0 || lr == 0 {
        return;
    }
    result.reserve_digits(ll + lr);
    let l = &left.digits[..ll];
    let r = &right.digits[..lr];

    let mut carry: DoubleDigit = 0;
    for column in 0..(ll + lr - 1) {
        let lo = column.saturating_sub(lr - 1);
        let hi = column.min(ll - 1);
        let mut sum = carry;
        let mut high: DoubleDigit = 0;
        for i in lo..=hi {
            sum += DoubleDigit::from(l[i]) * DoubleDigit::from(r[column - i]);
            if sum >= FOLD_LIMIT {
                high += sum >> DIGIT_BITS;
                sum &= MASK;
            }
        }
        result.digits[column] = (sum & MASK) as Digit;
        carry = (sum >> DIGIT_BITS) + high;
    }
    let mut i = ll + lr - 1;
    while carry != 0 {
        result.reserve_digits(i + 1);
        result.digits[i] = (carry & MASK) as Digit;
        carry >>= DIGIT_BITS;
        i += 1;
    }
}

/// Schoolbook square of the magnitude of `x` into `result`, summing each
/// off-diagonal product once and doubling it.
#[allow(clippy::cast_possible_truncation)]
pub fn square_grade_school(x: &MpInt, result: &mut MpInt) {
    let len = x.nonzero_len();
    result.set_zero();
    if len == 0 {
        return;
    }
    result.reserve_digits(2 * len);
    let d = &x.digits[..len];

    let mut carry: DoubleDigit = 0;
    for column in 0..(2 * len - 1) {
        let lo = column.saturating_sub(len - 1);
        let mut sum: DoubleDigit = 0;
        let mut high: DoubleDigit = 0;
        let mut i = lo;
        while 2 * i < column {
            sum += DoubleDigit::from(d[i]) * DoubleDigit::from(d[column - i]);
            if sum >= FOLD_LIMIT {
                high += sum >> DIGIT_BITS;
                sum &= MASK;
            }
            i += 1;
        }
        high += sum >> DIGIT_BITS;
        sum &= MASK;

        let diagonal = if column % 2 == 0 {
            let v = DoubleDigit::from(d[column / 2]);
            v * v
        } else {
            0
        };
        let total = carry + diagonal + 2 * sum;
        result.digits[column] = (total & MASK) as Digit;
        carry = (total >> DIGIT_BITS) + 2 * high;
    }
    let mut i = 2 * len - 1;
    while carry != 0 {
        result.reserve_digits(i + 1);
        result.digits[i] = (carry & MASK) as Digit;
        carry >>= DIGIT_BITS;
        i += 1;
    }
}

/// Long division of magnitudes. The quotient replaces `dividend` and the
/// remainder is written to `remainder`; both come out non-negative.
///
/// Each quotient digit is estimated from the leading digits as doubles and
/// then corrected against the running remainder.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn divide_grade_school(
    dividend: &mut MpInt,
    divisor: &MpInt,
    remainder: &mut MpInt,
) -> MpResult<()> {
    let dl = divisor.nonzero_len();
    if dl == 0 {
        return Err(MpError::DivideByZero);
    }
    remainder.digits.clear();
    remainder.negative = false;
    dividend.negative = false;
    if dividend.compare_magnitude(divisor) == Ordering::Less {
        remainder.assign(dividend);
        dividend.set_zero();
        return Ok(());
    }

    let mut divisor_mag = divisor.clone();
    divisor_mag.negative = false;
    divisor_mag.trim();
    let divisor_double = divisor_mag.get_scaled_double(dl - 1);

    let nl = dividend.nonzero_len();
    let start = nl - dl;
    remainder.digits.extend_from_slice(&dividend.digits[start..nl]);
    dividend.digits[start..].fill(0);

    let mut multiple = MpInt::with_capacity_bits((dl + 1) * DIGIT_BITS);
    for pos in (0..=start).rev() {
        if pos < start {
            remainder.shl_digits(1);
            remainder.reserve_digits(1);
            remainder.digits[0] = dividend.digits[pos];
        }

        let estimate = remainder.get_scaled_double(dl - 1) / divisor_double;
        let q = if estimate >= f64::from(DIGIT_MASK) {
            DIGIT_MASK
        } else {
            estimate as Digit
        };

        let q = settle_quotient_digit(remainder, &divisor_mag, &mut multiple, q)?;
        dividend.digits[pos] = q;
    }
    dividend.normalize_zero();
    remainder.normalize_zero();
    Ok(())
}

/// Correct the estimated quotient digit `q` of `remainder / divisor` and
/// subtract `q · divisor` from `remainder`.
fn settle_quotient_digit(
    remainder: &mut MpInt,
    divisor: &MpInt,
    multiple: &mut MpInt,
    mut q: Digit,
) -> MpResult<Digit> {
    let mut corrections = 0_u32;
    let mut correct = || {
        corrections += 1;
        if corrections > MAX_QUOTIENT_CORRECTIONS {
            return Err(MpError::InvariantViolation(format!(
                "quotient digit estimate needed more than {MAX_QUOTIENT_CORRECTIONS} corrections"
            )));
        }
        Ok(())
    };
    if q > 0 {
        multiple.assign(divisor);
        multiple.mul_small_in_place(q);
        while remainder.compare_magnitude(multiple) == Ordering::Less {
            correct()?;
            q -= 1;
            multiple.sub_smaller_magnitude(divisor);
        }
        remainder.sub_smaller_magnitude(multiple);
    }
    while remainder.compare_magnitude(divisor) != Ordering::Less {
        correct()?;
        q += 1;
        remainder.sub_smaller_magnitude(divisor);
    }
    Ok(q)
}
