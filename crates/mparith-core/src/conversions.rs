//! Conversions between [`MpInt`] and machine integers and strings.

use std::fmt;
use std::str::FromStr;

use crate::digits::{digits_for_bits, MpInt, DIGIT_BITS};
use crate::error::{MpError, MpResult};

/// Decimal chunk processed per small multiply or divide.
const DECIMAL_CHUNK: u32 = 1_000_000_000;
const DECIMAL_CHUNK_DIGITS: usize = 9;
const POWERS_OF_TEN: [u32; 10] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
];

impl From<u64> for MpInt {
    fn from(value: u64) -> Self {
        let mut x = Self::new();
        x.set_small(value);
        x
    }
}

impl From<i64> for MpInt {
    fn from(value: i64) -> Self {
        let mut x = Self::from(value.unsigned_abs());
        x.negative = value < 0;
        x.normalize_zero();
        x
    }
}

impl From<u32> for MpInt {
    fn from(value: u32) -> Self {
        Self::from(u64::from(value))
    }
}

impl From<i32> for MpInt {
    fn from(value: i32) -> Self {
        Self::from(i64::from(value))
    }
}

impl MpInt {
    /// Magnitude as a `u64`, if it fits.
    fn magnitude_u64(&self) -> Option<u64> {
        if self.num_bits() > 64 {
            return None;
        }
        Some(
            self.significant_digits()
                .iter()
                .rev()
                .fold(0_u64, |acc, &d| (acc << DIGIT_BITS) | u64::from(d)),
        )
    }

    /// Decimal digits of the magnitude.
    fn magnitude_decimal(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let mut rest = self.abs();
        let mut chunks = Vec::new();
        while !rest.is_zero() {
            // The divisor is a nonzero constant.
            let chunk = rest.div_small_in_place(DECIMAL_CHUNK).unwrap_or_default();
            chunks.push(chunk);
        }
        let mut out = String::with_capacity(chunks.len() * DECIMAL_CHUNK_DIGITS);
        let mut iter = chunks.iter().rev();
        if let Some(first) = iter.next() {
            out.push_str(&first.to_string());
        }
        for chunk in iter {
            out.push_str(&format!("{chunk:09}"));
        }
        out
    }

    /// Hex digits of the magnitude, upper- or lowercase.
    #[allow(clippy::cast_possible_truncation)]
    fn magnitude_hex(&self, upper: bool) -> String {
        let bits = self.num_bits();
        if bits == 0 {
            return "0".to_string();
        }
        let table: &[u8; 16] = if upper {
            b"0123456789ABCDEF"
        } else {
            b"0123456789abcdef"
        };
        let mut nibbles = Vec::with_capacity(bits.div_ceil(4) + 1);
        let mut acc: u64 = 0;
        let mut acc_bits = 0;
        for &d in self.significant_digits() {
            acc |= u64::from(d) << acc_bits;
            acc_bits += DIGIT_BITS;
            while acc_bits >= 4 {
                nibbles.push(table[(acc & 0xF) as usize]);
                acc >>= 4;
                acc_bits -= 4;
            }
        }
        if acc_bits > 0 {
            nibbles.push(table[(acc & 0xF) as usize]);
        }
        nibbles.truncate(bits.div_ceil(4));
        nibbles.iter().rev().map(|&b| char::from(b)).collect()
    }

    /// Signed decimal representation. Zero prints as `0`.
    #[must_use]
    pub fn to_decimal_string(&self) -> String {
        self.to_string()
    }

    /// Signed uppercase hexadecimal without a prefix, e.g. `-1F`.
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        let digits = self.magnitude_hex(true);
        if self.negative {
            format!("-{digits}")
        } else {
            digits
        }
    }

    /// Parse hexadecimal digits with an optional leading `-`. A `0x` prefix
    /// is accepted after the sign.
    pub fn from_hex_str(s: &str) -> MpResult<Self> {
        let (negative, body) = split_sign(s)?;
        let body = body
            .strip_prefix("0x")
            .or_else(|| body.strip_prefix("0X"))
            .unwrap_or(body);
        if body.is_empty() {
            return Err(MpError::Parse(format!("no hex digits in {s:?}")));
        }
        let mut x = Self::with_capacity_bits(body.len() * 4);
        for (i, c) in body.bytes().rev().enumerate() {
            let v = char::from(c)
                .to_digit(16)
                .ok_or_else(|| MpError::Parse(format!("invalid hex digit {:?} in {s:?}", char::from(c))))?;
            for b in 0..4 {
                if (v >> b) & 1 == 1 {
                    x.set_bit(4 * i + b, true);
                }
            }
        }
        x.negative = negative;
        x.normalize_zero();
        Ok(x)
    }
}

fn split_sign(s: &str) -> MpResult<(bool, &str)> {
    if s.is_empty() {
        return Err(MpError::Parse("empty string".to_string()));
    }
    Ok(match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    })
}

impl FromStr for MpInt {
    type Err = MpError;

    /// Parse decimal digits with an optional leading `-`.
    fn from_str(s: &str) -> MpResult<Self> {
        let (negative, body) = split_sign(s)?;
        if body.is_empty() {
            return Err(MpError::Parse(format!("no digits in {s:?}")));
        }
        if let Some(bad) = body.chars().find(|c| !c.is_ascii_digit()) {
            return Err(MpError::Parse(format!("invalid digit {bad:?} in {s:?}")));
        }

        // log2(10) < 10/3
        let mut x = Self::new();
        x.digits.reserve(digits_for_bits(body.len() * 10 / 3 + 1));
        let bytes = body.as_bytes();
        let head = bytes.len() % DECIMAL_CHUNK_DIGITS;
        let mut start = 0;
        let mut chunk_len = if head == 0 { DECIMAL_CHUNK_DIGITS } else { head };
        while start < bytes.len() {
            let chunk = bytes[start..start + chunk_len]
                .iter()
                .fold(0_u32, |acc, &b| acc * 10 + u32::from(b - b'0'));
            x.mul_small_in_place(POWERS_OF_TEN[chunk_len]);
            x.add_in_place(&Self::from(chunk));
            start += chunk_len;
            chunk_len = DECIMAL_CHUNK_DIGITS;
        }
        x.negative = negative;
        x.normalize_zero();
        Ok(x)
    }
}

impl fmt::Display for MpInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(!self.negative, "", &self.magnitude_decimal())
    }
}

impl fmt::Debug for MpInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MpInt({self})")
    }
}

impl fmt::LowerHex for MpInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(!self.negative, "0x", &self.magnitude_hex(false))
    }
}

impl fmt::UpperHex for MpInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(!self.negative, "0x", &self.magnitude_hex(true))
    }
}

impl TryFrom<&MpInt> for u64 {
    type Error = MpError;

    fn try_from(value: &MpInt) -> MpResult<Self> {
        if value.negative {
            return Err(MpError::Overflow("u64"));
        }
        value.magnitude_u64().ok_or(MpError::Overflow("u64"))
    }
}

impl TryFrom<&MpInt> for i64 {
    type Error = MpError;

    fn try_from(value: &MpInt) -> MpResult<Self> {
        let magnitude = value.magnitude_u64().ok_or(MpError::Overflow("i64"))?;
        if value.negative {
            0_i64
                .checked_sub_unsigned(magnitude)
                .ok_or(MpError::Overflow("i64"))
        } else {
            Self::try_from(magnitude).map_err(|_| MpError::Overflow("i64"))
        }
    }
}

impl TryFrom<&MpInt> for u32 {
    type Error = MpError;

    fn try_from(value: &MpInt) -> MpResult<Self> {
        let wide = u64::try_from(value).map_err(|_| MpError::Overflow("u32"))?;
        Self::try_from(wide).map_err(|_| MpError::Overflow("u32"))
    }
}

impl TryFrom<&MpInt> for i32 {
    type Error = MpError;

    fn try_from(value: &MpInt) -> MpResult<Self> {
        let wide = i64::try_from(value).map_err(|_| MpError::Overflow("i32"))?;
        Self::try_from(wide).map_err(|_| MpError::Overflow("i32"))
    }
}

impl MpInt {
    /// True when the value fits in an `i32`.
    #[must_use]
    pub fn is_i32(&self) -> bool {
        i32::try_from(self).is_ok()
    }
}
