//! Complex doubles and power-of-two length sequences of them with the
//! discrete Fourier transforms used by the floating-point multiplier.

use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::error::{MpError, MpResult};

/// A complex number with `f64` parts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComplexDouble {
    re: f64,
    im: f64,
}

impl ComplexDouble {
    /// Zero.
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };
    /// One.
    pub const ONE: Self = Self { re: 1.0, im: 0.0 };

    #[must_use]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    #[must_use]
    pub const fn re(self) -> f64 {
        self.re
    }

    #[must_use]
    pub const fn im(self) -> f64 {
        self.im
    }

    /// Modulus.
    #[must_use]
    pub fn abs(self) -> f64 {
        self.re.hypot(self.im)
    }

    #[must_use]
    pub fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }

    /// `e^(i·theta)`.
    #[must_use]
    pub fn cis(theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self::new(cos, sin)
    }

    /// `e^(2πi/n)`; a negative `n` gives the inverse root.
    #[must_use]
    pub fn root_of_unity(n: i32) -> Self {
        Self::cis(2.0 * PI / f64::from(n))
    }

    /// `self^exponent` by repeated squaring.
    #[must_use]
    pub fn pow(self, mut exponent: u32) -> Self {
        let mut base = self;
        let mut result = Self::ONE;
        while exponent > 0 {
            if exponent & 1 == 1 {
                result *= base;
            }
            base *= base;
            exponent >>= 1;
        }
        result
    }
}

impl Add for ComplexDouble {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for ComplexDouble {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for ComplexDouble {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Mul<f64> for ComplexDouble {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.re * rhs, self.im * rhs)
    }
}

impl Neg for ComplexDouble {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}

impl AddAssign for ComplexDouble {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for ComplexDouble {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for ComplexDouble {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl MulAssign<f64> for ComplexDouble {
    fn mul_assign(&mut self, rhs: f64) {
        *self = *self * rhs;
    }
}

impl fmt::Display for ComplexDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im.is_sign_negative() {
            write!(f, "{}-{}i", self.re, -self.im)
        } else {
            write!(f, "{}+{}i", self.re, self.im)
        }
    }
}

/// A sequence of complex samples. Transforms require a power-of-two length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComplexSequence {
    values: Vec<ComplexDouble>,
}

#[allow(clippy::cast_precision_loss)]
fn twiddle(sign: f64, j: usize, span: usize) -> ComplexDouble {
    ComplexDouble::cis(sign * 2.0 * PI * j as f64 / span as f64)
}

impl ComplexSequence {
    /// `len` zeros.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![ComplexDouble::ZERO; len],
        }
    }

    #[must_use]
    pub fn from_vec(values: Vec<ComplexDouble>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ComplexDouble] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComplexDouble> {
        self.values.iter()
    }

    /// Copy extended with zeros (or truncated) to `len`.
    #[must_use]
    pub fn padded(&self, len: usize) -> Self {
        let mut values = self.values.clone();
        values.resize(len, ComplexDouble::ZERO);
        Self { values }
    }

    /// Element-wise sum; the shorter sequence is zero-extended.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let len = self.len().max(other.len());
        let mut out = self.padded(len);
        for (x, &y) in out.values.iter_mut().zip(&other.values) {
            *x += y;
        }
        out
    }

    /// `self[i] *= other[i]`.
    pub fn pointwise_multiply_in_place(&mut self, other: &Self) -> MpResult<()> {
        if self.len() != other.len() {
            return Err(MpError::InvalidArgument(format!(
                "pointwise product of lengths {} and {}",
                self.len(),
                other.len()
            )));
        }
        for (x, &y) in self.values.iter_mut().zip(&other.values) {
            *x *= y;
        }
        Ok(())
    }

    /// `self[i] *= self[i]`.
    pub fn pointwise_square_in_place(&mut self) {
        for x in &mut self.values {
            *x *= *x;
        }
    }

    fn check_length(&self) -> MpResult<()> {
        if self.len().is_power_of_two() {
            Ok(())
        } else {
            Err(MpError::InvalidArgument(format!(
                "transform length {} is not a power of two",
                self.len()
            )))
        }
    }

    /// Forward transform `X_k = Σ x_j e^(-2πi·jk/n)` by recursive
    /// even/odd splitting, output in natural order.
    pub fn dft_recursive(&self) -> MpResult<Self> {
        self.check_length()?;
        Ok(Self::from_vec(recursive_transform(&self.values, -1.0)))
    }

    /// Inverse of [`dft_recursive`](Self::dft_recursive), scaled by `1/n`.
    #[allow(clippy::cast_precision_loss)]
    pub fn inverse_dft_recursive(&self) -> MpResult<Self> {
        self.check_length()?;
        let scale = 1.0 / self.len() as f64;
        let values = recursive_transform(&self.values, 1.0)
            .into_iter()
            .map(|x| x * scale)
            .collect();
        Ok(Self::from_vec(values))
    }

    /// Forward transform in place, leaving the output in bit-reversed
    /// order. Pairs with
    /// [`inverse_dft_in_place_unscramble`](Self::inverse_dft_in_place_unscramble).
    pub fn dft_in_place_scramble(&mut self) -> MpResult<()> {
        self.check_length()?;
        let len = self.len();
        let mut half = len / 2;
        while half >= 1 {
            for j in 0..half {
                let w = twiddle(-1.0, j, 2 * half);
                for i in (j..len).step_by(2 * half) {
                    let a = self.values[i];
                    let b = self.values[i + half];
                    self.values[i] = a + b;
                    self.values[i + half] = (a - b) * w;
                }
            }
            half /= 2;
        }
        Ok(())
    }

    /// Inverse transform from bit-reversed input to natural order, scaled
    /// by `1/n`.
    #[allow(clippy::cast_precision_loss)]
    pub fn inverse_dft_in_place_unscramble(&mut self) -> MpResult<()> {
        self.check_length()?;
        let len = self.len();
        let mut half = 1;
        while half < len {
            for j in 0..half {
                let w = twiddle(1.0, j, 2 * half);
                for i in (j..len).step_by(2 * half) {
                    let a = self.values[i];
                    let t = self.values[i + half] * w;
                    self.values[i] = a + t;
                    self.values[i + half] = a - t;
                }
            }
            half *= 2;
        }
        let scale = 1.0 / len as f64;
        for x in &mut self.values {
            *x *= scale;
        }
        Ok(())
    }
}

fn recursive_transform(values: &[ComplexDouble], sign: f64) -> Vec<ComplexDouble> {
    let n = values.len();
    if n == 1 {
        return values.to_vec();
    }
    let even: Vec<_> = values.iter().step_by(2).copied().collect();
    let odd: Vec<_> = values.iter().skip(1).step_by(2).copied().collect();
    let even = recursive_transform(&even, sign);
    let odd = recursive_transform(&odd, sign);
    let mut out = vec![ComplexDouble::ZERO; n];
    for k in 0..n / 2 {
        let t = odd[k] * twiddle(sign, k, n);
        out[k] = even[k] + t;
        out[k + n / 2] = even[k] - t;
    }
    out
}

impl Index<usize> for ComplexSequence {
    type Output = ComplexDouble;

    fn index(&self, index: usize) -> &ComplexDouble {
        &self.values[index]
    }
}

impl IndexMut<usize> for ComplexSequence {
    fn index_mut(&mut self, index: usize) -> &mut ComplexDouble {
        &mut self.values[index]
    }
}
