//! Comparison and operator traits for [`MpInt`].
//!
//! Operators route through the checked methods with the installed
//! thresholds and panic with the error's message when those report one.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Shl, ShlAssign, Shr,
    ShrAssign, Sub, SubAssign,
};

use num_traits::{One, Zero};

use crate::digits::MpInt;
use crate::error::MpResult;

fn or_panic<T>(result: MpResult<T>) -> T {
    result.unwrap_or_else(|err| panic!("{err}"))
}

impl PartialEq for MpInt {
    fn eq(&self, other: &Self) -> bool {
        self.negative == other.negative && self.compare_magnitude(other) == Ordering::Equal
    }
}

impl Eq for MpInt {}

impl PartialEq<i64> for MpInt {
    fn eq(&self, other: &i64) -> bool {
        *self == Self::from(*other)
    }
}

impl Ord for MpInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.compare_magnitude(other),
            (true, true) => other.compare_magnitude(self),
        }
    }
}

impl PartialOrd for MpInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for MpInt {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.negative.hash(state);
        self.significant_digits().hash(state);
    }
}

impl AddAssign<&MpInt> for MpInt {
    fn add_assign(&mut self, rhs: &MpInt) {
        self.add_in_place(rhs);
    }
}

impl SubAssign<&MpInt> for MpInt {
    fn sub_assign(&mut self, rhs: &MpInt) {
        self.sub_in_place(rhs);
    }
}

impl MulAssign<&MpInt> for MpInt {
    fn mul_assign(&mut self, rhs: &MpInt) {
        *self = or_panic(self.checked_mul(rhs));
    }
}

impl DivAssign<&MpInt> for MpInt {
    fn div_assign(&mut self, rhs: &MpInt) {
        let mut remainder = MpInt::new();
        or_panic(self.divide_in_place(rhs, &mut remainder));
    }
}

impl RemAssign<&MpInt> for MpInt {
    fn rem_assign(&mut self, rhs: &MpInt) {
        *self = or_panic(self.checked_rem(rhs));
    }
}

macro_rules! forward_binop {
    ($imp:ident, $method:ident, $assign_imp:ident, $assign_method:ident) => {
        impl $assign_imp<MpInt> for MpInt {
            fn $assign_method(&mut self, rhs: MpInt) {
                self.$assign_method(&rhs);
            }
        }

        impl $imp<&MpInt> for &MpInt {
            type Output = MpInt;

            fn $method(self, rhs: &MpInt) -> MpInt {
                let mut out = self.clone();
                out.$assign_method(rhs);
                out
            }
        }

        impl $imp<&MpInt> for MpInt {
            type Output = MpInt;

            fn $method(mut self, rhs: &MpInt) -> MpInt {
                self.$assign_method(rhs);
                self
            }
        }

        impl $imp<MpInt> for &MpInt {
            type Output = MpInt;

            fn $method(self, rhs: MpInt) -> MpInt {
                self.$method(&rhs)
            }
        }

        impl $imp<MpInt> for MpInt {
            type Output = MpInt;

            fn $method(mut self, rhs: MpInt) -> MpInt {
                self.$assign_method(&rhs);
                self
            }
        }
    };
}

forward_binop!(Add, add, AddAssign, add_assign);
forward_binop!(Sub, sub, SubAssign, sub_assign);
forward_binop!(Mul, mul, MulAssign, mul_assign);
forward_binop!(Div, div, DivAssign, div_assign);
forward_binop!(Rem, rem, RemAssign, rem_assign);

/// Operators with a machine integer on the right, through [`MpInt::from`].
macro_rules! forward_scalar_binop {
    ($scalar:ty, $imp:ident, $method:ident, $assign_imp:ident, $assign_method:ident) => {
        impl $assign_imp<$scalar> for MpInt {
            fn $assign_method(&mut self, rhs: $scalar) {
                self.$assign_method(&MpInt::from(rhs));
            }
        }

        impl $imp<$scalar> for MpInt {
            type Output = MpInt;

            fn $method(mut self, rhs: $scalar) -> MpInt {
                self.$assign_method(rhs);
                self
            }
        }

        impl $imp<$scalar> for &MpInt {
            type Output = MpInt;

            fn $method(self, rhs: $scalar) -> MpInt {
                self.clone().$method(rhs)
            }
        }
    };
}

forward_scalar_binop!(i64, Add, add, AddAssign, add_assign);
forward_scalar_binop!(i64, Sub, sub, SubAssign, sub_assign);
forward_scalar_binop!(i64, Mul, mul, MulAssign, mul_assign);
forward_scalar_binop!(i64, Div, div, DivAssign, div_assign);
forward_scalar_binop!(i64, Rem, rem, RemAssign, rem_assign);
forward_scalar_binop!(u32, Add, add, AddAssign, add_assign);
forward_scalar_binop!(u32, Sub, sub, SubAssign, sub_assign);
forward_scalar_binop!(u32, Mul, mul, MulAssign, mul_assign);
forward_scalar_binop!(u32, Div, div, DivAssign, div_assign);

/// Euclidean remainder modulo a machine word, in `[0, rhs)`.
impl Rem<u32> for &MpInt {
    type Output = u32;

    fn rem(self, rhs: u32) -> u32 {
        let r = or_panic(self.rem_small(rhs));
        if self.is_negative() && r != 0 {
            rhs - r
        } else {
            r
        }
    }
}

impl Rem<u32> for MpInt {
    type Output = u32;

    fn rem(self, rhs: u32) -> u32 {
        &self % rhs
    }
}

/// Shifts move the magnitude and keep the sign, so `-5 >> 1 == -2`.
impl ShlAssign<usize> for MpInt {
    fn shl_assign(&mut self, bits: usize) {
        self.shl_in_place(bits);
    }
}

impl ShrAssign<usize> for MpInt {
    fn shr_assign(&mut self, bits: usize) {
        self.shr_in_place(bits);
    }
}

impl Shl<usize> for MpInt {
    type Output = MpInt;

    fn shl(mut self, bits: usize) -> MpInt {
        self.shl_in_place(bits);
        self
    }
}

impl Shl<usize> for &MpInt {
    type Output = MpInt;

    fn shl(self, bits: usize) -> MpInt {
        self.clone() << bits
    }
}

impl Shr<usize> for MpInt {
    type Output = MpInt;

    fn shr(mut self, bits: usize) -> MpInt {
        self.shr_in_place(bits);
        self
    }
}

impl Shr<usize> for &MpInt {
    type Output = MpInt;

    fn shr(self, bits: usize) -> MpInt {
        self.clone() >> bits
    }
}

impl Neg for MpInt {
    type Output = MpInt;

    fn neg(mut self) -> MpInt {
        self.negate();
        self
    }
}

impl Neg for &MpInt {
    type Output = MpInt;

    fn neg(self) -> MpInt {
        -self.clone()
    }
}

impl Zero for MpInt {
    fn zero() -> Self {
        Self::new()
    }

    fn is_zero(&self) -> bool {
        MpInt::is_zero(self)
    }
}

impl One for MpInt {
    fn one() -> Self {
        Self::from(1_u32)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn int(v: i64) -> MpInt {
        MpInt::from(v)
    }

    #[test]
    fn ordering_respects_sign() {
        let mut values = vec![int(3), int(-10), int(0), int(-2), int(1 << 40)];
        values.sort();
        assert_eq!(values, vec![int(-10), int(-2), int(0), int(3), int(1 << 40)]);
    }

    #[test]
    fn equality_ignores_reserved_digits() {
        let mut a = int(42);
        a.reserve_bits(300);
        assert_eq!(a, int(42));
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&int(42)));
        assert_eq!(int(-9), -9);
    }

    #[test]
    fn arithmetic_operators() {
        let a = int(1_000_000_007);
        let b = int(-998_244_353);
        assert_eq!(&a + &b, int(1_755_654));
        assert_eq!(&a - &b, int(1_998_244_360));
        assert_eq!(&a * &b, int(-998_244_359_987_710_471));
        assert_eq!(int(-7) / int(3), int(-3));
        assert_eq!(int(-7) % int(3), int(2));
        assert_eq!(int(7) % int(-3), int(1));
        assert_eq!(-&a, int(-1_000_000_007));
    }

    #[test]
    fn assign_operators() {
        let mut x = int(10);
        x += int(5);
        x -= &int(3);
        x *= int(-2);
        assert_eq!(x, int(-24));
        x /= int(5);
        assert_eq!(x, int(-5));
        x %= int(3);
        assert_eq!(x, int(1));
    }

    #[test]
    fn shift_operators() {
        assert_eq!(int(1) << 30, MpInt::from_digits(vec![0, 1]));
        assert_eq!(int(-5) >> 1, int(-2));
        assert_eq!(&int(3) << 65 >> 64, int(6));
        let mut x = int(1);
        x <<= 100;
        x >>= 99;
        assert_eq!(x, int(2));
    }

    #[test]
    fn zero_and_one() {
        assert!(Zero::is_zero(&MpInt::zero()));
        assert!(MpInt::one().is_one());
    }

    #[test]
    #[should_panic(expected = "division by zero")]
    fn division_by_zero_panics() {
        let _ = int(1) / int(0);
    }

    #[test]
    fn machine_integer_operands() {
        let x: MpInt = "-1000000000000000000000".parse().unwrap();
        assert_eq!(&x + 7_i64, "-999999999999999999993".parse::<MpInt>().unwrap());
        assert_eq!(&x - (-7_i64), &x + 7_u32);
        assert_eq!(&x * -2_i64, "2000000000000000000000".parse::<MpInt>().unwrap());
        assert_eq!(int(6) * 7_u32, 42_i64);
        assert_eq!(int(-7) / 2_i64, -4_i64);
        assert_eq!(int(-7) / 2_u32, -4_i64);
        assert_eq!(int(7) / -2_i64, -3_i64);
        assert_eq!(int(-7) % 3_i64, int(2));
        assert_eq!(int(-7) % -3_i64, int(2));

        let mut y = int(10);
        y += 5_u32;
        y -= 20_i64;
        y *= 3_u32;
        assert_eq!(y, -15_i64);
        y /= 4_i64;
        assert_eq!(y, -4_i64);
    }

    #[test]
    fn remainder_by_machine_word() {
        assert_eq!(int(-7) % 3_u32, 2_u32);
        assert_eq!(&int(-6) % 3_u32, 0_u32);
        assert_eq!(int(17) % 5_u32, 2_u32);
        let big: MpInt = "-123456789012345678901234567890".parse().unwrap();
        let wide = (&big % int(1_000_000_007)).to_string();
        assert_eq!((&big % 1_000_000_007_u32).to_string(), wide);
    }

    #[test]
    #[should_panic(expected = "division by zero")]
    fn machine_word_remainder_by_zero_panics() {
        let _ = int(5) % 0_u32;
    }
}
