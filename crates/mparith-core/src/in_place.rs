//! A pair of buffers that alternate as source and destination.
//!
//! Repeated squaring and multiplication cannot write into an operand they
//! are still reading, so each step writes into the idle buffer and then
//! makes it current. Storage grows once and is reused for every step.

use crate::digits::MpInt;
use crate::error::MpResult;
use crate::multiply::{multiply, square_magnitude};
use crate::thresholds::Thresholds;

/// Two [`MpInt`] buffers, one of which holds the current value.
#[derive(Debug, Clone, Default)]
pub struct PingPong {
    buffers: [MpInt; 2],
    active: usize,
    /// Quotient storage for [`modulus_in_place`](Self::modulus_in_place).
    scratch: MpInt,
}

impl PingPong {
    /// Start from `value`.
    #[must_use]
    pub fn new(value: MpInt) -> Self {
        Self {
            buffers: [value, MpInt::new()],
            active: 0,
            scratch: MpInt::new(),
        }
    }

    /// The current value.
    #[must_use]
    pub fn current(&self) -> &MpInt {
        &self.buffers[self.active]
    }

    /// Run `f(current, idle)`, which writes the next value into `idle`,
    /// then make `idle` current.
    ///
    /// The current buffer is untouched if `f` fails.
    pub fn swap_and_write<F>(&mut self, f: F) -> MpResult<&MpInt>
    where
        F: FnOnce(&MpInt, &mut MpInt) -> MpResult<()>,
    {
        let (current, idle) = split(&mut self.buffers, self.active);
        f(current, idle)?;
        self.active ^= 1;
        Ok(self.current())
    }

    /// Replace the current value with `current · rhs`.
    pub fn multiply_in_place(&mut self, rhs: &MpInt, thresholds: &Thresholds) -> MpResult<&MpInt> {
        self.swap_and_write(|x, out| multiply(x, rhs, out, thresholds))
    }

    /// Replace the current value with its square.
    pub fn square_in_place(&mut self, thresholds: &Thresholds) -> MpResult<&MpInt> {
        self.swap_and_write(|x, out| square_magnitude(x, out, thresholds))
    }

    /// Replace the current value with its Euclidean remainder modulo
    /// `modulus`.
    ///
    /// The quotient is computed in a scratch buffer kept across calls.
    pub fn modulus_in_place(&mut self, modulus: &MpInt, thresholds: &Thresholds) -> MpResult<&MpInt> {
        let (current, idle) = split(&mut self.buffers, self.active);
        self.scratch.assign(current);
        self.scratch.divide_in_place_with(modulus, idle, thresholds)?;
        self.active ^= 1;
        Ok(self.current())
    }

    /// Reserve room for `bits` bits in both buffers and the scratch.
    pub fn reserve_bits(&mut self, bits: usize) {
        for buffer in &mut self.buffers {
            buffer.reserve_bits(bits);
        }
        self.scratch.reserve_bits(bits);
    }

    /// Reserve room for `bits` bits in the buffer that will be current
    /// after `writes` more steps.
    pub fn reserve_bits_after(&mut self, writes: u32, bits: usize) {
        let index = if writes % 2 == 1 {
            self.active ^ 1
        } else {
            self.active
        };
        self.buffers[index].reserve_bits(bits);
    }

    /// Take the current value.
    #[must_use]
    pub fn into_inner(self) -> MpInt {
        let [a, b] = self.buffers;
        if self.active == 0 {
            a
        } else {
            b
        }
    }
}

/// The buffer at `active` and the other one, mutably.
fn split(buffers: &mut [MpInt; 2], active: usize) -> (&MpInt, &mut MpInt) {
    let (first, second) = buffers.split_at_mut(1);
    if active == 0 {
        (&first[0], &mut second[0])
    } else {
        (&second[0], &mut first[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MpError;

    #[test]
    fn alternates_buffers() {
        let th = Thresholds::DEFAULT;
        let mut pp = PingPong::new(MpInt::from(3_i64));
        pp.square_in_place(&th).unwrap();
        pp.multiply_in_place(&MpInt::from(-2_i64), &th).unwrap();
        assert_eq!(pp.current(), &MpInt::from(-18_i64));
        pp.modulus_in_place(&MpInt::from(7_i64), &th).unwrap();
        assert_eq!(pp.into_inner(), MpInt::from(3_i64));
    }

    #[test]
    fn failure_keeps_current() {
        let th = Thresholds::DEFAULT;
        let mut pp = PingPong::new(MpInt::from(11_i64));
        let err = pp.modulus_in_place(&MpInt::new(), &th).unwrap_err();
        assert_eq!(err, MpError::DivideByZero);
        assert_eq!(pp.current(), &MpInt::from(11_i64));
    }

    #[test]
    fn reserve_does_not_change_value() {
        let mut pp = PingPong::new(MpInt::from(5_i64));
        pp.reserve_bits(1_000);
        assert_eq!(pp.current(), &MpInt::from(5_i64));
    }

    #[test]
    fn modulus_reuses_storage() {
        let th = Thresholds::DEFAULT;
        let modulus: MpInt = "340282366920938463463374607431768211507".parse().unwrap();
        let mut pp = PingPong::new(MpInt::from(0x1234_5678_9abc_u64));
        pp.reserve_bits(2 * modulus.num_bits() + 64);
        let before = pp.scratch.digits.capacity();
        let mut expected = MpInt::from(0x1234_5678_9abc_u64);
        for _ in 0..40 {
            pp.square_in_place(&th).unwrap();
            pp.modulus_in_place(&modulus, &th).unwrap();
            expected = (&expected * &expected) % &modulus;
            assert_eq!(pp.current(), &expected);
        }
        assert_eq!(pp.scratch.digits.capacity(), before);
    }

    #[test]
    fn modulus_failure_keeps_current() {
        let th = Thresholds::DEFAULT;
        let mut pp = PingPong::new(MpInt::from(-20_i64));
        pp.modulus_in_place(&MpInt::from(6_i64), &th).unwrap();
        assert_eq!(pp.current(), &MpInt::from(4_i64));
        assert!(pp.modulus_in_place(&MpInt::new(), &th).is_err());
        assert_eq!(pp.into_inner(), MpInt::from(4_i64));
    }

    #[test]
    fn reserve_after_targets_one_buffer() {
        let mut pp = PingPong::new(MpInt::from(9_i64));
        pp.reserve_bits_after(3, 3_000);
        assert_eq!(pp.current().digits().len(), 1);
        assert_eq!(pp.buffers[1].digits().len(), 100);
        pp.reserve_bits_after(2, 6_000);
        assert_eq!(pp.current().digits().len(), 200);
        assert_eq!(pp.buffers[1].digits().len(), 100);
    }
}
