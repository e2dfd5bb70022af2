//! Number-theoretic utilities built on the public arithmetic.

use rand::Rng;
use tracing::trace;

use crate::constants::{DEFAULT_FALSE_POSITIVE_PROBABILITY, TRIAL_DIVISION_MAX_BITS};
use crate::digits::MpInt;
use crate::error::{MpError, MpResult};
use crate::in_place::PingPong;
use crate::thresholds::Thresholds;

/// Bézout coefficients: `x·a + y·b == gcd` with `gcd >= 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bezout {
    pub x: MpInt,
    pub y: MpInt,
    pub gcd: MpInt,
}

/// `base^exponent` by square-and-multiply.
///
/// Only the buffer that ends up holding the result is sized up front, from
/// `bits(base) · exponent`.
pub fn pow(base: &MpInt, exponent: u32) -> MpResult<MpInt> {
    if exponent == 0 {
        return Ok(MpInt::from(1_u32));
    }
    if base.num_bits() <= 1 {
        let mut result = if exponent % 2 == 0 {
            base.abs()
        } else {
            base.clone()
        };
        result.trim();
        return Ok(result);
    }

    let thresholds = Thresholds::current();
    let bits = usize::try_from(exponent)
        .ok()
        .and_then(|e| base.num_bits().checked_mul(e))
        .ok_or(MpError::Overflow("usize"))?;
    let mut result = PingPong::new(MpInt::from(1_u32));
    let mut power = PingPong::new(base.clone());
    result.reserve_bits_after(exponent.count_ones(), bits);

    let mut e = exponent;
    while e > 0 {
        if e & 1 == 1 {
            result.multiply_in_place(power.current(), &thresholds)?;
        }
        e >>= 1;
        if e > 0 {
            power.square_in_place(&thresholds)?;
        }
    }
    let mut value = result.into_inner();
    value.trim();
    Ok(value)
}

/// `base^exponent mod modulus`.
pub fn pow_mod(base: &MpInt, exponent: &MpInt, modulus: &MpInt) -> MpResult<MpInt> {
    let mut result = MpInt::new();
    pow_mod_into(base, exponent, modulus, &mut result)?;
    Ok(result)
}

/// [`pow_mod`] writing into `result`.
///
/// Requires `modulus > 0`, `exponent >= 0` and `0 <= base < modulus`.
/// Every square and product is reduced immediately.
pub fn pow_mod_into(
    base: &MpInt,
    exponent: &MpInt,
    modulus: &MpInt,
    result: &mut MpInt,
) -> MpResult<()> {
    if !modulus.is_positive() {
        return Err(MpError::InvalidArgument(format!(
            "modulus must be positive, got {modulus}"
        )));
    }
    if exponent.is_negative() {
        return Err(MpError::InvalidArgument(format!(
            "exponent must be non-negative, got {exponent}"
        )));
    }
    if base.is_negative() || base >= modulus {
        return Err(MpError::InvalidArgument(format!(
            "base {base} is outside [0, {modulus})"
        )));
    }

    let thresholds = Thresholds::current();
    let mut acc = PingPong::new(MpInt::from(1_u32));
    acc.reserve_bits(2 * modulus.num_bits());
    acc.modulus_in_place(modulus, &thresholds)?;
    for i in (0..exponent.num_bits()).rev() {
        acc.square_in_place(&thresholds)?;
        acc.modulus_in_place(modulus, &thresholds)?;
        if exponent.bit(i) {
            acc.multiply_in_place(base, &thresholds)?;
            acc.modulus_in_place(modulus, &thresholds)?;
        }
    }
    result.assign(acc.current());
    Ok(())
}

/// Probabilistic primality test with a false-positive probability of at
/// most `1e-6`.
pub fn is_prime(n: &MpInt) -> MpResult<bool> {
    is_prime_with(n, DEFAULT_FALSE_POSITIVE_PROBABILITY, &mut rand::rng())
}

/// Primality test with an explicit false-positive bound and witness source.
///
/// Small numbers are settled by trial division; larger ones by
/// Miller-Rabin rounds, each of which at least quarters the chance that a
/// composite passes.
pub fn is_prime_with<R: Rng + ?Sized>(
    n: &MpInt,
    false_positive_probability: f64,
    rng: &mut R,
) -> MpResult<bool> {
    if !n.is_positive() {
        return Err(MpError::InvalidArgument(format!(
            "primality is defined for positive integers, got {n}"
        )));
    }
    if false_positive_probability.is_nan() || false_positive_probability <= 0.0 {
        return Err(MpError::InvalidArgument(format!(
            "false-positive probability must be positive, got {false_positive_probability}"
        )));
    }
    if n.is_one() {
        return Ok(false);
    }
    if n.is_even() {
        return Ok(*n == 2);
    }
    if n.num_bits() <= TRIAL_DIVISION_MAX_BITS {
        return Ok(trial_division(u64::try_from(n)?));
    }
    miller_rabin(n, false_positive_probability, rng)
}

fn trial_division(n: u64) -> bool {
    let mut p = 3;
    while p * p <= n {
        if n % p == 0 {
            return false;
        }
        p += 2;
    }
    true
}

fn miller_rabin<R: Rng + ?Sized>(n: &MpInt, probability: f64, rng: &mut R) -> MpResult<bool> {
    let thresholds = Thresholds::current();
    let one = MpInt::from(1_u32);
    let mut n_minus_one = n.clone();
    n_minus_one.sub_in_place(&one);
    let twos = n_minus_one.count_trailing_zeros();
    let mut odd_part = n_minus_one.clone();
    odd_part.shr_in_place(twos);

    let mut bound = probability;
    let mut rounds = 0_u32;
    while bound < 1.0 {
        let witness = loop {
            let candidate = MpInt::random_below(rng, n)?;
            if !candidate.is_zero() {
                break candidate;
            }
        };
        let mut x = PingPong::new(pow_mod(&witness, &odd_part, n)?);
        rounds += 1;
        if x.current().is_one() || *x.current() == n_minus_one {
            bound *= 4.0;
            continue;
        }
        let mut passed = false;
        for _ in 1..twos {
            x.square_in_place(&thresholds)?;
            x.modulus_in_place(n, &thresholds)?;
            if *x.current() == n_minus_one {
                passed = true;
                break;
            }
            if x.current().is_one() {
                break;
            }
        }
        if !passed {
            trace!(rounds, "miller-rabin found a witness");
            return Ok(false);
        }
        bound *= 4.0;
    }
    trace!(rounds, "miller-rabin passed");
    Ok(true)
}

/// Iterative extended Euclid. The identity `x·a + y·b == gcd` is verified
/// before returning.
pub fn extended_euclidean(a: &MpInt, b: &MpInt) -> MpResult<Bezout> {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (MpInt::from(1_u32), MpInt::new());
    let (mut old_t, mut t) = (MpInt::new(), MpInt::from(1_u32));

    while !r.is_zero() {
        let (q, rem) = old_r.checked_div_rem(&r)?;
        old_r = std::mem::replace(&mut r, rem);
        let next_s = &old_s - &q.checked_mul(&s)?;
        old_s = std::mem::replace(&mut s, next_s);
        let next_t = &old_t - &q.checked_mul(&t)?;
        old_t = std::mem::replace(&mut t, next_t);
    }
    if old_r.is_negative() {
        old_r.negate();
        old_s.negate();
        old_t.negate();
    }

    let mut check = old_s.checked_mul(a)?;
    check.add_in_place(&old_t.checked_mul(b)?);
    if check != old_r {
        return Err(MpError::InvariantViolation(format!(
            "bezout identity failed for gcd({a}, {b})"
        )));
    }
    Ok(Bezout {
        x: old_s,
        y: old_t,
        gcd: old_r,
    })
}

/// Inverse of `a` modulo `m`, in `[0, m)`.
pub fn modular_inverse(a: &MpInt, m: &MpInt) -> MpResult<MpInt> {
    if !m.is_positive() {
        return Err(MpError::InvalidArgument(format!(
            "modulus must be positive, got {m}"
        )));
    }
    let bezout = extended_euclidean(a, m)?;
    if !bezout.gcd.is_one() {
        return Err(MpError::NotInvertible);
    }
    bezout.x.checked_rem(m)
}

/// Non-negative greatest common divisor; `gcd(0, 0) == 0`.
pub fn gcd(a: &MpInt, b: &MpInt) -> MpResult<MpInt> {
    let (mut x, mut y) = (a.abs(), b.abs());
    while !y.is_zero() {
        let r = x.checked_rem(&y)?;
        x = std::mem::replace(&mut y, r);
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn int(v: i64) -> MpInt {
        MpInt::from(v)
    }

    fn big(s: &str) -> MpInt {
        s.parse().unwrap()
    }

    #[test]
    fn powers() {
        assert_eq!(pow(&int(3), 0).unwrap(), int(1));
        assert_eq!(pow(&int(-2), 5).unwrap(), int(-32));
        assert_eq!(pow(&int(-2), 6).unwrap(), int(64));
        assert_eq!(
            pow(&int(10), 30).unwrap(),
            big("1000000000000000000000000000000")
        );
        assert_eq!(pow(&MpInt::new(), 3).unwrap(), MpInt::new());
        assert_eq!(pow(&MpInt::new(), 0).unwrap(), int(1));
    }

    #[test]
    fn unit_bases_stay_small() {
        let one = pow(&int(1), 3_000_000).unwrap();
        assert_eq!(one, int(1));
        assert_eq!(one.digits().len(), 1);
        assert_eq!(pow(&int(-1), 7).unwrap(), int(-1));
        assert_eq!(pow(&int(-1), 3_000_000).unwrap(), int(1));
        let odd = pow(&int(-1), u32::MAX).unwrap();
        assert_eq!(odd, int(-1));
        assert_eq!(odd.digits().len(), 1);
        assert!(pow(&MpInt::new(), u32::MAX).unwrap().digits().is_empty());
    }

    #[test]
    fn powers_come_back_trimmed() {
        let value = pow(&int(3), 200).unwrap();
        assert_eq!(value.digits().len(), value.nonzero_len());
        assert_eq!(value, &pow(&int(3), 100).unwrap() * &pow(&int(3), 100).unwrap());
    }

    #[test]
    fn modular_powers() {
        assert_eq!(pow_mod(&int(4), &int(13), &int(497)).unwrap(), int(445));
        assert_eq!(pow_mod(&int(0), &int(0), &int(7)).unwrap(), int(1));
        assert!(pow_mod(&int(5), &int(3), &int(1)).is_err());
        assert_eq!(pow_mod(&int(0), &int(5), &int(1)).unwrap(), int(0));
        // Fermat: a^(p-1) ≡ 1 for the Mersenne prime 2^127 - 1.
        let p = big("170141183460469231731687303715884105727");
        let mut p_minus_one = p.clone();
        p_minus_one.sub_in_place(&int(1));
        assert_eq!(pow_mod(&int(3), &p_minus_one, &p).unwrap(), int(1));
    }

    #[test]
    fn modular_power_argument_checks() {
        assert!(matches!(
            pow_mod(&int(2), &int(3), &int(0)),
            Err(MpError::InvalidArgument(_))
        ));
        assert!(pow_mod(&int(2), &int(-3), &int(7)).is_err());
        assert!(pow_mod(&int(-2), &int(3), &int(7)).is_err());
        assert!(pow_mod(&int(9), &int(3), &int(7)).is_err());
    }

    #[test]
    fn small_primes_by_trial_division() {
        let mut rng = StdRng::seed_from_u64(3);
        let primes: Vec<i64> = (1..200)
            .filter(|&v| is_prime_with(&int(v), 1e-6, &mut rng).unwrap())
            .collect();
        assert_eq!(&primes[..10], &[2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert!(!primes.contains(&9));
        assert!(!primes.contains(&25));
        assert!(!primes.contains(&49));
        assert!(!is_prime_with(&int(1_046_529), 1e-6, &mut rng).unwrap());
    }

    #[test]
    fn miller_rabin_cases() {
        let mut rng = StdRng::seed_from_u64(99);
        let mersenne = big("170141183460469231731687303715884105727");
        assert!(is_prime_with(&mersenne, 1e-9, &mut rng).unwrap());
        for carmichael in [561, 41_041, 825_265, 321_197_185, 5_394_826_801] {
            assert!(!is_prime_with(&int(carmichael), 1e-6, &mut rng).unwrap(), "{carmichael}");
        }
        assert!(is_prime_with(&int(2_147_483_647), 1e-6, &mut rng).unwrap());
    }

    #[test]
    fn primality_argument_checks() {
        assert!(is_prime(&int(0)).is_err());
        assert!(is_prime(&int(-7)).is_err());
        assert!(!is_prime(&int(1)).unwrap());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(is_prime_with(&int(7), 0.0, &mut rng).is_err());
    }

    #[test]
    fn bezout_coefficients() {
        let b = extended_euclidean(&int(240), &int(46)).unwrap();
        assert_eq!(b.gcd, int(2));
        assert_eq!(&b.x * &int(240) + &b.y * &int(46), int(2));

        let b = extended_euclidean(&int(-12), &int(18)).unwrap();
        assert_eq!(b.gcd, int(6));

        let b = extended_euclidean(&MpInt::new(), &MpInt::new()).unwrap();
        assert!(b.gcd.is_zero());
    }

    #[test]
    fn inverses() {
        assert_eq!(modular_inverse(&int(3), &int(11)).unwrap(), int(4));
        assert_eq!(modular_inverse(&int(-3), &int(11)).unwrap(), int(7));
        assert_eq!(modular_inverse(&int(6), &int(9)), Err(MpError::NotInvertible));
        assert!(matches!(
            modular_inverse(&int(3), &int(-11)),
            Err(MpError::InvalidArgument(_))
        ));
    }

    #[test]
    fn gcd_values() {
        assert_eq!(gcd(&int(-48), &int(18)).unwrap(), int(6));
        assert_eq!(gcd(&int(0), &int(-5)).unwrap(), int(5));
        assert_eq!(gcd(&int(0), &int(0)).unwrap(), int(0));
    }
}
