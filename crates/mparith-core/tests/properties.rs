//! Property-based tests for the arithmetic engine.
//!
//! Results are compared against the grade-school kernels and against
//! `num-bigint` as an independent oracle. Every test passes explicit small
//! thresholds so that all algorithm tiers run on modest operands.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use mparith_core::arith::multiply_grade_school;
use mparith_core::division::divide_magnitudes_in_place;
use mparith_core::multiply::{multiply, multiply_with, square_magnitude};
use mparith_core::{
    extended_euclidean, is_prime_with, modular_inverse, MpError, MpInt, MulAlgorithm, Thresholds,
};

fn small_thresholds() -> Thresholds {
    Thresholds {
        toom2_min_bits: 200,
        toom3_min_bits: 900,
        ssa6_min_bits: 3_000,
        ssa7_min_bits: 6_000,
        ssa_mod_fermat_min_bits: 1_024,
        newton_division_min_bits: 64,
        negacyclic_check_max_bits: 1 << 16,
    }
}

fn oracle(x: &MpInt) -> BigInt {
    x.to_string().parse().unwrap()
}

fn mpint(max_digits: usize) -> impl Strategy<Value = MpInt> {
    (any::<bool>(), prop::collection::vec(any::<u32>(), 0..max_digits)).prop_map(
        |(negative, digits)| {
            let x = MpInt::from_digits(digits);
            if negative {
                -x
            } else {
                x
            }
        },
    )
}

fn nonzero_mpint(max_digits: usize) -> impl Strategy<Value = MpInt> {
    mpint(max_digits).prop_filter("nonzero", |x| !x.is_zero())
}

const FORCED: [MulAlgorithm; 8] = [
    MulAlgorithm::GradeSchool,
    MulAlgorithm::Toom15,
    MulAlgorithm::Toom2,
    MulAlgorithm::Toom25,
    MulAlgorithm::Toom3,
    MulAlgorithm::SchonhageStrassen { log_num_parts: 2 },
    MulAlgorithm::SchonhageStrassen { log_num_parts: 4 },
    MulAlgorithm::SchonhageStrassen { log_num_parts: 6 },
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Printing then parsing returns the same value, and the text agrees
    /// with num-bigint.
    #[test]
    fn decimal_round_trip(x in mpint(40)) {
        let text = x.to_string();
        prop_assert_eq!(text.parse::<MpInt>().unwrap(), x.clone());
        prop_assert_eq!(text, oracle(&x).to_string());
    }

    /// Hex output is the true value of the number.
    #[test]
    fn hex_matches_oracle(x in mpint(20)) {
        let expected = oracle(&x).to_str_radix(16).to_uppercase();
        prop_assert_eq!(x.to_hex_string(), expected);
        prop_assert_eq!(MpInt::from_hex_str(&x.to_hex_string()).unwrap(), x);
    }

    /// The dispatcher agrees with grade-school and with the oracle across
    /// every tier the thresholds reach.
    #[test]
    fn dispatcher_matches_grade_school(a in mpint(260), b in mpint(260)) {
        let th = small_thresholds();
        let mut got = MpInt::new();
        multiply(&a, &b, &mut got, &th).unwrap();

        let mut expected = MpInt::new();
        multiply_grade_school(&a, &b, &mut expected);
        if a.is_negative() != b.is_negative() {
            expected = -expected;
        }
        prop_assert_eq!(&got, &expected);
        prop_assert_eq!(oracle(&got), oracle(&a) * oracle(&b));
    }

    /// Every forced algorithm yields the grade-school magnitude.
    #[test]
    fn forced_algorithms_agree(a in nonzero_mpint(90), b in nonzero_mpint(90)) {
        let th = small_thresholds();
        let mut expected = MpInt::new();
        multiply_grade_school(&a, &b, &mut expected);
        for algorithm in FORCED {
            let mut got = MpInt::new();
            multiply_with(algorithm, &a, &b, &mut got, &th).unwrap();
            prop_assert_eq!(&got, &expected, "{:?}", algorithm);
        }
    }

    /// Squaring agrees with multiplying a value by a copy of itself.
    #[test]
    fn square_matches_multiply(x in mpint(200)) {
        let th = small_thresholds();
        let copy = x.clone();
        let mut product = MpInt::new();
        multiply(&x, &copy, &mut product, &th).unwrap();
        let mut square = MpInt::new();
        square_magnitude(&x, &mut square, &th).unwrap();
        prop_assert_eq!(square, product);
    }

    #[test]
    fn multiplication_commutes_and_associates(
        a in mpint(120),
        b in mpint(120),
        c in mpint(60),
    ) {
        let th = small_thresholds();
        let mul = |x: &MpInt, y: &MpInt| {
            let mut r = MpInt::new();
            multiply(x, y, &mut r, &th).unwrap();
            r
        };
        prop_assert_eq!(mul(&a, &b), mul(&b, &a));
        prop_assert_eq!(mul(&mul(&a, &b), &c), mul(&a, &mul(&b, &c)));
    }

    #[test]
    fn addition_associates(a in mpint(50), b in mpint(50), c in mpint(50)) {
        prop_assert_eq!((&a + &b) + &c, &a + (&b + &c));
        prop_assert_eq!(oracle(&(&a - &b)), oracle(&a) - oracle(&b));
    }

    /// `a = q·b + r` with `0 <= r < |b|`, matching the floored modulus of
    /// `|b|`.
    #[test]
    fn euclidean_division(a in mpint(80), b in nonzero_mpint(40)) {
        let th = small_thresholds();
        let mut q = a.clone();
        let mut r = MpInt::new();
        q.divide_in_place_with(&b, &mut r, &th).unwrap();

        prop_assert!(!r.is_negative());
        prop_assert!(r.abs() < b.abs());
        let (oa, ob) = (oracle(&a), oracle(&b));
        prop_assert_eq!(oracle(&r), oa.mod_floor(&ob.abs()));
        prop_assert_eq!(oracle(&q) * &ob + oracle(&r), oa);
    }

    /// Newton division and long division agree on magnitudes.
    #[test]
    fn newton_matches_long_division(a in mpint(120), b in nonzero_mpint(60)) {
        let newton = small_thresholds();
        let long = Thresholds { newton_division_min_bits: usize::MAX, ..newton };

        let (mut q1, mut r1) = (a.clone(), MpInt::new());
        divide_magnitudes_in_place(&mut q1, &b, &mut r1, &newton).unwrap();
        let (mut q2, mut r2) = (a.clone(), MpInt::new());
        divide_magnitudes_in_place(&mut q2, &b, &mut r2, &long).unwrap();
        prop_assert_eq!(q1, q2);
        prop_assert_eq!(r1, r2);
    }

    #[test]
    fn bezout_identity(a in mpint(12), b in mpint(12)) {
        let bz = extended_euclidean(&a, &b).unwrap();
        prop_assert!(!bz.gcd.is_negative());
        prop_assert_eq!(oracle(&bz.gcd), oracle(&a).gcd(&oracle(&b)));
    }

    #[test]
    fn modular_inverse_property(a in mpint(8), m in nonzero_mpint(8)) {
        let m = m.abs();
        let (oa, om) = (oracle(&a), oracle(&m));
        match modular_inverse(&a, &m) {
            Ok(inv) => {
                prop_assert!(!inv.is_negative() && inv < m);
                let check = (oa * oracle(&inv)).mod_floor(&om);
                let one = if om == BigInt::from(1) { BigInt::zero() } else { BigInt::from(1) };
                prop_assert_eq!(check, one);
            }
            Err(MpError::NotInvertible) => prop_assert!(oa.gcd(&om) != BigInt::from(1)),
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }

    /// Miller-Rabin agrees with trial division on 21- to 32-bit numbers.
    #[test]
    fn primality_matches_trial_division(n in (1u64 << 20)..(1u64 << 32), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let expected = n > 1 && (2..).take_while(|p| p * p <= n).all(|p| n % p != 0);
        prop_assert_eq!(is_prime_with(&MpInt::from(n), 1e-9, &mut rng).unwrap(), expected);
    }
}

#[test]
fn thirty_digit_product() {
    let a: MpInt = "123456789012345678901234567890".parse().unwrap();
    let b: MpInt = "987654321098765432109876543210".parse().unwrap();
    assert_eq!(
        a.checked_mul(&b).unwrap().to_string(),
        "121932631137021795226185032733622923332237463801111263526900"
    );
}

#[test]
fn oracle_signs_agree() {
    let x = MpInt::from(-42);
    assert!(oracle(&x).is_negative());
}
