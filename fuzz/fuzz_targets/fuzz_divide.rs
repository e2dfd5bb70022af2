#![no_main]

use libfuzzer_sys::fuzz_target;

use mparith_core::{MpInt, Thresholds};

fn operand(bytes: &[u8]) -> MpInt {
    MpInt::from_digits(
        bytes
            .chunks(4)
            .map(|c| c.iter().rev().fold(0_u32, |acc, &b| acc << 8 | u32::from(b)))
            .collect(),
    )
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    // First byte: split point and the operand signs.
    let split = 1 + usize::from(data[0] >> 2) % (data.len() - 1);
    let mut a = operand(&data[1..split]);
    let mut b = operand(&data[split..]);
    if b.is_zero() {
        return;
    }
    if data[0] & 1 == 1 {
        a = -a;
    }
    if data[0] & 2 == 2 {
        b = -b;
    }

    let long = Thresholds {
        newton_division_min_bits: usize::MAX,
        ..Thresholds::DEFAULT
    };
    let newton = Thresholds {
        newton_division_min_bits: 64,
        ..Thresholds::DEFAULT
    };

    let (mut q1, mut r1) = (a.clone(), MpInt::new());
    q1.divide_in_place_with(&b, &mut r1, &long).unwrap();
    let (mut q2, mut r2) = (a.clone(), MpInt::new());
    q2.divide_in_place_with(&b, &mut r2, &newton).unwrap();

    assert_eq!(q1, q2, "quotients differ");
    assert_eq!(r1, r2, "remainders differ");
    assert!(!r1.is_negative() && r1 < b.abs());
    assert_eq!(&q1 * &b + &r1, a);
});
