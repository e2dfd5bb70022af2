#![no_main]

use libfuzzer_sys::fuzz_target;

use mparith_core::arith::multiply_grade_school;
use mparith_core::multiply::multiply_with;
use mparith_core::{MpInt, MulAlgorithm, Thresholds};

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
    // First byte picks the split point between the two operands.
    let split = 1 + usize::from(data[0]) % (data.len() - 1);
    let a = operand(&data[1..split]);
    let b = operand(&data[split..]);
    if a.is_zero() || b.is_zero() {
        return;
    }

    let th = Thresholds {
        toom2_min_bits: 120,
        toom3_min_bits: 300,
        ssa6_min_bits: 2_000,
        ssa7_min_bits: 8_000,
        ssa_mod_fermat_min_bits: 1_024,
        ..Thresholds::DEFAULT
    };
    let mut expected = MpInt::new();
    multiply_grade_school(&a, &b, &mut expected);

    for algorithm in [
        MulAlgorithm::Toom15,
        MulAlgorithm::Toom2,
        MulAlgorithm::Toom25,
        MulAlgorithm::Toom3,
        MulAlgorithm::SchonhageStrassen { log_num_parts: 3 },
        MulAlgorithm::SchonhageStrassen { log_num_parts: 6 },
    ] {
        let mut got = MpInt::new();
        multiply_with(algorithm, &a, &b, &mut got, &th).unwrap();
        assert_eq!(got, expected, "{} disagrees with grade-school", algorithm.name());
    }
});
