//! Micro-benchmarks that compare adjacent algorithm tiers.

use mparith_core::division::divide_magnitudes_in_place;
use mparith_core::multiply::multiply_with;
use mparith_core::{MpInt, MpResult, MulAlgorithm, Thresholds};

use crate::runner::{benchmark_detailed, BenchmarkResult};

const WARMUP_ITERS: u32 = 2;
const MEASURE_ITERS: u32 = 7;

/// Time one forced top-level multiplication of two `bit_length`-bit operands.
/// Sub-products go through the dispatcher with `thresholds`.
pub fn bench_multiply(
    algorithm: MulAlgorithm,
    bit_length: usize,
    thresholds: &Thresholds,
) -> MpResult<BenchmarkResult> {
    let a = make_number(bit_length);
    let b = make_number(bit_length.saturating_sub(3).max(1));
    let mut out = MpInt::with_capacity_bits(2 * bit_length);
    Ok(benchmark_detailed(WARMUP_ITERS, MEASURE_ITERS, || {
        multiply_with(algorithm, &a, &b, &mut out, thresholds)
    })?
    .with_name(format!("{}@{bit_length}", algorithm.name())))
}

/// Time the magnitude division of a `dividend_bits`-bit value by one of half
/// that size, under `thresholds`.
pub fn bench_divide(dividend_bits: usize, thresholds: &Thresholds) -> MpResult<BenchmarkResult> {
    let dividend = make_number(dividend_bits);
    let divisor = make_number((dividend_bits / 2).max(1));
    let mut quotient = MpInt::new();
    let mut remainder = MpInt::new();
    Ok(benchmark_detailed(WARMUP_ITERS, MEASURE_ITERS, || {
        quotient.assign(&dividend);
        divide_magnitudes_in_place(&mut quotient, &divisor, &mut remainder, thresholds)
    })?
    .with_name(format!("divide@{dividend_bits}")))
}

/// Compare `slow` against `fast` at each bit length.
pub fn find_crossover(
    slow: MulAlgorithm,
    fast: MulAlgorithm,
    bit_lengths: &[usize],
    thresholds: &Thresholds,
) -> MpResult<Vec<CrossoverPoint>> {
    bit_lengths
        .iter()
        .map(|&bits| {
            let slow_run = bench_multiply(slow, bits, thresholds)?;
            let fast_run = bench_multiply(fast, bits, thresholds)?;
            Ok(CrossoverPoint::new(bits, &slow_run, &fast_run))
        })
        .collect()
}

/// Compare long division against Newton division at each dividend length.
pub fn find_division_crossover(
    dividend_bits: &[usize],
    thresholds: &Thresholds,
) -> MpResult<Vec<CrossoverPoint>> {
    let long = Thresholds {
        newton_division_min_bits: usize::MAX,
        ..*thresholds
    };
    let newton = Thresholds {
        newton_division_min_bits: 0,
        ..*thresholds
    };
    dividend_bits
        .iter()
        .map(|&bits| {
            let slow_run = bench_divide(bits, &long)?;
            let fast_run = bench_divide(bits, &newton)?;
            Ok(CrossoverPoint::new(bits, &slow_run, &fast_run))
        })
        .collect()
}

/// Bisect `(low, high]` for the smallest bit length where `fast_wins` holds,
/// assuming it fails at `low` and holds at `high`. Stops after `rounds`
/// evaluations or once the interval is narrower than a digit.
pub fn refine_crossover<F>(low: usize, high: usize, rounds: u32, mut fast_wins: F) -> MpResult<usize>
where
    F: FnMut(usize) -> MpResult<bool>,
{
    let (mut low, mut high) = (low, high);
    for _ in 0..rounds {
        if high <= low + mparith_core::DIGIT_BITS {
            break;
        }
        let mid = low + (high - low) / 2;
        if fast_wins(mid)? {
            high = mid;
        } else {
            low = mid;
        }
    }
    Ok(high)
}

/// A value of exactly `bit_length` bits with an alternating bit pattern.
#[must_use]
pub fn make_number(bit_length: usize) -> MpInt {
    if bit_length == 0 {
        return MpInt::new();
    }
    let bytes = bit_length.div_ceil(8);
    let Ok(x) = MpInt::from_hex_str(&"AB".repeat(bytes)) else {
        return MpInt::new();
    };
    x >> (bytes * 8 - bit_length)
}

/// Timings of two algorithms at one operand size.
#[derive(Debug, Clone)]
pub struct CrossoverPoint {
    pub bit_length: usize,
    pub slow_ns: u128,
    pub fast_ns: u128,
    pub fast_is_faster: bool,
}

impl CrossoverPoint {
    fn new(bit_length: usize, slow: &BenchmarkResult, fast: &BenchmarkResult) -> Self {
        Self {
            bit_length,
            slow_ns: slow.median_ns(),
            fast_ns: fast.median_ns(),
            fast_is_faster: fast.median < slow.median,
        }
    }
}

/// First bit length at which the faster tier wins, if any.
#[must_use]
pub fn first_win(points: &[CrossoverPoint]) -> Option<usize> {
    points.iter().find(|p| p.fast_is_faster).map(|p| p.bit_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_number_has_exact_length() {
        for bits in [1, 7, 8, 30, 31, 1024, 1027] {
            let n = make_number(bits);
            assert_eq!(n.num_bits(), bits, "{bits}");
        }
        assert!(make_number(0).is_zero());
    }

    #[test]
    fn bench_multiply_names_runs() {
        let run = bench_multiply(MulAlgorithm::Toom2, 2048, &Thresholds::DEFAULT).unwrap();
        assert_eq!(run.name, "toom-2@2048");
        assert_eq!(run.iterations, MEASURE_ITERS);
    }

    #[test]
    fn crossover_reports_every_size() {
        let points = find_crossover(
            MulAlgorithm::GradeSchool,
            MulAlgorithm::Toom2,
            &[256, 1024],
            &Thresholds::DEFAULT,
        )
        .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].bit_length, 1024);
        assert!(points.iter().all(|p| p.slow_ns > 0 && p.fast_ns > 0));
    }

    #[test]
    fn division_crossover_runs() {
        let points = find_division_crossover(&[2048], &Thresholds::DEFAULT).unwrap();
        assert_eq!(points.len(), 1);
        assert!(points[0].slow_ns > 0);
    }

    #[test]
    fn refine_finds_boundary() {
        let mut evaluated = Vec::new();
        let found = refine_crossover(0, 10_000, 20, |bits| {
            evaluated.push(bits);
            Ok(bits >= 3_000)
        })
        .unwrap();
        assert!((3_000..3_000 + 2 * mparith_core::DIGIT_BITS).contains(&found));
        assert!(evaluated.len() < 20);
    }

    #[test]
    fn first_win_picks_smallest() {
        let point = |bit_length, fast_is_faster| CrossoverPoint {
            bit_length,
            slow_ns: 1,
            fast_ns: 1,
            fast_is_faster,
        };
        let points = [point(100, false), point(200, true), point(400, true)];
        assert_eq!(first_win(&points), Some(200));
        assert_eq!(first_win(&points[..1]), None);
    }
}
