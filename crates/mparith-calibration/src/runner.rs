//! Timing loops shared by the micro-benchmarks.

use std::time::{Duration, Instant};

/// Average duration of `iterations` calls after one warm-up call.
pub fn benchmark<F>(iterations: u32, mut f: F) -> Duration
where
    F: FnMut(),
{
    f();
    let iterations = iterations.max(1);
    let start = Instant::now();
    for _ in 0..iterations {
        f();
    }
    start.elapsed() / iterations
}

/// Time `measure_iters` individual calls after `warmup_iters` untimed ones.
///
/// Fallible bodies are supported: the first error aborts the run and is
/// returned unchanged.
pub fn benchmark_detailed<F, E>(
    warmup_iters: u32,
    measure_iters: u32,
    mut f: F,
) -> Result<BenchmarkResult, E>
where
    F: FnMut() -> Result<(), E>,
{
    for _ in 0..warmup_iters {
        f()?;
    }

    let measure_iters = measure_iters.max(1);
    let mut durations = Vec::with_capacity(measure_iters as usize);
    for _ in 0..measure_iters {
        let start = Instant::now();
        f()?;
        durations.push(start.elapsed());
    }
    Ok(BenchmarkResult::from_samples(durations))
}

/// Summary statistics for one benchmarked operation.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkResult {
    pub name: String,
    pub mean: Duration,
    pub median: Duration,
    pub min: Duration,
    pub max: Duration,
    pub iterations: u32,
}

impl BenchmarkResult {
    fn from_samples(mut durations: Vec<Duration>) -> Self {
        durations.sort();
        let count = durations.len();
        if count == 0 {
            return Self::default();
        }
        let mid = count / 2;
        let median = if count % 2 == 1 {
            durations[mid]
        } else {
            (durations[mid - 1] + durations[mid]) / 2
        };
        #[allow(clippy::cast_possible_truncation)]
        let iterations = count as u32;
        let total: Duration = durations.iter().sum();
        Self {
            name: String::new(),
            mean: total / iterations,
            median,
            min: durations[0],
            max: durations[count - 1],
            iterations,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Median in nanoseconds, the figure crossovers are decided on.
    #[must_use]
    pub fn median_ns(&self) -> u128 {
        self.median.as_nanos()
    }
}
