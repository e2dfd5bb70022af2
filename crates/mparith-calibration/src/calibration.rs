//! Calibration engine.
//!
//! Each step scans a ladder of operand sizes for the first one where the
//! next tier beats the current one, then bisects between that size and the
//! one before it. Thresholds found by earlier steps are in force while later
//! steps run, so recursive sub-products use the tuned lower tiers.

use mparith_core::{MpResult, MulAlgorithm, Thresholds};

use crate::error::CalibrationError;
use crate::microbench::{self, CrossoverPoint};
use crate::profile::CalibrationProfile;

/// How thresholds are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationMode {
    /// Benchmark every tier boundary, Schönhage-Strassen included.
    Full,
    /// Benchmark the Toom and Newton boundaries on small ladders and keep
    /// the default Schönhage-Strassen thresholds.
    Quick,
    /// Use the saved profile, or defaults when none is usable.
    Cached,
}

pub type ProgressCallback = Box<dyn Fn(CalibrationProgress) + Send>;

/// Progress information during calibration.
#[derive(Debug, Clone)]
pub struct CalibrationProgress {
    pub step: String,
    /// 1-based.
    pub current: usize,
    pub total: usize,
}

/// One boundary to measure.
struct Step {
    label: &'static str,
    kind: StepKind,
    ladder: Vec<usize>,
    refine_rounds: u32,
}

enum StepKind {
    Multiply {
        slow: MulAlgorithm,
        fast: MulAlgorithm,
        field: fn(&mut Thresholds) -> &mut usize,
    },
    Divide,
}

fn toom2_field(t: &mut Thresholds) -> &mut usize {
    &mut t.toom2_min_bits
}

fn toom3_field(t: &mut Thresholds) -> &mut usize {
    &mut t.toom3_min_bits
}

fn ssa6_field(t: &mut Thresholds) -> &mut usize {
    &mut t.ssa6_min_bits
}

fn ssa7_field(t: &mut Thresholds) -> &mut usize {
    &mut t.ssa7_min_bits
}

fn ladder(from_log2: u32, to_log2: u32) -> Vec<usize> {
    (from_log2..=to_log2).map(|e| 1_usize << e).collect()
}

const SSA6: MulAlgorithm = MulAlgorithm::SchonhageStrassen { log_num_parts: 6 };
const SSA7: MulAlgorithm = MulAlgorithm::SchonhageStrassen { log_num_parts: 7 };

fn toom2_step(ladder: Vec<usize>, refine_rounds: u32) -> Step {
    Step {
        label: "toom-2 crossover",
        kind: StepKind::Multiply {
            slow: MulAlgorithm::GradeSchool,
            fast: MulAlgorithm::Toom2,
            field: toom2_field,
        },
        ladder,
        refine_rounds,
    }
}

fn toom3_step(ladder: Vec<usize>, refine_rounds: u32) -> Step {
    Step {
        label: "toom-3 crossover",
        kind: StepKind::Multiply {
            slow: MulAlgorithm::Toom2,
            fast: MulAlgorithm::Toom3,
            field: toom3_field,
        },
        ladder,
        refine_rounds,
    }
}

fn newton_step(ladder: Vec<usize>, refine_rounds: u32) -> Step {
    Step {
        label: "newton division crossover",
        kind: StepKind::Divide,
        ladder,
        refine_rounds,
    }
}

fn full_plan() -> Vec<Step> {
    vec![
        toom2_step(ladder(8, 15), 4),
        toom3_step(ladder(13, 18), 3),
        Step {
            label: "ssa-64 crossover",
            kind: StepKind::Multiply {
                slow: MulAlgorithm::Toom3,
                fast: SSA6,
                field: ssa6_field,
            },
            ladder: ladder(17, 23),
            refine_rounds: 2,
        },
        Step {
            label: "ssa-128 crossover",
            kind: StepKind::Multiply {
                slow: SSA6,
                fast: SSA7,
                field: ssa7_field,
            },
            ladder: ladder(21, 25),
            refine_rounds: 1,
        },
        newton_step(ladder(12, 21), 3),
    ]
}

fn quick_plan() -> Vec<Step> {
    vec![
        toom2_step(ladder(8, 13), 2),
        toom3_step(ladder(13, 16), 1),
        newton_step(ladder(12, 16), 1),
    ]
}

/// Determines thresholds for the current machine.
pub struct CalibrationEngine {
    mode: CalibrationMode,
    progress_cb: Option<ProgressCallback>,
}

impl CalibrationEngine {
    #[must_use]
    pub fn new(mode: CalibrationMode) -> Self {
        Self {
            mode,
            progress_cb: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, cb: ProgressCallback) -> Self {
        self.progress_cb = Some(cb);
        self
    }

    /// Run calibration and produce a profile. The profile is not saved or
    /// installed.
    pub fn calibrate(&self) -> Result<CalibrationProfile, CalibrationError> {
        match self.mode {
            CalibrationMode::Full => self.run_plan(&full_plan()),
            CalibrationMode::Quick => self.run_plan(&quick_plan()),
            CalibrationMode::Cached => Ok(Self::load_cached()),
        }
    }

    fn report_progress(&self, step: &str, current: usize, total: usize) {
        if let Some(cb) = &self.progress_cb {
            cb(CalibrationProgress {
                step: step.to_string(),
                current,
                total,
            });
        }
    }

    fn run_plan(&self, plan: &[Step]) -> Result<CalibrationProfile, CalibrationError> {
        let total = plan.len() + 1;
        let mut thresholds = Thresholds::DEFAULT;
        for (i, step) in plan.iter().enumerate() {
            self.report_progress(step.label, i + 1, total);
            match step.kind {
                StepKind::Multiply { slow, fast, field } => {
                    let found = measure_multiply(slow, fast, step, &thresholds)?;
                    if let Some(bits) = found {
                        *field(&mut thresholds) = bits;
                    }
                    tracing::info!(step = step.label, ?found, "multiplication crossover");
                }
                StepKind::Divide => {
                    let found = measure_divide(step, &thresholds)?;
                    if let Some(bits) = found {
                        thresholds.newton_division_min_bits = bits;
                    }
                    tracing::info!(step = step.label, ?found, "division crossover");
                }
            }
            thresholds = thresholds.normalize();
        }

        self.report_progress("building profile", total, total);
        Ok(CalibrationProfile::measured(thresholds))
    }

    fn load_cached() -> CalibrationProfile {
        match crate::io::load_profile() {
            Some(p) => match crate::io::validate(p) {
                Ok(p) => p,
                Err(err) => {
                    tracing::warn!(%err, "cached profile unusable, using defaults");
                    CalibrationProfile::default()
                }
            },
            None => CalibrationProfile::default(),
        }
    }
}

fn measure_multiply(
    slow: MulAlgorithm,
    fast: MulAlgorithm,
    step: &Step,
    thresholds: &Thresholds,
) -> MpResult<Option<usize>> {
    let points = microbench::find_crossover(slow, fast, &step.ladder, thresholds)?;
    locate(&points, step.refine_rounds, |bits| {
        let slow_run = microbench::bench_multiply(slow, bits, thresholds)?;
        let fast_run = microbench::bench_multiply(fast, bits, thresholds)?;
        Ok(fast_run.median < slow_run.median)
    })
}

fn measure_divide(step: &Step, thresholds: &Thresholds) -> MpResult<Option<usize>> {
    let points = microbench::find_division_crossover(&step.ladder, thresholds)?;
    let long = Thresholds {
        newton_division_min_bits: usize::MAX,
        ..*thresholds
    };
    let newton = Thresholds {
        newton_division_min_bits: 0,
        ..*thresholds
    };
    locate(&points, step.refine_rounds, |bits| {
        let slow_run = microbench::bench_divide(bits, &long)?;
        let fast_run = microbench::bench_divide(bits, &newton)?;
        Ok(fast_run.median < slow_run.median)
    })
}

/// Crossover from a scanned ladder, bisected below the first win. `None`
/// when the faster tier never wins on the ladder.
fn locate<F>(points: &[CrossoverPoint], rounds: u32, fast_wins: F) -> MpResult<Option<usize>>
where
    F: FnMut(usize) -> MpResult<bool>,
{
    let Some(index) = points.iter().position(|p| p.fast_is_faster) else {
        tracing::debug!("faster tier never won on the ladder");
        return Ok(None);
    };
    if index == 0 {
        return Ok(Some(points[0].bit_length));
    }
    let low = points[index - 1].bit_length;
    let high = points[index].bit_length;
    microbench::refine_crossover(low, high, rounds, fast_wins).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn point(bit_length: usize, fast_is_faster: bool) -> CrossoverPoint {
        CrossoverPoint {
            bit_length,
            slow_ns: 10,
            fast_ns: 10,
            fast_is_faster,
        }
    }

    #[test]
    fn locate_without_win() {
        let points = [point(1024, false), point(2048, false)];
        let found = locate(&points, 3, |_| panic!("no refinement expected")).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn locate_first_rung() {
        let points = [point(1024, true), point(2048, true)];
        let found = locate(&points, 3, |_| panic!("no refinement expected")).unwrap();
        assert_eq!(found, Some(1024));
    }

    #[test]
    fn locate_bisects_below_first_win() {
        let points = [point(1024, false), point(2048, false), point(4096, true)];
        let found = locate(&points, 8, |bits| Ok(bits >= 3000)).unwrap().unwrap();
        assert!((3000..=3100).contains(&found), "{found}");
    }

    #[test]
    fn quick_calibration_is_valid() {
        let profile = CalibrationEngine::new(CalibrationMode::Quick)
            .calibrate()
            .unwrap();
        assert!(profile.is_valid());
        assert_eq!(
            profile.thresholds.ssa6_min_bits,
            Thresholds::DEFAULT.ssa6_min_bits
        );
        assert!(!profile.cpu_fingerprint.is_empty());
        assert!(profile.timestamp.starts_with("unix:"));
    }

    #[test]
    fn cached_mode_is_valid() {
        let profile = CalibrationEngine::new(CalibrationMode::Cached)
            .calibrate()
            .unwrap();
        assert!(profile.is_valid());
    }

    #[test]
    #[ignore = "benchmarks operands up to 32 Mbit"]
    fn full_calibration_is_valid() {
        let profile = CalibrationEngine::new(CalibrationMode::Full)
            .calibrate()
            .unwrap();
        assert!(profile.is_valid());
    }

    #[test]
    fn progress_reports_every_step() {
        let steps = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&steps);
        let engine = CalibrationEngine::new(CalibrationMode::Quick).with_progress(Box::new(
            move |p: CalibrationProgress| {
                sink.lock().unwrap().push((p.step, p.current, p.total));
            },
        ));
        engine.calibrate().unwrap();

        let steps = steps.lock().unwrap();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0], ("toom-2 crossover".to_string(), 1, 4));
        assert_eq!(steps[3].0, "building profile");
        assert!(steps.iter().all(|s| s.2 == 4));
    }
}
