//! Serializable calibration profile.

use serde::{Deserialize, Serialize};

use mparith_core::Thresholds;

/// Current profile format version.
pub const PROFILE_VERSION: u32 = 1;

/// Thresholds measured on one machine, with enough context to tell when
/// they no longer apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProfile {
    /// Format version for compatibility checking.
    pub version: u32,
    /// Measured crossover points.
    pub thresholds: Thresholds,
    pub cpu_model: String,
    pub num_cores: usize,
    /// Identifies the machine the thresholds were measured on.
    pub cpu_fingerprint: String,
    pub timestamp: String,
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self {
            version: PROFILE_VERSION,
            thresholds: Thresholds::DEFAULT,
            cpu_model: String::new(),
            num_cores: num_cores(),
            cpu_fingerprint: String::new(),
            timestamp: String::new(),
        }
    }
}

impl CalibrationProfile {
    /// A profile for `thresholds`, stamped with the current machine and time.
    #[must_use]
    pub fn measured(thresholds: Thresholds) -> Self {
        let cpu_model = cpu_model();
        Self {
            version: PROFILE_VERSION,
            thresholds: thresholds.normalize(),
            cpu_fingerprint: fingerprint_for(&cpu_model, num_cores()),
            cpu_model,
            num_cores: num_cores(),
            timestamp: current_timestamp(),
        }
    }

    #[must_use]
    pub fn is_compatible(&self) -> bool {
        self.version == PROFILE_VERSION
    }

    /// A profile without a fingerprint, or checked against an empty one,
    /// matches any machine.
    #[must_use]
    pub fn matches_cpu(&self, current_fingerprint: &str) -> bool {
        if self.cpu_fingerprint.is_empty() || current_fingerprint.is_empty() {
            return true;
        }
        self.cpu_fingerprint == current_fingerprint
    }

    /// Thresholds are ascending and above the minimums recursion needs.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.thresholds.is_valid()
    }
}

fn num_cores() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZero::get)
        .unwrap_or(1)
}

fn fingerprint_for(model: &str, cores: usize) -> String {
    if model.is_empty() {
        format!("cores={cores}")
    } else {
        format!("{model};cores={cores}")
    }
}

/// Fingerprint of the current machine from CPU model and core count.
#[must_use]
pub fn cpu_fingerprint() -> String {
    fingerprint_for(&cpu_model(), num_cores())
}

#[must_use]
pub fn cpu_model() -> String {
    use sysinfo::System;
    let sys = System::new_all();
    sys.cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .unwrap_or_default()
}

/// Seconds since the Unix epoch, as `unix:<secs>`.
#[must_use]
pub fn current_timestamp() -> String {
    let dur = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format!("unix:{}", dur.as_secs())
}
