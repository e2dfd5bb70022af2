//! Profile persistence.
//!
//! The profile lives at `$XDG_CONFIG_HOME/mparith/mparith_calibration.json`
//! (falling back to `~/.config`), with a dot-file in the working directory
//! as the secondary location.

use std::path::{Path, PathBuf};

use crate::error::CalibrationError;
use crate::profile::{self, CalibrationProfile};

pub const PROFILE_FILENAME: &str = "mparith_calibration.json";
const CONFIG_DIR_NAME: &str = "mparith";

/// Load the first readable profile from the standard locations.
/// Unreadable or malformed files are logged and skipped.
#[must_use]
pub fn load_profile() -> Option<CalibrationProfile> {
    xdg_profile_path()
        .into_iter()
        .chain(std::iter::once(cwd_profile_path()))
        .filter(|path| path.exists())
        .find_map(|path| match load_from_path(&path) {
            Ok(p) => Some(p),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "skipping unreadable profile");
                None
            }
        })
}

/// Load a profile and check it against this build and machine.
#[must_use]
pub fn load_validated_profile() -> Option<CalibrationProfile> {
    let p = load_profile()?;
    match validate(p) {
        Ok(p) => Some(p),
        Err(err) => {
            tracing::info!(%err, "ignoring cached profile");
            None
        }
    }
}

/// Reject profiles from another format version, with unusable thresholds,
/// or measured on a different machine.
pub fn validate(p: CalibrationProfile) -> Result<CalibrationProfile, CalibrationError> {
    if !p.is_compatible() {
        return Err(CalibrationError::Rejected(format!(
            "format version {} is not {}",
            p.version,
            profile::PROFILE_VERSION
        )));
    }
    if !p.is_valid() {
        return Err(CalibrationError::Rejected(
            "thresholds are out of order".to_string(),
        ));
    }
    if !p.matches_cpu(&profile::cpu_fingerprint()) {
        return Err(CalibrationError::Rejected(format!(
            "measured on {}",
            p.cpu_fingerprint
        )));
    }
    Ok(p)
}

/// Save to the config directory, or the working directory when no config
/// directory is known. Returns the path written.
pub fn save_profile(p: &CalibrationProfile) -> Result<PathBuf, CalibrationError> {
    let path = match xdg_profile_path() {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            path
        }
        None => cwd_profile_path(),
    };
    save_to_path(p, &path)?;
    tracing::info!(path = %path.display(), "saved calibration profile");
    Ok(path)
}

pub fn save_to_path(p: &CalibrationProfile, path: &Path) -> Result<(), CalibrationError> {
    let content = serde_json::to_string_pretty(p)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<CalibrationProfile, CalibrationError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Delete the saved profile. `Ok(false)` when there was none.
pub fn delete_profile() -> Result<bool, CalibrationError> {
    for path in xdg_profile_path()
        .into_iter()
        .chain(std::iter::once(cwd_profile_path()))
    {
        if path.exists() {
            std::fs::remove_file(&path)?;
            tracing::info!(path = %path.display(), "deleted calibration profile");
            return Ok(true);
        }
    }
    Ok(false)
}

fn xdg_profile_path() -> Option<PathBuf> {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(config_dir.join(CONFIG_DIR_NAME).join(PROFILE_FILENAME))
}

fn cwd_profile_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(format!(".{PROFILE_FILENAME}"))
}
