//! Command dispatch and output.

use std::io::{self, Write};

use anyhow::{Context, Result};
use mparith_calibration::calibration::{CalibrationEngine, CalibrationMode, CalibrationProgress};
use mparith_calibration::{io as profile_io, CalibrationProfile};
use mparith_core::{math, MpInt, Thresholds};

use crate::config::{AppConfig, Command};

/// Run the application, writing results to stdout.
pub fn run(config: &AppConfig) -> Result<()> {
    let stdout = io::stdout();
    run_with_output(config, &mut stdout.lock())
}

/// Run the application, writing results to `out`.
pub fn run_with_output(config: &AppConfig, out: &mut dyn Write) -> Result<()> {
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        clap_complete::generate(shell, &mut cmd, "mparith", out);
        return Ok(());
    }

    let Some(command) = &config.command else {
        anyhow::bail!("no command given; run `mparith --help` for the list");
    };

    if let Command::Calibrate { full, dry_run } = command {
        return run_calibration(config, *full, *dry_run, out);
    }

    let thresholds = config.thresholds.apply(base_thresholds(config.profile));
    thresholds.install();
    tracing::debug!(?thresholds, "thresholds in force");

    for value in evaluate(command)? {
        print_value(&value, config.hex, out)?;
    }
    Ok(())
}

/// Thresholds from the saved profile when requested and usable.
fn base_thresholds(use_profile: bool) -> Thresholds {
    if !use_profile {
        return Thresholds::DEFAULT;
    }
    match profile_io::load_validated_profile() {
        Some(profile) => profile.thresholds,
        None => {
            tracing::warn!("no usable calibration profile, using default thresholds");
            Thresholds::DEFAULT
        }
    }
}

/// Results of an arithmetic command, in print order.
fn evaluate(command: &Command) -> Result<Vec<Value>> {
    let values = match command {
        Command::Mul { a, b } => vec![Value::Int(a.checked_mul(b)?)],
        Command::Square { x } => vec![Value::Int(x.square()?)],
        Command::Div { a, b } => {
            let (q, r) = a
                .checked_div_rem(b)
                .with_context(|| format!("dividing {a} by {b}"))?;
            vec![Value::Int(q), Value::Int(r)]
        }
        Command::Pow { base, exponent } => vec![Value::Int(math::pow(base, *exponent)?)],
        Command::Powmod {
            base,
            exponent,
            modulus,
        } => vec![Value::Int(math::pow_mod(base, exponent, modulus)?)],
        Command::IsPrime { n, probability } => {
            let prime = math::is_prime_with(n, *probability, &mut rand::rng())?;
            vec![Value::Bool(prime)]
        }
        Command::Gcd { a, b } => vec![Value::Int(math::gcd(a, b)?)],
        Command::Inverse { a, m } => vec![Value::Int(
            math::modular_inverse(a, m).with_context(|| format!("inverting {a} modulo {m}"))?,
        )],
        Command::Calibrate { .. } => Vec::new(),
    };
    Ok(values)
}

enum Value {
    Int(MpInt),
    Bool(bool),
}

fn print_value(value: &Value, hex: bool, out: &mut dyn Write) -> io::Result<()> {
    match value {
        Value::Int(x) if hex => writeln!(out, "{}", x.to_hex_string()),
        Value::Int(x) => writeln!(out, "{x}"),
        Value::Bool(b) => writeln!(out, "{b}"),
    }
}

fn run_calibration(config: &AppConfig, full: bool, dry_run: bool, out: &mut dyn Write) -> Result<()> {
    let mode = if full {
        CalibrationMode::Full
    } else {
        CalibrationMode::Quick
    };
    let mut engine = CalibrationEngine::new(mode);
    if !config.quiet {
        engine = engine.with_progress(Box::new(|p: CalibrationProgress| {
            eprintln!("[{}/{}] {}", p.current, p.total, p.step);
        }));
    }
    let profile = engine.calibrate()?;
    print_profile(&profile, out)?;

    if !dry_run {
        let path = profile_io::save_profile(&profile)?;
        if !config.quiet {
            eprintln!("Saved calibration profile to {}", path.display());
        }
    }
    Ok(())
}

fn print_profile(profile: &CalibrationProfile, out: &mut dyn Write) -> io::Result<()> {
    let th = &profile.thresholds;
    writeln!(out, "Calibration complete:")?;
    writeln!(out, "  toom-2 threshold:          {} bits", th.toom2_min_bits)?;
    writeln!(out, "  toom-3 threshold:          {} bits", th.toom3_min_bits)?;
    writeln!(out, "  ssa-64 threshold:          {} bits", th.ssa6_min_bits)?;
    writeln!(out, "  ssa-128 threshold:         {} bits", th.ssa7_min_bits)?;
    writeln!(out, "  fermat recursion threshold: {} bits", th.ssa_mod_fermat_min_bits)?;
    writeln!(out, "  newton division threshold: {} bits", th.newton_division_min_bits)?;
    Ok(())
}
