//! `shift step` and `shift observe` — run the rollout engine over files.
//!
//! The engine never reads a clock, so this is where `now` comes from when
//! it is not given on the command line.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing::{debug, info};

use shiftgrid_core::{Rollout, RolloutConfig, ShiftConfig, UnixSecs};

use super::report;

/// Run the `shift step` command.
pub fn step(
    desired: &str,
    previous: Option<&str>,
    now: Option<UnixSecs>,
    config: Option<&str>,
    format: &str,
) -> Result<()> {
    let ro = plan_step(Path::new(desired), previous.map(Path::new), now, config.map(Path::new))?;
    print_rollout(&ro, format)
}

/// Run the `shift observe` command.
pub fn observe(state: &str, now: Option<UnixSecs>, config: Option<&str>, format: &str) -> Result<()> {
    let ro = plan_observe(Path::new(state), now, config.map(Path::new))?;
    print_rollout(&ro, format)
}

/// Fold the desired rollout into the previous state, then compute cadence
/// for any rollout whose first step is already observable.
pub fn plan_step(
    desired: &Path,
    previous: Option<&Path>,
    now: Option<UnixSecs>,
    config: Option<&Path>,
) -> Result<Rollout> {
    let config = load_config(config)?;
    let now = now.unwrap_or_else(epoch_secs);

    let content = std::fs::read_to_string(desired)
        .with_context(|| format!("Failed to read desired rollout {}", desired.display()))?;
    let cur: Rollout = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse desired rollout {}", desired.display()))?;

    let prev = match previous {
        Some(path) => {
            let value = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read previous rollout {}", path.display()))?;
            Rollout::from_annotation_or_default(Some(value.trim()))
        }
        None => Rollout::default(),
    };
    debug!(
        targets = cur.configurations.len(),
        previous = prev.configurations.len(),
        now,
        "planning rollout step"
    );

    let mut next = shiftgrid_rollout::step(&cur, Some(&prev), now);
    shiftgrid_rollout::observe_ready(&mut next, now, &config);

    match next.next_step_time() {
        Some(at) => info!(next_step_time = at, "rollout in progress"),
        None => info!("no rollout step pending"),
    }
    Ok(next)
}

/// Compute cadence on an already persisted rollout.
pub fn plan_observe(state: &Path, now: Option<UnixSecs>, config: Option<&Path>) -> Result<Rollout> {
    let config = load_config(config)?;
    let now = now.unwrap_or_else(epoch_secs);

    let value = std::fs::read_to_string(state)
        .with_context(|| format!("Failed to read rollout {}", state.display()))?;
    let mut ro = Rollout::from_annotation(value.trim())
        .with_context(|| format!("Unusable rollout annotation in {}", state.display()))?;
    shiftgrid_rollout::observe_ready(&mut ro, now, &config);
    Ok(ro)
}

fn load_config(path: Option<&Path>) -> Result<RolloutConfig> {
    match path {
        Some(path) => {
            let config = ShiftConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            Ok(config.rollout)
        }
        None => Ok(RolloutConfig::default()),
    }
}

fn print_rollout(ro: &Rollout, format: &str) -> Result<()> {
    match format {
        "text" => print!("{}", report::format_rollout(ro)),
        _ => println!("{}", ro.to_annotation()?),
    }
    Ok(())
}

fn epoch_secs() -> UnixSecs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as UnixSecs)
        .unwrap_or_default()
}
