//! `shift validate` — check a persisted rollout annotation.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use shiftgrid_core::Rollout;

/// Run the `shift validate` command.
pub fn validate(state: &str) -> Result<()> {
    let ro = load_validated(Path::new(state))?;
    info!(targets = ro.configurations.len(), "rollout annotation is consistent");
    println!("✓ {} is a valid rollout ({} targets)", state, ro.configurations.len());
    Ok(())
}

fn load_validated(path: &Path) -> Result<Rollout> {
    let value = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rollout {}", path.display()))?;
    let ro = Rollout::from_annotation(value.trim())
        .with_context(|| format!("Invalid rollout annotation in {}", path.display()))?;
    Ok(ro)
}
