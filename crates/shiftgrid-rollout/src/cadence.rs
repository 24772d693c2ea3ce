//! Rollout cadence — how many points move per step and how often.
//!
//! The cadence is derived once per rollout from the latency of its first
//! step: whatever it took for the first 1% to reach the new revision (for
//! example, ingress programming time) is the smallest sensible step
//! interval. The total rollout duration is then split into as many equal
//! steps as that interval allows.

use tracing::info;

use shiftgrid_core::{ConfigurationRollout, Rollout, RolloutConfig, UnixSecs};

/// Compute step duration, step size, and the next step time for a target
/// whose rollout just started.
///
/// Pre: `min_step_secs >= 1`, `duration_secs > 1`.
pub fn compute_properties(
    cr: &mut ConfigurationRollout,
    now_ts: UnixSecs,
    min_step_secs: f64,
    duration_secs: f64,
) {
    let pf = f64::from(cr.percent);
    let mut num_steps = duration_secs / min_step_secs;

    // The smallest step is 1%. If more steps fit than there are points
    // left to move, make percent-1 steps of 1% each (1% already moved).
    if pf < num_steps {
        num_steps = pf - 1.0;
    }
    // A target with at most 1% has nothing left to move.
    if num_steps <= 0.0 {
        num_steps = 1.0;
    }

    // Equal steps. Whatever rounding leaves over moves in a final capped
    // step, e.g. 4 steps of 24: 1 -> 25 -> 49 -> 73 -> 97 -> 100.
    let step_size = ((pf - 1.0) / num_steps).floor().max(0.0);
    // Rounded up: rolling slightly longer beats rolling slightly shorter.
    let step_duration = (duration_secs / num_steps).ceil();

    cr.step_size = step_size as u32;
    cr.step_duration = step_duration as i64;
    cr.next_step_time = now_ts.saturating_add(cr.step_duration);

    info!(
        configuration = %cr.configuration_name,
        tag = %cr.tag,
        step_size = cr.step_size,
        step_duration = cr.step_duration,
        next_step_time = cr.next_step_time,
        "computed rollout cadence"
    );
}

/// Set the cadence of every target that is mid-rollout but has not
/// observed its first step yet.
///
/// The observed step latency is `now_ts - start_time`, at least one second
/// to tolerate clock drift.
pub fn observe_ready(ro: &mut Rollout, now_ts: UnixSecs, config: &RolloutConfig) {
    let duration_secs = config.duration_secs as f64;
    for cr in ro
        .configurations
        .iter_mut()
        .filter(|c| c.step_duration == 0 && c.start_time > 0)
    {
        let min_step_secs = now_ts.saturating_sub(cr.start_time).max(1) as f64;
        compute_properties(cr, now_ts, min_step_secs, duration_secs);
    }
}
