//! Percentage bookkeeping for a single configuration target.
//!
//! Traffic grows on the newest revision and drains from the oldest one, so
//! a rollout converges on the newest revision and retires old ones as soon
//! as possible.

use tracing::debug;

use shiftgrid_core::{ConfigurationRollout, UnixSecs};

/// Redistribute the target's revisions so they sum to `goal`.
///
/// Growth goes entirely to the newest revision. Shrinking removes traffic
/// starting from the oldest revision, dropping every revision it fully
/// drains. A `goal` of zero clears the revisions: no traffic, no rollout.
pub fn adjust_percentage(goal: u32, cr: &mut ConfigurationRollout) {
    if goal == 0 {
        cr.revisions.clear();
    } else if goal > cr.percent {
        if let Some(newest) = cr.revisions.last_mut() {
            newest.percent = newest.percent.saturating_add(goal - cr.percent);
        }
    } else if goal < cr.percent {
        let mut deficit = cr.percent - goal;
        let mut drained = 0;
        for rev in cr.revisions.iter_mut() {
            if rev.percent > deficit {
                rev.percent -= deficit;
                break;
            }
            deficit -= rev.percent;
            drained += 1;
            if deficit == 0 {
                break;
            }
        }
        cr.revisions.drain(..drained);
    }
    cr.percent = goal;
}

/// Move one step of traffic towards the newest revision, if a step is due.
///
/// Traffic is taken from the revisions just before the newest one, walking
/// back towards the oldest, until `step_size` points have been collected.
/// Revisions that reach zero are dropped. When the older revisions hold less
/// than a full step (the target shrank below the step size) the newest
/// revision is capped at the target's percentage.
pub fn step_revisions(cr: &mut ConfigurationRollout, now_ts: UnixSecs) {
    if now_ts < cr.next_step_time || cr.revisions.len() < 2 {
        return;
    }

    let newest_idx = cr.revisions.len() - 1;
    let mut remaining = cr.step_size;
    // Older revisions in [0, keep) still carry traffic after the step.
    let mut keep = newest_idx;
    for idx in (0..newest_idx).rev() {
        if remaining == 0 {
            break;
        }
        let rev = &mut cr.revisions[idx];
        if rev.percent > remaining {
            rev.percent -= remaining;
            break;
        }
        remaining -= rev.percent;
        keep = idx;
    }

    let Some(mut newest) = cr.revisions.pop() else {
        return;
    };
    cr.revisions.truncate(keep);
    newest.percent = newest.percent.saturating_add(cr.step_size).min(cr.percent);
    debug!(
        configuration = %cr.configuration_name,
        tag = %cr.tag,
        revision = %newest.revision_name,
        percent = newest.percent,
        retired = newest_idx - keep,
        "stepped rollout"
    );
    cr.revisions.push(newest);
    cr.next_step_time = now_ts.saturating_add(cr.step_duration);
}
