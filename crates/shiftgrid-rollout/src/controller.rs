//! Rollout controller — folds the desired rollout into the previous state.
//!
//! Targets are matched per tag with a sorted merge on configuration name.
//! Matched targets are stepped; new targets are taken as they are (there is
//! nothing to roll from) and removed targets are dropped.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::debug;

use shiftgrid_core::{ConfigurationRollout, Rollout, UnixSecs};

use crate::stepper::step_config;

/// Merge the desired rollout `cur` with the previous state and return the
/// traffic shape to apply now.
///
/// Without previous state `cur` is returned unchanged: the desired revision
/// gets its full share from the start.
pub fn step(cur: &Rollout, prev: Option<&Rollout>, now_ts: UnixSecs) -> Rollout {
    let prev = match prev {
        Some(p) if !p.is_empty() => p,
        _ => return cur.clone(),
    };

    let cur_by_tag = group_by_tag(cur);
    let prev_by_tag = group_by_tag(prev);

    let mut out = Vec::with_capacity(cur.configurations.len());
    for (tag, goals) in &cur_by_tag {
        match prev_by_tag.get(tag) {
            Some(prevs) => merge_tag(goals, prevs, now_ts, &mut out),
            None => {
                // A new tag has no history to roll from. The default tag is
                // always present, so this only ever concerns named tags.
                // Targets without traffic are left out, as in the merge.
                debug!(tag = %tag, targets = goals.len(), "new tag, no rollout");
                out.extend(
                    goals
                        .iter()
                        .filter(|c| c.percent != 0)
                        .map(|c| (*c).clone()),
                );
            }
        }
    }

    let mut ro = Rollout::new(out);
    sort_rollout(&mut ro);
    ro
}

/// Targets grouped by tag, each group sorted by configuration name.
fn group_by_tag(ro: &Rollout) -> BTreeMap<&str, Vec<&ConfigurationRollout>> {
    let mut groups: BTreeMap<&str, Vec<&ConfigurationRollout>> = BTreeMap::new();
    for cfg in &ro.configurations {
        groups.entry(cfg.tag.as_str()).or_default().push(cfg);
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| a.configuration_name.cmp(&b.configuration_name));
    }
    groups
}

/// Intersect the desired and previous targets of one tag.
fn merge_tag(
    goals: &[&ConfigurationRollout],
    prevs: &[&ConfigurationRollout],
    now_ts: UnixSecs,
    out: &mut Vec<ConfigurationRollout>,
) {
    let (mut i, mut j) = (0, 0);
    while i < goals.len() {
        let goal = goals[i];
        let ord = prevs
            .get(j)
            .map_or(Ordering::Less, |p| goal.configuration_name.cmp(&p.configuration_name));
        match ord {
            Ordering::Less => {
                // Added during this reconciliation. Keep it if it will
                // receive traffic.
                if goal.percent != 0 {
                    out.push(goal.clone());
                }
                i += 1;
            }
            Ordering::Equal => {
                match goal.percent {
                    // Tag-only target, receives no traffic: no rollout.
                    0 => {}
                    // Common A/B case with 1% for the test configuration.
                    1 => out.push(goal.clone()),
                    _ => out.push(step_config(goal, prevs[j], now_ts)),
                }
                debug!(
                    configuration = %goal.configuration_name,
                    tag = %goal.tag,
                    percent = goal.percent,
                    "merged rollout target"
                );
                i += 1;
                j += 1;
            }
            Ordering::Greater => {
                // Removed during this update; it no longer gets traffic.
                j += 1;
            }
        }
    }
}

/// Sort by tag and, within a tag, by configuration name so the result is
/// stable from run to run.
pub fn sort_rollout(ro: &mut Rollout) {
    ro.configurations.sort_by(|a, b| {
        a.tag
            .cmp(&b.tag)
            .then_with(|| a.configuration_name.cmp(&b.configuration_name))
    });
}
