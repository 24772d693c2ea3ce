//! Per-target rollout stepping.

use tracing::{debug, info};

use shiftgrid_core::{ConfigurationRollout, RevisionRollout, UnixSecs};

use crate::shift::{adjust_percentage, step_revisions};

/// Compute the new state of one target from its desired shape and its
/// previous rollout state.
///
/// `goal` carries the desired revision as its only entry. When that revision
/// is already the newest one in `prev`, the rollout in progress continues
/// (and takes a step if due). Otherwise a new rollout starts: the newest
/// revision still carrying traffic gives up 1% to the desired revision.
/// Cadence of a new rollout is left unset until the first step latency is
/// observed.
pub fn step_config(
    goal: &ConfigurationRollout,
    prev: &ConfigurationRollout,
    now_ts: UnixSecs,
) -> ConfigurationRollout {
    // Timing is reset when a new revision shows up, so only the identity
    // and the desired shape carry over here.
    let mut ret = ConfigurationRollout {
        configuration_name: goal.configuration_name.clone(),
        tag: goal.tag.clone(),
        percent: goal.percent,
        revisions: goal.revisions.clone(),
        ..Default::default()
    };

    let Some(desired) = goal.revisions.first() else {
        return ret;
    };

    let mut prev = prev.clone();
    if !prev.revisions.is_empty() {
        // Accounts for the whole target moving up or down, independent of
        // any revision change.
        adjust_percentage(goal.percent, &mut prev);
    }

    let Some(newest) = prev.newest() else {
        return ret;
    };

    if newest.revision_name == desired.revision_name {
        ret.revisions = prev.revisions;
        ret.deadline = prev.deadline;
        ret.next_step_time = prev.next_step_time;
        ret.step_duration = prev.step_duration;
        ret.step_size = prev.step_size;
        ret.start_time = prev.start_time;
        step_revisions(&mut ret, now_ts);
        return ret;
    }

    ret.start_time = now_ts;

    if let Some(donor) = prev.revisions.iter_mut().rev().find(|r| r.percent > 0) {
        donor.percent -= 1;
        debug!(
            configuration = %goal.configuration_name,
            revision = %donor.revision_name,
            percent = donor.percent,
            "took 1% from previous revision"
        );
    }

    let mut revisions: Vec<RevisionRollout> = Vec::with_capacity(prev.revisions.len() + 1);
    revisions.extend(prev.revisions.into_iter().filter(|r| r.percent > 0));
    revisions.push(RevisionRollout::new(desired.revision_name.clone(), 1));
    ret.revisions = revisions;

    info!(
        configuration = %ret.configuration_name,
        tag = %ret.tag,
        revision = %desired.revision_name,
        revisions = ret.revisions.len(),
        start_time = now_ts,
        "started rollout"
    );
    ret
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(percent: u32, revs: &[(&str, u32)]) -> ConfigurationRollout {
        ConfigurationRollout {
            configuration_name: "cfg".to_string(),
            percent,
            revisions: revs.iter().map(|(n, p)| RevisionRollout::new(*n, *p)).collect(),
            ..Default::default()
        }
    }

    fn percents(cr: &ConfigurationRollout) -> Vec<(&str, u32)> {
        cr.revisions
            .iter()
            .map(|r| (r.revision_name.as_str(), r.percent))
            .collect()
    }

    #[test]
    fn no_previous_revisions_takes_goal() {
        let goal = target(100, &[("r-2", 100)]);
        let prev = target(0, &[]);
        let ret = step_config(&goal, &prev, 1000);
        assert_eq!(percents(&ret), vec![("r-2", 100)]);
        assert_eq!(ret.start_time, 0);
    }

    #[test]
    fn new_revision_starts_rollout() {
        let goal = target(100, &[("r-2", 100)]);
        let prev = target(100, &[("r-1", 100)]);
        let ret = step_config(&goal, &prev, 1000);
        assert_eq!(percents(&ret), vec![("r-1", 99), ("r-2", 1)]);
        assert_eq!(ret.start_time, 1000);
        assert_eq!(ret.step_duration, 0);
        assert_eq!(ret.step_size, 0);
        assert_eq!(ret.next_step_time, 0);
        // The input is left untouched.
        assert_eq!(percents(&prev), vec![("r-1", 100)]);
    }

    #[test]
    fn new_revision_resets_timing() {
        let goal = target(100, &[("r-3", 100)]);
        let mut prev = target(100, &[("r-1", 60), ("r-2", 40)]);
        prev.start_time = 10;
        prev.next_step_time = 50;
        prev.step_duration = 5;
        prev.step_size = 20;
        prev.deadline = 130;
        let ret = step_config(&goal, &prev, 60);
        assert_eq!(percents(&ret), vec![("r-1", 60), ("r-2", 39), ("r-3", 1)]);
        assert_eq!(ret.start_time, 60);
        assert_eq!(ret.next_step_time, 0);
        assert_eq!(ret.step_duration, 0);
        assert_eq!(ret.deadline, 0);
    }

    #[test]
    fn new_revision_drops_the_revision_that_gave_up_its_last_point() {
        let goal = target(100, &[("r-3", 100)]);
        let prev = target(100, &[("r-1", 99), ("r-2", 1)]);
        let ret = step_config(&goal, &prev, 5);
        assert_eq!(percents(&ret), vec![("r-1", 99), ("r-3", 1)]);
    }

    #[test]
    fn new_revision_skips_zero_revisions_when_taking_a_point() {
        let goal = target(50, &[("r-3", 50)]);
        let prev = target(50, &[("r-1", 50), ("r-2", 0)]);
        let ret = step_config(&goal, &prev, 5);
        assert_eq!(percents(&ret), vec![("r-1", 49), ("r-3", 1)]);
    }

    #[test]
    fn new_revision_with_changed_target_percent() {
        let goal = target(40, &[("r-2", 40)]);
        let prev = target(100, &[("r-1", 100)]);
        let ret = step_config(&goal, &prev, 5);
        assert_eq!(percents(&ret), vec![("r-1", 39), ("r-2", 1)]);
        assert_eq!(ret.percent, 40);
    }

    #[test]
    fn same_revision_copies_timing_and_steps() {
        let goal = target(100, &[("r-2", 100)]);
        let mut prev = target(100, &[("r-1", 79), ("r-2", 21)]);
        prev.start_time = 10;
        prev.next_step_time = 30;
        prev.step_duration = 10;
        prev.step_size = 20;
        prev.deadline = 200;
        let ret = step_config(&goal, &prev, 30);
        assert_eq!(percents(&ret), vec![("r-1", 59), ("r-2", 41)]);
        assert_eq!(ret.start_time, 10);
        assert_eq!(ret.next_step_time, 40);
        assert_eq!(ret.step_duration, 10);
        assert_eq!(ret.step_size, 20);
        assert_eq!(ret.deadline, 200);
    }

    #[test]
    fn same_revision_not_due_keeps_split() {
        let goal = target(100, &[("r-2", 100)]);
        let mut prev = target(100, &[("r-1", 79), ("r-2", 21)]);
        prev.next_step_time = 30;
        prev.step_duration = 10;
        prev.step_size = 20;
        let ret = step_config(&goal, &prev, 29);
        assert_eq!(percents(&ret), vec![("r-1", 79), ("r-2", 21)]);
        assert_eq!(ret.next_step_time, 30);
    }

    #[test]
    fn same_revision_applies_percent_change_first() {
        let goal = target(60, &[("r-2", 60)]);
        let mut prev = target(100, &[("r-1", 50), ("r-2", 50)]);
        prev.next_step_time = 100;
        let ret = step_config(&goal, &prev, 10);
        assert_eq!(percents(&ret), vec![("r-1", 10), ("r-2", 50)]);
    }

    #[test]
    fn same_revision_completed_rollout_stays_put() {
        let goal = target(100, &[("r-1", 100)]);
        let prev = target(100, &[("r-1", 100)]);
        let ret = step_config(&goal, &prev, 10);
        assert_eq!(percents(&ret), vec![("r-1", 100)]);
        assert!(ret.done());
    }

    #[test]
    fn shrink_below_step_caps_newest() {
        let goal = target(15, &[("r-2", 15)]);
        let mut prev = target(50, &[("r-1", 40), ("r-2", 10)]);
        prev.step_size = 10;
        prev.step_duration = 3;
        prev.next_step_time = 7;
        let ret = step_config(&goal, &prev, 7);
        assert_eq!(percents(&ret), vec![("r-2", 15)]);
        assert_eq!(ret.next_step_time, 10);
    }

    #[test]
    fn goal_without_revision_is_returned_as_is() {
        let goal = target(100, &[]);
        let prev = target(100, &[("r-1", 100)]);
        let ret = step_config(&goal, &prev, 10);
        assert!(ret.revisions.is_empty());
    }
}
