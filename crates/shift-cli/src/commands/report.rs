//! Human-readable rollout summary.

use shiftgrid_core::Rollout;

/// One line per target, revisions oldest first.
pub fn format_rollout(ro: &Rollout) -> String {
    let mut out = String::new();
    if ro.configurations.is_empty() {
        out.push_str("no rollout targets\n");
        return out;
    }
    for cfg in &ro.configurations {
        let tag = if cfg.tag.is_empty() { "(default)" } else { cfg.tag.as_str() };
        out.push_str(&format!("{}/{} {}%:", cfg.configuration_name, tag, cfg.percent));
        for rev in &cfg.revisions {
            out.push_str(&format!(" {}={}%", rev.revision_name, rev.percent));
        }
        if !cfg.done() {
            if cfg.step_duration > 0 {
                out.push_str(&format!(
                    " (step {}% every {}s, next at {})",
                    cfg.step_size, cfg.step_duration, cfg.next_step_time
                ));
            } else {
                out.push_str(" (awaiting first step)");
            }
        }
        out.push('\n');
    }
    out
}
