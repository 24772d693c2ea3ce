//! Rollout state model.
//!
//! These types are persisted as a JSON string annotation on the routing
//! object, so the serialized field names are part of the wire contract and
//! must not change. Zero and empty fields are elided when serialized and
//! default to zero/empty when absent.

use serde::{Deserialize, Serialize};

/// Unix timestamp in seconds.
pub type UnixSecs = i64;

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

fn is_zero_i64(v: &i64) -> bool {
    *v == 0
}

// ── Rollout ───────────────────────────────────────────────────────

/// Rollout state of every configuration target referenced by one route.
///
/// A route may reference several configurations, and the same configuration
/// may be rolled out independently under several tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rollout {
    /// Sorted by tag first and, within the same tag, by configuration name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configurations: Vec<ConfigurationRollout>,
}

impl Rollout {
    pub fn new(configurations: Vec<ConfigurationRollout>) -> Self {
        Self { configurations }
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    /// Check the rollout for inconsistencies.
    ///
    /// Expected to run right after the annotation is deserialized. When it
    /// returns `false` the whole object must be discarded.
    pub fn validate(&self) -> bool {
        self.configurations.iter().all(|c| {
            // Cannot be over 100% in our system.
            if c.percent > 100 {
                return false;
            }
            c.revisions_total() == u64::from(c.percent)
        })
    }

    /// True when no target has an active rollout.
    pub fn done(&self) -> bool {
        self.configurations.iter().all(ConfigurationRollout::done)
    }

    /// Find the target for a configuration name and tag.
    pub fn get(&self, configuration_name: &str, tag: &str) -> Option<&ConfigurationRollout> {
        self.configurations
            .iter()
            .find(|c| c.configuration_name == configuration_name && c.tag == tag)
    }

    /// Earliest time at which some target is due for its next step.
    ///
    /// Only targets that are mid-rollout and already have a cadence count.
    pub fn next_step_time(&self) -> Option<UnixSecs> {
        self.configurations
            .iter()
            .filter(|c| !c.done() && c.step_duration > 0)
            .map(|c| c.next_step_time)
            .min()
    }
}

// ── ConfigurationRollout ──────────────────────────────────────────

/// Rollout state for one (configuration, tag) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationRollout {
    pub configuration_name: String,
    /// Empty for the default target.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,

    /// Total route percentage owned by this target. The revision
    /// percentages below sum to this number.
    #[serde(default)]
    pub percent: u32,

    /// Oldest first. Empty when no revision is ready, a single entry once
    /// the rollout is done, two or more while traffic is shifting.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub revisions: Vec<RevisionRollout>,

    /// When the rollout should be complete (+/- reconcile precision).
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub deadline: UnixSecs,

    /// When the current rollout phase began.
    #[serde(default, rename = "starttime", skip_serializing_if = "is_zero_i64")]
    pub start_time: UnixSecs,

    /// When the next step should be performed.
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub next_step_time: UnixSecs,

    /// Seconds between steps. Zero until the first step latency is observed.
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub step_duration: i64,

    /// Percentage points moved per step.
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub step_size: u32,
}

impl ConfigurationRollout {
    /// A target routing `percent` of traffic to a single revision.
    pub fn new(
        configuration_name: impl Into<String>,
        tag: impl Into<String>,
        percent: u32,
        revision_name: impl Into<String>,
    ) -> Self {
        Self {
            configuration_name: configuration_name.into(),
            tag: tag.into(),
            percent,
            revisions: vec![RevisionRollout::new(revision_name, percent)],
            ..Default::default()
        }
    }

    /// True if there is no active rollout going on for the target.
    pub fn done(&self) -> bool {
        self.revisions.len() < 2
    }

    /// Sum of the revision percentages.
    pub fn revisions_total(&self) -> u64 {
        self.revisions.iter().map(|r| u64::from(r.percent)).sum()
    }

    /// The most recent revision, which receives traffic as the rollout moves on.
    pub fn newest(&self) -> Option<&RevisionRollout> {
        self.revisions.last()
    }
}

// ── RevisionRollout ───────────────────────────────────────────────

/// A revision taking part in a configuration rollout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionRollout {
    pub revision_name: String,
    /// Share of total route traffic, not of the target's percentage.
    #[serde(default)]
    pub percent: u32,
}

impl RevisionRollout {
    pub fn new(revision_name: impl Into<String>, percent: u32) -> Self {
        Self {
            revision_name: revision_name.into(),
            percent,
        }
    }
}
