//! Rollout annotation encoding.
//!
//! The previous rollout state travels between reconciliations as a JSON
//! string annotation on the route. Decoding always runs the validator: an
//! annotation that does not add up is rejected as a whole, never repaired.

use tracing::warn;

use crate::error::{AnnotationError, AnnotationResult};
use crate::types::Rollout;

/// Annotation key holding the serialized rollout state.
pub const ROLLOUT_ANNOTATION: &str = "shiftgrid.dev/rollout";

impl Rollout {
    /// Serialize to the compact annotation form.
    pub fn to_annotation(&self) -> AnnotationResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize and validate an annotation value.
    pub fn from_annotation(value: &str) -> AnnotationResult<Self> {
        let ro: Rollout = serde_json::from_str(value)?;
        if !ro.validate() {
            return Err(AnnotationError::Inconsistent(describe_inconsistency(&ro)));
        }
        Ok(ro)
    }

    /// Decode the previous state, treating anything unusable as no state.
    pub fn from_annotation_or_default(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::default();
        };
        match Self::from_annotation(value) {
            Ok(ro) => ro,
            Err(e) => {
                warn!(error = %e, "discarding previous rollout state");
                Self::default()
            }
        }
    }
}

fn describe_inconsistency(ro: &Rollout) -> String {
    ro.configurations
        .iter()
        .find_map(|c| {
            let total = c.revisions_total();
            if c.percent > 100 {
                Some(format!(
                    "target {}/{} has percent {} over 100",
                    c.configuration_name, c.tag, c.percent
                ))
            } else if total != u64::from(c.percent) {
                Some(format!(
                    "target {}/{} revisions sum to {} instead of {}",
                    c.configuration_name, c.tag, total, c.percent
                ))
            } else {
                None
            }
        })
        .unwrap_or_else(|| "unknown".to_string())
}
