//! shiftgrid-core — rollout state model for progressive traffic shifting.
//!
//! Holds the data shared by the rollout engine and its callers: the
//! per-target rollout state, the validator that gates previously persisted
//! state, the annotation codec, and `shift.toml` configuration.

pub mod annotation;
pub mod config;
pub mod error;
pub mod types;

pub use annotation::ROLLOUT_ANNOTATION;
pub use config::{RolloutConfig, ShiftConfig, DEFAULT_ROLLOUT_DURATION_SECS};
pub use error::{AnnotationError, AnnotationResult, ConfigError, ConfigResult};
pub use types::*;
