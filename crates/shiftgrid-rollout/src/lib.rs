//! ShiftGrid progressive rollouts — incremental traffic shifting between
//! revisions.
//!
//! This crate is the decision engine behind progressive rollouts. Given the
//! desired traffic shape of a route (one revision per configuration target)
//! and the previously persisted rollout state, it computes the next
//! intermediate shape: how much traffic each revision in flight receives,
//! and when the next adjustment is due. It never performs I/O and never reads
//! a clock; every timestamp is passed in by the caller.
//!
//! # Components
//!
//! - **`controller`** — Top-level merge of desired and previous state, per tag
//! - **`stepper`** — Per-target stepping: start a new rollout or continue one
//! - **`shift`** — Percentage redistribution and single-step traffic moves
//! - **`cadence`** — Step size and step interval from the observed first step
//!
//! # Flow
//!
//! ```text
//! desired Rollout ──┐
//!                   ├─ controller::step(now) ─► new Rollout ─► cadence::observe_ready(later)
//! previous Rollout ─┘        │
//!                            └─ stepper::step_config per matched target
//!                                 ├─ shift::adjust_percentage
//!                                 └─ shift::step_revisions
//! ```

pub mod cadence;
pub mod controller;
pub mod shift;
pub mod stepper;

pub use cadence::{compute_properties, observe_ready};
pub use controller::{sort_rollout, step};
pub use shift::{adjust_percentage, step_revisions};
pub use stepper::step_config;
