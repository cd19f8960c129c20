//! Convergence policies layered around stages.
//!
//! This module provides:
//! - A bounded stabilization check with a configurable exhaustion outcome
//! - A fixed-count propagation delay gate
//!
//! Both policies are pure functions of the callback state they are handed;
//! the stage wrappers only apply them inside a pipeline.

mod propagation;
mod stabilization;

pub use propagation::{PropagationGate, PropagationPolicy};
pub use stabilization::{Exhaustion, Stabilize, StabilizationPolicy, StabilizationVerdict};
