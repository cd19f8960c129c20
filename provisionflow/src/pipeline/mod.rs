//! Pipeline building and execution.
//!
//! This module provides:
//! - An ordered stage sequence with short-circuit semantics
//! - A validating builder
//! - The outcome type the orchestrator turns into an envelope

mod builder;
#[cfg(test)]
mod integration_tests;
mod sequence;

pub use builder::PipelineBuilder;
pub use sequence::{Pipeline, PipelineOutcome};
