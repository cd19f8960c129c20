//! Testing utilities for provisionflow pipelines.
//!
//! This module provides:
//! - A minimal resource model for engine-level tests
//! - An in-memory outpost backend with call counters and failure injection
//! - Envelope assertions
//! - A scheduler replay harness

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_envelope_failed, assert_envelope_in_progress, assert_envelope_succeeded,
    assert_envelope_valid,
};
pub use fixtures::{drive_to_completion, SampleModel};
pub use mocks::FakeOutposts;
