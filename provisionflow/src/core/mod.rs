//! Core domain model types for provisionflow.
//!
//! This module contains the fundamental types used throughout the engine:
//! - Operation kind and status enums
//! - The closed outcome code vocabulary
//! - Callback state carried across invocations
//! - The progress envelope returned to the scheduler

mod callback;
mod envelope;
#[cfg(test)]
mod envelope_tests;
mod model;
mod outcome;
mod status;

pub use callback::CallbackState;
pub use envelope::ProgressEnvelope;
pub use model::ResourceModel;
pub use outcome::OutcomeCode;
pub use status::{OperationKind, OperationStatus};
