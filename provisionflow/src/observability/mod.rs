//! Observability utilities.
//!
//! Engine code logs through `tracing` macros only; binaries and tests decide
//! where the lines go by calling [`init_tracing`].

mod logging;

pub use logging::{init_tracing, is_initialized, LogFormat, DEFAULT_FILTER};
