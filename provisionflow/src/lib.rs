//! # Provisionflow
//!
//! A resumable, multi-step provisioning engine for declarative
//! infrastructure handlers.
//!
//! Every operation on a resource (create, read, update, delete, list) is a
//! pipeline of stages. A single invocation runs the pipeline until it
//! finishes, fails, or has to wait; waiting ends the invocation with an
//! IN_PROGRESS envelope whose callback state lets the scheduler resume the
//! operation later on any process.
//!
//! - **Stages** issue one remote call each and classify what comes back
//! - **Policies** bound stabilization polling and force propagation delays
//! - **Outcome taxonomy** maps every failure onto a closed set of codes
//! - **Resources** wire concrete outpost resources onto the engine
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use provisionflow::prelude::*;
//! use provisionflow::resources::access_point;
//!
//! let orchestrator = access_point::handlers(api, &EngineConfig::from_env()?)?;
//!
//! let envelope = orchestrator
//!     .handle(InvocationRequest::create(AccessPoint::new(bucket_arn, "web")))
//!     .await;
//! // IN_PROGRESS: hand envelope.callback_state back on the next invocation.
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod classify;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod orchestrator;
pub mod pipeline;
pub mod policy;
pub mod resources;
pub mod stages;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::classify::{classify, classify_remote, is_transient_conflict};
    pub use crate::config::EngineConfig;
    pub use crate::core::{
        CallbackState, OperationKind, OperationStatus, OutcomeCode, ProgressEnvelope,
        ResourceModel,
    };
    pub use crate::errors::{ProvisionError, RemoteError, ValidationError};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::orchestrator::{InvocationRequest, Orchestrator};
    pub use crate::pipeline::{Pipeline, PipelineBuilder, PipelineOutcome};
    pub use crate::policy::{
        Exhaustion, PropagationGate, PropagationPolicy, StabilizationPolicy, Stabilize,
    };
    pub use crate::resources::{AccessPoint, AccessPointPolicy, OutpostsApi};
    pub use crate::stages::{
        Conditional, MarkComplete, PreExistenceCheck, Probe, ReadAfterWrite, RemoteCall,
        RemoteStage, Require, Stage, StageContext, StageResult,
    };
}
